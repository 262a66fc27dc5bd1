// Copyright 2020 TwoCookingMice

use slabtrace::core::settings::SimulationSettings;
use slabtrace::core::settings_loader::load_settings;
use slabtrace::core::transport::PhotonTransport;
use slabtrace::io::{ exr_utils, image_utils };
use slabtrace::simulators::parallel::{ ParallelSimulator, Simulator };

use console::style;
use std::env;
use std::str::FromStr;

const USAGE: &str = "[settings.xml] [--output out.png] [--exr out.exr] [--photons N] [--passes N] \
                     [--size N] [--seed N] [--threads N] [--g G]";

fn parse_flag<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse::<T>().ok()) {
        Some(v) => v,
        None => {
            log::error!("Missing or invalid value for {}.", flag);
            std::process::exit(1);
        }
    }
}

fn off_grid_warning(settings: &SimulationSettings, dropped_fraction: f64) -> Option<String> {
    if dropped_fraction <= 0.05 {
        return None;
    }
    Some(format!("{:.1}% of the transmitted weight fell outside the {} x {} grid ({} units wide), consider a larger extent.",
                 100.0 * dropped_fraction, settings.image_size, settings.image_size, settings.slab_extent))
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut settings_path: Option<String> = None;
    let mut output_path = String::from("out.png");
    let mut exr_path: Option<String> = None;
    let mut photons: Option<usize> = None;
    let mut passes: Option<usize> = None;
    let mut size: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut threads: Option<usize> = None;
    let mut anisotropy: Option<f32> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].clone();
        match flag.as_str() {
            "--output" => {
                i += 1;
                output_path = parse_flag(&args, i, &flag);
            }
            "--exr" => {
                i += 1;
                exr_path = Some(parse_flag(&args, i, &flag));
            }
            "--photons" => {
                i += 1;
                photons = Some(parse_flag(&args, i, &flag));
            }
            "--passes" => {
                i += 1;
                passes = Some(parse_flag(&args, i, &flag));
            }
            "--size" => {
                i += 1;
                size = Some(parse_flag(&args, i, &flag));
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_flag(&args, i, &flag));
            }
            "--threads" => {
                i += 1;
                threads = Some(parse_flag(&args, i, &flag));
            }
            "--g" => {
                i += 1;
                anisotropy = Some(parse_flag(&args, i, &flag));
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} {}", args[0], USAGE);
                return;
            }
            other if !other.starts_with("--") && settings_path.is_none() => {
                settings_path = Some(other.to_string());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: {} {}", args[0], USAGE);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut settings = match &settings_path {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("Failed to load settings {}: {}.", path, err);
                std::process::exit(1);
            }
        },
        None => SimulationSettings::default(),
    };
    if let Some(v) = photons { settings.photons_per_pass = v; }
    if let Some(v) = passes { settings.passes = v; }
    if let Some(v) = size { settings.image_size = v; }
    if let Some(v) = seed { settings.seed = v; }
    if let Some(v) = threads { settings.threads = v; }
    if let Some(v) = anisotropy { settings.anisotropy = v; }

    let transport = match PhotonTransport::from_settings(&settings) {
        Ok(transport) => transport,
        Err(err) => {
            log::error!("{}.", err);
            std::process::exit(1);
        }
    };

    log::info!("Slab: d = {}, sigma_a = {}, sigma_s = {}, g = {}, m = {}.",
               settings.thickness, settings.sigma_a, settings.sigma_s, settings.anisotropy, settings.roulette_m);

    let simulator = ParallelSimulator::from_settings(&settings).with_progress(true);
    let result = match simulator.simulate(&transport) {
        Ok(result) => result,
        Err(err) => {
            log::error!("Simulation failed: {}.", err);
            std::process::exit(1);
        }
    };

    if let Some(warning) = off_grid_warning(&settings, result.total.dropped_fraction()) {
        log::warn!("{}", warning);
    }

    println!("{} {:.6} {} {:.6}",
             style("Rd").bold().cyan(), result.reflectance(),
             style("Tt").bold().cyan(), result.transmittance());

    let averaged = result.averaged_histogram();
    let mut failed = false;
    if let Err(err) = image_utils::write_image_to_file(&averaged, &settings.color, settings.gamma, &output_path) {
        log::error!("{}.", err);
        failed = true;
    }
    if let Some(path) = &exr_path {
        if let Err(err) = exr_utils::write_exr_to_file(&averaged, path) {
            log::error!("{}.", err);
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }

    println!("{}", style("Simulation done.").green());
}
