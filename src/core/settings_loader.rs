// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::{ BytesStart, Event };
use quick_xml::Reader;

use crate::core::settings::{ SimulationError, SimulationSettings };
use crate::math::constants::{ Float, Vector3f };

#[derive(Debug)]
pub enum SettingsLoadError {
    Io(std::io::Error),
    Parse(String),
    Invalid(SimulationError),
}

impl From<std::io::Error> for SettingsLoadError {
    fn from(err: std::io::Error) -> Self {
        SettingsLoadError::Io(err)
    }
}

impl From<SimulationError> for SettingsLoadError {
    fn from(err: SimulationError) -> Self {
        SettingsLoadError::Invalid(err)
    }
}

impl fmt::Display for SettingsLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsLoadError::Io(err) => write!(f, "io error: {}", err),
            SettingsLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SettingsLoadError::Invalid(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SettingsLoadError {}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<SimulationSettings, SettingsLoadError> {
    let xml = fs::read_to_string(path.as_ref())?;
    let settings = parse_settings(&xml)?;
    log::info!("Settings loaded from: {}.", path.as_ref().display());
    Ok(settings)
}

/// Parse a `<simulation>` document on top of the default settings.
pub fn parse_settings(xml: &str) -> Result<SimulationSettings, SettingsLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut settings = SimulationSettings::default();
    let mut in_simulation = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"simulation" => in_simulation = true,
                    b"default" => {
                        let (name, value) = name_and_value(&e, &defaults)?;
                        defaults.insert(name, value);
                    }
                    b"integer" | b"float" | b"rgb" | b"string" => {
                        if !in_simulation {
                            return Err(SettingsLoadError::Parse("property outside <simulation>".to_string()));
                        }
                        let (name, value) = name_and_value(&e, &defaults)?;
                        apply_property(&mut settings, &name, &value)?;
                    }
                    other => {
                        return Err(SettingsLoadError::Parse(
                            format!("unexpected element: {}", String::from_utf8_lossy(other))));
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"simulation" {
                    in_simulation = false;
                }
            }
            Err(e) => {
                return Err(SettingsLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    settings.validate()?;
    Ok(settings)
}

fn name_and_value(e: &BytesStart, defaults: &HashMap<String, String>) -> Result<(String, String), SettingsLoadError> {
    let mut name: Option<String> = None;
    let mut value: Option<String> = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value().unwrap_or_default().to_string()),
            b"value" => value = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), defaults)),
            _ => {}
        }
    }
    match (name, value) {
        (Some(n), Some(v)) => Ok((n, v)),
        _ => Err(SettingsLoadError::Parse(
            format!("<{}> needs both name and value", String::from_utf8_lossy(e.name().as_ref())))),
    }
}

fn apply_property(settings: &mut SimulationSettings, name: &str, value: &str) -> Result<(), SettingsLoadError> {
    match name {
        "photons" => settings.photons_per_pass = parse_usize(value)?,
        "passes" => settings.passes = parse_usize(value)?,
        "size" => settings.image_size = parse_usize(value)?,
        "extent" => settings.slab_extent = parse_float(value)?,
        "thickness" => settings.thickness = parse_float(value)?,
        "sigma_a" => settings.sigma_a = parse_float(value)?,
        "sigma_s" => settings.sigma_s = parse_float(value)?,
        "anisotropy" | "g" => settings.anisotropy = parse_float(value)?,
        "roulette" => settings.roulette_m = parse_u32(value)?,
        "roulette_threshold" => settings.roulette_threshold = parse_float(value)?,
        "seed" => settings.seed = parse_u64(value)?,
        "threads" => settings.threads = parse_usize(value)?,
        "batch_size" => settings.batch_size = parse_usize(value)?,
        "color" => settings.color = parse_vec3(value)?,
        "gamma" => settings.gamma = parse_float(value)?,
        _ => return Err(SettingsLoadError::Parse(format!("unknown property: {}", name))),
    }
    Ok(())
}

/// Replace every `$name` by its `<default>`. A reference spans the longest
/// run of `[A-Za-z0-9_]` after the `$`, so `$gamma` never matches a default
/// named `g`. Unknown names are left as written.
fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..len];
        match defaults.get(name) {
            Some(value) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

fn parse_float(value: &str) -> Result<Float, SettingsLoadError> {
    value.trim().parse::<Float>().map_err(|_| SettingsLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, SettingsLoadError> {
    value.trim().parse::<u32>().map_err(|_| SettingsLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_u64(value: &str) -> Result<u64, SettingsLoadError> {
    value.trim().parse::<u64>().map_err(|_| SettingsLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SettingsLoadError> {
    value.trim().parse::<usize>().map_err(|_| SettingsLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, SettingsLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SettingsLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| SettingsLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| SettingsLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let xml = r#"
<simulation>
    <default name="g" value="0.5"/>
    <integer name="photons" value="2000"/>
    <integer name="passes" value="4"/>
    <integer name="size" value="128"/>
    <float name="sigma_a" value="0.1"/>
    <float name="sigma_s" value="10"/>
    <float name="thickness" value="2.0"/>
    <float name="anisotropy" value="$g"/>
    <float name="extent" value="4.0"/>
    <integer name="roulette" value="20"/>
    <float name="roulette_threshold" value="0.01"/>
    <integer name="seed" value="12"/>
    <integer name="threads" value="2"/>
    <integer name="batch_size" value="500"/>
    <rgb name="color" value="1.0, 0.5, 0.25"/>
    <float name="gamma" value="2.2"/>
</simulation>
"#;
        let settings = parse_settings(xml).expect("failed to parse settings");
        assert_eq!(settings.photons_per_pass, 2000);
        assert_eq!(settings.passes, 4);
        assert_eq!(settings.image_size, 128);
        assert_eq!(settings.sigma_a, 0.1);
        assert_eq!(settings.sigma_s, 10.0);
        assert_eq!(settings.thickness, 2.0);
        assert_eq!(settings.anisotropy, 0.5);
        assert_eq!(settings.slab_extent, 4.0);
        assert_eq!(settings.roulette_m, 20);
        assert_eq!(settings.roulette_threshold, 0.01);
        assert_eq!(settings.seed, 12);
        assert_eq!(settings.threads, 2);
        assert_eq!(settings.batch_size, 500);
        assert_eq!(settings.color, Vector3f::new(1.0, 0.5, 0.25));
        assert_eq!(settings.gamma, 2.2);
    }

    #[test]
    fn test_defaults_sharing_a_prefix() {
        let xml = r#"
<simulation>
    <default name="g" value="0.5"/>
    <default name="gamma" value="2.2"/>
    <default name="g_2" value="0.25"/>
    <float name="gamma" value="$gamma"/>
    <float name="anisotropy" value="$g"/>
    <rgb name="color" value="$g_2, $g, 1"/>
</simulation>
"#;
        // HashMap order varies between runs, so parse repeatedly.
        for _ in 0..50 {
            let settings = parse_settings(xml).expect("failed to parse settings");
            assert_eq!(settings.gamma, 2.2);
            assert_eq!(settings.anisotropy, 0.5);
            assert_eq!(settings.color, Vector3f::new(0.25, 0.5, 1.0));
        }
    }

    #[test]
    fn test_resolve_value_keeps_unknown_references() {
        let mut defaults = HashMap::new();
        defaults.insert("g".to_string(), "0.5".to_string());
        assert_eq!(resolve_value("$g", &defaults), "0.5");
        assert_eq!(resolve_value("$gamma", &defaults), "$gamma");
        assert_eq!(resolve_value("a$g,$", &defaults), "a0.5,$");
    }

    #[test]
    fn test_missing_properties_keep_defaults() {
        let settings = parse_settings("<simulation><integer name=\"passes\" value=\"2\"/></simulation>").unwrap();
        let mut expected = SimulationSettings::default();
        expected.passes = 2;
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_settings("<simulation><float name=\"bogus\" value=\"1\"/></simulation>"),
            Err(SettingsLoadError::Parse(_))));
        assert!(matches!(
            parse_settings("<simulation><float name=\"sigma_a\" value=\"abc\"/></simulation>"),
            Err(SettingsLoadError::Parse(_))));
        assert!(matches!(
            parse_settings("<float name=\"sigma_a\" value=\"1\"/>"),
            Err(SettingsLoadError::Parse(_))));
        assert!(matches!(
            parse_settings("<simulation><float name=\"anisotropy\" value=\"1.5\"/></simulation>"),
            Err(SettingsLoadError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load_settings("/nonexistent/slab.xml"), Err(SettingsLoadError::Io(_))));
    }
}
