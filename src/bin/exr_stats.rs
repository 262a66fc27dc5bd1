use slabtrace::io::exr_utils::read_exr_from_file;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <histogram.exr> [extent]", args[0]);
        std::process::exit(1);
    }

    let extent: f64 = args.get(2).and_then(|v| v.parse::<f64>().ok()).unwrap_or(2.0);
    let bitmap = read_exr_from_file(&args[1]).unwrap_or_else(|e| panic!("{}", e));
    let (width, height) = (bitmap.width(), bitmap.height());

    let cell = extent / width.max(1) as f64;
    let mut sum = 0.0f64;
    let mut max = 0.0f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    let mut r2 = 0.0f64;
    for y in 0..height {
        for x in 0..width {
            let v = bitmap[(x, y)] as f64;
            let px = (x as f64 + 0.5) * cell - 0.5 * extent;
            let py = (y as f64 + 0.5) * cell - 0.5 * extent;
            sum += v;
            if v > max { max = v; }
            cx += v * px;
            cy += v * py;
            r2 += v * (px * px + py * py);
        }
    }

    println!("Size: {}x{} ({} bins)", width, height, width * height);
    println!("Total: {:.6}", sum);
    println!("Max: {:.6}", max);
    if sum > 0.0 {
        println!("Centroid: {:.6}, {:.6}", cx / sum, cy / sum);
        println!("RMS radius: {:.6}", (r2 / sum).sqrt());
    }
}
