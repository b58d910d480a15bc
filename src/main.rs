/*

    Load boxes and rays from a scene file, build the
    BVH over the boxes and report where every ray hits.

    @date: Oct, 2025
    @author: Bartu

*/

use std::{self, env, fs::File, io::BufWriter, path::Path, time::Instant};
use tracing::{info, warn, error, debug};
use tracing_subscriber;

use raybox::json_parser::parse_scene_json;

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    tracing_subscriber::fmt::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let json_path: &String = if args.len() == 1 {
        warn!("No arguments were provided, setting default scene path...");
        &String::from("./inputs/boxes.json")
    } else if args.len() == 2 {
        &args[1]
    } else {
        error!("Usage: {} <filename>.json", args[0]);
        std::process::exit(1);
    };

    // Parse JSON
    info!("Loading scene from {}...", json_path);
    let json_path = Path::new(json_path);
    let mut root = parse_scene_json(json_path).map_err(|e| {
        error!("Failed to load scene: {}", e);
        Box::<dyn std::error::Error>::from(e)
    })?;

    let start = Instant::now();
    root.scene.setup().map_err(|e| {
        error!("Failed to set up scene: {}", e);
        Box::<dyn std::error::Error>::from(e)
    })?;
    debug!("Scene is setup successfully.\n {:#?}", root);
    let root = root; // Shadow mutatability before querying

    let report = root.scene.report();
    let hits = report.results.iter().filter(|r| r.box_id.is_some()).count();
    info!("{} of {} rays hit a box, took {:?}", hits, report.results.len(), start.elapsed());

    // Save to current folder
    let stem = json_path.file_stem().and_then(|s| s.to_str()).unwrap_or("scene");
    let out_path = format!("./{}_hits.json", stem);
    let writer = BufWriter::new(File::create(&out_path)?);
    serde_json::to_writer_pretty(writer, &report)?;
    info!("Wrote results to {}", out_path);

    info!("Finished execution.");
    Ok(())
}
