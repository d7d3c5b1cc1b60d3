//! CLI tool to replay the slot and reward scans against a saved screenshot.
//! Usage: cargo run -p farm-vision --features cli --bin scan_frame -- <screenshot.png> [config.json] [profile]

use farm_data::profile::rois;
use farm_data::{ConfigPort, JsonProfileStore};
use farm_vision::{scan_for_reward, scan_slots, FrameScreen, MatchScanner};
use std::path::PathBuf;

fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [config.json] [profile]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let config_path = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("config.json"));
    let assets_dir = std::env::var("SOULFARM_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets"));

    let store = match JsonProfileStore::open(&config_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open {}: {:#}", config_path.display(), e);
            std::process::exit(1);
        }
    };
    let profile_name = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| store.current_profile_name());
    let profile = match store.load_profile(&profile_name) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{:#}. Available: {:?}", e, store.list_profiles());
            std::process::exit(1);
        }
    };

    println!("Loading image: {}", input_path.display());
    let img = match image::open(&input_path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Failed to open image: {}", e);
            std::process::exit(1);
        }
    };
    println!("Image size: {}x{}", img.width(), img.height());
    println!("Profile: {} - {}", profile.name, profile.description);
    println!("Assets: {}", assets_dir.display());

    for name in [rois::SKIP_SLOTS_1, rois::SKIP_SLOTS_2, rois::THE_SOUL] {
        for (i, r) in profile.rois(name).iter().enumerate() {
            println!("  {} #{}: {}", name, i + 1, r);
        }
    }

    let mut screen = FrameScreen::new(img, MatchScanner::new(assets_dir));

    println!("\n=== Slot Tags ===");
    let scan = scan_slots(&mut screen, &profile);
    for d in scan.doubles.iter().chain(scan.charms.iter()) {
        println!("  {}", d);
    }
    if scan.summary().is_empty() {
        println!("  No tags detected");
    }

    println!("\n=== Reward Card ===");
    match scan_for_reward(&mut screen, &profile) {
        Some(d) => println!("  {}", d),
        None => println!("  NOT FOUND"),
    }
}
