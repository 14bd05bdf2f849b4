use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use level_core::pickup::PickupRotation;
use level_core::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

mod demo;

/// Builds a blindsweep level and prints it as text
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Authored map JSON, or a text layout with --layout
    map: PathBuf,
    /// Read MAP as a whitespace-separated glyph layout instead of map JSON
    #[arg(long)]
    layout: bool,
    /// Level key used to pick randomized pickups
    #[arg(long, default_value = "1")]
    level_key: String,
    /// Seed for randomized placement and the pickup rotation
    #[arg(long)]
    seed: Option<u64>,
    /// TOML level configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Flip every tile face up before printing
    #[arg(long)]
    reveal: bool,
    /// Show the movement range of a player standing at X,Y
    #[arg(long, value_parser = parse_point)]
    player: Option<UVec2>,
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = match &args.config {
        Some(path) => LevelConfiguration::from_toml_str(&fs::read_to_string(path)?)?,
        None => LevelConfiguration::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("building level with seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let source = fs::read_to_string(&args.map)?;
    let data = if args.layout {
        LevelData::from_layout(&source)?
    } else {
        let map = level_core::authored::AuthoredMap::from_json_str(&source)?;
        let mut rotation = PickupRotation::generate(&config.pickups, &mut rng);
        LevelData::from_authored(&map, &args.level_key, &mut rotation, &config, &mut rng)?
    };
    let report = data.placement();
    if !report.is_complete() {
        log::warn!(
            "placed {} of {} randomized tiles",
            report.placed(),
            report.requested()
        );
    }

    let mut store = GameStore::new();
    store.set_level_key(Some(args.level_key.as_str()));
    let mut level = Level::new(data, config);
    level.start();
    if args.reveal {
        level.flip_all(Face::Front);
    }
    level.finish_animations(&mut store);
    let player = args.player.unwrap_or_else(|| level.entrance().position());
    level.highlight_tiles(player);

    print!("{}", demo::render_level(&mut level, player));
    println!("{}", demo::render_summary(&level, &store));
    Ok(())
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_target_level(LevelFilter::Error)
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("logging unavailable: {err}");
    }
}

fn parse_point(arg: &str) -> Result<UVec2, String> {
    let (x, y) = arg
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got [{arg}]"))?;
    let x = x.trim().parse().map_err(|err| format!("bad x [{x}]: {err}"))?;
    let y = y.trim().parse().map_err(|err| format!("bad y [{y}]: {err}"))?;
    Ok(UVec2::new(x, y))
}
