//! Deepgrid - Entry Point
//!
//! Generates a dungeon from the command line and prints its minimap.

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use deepgrid::data::{export_default_config, DungeonConfig};
use deepgrid::game::RoomEvent;
use deepgrid::{Direction, DungeonSession, GridCoordinate};

#[derive(Parser, Debug)]
#[command(name = "deepgrid")]
#[command(about = "Generate procedural room-graph dungeons")]
struct Args {
    /// Random seed (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Width and height of the room grid
    #[arg(short, long, default_value = "5")]
    grid_size: i32,

    /// Number of rooms to place
    #[arg(short, long, default_value = "12")]
    rooms: usize,

    /// RON config file with generation tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the default config to this path and exit
    #[arg(long)]
    export_config: Option<PathBuf>,

    /// Walk through every room, clearing each one, before printing
    #[arg(long)]
    explore: bool,

    /// Print the minimap snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting Deepgrid v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = &args.export_config {
        export_default_config(path).with_context(|| format!("exporting config to {:?}", path))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => DungeonConfig::load(path).with_context(|| format!("loading config {:?}", path))?,
        None => DungeonConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut session = DungeonSession::new(config);
    session
        .generate(seed, args.grid_size, args.rooms)
        .context("dungeon generation failed")?;

    if let Some(report) = session.last_report() {
        println!(
            "Seed {}: {} of {} rooms{}",
            report.seed,
            report.placed,
            report.requested,
            if report.exhausted { " (grid exhausted)" } else { "" }
        );
    }

    if args.explore {
        let visited = explore(&mut session);
        println!("Explored {} rooms", visited);
    }

    let minimap = session.minimap().context("no dungeon to display")?;
    print!("{}", minimap.render_ascii());

    if args.json {
        println!("{}", minimap.to_json()?);
    }

    Ok(())
}

/// Breadth-first walk from the start room, clearing every room on entry
fn explore(session: &mut DungeonSession) -> usize {
    let Some(start) = session.current_coord() else {
        return 0;
    };
    let mut queue: VecDeque<GridCoordinate> = VecDeque::from([start]);
    let mut seen = vec![start];

    while let Some(coord) = queue.pop_front() {
        session.clear_room(coord);
        for direction in Direction::ALL {
            let Ok(hop) = session.traverse_door(coord, direction) else {
                continue;
            };
            session.clear_room(hop.to);
            if !seen.contains(&hop.to) {
                seen.push(hop.to);
                queue.push_back(hop.to);
            }
        }
    }

    for event in session.drain_events() {
        if let RoomEvent::BossDefeated { coord } = event {
            log::info!("Boss at {} defeated", coord);
        }
    }
    seen.len()
}
