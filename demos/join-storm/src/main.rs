use std::path::PathBuf;

use clap::Parser;
use roomheap::prelude::*;

/// Fire a burst of concurrent joins at a fixed pool of rooms.
#[derive(Parser)]
#[command(name = "join-storm")]
struct Cli {
    /// JSON file with a full `StormConfig`; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of rooms.
    #[arg(long)]
    rooms: Option<usize>,

    /// Capacity of every room.
    #[arg(long)]
    capacity: Option<usize>,

    /// Number of players to generate.
    #[arg(long)]
    players: Option<usize>,

    /// Upper bound of the random delay before each join, in milliseconds.
    #[arg(long)]
    max_delay_ms: Option<u64>,

    /// Print the final report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn storm_config(&self) -> Result<StormConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_slice(&std::fs::read(path)?)?,
            None => StormConfig::default(),
        };
        if let Some(rooms) = self.rooms {
            config.room_count = rooms;
        }
        if let Some(capacity) = self.capacity {
            config.room_capacity = capacity;
        }
        if let Some(players) = self.players {
            config.player_count = players;
        }
        if let Some(ms) = self.max_delay_ms {
            config.max_join_delay_ms = ms;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");

    let cli = Cli::parse();
    let report = run_join_storm(cli.storm_config()?).await?;

    if cli.json {
        let bytes = JsonCodec.encode(&report)?;
        println!("{}", String::from_utf8_lossy(&bytes));
        return Ok(());
    }

    println!("placed {} / declined {} in {} ms", report.allocated, report.declined, report.elapsed_ms);
    for room in &report.rooms {
        println!(
            "  {}  {:>2}/{:<2}  score {:>6.2}  {}",
            room.id,
            room.player_count(),
            room.capacity,
            room.score,
            room.state
        );
    }
    for drain in &report.drain {
        println!("  {}: {} frames, {} drained", drain.name, drain.frames, drain.drained);
    }
    Ok(())
}
