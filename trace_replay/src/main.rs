use std::path::PathBuf;

use clap::Parser;
use generals::format_grid;
use generals_bot_utils::load_trace;
use trace_replay::{replay, VisibilityRegression};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Path to a trace recorded with `random_bot --record-events`
    trace: PathBuf,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let events = load_trace(&args.trace)?;
    info!(num_events = events.len(), "Loaded trace");
    let summary = replay(&events)?;

    for regression in &summary.regressions {
        match regression {
            VisibilityRegression::CityVanished { update, tile } => {
                warn!(update, tile, "City disappeared from view")
            }
            VisibilityRegression::GeneralVanished {
                update,
                player,
                tile,
            } => warn!(update, player, tile, "General disappeared from view"),
        }
    }
    if let Some(state) = &summary.final_state {
        if let Some(grid) = format_grid(state.terrain(), state.width(), true) {
            debug!("Final terrain:\n{}", grid);
        }
    }

    let ending = match &summary.ending {
        Some(event) => format!("{:?}", event),
        None => String::from("none"),
    };
    println!(
        "Replayed {} updates\n- {} visibility regressions\n- ending: {}",
        summary.num_updates,
        summary.regressions.len(),
        ending
    );
    if let Some(state) = &summary.final_state {
        println!("- final map: {}x{}", state.width(), state.height());
        if let Some(player) = state.player_index() {
            println!("- tiles owned: {}", state.owned_tiles(player).count());
        }
    }

    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
