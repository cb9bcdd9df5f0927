use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use generals::RandomPolicy;
use generals_bot_utils::{
    Outcome, ProcessTransport, Recorder, Session, SessionConfig, UserConfig,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// The id of the custom game to join
    game_id: String,

    /// Path to a JSON file containing "user_id" and "username"
    #[arg(short, long)]
    user_config: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// How often to signal readiness while waiting for the game to start
    #[arg(long, default_value_t = 5000)]
    force_start_interval_ms: u64,

    /// Record all events received from the server into this file
    #[arg(short, long)]
    record_events: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// The bridge to the game server and its arguments, e.g. `-- node bridge.js`
    #[arg(last = true, required = true)]
    bridge: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let (user, user_config_path) = match &args.user_config {
        Some(path) => match UserConfig::load(path) {
            Ok(user) => {
                info!("Using config {}.", path.display());
                if let Some(username) = &user.username {
                    info!("Playing as {}.", username);
                }
                (user, Some(path.clone()))
            }
            Err(err) => {
                warn!("Error reading from user_config {}: {:#}", path.display(), err);
                info!("Joining as Anonymous.");
                (UserConfig::anonymous(&mut rng), None)
            }
        },
        None => {
            info!("No user_config specified. Creating random user_id.");
            info!("Joining as Anonymous.");
            (UserConfig::anonymous(&mut rng), None)
        }
    };

    let config = SessionConfig {
        user_config_path,
        force_start_interval: Duration::from_millis(args.force_start_interval_ms),
        ..SessionConfig::new(args.game_id, user)
    };
    let mut session = Session::new(config, RandomPolicy::new(rng));
    if let Some(path) = args.record_events {
        session = session.with_recorder(Recorder::new(path)?);
    }

    let mut transport = ProcessTransport::spawn(&args.bridge[0], &args.bridge[1..])?;
    match session.run(&mut transport)? {
        Outcome::Won | Outcome::Lost => Ok(()),
        Outcome::Disconnected => anyhow::bail!("Disconnected from server"),
    }
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
