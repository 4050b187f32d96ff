use anyhow::{Context, Result};
use apexsim_arcade::{
    config::{GameConfig, LoggingSettings},
    data::{InputState, SKY},
    game::Game,
    raster::FrameBuffer,
    terminal::{TerminalHost, DEFAULT_KEY_HOLD_MS},
};
use clap::Parser;
use std::time::Instant;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "./apexsim-arcade.toml")]
    config: String,

    /// Override log level (trace|debug|info|warn|error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Track seed; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run without a terminal, holding the throttle
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 3600)]
    frames: u64,
}

fn env_filter(level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
}

/// Load the config before the real subscriber exists, since its logging
/// section picks the log file. Fallback warnings go to stderr.
fn load_config(args: &Args) -> GameConfig {
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter(args.log_level.as_deref().unwrap_or("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, || GameConfig::load_or_default(&args.config))
}

fn init_tracing(args: &Args, logging: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let log_level = args.log_level.as_deref().unwrap_or(&logging.level);
    let filter = env_filter(log_level);

    if args.headless {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    // The terminal belongs to the game, so logs go to a file
    let appender = tracing_appender::rolling::never(".", &logging.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn run_headless(game: &mut Game, frames: u64) {
    let config = game.config().clone();
    let frame_ms = 1000.0 / config.screen.target_fps as f64;
    let mut surface = FrameBuffer::new(160, 120, config.screen.width, config.screen.height, SKY);
    let input = InputState::accelerate();
    let mut hits = 0u32;

    for frame in 0..frames {
        let report = game.update(frame_ms, &input, &mut surface);
        if report.hit {
            hits += 1;
        }
        if frame % config.screen.target_fps as u64 == 0 {
            debug!(
                frame,
                camera_z = game.player().camera_z,
                speed = game.player().speed,
                segments = report.render.segments_drawn,
                objects = report.render.objects_visible,
                "Headless progress"
            );
        }
        if game.is_game_over() {
            info!(frame, "Headless run ended in game over");
            break;
        }
    }

    info!(
        frames = game.frame(),
        distance = game.player().camera_z,
        score = game.score(),
        lives = game.lives(),
        hits,
        "Headless run complete"
    );
}

async fn run_terminal(game: &mut Game) -> Result<()> {
    let config = game.config().clone();
    let mut host = TerminalHost::new(
        config.screen.width,
        config.screen.height,
        Duration::from_millis(DEFAULT_KEY_HOLD_MS),
    )
    .context("Failed to initialise terminal")?;

    let mut ticker = interval(Duration::from_secs_f64(1.0 / config.screen.target_fps as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        host.poll_events()?;
        if host.quit_requested() {
            break;
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        let input = host.input();
        game.update(elapsed_ms, &input, host.surface());
        host.present(game)?;
    }

    info!(score = game.score(), frames = game.frame(), "Player quit");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args);
    let _guard = init_tracing(&args, &config.logging)?;

    info!("Starting ApexSim Arcade v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", args.config);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, draw_distance = config.track.draw_distance, "Creating game");
    let mut game = Game::new(config, seed);

    if args.headless {
        run_headless(&mut game, args.frames);
        Ok(())
    } else {
        run_terminal(&mut game).await
    }
}
