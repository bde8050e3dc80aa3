//! `sketchroom` — drives a drawing session from JSON lines.
//!
//! Each stdin line is one [`CycleInput`]; a blank line is a plain re-render.
//! Each cycle's report is written to stdout as one JSON line. Logs go to
//! stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sketchroom::config::{ConfigError, SessionConfig, load_catalog_file};
use sketchroom::db;
use sketchroom::services::audio::{AudioSink, ChannelAudioSink, NullAudioSink, spawn_logging_player};
use sketchroom::services::chat::MessageLog;
use sketchroom::session::{CycleInput, Session};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const AUDIO_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("chat store error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sketchroom", about = "Drawing session engine driven by JSON lines on stdin")]
struct Cli {
    /// Chat store URL; overrides `SKETCHROOM_DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,

    /// YAML catalog with challenges, palettes, and music.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Drop all audio requests instead of handing them to the player.
    #[arg(long)]
    quiet_audio: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "sketchroom failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = SessionConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(path) = cli.catalog {
        config.apply_catalog(load_catalog_file(&path)?);
        config = config.validate()?;
    }

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;

    let (audio, player) = if cli.quiet_audio {
        let sink: Arc<dyn AudioSink> = Arc::new(NullAudioSink);
        (sink, None)
    } else {
        let (tx, rx) = mpsc::channel(AUDIO_QUEUE_CAPACITY);
        let sink: Arc<dyn AudioSink> = Arc::new(ChannelAudioSink::new(tx));
        (sink, Some(spawn_logging_player(rx)))
    };

    let mut session = Session::new(&config, MessageLog::new(pool), audio);
    info!(session_id = %session.id(), database_url = %config.database_url, "session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let input = if line.trim().is_empty() {
            CycleInput::default()
        } else {
            match serde_json::from_str::<CycleInput>(&line) {
                Ok(input) => input,
                Err(e) => {
                    warn!(error = %e, "skipping malformed cycle input");
                    continue;
                }
            }
        };

        let report = session.run_cycle(input, OffsetDateTime::now_utc()).await;
        let mut encoded = serde_json::to_vec(&report)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    info!(session_id = %session.id(), "input closed; shutting down");
    drop(session);

    if let Some(player) = player {
        if let Err(e) = player.await {
            warn!(error = %e, "audio player task ended abnormally");
        }
    }

    Ok(())
}
