use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use diorama::audio::LogAudio;
use diorama::gfx::scene::DirectorySceneSource;
use diorama::level::LevelCatalog;
use diorama::{GameSession, Intent, SessionConfig};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(about = "Play a scripted list of intents against a diorama level", version)]
struct Args {
    /// Level catalog (JSON array of levels)
    #[arg(long, value_name = "FILE", default_value = "assets/levels.json")]
    levels: PathBuf,

    /// Directory the level scene files are resolved against
    #[arg(long, value_name = "DIR", default_value = "assets")]
    scenes: PathBuf,

    /// Level id to play; defaults to the first level in the catalog
    #[arg(long)]
    level: Option<i64>,

    /// Optional session config overriding the built-in tunables
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON array of steps: intents, or `{ "wait": seconds }`
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Fixed simulation tick in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    tick: f32,

    /// Print a snapshot after every step instead of only at the end
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Wait { wait: f32 },
    Intent(Intent),
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalog = LevelCatalog::load(&args.levels)
        .with_context(|| format!("loading levels from {}", args.levels.display()))?;
    let level = match args.level {
        Some(id) => catalog.get(id),
        None => catalog.first(),
    }
    .cloned()
    .ok_or_else(|| anyhow!("level not found in {}", args.levels.display()))?;

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&script)
        .with_context(|| format!("parsing script {}", args.script.display()))?;

    let mut session = GameSession::new(
        level,
        Box::new(DirectorySceneSource::new(&args.scenes)),
        Box::new(LogAudio),
        config,
    );

    let tick = args.tick.max(1e-4);
    for step in steps {
        match step {
            Step::Wait { wait } => {
                let frames = (wait / tick).ceil() as usize;
                for _ in 0..frames {
                    session.update(tick);
                }
            }
            Step::Intent(intent) => {
                log::debug!("step {intent:?}");
                session.handle(intent);
                session.update(tick);
            }
        }
        if args.trace {
            println!("{}", serde_json::to_string(&session.snapshot())?);
        }
    }

    if !args.trace {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    }
    Ok(())
}
