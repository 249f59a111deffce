use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use vocadrill::app::{App, Flow};
use vocadrill::config::Config;
use vocadrill::engine::manifest::Manifest;
use vocadrill::session::pool::Policy;
use vocadrill::session::quiz::Mode;
use vocadrill::store::json_store::JsonStore;

#[derive(Parser)]
#[command(name = "vocadrill", version, about = "Terminal vocabulary drill")]
struct Cli {
    #[arg(help = "Word books to drill instead of the manifest entries")]
    sources: Vec<String>,

    #[arg(short, long, help = "Manifest listing one word book per line")]
    manifest: Option<String>,

    #[arg(short = 'n', long, help = "Max number of words per run")]
    max_attempts: Option<usize>,

    #[arg(short, long, value_parser = parse_policy, help = "Draw order (random, sequential)")]
    policy: Option<Policy>,

    #[arg(long, value_parser = parse_mode, help = "Quiz mode (spell, recognize)")]
    mode: Option<Mode>,

    #[arg(long, help = "Seed for reproducible random draws")]
    seed: Option<u64>,

    #[arg(long, help = "Do not record this run in the session history")]
    no_history: bool,

    #[arg(long, help = "Write the effective config file and continue")]
    init_config: bool,
}

fn parse_policy(s: &str) -> Result<Policy, String> {
    match s.to_ascii_lowercase().as_str() {
        "random" | "rand" => Ok(Policy::Random),
        "sequential" | "order" => Ok(Policy::Sequential),
        _ => Err(format!("unknown policy: {s}")),
    }
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_name(s).ok_or_else(|| format!("unknown mode: {s}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("vocadrill=info".parse()?),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(manifest) = cli.manifest {
        config.manifest = manifest;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if cli.no_history {
        config.history_enabled = false;
    }
    config.normalize();

    if cli.init_config {
        config.save()?;
    }

    let manifest = if cli.sources.is_empty() {
        Manifest::File(PathBuf::from(&config.manifest))
    } else {
        Manifest::Inline(cli.sources)
    };
    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let store = if config.history_enabled {
        JsonStore::new().ok()
    } else {
        None
    };

    let mut stdout = io::stdout();
    writeln!(stdout, "quiz starting...")?;
    let mut app = match App::start(config, manifest, rng, store) {
        Ok(app) => app,
        Err(err) => {
            // No session can run without word books; the exit status stays 0.
            eprintln!("Error: {err}");
            return Ok(());
        }
    };
    writeln!(stdout, "test set built ({})", app.session.pool().len())?;
    app.write_prompt(&mut stdout)?;

    if !app.session.is_finished() {
        run_console(&mut app, &mut stdout)?;
    }

    app.finish(&mut stdout)?;
    Ok(())
}

/// Blocking read-evaluate loop. End of input counts as quit.
fn run_console(app: &mut App, out: &mut impl Write) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if app.handle_line(&line, out)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
