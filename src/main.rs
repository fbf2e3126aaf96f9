//! Autosize Comments CLI
//!
//! Usage:
//!   asc [OPTIONS] [SCENE]
//!
//! Options:
//!   -s, --settings <FILE>  Engine settings (TOML format)
//!   -o, --output <FILE>    Write the settled scene instead of printing the report
//!   --ticks <N>            Maximum number of ticks to settle for
//!   -v, --verbose          Log engine activity to stderr (repeat for more)
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use autosize_comments::{settle_scene, Scene, Settings};

#[derive(Parser)]
#[command(name = "asc")]
#[command(about = "Fit comment regions in a node graph scene around their members")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    scene: Option<PathBuf>,

    /// Settings file (TOML format)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Write the settled scene to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of ticks before giving up on settling
    #[arg(long, default_value_t = 64)]
    ticks: usize,

    /// Log engine activity to stderr
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load settings
    let settings = match &cli.settings {
        Some(path) => match Settings::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading settings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    // Read scene
    let source = match &cli.scene {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let scene = match Scene::from_toml(&source, &settings) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let (graph, _engine, report) = settle_scene(scene, settings, cli.ticks);

    match &cli.output {
        Some(path) => {
            if let Err(e) = Scene::from_host(&graph).save(path) {
                eprintln!("Error writing scene '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => print!("{}", report),
    }
}
