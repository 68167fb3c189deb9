//! journey-manifest - scans the portfolio's project folders and writes the
//! manifest the front end loads at startup

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use journey_manifest::commands;
use journey_manifest::config::{self, Config, SitePaths};

#[derive(Parser)]
#[command(name = "journey-manifest")]
#[command(author, version, about = "Builds manifest.json for the web-dev-journey portfolio")]
struct Cli {
    /// Config file (defaults apply when it does not exist)
    #[arg(short, long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Override the public directory from the config
    #[arg(long, global = true)]
    public_dir: Option<String>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan project folders and rewrite the manifest (default)
    Build,

    /// Lint the written manifest
    Check {
        /// Strict mode (fail on warnings)
        #[arg(long)]
        strict: bool,
    },

    /// List manifest entries
    List {
        /// Only show entries in this section (normalized like the site does)
        #[arg(short, long)]
        section: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let site = || -> anyhow::Result<(Config, SitePaths)> {
        let mut config = config::load_config(&cli.config)?;
        if let Some(public_dir) = &cli.public_dir {
            config.public_dir = public_dir.clone();
        }
        let paths = SitePaths::from_config(&config, &std::env::current_dir()?);
        Ok((config, paths))
    };

    match cli.command.as_ref().unwrap_or(&Commands::Build) {
        Commands::Init => {
            commands::init(&cli.config)?;
        }
        Commands::Build => {
            let (config, paths) = site()?;
            commands::build(&paths, &config)?;
        }
        Commands::Check { strict } => {
            let (_, paths) = site()?;
            commands::check(&paths, *strict)?;
        }
        Commands::List { section, json } => {
            let (_, paths) = site()?;
            let format = if *json {
                commands::OutputFormat::Json
            } else {
                commands::OutputFormat::Table
            };
            commands::list(&paths, section.as_deref(), format)?;
        }
    }

    Ok(())
}
