mod config;
mod output;
mod service;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::output::Format;
use crate::service::{CheckService, ReadmeMode};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "skillcheck", version)]
#[command(about = "Validate and index skill documents")]
struct Cli {
    /// Config file (defaults to ./skillcheck.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check documents against the front-matter and length rules
    Validate {
        /// Files or skill directories (defaults to the configured directories)
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },
    /// Build the skills index, optionally syncing it into the README
    Index {
        /// Skills directory (defaults to the configured directories)
        dir: Option<PathBuf>,

        /// README holding the index markers
        #[arg(long)]
        readme: Option<PathBuf>,

        /// Rewrite the README's index section
        #[arg(long, conflicts_with = "check")]
        write: bool,

        /// Fail if the README's index section is stale
        #[arg(long)]
        check: bool,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Create a new skill from a starter template
    New {
        /// Skill name (lowercase letters, digits, hyphens)
        name: String,

        /// What the skill does and when to use it
        #[arg(short, long)]
        description: String,

        /// Parent directory (defaults to the first configured directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    skillcheck_logging::init_logging(&config.logging.level, config.logging.format)?;

    let service = CheckService::new(config)?;

    let success = match cli.command {
        Commands::Validate {
            paths,
            format,
            strict,
        } => {
            let run = service.validate(&paths, strict)?;
            print!("{}", output::render_run(&run, format)?);
            run.succeeded()
        }
        Commands::Index {
            dir,
            readme,
            write,
            check,
            format,
        } => {
            let index = service.index(dir.as_deref(), readme.as_deref())?;
            let mode = match (write, check) {
                (true, _) => Some(ReadmeMode::Write),
                (false, true) => Some(ReadmeMode::Check),
                (false, false) => None,
            };

            match mode {
                None => {
                    print!("{}", output::render_index(&index, format)?);
                    true
                }
                Some(mode) => {
                    let up_to_date = service.sync_readme(&index, readme.as_deref(), mode)?;
                    match (mode, up_to_date) {
                        (ReadmeMode::Check, false) => {
                            eprintln!("skills index is out of date; run `skillcheck index --write`");
                            false
                        }
                        (ReadmeMode::Write, false) => {
                            println!("updated skills index ({} entries)", index.len());
                            true
                        }
                        (_, true) => true,
                    }
                }
            }
        }
        Commands::New {
            name,
            description,
            dir,
        } => {
            let path = service.scaffold(&name, &description, dir.as_deref())?;
            println!("created {}", path.display());
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
