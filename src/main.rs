// src/main.rs
//
// msgsplit — command line front end.
//
// CLI:
//   msgsplit [--config FILE] split [--ceiling N] [--nesting stack|innermost]
//                                  [--raw] [--separator S] [INPUT] [-o OUTPUT]
//   msgsplit [--config FILE] normalize [INPUT] [-o OUTPUT]
//   msgsplit encode N
//   msgsplit decode [--each] TEXT
//
// INPUT defaults to stdin, OUTPUT to stdout. Flags override the config file,
// which overrides built-in defaults. Logs go to stderr, filtered by RUST_LOG.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use msgsplit::{marker, Config, Nesting};

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize (unless --raw) and split into chunks
    Split {
        /// Maximum chunk length, in chars
        #[arg(long)]
        ceiling: Option<usize>,

        /// How many open tags to carry across a cut
        #[arg(long, value_enum)]
        nesting: Option<Nesting>,

        /// Input is already normalized markup
        #[arg(long, action = ArgAction::SetTrue)]
        raw: bool,

        /// Text written between chunks
        #[arg(long)]
        separator: Option<String>,

        /// Input file (default: stdin)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the normalized markup only
    Normalize {
        /// Input file (default: stdin)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode a number as an invisible marker
    Encode { value: u64 },
    /// Decode the invisible marker digits found in TEXT
    Decode {
        text: String,

        /// Print one value per run of marker chars instead of one overall
        #[arg(long, action = ArgAction::SetTrue)]
        each: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Split {
            ceiling,
            nesting,
            raw,
            separator,
            input,
            output,
        } => {
            // Precedence: explicit flags override the config file.
            if let Some(ceiling) = ceiling {
                config.ceiling = ceiling;
            }
            if let Some(nesting) = nesting {
                config.nesting = nesting;
            }
            if let Some(separator) = separator {
                config.separator = separator;
            }
            if raw {
                config.normalize = false;
            }
            config.validate().context("Invalid settings")?;

            let src = read_input(input.as_deref())?;
            let markup = if config.normalize {
                config.normalizer().run_bytes(&src)
            } else {
                String::from_utf8(src).context("Raw input is not valid UTF-8")?
            };

            let splitter = config.splitter()?;
            let chunks = splitter.split(&markup);
            info!(
                input_chars = markup.chars().count(),
                chunks = chunks.len(),
                ceiling = config.ceiling,
                "split done"
            );
            write_output(output.as_deref(), &chunks.join(&config.separator))?;
        }
        Command::Normalize { input, output } => {
            let src = read_input(input.as_deref())?;
            let markup = config.normalizer().run_bytes(&src);
            write_output(output.as_deref(), &markup)?;
        }
        Command::Encode { value } => {
            println!("{}", marker::encode(value));
        }
        Command::Decode { text, each } => {
            if each {
                for run in marker::find_sequences(&text) {
                    let value = marker::decode(run).context("Failed to decode marker")?;
                    println!("{value}");
                }
            } else {
                let value = marker::decode(&text).context("Failed to decode marker")?;
                println!("{value}");
            }
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read input: {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write output: {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}
