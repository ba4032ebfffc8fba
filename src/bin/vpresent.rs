//! Render the values of a snapshot file through the built-in presenters.
//!
//! ```bash
//! vpresent state.snap
//! vpresent state.snap --value s --strict --max-chars 40
//! RUST_LOG=trace vpresent state.snap
//! ```

use std::fs;
use std::path::PathBuf;

use bumpalo::Bump;
use clap::Parser;
use value_presenter::core::{render, DecodeMode, PresentOptions, DEFAULT_MAX_CHARS};
use value_presenter::presenters;
use value_presenter::snapshot::{Snapshot, SnapshotLoader};

/// Render snapshot values the way a debugger would display them
#[derive(Parser, Debug)]
#[command(name = "vpresent")]
#[command(version)]
struct Cli {
    /// Snapshot file to load
    snapshot: PathBuf,

    /// Only render these values (repeatable); defaults to all of them
    #[arg(long = "value")]
    values: Vec<String>,

    /// Stop decoding at the first invalid UTF-8 byte instead of substituting U+FFFD
    #[arg(long)]
    strict: bool,

    /// Maximum characters printed per string
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS, conflicts_with = "unlimited")]
    max_chars: usize,

    /// Print strings in full
    #[arg(long)]
    unlimited: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> PresentOptions {
        PresentOptions {
            mode: if self.strict {
                DecodeMode::Strict
            } else {
                DecodeMode::Lenient
            },
            max_chars: (!self.unlimited).then_some(self.max_chars),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let text = fs::read_to_string(&cli.snapshot)?;
    let arena = Bump::new();
    let snapshot = Snapshot::parse(&arena, &text)
        .map_err(|err| format!("{}: {err}", cli.snapshot.display()))?;

    let mut loader = SnapshotLoader::new(&snapshot);
    presenters::load::<Snapshot, _>(&mut loader)?;

    let options = cli.options();
    let selected: Vec<_> = if cli.values.is_empty() {
        snapshot.roots().collect()
    } else {
        cli.values
            .iter()
            .map(|name| {
                snapshot
                    .root(name)
                    .map(|value| (name.as_str(), value))
                    .ok_or_else(|| format!("no value named `{name}`"))
            })
            .collect::<Result<_, _>>()?
    };

    for (name, value) in selected {
        let rendered = render(loader.registries(), &snapshot, value, &options);
        println!("{name} = {}", rendered.text);
    }
    Ok(())
}
