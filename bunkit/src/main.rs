mod bundump;
mod extract;

use std::path::PathBuf;

use bundump::{bundump, Bundump};
use bunkit_bundle::Platform;
use clap::{Parser, Subcommand};
use extract::extract;
use tracing::{error, info, metadata::LevelFilter};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Subcommand)]
enum Command {
    /// Read data from a bundle.
    ///
    /// Bundles include .BUN and .BIN files as well as the compressed
    /// variants of both; compressed bundles are inflated transparently.
    Bundump {
        /// Bundle to read from.
        filename: PathBuf,

        /// Which part to dump into stdout.
        #[clap(subcommand)]
        what: Bundump,
    },

    /// Extract the resources of a bundle file, or of every bundle under a
    /// directory, into an output directory.
    Extract {
        /// Bundle file or directory of bundles.
        path: PathBuf,

        /// Key list used to resolve resource name hashes (one identifier
        /// per line).
        #[clap(long)]
        keys: Option<PathBuf>,

        /// Directory extracted resources are written to.
        #[clap(long, default_value = "extracted")]
        output: PathBuf,

        /// Decode platform payloads as little-endian PC data instead of
        /// Xenon.
        #[clap(long)]
        pc: bool,
    },
}

#[derive(Parser)]
struct Args {
    /// Tool to run.
    #[clap(subcommand)]
    command: Command,
}

fn fallible_main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Bundump { filename, what } => bundump(&filename, what)?,
        Command::Extract {
            path,
            keys,
            output,
            pc,
        } => {
            let platform = if pc { Platform::Pc } else { Platform::Xenon };
            extract(&path, keys.as_deref(), &output, platform)?;
        }
    }

    Ok(())
}

fn main() {
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().without_time());
    tracing::subscriber::set_global_default(subscriber)
        .expect("cannot set default tracing subscriber");

    info!("Bundle toolkit version {}", env!("CARGO_PKG_VERSION"));

    match fallible_main() {
        Ok(_) => (),
        Err(err) => {
            error!("in fallible_main: {err:?}");
        }
    }
}
