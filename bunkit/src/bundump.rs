use std::{fs, path::Path};

use anyhow::Context;
use bunkit_bundle::chunk::ChunkIter;
use bunkit_bundle::jdlz;
use bunkit_bundle::kind;
use clap::Subcommand;
use tracing::{debug, info};

#[derive(Clone, Subcommand)]
pub enum Bundump {
    /// Dump the chunk tree: ids, names, sizes, and file offsets.
    Chunks,

    /// Decompress the bundle and write the raw chunk stream next to it (or
    /// to --output). Used for diagnosing problems with decompression.
    Decompress {
        /// File the decompressed stream is written to.
        #[clap(long)]
        output: Option<std::path::PathBuf>,
    },
}

pub fn bundump(filename: &Path, dump: Bundump) -> anyhow::Result<()> {
    info!(?filename, "Opening bundle");
    let bytes = fs::read(filename)
        .with_context(|| format!("cannot read bundle {filename:?}"))?;

    match dump {
        Bundump::Chunks => {
            let bytes = if jdlz::is_jdlz(&bytes) {
                debug!("Inflating compressed bundle");
                jdlz::decompress(&bytes).context("cannot decompress bundle")?
            } else {
                bytes
            };
            list_chunks(&bytes, 0, 0)?;
        }
        Bundump::Decompress { output } => {
            let inflated = jdlz::decompress(&bytes)
                .context("bundle is not a compressed stream")?;
            let output =
                output.unwrap_or_else(|| filename.with_extension("raw"));
            info!(?output, size = inflated.len(), "Writing decompressed stream");
            fs::write(&output, inflated)
                .with_context(|| format!("cannot write {output:?}"))?;
        }
    }

    Ok(())
}

fn list_chunks(bytes: &[u8], base: usize, depth: usize) -> anyhow::Result<()> {
    for view in ChunkIter::new(bytes, base) {
        let view = view.context("cannot read chunk stream")?;
        let name = kind::chunk_name(view.id()).unwrap_or("?");
        println!(
            "{:indent$}{:08X} {name:<20} {:8} bytes @ {:08x}",
            "",
            view.id(),
            view.payload().len(),
            view.payload_offset(),
            indent = depth * 2,
        );
        if kind::is_container(view.id()) {
            list_chunks(view.payload(), view.payload_offset(), depth + 1)?;
        }
    }
    Ok(())
}
