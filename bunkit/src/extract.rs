use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use anyhow::Context;
use bunkit_bundle::jdlz;
use bunkit_bundle::names::NameTable;
use bunkit_bundle::output::DirectoryFilestore;
use bunkit_bundle::walker::Walker;
use bunkit_bundle::Platform;
use tracing::{info, warn};
use walkdir::WalkDir;

pub fn extract(
    path: &Path,
    keys: Option<&Path>,
    output: &Path,
    platform: Platform,
) -> anyhow::Result<()> {
    let names = match keys {
        Some(keys) => {
            info!(?keys, "Loading key list");
            let table = NameTable::load_key_list(BufReader::new(
                File::open(keys).with_context(|| format!("cannot open key list {keys:?}"))?,
            ))?;
            info!(names = table.len(), "Key list loaded");
            table
        }
        None => {
            warn!("No key list given, resources are extracted with hash names only");
            NameTable::new()
        }
    };

    let mut store = DirectoryFilestore::new(output);

    if path.is_dir() {
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            // A directory walk keeps going past bundles that fail; the
            // remaining files may still be fine.
            if let Err(err) = extract_file(entry.path(), &names, &mut store, platform) {
                warn!("cannot extract {:?}: {err:?}", entry.path());
            }
        }
        Ok(())
    } else {
        extract_file(path, &names, &mut store, platform)
    }
}

fn extract_file(
    path: &Path,
    names: &NameTable,
    store: &mut DirectoryFilestore,
    platform: Platform,
) -> anyhow::Result<()> {
    info!(?path, "Processing bundle");
    let mut file = BufReader::new(
        File::open(path).with_context(|| format!("cannot open bundle {path:?}"))?,
    );

    let mut magic = [0u8; 4];
    let compressed = matches!(file.read(&mut magic), Ok(4)) && magic == jdlz::JDLZ_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    let mut walker = Walker::new(names, store, platform);
    if compressed {
        // Compressed bundles are inflated whole before walking; plain ones
        // are read a chunk at a time.
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("cannot read bundle {path:?}"))?;
        walker.walk_file(&bytes)
    } else {
        walker.walk_stream(&mut file)
    }
    .with_context(|| format!("cannot walk bundle {path:?}"))?;
    Ok(())
}
