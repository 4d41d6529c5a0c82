//! Frontend UI packages.
//!
//! A package chunk carries an opaque `.fng` blob. Uncompressed packages
//! embed their own file name 40 bytes in; compressed ones only carry a hash,
//! so those fall back to the name table or a hex name.

use bunkit_core::cursor::ByteReader;
use bunkit_core::hash::binary_upper_hash;
use tracing::info;

use crate::chunk::ChunkView;
use crate::error::BundleError;
use crate::names::NameTable;
use crate::output::Filestore;

const PACKAGE_MAGIC: u32 = 0xE76E_4546; // "FEn."
const PACKAGE_HEADER_MAGIC: u32 = 0x6448_6B50; // "PkHd"
const NAME_OFFSET: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendPackage {
    pub name: String,
    pub name_hash: u32,
    pub data: Vec<u8>,
}

/// The file name a package embeds in its own header, if it has one.
pub fn embedded_name(payload: &[u8]) -> Result<Option<String>, BundleError> {
    let mut reader = ByteReader::new(payload);
    let magic = reader.u32_le()?;
    if (magic == PACKAGE_MAGIC || magic == PACKAGE_HEADER_MAGIC || magic >= 0x20000)
        && payload.len() > NAME_OFFSET
    {
        reader.seek(NAME_OFFSET)?;
        let name = reader.cstring(payload.len() - NAME_OFFSET)?;
        if !name.is_empty() {
            return Ok(Some(name));
        }
    }
    Ok(None)
}

/// Decodes an uncompressed or compressed package chunk and stores its blob
/// under `ui/`.
pub fn process(
    view: &ChunkView<'_>,
    compressed: bool,
    names: &NameTable,
    filestore: &mut impl Filestore,
) -> Result<FrontendPackage, BundleError> {
    let payload = view.payload();

    let package = if compressed {
        // The compressed form has no readable header, only the name hash in
        // front of the stream.
        let mut reader = ByteReader::new(payload);
        reader.seek(4)?;
        let name_hash = reader.u32_le()?;
        FrontendPackage {
            name: names.name_or_hash(name_hash, "package"),
            name_hash,
            data: payload.to_vec(),
        }
    } else {
        match embedded_name(payload)? {
            Some(name) => {
                let name_hash = binary_upper_hash(&name);
                FrontendPackage {
                    name,
                    name_hash,
                    data: payload.to_vec(),
                }
            }
            None => {
                let mut reader = ByteReader::new(payload);
                reader.seek(4)?;
                let name_hash = reader.u32_le()?;
                FrontendPackage {
                    name: names.name_or_hash(name_hash, "package"),
                    name_hash,
                    data: payload.to_vec(),
                }
            }
        }
    };

    info!(
        name = %package.name,
        hash = format_args!("{:08x}", package.name_hash),
        size = package.data.len(),
        "found frontend package"
    );
    filestore.store(&format!("ui/{}", package.name), &package.data)?;
    Ok(package)
}
