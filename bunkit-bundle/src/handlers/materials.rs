//! Shader material tables.

use bunkit_core::cursor::ByteReader;
use tracing::{debug, info};

use crate::chunk::ChunkView;
use crate::error::BundleError;

pub const MATERIAL_RECORD_SIZE: usize = 140;

/// One fixed-size material record: identity plus a 4x4 coefficient block
/// consumed by the shader constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub version: i32,
    pub name: String,
    pub name_hash: u32,
    pub class_hash: u32,
    pub coefficients: [f32; 16],
}

impl Material {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let version = reader.i32_le()?;
        let name = reader.cstring(64)?;
        let name_hash = reader.u32_le()?;
        let class_hash = reader.u32_le()?;
        let mut coefficients = [0f32; 16];
        for coefficient in &mut coefficients {
            *coefficient = reader.f32_le()?;
        }
        Ok(Self {
            version,
            name,
            name_hash,
            class_hash,
            coefficients,
        })
    }
}

/// Decodes a material table chunk. The payload is padded to a 16-byte file
/// offset in front of the records.
pub fn process(view: &ChunkView<'_>) -> Result<Vec<Material>, BundleError> {
    let payload = view.aligned_payload(16)?;
    let count = payload.len() / MATERIAL_RECORD_SIZE;
    let mut reader = ByteReader::new(payload);
    let mut materials = Vec::with_capacity(count);
    for _ in 0..count {
        let material = Material::parse(&mut reader)?;
        debug!(name = %material.name, hash = format_args!("{:08x}", material.name_hash), "material");
        materials.push(material);
    }
    info!(count = materials.len(), "decoded material table");
    Ok(materials)
}
