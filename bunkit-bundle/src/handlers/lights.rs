//! Scenery light packs.
//!
//! A light pack is a container of three leaf chunks: a pack header, an AABB
//! tree over the lights, and the light array itself. The header's counts
//! must match the decoded tables.

use bunkit_core::cursor::ByteReader;
use tracing::{debug, info};

use crate::chunk::ChunkView;
use crate::error::BundleError;
use crate::kind::id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightPackHeader {
    pub version: i32,
    pub scenery_section: i32,
    pub tree_node_count: i32,
    pub light_count: i32,
}

impl LightPackHeader {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        Ok(Self {
            version: reader.i32_le()?,
            scenery_section: reader.i32_le()?,
            tree_node_count: reader.i32_le()?,
            light_count: reader.i32_le()?,
        })
    }
}

pub const TREE_NODE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbNode {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub first_child: i32,
    pub child_count: i32,
}

impl AabbNode {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let mut min = [0f32; 3];
        let mut max = [0f32; 3];
        for value in &mut min {
            *value = reader.f32_le()?;
        }
        for value in &mut max {
            *value = reader.f32_le()?;
        }
        Ok(Self {
            min,
            max,
            first_child: reader.i32_le()?,
            child_count: reader.i32_le()?,
        })
    }
}

pub const LIGHT_RECORD_SIZE: usize = 96;

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name_hash: u32,
    pub usage: u8,
    pub shape: u8,
    pub state: u8,
    pub exclusion: u8,
    pub color: u32,
    pub position: [f32; 3],
    pub size: f32,
    pub direction: [f32; 3],
    pub intensity: f32,
    pub far_start: f32,
    pub far_end: f32,
    pub falloff: f32,
    pub scenery: i16,
    pub name: String,
}

impl Light {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let name_hash = reader.u32_le()?;
        let usage = reader.u8()?;
        let shape = reader.u8()?;
        let state = reader.u8()?;
        let exclusion = reader.u8()?;
        let color = reader.u32_le()?;
        let mut position = [0f32; 3];
        for value in &mut position {
            *value = reader.f32_le()?;
        }
        let size = reader.f32_le()?;
        let mut direction = [0f32; 3];
        for value in &mut direction {
            *value = reader.f32_le()?;
        }
        let intensity = reader.f32_le()?;
        let far_start = reader.f32_le()?;
        let far_end = reader.f32_le()?;
        let falloff = reader.f32_le()?;
        let scenery = reader.i16_le()?;
        reader.take(2)?;
        let name = reader.cstring(36)?;
        Ok(Self {
            name_hash,
            usage,
            shape,
            state,
            exclusion,
            color,
            position,
            size,
            direction,
            intensity,
            far_start,
            far_end,
            falloff,
            scenery,
            name,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LightPack {
    pub header: LightPackHeader,
    pub tree: Vec<AabbNode>,
    pub lights: Vec<Light>,
}

pub fn process(view: &ChunkView<'_>) -> Result<LightPack, BundleError> {
    let mut pack = LightPack::default();
    for child in view.children() {
        let child = child?;
        let mut reader = child.reader();
        match child.id() {
            id::LIGHT_PACK_HEADER => {
                pack.header = LightPackHeader::parse(&mut reader)?;
            }
            id::LIGHT_AABB_TREE => {
                let count = child.payload().len() / TREE_NODE_SIZE;
                pack.tree.reserve(count);
                for _ in 0..count {
                    pack.tree.push(AabbNode::parse(&mut reader)?);
                }
            }
            id::LIGHT_ARRAY => {
                let count = child.payload().len() / LIGHT_RECORD_SIZE;
                pack.lights.reserve(count);
                for _ in 0..count {
                    let light = Light::parse(&mut reader)?;
                    debug!(name = %light.name, "light");
                    pack.lights.push(light);
                }
            }
            other => {
                debug!(id = format_args!("{other:08X}"), "skipping chunk in light pack");
            }
        }
    }

    if pack.header.light_count as usize != pack.lights.len() {
        return Err(BundleError::InconsistentContainer {
            kind: "light pack",
            reason: format!(
                "header names {} lights but the array holds {}",
                pack.header.light_count,
                pack.lights.len()
            ),
        });
    }

    info!(
        lights = pack.lights.len(),
        nodes = pack.tree.len(),
        section = pack.header.scenery_section,
        "decoded light pack"
    );
    Ok(pack)
}
