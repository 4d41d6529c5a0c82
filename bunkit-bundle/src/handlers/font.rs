//! Bitmap font descriptors.

use bunkit_core::cursor::ByteReader;
use tracing::info;

use crate::chunk::ChunkView;
use crate::error::BundleError;
use crate::Platform;

const FONT_STATES: usize = 24;

/// The legacy font record embedded in a font chunk, after the two name
/// fields. Multi-byte fields are big-endian on Xenon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRecord {
    pub signature: [u8; 4],
    pub size: u32,
    pub version: u16,
    pub glyph_count: u16,
    pub flags: i32,
    pub center_x: i8,
    pub center_y: i8,
    pub ascent: u8,
    pub descent: u8,
    pub glyph_table: i32,
    pub kern_table: i32,
    pub shape: i32,
    pub states: [i32; FONT_STATES],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFont {
    pub name: String,
    pub texture_name: String,
    pub record: FontRecord,
}

impl EngineFont {
    pub fn height(&self) -> i32 {
        self.record.states[1]
    }

    pub fn parse(reader: &mut ByteReader<'_>, platform: Platform) -> Result<Self, BundleError> {
        let endian = platform.endian();
        let name = reader.cstring(256)?;
        let texture_name = reader.cstring(256)?;

        let signature: [u8; 4] = reader.take(4)?.try_into().unwrap_or_default();
        let size = reader.u32(endian)?;
        let version = reader.u16(endian)?;
        let glyph_count = reader.u16(endian)?;
        let flags = reader.i32(endian)?;
        let center_x = reader.i8()?;
        let center_y = reader.i8()?;
        let ascent = reader.u8()?;
        let descent = reader.u8()?;
        let glyph_table = reader.i32(endian)?;
        let kern_table = reader.i32(endian)?;
        let shape = reader.i32(endian)?;
        let mut states = [0i32; FONT_STATES];
        for state in &mut states {
            *state = reader.i32(endian)?;
        }

        Ok(Self {
            name,
            texture_name,
            record: FontRecord {
                signature,
                size,
                version,
                glyph_count,
                flags,
                center_x,
                center_y,
                ascent,
                descent,
                glyph_table,
                kern_table,
                shape,
                states,
            },
        })
    }
}

pub fn process(view: &ChunkView<'_>, platform: Platform) -> Result<EngineFont, BundleError> {
    let font = EngineFont::parse(&mut view.reader(), platform)?;
    info!(
        name = %font.name,
        texture = %font.texture_name,
        height = font.height(),
        "found font"
    );
    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkIter;

    fn font_chunk(platform: Platform) -> Vec<u8> {
        let mut payload = vec![0u8; 512];
        payload[0..9].copy_from_slice(b"MAIN_FONT");
        payload[256..265].copy_from_slice(b"FONT_TPK\0");

        let mut record = Vec::new();
        record.extend_from_slice(b"FNTF");
        let int = |v: u32| match platform {
            Platform::Xenon => v.to_be_bytes(),
            Platform::Pc => v.to_le_bytes(),
        };
        let short = |v: u16| match platform {
            Platform::Xenon => v.to_be_bytes(),
            Platform::Pc => v.to_le_bytes(),
        };
        record.extend_from_slice(&int(128)); // size
        record.extend_from_slice(&short(2)); // version
        record.extend_from_slice(&short(96)); // glyph count
        record.extend_from_slice(&int(0)); // flags
        record.extend_from_slice(&[0, 0, 14, 4]); // centers, ascent, descent
        record.extend_from_slice(&int(0)); // glyph table
        record.extend_from_slice(&int(0)); // kern table
        record.extend_from_slice(&int(0)); // shape
        for state in 0..24u32 {
            record.extend_from_slice(&int(state * 9));
        }
        payload.extend_from_slice(&record);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::kind::id::FE_FONT.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }

    #[test]
    fn parses_a_big_endian_font() {
        let bytes = font_chunk(Platform::Xenon);
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        let font = process(&view, Platform::Xenon).unwrap();
        assert_eq!(font.name, "MAIN_FONT");
        assert_eq!(font.texture_name, "FONT_TPK");
        assert_eq!(font.record.glyph_count, 96);
        assert_eq!(font.height(), 9);
    }

    #[test]
    fn parses_a_little_endian_font() {
        let bytes = font_chunk(Platform::Pc);
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        let font = process(&view, Platform::Pc).unwrap();
        assert_eq!(font.record.size, 128);
        assert_eq!(font.height(), 9);
    }

    #[test]
    fn truncated_font_fails() {
        let mut bytes = font_chunk(Platform::Xenon);
        bytes.truncate(200);
        bytes[4..8].copy_from_slice(&192u32.to_le_bytes());
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        assert!(matches!(
            process(&view, Platform::Xenon),
            Err(BundleError::MalformedChunk(_))
        ));
    }
}
