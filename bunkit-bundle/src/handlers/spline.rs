//! Track splines.

use bunkit_core::cursor::ByteReader;
use tracing::info;

use crate::chunk::ChunkView;
use crate::error::BundleError;

/// How the curve behaves past its last control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPointType {
    Loop,
    Line,
    Extrapolated,
}

impl EndPointType {
    fn from_i32(value: i32) -> Result<Self, BundleError> {
        match value {
            0 => Ok(Self::Loop),
            1 => Ok(Self::Line),
            2 => Ok(Self::Extrapolated),
            other => Err(BundleError::MalformedChunk(format!(
                "unknown spline end point type {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisType {
    Overhauser,
}

impl BasisType {
    fn from_i32(value: i32) -> Result<Self, BundleError> {
        match value {
            0 => Ok(Self::Overhauser),
            other => Err(BundleError::MalformedChunk(format!(
                "unknown spline basis type {other}"
            ))),
        }
    }
}

/// The spline record, 16 bytes into the first child chunk's payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spline {
    pub name_hash: u32,
    pub end_point_type: EndPointType,
    pub basis_type: BasisType,
    pub max_param: f32,
    pub min_param: f32,
    pub length: f32,
    pub max_control_points: u16,
    pub control_point_count: u16,
}

const RECORD_OFFSET: usize = 16;

impl Spline {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        reader.seek(RECORD_OFFSET)?;
        let name_hash = reader.u32_le()?;
        let end_point_type = EndPointType::from_i32(reader.i32_le()?)?;
        let basis_type = BasisType::from_i32(reader.i32_le()?)?;
        let max_param = reader.f32_le()?;
        let min_param = reader.f32_le()?;
        let length = reader.f32_le()?;
        // Runtime state bytes (dirty/allocated/min) precede the counts.
        reader.take(4)?;
        let max_control_points = reader.u16_le()?;
        let control_point_count = reader.u16_le()?;
        Ok(Self {
            name_hash,
            end_point_type,
            basis_type,
            max_param,
            min_param,
            length,
            max_control_points,
            control_point_count,
        })
    }
}

/// Reads the spline record out of the container's first child.
pub fn process(view: &ChunkView<'_>) -> Result<Spline, BundleError> {
    let first = view.children().next().ok_or_else(|| {
        BundleError::MalformedChunk("spline container has no record chunk".to_string())
    })??;
    let spline = Spline::parse(&mut first.reader())?;
    info!(
        hash = format_args!("{:08x}", spline.name_hash),
        length = spline.length,
        points = spline.control_point_count,
        "found spline"
    );
    Ok(spline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkIter;

    fn spline_container() -> Vec<u8> {
        let mut record = vec![0u8; RECORD_OFFSET];
        record.extend_from_slice(&0x1122_3344u32.to_le_bytes());
        record.extend_from_slice(&1i32.to_le_bytes()); // line
        record.extend_from_slice(&0i32.to_le_bytes()); // overhauser
        record.extend_from_slice(&8.0f32.to_le_bytes());
        record.extend_from_slice(&0.0f32.to_le_bytes());
        record.extend_from_slice(&412.5f32.to_le_bytes());
        record.extend_from_slice(&[1, 0, 2, 0]);
        record.extend_from_slice(&64u16.to_le_bytes());
        record.extend_from_slice(&9u16.to_le_bytes());

        let mut inner = Vec::new();
        inner.extend_from_slice(&0x0003_B001u32.to_le_bytes());
        inner.extend_from_slice(&(record.len() as u32).to_le_bytes());
        inner.extend_from_slice(&record);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::kind::id::QUICK_SPLINE.to_le_bytes());
        bytes.extend_from_slice(&(inner.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&inner);
        bytes
    }

    #[test]
    fn parses_the_record() {
        let bytes = spline_container();
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        let spline = process(&view).unwrap();
        assert_eq!(spline.name_hash, 0x1122_3344);
        assert_eq!(spline.end_point_type, EndPointType::Line);
        assert_eq!(spline.basis_type, BasisType::Overhauser);
        assert_eq!(spline.length, 412.5);
        assert_eq!(spline.max_control_points, 64);
        assert_eq!(spline.control_point_count, 9);
    }

    #[test]
    fn empty_container_fails() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::kind::id::QUICK_SPLINE.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        assert!(matches!(
            process(&view),
            Err(BundleError::MalformedChunk(_))
        ));
    }

    #[test]
    fn unknown_end_point_type_fails() {
        let mut bytes = spline_container();
        // The record starts 16 bytes into the inner chunk's payload; the end
        // point type is the second field.
        let type_offset = 8 + 8 + RECORD_OFFSET + 4;
        bytes[type_offset..type_offset + 4].copy_from_slice(&9i32.to_le_bytes());
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        assert!(matches!(
            process(&view),
            Err(BundleError::MalformedChunk(_))
        ));
    }
}
