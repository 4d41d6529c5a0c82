//! Car catalog records.

use bunkit_core::cursor::ByteReader;
use tracing::{debug, info};

use crate::chunk::ChunkView;
use crate::error::BundleError;

pub const CAR_TYPE_RECORD_SIZE: usize = 208;

/// The leading, stable part of a 208-byte car record. The tail of the
/// record is tuning data this reader does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarTypeInfo {
    pub car_type_name: String,
    pub base_model_name: String,
    pub geometry_filename: String,
    pub manufacturer_name: String,
    pub car_type_name_hash: u32,
    pub usage_type: i32,
    pub default_base_paint: u32,
}

impl CarTypeInfo {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let start = reader.position();
        let info = Self {
            car_type_name: reader.cstring(16)?,
            base_model_name: reader.cstring(16)?,
            geometry_filename: reader.cstring(32)?,
            manufacturer_name: reader.cstring(16)?,
            car_type_name_hash: reader.u32_le()?,
            usage_type: reader.i32_le()?,
            default_base_paint: reader.u32_le()?,
        };
        reader.seek(start + CAR_TYPE_RECORD_SIZE)?;
        Ok(info)
    }
}

/// Decodes a car catalog chunk. Records follow 16-byte alignment padding.
pub fn process(view: &ChunkView<'_>) -> Result<Vec<CarTypeInfo>, BundleError> {
    let payload = view.aligned_payload(16)?;
    let count = payload.len() / CAR_TYPE_RECORD_SIZE;
    let mut reader = ByteReader::new(payload);
    let mut cars = Vec::with_capacity(count);
    for _ in 0..count {
        let car = CarTypeInfo::parse(&mut reader)?;
        debug!(name = %car.car_type_name, model = %car.base_model_name, "car type");
        cars.push(car);
    }
    info!(count = cars.len(), "decoded car catalog");
    Ok(cars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkIter;

    fn car_bytes(name: &str, hash: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; CAR_TYPE_RECORD_SIZE];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        bytes[16..16 + 6].copy_from_slice(b"COUPE\0");
        bytes[32..32 + 12].copy_from_slice(b"CARS\\240.GEO");
        bytes[64..64 + 5].copy_from_slice(b"ACME\0");
        bytes[80..84].copy_from_slice(&hash.to_le_bytes());
        bytes[84..88].copy_from_slice(&1i32.to_le_bytes());
        bytes[88..92].copy_from_slice(&0x00FF_2200u32.to_le_bytes());
        bytes
    }

    #[test]
    fn decodes_fixed_size_records() {
        let mut payload = vec![0u8; 8];
        payload.extend(car_bytes("240ZG", 0xCAFE));
        payload.extend(car_bytes("GTR", 0xBEEF));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::kind::id::CAR_TYPE_INFOS.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);

        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        let cars = process(&view).unwrap();
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[0].car_type_name, "240ZG");
        assert_eq!(cars[0].geometry_filename, "CARS\\240.GEO");
        assert_eq!(cars[0].car_type_name_hash, 0xCAFE);
        assert_eq!(cars[1].car_type_name, "GTR");
        assert_eq!(cars[1].manufacturer_name, "ACME");
    }
}
