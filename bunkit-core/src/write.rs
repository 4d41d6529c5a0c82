use std::io::{Cursor, Write};

use anyhow::Context;

#[derive(Debug, Clone, Copy)]
pub struct Serializer<W> {
    stream: W,
}

impl<W> Serializer<W> {
    pub fn new(writer: W) -> Self {
        Self { stream: writer }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()>
    where
        W: Write,
    {
        self.stream.write_all(bytes)?;
        Ok(())
    }
}

pub trait Serialize: Sized {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> anyhow::Result<()>;
}

macro_rules! serialize_primitive_le {
    ($T:ty) => {
        impl Serialize for $T {
            fn serialize(&self, serializer: &mut Serializer<impl Write>) -> anyhow::Result<()> {
                serializer.write_bytes(&self.to_le_bytes())?;
                Ok(())
            }
        }
    };
}

serialize_primitive_le!(u8);
serialize_primitive_le!(u16);
serialize_primitive_le!(u32);
serialize_primitive_le!(u64);

serialize_primitive_le!(i8);
serialize_primitive_le!(i16);
serialize_primitive_le!(i32);
serialize_primitive_le!(i64);

serialize_primitive_le!(f32);
serialize_primitive_le!(f64);

impl<const N: usize> Serialize for [u8; N] {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> anyhow::Result<()> {
        serializer.write_bytes(self)
    }
}

impl<const N: usize> Serialize for [u32; N] {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> anyhow::Result<()> {
        for (i, value) in self.iter().enumerate() {
            value
                .serialize(serializer)
                .with_context(|| format!("cannot serialize array element at index {i}"))?;
        }
        Ok(())
    }
}

pub fn serialize(value: &impl Serialize) -> anyhow::Result<Vec<u8>> {
    let mut buffer = vec![];
    value.serialize(&mut Serializer::new(Cursor::new(&mut buffer)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_serialize_little_endian() {
        assert_eq!(serialize(&0x11223344u32).unwrap(), [0x44, 0x33, 0x22, 0x11]);
        assert_eq!(serialize(&-1i16).unwrap(), [0xFF, 0xFF]);
    }

    #[test]
    fn byte_arrays_serialize_verbatim() {
        assert_eq!(serialize(b"DDS ").unwrap(), b"DDS ");
    }
}
