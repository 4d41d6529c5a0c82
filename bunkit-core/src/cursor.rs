use std::fmt;

use thiserror::Error;

/// A read reached past the end of the backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("read of {wanted} bytes at offset {at:08x} is out of bounds (buffer is {len} bytes)")]
pub struct OutOfBounds {
    pub at: usize,
    pub wanted: usize,
    pub len: usize,
}

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Position-tracking reader over a borrowed byte slice.
///
/// Every access is range-checked; a failed read returns [`OutOfBounds`]
/// instead of touching memory past the slice. Slices returned by
/// [`ByteReader::take`] borrow from the backing buffer, so decoded values
/// that must outlive the read have to be copied out by the caller.
#[derive(Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    pub fn seek(&mut self, position: usize) -> Result<(), OutOfBounds> {
        if position > self.bytes.len() {
            return Err(OutOfBounds {
                at: position,
                wanted: 0,
                len: self.bytes.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Borrows the next `count` bytes and advances past them.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], OutOfBounds> {
        if count > self.remaining() {
            return Err(OutOfBounds {
                at: self.position,
                wanted: count,
                len: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, OutOfBounds> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8, OutOfBounds> {
        Ok(self.u8()? as i8)
    }

    pub fn u16(&mut self, endian: Endian) -> Result<u16, OutOfBounds> {
        let bytes: [u8; 2] = self.take(2)?.try_into().unwrap();
        Ok(match endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn u32(&mut self, endian: Endian) -> Result<u32, OutOfBounds> {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(match endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn u16_le(&mut self) -> Result<u16, OutOfBounds> {
        self.u16(Endian::Little)
    }

    pub fn u16_be(&mut self) -> Result<u16, OutOfBounds> {
        self.u16(Endian::Big)
    }

    pub fn u32_le(&mut self) -> Result<u32, OutOfBounds> {
        self.u32(Endian::Little)
    }

    pub fn u32_be(&mut self) -> Result<u32, OutOfBounds> {
        self.u32(Endian::Big)
    }

    pub fn i16(&mut self, endian: Endian) -> Result<i16, OutOfBounds> {
        Ok(self.u16(endian)? as i16)
    }

    pub fn i16_le(&mut self) -> Result<i16, OutOfBounds> {
        self.i16(Endian::Little)
    }

    pub fn i32(&mut self, endian: Endian) -> Result<i32, OutOfBounds> {
        Ok(self.u32(endian)? as i32)
    }

    pub fn i32_le(&mut self) -> Result<i32, OutOfBounds> {
        self.i32(Endian::Little)
    }

    pub fn i32_be(&mut self) -> Result<i32, OutOfBounds> {
        self.i32(Endian::Big)
    }

    pub fn f32(&mut self, endian: Endian) -> Result<f32, OutOfBounds> {
        Ok(f32::from_bits(self.u32(endian)?))
    }

    pub fn f32_le(&mut self) -> Result<f32, OutOfBounds> {
        self.f32(Endian::Little)
    }

    /// Reads a fixed-length, NUL-padded string field of `count` bytes.
    ///
    /// Everything from the first NUL onwards is discarded; bytes that are
    /// not valid UTF-8 are replaced rather than failing the read, since
    /// legacy name fields occasionally carry garbage past the terminator.
    pub fn cstring(&mut self, count: usize) -> Result<String, OutOfBounds> {
        let bytes = self.take(count)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

impl fmt::Debug for ByteReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteReader")
            .field("position", &self.position)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_advance_the_position() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.u16_le().unwrap(), 0x0201);
        assert_eq!(reader.u32_be().unwrap(), 0x03040506);
        assert!(reader.at_end());
    }

    #[test]
    fn out_of_bounds_reads_fail_without_panicking() {
        let bytes = [0xFF; 3];
        let mut reader = ByteReader::new(&bytes);
        let err = reader.u32_le().unwrap_err();
        assert_eq!(
            err,
            OutOfBounds {
                at: 0,
                wanted: 4,
                len: 3
            }
        );
        // A failed read must not move the cursor.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn cstring_stops_at_the_first_nul() {
        let bytes = *b"GLOBALB\0\xFF\xFF\xFF\xFF";
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.cstring(12).unwrap(), "GLOBALB");
        assert!(reader.at_end());
    }

    #[test]
    fn seek_past_the_end_is_rejected() {
        let bytes = [0u8; 8];
        let mut reader = ByteReader::new(&bytes);
        assert!(reader.seek(8).is_ok());
        assert!(reader.seek(9).is_err());
    }
}
