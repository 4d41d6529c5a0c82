//! The chunk envelope: an `(id, size)` header followed by `size` bytes of
//! payload, repeated until the end of the enclosing region.

use bunkit_core::cursor::ByteReader;

use crate::error::BundleError;

pub const CHUNK_HEADER_SIZE: usize = 8;

/// The eight-byte little-endian header in front of every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: u32,
    pub size: u32,
}

impl ChunkHeader {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let at = reader.position();
        let id = reader.u32_le()?;
        let size = reader.i32_le()?;
        if size < 0 {
            return Err(BundleError::MalformedChunk(format!(
                "chunk {id:08X} at offset {at:08x} has negative size {size}"
            )));
        }
        Ok(Self {
            id,
            size: size as u32,
        })
    }
}

/// One chunk cut out of its enclosing region.
///
/// `offset` is the absolute file offset of the chunk header, which payload
/// alignment is computed against.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView<'a> {
    pub header: ChunkHeader,
    payload: &'a [u8],
    offset: usize,
}

impl<'a> ChunkView<'a> {
    pub fn id(&self) -> u32 {
        self.header.id
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Absolute file offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_SIZE
    }

    pub fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(self.payload)
    }

    /// The payload with its leading bytes dropped so that the first
    /// remaining byte sits at an `alignment`-aligned absolute offset.
    ///
    /// Data chunks pad their front this way so the payload proper starts on
    /// a 16- or 128-byte boundary in the file.
    pub fn aligned_payload(&self, alignment: usize) -> Result<&'a [u8], BundleError> {
        let start = self.payload_offset();
        let aligned = start.div_ceil(alignment) * alignment;
        let pad = aligned - start;
        if pad > self.payload.len() {
            return Err(BundleError::MalformedChunk(format!(
                "chunk {:08X} payload ({} bytes) is shorter than its {}-byte alignment padding",
                self.header.id,
                self.payload.len(),
                pad
            )));
        }
        Ok(&self.payload[pad..])
    }

    /// Iterates the chunks nested in this chunk's payload.
    pub fn children(&self) -> ChunkIter<'a> {
        ChunkIter::new(self.payload, self.payload_offset())
    }
}

/// Iterates sibling chunks over a byte region.
///
/// Zero-id chunks are alignment padding and are skipped. Iteration ends
/// cleanly only when a chunk ends exactly at the region boundary; a header
/// or payload that sticks out past it is an error.
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    bytes: &'a [u8],
    /// Absolute file offset of `bytes[0]`.
    base: usize,
    position: usize,
}

impl<'a> ChunkIter<'a> {
    pub fn new(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            base,
            position: 0,
        }
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<ChunkView<'a>, BundleError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.position >= self.bytes.len() {
                return None;
            }
            if self.bytes.len() - self.position < CHUNK_HEADER_SIZE {
                self.position = self.bytes.len();
                return Some(Err(BundleError::MalformedChunk(format!(
                    "truncated chunk header at offset {:08x}",
                    self.base + self.position
                ))));
            }

            let mut reader = ByteReader::new(&self.bytes[self.position..]);
            let header = match ChunkHeader::parse(&mut reader) {
                Ok(header) => header,
                Err(err) => {
                    self.position = self.bytes.len();
                    return Some(Err(err));
                }
            };

            let payload_start = self.position + CHUNK_HEADER_SIZE;
            let payload_end = payload_start + header.size as usize;
            if payload_end > self.bytes.len() {
                self.position = self.bytes.len();
                return Some(Err(BundleError::MalformedChunk(format!(
                    "chunk {:08X} at offset {:08x} overruns its container by {} bytes",
                    header.id,
                    self.base + self.position,
                    payload_end - self.bytes.len()
                ))));
            }

            let offset = self.base + self.position;
            self.position = payload_end;

            if header.id == 0 {
                // Padding between chunks.
                continue;
            }
            return Some(Ok(ChunkView {
                header,
                payload: &self.bytes[payload_start..payload_end],
                offset,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&id.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn iterates_siblings_to_the_exact_end() {
        let mut bytes = chunk(0x1234, b"abcd");
        bytes.extend(chunk(0x5678, b""));

        let chunks: Vec<_> = ChunkIter::new(&bytes, 0)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id(), 0x1234);
        assert_eq!(chunks[0].payload(), b"abcd");
        assert_eq!(chunks[1].id(), 0x5678);
        assert_eq!(chunks[1].payload_offset(), 20);
    }

    #[test]
    fn padding_chunks_are_skipped() {
        let mut bytes = chunk(0, &[0u8; 8]);
        bytes.extend(chunk(0xAAAA, b"x"));

        let chunks: Vec<_> = ChunkIter::new(&bytes, 0)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id(), 0xAAAA);
    }

    #[test]
    fn overrunning_chunk_is_an_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x1234u32.to_le_bytes());
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);

        let mut iter = ChunkIter::new(&bytes, 0);
        assert!(matches!(
            iter.next(),
            Some(Err(BundleError::MalformedChunk(_)))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn truncated_header_is_an_error() {
        let mut bytes = chunk(0x1234, b"");
        bytes.extend_from_slice(&[1, 2, 3]);

        let mut iter = ChunkIter::new(&bytes, 0);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(
            iter.next(),
            Some(Err(BundleError::MalformedChunk(_)))
        ));
    }

    #[test]
    fn negative_size_is_an_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x1234u32.to_le_bytes());
        bytes.extend_from_slice(&(-8i32).to_le_bytes());

        let mut iter = ChunkIter::new(&bytes, 0);
        assert!(matches!(
            iter.next(),
            Some(Err(BundleError::MalformedChunk(_)))
        ));
    }

    #[test]
    fn aligned_payload_drops_front_padding() {
        // Header occupies 0..8, so the payload starts at absolute offset 8
        // and a 16-byte alignment eats the first 8 payload bytes.
        let bytes = chunk(0x1234, &[0u8; 12]);
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        assert_eq!(view.aligned_payload(16).unwrap().len(), 4);
        assert_eq!(view.aligned_payload(4).unwrap().len(), 12);
    }

    #[test]
    fn children_iterate_the_payload() {
        let inner = chunk(0xBEEF, b"hi");
        let bytes = chunk(0x8000_0000, &inner);
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        let children: Vec<_> = view.children().collect::<Result<_, _>>().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id(), 0xBEEF);
        assert_eq!(children[0].payload(), b"hi");
        assert_eq!(children[0].payload_offset(), 16);
    }
}
