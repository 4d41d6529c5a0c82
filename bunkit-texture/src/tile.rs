//! Xenon texture detiling.
//!
//! Console texture data is stored in a tiled (swizzled) order optimised for
//! the GPU's cache. The tiling operates on compressed blocks, so a BC1
//! texture is detiled as a grid of 8-byte elements, BC2/BC3 as 16-byte
//! elements. Surfaces are padded out to 128-pixel alignment before tiling;
//! the caller supplies the original block dimensions and we copy only those
//! blocks back out.

use crate::format::TextureFormat;
use crate::TextureError;

/// Pixel alignment of a tiled surface.
pub const TEXTURE_ALIGN: usize = 128;

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Computes the tiled element offset for the block at `(x, y)`.
///
/// `width` is the aligned surface width in blocks and `log_bpb` the base-2
/// logarithm of the bytes per block. The returned offset is in elements.
pub fn tile_offset(x: usize, y: usize, width: usize, log_bpb: usize) -> usize {
    let aligned_width = align(width, 32);
    let macro_offset = ((x >> 5) + (y >> 5) * (aligned_width >> 5)) << (log_bpb + 7);
    let micro = ((x & 7) + ((y & 0xE) << 2)) << log_bpb;
    let offset = macro_offset + ((micro & !0xF) << 1) + (micro & 0xF) + ((y & 1) << 4);

    (((offset & !0x1FF) << 3)
        + ((y & 16) << 7)
        + ((offset & 0x1C0) << 2)
        + (((((y & 8) >> 2) + (x >> 3)) & 3) << 6)
        + (offset & 0x3F))
        >> log_bpb
}

/// Swaps the bytes of every 16-bit word in place.
///
/// Console data is big-endian at the 16-bit granularity; this has to happen
/// before detiling because the tiling addresses bytes, not words.
pub fn swap_u16_buffer(bytes: &mut [u8]) {
    for pair in bytes.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Detiles one mip level of a console texture into linear block order.
///
/// `tiled` must hold the full aligned surface
/// (`align(width, 128) / 4 * align(height, 128) / 4` blocks); `width` and
/// `height` are the logical pixel dimensions.
pub fn untile_xenon(
    tiled: &[u8],
    width: usize,
    height: usize,
    format: TextureFormat,
) -> Result<Vec<u8>, TextureError> {
    let Some(block_size) = format.block_size() else {
        return Err(TextureError::Unsupported(format!(
            "cannot detile uncompressed {format} data"
        )));
    };
    copy_tiled(tiled, width, height, block_size, Direction::Untile)
}

/// The inverse of [`untile_xenon`]. Produces a fully aligned tiled surface.
pub fn tile_xenon(
    linear: &[u8],
    width: usize,
    height: usize,
    format: TextureFormat,
) -> Result<Vec<u8>, TextureError> {
    let Some(block_size) = format.block_size() else {
        return Err(TextureError::Unsupported(format!(
            "cannot tile uncompressed {format} data"
        )));
    };
    copy_tiled(linear, width, height, block_size, Direction::Tile)
}

#[derive(Clone, Copy)]
enum Direction {
    Untile,
    Tile,
}

fn copy_tiled(
    source: &[u8],
    width: usize,
    height: usize,
    block_size: usize,
    direction: Direction,
) -> Result<Vec<u8>, TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }

    let tiled_block_width = align(width, TEXTURE_ALIGN) / 4;
    let original_block_width = width / 4;
    let tiled_block_height = align(height, TEXTURE_ALIGN) / 4;
    let original_block_height = height / 4;
    let log_bpb = block_size.trailing_zeros() as usize;

    // Surfaces narrower than half the aligned width are packed into the
    // second half of the tile; 16-pixel mips need the matching offset.
    let mut sx_offset = 0;
    if tiled_block_width >= original_block_width * 2 && width == 16 {
        sx_offset = original_block_width;
    }
    let mut sy_offset = 0;
    if tiled_block_height >= original_block_height * 2 && height == 16 {
        sy_offset = original_block_height;
    }

    let tiled_len = tiled_block_width * tiled_block_height * block_size;
    let linear_len = original_block_width * original_block_height * block_size;
    let (source_needed, result_len) = match direction {
        Direction::Untile => (tiled_len, linear_len),
        Direction::Tile => (linear_len, tiled_len),
    };
    if source.len() < source_needed {
        return Err(TextureError::BufferTooSmall {
            context: "tiled surface",
            len: source.len(),
            needed: source_needed,
        });
    }

    let mut result = vec![0u8; result_len];
    for y in 0..original_block_height {
        for x in 0..original_block_width {
            let tiled_offset =
                tile_offset(x + sx_offset, y + sy_offset, tiled_block_width, log_bpb) * block_size;
            let linear_offset = (y * original_block_width + x) * block_size;
            let (from, to) = match direction {
                Direction::Untile => (tiled_offset, linear_offset),
                Direction::Tile => (linear_offset, tiled_offset),
            };
            result[to..to + block_size].copy_from_slice(&source[from..from + block_size]);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_swap_swaps_pairs() {
        let mut bytes = [0x12, 0x34, 0x56, 0x78];
        swap_u16_buffer(&mut bytes);
        assert_eq!(bytes, [0x34, 0x12, 0x78, 0x56]);
    }

    #[test]
    fn tile_offsets_are_a_permutation() {
        // One full 32x32-block macro tile of 8-byte elements.
        let width = 32;
        let mut seen = vec![false; width * 32];
        for y in 0..32 {
            for x in 0..width {
                let offset = tile_offset(x, y, width, 3);
                assert!(offset < seen.len(), "offset {offset} out of range");
                assert!(!seen[offset], "offset {offset} hit twice");
                seen[offset] = true;
            }
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn untile_inverts_tile_at_full_alignment() {
        // 128x128 BC1: the aligned grid equals the logical grid, so tiling
        // then untiling must reproduce the input exactly.
        let width = 128;
        let height = 128;
        let blocks = (width / 4) * (height / 4);
        let linear: Vec<u8> = (0..blocks * 8).map(|i| (i % 251) as u8).collect();

        let tiled = tile_xenon(&linear, width, height, TextureFormat::Bc1).unwrap();
        let back = untile_xenon(&tiled, width, height, TextureFormat::Bc1).unwrap();
        assert_eq!(back, linear);
    }

    #[test]
    fn untile_inverts_tile_below_full_alignment() {
        // Surfaces smaller than the 128-pixel tile land in a padded grid,
        // and the 16-pixel axes take the packed-half offset.
        for (width, height) in [(16, 16), (64, 64), (16, 128), (64, 32)] {
            let blocks = (width / 4) * (height / 4);
            let linear: Vec<u8> = (0..blocks * 8).map(|i| (i % 251) as u8).collect();

            let tiled = tile_xenon(&linear, width, height, TextureFormat::Bc1).unwrap();
            let back = untile_xenon(&tiled, width, height, TextureFormat::Bc1).unwrap();
            assert_eq!(back, linear, "{width}x{height}");
        }
    }

    #[test]
    fn untile_rejects_short_buffers() {
        let result = untile_xenon(&[0u8; 16], 128, 128, TextureFormat::Bc1);
        assert!(matches!(result, Err(TextureError::BufferTooSmall { .. })));
    }

    #[test]
    fn uncompressed_data_is_not_tiled() {
        let result = untile_xenon(&[0u8; 64], 4, 4, TextureFormat::Rgba8);
        assert!(matches!(result, Err(TextureError::Unsupported(_))));
    }
}
