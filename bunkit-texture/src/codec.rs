//! BC1/BC2/BC3 block decoding and a minimal BC1 encoder.

use std::io::Write;

use crate::format::TextureFormat;
use crate::TextureError;

/// Decodes a whole mip level of block-compressed data into RGBA8.
///
/// The output is tightly packed, `width * 4` bytes per row. Edge blocks of
/// non-multiple-of-4 surfaces are cropped.
pub fn decode_texture(
    data: &[u8],
    width: usize,
    height: usize,
    format: TextureFormat,
) -> Result<Vec<u8>, TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    let Some(block_size) = format.block_size() else {
        // Already RGBA8.
        let needed = width * height * 4;
        if data.len() < needed {
            return Err(TextureError::BufferTooSmall {
                context: "texture data",
                len: data.len(),
                needed,
            });
        }
        return Ok(data[..needed].to_vec());
    };

    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let needed = blocks_x * blocks_y * block_size;
    if data.len() < needed {
        return Err(TextureError::BufferTooSmall {
            context: "texture data",
            len: data.len(),
            needed,
        });
    }

    let mut pixels = vec![0u8; width * height * 4];
    let mut block = [[0u8; 4]; 16];
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let offset = (by * blocks_x + bx) * block_size;
            let encoded = &data[offset..offset + block_size];
            match format {
                TextureFormat::Bc1 => decode_bc1_block(encoded, &mut block),
                TextureFormat::Bc2 => decode_bc2_block(encoded, &mut block),
                TextureFormat::Bc3 => decode_bc3_block(encoded, &mut block),
                TextureFormat::Rgba8 => unreachable!(),
            }
            for py in 0..4 {
                let y = by * 4 + py;
                if y >= height {
                    break;
                }
                for px in 0..4 {
                    let x = bx * 4 + px;
                    if x >= width {
                        break;
                    }
                    let dst = (y * width + x) * 4;
                    pixels[dst..dst + 4].copy_from_slice(&block[py * 4 + px]);
                }
            }
        }
    }
    Ok(pixels)
}

fn rgb565_to_rgba(color: u16) -> [u8; 4] {
    let r = ((color >> 11) & 0x1F) as u32;
    let g = ((color >> 5) & 0x3F) as u32;
    let b = (color & 0x1F) as u32;
    [
        ((r * 255 + 15) / 31) as u8,
        ((g * 255 + 31) / 63) as u8,
        ((b * 255 + 15) / 31) as u8,
        255,
    ]
}

fn lerp_channel(a: u8, b: u8, num: u32, den: u32) -> u8 {
    (((u32::from(a) * (den - num)) + u32::from(b) * num) / den) as u8
}

/// Decodes one 8-byte BC1 block. Honors the punch-through alpha mode when
/// the first endpoint sorts below the second.
fn decode_bc1_block(encoded: &[u8], out: &mut [[u8; 4]; 16]) {
    let color0 = u16::from_le_bytes([encoded[0], encoded[1]]);
    let color1 = u16::from_le_bytes([encoded[2], encoded[3]]);
    let indices = u32::from_le_bytes([encoded[4], encoded[5], encoded[6], encoded[7]]);

    let c0 = rgb565_to_rgba(color0);
    let c1 = rgb565_to_rgba(color1);
    let mut palette = [c0, c1, [0; 4], [0; 4]];
    if color0 > color1 {
        for channel in 0..3 {
            palette[2][channel] = lerp_channel(c0[channel], c1[channel], 1, 3);
            palette[3][channel] = lerp_channel(c0[channel], c1[channel], 2, 3);
        }
        palette[2][3] = 255;
        palette[3][3] = 255;
    } else {
        for channel in 0..3 {
            palette[2][channel] = lerp_channel(c0[channel], c1[channel], 1, 2);
        }
        palette[2][3] = 255;
        // palette[3] stays transparent black.
    }

    for (i, pixel) in out.iter_mut().enumerate() {
        let index = ((indices >> (i * 2)) & 3) as usize;
        *pixel = palette[index];
    }
}

/// BC2: 64 bits of explicit 4-bit alpha followed by a BC1 color block.
fn decode_bc2_block(encoded: &[u8], out: &mut [[u8; 4]; 16]) {
    decode_bc1_colors_opaque(&encoded[8..16], out);
    for i in 0..16 {
        let nibble = (encoded[i / 2] >> ((i % 2) * 4)) & 0xF;
        out[i][3] = nibble * 17;
    }
}

/// BC3: interpolated 3-bit alpha followed by a BC1 color block.
fn decode_bc3_block(encoded: &[u8], out: &mut [[u8; 4]; 16]) {
    decode_bc1_colors_opaque(&encoded[8..16], out);

    let alpha0 = encoded[0];
    let alpha1 = encoded[1];
    let mut palette = [0u8; 8];
    palette[0] = alpha0;
    palette[1] = alpha1;
    if alpha0 > alpha1 {
        for i in 1..7 {
            palette[i + 1] = lerp_channel(alpha0, alpha1, i as u32, 7);
        }
    } else {
        for i in 1..5 {
            palette[i + 1] = lerp_channel(alpha0, alpha1, i as u32, 5);
        }
        palette[6] = 0;
        palette[7] = 255;
    }

    let bits = u64::from_le_bytes([
        encoded[2], encoded[3], encoded[4], encoded[5], encoded[6], encoded[7], 0, 0,
    ]);
    for (i, pixel) in out.iter_mut().enumerate() {
        let index = ((bits >> (i * 3)) & 7) as usize;
        pixel[3] = palette[index];
    }
}

/// The color half of BC2/BC3 blocks: always four interpolated colors, the
/// endpoint order does not select a transparent mode.
fn decode_bc1_colors_opaque(encoded: &[u8], out: &mut [[u8; 4]; 16]) {
    let color0 = u16::from_le_bytes([encoded[0], encoded[1]]);
    let color1 = u16::from_le_bytes([encoded[2], encoded[3]]);
    let indices = u32::from_le_bytes([encoded[4], encoded[5], encoded[6], encoded[7]]);

    let c0 = rgb565_to_rgba(color0);
    let c1 = rgb565_to_rgba(color1);
    let mut palette = [c0, c1, [255; 4], [255; 4]];
    for channel in 0..3 {
        palette[2][channel] = lerp_channel(c0[channel], c1[channel], 1, 3);
        palette[3][channel] = lerp_channel(c0[channel], c1[channel], 2, 3);
    }

    for (i, pixel) in out.iter_mut().enumerate() {
        let index = ((indices >> (i * 2)) & 3) as usize;
        *pixel = palette[index];
    }
}

/// Encodes RGBA8 pixels to the requested block format.
///
/// Only BC1 has an encoder (a simple range fit, good enough for tooling
/// round trips); the alpha formats decode only.
pub fn encode_texture(
    pixels: &[u8],
    width: usize,
    height: usize,
    format: TextureFormat,
) -> Result<Vec<u8>, TextureError> {
    match format {
        TextureFormat::Bc1 => encode_bc1(pixels, width, height),
        TextureFormat::Rgba8 => {
            let needed = width * height * 4;
            if pixels.len() < needed {
                return Err(TextureError::BufferTooSmall {
                    context: "pixel data",
                    len: pixels.len(),
                    needed,
                });
            }
            Ok(pixels[..needed].to_vec())
        }
        other => Err(TextureError::Unsupported(format!(
            "no encoder for {other}"
        ))),
    }
}

fn rgba_to_rgb565(pixel: [u8; 4]) -> u16 {
    let r = (u32::from(pixel[0]) * 31 + 127) / 255;
    let g = (u32::from(pixel[1]) * 63 + 127) / 255;
    let b = (u32::from(pixel[2]) * 31 + 127) / 255;
    ((r << 11) | (g << 5) | b) as u16
}

fn encode_bc1(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, TextureError> {
    if width == 0 || height == 0 || width % 4 != 0 || height % 4 != 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    let needed = width * height * 4;
    if pixels.len() < needed {
        return Err(TextureError::BufferTooSmall {
            context: "pixel data",
            len: pixels.len(),
            needed,
        });
    }

    let blocks_x = width / 4;
    let blocks_y = height / 4;
    let mut encoded = Vec::with_capacity(blocks_x * blocks_y * 8);
    let mut block = [[0u8; 4]; 16];
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            for py in 0..4 {
                for px in 0..4 {
                    let src = ((by * 4 + py) * width + bx * 4 + px) * 4;
                    block[py * 4 + px].copy_from_slice(&pixels[src..src + 4]);
                }
            }
            encoded.extend_from_slice(&encode_bc1_block(&block));
        }
    }
    Ok(encoded)
}

/// Range-fit: take the lightest and darkest pixel as endpoints and snap
/// every pixel to the nearest of the four palette entries.
fn encode_bc1_block(block: &[[u8; 4]; 16]) -> [u8; 8] {
    fn luma(pixel: [u8; 4]) -> u32 {
        2 * u32::from(pixel[0]) + 5 * u32::from(pixel[1]) + u32::from(pixel[2])
    }

    let mut min = block[0];
    let mut max = block[0];
    for &pixel in &block[1..] {
        if luma(pixel) < luma(min) {
            min = pixel;
        }
        if luma(pixel) > luma(max) {
            max = pixel;
        }
    }

    let mut color0 = rgba_to_rgb565(max);
    let mut color1 = rgba_to_rgb565(min);
    if color0 < color1 {
        std::mem::swap(&mut color0, &mut color1);
    }

    let c0 = rgb565_to_rgba(color0);
    let c1 = rgb565_to_rgba(color1);
    let mut palette = [c0, c1, c0, c1];
    if color0 != color1 {
        for channel in 0..3 {
            palette[2][channel] = lerp_channel(c0[channel], c1[channel], 1, 3);
            palette[3][channel] = lerp_channel(c0[channel], c1[channel], 2, 3);
        }
    }

    let mut indices = 0u32;
    for (i, &pixel) in block.iter().enumerate() {
        let mut best = 0;
        let mut best_error = u32::MAX;
        for (index, &candidate) in palette.iter().enumerate() {
            let error: u32 = (0..3)
                .map(|c| {
                    let d = i32::from(pixel[c]) - i32::from(candidate[c]);
                    (d * d) as u32
                })
                .sum();
            if error < best_error {
                best_error = error;
                best = index;
            }
        }
        indices |= (best as u32) << (i * 2);
    }

    let mut out = [0u8; 8];
    out[0..2].copy_from_slice(&color0.to_le_bytes());
    out[2..4].copy_from_slice(&color1.to_le_bytes());
    out[4..8].copy_from_slice(&indices.to_le_bytes());
    out
}

/// Writes RGBA8 pixels as a PNG image.
pub fn write_png(
    writer: impl Write,
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Result<(), TextureError> {
    let needed = width * height * 4;
    if pixels.len() < needed {
        return Err(TextureError::BufferTooSmall {
            context: "pixel data",
            len: pixels.len(),
            needed,
        });
    }
    let mut encoder = png::Encoder::new(writer, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&pixels[..needed])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bc1_solid_color_round_trips() {
        // A 565-representable color survives encode and decode exactly.
        let pixel = [255, 0, 132, 255];
        let pixels: Vec<u8> = std::iter::repeat(pixel).take(16).flatten().collect();
        let encoded = encode_texture(&pixels, 4, 4, TextureFormat::Bc1).unwrap();
        assert_eq!(encoded.len(), 8);
        let decoded = decode_texture(&encoded, 4, 4, TextureFormat::Bc1).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn bc1_transparent_mode() {
        // color0 <= color1 selects the three-color mode with index 3
        // transparent.
        let mut block = [0u8; 8];
        block[0..2].copy_from_slice(&0u16.to_le_bytes());
        block[2..4].copy_from_slice(&0xFFFFu16.to_le_bytes());
        block[4..8].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        let decoded = decode_texture(&block, 4, 4, TextureFormat::Bc1).unwrap();
        assert!(decoded.chunks_exact(4).all(|p| p == [0, 0, 0, 0]));
    }

    #[test]
    fn bc2_explicit_alpha() {
        let mut block = [0u8; 16];
        // Alternating 0x0 / 0xF alpha nibbles, white color block.
        for byte in &mut block[0..8] {
            *byte = 0xF0;
        }
        block[8..10].copy_from_slice(&0xFFFFu16.to_le_bytes());
        block[10..12].copy_from_slice(&0xFFFFu16.to_le_bytes());
        let decoded = decode_texture(&block, 4, 4, TextureFormat::Bc2).unwrap();
        for (i, pixel) in decoded.chunks_exact(4).enumerate() {
            let expected_alpha = if i % 2 == 0 { 0 } else { 255 };
            assert_eq!(pixel, [255, 255, 255, expected_alpha]);
        }
    }

    #[test]
    fn bc3_constant_alpha() {
        let mut block = [0u8; 16];
        block[0] = 0x80;
        block[1] = 0x80;
        block[8..10].copy_from_slice(&0xFFFFu16.to_le_bytes());
        block[10..12].copy_from_slice(&0xFFFFu16.to_le_bytes());
        let decoded = decode_texture(&block, 4, 4, TextureFormat::Bc3).unwrap();
        assert!(decoded.chunks_exact(4).all(|p| p == [255, 255, 255, 0x80]));
    }

    #[test]
    fn short_input_is_rejected() {
        let result = decode_texture(&[0u8; 4], 4, 4, TextureFormat::Bc1);
        assert!(matches!(result, Err(TextureError::BufferTooSmall { .. })));
    }

    #[test]
    fn png_export_produces_a_png_signature() {
        let pixels = vec![0u8; 4 * 4 * 4];
        let mut out = Vec::new();
        write_png(&mut out, &pixels, 4, 4).unwrap();
        assert_eq!(&out[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
