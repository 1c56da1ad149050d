//! Texture nodes
//!
//! A texture node only carries the texture's description. Its palette and pixel data live in the
//! file's texture section and get attached by the document loader through
//! [`Texture::decode_pixels`].
//!
//! ```c
//! struct Texture {
//!     u16 width;
//!     u16 height;
//!     u8 bpp;              // 4 or 8
//!     u8 mip_count;
//!     u8 format;           // bit 0: swizzled
//!     u8 id;
//!     u32 cmap_size;
//!     u32 data_size;
//!     u8 unknown[8];
//!     f32 alpha_test;
//!     RGBA8 diffuse;
//!     u8 unknown[16];
//!     u32 external;        // 0xFFFFFFFF for textures stored elsewhere
//!     u8 unknown[4];
//!     char name[];
//! };
//! ```

use crate::{error::DecodeError, range::ByteRange, swizzle};
use bitflags::bitflags;
use log::*;
use vexx_utils::color::RGBA8;

bitflags! {
    pub struct TextureFlags: u8 {
        const SWIZZLED = 1 << 0;
    }
}

/// A single decoded mip level, as tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mip {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u16,
    pub height: u16,
    pub bpp: u8,
    pub mip_count: u8,
    pub flags: TextureFlags,
    pub id: u8,
    pub cmap_size: u32,
    pub data_size: u32,
    pub alpha_test: f32,
    pub diffuse: RGBA8,
    pub external: bool,
    pub name: String,

    /// Filled by [`Texture::decode_pixels`]
    pub palette: Vec<RGBA8>,
    pub mips: Vec<Mip>,
}

impl Texture {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            width: body.u16(0)?,
            height: body.u16(2)?,
            bpp: body.u8(4)?,
            mip_count: body.u8(5)?,
            flags: TextureFlags::from_bits_truncate(body.u8(6)?),
            id: body.u8(7)?,
            cmap_size: body.u32(8)?,
            data_size: body.u32(12)?,
            alpha_test: body.f32(24)?,
            diffuse: RGBA8::from_array(body.u8_array(28)?),
            external: body.u32(48)? == 0xffffffff,
            name: body.slice(56, None)?.string(),
            palette: Vec::new(),
            mips: Vec::new(),
        })
    }

    pub fn is_swizzled(&self) -> bool {
        self.flags.contains(TextureFlags::SWIZZLED)
    }

    /// Effective bits per pixel, anything other than 4 is treated as 8.
    pub fn bits_per_pixel(&self) -> usize {
        match self.bpp {
            4 => 4,
            _ => 8,
        }
    }

    pub fn palette_len(&self) -> usize {
        1 << self.bits_per_pixel()
    }

    /// Width of a tile, in pixels.
    pub fn tile_columns(&self) -> usize {
        swizzle::TILE_ROW_BYTES * 8 / self.bits_per_pixel()
    }

    /// Bytes per stored row of a mip level. Odd 4 bpp widths round up to a whole byte.
    pub fn row_bytes(&self, width: usize) -> usize {
        (width.max(self.tile_columns()) * self.bits_per_pixel() + 7) / 8
    }

    /// Size in bytes of a mip level, including the padding up to a whole tile row.
    pub fn mip_size(&self, width: usize, height: usize) -> usize {
        self.row_bytes(width) * height
    }

    /// Resolves the palette and every mip level into RGBA.
    pub fn decode_pixels(&mut self, cmap: &ByteRange, data: &ByteRange) -> Result<(), DecodeError> {
        let needed = self.palette_len() * 4;
        let palette = cmap
            .bytes_at(0, needed)
            .map_err(|_| {
                DecodeError::Texture(format!(
                    "palette of `{}` holds {} bytes, {needed} needed",
                    self.name,
                    cmap.len()
                ))
            })?
            .chunks_exact(4)
            .map(|c| RGBA8::new(c[0], c[1], c[2], c[3]))
            .collect::<Vec<_>>();

        let mut mips = Vec::with_capacity(self.mip_count as usize);
        let (mut width, mut height) = (self.width as usize, self.height as usize);
        let mut offset = 0;
        for level in 0..self.mip_count {
            let size = self.mip_size(width, height);
            let bytes = data.bytes_at(offset, size).map_err(|e| {
                DecodeError::Texture(format!("mip {level} of `{}`: {e}", self.name))
            })?;
            mips.push(self.decode_mip(bytes, &palette, width, height));

            offset += size;
            width = (width / 2).max(1);
            height = (height / 2).max(1);
        }

        trace!(
            "Decoded texture `{}` ({}x{}, {} bpp, {} mips)",
            self.name,
            self.width,
            self.height,
            self.bits_per_pixel(),
            mips.len()
        );

        self.palette = palette;
        self.mips = mips;
        Ok(())
    }

    fn decode_mip(&self, bytes: &[u8], palette: &[RGBA8], width: usize, height: usize) -> Mip {
        let bpp = self.bits_per_pixel();
        let pitch = self.row_bytes(width);

        let linear = match self.is_swizzled() && width > self.tile_columns() {
            true => swizzle::unswizzle(bytes, pitch),
            false => None,
        };
        let indices = linear.as_deref().unwrap_or(bytes);

        let mut rgba = Vec::with_capacity(width * height * 4);
        for row in indices.chunks_exact(pitch).take(height) {
            for x in 0..width {
                let index = match bpp {
                    4 => (row[x / 2] >> ((x % 2) * 4)) & 0x0f,
                    _ => row[x],
                };
                rgba.extend_from_slice(&palette[index as usize].to_array());
            }
        }

        Mip {
            width: width as u32,
            height: height as u32,
            rgba,
        }
    }
}
