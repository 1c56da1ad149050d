//! Vertex layout descriptors
//!
//! Mesh chunks describe their vertex records with the PSP GU `vtype` word (the same value that is
//! handed to `sceGuDrawArray`). Only the channels that actually appear in VEXX files are decoded:
//! ```text
//!  20..18  16..14  12..11  10..9   8..7    6..5    4..2    1..0
//! [vcount][weights][index][weight][pos   ][normal][color ][uv    ]
//! ```
//! Channels are laid out in the order uv, color, normal, position. Each channel starts aligned to
//! its own element size, and the whole record is padded to a generation specific alignment.

use vexx_utils::align;

pub const TEXTURE_SHIFT: u32 = 0;
pub const COLOR_SHIFT: u32 = 2;
pub const NORMAL_SHIFT: u32 = 5;
pub const POSITION_SHIFT: u32 = 7;
pub const WEIGHT_SHIFT: u32 = 9;
pub const INDEX_SHIFT: u32 = 11;
pub const WEIGHTS_SHIFT: u32 = 14;
pub const VERTICES_SHIFT: u32 = 18;

/// Layout of a single vertex channel within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Channel {
    /// Raw format bits of the channel
    pub format: u32,
    /// Size of a single element in bytes
    pub size: usize,
    pub count: usize,
    pub offset: usize,
    /// Padding inserted in front of the channel
    pub padding: usize,
}

impl Channel {
    fn place(format: u32, size: usize, count: usize, previous_end: usize) -> Self {
        let offset = match size > 1 {
            true => align(previous_end, size),
            false => previous_end,
        };
        Self {
            format,
            size,
            count,
            offset,
            padding: offset - previous_end,
        }
    }

    pub fn is_present(&self) -> bool {
        self.size != 0
    }

    /// Byte offset right past the channel.
    pub fn end(&self) -> usize {
        self.offset + self.size * self.count
    }

    /// Offset of the `element`th element of this channel, within record number `index`.
    pub fn element_offset(&self, stride: usize, index: usize, element: usize) -> usize {
        index * stride + self.offset + self.size * element
    }
}

/// Decoded form of a packed vertex type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFormat {
    pub vtype: u32,
    pub texture: Channel,
    pub color: Channel,
    pub normal: Channel,
    pub position: Channel,
    /// Size of a whole vertex record, including trailing padding
    pub stride: usize,
    /// Trailing padding of a record
    pub padding: usize,
}

/// Element size of texture, normal, position and weight channels.
const fn scalar_size(bits: u32) -> usize {
    match bits {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 4,
    }
}

/// Element size of the color channel. Every packed color format (5650, 5551, 4444) is 16-bit,
/// while 8888 is 32-bit.
const fn color_size(bits: u32) -> usize {
    match bits {
        0 => 0,
        7 => 4,
        _ => 2,
    }
}

impl VertexFormat {
    pub fn decode(vtype: u32, alignment: usize) -> Self {
        let texture_bits = (vtype >> TEXTURE_SHIFT) & 0b11;
        let color_bits = (vtype >> COLOR_SHIFT) & 0b111;
        let normal_bits = (vtype >> NORMAL_SHIFT) & 0b11;
        let position_bits = (vtype >> POSITION_SHIFT) & 0b11;
        let vertices = ((vtype >> VERTICES_SHIFT) & 0b111) as usize;

        let texture = Channel::place(texture_bits, scalar_size(texture_bits), 2, 0);
        let color = Channel::place(color_bits, color_size(color_bits), 1, texture.end());
        let normal = Channel::place(normal_bits, scalar_size(normal_bits), 3, color.end());

        let position_size = scalar_size(position_bits);
        let position_count = match (vertices, position_size) {
            (0, 0) => 0,
            (0, _) => 3,
            (n, _) => n,
        };
        let position = Channel::place(position_bits, position_size, position_count, normal.end());

        let unpadded = position.end();
        let stride = match alignment > 1 {
            true => align(unpadded, alignment),
            false => unpadded,
        };

        Self {
            vtype,
            texture,
            color,
            normal,
            position,
            stride,
            padding: stride - unpadded,
        }
    }

    pub fn weight_bits(&self) -> u32 {
        (self.vtype >> WEIGHT_SHIFT) & 0b11
    }

    pub fn index_bits(&self) -> u32 {
        (self.vtype >> INDEX_SHIFT) & 0b11
    }

    pub fn weight_count(&self) -> u32 {
        (self.vtype >> WEIGHTS_SHIFT) & 0b111
    }
}

/// Size of a single vertex record described by `vtype`.
pub fn stride_size(vtype: u32, alignment: usize) -> usize {
    VertexFormat::decode(vtype, alignment).stride
}
