//! Builders for synthetic VEXX data used across the unit tests

use crate::range::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use vexx_utils::align;

/// Minimal binary writer with selectable byte order.
pub struct Writer {
    pub bytes: Vec<u8>,
    endian: Endian,
}

macro_rules! write_fn {
    ($name:ident, $ty:ty, $size:expr, $write:ident) => {
        pub fn $name(&mut self, value: $ty) -> &mut Self {
            let mut buf = [0u8; $size];
            match self.endian {
                Endian::Little => LittleEndian::$write(&mut buf, value),
                Endian::Big => BigEndian::$write(&mut buf, value),
            }
            self.bytes.extend_from_slice(&buf);
            self
        }
    };
}

impl Writer {
    pub fn new() -> Self {
        Self::with_endian(Endian::Little)
    }

    pub fn with_endian(endian: Endian) -> Self {
        Self {
            bytes: Vec::new(),
            endian,
        }
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.u8(value as u8)
    }

    write_fn!(u16, u16, 2, write_u16);
    write_fn!(i16, i16, 2, write_i16);
    write_fn!(u32, u32, 4, write_u32);
    write_fn!(f32, f32, 4, write_f32);

    pub fn f32s(&mut self, values: &[f32]) -> &mut Self {
        for &value in values {
            self.f32(value);
        }
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn zeros(&mut self, count: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + count, 0);
        self
    }

    /// Pads with zeros until the buffer is `len` bytes long.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        assert!(self.bytes.len() <= len, "writer already past {len}");
        self.bytes.resize(len, 0);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, //
];

/// Builds a serialized node subtree in pre-order.
pub struct NodeBuilder {
    tag: u32,
    name: String,
    body: Vec<u8>,
    children: Vec<NodeBuilder>,
    child_count: Option<u16>,
    endian: Endian,
}

impl NodeBuilder {
    pub fn new(tag: u32) -> Self {
        Self {
            tag,
            name: String::new(),
            body: Vec::new(),
            children: Vec::new(),
            child_count: None,
            endian: Endian::Little,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Overrides the declared child count, without touching the serialized children.
    pub fn child_count(mut self, count: u16) -> Self {
        self.child_count = Some(count);
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.endian = Endian::Big;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::with_endian(self.endian);
        self.write(&mut w);
        w.finish()
    }

    fn write(&self, w: &mut Writer) {
        let (name_length, header_length) = match self.name.is_empty() {
            true => (0, 16),
            false => {
                let end = 16 + self.name.len() + 1;
                (end, align(end, 4))
            }
        };

        let start = w.len();
        w.u32(self.tag)
            .u16(header_length as u16)
            .u16(name_length as u16)
            .u32(self.body.len() as u32)
            .u16(self.child_count.unwrap_or(self.children.len() as u16))
            .u16(0)
            .raw(self.name.as_bytes())
            .pad_to(start + header_length)
            .raw(&self.body);

        for child in &self.children {
            child.write(w);
        }
    }
}

/// Wraps serialized nodes and texture data into a whole file.
pub fn vexx_file(version: u32, magic: &[u8; 4], nodes: &[u8], textures: &[u8]) -> Vec<u8> {
    let endian = match magic {
        b"XXEV" => Endian::Big,
        _ => Endian::Little,
    };
    Writer::with_endian(endian)
        .u32(version)
        .u32(nodes.len() as u32)
        .u32(textures.len() as u32)
        .raw(magic)
        .raw(nodes)
        .raw(textures)
        .finish()
}
