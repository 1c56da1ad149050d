//! Node records of the scene graph
//!
//! Every node starts with a fixed 16-byte header:
//! ```c
//! struct NodeHeader {
//!     u32 type;          // generation specific tag, see `registry`
//!     u16 header_length; // including the name, at least 16
//!     u16 name_end;      // the name spans bytes [16, name_end) of the header
//!     u32 body_length;
//!     u16 child_count;
//!     u16 reserved;
//!     char name[];
//! };
//! ```
//! The body follows the header directly, and the children follow the body, in pre-order. There
//! are no explicit child offsets: a child's position is only known once every preceding sibling
//! subtree has been measured.

use crate::{
    error::DecodeError,
    nodes::{
        AmbientLight, AnimTransform, Camera, Collision, LensFlare, Mesh, Section, Sound, Texture,
        Transform, World,
    },
    range::ByteRange,
    registry::NodeType,
};
use std::{borrow::Cow, ops::Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHeader {
    pub type_tag: u32,
    pub header_length: u16,
    pub name_length: u16,
    pub body_length: u32,
    pub child_count: u16,
    pub reserved: u16,
    pub name: String,
}

impl NodeHeader {
    /// Size of the fixed part of the header.
    pub const SIZE: usize = 16;

    /// Parses a header at the beginning of `range`.
    pub fn read(range: &ByteRange) -> Result<Self, DecodeError> {
        let offset = range.begin();
        if range.len() < Self::SIZE {
            return Err(DecodeError::structural(offset, "truncated node header"));
        }

        let type_tag = range.u32(0)?;
        let header_length = range.u16(4)?;
        let name_length = range.u16(6)?;
        let body_length = range.u32(8)?;
        let child_count = range.u16(12)?;
        let reserved = range.u16(14)?;

        if (header_length as usize) < Self::SIZE {
            return Err(DecodeError::structural(
                offset,
                format!("header length {header_length} is below {}", Self::SIZE),
            ));
        }
        if name_length > header_length {
            return Err(DecodeError::structural(
                offset,
                format!("name ends at {name_length}, past the header length {header_length}"),
            ));
        }

        let header = range
            .slice(0, Some(header_length as usize))
            .map_err(|e| e.into_structural(offset, "header doesn't fit"))?;
        let name = match (name_length as usize).checked_sub(Self::SIZE) {
            Some(len) if len > 0 => header.slice(Self::SIZE, Some(len))?.string(),
            _ => String::new(),
        };

        Ok(Self {
            type_tag,
            header_length,
            name_length,
            body_length,
            child_count,
            reserved,
            name,
        })
    }

    /// Size of the header, name included.
    pub fn size(&self) -> usize {
        self.header_length as usize
    }

    /// Size of the header and the body, children excluded.
    pub fn node_size(&self) -> usize {
        self.size() + self.body_length as usize
    }
}

/// Index of a node within a [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Decoded, type specific contents of a node body.
#[derive(Debug, Clone)]
pub enum NodeKind {
    World(World),
    Transform(Transform),
    LensFlare(LensFlare),
    AmbientLight(AmbientLight),
    Camera(Camera),
    Section(Section),
    Sound(Sound),
    AnimTransform(AnimTransform),
    Mesh(Mesh),
    Collision(Collision),
    Texture(Texture),
    /// A registered kind whose body isn't interpreted.
    Marker,
    /// Unregistered kind, or a body that failed to decode. Only the header and the raw body range
    /// are kept.
    Opaque,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub header: NodeHeader,
    /// `None` if the tag isn't registered in the file's generation
    pub node_type: Option<NodeType>,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Absolute offset of the node within the file
    pub offset: usize,
    /// Absolute range of the body within the file
    pub body: Range<usize>,
    /// Header and body size
    pub size: usize,
    /// Size of the whole subtree
    pub size_with_children: usize,
    /// Set when some of this node's descendants couldn't be located
    pub truncated: bool,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Type name, or the raw tag in hex for unregistered kinds.
    pub fn type_name(&self) -> Cow<'static, str> {
        match self.node_type {
            Some(ty) => Cow::Borrowed(ty.name()),
            None => Cow::Owned(format!("0x{:X}", self.header.type_tag)),
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, NodeKind::Opaque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{range::Endian, test_support::NodeBuilder};

    #[test]
    fn header_with_name() {
        let bytes = NodeBuilder::new(0x3c9).name("track").body(vec![0; 4]).build();
        let range = ByteRange::new(&bytes, Endian::Little);
        let header = NodeHeader::read(&range).unwrap();

        assert_eq!(header.type_tag, 0x3c9);
        assert_eq!(header.name, "track");
        assert_eq!(header.body_length, 4);
        assert_eq!(header.size() % 4, 0);
        assert_eq!(header.node_size(), bytes.len());
    }

    #[test]
    fn header_big_endian() {
        let bytes = NodeBuilder::new(0x06e).name("a").big_endian().build();
        let header = NodeHeader::read(&ByteRange::new(&bytes, Endian::Big)).unwrap();
        assert_eq!(header.type_tag, 0x06e);
        assert_eq!(header.name, "a");
    }

    #[test]
    fn short_names_are_empty() {
        let mut bytes = NodeBuilder::new(0).build();
        bytes[6] = 8;
        let header = NodeHeader::read(&ByteRange::new(&bytes, Endian::Little)).unwrap();
        assert_eq!(header.name, "");
    }

    #[test]
    fn malformed_headers() {
        let mut bytes = NodeBuilder::new(0).build();
        bytes[4] = 12;
        let err = NodeHeader::read(&ByteRange::new(&bytes, Endian::Little)).unwrap_err();
        assert!(matches!(err, DecodeError::Structural { .. }));

        let mut bytes = NodeBuilder::new(0).build();
        bytes[6] = 20;
        let err = NodeHeader::read(&ByteRange::new(&bytes, Endian::Little)).unwrap_err();
        assert!(matches!(err, DecodeError::Structural { .. }));

        let mut bytes = NodeBuilder::new(0).build();
        bytes[4] = 32;
        bytes[6] = 32;
        let err = NodeHeader::read(&ByteRange::new(&bytes, Endian::Little)).unwrap_err();
        assert!(matches!(err, DecodeError::Structural { .. }));

        let err = NodeHeader::read(&ByteRange::new(&bytes[..10], Endian::Little)).unwrap_err();
        assert!(matches!(err, DecodeError::Structural { .. }));
    }
}
