//! Whole VEXX files
//!
//! ```c
//! struct VexxFile {
//!     u32 version;        // 3 or 4 for older titles, 6 for newer ones
//!     u32 nodes_size;
//!     u32 textures_size;
//!     char magic[4];      // "VEXX" in little endian files, "XXEV" in big endian ones
//!     u8 nodes[nodes_size];
//!     u8 textures[textures_size];
//! };
//! ```
//!
//! The texture section holds, for every texture node in pre-order, its palette followed by its
//! pixel data. Nothing in it is addressed directly, so it can only be walked sequentially.

use crate::{
    config::DecodeOptions,
    error::{DecodeError, Diagnostic},
    node::{Node, NodeId, NodeKind},
    nodes::Texture,
    range::{ByteRange, Endian},
    registry::{Generation, NodeType},
    tree::{self, Tree},
};
use log::*;
use std::collections::BTreeMap;
use vexx_utils::string_as_u32;

const MAGIC_LE: u32 = string_as_u32("VEXX");
const MAGIC_BE: u32 = string_as_u32("XXEV");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    pub nodes_size: u32,
    pub textures_size: u32,
    pub endian: Endian,
}

impl FileHeader {
    pub const SIZE: usize = 16;

    /// Reads the header, detecting the file's byte order from its magic.
    pub fn read(data: &[u8]) -> Result<Self, DecodeError> {
        let probe = ByteRange::new(data, Endian::Little);
        let endian = match probe.u32(12)? {
            MAGIC_LE => Endian::Little,
            MAGIC_BE => Endian::Big,
            _ => return Err(DecodeError::BadMagic(probe.u8_array(12)?)),
        };

        let range = ByteRange::new(data, endian);
        Ok(Self {
            version: range.u32(0)?,
            nodes_size: range.u32(4)?,
            textures_size: range.u32(8)?,
            endian,
        })
    }

    pub fn nodes_begin(&self) -> usize {
        Self::SIZE
    }

    pub fn textures_begin(&self) -> usize {
        self.nodes_begin() + self.nodes_size as usize
    }

    /// Size of the file as declared by the header.
    pub fn total_size(&self) -> usize {
        self.textures_begin() + self.textures_size as usize
    }
}

/// A decoded VEXX file. Owns the file's bytes and the node arena.
#[derive(Debug)]
pub struct Document {
    data: Vec<u8>,
    header: FileHeader,
    generation: Option<Generation>,
    nodes: Vec<Node>,
    diagnostics: Vec<Diagnostic>,
}

impl Document {
    pub fn load(data: Vec<u8>) -> Result<Self, DecodeError> {
        Self::load_with(data, &DecodeOptions::default())
    }

    /// Decodes a whole file. Problems that still leave a usable tree behind are reported through
    /// [`Document::diagnostics`], the returned error is reserved for files that can't be read at
    /// all: an unknown magic, sections that don't fit the buffer and an unreadable root node.
    pub fn load_with(data: Vec<u8>, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let header = FileHeader::read(&data)?;
        let mut diagnostics = Vec::new();
        let mut report = |error: DecodeError| {
            let diagnostic = Diagnostic { node: None, error };
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
        };

        if header.total_size() != data.len() {
            report(DecodeError::SizeMismatch {
                what: "file",
                expected: header.total_size(),
                found: data.len(),
            });
        }

        let generation = Generation::from_version(header.version);
        if generation.is_none() {
            report(DecodeError::structural(
                0,
                format!(
                    "unsupported version {}, node bodies won't be decoded",
                    header.version
                ),
            ));
        }

        let file = ByteRange::new(&data, header.endian);
        let nodes_range = file.absolute(header.nodes_begin(), header.textures_begin())?;
        let textures_range = file.absolute(header.textures_begin(), header.total_size())?;

        debug!(
            "Loading VEXX v{} ({:?} endian), {} bytes of nodes, {} bytes of textures",
            header.version, header.endian, header.nodes_size, header.textures_size
        );

        let Tree {
            mut nodes,
            diagnostics: tree_diagnostics,
        } = tree::build(&nodes_range, generation, options)?;
        diagnostics.extend(tree_diagnostics);

        if generation.is_some() && nodes[0].node_type != Some(NodeType::World) {
            let diagnostic = Diagnostic {
                node: Some(nodes[0].id),
                error: DecodeError::structural(
                    nodes[0].offset,
                    format!("root node is {}, not WORLD", nodes[0].type_name()),
                ),
            };
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
        }

        if options.decode_textures {
            decode_textures(&textures_range, &mut nodes, &mut diagnostics);
        }

        debug!(
            "Loaded {} nodes with {} diagnostics",
            nodes.len(),
            diagnostics.len()
        );

        Ok(Self {
            data,
            header,
            generation,
            nodes,
            diagnostics,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// `None` for versions without a known tag table.
    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }

    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All nodes, in pre-order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().map(move |&id| self.node(id))
    }

    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent.map(|id| self.node(id))
    }

    /// Number of ancestors of a node.
    pub fn depth(&self, node: &Node) -> usize {
        std::iter::successors(self.parent(node), |n| self.parent(n)).count()
    }

    /// Names of the nodes leading from the root to `node`, inclusive.
    pub fn path<'a>(&'a self, node: &'a Node) -> Vec<&'a str> {
        let mut path: Vec<&str> = std::iter::successors(Some(node), |n| self.parent(n))
            .map(Node::name)
            .collect();
        path.reverse();
        path
    }

    /// Visits every node in pre-order, along with its depth.
    pub fn traverse(&self, mut visit: impl FnMut(&Node, usize)) {
        fn walk(doc: &Document, node: &Node, depth: usize, visit: &mut impl FnMut(&Node, usize)) {
            visit(node, depth);
            for child in doc.children(node) {
                walk(doc, child, depth + 1, visit);
            }
        }
        walk(self, self.root(), 0, &mut visit);
    }

    pub fn filter<'a>(
        &'a self,
        mut predicate: impl FnMut(&Node) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |node| predicate(node))
    }

    /// Every decoded texture node, in pre-order.
    pub fn textures(&self) -> impl Iterator<Item = (&Node, &Texture)> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Texture(texture) => Some((node, texture)),
            _ => None,
        })
    }

    /// The raw body of a node, as a view in the file's byte order.
    pub fn body(&self, node: &Node) -> ByteRange {
        ByteRange::new(&self.data, self.header.endian)
            .slice(node.body.start, Some(node.body.len()))
            .unwrap_or_else(|_| ByteRange::new(&[], self.header.endian))
    }

    /// Number of nodes of each type, keyed by type name.
    pub fn count_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.type_name().into_owned()).or_insert(0) += 1;
        }
        counts
    }
}

/// Walks the texture section, attaching palettes and pixels to texture nodes.
fn decode_textures(textures: &ByteRange, nodes: &mut [Node], diagnostics: &mut Vec<Diagnostic>) {
    let mut offset = 0;
    for node in nodes.iter_mut() {
        let id = node.id;
        let texture = match &mut node.kind {
            NodeKind::Texture(texture) => texture,
            _ if node.node_type == Some(NodeType::Texture) => {
                let diagnostic = Diagnostic {
                    node: Some(id),
                    error: DecodeError::Texture(
                        "undecodable texture node, the rest of the texture section is unreachable"
                            .into(),
                    ),
                };
                warn!("{diagnostic}");
                diagnostics.push(diagnostic);
                return;
            }
            _ => continue,
        };

        let cmap_size = texture.cmap_size as usize;
        let data_size = texture.data_size as usize;
        let ranges = textures
            .slice(offset, Some(cmap_size))
            .and_then(|cmap| Ok((cmap, textures.slice(offset + cmap_size, Some(data_size))?)));
        offset += cmap_size + data_size;

        let result = ranges
            .map_err(|e| {
                DecodeError::Texture(format!(
                    "`{}` doesn't fit in the texture section: {e}",
                    texture.name
                ))
            })
            .and_then(|(cmap, data)| texture.decode_pixels(&cmap, &data));

        if let Err(error) = result {
            let diagnostic = Diagnostic {
                node: Some(id),
                error,
            };
            warn!("{diagnostic}");
            diagnostics.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        nodes::texture::tests::{grey_palette, texture_body},
        registry::tag_of,
        test_support::{vexx_file, NodeBuilder, Writer, IDENTITY},
    };
    use glam::Mat4;

    fn world_with_transform() -> Vec<u8> {
        NodeBuilder::new(0x0f3)
            .body(vec![0; 8])
            .child(NodeBuilder::new(0x06d).body(Writer::new().f32s(&IDENTITY).finish()))
            .build()
    }

    #[test]
    fn little_endian_file() {
        let doc = Document::load(vexx_file(4, b"VEXX", &world_with_transform(), &[])).unwrap();

        assert!(doc.diagnostics().is_empty(), "{:?}", doc.diagnostics());
        assert_eq!(doc.generation(), Some(Generation::V4));
        assert_eq!(doc.endian(), Endian::Little);
        assert_eq!(doc.header().nodes_size, 16 + 8 + 16 + 64);

        let root = doc.root();
        assert!(matches!(root.kind, NodeKind::World(_)));
        let children: Vec<&Node> = doc.children(root).collect();
        assert_eq!(children.len(), 1);
        assert!(matches!(&children[0].kind, NodeKind::Transform(t) if t.matrix == Mat4::IDENTITY));
        assert_eq!(children[0].offset, 16 + 16 + 8);
        assert_eq!(doc.depth(children[0]), 1);
    }

    #[test]
    fn big_endian_file() {
        let world = tag_of(Generation::V6, NodeType::World).unwrap();
        let transform = tag_of(Generation::V6, NodeType::Transform).unwrap();
        let nodes = NodeBuilder::new(world)
            .big_endian()
            .name("track")
            .child(
                NodeBuilder::new(transform)
                    .name("start")
                    .body(Writer::with_endian(Endian::Big).f32s(&IDENTITY).finish()),
            )
            .build();
        let doc = Document::load(vexx_file(6, b"XXEV", &nodes, &[])).unwrap();

        assert!(doc.diagnostics().is_empty(), "{:?}", doc.diagnostics());
        assert_eq!(doc.endian(), Endian::Big);
        assert_eq!(doc.header().version, 6);
        let child = doc.children(doc.root()).next().unwrap();
        assert!(matches!(&child.kind, NodeKind::Transform(t) if t.matrix == Mat4::IDENTITY));
        assert_eq!(doc.body(child).endian(), Endian::Big);
        assert_eq!(doc.body(child).len(), 64);
        assert_eq!(doc.path(child), vec!["track", "start"]);
    }

    #[test]
    fn bad_magic() {
        let data = vexx_file(4, b"ABCD", &world_with_transform(), &[]);
        assert_eq!(
            Document::load(data).unwrap_err(),
            DecodeError::BadMagic(*b"ABCD")
        );
        assert!(matches!(
            Document::load(vec![0; 10]),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn trailing_bytes_only_warn() {
        let mut data = vexx_file(4, b"VEXX", &world_with_transform(), &[]);
        data.extend_from_slice(&[0; 8]);
        let doc = Document::load(data).unwrap();

        assert_eq!(doc.nodes().len(), 2);
        assert_eq!(doc.diagnostics().len(), 1);
        assert!(matches!(
            doc.diagnostics()[0].error,
            DecodeError::SizeMismatch { what: "file", .. }
        ));
    }

    #[test]
    fn sections_must_fit() {
        let mut data = vexx_file(4, b"VEXX", &world_with_transform(), &[0; 32]);
        data.truncate(data.len() - 16);
        assert!(matches!(
            Document::load(data),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn root_other_than_world() {
        let nodes = NodeBuilder::new(0x06d).body(Writer::new().f32s(&IDENTITY).finish()).build();
        let doc = Document::load(vexx_file(4, b"VEXX", &nodes, &[])).unwrap();
        assert_eq!(doc.diagnostics().len(), 1);
        assert_eq!(doc.diagnostics()[0].node, Some(doc.root().id));
    }

    #[test]
    fn unsupported_version() {
        let doc = Document::load(vexx_file(5, b"VEXX", &world_with_transform(), &[])).unwrap();
        assert_eq!(doc.generation(), None);
        assert_eq!(doc.nodes().len(), 2);
        assert!(doc.nodes().iter().all(Node::is_opaque));
        assert_eq!(doc.diagnostics().len(), 1);
    }

    fn sized_texture(mut body: Vec<u8>, cmap_size: u32, data_size: u32) -> Vec<u8> {
        body[8..12].copy_from_slice(&cmap_size.to_le_bytes());
        body[12..16].copy_from_slice(&data_size.to_le_bytes());
        body
    }

    fn textured_file() -> Vec<u8> {
        let texture = tag_of(Generation::V4, NodeType::Texture).unwrap();
        let nodes = NodeBuilder::new(0x0f3)
            .child(
                NodeBuilder::new(tag_of(Generation::V4, NodeType::Group).unwrap()).child(
                    NodeBuilder::new(texture)
                        .body(sized_texture(texture_body(2, 2, 4, 1, 0, "small"), 64, 32)),
                ),
            )
            .child(
                NodeBuilder::new(texture)
                    .body(sized_texture(texture_body(1, 1, 8, 1, 0, "dot"), 1024, 16)),
            )
            .build();

        let mut textures = grey_palette(16);
        let mut pixels = vec![0u8; 32];
        pixels[0] = 0x21;
        pixels[16] = 0x03;
        textures.extend(pixels);
        textures.extend(grey_palette(256));
        let mut pixels = vec![0u8; 16];
        pixels[0] = 5;
        textures.extend(pixels);

        vexx_file(4, b"VEXX", &nodes, &textures)
    }

    #[test]
    fn textures_are_read_in_order() {
        let doc = Document::load(textured_file()).unwrap();
        assert!(doc.diagnostics().is_empty(), "{:?}", doc.diagnostics());

        let textures: Vec<&Texture> = doc.textures().map(|(_, t)| t).collect();
        assert_eq!(textures.len(), 2);

        assert_eq!(textures[0].name, "small");
        assert_eq!(textures[0].palette.len(), 16);
        assert_eq!(
            textures[0].mips[0].rgba,
            vec![1, 2, 3, 254, 2, 4, 6, 253, 3, 6, 9, 252, 0, 0, 0, 255]
        );

        assert_eq!(textures[1].name, "dot");
        assert_eq!(textures[1].mips[0].rgba, vec![5, 10, 15, 250]);
    }

    #[test]
    fn textures_can_be_skipped() {
        let options = DecodeOptions {
            decode_textures: false,
            ..Default::default()
        };
        let doc = Document::load_with(textured_file(), &options).unwrap();
        assert_eq!(doc.textures().count(), 2);
        assert!(doc.textures().all(|(_, t)| t.mips.is_empty()));
    }

    #[test]
    fn truncated_texture_section() {
        let mut data = textured_file();
        let nodes_size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        data.truncate(data.len() - 16);
        let textures_size = (data.len() - 16 - nodes_size as usize) as u32;
        data[8..12].copy_from_slice(&textures_size.to_le_bytes());

        let doc = Document::load(data).unwrap();
        assert_eq!(doc.diagnostics().len(), 1);
        assert!(matches!(doc.diagnostics()[0].error, DecodeError::Texture(_)));
        let textures: Vec<&Texture> = doc.textures().map(|(_, t)| t).collect();
        assert_eq!(textures[0].mips.len(), 1);
        assert!(textures[1].mips.is_empty());
    }

    #[test]
    fn queries() {
        let doc = Document::load(textured_file()).unwrap();

        let mut visited = Vec::new();
        doc.traverse(|node, depth| visited.push((node.type_name().into_owned(), depth)));
        assert_eq!(
            visited,
            vec![
                ("WORLD".to_string(), 0),
                ("GROUP".to_string(), 1),
                ("TEXTURE".to_string(), 2),
                ("TEXTURE".to_string(), 1),
            ]
        );

        let counts = doc.count_by_type();
        assert_eq!(counts["TEXTURE"], 2);
        assert_eq!(counts["WORLD"], 1);

        let groups: Vec<&Node> = doc.filter(|n| n.node_type == Some(NodeType::Group)).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(doc.parent(groups[0]).map(|n| n.id), Some(doc.root().id));
    }
}
