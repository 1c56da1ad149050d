//! Reader for VEXX scene graph containers
//!
//! VEXX files store the scene graphs of a racing game series spanning two console generations:
//! a pre-order serialized tree of transforms, lights, meshes, collision volumes, gameplay markers
//! and textures. Loading a file goes through [`Document::load`], which reconstructs the whole
//! tree into an arena of [`Node`]s, decodes the bodies of every known node kind, and attaches
//! palettes and pixels to texture nodes.
//!
//! Decoding is forgiving. Anything that still leaves the tree layout intact is kept as a
//! [`Diagnostic`] on the document, and unknown or undecodable nodes become
//! [`NodeKind::Opaque`].
//!
//! ```no_run
//! let doc = vexx::Document::load(std::fs::read("track.vex").unwrap()).unwrap();
//! doc.traverse(|node, depth| println!("{}{} ({})", "  ".repeat(depth), node.name(), node.type_name()));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod node;
pub mod nodes;
pub mod range;
pub mod registry;
pub mod stride;
pub mod swizzle;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use config::DecodeOptions;
pub use document::{Document, FileHeader};
pub use error::{DecodeError, Diagnostic};
pub use node::{Node, NodeHeader, NodeId, NodeKind};
pub use range::{ByteRange, Endian};
pub use registry::{Generation, NodeType};
