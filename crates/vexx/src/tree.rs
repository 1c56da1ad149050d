//! Reconstruction of the node tree from its pre-order serialization
//!
//! Children carry no offsets. The first child starts right after its parent's body, and every
//! next one starts after the whole subtree of the previous sibling. Because of that, a node whose
//! header can't be read makes everything after it unreachable, while a node whose body fails to
//! decode is still fully placed, since its size only depends on its header.

use crate::{
    config::DecodeOptions,
    error::{DecodeError, Diagnostic},
    node::{Node, NodeHeader, NodeId, NodeKind},
    nodes::{decode_body, DecodeContext},
    range::ByteRange,
    registry::{self, Generation, NodeType},
};
use log::*;

/// Nodes of a decoded tree, in pre-order. The root is always the first node.
#[derive(Debug, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the tree rooted at the beginning of `range`.
///
/// Without a generation, tags can't be interpreted, so every node is kept opaque. Only a failure
/// to place the root itself is returned as an error.
pub fn build(
    range: &ByteRange,
    generation: Option<Generation>,
    options: &DecodeOptions,
) -> Result<Tree, DecodeError> {
    let mut builder = TreeBuilder {
        generation,
        options,
        tree: Tree::default(),
    };
    builder.read_node(range, None, 0)?;
    Ok(builder.tree)
}

struct TreeBuilder<'o> {
    generation: Option<Generation>,
    options: &'o DecodeOptions,
    tree: Tree,
}

impl<'o> TreeBuilder<'o> {
    fn read_node(
        &mut self,
        range: &ByteRange,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId, DecodeError> {
        let offset = range.begin();
        if depth > self.options.max_depth {
            return Err(DecodeError::structural(
                offset,
                format!("nodes nested deeper than {}", self.options.max_depth),
            ));
        }

        let header = NodeHeader::read(range)?;
        let size = header.node_size();
        if size > range.len() {
            return Err(DecodeError::structural(
                offset,
                format!("node of {size} bytes overruns its {} byte window", range.len()),
            ));
        }
        let body = range.slice(header.size(), Some(header.body_length as usize))?;

        let id = NodeId(self.tree.nodes.len());
        trace!(
            "Node #{} `{}` (tag {:#x}) at {offset:#x}, {} children",
            id.index(),
            header.name,
            header.type_tag,
            header.child_count
        );
        let (node_type, kind) = self.decode(id, &header, &body);
        let child_count = header.child_count;
        self.tree.nodes.push(Node {
            id,
            header,
            node_type,
            kind,
            parent,
            children: Vec::with_capacity(child_count as usize),
            offset,
            body: body.range(),
            size,
            size_with_children: size,
            truncated: false,
        });

        for _ in 0..child_count {
            let next = self.tree.nodes[id.0].size_with_children;
            let child = range
                .slice(next, None)
                .map_err(|e| e.into_structural(offset + next, "child outside of its parent"))
                .and_then(|child_range| self.read_node(&child_range, Some(id), depth + 1));

            let child = match child {
                Ok(child) => child,
                Err(error) => {
                    self.report(Some(id), error);
                    self.tree.nodes[id.0].truncated = true;
                    break;
                }
            };

            let (child_size, child_truncated) = {
                let child = &self.tree.nodes[child.0];
                (child.size_with_children, child.truncated)
            };
            let node = &mut self.tree.nodes[id.0];
            node.children.push(child);
            node.size_with_children += child_size;

            // Nothing past a truncated subtree can be located
            if child_truncated {
                node.truncated = true;
                break;
            }
        }

        Ok(id)
    }

    fn decode(
        &mut self,
        id: NodeId,
        header: &NodeHeader,
        body: &ByteRange,
    ) -> (Option<NodeType>, NodeKind) {
        let generation = match self.generation {
            Some(generation) => generation,
            None => return (None, NodeKind::Opaque),
        };

        let node_type = match registry::lookup(generation, header.type_tag) {
            Some(node_type) => node_type,
            None => {
                self.report(
                    Some(id),
                    DecodeError::UnknownType {
                        tag: header.type_tag,
                        offset: body.begin() - header.size(),
                    },
                );
                return (None, NodeKind::Opaque);
            }
        };

        let mut ctx = DecodeContext::new(generation, self.options);
        let result = decode_body(node_type, &mut ctx, body);
        for warning in ctx.take_warnings() {
            self.report(Some(id), warning);
        }

        match result {
            Ok(kind) => (Some(node_type), kind),
            Err(error) => {
                self.report(Some(id), error);
                (Some(node_type), NodeKind::Opaque)
            }
        }
    }

    fn report(&mut self, node: Option<NodeId>, error: DecodeError) {
        let diagnostic = Diagnostic { node, error };
        warn!("{diagnostic}");
        self.tree.diagnostics.push(diagnostic);
    }
}
