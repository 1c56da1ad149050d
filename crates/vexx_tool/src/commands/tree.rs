use super::load_document;
use crate::config::ToolConfig;
use clap::Args;
use itertools::Itertools;
use std::{fmt::Write, path::PathBuf};
use vexx::{geometry, nodes::Mesh, Document, Node, NodeKind};
use vexx_utils::{ok, AnyResult};

#[derive(Args)]
pub struct TreeCommand {
    /// Path to the VEXX file.
    pub file_path: PathBuf,
    /// Only print nodes up to this depth.
    #[arg(long)]
    pub depth: Option<usize>,
    /// Also print decoded mesh, texture, collision and animation contents.
    #[arg(long)]
    pub details: bool,
}

impl crate::Command for TreeCommand {
    fn run(self, config: &ToolConfig) -> AnyResult {
        let doc = load_document(&self.file_path, config)?;
        print!("{}", render_tree(&doc, self.depth, self.details));
        ok()
    }
}

/// One line per node: name, type, child count and byte range, indented by depth. With `details`,
/// each node is followed by a summary of its decoded contents.
pub fn render_tree(doc: &Document, max_depth: Option<usize>, details: bool) -> String {
    let mut out = String::new();
    doc.traverse(|node, depth| {
        if max_depth.map_or(false, |max| depth > max) {
            return;
        }
        let name = match node.name() {
            "" => "<unnamed>",
            name => name,
        };
        let _ = writeln!(
            out,
            "{}{} [{}] ({} children) {:#x}..{:#x}{}",
            "  ".repeat(depth),
            name,
            node.type_name(),
            node.children.len(),
            node.offset,
            node.offset + node.size_with_children,
            flags(node),
        );
        if details {
            for line in node_details(node) {
                let _ = writeln!(out, "{}- {line}", "  ".repeat(depth + 1));
            }
        }
    });
    out
}

fn node_details(node: &Node) -> Vec<String> {
    match &node.kind {
        NodeKind::Mesh(mesh) => mesh_details(mesh),
        NodeKind::Texture(texture) => vec![format!(
            "texture {}x{}, {} bpp, {} mips, {} decoded{}{}",
            texture.width,
            texture.height,
            texture.bits_per_pixel(),
            texture.mip_count,
            texture.mips.len(),
            if texture.is_swizzled() { ", swizzled" } else { "" },
            if texture.external { ", external" } else { "" },
        )],
        NodeKind::Collision(collision) => vec![format!(
            "collision: {} blocks, {} triangles",
            collision.blocks.len(),
            geometry::collision_triangles(collision).len()
        )],
        NodeKind::AnimTransform(anim) => vec![format!(
            "anim: base {}, scale {}, tracks of {} and {} keys",
            anim.base,
            anim.scale,
            anim.track1.as_ref().map_or(0, |t| t.keys.len()),
            anim.track2.as_ref().map_or(0, |t| t.keys.len()),
        )],
        _ => Vec::new(),
    }
}

fn mesh_details(mesh: &Mesh) -> Vec<String> {
    let triangles: usize = mesh
        .chunks
        .iter()
        .filter_map(geometry::chunk_geometry)
        .map(|g| g.triangle_count())
        .sum();
    let mut lines = vec![format!(
        "mesh: {} chunks ({} valid), {} triangles, materials [{}]",
        mesh.chunks.len(),
        mesh.chunks.iter().filter(|c| c.valid).count(),
        triangles,
        mesh.materials.iter().map(|m| m.texture_id).join(", "),
    )];
    if let Some(id) = mesh.external_id {
        lines.push(format!("external id {id}, {} chunk links", mesh.links.len()));
    }
    lines.extend(mesh.links.iter().map(|link| {
        format!(
            "link: uv ({}, {}), quat1 {:?}, quat2 {:?}, unknown {}",
            link.uv.x, link.uv.y, link.quat1, link.quat2, link.unknown
        )
    }));
    lines
}

fn flags(node: &Node) -> String {
    let flags = [
        matches!(node.kind, NodeKind::Opaque).then_some("opaque"),
        node.truncated.then_some("truncated"),
    ];
    match flags.iter().flatten().join(", ") {
        joined if joined.is_empty() => String::new(),
        joined => format!(" <{joined}>"),
    }
}
