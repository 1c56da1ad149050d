use super::load_document;
use crate::config::ToolConfig;
use clap::Args;
use itertools::Itertools;
use std::{cmp::Reverse, path::PathBuf};
use vexx::Document;
use vexx_utils::{ok, AnyResult};

#[derive(Args)]
pub struct InfoCommand {
    /// Path to the VEXX file.
    pub file_path: PathBuf,
}

impl crate::Command for InfoCommand {
    fn run(self, config: &ToolConfig) -> AnyResult {
        let doc = load_document(&self.file_path, config)?;
        print!("{}", summarize(&doc));
        ok()
    }
}

pub fn summarize(doc: &Document) -> String {
    let header = doc.header();
    let generation = match doc.generation() {
        Some(generation) => format!("{generation:?}"),
        None => "unknown".to_string(),
    };

    let mut lines = vec![
        format!("Version:    {} ({generation})", header.version),
        format!("Byte order: {:?} endian", header.endian),
        format!("Nodes:      {} bytes, {} nodes", header.nodes_size, doc.nodes().len()),
        format!("Textures:   {} bytes, {} textures", header.textures_size, doc.textures().count()),
        String::new(),
    ];

    lines.extend(
        doc.count_by_type()
            .into_iter()
            .sorted_by_key(|(name, count)| (Reverse(*count), name.clone()))
            .map(|(name, count)| format!("{count:>6}  {name}")),
    );

    if !doc.diagnostics().is_empty() {
        lines.push(String::new());
        lines.push(format!("{} warnings:", doc.diagnostics().len()));
        lines.extend(doc.diagnostics().iter().map(|d| format!("  {d}")));
    }

    lines.into_iter().map(|line| line + "\n").collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tree::tests::tiny_file;

    #[test]
    fn summary_lists_types_and_warnings() {
        let doc = Document::load(tiny_file()).unwrap();
        let summary = summarize(&doc);
        assert!(summary.contains("Version:    4 (V4)"));
        assert!(summary.contains("Little endian"));
        assert!(summary.contains("     1  WORLD"));
        assert!(summary.contains("     1  0xBEEF"));
        assert!(summary.contains("1 warnings:"));
    }
}
