use crate::config::ToolConfig;
use log::*;
use std::{fs, path::Path};
use vexx::Document;
use vexx_utils::{AnyResult, AnyhowResultExt};

pub mod info;
pub mod textures;
pub mod tree;

/// Reads and decodes a file with the configured options.
pub fn load_document(path: &Path, config: &ToolConfig) -> AnyResult<Document> {
    let data = fs::read(path).otherwise_with(|| format!("couldn't read {}", path.display()))?;
    info!("Loading {} ({} bytes)", path.display(), data.len());
    Document::load_with(data, &config.decode)
        .otherwise_with(|| format!("{} is not a readable VEXX file", path.display()))
}
