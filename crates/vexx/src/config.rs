//! Decoder options
//!
//! The defaults are tuned for real game files, and every field can be overridden from a TOML
//! table, like this:
//! ```toml
//! max_mesh_chunks = 250
//! decode_textures = false
//! ```

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Upper bound of chunks scanned within a single mesh body. Corrupt length fields would
    /// otherwise make the scan crawl through unrelated data.
    pub max_mesh_chunks: usize,
    /// Maximum nesting depth of the node tree.
    pub max_depth: usize,
    /// Whether to run the texture data pass after the tree is built.
    pub decode_textures: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_mesh_chunks: 100,
            max_depth: 256,
            decode_textures: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeOptions;

    #[test]
    fn partial_tables_keep_defaults() {
        let options: DecodeOptions = toml::from_str("max_mesh_chunks = 8").unwrap();
        assert_eq!(options.max_mesh_chunks, 8);
        assert_eq!(options.max_depth, 256);
        assert!(options.decode_textures);

        let empty: DecodeOptions = toml::from_str("").unwrap();
        assert_eq!(empty, DecodeOptions::default());

        assert!(toml::from_str::<DecodeOptions>("max_chunks = 1").is_err());
    }
}
