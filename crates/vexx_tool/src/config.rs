use serde::Deserialize;
use std::{fs, path::Path};
use vexx::DecodeOptions;
use vexx_utils::{AnyResult, AnyhowResultExt};

/// Contents of a `--config` file.
///
/// ```toml
/// [decode]
/// max_depth = 64
///
/// [textures]
/// all_mips = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub decode: DecodeOptions,
    pub textures: TextureConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureConfig {
    /// Export every mip level, not just the top one
    pub all_mips: bool,
}

impl ToolConfig {
    /// Reads the config file, if there's one.
    pub fn load(path: Option<&Path>) -> AnyResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .otherwise_with(|| format!("couldn't read the config file {}", path.display()))?;
        Self::parse(&text).otherwise_with(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_optional() {
        let config = ToolConfig::parse("[decode]\nmax_depth = 64\n").unwrap();
        assert_eq!(config.decode.max_depth, 64);
        assert_eq!(config.decode.max_mesh_chunks, 100);
        assert!(!config.textures.all_mips);

        let config = ToolConfig::parse("[textures]\nall_mips = true\n").unwrap();
        assert!(config.textures.all_mips);
        assert_eq!(config.decode, DecodeOptions::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ToolConfig::parse("verbose = true").is_err());
        assert!(ToolConfig::parse("[decode]\nmax_chunks = 3").is_err());
    }

    #[test]
    fn missing_file() {
        assert!(ToolConfig::load(None).is_ok());
        assert!(ToolConfig::load(Some(Path::new("/nonexistent/vexx.toml"))).is_err());
    }
}
