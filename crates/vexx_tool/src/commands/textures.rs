use super::load_document;
use crate::config::ToolConfig;
use anyhow::ensure;
use clap::Args;
use image::RgbaImage;
use std::{collections::HashMap, fs, path::PathBuf};
use vexx::nodes::{Mip, Texture};
use vexx_utils::{ok, AnyResult, AnyhowResultExt};

#[derive(Args)]
pub struct TexturesCommand {
    /// Path to the VEXX file.
    pub file_path: PathBuf,
    /// Output directory
    #[clap(long, short = 'o')]
    pub output: PathBuf,
    /// Export every mip level, not just the top one
    #[arg(long)]
    pub all_mips: bool,
}

impl crate::Command for TexturesCommand {
    fn run(self, config: &ToolConfig) -> AnyResult {
        let doc = load_document(&self.file_path, config)?;
        ensure!(
            config.decode.decode_textures,
            "texture decoding is disabled in the config"
        );
        fs::create_dir_all(&self.output)
            .otherwise_with(|| format!("couldn't create {}", self.output.display()))?;

        let all_mips = self.all_mips || config.textures.all_mips;
        let mut names = FileNames::default();

        println!(" : Writing textures...");
        for (index, (node, texture)) in doc.textures().enumerate() {
            if texture.mips.is_empty() {
                println!("  - Skipping #{index} `{}`, no pixel data", texture.name);
                continue;
            }

            let stem = names.unique(&base_name(index, texture));
            let mips = match all_mips {
                true => texture.mips.len(),
                false => 1,
            };
            for (level, mip) in texture.mips.iter().take(mips).enumerate() {
                let file_name = match level {
                    0 => format!("{stem}.png"),
                    n => format!("{stem}_mip{n}.png"),
                };
                println!("  - Writing {file_name} ({}x{})...", mip.width, mip.height);
                to_image(mip)?
                    .save(self.output.join(&file_name))
                    .otherwise_with(|| format!("couldn't write {file_name} (node #{})", node.id.index()))?;
            }
        }

        ok()
    }
}

fn base_name(index: usize, texture: &Texture) -> String {
    let sanitized: String = texture
        .name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    match sanitized.trim() {
        "" => format!("texture_{index}"),
        name => name.to_string(),
    }
}

/// Hands out file stems that haven't been used yet.
#[derive(Default)]
struct FileNames {
    used: HashMap<String, usize>,
}

impl FileNames {
    fn unique(&mut self, stem: &str) -> String {
        let count = self.used.entry(stem.to_lowercase()).or_insert(0);
        *count += 1;
        match *count {
            1 => stem.to_string(),
            n => format!("{stem}_{n}"),
        }
    }
}

pub fn to_image(mip: &Mip) -> AnyResult<RgbaImage> {
    RgbaImage::from_raw(mip.width, mip.height, mip.rgba.clone())
        .otherwise_with(|| format!("{}x{} mip has {} bytes of pixels", mip.width, mip.height, mip.rgba.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deduplicated() {
        let mut names = FileNames::default();
        assert_eq!(names.unique("road"), "road");
        assert_eq!(names.unique("Road"), "Road_2");
        assert_eq!(names.unique("sky"), "sky");
    }

    #[test]
    fn mips_become_images() {
        let mip = Mip {
            width: 2,
            height: 1,
            rgba: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        let image = to_image(&mip).unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [5, 6, 7, 8]);

        let broken = Mip {
            width: 4,
            height: 4,
            rgba: vec![0; 4],
        };
        assert!(to_image(&broken).is_err());
    }
}
