//! Command line tooling for VEXX files
//!
//! Dumps node trees, summarizes files and exports their textures.

use clap::{ArgAction, Parser, Subcommand};
use commands::{info::InfoCommand, textures::TexturesCommand, tree::TreeCommand};
use config::ToolConfig;
use std::path::PathBuf;
use vexx_utils::{ok, AnyResult};

pub mod commands;
pub mod config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with decoder options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Increases logging verbosity, can be repeated
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Prints the node tree of a file
    Tree(TreeCommand),
    /// Prints a summary of a file
    Info(InfoCommand),
    /// Exports the textures of a file as PNG images
    Textures(TexturesCommand),
}

pub trait Command {
    fn run(self, config: &ToolConfig) -> AnyResult;
}

/// Runs the tool as if it was ran from the command line.
pub fn run(cli: Cli) -> AnyResult {
    let config = ToolConfig::load(cli.config.as_deref())?;
    match cli.command {
        CliCommand::Tree(c) => c.run(&config)?,
        CliCommand::Info(c) => c.run(&config)?,
        CliCommand::Textures(c) => c.run(&config)?,
    }
    ok()
}
