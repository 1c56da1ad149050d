use clap::Parser;
use log::LevelFilter;
use vexx_utils::{ok, AnyResult};

fn main() -> AnyResult {
    let cli = vexx_tool::Cli::parse_from(wild::args());

    pretty_env_logger::formatted_builder()
        .format_indent(None)
        .format_timestamp(None)
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    vexx_tool::run(cli)?;
    ok()
}
