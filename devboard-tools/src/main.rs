use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use devboard_core::config::BoardConfig;
use devboard_core::BoardRevision;
use devboard_tools::simulate::{self, SimulationOptions};
use devboard_tools::{board_file, report};
use tracing::info;

fn parse_u16_bits(s: &str) -> Result<u16, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value '{}': {}", s, e))
    } else if let Some(bin) = trimmed.strip_prefix("0b") {
        u16::from_str_radix(bin, 2).map_err(|e| format!("Invalid binary value '{}': {}", s, e))
    } else {
        trimmed
            .parse()
            .map_err(|e| format!("Invalid value '{}': {}", s, e))
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Devboard register maps and simulator",
    long_about = None
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a board's register map
    Map(BoardArgs),

    /// List the built-in board revisions
    Revisions,

    /// Run the demo application on a simulated board
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// Built-in board revision (rev-a to rev-e)
    #[arg(short, long, default_value = "rev-c", conflicts_with = "board_file")]
    revision: BoardRevision,

    /// TOML board description to use instead of a built-in revision
    #[arg(short, long)]
    board_file: Option<PathBuf>,
}

impl BoardArgs {
    fn load(&self) -> Result<BoardConfig> {
        match &self.board_file {
            Some(path) => board_file::load(path),
            None => self
                .revision
                .config()
                .with_context(|| format!("Built-in table of {} is invalid", self.revision)),
        }
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// First LCD line
    #[arg(long, default_value = "Hello World")]
    first: String,

    /// Second LCD line
    #[arg(long, default_value = "Second Line")]
    second: String,

    /// Line to type into the first serial port
    #[arg(long)]
    serial: Option<String>,

    /// Button register values, one per poll (comma separated, hex with 0x)
    #[arg(long, value_parser = parse_u16_bits, value_delimiter = ',')]
    buttons: Vec<u16>,

    /// Stop the button echo after this many polls
    #[arg(long, default_value = "64")]
    max_polls: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    match cli.command {
        Commands::Map(args) => {
            let config = args.load()?;
            println!("{}", report::summary(&config));
            print!("{}", report::map_table(&config));
        }
        Commands::Revisions => print!("{}", report::revision_list()),
        Commands::Simulate(args) => run_simulation(args)?,
    }
    Ok(())
}

fn run_simulation(args: SimulateArgs) -> Result<()> {
    let config = args.board.load()?;
    info!("simulating {}", config.name);

    let options = SimulationOptions {
        first: args.first,
        second: args.second,
        serial_input: args.serial,
        buttons: args.buttons,
        max_polls: args.max_polls,
    };
    let result = simulate::run(&config, &options)?;

    println!("{}", report::summary(&config));
    println!("LCD:");
    for line in &result.lcd_lines {
        println!("  |{}|", line);
    }
    println!("LED animation: {} frames", result.frames);
    let history: Vec<String> = result
        .led_history
        .iter()
        .map(|v| format!("{:#06x}", v))
        .collect();
    println!("LED writes: {}", history.join(" "));
    if !result.serial_output.is_empty() {
        println!(
            "Serial: {:?}",
            String::from_utf8_lossy(&result.serial_output)
        );
    }
    println!(
        "Buttons: {} polls, {}",
        result.echo.polls,
        if result.echo.exited {
            "exit pressed"
        } else {
            "poll limit reached"
        }
    );
    println!(
        "Bus: {} accesses, {} faults",
        result.bus_accesses, result.faults
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bits() {
        assert_eq!(parse_u16_bits("0x200"), Ok(0x200));
        assert_eq!(parse_u16_bits("0b101"), Ok(5));
        assert_eq!(parse_u16_bits(" 12 "), Ok(12));
        assert!(parse_u16_bits("0x10000").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_revision_argument() {
        let cli = Cli::try_parse_from(["devboard", "map", "--revision", "rev-d"]).unwrap();
        match cli.command {
            Commands::Map(args) => assert_eq!(args.revision, BoardRevision::RevD),
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["devboard", "map", "--revision", "rev-z"]).is_err());
        assert!(Cli::try_parse_from([
            "devboard",
            "map",
            "--revision",
            "rev-a",
            "--board-file",
            "x.toml"
        ])
        .is_err());
    }
}
