//! Grapiz CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the matchmaking relay
//! - play: Play in the terminal against the AI or hot-seat
//! - match: Pit two AI levels against each other

mod match_cmd;
mod play_cmd;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grapiz")]
#[command(about = "Grapiz hex connection game: relay server, terminal play and AI matches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the matchmaking relay
    Serve(server::ServerArgs),
    /// Play a game in the terminal
    Play(play_cmd::PlayArgs),
    /// Play AI against AI and report results
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Play(args) => play_cmd::run(args),
        Commands::Match(args) => match_cmd::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["grapiz", "serve", "--port", "4000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve(ref a) if a.port == 4000));

        let cli = Cli::try_parse_from(["grapiz", "match", "--games", "2", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Match(ref a) if a.games == 2 && a.json));

        assert!(Cli::try_parse_from(["grapiz", "evolve"]).is_err());
    }
}
