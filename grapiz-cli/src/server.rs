//! Server command - start the matchmaking relay
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to grapiz-server crate)
//! - Level 4: configuration validation

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use grapiz_server::{run_server, ServerConfig, DEFAULT_PORT};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds on each player's clock when a match starts
    #[arg(long, default_value_t = grapiz_core::INITIAL_CLOCK_SECS)]
    pub initial_clock: u32,

    /// Directory of static files for a web client
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Fixed seed for session ids
    #[arg(long)]
    pub seed: Option<u64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!(
        "Starting Grapiz relay on port {} (initial clock {}s)",
        config.port,
        config.initial_clock_secs
    );

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    if args.initial_clock == 0 {
        anyhow::bail!("--initial-clock must be at least one second");
    }
    if let Some(dir) = &args.static_dir {
        validate_static_dir(dir)?;
    }

    Ok(ServerConfig {
        port: args.port,
        static_dir: args
            .static_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().to_string()),
        initial_clock_secs: args.initial_clock,
        session_seed: args.seed,
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Validate that static directory exists
fn validate_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but may not serve files.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServerArgs {
        ServerArgs {
            port: 3001,
            initial_clock: 360,
            static_dir: None,
            seed: None,
        }
    }

    #[test]
    fn test_configure_server_defaults() {
        let config = configure_server(&args()).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.initial_clock_secs, 360);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_configure_server_rejects_zero_clock() {
        let args = ServerArgs { initial_clock: 0, ..args() };
        assert!(configure_server(&args).is_err());
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(Path::new("/nonexistent/path"));
        assert!(result.is_ok());
    }
}
