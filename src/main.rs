// Groupware MCP Gateway - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and MCP stdio server.
// Usage:
//   groupware-mcp-gate serve                                  # Run MCP server (stdio)
//   groupware-mcp-gate check-filter <file>                    # Validate a filter file
//   groupware-mcp-gate filter --tool <name> [input.json]      # Apply filter to a JSON document

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use groupware_mcp_gate::{
    config::{GatewayConfig, DEFAULT_TIMEOUT_SECS},
    field_path::FieldPath,
    filter_config::{FilterConfig, FILTER_CONFIG_ENV},
    gateway::Gateway,
    groupware::GroupwareClient,
    mcp, FilterConfigStore, ResponseFilter,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "groupware-mcp-gate")]
#[command(version)]
#[command(about = "Groupware MCP Gateway - MCP tools over a groupware REST API with response filtering")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCP server (stdio JSON-RPC)
    Serve {
        /// Groupware base URL, e.g. https://example.cybozu.com/g
        #[arg(long, env = "GROUPWARE_BASE_URL")]
        base_url: String,

        #[arg(long, env = "GROUPWARE_USERNAME")]
        username: String,

        #[arg(long, env = "GROUPWARE_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,

        /// HTTP timeout in seconds
        #[arg(long, env = "GROUPWARE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Response filter file (unset = filtering disabled)
        #[arg(long, env = FILTER_CONFIG_ENV)]
        filter_config: Option<PathBuf>,
    },

    /// Validate a filter file and every path in it
    CheckFilter {
        file: PathBuf,
    },

    /// Apply a tool's filter to a JSON document (file or stdin) and print it
    Filter {
        /// Tool name whose paths to apply
        #[arg(long)]
        tool: String,

        /// Filter file; defaults to $GROUPWARE_FILTER_CONFIG
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON input; stdin when omitted
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging (safe if already init). stderr only; stdout is JSON-RPC.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { base_url, username, password, timeout_secs, filter_config } => {
            let config = GatewayConfig {
                base_url,
                username,
                password,
                timeout_secs,
                filter_config,
            }
            .validate()
            .context("Invalid gateway configuration")?;

            // Load once, before any request is handled
            let store = FilterConfigStore::initialize(config.filter_config.clone());
            let filter = ResponseFilter::new(store);

            let client = GroupwareClient::new(config).map_err(anyhow::Error::msg)?;
            let gateway = Gateway::new(client, filter).context("Failed to build tool catalogue")?;

            mcp::run(&gateway).context("MCP server I/O failed")?;
        }

        Commands::CheckFilter { file } => {
            let config = FilterConfig::load(&file)
                .with_context(|| format!("Failed to load filter config {:?}", file))?;

            let mut broken = 0;
            println!("Filter config {:?} (version {})", file, config.version);
            for tool in config.tools.keys() {
                let paths = config.paths_for(tool).unwrap_or_default();
                println!("  {} ({} path(s))", tool, paths.len());
                for path in paths {
                    match FieldPath::parse(path) {
                        Ok(p) if p.is_empty() => println!("    noop  {:?} (matches nothing)", path),
                        Ok(_) => println!("    ok    {}", path),
                        Err(e) => {
                            broken += 1;
                            println!("    ERROR {}", e);
                        }
                    }
                }
            }

            if broken > 0 {
                bail!("{} malformed path(s) in {:?}", broken, file);
            }
        }

        Commands::Filter { tool, config, input } => {
            let store = FilterConfigStore::initialize(config);
            if !store.is_enabled() {
                bail!("No filter configuration loaded (pass --config or set {})", FILTER_CONFIG_ENV);
            }
            if store.configuration().and_then(|c| c.paths_for(&tool)).is_none() {
                log::warn!("No filter entry for tool '{}', output will be unchanged", tool);
            }
            let filter = ResponseFilter::new(store);

            let raw = match &input {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {:?}", path))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
                    buf
                }
            };
            let document: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| "Input is not valid JSON")?;

            let filtered = filter.apply(&document, &tool)?;
            println!("{}", serde_json::to_string_pretty(&*filtered)?);
        }
    }

    Ok(())
}
