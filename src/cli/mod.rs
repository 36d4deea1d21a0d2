//! CLI module for the Missive command-line interface.
//!
//! Provides subcommands next to the server:
//! - `preview <file>` - Render a preview command through a running server
//! - `config check` - Validate configuration file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "missive")]
#[command(author, version, about = "Preview rendering service for notification emails", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "missive.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to (default: http://localhost:8080)
    #[arg(long, env = "MISSIVE_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Authentication token (can also be set via MISSIVE_TOKEN env var)
    #[arg(long, env = "MISSIVE_TOKEN")]
    pub token: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a preview from a JSON file holding `contentType` and `content`
    Preview {
        /// Path to the preview command JSON
        file: PathBuf,
        /// Organization whose branding is applied
        #[arg(long)]
        organization: String,
        /// Environment identifier forwarded with the request
        #[arg(long, default_value = "")]
        environment: String,
        /// User identifier forwarded with the request
        #[arg(long, default_value = "")]
        user: String,
        /// Write the HTML to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Successful preview response
#[derive(Debug, Deserialize)]
pub struct PreviewResponse {
    pub html: String,
}

/// API error envelope
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Create an HTTP client with the given token
fn create_client(token: Option<&str>) -> Result<Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(token) = token {
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", token)
                .parse()
                .context("Invalid token format")?,
        );
    }

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")
}

/// Run a CLI command
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Preview {
            file,
            organization,
            environment,
            user,
            output,
        }) => {
            cmd_preview(cli, file, organization, environment, user, output.as_deref()).await
        }
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        None => {
            // No subcommand means start the server - this is handled in main.rs
            Ok(())
        }
    }
}

/// Send a preview command to the server and print the HTML
async fn cmd_preview(
    cli: &Cli,
    file: &Path,
    organization: &str,
    environment: &str,
    user: &str,
    output: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read preview file: {}", file.display()))?;
    let body: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", file.display()))?;

    let client = create_client(cli.token.as_deref())?;
    let url = format!(
        "{}/api/content-templates/preview/email",
        cli.api_url.trim_end_matches('/')
    );

    let response = client
        .post(&url)
        .header("X-Organization-Id", organization)
        .header("X-Environment-Id", environment)
        .header("X-User-Id", user)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Failed to connect to {}", cli.api_url))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("{}", describe_error(status.as_u16(), &text));
    }

    let preview: PreviewResponse = response
        .json()
        .await
        .context("Failed to parse preview response")?;

    match output {
        Some(path) => {
            std::fs::write(path, &preview.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Preview written to {}", path.display());
        }
        None => println!("{}", preview.html),
    }

    Ok(())
}

/// Turn an error response into a one-line message
fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => {
            let mut message = format!("Preview failed ({}): {}", err.error.code, err.error.message);
            if let Some(phase) = err
                .error
                .details
                .as_ref()
                .and_then(|d| d.get("phase"))
                .and_then(|p| p.as_str())
            {
                message.push_str(&format!(" [phase: {}]", phase));
            }
            message
        }
        Err(_) if body.is_empty() => format!("Preview failed with HTTP {}", status),
        Err(_) => format!("Preview failed with HTTP {}: {}", status, body),
    }
}

/// Validate the configuration file and print a summary
fn cmd_config_check(cli: &Cli) -> Result<()> {
    use crate::config::Config;
    use crate::templates::HandlebarsCompiler;

    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    let config = Config::load(config_path)?;
    println!("[OK] Configuration file is valid!");
    println!();
    println!("=== Configuration Summary ===");
    println!();
    println!("Server:");
    println!("  Host:         {}", config.server.host);
    println!("  API Port:     {}", config.server.api_port);
    println!("  Data Dir:     {}", config.server.data_dir.display());
    println!();
    println!("Logging:");
    println!("  Level:        {}", config.logging.level);
    println!();
    println!("Templates:");
    println!(
        "  Directory:    {}",
        config
            .templates
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(built-in only)".to_string())
    );
    println!(
        "  Strict Mode:  {}",
        if config.templates.strict_mode {
            "Enabled"
        } else {
            "Disabled"
        }
    );

    HandlebarsCompiler::from_config(&config.templates)?;
    println!();
    println!("[OK] Templates compiled successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preview_command() {
        let cli = Cli::parse_from([
            "missive",
            "preview",
            "welcome.json",
            "--organization",
            "org-1",
            "-o",
            "out.html",
        ]);

        match cli.command {
            Some(Commands::Preview {
                file,
                organization,
                environment,
                output,
                ..
            }) => {
                assert_eq!(file, PathBuf::from("welcome.json"));
                assert_eq!(organization, "org-1");
                assert_eq!(environment, "");
                assert_eq!(output, Some(PathBuf::from("out.html")));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_starts_server() {
        let cli = Cli::parse_from(["missive", "--config", "custom.toml"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_describe_error_with_phase() {
        let body = r#"{"error":{"code":"unprocessable_entity","message":"bad template","details":{"phase":"render"}}}"#;
        assert_eq!(
            describe_error(422, body),
            "Preview failed (unprocessable_entity): bad template [phase: render]"
        );
    }

    #[test]
    fn test_describe_error_plain_body() {
        assert_eq!(describe_error(401, ""), "Preview failed with HTTP 401");
        assert_eq!(describe_error(502, "gateway"), "Preview failed with HTTP 502: gateway");
    }
}
