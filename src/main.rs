use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use promptguard::cli::{Cli, Commands, PolicyAction};
use promptguard::policy::config::AppConfig;
use promptguard::policy::{Policy, RedactionRule};
use promptguard::proxy::{AppState, ProxyServer};
use promptguard::sanitize::sanitize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            cmd_start(&cli.config).await?;
        }
        Commands::Check { text, json } => {
            cmd_check(&cli.config, text, json)?;
        }
        Commands::Policy { action } => match action {
            PolicyAction::Show => cmd_policy_show(&cli.config)?,
        },
        Commands::Init => {
            cmd_init(&cli.config)?;
        }
    }

    Ok(())
}

/// Load the config file, or fall back to defaults when it does not exist.
fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    if config_path.exists() {
        Ok(AppConfig::load_from_path(config_path)?)
    } else {
        Ok(AppConfig::default())
    }
}

async fn cmd_start(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    println!("PromptGuard starting...");
    println!("Config: {}", config_path.display());
    println!("Listen: {}", config.proxy.listen);
    println!("Upstream: {}", config.proxy.upstream);

    let state = Arc::new(AppState::new(config.policy, config.proxy.clone())?);
    println!("Detectors loaded: {}", state.policy.detectors.len());

    let server = ProxyServer::new(config.proxy.listen.clone(), state);
    let addr = server.start().await?;
    println!("Proxy running on {}", addr);
    println!("Point your chat client at http://{}/v1/chat/completions", addr);

    // Keep running until interrupted
    tokio::signal::ctrl_c().await?;
    println!("\nShutting down...");
    Ok(())
}

fn cmd_check(config_path: &Path, text: Option<String>, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let policy = Policy::compile(&config.policy)?;

    let input = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let result = sanitize(&input, &policy);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.findings.is_empty() {
        println!("No sensitive content found.");
    } else {
        println!("{:<8} {:<8} {:<8} VALUE", "TYPE", "START", "END");
        println!("{}", "─".repeat(60));
        for f in &result.findings {
            println!("{:<8} {:<8} {:<8} {}", f.kind.as_str(), f.start, f.end, f.value);
        }
    }
    println!("\nSanitized output:\n{}", result.output);
    Ok(())
}

fn cmd_policy_show(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let policy = Policy::compile(&config.policy)?;

    println!("Active Policy ({})", config_path.display());
    println!("═══════════════════════════════════════");
    println!("Detectors ({}):", policy.detectors.len());
    for d in &policy.detectors {
        println!("  [{}] {} → {}", d.id, d.regex.as_str(), d.classify_as.as_str());
    }
    println!("Redaction rules ({}):", policy.redaction.len());
    let mut kinds: Vec<_> = policy.redaction.iter().collect();
    kinds.sort_by_key(|(kind, _)| kind.as_str());
    for (kind, rule) in kinds {
        let action = match rule {
            RedactionRule::Token { token } => format!(
                "token {}",
                token
                    .clone()
                    .unwrap_or_else(|| RedactionRule::default_token(*kind))
            ),
            RedactionRule::Mask { mask } => format!("mask '{}'", mask),
            RedactionRule::Remove => "remove".to_string(),
        };
        println!("  {} → {}", kind.as_str(), action);
    }
    Ok(())
}

fn cmd_init(config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        return Ok(());
    }

    let default_config = include_str!("../templates/default.toml");
    std::fs::write(config_path, default_config)?;
    println!("Created config: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Adjust the upstream endpoint in {}", config_path.display());
    println!("  2. Start the proxy: promptguard start");
    Ok(())
}
