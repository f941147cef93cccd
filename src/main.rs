// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process;
use std::time::Instant;

use the_flotilla::actions::{ActionStatus, CloudServerAction, NewAction};
use the_flotilla::config::{load_and_validate_config, Config, RuntimeBuilder};
use the_flotilla::engine::Runtime;
use the_flotilla::nodes::{NewNode, NodeState, Tag};
use the_flotilla::observability::init_tracing;

const DEFAULT_NODESPEC: &str = "*";

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.yaml|config.toml> [nodespec]", args[0]);
        eprintln!("Example: {} configs/local-lab.yaml \"compute-*\"", args[0]);
        process::exit(1);
    }

    let config_file = &args[1];
    let nodespec = args.get(2).map(String::as_str).unwrap_or(DEFAULT_NODESPEC);

    // RUST_LOG still wins; the config level only applies when it is unset
    init_tracing(&peek_log_level(config_file));

    let config = match load_and_validate_config(config_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    println!("🚢 The Flotilla");
    println!("═══════════════════════════════════");
    println!("Config:   {}", config_file);
    println!("Nodespec: {}", nodespec);
    println!();

    let runtime = match RuntimeBuilder::from_config(&config).await {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    let start = Instant::now();
    if let Err(e) = run_demo(&runtime, &config, nodespec).await {
        eprintln!("❌ {}", e);
    }
    println!("\n⏱️  Finished in {:?}", start.elapsed());

    runtime.shutdown().await;
}

/// Seed a fleet from each adapter's inventory, power on every node the
/// nodespec selects, then report what happened.
async fn run_demo(runtime: &Runtime, config: &Config, nodespec: &str) -> anyhow::Result<()> {
    let nodes = runtime.nodes();

    for adapter in &config.adapters {
        for instance in &adapter.instances {
            nodes
                .add_node(
                    NewNode::new(instance.as_str())
                        .with_state(NodeState::Installed)
                        .with_tags(vec![Tag::new("adapter", adapter.name.as_str())]),
                )
                .await?;
        }
    }

    let selected = nodes.expand_nodespec(nodespec).await?;
    if selected.is_empty() {
        println!("⚠️  Nodespec '{}' matches no nodes", nodespec);
        return Ok(());
    }

    println!("📋 Submitting actions for {} node(s):", selected.len());
    let mut submitted: Vec<CloudServerAction> = Vec::new();
    for node in &selected {
        let Some(adapter) = node
            .tags
            .iter()
            .find(|tag| tag.key == "adapter")
            .and_then(|tag| tag.value.as_deref())
        else {
            continue;
        };

        let cloudserver_id = format!("{}:{}", adapter, node.name);
        for action in ["start", "reboot"] {
            let record = runtime
                .actions()
                .create_action(NewAction::new(cloudserver_id.as_str(), action))
                .await?;
            println!("   • {} {} ({})", action, cloudserver_id, record.id);
            submitted.push(record);
        }
    }

    runtime.wait_idle().await;

    println!("\n📊 Outcomes:");
    for action in &submitted {
        let current = runtime.actions().get_action(&action.id).await?;
        let marker = match current.status {
            ActionStatus::Complete => "✅",
            ActionStatus::Error => "❌",
            _ => "⏳",
        };
        println!(
            "   {} {:<8} {:<24} {:<10} {}",
            marker,
            current.action,
            current.cloudserver_id,
            current.status.to_string(),
            current
                .status_message
                .as_deref()
                .unwrap_or("")
                .lines()
                .next()
                .unwrap_or("")
        );
    }

    println!("\n🖥️  Fleet:");
    for node in nodes.get_node_list(&[]).await? {
        println!("   {:<4} {:<24} {}", node.id, node.name, node.state);
    }

    Ok(())
}

/// Best-effort read of `logging.level` before tracing is installed.
fn peek_log_level(config_file: &str) -> String {
    the_flotilla::config::load_config(config_file)
        .map(|cfg| cfg.logging.level)
        .unwrap_or_else(|_| the_flotilla::config::consts::DEFAULT_LOG_LEVEL.to_string())
}
