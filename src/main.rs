// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;

use anyhow::{bail, Context, Result};
use graph_executor::backends::arithmetic::arithmetic_handlers;
use graph_executor::config::load_and_validate_config;
use graph_executor::engine::{ExecutionSummary, GraphExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <graph.yaml> [updated.yaml]", args[0]);
        eprintln!("Example: {} demos/diamond.yaml demos/diamond_updated.yaml", args[0]);
        bail!("expected one or two graph files");
    }

    let (config, graph) = load_and_validate_config(&args[1])
        .with_context(|| format!("loading {}", args[1]))?;
    let mut executor =
        GraphExecutor::with_options(arithmetic_handlers(), &graph, config.executor_options)?;

    println!("Graph: {} ({} nodes)", args[1], executor.len());
    let summary = executor.execute().await?;
    print_results(&executor, &summary);

    if let Some(updated_path) = args.get(2) {
        let (_, updated) = load_and_validate_config(updated_path)
            .with_context(|| format!("loading {}", updated_path))?;
        let update = executor.update(&updated)?;
        println!(
            "\nUpdated from {}: {} retained, {} redefined, {} added, {} removed",
            updated_path, update.retained, update.redefined, update.added, update.removed
        );

        let summary = executor.execute().await?;
        print_results(&executor, &summary);
    }

    Ok(())
}

fn print_results(executor: &GraphExecutor, summary: &ExecutionSummary) {
    println!(
        "{} computed, {} reused in {:.2?}",
        summary.dispatched, summary.reused, summary.duration
    );
    for node in executor.nodes() {
        let output = node
            .output()
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<12} {:<10} = {}", node.id(), node.definition().operation, output);
    }
}
