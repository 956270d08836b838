// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::graph::{Argument, GraphBuilder, GraphModel, NodeId};

/// A graph definition file.
///
/// Nodes are listed in order so a repeated id is reported as a duplicate
/// instead of silently replacing the earlier entry.
///
/// # Example
/// ```yaml
/// executor_options:
///   max_concurrency: 4
/// nodes:
///   - id: a
///     operation: negate
///     arguments: [1]
///   - id: b
///     operation: min
///     arguments: [2, 4, 8, 4, 12]
///   - id: c
///     operation: add
///     arguments: [{ ref: a }, { ref: b }]
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    pub nodes: Vec<NodeConfig>,
}

impl Config {
    /// Builds and validates the graph model described by `nodes`.
    pub fn to_graph(&self) -> Result<GraphModel, ConfigError> {
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.append(node.id.clone(), node.operation.clone(), node.arguments.clone())?;
        }
        Ok(builder.build()?)
    }
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of handlers running at once; unbounded when absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// One node entry of a graph definition file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeConfig {
    pub id: NodeId,
    #[serde(alias = "type")]
    pub operation: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

/// Load a graph definition from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a graph definition and build its validated graph model.
///
/// Fails on duplicate ids, unresolved references and circular references.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<(Config, GraphModel), ConfigError> {
    let cfg = load_config(path)?;
    let graph = cfg.to_graph()?;
    Ok((cfg, graph))
}
