// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

use super::GraphError;

/// Errors that can occur while loading a graph definition file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse graph definition: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Graph definition is invalid: {0}")]
    Graph(#[from] GraphError),
}
