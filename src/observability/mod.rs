// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic and operational log line emitted by the crate goes
//! through a message type in [`messages`]. Message types are plain structs
//! with a `Display` implementation plus a [`messages::StructuredLog`]
//! implementation that attaches the same data as `tracing` fields, which:
//!
//! * keeps magic strings out of the engine code
//! * gives every event a consistent shape for subscribers
//!
//! # Usage
//!
//! ```rust
//! use graph_executor::observability::messages::engine::NodeReused;
//! use graph_executor::observability::messages::StructuredLog;
//!
//! NodeReused { node_id: "total" }.log();
//! ```

pub mod messages;
