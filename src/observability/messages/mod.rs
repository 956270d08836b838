// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `engine` - executor lifecycle, dispatch and invalidation events
//! * `graph` - graph construction and validation events

use tracing::Span;

pub mod engine;
pub mod graph;

/// A log message that knows its level and its structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message at its level with its fields attached.
    fn log(&self);

    /// A span carrying the message's fields, for instrumenting work that the
    /// message describes.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("event", span_name = name, message = %self)
    }
}
