// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operation handler backends.
//!
//! ## Arithmetic Backend
//! Integer-preserving numeric operations (`add`, `multiply`, `negate`, `min`,
//! `max`) used by the command-line runner and the demo graphs.
//!
//! ## Stub Backend (Test-Only)
//! Handlers for executor tests (only available in test builds):
//! - **counting / recording**: count invocations per handler or operation
//! - **failing**: rejects with a `SimulatedFailure`
//! - **PanickingHandler**: panics inside the handler task
//! - **delayed**: sleeps and reports peak concurrency
//!
//! # Examples
//!
//! ```rust
//! use graph_executor::backends::arithmetic::arithmetic_handlers;
//!
//! let handlers = arithmetic_handlers();
//! assert!(handlers.contains("negate"));
//! ```

pub mod arithmetic;
#[cfg(test)]
pub mod stub;
