// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod handler;

pub use handler::{FnHandler, HandlerTable, OperationHandler};
