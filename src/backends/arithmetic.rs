// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in numeric operations.
//!
//! Integers stay integers: when every argument is an integer the operation
//! runs on `i64` and yields an integer, otherwise everything is promoted to
//! `f64`. Integer overflow also falls back to `f64`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::errors::BoxError;
use crate::traits::{HandlerTable, OperationHandler};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("{operation}: argument {index} is not a number: {value}")]
    NotANumber {
        operation: &'static str,
        index: usize,
        value: Value,
    },

    #[error("{operation}: expected {expected} arguments, got {actual}")]
    Arity {
        operation: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("{operation}: result is not a finite number")]
    NonFinite { operation: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Multiply,
    Negate,
    Min,
    Max,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 5] = [
        ArithmeticOp::Add,
        ArithmeticOp::Multiply,
        ArithmeticOp::Negate,
        ArithmeticOp::Min,
        ArithmeticOp::Max,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Negate => "negate",
            ArithmeticOp::Min => "min",
            ArithmeticOp::Max => "max",
        }
    }

    fn apply(&self, arguments: &[Value]) -> Result<Value, ArithmeticError> {
        let operation = self.name();
        match self {
            ArithmeticOp::Negate if arguments.len() != 1 => {
                return Err(ArithmeticError::Arity {
                    operation,
                    expected: "exactly 1",
                    actual: arguments.len(),
                })
            }
            ArithmeticOp::Min | ArithmeticOp::Max if arguments.is_empty() => {
                return Err(ArithmeticError::Arity {
                    operation,
                    expected: "at least 1",
                    actual: 0,
                })
            }
            _ => {}
        }

        let operands = arguments
            .iter()
            .enumerate()
            .map(|(index, value)| Operand::parse(operation, index, value))
            .collect::<Result<Vec<_>, _>>()?;

        let integers: Option<Vec<i64>> = operands
            .iter()
            .map(|operand| match operand {
                Operand::Int(value) => Some(*value),
                Operand::Float(_) => None,
            })
            .collect();

        if let Some(result) = integers.and_then(|values| self.apply_i64(&values)) {
            return Ok(Value::from(result));
        }

        let floats: Vec<f64> = operands.iter().map(Operand::as_f64).collect();
        let result = self.apply_f64(&floats);
        Number::from_f64(result)
            .map(Value::Number)
            .ok_or(ArithmeticError::NonFinite { operation })
    }

    /// `None` on overflow.
    fn apply_i64(&self, values: &[i64]) -> Option<i64> {
        match self {
            ArithmeticOp::Add => values.iter().try_fold(0i64, |acc, v| acc.checked_add(*v)),
            ArithmeticOp::Multiply => values.iter().try_fold(1i64, |acc, v| acc.checked_mul(*v)),
            ArithmeticOp::Negate => values.first()?.checked_neg(),
            ArithmeticOp::Min => values.iter().copied().min(),
            ArithmeticOp::Max => values.iter().copied().max(),
        }
    }

    fn apply_f64(&self, values: &[f64]) -> f64 {
        match self {
            ArithmeticOp::Add => values.iter().sum(),
            ArithmeticOp::Multiply => values.iter().product(),
            ArithmeticOp::Negate => -values[0],
            ArithmeticOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            ArithmeticOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

enum Operand {
    Int(i64),
    Float(f64),
}

impl Operand {
    fn parse(operation: &'static str, index: usize, value: &Value) -> Result<Self, ArithmeticError> {
        let not_a_number = || ArithmeticError::NotANumber {
            operation,
            index,
            value: value.clone(),
        };
        let Value::Number(number) = value else {
            return Err(not_a_number());
        };
        if let Some(int) = number.as_i64() {
            Ok(Operand::Int(int))
        } else {
            number.as_f64().map(Operand::Float).ok_or_else(not_a_number)
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Operand::Int(value) => *value as f64,
            Operand::Float(value) => *value,
        }
    }
}

/// One arithmetic operation exposed as an [`OperationHandler`].
#[derive(Debug, Clone, Copy)]
pub struct ArithmeticHandler {
    op: ArithmeticOp,
}

impl ArithmeticHandler {
    pub fn new(op: ArithmeticOp) -> Self {
        Self { op }
    }
}

#[async_trait]
impl OperationHandler for ArithmeticHandler {
    async fn call(&self, arguments: Vec<Value>) -> Result<Value, BoxError> {
        Ok(self.op.apply(&arguments)?)
    }
}

/// Handler table with `add`, `multiply`, `negate`, `min` and `max`.
pub fn arithmetic_handlers() -> HandlerTable {
    ArithmeticOp::ALL
        .into_iter()
        .map(|op| {
            let handler: Arc<dyn OperationHandler> = Arc::new(ArithmeticHandler::new(op));
            (op.name().to_string(), handler)
        })
        .collect()
}
