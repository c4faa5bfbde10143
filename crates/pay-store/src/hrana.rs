//! # Pipeline Wire Types
//!
//! JSON shapes of the libSQL `v2/pipeline` HTTP API. Integers travel as
//! strings so 64-bit values survive JSON number parsing.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A typed SQL value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Value {
    Null,
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

impl Value {
    pub fn integer(v: i64) -> Self {
        Value::Integer {
            value: v.to_string(),
        }
    }

    pub fn float(v: f64) -> Self {
        Value::Float { value: v }
    }

    pub fn text(v: impl Into<String>) -> Self {
        Value::Text { value: v.into() }
    }

    pub fn opt_text(v: Option<&str>) -> Self {
        v.map(Value::text).unwrap_or(Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer { value } => value.parse().ok(),
            Value::Float { value } if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer { value } => value.parse::<i64>().ok().map(Decimal::from),
            Value::Float { value } => Decimal::from_f64(*value),
            Value::Text { value } => value.parse().ok(),
            _ => None,
        }
    }
}

/// A statement with positional arguments
#[derive(Debug, Clone, Serialize)]
pub struct Stmt {
    pub sql: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Stmt {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct PipelineRequest {
    pub baton: Option<String>,
    pub requests: Vec<StreamRequest>,
}

impl PipelineRequest {
    /// Execute the statements in order on a fresh stream, then close it
    pub fn execute_all(stmts: Vec<Stmt>) -> Self {
        let mut requests: Vec<_> = stmts
            .into_iter()
            .map(|stmt| StreamRequest::Execute { stmt })
            .collect();
        requests.push(StreamRequest::Close);
        Self {
            baton: None,
            requests,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest {
    Execute { stmt: Stmt },
    Close,
}

#[derive(Debug, Deserialize)]
pub struct PipelineResponse {
    #[serde(default)]
    pub results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: StreamError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResponse {
    Execute { result: StmtResult },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct StreamError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StmtResult {
    #[serde(default)]
    pub cols: Vec<Col>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default)]
    pub affected_row_count: u64,
    #[serde(default)]
    pub last_insert_rowid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Col {
    #[serde(default)]
    pub name: Option<String>,
}

impl StmtResult {
    /// Rows as column-name maps
    pub fn named_rows(&self) -> Vec<HashMap<&str, &Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.cols
                    .iter()
                    .zip(row.iter())
                    .filter_map(|(col, value)| col.name.as_deref().map(|n| (n, value)))
                    .collect()
            })
            .collect()
    }

    pub fn last_insert_rowid(&self) -> Option<i64> {
        self.last_insert_rowid.as_deref().and_then(|id| id.parse().ok())
    }
}
