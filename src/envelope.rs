//! The `{ "success": bool, "response": ... }` result shape
//!
//! Library calls return [`Result`]; this converts one into the JSON
//! envelope scripts and the CLI print.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub response: Value,
}

impl Envelope {
    #[must_use]
    pub fn from_result<T: Serialize>(result: &Result<T>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(response) => Self {
                    success: true,
                    response,
                },
                Err(e) => Self {
                    success: false,
                    response: Value::String(e.to_string()),
                },
            },
            Err(e) => Self {
                success: false,
                response: e.detail(),
            },
        }
    }
}

impl<T: Serialize> From<Result<T>> for Envelope {
    fn from(result: Result<T>) -> Self {
        Self::from_result(&result)
    }
}
