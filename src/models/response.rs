use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope used by every endpoint:
/// `{ status: bool, data: any, message: string, status_code: int }`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse {
    pub status: bool,
    pub data: Value,
    pub message: String,
    pub status_code: i32,
}

impl ApiResponse {
    pub fn ok<T: Serialize>(data: T, message: &str) -> Self {
        Self {
            status: true,
            data: serde_json::to_value(data).unwrap_or(Value::Null),
            message: message.to_string(),
            status_code: 200,
        }
    }

    pub fn error(message: &str, status_code: i32) -> Self {
        Self {
            status: false,
            data: Value::Null,
            message: message.to_string(),
            status_code,
        }
    }

    pub fn error_with_data(data: Value, message: &str, status_code: i32) -> Self {
        Self {
            status: false,
            data,
            message: message.to_string(),
            status_code,
        }
    }
}
