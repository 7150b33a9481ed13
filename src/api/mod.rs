//! REST API handlers and shared response types

pub mod auth;
pub mod health;
pub mod location;

use serde::{Deserialize, Serialize};

/// Generic message envelope for operations with no meaningful payload
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_serialization() {
        let response = MessageResponse::new("deleted");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"message":"deleted"}"#);
    }
}
