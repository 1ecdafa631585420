// Autograder
// Copyright 2026 The Autograder Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The uniform response envelope.

use autograder_core::model::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope every API response is wrapped in, success or failure.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ApiResponse {
    /// Identifier of the request this response belongs to.  Empty when the request failed
    /// before an envelope was assigned.
    pub id: String,

    /// Locator of the error the request failed with.  Empty on success and for authentication
    /// errors, where it is deliberately withheld.
    pub locator: String,

    /// Version of the serving binary.
    #[serde(rename = "server-version")]
    pub server_version: String,

    /// When the request started.
    #[serde(rename = "start-timestamp")]
    pub start_timestamp: Timestamp,

    /// When the response was assembled.
    #[serde(rename = "end-timestamp")]
    pub end_timestamp: Timestamp,

    /// The HTTP status of the response.
    #[serde(rename = "status")]
    pub http_status: u16,

    /// Whether the request was served successfully.
    pub success: bool,

    /// Human-readable message.  Empty on success.
    pub message: String,

    /// Endpoint-specific payload, or null on failure.
    pub content: Value,
}

impl ApiResponse {
    /// Creates the envelope for a successful request.
    pub fn good(
        id: String,
        server_version: &str,
        start_timestamp: Timestamp,
        end_timestamp: Timestamp,
        content: Value,
    ) -> Self {
        ApiResponse {
            id,
            locator: String::new(),
            server_version: server_version.to_owned(),
            start_timestamp,
            end_timestamp,
            http_status: crate::error::HTTP_STATUS_GOOD,
            success: true,
            message: String::new(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_names() {
        let response = ApiResponse::good(
            "id0".to_owned(),
            "0.1.0",
            Timestamp::from_millis(1),
            Timestamp::from_millis(2),
            Value::from(true),
        );

        let value = serde_json::to_value(&response).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "id",
            "locator",
            "server-version",
            "start-timestamp",
            "end-timestamp",
            "status",
            "success",
            "message",
            "content",
        ] {
            assert!(object.contains_key(key), "missing envelope key {}", key);
        }
        assert_eq!(200, value["status"]);
        assert_eq!(true, value["success"]);
    }
}
