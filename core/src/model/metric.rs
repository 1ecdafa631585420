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

//! The `ApiRequestMetric` data type: one telemetry record per served request.

use crate::model::Timestamp;
use serde::{Deserialize, Serialize};

/// A telemetry record describing one completed API request.
///
/// Attributes without a value are omitted from the serialized form rather than emitted as empty
/// strings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ApiRequestMetric {
    /// When the request started.
    pub timestamp: Timestamp,

    /// How long the request took to serve, in milliseconds.
    pub duration: u64,

    /// Client identifier (the peer address, when known).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// The endpoint that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// The authenticated user, when the request got that far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// The course the request addressed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,

    /// The assignment the request addressed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,

    /// The locator of the error the request failed with, if it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_omits_missing_attributes() {
        let metric = ApiRequestMetric {
            timestamp: Timestamp::from_millis(1000),
            duration: 25,
            sender: None,
            endpoint: Some("/api/v03/users/list".to_owned()),
            user: None,
            course: None,
            assignment: None,
            locator: None,
        };

        let value = serde_json::to_value(&metric).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("endpoint"));
        assert!(!object.contains_key("user"));
        assert!(!object.contains_key("locator"));
    }
}
