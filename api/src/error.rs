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

//! The API error model.
//!
//! Every failure in the pipeline or in a handler becomes an `ApiError` at the earliest point of
//! recognition.  The error carries a short, stable locator code that identifies the failing
//! site, plus everything needed to log the failure and to shape the client-visible response.

use crate::response::ApiResponse;
use autograder_core::model::{CourseRole, ServerRole, Timestamp};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Everything went well and there were no errors.
///
/// Note that there is a difference between a failed request and a negative result from a
/// request.
pub const HTTP_STATUS_GOOD: u16 = 200;

/// The user sent a request that is incorrect in some way.  These will usually not make it to
/// the handler.
pub const HTTP_STATUS_BAD_REQUEST: u16 = 400;

/// Some form of authentication error occurred.  Intentionally vague.
pub const HTTP_STATUS_AUTH_ERROR: u16 = 401;

/// The user's role is not high enough for the specific operation.  Can happen at the validation
/// or handling phases.
pub const HTTP_PERMISSIONS_ERROR: u16 = 403;

/// There was some error beyond the user's control.  These generally happen at the handler level
/// because anything earlier would have been a bad request.
pub const HTTP_STATUS_SERVER_ERROR: u16 = 500;

/// A value that can stamp request identification onto an error: request id, endpoint, sender,
/// timestamps and, depending on scope, user/course/assignment identifiers.
pub trait ErrorContext {
    /// Copies this context's identification fields into `error`.
    fn apply(&self, error: &mut ApiError);
}

/// Endpoint-only context for errors raised before any envelope exists.
impl ErrorContext for &str {
    fn apply(&self, error: &mut ApiError) {
        error.endpoint = (*self).to_owned();
    }
}

/// An error produced while serving an API request.
///
/// This is technically an error, but it should generally be treated as an `ApiError` and not
/// converted into other error types: it is the terminal representation of a failed request.
#[derive(Clone, Debug)]
pub struct ApiError {
    /// Identifier of the request this error belongs to, when known.
    pub request_id: String,

    /// Short, stable code identifying the site that raised the error.
    pub locator: String,

    /// The endpoint that was serving the request.
    pub endpoint: String,

    /// Client identifier (the peer address, when known).
    pub sender: String,

    /// When the failing request started.
    pub timestamp: Timestamp,

    /// Severity at which this error logs itself.
    pub log_level: log::Level,

    /// The HTTP status the response will carry.
    pub http_status: u16,

    /// Detailed text for the server log.
    pub internal_text: String,

    /// Text safe to show to the requesting user.
    pub response_text: String,

    /// Stringified causes, joined in the order they were attached.
    pub sources: Vec<String>,

    /// The course the request addressed, if known.
    pub course_id: String,

    /// The assignment the request addressed, if known.
    pub assignment_id: String,

    /// The authenticated (or claimed) user, if known.
    pub user_email: String,

    /// Free-form additional context attached by the raising site.
    pub attributes: BTreeMap<String, Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {} ({}): {}", self.locator, self.http_status, self.internal_text)
    }
}

impl ApiError {
    /// Creates the skeleton of an error; callers go through the domain constructors below.
    fn new(locator: &str, log_level: log::Level, http_status: u16) -> Self {
        ApiError {
            request_id: String::new(),
            locator: locator.to_owned(),
            endpoint: String::new(),
            sender: String::new(),
            timestamp: Timestamp::default(),
            log_level,
            http_status,
            internal_text: String::new(),
            response_text: String::new(),
            sources: Vec::new(),
            course_id: String::new(),
            assignment_id: String::new(),
            user_email: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a 400 error for a malformed request.  The message is shown to the user.
    pub fn bad_request<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        message: S,
    ) -> Self {
        let mut error = Self::new(locator, log::Level::Info, HTTP_STATUS_BAD_REQUEST);
        let message = message.into();
        error.internal_text = message.clone();
        error.response_text = message;
        context.apply(&mut error);
        error
    }

    /// Creates a 400 error before any envelope exists.
    pub fn bare_bad_request<S: Into<String>>(locator: &str, endpoint: &str, message: S) -> Self {
        Self::bad_request(locator, &endpoint, message)
    }

    /// Creates a 401 error.  The internal message is kept out of the response, which always
    /// reads the same so that clients cannot distinguish failure modes.
    pub fn auth_bad_request<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        internal_message: S,
    ) -> Self {
        let mut error = Self::new(locator, log::Level::Info, HTTP_STATUS_AUTH_ERROR);
        error.internal_text = format!("Authentication failure: '{}'.", internal_message.into());
        error.response_text = "Authentication failure, check email and password.".to_owned();
        context.apply(&mut error);
        error
    }

    /// Creates a 403 error for insufficient server-level permissions.
    pub fn bad_server_permissions<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        min_role: ServerRole,
        actual_role: ServerRole,
        internal_message: S,
    ) -> Self {
        let mut error = Self::permissions(locator, context, internal_message);
        error.attributes.insert("min-role".to_owned(), Value::from(min_role.to_string()));
        error
            .attributes
            .insert("actual-role".to_owned(), Value::from(actual_role.to_string()));
        error
    }

    /// Creates a 403 error for insufficient course-level permissions.
    pub fn bad_course_permissions<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        min_role: CourseRole,
        actual_role: CourseRole,
        internal_message: S,
    ) -> Self {
        let mut error = Self::permissions(locator, context, internal_message);
        error.attributes.insert("min-role".to_owned(), Value::from(min_role.to_string()));
        error
            .attributes
            .insert("actual-role".to_owned(), Value::from(actual_role.to_string()));
        error
    }

    /// Creates a 403 error that is not about a specific role floor (e.g. operating on a course
    /// the user is not part of).
    pub fn permission_denied<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        internal_message: S,
    ) -> Self {
        Self::permissions(locator, context, internal_message)
    }

    /// Common part of the permission-denial constructors.
    fn permissions<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        internal_message: S,
    ) -> Self {
        let mut error = Self::new(locator, log::Level::Info, HTTP_PERMISSIONS_ERROR);
        error.internal_text =
            format!("Insufficient permissions: '{}'.", internal_message.into());
        error.response_text =
            "You have insufficient permissions for the requested operation.".to_owned();
        context.apply(&mut error);
        error
    }

    /// Creates a 500 error.  The response text includes the request id (when known) so users
    /// can refer to it when contacting an administrator.
    pub fn internal<S: Into<String>>(
        locator: &str,
        context: &dyn ErrorContext,
        internal_message: S,
    ) -> Self {
        let mut error = Self::new(locator, log::Level::Error, HTTP_STATUS_SERVER_ERROR);
        error.internal_text = internal_message.into();
        context.apply(&mut error);
        error.response_text = if error.request_id.is_empty() {
            "The server failed to process your request.".to_owned()
        } else {
            format!(
                "The server failed to process your request. Please contact an administrator \
                 with this ID '{}'.",
                error.request_id
            )
        };
        error
    }

    /// Creates a 500 error before any envelope exists.
    pub fn bare_internal<S: Into<String>>(locator: &str, endpoint: &str, message: S) -> Self {
        Self::internal(locator, &endpoint, message)
    }

    /// Attaches a course id.
    pub fn course<S: Into<String>>(mut self, id: S) -> Self {
        self.course_id = id.into();
        self
    }

    /// Attaches an assignment id.
    pub fn assignment<S: Into<String>>(mut self, id: S) -> Self {
        self.assignment_id = id.into();
        self
    }

    /// Attaches a user email.
    pub fn user<S: Into<String>>(mut self, email: S) -> Self {
        self.user_email = email.into();
        self
    }

    /// Attaches additional context to this error.
    pub fn add<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Attaches/appends a source error.  Causes accumulate; they are never replaced.
    pub fn err<E: fmt::Display>(mut self, e: E) -> Self {
        self.sources.push(e.to_string());
        self
    }

    /// Writes this error to the log at its declared level, with all fields as attributes.
    ///
    /// The pipeline calls this exactly once per error, at the point of response assembly.
    pub fn log(&self) {
        let mut fields = vec![
            format!("api-request-id={}", self.request_id),
            format!("locator={}", self.locator),
            format!("api-endpoint={}", self.endpoint),
            format!("sender={}", self.sender),
            format!("timestamp={}", self.timestamp),
            format!("http-status={}", self.http_status),
            format!("response-text={}", self.response_text),
        ];
        for (key, value) in &self.attributes {
            fields.push(format!("{}={}", key, value));
        }
        if !self.course_id.is_empty() {
            fields.push(format!("course={}", self.course_id));
        }
        if !self.assignment_id.is_empty() {
            fields.push(format!("assignment={}", self.assignment_id));
        }
        if !self.user_email.is_empty() {
            fields.push(format!("user={}", self.user_email));
        }
        for source in &self.sources {
            fields.push(format!("cause={}", source));
        }

        log::log!(self.log_level, "API error: {} [{}]", self.internal_text, fields.join(", "));
    }

    /// Converts this error into a response envelope.
    ///
    /// The locator is stripped for authentication errors so that probing cannot distinguish
    /// failure modes; it remains visible in the server log and in telemetry.
    pub fn to_response(&self, server_version: &str, end_timestamp: Timestamp) -> ApiResponse {
        let locator = if self.http_status == HTTP_STATUS_AUTH_ERROR {
            String::new()
        } else {
            self.locator.clone()
        };

        ApiResponse {
            id: self.request_id.clone(),
            locator,
            server_version: server_version.to_owned(),
            start_timestamp: self.timestamp,
            end_timestamp,
            http_status: self.http_status,
            success: self.http_status == HTTP_STATUS_GOOD,
            message: self.response_text.clone(),
            content: Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_texts_match() {
        let error = ApiError::bare_bad_request("-004", "/api/v03/x", "No content.");
        assert_eq!(HTTP_STATUS_BAD_REQUEST, error.http_status);
        assert_eq!("No content.", error.internal_text);
        assert_eq!("No content.", error.response_text);
        assert_eq!("/api/v03/x", error.endpoint);
    }

    #[test]
    fn test_auth_error_response_is_vague() {
        let error = ApiError::auth_bad_request("-014", &"/api/v03/x", "Bad password for user.");
        assert_eq!(HTTP_STATUS_AUTH_ERROR, error.http_status);
        assert!(error.internal_text.contains("Bad password"));
        assert_eq!("Authentication failure, check email and password.", error.response_text);
    }

    #[test]
    fn test_auth_error_locator_stripped_from_response() {
        let error = ApiError::auth_bad_request("-013", &"/api/v03/x", "Unknown user.");
        let response = error.to_response("0.1.0", Timestamp::from_millis(10));
        assert_eq!("", response.locator);
        assert_eq!("-013", error.locator);
        assert!(!response.success);
    }

    #[test]
    fn test_non_auth_locator_kept_in_response() {
        let error = ApiError::bare_bad_request("-022", "/api/v03/x", "Could not find assignment.");
        let response = error.to_response("0.1.0", Timestamp::from_millis(10));
        assert_eq!("-022", response.locator);
        assert_eq!(400, response.http_status);
    }

    #[test]
    fn test_internal_error_mentions_request_id_when_known() {
        let bare = ApiError::bare_internal("-001", "/api/v03/x", "boom");
        assert!(!bare.response_text.contains("ID"));

        struct FakeContext;
        impl ErrorContext for FakeContext {
            fn apply(&self, error: &mut ApiError) {
                error.request_id = "abc".to_owned();
            }
        }
        let from_context = ApiError::internal("-032", &FakeContext, "boom");
        assert!(from_context.response_text.contains("'abc'"));
    }

    #[test]
    fn test_err_joins_causes() {
        let error = ApiError::bare_internal("-029", "/api/v03/x", "boom")
            .err("first cause")
            .err("second cause");
        assert_eq!(vec!["first cause".to_owned(), "second cause".to_owned()], error.sources);
    }

    #[test]
    fn test_fluent_attachments() {
        let error = ApiError::bare_bad_request("-022", "/api/v03/x", "nope")
            .course("course101")
            .assignment("hw0")
            .user("a@test.edulinq.org")
            .add("extra", 42);
        assert_eq!("course101", error.course_id);
        assert_eq!("hw0", error.assignment_id);
        assert_eq!("a@test.edulinq.org", error.user_email);
        assert_eq!(Some(&Value::from(42)), error.attributes.get("extra"));
    }
}
