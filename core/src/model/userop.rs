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

//! Data types describing the outcome of user-modifying operations (enroll, upsert, drop).

use crate::model::{CourseRole, Password, ServerRole};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// User-safe replacement text for errors whose details must not leave the server.
const EXTERNAL_ERROR_MESSAGE: &str = "The server encountered an error processing this user.";

/// A raw user entry as provided by enroll/upsert requests.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct RawUserEntry {
    /// The target user's email.
    #[serde(default)]
    pub email: String,

    /// Display name to set, if any.
    #[serde(default)]
    pub name: Option<String>,

    /// Client-hashed password to set.  When absent on insertion, a password is generated.
    #[serde(default)]
    pub pass: Option<Password>,

    /// Server role to set, if any.
    #[serde(default, rename = "server-role")]
    pub server_role: Option<ServerRole>,

    /// Course to enroll the user in, if any.
    #[serde(default)]
    pub course: Option<String>,

    /// Role within `course`, if enrolling.
    #[serde(default, rename = "course-role")]
    pub course_role: Option<CourseRole>,

    /// The user's identifier in the external LMS, if linked.
    #[serde(default, rename = "lms-id")]
    pub lms_id: Option<String>,
}

/// Options controlling enroll/upsert operations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UpsertOptions {
    /// Do not create users that do not exist yet.
    pub skip_inserts: bool,

    /// Do not modify users that already exist.
    pub skip_updates: bool,

    /// Email newly-generated credentials to their users.
    pub send_emails: bool,

    /// Compute results without persisting or emailing anything.
    pub dry_run: bool,
}

/// The outcome of one user-modifying operation on one target user.
///
/// All user-facing code paths should return instances of this type; errors are carried inside
/// rather than aborting the whole batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserOpResult {
    /// The email of the target user.
    pub email: String,

    /// The user was added to the server.
    pub added: bool,

    /// The user existed before this operation and was edited (including enrollment changes).
    pub modified: bool,

    /// The user existed before this operation and was removed.
    pub removed: bool,

    /// The user was skipped (often because of the skip options).
    pub skipped: bool,

    /// The user did not exist before this operation and does not exist after.
    pub not_exists: bool,

    /// An actual email was sent to the user (or would have been, during a dry run).
    pub emailed: bool,

    /// The user was enrolled in these courses.
    pub enrolled: Vec<String>,

    /// The user was dropped from these courses.
    pub dropped: Vec<String>,

    /// An error caused by the provided data.  Always safe to show to users.
    pub validation_error: Option<String>,

    /// An error that is the system's fault.  Not guaranteed to be safe for users.
    pub system_error: Option<String>,

    /// An error communicating the results (e.g. mail delivery).  Not guaranteed to be safe for
    /// users.
    pub communication_error: Option<String>,

    /// A cleartext password generated during this operation.  Care should be taken to not
    /// expose this field.
    pub cleartext_password: Option<String>,
}

impl UserOpResult {
    /// Creates a result that records a validation failure for `email`.
    pub fn validation_error<S: Into<String>, M: Into<String>>(email: S, message: M) -> Self {
        UserOpResult {
            email: email.into(),
            validation_error: Some(message.into()),
            ..UserOpResult::default()
        }
    }

    /// Creates a result that records a system failure for `email`.
    pub fn system_error<S: Into<String>, M: Into<String>>(email: S, message: M) -> Self {
        UserOpResult {
            email: email.into(),
            system_error: Some(message.into()),
            ..UserOpResult::default()
        }
    }

    /// Converts this result into its user-safe external form: internal error details are
    /// replaced with a short message and generated passwords are dropped.
    pub fn to_external(&self) -> ExternalUserOpResult {
        ExternalUserOpResult {
            email: self.email.clone(),
            added: self.added,
            modified: self.modified,
            removed: self.removed,
            skipped: self.skipped,
            not_exists: self.not_exists,
            emailed: self.emailed,
            enrolled: self.enrolled.clone(),
            dropped: self.dropped.clone(),
            validation_error: self.validation_error.clone(),
            system_error: self.system_error.as_ref().map(|_| EXTERNAL_ERROR_MESSAGE.to_owned()),
            communication_error: self
                .communication_error
                .as_ref()
                .map(|_| EXTERNAL_ERROR_MESSAGE.to_owned()),
        }
    }
}

/// Sorts a batch of results by target email, the order in which they are returned to clients.
pub fn sort_results_by_email(results: &mut [UserOpResult]) {
    results.sort_by(|a, b| a.email.cmp(&b.email));
}

/// The user-safe representation of a `UserOpResult`.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct ExternalUserOpResult {
    /// The email of the target user.
    pub email: String,

    /// The user was added to the server.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,

    /// The user existed before this operation and was edited.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub modified: bool,

    /// The user existed before this operation and was removed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,

    /// The user was skipped.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,

    /// The user did not exist before this operation and does not exist after.
    #[serde(default, rename = "not-exists", skip_serializing_if = "std::ops::Not::not")]
    pub not_exists: bool,

    /// An email was sent to the user.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub emailed: bool,

    /// The user was enrolled in these courses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enrolled: Vec<String>,

    /// The user was dropped from these courses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,

    /// A user-safe validation error.
    #[serde(default, rename = "validation-error", skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,

    /// A user-safe representation of a system error.
    #[serde(default, rename = "system-error", skip_serializing_if = "Option::is_none")]
    pub system_error: Option<String>,

    /// A user-safe representation of a communication error.
    #[serde(default, rename = "communication-error", skip_serializing_if = "Option::is_none")]
    pub communication_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_external_sanitizes_internal_errors() {
        let result = UserOpResult {
            email: "a@test.edulinq.org".to_owned(),
            system_error: Some("db exploded: connection refused".to_owned()),
            cleartext_password: Some("hunter2".to_owned()),
            ..UserOpResult::default()
        };

        let external = result.to_external();
        assert_eq!(Some(EXTERNAL_ERROR_MESSAGE.to_owned()), external.system_error);
        let json = serde_json::to_string(&external).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("connection refused"));
    }

    #[test]
    fn test_to_external_keeps_validation_errors() {
        let result =
            UserOpResult::validation_error("a@test.edulinq.org", "Email cannot be empty.");
        assert_eq!(
            Some("Email cannot be empty.".to_owned()),
            result.to_external().validation_error
        );
    }

    #[test]
    fn test_sort_results_by_email() {
        let mut results = vec![
            UserOpResult { email: "c@x".to_owned(), ..UserOpResult::default() },
            UserOpResult { email: "a@x".to_owned(), ..UserOpResult::default() },
            UserOpResult { email: "b@x".to_owned(), ..UserOpResult::default() },
        ];
        sort_results_by_email(&mut results);
        let emails = results.iter().map(|r| r.email.clone()).collect::<Vec<String>>();
        assert_eq!(vec!["a@x".to_owned(), "b@x".to_owned(), "c@x".to_owned()], emails);
    }
}
