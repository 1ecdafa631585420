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

//! High-level data types to represent the domain of the autograding server.

mod course;
pub use course::{Assignment, Course};
mod emailaddress;
pub use emailaddress::EmailAddress;
mod metric;
pub use metric::ApiRequestMetric;
mod passwords;
pub use passwords::{Credential, Password, generate_cleartext_password};
mod roles;
pub use roles::{CourseRole, ServerRole};
mod submission;
pub use submission::{GradedQuestion, Submission};
mod timestamp;
pub use timestamp::Timestamp;
mod user;
pub use user::{CourseInfo, CourseUser, ROOT_EMAIL, ServerUser, UserToken};
mod userop;
pub use userop::{
    ExternalUserOpResult, RawUserEntry, UpsertOptions, UserOpResult, sort_results_by_email,
};

/// Model errors.  Usually these are the result of validation problems on input data.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Maximum length of course and assignment identifiers.
const MAX_ID_LENGTH: usize = 128;

/// Validates a course or assignment identifier and returns its normalized (lowercased) form.
///
/// Identifiers may only contain ASCII alphanumeric characters, dots, dashes and underscores.
pub fn validate_id<S: AsRef<str>>(id: S) -> ModelResult<String> {
    let id = id.as_ref().trim().to_lowercase();

    if id.is_empty() {
        return Err(ModelError("Identifier cannot be empty".to_owned()));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(ModelError("Identifier is too long".to_owned()));
    }

    for ch in id.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '.' && ch != '-' && ch != '_' {
            return Err(ModelError(format!("Identifier contains invalid character '{}'", ch)));
        }
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_ok() {
        assert_eq!("course101", validate_id("course101").unwrap());
        assert_eq!("hw0", validate_id(" HW0 ").unwrap());
        assert_eq!("a.b-c_d", validate_id("a.b-c_d").unwrap());
    }

    #[test]
    fn test_validate_id_error() {
        assert!(validate_id("").is_err());
        assert!(validate_id("   ").is_err());
        assert!(validate_id("course!!!id").is_err());
        assert!(validate_id("a b").is_err());
        assert!(validate_id("x".repeat(MAX_ID_LENGTH + 1)).is_err());
    }
}
