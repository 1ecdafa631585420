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

//! The `ServerUser` and `CourseUser` data types.

use crate::model::{
    CourseRole, Credential, ModelError, ModelResult, Password, ServerRole,
};
use std::collections::HashMap;

/// The reserved identity used by trusted local requests.  No stored user may claim it.
pub const ROOT_EMAIL: &str = "root";

/// A named authentication token minted for a user.  Tokens authenticate like passwords and only
/// their derived form is stored.
#[derive(Clone, Debug, PartialEq)]
pub struct UserToken {
    /// Opaque identifier of the token, used to delete it.
    pub id: String,

    /// User-chosen name describing where the token is used.
    pub name: String,

    /// Derived form of the token's secret.
    pub credential: Credential,
}

/// A user's standing within one course, as stored on the server user.
#[derive(Clone, Debug, PartialEq)]
pub struct CourseInfo {
    /// The user's role within the course.
    pub role: CourseRole,

    /// The user's identifier in the external LMS, if linked.
    pub lms_id: Option<String>,
}

/// A user account as known to the whole server.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerUser {
    /// The user's email, which is their account identifier.
    pub email: String,

    /// The user's display name, if provided.
    pub name: Option<String>,

    /// The user's server-wide role.
    pub role: ServerRole,

    /// The user's stored credential.  May be absent for users that cannot log in directly.
    pub credential: Option<Credential>,

    /// Authentication tokens minted for this user.
    pub tokens: Vec<UserToken>,

    /// The user's per-course standing, keyed by course id.
    pub course_info: HashMap<String, CourseInfo>,
}

impl ServerUser {
    /// Returns the best human-readable name for the user.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    /// Verifies a client-supplied `password` hash against the stored credential and, failing
    /// that, against each of the user's tokens.
    pub fn verify_password(&self, password: &Password) -> ModelResult<bool> {
        if let Some(credential) = &self.credential {
            if credential.verify(password)? {
                return Ok(true);
            }
        }

        for token in &self.tokens {
            if token.credential.verify(password)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Converts this server user into a course user for the given course.
    ///
    /// Users enrolled in the course keep their enrolled role.  A server admin (or higher) that is
    /// *not* enrolled is promoted to a synthetic course owner so that server staff can operate on
    /// any course.  Everyone else gets `None`.
    pub fn to_course_user(&self, course_id: &str) -> ModelResult<Option<CourseUser>> {
        match self.course_info.get(course_id) {
            Some(info) => {
                if info.role == CourseRole::Unknown {
                    return Err(ModelError(format!(
                        "User '{}' has an unknown role in course '{}'",
                        self.email, course_id
                    )));
                }
                Ok(Some(CourseUser {
                    email: self.email.clone(),
                    name: self.name.clone(),
                    role: info.role,
                    lms_id: info.lms_id.clone(),
                }))
            }
            None => {
                if self.role >= ServerRole::Admin {
                    Ok(Some(CourseUser {
                        email: self.email.clone(),
                        name: self.name.clone(),
                        role: CourseRole::Owner,
                        lms_id: None,
                    }))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Creates the synthetic principal for requests authenticated with a root-user nonce.
    pub fn root() -> Self {
        ServerUser {
            email: ROOT_EMAIL.to_owned(),
            name: Some("root".to_owned()),
            role: ServerRole::Root,
            credential: None,
            tokens: Vec::new(),
            course_info: HashMap::new(),
        }
    }
}

/// A user as seen from within one course.
#[derive(Clone, Debug, PartialEq)]
pub struct CourseUser {
    /// The user's email, which is their account identifier.
    pub email: String,

    /// The user's display name, if provided.
    pub name: Option<String>,

    /// The user's role within the course.
    pub role: CourseRole,

    /// The user's identifier in the external LMS, if linked.
    pub lms_id: Option<String>,
}

impl CourseUser {
    /// Returns the best human-readable name for the user.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: ServerRole, enrollments: &[(&str, CourseRole)]) -> ServerUser {
        let mut course_info = HashMap::new();
        for (course, course_role) in enrollments {
            course_info.insert(
                (*course).to_owned(),
                CourseInfo { role: *course_role, lms_id: None },
            );
        }
        ServerUser {
            email: "someone@test.edulinq.org".to_owned(),
            name: None,
            role,
            credential: None,
            tokens: Vec::new(),
            course_info,
        }
    }

    #[test]
    fn test_to_course_user_enrolled_keeps_role() {
        let user = user_with(ServerRole::User, &[("course101", CourseRole::Student)]);
        let course_user = user.to_course_user("course101").unwrap().unwrap();
        assert_eq!(CourseRole::Student, course_user.role);
    }

    #[test]
    fn test_to_course_user_enrolled_admin_keeps_enrolled_role() {
        let user = user_with(ServerRole::Admin, &[("course101", CourseRole::Student)]);
        let course_user = user.to_course_user("course101").unwrap().unwrap();
        assert_eq!(CourseRole::Student, course_user.role);
    }

    #[test]
    fn test_to_course_user_unenrolled_admin_becomes_owner() {
        let user = user_with(ServerRole::Admin, &[]);
        let course_user = user.to_course_user("course101").unwrap().unwrap();
        assert_eq!(CourseRole::Owner, course_user.role);
    }

    #[test]
    fn test_to_course_user_unenrolled_regular_user_is_none() {
        let user = user_with(ServerRole::User, &[]);
        assert!(user.to_course_user("course101").unwrap().is_none());
    }

    #[test]
    fn test_to_course_user_unknown_role_is_an_error() {
        let user = user_with(ServerRole::User, &[("course101", CourseRole::Unknown)]);
        assert!(user.to_course_user("course101").is_err());
    }

    #[test]
    fn test_verify_password_checks_credential_and_tokens() {
        let password = Password::from_cleartext("the password");
        let token_secret = Password::from_cleartext("the token");
        let mut user = user_with(ServerRole::User, &[]);
        user.credential = Some(Credential::derive(&password).unwrap());
        user.tokens.push(UserToken {
            id: "t0".to_owned(),
            name: "ci".to_owned(),
            credential: Credential::derive(&token_secret).unwrap(),
        });

        assert!(user.verify_password(&password).unwrap());
        assert!(user.verify_password(&token_secret).unwrap());
        assert!(!user.verify_password(&Password::from_cleartext("nope")).unwrap());
    }

    #[test]
    fn test_root_user_shape() {
        let root = ServerUser::root();
        assert_eq!(ROOT_EMAIL, root.email);
        assert_eq!(ServerRole::Root, root.role);
        assert!(root.credential.is_none());
    }
}
