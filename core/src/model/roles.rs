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

//! The totally-ordered server and course role enumerations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's role within the whole server.
///
/// `Unknown` is the zero value and no stored user should have it.  `Root` is not for an actual
/// user either: it is the authority granted to requests authenticated with a root-user nonce.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ServerRole {
    /// Invalid zero value.
    #[default]
    Unknown,

    /// Standard users.  These users can even be owners of courses.
    User,

    /// Users that can create courses and administer their own courses.
    Creator,

    /// Users that can administer all courses.
    Admin,

    /// Top-level authorities (that are real users) on the server.
    Owner,

    /// The authority granted to trusted local requests; never a stored user.
    Root,
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerRole::Unknown => "unknown",
            ServerRole::User => "user",
            ServerRole::Creator => "creator",
            ServerRole::Admin => "admin",
            ServerRole::Owner => "owner",
            ServerRole::Root => "root",
        };
        f.write_str(name)
    }
}

/// A user's role within a single course.
///
/// `Unknown` is the zero value and no enrolled user should have it.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CourseRole {
    /// Invalid zero value.
    #[default]
    Unknown,

    /// Miscellaneous users that should not be able to submit.
    Other,

    /// Standard users/students.
    Student,

    /// Users that need access to grades and submissions but cannot administer a course.
    Grader,

    /// Users that administer a course.
    Admin,

    /// Top-level authorities of a course.
    Owner,
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CourseRole::Unknown => "unknown",
            CourseRole::Other => "other",
            CourseRole::Student => "student",
            CourseRole::Grader => "grader",
            CourseRole::Admin => "admin",
            CourseRole::Owner => "owner",
        };
        f.write_str(name)
    }
}
