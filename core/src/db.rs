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

//! The contract of the persistence layer.
//!
//! The request pipeline and the drivers only ever talk to storage through the `Db` trait below.
//! The bundled `MemoryDb` implementation backs unit tests and small deployments; real backends
//! live behind the same trait.

use crate::model::{
    ApiRequestMetric, Course, CourseUser, ServerUser, Submission,
};
use async_trait::async_trait;
use std::collections::HashMap;

mod memory;
pub use memory::MemoryDb;
#[cfg(any(test, feature = "testutils"))]
pub use memory::testutils::FailingDb;

/// Database errors.  Any unexpected errors that come from the backend are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DbError {
    /// Indicates that a request to create an entry failed because it already exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available.
    #[error("Unavailable")]
    Unavailable,
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// Abstraction over the persistence layer.
#[async_trait]
pub trait Db {
    /// Looks up a server user by email.
    async fn get_server_user(&self, email: &str) -> DbResult<Option<ServerUser>>;

    /// Returns all server users.
    async fn get_server_users(&self) -> DbResult<Vec<ServerUser>>;

    /// Creates or replaces a server user keyed by email.
    async fn upsert_server_user(&self, user: ServerUser) -> DbResult<()>;

    /// Looks up a course by its normalized id.
    async fn get_course(&self, course_id: &str) -> DbResult<Option<Course>>;

    /// Creates or replaces a course keyed by id.
    async fn upsert_course(&self, course: Course) -> DbResult<()>;

    /// Returns the users enrolled in a course, keyed by email.
    async fn get_course_users(&self, course_id: &str) -> DbResult<HashMap<String, CourseUser>>;

    /// Records a graded submission.
    async fn store_submission(&self, submission: Submission) -> DbResult<()>;

    /// Returns the most recent submission for one user on one assignment, if any.
    async fn get_latest_submission(
        &self,
        course_id: &str,
        assignment_id: &str,
        email: &str,
    ) -> DbResult<Option<Submission>>;

    /// Records one API request telemetry metric.
    async fn store_api_request_metric(&self, metric: ApiRequestMetric) -> DbResult<()>;

    /// Returns all recorded API request metrics, oldest first.
    async fn get_api_request_metrics(&self) -> DbResult<Vec<ApiRequestMetric>>;
}
