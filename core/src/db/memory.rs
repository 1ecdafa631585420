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

//! In-memory implementation of the persistence contract.

use crate::db::{Db, DbError, DbResult};
use crate::model::{
    ApiRequestMetric, Course, CourseUser, ServerUser, Submission,
};
use async_trait::async_trait;
use futures::lock::Mutex;
use std::collections::HashMap;

/// All the state held by a `MemoryDb`.
#[derive(Default)]
struct State {
    /// Server users keyed by email.
    users: HashMap<String, ServerUser>,

    /// Courses keyed by normalized id.
    courses: HashMap<String, Course>,

    /// Graded submissions in insertion order.
    submissions: Vec<Submission>,

    /// API request metrics in insertion order.
    metrics: Vec<ApiRequestMetric>,
}

/// A process-local implementation of `Db` for tests and small deployments.
#[derive(Default)]
pub struct MemoryDb {
    /// Backing state, shared by all clones through the same instance.
    state: Mutex<State>,
}

#[async_trait]
impl Db for MemoryDb {
    async fn get_server_user(&self, email: &str) -> DbResult<Option<ServerUser>> {
        let state = self.state.lock().await;
        Ok(state.users.get(email).cloned())
    }

    async fn get_server_users(&self) -> DbResult<Vec<ServerUser>> {
        let state = self.state.lock().await;
        let mut users = state.users.values().cloned().collect::<Vec<ServerUser>>();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn upsert_server_user(&self, user: ServerUser) -> DbResult<()> {
        let mut state = self.state.lock().await;
        state.users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn get_course(&self, course_id: &str) -> DbResult<Option<Course>> {
        let state = self.state.lock().await;
        Ok(state.courses.get(course_id).cloned())
    }

    async fn upsert_course(&self, course: Course) -> DbResult<()> {
        let mut state = self.state.lock().await;
        state.courses.insert(course.id.clone(), course);
        Ok(())
    }

    async fn get_course_users(&self, course_id: &str) -> DbResult<HashMap<String, CourseUser>> {
        let state = self.state.lock().await;

        let mut users = HashMap::new();
        for user in state.users.values() {
            if let Some(info) = user.course_info.get(course_id) {
                users.insert(
                    user.email.clone(),
                    CourseUser {
                        email: user.email.clone(),
                        name: user.name.clone(),
                        role: info.role,
                        lms_id: info.lms_id.clone(),
                    },
                );
            }
        }
        Ok(users)
    }

    async fn store_submission(&self, submission: Submission) -> DbResult<()> {
        let mut state = self.state.lock().await;
        state.submissions.push(submission);
        Ok(())
    }

    async fn get_latest_submission(
        &self,
        course_id: &str,
        assignment_id: &str,
        email: &str,
    ) -> DbResult<Option<Submission>> {
        let state = self.state.lock().await;
        Ok(state
            .submissions
            .iter()
            .filter(|s| {
                s.course_id == course_id && s.assignment_id == assignment_id && s.user == email
            })
            .max_by_key(|s| s.timestamp)
            .cloned())
    }

    async fn store_api_request_metric(&self, metric: ApiRequestMetric) -> DbResult<()> {
        let mut state = self.state.lock().await;
        state.metrics.push(metric);
        Ok(())
    }

    async fn get_api_request_metrics(&self) -> DbResult<Vec<ApiRequestMetric>> {
        let state = self.state.lock().await;
        Ok(state.metrics.clone())
    }
}

/// Test utilities for database implementations.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;

    /// A `Db` wrapper that fails every operation, to exercise backend-error paths.
    #[derive(Default)]
    pub struct FailingDb {}

    #[async_trait]
    impl Db for FailingDb {
        async fn get_server_user(&self, _email: &str) -> DbResult<Option<ServerUser>> {
            Err(DbError::Unavailable)
        }

        async fn get_server_users(&self) -> DbResult<Vec<ServerUser>> {
            Err(DbError::Unavailable)
        }

        async fn upsert_server_user(&self, _user: ServerUser) -> DbResult<()> {
            Err(DbError::Unavailable)
        }

        async fn get_course(&self, _course_id: &str) -> DbResult<Option<Course>> {
            Err(DbError::Unavailable)
        }

        async fn upsert_course(&self, _course: Course) -> DbResult<()> {
            Err(DbError::Unavailable)
        }

        async fn get_course_users(
            &self,
            _course_id: &str,
        ) -> DbResult<HashMap<String, CourseUser>> {
            Err(DbError::Unavailable)
        }

        async fn store_submission(&self, _submission: Submission) -> DbResult<()> {
            Err(DbError::Unavailable)
        }

        async fn get_latest_submission(
            &self,
            _course_id: &str,
            _assignment_id: &str,
            _email: &str,
        ) -> DbResult<Option<Submission>> {
            Err(DbError::Unavailable)
        }

        async fn store_api_request_metric(&self, _metric: ApiRequestMetric) -> DbResult<()> {
            Err(DbError::Unavailable)
        }

        async fn get_api_request_metrics(&self) -> DbResult<Vec<ApiRequestMetric>> {
            Err(DbError::Unavailable)
        }
    }
}
