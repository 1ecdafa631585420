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

//! API-safe representations of the domain types.
//!
//! These are the shapes that leave the server inside response envelopes; they carry no
//! credentials, tokens or other internals.

use autograder_core::db::Db;
use autograder_core::driver::DriverResult;
use autograder_core::model::{Assignment, CourseRole, CourseUser, ServerRole, ServerUser};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An API-safe representation of an assignment.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub(crate) struct AssignmentInfo {
    /// Identifier of the assignment.
    pub(crate) id: String,

    /// Human-readable name of the assignment.
    pub(crate) name: String,

    /// Maximum number of points attainable.
    #[serde(rename = "max-points")]
    pub(crate) max_points: f64,
}

impl From<&Assignment> for AssignmentInfo {
    fn from(assignment: &Assignment) -> Self {
        AssignmentInfo {
            id: assignment.id.clone(),
            name: assignment.name.clone(),
            max_points: assignment.max_points,
        }
    }
}

/// An API-safe representation of a user within a course.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub(crate) struct CourseUserInfo {
    /// The user's email.
    pub(crate) email: String,

    /// The user's display name.
    pub(crate) name: String,

    /// The user's role within the course.
    pub(crate) role: CourseRole,

    /// The user's identifier in the external LMS, if linked.
    #[serde(default, rename = "lms-id", skip_serializing_if = "Option::is_none")]
    pub(crate) lms_id: Option<String>,
}

impl From<&CourseUser> for CourseUserInfo {
    fn from(user: &CourseUser) -> Self {
        CourseUserInfo {
            email: user.email.clone(),
            name: user.display_name().to_owned(),
            role: user.role,
            lms_id: user.lms_id.clone(),
        }
    }
}

/// Converts a roster into infos sorted by email.
pub(crate) fn course_user_infos<'a, I>(users: I) -> Vec<CourseUserInfo>
where
    I: IntoIterator<Item = &'a CourseUser>,
{
    let mut infos = users.into_iter().map(CourseUserInfo::from).collect::<Vec<CourseUserInfo>>();
    infos.sort_by(|a, b| a.email.cmp(&b.email));
    infos
}

/// One course enrollment as seen on a server user.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub(crate) struct EnrollmentInfo {
    /// Identifier of the course.
    pub(crate) id: String,

    /// Human-readable name of the course.
    pub(crate) name: String,

    /// The user's role within the course.
    pub(crate) role: CourseRole,
}

/// An API-safe representation of a server user.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub(crate) struct ServerUserInfo {
    /// The user's email.
    pub(crate) email: String,

    /// The user's display name.
    pub(crate) name: String,

    /// The user's server-wide role.
    pub(crate) role: ServerRole,

    /// The user's enrollments, keyed by course id.
    pub(crate) courses: BTreeMap<String, EnrollmentInfo>,
}

impl ServerUserInfo {
    /// Builds the info for one user, resolving course names through the persistence layer.  A
    /// course that has disappeared keeps its id as its name.
    pub(crate) async fn for_user(
        db: &Arc<dyn Db + Send + Sync>,
        user: &ServerUser,
    ) -> DriverResult<ServerUserInfo> {
        let mut courses = BTreeMap::new();
        for (course_id, info) in &user.course_info {
            let name = match db.get_course(course_id).await? {
                Some(course) => course.name,
                None => course_id.clone(),
            };
            courses.insert(
                course_id.clone(),
                EnrollmentInfo { id: course_id.clone(), name, role: info.role },
            );
        }

        Ok(ServerUserInfo {
            email: user.email.clone(),
            name: user.display_name().to_owned(),
            role: user.role,
            courses,
        })
    }

    /// Builds infos for a batch of users, sorted by email.
    pub(crate) async fn for_users(
        db: &Arc<dyn Db + Send + Sync>,
        users: &[ServerUser],
    ) -> DriverResult<Vec<ServerUserInfo>> {
        let mut infos = Vec::with_capacity(users.len());
        for user in users {
            infos.push(Self::for_user(db, user).await?);
        }
        infos.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(infos)
    }
}
