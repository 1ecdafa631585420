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

//! API to drop a user from a course.

use crate::driver::Driver;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, CourseUserContext, Payload, Requirements, SpecialField, TargetCourseUser,
};
use autograder_core::model::CourseRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/users/drop";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Drop a user from the course.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct DropCourseUserRequest {
    /// The course-user envelope.
    #[serde(flatten)]
    context: CourseUserContext,

    /// The user to drop.
    #[serde(default, rename = "target-email")]
    target: TargetCourseUser,
}

impl Payload for DropCourseUserRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::CourseUser(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Admin)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::TargetCourseUser { name: "target-email", field: &mut self.target }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct DropCourseUserResponse {
    /// Whether the target user was enrolled in the course.
    pub(crate) found: bool,

    /// Whether the target user was dropped.
    pub(crate) dropped: bool,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: DropCourseUserRequest,
) -> Result<DropCourseUserResponse, ApiError> {
    if !request.target.found {
        return Ok(DropCourseUserResponse { found: false, dropped: false });
    }

    let dropped = driver
        .drop_from_course(&request.target.email, &request.context.course_id)
        .await
        .map_err(|e| driver_error("-601", &request.context, e))?;

    Ok(DropCourseUserResponse { found: true, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_drop_enrolled_user() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({"course-id": "course101", "target-email": email_of("course-student")}),
        );
        let response: DropCourseUserResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.found);
        assert!(response.dropped);

        let stored = context.stored_user("course-student").await.unwrap();
        assert!(!stored.course_info.contains_key("course101"));
    }

    #[tokio::test]
    async fn test_drop_unknown_user() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({"course-id": "course101", "target-email": "ghost@test.edulinq.org"}),
        );
        let response: DropCourseUserResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(!response.found);
        assert!(!response.dropped);
    }
}
