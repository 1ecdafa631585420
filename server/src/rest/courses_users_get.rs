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

//! API to fetch one user of a course.

use crate::driver::Driver;
use crate::model::CourseUserInfo;
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, CourseUserContext, Payload, Requirements, SpecialField, TargetCourseUser,
};
use autograder_core::model::CourseRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/users/get";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Get the information for a course user.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct GetCourseUserRequest {
    /// The course-user envelope.
    #[serde(flatten)]
    context: CourseUserContext,

    /// The user to look up.
    #[serde(default, rename = "target-email")]
    target: TargetCourseUser,
}

impl Payload for GetCourseUserRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::CourseUser(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Grader)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::TargetCourseUser { name: "target-email", field: &mut self.target }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct GetCourseUserResponse {
    /// Whether the target user is enrolled in the course.
    pub(crate) found: bool,

    /// The target user, when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<CourseUserInfo>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    _driver: Driver,
    request: GetCourseUserRequest,
) -> Result<GetCourseUserResponse, ApiError> {
    Ok(GetCourseUserResponse {
        found: request.target.found,
        user: request.target.user.as_ref().map(CourseUserInfo::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use http::StatusCode;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_found() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-grader",
            json!({"course-id": "course101", "target-email": email_of("course-student")}),
        );
        let response: GetCourseUserResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.found);
        assert_eq!(CourseRole::Student, response.user.unwrap().role);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_an_error() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-grader",
            json!({"course-id": "course101", "target-email": "ghost@test.edulinq.org"}),
        );
        let response: GetCourseUserResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(!response.found);
        assert!(response.user.is_none());
    }

    #[tokio::test]
    async fn test_empty_target_is_rejected() {
        let context = TestContext::setup().await;

        let content = content_as("course-grader", json!({"course-id": "course101"}));
        let envelope = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-034")
            .await;
        assert!(envelope.message.contains("'target-email'"));
    }
}
