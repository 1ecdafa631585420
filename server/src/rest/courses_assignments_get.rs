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

//! API to fetch one assignment of a course.

use crate::driver::Driver;
use crate::model::AssignmentInfo;
use autograder_api::error::ApiError;
use autograder_api::request::{AssignmentContext, ContextMut, Payload, Requirements};
use autograder_core::model::CourseRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/assignments/get";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Get the information for a course assignment.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct GetAssignmentRequest {
    /// The assignment envelope.
    #[serde(flatten)]
    context: AssignmentContext,
}

impl Payload for GetAssignmentRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::Assignment(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Other)
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct GetAssignmentResponse {
    /// The requested assignment.
    pub(crate) assignment: AssignmentInfo,
}

/// POST handler for this API.
pub(crate) async fn handle(
    _driver: Driver,
    request: GetAssignmentRequest,
) -> Result<GetAssignmentResponse, ApiError> {
    Ok(GetAssignmentResponse {
        assignment: AssignmentInfo::from(request.context.assignment()),
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
    async fn test_ok_with_telemetry() {
        let context = TestContext::setup().await;

        let content =
            content_as("course-admin", json!({"course-id": "course101", "assignment-id": "hw0"}));
        let response: GetAssignmentResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert_eq!("hw0", response.assignment.id);
        assert_eq!("Homework 0", response.assignment.name);

        let metrics = context.metrics().await;
        assert_eq!(1, metrics.len());
        assert_eq!(Some("/api/v03/courses/assignments/get".to_owned()), metrics[0].endpoint);
        assert_eq!(Some(email_of("course-admin")), metrics[0].user);
        assert_eq!(Some("course101".to_owned()), metrics[0].course);
        assert_eq!(Some("hw0".to_owned()), metrics[0].assignment);
        assert_eq!(None, metrics[0].locator);
    }

    #[tokio::test]
    async fn test_students_can_fetch_assignments() {
        let context = TestContext::setup().await;

        let content =
            content_as("course-student", json!({"course-id": "course101", "assignment-id": "hw0"}));
        let response: GetAssignmentResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert_eq!("hw0", response.assignment.id);
    }

    #[tokio::test]
    async fn test_unenrolled_user_is_denied() {
        let context = TestContext::setup().await;

        let content =
            content_as("server-user", json!({"course-id": "course101", "assignment-id": "hw0"}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::FORBIDDEN)
            .expect_locator("-040")
            .await;

        let metrics = context.metrics().await;
        assert_eq!(Some("-040".to_owned()), metrics[0].locator);
    }

    #[tokio::test]
    async fn test_unenrolled_server_admin_is_escalated() {
        let context = TestContext::setup().await;

        let content =
            content_as("server-admin", json!({"course-id": "course101", "assignment-id": "hw0"}));
        let response: GetAssignmentResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert_eq!("hw0", response.assignment.id);
    }

    #[tokio::test]
    async fn test_unknown_assignment() {
        let context = TestContext::setup().await;

        let content =
            content_as("course-admin", json!({"course-id": "course101", "assignment-id": "zzz"}));
        let envelope = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-022")
            .await;
        assert!(envelope.message.contains("zzz"));
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let context = TestContext::setup().await;

        let content =
            content_as("course-admin", json!({"course-id": "course999", "assignment-id": "hw0"}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-018")
            .await;
    }

    #[tokio::test]
    async fn test_invalid_ids() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({"course-id": "course!!!id", "assignment-id": "hw0"}),
        );
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-052")
            .await;

        let content = content_as(
            "course-admin",
            json!({"course-id": "course101", "assignment-id": "hw!!!0"}),
        );
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-035")
            .await;
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let context = TestContext::setup().await;

        let content = content_as("course-admin", json!({"assignment-id": "hw0"}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-015")
            .await;

        let content = content_as("course-admin", json!({"course-id": "course101"}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-021")
            .await;
    }
}
