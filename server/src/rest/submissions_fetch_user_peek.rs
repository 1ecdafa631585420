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

//! API to peek at a user's most recent submission for an assignment.

use crate::driver::Driver;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    AssignmentContext, ContextMut, Payload, Requirements, SpecialField,
    TargetCourseUserSelfOrGrader,
};
use autograder_core::model::{CourseRole, Submission};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/assignments/submissions/fetch/user/peek";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str =
    "Get the most recent submission of a user on an assignment.";

/// The request payload.  A blank target means the requesting user; peeking at somebody else
/// requires a course grader.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct PeekRequest {
    /// The assignment envelope.
    #[serde(flatten)]
    context: AssignmentContext,

    /// Whose submission to peek at.
    #[serde(default, rename = "target-email")]
    target: TargetCourseUserSelfOrGrader,
}

impl Payload for PeekRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::Assignment(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Student)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::TargetCourseUserSelfOrGrader {
            name: "target-email",
            field: &mut self.target,
        }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct PeekResponse {
    /// Whether the target user is in the course.
    #[serde(rename = "found-user")]
    pub(crate) found_user: bool,

    /// Whether the target user has a submission on the assignment.
    #[serde(rename = "found-submission")]
    pub(crate) found_submission: bool,

    /// The most recent submission, when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submission: Option<Submission>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: PeekRequest,
) -> Result<PeekResponse, ApiError> {
    if !request.target.found {
        return Ok(PeekResponse { found_user: false, found_submission: false, submission: None });
    }

    let submission = driver
        .latest_submission(
            &request.context.course.course_id,
            &request.context.assignment_id,
            &request.target.email,
        )
        .await
        .map_err(|e| driver_error("-602", &request.context, e))?;

    Ok(PeekResponse {
        found_user: true,
        found_submission: submission.is_some(),
        submission,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use autograder_core::db::Db;
    use autograder_core::model::Timestamp;
    use http::StatusCode;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    async fn store_submission(context: &TestContext, user_local: &str, millis: i64) {
        context
            .db
            .store_submission(Submission {
                id: format!("s-{}", millis),
                course_id: "course101".to_owned(),
                assignment_id: "hw0".to_owned(),
                user: email_of(user_local),
                timestamp: Timestamp::from_millis(millis),
                score: 90.0,
                max_points: 100.0,
                message: String::new(),
                questions: Vec::new(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_peek_own_submission_without_target() {
        let context = TestContext::setup().await;
        store_submission(&context, "course-student", 1000).await;
        store_submission(&context, "course-student", 2000).await;

        let content = content_as(
            "course-student",
            json!({"course-id": "course101", "assignment-id": "hw0"}),
        );
        let response: PeekResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;

        assert!(response.found_user);
        assert!(response.found_submission);
        assert_eq!("s-2000", response.submission.unwrap().id);
    }

    #[tokio::test]
    async fn test_student_cannot_peek_at_another_student() {
        let context = TestContext::setup().await;
        store_submission(&context, "course-other", 1000).await;

        let content = content_as(
            "course-student",
            json!({
                "course-id": "course101",
                "assignment-id": "hw0",
                "target-email": email_of("course-other"),
            }),
        );
        let envelope = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::FORBIDDEN)
            .expect_locator("-033")
            .await;

        // No submission data leaks on the permission failure.
        assert_eq!(serde_json::Value::Null, envelope.content);
    }

    #[tokio::test]
    async fn test_grader_can_peek_at_students() {
        let context = TestContext::setup().await;
        store_submission(&context, "course-student", 1000).await;

        let content = content_as(
            "course-grader",
            json!({
                "course-id": "course101",
                "assignment-id": "hw0",
                "target-email": email_of("course-student"),
            }),
        );
        let response: PeekResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.found_submission);
    }

    #[tokio::test]
    async fn test_no_submission_yet() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-student",
            json!({"course-id": "course101", "assignment-id": "hw0"}),
        );
        let response: PeekResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.found_user);
        assert!(!response.found_submission);
        assert!(response.submission.is_none());
    }

    #[tokio::test]
    async fn test_unenrolled_admin_can_peek_at_self() {
        let context = TestContext::setup().await;

        // The escalated admin is not on the roster, yet targeting self must resolve.
        let content = content_as(
            "server-admin",
            json!({"course-id": "course101", "assignment-id": "hw0"}),
        );
        let response: PeekResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.found_user);
        assert!(!response.found_submission);
    }
}
