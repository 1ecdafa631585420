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

//! API to submit files for grading.

use crate::driver::{Driver, SubmitOutcome};
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    AssignmentContext, ContextMut, Payload, PostFiles, Requirements, SpecialField,
};
use autograder_core::model::CourseRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/assignments/submissions/submit";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Submit an assignment for grading.";

/// The request payload.  The uploaded files are captured by the pipeline.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct SubmitRequest {
    /// The assignment envelope.
    #[serde(flatten)]
    context: AssignmentContext,

    /// The submitted files, populated during validation.
    #[serde(skip)]
    files: PostFiles,
}

impl Payload for SubmitRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::Assignment(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Student)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::PostFiles { field: &mut self.files }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct SubmitResponse {
    /// Whether the submission was rejected before grading.
    pub(crate) rejected: bool,

    /// The reason for a rejection, safe to show to the student.
    #[serde(default)]
    pub(crate) message: String,

    /// Identifier of the graded submission, when grading happened.
    #[serde(default, rename = "submission-id", skip_serializing_if = "Option::is_none")]
    pub(crate) submission_id: Option<String>,

    /// Points awarded, when grading happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<f64>,

    /// Points attainable, when grading happened.
    #[serde(default, rename = "max-points", skip_serializing_if = "Option::is_none")]
    pub(crate) max_points: Option<f64>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: SubmitRequest,
) -> Result<SubmitResponse, ApiError> {
    let outcome = driver
        .submit(
            &request.context.course.course_id,
            request.context.assignment(),
            &request.context.course.user.user_email,
            &request.files.temp_dir,
        )
        .await
        .map_err(|e| driver_error("-600", &request.context, e))?;

    match outcome {
        SubmitOutcome::Rejected(reason) => Ok(SubmitResponse {
            rejected: true,
            message: reason,
            submission_id: None,
            score: None,
            max_points: None,
        }),

        SubmitOutcome::Graded(submission) => Ok(SubmitResponse {
            rejected: false,
            message: submission.message.clone(),
            submission_id: Some(submission.id),
            score: Some(submission.score),
            max_points: Some(submission.max_points),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use autograder_core::db::Db;
    use http::StatusCode;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_submit_grades_and_records() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-student",
            json!({"course-id": "course101", "assignment-id": "hw0"}),
        );
        let response: SubmitResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_multipart(&content, &[("solution.py", b"print('hi')")])
            .await
            .expect_content()
            .await;

        assert!(!response.rejected);
        assert_eq!(Some(100.0), response.score);
        assert_eq!(Some(100.0), response.max_points);

        let stored = context
            .db
            .get_latest_submission("course101", "hw0", &email_of("course-student"))
            .await
            .unwrap();
        assert_eq!(response.submission_id.unwrap(), stored.unwrap().id);
    }

    #[tokio::test]
    async fn test_submit_requires_files() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-student",
            json!({"course-id": "course101", "assignment-id": "hw0"}),
        );
        OneShotBuilder::new(context.app.clone(), route())
            .send_multipart(&content, &[])
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-030")
            .await;
    }

    #[tokio::test]
    async fn test_other_role_cannot_submit() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-other",
            json!({"course-id": "course101", "assignment-id": "hw0"}),
        );
        OneShotBuilder::new(context.app.clone(), route())
            .send_multipart(&content, &[("solution.py", b"print('hi')")])
            .await
            .expect_status(StatusCode::FORBIDDEN)
            .expect_locator("-020")
            .await;
    }
}
