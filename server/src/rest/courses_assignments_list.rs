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

//! API to list the assignments of a course.

use crate::driver::Driver;
use crate::model::AssignmentInfo;
use autograder_api::error::ApiError;
use autograder_api::request::{ContextMut, CourseUserContext, Payload, Requirements};
use autograder_core::model::CourseRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/assignments/list";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "List the assignments in the course.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct ListAssignmentsRequest {
    /// The course-user envelope.
    #[serde(flatten)]
    context: CourseUserContext,
}

impl Payload for ListAssignmentsRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::CourseUser(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Other)
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct ListAssignmentsResponse {
    /// The course's assignments, sorted by id.
    pub(crate) assignments: Vec<AssignmentInfo>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    _driver: Driver,
    request: ListAssignmentsRequest,
) -> Result<ListAssignmentsResponse, ApiError> {
    let assignments = request
        .context
        .course()
        .sorted_assignments()
        .into_iter()
        .map(AssignmentInfo::from)
        .collect();
    Ok(ListAssignmentsResponse { assignments })
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
    async fn test_sorted_listing() {
        let context = TestContext::setup().await;

        let content = content_as("course-other", json!({"course-id": "course101"}));
        let response: ListAssignmentsResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;

        let ids =
            response.assignments.iter().map(|a| a.id.clone()).collect::<Vec<String>>();
        assert_eq!(vec!["hw0".to_owned(), "hw1".to_owned()], ids);
    }
}
