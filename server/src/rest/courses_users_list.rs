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

//! API to list the users of a course.

use crate::driver::Driver;
use crate::model::{CourseUserInfo, course_user_infos};
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, CourseUserContext, CourseUsers, Payload, Requirements, SpecialField,
};
use autograder_core::model::CourseRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/users/list";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "List the users in the course.";

/// The request payload.  The roster is loaded by the pipeline.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct ListCourseUsersRequest {
    /// The course-user envelope.
    #[serde(flatten)]
    context: CourseUserContext,

    /// The course roster, populated during validation.
    #[serde(skip)]
    users: CourseUsers,
}

impl Payload for ListCourseUsersRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::CourseUser(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Grader)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::CourseUsers { field: &mut self.users }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct ListCourseUsersResponse {
    /// The users of the course, sorted by email.
    pub(crate) users: Vec<CourseUserInfo>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    _driver: Driver,
    request: ListCourseUsersRequest,
) -> Result<ListCourseUsersResponse, ApiError> {
    Ok(ListCourseUsersResponse { users: course_user_infos(request.users.values()) })
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
    async fn test_roster_is_complete_and_sorted() {
        let context = TestContext::setup().await;

        let content = content_as("course-grader", json!({"course-id": "course101"}));
        let response: ListCourseUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;

        let emails = response.users.iter().map(|u| u.email.clone()).collect::<Vec<String>>();
        assert_eq!(
            vec![
                email_of("course-admin"),
                email_of("course-grader"),
                email_of("course-other"),
                email_of("course-owner"),
                email_of("course-student"),
            ],
            emails
        );
    }

    #[tokio::test]
    async fn test_students_cannot_list() {
        let context = TestContext::setup().await;

        let content = content_as("course-student", json!({"course-id": "course101"}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::FORBIDDEN)
            .expect_locator("-020")
            .await;
    }
}
