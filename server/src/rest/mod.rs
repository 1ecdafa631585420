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

//! Entry point to the REST server.
//!
//! Every endpoint lives in its own `.rs` file, using a name derived from its path.  This may
//! seem overkill, but putting every endpoint in its own file makes it easy to ensure all the
//! integration tests for the given endpoint truly belong to that endpoint.
//!
//! More specifically, the `tests` module within an endpoint should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the
//! module then rely on `route` to obtain this information, ensuring that they all test the
//! desired endpoint.

use crate::driver::Driver;
use autograder_api::error::{ApiError, ErrorContext};
use autograder_api::routing::{ApiRouter, Pipeline, Route};
use autograder_core::driver::DriverError;
use http::Method;

mod courses_assignments_get;
mod courses_assignments_list;
mod courses_users_drop;
mod courses_users_enroll;
mod courses_users_get;
mod courses_users_list;
mod metadata_describe;
mod submissions_fetch_user_peek;
mod submissions_submit;
#[cfg(test)]
pub(crate) mod testutils;
mod users_get;
mod users_list;
mod users_password_change;
mod users_password_reset;
mod users_tokens_create;
mod users_tokens_delete;
mod users_upsert;

/// Creates the router for the application and publishes the endpoint catalog.
pub(crate) fn app(pipeline: Pipeline, driver: Driver) -> axum::Router {
    let describe_path =
        format!("{}{}", pipeline.opts().api_prefix(), metadata_describe::PATH);

    let mut router = ApiRouter::new(pipeline);
    router.add(Route::redirect(Method::GET, "/", &describe_path));

    router.add(Route::api(
        courses_assignments_get::PATH,
        courses_assignments_get::DESCRIPTION,
        courses_assignments_get::handle,
    ));
    router.add(Route::api(
        courses_assignments_list::PATH,
        courses_assignments_list::DESCRIPTION,
        courses_assignments_list::handle,
    ));
    router.add(Route::api(
        submissions_submit::PATH,
        submissions_submit::DESCRIPTION,
        submissions_submit::handle,
    ));
    router.add(Route::api(
        submissions_fetch_user_peek::PATH,
        submissions_fetch_user_peek::DESCRIPTION,
        submissions_fetch_user_peek::handle,
    ));
    router.add(Route::api(
        courses_users_drop::PATH,
        courses_users_drop::DESCRIPTION,
        courses_users_drop::handle,
    ));
    router.add(Route::api(
        courses_users_enroll::PATH,
        courses_users_enroll::DESCRIPTION,
        courses_users_enroll::handle,
    ));
    router.add(Route::api(
        courses_users_get::PATH,
        courses_users_get::DESCRIPTION,
        courses_users_get::handle,
    ));
    router.add(Route::api(
        courses_users_list::PATH,
        courses_users_list::DESCRIPTION,
        courses_users_list::handle,
    ));
    router.add(Route::api(users_get::PATH, users_get::DESCRIPTION, users_get::handle));
    router.add(Route::api(users_list::PATH, users_list::DESCRIPTION, users_list::handle));
    router.add(Route::api(
        users_password_change::PATH,
        users_password_change::DESCRIPTION,
        users_password_change::handle,
    ));
    router.add(Route::api(
        users_password_reset::PATH,
        users_password_reset::DESCRIPTION,
        users_password_reset::handle,
    ));
    router.add(Route::api(
        users_tokens_create::PATH,
        users_tokens_create::DESCRIPTION,
        users_tokens_create::handle,
    ));
    router.add(Route::api(
        users_tokens_delete::PATH,
        users_tokens_delete::DESCRIPTION,
        users_tokens_delete::handle,
    ));
    router.add(Route::api(users_upsert::PATH, users_upsert::DESCRIPTION, users_upsert::handle));
    router.add(Route::api(
        metadata_describe::PATH,
        metadata_describe::DESCRIPTION,
        metadata_describe::handle,
    ));

    driver.set_description(router.describe());

    router.into_router(driver)
}

/// Converts a driver error into an API error at the handler's `locator`.
pub(crate) fn driver_error(
    locator: &str,
    context: &dyn ErrorContext,
    e: DriverError,
) -> ApiError {
    match e {
        DriverError::AlreadyExists(msg)
        | DriverError::InvalidInput(msg)
        | DriverError::NotFound(msg) => ApiError::bad_request(locator, context, msg),
        DriverError::Unauthorized(msg) => ApiError::permission_denied(locator, context, msg),
        DriverError::BackendError(msg) => ApiError::internal(locator, context, msg),
    }
}
