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

//! The request envelopes and the validation state machine.
//!
//! Request payloads embed (flatten) one of four envelopes, forming an inclusion chain: an
//! assignment context contains a course-user context contains a user context contains the base
//! request.  Validating an envelope first validates its parent, so by the time a handler runs,
//! every level it declared has been authenticated, authorized and populated.
//!
//! Each payload type declares its contract through the `Payload` trait: which envelope it
//! carries, the minimum roles it demands and the special fields the pipeline must load.

use crate::error::{ApiError, ErrorContext};
use crate::routing::{Pipeline, RequestParts};
use autograder_core::model::{
    self, Assignment, Course, CourseRole, CourseUser, Password, ServerRole, ServerUser, Timestamp,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub mod auth;
pub mod fields;
pub use fields::{
    CourseUsers, NonEmptyString, PostFiles, SpecialField, TargetCourseUser,
    TargetCourseUserSelfOrAdmin, TargetCourseUserSelfOrGrader, TargetServerUser,
    TargetServerUserSelfOrAdmin,
};
mod nonce;
pub use nonce::NonceTable;

/// The envelope levels, ordered by inclusion.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Scope {
    /// Just the base request: id, endpoint and timestamps.
    Base,

    /// An authenticated server user.
    User,

    /// An authenticated user within a course.
    CourseUser,

    /// A course user plus a resolved assignment.
    Assignment,
}

/// The base request envelope.  None of these fields come from the JSON payload; they are all
/// filled in during validation.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema)]
pub struct ApiRequest {
    /// Auto-generated identifier of this request.
    #[serde(skip)]
    pub request_id: String,

    /// The endpoint serving this request.
    #[serde(skip)]
    pub endpoint: String,

    /// Client identifier (the peer address, when known).
    #[serde(skip)]
    pub sender: String,

    /// When validation of this request started.
    #[serde(skip)]
    pub timestamp: Timestamp,

    /// Snapshot of the server's testing-mode flag when the request arrived.
    #[serde(skip)]
    pub testing_mode: bool,
}

impl ApiRequest {
    /// Fills in the base envelope.  This step cannot fail.
    fn validate(&mut self, pipeline: &Pipeline, parts: &RequestParts, endpoint: &str) {
        self.request_id = Uuid::new_v4().to_string();
        self.endpoint = endpoint.to_owned();
        self.sender = parts.sender.clone();
        self.timestamp = Timestamp::from(pipeline.clock().now_utc());
        self.testing_mode = pipeline.opts().testing_mode;
    }
}

impl ErrorContext for ApiRequest {
    fn apply(&self, error: &mut ApiError) {
        error.request_id = self.request_id.clone();
        error.endpoint = self.endpoint.clone();
        error.sender = self.sender.clone();
        error.timestamp = self.timestamp;
    }
}

/// Envelope for a request that has an authenticated user (pretty much the lowest level of
/// request).
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UserContext {
    /// The base envelope.
    #[serde(flatten)]
    pub request: ApiRequest,

    /// The claimed user email.
    #[serde(default, rename = "user-email")]
    pub user_email: String,

    /// The client-hashed password.
    #[serde(default, rename = "user-pass")]
    pub user_pass: Password,

    /// Single-use nonce minted by the trusted local path.  When present, password
    /// authentication is skipped.
    #[serde(default, rename = "root-user-nonce")]
    pub root_user_nonce: String,

    /// The authenticated principal, filled in during validation.
    #[serde(skip)]
    server_user: Option<ServerUser>,
}

impl UserContext {
    /// Returns the authenticated principal.
    pub fn server_user(&self) -> &ServerUser {
        self.server_user
            .as_ref()
            .expect("Validation populates the server user before handlers run")
    }

    /// Validates this envelope: authenticates the principal and checks the server-role floor.
    async fn validate(
        &mut self,
        pipeline: &Pipeline,
        parts: &RequestParts,
        endpoint: &str,
        requirements: &Requirements,
    ) -> Result<(), ApiError> {
        self.request.validate(pipeline, parts, endpoint);

        if !self.root_user_nonce.is_empty() {
            // Check for a valid nonce and skip authentication if it exists.  The nonce is
            // atomically consumed so it authenticates at most one request.
            if !pipeline.nonces().take(&self.root_user_nonce) {
                return Err(ApiError::auth_bad_request(
                    "-048",
                    &self.request,
                    "Incorrect root user nonce.",
                ));
            }

            let root = ServerUser::root();
            self.user_email = root.email.clone();
            self.server_user = Some(root);
        } else {
            if self.user_email.is_empty() {
                return Err(ApiError::bad_request(
                    "-016",
                    &self.request,
                    "No user email specified.",
                ));
            }

            if self.user_pass.is_empty() {
                return Err(ApiError::bad_request(
                    "-017",
                    &self.request,
                    "No user password specified.",
                ));
            }

            let user =
                auth::authenticate(pipeline.db(), &self.request, &self.user_email, &self.user_pass)
                    .await?;
            self.server_user = Some(user);
        }

        let min_role = requirements.min_server_role.unwrap_or(ServerRole::User);
        let actual_role = self.server_user().role;
        if actual_role < min_role {
            return Err(ApiError::bad_server_permissions(
                "-041",
                self,
                min_role,
                actual_role,
                "Base API Request",
            ));
        }

        Ok(())
    }
}

impl ErrorContext for UserContext {
    fn apply(&self, error: &mut ApiError) {
        self.request.apply(error);
        error.user_email = self.user_email.clone();
    }
}

/// Envelope for a request that has a course and an authenticated user from that course.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CourseUserContext {
    /// The user envelope.
    #[serde(flatten)]
    pub user: UserContext,

    /// The claimed course id.
    #[serde(default, rename = "course-id")]
    pub course_id: String,

    /// The resolved course, filled in during validation.
    #[serde(skip)]
    course: Option<Course>,

    /// The principal converted to a course user, filled in during validation.
    #[serde(skip)]
    course_user: Option<CourseUser>,
}

impl CourseUserContext {
    /// Returns the resolved course.
    pub fn course(&self) -> &Course {
        self.course.as_ref().expect("Validation populates the course before handlers run")
    }

    /// Returns the principal's standing within the course.
    pub fn course_user(&self) -> &CourseUser {
        self.course_user
            .as_ref()
            .expect("Validation populates the course user before handlers run")
    }

    /// Validates this envelope: resolves the course, converts the principal into a course user
    /// (escalating unenrolled server admins to a synthetic owner) and checks the course-role
    /// floor.
    async fn validate(
        &mut self,
        pipeline: &Pipeline,
        parts: &RequestParts,
        endpoint: &str,
        requirements: &Requirements,
    ) -> Result<(), ApiError> {
        self.user.validate(pipeline, parts, endpoint, requirements).await?;

        if self.course_id.is_empty() {
            return Err(ApiError::bad_request(
                "-015",
                &self.user.request,
                "No course ID specified.",
            ));
        }

        match model::validate_id(&self.course_id) {
            Ok(id) => self.course_id = id,
            Err(e) => {
                return Err(ApiError::bad_request(
                    "-052",
                    &self.user.request,
                    format!(
                        "Could not find course (course ID ('{}') is invalid).",
                        self.course_id
                    ),
                )
                .course(self.course_id.as_str())
                .err(e));
            }
        }

        let course = match pipeline.db().get_course(&self.course_id).await {
            Ok(course) => course,
            Err(e) => {
                return Err(ApiError::internal("-032", self, "Unable to get course.").err(e));
            }
        };

        let course = match course {
            Some(course) => course,
            None => {
                return Err(ApiError::bad_request(
                    "-018",
                    &self.user.request,
                    format!("Could not find course: '{}'.", self.course_id),
                )
                .course(self.course_id.as_str()));
            }
        };
        self.course = Some(course);

        let course_user = match self.user.server_user().to_course_user(&self.course_id) {
            Ok(course_user) => course_user,
            Err(e) => {
                return Err(ApiError::internal(
                    "-039",
                    self,
                    "Unable to convert server user to course user.",
                )
                .err(e));
            }
        };

        let course_user = match course_user {
            Some(course_user) => course_user,
            None => {
                return Err(ApiError::permission_denied(
                    "-040",
                    &self.user.request,
                    format!(
                        "User '{}' is not enrolled in course '{}'.",
                        self.user.user_email, self.course_id
                    ),
                )
                .course(self.course_id.as_str())
                .user(self.user.user_email.as_str()));
            }
        };
        self.course_user = Some(course_user);

        // Every course endpoint must declare a minimum course role; silence is a
        // misconfiguration, not an open door.
        let min_role = match requirements.min_course_role {
            Some(min_role) => min_role,
            None => {
                return Err(ApiError::internal(
                    "-019",
                    self,
                    "No role found for request. All course-based request payloads require a \
                     minimum role.",
                ));
            }
        };

        let actual_role = self.course_user().role;
        if actual_role < min_role {
            return Err(ApiError::bad_course_permissions(
                "-020",
                self,
                min_role,
                actual_role,
                "Base API Request",
            ));
        }

        Ok(())
    }
}

impl ErrorContext for CourseUserContext {
    fn apply(&self, error: &mut ApiError) {
        self.user.apply(error);
        error.course_id = self.course_id.clone();
    }
}

/// Envelope for requests that need an assignment on top of a user/course.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AssignmentContext {
    /// The course-user envelope.
    #[serde(flatten)]
    pub course: CourseUserContext,

    /// The claimed assignment id.
    #[serde(default, rename = "assignment-id")]
    pub assignment_id: String,

    /// The resolved assignment, filled in during validation.
    #[serde(skip)]
    assignment: Option<Assignment>,
}

impl AssignmentContext {
    /// Returns the resolved assignment.
    pub fn assignment(&self) -> &Assignment {
        self.assignment
            .as_ref()
            .expect("Validation populates the assignment before handlers run")
    }

    /// Validates this envelope: resolves the assignment on the already-resolved course.
    async fn validate(
        &mut self,
        pipeline: &Pipeline,
        parts: &RequestParts,
        endpoint: &str,
        requirements: &Requirements,
    ) -> Result<(), ApiError> {
        self.course.validate(pipeline, parts, endpoint, requirements).await?;

        if self.assignment_id.is_empty() {
            return Err(ApiError::bad_request(
                "-021",
                &self.course.user.request,
                "No assignment ID specified.",
            ));
        }

        match model::validate_id(&self.assignment_id) {
            Ok(id) => self.assignment_id = id,
            Err(e) => {
                return Err(ApiError::bad_request(
                    "-035",
                    &self.course.user.request,
                    format!(
                        "Could not find assignment (assignment ID ('{}') is invalid).",
                        self.assignment_id
                    ),
                )
                .course(self.course.course_id.as_str())
                .assignment(self.assignment_id.as_str())
                .err(e));
            }
        }

        let assignment = match self.course.course().get_assignment(&self.assignment_id) {
            Some(assignment) => assignment.clone(),
            None => {
                return Err(ApiError::bad_request(
                    "-022",
                    &self.course.user.request,
                    format!("Could not find assignment: '{}'.", self.assignment_id),
                )
                .course(self.course.course_id.as_str())
                .assignment(self.assignment_id.as_str()));
            }
        };
        self.assignment = Some(assignment);

        Ok(())
    }
}

impl ErrorContext for AssignmentContext {
    fn apply(&self, error: &mut ApiError) {
        self.course.apply(error);
        error.assignment_id = self.assignment_id.clone();
    }
}

/// Mutable view of the envelope a payload carries.
pub enum ContextMut<'a> {
    /// Just the base request.
    Base(&'a mut ApiRequest),

    /// A user context.
    User(&'a mut UserContext),

    /// A course-user context.
    CourseUser(&'a mut CourseUserContext),

    /// An assignment context.
    Assignment(&'a mut AssignmentContext),
}

impl ContextMut<'_> {
    /// Returns the scope of this view.
    pub fn scope(&self) -> Scope {
        match self {
            ContextMut::Base(_) => Scope::Base,
            ContextMut::User(_) => Scope::User,
            ContextMut::CourseUser(_) => Scope::CourseUser,
            ContextMut::Assignment(_) => Scope::Assignment,
        }
    }
}

/// The role floors an endpoint demands.  This is the statically-typed stand-in for embedding
/// minimum-role marker fields in the payload: an endpoint that would embed several markers
/// declares their maximum here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Requirements {
    /// Minimum server role, when declared.  User-scoped endpoints without a declaration
    /// default to `ServerRole::User`.
    pub min_server_role: Option<ServerRole>,

    /// Minimum course role, when declared.  Mandatory for course-scoped endpoints.
    pub min_course_role: Option<CourseRole>,
}

impl Requirements {
    /// Declares a minimum server role.
    pub fn server(role: ServerRole) -> Self {
        Requirements { min_server_role: Some(role), min_course_role: None }
    }

    /// Declares a minimum course role.
    pub fn course(role: CourseRole) -> Self {
        Requirements { min_server_role: None, min_course_role: Some(role) }
    }

    /// Adds a server-role floor, keeping the maximum of the declared roles.
    pub fn with_server(mut self, role: ServerRole) -> Self {
        self.min_server_role = Some(match self.min_server_role {
            Some(existing) if existing >= role => existing,
            _ => role,
        });
        self
    }

    /// Adds a course-role floor, keeping the maximum of the declared roles.
    pub fn with_course(mut self, role: CourseRole) -> Self {
        self.min_course_role = Some(match self.min_course_role {
            Some(existing) if existing >= role => existing,
            _ => role,
        });
        self
    }
}

/// The per-endpoint request contract.
///
/// A payload declares, once, everything the pipeline enforces on its behalf: the envelope it
/// flattens, the role floors it demands and the special fields it carries.  Handlers can then
/// trust that a payload they receive is fully validated and populated.
pub trait Payload: DeserializeOwned + Send + Sync + 'static {
    /// Returns a mutable view of the envelope embedded in this payload.
    fn context_mut(&mut self) -> ContextMut<'_>;

    /// Returns the role floors this endpoint demands.
    fn requirements() -> Requirements {
        Requirements::default()
    }

    /// Returns the special fields this payload carries, in declaration order.
    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        Vec::new()
    }
}

/// Snapshot of the validated envelope, used by the special-field loaders and by the dispatcher
/// for envelope assembly and telemetry.
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    /// The scope the payload validated at.
    pub(crate) scope: Scope,

    /// Clone of the base envelope.
    pub(crate) base: ApiRequest,

    /// The authenticated user email, when scope >= user.
    pub(crate) user_email: String,

    /// The authenticated principal, when scope >= user.
    pub(crate) server_user: Option<ServerUser>,

    /// The resolved course id, when scope >= course-user.
    pub(crate) course_id: String,

    /// The principal's course standing, when scope >= course-user.
    pub(crate) course_user: Option<CourseUser>,

    /// The resolved assignment id, when scope is assignment.
    pub(crate) assignment_id: String,
}

impl ErrorContext for Resolved {
    fn apply(&self, error: &mut ApiError) {
        self.base.apply(error);
        error.user_email = self.user_email.clone();
        error.course_id = self.course_id.clone();
        error.assignment_id = self.assignment_id.clone();
    }
}

/// Validates a payload end to end: envelopes first, special fields second.
///
/// On success the payload is fully populated and the returned snapshot describes the validated
/// envelope for the dispatcher's bookkeeping.
pub(crate) async fn validate<R: Payload>(
    pipeline: &Pipeline,
    parts: &RequestParts,
    request: &mut R,
    endpoint: &str,
) -> Result<Resolved, ApiError> {
    let requirements = R::requirements();

    let resolved = match request.context_mut() {
        ContextMut::Base(ctx) => {
            ctx.validate(pipeline, parts, endpoint);
            Resolved {
                scope: Scope::Base,
                base: ctx.clone(),
                user_email: String::new(),
                server_user: None,
                course_id: String::new(),
                course_user: None,
                assignment_id: String::new(),
            }
        }

        ContextMut::User(ctx) => {
            ctx.validate(pipeline, parts, endpoint, &requirements).await?;
            Resolved {
                scope: Scope::User,
                base: ctx.request.clone(),
                user_email: ctx.user_email.clone(),
                server_user: Some(ctx.server_user().clone()),
                course_id: String::new(),
                course_user: None,
                assignment_id: String::new(),
            }
        }

        ContextMut::CourseUser(ctx) => {
            ctx.validate(pipeline, parts, endpoint, &requirements).await?;
            Resolved {
                scope: Scope::CourseUser,
                base: ctx.user.request.clone(),
                user_email: ctx.user.user_email.clone(),
                server_user: Some(ctx.user.server_user().clone()),
                course_id: ctx.course_id.clone(),
                course_user: Some(ctx.course_user().clone()),
                assignment_id: String::new(),
            }
        }

        ContextMut::Assignment(ctx) => {
            ctx.validate(pipeline, parts, endpoint, &requirements).await?;
            Resolved {
                scope: Scope::Assignment,
                base: ctx.course.user.request.clone(),
                user_email: ctx.course.user.user_email.clone(),
                server_user: Some(ctx.course.user.server_user().clone()),
                course_id: ctx.course.course_id.clone(),
                course_user: Some(ctx.course.course_user().clone()),
                assignment_id: ctx.assignment_id.clone(),
            }
        }
    };

    fields::process(pipeline, parts, request, &resolved).await?;

    Ok(resolved)
}
