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

//! Special fields that can appear in request payloads.
//!
//! A payload that declares one of these fields gets it populated by the pipeline during
//! validation: course rosters are fetched, target users are resolved (with self-or-role
//! permission checks), uploaded files are materialized into a per-request temp directory, and
//! non-empty strings are enforced.  Each field type declares the minimum envelope scope it
//! needs; declaring it on a payload with a smaller envelope is a server misconfiguration.

use crate::error::ApiError;
use crate::request::{Payload, Resolved, Scope};
use crate::routing::{Pipeline, RequestParts};
use autograder_core::model::{CourseRole, CourseUser, ServerRole, ServerUser};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A populated course roster, keyed by email.  Declaring this field requires at least a
/// course-user context.
#[derive(Clone, Debug, Default)]
pub struct CourseUsers(pub HashMap<String, CourseUser>);

impl Deref for CourseUsers {
    type Target = HashMap<String, CourseUser>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A field targeting a specific server user.  Serializes to/from a plain string holding the
/// target's email; `null` and the empty string both mean "no target".  A missing user is not an
/// error: `found` is left false and the handler decides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetServerUser {
    /// Whether the target user exists.
    pub found: bool,

    /// The target's email.
    pub email: String,

    /// The resolved user, when found.
    pub user: Option<ServerUser>,
}

/// Same as `TargetServerUser`, but a blank value defaults to the context user and targeting
/// somebody else requires a server admin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetServerUserSelfOrAdmin(pub TargetServerUser);

/// A field targeting a specific course user.  Same wire shape as `TargetServerUser`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetCourseUser {
    /// Whether the target user is in the course.
    pub found: bool,

    /// The target's email.
    pub email: String,

    /// The resolved course user, when found.
    pub user: Option<CourseUser>,
}

/// Same as `TargetCourseUser`, but a blank value defaults to the context user and targeting
/// somebody else requires a course grader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetCourseUserSelfOrGrader(pub TargetCourseUser);

/// Same as `TargetCourseUserSelfOrGrader`, but targeting somebody else requires a course admin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetCourseUserSelfOrAdmin(pub TargetCourseUser);

/// Files captured from the multipart POST body, materialized into a per-request temp
/// directory.  The directory is removed by the pipeline once the response is assembled.
#[derive(Clone, Debug, Default)]
pub struct PostFiles {
    /// Directory holding the uploaded files.
    pub temp_dir: PathBuf,

    /// Names of the uploaded files within `temp_dir`.
    pub filenames: Vec<String>,
}

/// A named field that must hold a non-empty string value.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NonEmptyString(pub String);

impl NonEmptyString {
    /// Returns a string view of the value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decodes a JSON string-or-null into the email form shared by the target-user fields.
fn email_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    // Clients sometimes send the literal string "null"; treat it as no value.
    if text == "null" { Ok(String::new()) } else { Ok(text) }
}

impl<'de> Deserialize<'de> for TargetServerUser {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let email = email_from_json(deserializer)?;
        Ok(TargetServerUser { found: false, email, user: None })
    }
}

impl Serialize for TargetServerUser {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.email)
    }
}

impl<'de> Deserialize<'de> for TargetCourseUser {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let email = email_from_json(deserializer)?;
        Ok(TargetCourseUser { found: false, email, user: None })
    }
}

impl Serialize for TargetCourseUser {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.email)
    }
}

impl<'de> Deserialize<'de> for NonEmptyString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(NonEmptyString(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
    }
}

/// Generates delegating serde impls plus `Deref` for the self-or-role wrapper types.
macro_rules! target_wrapper [
    ( $outer:ty, $inner:ty ) => {
        impl Deref for $outer {
            type Target = $inner;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $outer {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl<'de> Deserialize<'de> for $outer {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Ok(Self(<$inner>::deserialize(deserializer)?))
            }
        }

        impl Serialize for $outer {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.0.serialize(serializer)
            }
        }
    }
];

target_wrapper!(TargetServerUserSelfOrAdmin, TargetServerUser);
target_wrapper!(TargetCourseUserSelfOrGrader, TargetCourseUser);
target_wrapper!(TargetCourseUserSelfOrAdmin, TargetCourseUser);

/// Generates a `JsonSchema` impl describing a special field that serializes as a plain string.
macro_rules! string_schema [
    ( $t:ty, $name:literal ) => {
        impl schemars::JsonSchema for $t {
            fn schema_name() -> String {
                $name.to_owned()
            }

            fn json_schema(
                generator: &mut schemars::r#gen::SchemaGenerator,
            ) -> schemars::schema::Schema {
                String::json_schema(generator)
            }
        }
    }
];

string_schema!(TargetServerUser, "TargetServerUser");
string_schema!(TargetServerUserSelfOrAdmin, "TargetServerUserSelfOrAdmin");
string_schema!(TargetCourseUser, "TargetCourseUser");
string_schema!(TargetCourseUserSelfOrGrader, "TargetCourseUserSelfOrGrader");
string_schema!(TargetCourseUserSelfOrAdmin, "TargetCourseUserSelfOrAdmin");
string_schema!(NonEmptyString, "NonEmptyString");

/// A mutable reference to one special field of a payload, tagged with the JSON name the field
/// was declared under (for error messages).
pub enum SpecialField<'a> {
    /// A course roster to populate.
    CourseUsers {
        /// The field to fill in.
        field: &'a mut CourseUsers,
    },

    /// A plain server-user target.
    TargetServerUser {
        /// JSON name of the field.
        name: &'static str,
        /// The field to resolve.
        field: &'a mut TargetServerUser,
    },

    /// A self-or-admin server-user target.
    TargetServerUserSelfOrAdmin {
        /// JSON name of the field.
        name: &'static str,
        /// The field to resolve.
        field: &'a mut TargetServerUserSelfOrAdmin,
    },

    /// A plain course-user target.
    TargetCourseUser {
        /// JSON name of the field.
        name: &'static str,
        /// The field to resolve.
        field: &'a mut TargetCourseUser,
    },

    /// A self-or-grader course-user target.
    TargetCourseUserSelfOrGrader {
        /// JSON name of the field.
        name: &'static str,
        /// The field to resolve.
        field: &'a mut TargetCourseUserSelfOrGrader,
    },

    /// A self-or-admin course-user target.
    TargetCourseUserSelfOrAdmin {
        /// JSON name of the field.
        name: &'static str,
        /// The field to resolve.
        field: &'a mut TargetCourseUserSelfOrAdmin,
    },

    /// Uploaded files to materialize.
    PostFiles {
        /// The field to fill in.
        field: &'a mut PostFiles,
    },

    /// A string that must be non-empty.
    NonEmptyString {
        /// JSON name of the field.
        name: &'static str,
        /// The value to check.
        value: &'a NonEmptyString,
    },
}

/// Checks and populates every special field a payload declared, in declaration order.
pub(crate) async fn process<R: Payload>(
    pipeline: &Pipeline,
    parts: &RequestParts,
    request: &mut R,
    resolved: &Resolved,
) -> Result<(), ApiError> {
    let endpoint = resolved.base.endpoint.clone();

    for field in request.special_fields() {
        match field {
            SpecialField::CourseUsers { field } => {
                let users = fetch_course_users(pipeline, resolved, &endpoint, "CourseUsers")
                    .await?;
                field.0 = users;
            }

            SpecialField::TargetServerUser { name, field } => {
                check_server_scope(resolved, &endpoint, "TargetServerUser")?;

                if field.email.is_empty() {
                    return Err(ApiError::bad_request(
                        "-044",
                        resolved,
                        format!(
                            "Field '{}' requires a non-empty string, empty or null provided.",
                            name
                        ),
                    )
                    .add("json-name", name));
                }

                resolve_server_target(pipeline, resolved, field, "-045").await?;
            }

            SpecialField::TargetServerUserSelfOrAdmin { name: _, field } => {
                check_server_scope(resolved, &endpoint, "TargetServerUserSelfOrAdmin")?;

                let principal = resolved
                    .server_user
                    .as_ref()
                    .expect("User scope was checked above");
                if field.email.is_empty() {
                    field.email = principal.email.clone();
                }

                // Operations not on self require higher permissions.
                if field.email != principal.email && principal.role < ServerRole::Admin {
                    return Err(ApiError::bad_server_permissions(
                        "-046",
                        resolved,
                        ServerRole::Admin,
                        principal.role,
                        "Non-Self Target User",
                    ));
                }

                resolve_server_target(pipeline, resolved, &mut field.0, "-047").await?;
            }

            SpecialField::TargetCourseUser { name, field } => {
                let users =
                    fetch_course_users(pipeline, resolved, &endpoint, "TargetCourseUser").await?;

                if field.email.is_empty() {
                    return Err(ApiError::bad_request(
                        "-034",
                        resolved,
                        format!(
                            "Field '{}' requires a non-empty string, empty or null provided.",
                            name
                        ),
                    )
                    .add("json-name", name));
                }

                resolve_course_target(&users, field);
            }

            SpecialField::TargetCourseUserSelfOrGrader { name: _, field } => {
                resolve_self_or_course_role(
                    pipeline,
                    resolved,
                    &endpoint,
                    &mut field.0,
                    CourseRole::Grader,
                )
                .await?;
            }

            SpecialField::TargetCourseUserSelfOrAdmin { name: _, field } => {
                resolve_self_or_course_role(
                    pipeline,
                    resolved,
                    &endpoint,
                    &mut field.0,
                    CourseRole::Admin,
                )
                .await?;
            }

            SpecialField::PostFiles { field } => {
                store_post_files(pipeline, parts, &endpoint, field).await?;
            }

            SpecialField::NonEmptyString { name, value } => {
                if value.as_str().is_empty() {
                    return Err(ApiError::bare_bad_request(
                        "-038",
                        &endpoint,
                        format!(
                            "Field '{}' requires a non-empty string, empty or null provided.",
                            name
                        ),
                    )
                    .add("json-name", name));
                }
            }
        }
    }

    Ok(())
}

/// Fails with the scope-misconfiguration error for fields that need a user context.
fn check_server_scope(
    resolved: &Resolved,
    endpoint: &str,
    field_type: &str,
) -> Result<(), ApiError> {
    if resolved.scope < Scope::User {
        return Err(ApiError::bare_internal(
            "-042",
            endpoint,
            "A request with a field targeting a server user must carry a user context.",
        )
        .add("field-type", field_type));
    }
    Ok(())
}

/// Baseline checks for fields that require access to the course's users: scope check plus the
/// roster fetch.
async fn fetch_course_users(
    pipeline: &Pipeline,
    resolved: &Resolved,
    endpoint: &str,
    field_type: &str,
) -> Result<HashMap<String, CourseUser>, ApiError> {
    if resolved.scope < Scope::CourseUser {
        return Err(ApiError::bare_internal(
            "-025",
            endpoint,
            "A request with a field requiring course users must carry a course-user context.",
        )
        .add("field-type", field_type));
    }

    match pipeline.db().get_course_users(&resolved.course_id).await {
        Ok(users) => Ok(users),
        Err(e) => Err(ApiError::internal("-027", resolved, "Failed to fetch embedded users.")
            .add("field-type", field_type)
            .err(e)),
    }
}

/// Resolves a server target against the user directory.  A missing user is not an error.
async fn resolve_server_target(
    pipeline: &Pipeline,
    resolved: &Resolved,
    field: &mut TargetServerUser,
    fetch_locator: &str,
) -> Result<(), ApiError> {
    match pipeline.db().get_server_user(&field.email).await {
        Ok(Some(user)) => {
            field.found = true;
            field.user = Some(user);
        }
        Ok(None) => {
            field.found = false;
        }
        Err(e) => {
            return Err(ApiError::internal(
                fetch_locator,
                resolved,
                "Failed to fetch user from DB.",
            )
            .add("email", field.email.as_str())
            .err(e));
        }
    }
    Ok(())
}

/// Resolves a course target against a roster.  A missing user is not an error.
fn resolve_course_target(users: &HashMap<String, CourseUser>, field: &mut TargetCourseUser) {
    match users.get(&field.email) {
        Some(user) => {
            field.found = true;
            field.user = Some(user.clone());
        }
        None => {
            field.found = false;
        }
    }
}

/// Shared resolution for the course-user self-or-role variants.
async fn resolve_self_or_course_role(
    pipeline: &Pipeline,
    resolved: &Resolved,
    endpoint: &str,
    field: &mut TargetCourseUser,
    min_role: CourseRole,
) -> Result<(), ApiError> {
    let mut users =
        fetch_course_users(pipeline, resolved, endpoint, "TargetCourseUserSelfOrRole").await?;

    let principal =
        resolved.course_user.as_ref().expect("Course-user scope was checked above");

    if field.email.is_empty() {
        field.email = principal.email.clone();

        // The context user may be an escalated server admin that is not part of the roster;
        // make sure targeting yourself always resolves.
        users.insert(principal.email.clone(), principal.clone());
    }

    // Operations not on self require higher permissions.
    if field.email != principal.email && principal.role < min_role {
        return Err(ApiError::bad_course_permissions(
            "-033",
            resolved,
            min_role,
            principal.role,
            "Non-Self Target User",
        ));
    }

    resolve_course_target(&users, field);
    Ok(())
}

/// Materializes the uploaded files into a fresh per-request temp directory and fills in
/// `field`.  The directory is registered for post-response cleanup as soon as it exists, so it
/// is removed on every exit path.
async fn store_post_files(
    pipeline: &Pipeline,
    parts: &RequestParts,
    endpoint: &str,
    field: &mut PostFiles,
) -> Result<(), ApiError> {
    if parts.uploads.is_empty() {
        return Err(ApiError::bare_bad_request(
            "-030",
            endpoint,
            "Endpoint requires files to be provided in POST body, no files found.",
        ));
    }

    let base = match pipeline.opts().temp_dir.clone() {
        Some(base) => base,
        None => std::env::temp_dir(),
    };
    let temp_dir = base.join(format!("api-request-files-{}", Uuid::new_v4()));
    if let Err(e) = tokio::fs::create_dir_all(&temp_dir).await {
        return Err(ApiError::bare_internal("-029", endpoint, "Failed to store files from POST.")
            .err(e));
    }
    parts.cleanup.register(temp_dir.clone());

    let max_file_size_kb = pipeline.opts().max_file_size_kb;
    let mut filenames = Vec::with_capacity(parts.uploads.len());
    for upload in &parts.uploads {
        let file_size_kb = (upload.data.len() as u64) / 1024;
        if upload.data.len() as u64 > max_file_size_kb * 1024 {
            return Err(ApiError::bare_bad_request(
                "-036",
                endpoint,
                format!(
                    "File '{}' is {} KB. The maximum allowable size is {} KB.",
                    upload.filename, file_size_kb, max_file_size_kb
                ),
            )
            .add("filename", upload.filename.as_str())
            .add("file-size", file_size_kb)
            .add("max-file-size-kb", max_file_size_kb));
        }

        // Uploads are stored under their base name only so a crafted filename cannot escape
        // the temp directory.
        let filename = match Path::new(&upload.filename).file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => {
                return Err(ApiError::bare_internal(
                    "-029",
                    endpoint,
                    "Failed to store files from POST.",
                )
                .err(format!("Invalid upload filename '{}'", upload.filename)));
            }
        };

        if let Err(e) = tokio::fs::write(temp_dir.join(&filename), &upload.data).await {
            return Err(ApiError::bare_internal(
                "-029",
                endpoint,
                "Failed to store files from POST.",
            )
            .err(e));
        }
        filenames.push(filename);
    }
    filenames.sort();

    field.temp_dir = temp_dir;
    field.filenames = filenames;

    Ok(())
}
