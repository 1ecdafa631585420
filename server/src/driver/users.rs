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

//! Extends the driver with the user enroll/upsert procedure.
//!
//! The procedure takes a batch of raw user entries and produces one result per entry; errors
//! are recorded inside the results instead of aborting the batch, so a bad row never blocks the
//! rest of a roster import.

use crate::driver::Driver;
use autograder_core::model::{
    CourseInfo, CourseRole, Credential, Password, ROOT_EMAIL, RawUserEntry, ServerRole,
    ServerUser, UpsertOptions, UserOpResult, generate_cleartext_password, sort_results_by_email,
};
use std::collections::HashMap;

/// Who is running the operation; bounds what the entries may grant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ActingUser {
    /// The server role of the principal running the operation.
    pub(crate) server_role: ServerRole,
}

impl Driver {
    /// Runs the enroll/upsert procedure over a batch of entries and returns one result per
    /// entry, sorted by email.
    pub(crate) async fn upsert_users(
        &self,
        entries: Vec<RawUserEntry>,
        options: UpsertOptions,
        acting: ActingUser,
    ) -> Vec<UserOpResult> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            results.push(self.upsert_user(entry, options, acting).await);
        }
        sort_results_by_email(&mut results);
        results
    }

    /// Processes one entry of the batch.
    async fn upsert_user(
        &self,
        entry: RawUserEntry,
        options: UpsertOptions,
        acting: ActingUser,
    ) -> UserOpResult {
        if entry.email.is_empty() {
            return UserOpResult::validation_error("", "User email cannot be empty.");
        }

        if entry.email == ROOT_EMAIL {
            return UserOpResult::validation_error(
                entry.email.as_str(),
                "The root identity cannot be managed through the API.",
            );
        }

        if let Some(role) = entry.server_role {
            if role >= ServerRole::Root {
                return UserOpResult::validation_error(
                    entry.email.as_str(),
                    "The root server role cannot be granted.",
                );
            }
            if role > acting.server_role {
                return UserOpResult::validation_error(
                    entry.email.as_str(),
                    "Cannot grant a server role above your own.",
                );
            }
        }

        if entry.course.is_none() && entry.course_role.is_some() {
            return UserOpResult::validation_error(
                entry.email.as_str(),
                "A course role requires a course.",
            );
        }

        let existing = match self.db().get_server_user(&entry.email).await {
            Ok(existing) => existing,
            Err(e) => return UserOpResult::system_error(entry.email.as_str(), e.to_string()),
        };

        match existing {
            None => self.insert_user(entry, options).await,
            Some(user) => self.update_user(user, entry, options).await,
        }
    }

    /// Creates a user that does not exist yet.
    async fn insert_user(&self, entry: RawUserEntry, options: UpsertOptions) -> UserOpResult {
        if options.skip_inserts {
            return UserOpResult {
                email: entry.email,
                skipped: true,
                not_exists: true,
                ..UserOpResult::default()
            };
        }

        let mut result = UserOpResult { email: entry.email.clone(), ..UserOpResult::default() };

        // Accounts created without a password get a generated one so the user can log in at
        // all; the cleartext travels by email, never through the response.
        let password = match &entry.pass {
            Some(password) => password.clone(),
            None => {
                let cleartext = generate_cleartext_password();
                result.cleartext_password = Some(cleartext.clone());
                Password::from_cleartext(&cleartext)
            }
        };
        let credential = match Credential::derive(&password) {
            Ok(credential) => credential,
            Err(e) => {
                return UserOpResult::system_error(entry.email.as_str(), e.to_string());
            }
        };

        let mut course_info = HashMap::new();
        if let Some(course) = &entry.course {
            course_info.insert(
                course.clone(),
                CourseInfo {
                    role: entry.course_role.unwrap_or(CourseRole::Student),
                    lms_id: entry.lms_id.clone(),
                },
            );
            result.enrolled.push(course.clone());
        }

        let user = ServerUser {
            email: entry.email.clone(),
            name: entry.name.clone(),
            role: entry.server_role.unwrap_or(ServerRole::User),
            credential: Some(credential),
            tokens: Vec::new(),
            course_info,
        };

        if !options.dry_run {
            if let Err(e) = self.db().upsert_server_user(user).await {
                return UserOpResult::system_error(entry.email.as_str(), e.to_string());
            }
        }
        result.added = true;

        if options.send_emails {
            if let Some(cleartext) = result.cleartext_password.clone() {
                if options.dry_run {
                    result.emailed = true;
                } else if self.send_password_email(&entry.email, &cleartext).await {
                    result.emailed = true;
                } else {
                    result.communication_error =
                        Some(format!("Failed to email credentials to '{}'.", entry.email));
                }
            }
        }

        result
    }

    /// Applies an entry to a user that already exists.  Nothing can be removed by an update.
    async fn update_user(
        &self,
        mut user: ServerUser,
        entry: RawUserEntry,
        options: UpsertOptions,
    ) -> UserOpResult {
        if options.skip_updates {
            return UserOpResult {
                email: entry.email,
                skipped: true,
                ..UserOpResult::default()
            };
        }

        let mut result = UserOpResult { email: entry.email.clone(), ..UserOpResult::default() };
        let mut changed = false;

        if let Some(name) = &entry.name {
            if user.name.as_deref() != Some(name) {
                user.name = Some(name.clone());
                changed = true;
            }
        }

        if let Some(role) = entry.server_role {
            if user.role != role {
                user.role = role;
                changed = true;
            }
        }

        if let Some(password) = &entry.pass {
            let duplicate = match &user.credential {
                Some(credential) => credential.verify(password).unwrap_or(false),
                None => false,
            };
            if !duplicate {
                match Credential::derive(password) {
                    Ok(credential) => {
                        user.credential = Some(credential);
                        changed = true;
                    }
                    Err(e) => {
                        return UserOpResult::system_error(entry.email.as_str(), e.to_string());
                    }
                }
            }
        }

        if let Some(course) = &entry.course {
            let role = entry.course_role.unwrap_or(CourseRole::Student);
            let info = CourseInfo { role, lms_id: entry.lms_id.clone() };
            if user.course_info.get(course) != Some(&info) {
                user.course_info.insert(course.clone(), info);
                result.enrolled.push(course.clone());
                changed = true;
            }
        }

        if changed {
            if !options.dry_run {
                if let Err(e) = self.db().upsert_server_user(user).await {
                    return UserOpResult::system_error(entry.email.as_str(), e.to_string());
                }
            }
            result.modified = true;
        } else {
            result.skipped = true;
        }

        result
    }

    /// Drops `email` from `course_id`, returning whether they were enrolled at all.
    pub(crate) async fn drop_from_course(
        &self,
        email: &str,
        course_id: &str,
    ) -> autograder_core::driver::DriverResult<bool> {
        let mut user = match self.db().get_server_user(email).await? {
            Some(user) => user,
            None => return Ok(false),
        };

        if user.course_info.remove(course_id).is_none() {
            return Ok(false);
        }

        self.db().upsert_server_user(user).await?;
        Ok(true)
    }
}
