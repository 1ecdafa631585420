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

//! The contract of the grading engine collaborator.
//!
//! The engine consumes an assignment context plus the directory of submitted files and produces
//! a grading result.  Its internals (sandboxes, per-assignment graders, locking) live outside
//! this crate; the server only depends on this trait.

use async_trait::async_trait;
use autograder_core::driver::{DriverError, DriverResult};
use autograder_core::model::{Assignment, GradedQuestion};
use std::path::Path;

/// The outcome of grading one submission.
#[derive(Clone, Debug, PartialEq)]
pub struct GradingResult {
    /// Total points awarded.
    pub score: f64,

    /// Total points attainable.
    pub max_points: f64,

    /// Overall feedback text.
    pub message: String,

    /// Per-question outcomes.
    pub questions: Vec<GradedQuestion>,

    /// When set, the submission was rejected before grading (e.g. missing files) and the
    /// contained reason is safe to show to the student.
    pub rejected: Option<String>,
}

/// Trait to abstract the integration with the grading engine.
#[async_trait]
pub trait Grader {
    /// Grades the files in `submission_dir` against `assignment` of `course_id` on behalf of
    /// `user_email`.
    async fn grade(
        &self,
        course_id: &str,
        assignment: &Assignment,
        user_email: &str,
        submission_dir: &Path,
    ) -> DriverResult<GradingResult>;
}

/// Grader for deployments without a configured engine; it fails every submission.
#[derive(Clone, Default)]
pub struct NullGrader {}

#[async_trait]
impl Grader for NullGrader {
    async fn grade(
        &self,
        _course_id: &str,
        _assignment: &Assignment,
        _user_email: &str,
        _submission_dir: &Path,
    ) -> DriverResult<GradingResult> {
        Err(DriverError::BackendError("No grading engine is configured".to_owned()))
    }
}

/// Test utilities for grading.
#[cfg(test)]
pub(crate) mod testutils {
    use super::*;

    /// Grader that awards full points to every submitted file and records nothing.
    #[derive(Clone, Default)]
    pub(crate) struct FullMarksGrader {}

    #[async_trait]
    impl Grader for FullMarksGrader {
        async fn grade(
            &self,
            _course_id: &str,
            assignment: &Assignment,
            _user_email: &str,
            submission_dir: &Path,
        ) -> DriverResult<GradingResult> {
            let mut filenames = Vec::new();
            let mut entries = tokio::fs::read_dir(submission_dir)
                .await
                .map_err(|e| DriverError::BackendError(e.to_string()))?;
            while let Some(entry) =
                entries.next_entry().await.map_err(|e| DriverError::BackendError(e.to_string()))?
            {
                filenames.push(entry.file_name().to_string_lossy().into_owned());
            }
            filenames.sort();

            if filenames.is_empty() {
                return Ok(GradingResult {
                    score: 0.0,
                    max_points: assignment.max_points,
                    message: String::new(),
                    questions: Vec::new(),
                    rejected: Some("No files were submitted.".to_owned()),
                });
            }

            Ok(GradingResult {
                score: assignment.max_points,
                max_points: assignment.max_points,
                message: format!("Graded {} files.", filenames.len()),
                questions: vec![GradedQuestion {
                    name: "all".to_owned(),
                    score: assignment.max_points,
                    max_points: assignment.max_points,
                    message: String::new(),
                }],
                rejected: None,
            })
        }
    }
}
