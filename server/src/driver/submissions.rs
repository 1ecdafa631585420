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

//! Extends the driver with submission operations.

use crate::driver::Driver;
use autograder_core::driver::DriverResult;
use autograder_core::model::{Assignment, Submission, Timestamp};
use std::path::Path;
use uuid::Uuid;

/// The outcome of submitting files for grading.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SubmitOutcome {
    /// The submission was rejected before grading, with a student-safe reason.
    Rejected(String),

    /// The submission was graded and recorded.
    Graded(Submission),
}

impl Driver {
    /// Grades the files in `submission_dir` and records the result.
    pub(crate) async fn submit(
        &self,
        course_id: &str,
        assignment: &Assignment,
        user_email: &str,
        submission_dir: &Path,
    ) -> DriverResult<SubmitOutcome> {
        let result =
            self.grader().grade(course_id, assignment, user_email, submission_dir).await?;

        if let Some(reason) = result.rejected {
            return Ok(SubmitOutcome::Rejected(reason));
        }

        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_owned(),
            assignment_id: assignment.id.clone(),
            user: user_email.to_owned(),
            timestamp: Timestamp::from(self.clock().now_utc()),
            score: result.score,
            max_points: result.max_points,
            message: result.message,
            questions: result.questions,
        };
        self.db().store_submission(submission.clone()).await?;

        Ok(SubmitOutcome::Graded(submission))
    }

    /// Returns the most recent submission of `user_email` on the assignment, if any.
    pub(crate) async fn latest_submission(
        &self,
        course_id: &str,
        assignment_id: &str,
        user_email: &str,
    ) -> DriverResult<Option<Submission>> {
        Ok(self.db().get_latest_submission(course_id, assignment_id, user_email).await?)
    }
}
