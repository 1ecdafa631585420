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

//! The `Submission` data type: a graded attempt at an assignment.

use crate::model::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The graded outcome of a single question within a submission.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct GradedQuestion {
    /// Name of the question.
    pub name: String,

    /// Points awarded.
    pub score: f64,

    /// Points attainable.
    #[serde(rename = "max-points")]
    pub max_points: f64,

    /// Grader feedback for this question.
    #[serde(default)]
    pub message: String,
}

/// A graded submission for one user on one assignment.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct Submission {
    /// Opaque identifier of this submission.
    pub id: String,

    /// Course the submission belongs to.
    #[serde(rename = "course-id")]
    pub course_id: String,

    /// Assignment the submission belongs to.
    #[serde(rename = "assignment-id")]
    pub assignment_id: String,

    /// Email of the submitting user.
    pub user: String,

    /// When the submission was graded.
    pub timestamp: Timestamp,

    /// Total points awarded.
    pub score: f64,

    /// Total points attainable.
    #[serde(rename = "max-points")]
    pub max_points: f64,

    /// Overall grader feedback.
    #[serde(default)]
    pub message: String,

    /// Per-question outcomes.
    #[serde(default)]
    pub questions: Vec<GradedQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_serialization_field_names() {
        let submission = Submission {
            id: "s0".to_owned(),
            course_id: "course101".to_owned(),
            assignment_id: "hw0".to_owned(),
            user: "course-student@test.edulinq.org".to_owned(),
            timestamp: Timestamp::from_millis(1000),
            score: 9.0,
            max_points: 10.0,
            message: String::new(),
            questions: Vec::new(),
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!("course101", value["course-id"]);
        assert_eq!("hw0", value["assignment-id"]);
        assert_eq!(10.0, value["max-points"]);
    }
}
