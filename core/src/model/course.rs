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

//! The `Course` and `Assignment` data types.

use std::collections::HashMap;

/// A single gradeable assignment within a course.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Normalized identifier of the assignment, unique within its course.
    pub id: String,

    /// Human-readable name of the assignment.
    pub name: String,

    /// Maximum number of points attainable in this assignment.
    pub max_points: f64,
}

/// A course with its assignments.
///
/// Enrollment is not stored here: users carry their own per-course information, and the
/// persistence layer derives a course's roster from them.
#[derive(Clone, Debug, PartialEq)]
pub struct Course {
    /// Normalized identifier of the course.
    pub id: String,

    /// Human-readable name of the course.
    pub name: String,

    /// The course's assignments, keyed by assignment id.
    pub assignments: HashMap<String, Assignment>,
}

impl Course {
    /// Looks up an assignment by its normalized id.
    pub fn get_assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.get(id)
    }

    /// Returns the course's assignments sorted by id.
    pub fn sorted_assignments(&self) -> Vec<&Assignment> {
        let mut assignments = self.assignments.values().collect::<Vec<&Assignment>>();
        assignments.sort_by(|a, b| a.id.cmp(&b.id));
        assignments
    }
}
