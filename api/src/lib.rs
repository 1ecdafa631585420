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

//! The API request pipeline of the autograding server.
//!
//! Every endpoint declares its contract once, as a payload type: which request envelope it
//! carries, the minimum roles it demands, and the special fields the pipeline loads on its
//! behalf.  The pipeline then enforces that contract uniformly for every request: it parses the
//! JSON payload out of the POST form, validates and authenticates the envelopes, runs the
//! special-field loaders, dispatches to the handler, shapes the response into the standard
//! envelope, cleans up per-request resources, and records one telemetry metric.
//!
//! Errors anywhere along the way become `ApiError` values carrying a short, stable locator code
//! that identifies the failing site in logs and client diagnostics.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod config;
pub mod describe;
pub mod error;
pub mod request;
pub mod response;
pub mod routing;
pub mod telemetry;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
