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

//! The autograding API server.
//!
//! This crate wires the request pipeline from `autograder-api` to the server's business logic:
//! the `driver` module owns the external collaborators (persistence, grading, mail) and the
//! `rest` module registers one endpoint per file.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use autograder_api::config::ServerOptions;
use autograder_api::routing::Pipeline;
use autograder_core::clocks::Clock;
use autograder_core::db::Db;
use autograder_smtp::driver::SmtpMailer;
use driver::Driver;
use grading::Grader;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub(crate) mod driver;
pub mod grading;
pub(crate) mod model;
mod rest;

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose
/// many crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    mailer: Arc<dyn SmtpMailer + Send + Sync>,
    grader: Arc<dyn Grader + Send + Sync>,
    opts: ServerOptions,
) -> Result<(), Box<dyn Error>> {
    let pipeline = Pipeline::new(db.clone(), clock.clone(), opts);
    let driver = Driver::new(db, clock, mailer, grader);
    let app = rest::app(pipeline, driver);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
