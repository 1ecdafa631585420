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

//! Entry point to the autograding API server.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use autograder_api::config::ServerOptions;
use autograder_core::clocks::SystemClock;
use autograder_core::db::MemoryDb;
use autograder_core::env::get_optional_var;
use autograder_server::serve;
use autograder_smtp::driver::{LettreSmtpMailer, NullSmtpMailer, SmtpMailer, SmtpOptions};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Prefix of all the environment variables the server reads.
const ENV_PREFIX: &str = "AUTOGRADER";

#[tokio::main]
async fn main() {
    env_logger::init();

    let port: u16 =
        get_optional_var(ENV_PREFIX, "WEB_PORT").expect("Invalid port").unwrap_or(8080);
    let addr = (Ipv4Addr::UNSPECIFIED, port);

    let opts = ServerOptions::from_env(ENV_PREFIX).expect("Invalid server configuration");

    let mailer: Arc<dyn SmtpMailer + Send + Sync> =
        match SmtpOptions::from_env_optional(&format!("{}_SMTP", ENV_PREFIX))
            .expect("Invalid SMTP configuration")
        {
            Some(smtp_opts) => Arc::from(
                LettreSmtpMailer::connect(smtp_opts).expect("Cannot set up the SMTP transport"),
            ),
            None => Arc::from(NullSmtpMailer::default()),
        };

    let db = Arc::from(MemoryDb::default());

    serve(
        addr,
        db,
        Arc::from(SystemClock::default()),
        mailer,
        Arc::from(autograder_server::grading::NullGrader::default()),
        opts,
    )
    .await
    .unwrap()
}
