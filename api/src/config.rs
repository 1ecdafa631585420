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

//! Configuration options for the request pipeline.

use autograder_core::env::get_optional_var;
use std::path::PathBuf;

/// Default API version served under the `/api/v<NN>/` prefix.
const DEFAULT_API_VERSION: u32 = 3;

/// Default maximum size of one uploaded file, in kilobytes (2 MB).
const DEFAULT_MAX_FILE_SIZE_KB: u64 = 2 * 1024;

/// Default directory from which the static fallback serves files.
const DEFAULT_STATIC_ROOT: &str = "static";

/// Configuration options for the pipeline and the server built on top of it.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// The API version, which determines the `/api/v<NN>/` path prefix.
    pub api_version: u32,

    /// Maximum allowed size (in KB) of each file submitted via POST request.
    pub max_file_size_kb: u64,

    /// For any unmatched route that does not have the API prefix, try to serve it from the
    /// static root before giving the final 404.
    pub static_fallback: bool,

    /// Directory from which the static fallback serves files.
    pub static_root: PathBuf,

    /// Assume a testing deployment, which relaxes some operations (e.g. CORS headers).
    pub testing_mode: bool,

    /// Assume unit tests are being run: telemetry becomes synchronous so tests can assert on it.
    pub unit_testing_mode: bool,

    /// Base directory for per-request upload directories.  Defaults to the system temp
    /// directory; redirectable so tests can force failures.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION,
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            static_fallback: false,
            static_root: PathBuf::from(DEFAULT_STATIC_ROOT),
            testing_mode: false,
            unit_testing_mode: false,
            temp_dir: None,
        }
    }
}

impl ServerOptions {
    /// Creates a new set of options from environment variables.
    ///
    /// This will use variables such as `<prefix>_API_VERSION`, `<prefix>_WEB_MAX_FILE_SIZE_KB`,
    /// `<prefix>_WEB_STATIC_FALLBACK`, `<prefix>_WEB_STATIC_ROOT`, `<prefix>_TESTING_MODE`,
    /// `<prefix>_UNIT_TESTING_MODE` and `<prefix>_WEB_TEMP_DIR`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let unit_testing_mode =
            get_optional_var::<bool>(prefix, "UNIT_TESTING_MODE")?.unwrap_or(false);

        Ok(Self {
            api_version: get_optional_var::<u32>(prefix, "API_VERSION")?
                .unwrap_or(DEFAULT_API_VERSION),
            max_file_size_kb: get_optional_var::<u64>(prefix, "WEB_MAX_FILE_SIZE_KB")?
                .unwrap_or(DEFAULT_MAX_FILE_SIZE_KB),
            static_fallback: get_optional_var::<bool>(prefix, "WEB_STATIC_FALLBACK")?
                .unwrap_or(false),
            static_root: get_optional_var::<PathBuf>(prefix, "WEB_STATIC_ROOT")?
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT)),
            // Unit testing implies testing: the broader flag gates behaviors such as the
            // cross-origin header on responses.
            testing_mode: get_optional_var::<bool>(prefix, "TESTING_MODE")?.unwrap_or(false)
                || unit_testing_mode,
            unit_testing_mode,
            temp_dir: get_optional_var::<PathBuf>(prefix, "WEB_TEMP_DIR")?,
        })
    }

    /// Returns the versioned path prefix under which all API endpoints live.
    pub fn api_prefix(&self) -> String {
        format!("/api/v{:02}", self.api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ServerOptions::default();
        assert_eq!(3, opts.api_version);
        assert_eq!(2048, opts.max_file_size_kb);
        assert!(!opts.static_fallback);
        assert!(!opts.testing_mode);
    }

    #[test]
    fn test_api_prefix_is_zero_padded() {
        let mut opts = ServerOptions::default();
        assert_eq!("/api/v03", opts.api_prefix());
        opts.api_version = 12;
        assert_eq!("/api/v12", opts.api_prefix());
    }

    #[test]
    fn test_from_env_overrides() {
        let overrides = [
            ("AG_API_VERSION", Some("4")),
            ("AG_WEB_MAX_FILE_SIZE_KB", Some("16")),
            ("AG_WEB_STATIC_FALLBACK", Some("true")),
            ("AG_TESTING_MODE", None),
            ("AG_UNIT_TESTING_MODE", Some("true")),
            ("AG_WEB_TEMP_DIR", Some("/nonexistent/uploads")),
            ("AG_WEB_STATIC_ROOT", None),
        ];
        temp_env::with_vars(overrides, || {
            let opts = ServerOptions::from_env("AG").unwrap();
            assert_eq!(4, opts.api_version);
            assert_eq!(16, opts.max_file_size_kb);
            assert!(opts.static_fallback);
            assert!(opts.unit_testing_mode);
            assert!(opts.testing_mode, "unit testing mode must imply testing mode");
            assert_eq!(PathBuf::from("/nonexistent/uploads"), opts.temp_dir.unwrap());
        });
    }
}
