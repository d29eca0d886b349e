// Razor Toolchain - Razor templating parser and language services
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured error types for the Razor CLI.
//!
//! Every command returns `Result<T, CliError>`; `main` prints the error and
//! exits with a failure code.

use razor_core::RazorError;
use razor_lsp::RazorLspError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for Razor CLI operations.
///
/// # Examples
///
/// ```rust,no_run
/// use razor_cli::error::CliError;
///
/// fn read(path: &str) -> Result<String, CliError> {
///     std::fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// A tag-helper file is not valid descriptor JSON, or JSON output failed.
    #[error("JSON error: {0}")]
    Json(String),

    /// The Razor engine rejected the request, e.g. an invalid option or a
    /// checksum algorithm that cannot be emitted.
    #[error(transparent)]
    Razor(#[from] RazorError),

    /// A language-service operation failed.
    #[error(transparent)]
    Lsp(#[from] RazorLspError),

    /// Processing finished but reported errors.
    ///
    /// The diagnostics themselves have already been printed to stderr.
    #[error("{path}: {count} error(s)")]
    Diagnostics {
        /// The document the errors were reported for
        path: PathBuf,
        /// Number of error diagnostics
        count: usize,
    },

    /// A command-line value is out of range or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn json(source: serde_json::Error) -> Self {
        Self::Json(source.to_string())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
