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

//! Error types for Razor processing.
//!
//! Lexical and syntax problems are not errors: they are reported as
//! [`RazorDiagnostic`](crate::RazorDiagnostic) values attached to the tree and
//! the generated documents. [`RazorError`] is reserved for host misuse and
//! fatal configuration problems.

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RazorErrorKind {
    /// A required argument was missing or malformed.
    InvalidArgument,
    /// An operation was called in a state that does not allow it.
    InvalidOperation,
    /// The configured checksum algorithm cannot be emitted in `#pragma checksum`.
    UnsupportedChecksumAlgorithm,
    /// The operation observed a cancellation request between phases.
    Cancelled,
}

impl fmt::Display for RazorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "InvalidArgument"),
            Self::InvalidOperation => write!(f, "InvalidOperation"),
            Self::UnsupportedChecksumAlgorithm => write!(f, "UnsupportedChecksumAlgorithm"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// An error raised by the Razor engine.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}{}", .hint.as_ref().map(|h| format!(" ({})", h)).unwrap_or_default())]
pub struct RazorError {
    /// The kind of error.
    pub kind: RazorErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Remediation hint for user-actionable errors.
    pub hint: Option<String>,
}

impl RazorError {
    /// Create a new error.
    pub fn new(kind: RazorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
        }
    }

    /// Add a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RazorErrorKind::InvalidArgument, message)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(RazorErrorKind::InvalidOperation, message)
    }

    /// The configured hash algorithm is not one of the supported set.
    pub fn unsupported_checksum_algorithm(algorithm: impl fmt::Display) -> Self {
        Self::new(
            RazorErrorKind::UnsupportedChecksumAlgorithm,
            format!(
                "the hash algorithm '{}' is not supported for checksum generation; supported algorithms are SHA1 and SHA256",
                algorithm
            ),
        )
        .with_hint("set `suppress_checksum` to disable checksum generation")
    }

    pub fn cancelled() -> Self {
        Self::new(RazorErrorKind::Cancelled, "the operation was cancelled")
    }

    /// Returns `true` if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind == RazorErrorKind::Cancelled
    }
}

/// Result type for Razor operations.
pub type RazorResult<T> = Result<T, RazorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", RazorErrorKind::InvalidArgument), "InvalidArgument");
        assert_eq!(format!("{}", RazorErrorKind::Cancelled), "Cancelled");
        assert_eq!(
            format!("{}", RazorErrorKind::UnsupportedChecksumAlgorithm),
            "UnsupportedChecksumAlgorithm"
        );
    }

    #[test]
    fn test_error_display_without_hint() {
        let err = RazorError::invalid_operation("tree not built");
        assert_eq!(format!("{}", err), "InvalidOperation: tree not built");
    }

    #[test]
    fn test_unsupported_checksum_carries_hint() {
        let err = RazorError::unsupported_checksum_algorithm("MD5");
        assert_eq!(err.kind, RazorErrorKind::UnsupportedChecksumAlgorithm);
        assert!(err.message.contains("MD5"));
        let msg = format!("{}", err);
        assert!(msg.contains("suppress_checksum"));
    }

    #[test]
    fn test_cancelled() {
        assert!(RazorError::cancelled().is_cancelled());
        assert!(!RazorError::invalid_argument("x").is_cancelled());
    }

    #[test]
    fn test_error_is_std_error() {
        fn accepts_error<E: std::error::Error>(_: E) {}
        accepts_error(RazorError::invalid_argument("test"));
    }
}
