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

//! Error type for the language-service layer.
//!
//! Mapping failures are not errors here: they are `None` results or the
//! undefined range sentinel. Errors are reserved for contract violations,
//! failed text loads and cancelled work.

use razor_core::RazorError;
use thiserror::Error;

/// Errors raised by snapshot, cache and dispatcher operations.
#[derive(Error, Debug, Clone)]
pub enum RazorLspError {
    /// The Razor engine rejected its input or configuration.
    #[error(transparent)]
    Core(#[from] RazorError),

    /// A text loader could not produce the document text.
    #[error("failed to load text for '{path}': {message}")]
    TextLoad {
        /// Document the loader belongs to
        path: String,
        /// Loader-supplied reason
        message: String,
    },

    /// Work was abandoned because its cancellation token fired.
    #[error("operation was cancelled")]
    Cancelled,

    /// The dispatcher thread has shut down and no longer accepts work.
    #[error("project snapshot dispatcher has stopped")]
    DispatcherStopped,

    /// A mutation was attempted off the dispatcher thread.
    #[error("'{operation}' must run on the project snapshot dispatcher thread")]
    WrongThread {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// The project or document is unknown to the snapshot manager.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// The caller passed a value this component cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RazorLspError {
    pub fn text_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TextLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// `true` for cancellation from either this layer or the engine.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Core(inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}

pub type RazorLspResult<T> = Result<T, RazorLspError>;
