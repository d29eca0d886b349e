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

//! CLI command implementations and the file helpers they share.

mod generate;
mod map;
mod tokens;
mod tree;

pub use generate::{generate, html};
pub use map::map;
pub use tokens::tokens;
pub use tree::tree;

use crate::cli::EngineArgs;
use crate::error::CliError;
use razor_core::tag_helpers::TagHelperDescriptor;
use razor_core::{FileKind, RazorCodeDocument, RazorProjectEngine, RazorSourceDocument};
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// Read a file into a string.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or is not valid UTF-8.
pub fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Write content to a file, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| CliError::io_error(p, e)),
        None => io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| CliError::io_error("<stdout>", e)),
    }
}

/// Load tag-helper descriptors from a JSON array.
///
/// # Examples
///
/// ```no_run
/// use razor_cli::commands::load_tag_helpers;
///
/// # fn main() -> Result<(), razor_cli::error::CliError> {
/// let helpers = load_tag_helpers("tag-helpers.json")?;
/// println!("{} tag helpers", helpers.len());
/// # Ok(())
/// # }
/// ```
pub fn load_tag_helpers(path: &str) -> Result<Vec<Arc<TagHelperDescriptor>>, CliError> {
    let content = read_file(path)?;
    let descriptors: Vec<TagHelperDescriptor> = serde_json::from_str(&content).map_err(CliError::json)?;
    debug!("Loaded {} tag helpers from {}", descriptors.len(), path);
    Ok(descriptors.into_iter().map(Arc::new).collect())
}

/// Read `file` and its imports and run the engine over them.
pub fn process_file(file: &str, engine_args: &EngineArgs) -> Result<RazorCodeDocument, CliError> {
    let text = read_file(file)?;
    let tag_helpers = match &engine_args.tag_helpers {
        Some(path) => load_tag_helpers(path)?,
        None => Vec::new(),
    };
    let engine = RazorProjectEngine::new(engine_args.options()?)?.with_tag_helpers(tag_helpers);

    let imports = engine_args
        .imports
        .iter()
        .map(|path| Ok(Arc::new(RazorSourceDocument::new(read_file(path)?, path.as_str()))))
        .collect::<Result<Vec<_>, CliError>>()?;
    let source = Arc::new(RazorSourceDocument::new(text, file));
    let file_kind = FileKind::from_path(file);
    debug!("Processing {} as {:?} with {} imports", file, file_kind, imports.len());
    Ok(engine.process(source, file_kind, imports)?)
}

/// Print every diagnostic of `document` to stderr.
///
/// # Errors
///
/// Returns [`CliError::Diagnostics`] when at least one diagnostic is an error.
pub fn report_diagnostics(file: &str, document: &RazorCodeDocument) -> Result<(), CliError> {
    let diagnostics = document.diagnostics();
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic);
    }
    let count = diagnostics.iter().filter(|d| d.is_error()).count();
    if count > 0 {
        return Err(CliError::Diagnostics {
            path: file.into(),
            count,
        });
    }
    Ok(())
}
