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

//! `tree` command.

use super::{process_file, report_diagnostics};
use crate::cli::EngineArgs;
use crate::error::CliError;

/// Print the outline of the document's syntax tree, after tag-helper
/// rewriting.
pub fn tree(file: &str, engine: &EngineArgs) -> Result<(), CliError> {
    let document = process_file(file, engine)?;
    let tree = document.syntax_tree()?;
    let mut outline = String::new();
    tree.root()
        .write_tree(&mut outline, 0)
        .map_err(|_| CliError::invalid_input("syntax tree could not be written"))?;
    print!("{}", outline);
    report_diagnostics(file, &document)
}
