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

//! `generate` and `html` commands.

use super::{process_file, report_diagnostics, write_output};
use crate::cli::EngineArgs;
use crate::error::CliError;

/// Write the generated C# for `file` to `output` or stdout.
///
/// The output is written even when the document has errors; the errors are
/// reported afterwards and make the command fail.
pub fn generate(file: &str, output: Option<&str>, engine: &EngineArgs) -> Result<(), CliError> {
    let document = process_file(file, engine)?;
    let csharp = document.csharp_document()?;
    write_output(&csharp.generated_code, output)?;
    report_diagnostics(file, &document)
}

/// Write the HTML projection for `file` to `output` or stdout.
pub fn html(file: &str, output: Option<&str>, engine: &EngineArgs) -> Result<(), CliError> {
    let document = process_file(file, engine)?;
    let html = document.html_document()?;
    write_output(&html.generated_code, output)?;
    report_diagnostics(file, &document)
}
