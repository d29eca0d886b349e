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

//! `map` command.

use super::process_file;
use crate::cli::EngineArgs;
use crate::error::CliError;
use razor_lsp::{DocumentMappingService, MappingBehavior, Position, Projection, SourceText};

/// Print the language at a position of `file` and where the position lands
/// in the generated C#.
///
/// ```text
/// language: CSharp
/// csharp: 14:22
/// ```
///
/// Positions that are not inside mapped code print `csharp: unmapped`.
pub fn map(file: &str, line: u32, character: u32, engine: &EngineArgs) -> Result<(), CliError> {
    let document = process_file(file, engine)?;
    let razor = SourceText::new(document.source().text());
    let position = Position::new(line, character);
    let index = razor
        .position_to_index(position)
        .ok_or_else(|| CliError::invalid_input(format!("position {}:{} is outside {}", line, character, file)))?;

    let service = DocumentMappingService::new();
    let projection = Projection::csharp(&document)?;
    println!("language: {:?}", service.get_language_kind(&document, index));
    match service.try_map_to_generated_position(&projection, &razor, position, MappingBehavior::Strict) {
        Some(generated) => println!("csharp: {}:{}", generated.line, generated.character),
        None => println!("csharp: unmapped"),
    }
    Ok(())
}
