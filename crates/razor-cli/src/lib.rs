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

//! Razor CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **generate**: Generate the C# class of a `.cshtml` or `.razor` document
//! - **html**: Print the HTML projection (code replaced by `~`, offsets kept)
//! - **tokens**: Dump HTML or C# tokens, as text or JSON
//! - **tree**: Print the syntax tree outline
//! - **map**: Map a document position to the generated C#
//!
//! Every command that processes a document accepts the engine flags of
//! [`cli::EngineArgs`]: design-time generation, tag helpers from a JSON file,
//! import documents, checksum algorithm and language version.
//!
//! # Examples
//!
//! ```no_run
//! use razor_cli::cli::EngineArgs;
//! use razor_cli::commands::process_file;
//!
//! # fn main() -> Result<(), razor_cli::error::CliError> {
//! let args = EngineArgs {
//!     checksum: "sha256".to_string(),
//!     language_version: "latest".to_string(),
//!     ..EngineArgs::default()
//! };
//! let document = process_file("Views/Home/Index.cshtml", &args)?;
//! println!("{}", document.csharp_document()?.generated_code);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
