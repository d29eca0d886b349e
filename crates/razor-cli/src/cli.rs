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

//! Command-line argument definitions.

use crate::commands;
use crate::error::CliError;
use clap::{Args, Subcommand, ValueEnum};
use razor_core::{RazorEngineOptions, RazorLanguageVersion, SourceHashAlgorithm};

/// Engine settings shared by every command that processes a document.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Generate design-time code (no markup writes, `__o = expr;` expressions)
    #[arg(long)]
    pub design_time: bool,

    /// JSON file with the tag-helper descriptors the project references
    #[arg(long, value_name = "FILE")]
    pub tag_helpers: Option<String>,

    /// Import document, outermost first (repeatable)
    #[arg(short, long = "import", value_name = "FILE")]
    pub imports: Vec<String>,

    /// Checksum algorithm for the `#pragma checksum` line (sha1, sha256, md5)
    #[arg(long, default_value = "sha256")]
    pub checksum: String,

    /// Do not emit a `#pragma checksum` line
    #[arg(long)]
    pub no_checksum: bool,

    /// Razor language version (1.0 … 8.0, latest)
    #[arg(long, default_value = "latest")]
    pub language_version: String,

    /// Root namespace of the project
    #[arg(long)]
    pub root_namespace: Option<String>,
}

impl EngineArgs {
    /// Builds engine options from the arguments.
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown checksum algorithm or language version.
    pub fn options(&self) -> Result<RazorEngineOptions, CliError> {
        let algorithm: SourceHashAlgorithm = self.checksum.parse()?;
        let version: RazorLanguageVersion = self.language_version.parse()?;
        let mut builder = RazorEngineOptions::builder()
            .design_time(self.design_time)
            .checksum_algorithm(algorithm)
            .suppress_checksum(self.no_checksum)
            .language_version(version);
        if let Some(namespace) = &self.root_namespace {
            builder = builder.root_namespace(namespace.clone());
        }
        Ok(builder.build())
    }
}

/// Tokenizer used by the `tokens` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLanguage {
    Html,
    Csharp,
}

/// Razor CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate the C# class for a Razor document
    ///
    /// Diagnostics are printed to stderr; the command fails when any of them
    /// is an error.
    Generate {
        /// Input file path (.cshtml or .razor)
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Print the HTML projection of a Razor document
    Html {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Dump the tokens of a file
    Tokens {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Tokenizer to run over the whole file
        #[arg(short, long, value_enum, default_value = "html")]
        language: TokenLanguage,

        /// Print tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the syntax tree of a Razor document
    Tree {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Map a position of a Razor document to the generated C#
    ///
    /// Lines and characters are zero-based; characters count UTF-16 code units.
    Map {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Zero-based line
        #[arg(long)]
        line: u32,

        /// Zero-based character within the line
        #[arg(long)]
        character: u32,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a file cannot be read or written, an option is
    /// invalid, or processing reported errors.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Generate { file, output, engine } => commands::generate(&file, output.as_deref(), &engine),
            Commands::Html { file, output, engine } => commands::html(&file, output.as_deref(), &engine),
            Commands::Tokens { file, language, json } => commands::tokens(&file, language, json),
            Commands::Tree { file, engine } => commands::tree(&file, &engine),
            Commands::Map {
                file,
                line,
                character,
                engine,
            } => commands::map(&file, line, character, &engine),
        }
    }
}
