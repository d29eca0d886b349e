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

//! Razor Command Line Interface

use clap::Parser;
use razor_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Razor - template compiler toolkit
///
/// # Examples
///
/// ```bash
/// # Generate the C# class of a view
/// razor generate Views/Home/Index.cshtml --import Views/_ViewImports.cshtml
///
/// # Design-time output with tag helpers
/// razor generate Pages/Counter.razor --design-time --tag-helpers helpers.json
///
/// # Where does line 3, character 10 end up in the C#?
/// razor map Index.cshtml --line 3 --character 10
/// ```
#[derive(Parser)]
#[command(name = "razor")]
#[command(author, version, about = "Razor - template compiler toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    // Logging goes to stderr so generated output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("razor_cli=warn".parse().expect("valid log directive"))
                .add_directive("razor_lsp=warn".parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
