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

//! The `#pragma checksum` header line.

use crate::error::{RazorError, RazorResult};
use crate::options::SourceHashAlgorithm;
use crate::source::RazorSourceDocument;

/// Debugger GUID identifying SHA-1 checksums.
pub const SHA1_GUID: &str = "{ff1816ec-aa5e-4d10-87f7-6f4963833460}";
/// Debugger GUID identifying SHA-256 checksums.
pub const SHA256_GUID: &str = "{8829d00f-11b8-4213-878b-770e8597ac16}";

/// GUID for an algorithm the pragma supports.
pub fn algorithm_guid(algorithm: SourceHashAlgorithm) -> RazorResult<&'static str> {
    match algorithm {
        SourceHashAlgorithm::Sha1 => Ok(SHA1_GUID),
        SourceHashAlgorithm::Sha256 => Ok(SHA256_GUID),
        other => Err(RazorError::unsupported_checksum_algorithm(other)),
    }
}

/// `#pragma checksum "<path>" "<guid>" "<HEX>"` for `source`.
///
/// ```
/// use razor_core::codegen::checksum_pragma;
/// use razor_core::{RazorSourceDocument, SourceHashAlgorithm};
///
/// let source = RazorSourceDocument::new("", "Index.cshtml");
/// let line = checksum_pragma(&source, SourceHashAlgorithm::Sha1).unwrap();
/// assert_eq!(
///     line,
///     "#pragma checksum \"Index.cshtml\" \"{ff1816ec-aa5e-4d10-87f7-6f4963833460}\" \"DA39A3EE5E6B4B0D3255BFEF95601890AFD80709\""
/// );
/// ```
pub fn checksum_pragma(source: &RazorSourceDocument, algorithm: SourceHashAlgorithm) -> RazorResult<String> {
    let guid = algorithm_guid(algorithm)?;
    let digest = source.checksum(algorithm)?;
    let path = source.file_path().map(|p| p.to_string()).unwrap_or_default();
    Ok(format!(
        "#pragma checksum \"{}\" \"{}\" \"{}\"",
        path.replace('\\', "\\\\"),
        guid,
        hex::encode_upper(digest)
    ))
}
