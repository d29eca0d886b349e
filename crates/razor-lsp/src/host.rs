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

//! Host-supplied descriptions of projects and documents.

use razor_core::tag_helpers::TagHelperDescriptor;
use razor_core::{FileKind, RazorLanguageVersion};
use std::sync::Arc;

/// Named Razor configuration a project builds with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RazorConfiguration {
    pub name: String,
    pub language_version: RazorLanguageVersion,
}

impl RazorConfiguration {
    pub fn new(name: impl Into<String>, language_version: RazorLanguageVersion) -> Self {
        Self {
            name: name.into(),
            language_version,
        }
    }
}

impl Default for RazorConfiguration {
    fn default() -> Self {
        Self::new("MVC-3.0", RazorLanguageVersion::Latest)
    }
}

/// A project as the host describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProject {
    /// Path of the project file; also the project's key.
    pub file_path: String,
    pub configuration: RazorConfiguration,
    pub root_namespace: Option<String>,
}

impl HostProject {
    pub fn new(file_path: impl Into<String>, configuration: RazorConfiguration, root_namespace: Option<String>) -> Self {
        Self {
            file_path: file_path.into(),
            configuration,
            root_namespace,
        }
    }

    /// Directory of the project file, including the trailing separator.
    pub fn directory(&self) -> &str {
        match self.file_path.rfind(['/', '\\']) {
            Some(index) => &self.file_path[..=index],
            None => "",
        }
    }
}

/// A document as the host describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDocument {
    /// Absolute path; the document's key within its project.
    pub file_path: String,
    /// Project-relative path with `/` separators.
    pub target_path: String,
    pub file_kind: FileKind,
}

impl HostDocument {
    /// Derives the file kind from `target_path`.
    pub fn new(file_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        let target_path = target_path.into().replace('\\', "/");
        let file_kind = FileKind::from_path(&target_path);
        Self {
            file_path: file_path.into(),
            target_path,
            file_kind,
        }
    }

    pub fn with_file_kind(mut self, file_kind: FileKind) -> Self {
        self.file_kind = file_kind;
        self
    }

    /// Target paths of the import documents that apply to this document,
    /// from the project root down to the document's own folder.
    ///
    /// An import never imports itself.
    pub fn import_target_paths(&self) -> Vec<String> {
        let import_name = self.file_kind.import_file_name();
        let mut paths = Vec::new();
        let mut prefix = String::new();
        let folders: Vec<&str> = self.target_path.split('/').collect();
        for (depth, folder) in folders.iter().enumerate() {
            let candidate = format!("{prefix}{import_name}");
            if candidate != self.target_path {
                paths.push(candidate);
            }
            if depth + 1 < folders.len() {
                prefix.push_str(folder);
                prefix.push('/');
            }
        }
        paths
    }
}

/// Workspace facts the host computes from a project's compilation.
#[derive(Debug, Clone, Default)]
pub struct ProjectWorkspaceState {
    pub tag_helpers: Vec<Arc<TagHelperDescriptor>>,
    pub csharp_language_version: Option<String>,
}

impl ProjectWorkspaceState {
    pub fn new(tag_helpers: Vec<Arc<TagHelperDescriptor>>, csharp_language_version: Option<String>) -> Self {
        Self {
            tag_helpers,
            csharp_language_version,
        }
    }
}

impl PartialEq for ProjectWorkspaceState {
    fn eq(&self, other: &Self) -> bool {
        self.csharp_language_version == other.csharp_language_version
            && self.tag_helpers.len() == other.tag_helpers.len()
            && self
                .tag_helpers
                .iter()
                .zip(&other.tag_helpers)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_target_path() {
        assert_eq!(HostDocument::new("/p/Index.cshtml", "Index.cshtml").file_kind, FileKind::Legacy);
        assert_eq!(HostDocument::new("/p/App.razor", "App.razor").file_kind, FileKind::Component);
        assert_eq!(
            HostDocument::new("/p/_Imports.razor", "_Imports.razor").file_kind,
            FileKind::ComponentImport
        );
    }

    #[test]
    fn test_import_target_paths() {
        let document = HostDocument::new("/p/Pages/Admin/Index.razor", "Pages\\Admin\\Index.razor");
        assert_eq!(
            document.import_target_paths(),
            vec!["_Imports.razor", "Pages/_Imports.razor", "Pages/Admin/_Imports.razor"]
        );

        let document = HostDocument::new("/p/Views/Home.cshtml", "Views/Home.cshtml");
        assert_eq!(
            document.import_target_paths(),
            vec!["_ViewImports.cshtml", "Views/_ViewImports.cshtml"]
        );

        let import = HostDocument::new("/p/Pages/_Imports.razor", "Pages/_Imports.razor");
        assert_eq!(import.import_target_paths(), vec!["_Imports.razor"]);
    }

    #[test]
    fn test_project_directory() {
        let project = HostProject::new("/src/App/App.csproj", RazorConfiguration::default(), None);
        assert_eq!(project.directory(), "/src/App/");
    }
}
