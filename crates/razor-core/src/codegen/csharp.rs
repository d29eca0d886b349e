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

//! C# projection of a Razor document.
//!
//! Legacy documents become a page class with an `ExecuteAsync` body that
//! writes markup literals and expression values in document order.
//! Components become a partial class with a `BuildRenderTree` override.
//! Every piece of user C# is written verbatim through
//! [`CodeWriter::write_mapped`] so that a [`SourceMapping`] links it back to
//! the Razor source.

use super::checksum::checksum_pragma;
use super::source_mapping::{normalize, SourceMapping};
use super::writer::{string_literal, CodeWriter};
use crate::diagnostic::RazorDiagnostic;
use crate::error::RazorResult;
use crate::lex::SyntaxKind;
use crate::options::RazorEngineOptions;
use crate::source::{RazorSourceDocument, SourceSpan};
use crate::syntax::{DirectiveInfo, DirectiveKind, RazorSyntaxTree, SyntaxElement, SyntaxNode, SyntaxNodeKind};
use crate::tag_helpers::{
    sanitize_identifier, TagHelperBinding, TagHelperDescriptor, TagHelperKind, TagHelperResolution,
    DEFAULT_COMPONENT_NAMESPACE,
};

/// Namespace of generated legacy page classes.
pub const LEGACY_NAMESPACE: &str = "AspNetCoreGeneratedDocument";

const LEGACY_USINGS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Threading.Tasks",
    "Microsoft.AspNetCore.Mvc",
    "Microsoft.AspNetCore.Mvc.Rendering",
    "Microsoft.AspNetCore.Mvc.ViewFeatures",
];

const COMPONENT_USINGS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.Linq",
    "System.Threading.Tasks",
    "Microsoft.AspNetCore.Components",
];

const TAG_HELPERS: &str = "global::Microsoft.AspNetCore.Razor.TagHelpers";
const RUNTIME_TAG_HELPERS: &str = "global::Microsoft.AspNetCore.Razor.Runtime.TagHelpers";
const COMPONENTS: &str = "global::Microsoft.AspNetCore.Components";

/// Generated C# plus its mappings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RazorCSharpDocument {
    pub generated_code: String,
    pub source_mappings: Vec<SourceMapping>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

/// Generates the C# document for a bound syntax tree.
pub fn generate_csharp(
    tree: &RazorSyntaxTree,
    imports: &[RazorSyntaxTree],
    resolution: &TagHelperResolution,
    options: &RazorEngineOptions,
) -> RazorResult<RazorCSharpDocument> {
    let generator = CSharpGenerator {
        tree,
        imports,
        resolution,
        options,
        source: tree.source().as_ref(),
        component: tree.file_kind().is_component(),
        writer: CodeWriter::new(options.indent_size, options.indent_with_tabs),
        pending_markup: String::new(),
        sequence: 0,
        builder_depth: 0,
        tag_helper_fields: Vec::new(),
        tag_helper_count: 0,
    };
    generator.generate()
}

struct CSharpGenerator<'a> {
    tree: &'a RazorSyntaxTree,
    imports: &'a [RazorSyntaxTree],
    resolution: &'a TagHelperResolution,
    options: &'a RazorEngineOptions,
    source: &'a RazorSourceDocument,
    component: bool,
    writer: CodeWriter,
    pending_markup: String,
    sequence: usize,
    builder_depth: usize,
    /// `(field name, type name)` of every legacy tag helper created.
    tag_helper_fields: Vec<(String, String)>,
    tag_helper_count: usize,
}

impl<'a> CSharpGenerator<'a> {
    fn generate(mut self) -> RazorResult<RazorCSharpDocument> {
        if !self.options.suppress_checksum {
            let pragma = checksum_pragma(self.source, self.options.checksum_algorithm)?;
            self.writer.write_line(&pragma);
        }
        self.writer.write_line("// <auto-generated/>");
        self.writer.write_line("#pragma warning disable 1591");

        self.write_namespace_header();
        self.writer.write_line("#line hidden");
        self.write_usings();
        self.write_class_header();

        if self.component {
            self.writer.open_block(&format!(
                "protected override void BuildRenderTree({COMPONENTS}.Rendering.RenderTreeBuilder __builder)"
            ));
        } else {
            self.writer.write_line("#pragma warning disable 1998");
            self.writer
                .open_block("public async override global::System.Threading.Tasks.Task ExecuteAsync()");
        }
        let root = std::sync::Arc::clone(self.tree.root());
        self.visit(&root);
        self.flush_markup();
        self.writer.close_block("");
        if !self.component {
            self.writer.write_line("#pragma warning restore 1998");
        }

        self.write_members();
        self.writer.close_block("");
        self.writer.close_block("");
        self.writer.write_line("#pragma warning restore 1591");

        let (generated_code, mut source_mappings) = self.writer.finish();
        normalize(&mut source_mappings);
        Ok(RazorCSharpDocument {
            generated_code,
            source_mappings,
            diagnostics: Vec::new(),
        })
    }

    // ===== class shell =====

    fn document_directives(&self, kind: DirectiveKind) -> impl Iterator<Item = (&'a SyntaxNode, &'a DirectiveInfo)> {
        self.tree.directives().filter(move |(_, info)| info.kind == kind)
    }

    fn last_document_directive(&self, kind: DirectiveKind) -> Option<&'a DirectiveInfo> {
        self.document_directives(kind)
            .filter(|(_, info)| !info.values.is_empty())
            .map(|(_, info)| info)
            .last()
    }

    fn write_namespace_header(&mut self) {
        let document_namespace = self.last_document_directive(DirectiveKind::Namespace);
        match document_namespace.and_then(|info| info.value(0)) {
            Some(value) => {
                self.writer.write("namespace ");
                self.writer.write_mapped(&value.text, value.span.clone());
                self.writer.write_line("");
            }
            None => {
                let namespace = if self.component {
                    self.resolution
                        .current_namespace
                        .clone()
                        .unwrap_or_else(|| DEFAULT_COMPONENT_NAMESPACE.to_string())
                } else {
                    self.imports
                        .iter()
                        .rev()
                        .find_map(|import| import.last_directive_value(DirectiveKind::Namespace))
                        .unwrap_or(LEGACY_NAMESPACE)
                        .to_string()
                };
                self.writer.write_line(&format!("namespace {namespace}"));
            }
        }
        self.writer.write_line("{");
        self.writer.indent();
    }

    fn write_usings(&mut self) {
        let defaults = if self.component { COMPONENT_USINGS } else { LEGACY_USINGS };
        for namespace in defaults {
            self.writer.write_line(&format!("using {namespace};"));
        }
        let mut seen: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
        for import in self.imports {
            for (_, info) in import.directives().filter(|(_, info)| info.kind == DirectiveKind::Using) {
                if let Some(value) = info.value(0) {
                    if !seen.contains(&value.text) {
                        seen.push(value.text.clone());
                        self.writer.write_line(&format!("using {};", value.text));
                    }
                }
            }
        }
        let usings: Vec<_> = self
            .document_directives(DirectiveKind::Using)
            .filter_map(|(_, info)| info.value(0).cloned())
            .collect();
        for value in usings {
            self.writer.write("using ");
            self.writer.write_mapped(&value.text, value.span);
            self.writer.write_line(";");
        }
    }

    fn write_class_header(&mut self) {
        let class_name = class_name(self.source, self.component);
        let inherits = self.last_document_directive(DirectiveKind::Inherits).and_then(|i| i.value(0));

        if self.component {
            let routes: Vec<_> = self
                .document_directives(DirectiveKind::Page)
                .filter_map(|(_, info)| info.value(0).cloned())
                .collect();
            for route in routes {
                self.writer.write(&format!("[{COMPONENTS}.RouteAttribute("));
                self.writer.write_mapped(&route.text, route.span);
                self.writer.write_line(")]");
            }
            if let Some(layout) = self.last_document_directive(DirectiveKind::Layout).and_then(|i| i.value(0)) {
                self.writer.write(&format!("[{COMPONENTS}.LayoutAttribute(typeof("));
                self.writer.write_mapped(&layout.text, layout.span.clone());
                self.writer.write_line("))]");
            }
            self.writer.write(&format!("public partial class {class_name} : "));
            match inherits {
                Some(value) => {
                    self.writer.write_mapped(&value.text, value.span.clone());
                }
                None => {
                    self.writer.write(&format!("{COMPONENTS}.ComponentBase"));
                }
            }
            let implements: Vec<_> = self
                .document_directives(DirectiveKind::Implements)
                .filter_map(|(_, info)| info.value(0).cloned())
                .collect();
            for interface in implements {
                self.writer.write(", ");
                self.writer.write_mapped(&interface.text, interface.span);
            }
            self.writer.write_line("");
        } else {
            self.writer.write(&format!("public class {class_name} : "));
            let is_page = self.document_directives(DirectiveKind::Page).next().is_some();
            match inherits {
                Some(value) => {
                    self.writer.write_mapped(&value.text, value.span.clone());
                }
                None if is_page => {
                    self.writer.write("global::Microsoft.AspNetCore.Mvc.RazorPages.Page");
                }
                None => {
                    self.writer.write("global::Microsoft.AspNetCore.Mvc.Razor.RazorPage<");
                    self.write_model_type();
                    self.writer.write(">");
                }
            }
            self.writer.write_line("");
        }
        self.writer.write_line("{");
        self.writer.indent();
    }

    fn write_model_type(&mut self) {
        match self.last_document_directive(DirectiveKind::Model).and_then(|i| i.value(0)) {
            Some(model) => {
                self.writer.write_mapped(&model.text, model.span.clone());
            }
            None => {
                self.writer.write("dynamic");
            }
        }
    }

    fn write_members(&mut self) {
        if self.options.design_time {
            self.writer.write_line("#pragma warning disable 0414");
            self.writer.write_line("private static object __o = null;");
            self.writer.write_line("#pragma warning restore 0414");
        }

        for import in self.imports {
            for (_, info) in import.directives().filter(|(_, info)| info.kind == DirectiveKind::Inject) {
                if let (Some(ty), Some(member)) = (info.value(0), info.value(1)) {
                    self.write_inject_attribute();
                    self.writer
                        .write_line(&format!("{} {} {} {{ get; {}set; }} = default!;", self.inject_visibility(), ty.text, member.text, self.inject_setter()));
                }
            }
        }
        let injects: Vec<_> = self
            .document_directives(DirectiveKind::Inject)
            .map(|(_, info)| info.clone())
            .collect();
        for info in injects {
            if let (Some(ty), Some(member)) = (info.value(0), info.value(1)) {
                self.write_inject_attribute();
                self.writer.write(&format!("{} ", self.inject_visibility()));
                self.writer.write_mapped(&ty.text, ty.span.clone());
                self.writer.write(" ");
                self.writer.write_mapped(&member.text, member.span.clone());
                self.writer
                    .write_line(&format!(" {{ get; {}set; }} = default!;", self.inject_setter()));
            }
        }

        if !self.component {
            let html_helper = format!("global::Microsoft.AspNetCore.Mvc.Rendering.IHtmlHelper<{}>", self.model_text());
            for (ty, name) in [
                ("global::Microsoft.AspNetCore.Mvc.ViewFeatures.IModelExpressionProvider", "ModelExpressionProvider"),
                ("global::Microsoft.AspNetCore.Mvc.IUrlHelper", "Url"),
                ("global::Microsoft.AspNetCore.Mvc.IViewComponentHelper", "Component"),
                ("global::Microsoft.AspNetCore.Mvc.Rendering.IJsonHelper", "Json"),
                (html_helper.as_str(), "Html"),
            ] {
                self.writer.write_line("[global::Microsoft.AspNetCore.Mvc.Razor.Internal.RazorInjectAttribute]");
                self.writer
                    .write_line(&format!("public {ty} {name} {{ get; private set; }} = default!;"));
            }
        }

        let blocks: Vec<_> = self
            .tree
            .directives()
            .filter(|(_, info)| matches!(info.kind, DirectiveKind::Code | DirectiveKind::Functions))
            .filter_map(|(node, _)| directive_code_block(node))
            .collect();
        for block in blocks {
            for literal in block
                .descendants()
                .filter(|n| n.kind() == SyntaxNodeKind::CSharpStatementLiteral)
            {
                let text = literal.full_text();
                if !text.trim().is_empty() {
                    self.writer.new_line_if_needed();
                    self.writer.write_mapped(&text, literal.span().clone());
                    self.writer.new_line_if_needed();
                }
            }
        }

        if !self.tag_helper_fields.is_empty() {
            self.writer.write_line("#pragma warning disable 0649");
            self.writer.write_line(&format!(
                "private {RUNTIME_TAG_HELPERS}.TagHelperExecutionContext __tagHelperExecutionContext;"
            ));
            self.writer.write_line("#pragma warning restore 0649");
            self.writer.write_line(&format!(
                "private {RUNTIME_TAG_HELPERS}.TagHelperRunner __tagHelperRunner = new {RUNTIME_TAG_HELPERS}.TagHelperRunner();"
            ));
            self.writer.write_line(&format!(
                "private {RUNTIME_TAG_HELPERS}.TagHelperScopeManager __tagHelperScopeManager = new {RUNTIME_TAG_HELPERS}.TagHelperScopeManager(StartTagHelperWritingScope, EndTagHelperWritingScope);"
            ));
            let fields = std::mem::take(&mut self.tag_helper_fields);
            for (field, type_name) in fields {
                self.writer.write_line(&format!("private global::{type_name} {field};"));
            }
        }
    }

    fn write_inject_attribute(&mut self) {
        if self.component {
            self.writer.write_line(&format!("[{COMPONENTS}.InjectAttribute]"));
        } else {
            self.writer.write_line("[global::Microsoft.AspNetCore.Mvc.Razor.Internal.RazorInjectAttribute]");
        }
    }

    fn inject_visibility(&self) -> &'static str {
        if self.component {
            "private"
        } else {
            "public"
        }
    }

    fn inject_setter(&self) -> &'static str {
        if self.component {
            ""
        } else {
            "private "
        }
    }

    fn model_text(&self) -> String {
        self.last_document_directive(DirectiveKind::Model)
            .and_then(|i| i.first_text())
            .unwrap_or("dynamic")
            .to_string()
    }

    // ===== body =====

    fn builder_name(&self) -> String {
        match self.builder_depth {
            0 => "__builder".to_string(),
            depth => format!("__builder{}", depth + 1),
        }
    }

    fn next_sequence(&mut self) -> usize {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind() {
            SyntaxNodeKind::MarkupEphemeralTextLiteral
            | SyntaxNodeKind::RazorComment
            | SyntaxNodeKind::RazorMetaCode
            | SyntaxNodeKind::CSharpTransition => {}
            SyntaxNodeKind::CSharpImplicitExpression | SyntaxNodeKind::CSharpExplicitExpression => {
                if let Some(expression) = node
                    .child_nodes()
                    .find(|n| n.kind() == SyntaxNodeKind::CSharpExpressionLiteral)
                {
                    let text = expression.full_text();
                    self.write_expression(&text, expression.span().clone());
                }
            }
            SyntaxNodeKind::CSharpStatementLiteral => {
                if node.chunk_generator().is_none() {
                    self.write_statement(node);
                }
            }
            SyntaxNodeKind::RazorDirective => self.visit_directive(node),
            SyntaxNodeKind::MarkupTagHelperElement => self.visit_tag_helper_element(node),
            SyntaxNodeKind::MarkupElement if self.component && needs_element_frames(node) => {
                self.visit_component_element(node)
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &SyntaxNode) {
        let markup = node.kind().is_markup();
        for child in node.children() {
            match child {
                SyntaxElement::Node(inner) => self.visit(inner),
                SyntaxElement::Token(token) if markup => self.pending_markup.push_str(&token.content),
                SyntaxElement::Token(_) => {}
            }
        }
    }

    fn visit_directive(&mut self, node: &SyntaxNode) {
        let Some(info) = node.directive() else {
            return;
        };
        if info.kind != DirectiveKind::Section || self.component {
            return;
        }
        let Some(name) = info.first_text() else {
            return;
        };
        self.flush_markup();
        self.writer.new_line_if_needed();
        self.writer.write("DefineSection(");
        self.writer.write(&string_literal(name));
        self.writer.write_line(", async() => {");
        self.writer.indent();
        for block in node
            .descendants()
            .filter(|n| n.kind() == SyntaxNodeKind::MarkupBlock)
            .take(1)
        {
            self.visit(block);
        }
        self.flush_markup();
        self.writer.dedent();
        self.writer.write_line("}");
        self.writer.write_line(");");
    }

    fn flush_markup(&mut self) {
        if self.pending_markup.is_empty() {
            return;
        }
        let markup = std::mem::take(&mut self.pending_markup);
        if self.options.design_time {
            return;
        }
        let literal = string_literal(&markup);
        self.writer.new_line_if_needed();
        if self.component {
            let line = format!("{}.AddMarkupContent({}, {literal});", self.builder_name(), self.next_sequence());
            self.writer.write_line(&line);
        } else {
            self.writer.write_line(&format!("WriteLiteral({literal});"));
        }
    }

    fn write_expression(&mut self, text: &str, span: SourceSpan) {
        self.flush_markup();
        if text.trim().is_empty() {
            return;
        }
        self.writer.new_line_if_needed();
        if self.options.design_time {
            self.writer.write("__o = ");
            self.writer.write_mapped(text, span);
            self.writer.write_line(";");
        } else if self.component {
            let prefix = format!("{}.AddContent({}, ", self.builder_name(), self.next_sequence());
            self.writer.write(&prefix);
            self.writer.write_mapped(text, span);
            self.writer.write_line(");");
        } else {
            self.writer.write("Write(");
            self.writer.write_mapped(text, span);
            self.writer.write_line(");");
        }
    }

    fn write_statement(&mut self, literal: &SyntaxNode) {
        self.flush_markup();
        let text = literal.full_text();
        if text.trim().is_empty() {
            return;
        }
        self.writer.new_line_if_needed();
        self.writer.write_mapped(&text, literal.span().clone());
        self.writer.new_line_if_needed();
    }

    /// Writes a mapped C# value taken from an attribute. A leading `@` is
    /// not part of the expression.
    fn write_attribute_expression(&mut self, value: &AttributeValue) {
        match value.text.strip_prefix('@') {
            Some(expression) => {
                let span = self.source.span(value.span.absolute_index + 1, expression.len());
                self.writer.write_mapped(expression, span);
            }
            None => {
                self.writer.write_mapped(&value.text, value.span.clone());
            }
        }
    }

    // ===== tag helpers and components =====

    fn visit_tag_helper_element(&mut self, node: &SyntaxNode) {
        let Some(binding) = node.tag_helper_binding().cloned() else {
            return self.visit_children(node);
        };
        if self.component {
            match binding.component() {
                Some(component) => self.write_component(node, component),
                None => self.visit_children(node),
            }
            return;
        }
        let helpers: Vec<&TagHelperDescriptor> = binding
            .descriptors
            .iter()
            .map(|d| d.as_ref())
            .filter(|d| d.kind == TagHelperKind::TagHelper)
            .collect();
        if helpers.is_empty() {
            return self.visit_children(node);
        }
        self.write_legacy_tag_helper(node, &binding, &helpers);
    }

    fn write_legacy_tag_helper(&mut self, node: &SyntaxNode, binding: &TagHelperBinding, helpers: &[&TagHelperDescriptor]) {
        let parts = ElementParts::of(node);
        let attributes = parts
            .start_tag
            .map(|tag| read_attributes(tag, self.source))
            .unwrap_or_default();
        let mode = if parts.self_closing {
            "SelfClosing"
        } else if parts.end_tag.is_none() {
            "StartTagOnly"
        } else {
            "StartTagAndEndTag"
        };

        self.flush_markup();
        self.tag_helper_count += 1;
        self.writer.new_line_if_needed();
        self.writer.write_line(&format!(
            "__tagHelperExecutionContext = __tagHelperScopeManager.Begin({}, {TAG_HELPERS}.TagMode.{mode}, \"{:032x}\", async() => {{",
            string_literal(&binding.tag_name),
            self.tag_helper_count
        ));
        self.writer.indent();
        for child in &parts.body {
            self.visit(child);
        }
        self.flush_markup();
        self.writer.dedent();
        self.writer.write_line("}");
        self.writer.write_line(");");

        let mut bound_names = Vec::new();
        for helper in helpers {
            let type_name = helper.type_name().to_string();
            let field = field_name(&type_name);
            if !self.tag_helper_fields.iter().any(|(f, _)| *f == field) {
                self.tag_helper_fields.push((field.clone(), type_name.clone()));
            }
            self.writer
                .write_line(&format!("{field} = CreateTagHelper<global::{type_name}>();"));
            self.writer
                .write_line(&format!("__tagHelperExecutionContext.Add({field});"));
            for attribute in &attributes {
                let Some(bound) = helper
                    .bound_attributes
                    .iter()
                    .find(|b| b.name.eq_ignore_ascii_case(&attribute.name))
                else {
                    continue;
                };
                bound_names.push(attribute.name.clone());
                let Some(value) = &attribute.value else {
                    continue;
                };
                self.writer.write(&format!("{field}.{} = ", bound.property_name));
                if is_string_type(&bound.type_name) && !value.text.starts_with('@') {
                    self.writer.write(&string_literal(&value.text));
                } else {
                    self.write_attribute_expression(value);
                }
                self.writer.write_line(";");
                self.writer.write_line(&format!(
                    "__tagHelperExecutionContext.AddTagHelperAttribute({}, {field}.{}, {TAG_HELPERS}.HtmlAttributeValueStyle.DoubleQuotes);",
                    string_literal(&attribute.name),
                    bound.property_name
                ));
            }
        }
        for attribute in attributes.iter().filter(|a| !bound_names.contains(&a.name)) {
            let value = attribute.value.as_ref().map(|v| v.text.as_str()).unwrap_or_default();
            if value.contains('@') {
                continue;
            }
            self.writer.write_line(&format!(
                "__tagHelperExecutionContext.AddHtmlAttribute({}, {}, {TAG_HELPERS}.HtmlAttributeValueStyle.DoubleQuotes);",
                string_literal(&attribute.name),
                string_literal(value)
            ));
        }
        self.writer
            .write_line("await __tagHelperRunner.RunAsync(__tagHelperExecutionContext);");
        self.writer.write_line("Write(__tagHelperExecutionContext.Output);");
        self.writer
            .write_line("__tagHelperExecutionContext = __tagHelperScopeManager.End();");
    }

    fn write_component(&mut self, node: &SyntaxNode, component: &TagHelperDescriptor) {
        let parts = ElementParts::of(node);
        let attributes = parts
            .start_tag
            .map(|tag| read_attributes(tag, self.source))
            .unwrap_or_default();

        self.flush_markup();
        self.writer.new_line_if_needed();
        let builder = self.builder_name();
        let sequence = self.next_sequence();
        self.writer.write_line(&format!(
            "{builder}.OpenComponent<global::{}>({sequence});",
            component.type_name()
        ));

        for attribute in &attributes {
            if attribute.name.starts_with('@') {
                self.write_directive_attribute(&builder, attribute, Some(component));
                continue;
            }
            let sequence = self.next_sequence();
            let bound = component
                .bound_attributes
                .iter()
                .find(|b| b.name == attribute.name);
            let name = bound.map(|b| b.property_name.as_str()).unwrap_or(&attribute.name);
            self.writer
                .write(&format!("{builder}.AddAttribute({sequence}, {}, ", string_literal(name)));
            match (&attribute.value, bound) {
                (None, _) => {
                    self.writer.write("true");
                }
                (Some(value), Some(bound)) if !is_string_type(&bound.type_name) || value.text.starts_with('@') => {
                    self.write_attribute_expression(value);
                }
                (Some(value), _) if value.text.starts_with('@') => {
                    self.write_attribute_expression(value);
                }
                (Some(value), _) => {
                    self.writer.write(&string_literal(&value.text));
                }
            }
            self.writer.write_line(");");
        }

        let (fragments, content): (Vec<&SyntaxNode>, Vec<&SyntaxNode>) = parts.body.into_iter().partition(|child| {
            child
                .tag_helper_binding()
                .is_some_and(|b| b.descriptors.iter().any(|d| d.is_child_content()))
        });
        for fragment in fragments {
            let Some(fragment_binding) = fragment.tag_helper_binding() else {
                continue;
            };
            let fragment_parts = ElementParts::of(fragment);
            let name = fragment_binding.tag_name.clone();
            self.write_render_fragment(&name, &fragment_parts.body);
        }
        if content.iter().any(|child| !child.full_text().trim().is_empty()) {
            self.write_render_fragment("ChildContent", &content);
        }

        self.writer.new_line_if_needed();
        self.writer.write_line(&format!("{builder}.CloseComponent();"));
    }

    fn write_render_fragment(&mut self, name: &str, body: &[&SyntaxNode]) {
        self.flush_markup();
        let builder = self.builder_name();
        let sequence = self.next_sequence();
        self.builder_depth += 1;
        let inner = self.builder_name();
        self.writer.new_line_if_needed();
        self.writer.write_line(&format!(
            "{builder}.AddAttribute({sequence}, {}, ({COMPONENTS}.RenderFragment)(({inner}) => {{",
            string_literal(name)
        ));
        self.writer.indent();
        for child in body {
            self.visit(child);
        }
        self.flush_markup();
        self.writer.dedent();
        self.writer.write_line("}");
        self.writer.write_line("));");
        self.builder_depth -= 1;
    }

    /// `<button @onclick="Go" class="@css">` inside a component.
    fn visit_component_element(&mut self, node: &SyntaxNode) {
        let parts = ElementParts::of(node);
        let Some(start_tag) = parts.start_tag else {
            return self.visit_children(node);
        };
        let attributes = read_attributes(start_tag, self.source);
        let tag_name = start_tag_name(start_tag);

        self.flush_markup();
        self.writer.new_line_if_needed();
        let builder = self.builder_name();
        let sequence = self.next_sequence();
        self.writer
            .write_line(&format!("{builder}.OpenElement({sequence}, {});", string_literal(&tag_name)));
        for attribute in &attributes {
            if attribute.name.starts_with('@') {
                self.write_directive_attribute(&builder, attribute, None);
                continue;
            }
            let sequence = self.next_sequence();
            self.writer.write(&format!(
                "{builder}.AddAttribute({sequence}, {}, ",
                string_literal(&attribute.name)
            ));
            match &attribute.value {
                Some(value) if value.text.starts_with('@') => self.write_attribute_expression(value),
                Some(value) => {
                    self.writer.write(&string_literal(&value.text));
                }
                None => {
                    self.writer.write("true");
                }
            }
            self.writer.write_line(");");
        }
        for child in &parts.body {
            self.visit(child);
        }
        self.flush_markup();
        self.writer.new_line_if_needed();
        self.writer.write_line(&format!("{builder}.CloseElement();"));
    }

    fn write_directive_attribute(&mut self, builder: &str, attribute: &TagAttribute, component: Option<&TagHelperDescriptor>) {
        let name = attribute.name.trim_start_matches('@');
        let Some(value) = &attribute.value else {
            return;
        };
        match name {
            "key" => {
                self.writer.write(&format!("{builder}.SetKey("));
                self.write_attribute_expression(value);
                self.writer.write_line(");");
            }
            "ref" => {
                let sequence = self.next_sequence();
                let target = component
                    .map(|c| format!("global::{}", c.type_name()))
                    .unwrap_or_else(|| format!("{COMPONENTS}.ElementReference"));
                let capture = if component.is_some() {
                    "AddComponentReferenceCapture"
                } else {
                    "AddElementReferenceCapture"
                };
                self.writer
                    .write(&format!("{builder}.{capture}({sequence}, (__value) => {{ "));
                self.write_attribute_expression(value);
                self.writer.write_line(&format!(" = ({target})__value; }});"));
            }
            _ => {
                let sequence = self.next_sequence();
                self.writer.write(&format!(
                    "{builder}.AddAttribute({sequence}, {}, {COMPONENTS}.EventCallback.Factory.Create(this, ",
                    string_literal(name)
                ));
                self.write_attribute_expression(value);
                self.writer.write_line("));");
            }
        }
    }
}

/// Start tag, body and end tag of an element node.
struct ElementParts<'n> {
    start_tag: Option<&'n SyntaxNode>,
    body: Vec<&'n SyntaxNode>,
    end_tag: Option<&'n SyntaxNode>,
    self_closing: bool,
}

impl<'n> ElementParts<'n> {
    fn of(node: &'n SyntaxNode) -> Self {
        let mut nodes: Vec<&SyntaxNode> = node.child_nodes().collect();
        let has_start = nodes.first().is_some_and(|n| n.kind() == SyntaxNodeKind::MarkupStartTag);
        let start_tag = has_start.then(|| nodes.remove(0));
        let has_end = nodes.last().is_some_and(|n| n.kind() == SyntaxNodeKind::MarkupEndTag);
        let end_tag = if has_end { nodes.pop() } else { None };
        let self_closing = start_tag.is_some_and(|tag| {
            let tokens: Vec<_> = tag.children().iter().filter_map(|c| c.as_token()).collect();
            tokens.len() >= 2
                && tokens[tokens.len() - 1].kind == SyntaxKind::CloseAngle
                && tokens[tokens.len() - 2].kind == SyntaxKind::ForwardSlash
        });
        Self {
            start_tag,
            body: nodes,
            end_tag,
            self_closing,
        }
    }
}

/// Elements in components need render-tree frames when their start tag
/// carries code or directive attributes.
fn needs_element_frames(node: &SyntaxNode) -> bool {
    let Some(start_tag) = node.child_nodes().next() else {
        return false;
    };
    start_tag.kind() == SyntaxNodeKind::MarkupStartTag
        && start_tag.children().iter().any(|child| match child {
            SyntaxElement::Node(_) => true,
            SyntaxElement::Token(token) => token.kind == SyntaxKind::Transition,
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagAttribute {
    /// Attribute name; directive attributes keep their leading `@`.
    name: String,
    value: Option<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeValue {
    text: String,
    span: SourceSpan,
}

fn start_tag_name(tag: &SyntaxNode) -> String {
    tag.children()
        .iter()
        .filter_map(|c| c.as_token())
        .find(|t| t.kind == SyntaxKind::Text)
        .map(|t| t.content.clone())
        .unwrap_or_default()
}

/// Attributes of a start tag with their raw value text.
fn read_attributes(tag: &SyntaxNode, source: &RazorSourceDocument) -> Vec<TagAttribute> {
    let children = tag.children();
    let token_kind = |i: usize| children.get(i).and_then(|c| c.as_token()).map(|t| t.kind);
    let mut attributes = Vec::new();
    // `<` and the tag name.
    let mut i = 2;
    while i < children.len() {
        let name = match (token_kind(i), token_kind(i + 1)) {
            (Some(SyntaxKind::Transition), Some(SyntaxKind::Text)) => {
                i += 2;
                children
                    .get(i - 1)
                    .and_then(|c| c.as_token())
                    .map(|t| format!("@{}", t.content))
            }
            (Some(SyntaxKind::Text), _) => {
                i += 1;
                children.get(i - 1).and_then(|c| c.as_token()).map(|t| t.content.clone())
            }
            _ => {
                i += 1;
                continue;
            }
        };
        let Some(name) = name else {
            continue;
        };

        let mut value = None;
        if token_kind(i) == Some(SyntaxKind::Equals) {
            i += 1;
            match token_kind(i) {
                Some(quote @ (SyntaxKind::DoubleQuote | SyntaxKind::SingleQuote)) => {
                    let start = children[i].span().end_index();
                    i += 1;
                    let mut end = start;
                    while i < children.len() {
                        if token_kind(i) == Some(quote) {
                            end = children[i].span().absolute_index;
                            i += 1;
                            break;
                        }
                        end = children[i].span().end_index();
                        i += 1;
                    }
                    value = Some(AttributeValue {
                        text: source.text().get(start..end).unwrap_or_default().to_string(),
                        span: source.span(start, end.saturating_sub(start)),
                    });
                }
                Some(SyntaxKind::Text) => {
                    let span = children[i].span().clone();
                    let text = children[i].as_token().map(|t| t.content.clone()).unwrap_or_default();
                    i += 1;
                    value = Some(AttributeValue { text, span });
                }
                _ => {}
            }
        }
        attributes.push(TagAttribute { name, value });
    }
    attributes
}

fn is_string_type(type_name: &str) -> bool {
    matches!(type_name, "string" | "System.String" | "global::System.String")
}

fn field_name(type_name: &str) -> String {
    let mut field = String::from("__");
    field.extend(
        type_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }),
    );
    field
}

/// `CSharpCodeBlock` holding the members of a `@code` / `@functions` directive.
fn directive_code_block(node: &SyntaxNode) -> Option<&SyntaxNode> {
    node.child_nodes()
        .find(|n| n.kind() == SyntaxNodeKind::RazorDirectiveBody)?
        .child_nodes()
        .find(|n| n.kind() == SyntaxNodeKind::CSharpCodeBlock)
}

/// Class name derived from the document path.
pub fn class_name(source: &RazorSourceDocument, component: bool) -> String {
    let Some(path) = source.relative_path().or(source.file_path()) else {
        return "GeneratedDocument".to_string();
    };
    let without_extension = match path.rfind('.') {
        Some(dot) if dot > path.rfind(['/', '\\']).map_or(0, |s| s + 1) => &path[..dot],
        _ => &path[..],
    };
    let segments: Vec<String> = without_extension
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && !s.ends_with(':'))
        .map(sanitize_identifier)
        .collect();
    if component {
        segments.last().cloned().unwrap_or_else(|| "GeneratedDocument".to_string())
    } else {
        segments.join("_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FileKind;
    use crate::tag_helpers::{bind_tag_helpers, resolve_tag_helpers, BoundAttributeDescriptor, TagMatchingRule};
    use std::sync::Arc;

    fn generate(text: &str, path: &str, options: RazorEngineOptions) -> RazorCSharpDocument {
        generate_with(text, path, options, Vec::new())
    }

    fn generate_with(
        text: &str,
        path: &str,
        options: RazorEngineOptions,
        descriptors: Vec<TagHelperDescriptor>,
    ) -> RazorCSharpDocument {
        let source = Arc::new(RazorSourceDocument::with_relative_path(text, format!("/app/{path}"), path));
        let tree = RazorSyntaxTree::parse(source, &options);
        let descriptors: Vec<_> = descriptors.into_iter().map(Arc::new).collect();
        let resolution = resolve_tag_helpers(&tree, &[], &descriptors, &options);
        let bound = bind_tag_helpers(&tree, &resolution.context);
        generate_csharp(&bound, &[], &resolution, &options).unwrap()
    }

    fn mapped_texts<'d>(document: &'d RazorCSharpDocument) -> Vec<&'d str> {
        document
            .source_mappings
            .iter()
            .map(|m| {
                let span = &m.generated_span;
                &document.generated_code[span.absolute_index..span.end_index()]
            })
            .collect()
    }

    fn legacy() -> RazorEngineOptions {
        RazorEngineOptions::builder().suppress_checksum(true).build()
    }

    fn component() -> RazorEngineOptions {
        RazorEngineOptions::builder()
            .file_kind(FileKind::Component)
            .suppress_checksum(true)
            .root_namespace("App")
            .build()
    }

    // ===== shell =====

    #[test]
    fn test_header_and_footer() {
        let options = RazorEngineOptions::builder()
            .checksum_algorithm(crate::options::SourceHashAlgorithm::Sha1)
            .build();
        let document = generate("<p></p>", "Views/Home/Index.cshtml", options);
        let mut lines = document.generated_code.lines();
        let pragma = lines.next().unwrap();
        assert!(pragma.starts_with("#pragma checksum \"/app/Views/Home/Index.cshtml\" \"{ff1816ec-aa5e-4d10-87f7-6f4963833460}\" \""));
        assert_eq!(lines.next(), Some("// <auto-generated/>"));
        assert_eq!(lines.next(), Some("#pragma warning disable 1591"));
        assert_eq!(document.generated_code.lines().last(), Some("#pragma warning restore 1591"));
        assert!(document
            .generated_code
            .contains("public class Views_Home_Index : global::Microsoft.AspNetCore.Mvc.Razor.RazorPage<dynamic>"));
        assert!(document.generated_code.contains("namespace AspNetCoreGeneratedDocument"));
    }

    #[test]
    fn test_suppressed_checksum() {
        let document = generate("<p></p>", "Index.cshtml", legacy());
        assert!(document.generated_code.starts_with("// <auto-generated/>"));
    }

    #[test]
    fn test_unsupported_checksum_algorithm() {
        let options = RazorEngineOptions::builder()
            .checksum_algorithm(crate::options::SourceHashAlgorithm::Md5)
            .build();
        let source = Arc::new(RazorSourceDocument::new("<p></p>", "Index.cshtml"));
        let tree = RazorSyntaxTree::parse(source, &options);
        let err = generate_csharp(&tree, &[], &TagHelperResolution::default(), &options).unwrap_err();
        assert_eq!(err.kind, crate::error::RazorErrorKind::UnsupportedChecksumAlgorithm);
    }

    #[test]
    fn test_class_names() {
        let legacy = RazorSourceDocument::with_relative_path("", "/app/Views/Home/Index.cshtml", "Views/Home/Index.cshtml");
        assert_eq!(class_name(&legacy, false), "Views_Home_Index");
        let component = RazorSourceDocument::with_relative_path("", "/app/Pages/Counter.razor", "Pages/Counter.razor");
        assert_eq!(class_name(&component, true), "Counter");
        assert_eq!(class_name(&RazorSourceDocument::anonymous(""), false), "GeneratedDocument");
    }

    // ===== legacy body =====

    #[test]
    fn test_expressions_and_statements_are_mapped() {
        let text = "@using System.Text\n<p>@Name</p>\n@{ var x = 1; }\n@(x + 1)";
        let document = generate(text, "Index.cshtml", legacy());
        assert_eq!(mapped_texts(&document), vec!["System.Text", "Name", " var x = 1; ", "x + 1"]);
        for mapping in &document.source_mappings {
            let original = &mapping.original_span;
            let generated = &mapping.generated_span;
            assert_eq!(
                &text[original.absolute_index..original.end_index()],
                &document.generated_code[generated.absolute_index..generated.end_index()]
            );
        }
        assert!(document.generated_code.contains("WriteLiteral(\"<p>\");"));
        assert!(document.generated_code.contains("Write(Name);"));
    }

    #[test]
    fn test_design_time_uses_discard_assignments() {
        let options = RazorEngineOptions::builder().design_time(true).suppress_checksum(true).build();
        let document = generate("<p>@Name</p>", "Index.cshtml", options);
        assert!(document.generated_code.contains("__o = Name;"));
        assert!(!document.generated_code.contains("WriteLiteral"));
        assert!(document.generated_code.contains("private static object __o = null;"));
    }

    #[test]
    fn test_model_and_inject() {
        let document = generate(
            "@model List<Item>\n@inject ILogger Logger\n",
            "Index.cshtml",
            legacy(),
        );
        assert_eq!(mapped_texts(&document), vec!["List<Item>", "ILogger", "Logger"]);
        assert!(document
            .generated_code
            .contains("global::Microsoft.AspNetCore.Mvc.Razor.RazorPage<List<Item>>"));
    }

    #[test]
    fn test_functions_members_are_mapped() {
        let document = generate("@functions {\n    int count;\n}\n", "Index.cshtml", legacy());
        assert_eq!(mapped_texts(&document), vec!["\n    int count;\n"]);
    }

    #[test]
    fn test_section() {
        let document = generate("@section Scripts {\n<script></script>\n}\n", "Index.cshtml", legacy());
        assert!(document.generated_code.contains("DefineSection(\"Scripts\", async() => {"));
        assert!(document.generated_code.contains("WriteLiteral(\"\\n<script></script>\\n\");"));
    }

    #[test]
    fn test_legacy_tag_helper() {
        let input = TagHelperDescriptor::new(TagHelperKind::TagHelper, "Mvc.InputTagHelper", "Mvc")
            .with_rule(TagMatchingRule::new("input"))
            .with_attribute(BoundAttributeDescriptor::new("asp-for", "For", "ModelExpression"));
        let document = generate_with(
            "@addTagHelper *, Mvc\n<input asp-for=\"Name\" class=\"big\" />",
            "Index.cshtml",
            legacy(),
            vec![input],
        );
        let code = &document.generated_code;
        assert!(code.contains("__Mvc_InputTagHelper = CreateTagHelper<global::Mvc.InputTagHelper>();"));
        assert!(code.contains("TagMode.SelfClosing"));
        assert!(code.contains("__Mvc_InputTagHelper.For = Name;"));
        assert!(code.contains("AddHtmlAttribute(\"class\", \"big\""));
        assert!(code.contains("private global::Mvc.InputTagHelper __Mvc_InputTagHelper;"));
        assert_eq!(mapped_texts(&document), vec!["Name"]);
    }

    // ===== components =====

    #[test]
    fn test_component_shell() {
        let document = generate(
            "@page \"/counter\"\n@implements IDisposable\n<h1>@count</h1>\n@code {\n    int count;\n}\n",
            "Pages/Counter.razor",
            component(),
        );
        let code = &document.generated_code;
        assert!(code.contains("namespace App.Pages"));
        assert!(code.contains("using Microsoft.AspNetCore.Components;"));
        assert!(code.contains("[global::Microsoft.AspNetCore.Components.RouteAttribute(\"/counter\")]"));
        assert!(code.contains(
            "public partial class Counter : global::Microsoft.AspNetCore.Components.ComponentBase, IDisposable"
        ));
        assert!(code.contains("__builder.AddMarkupContent(0, \"<h1>\");"));
        assert!(code.contains("__builder.AddContent(1, count);"));
        assert_eq!(
            mapped_texts(&document),
            vec!["\"/counter\"", "IDisposable", "count", "\n    int count;\n"]
        );
    }

    #[test]
    fn test_component_usage_and_event_handler() {
        let counter = TagHelperDescriptor::new(TagHelperKind::Component, "App.Shared.Counter", "App")
            .with_rule(TagMatchingRule::new("Counter"))
            .with_attribute(BoundAttributeDescriptor::new("Start", "Start", "System.Int32"))
            .with_attribute(BoundAttributeDescriptor::new("Title", "Title", "System.String"));
        let document = generate_with(
            "@using App.Shared\n<Counter Start=\"5\" Title=\"Hi\" />\n<button @onclick=\"Go\">x</button>",
            "Pages/Home.razor",
            component(),
            vec![counter],
        );
        let code = &document.generated_code;
        assert!(code.contains("__builder.OpenComponent<global::App.Shared.Counter>(0);"));
        assert!(code.contains("__builder.AddAttribute(1, \"Start\", 5);"));
        assert!(code.contains("__builder.AddAttribute(2, \"Title\", \"Hi\");"));
        assert!(code.contains("__builder.CloseComponent();"));
        assert!(code.contains("__builder.OpenElement("));
        assert!(code.contains("EventCallback.Factory.Create(this, Go)"));
        assert_eq!(mapped_texts(&document), vec!["App.Shared", "5", "Go"]);
    }

    #[test]
    fn test_component_child_content() {
        let grid = TagHelperDescriptor::new(TagHelperKind::Component, "App.Grid", "App")
            .with_rule(TagMatchingRule::new("Grid"));
        let header = TagHelperDescriptor::new(TagHelperKind::ChildContent, "App.Grid.Header", "App")
            .with_rule(TagMatchingRule::new("Header").with_parent_tag("Grid"));
        let document = generate_with(
            "<Grid><Header><b>@title</b></Header></Grid>",
            "Home.razor",
            component(),
            vec![grid, header],
        );
        let code = &document.generated_code;
        assert!(code.contains("__builder.AddAttribute(1, \"Header\", (global::Microsoft.AspNetCore.Components.RenderFragment)((__builder2) => {"));
        assert!(code.contains("__builder2.AddContent("));
        assert!(!code.contains("\"ChildContent\""));
    }

    #[test]
    fn test_mappings_are_sorted_and_disjoint() {
        let text = "@using System\n@{ var a = 1; }\n<p>@a @(a + 1)</p>\n@if (a > 0) { <b>@a</b> }";
        let document = generate(text, "Index.cshtml", legacy());
        assert!(document.source_mappings.len() >= 5);
        for pair in document.source_mappings.windows(2) {
            assert!(pair[0].generated_span.end_index() <= pair[1].generated_span.absolute_index);
        }
    }
}
