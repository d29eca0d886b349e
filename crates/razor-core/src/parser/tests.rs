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

use crate::options::{FileKind, RazorEngineOptions};
use crate::source::RazorSourceDocument;
use crate::syntax::{ChunkGenerator, DirectiveKind, RazorSyntaxTree, SyntaxNode, SyntaxNodeKind};
use std::sync::Arc;

fn parse_as(text: &str, file_kind: FileKind) -> RazorSyntaxTree {
    let source = Arc::new(RazorSourceDocument::new(text, "Test.cshtml"));
    let options = RazorEngineOptions::builder().file_kind(file_kind).build();
    let tree = RazorSyntaxTree::parse(source, &options);
    assert_eq!(tree.root().full_text(), text, "tree must cover the input");
    tree
}

fn parse(text: &str) -> RazorSyntaxTree {
    parse_as(text, FileKind::Legacy)
}

fn nodes_of(tree: &RazorSyntaxTree, kind: SyntaxNodeKind) -> Vec<&SyntaxNode> {
    tree.descendants().filter(|n| n.kind() == kind).collect()
}

fn texts_of(tree: &RazorSyntaxTree, kind: SyntaxNodeKind) -> Vec<String> {
    nodes_of(tree, kind).iter().map(|n| n.full_text()).collect()
}

fn diagnostic_ids(tree: &RazorSyntaxTree) -> Vec<&'static str> {
    tree.diagnostics().iter().map(|d| d.id).collect()
}

// ===== markup =====

#[test]
fn test_plain_markup() {
    let tree = parse("<p class=\"a\">Hello</p>");
    assert!(tree.diagnostics().is_empty());
    let elements = nodes_of(&tree, SyntaxNodeKind::MarkupElement);
    assert_eq!(elements.len(), 1);
    assert_eq!(texts_of(&tree, SyntaxNodeKind::MarkupStartTag), vec!["<p class=\"a\">"]);
    assert_eq!(texts_of(&tree, SyntaxNodeKind::MarkupEndTag), vec!["</p>"]);
}

#[test]
fn test_nested_and_void_elements() {
    let tree = parse("<div><br><img src=\"x\" /><span>t</span></div>");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).len(), 4);
}

#[test]
fn test_unclosed_element_warns() {
    let tree = parse("<div><p>text</div>");
    let ids = diagnostic_ids(&tree);
    assert_eq!(ids, vec!["RZ1006"]);
    assert!(!tree.diagnostics()[0].is_error());
}

#[test]
fn test_unexpected_end_tag_warns() {
    let tree = parse("text</section>");
    assert_eq!(diagnostic_ids(&tree), vec!["RZ1007"]);
}

#[test]
fn test_html_comment_is_text() {
    let tree = parse("<!-- <p>@x</p> -->");
    assert!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).is_empty());
    assert!(nodes_of(&tree, SyntaxNodeKind::CSharpImplicitExpression).is_empty());
}

#[test]
fn test_escaped_transition() {
    let tree = parse("<p>@@Name</p>");
    assert!(nodes_of(&tree, SyntaxNodeKind::CSharpCodeBlock).is_empty());
    assert_eq!(texts_of(&tree, SyntaxNodeKind::MarkupEphemeralTextLiteral), vec!["@"]);
}

#[test]
fn test_email_address_is_text() {
    let tree = parse("mail user@example.com now");
    assert!(nodes_of(&tree, SyntaxNodeKind::CSharpCodeBlock).is_empty());
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn test_razor_comment() {
    let tree = parse("a @* comment *@ b");
    assert_eq!(texts_of(&tree, SyntaxNodeKind::RazorComment), vec!["@* comment *@"]);
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn test_unterminated_razor_comment() {
    let tree = parse("a @* never closed");
    assert_eq!(diagnostic_ids(&tree), vec!["RZ1002"]);
}

// ===== expressions =====

#[test]
fn test_implicit_expression() {
    let tree = parse("<p>@Name</p>");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["Name"]);
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpTransition), vec!["@"]);
}

#[test]
fn test_implicit_expression_member_chain() {
    let tree = parse("@a.b(c, (d))[e]?.f!.g done");
    assert_eq!(
        texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral),
        vec!["a.b(c, (d))[e]?.f!.g"]
    );
}

#[test]
fn test_implicit_expression_stops_at_trailing_dot() {
    let tree = parse("Hi @Name. Bye");
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["Name"]);
}

#[test]
fn test_await_expression() {
    let tree = parse("@await Component.InvokeAsync(\"x\")");
    assert_eq!(
        texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral),
        vec!["await Component.InvokeAsync(\"x\")"]
    );
}

#[test]
fn test_explicit_expression() {
    let tree = parse("<p>@(1 + (2 * 3))</p>");
    assert!(tree.diagnostics().is_empty());
    let explicit = nodes_of(&tree, SyntaxNodeKind::CSharpExplicitExpression);
    assert_eq!(explicit.len(), 1);
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["1 + (2 * 3)"]);
    assert_eq!(texts_of(&tree, SyntaxNodeKind::RazorMetaCode), vec!["(", ")"]);
}

#[test]
fn test_unterminated_explicit_expression() {
    let tree = parse("@(1 + 2");
    assert_eq!(diagnostic_ids(&tree), vec!["RZ1003"]);
}

#[test]
fn test_transition_followed_by_whitespace() {
    let tree = parse("@ x");
    assert_eq!(diagnostic_ids(&tree), vec!["RZ1008"]);
}

// ===== code blocks =====

#[test]
fn test_statement_block_with_markup() {
    let tree = parse("@{ var x = 1; <p>@x</p> }");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(nodes_of(&tree, SyntaxNodeKind::CSharpStatement).len(), 1);
    assert_eq!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).len(), 1);
    let literals = texts_of(&tree, SyntaxNodeKind::CSharpStatementLiteral);
    assert_eq!(literals[0], " var x = 1; ");
}

#[test]
fn test_statement_block_comparison_is_code() {
    let tree = parse("@{ var ok = a < b; }");
    assert!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).is_empty());
}

#[test]
fn test_text_tag_is_ephemeral() {
    let tree = parse("@{ <text>plain</text> }");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(
        texts_of(&tree, SyntaxNodeKind::MarkupEphemeralTextLiteral),
        vec!["<text>", "</text>"]
    );
}

#[test]
fn test_line_markup() {
    let tree = parse("@{\n    @: Hello @name\n}");
    assert!(tree.diagnostics().is_empty());
    let meta = texts_of(&tree, SyntaxNodeKind::RazorMetaCode);
    assert!(meta.contains(&"@:".to_string()));
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["name"]);
}

#[test]
fn test_unterminated_statement_block() {
    let tree = parse("@{ var x = 1;");
    assert_eq!(diagnostic_ids(&tree), vec!["RZ1003"]);
}

#[test]
fn test_if_else_chain() {
    let tree = parse("@if (a) { <b>x</b> } else if (c) { <i>y</i> } else { <u>z</u> }\n<p></p>");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).len(), 4);
    let text = texts_of(&tree, SyntaxNodeKind::MarkupTextLiteral).concat();
    assert!(!text.contains("else"));
}

#[test]
fn test_foreach_block() {
    let tree = parse("@foreach (var item in Items) { <li>@item</li> }");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["item"]);
}

#[test]
fn test_try_catch_finally() {
    let tree = parse("@try { A(); } catch (Exception e) { B(); } finally { C(); }");
    assert!(tree.diagnostics().is_empty());
    let code = texts_of(&tree, SyntaxNodeKind::CSharpStatementLiteral).concat();
    assert!(code.contains("finally"));
}

#[test]
fn test_do_while() {
    let tree = parse("@do { i++; } while (i < 3);\nafter");
    let code = texts_of(&tree, SyntaxNodeKind::CSharpStatementLiteral).concat();
    assert!(code.ends_with("(i < 3);"));
}

#[test]
fn test_using_statement_vs_directive() {
    let statement = parse("@using (var s = Open()) { }");
    assert!(statement.directives().next().is_none());

    let directive = parse("@using System.Text\n");
    let (_, info) = directive.directives().next().unwrap();
    assert_eq!(info.kind, DirectiveKind::Using);
}

// ===== directives =====

#[test]
fn test_using_directive_chunk_generators() {
    let tree = parse("@using System.Text\n@using static System.Math\n@using Json = System.Text.Json;\n");
    let imports: Vec<_> = tree
        .chunk_generators()
        .map(|(_, generator)| generator.clone())
        .collect();
    assert_eq!(
        imports,
        vec![
            ChunkGenerator::AddImport {
                namespace: "System.Text".into(),
                is_static: false,
                alias: None
            },
            ChunkGenerator::AddImport {
                namespace: "System.Math".into(),
                is_static: true,
                alias: None
            },
            ChunkGenerator::AddImport {
                namespace: "System.Text.Json".into(),
                is_static: false,
                alias: Some("Json".into())
            },
        ]
    );
}

#[test]
fn test_model_directive_value() {
    let tree = parse("@model List<Item>\n<p></p>");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(tree.last_directive_value(DirectiveKind::Model), Some("List<Item>"));
}

#[test]
fn test_inject_directive_values() {
    let tree = parse("@inject IService<int> Service\n");
    let (_, info) = tree.directives().next().unwrap();
    assert_eq!(info.value(0).map(|v| v.text.as_str()), Some("IService<int>"));
    assert_eq!(info.value(1).map(|v| v.text.as_str()), Some("Service"));
}

#[test]
fn test_directive_missing_value() {
    let tree = parse("@model\n");
    assert_eq!(diagnostic_ids(&tree), vec!["RZ1004"]);
}

#[test]
fn test_add_tag_helper_directive() {
    let tree = parse("@addTagHelper *, Microsoft.AspNetCore.Mvc.TagHelpers\n");
    let generators: Vec<_> = tree.chunk_generators().collect();
    assert_eq!(generators.len(), 1);
    match generators[0].1 {
        ChunkGenerator::AddTagHelper(text) => {
            assert_eq!(text.lookup_text, "*, Microsoft.AspNetCore.Mvc.TagHelpers");
            assert_eq!(text.type_pattern.as_deref(), Some("*"));
        }
        other => panic!("unexpected generator {other:?}"),
    }
}

#[test]
fn test_tag_helper_prefix_directive() {
    let tree = parse("@tagHelperPrefix th:\n");
    match tree.chunk_generators().next().map(|(_, g)| g) {
        Some(ChunkGenerator::TagHelperPrefix { prefix, diagnostics }) => {
            assert_eq!(prefix, "th:");
            assert!(diagnostics.is_empty());
        }
        other => panic!("unexpected generator {other:?}"),
    }

    let invalid = parse("@tagHelperPrefix \"th!\"\n");
    let diagnostics = invalid.chunk_generators().next().map(|(_, g)| g.diagnostics().to_vec());
    assert_eq!(diagnostics.map(|d| d.len()), Some(1));
}

#[test]
fn test_page_directive_optional_route() {
    let bare = parse("@page\n<h1></h1>");
    assert!(bare.diagnostics().is_empty());
    let routed = parse("@page \"/counter\"\n");
    assert_eq!(routed.last_directive_value(DirectiveKind::Page), Some("\"/counter\""));
}

#[test]
fn test_code_directive_in_component() {
    let tree = parse_as("<h1>@count</h1>\n@code {\n    int count;\n}\n", FileKind::Component);
    assert!(tree.diagnostics().is_empty());
    let (_, info) = tree.directives().next().unwrap();
    assert_eq!(info.kind, DirectiveKind::Code);
}

#[test]
fn test_code_is_not_a_directive_in_legacy_documents() {
    let tree = parse("@code");
    assert!(tree.directives().next().is_none());
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["code"]);
}

#[test]
fn test_section_directive() {
    let tree = parse("@section Scripts {\n<script>var o = { a: 1 };</script>\n}\n<p></p>");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(tree.last_directive_value(DirectiveKind::Section), Some("Scripts"));
    assert_eq!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).len(), 2);
}

#[test]
fn test_component_directive_attribute_stays_markup() {
    let tree = parse_as("<button @onclick=\"Go\">x</button>", FileKind::Component);
    assert!(nodes_of(&tree, SyntaxNodeKind::CSharpCodeBlock).is_empty());
}

#[test]
fn test_attribute_value_expression() {
    let tree = parse("<a href=\"@Url\">x</a>");
    assert_eq!(texts_of(&tree, SyntaxNodeKind::CSharpExpressionLiteral), vec!["Url"]);
    assert_eq!(nodes_of(&tree, SyntaxNodeKind::MarkupElement).len(), 1);
}
