use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::lang::Lang;

/// Separator emitted between non-adjacent kept chunks.
const CHUNK_SEPARATOR: &str = "⋮----";

/// How a captured definition node is reduced to its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureStyle {
    /// Keep from the node start to the line before its `body` field starts
    /// (whole node when there is no body field).
    Generic,
    /// Like `Generic`, plus an immediately-following triple-quoted docstring.
    Python,
    /// Keep only the node's first line (CSS selectors, at-rules).
    FirstLine,
}

struct CompiledLang {
    language: Language,
    query: Query,
    style: SignatureStyle,
}

const RUST_QUERY: &str = r"
(use_declaration) @import
(line_comment) @comment
(block_comment) @comment
(function_item) @definition.function
(struct_item) @definition.struct
(enum_item) @definition.enum
(trait_item) @definition.interface
(impl_item) @definition.class
(mod_item) @definition.module
(type_item) @definition.type
";

const PYTHON_QUERY: &str = r"
(import_statement) @import
(import_from_statement) @import
(comment) @comment
(decorator) @definition.decorator
(class_definition) @definition.class
(function_definition) @definition.function
";

const JAVASCRIPT_QUERY: &str = r"
(import_statement) @import
(export_statement (export_clause)) @import
(comment) @comment
(class_declaration) @definition.class
(function_declaration) @definition.function
(generator_function_declaration) @definition.function
(method_definition) @definition.method
(lexical_declaration (variable_declarator value: (arrow_function) @definition.function))
";

const TYPESCRIPT_QUERY: &str = r"
(import_statement) @import
(export_statement (export_clause)) @import
(comment) @comment
(class_declaration) @definition.class
(abstract_class_declaration) @definition.class
(function_declaration) @definition.function
(generator_function_declaration) @definition.function
(method_definition) @definition.method
(interface_declaration) @definition.interface
(type_alias_declaration) @definition.type
(enum_declaration) @definition.enum
(lexical_declaration (variable_declarator value: (arrow_function) @definition.function))
";

const GO_QUERY: &str = r"
(package_clause) @definition.module
(import_declaration) @import
(comment) @comment
(function_declaration) @definition.function
(method_declaration) @definition.method
(type_declaration) @definition.type
";

const JAVA_QUERY: &str = r"
(package_declaration) @definition.module
(import_declaration) @import
(line_comment) @comment
(block_comment) @comment
(class_declaration) @definition.class
(interface_declaration) @definition.interface
(enum_declaration) @definition.enum
(method_declaration) @definition.method
(constructor_declaration) @definition.method
";

const C_QUERY: &str = r"
(preproc_include) @import
(comment) @comment
(function_definition) @definition.function
(struct_specifier) @definition.struct
(enum_specifier) @definition.enum
(union_specifier) @definition.struct
(type_definition) @definition.type
";

const CPP_QUERY: &str = r"
(preproc_include) @import
(comment) @comment
(function_definition) @definition.function
(class_specifier) @definition.class
(struct_specifier) @definition.struct
(enum_specifier) @definition.enum
(union_specifier) @definition.struct
(type_definition) @definition.type
(namespace_definition) @definition.module
";

const C_SHARP_QUERY: &str = r"
(using_directive) @import
(comment) @comment
(namespace_declaration) @definition.module
(class_declaration) @definition.class
(interface_declaration) @definition.interface
(struct_declaration) @definition.struct
(enum_declaration) @definition.enum
(method_declaration) @definition.method
(constructor_declaration) @definition.method
";

const RUBY_QUERY: &str = r"
(comment) @comment
(module) @definition.module
(class) @definition.class
(method) @definition.method
(singleton_method) @definition.method
";

const PHP_QUERY: &str = r"
(namespace_definition) @definition.module
(namespace_use_declaration) @import
(comment) @comment
(class_declaration) @definition.class
(interface_declaration) @definition.interface
(trait_declaration) @definition.class
(function_definition) @definition.function
(method_declaration) @definition.method
";

const CSS_QUERY: &str = r"
(comment) @comment
(rule_set) @definition
(media_statement) @definition
(import_statement) @definition
(keyframes_statement) @definition
(supports_statement) @definition
";

fn compile(language: Language, query_src: &str, style: SignatureStyle) -> Result<CompiledLang, String> {
    let query = Query::new(&language, query_src).map_err(|e| e.to_string())?;
    Ok(CompiledLang {
        language,
        query,
        style,
    })
}

/// Language handles and compiled queries are shared, immutable, and built
/// lazily per language on first use.
static REGISTRY: LazyLock<HashMap<Lang, Result<CompiledLang, String>>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert(
        Lang::Rust,
        compile(tree_sitter_rust::LANGUAGE.into(), RUST_QUERY, SignatureStyle::Generic),
    );
    map.insert(
        Lang::Python,
        compile(tree_sitter_python::LANGUAGE.into(), PYTHON_QUERY, SignatureStyle::Python),
    );
    map.insert(
        Lang::JavaScript,
        compile(
            tree_sitter_javascript::LANGUAGE.into(),
            JAVASCRIPT_QUERY,
            SignatureStyle::Generic,
        ),
    );
    map.insert(
        Lang::TypeScript,
        compile(
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            TYPESCRIPT_QUERY,
            SignatureStyle::Generic,
        ),
    );
    map.insert(
        Lang::Tsx,
        compile(
            tree_sitter_typescript::LANGUAGE_TSX.into(),
            TYPESCRIPT_QUERY,
            SignatureStyle::Generic,
        ),
    );
    map.insert(
        Lang::Go,
        compile(tree_sitter_go::LANGUAGE.into(), GO_QUERY, SignatureStyle::Generic),
    );
    map.insert(
        Lang::Java,
        compile(tree_sitter_java::LANGUAGE.into(), JAVA_QUERY, SignatureStyle::Generic),
    );
    map.insert(
        Lang::C,
        compile(tree_sitter_c::LANGUAGE.into(), C_QUERY, SignatureStyle::Generic),
    );
    map.insert(
        Lang::Cpp,
        compile(tree_sitter_cpp::LANGUAGE.into(), CPP_QUERY, SignatureStyle::Generic),
    );
    map.insert(
        Lang::CSharp,
        compile(
            tree_sitter_c_sharp::LANGUAGE.into(),
            C_SHARP_QUERY,
            SignatureStyle::Generic,
        ),
    );
    map.insert(
        Lang::Ruby,
        compile(tree_sitter_ruby::LANGUAGE.into(), RUBY_QUERY, SignatureStyle::FirstLine),
    );
    map.insert(
        Lang::Php,
        compile(tree_sitter_php::LANGUAGE_PHP.into(), PHP_QUERY, SignatureStyle::Generic),
    );
    map.insert(
        Lang::Css,
        compile(tree_sitter_css::LANGUAGE.into(), CSS_QUERY, SignatureStyle::FirstLine),
    );
    map
});

/// Outcome of a compression attempt.
pub enum Compressed {
    /// Compression produced structural output.
    Done(String),
    /// No grammar for this language, or the parse came back unusable; the
    /// caller keeps the original content.
    Unsupported,
}

/// Compress `content` down to definitions, imports, and comments.
///
/// Returns `Err` only for internal failures (query compilation); a file the
/// parser cannot make sense of falls back to `Unsupported`.
pub fn compress_content(lang: Lang, content: &str) -> Result<Compressed, String> {
    if matches!(lang, Lang::Xml | Lang::Html | Lang::Vue) {
        return Ok(Compressed::Done(markup_outline(content)));
    }

    let Some(compiled) = REGISTRY.get(&lang) else {
        return Ok(Compressed::Unsupported);
    };
    let compiled = match compiled {
        Ok(c) => c,
        Err(e) => return Err(e.clone()),
    };

    let mut parser = Parser::new();
    parser
        .set_language(&compiled.language)
        .map_err(|e| e.to_string())?;
    let Some(tree) = parser.parse(content, None) else {
        return Ok(Compressed::Unsupported);
    };
    let root = tree.root_node();
    // A root that is itself an error means the parser got nothing usable.
    if root.is_error() {
        return Ok(Compressed::Unsupported);
    }

    let lines: Vec<&str> = content.lines().collect();
    let mut kept_rows: BTreeSet<usize> = BTreeSet::new();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&compiled.query, root, content.as_bytes());
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let name = &compiled.query.capture_names()[capture.index as usize];
            let node = capture.node;
            if name.starts_with("import") || name.starts_with("comment") {
                keep_rows(&mut kept_rows, node.start_position().row, node.end_position().row);
            } else {
                keep_signature(&mut kept_rows, node, compiled.style);
            }
        }
    }

    let mut out = String::new();
    let mut previous: Option<usize> = None;
    for row in kept_rows {
        let Some(line) = lines.get(row) else { continue };
        if let Some(prev) = previous {
            out.push('\n');
            if row > prev + 1 {
                out.push_str(CHUNK_SEPARATOR);
                out.push('\n');
            }
        }
        out.push_str(line);
        previous = Some(row);
    }
    Ok(Compressed::Done(out))
}

fn keep_rows(rows: &mut BTreeSet<usize>, start: usize, end: usize) {
    for row in start..=end {
        rows.insert(row);
    }
}

fn keep_signature(rows: &mut BTreeSet<usize>, node: Node, style: SignatureStyle) {
    let start = node.start_position().row;
    if style == SignatureStyle::FirstLine {
        rows.insert(start);
        return;
    }
    match node.child_by_field_name("body") {
        Some(body) => {
            let body_row = body.start_position().row;
            let sig_end = if body_row > start { body_row - 1 } else { start };
            keep_rows(rows, start, sig_end);
            if style == SignatureStyle::Python
                && let Some(doc) = python_docstring(body)
            {
                keep_rows(rows, doc.start_position().row, doc.end_position().row);
            }
        }
        None => keep_rows(rows, start, node.end_position().row),
    }
}

/// The docstring of a Python `block`: a first statement that is a bare string.
fn python_docstring<'a>(body: Node<'a>) -> Option<Node<'a>> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let inner = first.named_child(0)?;
    (inner.kind() == "string").then_some(first)
}

/// Structural outline for markup: one line per opening tag, `<name` indented
/// two spaces per depth. This is the compression output, not a document.
fn markup_outline(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out: Vec<String> = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &content[i..];
        if rest.starts_with("<!--") {
            i = content[i..].find("-->").map(|p| i + p + 3).unwrap_or(content.len());
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            i = content[i..].find('>').map(|p| i + p + 1).unwrap_or(content.len());
            continue;
        }
        if rest.starts_with("</") {
            depth = depth.saturating_sub(1);
            i = content[i..].find('>').map(|p| i + p + 1).unwrap_or(content.len());
            continue;
        }
        let name: String = rest[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
            .collect();
        if name.is_empty() {
            i += 1;
            continue;
        }
        out.push(format!("{}<{}", "  ".repeat(depth), name));
        let tag_end = content[i..].find('>').map(|p| i + p).unwrap_or(content.len());
        let self_closing = content[i..tag_end].ends_with('/')
            || VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str());
        if !self_closing {
            depth += 1;
        }
        i = (tag_end + 1).min(content.len());
    }

    out.join("\n")
}

/// HTML elements that never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn compress_ok(lang: Lang, content: &str) -> String {
        match compress_content(lang, content).unwrap() {
            Compressed::Done(s) => s,
            Compressed::Unsupported => panic!("expected compression for {lang:?}"),
        }
    }

    #[test]
    fn python_keeps_signature_and_docstring() {
        let src = "import os\nclass C:\n    \"\"\"doc.\"\"\"\n    def f(self):\n        return 1\n";
        let out = compress_ok(Lang::Python, src);
        assert!(out.contains("import os"));
        assert!(out.contains("class C:"));
        assert!(out.contains("\"\"\"doc.\"\"\""));
        assert!(out.contains("def f(self):"));
        assert!(!out.contains("return 1"));
    }

    #[test]
    fn python_multiline_signature_kept() {
        let src = "def f(\n    a,\n    b,\n):\n    return a + b\n";
        let out = compress_ok(Lang::Python, src);
        assert!(out.contains("def f("));
        assert!(out.contains("):"));
        assert!(!out.contains("return a + b"));
    }

    #[test]
    fn rust_keeps_signatures_drops_bodies() {
        let src = "use std::io;\n\npub fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n\nstruct Point {\n    x: i32,\n}\n";
        let out = compress_ok(Lang::Rust, src);
        assert!(out.contains("use std::io;"));
        assert!(out.contains("pub fn add(a: i32, b: i32) -> i32 {"));
        assert!(!out.contains("a + b\n}"));
        assert!(out.contains("struct Point {"));
        assert!(!out.contains("x: i32,"));
    }

    #[test]
    fn go_keeps_signatures_only() {
        let src = "package main\n\nimport \"fmt\"\n\nfunc Hello(name string) string {\n\treturn \"hi \" + name\n}\n";
        let out = compress_ok(Lang::Go, src);
        assert!(out.contains("package main"));
        assert!(out.contains("import \"fmt\""));
        assert!(out.contains("func Hello(name string) string {"));
        assert!(!out.contains("return"));
    }

    #[test]
    fn javascript_keeps_class_and_function_heads() {
        let src = "import x from 'x';\n\nclass Widget {\n  render() {\n    return 1;\n  }\n}\n\nconst go = (a) => {\n  return a;\n};\n";
        let out = compress_ok(Lang::JavaScript, src);
        assert!(out.contains("import x from 'x';"));
        assert!(out.contains("class Widget {"));
        assert!(out.contains("render() {"));
        assert!(!out.contains("return 1;"));
    }

    #[test]
    fn typescript_keeps_interface() {
        let src = "export interface Shape {\n  area(): number;\n}\n\nconst f = (x: number) => {\n  return x * 2;\n};\n";
        let out = compress_ok(Lang::TypeScript, src);
        assert!(out.contains("interface Shape"));
        assert!(!out.contains("return x * 2;"));
    }

    #[test]
    fn css_keeps_selector_first_lines() {
        let src = ".button {\n  color: red;\n  border: none;\n}\n\n@media (max-width: 600px) {\n  .button { color: blue; }\n}\n";
        let out = compress_ok(Lang::Css, src);
        assert!(out.contains(".button {"));
        assert!(!out.contains("border: none;"));
        assert!(out.contains("@media (max-width: 600px) {"));
    }

    #[test]
    fn markup_outline_indents_by_depth() {
        let src = "<html>\n<body>\n<div class=\"x\">\n<span>text</span>\n<img src=\"a.png\"/>\n</div>\n</body>\n</html>\n";
        let out = compress_ok(Lang::Html, src);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "<html");
        assert_eq!(lines[1], "  <body");
        assert_eq!(lines[2], "    <div");
        assert_eq!(lines[3], "      <span");
        assert_eq!(lines[4], "      <img");
    }

    #[test]
    fn markup_outline_skips_comments_and_doctype() {
        let src = "<!DOCTYPE html>\n<!-- note -->\n<html></html>\n";
        let out = compress_ok(Lang::Xml, src);
        assert_eq!(out, "<html");
    }

    #[test]
    fn unsupported_language_falls_back() {
        let result = compress_content(Lang::Swift, "func f() {}").unwrap();
        assert!(matches!(result, Compressed::Unsupported));
    }

    #[test]
    fn chunk_separator_between_gaps() {
        let src = "import os\n\n\nx = 1\n\n\ndef f():\n    return 2\n";
        let out = compress_ok(Lang::Python, src);
        assert!(out.contains(CHUNK_SEPARATOR));
    }

    #[test]
    fn empty_content_compresses_to_empty() {
        let out = compress_ok(Lang::Python, "");
        assert!(out.is_empty());
    }

    #[test]
    fn ruby_keeps_module_class_method_lines() {
        let src = "module M\n  class C\n    def go(x)\n      x + 1\n    end\n  end\nend\n";
        let out = compress_ok(Lang::Ruby, src);
        assert!(out.contains("module M"));
        assert!(out.contains("class C"));
        assert!(out.contains("def go(x)"));
        assert!(!out.contains("x + 1"));
    }
}
