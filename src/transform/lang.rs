use std::path::Path;

/// Languages the transformer understands. Anything else passes through
/// untouched (no comment stripping, no compression).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    JavaScript,
    TypeScript,
    Tsx,
    Python,
    Go,
    Rust,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Scala,
    Elixir,
    Solidity,
    Vue,
    Css,
    Xml,
    Html,
}

impl Lang {
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        let lang = match ext.as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            "py" | "pyi" => Self::Python,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "java" => Self::Java,
            "c" | "h" => Self::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "cs" => Self::CSharp,
            "rb" | "rake" => Self::Ruby,
            "php" => Self::Php,
            "swift" => Self::Swift,
            "kt" | "kts" => Self::Kotlin,
            "scala" | "sc" => Self::Scala,
            "ex" | "exs" => Self::Elixir,
            "sol" => Self::Solidity,
            "vue" => Self::Vue,
            "css" | "scss" | "less" => Self::Css,
            "xml" | "svg" | "xhtml" => Self::Xml,
            "html" | "htm" => Self::Html,
            _ => return None,
        };
        Some(lang)
    }

    /// Comment grammar for the stripping stage; `None` when the language has
    /// no comment syntax we remove (or stripping would be unsafe).
    pub fn comment_syntax(&self) -> Option<CommentSyntax> {
        let c_like = CommentSyntax {
            line: &["//"],
            block: &[("/*", "*/")],
            string_delimiters: &['"', '\''],
        };
        match self {
            Self::JavaScript | Self::TypeScript | Self::Tsx => Some(CommentSyntax {
                line: &["//"],
                block: &[("/*", "*/")],
                string_delimiters: &['"', '\'', '`'],
            }),
            Self::Go | Self::Rust | Self::Java | Self::C | Self::Cpp | Self::CSharp
            | Self::Swift | Self::Kotlin | Self::Scala | Self::Solidity => Some(c_like),
            Self::Python | Self::Elixir => Some(CommentSyntax {
                line: &["#"],
                block: &[],
                string_delimiters: &['"', '\''],
            }),
            Self::Ruby => Some(CommentSyntax {
                line: &["#"],
                block: &[("=begin", "=end")],
                string_delimiters: &['"', '\''],
            }),
            Self::Php => Some(CommentSyntax {
                line: &["//", "#"],
                block: &[("/*", "*/")],
                string_delimiters: &['"', '\''],
            }),
            Self::Css => Some(CommentSyntax {
                line: &[],
                block: &[("/*", "*/")],
                string_delimiters: &['"', '\''],
            }),
            Self::Xml | Self::Html | Self::Vue => Some(CommentSyntax {
                line: &[],
                block: &[("<!--", "-->")],
                string_delimiters: &['"', '\''],
            }),
        }
    }
}

/// How comments are written in one language family.
#[derive(Debug, Clone, Copy)]
pub struct CommentSyntax {
    pub line: &'static [&'static str],
    pub block: &'static [(&'static str, &'static str)],
    pub string_delimiters: &'static [char],
}

/// Fence language hint for Markdown code blocks, derived from the extension.
pub fn fence_hint(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "py" | "pyi" => "python",
        "go" => "go",
        "rs" => "rust",
        "java" => "java",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
        "cs" => "csharp",
        "rb" | "rake" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "scala" | "sc" => "scala",
        "ex" | "exs" => "elixir",
        "sol" => "solidity",
        "vue" => "vue",
        "css" => "css",
        "scss" => "scss",
        "less" => "less",
        "xml" | "svg" => "xml",
        "html" | "htm" => "html",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "sh" | "bash" => "bash",
        "sql" => "sql",
        "dockerfile" => "dockerfile",
        _ => "",
    }
}
