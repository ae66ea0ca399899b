use super::lang::CommentSyntax;

/// Remove single- and multi-line comments using language-aware rules.
///
/// String literals are respected: comment markers inside strings survive.
/// Block comments are replaced by the newlines they spanned so line counts
/// stay stable; `removeEmptyLines` cleans the leftovers when requested.
/// A first-line shebang is never treated as a comment.
pub fn strip_comments(content: &str, syntax: &CommentSyntax) -> String {
    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut i = 0;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut at_line_start = true;

    if content.starts_with("#!")
        && let Some(end) = content.find('\n')
    {
        out.push_str(&content[..=end]);
        i = end + 1;
    }

    while i < bytes.len() {
        let rest = &content[i..];
        let c = rest.chars().next().expect("non-empty remainder");

        if let Some(delim) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == delim {
                in_string = None;
            }
            out.push(c);
            i += c.len_utf8();
            at_line_start = c == '\n';
            continue;
        }

        if let Some((open, close)) = syntax
            .block
            .iter()
            .find(|(open, _)| {
                rest.starts_with(open) && (!open.starts_with('=') || at_line_start)
            })
            .copied()
        {
            let body_start = i + open.len();
            let end = content[body_start..]
                .find(close)
                .map(|p| body_start + p + close.len())
                .unwrap_or(content.len());
            content[i..end]
                .chars()
                .filter(|&c| c == '\n')
                .for_each(|c| out.push(c));
            at_line_start = content[i..end].contains('\n');
            i = end;
            continue;
        }

        if let Some(open) = syntax.line.iter().find(|open| rest.starts_with(*open)) {
            let skip = content[i + open.len()..]
                .find('\n')
                .map(|p| i + open.len() + p)
                .unwrap_or(content.len());
            i = skip;
            continue;
        }

        if syntax.string_delimiters.contains(&c) {
            in_string = Some(c);
        }
        out.push(c);
        i += c.len_utf8();
        at_line_start = c == '\n';
    }

    // Line-comment removal leaves dangling indentation; trim line ends.
    let mut cleaned: String = out
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    if out.ends_with('\n') {
        cleaned.push('\n');
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::lang::Lang;

    fn rust_syntax() -> CommentSyntax {
        Lang::Rust.comment_syntax().unwrap()
    }

    fn python_syntax() -> CommentSyntax {
        Lang::Python.comment_syntax().unwrap()
    }

    #[test]
    fn strips_line_comments() {
        let src = "fn main() { // entry\n    let x = 1; // one\n}\n";
        let out = strip_comments(src, &rust_syntax());
        assert_eq!(out, "fn main() {\n    let x = 1;\n}\n");
    }

    #[test]
    fn strips_block_comments_keeping_lines() {
        let src = "a();\n/* multi\n   line */\nb();\n";
        let out = strip_comments(src, &rust_syntax());
        assert_eq!(out, "a();\n\n\nb();\n");
    }

    #[test]
    fn comment_marker_inside_string_survives() {
        let src = "let url = \"https://example.com\";\n";
        let out = strip_comments(src, &rust_syntax());
        assert_eq!(out, src);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let src = "let s = \"quote \\\" // not a comment\";\n";
        let out = strip_comments(src, &rust_syntax());
        assert_eq!(out, src);
    }

    #[test]
    fn python_hash_comments() {
        let src = "x = 1  # set x\n# full line\ny = 2\n";
        let out = strip_comments(src, &python_syntax());
        assert_eq!(out, "x = 1\n\ny = 2\n");
    }

    #[test]
    fn python_shebang_preserved() {
        let src = "#!/usr/bin/env python\n# real comment\nprint(1)\n";
        let out = strip_comments(src, &python_syntax());
        assert_eq!(out, "#!/usr/bin/env python\n\nprint(1)\n");
    }

    #[test]
    fn hash_inside_string_survives() {
        let src = "color = \"#ff0000\"\n";
        let out = strip_comments(src, &python_syntax());
        assert_eq!(out, src);
    }

    #[test]
    fn html_comments_removed() {
        let syntax = Lang::Html.comment_syntax().unwrap();
        let src = "<div>\n<!-- note -->\n<span>x</span>\n</div>\n";
        let out = strip_comments(src, &syntax);
        assert_eq!(out, "<div>\n\n<span>x</span>\n</div>\n");
    }

    #[test]
    fn unterminated_block_comment_consumes_rest() {
        let src = "a();\n/* never closed\nmore\n";
        let out = strip_comments(src, &rust_syntax());
        assert_eq!(out, "a();\n\n\n");
    }

    #[test]
    fn ruby_begin_end_block_only_at_line_start() {
        let syntax = Lang::Ruby.comment_syntax().unwrap();
        let src = "x = 1\n=begin\ndocs\n=end\ny = 2\n";
        let out = strip_comments(src, &syntax);
        assert_eq!(out, "x = 1\n\n\n\ny = 2\n");
    }
}
