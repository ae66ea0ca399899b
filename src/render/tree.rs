use std::collections::BTreeMap;

/// A rendered directory view node. Children are kept sorted by name; at
/// render time directories come before files at each level.
#[derive(Debug, Default)]
pub struct TreeNode {
    children: BTreeMap<String, TreeNode>,
    is_directory: bool,
}

impl TreeNode {
    fn insert(&mut self, parts: &[&str], is_directory: bool) {
        if let [first, rest @ ..] = parts {
            let child = self.children.entry(first.to_string()).or_default();
            if rest.is_empty() {
                child.is_directory |= is_directory;
            } else {
                child.is_directory = true;
                child.insert(rest, is_directory);
            }
        }
    }

    /// Sum of this subtree's annotation counts.
    fn subtree_count(&self, prefix: &str, name: &str, counts: &BTreeMap<String, usize>) -> usize {
        let path = join_path(prefix, name);
        if !self.is_directory {
            return counts.get(&path).copied().unwrap_or(0);
        }
        self.children
            .iter()
            .map(|(child_name, child)| child.subtree_count(&path, child_name, counts))
            .sum()
    }

    fn render_into(
        &self,
        prefix: &str,
        depth: usize,
        annotations: Option<(&BTreeMap<String, usize>, u64)>,
        out: &mut Vec<String>,
    ) {
        // Directories sort before files; alphabetical within each group.
        let (dirs, files): (Vec<_>, Vec<_>) = self
            .children
            .iter()
            .partition(|(_, child)| child.is_directory);

        for (name, child) in dirs.into_iter().chain(files) {
            let indent = "  ".repeat(depth);
            let suffix = if child.is_directory { "/" } else { "" };
            let mut line = format!("{indent}{name}{suffix}");
            if let Some((counts, threshold)) = annotations {
                let count = child.subtree_count(prefix, name, counts);
                if count as u64 >= threshold {
                    line.push_str(&format!(" ({count} tokens)"));
                }
            }
            out.push(line);
            child.render_into(&join_path(prefix, name), depth + 1, annotations, out);
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Build the directory tree from relative file paths plus (optionally) empty
/// directories, then render it with a pre-order traversal.
pub fn generate_tree_text(
    file_paths: &[String],
    empty_dir_paths: &[String],
    annotations: Option<(&BTreeMap<String, usize>, u64)>,
) -> String {
    let mut root = TreeNode {
        is_directory: true,
        ..Default::default()
    };
    for path in file_paths {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        root.insert(&parts, false);
    }
    for dir in empty_dir_paths {
        let parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
        root.insert(&parts, true);
    }

    let mut lines = Vec::new();
    root.render_into("", 0, annotations, &mut lines);
    lines.join("\n")
}
