pub mod render;

use crate::history::Entry;
use std::collections::BTreeMap;

/// One path-segment node in the aggregation tree.
///
/// Holds the commands recorded exactly at this directory (never inherited
/// from ancestors or descendants) and the child nodes keyed by their single
/// segment name. Children live in a `BTreeMap` so traversal order is
/// deterministic without a sorting pass.
#[derive(Debug, Default, PartialEq)]
pub struct DirectoryNode {
    /// Normalized path this node represents; empty for the synthetic root.
    pub path: String,
    pub commands: Vec<String>,
    pub children: BTreeMap<String, DirectoryNode>,
}

impl DirectoryNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            commands: Vec::new(),
            children: BTreeMap::new(),
        }
    }
}

/// Fold entries into a directory tree.
///
/// Commands are grouped by normalized working directory, deduplicated
/// preserving first occurrence, and truncated to the *last* `limit` entries
/// per directory when `limit` is positive (the tree favors recency).
/// Entries with an empty command or working directory are ignored.
pub fn build_tree(entries: &[Entry], limit: usize) -> DirectoryNode {
    // Grouping by the normalized path keeps two raw spellings of the same
    // directory (trailing slash, embedded "..") in one node, and the BTreeMap
    // makes insertion order independent of the input's hash order.
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in entries {
        if entry.cwd.is_empty() || entry.command.is_empty() {
            continue;
        }
        groups
            .entry(clean_path(&entry.cwd))
            .or_default()
            .push(entry.command.clone());
    }

    let mut root = DirectoryNode::new("");
    for (path, commands) in groups {
        let mut commands = dedup_preserving_order(commands);
        if limit > 0 && commands.len() > limit {
            commands.drain(..commands.len() - limit);
        }
        insert_path(&mut root, &path, commands);
    }
    root
}

fn insert_path(root: &mut DirectoryNode, path: &str, commands: Vec<String>) {
    // The filesystem root (and anything that normalizes away entirely)
    // attaches its commands to the synthetic root node directly.
    if path.is_empty() || path == "/" {
        root.commands.extend(commands);
        return;
    }

    let mut current = root;
    let mut current_path = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current_path.push('/');
        current_path.push_str(segment);
        current = current
            .children
            .entry(segment.to_string())
            .or_insert_with(|| DirectoryNode::new(current_path.clone()));
    }
    current.commands.extend(commands);
}

/// Look up the node for `path` by walking segments from `root`.
pub fn find_node<'a>(root: &'a DirectoryNode, path: &str) -> Option<&'a DirectoryNode> {
    let path = clean_path(path);
    if path.is_empty() || path == "/" {
        return Some(root);
    }

    let mut current = root;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current = current.children.get(segment)?;
    }
    Some(current)
}

/// Normalize a path: collapse `.` and empty segments, resolve `..`, drop
/// trailing separators. Purely lexical, no filesystem access.
pub fn clean_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if absolute {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}

fn dedup_preserving_order(commands: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for command in commands {
        if !seen.contains(&command) {
            seen.push(command);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Entry;

    fn entry(cwd: &str, command: &str) -> Entry {
        Entry::new("s1".to_string(), cwd.to_string(), command.to_string())
    }

    #[test]
    fn clean_path_resolves_dots_and_trailing_separators() {
        assert_eq!(clean_path("/a/b/"), "/a/b");
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/a/b/../c"), "/a/c");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("//a///b"), "/a/b");
        assert_eq!(clean_path(""), "");
    }

    #[test]
    fn builds_nested_nodes_per_segment() {
        let entries = vec![entry("/a", "ls"), entry("/a/b", "make")];
        let root = build_tree(&entries, 0);

        let a = &root.children["a"];
        assert_eq!(a.path, "/a");
        assert_eq!(a.commands, vec!["ls"]);

        let b = &a.children["b"];
        assert_eq!(b.path, "/a/b");
        assert_eq!(b.commands, vec!["make"]);
        assert!(b.children.is_empty());
    }

    #[test]
    fn dedup_keeps_first_occurrence_then_truncation_keeps_last() {
        let entries = vec![
            entry("/d", "a"),
            entry("/d", "b"),
            entry("/d", "a"),
            entry("/d", "c"),
        ];

        // Dedup alone: first occurrences, in order.
        let root = build_tree(&entries, 0);
        assert_eq!(root.children["d"].commands, vec!["a", "b", "c"]);

        // Dedup then last-2 truncation.
        let root = build_tree(&entries, 2);
        assert_eq!(root.children["d"].commands, vec!["b", "c"]);
    }

    #[test]
    fn empty_cwd_or_command_is_excluded() {
        let entries = vec![entry("", "ls"), entry("/a", ""), entry("/a", "pwd")];
        let root = build_tree(&entries, 0);
        assert!(root.commands.is_empty());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children["a"].commands, vec!["pwd"]);
    }

    #[test]
    fn filesystem_root_commands_attach_to_the_synthetic_root() {
        let entries = vec![entry("/", "uname -a")];
        let root = build_tree(&entries, 0);
        assert_eq!(root.commands, vec!["uname -a"]);
        assert!(root.children.is_empty());
    }

    #[test]
    fn prefix_directories_hold_only_their_own_commands() {
        let entries = vec![entry("/a", "ls"), entry("/a/b/c", "make")];
        let root = build_tree(&entries, 0);

        let a = &root.children["a"];
        assert_eq!(a.commands, vec!["ls"]);

        // Intermediate node exists but holds no commands of its own.
        let b = &a.children["b"];
        assert!(b.commands.is_empty());
        assert_eq!(b.children["c"].commands, vec!["make"]);
    }

    #[test]
    fn raw_spellings_of_the_same_directory_merge() {
        let entries = vec![entry("/a/", "ls"), entry("/a", "pwd"), entry("/a/", "ls")];
        let root = build_tree(&entries, 0);
        assert_eq!(root.children["a"].commands, vec!["ls", "pwd"]);
    }

    #[test]
    fn find_node_walks_segments() {
        let entries = vec![entry("/a/b", "make")];
        let root = build_tree(&entries, 0);

        assert!(find_node(&root, "/a/b").is_some());
        assert!(find_node(&root, "/a/b/").is_some());
        assert!(find_node(&root, "/a/x").is_none());
        assert_eq!(find_node(&root, "/").unwrap().path, "");
    }
}
