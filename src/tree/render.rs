use super::{find_node, DirectoryNode};

/// Render a directory tree to text.
///
/// With a non-empty `target_path` the output is scoped to that subtree; a
/// miss produces a "No history found" message rather than an error. With an
/// empty `target_path` every top-level directory under the synthetic root is
/// rendered as its own group, sorted by name, separated by blank lines.
///
/// `max_commands` caps each directory's displayed command list to the most
/// recent entries (0 = unbounded). This is a display cap, applied on top of
/// whatever truncation the tree builder already did.
pub fn render(root: &DirectoryNode, target_path: &str, max_commands: usize) -> String {
    let mut out = String::new();

    if !target_path.is_empty() {
        match find_node(root, target_path) {
            Some(node) => render_node_body(node, "", max_commands, &mut out),
            None => {
                out.push_str(&format!("No history found for path: {}\n", target_path));
            }
        }
        return out;
    }

    let groups: Vec<(&String, &DirectoryNode)> = root
        .children
        .iter()
        .filter(|(_, child)| child.path.starts_with('/'))
        .collect();

    for (i, (_, child)) in groups.iter().enumerate() {
        out.push_str(&format!("{}\n", child.path));
        render_node_body(child, "", max_commands, &mut out);
        if i + 1 < groups.len() {
            out.push('\n');
        }
    }
    out
}

/// Commands first, with last/non-last connectors among themselves, then
/// child directories with their own connectors. Children are iterated in
/// map order, which is already lexicographic.
fn render_node_body(node: &DirectoryNode, prefix: &str, max_commands: usize, out: &mut String) {
    render_commands(&node.commands, prefix, max_commands, out);

    let child_count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let last = i + 1 == child_count;
        let connector = if last { "└── " } else { "├── " };
        out.push_str(&format!("{}{}{}/\n", prefix, connector, name));

        let continuation = if last { "    " } else { "│   " };
        let child_prefix = format!("{}{}", prefix, continuation);
        render_node_body(child, &child_prefix, max_commands, out);
    }
}

fn render_commands(commands: &[String], prefix: &str, max_commands: usize, out: &mut String) {
    let display = if max_commands > 0 && commands.len() > max_commands {
        &commands[commands.len() - max_commands..]
    } else {
        commands
    };

    for (i, command) in display.iter().enumerate() {
        let connector = if i + 1 == display.len() {
            "└── "
        } else {
            "├── "
        };
        out.push_str(&format!("{}{}{}\n", prefix, connector, command));
    }
}
