//! Title → id resolution. Commands reference modules by what the user sees
//! (titles); the mutation engine wants ids.

use mindloom_core::MindmapNode;

/// Depth-first pre-order, case-insensitive title comparison, first match
/// wins. Titles are not unique; first-match is the contract.
pub fn resolve(root: &MindmapNode, title: &str) -> Result<String, String> {
    let want = title.trim().to_lowercase();
    match walk(root, &want) {
        Some(id) => Ok(id.to_string()),
        None => Err(format!("Module \"{}\" not found", title.trim())),
    }
}

fn walk<'a>(node: &'a MindmapNode, want: &str) -> Option<&'a str> {
    if node.title.to_lowercase() == want {
        return Some(&node.id);
    }
    node.children.iter().find_map(|c| walk(c, want))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MindmapNode {
        let mut root = MindmapNode::new("Course");
        root.id = "node-root".to_string();
        let mut a = MindmapNode::new("Intro To Python");
        a.id = "node-a".to_string();
        let mut b = MindmapNode::new("Loops");
        b.id = "node-b".to_string();
        let mut b_child = MindmapNode::new("Loops");
        b_child.id = "node-b-child".to_string();
        b.children.push(b_child);
        root.children.push(a);
        root.children.push(b);
        root
    }

    #[test]
    fn resolves_case_insensitively() {
        assert_eq!(resolve(&tree(), "intro to python").unwrap(), "node-a");
        assert_eq!(resolve(&tree(), "INTRO TO PYTHON").unwrap(), "node-a");
    }

    #[test]
    fn first_match_wins_for_duplicate_titles() {
        assert_eq!(resolve(&tree(), "Loops").unwrap(), "node-b");
    }

    #[test]
    fn root_title_resolves_to_root() {
        assert_eq!(resolve(&tree(), "course").unwrap(), "node-root");
    }

    #[test]
    fn missing_title_fails_loudly() {
        let err = resolve(&tree(), "Graphs").unwrap_err();
        assert_eq!(err, "Module \"Graphs\" not found");
    }
}
