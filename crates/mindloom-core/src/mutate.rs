//! Tree mutation engine. Every operation takes the current tree by reference
//! and returns a rebuilt tree; the caller persists the result. The input is
//! never modified.

use crate::{new_node_id, Difficulty, MindmapNode, NewModule};

/// A single-field edit applied to one node by id.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Title(String),
    Description(String),
    Difficulty(Difficulty),
    Hours(f64),
    AddSkill(String),
    RemoveSkill(String),
    AddPrerequisite(String),
    RemovePrerequisite(String),
}

// --- Lookup helpers ---

/// Depth-first pre-order search by exact id.
pub fn find_node<'a>(root: &'a MindmapNode, id: &str) -> Option<&'a MindmapNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|c| find_node(c, id))
}

fn find_node_mut<'a>(root: &'a mut MindmapNode, id: &str) -> Option<&'a mut MindmapNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter_mut().find_map(|c| find_node_mut(c, id))
}

/// Find the parent of the node with the given id. None for the root itself
/// or when the id does not exist.
pub fn find_parent<'a>(root: &'a MindmapNode, id: &str) -> Option<&'a MindmapNode> {
    if root.children.iter().any(|c| c.id == id) {
        return Some(root);
    }
    root.children.iter().find_map(|c| find_parent(c, id))
}

pub fn contains(root: &MindmapNode, id: &str) -> bool {
    find_node(root, id).is_some()
}

/// Collect every id reachable from the root, pre-order.
pub fn collect_ids(root: &MindmapNode, out: &mut Vec<String>) {
    out.push(root.id.clone());
    for child in &root.children {
        collect_ids(child, out);
    }
}

// --- Operations ---

/// Replace one field of the node with the given id. A missing id is a silent
/// no-op (the tree comes back unchanged), matching the UI contract where a
/// stale id simply has nothing left to edit.
pub fn update_field(root: &MindmapNode, node_id: &str, edit: FieldEdit) -> MindmapNode {
    let mut tree = root.clone();
    if let Some(node) = find_node_mut(&mut tree, node_id) {
        match edit {
            FieldEdit::Title(title) => node.title = title,
            FieldEdit::Description(desc) => node.description = Some(desc),
            FieldEdit::Difficulty(d) => node.difficulty = Some(d),
            FieldEdit::Hours(h) => node.estimated_hours = Some(h.max(0.0)),
            FieldEdit::AddSkill(skill) => {
                if !node.skills.contains(&skill) {
                    node.skills.push(skill);
                }
            }
            FieldEdit::RemoveSkill(skill) => node.skills.retain(|s| *s != skill),
            FieldEdit::AddPrerequisite(p) => {
                if !node.prerequisites.contains(&p) {
                    node.prerequisites.push(p);
                }
            }
            FieldEdit::RemovePrerequisite(p) => node.prerequisites.retain(|s| *s != p),
        }
    }
    tree
}

/// Add a new module. With no parent id the module lands in the root's
/// children; otherwise it is appended to the children of the named node.
pub fn add_child(
    root: &MindmapNode,
    parent_id: Option<&str>,
    module: NewModule,
) -> Result<MindmapNode, String> {
    let mut tree = root.clone();
    let explicit_level = module.level;
    let mut child = module.materialize();
    match parent_id {
        None => {
            if explicit_level.is_none() {
                child.level = tree.level + 1;
            }
            tree.children.push(child);
        }
        Some(pid) => match find_node_mut(&mut tree, pid) {
            Some(parent) => {
                if explicit_level.is_none() {
                    child.level = parent.level + 1;
                }
                parent.children.push(child);
            }
            None => return Err(format!("Module '{}' not found", pid)),
        },
    }
    Ok(tree)
}

/// Remove a node and its entire subtree. The root cannot be removed.
pub fn remove_node(root: &MindmapNode, node_id: &str) -> Result<MindmapNode, String> {
    if root.id == node_id {
        return Err("Cannot delete the root module".to_string());
    }
    let mut tree = root.clone();
    match detach(&mut tree, node_id) {
        Some(_) => Ok(tree),
        None => Err(format!("Module '{}' not found", node_id)),
    }
}

/// Remove and return the subtree rooted at `id` from somewhere below `node`.
fn detach(node: &mut MindmapNode, id: &str) -> Option<MindmapNode> {
    if let Some(pos) = node.children.iter().position(|c| c.id == id) {
        return Some(node.children.remove(pos));
    }
    node.children.iter_mut().find_map(|c| detach(c, id))
}

/// Sort every node's immediate children by each child's position in `order`.
/// Ids not present in `order` sort last; the sort is stable so their relative
/// order is preserved. Applied recursively top-down.
pub fn reorder_children(root: &MindmapNode, order: &[String]) -> MindmapNode {
    let mut tree = root.clone();
    reorder_in_place(&mut tree, order);
    tree
}

fn reorder_in_place(node: &mut MindmapNode, order: &[String]) {
    node.children.sort_by_key(|c| {
        order
            .iter()
            .position(|id| *id == c.id)
            .unwrap_or(usize::MAX)
    });
    for child in &mut node.children {
        reorder_in_place(child, order);
    }
}

/// Deep-clone the subtree rooted at `node_id`. The clone and every one of its
/// descendants get fresh ids so id uniqueness holds across the tree; the
/// clone's title gets a " (Copy)" suffix. With `new_parent` the clone goes
/// there, otherwise beside the original under its existing parent (the root's
/// children when the original is the root itself).
pub fn duplicate_node(
    root: &MindmapNode,
    node_id: &str,
    new_parent: Option<&str>,
) -> Result<MindmapNode, String> {
    let original = match find_node(root, node_id) {
        Some(n) => n,
        None => return Err(format!("Module '{}' not found", node_id)),
    };

    let mut clone = original.clone();
    reissue_ids(&mut clone);
    clone.title = format!("{} (Copy)", clone.title);

    let target_id = match new_parent {
        Some(pid) => {
            if !contains(root, pid) {
                return Err(format!("Module '{}' not found", pid));
            }
            pid.to_string()
        }
        None => find_parent(root, node_id)
            .map(|p| p.id.clone())
            .unwrap_or_else(|| root.id.clone()),
    };

    let mut tree = root.clone();
    if let Some(parent) = find_node_mut(&mut tree, &target_id) {
        parent.children.push(clone);
    }
    Ok(tree)
}

fn reissue_ids(node: &mut MindmapNode) {
    node.id = new_node_id();
    for child in &mut node.children {
        reissue_ids(child);
    }
}

/// Move a subtree under a new parent. Ids are unchanged. The root cannot be
/// moved; a new parent inside the moved subtree is unreachable after the
/// detach and surfaces as not found.
pub fn move_node(
    root: &MindmapNode,
    node_id: &str,
    new_parent_id: &str,
) -> Result<MindmapNode, String> {
    if root.id == node_id {
        return Err("Cannot move the root module".to_string());
    }
    let mut tree = root.clone();
    let subtree = match detach(&mut tree, node_id) {
        Some(s) => s,
        None => return Err(format!("Module '{}' not found", node_id)),
    };
    match find_node_mut(&mut tree, new_parent_id) {
        Some(parent) => {
            parent.children.push(subtree);
            Ok(tree)
        }
        None => Err(format!("Module '{}' not found", new_parent_id)),
    }
}

/// Merge `source_id` into `dest_id`: skills and prerequisites are unioned
/// into the destination (destination order preserved, new entries appended in
/// source order), the source's children become children of the destination
/// with their ids kept, and the source node itself is removed.
pub fn merge_nodes(
    root: &MindmapNode,
    source_id: &str,
    dest_id: &str,
) -> Result<MindmapNode, String> {
    if source_id == root.id {
        return Err("Cannot merge the root module into another module".to_string());
    }
    if source_id == dest_id {
        return Err("Cannot merge a module into itself".to_string());
    }
    let source = match find_node(root, source_id) {
        Some(n) => n,
        None => return Err(format!("Module '{}' not found", source_id)),
    };
    if contains(source, dest_id) {
        return Err(format!(
            "Cannot merge '{}' into its own descendant '{}'",
            source_id, dest_id
        ));
    }
    if !contains(root, dest_id) {
        return Err(format!("Module '{}' not found", dest_id));
    }

    let mut tree = root.clone();
    let source = match detach(&mut tree, source_id) {
        Some(s) => s,
        None => return Err(format!("Module '{}' not found", source_id)),
    };
    match find_node_mut(&mut tree, dest_id) {
        Some(dest) => {
            for skill in source.skills {
                if !dest.skills.contains(&skill) {
                    dest.skills.push(skill);
                }
            }
            for prereq in source.prerequisites {
                if !dest.prerequisites.contains(&prereq) {
                    dest.prerequisites.push(prereq);
                }
            }
            dest.children.extend(source.children);
            Ok(tree)
        }
        None => Err(format!("Module '{}' not found", dest_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> MindmapNode {
        let mut root = MindmapNode::new("Programming 101");
        root.id = "node-root".to_string();
        let mut intro = MindmapNode::new("Intro");
        intro.id = "node-intro".to_string();
        intro.level = 1;
        intro.skills = vec!["y".to_string(), "z".to_string()];
        let mut loops_ = MindmapNode::new("Loops");
        loops_.id = "node-loops".to_string();
        loops_.level = 1;
        loops_.skills = vec!["x".to_string(), "y".to_string()];
        let mut nested = MindmapNode::new("While Loops");
        nested.id = "node-while".to_string();
        nested.level = 2;
        loops_.children.push(nested);
        root.children.push(intro);
        root.children.push(loops_);
        root
    }

    #[test]
    fn update_field_replaces_only_the_target() {
        let tree = sample_tree();
        let out = update_field(
            &tree,
            "node-loops",
            FieldEdit::Difficulty(Difficulty::Advanced),
        );
        assert_eq!(
            find_node(&out, "node-loops").unwrap().difficulty,
            Some(Difficulty::Advanced)
        );
        assert_eq!(find_node(&out, "node-intro").unwrap().difficulty, None);
        // input untouched
        assert_eq!(find_node(&tree, "node-loops").unwrap().difficulty, None);
    }

    #[test]
    fn update_field_unknown_id_is_a_silent_no_op() {
        let tree = sample_tree();
        let out = update_field(&tree, "node-ghost", FieldEdit::Title("x".into()));
        assert_eq!(out, tree);
    }

    #[test]
    fn update_field_clamps_hours_at_zero() {
        let tree = sample_tree();
        let out = update_field(&tree, "node-intro", FieldEdit::Hours(-2.0));
        assert_eq!(
            find_node(&out, "node-intro").unwrap().estimated_hours,
            Some(0.0)
        );
    }

    #[test]
    fn add_skill_rejects_exact_duplicates() {
        let tree = sample_tree();
        let out = update_field(&tree, "node-loops", FieldEdit::AddSkill("x".into()));
        assert_eq!(find_node(&out, "node-loops").unwrap().skills, vec!["x", "y"]);
        let out = update_field(&out, "node-loops", FieldEdit::AddSkill("w".into()));
        assert_eq!(
            find_node(&out, "node-loops").unwrap().skills,
            vec!["x", "y", "w"]
        );
    }

    #[test]
    fn add_child_without_parent_lands_under_root() {
        let tree = sample_tree();
        let out = add_child(&tree, None, NewModule::titled("Recursion")).unwrap();
        assert_eq!(out.children.len(), 3);
        let added = out.children.last().unwrap();
        assert_eq!(added.title, "Recursion");
        assert_eq!(added.level, 1);
        assert_eq!(added.difficulty, Some(Difficulty::Beginner));
    }

    #[test]
    fn add_child_under_named_parent() {
        let tree = sample_tree();
        let out = add_child(&tree, Some("node-loops"), NewModule::titled("For Loops")).unwrap();
        let parent = find_node(&out, "node-loops").unwrap();
        assert_eq!(parent.children.len(), 2);
        assert_eq!(parent.children[1].level, 2);
    }

    #[test]
    fn add_child_unknown_parent_errors() {
        let tree = sample_tree();
        let err = add_child(&tree, Some("node-ghost"), NewModule::titled("X")).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn remove_node_drops_whole_subtree() {
        let tree = sample_tree();
        let out = remove_node(&tree, "node-loops").unwrap();
        assert!(find_node(&out, "node-loops").is_none());
        assert!(find_node(&out, "node-while").is_none());
        assert!(find_node(&out, "node-intro").is_some());
    }

    #[test]
    fn remove_root_is_rejected() {
        let tree = sample_tree();
        let err = remove_node(&tree, "node-root").unwrap_err();
        assert_eq!(err, "Cannot delete the root module");
    }

    #[test]
    fn reorder_sorts_listed_children_first() {
        let tree = sample_tree();
        let order = vec!["node-loops".to_string(), "node-intro".to_string()];
        let out = reorder_children(&tree, &order);
        let titles: Vec<&str> = out.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Loops", "Intro"]);
    }

    #[test]
    fn reorder_keeps_unlisted_children_last_in_stable_order() {
        let tree = sample_tree();
        let order = vec!["node-loops".to_string()];
        let out = reorder_children(&tree, &order);
        let titles: Vec<&str> = out.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Loops", "Intro"]);
    }

    #[test]
    fn duplicate_gets_fresh_ids_everywhere_and_copy_suffix() {
        let tree = sample_tree();
        let out = duplicate_node(&tree, "node-loops", None).unwrap();
        let mut ids = Vec::new();
        collect_ids(&out, &mut ids);
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len(), "all ids unique after duplicate");

        let clone = out
            .children
            .iter()
            .find(|c| c.title == "Loops (Copy)")
            .expect("clone placed beside the original");
        assert_ne!(clone.id, "node-loops");
        assert_eq!(clone.children.len(), 1);
        assert_ne!(clone.children[0].id, "node-while");
        assert_eq!(clone.children[0].title, "While Loops");
    }

    #[test]
    fn duplicate_into_named_parent() {
        let tree = sample_tree();
        let out = duplicate_node(&tree, "node-intro", Some("node-loops")).unwrap();
        let parent = find_node(&out, "node-loops").unwrap();
        assert!(parent.children.iter().any(|c| c.title == "Intro (Copy)"));
    }

    #[test]
    fn move_node_keeps_ids() {
        let tree = sample_tree();
        let out = move_node(&tree, "node-while", "node-intro").unwrap();
        let intro = find_node(&out, "node-intro").unwrap();
        assert_eq!(intro.children.len(), 1);
        assert_eq!(intro.children[0].id, "node-while");
        assert!(find_node(&out, "node-loops").unwrap().children.is_empty());
    }

    #[test]
    fn move_root_is_rejected() {
        let tree = sample_tree();
        assert!(move_node(&tree, "node-root", "node-intro").is_err());
    }

    #[test]
    fn move_under_own_descendant_fails() {
        let tree = sample_tree();
        let err = move_node(&tree, "node-loops", "node-while").unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn merge_unions_skills_and_moves_children() {
        let tree = sample_tree();
        // loops (x, y) into intro (y, z)
        let out = merge_nodes(&tree, "node-loops", "node-intro").unwrap();
        let dest = find_node(&out, "node-intro").unwrap();
        assert_eq!(dest.skills, vec!["y", "z", "x"]);
        assert_eq!(dest.children.len(), 1);
        assert_eq!(dest.children[0].id, "node-while");
        assert!(find_node(&out, "node-loops").is_none());
    }

    #[test]
    fn merge_is_idempotent_on_skills() {
        let tree = sample_tree();
        let out = merge_nodes(&tree, "node-loops", "node-intro").unwrap();
        let dest = find_node(&out, "node-intro").unwrap();
        let mut sorted = dest.skills.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), dest.skills.len(), "no duplicate skills");
    }

    #[test]
    fn merge_rejects_root_source_and_self_merge() {
        let tree = sample_tree();
        assert!(merge_nodes(&tree, "node-root", "node-intro").is_err());
        assert!(merge_nodes(&tree, "node-intro", "node-intro").is_err());
    }

    #[test]
    fn merge_rejects_descendant_destination() {
        let tree = sample_tree();
        let err = merge_nodes(&tree, "node-loops", "node-while").unwrap_err();
        assert!(err.contains("descendant"));
    }
}
