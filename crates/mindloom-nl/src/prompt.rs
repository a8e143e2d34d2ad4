//! System-prompt construction for each handling strategy, plus a compact
//! text serialization of an outline for LLM consumption.

use mindloom_core::{guidance::GUIDANCE, MindmapNode};

use crate::{command, Handler};

/// Convert an outline to a compact indented text representation. Much
/// cheaper in tokens than re-serializing the JSON document.
pub fn serialize_outline(root: &MindmapNode) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str("OUTLINE:\n");
    serialize_node(&mut out, root, 0);
    out
}

fn serialize_node(out: &mut String, node: &MindmapNode, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
    out.push_str("- \"");
    out.push_str(&node.title);
    out.push_str("\" (id=");
    out.push_str(&node.id);
    out.push_str(",level=");
    out.push_str(&node.level.to_string());
    if let Some(difficulty) = node.difficulty {
        out.push_str(",difficulty=");
        out.push_str(difficulty.as_str());
    }
    if let Some(hours) = node.estimated_hours {
        out.push_str(",hours=");
        out.push_str(&hours.to_string());
    }
    out.push(')');
    if !node.skills.is_empty() {
        out.push_str(" skills=");
        out.push_str(&node.skills.join(","));
    }
    if !node.prerequisites.is_empty() {
        out.push_str(" needs=");
        out.push_str(&node.prerequisites.join(","));
    }
    if let Some(desc) = &node.description {
        if !desc.is_empty() {
            out.push_str(" :: ");
            out.push_str(desc);
        }
    }
    out.push('\n');
    for child in &node.children {
        serialize_node(out, child, indent + 2);
    }
}

/// Build the system prompt for a handling strategy. The current document, if
/// any, is embedded so the model answers about what the user is looking at.
pub fn system_prompt(handler: Handler, document: Option<&MindmapNode>) -> String {
    let mut out = String::with_capacity(4096);

    match handler {
        Handler::Creation => {
            out.push_str(
                "You design course outlines. Respond with a short introduction, then \
                 exactly one fenced ```json code block containing \
                 {\"type\":\"mindmap\",\"data\":{...}} where data is the full outline: \
                 every module has id, title, description, level, difficulty \
                 (beginner|intermediate|advanced), estimatedHours, skills, \
                 prerequisites and children. No prose inside the block.\n\n",
            );
            out.push_str(GUIDANCE);
        }
        Handler::Editing => {
            out.push_str(
                "You edit an existing course outline. Prefer restating the user's \
                 request as one of the supported edit phrasings below; modules are \
                 referred to by title.\n\n",
            );
            out.push_str(&command::usage());
        }
        Handler::Explanation => {
            out.push_str(
                "You answer questions about the user's course outline and its \
                 subject matter. Be concrete and concise; cite modules by title. \
                 Do not emit JSON.\n",
            );
        }
        Handler::Chat => {
            out.push_str(
                "You are a course-planning assistant. Keep the conversation on \
                 course design; if the user's goal is unclear, ask one clarifying \
                 question. Do not emit JSON.\n",
            );
        }
    }

    if let Some(root) = document {
        out.push('\n');
        out.push_str(&serialize_outline(root));
    }

    out
}
