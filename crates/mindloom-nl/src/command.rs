//! Command grammar. An ordered table of rules, each a set of trigger word
//! groups gating a lazily compiled regex; the first rule whose regex matches
//! wins, a failed regex falls through to the next rule. Captured spans are
//! trimmed and stripped of surrounding quotes. Targets stay human-readable
//! titles until `apply` resolves them against the current tree.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use mindloom_core::mutate::{self, FieldEdit};
use mindloom_core::{Difficulty, MindmapNode, NewModule};

use crate::resolve;

/// A fully parsed editing command. Targets and parents are titles, not ids.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOp {
    SetTitle { target: String, title: String },
    SetDescription { target: String, description: String },
    SetDifficulty { target: String, difficulty: Difficulty },
    SetHours { target: String, hours: f64 },
    AddSkill { target: String, skill: String },
    RemoveSkill { target: String, skill: String },
    AddPrerequisite { target: String, prerequisite: String },
    RemovePrerequisite { target: String, prerequisite: String },
    AddModule { parent: Option<String>, title: String },
    DeleteModule { target: String },
    DuplicateModule { target: String, new_parent: Option<String> },
    MoveModule { target: String, new_parent: String },
    MergeModules { source: String, dest: String },
    SetCourseTitle { title: String },
    SetCourseDescription { description: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    /// Human-readable description of what will happen, for logging/UX.
    pub summary: String,
    pub op: CommandOp,
}

struct Rule {
    /// Cheap gate: the lowercased utterance must contain at least one word
    /// from every group before the regex is tried.
    triggers: &'static [&'static [&'static str]],
    pattern: &'static str,
    regex: OnceLock<Regex>,
    build: fn(&Captures) -> Option<ParsedCommand>,
}

impl Rule {
    fn gate(&self, lower: &str) -> bool {
        self.triggers
            .iter()
            .all(|group| group.iter().any(|w| lower.contains(w)))
    }

    fn regex(&self) -> &Regex {
        self.regex
            .get_or_init(|| Regex::new(self.pattern).expect("rule pattern compiles"))
    }
}

/// Trim and strip one layer of matching surrounding quotes.
fn clean(s: &str) -> String {
    let t = s.trim();
    let t = t
        .strip_prefix('"')
        .and_then(|x| x.strip_suffix('"'))
        .or_else(|| t.strip_prefix('\'').and_then(|x| x.strip_suffix('\'')))
        .unwrap_or(t);
    t.trim().to_string()
}

fn cap(c: &Captures, i: usize) -> Option<String> {
    c.get(i)
        .map(|m| clean(m.as_str()))
        .filter(|s| !s.is_empty())
}

// --- Builders ---

fn build_set_title(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    let title = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Rename '{}' to '{}'", target, title),
        op: CommandOp::SetTitle { target, title },
    })
}

fn build_set_description(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    let description = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Update the description of '{}'", target),
        op: CommandOp::SetDescription {
            target,
            description,
        },
    })
}

fn build_set_difficulty(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    let difficulty = Difficulty::parse(&cap(c, 2)?)?;
    Some(ParsedCommand {
        summary: format!("Set the difficulty of '{}' to {}", target, difficulty.as_str()),
        op: CommandOp::SetDifficulty { target, difficulty },
    })
}

fn build_set_hours(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    let hours: f64 = cap(c, 2)?.parse().ok()?;
    Some(ParsedCommand {
        summary: format!("Set the estimated hours of '{}' to {}", target, hours),
        op: CommandOp::SetHours { target, hours },
    })
}

fn build_add_skill(c: &Captures) -> Option<ParsedCommand> {
    let skill = cap(c, 1)?;
    let target = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Add the skill '{}' to '{}'", skill, target),
        op: CommandOp::AddSkill { target, skill },
    })
}

fn build_remove_skill(c: &Captures) -> Option<ParsedCommand> {
    let skill = cap(c, 1)?;
    let target = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Remove the skill '{}' from '{}'", skill, target),
        op: CommandOp::RemoveSkill { target, skill },
    })
}

fn build_add_prerequisite(c: &Captures) -> Option<ParsedCommand> {
    let prerequisite = cap(c, 1)?;
    let target = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Add the prerequisite '{}' to '{}'", prerequisite, target),
        op: CommandOp::AddPrerequisite {
            target,
            prerequisite,
        },
    })
}

fn build_remove_prerequisite(c: &Captures) -> Option<ParsedCommand> {
    let prerequisite = cap(c, 1)?;
    let target = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Remove the prerequisite '{}' from '{}'", prerequisite, target),
        op: CommandOp::RemovePrerequisite {
            target,
            prerequisite,
        },
    })
}

fn build_add_module_bare(_c: &Captures) -> Option<ParsedCommand> {
    Some(ParsedCommand {
        summary: "Add a new module".to_string(),
        op: CommandOp::AddModule {
            parent: None,
            title: "New Module".to_string(),
        },
    })
}

fn build_add_module(c: &Captures) -> Option<ParsedCommand> {
    let title = cap(c, 1)?;
    let parent = cap(c, 2);
    Some(ParsedCommand {
        summary: match &parent {
            Some(p) => format!("Add module '{}' under '{}'", title, p),
            None => format!("Add module '{}'", title),
        },
        op: CommandOp::AddModule { parent, title },
    })
}

/// Last-resort layer of the add-module family: everything after the verb+noun
/// anchor is the title, itself split on a trailing " to <parent>" clause. An
/// empty remainder still creates a module, titled "New Module".
fn build_add_module_loose(c: &Captures) -> Option<ParsedCommand> {
    let rest = c.get(1).map(|m| clean(m.as_str())).unwrap_or_default();
    let (title, parent) = if rest.is_empty() {
        ("New Module".to_string(), None)
    } else {
        match rest.to_lowercase().find(" to ") {
            Some(idx) => (
                clean(&rest[..idx]),
                Some(clean(&rest[idx + 4..])).filter(|p| !p.is_empty()),
            ),
            None => (rest, None),
        }
    };
    let title = if title.is_empty() {
        "New Module".to_string()
    } else {
        title
    };
    Some(ParsedCommand {
        summary: match &parent {
            Some(p) => format!("Add module '{}' under '{}'", title, p),
            None => format!("Add module '{}'", title),
        },
        op: CommandOp::AddModule { parent, title },
    })
}

fn build_delete_module(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    Some(ParsedCommand {
        summary: format!("Delete module '{}'", target),
        op: CommandOp::DeleteModule { target },
    })
}

fn build_duplicate_module(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    let new_parent = cap(c, 2);
    Some(ParsedCommand {
        summary: format!("Duplicate module '{}'", target),
        op: CommandOp::DuplicateModule { target, new_parent },
    })
}

fn build_move_module(c: &Captures) -> Option<ParsedCommand> {
    let target = cap(c, 1)?;
    let new_parent = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Move module '{}' under '{}'", target, new_parent),
        op: CommandOp::MoveModule { target, new_parent },
    })
}

fn build_set_course_title(c: &Captures) -> Option<ParsedCommand> {
    let title = cap(c, 1)?;
    Some(ParsedCommand {
        summary: format!("Rename the course to '{}'", title),
        op: CommandOp::SetCourseTitle { title },
    })
}

fn build_set_course_description(c: &Captures) -> Option<ParsedCommand> {
    let description = cap(c, 1)?;
    Some(ParsedCommand {
        summary: "Update the course description".to_string(),
        op: CommandOp::SetCourseDescription { description },
    })
}

fn build_merge_modules(c: &Captures) -> Option<ParsedCommand> {
    let source = cap(c, 1)?;
    let dest = cap(c, 2)?;
    Some(ParsedCommand {
        summary: format!("Merge module '{}' into '{}'", source, dest),
        op: CommandOp::MergeModules { source, dest },
    })
}

// --- Rule table (ordered; first regex match wins) ---

static RULES: [Rule; 17] = [
    Rule {
        triggers: &[&["change", "edit", "update", "modify"], &["title", "name"], &["to", "as"]],
        pattern: r"(?i)(?:change|edit|update|modify)\s+(?:the\s+)?(?:title|name)\s+of\s+(.+?)\s+(?:to|as)\s+(.+)$",
        regex: OnceLock::new(),
        build: build_set_title,
    },
    Rule {
        triggers: &[&["change", "edit", "update", "modify"], &["description", "desc"], &["to", "as"]],
        pattern: r"(?i)(?:change|edit|update|modify)\s+(?:the\s+)?(?:description|desc)\s+of\s+(.+?)\s+(?:to|as)\s+(.+)$",
        regex: OnceLock::new(),
        build: build_set_description,
    },
    Rule {
        triggers: &[&["change", "edit", "update", "set"], &["difficulty", "level"], &["to", "as"]],
        pattern: r"(?i)(?:change|edit|update|set)\s+(?:the\s+)?(?:difficulty|level)\s+of\s+(.+?)\s+(?:to|as)\s+(beginner|intermediate|advanced)\s*$",
        regex: OnceLock::new(),
        build: build_set_difficulty,
    },
    Rule {
        triggers: &[&["change", "edit", "update", "set"], &["hours", "time", "duration"], &["to", "as"]],
        pattern: r"(?i)(?:change|edit|update|set)\s+(?:the\s+)?(?:hours|time|duration)\s+of\s+(.+?)\s+(?:to|as)\s+(\d+(?:\.\d+)?)\s*$",
        regex: OnceLock::new(),
        build: build_set_hours,
    },
    Rule {
        triggers: &[&["add", "include"], &["skill"], &["to"]],
        pattern: r"(?i)(?:add|include)\s+(?:the\s+)?skill\s+(.+?)\s+to\s+(.+)$",
        regex: OnceLock::new(),
        build: build_add_skill,
    },
    Rule {
        triggers: &[&["remove", "delete", "exclude"], &["skill"], &["from"]],
        pattern: r"(?i)(?:remove|delete|exclude)\s+(?:the\s+)?skill\s+(.+?)\s+from\s+(.+)$",
        regex: OnceLock::new(),
        build: build_remove_skill,
    },
    Rule {
        triggers: &[&["add", "include"], &["prerequisite", "prereq"], &["to"]],
        pattern: r"(?i)(?:add|include)\s+(?:the\s+)?(?:prerequisite|prereq)\s+(.+?)\s+to\s+(.+)$",
        regex: OnceLock::new(),
        build: build_add_prerequisite,
    },
    Rule {
        triggers: &[&["remove", "delete", "exclude"], &["prerequisite", "prereq"], &["from"]],
        pattern: r"(?i)(?:remove|delete|exclude)\s+(?:the\s+)?(?:prerequisite|prereq)\s+(.+?)\s+from\s+(.+)$",
        regex: OnceLock::new(),
        build: build_remove_prerequisite,
    },
    Rule {
        triggers: &[&["add"], &["module"]],
        pattern: r"(?i)^\s*add\s+a\s+new\s+module\s*$",
        regex: OnceLock::new(),
        build: build_add_module_bare,
    },
    Rule {
        triggers: &[&["add", "create", "insert"], &["module", "lesson", "section", "new"]],
        pattern: r"(?i)(?:add|create|insert)\s+(?:a\s+)?(?:new\s+)?(?:module|lesson|section)\s+(?:called\s+|named\s+|titled\s+)?(.+?)(?:\s+(?:to|under|into|in)\s+(.+?))?\s*$",
        regex: OnceLock::new(),
        build: build_add_module,
    },
    Rule {
        triggers: &[&["add", "create", "insert"], &["module", "lesson", "section", "new"]],
        pattern: r"(?i)(?:add|create|insert)\s+(?:a\s+)?(?:new\s+)?(?:module|lesson|section)\s*:?\s*(.*)$",
        regex: OnceLock::new(),
        build: build_add_module_loose,
    },
    Rule {
        triggers: &[&["delete", "remove", "drop"], &["module", "lesson", "section"]],
        pattern: r"(?i)(?:delete|remove|drop)\s+(?:the\s+)?(?:module|lesson|section)\s+(.+?)\s*$",
        regex: OnceLock::new(),
        build: build_delete_module,
    },
    Rule {
        triggers: &[&["duplicate", "copy", "clone"], &["module", "lesson", "section"]],
        pattern: r"(?i)(?:duplicate|copy|clone)\s+(?:the\s+)?(?:module|lesson|section)\s+(.+?)(?:\s+(?:to|under|into)\s+(.+?))?\s*$",
        regex: OnceLock::new(),
        build: build_duplicate_module,
    },
    Rule {
        triggers: &[&["move", "relocate"], &["module", "lesson", "section"]],
        pattern: r"(?i)(?:move|relocate)\s+(?:the\s+)?(?:module|lesson|section)\s+(.+?)\s+(?:to|under|into)\s+(.+)$",
        regex: OnceLock::new(),
        build: build_move_module,
    },
    Rule {
        triggers: &[&["change", "edit", "update", "modify"], &["course", "learning path"], &["title", "name"], &["to", "as"]],
        pattern: r"(?i)(?:change|edit|update|modify)\s+(?:the\s+)?(?:course|learning\s+path)(?:'s)?\s+(?:title|name)\s+(?:to|as)\s+(.+)$",
        regex: OnceLock::new(),
        build: build_set_course_title,
    },
    Rule {
        triggers: &[&["change", "edit", "update", "modify"], &["course", "learning path"], &["description", "desc"], &["to", "as"]],
        pattern: r"(?i)(?:change|edit|update|modify)\s+(?:the\s+)?(?:course|learning\s+path)(?:'s)?\s+(?:description|desc)\s+(?:to|as)\s+(.+)$",
        regex: OnceLock::new(),
        build: build_set_course_description,
    },
    Rule {
        triggers: &[&["merge", "combine"], &["module", "lesson", "section"], &["with", "into"]],
        pattern: r"(?i)(?:merge|combine)\s+(?:the\s+)?(?:module|lesson|section)s?\s+(.+?)\s+(?:with|into)\s+(.+)$",
        regex: OnceLock::new(),
        build: build_merge_modules,
    },
];

/// Match an utterance against the grammar. None when no rule matches; the
/// caller can surface `usage()` as guidance.
pub fn parse(utterance: &str) -> Option<ParsedCommand> {
    let text = utterance.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    for rule in &RULES {
        if !rule.gate(&lower) {
            continue;
        }
        if let Some(caps) = rule.regex().captures(text) {
            if let Some(cmd) = (rule.build)(&caps) {
                return Some(cmd);
            }
        }
    }
    None
}

/// Guidance text listing example phrasings, surfaced on a parse miss.
pub fn usage() -> String {
    "I couldn't match that to an editing command. Supported phrasings include:\n\
- change the title of <module> to <new title>\n\
- change the description of <module> to <text>\n\
- set the difficulty of <module> to beginner | intermediate | advanced\n\
- set the hours of <module> to <number>\n\
- add the skill <skill> to <module>\n\
- remove the skill <skill> from <module>\n\
- add the prerequisite <name> to <module>\n\
- remove the prerequisite <name> from <module>\n\
- add a new module called <title> to <parent>\n\
- delete the module <module>\n\
- duplicate the module <module> into <parent>\n\
- move the module <module> to <parent>\n\
- merge the module <source> into <dest>\n\
- change the course title to <new title>\n\
- change the course description to <text>"
        .to_string()
}

/// Resolve every title reference in a command against the current tree and
/// dispatch to the mutation engine. Returns the rewritten tree or the first
/// resolution/structural error; the input tree is never modified.
pub fn apply(op: &CommandOp, tree: &MindmapNode) -> Result<MindmapNode, String> {
    match op {
        CommandOp::SetTitle { target, title } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(tree, &id, FieldEdit::Title(title.clone())))
        }
        CommandOp::SetDescription {
            target,
            description,
        } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(
                tree,
                &id,
                FieldEdit::Description(description.clone()),
            ))
        }
        CommandOp::SetDifficulty { target, difficulty } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(
                tree,
                &id,
                FieldEdit::Difficulty(*difficulty),
            ))
        }
        CommandOp::SetHours { target, hours } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(tree, &id, FieldEdit::Hours(*hours)))
        }
        CommandOp::AddSkill { target, skill } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(
                tree,
                &id,
                FieldEdit::AddSkill(skill.clone()),
            ))
        }
        CommandOp::RemoveSkill { target, skill } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(
                tree,
                &id,
                FieldEdit::RemoveSkill(skill.clone()),
            ))
        }
        CommandOp::AddPrerequisite {
            target,
            prerequisite,
        } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(
                tree,
                &id,
                FieldEdit::AddPrerequisite(prerequisite.clone()),
            ))
        }
        CommandOp::RemovePrerequisite {
            target,
            prerequisite,
        } => {
            let id = resolve::resolve(tree, target)?;
            Ok(mutate::update_field(
                tree,
                &id,
                FieldEdit::RemovePrerequisite(prerequisite.clone()),
            ))
        }
        CommandOp::AddModule { parent, title } => {
            let pid = match parent {
                Some(p) => Some(resolve::resolve(tree, p)?),
                None => None,
            };
            mutate::add_child(tree, pid.as_deref(), NewModule::titled(title.clone()))
        }
        CommandOp::DeleteModule { target } => {
            let id = resolve::resolve(tree, target)?;
            mutate::remove_node(tree, &id)
        }
        CommandOp::DuplicateModule { target, new_parent } => {
            let id = resolve::resolve(tree, target)?;
            let pid = match new_parent {
                Some(p) => Some(resolve::resolve(tree, p)?),
                None => None,
            };
            mutate::duplicate_node(tree, &id, pid.as_deref())
        }
        CommandOp::MoveModule { target, new_parent } => {
            let id = resolve::resolve(tree, target)?;
            let pid = resolve::resolve(tree, new_parent)?;
            mutate::move_node(tree, &id, &pid)
        }
        CommandOp::MergeModules { source, dest } => {
            let sid = resolve::resolve(tree, source)?;
            let did = resolve::resolve(tree, dest)?;
            mutate::merge_nodes(tree, &sid, &did)
        }
        CommandOp::SetCourseTitle { title } => Ok(mutate::update_field(
            tree,
            &tree.id,
            FieldEdit::Title(title.clone()),
        )),
        CommandOp::SetCourseDescription { description } => Ok(mutate::update_field(
            tree,
            &tree.id,
            FieldEdit::Description(description.clone()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindloom_core::mutate::find_node;

    fn op(utterance: &str) -> CommandOp {
        parse(utterance).expect(utterance).op
    }

    #[test]
    fn rename_extracts_target_and_new_title() {
        assert_eq!(
            op("change the title of Intro to Basics"),
            CommandOp::SetTitle {
                target: "Intro".to_string(),
                title: "Basics".to_string()
            }
        );
    }

    #[test]
    fn rename_strips_quotes() {
        assert_eq!(
            op("update the name of \"Intro\" to 'Python Basics'"),
            CommandOp::SetTitle {
                target: "Intro".to_string(),
                title: "Python Basics".to_string()
            }
        );
    }

    #[test]
    fn describe_difficulty_and_hours_families() {
        assert_eq!(
            op("change the description of Loops to All about iteration"),
            CommandOp::SetDescription {
                target: "Loops".to_string(),
                description: "All about iteration".to_string()
            }
        );
        assert_eq!(
            op("set the difficulty of Loops to advanced"),
            CommandOp::SetDifficulty {
                target: "Loops".to_string(),
                difficulty: Difficulty::Advanced
            }
        );
        assert_eq!(
            op("set the hours of Loops to 2.5"),
            CommandOp::SetHours {
                target: "Loops".to_string(),
                hours: 2.5
            }
        );
    }

    #[test]
    fn difficulty_rejects_unknown_levels() {
        assert!(parse("set the difficulty of Loops to expert").is_none());
    }

    #[test]
    fn skill_and_prerequisite_families() {
        assert_eq!(
            op("add the skill pattern matching to Loops"),
            CommandOp::AddSkill {
                target: "Loops".to_string(),
                skill: "pattern matching".to_string()
            }
        );
        assert_eq!(
            op("remove the skill recursion from Loops"),
            CommandOp::RemoveSkill {
                target: "Loops".to_string(),
                skill: "recursion".to_string()
            }
        );
        assert_eq!(
            op("add the prerequisite Variables to Loops"),
            CommandOp::AddPrerequisite {
                target: "Loops".to_string(),
                prerequisite: "Variables".to_string()
            }
        );
        assert_eq!(
            op("remove the prereq Variables from Loops"),
            CommandOp::RemovePrerequisite {
                target: "Loops".to_string(),
                prerequisite: "Variables".to_string()
            }
        );
    }

    #[test]
    fn bare_add_module_defaults_title() {
        assert_eq!(
            op("add a new module"),
            CommandOp::AddModule {
                parent: None,
                title: "New Module".to_string()
            }
        );
    }

    #[test]
    fn titled_add_module_with_and_without_parent() {
        assert_eq!(
            op("add a new module called Recursion"),
            CommandOp::AddModule {
                parent: None,
                title: "Recursion".to_string()
            }
        );
        assert_eq!(
            op("add a module named Recursion to Advanced Topics"),
            CommandOp::AddModule {
                parent: Some("Advanced Topics".to_string()),
                title: "Recursion".to_string()
            }
        );
    }

    #[test]
    fn loose_add_module_splits_trailing_parent() {
        assert_eq!(
            op("create a lesson: Generics to Advanced Topics"),
            CommandOp::AddModule {
                parent: Some("Advanced Topics".to_string()),
                title: "Generics".to_string()
            }
        );
    }

    #[test]
    fn delete_duplicate_move_merge_families() {
        assert_eq!(
            op("delete the module Loops"),
            CommandOp::DeleteModule {
                target: "Loops".to_string()
            }
        );
        assert_eq!(
            op("duplicate the module Loops"),
            CommandOp::DuplicateModule {
                target: "Loops".to_string(),
                new_parent: None
            }
        );
        assert_eq!(
            op("copy the module Loops into Advanced Topics"),
            CommandOp::DuplicateModule {
                target: "Loops".to_string(),
                new_parent: Some("Advanced Topics".to_string())
            }
        );
        assert_eq!(
            op("move the module Loops under Advanced Topics"),
            CommandOp::MoveModule {
                target: "Loops".to_string(),
                new_parent: "Advanced Topics".to_string()
            }
        );
        assert_eq!(
            op("merge the module Loops into Iteration"),
            CommandOp::MergeModules {
                source: "Loops".to_string(),
                dest: "Iteration".to_string()
            }
        );
    }

    #[test]
    fn course_level_edits_have_no_target() {
        assert_eq!(
            op("change the course title to Rust From Scratch"),
            CommandOp::SetCourseTitle {
                title: "Rust From Scratch".to_string()
            }
        );
        assert_eq!(
            op("update the learning path description to A gentle on-ramp"),
            CommandOp::SetCourseDescription {
                description: "A gentle on-ramp".to_string()
            }
        );
    }

    #[test]
    fn remove_skill_wins_over_delete_module() {
        // "remove" + "module" could gate the delete family; the skill rule
        // sits earlier in the table.
        assert_eq!(
            op("remove the skill loops from the module Iteration"),
            CommandOp::RemoveSkill {
                target: "the module Iteration".to_string(),
                skill: "loops".to_string()
            }
        );
    }

    #[test]
    fn gibberish_yields_none() {
        assert!(parse("").is_none());
        assert!(parse("what a lovely day").is_none());
        assert!(parse("make it better").is_none());
    }

    #[test]
    fn apply_resolves_titles_then_mutates() {
        let mut root = MindmapNode::new("Course");
        let mut loops_ = MindmapNode::new("Loops");
        loops_.id = "node-loops".to_string();
        root.children.push(loops_);

        let cmd = parse("set the difficulty of loops to intermediate").unwrap();
        let out = apply(&cmd.op, &root).unwrap();
        assert_eq!(
            find_node(&out, "node-loops").unwrap().difficulty,
            Some(Difficulty::Intermediate)
        );
    }

    #[test]
    fn apply_course_title_targets_root() {
        let root = MindmapNode::new("Course");
        let cmd = parse("change the course title to Better Course").unwrap();
        let out = apply(&cmd.op, &root).unwrap();
        assert_eq!(out.title, "Better Course");
        assert_eq!(out.id, root.id);
    }

    #[test]
    fn apply_surfaces_resolution_failures() {
        let root = MindmapNode::new("Course");
        let cmd = parse("delete the module Ghost").unwrap();
        let err = apply(&cmd.op, &root).unwrap_err();
        assert_eq!(err, "Module \"Ghost\" not found");
    }
}
