//! Keyword-weighted intent classification. Pure function over the utterance;
//! safe to call per keystroke.

use crate::{Classification, Intent};

const CREATION_VERBS: &[&str] = &[
    "create", "make", "build", "generate", "new", "start", "begin", "initiate",
];

const EDITING_VERBS: &[&str] = &[
    "change", "edit", "update", "modify", "set", "add", "remove", "delete", "alter", "adjust",
    "revise", "rework", "refactor", "improve", "enhance",
];

const QUESTION_MARKERS: &[&str] = &[
    "how", "what", "why", "when", "where", "who", "which", "explain", "help", "tell me",
    "show me", "describe", "clarify", "understand", "learn about",
];

const DOMAIN_NOUNS: &[&str] = &[
    "module", "lesson", "course", "learning", "path", "skill", "knowledge", "topic", "subject",
    "curriculum", "syllabus", "training", "education",
];

fn found_in(haystack: &str, words: &[&str]) -> Vec<String> {
    words
        .iter()
        .filter(|w| haystack.contains(*w))
        .map(|w| w.to_string())
        .collect()
}

/// Classify one utterance. `has_existing_document` biases the editing rules:
/// an editing verb with a live document always wins, even when creation or
/// question words are also present.
pub fn classify(utterance: &str, has_existing_document: bool) -> Classification {
    let lower = utterance.trim().to_lowercase();

    let editing = found_in(&lower, EDITING_VERBS);
    let creation = found_in(&lower, CREATION_VERBS);
    let questions = found_in(&lower, QUESTION_MARKERS);
    let nouns = found_in(&lower, DOMAIN_NOUNS);

    if has_existing_document && !editing.is_empty() {
        return Classification {
            intent: Intent::EditExisting,
            confidence: 0.9,
            reasoning: "editing verb with an existing document".to_string(),
            extracted_entities: editing,
        };
    }

    // Guard against rule reordering: an utterance that leads with an editing
    // verb stays an edit while a document exists.
    if has_existing_document && EDITING_VERBS.iter().any(|v| lower.starts_with(v)) {
        return Classification {
            intent: Intent::EditExisting,
            confidence: 0.9,
            reasoning: "utterance starts with an editing verb".to_string(),
            extracted_entities: editing,
        };
    }

    if !creation.is_empty() && !nouns.is_empty() {
        return Classification {
            intent: Intent::CreateNew,
            confidence: 0.9,
            reasoning: "creation verb with a learning-domain noun".to_string(),
            extracted_entities: nouns,
        };
    }

    if !creation.is_empty() {
        return Classification {
            intent: Intent::CreateNew,
            confidence: 0.7,
            reasoning: "creation verb without a domain noun".to_string(),
            extracted_entities: creation,
        };
    }

    // Would edit, but there is nothing to edit.
    if !editing.is_empty() {
        return Classification {
            intent: Intent::EditExisting,
            confidence: 0.4,
            reasoning: "editing verb but no document exists".to_string(),
            extracted_entities: editing,
        };
    }

    if !questions.is_empty() {
        return Classification {
            intent: Intent::AskQuestion,
            confidence: 0.8,
            reasoning: "question marker present".to_string(),
            extracted_entities: questions,
        };
    }

    if lower.contains('?') {
        return Classification {
            intent: Intent::AskQuestion,
            confidence: 0.9,
            reasoning: "literal question mark".to_string(),
            extracted_entities: Vec::new(),
        };
    }

    Classification {
        intent: Intent::GeneralConversation,
        confidence: 0.3,
        reasoning: "no creation, editing, or question signal".to_string(),
        extracted_entities: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_wins_over_creation_with_existing_document() {
        let c = classify("change the title", true);
        assert_eq!(c.intent, Intent::EditExisting);
        assert_eq!(c.confidence, 0.9);
        assert!(c.extracted_entities.contains(&"change".to_string()));
    }

    #[test]
    fn editing_precedes_creation_even_when_both_present() {
        let c = classify("update the course and make it new", true);
        assert_eq!(c.intent, Intent::EditExisting);
        assert_eq!(c.confidence, 0.9);
    }

    #[test]
    fn creation_with_domain_noun_is_high_confidence() {
        let c = classify("create a new learning module about recursion", false);
        assert_eq!(c.intent, Intent::CreateNew);
        assert_eq!(c.confidence, 0.9);
        assert!(c.extracted_entities.contains(&"learning".to_string()));
        assert!(c.extracted_entities.contains(&"module".to_string()));
    }

    #[test]
    fn creation_without_domain_noun_is_medium_confidence() {
        let c = classify("make me something fun", false);
        assert_eq!(c.intent, Intent::CreateNew);
        assert_eq!(c.confidence, 0.7);
    }

    #[test]
    fn editing_verb_without_document_signals_weak_edit() {
        let c = classify("delete the second one", false);
        assert_eq!(c.intent, Intent::EditExisting);
        assert_eq!(c.confidence, 0.4);
    }

    #[test]
    fn question_markers_and_bare_question_mark() {
        let c = classify("explain this concept please", false);
        assert_eq!(c.intent, Intent::AskQuestion);
        assert_eq!(c.confidence, 0.8);

        let c = classify("recursion?", false);
        assert_eq!(c.intent, Intent::AskQuestion);
        assert_eq!(c.confidence, 0.9);
    }

    #[test]
    fn everything_else_is_conversation() {
        let c = classify("nice weather today", false);
        assert_eq!(c.intent, Intent::GeneralConversation);
        assert_eq!(c.confidence, 0.3);
    }

    #[test]
    fn never_panics_and_confidence_in_range() {
        for utterance in ["", "   ", "???", "a", "\u{1F600} ok", "DELETE EVERYTHING"] {
            for has_doc in [true, false] {
                let c = classify(utterance, has_doc);
                assert!((0.0..=1.0).contains(&c.confidence));
            }
        }
    }
}
