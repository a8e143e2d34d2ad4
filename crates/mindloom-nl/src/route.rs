//! Maps a classification to a handling strategy. Deterministic lookup, no
//! side effects; the prompt/LLM layer consumes the resulting descriptor.

use mindloom_core::MindmapNode;

use crate::{prompt, Classification, Handler, Intent, QuestionKind, RoutePlan};

const HIGH: f64 = 0.8;
const MEDIUM: f64 = 0.5;

pub fn route(classification: &Classification, document: Option<&MindmapNode>) -> RoutePlan {
    let confident = classification.confidence >= MEDIUM;
    let medium = classification.confidence < HIGH && confident;

    let (handler, question) = if !confident {
        (Handler::Chat, None)
    } else {
        match classification.intent {
            Intent::CreateNew => (Handler::Creation, None),
            Intent::EditExisting => (Handler::Editing, None),
            Intent::AskQuestion => (
                Handler::Explanation,
                Some(question_kind(&classification.extracted_entities)),
            ),
            Intent::GeneralConversation => (Handler::Chat, None),
        }
    };

    let allow_tools = handler == Handler::Editing && document.is_some();
    let needs_clarification = handler == Handler::Chat || medium;

    RoutePlan {
        handler,
        allow_tools,
        needs_clarification,
        question,
        system_prompt: prompt::system_prompt(handler, document),
    }
}

/// Sub-classify the question from the trigger words the classifier matched.
fn question_kind(entities: &[String]) -> QuestionKind {
    let has = |w: &str| entities.iter().any(|e| e == w);
    if has("how") {
        QuestionKind::HowTo
    } else if has("what") || has("which") {
        QuestionKind::WhatIs
    } else if has("why") {
        QuestionKind::Why
    } else if has("when") {
        QuestionKind::When
    } else if has("where") {
        QuestionKind::Where
    } else if has("who") {
        QuestionKind::Who
    } else {
        QuestionKind::General
    }
}
