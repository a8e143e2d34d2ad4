pub mod command;
pub mod intent;
pub mod prompt;
pub mod resolve;
pub mod route;
pub mod stream;

use mindloom_core::MindmapNode;
use serde::{Deserialize, Serialize};

/// What the user is trying to do, judged from one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateNew,
    EditExisting,
    AskQuestion,
    GeneralConversation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub intent: Intent,
    /// In [0, 1].
    pub confidence: f64,
    /// Diagnostic only — never branched on.
    pub reasoning: String,
    /// The trigger words that justified the classification.
    pub extracted_entities: Vec<String>,
}

/// Handling strategy a classified utterance routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
    Creation,
    Editing,
    Explanation,
    Chat,
}

impl Handler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handler::Creation => "creation",
            Handler::Editing => "editing",
            Handler::Explanation => "explanation",
            Handler::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    HowTo,
    WhatIs,
    Why,
    When,
    Where,
    Who,
    General,
}

/// Descriptor consumed by the prompt-construction / LLM layer. Producing it
/// has no side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub handler: Handler,
    /// Mutation tools may only run on the editing path with a document present.
    pub allow_tools: bool,
    pub needs_clarification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionKind>,
    pub system_prompt: String,
}

/// Result of running one utterance through the full pipeline.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// An editing command matched, resolved, and applied. The caller persists
    /// the new tree.
    Mutated { tree: MindmapNode, summary: String },
    /// Not an editing command — hand the utterance to the LLM with the
    /// selected handler and prompt. New documents come back through the
    /// streaming splitter, not through this path.
    Handoff { plan: RoutePlan },
    /// Editing was intended but no grammar rule matched.
    ParseMiss { guidance: String },
    /// A command matched but could not be applied (unknown title, root
    /// rejection). Document unchanged.
    Rejected { message: String },
}

/// Classify, route, and — when the route allows mutation tools — parse and
/// apply an editing command against the current tree. Pure: the caller owns
/// persistence of any returned tree.
pub fn interpret(utterance: &str, tree: Option<&MindmapNode>) -> Outcome {
    let classification = intent::classify(utterance, tree.is_some());
    let plan = route::route(&classification, tree);
    eprintln!(
        "[mindloom-nl] intent={:?} confidence={} handler={}",
        classification.intent,
        classification.confidence,
        plan.handler.as_str()
    );

    if let (true, Some(tree)) = (plan.allow_tools, tree) {
        match command::parse(utterance) {
            Some(cmd) => match command::apply(&cmd.op, tree) {
                Ok(new_tree) => Outcome::Mutated {
                    tree: new_tree,
                    summary: cmd.summary,
                },
                Err(message) => Outcome::Rejected { message },
            },
            None => Outcome::ParseMiss {
                guidance: command::usage(),
            },
        }
    } else {
        Outcome::Handoff { plan }
    }
}
