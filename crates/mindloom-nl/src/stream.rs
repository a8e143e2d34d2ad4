//! Streaming content splitter: separates conversational prose from an
//! embedded structured payload in (possibly partial) AI response text.
//! Called on the cumulative buffer after every chunk, so it has to be
//! idempotent over growing prefixes and must never error — a candidate that
//! does not parse is simply not a payload yet.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload tags the splitter recognizes. Adding a tag is one entry here; the
/// scanning control flow does not change.
pub const RECOGNIZED_TAGS: &[&str] = &["mindmap"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPayload {
    /// Payload tag, e.g. "mindmap".
    pub kind: String,
    /// The parsed object. Shape-validated (ids, titles, children arrays) but
    /// not yet deserialized into a typed tree.
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    /// The input with the payload span stripped out, trimmed.
    pub display_content: String,
    pub payload: Option<ArtifactPayload>,
}

/// Split raw response text into display prose and an optional structured
/// payload. Fenced code blocks are scanned first; a permissive bare-brace
/// scan is the fallback. A payload that fails validation is discarded and the
/// raw text comes back untouched.
pub fn split(raw: &str) -> SplitResult {
    let candidate = find_fenced(raw).or_else(|| {
        if has_open_fence(raw) {
            // A fence is still streaming in; wait for it instead of
            // grabbing a half-delivered object out of its middle.
            None
        } else {
            find_bare(raw)
        }
    });

    match candidate {
        Some((span, payload)) => {
            if mindloom_core::validate_outline(&payload.data).is_err() {
                // Not a well-formed outline: surface the raw text as-is.
                return SplitResult {
                    display_content: raw.to_string(),
                    payload: None,
                };
            }
            let mut display = String::with_capacity(raw.len());
            display.push_str(&raw[..span.0]);
            display.push_str(&raw[span.1..]);
            SplitResult {
                display_content: display.trim().to_string(),
                payload: Some(payload),
            }
        }
        None => SplitResult {
            display_content: raw.to_string(),
            payload: None,
        },
    }
}

fn has_open_fence(raw: &str) -> bool {
    raw.matches("```").count() % 2 == 1
}

/// Scan triple-backtick fences (optionally tagged `json`). Malformed JSON in
/// a block is swallowed and scanning continues with the next block. Returns
/// the byte span of the whole fenced block plus the accepted payload.
fn find_fenced(raw: &str) -> Option<((usize, usize), ArtifactPayload)> {
    let mut pos = 0;
    while let Some(open_rel) = raw[pos..].find("```") {
        let open = pos + open_rel;
        let body_start = match raw[open + 3..].find('\n') {
            // Skip the language tag line ("```json").
            Some(nl) => open + 3 + nl + 1,
            None => return None, // fence not closed yet (still streaming)
        };
        let close = match raw[body_start..].find("```") {
            Some(c) => body_start + c,
            None => return None,
        };
        let span_end = close + 3;

        if let Ok(value) = serde_json::from_str::<Value>(raw[body_start..close].trim()) {
            if let Some(payload) = accept(&value) {
                return Some(((open, span_end), payload));
            }
        }
        pos = span_end;
    }
    None
}

/// Permissive unfenced scan: the smallest balanced brace-delimited substring
/// that parses as JSON and carries sibling "title" and "children" keys (or a
/// recognized {type, data} wrapper). Streaming prefixes with unbalanced
/// braces simply yield nothing.
fn find_bare(raw: &str) -> Option<((usize, usize), ArtifactPayload)> {
    let bytes = raw.as_bytes();
    let mut best: Option<((usize, usize), ArtifactPayload)> = None;

    for start in 0..bytes.len() {
        if bytes[start] != b'{' {
            continue;
        }
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, ch) in raw[start..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        let end = start + offset + ch.len_utf8();
                        let snippet = &raw[start..end];
                        if snippet.contains("\"title\"") && snippet.contains("\"children\"") {
                            if let Ok(value) = serde_json::from_str::<Value>(snippet) {
                                if let Some(payload) = accept(&value) {
                                    let shorter = best
                                        .as_ref()
                                        .map(|(s, _)| end - start < s.1 - s.0)
                                        .unwrap_or(true);
                                    if shorter {
                                        best = Some(((start, end), payload));
                                    }
                                }
                            }
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    best
}

/// Accept a parsed object either as a tagged {type, data} wrapper with a
/// recognized tag, or as a bare document carrying title + children.
fn accept(value: &Value) -> Option<ArtifactPayload> {
    let obj = value.as_object()?;

    if let (Some(tag), Some(data)) = (obj.get("type").and_then(Value::as_str), obj.get("data")) {
        if RECOGNIZED_TAGS.contains(&tag) {
            return Some(ArtifactPayload {
                kind: tag.to_string(),
                data: data.clone(),
            });
        }
    }

    if obj.contains_key("title") && obj.contains_key("children") {
        return Some(ArtifactPayload {
            kind: RECOGNIZED_TAGS[0].to_string(),
            data: value.clone(),
        });
    }

    None
}

/// Per-response accumulation state. The host pushes chunks as they arrive
/// and calls `finish` when the producer signals end-of-stream; finishing
/// only flips the completion flag, it never re-runs parsing.
#[derive(Debug, Default)]
pub struct StreamSession {
    buffer: String,
    complete: bool,
    last: Option<SplitResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamUpdate {
    pub display_content: String,
    pub payload: Option<ArtifactPayload>,
    pub is_complete: bool,
}

impl StreamSession {
    pub fn new() -> StreamSession {
        StreamSession::default()
    }

    pub fn push(&mut self, chunk: &str) -> StreamUpdate {
        self.buffer.push_str(chunk);
        let result = split(&self.buffer);
        self.last = Some(result.clone());
        StreamUpdate {
            display_content: result.display_content,
            payload: result.payload,
            is_complete: self.complete,
        }
    }

    pub fn finish(&mut self) -> StreamUpdate {
        self.complete = true;
        let result = self
            .last
            .clone()
            .unwrap_or_else(|| split(&self.buffer));
        StreamUpdate {
            display_content: result.display_content,
            payload: result.payload,
            is_complete: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENCED: &str = "Here you go:\n```json\n{\"type\":\"mindmap\",\"data\":{\"id\":\"1\",\"title\":\"Root\",\"children\":[]}}\n```";

    #[test]
    fn fenced_payload_is_extracted_and_stripped() {
        let out = split(FENCED);
        assert_eq!(out.display_content, "Here you go:");
        let payload = out.payload.unwrap();
        assert_eq!(payload.kind, "mindmap");
        assert_eq!(payload.data["title"], "Root");
    }

    #[test]
    fn split_is_idempotent_on_complete_input() {
        let a = split(FENCED);
        let b = split(FENCED);
        assert_eq!(a, b);
    }

    #[test]
    fn untagged_fence_with_bare_document_is_accepted() {
        let raw = "Outline below.\n```\n{\"id\":\"1\",\"title\":\"Root\",\"children\":[{\"id\":\"2\",\"title\":\"Intro\",\"children\":[]}]}\n```\nEnjoy!";
        let out = split(raw);
        assert_eq!(out.display_content, "Outline below.\n\nEnjoy!");
        let payload = out.payload.unwrap();
        assert_eq!(payload.kind, "mindmap");
        assert_eq!(payload.data["children"][0]["title"], "Intro");
    }

    #[test]
    fn bare_json_without_fence_is_found() {
        let raw = "Sure: {\"id\":\"1\",\"title\":\"Root\",\"children\":[]} done";
        let out = split(raw);
        assert_eq!(out.display_content, "Sure:  done".trim());
        assert!(out.payload.is_some());
    }

    #[test]
    fn unrecognized_tag_is_not_a_payload() {
        let raw = "```json\n{\"type\":\"flowchart\",\"data\":{\"id\":\"1\",\"title\":\"x\"}}\n```";
        let out = split(raw);
        assert!(out.payload.is_none());
        assert_eq!(out.display_content, raw);
    }

    #[test]
    fn malformed_block_is_skipped_in_favor_of_a_later_one() {
        let raw = "```json\n{not json}\n```\n```json\n{\"id\":\"1\",\"title\":\"Root\",\"children\":[]}\n```";
        let out = split(raw);
        assert!(out.payload.is_some());
    }

    #[test]
    fn invalid_outline_is_discarded_and_raw_text_kept() {
        // Child is missing its id: shape check fails, nothing is stripped.
        let raw = "Here:\n```json\n{\"id\":\"1\",\"title\":\"Root\",\"children\":[{\"title\":\"x\"}]}\n```";
        let out = split(raw);
        assert!(out.payload.is_none());
        assert_eq!(out.display_content, raw);
    }

    #[test]
    fn streaming_prefix_yields_no_payload_until_closed() {
        let full = FENCED;
        for cut in [10, 30, 50, full.len() - 4] {
            let out = split(&full[..cut]);
            assert!(out.payload.is_none(), "no payload at prefix {}", cut);
        }
        assert!(split(full).payload.is_some());
    }

    #[test]
    fn session_accumulates_and_finishes_without_reparsing() {
        let mut session = StreamSession::new();
        let first = session.push("Here you go:\n```json\n{\"type\":\"mindmap\",");
        assert!(first.payload.is_none());
        assert!(!first.is_complete);

        let second =
            session.push("\"data\":{\"id\":\"1\",\"title\":\"Root\",\"children\":[]}}\n```");
        assert!(second.payload.is_some());

        let done = session.finish();
        assert!(done.is_complete);
        assert_eq!(done.payload, second.payload);
        assert_eq!(done.display_content, "Here you go:");
    }

    #[test]
    fn plain_prose_passes_through_unchanged() {
        let out = split("Loops let you repeat work until a condition changes.");
        assert!(out.payload.is_none());
        assert_eq!(
            out.display_content,
            "Loops let you repeat work until a condition changes."
        );
    }
}
