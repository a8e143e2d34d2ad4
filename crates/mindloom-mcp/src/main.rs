use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};

use mindloom_core::{guidance::GUIDANCE, mutate, mutate::FieldEdit, Difficulty, MindmapNode, NewModule};
use mindloom_nl::{command, intent, stream, Outcome};
use serde::Deserialize;

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetMindmapRequest {
    /// Name of the mindmap to retrieve
    name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetMindmapRequest {
    /// Name of the mindmap to create or overwrite
    name: String,
    /// The complete outline as a JSON string. Must be a single root object where every node has id, title and children; description, level, difficulty (beginner|intermediate|advanced), estimatedHours, skills and prerequisites are optional. See get_mindmap output for the exact schema.
    data: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct DeleteMindmapRequest {
    /// Name of the mindmap to delete
    name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AddModuleRequest {
    /// Name of the mindmap
    mindmap: String,
    /// ID of the parent module (e.g. "node-3"). Omit to add at the top level under the root.
    parent_id: Option<String>,
    /// The module to add. Missing fields take creation defaults (level derived from the parent, beginner, one estimated hour).
    module: NewModule,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct UpdateModuleItem {
    /// ID of the module to update (e.g. "node-3")
    node_id: String,
    /// New title
    title: Option<String>,
    /// New description
    description: Option<String>,
    /// New difficulty: "beginner", "intermediate" or "advanced"
    difficulty: Option<String>,
    /// New estimated hours. Negative values are clamped to zero.
    estimated_hours: Option<f64>,
    /// Skills to add (duplicates are ignored)
    #[serde(default)]
    add_skills: Vec<String>,
    /// Skills to remove
    #[serde(default)]
    remove_skills: Vec<String>,
    /// Prerequisites to add (duplicates are ignored)
    #[serde(default)]
    add_prerequisites: Vec<String>,
    /// Prerequisites to remove
    #[serde(default)]
    remove_prerequisites: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct UpdateModulesRequest {
    /// Name of the mindmap
    mindmap: String,
    /// Array of module updates to apply
    modules: Vec<UpdateModuleItem>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct DeleteModuleRequest {
    /// Name of the mindmap
    mindmap: String,
    /// ID of the module to delete together with its entire subtree. The root cannot be deleted.
    node_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct MoveModuleRequest {
    /// Name of the mindmap
    mindmap: String,
    /// ID of the module to move
    node_id: String,
    /// ID of the module that becomes its new parent
    new_parent_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct DuplicateModuleRequest {
    /// Name of the mindmap
    mindmap: String,
    /// ID of the module to duplicate. The copy and all its descendants get fresh ids and the copy's title gets a " (Copy)" suffix.
    node_id: String,
    /// ID of the parent for the copy. Omit to place it beside the original.
    new_parent_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct MergeModulesRequest {
    /// Name of the mindmap
    mindmap: String,
    /// ID of the module to merge away. Its skills, prerequisites and children move to the destination and the module itself is removed.
    source_id: String,
    /// ID of the module that absorbs the source
    dest_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ReorderModulesRequest {
    /// Name of the mindmap
    mindmap: String,
    /// Module ids in the desired order. Siblings are sorted by their position in this list; ids not listed keep their relative order after the listed ones.
    order: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CommandRequest {
    /// Name of the mindmap the instruction applies to
    mindmap: String,
    /// A natural-language editing instruction, e.g. "change the title of Intro to Python Basics". Use get_guidance for the supported phrasings.
    text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ClassifyRequest {
    /// The user utterance to classify
    text: String,
    /// Name of the mindmap the user is looking at, if any. Editing intent is only confident when a document exists.
    mindmap: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct IngestResponseRequest {
    /// Name of the mindmap to store an embedded outline under
    mindmap: String,
    /// Raw AI response text, possibly containing a fenced ```json mindmap payload mixed with prose
    text: String,
}

// --- Server ---

#[derive(Clone)]
pub struct MindloomServer {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MindloomServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all available mindmaps")]
    fn list_mindmaps(&self) -> Result<CallToolResult, McpError> {
        match mindloom_core::list_mindmaps() {
            Ok(names) => {
                let text = if names.is_empty() {
                    "No mindmaps found. Use set_mindmap to create one.".to_string()
                } else {
                    names.join("\n")
                };
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(
        description = "Get the full JSON content of a mindmap. Returns the root node: {id, title, description?, level, difficulty?, estimatedHours?, skills?, prerequisites?, children}. Children nest recursively."
    )]
    fn get_mindmap(
        &self,
        Parameters(req): Parameters<GetMindmapRequest>,
    ) -> Result<CallToolResult, McpError> {
        match mindloom_core::read_mindmap(&req.name) {
            Ok(root) => Ok(CallToolResult::success(vec![Content::text(pretty(&root))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to read mindmap '{}': {}",
                req.name, e
            ))])),
        }
    }

    #[tool(
        description = "Create or overwrite a mindmap from a complete JSON outline. The outline is validated first: every node needs a non-empty id and title, and children must be arrays."
    )]
    fn set_mindmap(
        &self,
        Parameters(req): Parameters<SetMindmapRequest>,
    ) -> Result<CallToolResult, McpError> {
        let value: serde_json::Value = match serde_json::from_str(&req.data) {
            Ok(v) => v,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Invalid JSON: {}",
                    e
                ))]))
            }
        };
        if let Err(e) = mindloom_core::validate_outline(&value) {
            return Ok(CallToolResult::error(vec![Content::text(e)]));
        }
        let root: MindmapNode = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Invalid outline: {}",
                    e
                ))]))
            }
        };
        match mindloom_core::write_mindmap(&req.name, &root) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Saved mindmap '{}'",
                req.name
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(description = "Delete a mindmap file")]
    fn delete_mindmap(
        &self,
        Parameters(req): Parameters<DeleteMindmapRequest>,
    ) -> Result<CallToolResult, McpError> {
        match mindloom_core::delete_mindmap(&req.name) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Deleted mindmap '{}'",
                req.name
            ))])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(
        description = "Add a module to a mindmap, either under a named parent or at the top level"
    )]
    fn add_module(
        &self,
        Parameters(req): Parameters<AddModuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            mutate::add_child(root, req.parent_id.as_deref(), req.module.clone())
                .map(|tree| (tree, format!("Added module '{}'", req.module.title)))
        })
    }

    #[tool(
        description = "Update fields of one or more existing modules. Unknown ids are skipped; each item only changes the fields it sets."
    )]
    fn update_modules(
        &self,
        Parameters(req): Parameters<UpdateModulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            let mut tree = root.clone();
            let mut touched = 0usize;
            for item in &req.modules {
                for edit in edits_of(item)? {
                    tree = mutate::update_field(&tree, &item.node_id, edit);
                }
                touched += 1;
            }
            Ok((tree, format!("Updated {} module(s)", touched)))
        })
    }

    #[tool(description = "Delete a module and its entire subtree. The root cannot be deleted.")]
    fn delete_module(
        &self,
        Parameters(req): Parameters<DeleteModuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            mutate::remove_node(root, &req.node_id)
                .map(|tree| (tree, format!("Deleted module '{}'", req.node_id)))
        })
    }

    #[tool(
        description = "Move a module (with its subtree) under a new parent. Ids are unchanged. The root cannot be moved, and a module cannot be moved into its own subtree."
    )]
    fn move_module(
        &self,
        Parameters(req): Parameters<MoveModuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            mutate::move_node(root, &req.node_id, &req.new_parent_id).map(|tree| {
                (
                    tree,
                    format!("Moved '{}' under '{}'", req.node_id, req.new_parent_id),
                )
            })
        })
    }

    #[tool(
        description = "Duplicate a module and its subtree. The copy gets fresh ids throughout and a \" (Copy)\" title suffix."
    )]
    fn duplicate_module(
        &self,
        Parameters(req): Parameters<DuplicateModuleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            mutate::duplicate_node(root, &req.node_id, req.new_parent_id.as_deref())
                .map(|tree| (tree, format!("Duplicated module '{}'", req.node_id)))
        })
    }

    #[tool(
        description = "Merge one module into another: skills and prerequisites are unioned, children move over keeping their ids, and the source module is removed"
    )]
    fn merge_modules(
        &self,
        Parameters(req): Parameters<MergeModulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            mutate::merge_nodes(root, &req.source_id, &req.dest_id).map(|tree| {
                (
                    tree,
                    format!("Merged '{}' into '{}'", req.source_id, req.dest_id),
                )
            })
        })
    }

    #[tool(
        description = "Reorder sibling modules. Every node's children are sorted by their position in the given id list; unlisted ids keep their relative order after the listed ones."
    )]
    fn reorder_modules(
        &self,
        Parameters(req): Parameters<ReorderModulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.mutate(&req.mindmap, |root| {
            Ok((
                mutate::reorder_children(root, &req.order),
                "Reordered modules".to_string(),
            ))
        })
    }

    #[tool(
        description = "Apply a natural-language editing instruction to a mindmap, e.g. \"set the difficulty of Loops to advanced\". Modules are referred to by title. On a successful edit the mindmap is saved and a summary is returned; an unrecognized instruction returns the supported phrasings instead."
    )]
    fn command(
        &self,
        Parameters(req): Parameters<CommandRequest>,
    ) -> Result<CallToolResult, McpError> {
        let root = match mindloom_core::read_mindmap(&req.mindmap) {
            Ok(r) => r,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Failed to read mindmap '{}': {}",
                    req.mindmap, e
                ))]))
            }
        };
        match mindloom_nl::interpret(&req.text, Some(&root)) {
            Outcome::Mutated { tree, summary } => {
                match mindloom_core::write_mindmap(&req.mindmap, &tree) {
                    Ok(()) => Ok(CallToolResult::success(vec![Content::text(summary)])),
                    Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
                }
            }
            Outcome::Rejected { message } => {
                Ok(CallToolResult::error(vec![Content::text(message)]))
            }
            Outcome::ParseMiss { guidance } => {
                Ok(CallToolResult::error(vec![Content::text(guidance)]))
            }
            Outcome::Handoff { plan } => Ok(CallToolResult::success(vec![Content::text(format!(
                "Not an editing command. Route: {} (clarification needed: {}).",
                plan.handler.as_str(),
                plan.needs_clarification
            ))])),
        }
    }

    #[tool(
        description = "Classify a user utterance by intent (create_new, edit_existing, ask_question, general_conversation) with a confidence score and the trigger words that justified it"
    )]
    fn classify(
        &self,
        Parameters(req): Parameters<ClassifyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let has_document = match &req.mindmap {
            Some(name) => mindloom_core::read_mindmap(name).is_ok(),
            None => false,
        };
        let classification = intent::classify(&req.text, has_document);
        let json = serde_json::to_string_pretty(&classification)
            .unwrap_or_else(|e| format!("Serialization error: {}", e));
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Ingest a raw AI response: split conversational prose from an embedded mindmap payload. A valid payload is saved under the given mindmap name; the prose is returned either way."
    )]
    fn ingest_response(
        &self,
        Parameters(req): Parameters<IngestResponseRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = stream::split(&req.text);
        match result.payload {
            Some(payload) => {
                let root: MindmapNode = match serde_json::from_value(payload.data) {
                    Ok(r) => r,
                    Err(e) => {
                        return Ok(CallToolResult::error(vec![Content::text(format!(
                            "Invalid outline payload: {}",
                            e
                        ))]))
                    }
                };
                if let Err(e) = mindloom_core::write_mindmap(&req.mindmap, &root) {
                    return Ok(CallToolResult::error(vec![Content::text(e)]));
                }
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Saved mindmap '{}'.\n\n{}",
                    req.mindmap, result.display_content
                ))]))
            }
            None => Ok(CallToolResult::success(vec![Content::text(
                result.display_content,
            )])),
        }
    }

    #[tool(
        description = "Get the outline modeling guidance that governs how courses should be structured"
    )]
    fn get_guidance(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(GUIDANCE)]))
    }

    /// Read, transform, persist. Every structural tool goes through here so
    /// the read-modify-write sequence stays in one place.
    fn mutate<F>(&self, mindmap: &str, op: F) -> Result<CallToolResult, McpError>
    where
        F: FnOnce(&MindmapNode) -> Result<(MindmapNode, String), String>,
    {
        let root = match mindloom_core::read_mindmap(mindmap) {
            Ok(r) => r,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Failed to read mindmap '{}': {}",
                    mindmap, e
                ))]))
            }
        };
        match op(&root) {
            Ok((tree, summary)) => match mindloom_core::write_mindmap(mindmap, &tree) {
                Ok(()) => Ok(CallToolResult::success(vec![Content::text(summary)])),
                Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
            },
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }
}

#[tool_handler]
impl ServerHandler for MindloomServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!("{}\n\n## Outline Modeling Guidance\n{}", INSTRUCTIONS, GUIDANCE);
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn pretty(root: &MindmapNode) -> String {
    serde_json::to_string_pretty(root).unwrap_or_else(|e| format!("Serialization error: {}", e))
}

/// Expand one update item into field edits. Ordered so removals run after
/// additions within the same item.
fn edits_of(item: &UpdateModuleItem) -> Result<Vec<FieldEdit>, String> {
    let mut edits = Vec::new();
    if let Some(title) = &item.title {
        edits.push(FieldEdit::Title(title.clone()));
    }
    if let Some(desc) = &item.description {
        edits.push(FieldEdit::Description(desc.clone()));
    }
    if let Some(d) = &item.difficulty {
        match Difficulty::parse(d) {
            Some(difficulty) => edits.push(FieldEdit::Difficulty(difficulty)),
            None => {
                return Err(format!(
                    "Unknown difficulty '{}': expected beginner, intermediate or advanced",
                    d
                ))
            }
        }
    }
    if let Some(hours) = item.estimated_hours {
        edits.push(FieldEdit::Hours(hours));
    }
    for skill in &item.add_skills {
        edits.push(FieldEdit::AddSkill(skill.clone()));
    }
    for skill in &item.remove_skills {
        edits.push(FieldEdit::RemoveSkill(skill.clone()));
    }
    for p in &item.add_prerequisites {
        edits.push(FieldEdit::AddPrerequisite(p.clone()));
    }
    for p in &item.remove_prerequisites {
        edits.push(FieldEdit::RemovePrerequisite(p.clone()));
    }
    Ok(edits)
}

const INSTRUCTIONS: &str = r#"mindloom is a course-outline planning tool. You are editing mindmap outlines stored as .loom files (JSON format) in the user's home directory under ~/.mindloom.

Each mindmap is a single tree. The root node is the course itself; every other node is a module or lesson with a title, an optional description, a difficulty (beginner/intermediate/advanced), estimated hours, taught skills and prerequisites.

Typical workflows:
- To see what exists: list_mindmaps, then get_mindmap for the one you need.
- To create or replace a whole outline: set_mindmap with the complete JSON.
- To make targeted structural edits: add_module, update_modules, delete_module, move_module, duplicate_module, merge_modules, reorder_modules. These read, transform and save in one step.
- To apply a plain-English edit the user typed: command. It resolves module titles to ids itself and tells you the supported phrasings when it cannot parse the instruction.
- To decide how to handle free-form user input: classify.
- When you have an AI-generated response that may embed an outline: ingest_response separates the prose from the payload and saves the outline.

Module ids look like "node-<uuid>" and are assigned by the server; never invent ids, take them from get_mindmap output. Prefer targeted edits over set_mindmap so unrelated parts of the outline are not rewritten."#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle `mindloom-mcp init` subcommand
    if std::env::args().nth(1).as_deref() == Some("init") {
        return init_project();
    }

    let service = MindloomServer::new()
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| eprintln!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}

/// Write project-scoped MCP config files in the current directory so that
/// Claude Code and/or Codex discover mindloom-mcp when working in this
/// project. Only writes config for tools that are actually installed.
fn init_project() -> Result<(), Box<dyn std::error::Error>> {
    let binary_path = std::env::current_exe()?
        .canonicalize()?
        .to_string_lossy()
        .to_string();

    let cwd = std::env::current_dir()?;

    let has_claude = which("claude");
    let has_codex = which("codex");

    if !has_claude && !has_codex {
        eprintln!("Neither `claude` nor `codex` found in PATH.");
        eprintln!("Install Claude Code or OpenAI Codex first, then re-run `mindloom-mcp init`.");
        std::process::exit(1);
    }

    let mut wrote_any = false;

    if has_claude {
        init_claude_code(&cwd, &binary_path)?;
        wrote_any = true;
    }

    if has_codex {
        init_codex(&cwd, &binary_path)?;
        wrote_any = true;
    }

    if wrote_any {
        let tools: Vec<&str> = [
            if has_claude { Some("Claude Code") } else { None },
            if has_codex { Some("Codex") } else { None },
        ]
        .into_iter()
        .flatten()
        .collect();
        eprintln!(
            "\nDone. {} will use mindloom in this project.",
            tools.join(" and ")
        );
    }

    Ok(())
}

fn which(name: &str) -> bool {
    // Check PATH for the given binary
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| {
                let candidate = dir.join(name);
                candidate.is_file() || dir.join(format!("{name}.exe")).is_file()
            })
        })
        .unwrap_or(false)
}

/// Write .mcp.json for Claude Code, merging with any existing config.
fn init_claude_code(
    cwd: &std::path::Path,
    binary_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mcp_json_path = cwd.join(".mcp.json");
    let mut root: serde_json::Value = if mcp_json_path.exists() {
        let contents = std::fs::read_to_string(&mcp_json_path)?;
        serde_json::from_str(&contents).unwrap_or_else(|_| serde_json::json!({}))
    } else {
        serde_json::json!({})
    };

    if !root.get("mcpServers").is_some_and(|v| v.is_object()) {
        root["mcpServers"] = serde_json::json!({});
    }
    root["mcpServers"]["mindloom"] = serde_json::json!({
        "type": "stdio",
        "command": binary_path,
        "args": [],
    });

    std::fs::write(&mcp_json_path, serde_json::to_string_pretty(&root)?)?;
    eprintln!("Wrote {}", mcp_json_path.display());
    Ok(())
}

/// Write .codex/config.toml for OpenAI Codex, merging with any existing config.
fn init_codex(
    cwd: &std::path::Path,
    binary_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let codex_dir = cwd.join(".codex");
    let config_toml_path = codex_dir.join("config.toml");

    let mut doc: toml_edit::DocumentMut = if config_toml_path.exists() {
        std::fs::read_to_string(&config_toml_path)?
            .parse()
            .unwrap_or_default()
    } else {
        toml_edit::DocumentMut::new()
    };

    if !doc.contains_table("mcp_servers") {
        doc["mcp_servers"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    let mut server = toml_edit::Table::new();
    server.insert("command", toml_edit::value(binary_path));
    server.insert("args", toml_edit::value(toml_edit::Array::new()));
    doc["mcp_servers"]["mindloom"] = toml_edit::Item::Table(server);

    std::fs::create_dir_all(&codex_dir)?;
    std::fs::write(&config_toml_path, doc.to_string())?;
    eprintln!("Wrote {}", config_toml_path.display());
    Ok(())
}
