/// Outline-modeling guidance — single source of truth for AI prompts and MCP
/// instructions.
pub const GUIDANCE: &str = "\
1. One root per mindmap. The root node is the course itself; every module, \
lesson, and topic lives somewhere below it. Never create a second top-level node.\n\
2. Titles describe content, not structure. A module title should say what the \
learner gets (\"Recursion Basics\"), not where it sits (\"Module 3\").\n\
3. Levels are hints, not law. The `level` field records intended depth \
(0 = root) but is never re-validated — do not rebuild a tree just to fix levels.\n\
4. Difficulty is one of beginner, intermediate, advanced. Estimated hours are \
non-negative; fractional hours are fine.\n\
5. Skills and prerequisites are plain strings with no duplicates. A skill names \
what the module teaches; a prerequisite names what the learner should already know.\n\
6. Children are ordered. Sibling order is the suggested learning order — use \
reorder_modules rather than delete-and-recreate to resequence.\n\
7. Ids are opaque and immutable. Refer to modules by title in natural-language \
commands; the command pipeline resolves titles to ids case-insensitively, \
first match wins.\n\
8. Prefer targeted edits over full rewrites. set_mindmap replaces the whole \
tree and should be reserved for initial generation; everything after that is \
add/update/move/merge/delete on individual modules.\n\
9. Generated mindmaps travel as fenced json. When producing a new outline in \
chat, emit exactly one fenced code block containing \
{\"type\": \"mindmap\", \"data\": {…tree…}} and keep prose outside the fence.";
