//! Python syntax checking for the restricted code tool
//!
//! The tool surface deliberately stops at parsing: source is checked
//! for well-formedness and never evaluated.

use tree_sitter::{Node, Parser};

/// Check that the given source parses as well-formed Python
///
/// # Errors
///
/// Returns a message locating the first syntax error
pub fn check_syntax(code: &str) -> Result<(), String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| format!("failed to load Python grammar: {e}"))?;

    let tree = parser
        .parse(code, None)
        .ok_or_else(|| "parser produced no syntax tree".to_string())?;

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    let node = first_error(root).unwrap_or(root);
    let position = node.start_position();
    Err(format!(
        "invalid syntax at line {}, column {}",
        position.row + 1,
        position.column + 1
    ))
}

/// Depth-first search for the first error or missing node
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
