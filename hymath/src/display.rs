//! Plain-text rendering of an expression tree.
//!
//! [`render`] prints the expression the way it would be typed, with the node
//! under the cursor wrapped in `‹…›`. [`debug_tree`] dumps one node per line,
//! indented by depth, together with the cached type of every node.
use std::fmt::Write;

use crate::{
    operators::{ContextEvaluable, Operator, OperatorKind},
    tree::{NodeId, Tree},
};

/// Text shown for an empty placeholder.
pub const EMPTY_SLOT: &str = "[---]";

/// One-line form of the whole tree.
///
/// ```
/// use hymath::{catalog, display::render, parser::TreeParser};
///
/// let mut parser = TreeParser::new(catalog::all());
/// parser.parse_expression("(1 + 2) * 3").unwrap();
/// assert_eq!(render(parser.tree(), None), "(1 + 2) * 3");
/// ```
pub fn render(tree: &Tree, cursor: Option<NodeId>) -> String {
    render_node(tree, tree.root(), cursor)
}

/// One-line form of the subtree rooted at `id`.
pub fn render_node(tree: &Tree, id: NodeId, cursor: Option<NodeId>) -> String {
    let Some(op) = tree.op(id) else {
        return String::new();
    };
    let children = tree.children(id);
    let draw = |child: NodeId| render_node(tree, child, cursor);
    let operand = |child: NodeId| {
        let text = draw(child);
        match (tree.priority(child), op.priority()) {
            (Some(inner), Some(outer)) if inner < outer => format!("({text})"),
            (Some(_), None) if op.shape().prefix => format!("({text})"),
            _ => text,
        }
    };

    let text = match op {
        Operator::Empty(_) => EMPTY_SLOT.to_string(),
        Operator::Expression(_) => children.first().map(|&child| draw(child)).unwrap_or_default(),
        Operator::Number(literal) => literal.entry(),
        Operator::Identifier(literal) => format!("\"{}\"", literal.name),
        Operator::Variable(variable) => variable.name.clone(),
        Operator::Constant(constant) => constant.display_name.clone(),
        Operator::List(_) => format!("[{}]", join(children.into_iter().map(&draw), ", ")),
        Operator::Infix(infix) => join(
            children.into_iter().map(&operand),
            &format!(" {} ", infix.identifier()),
        ),
        Operator::PrefixFunction(function) => {
            let mut parts = children.into_iter().map(&operand);
            let prefix = parts.next().unwrap_or_default();
            format!("{} {} {}", prefix, function.identifier(), join(parts, ", "))
        }
        Operator::Function(function) if function.identifier() == "(" => {
            format!("({})", join(children.into_iter().map(&draw), ", "))
        }
        Operator::Function(_) | Operator::Iterate(_) => format!(
            "{}({})",
            op.identifier(),
            join(children.into_iter().map(&draw), ", ")
        ),
    };

    if cursor == Some(id) {
        format!("‹{text}›")
    } else {
        text
    }
}

fn join(parts: impl Iterator<Item = String>, separator: &str) -> String {
    parts.collect::<Vec<_>>().join(separator)
}

/// Indented dump of the tree, one node per line. The cursor line is marked
/// with `>`.
pub fn debug_tree(tree: &Tree, cursor: Option<NodeId>) -> String {
    let mut out = String::new();
    debug_node(tree, tree.root(), cursor, 0, &mut out);
    out
}

fn debug_node(tree: &Tree, id: NodeId, cursor: Option<NodeId>, depth: usize, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let op = node.op();
    let marker = if cursor == Some(id) { '>' } else { ' ' };
    let _ = write!(out, "{}{}{:?}", marker, "  ".repeat(depth), OperatorKind::from(op));

    let detail = match op {
        Operator::Number(literal) => format!("entry: {}", literal.entry()),
        Operator::Identifier(literal) => format!("name: \"{}\"", literal.name),
        Operator::Variable(variable) => format!("name: {}", variable.name),
        Operator::Constant(constant) => {
            format!("name: {}, value: {}", constant.display_name, constant.value)
        }
        Operator::Infix(infix) => format!(
            "identifier: {}, priority: {}",
            infix.identifier(),
            infix.priority().unwrap_or_default()
        ),
        Operator::PrefixFunction(_) | Operator::Function(_) => {
            format!("identifier: {}", op.identifier())
        }
        Operator::Iterate(iterate) => format!(
            "identifier: {}, end: {}",
            iterate.identifier(),
            if iterate.has_end() { "visible" } else { "hidden" }
        ),
        Operator::Empty(_) | Operator::Expression(_) | Operator::List(_) => String::new(),
    };
    if !detail.is_empty() {
        let _ = write!(out, "({detail})");
    }
    if let Some(ty) = node.return_type() {
        let _ = write!(out, " : {ty}");
    }
    if !node.scope().is_empty() {
        let scope = node
            .scope()
            .iter()
            .map(|(name, binding)| match (&binding.ty, &binding.value) {
                (_, Some(value)) => format!("{name} = {value}"),
                (Some(ty), None) => format!("{name}: {ty}"),
                (None, None) => name.to_string(),
            })
            .collect::<Vec<_>>();
        let _ = write!(out, " {{{}}}", scope.join(", "));
    }
    out.push('\n');

    for child in node.children() {
        debug_node(tree, child, cursor, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog, parser::TreeParser};

    #[test]
    fn marks_cursor_and_empty_slots() {
        let mut parser = TreeParser::new(catalog::all());
        parser.parse_expression("1 +").unwrap();
        assert_eq!(render(parser.tree(), parser.cursor()), "1 + ‹[---]›");
    }

    #[test]
    fn debug_dump_indents_children() {
        let mut parser = TreeParser::new(catalog::all());
        parser.parse_expression("x * 2").unwrap();
        let dump = debug_tree(parser.tree(), None);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], " Expression");
        assert_eq!(lines[1], "   Infix(identifier: *, priority: 40)");
        assert_eq!(lines[2], "     Variable(name: x)");
        assert_eq!(lines[3], "     Number(entry: 2) : number");
    }
}
