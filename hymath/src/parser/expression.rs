//! Textual front-end translating an infix expression into editor tokens.
//!
//! Every lexeme becomes one or more [`Token`]s fed to
//! [`TreeParser::process_token`], so text typed in one go builds exactly
//! the tree the same keystrokes would build interactively:
//! - a name directly followed by `(` inserts the registered function of that
//!   name; any other registered name inserts its operator (e.g. a constant)
//!   and unknown names become variable references;
//! - a `-` on an empty placeholder starts a negative literal;
//! - `)` `,` and `]` first leave the chain of associative operators around
//!   the cursor, then leave the call, move to the next argument or leave the
//!   list respectively.
use log::debug;

use crate::{
    error::{EditError, EditErrorKind},
    operators::{Operator, number::SIGN_TOKEN},
    parser::{
        Origin, Token, TreeParser,
        scanner::{Lexeme, scan},
    },
    tree::NodeId,
};

impl TreeParser {
    /// Type `text` at the cursor.
    ///
    /// ```
    /// use hymath::{catalog, parser::TreeParser, types::Value};
    ///
    /// let mut parser = TreeParser::new(catalog::all());
    /// parser.parse_expression("1 + 2 * 3").unwrap();
    /// assert_eq!(parser.evaluate(), Ok(Value::Number(7.0)));
    /// ```
    pub fn parse_expression(&mut self, text: &str) -> Result<(), EditError> {
        let lexemes = scan(text).map_err(|mut errors| {
            let (reason, span) = if errors.is_empty() {
                ("unreadable input".to_string(), None)
            } else {
                let (reason, span) = errors.swap_remove(0);
                (reason, Some(span))
            };
            self.error(EditErrorKind::SyntaxError { reason, span })
        })?;
        debug!("Scanned {} lexemes from `{}`", lexemes.len(), text);

        let mut lexemes = lexemes.into_iter().peekable();
        while let Some((lexeme, span)) = lexemes.next() {
            let span = span.start..span.end;
            let syntax_error = |reason: &str| EditErrorKind::SyntaxError {
                reason: reason.to_string(),
                span: Some(span.clone()),
            };

            match lexeme {
                Lexeme::Number(digits) => {
                    self.process_token(&Token::with_args("#number", [digits]))?;
                }
                Lexeme::Identifier(name) => {
                    self.process_token(&Token::with_args("#identifier", [name]))?;
                }
                Lexeme::Name(name) => {
                    let is_call = matches!(
                        lexemes.peek(),
                        Some((Lexeme::Symbol(symbol), _)) if symbol == "("
                    );
                    if is_call {
                        lexemes.next();
                        self.process_token(&Token::new(name))?;
                        if matches!(lexemes.peek(), Some((Lexeme::Close, _))) {
                            lexemes.next();
                        }
                    } else if self.operators.contains_key(&name) {
                        self.process_token(&Token::new(name))?;
                    } else {
                        self.process_token(&Token::with_args("#variable", [name]))?;
                    }
                }
                Lexeme::Symbol(symbol) => {
                    let on_empty = self
                        .cursor
                        .is_some_and(|cursor| self.tree.is_empty_node(cursor));
                    if symbol == "-" && on_empty {
                        self.process_token(&Token::with_args("#number", [SIGN_TOKEN]))?;
                    } else {
                        self.process_token(&Token::new(symbol))?;
                    }
                }
                Lexeme::OpenList => {
                    self.process_token(&Token::new("#list"))?;
                }
                Lexeme::Close => {
                    let current = self.leave_infix_chain();
                    let call = current
                        .and_then(|current| self.tree.parent(current))
                        .filter(|&parent| parent != self.tree.root());
                    match call {
                        Some(call) => self.cursor = Some(call),
                        None => return Err(self.error(syntax_error("unbalanced `)`"))),
                    }
                }
                Lexeme::Comma => {
                    let current = self.leave_infix_chain();
                    let Some((current, parent)) =
                        current.and_then(|current| Some((current, self.tree.parent(current)?)))
                    else {
                        return Err(self.error(syntax_error("`,` outside of an argument list")));
                    };
                    let next = self.next_child(parent, Origin::Child(current));
                    if next == parent {
                        return Err(self.error(syntax_error("too many arguments")));
                    }
                    self.cursor = Some(next);
                }
                Lexeme::CloseList => {
                    let current = self.leave_infix_chain();
                    let list = current
                        .and_then(|current| self.tree.parent(current))
                        .filter(|&parent| self.tree.op(parent).is_some_and(Operator::is_list));
                    match list {
                        Some(list) => self.cursor = Some(list),
                        None => return Err(self.error(syntax_error("`]` without a list"))),
                    }
                }
            }
        }
        Ok(())
    }

    /// Climb from the cursor to the outermost node of the chain of
    /// associative operators enclosing it.
    fn leave_infix_chain(&self) -> Option<NodeId> {
        let mut current = self.cursor?;
        while let Some(parent) = self.tree.parent(current) {
            if self.tree.priority(parent).is_none() {
                break;
            }
            current = parent;
        }
        Some(current)
    }
}
