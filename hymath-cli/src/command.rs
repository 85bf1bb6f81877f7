//! Colon commands of the interactive session
//!
//! Role
//! - Hold the editor together with the display state of the session.
//! - Dispatch `:name argument` lines to the command table and feed every
//!   other line to the editor as a raw token.
use std::{fmt::Write as _, fs, ops::Range};

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use hymath::{
    catalog,
    error::{EditError, EditErrorKind, EvalError, PersistError},
    operators::{
        NumberLiteral,
        number::{POINT_TOKEN, SIGN_TOKEN},
    },
    parser::{Token, TreeParser},
};
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("The command `:{0}` takes no argument.")]
    UnexpectedArgument(String),

    #[error("The command `:{0}` expects an argument. Type `:help` for the usage.")]
    MissingArgument(String),

    #[error("Unknown command `:{0}`. Type `:help` for the list of commands.")]
    UnknownCommand(String),

    #[error("`{0}` is not a token. Tokens are written `name` or `name:arg1:arg2`.")]
    InvalidToken(String),

    #[error("There is no variable named `{0}` at the top level.")]
    UnknownVariable(String),

    #[error("Cannot store the expression: {0}")]
    Evaluation(#[from] EvalError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// What the read loop does after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

type Action = fn(&mut Session, &str) -> Result<Flow, CommandError>;

pub struct Command {
    pub names: &'static [&'static str],
    /// Placeholder shown in the help for commands taking an argument.
    pub argument: Option<&'static str>,
    pub description: &'static str,
    action: Action,
}

impl Command {
    fn call(&self, session: &mut Session, name: &str, arg: &str) -> Result<Flow, CommandError> {
        match (self.argument, arg.is_empty()) {
            (None, false) => Err(CommandError::UnexpectedArgument(name.to_string())),
            (Some(_), true) => Err(CommandError::MissingArgument(name.to_string())),
            _ => (self.action)(session, arg),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.names.contains(&name)
    }

    /// One help line, e.g. `:s :store <name>   evaluate and store ...`.
    pub fn help(&self) -> String {
        let argument = self.argument.map(|arg| format!(" {arg}")).unwrap_or_default();
        let usage = self
            .names
            .iter()
            .map(|name| format!(":{name}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{:<28}{}", usage + &argument, self.description)
    }
}

pub const COMMANDS: &[Command] = &[
    Command {
        names: &["q", "quit"],
        argument: None,
        description: "quit the calculator",
        action: quit,
    },
    Command {
        names: &["h", "help"],
        argument: None,
        description: "show this message",
        action: help,
    },
    Command {
        names: &["n", "new", "c", "clear"],
        argument: None,
        description: "start a new expression, keeping stored variables",
        action: new_expression,
    },
    Command {
        names: &["s", "store"],
        argument: Some("<name>"),
        description: "evaluate the expression and store the result",
        action: store,
    },
    Command {
        names: &["d", "debug"],
        argument: None,
        description: "toggle the tree dump",
        action: toggle_debug,
    },
    Command {
        names: &["e", "expr"],
        argument: Some("<text>"),
        description: "type an infix expression at the cursor",
        action: expression,
    },
    Command {
        names: &["t", "token"],
        argument: Some("<token>"),
        description: "apply raw tokens, e.g. `#variable:x` or `#number:1;+`",
        action: token,
    },
    Command {
        names: &["v", "vars"],
        argument: None,
        description: "list stored variables",
        action: variables,
    },
    Command {
        names: &["r", "remove"],
        argument: Some("<name>"),
        description: "delete a stored variable",
        action: remove,
    },
    Command {
        names: &["save"],
        argument: Some("<path>"),
        description: "write the expression to a JSON document",
        action: save,
    },
    Command {
        names: &["load"],
        argument: Some("<path>"),
        description: "replace the expression by a JSON document",
        action: load,
    },
];

/// Editor plus what the read loop shows around it.
pub struct Session {
    pub parser: TreeParser,
    pub debug: bool,
    /// Outcome of the last line, shown below the expression.
    pub message: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            parser: TreeParser::new(catalog::all()),
            debug: false,
            message: String::new(),
        }
    }

    /// Handle one input line.
    pub fn execute(&mut self, line: &str) -> Result<Flow, CommandError> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            self.feed(line)?;
            return Ok(Flow::Continue);
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map(|(name, arg)| (name, arg.trim()))
            .unwrap_or((command, ""));
        let name = name.to_lowercase();
        let command = COMMANDS
            .iter()
            .find(|command| command.matches(&name))
            .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;
        command.call(self, &name, arg)
    }

    /// Apply a line that is not a command. Numbers and the `+-` and `.`
    /// fragments extend a numeric literal.
    fn feed(&mut self, raw: &str) -> Result<(), CommandError> {
        if raw.is_empty() {
            return Ok(());
        }
        if is_number_entry(raw) {
            self.parser.parse_token("#number", [raw])?;
        } else {
            let token = Token::parse(raw).ok_or_else(|| CommandError::InvalidToken(raw.to_string()))?;
            self.parser.process_token(&token)?;
        }
        self.message = "Ok".to_string();
        Ok(())
    }

    /// Run `edit` and carry the values assigned on the old root over to
    /// whatever root the editor ends up with.
    fn keeping_variables<T>(&mut self, edit: impl FnOnce(&mut TreeParser) -> T) -> T {
        let root = self.parser.root();
        let stored = self.parser.tree_mut().variables(root).export();
        let result = edit(&mut self.parser);
        let root = self.parser.root();
        self.parser.tree_mut().variables(root).import(stored);
        result
    }
}

fn is_number_entry(raw: &str) -> bool {
    raw == SIGN_TOKEN
        || raw == POINT_TOKEN
        || (raw.bytes().any(|b| b.is_ascii_digit()) && NumberLiteral::parse(raw).is_some())
}

fn quit(_: &mut Session, _: &str) -> Result<Flow, CommandError> {
    Ok(Flow::Quit)
}

fn help(session: &mut Session, _: &str) -> Result<Flow, CommandError> {
    let mut message = String::from("Commands:\n");
    for command in COMMANDS {
        let _ = writeln!(message, "  {}", command.help());
    }
    let navigation = session.parser.navigation();
    let _ = writeln!(
        message,
        "Navigation: `{}` next, `{}` previous, `{}` clear",
        navigation.advance, navigation.retreat, navigation.erase
    );
    message.push_str("Operators:\n  ");
    message.push_str(
        &session
            .parser
            .operators()
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "),
    );
    session.message = message;
    Ok(Flow::Continue)
}

fn new_expression(session: &mut Session, _: &str) -> Result<Flow, CommandError> {
    session.keeping_variables(TreeParser::clear);
    session.message = "New expression".to_string();
    Ok(Flow::Continue)
}

fn store(session: &mut Session, name: &str) -> Result<Flow, CommandError> {
    let value = session.parser.evaluate()?;
    let root = session.parser.root();
    session.parser.tree_mut().variables(root).set(name, value.clone());
    info!("Stored `{}` = {}", name, value);
    session.message = format!("{name} = {value}");
    Ok(Flow::Continue)
}

fn toggle_debug(session: &mut Session, _: &str) -> Result<Flow, CommandError> {
    session.debug = !session.debug;
    session.message = format!("Tree dump {}", if session.debug { "on" } else { "off" });
    Ok(Flow::Continue)
}

fn expression(session: &mut Session, text: &str) -> Result<Flow, CommandError> {
    if let Err(error) = session.parser.parse_expression(text) {
        if let EditErrorKind::SyntaxError {
            reason,
            span: Some(span),
        } = &error.kind
        {
            report_syntax_error(text, reason, span.clone());
        }
        return Err(error.into());
    }
    session.message = "Ok".to_string();
    Ok(Flow::Continue)
}

fn token(session: &mut Session, raw: &str) -> Result<Flow, CommandError> {
    session.parser.parse_command(raw)?;
    session.message = "Ok".to_string();
    Ok(Flow::Continue)
}

fn variables(session: &mut Session, _: &str) -> Result<Flow, CommandError> {
    let tree = session.parser.tree();
    let mut message = String::new();
    for (name, binding) in tree.scope(tree.root()).into_iter().flat_map(|scope| scope.iter()) {
        let _ = match (&binding.value, &binding.ty) {
            (Some(value), _) => writeln!(message, "  {name} = {value}"),
            (None, Some(ty)) => writeln!(message, "  {name} : {ty}"),
            (None, None) => writeln!(message, "  {name}"),
        };
    }
    session.message = if message.is_empty() {
        "No stored variables".to_string()
    } else {
        format!("Variables:\n{}", message.trim_end())
    };
    Ok(Flow::Continue)
}

fn remove(session: &mut Session, name: &str) -> Result<Flow, CommandError> {
    let root = session.parser.root();
    let declared = session
        .parser
        .tree()
        .scope(root)
        .is_some_and(|scope| scope.contains(name));
    if !declared {
        return Err(CommandError::UnknownVariable(name.to_string()));
    }
    session.parser.tree_mut().variables(root).delete(name);
    session.message = format!("Removed `{name}`");
    Ok(Flow::Continue)
}

fn save(session: &mut Session, path: &str) -> Result<Flow, CommandError> {
    let document = session.parser.save(true)?;
    fs::write(path, document).map_err(PersistError::from)?;
    info!("Saved expression to {}", path);
    session.message = format!("Saved to {path}");
    Ok(Flow::Continue)
}

fn load(session: &mut Session, path: &str) -> Result<Flow, CommandError> {
    let document = fs::read_to_string(path).map_err(PersistError::from)?;
    session.keeping_variables(|parser| parser.load(&document))?;
    info!("Loaded expression from {}", path);
    session.message = format!("Loaded {path}");
    Ok(Flow::Continue)
}

/// Print a labelled report pointing at `span` inside `source`.
pub fn report_syntax_error(source: &str, reason: &str, span: Range<usize>) {
    let mut colors = ColorGenerator::new();
    let file = "<expr>".to_string();
    let span = (file.clone(), span);

    let printed = Report::build(ReportKind::Error, span.clone())
        .with_message(format!("Syntax error: {reason}"))
        .with_label(
            Label::new(span)
                .with_message("The error occurred here")
                .with_color(colors.next()),
        )
        .finish()
        .eprint((file, Source::from(source.to_string())));
    if let Err(error) = printed {
        warn!("Could not print the syntax report: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use hymath::types::Value;

    use super::*;

    #[test]
    fn raw_numbers_build_a_literal() {
        let mut session = Session::new();
        for line in ["1", ".", "5", "+-"] {
            session.execute(line).unwrap();
        }
        assert_eq!(session.parser.evaluate(), Ok(Value::Number(-1.5)));
        assert!(is_number_entry("12.5"));
        assert!(!is_number_entry("-"));
    }

    #[test]
    fn stored_values_survive_a_new_expression() {
        let mut session = Session::new();
        session.execute(":expr 2 * 21").unwrap();
        session.execute(":store answer").unwrap();
        session.execute(":new").unwrap();
        session.execute(":expr answer + 1").unwrap();
        assert_eq!(session.parser.evaluate(), Ok(Value::Number(43.0)));

        session.execute(":remove answer").unwrap();
        assert!(session.parser.evaluate().is_err());
        assert!(matches!(
            session.execute(":remove answer"),
            Err(CommandError::UnknownVariable(_))
        ));
    }

    #[test]
    fn arguments_are_checked() {
        let mut session = Session::new();
        assert!(matches!(
            session.execute(":quit now"),
            Err(CommandError::UnexpectedArgument(_))
        ));
        assert!(matches!(
            session.execute(":store"),
            Err(CommandError::MissingArgument(_))
        ));
        assert!(matches!(
            session.execute(":frobnicate"),
            Err(CommandError::UnknownCommand(_))
        ));
        assert_eq!(session.execute(":Q").unwrap(), Flow::Quit);
    }

    #[test]
    fn help_lists_commands_and_operators() {
        let mut session = Session::new();
        session.execute(":help").unwrap();
        assert!(session.message.contains(":store <name>"));
        assert!(session.message.contains("sin"));
    }
}
