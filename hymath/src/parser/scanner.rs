//! Lexer for the textual expression syntax using chumsky.
//!
//! Recognised lexemes:
//! - Numbers: digits with an optional fraction (`12`, `1.5`, `3.`) or a bare
//!   fraction (`.5`, `.`).
//! - Identifier literals: `"name"`.
//! - Names: `[A-Za-z_][A-Za-z0-9_]*`, resolved later to functions, constants
//!   or variables.
//! - Operator symbols: `+ - * / ^ (`.
//! - Punctuation: `)` closes a call, `,` moves to the next argument, `[` and
//!   `]` open and close a list.
use std::ops::Range;

use chumsky::prelude::*;

pub type Spanned<T> = (T, SimpleSpan);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lexeme {
    Number(String),
    Identifier(String),
    Name(String),
    Symbol(String),
    Close,
    Comma,
    OpenList,
    CloseList,
}

impl std::fmt::Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lexeme::Number(digits) => write!(f, "{digits}"),
            Lexeme::Identifier(name) => write!(f, "\"{name}\""),
            Lexeme::Name(name) => write!(f, "{name}"),
            Lexeme::Symbol(symbol) => write!(f, "{symbol}"),
            Lexeme::Close => write!(f, ")"),
            Lexeme::Comma => write!(f, ","),
            Lexeme::OpenList => write!(f, "["),
            Lexeme::CloseList => write!(f, "]"),
        }
    }
}

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Spanned<Lexeme>>, extra::Err<Rich<'a, char>>> {
    let digit = any().filter(|c: &char| c.is_ascii_digit());

    let number = choice((
        digit
            .clone()
            .then(digit.clone().repeated())
            .then(just('.').then(digit.clone().repeated()).or_not())
            .to_slice(),
        just('.').then(digit.repeated()).to_slice(),
    ))
    .map(|s: &str| Lexeme::Number(s.to_string()));

    let identifier = just('"')
        .ignore_then(any().filter(|c: &char| *c != '"').repeated().to_slice())
        .then_ignore(just('"'))
        .map(|s: &str| Lexeme::Identifier(s.to_string()))
        .labelled("identifier literal");

    let name = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(|s: &str| Lexeme::Name(s.to_string()));

    let symbol = one_of("+-*/^(").map(|c: char| Lexeme::Symbol(c.to_string()));

    let punct = choice((
        just(')').to(Lexeme::Close),
        just(',').to(Lexeme::Comma),
        just('[').to(Lexeme::OpenList),
        just(']').to(Lexeme::CloseList),
    ));

    let lexeme = choice((number, identifier, name, symbol, punct));

    lexeme
        .map_with(|lexeme, e| (lexeme, e.span()))
        .padded()
        .repeated()
        .collect()
        .padded()
        .then_ignore(end())
}

/// Split `src` into lexemes. On failure returns every error message with the
/// byte range it refers to.
pub fn scan(src: &str) -> Result<Vec<Spanned<Lexeme>>, Vec<(String, Range<usize>)>> {
    lexer().parse(src).into_result().map_err(|errors| {
        errors
            .into_iter()
            .map(|e| {
                let span = e.span();
                (e.to_string(), span.start..span.end)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexemes(src: &str) -> Vec<Lexeme> {
        scan(src)
            .expect("scan failed")
            .into_iter()
            .map(|(lexeme, _)| lexeme)
            .collect()
    }

    #[test]
    fn scans_numbers_names_and_symbols() {
        assert_eq!(
            lexemes("sin(1.5) + x2*.5"),
            vec![
                Lexeme::Name("sin".into()),
                Lexeme::Symbol("(".into()),
                Lexeme::Number("1.5".into()),
                Lexeme::Close,
                Lexeme::Symbol("+".into()),
                Lexeme::Name("x2".into()),
                Lexeme::Symbol("*".into()),
                Lexeme::Number(".5".into()),
            ]
        );
    }

    #[test]
    fn scans_lists_and_identifier_literals() {
        assert_eq!(
            lexemes(" [\"i\", 3.] "),
            vec![
                Lexeme::OpenList,
                Lexeme::Identifier("i".into()),
                Lexeme::Comma,
                Lexeme::Number("3.".into()),
                Lexeme::CloseList,
            ]
        );
        assert!(lexemes("   ").is_empty());
    }

    #[test]
    fn reports_span_of_unknown_character() {
        let errors = scan("1 + $").unwrap_err();
        assert_eq!(errors[0].1, 4..5);
    }
}
