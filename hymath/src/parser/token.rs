use std::fmt;

/// One editing step: an operator name or navigation command with optional
/// string arguments.
///
/// The textual form is `name:arg1:arg2`, e.g. `#variable:x` or `#number:5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub name: String,
    pub args: Vec<String>,
}

impl Token {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the `name:arg1:arg2` form. Returns `None` for an empty name.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(':');
        let name = parts.next().filter(|name| !name.is_empty())?;
        Some(Self::with_args(name, parts))
    }

    /// Split a `;`-separated batch such as `#number:1;+;#number:2`. Empty
    /// entries are skipped.
    pub fn parse_batch(text: &str) -> Vec<Token> {
        text.split(';').filter_map(Token::parse).collect()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, ":{}", arg)?;
        }
        Ok(())
    }
}

/// The tokens the editor interprets as navigation instead of operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTokens {
    /// Move to the next insertion point.
    pub advance: Token,
    /// Move to the previous insertion point.
    pub retreat: Token,
    /// Clear the node under the cursor.
    pub erase: Token,
}

impl Default for NavigationTokens {
    fn default() -> Self {
        Self {
            advance: Token::new("->"),
            retreat: Token::new("<-"),
            erase: Token::new("erase"),
        }
    }
}
