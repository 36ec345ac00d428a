//! The lexer contract.

use std::fmt;

/// A token handed back by [`Lexer::lex`].
///
/// Lexers may identify terminals either by the name interned in the
/// grammar or by a raw symbol id. Unknown ids are passed through to the
/// parser unchanged and surface as syntax errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Id(u32),
    Name(String),
}

impl From<u32> for Token {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

/// Source span attached to tokens and to reduced ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub first_line: u32,
    pub first_column: u32,
    pub last_line: u32,
    pub last_column: u32,
    /// Byte range, tracked only when the lexer reports `ranges()`.
    pub range: Option<(usize, usize)>,
}

impl Location {
    /// The span of a reduced rhs: start of the oldest frame, end of the
    /// newest.
    pub fn merge(first: &Location, last: &Location) -> Location {
        Location {
            first_line: first.first_line,
            first_column: first.first_column,
            last_line: last.last_line,
            last_column: last.last_column,
            range: match (first.range, last.range) {
                (Some((lo, _)), Some((_, hi))) => Some((lo, hi)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.first_line, self.first_column, self.last_line, self.last_column
        )
    }
}

/// The interface the parser drives for the duration of one parse.
///
/// `lex` returns `None` at end of input; the parser substitutes the
/// end-of-input marker. The `yy*` accessors must describe the most
/// recently returned token.
pub trait Lexer {
    fn set_input(&mut self, input: &str);

    fn lex(&mut self) -> Option<Token>;

    fn yytext(&self) -> &str;

    fn yyleng(&self) -> usize {
        self.yytext().len()
    }

    fn yylineno(&self) -> u32;

    fn yylloc(&self) -> Location;

    /// A rendering of the current position for diagnostics.
    fn show_position(&self) -> Option<String> {
        None
    }

    /// Whether `yylloc` carries byte ranges.
    fn ranges(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_spans_oldest_to_newest() {
        let first = Location {
            first_line: 1,
            first_column: 4,
            last_line: 1,
            last_column: 7,
            range: Some((4, 7)),
        };
        let last = Location {
            first_line: 3,
            first_column: 0,
            last_line: 3,
            last_column: 2,
            range: Some((20, 22)),
        };

        let merged = Location::merge(&first, &last);
        assert_eq!(merged.first_line, 1);
        assert_eq!(merged.first_column, 4);
        assert_eq!(merged.last_line, 3);
        assert_eq!(merged.last_column, 2);
        assert_eq!(merged.range, Some((4, 22)));
    }

    #[test]
    fn merge_drops_partial_ranges() {
        let with = Location {
            range: Some((0, 1)),
            ..Location::default()
        };
        let without = Location::default();
        assert_eq!(Location::merge(&with, &without).range, None);
    }
}
