//! Grammars and a minimal whitespace lexer shared by the integration
//! tests.
#![allow(dead_code)]

use grist::runtime::{Lexer, Location, Token};
use grist::{Alternative, Assoc, GrammarSpec};

/// E : E + E | E * E | ( E ) | id, with left-associative `+` and `*`.
pub fn arithmetic() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule(
        "E",
        [
            Alternative::new("E + E"),
            Alternative::new("E * E"),
            Alternative::new("( E )"),
            Alternative::new("id"),
        ],
    );
    spec.operator(Assoc::Left, &["+"]);
    spec.operator(Assoc::Left, &["*"]);
    spec
}

/// The dangling else, no precedence anywhere.
pub fn dangling_else() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule(
        "S",
        ["if E then S", "if E then S else S", "x"],
    );
    spec
}

/// A : B C ; B : b | ε ; C : c
pub fn with_nullable() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule("A", ["B C"]);
    spec.rule("B", ["b", ""]);
    spec.rule("C", ["c"]);
    spec
}

/// S : A | B ; A : x ; B : x. A reduce/reduce conflict on $end.
pub fn reduce_reduce() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule("S", ["A", "B"]);
    spec.rule("A", ["x"]);
    spec.rule("B", ["x"]);
    spec
}

/// S : A ; A : a. Every reduction row collapses to a default action.
pub fn chain() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule("S", ["A"]);
    spec.rule("A", ["a"]);
    spec
}

/// E : E = E | id, with `=` declared nonassociative.
pub fn nonassoc_eq() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule("E", [Alternative::new("E = E"), Alternative::new("id")]);
    spec.operator(Assoc::Nonassoc, &["="]);
    spec
}

/// S : ( E ) | ( error ) ; E : id. The second alternative catches a bad
/// token between the parentheses.
pub fn parenthesized_recovery() -> GrammarSpec {
    let mut spec = GrammarSpec::default();
    spec.rule("S", ["( E )", "( error )"]);
    spec.rule("E", ["id"]);
    spec
}

/// Splits the input on whitespace and hands every word back as a token
/// name. Tracks line/column spans and counts `lex` calls.
pub struct WordLexer {
    words: Vec<(String, u32, u32)>,
    pos: usize,
    text: String,
    lineno: u32,
    loc: Location,
    pub lex_calls: usize,
}

impl WordLexer {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            pos: 0,
            text: String::new(),
            lineno: 0,
            loc: Location::default(),
            lex_calls: 0,
        }
    }
}

impl Lexer for WordLexer {
    fn set_input(&mut self, input: &str) {
        self.words.clear();
        self.pos = 0;
        self.text.clear();
        self.lineno = 0;
        self.loc = Location::default();

        for (line_no, line) in input.lines().enumerate() {
            let mut start = None;
            for (i, ch) in line
                .char_indices()
                .chain(Some((line.len(), ' ')))
            {
                if ch.is_whitespace() {
                    if let Some(s) = start.take() {
                        self.words
                            .push((line[s..i].to_owned(), line_no as u32, s as u32));
                    }
                } else if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }

    fn lex(&mut self) -> Option<Token> {
        self.lex_calls += 1;
        let (word, line, column) = self.words.get(self.pos)?.clone();
        self.pos += 1;
        self.lineno = line;
        self.loc = Location {
            first_line: line,
            first_column: column,
            last_line: line,
            last_column: column + word.len() as u32,
            range: None,
        };
        self.text = word.clone();
        Some(Token::Name(word))
    }

    fn yytext(&self) -> &str {
        &self.text
    }

    fn yylineno(&self) -> u32 {
        self.lineno
    }

    fn yylloc(&self) -> Location {
        self.loc.clone()
    }
}
