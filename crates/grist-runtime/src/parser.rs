//! The table-driven parse loop.

use crate::{
    definition::{Action, ParserDef, EOI, ERROR},
    lexer::{Lexer, Location, Token},
};

/// How a semantic action terminates.
#[derive(Debug)]
pub enum ActionResult<V> {
    /// Keep parsing.
    Ok,
    /// End the parse immediately with this value.
    Return(V),
    /// End the parse successfully without a value.
    Accept,
    /// End the parse with a failure.
    Abort,
}

/// Dispatcher for the semantic actions of a grammar, indexed by production
/// id. The implementor is also the user-owned context threaded through the
/// parse.
pub trait Actions {
    type Value: Default + Clone;

    /// The semantic value of a shifted token. Defaults to `Value::default()`;
    /// override to capture lexemes.
    fn token_value(&mut self, symbol: u32, text: &str) -> Self::Value {
        let _ = (symbol, text);
        Self::Value::default()
    }

    fn reduce(
        &mut self,
        production: u32,
        ctx: &mut ReduceContext<'_, Self::Value>,
    ) -> ActionResult<Self::Value>;
}

/// The view a semantic action gets of the parse stacks.
pub struct ReduceContext<'a, V> {
    /// The result slot, pre-seeded with the value of the first rhs symbol.
    pub value: &'a mut V,
    /// The merged location of the reduced range.
    pub location: &'a mut Location,
    /// The lexeme of the most recent token.
    pub text: &'a str,
    pub leng: usize,
    pub lineno: u32,
    /// The full value stack; address rhs symbols through [`Self::val`].
    pub values: &'a [V],
    pub locations: &'a [Location],
    /// Index of the top stack slot.
    pub top: usize,
    /// Length of the rhs being reduced.
    pub len: usize,
}

impl<V> ReduceContext<'_, V> {
    /// The value of the `k`-th rhs symbol, 1-based.
    pub fn val(&self, k: usize) -> &V {
        &self.values[self.top + k - self.len]
    }

    /// The location of the `k`-th rhs symbol, 1-based.
    pub fn loc(&self, k: usize) -> &Location {
        &self.locations[self.top + k - self.len]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No action exists for the current state and lookahead.
    #[error("{message}")]
    Syntax {
        message: String,
        text: String,
        token: Option<String>,
        line: u32,
        loc: Location,
        expected: Vec<String>,
        /// Whether an `error` recovery rule was reachable when this was
        /// raised.
        recoverable: bool,
    },

    #[error("parsing aborted by a semantic action")]
    Aborted,

    #[error("ambiguous parse table entry reached in state {state} on symbol {symbol}")]
    Ambiguous { state: u32, symbol: u32 },

    #[error("no goto from state {state} on nonterminal {symbol}")]
    MissingGoto { state: u32, symbol: u32 },

    #[error("parsing halted while recovering from a parse error")]
    RecoveryFailed,
}

/// A parser instance: the tables plus the action dispatcher. The constant
/// tables are read-only; all per-parse state lives inside [`Parser::parse`],
/// so one instance can run any number of successive parses.
#[derive(Debug)]
pub struct Parser<A: Actions> {
    def: ParserDef,
    actions: A,
}

impl<A: Actions> Parser<A> {
    pub fn new(def: ParserDef, actions: A) -> Self {
        Self { def, actions }
    }

    pub fn definition(&self) -> &ParserDef {
        &self.def
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut A {
        &mut self.actions
    }

    /// Run the automaton over `input`, driving `lexer` and dispatching
    /// semantic actions.
    ///
    /// Returns `Ok(Some(value))` when an action ended the parse with a
    /// value and `Ok(None)` on a bare accept.
    pub fn parse<L: Lexer>(
        &mut self,
        lexer: &mut L,
        input: &str,
    ) -> Result<Option<A::Value>, ParseError> {
        lexer.set_input(input);

        let mut state_stack: Vec<u32> = vec![self.def.initial_state()];
        let mut value_stack: Vec<A::Value> = vec![A::Value::default()];
        let mut loc_stack: Vec<Location> = vec![Location::default()];

        let mut lookahead: Option<u32> = None;
        let mut lookahead_name: Option<String> = None;
        let mut recovering: u32 = 0;

        loop {
            let state = *state_stack.last().unwrap();

            // A state with a default action reduces without consulting the
            // lookahead, which also skips a lex call per reduction chain.
            let action = if let Some(&production) = self.def.default_actions.get(&state) {
                Action::Reduce(production)
            } else {
                if lookahead.is_none() {
                    let (symbol, name) = self.next_token(lexer);
                    lookahead = Some(symbol);
                    lookahead_name = name;
                }
                let symbol = lookahead.unwrap();

                match self.def.action(state, symbol) {
                    Some(Action::Goto(..)) | Some(Action::Fail) | None => {
                        // No action for this lookahead. Locate the nearest
                        // stacked state that can shift `error`.
                        let recovery = state_stack.iter().rposition(|&s| {
                            matches!(self.def.action(s, ERROR), Some(Action::Shift(..)))
                        });

                        if recovering == 0 {
                            let err = self.syntax_error(
                                lexer,
                                state,
                                symbol,
                                lookahead_name.as_deref(),
                                recovery.is_some(),
                            );
                            if recovery.is_none() {
                                return Err(err);
                            }
                            tracing::warn!(target: "grist_runtime", "{}", err);
                        }

                        if recovering == 3 {
                            if symbol == EOI {
                                return Err(ParseError::RecoveryFailed);
                            }
                            // Swallow the offending token and relex.
                            lookahead = None;
                            lookahead_name = None;
                            continue;
                        }

                        let Some(depth) = recovery else {
                            return Err(ParseError::RecoveryFailed);
                        };

                        state_stack.truncate(depth + 1);
                        value_stack.truncate(depth + 1);
                        loc_stack.truncate(depth + 1);

                        let next = match self.def.action(state_stack[depth], ERROR) {
                            Some(Action::Shift(next)) => *next,
                            _ => unreachable!(),
                        };
                        state_stack.push(next);
                        value_stack.push(A::Value::default());
                        loc_stack.push(lexer.yylloc());
                        recovering = 3;
                        continue;
                    }
                    Some(action) => action.clone(),
                }
            };

            match action {
                Action::Shift(next) => {
                    let symbol = lookahead.take().unwrap();
                    lookahead_name = None;
                    state_stack.push(next);
                    value_stack.push(self.actions.token_value(symbol, lexer.yytext()));
                    loc_stack.push(lexer.yylloc());
                    if recovering > 0 {
                        recovering -= 1;
                    }
                }

                Action::Reduce(production) => {
                    let (lhs, len) = self.def.productions[production as usize];
                    let len = len as usize;

                    let mut value = if len > 0 {
                        value_stack[value_stack.len() - len].clone()
                    } else {
                        A::Value::default()
                    };
                    let mut location = if len > 0 {
                        Location::merge(
                            &loc_stack[loc_stack.len() - len],
                            &loc_stack[loc_stack.len() - 1],
                        )
                    } else {
                        loc_stack.last().unwrap().clone()
                    };

                    let top = value_stack.len() - 1;
                    let mut ctx = ReduceContext {
                        value: &mut value,
                        location: &mut location,
                        text: lexer.yytext(),
                        leng: lexer.yyleng(),
                        lineno: lexer.yylineno(),
                        values: &value_stack,
                        locations: &loc_stack,
                        top,
                        len,
                    };
                    match self.actions.reduce(production, &mut ctx) {
                        ActionResult::Ok => {}
                        ActionResult::Return(v) => return Ok(Some(v)),
                        ActionResult::Accept => return Ok(None),
                        ActionResult::Abort => return Err(ParseError::Aborted),
                    }

                    state_stack.truncate(state_stack.len() - len);
                    value_stack.truncate(value_stack.len() - len);
                    loc_stack.truncate(loc_stack.len() - len);

                    value_stack.push(value);
                    loc_stack.push(location);

                    let current = *state_stack.last().unwrap();
                    let next = match self.def.action(current, lhs) {
                        Some(Action::Goto(next)) => *next,
                        _ => {
                            return Err(ParseError::MissingGoto {
                                state: current,
                                symbol: lhs,
                            })
                        }
                    };
                    state_stack.push(next);
                }

                Action::Accept => return Ok(None),

                // Goto and fail entries were already diverted into the
                // error path above.
                Action::Goto(..) | Action::Fail => unreachable!(),

                Action::Ambiguous { .. } => {
                    return Err(ParseError::Ambiguous {
                        state,
                        symbol: lookahead.unwrap_or(EOI),
                    })
                }
            }
        }
    }

    fn next_token<L: Lexer>(&self, lexer: &mut L) -> (u32, Option<String>) {
        match lexer.lex() {
            None => (EOI, None),
            Some(Token::Id(id)) => (id, None),
            Some(Token::Name(name)) => match self.def.symbol_ids.get(&name) {
                Some(&id) => (id, Some(name)),
                // An unknown name cannot match any table entry; keep it for
                // diagnostics.
                None => (u32::MAX, Some(name)),
            },
        }
    }

    fn syntax_error<L: Lexer>(
        &self,
        lexer: &L,
        state: u32,
        symbol: u32,
        lookahead_name: Option<&str>,
        recoverable: bool,
    ) -> ParseError {
        let expected = self.def.expected_terminals(state);
        let token = self
            .def
            .terminal_names
            .get(&symbol)
            .map(|name| name.as_str())
            .or(lookahead_name)
            .map(str::to_owned);
        let line = lexer.yylineno();

        let message = match lexer.show_position() {
            Some(position) => format!(
                "Parse error on line {}:\n{}\nExpecting {}, got '{}'",
                line + 1,
                position,
                expected.join(", "),
                token.as_deref().unwrap_or("?"),
            ),
            None => format!(
                "Parse error on line {}: unexpected {}",
                line + 1,
                if symbol == EOI {
                    "end of input".to_owned()
                } else {
                    format!("'{}'", token.as_deref().unwrap_or("?"))
                },
            ),
        };

        ParseError::Syntax {
            message,
            text: lexer.yytext().to_owned(),
            token,
            line,
            loc: lexer.yylloc(),
            expected,
            recoverable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Map;

    // S : a. Hand-built tables for exercising the loop without a
    // generator in the picture.
    fn single_rule_def() -> ParserDef {
        let (a, s) = (3, 4);

        let mut symbol_ids = Map::default();
        symbol_ids.insert("a".to_owned(), a);
        symbol_ids.insert("S".to_owned(), s);

        let mut terminal_names = Map::default();
        terminal_names.insert(EOI, "$end".to_owned());
        terminal_names.insert(a, "a".to_owned());

        let mut s0 = Map::default();
        s0.insert(a, Action::Shift(2));
        s0.insert(s, Action::Goto(1));
        let mut s1 = Map::default();
        s1.insert(EOI, Action::Accept);
        let s2 = Map::default();

        let mut default_actions = Map::default();
        default_actions.insert(2, 1);

        ParserDef {
            symbol_ids,
            terminal_names,
            productions: vec![(0, 2), (s, 1)],
            states: vec![s0, s1, s2],
            default_actions,
        }
    }

    struct WordLexer {
        words: Vec<String>,
        pos: usize,
        text: String,
    }

    impl WordLexer {
        fn new() -> Self {
            Self {
                words: Vec::new(),
                pos: 0,
                text: String::new(),
            }
        }
    }

    impl Lexer for WordLexer {
        fn set_input(&mut self, input: &str) {
            self.words = input.split_whitespace().map(str::to_owned).collect();
            self.pos = 0;
            self.text.clear();
        }

        fn lex(&mut self) -> Option<Token> {
            let word = self.words.get(self.pos)?.clone();
            self.pos += 1;
            self.text = word.clone();
            Some(Token::Name(word))
        }

        fn yytext(&self) -> &str {
            &self.text
        }

        fn yylineno(&self) -> u32 {
            0
        }

        fn yylloc(&self) -> Location {
            Location::default()
        }
    }

    struct Doubler;

    impl Actions for Doubler {
        type Value = u32;

        fn token_value(&mut self, _symbol: u32, _text: &str) -> u32 {
            7
        }

        fn reduce(&mut self, production: u32, ctx: &mut ReduceContext<'_, u32>) -> ActionResult<u32> {
            match production {
                1 => ActionResult::Return(ctx.val(1) * 2),
                _ => ActionResult::Ok,
            }
        }
    }

    #[test]
    fn drives_shift_and_default_reduce() {
        let mut parser = Parser::new(single_rule_def(), Doubler);
        let mut lexer = WordLexer::new();
        let parsed = parser.parse(&mut lexer, "a").unwrap();
        assert_eq!(parsed, Some(14));
    }

    #[test]
    fn reports_expected_terminals_on_error() {
        let mut parser = Parser::new(single_rule_def(), Doubler);
        let mut lexer = WordLexer::new();
        match parser.parse(&mut lexer, "b") {
            Err(ParseError::Syntax {
                expected,
                token,
                recoverable,
                ..
            }) => {
                assert_eq!(expected, vec!["'a'".to_owned()]);
                assert_eq!(token.as_deref(), Some("b"));
                assert!(!recoverable);
            }
            other => panic!("expected a syntax error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bare_accept_yields_no_value() {
        struct Inert;
        impl Actions for Inert {
            type Value = ();
            fn reduce(&mut self, _: u32, _: &mut ReduceContext<'_, ()>) -> ActionResult<()> {
                ActionResult::Ok
            }
        }

        let mut parser = Parser::new(single_rule_def(), Inert);
        let mut lexer = WordLexer::new();
        assert!(matches!(parser.parse(&mut lexer, "a"), Ok(None)));
    }
}
