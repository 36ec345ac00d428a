//! An LALR(1) parser generator.
//!
//! A [`GrammarSpec`] describes a context-free grammar annotated with
//! operator precedence and semantic actions. [`Generator`] normalizes and
//! augments the grammar, computes the nullable/FIRST/FOLLOW sets, builds
//! the canonical LR(0) collection with merged lookaheads, arbitrates
//! conflicts through the operator table, and produces a shift/reduce/
//! goto/accept table ready to run through `grist-runtime`'s table-driven
//! parser.
//!
//! ```
//! use grist::{Alternative, Assoc, Generator, GrammarSpec};
//!
//! let mut spec = GrammarSpec::default();
//! spec.rule(
//!     "expr",
//!     [
//!         Alternative::new("expr + expr").action("$$ = $1 + $3;"),
//!         Alternative::new("expr * expr").action("$$ = $1 * $3;"),
//!         Alternative::new("NUM"),
//!     ],
//! );
//! spec.operator(Assoc::Left, &["+"]);
//! spec.operator(Assoc::Left, &["*"]);
//!
//! let generator = Generator::new(&spec)?;
//! assert_eq!(generator.conflicts(), 0);
//! let _def = generator.parser_def();
//! # Ok::<(), grist::GrammarError>(())
//! ```

pub mod actions;
pub mod first_follow;
pub mod grammar;
pub mod lalr;
pub mod lr0;
pub mod table;

mod types;

pub use crate::{
    actions::ActionGroup,
    first_follow::FirstFollow,
    grammar::{
        Alternative, Assoc, GeneratorOptions, Grammar, GrammarError, GrammarSpec, Precedence,
        ProductionID, SymbolID, TerminalSet,
    },
    lalr::Lookaheads,
    lr0::{Automaton, Item, State, StateID},
    table::{Action, ConflictKind, ParseTable, Resolution},
};

pub use grist_runtime as runtime;

/// Owns one grammar and everything computed from it. All tables are
/// read-only once construction returns; independent generators never share
/// state, so any number may run in parallel.
#[derive(Debug)]
pub struct Generator {
    grammar: Grammar,
    first_follow: FirstFollow,
    automaton: Automaton,
    lookaheads: Lookaheads,
    table: ParseTable,
    warnings: Vec<String>,
}

impl Generator {
    /// Run the whole pipeline over `spec`, routing non-fatal findings to
    /// the log.
    pub fn new(spec: &GrammarSpec) -> Result<Self, GrammarError> {
        Self::with_trace(spec, |message| {
            tracing::warn!(target: "grist", "{}", message)
        })
    }

    /// Like [`Generator::new`] with a caller-supplied trace hook.
    pub fn with_trace(
        spec: &GrammarSpec,
        mut trace: impl FnMut(&str),
    ) -> Result<Self, GrammarError> {
        let mut warnings = Vec::new();
        let grammar = Grammar::from_spec(spec, &mut |message| {
            warnings.push(message.to_owned());
            trace(message);
        })?;

        let first_follow = FirstFollow::new(&grammar);
        let automaton = Automaton::generate(&grammar);
        let lookaheads = Lookaheads::assign(&grammar, &automaton, &first_follow);
        let table = ParseTable::generate(&grammar, &automaton, &lookaheads);

        Ok(Self {
            grammar,
            first_follow,
            automaton,
            lookaheads,
            table,
            warnings,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_follow(&self) -> &FirstFollow {
        &self.first_follow
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn lookaheads(&self) -> &Lookaheads {
        &self.lookaheads
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// Number of conflicts that were resolved by default.
    pub fn conflicts(&self) -> usize {
        self.table.conflicts
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.table.resolutions[..]
    }

    /// The non-fatal findings that went through the trace hook.
    pub fn warnings(&self) -> &[String] {
        &self.warnings[..]
    }

    /// Build the runtime tables straight from the in-memory computation;
    /// no emitted source is involved.
    pub fn parser_def(&self) -> grist_runtime::ParserDef {
        let mut symbol_ids = types::Map::default();
        for (id, symbol) in self.grammar.symbols() {
            symbol_ids.insert(symbol.name().to_owned(), id.raw());
        }

        let mut terminal_names = types::Map::default();
        for (id, symbol) in self.grammar.terminals() {
            terminal_names.insert(id.raw(), symbol.name().to_owned());
        }

        let productions = self
            .grammar
            .productions()
            .map(|(_, production)| {
                (production.left().raw(), production.right().len() as u32)
            })
            .collect();

        let states = self
            .table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(symbol, action)| (symbol.raw(), runtime_action(action)))
                    .collect()
            })
            .collect();

        let mut default_actions = types::Map::default();
        for (state, production) in &self.table.default_actions {
            default_actions.insert(state.raw(), production.raw());
        }

        grist_runtime::ParserDef {
            symbol_ids,
            terminal_names,
            productions,
            states,
            default_actions,
        }
    }

    /// A ready-to-run parser: the runtime tables plus an action
    /// dispatcher.
    pub fn into_parser<A>(self, actions: A) -> grist_runtime::Parser<A>
    where
        A: grist_runtime::Actions,
    {
        grist_runtime::Parser::new(self.parser_def(), actions)
    }
}

fn runtime_action(action: &Action) -> grist_runtime::Action {
    match action {
        Action::Shift(state) => grist_runtime::Action::Shift(state.raw()),
        Action::Reduce(production) => grist_runtime::Action::Reduce(production.raw()),
        Action::Accept => grist_runtime::Action::Accept,
        Action::Goto(state) => grist_runtime::Action::Goto(state.raw()),
        Action::Fail => grist_runtime::Action::Fail,
        Action::Ambiguous { shift, reduces } => grist_runtime::Action::Ambiguous {
            shift: shift.as_ref().map(|state| state.raw()),
            reduces: reduces.iter().map(|production| production.raw()).collect(),
        },
    }
}
