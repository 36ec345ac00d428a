//! Parser definition.
//!
//! A [`ParserDef`] is the runtime-relevant subset of what the generator
//! computes. It is plain data, constructed directly from the in-memory
//! tables; no generated source code is involved.

use std::hash::BuildHasherDefault;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<rustc_hash::FxHasher>>;

/// Reserved id of the accept pseudo-nonterminal `$accept`.
pub const ACCEPT: u32 = 0;
/// Reserved id of the end-of-input marker `$end`.
pub const EOI: u32 = 1;
/// Reserved id of the `error` terminal used by the recovery scheme.
pub const ERROR: u32 = 2;

/// The action stored in a parse-table cell.
///
/// Goto entries share the table with shift/reduce/accept entries; they are
/// keyed by nonterminal ids and are only consulted after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
    Goto(u32),

    /// Reject the lookahead symbol. Behaves like an absent entry; written
    /// by the generator where a nonassociative operator tied a conflict.
    Fail,

    /// Conflicting actions the generator retained instead of resolving.
    ///
    /// Reaching such a cell at parse time is a fatal error; the variant
    /// exists so downstream tooling can inspect the ambiguity.
    Ambiguous {
        shift: Option<u32>,
        reduces: Vec<u32>,
    },
}

/// The tables a generated parser runs on.
#[derive(Debug, Clone)]
pub struct ParserDef {
    /// Symbol name → id, used to intern tokens a lexer returns by name.
    pub symbol_ids: Map<String, u32>,
    /// Terminal id → display name, used for diagnostics.
    pub terminal_names: Map<u32, String>,
    /// `(lhs symbol id, rhs length)` indexed by production id.
    pub productions: Vec<(u32, u32)>,
    /// Action/goto row per state, indexed by state id.
    pub states: Vec<Map<u32, Action>>,
    /// States whose single reduction is taken without consulting the
    /// lookahead symbol.
    pub default_actions: Map<u32, u32>,
}

impl ParserDef {
    pub fn initial_state(&self) -> u32 {
        0
    }

    pub(crate) fn action(&self, state: u32, symbol: u32) -> Option<&Action> {
        self.states.get(state as usize)?.get(&symbol)
    }

    /// Display names of the terminals the parser would accept in `state`.
    pub fn expected_terminals(&self, state: u32) -> Vec<String> {
        let Some(row) = self.states.get(state as usize) else {
            return Vec::new();
        };
        let mut expected = Vec::new();
        for (&symbol, action) in row {
            if symbol <= ERROR || matches!(action, Action::Fail) {
                continue;
            }
            if let Some(name) = self.terminal_names.get(&symbol) {
                expected.push(format!("'{}'", name));
            }
        }
        expected
    }
}
