//! LALR(1) lookahead assignment.
//!
//! Every reduction item receives the FOLLOW set of its left-hand side.
//! Same-core item sets were already merged by the collection, so the
//! result is LALR(1) rather than canonical LR(1); the FOLLOW sets are the
//! usual over-approximation of per-state lookaheads.

use crate::{
    first_follow::FirstFollow,
    grammar::{Grammar, ProductionID, TerminalSet},
    lr0::{Automaton, StateID},
    types::Map,
};
use std::fmt;

/// A reduction site: a completed production in a particular state.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Reduce {
    pub state: StateID,
    pub production: ProductionID,
}

impl fmt::Debug for Reduce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?},{:?})", self.state, self.production)
    }
}

#[derive(Debug)]
pub struct Lookaheads {
    map: Map<Reduce, TerminalSet>,
}

impl Lookaheads {
    pub fn assign(
        grammar: &Grammar,
        automaton: &Automaton,
        sets: &FirstFollow,
    ) -> Self {
        let mut map = Map::default();
        for (state, data) in automaton.states() {
            for &production in &data.reductions {
                let left = grammar.production(production).left();
                map.insert(
                    Reduce { state, production },
                    sets.follow(left).clone(),
                );
            }
        }
        Self { map }
    }

    pub fn get(&self, state: StateID, production: ProductionID) -> &TerminalSet {
        &self.map[&Reduce { state, production }]
    }
}
