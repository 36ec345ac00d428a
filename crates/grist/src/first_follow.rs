//! Nullable / FIRST / FOLLOW computation.
//!
//! Three successive fixed-point passes over the productions; each loops
//! until a full pass stops changing the sets.

use crate::{
    grammar::{Grammar, ProductionID, SymbolID, TerminalSet},
    types::{Map, Set},
};

#[derive(Debug, PartialEq)]
pub struct FirstFollow {
    nullables: Set<SymbolID>,
    firsts: Map<SymbolID, TerminalSet>,
    follows: Map<SymbolID, TerminalSet>,
}

impl FirstFollow {
    pub fn new(grammar: &Grammar) -> Self {
        let nullables = nullables(grammar);
        let firsts = first_sets(grammar, &nullables);
        let follows = follow_sets(grammar, &nullables, &firsts);
        Self {
            nullables,
            firsts,
            follows,
        }
    }

    pub fn is_nullable(&self, symbol: SymbolID) -> bool {
        self.nullables.contains(&symbol)
    }

    pub fn sequence_nullable(&self, sequence: &[SymbolID]) -> bool {
        sequence.iter().all(|symbol| self.is_nullable(*symbol))
    }

    pub fn first(&self, symbol: SymbolID) -> &TerminalSet {
        &self.firsts[&symbol]
    }

    pub fn follow(&self, symbol: SymbolID) -> &TerminalSet {
        &self.follows[&symbol]
    }

    /// `FIRST(X1 ... Xn)`: the union over the nullable prefix.
    pub fn first_of_sequence(&self, sequence: &[SymbolID]) -> TerminalSet {
        let mut out = TerminalSet::default();
        for &symbol in sequence {
            out.union_with(self.first(symbol));
            if !self.is_nullable(symbol) {
                break;
            }
        }
        out
    }
}

/// A nonterminal is nullable iff one of its productions has an all-nullable
/// rhs; the empty rhs is nullable by definition. Terminals never are.
fn nullables(grammar: &Grammar) -> Set<SymbolID> {
    let mut nullables: Set<SymbolID> = grammar
        .productions()
        .filter(|(_, production)| production.right().is_empty())
        .map(|(_, production)| production.left())
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (_, production) in grammar.productions() {
            if nullables.contains(&production.left()) {
                continue;
            }
            if production
                .right()
                .iter()
                .all(|symbol| nullables.contains(symbol))
            {
                nullables.insert(production.left());
                changed = true;
            }
        }
    }

    nullables
}

fn first_sets(grammar: &Grammar, nullables: &Set<SymbolID>) -> Map<SymbolID, TerminalSet> {
    let mut firsts: Map<SymbolID, TerminalSet> = Map::default();

    // First(t) = {t} for terminals, nonterminals start empty.
    for (id, symbol) in grammar.symbols() {
        if symbol.is_terminal() {
            firsts.insert(id, Some(id).into_iter().collect());
        } else {
            firsts.insert(id, TerminalSet::default());
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (id, production) in grammar.productions() {
            if id == ProductionID::ACCEPT {
                continue;
            }

            let mut added = TerminalSet::default();
            for symbol in production.right() {
                added.union_with(&firsts[symbol]);
                if !nullables.contains(symbol) {
                    break;
                }
            }

            let set = &mut firsts[&production.left()];
            let before = set.len();
            set.union_with(&added);
            changed |= set.len() > before;
        }
    }

    firsts
}

fn follow_sets(
    grammar: &Grammar,
    nullables: &Set<SymbolID>,
    firsts: &Map<SymbolID, TerminalSet>,
) -> Map<SymbolID, TerminalSet> {
    let mut follows: Map<SymbolID, TerminalSet> = grammar
        .nonterminals()
        .map(|(id, _)| (id, TerminalSet::default()))
        .collect();

    // Follow(S) ⊇ {$end} falls out of the accept production's rhs.
    let mut changed = true;
    while changed {
        changed = false;
        for (_, production) in grammar.productions() {
            let left_follow = follows[&production.left()].clone();

            // Walk the rhs right to left, carrying First of the suffix seen
            // so far and whether that suffix is nullable.
            let mut suffix_first = TerminalSet::default();
            let mut suffix_nullable = true;
            for &symbol in production.right().iter().rev() {
                if let Some(set) = follows.get_mut(&symbol) {
                    let before = set.len();
                    set.union_with(&suffix_first);
                    if suffix_nullable {
                        set.union_with(&left_follow);
                    }
                    changed |= set.len() > before;

                    if nullables.contains(&symbol) {
                        suffix_first.union_with(&firsts[&symbol]);
                    } else {
                        suffix_first = firsts[&symbol].clone();
                        suffix_nullable = false;
                    }
                } else {
                    suffix_first = Some(symbol).into_iter().collect();
                    suffix_nullable = false;
                }
            }
        }
    }

    follows
}
