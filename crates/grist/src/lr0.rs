//! The LR(0) automaton: items, states, and the canonical collection.

use crate::{
    grammar::{Grammar, ProductionID, SymbolID},
    types::{Map, Set},
};
use std::{collections::VecDeque, fmt};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID(u32);

impl StateID {
    pub const START: Self = Self(0);

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

/// An LR(0) item: a production with a dot position. Lookaheads live apart
/// (they are assigned per state once the collection is built), so item
/// identity is just this pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: ProductionID,
    pub dot: u16,
}

impl Item {
    /// The symbol after the dot, or `None` for a reduction item.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<SymbolID> {
        grammar
            .production(self.production)
            .right()
            .get(self.dot as usize)
            .copied()
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        ItemDisplay {
            grammar,
            item: self,
        }
    }
}

struct ItemDisplay<'g> {
    grammar: &'g Grammar,
    item: &'g Item,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { grammar, item } = self;
        let production = grammar.production(item.production);
        write!(f, "{} :", grammar.symbol(production.left()).name())?;
        for (i, symbol) in production.right().iter().enumerate() {
            if i == item.dot as usize {
                f.write_str(" .")?;
            }
            write!(f, " {}", grammar.symbol(*symbol).name())?;
        }
        if item.dot as usize == production.right().len() {
            f.write_str(" .")?;
        }
        Ok(())
    }
}

/// One state of the automaton: an LR(0) closure plus its outgoing edges.
/// The sorted kernel is the state's canonical identity; lookaheads play no
/// part in it, which is what merges same-core states.
#[derive(Debug)]
pub struct State {
    /// Kernel items, sorted by (production, dot).
    pub kernel: Vec<Item>,
    /// Kernel plus closure items, in derivation order.
    pub items: Vec<Item>,
    /// Outgoing edges, terminals and nonterminals alike.
    pub transitions: Map<SymbolID, StateID>,
    /// Productions of the completed items.
    pub reductions: Vec<ProductionID>,
    /// Whether any item has a terminal after the dot.
    pub has_shifts: bool,
    /// Two or more reductions, or a reduction next to a shift.
    pub has_conflicts: bool,
    /// Reverse edges: which states reach this one, per symbol. Edges into
    /// a merged state accumulate here.
    pub predecessors: Map<SymbolID, Vec<StateID>>,
}

impl State {
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        StateDisplay {
            grammar,
            state: self,
        }
    }
}

struct StateDisplay<'g> {
    grammar: &'g Grammar,
    state: &'g State,
}

impl fmt::Display for StateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { grammar, state } = self;
        writeln!(f, "  items:")?;
        for item in &state.items {
            writeln!(f, "  - {}", item.display(grammar))?;
        }
        if !state.transitions.is_empty() {
            writeln!(f, "  transitions:")?;
            for (symbol, target) in &state.transitions {
                writeln!(
                    f,
                    "  - {} -> {:?}",
                    grammar.symbol(*symbol).name(),
                    target
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    /// Build the canonical collection for `grammar`. The start state is
    /// always state 0, the closure of `[$accept : . S $end]`.
    #[tracing::instrument(skip_all)]
    pub fn generate(grammar: &Grammar) -> Self {
        let automaton = Builder {
            grammar,
            nonkernels: nonkernels(grammar),
        }
        .build();
        tracing::debug!(states = automaton.len(), "canonical collection built");
        automaton
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(raw, state)| (StateID(raw as u32), state))
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        AutomatonDisplay {
            grammar,
            automaton: self,
        }
    }
}

struct AutomatonDisplay<'g> {
    grammar: &'g Grammar,
    automaton: &'g Automaton,
}

impl fmt::Display for AutomatonDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.automaton.states() {
            writeln!(f, "- id: {:?}", id)?;
            write!(f, "{}", state.display(self.grammar))?;
        }
        Ok(())
    }
}

struct Builder<'g> {
    grammar: &'g Grammar,
    /// Closure items contributed by each nonterminal, transitively
    /// expanded once up front.
    nonkernels: Map<SymbolID, Vec<Item>>,
}

impl Builder<'_> {
    fn build(&self) -> Automaton {
        let mut states: Vec<State> = Vec::new();
        let mut isocores: Map<Vec<Item>, StateID> = Map::default();
        let mut predecessors: Map<StateID, Map<SymbolID, Vec<StateID>>> = Map::default();
        let mut pending: VecDeque<(StateID, Vec<Item>)> = VecDeque::new();

        let start_kernel = vec![Item {
            production: ProductionID::ACCEPT,
            dot: 0,
        }];
        isocores.insert(start_kernel.clone(), StateID::START);
        pending.push_back((StateID::START, start_kernel));

        let mut next_id = 1;
        while let Some((id, kernel)) = pending.pop_front() {
            let items = self.closure(&kernel);

            let mut reductions = Vec::new();
            let mut has_shifts = false;
            let mut new_kernels: Map<SymbolID, Vec<Item>> = Map::default();
            for item in &items {
                match item.next_symbol(self.grammar) {
                    Some(symbol) => {
                        if self.grammar.symbol(symbol).is_terminal() {
                            has_shifts = true;
                        }
                        new_kernels.entry(symbol).or_default().push(Item {
                            dot: item.dot + 1,
                            ..*item
                        });
                    }
                    None => reductions.push(item.production),
                }
            }
            let has_conflicts =
                reductions.len() >= 2 || (!reductions.is_empty() && has_shifts);

            let mut transitions = Map::default();
            for (symbol, mut kernel) in new_kernels {
                kernel.sort();
                let target = match isocores.get(&kernel) {
                    Some(&target) => target,
                    None => {
                        let target = StateID(next_id);
                        next_id += 1;
                        isocores.insert(kernel.clone(), target);
                        pending.push_back((target, kernel));
                        target
                    }
                };
                transitions.insert(symbol, target);
                predecessors
                    .entry(target)
                    .or_default()
                    .entry(symbol)
                    .or_default()
                    .push(id);
            }

            // States are discovered and processed in id order, so pushing
            // here keeps the vector indexed by state id.
            states.push(State {
                kernel,
                items,
                transitions,
                reductions,
                has_shifts,
                has_conflicts,
                predecessors: Map::default(),
            });
        }

        for (id, edges) in predecessors {
            states[id.0 as usize].predecessors = edges;
        }

        Automaton { states }
    }

    /// Kernel plus every item reachable by expanding nonterminals after
    /// the dot; the per-nonterminal expansions are precomputed, so one
    /// pass over the kernel suffices.
    fn closure(&self, kernel: &[Item]) -> Vec<Item> {
        let mut items: Set<Item> = kernel.iter().copied().collect();
        for item in kernel {
            if let Some(symbol) = item.next_symbol(self.grammar) {
                if let Some(expansion) = self.nonkernels.get(&symbol) {
                    items.extend(expansion.iter().copied());
                }
            }
        }
        items.into_iter().collect()
    }
}

/// For every nonterminal, the dot-at-zero items of every production
/// reachable from it, to a fixed point.
fn nonkernels(grammar: &Grammar) -> Map<SymbolID, Vec<Item>> {
    let mut nonkernels = Map::default();
    for (id, _) in grammar.nonterminals() {
        let mut items: Set<Item> = grammar
            .productions_of(id)
            .iter()
            .map(|&production| Item { production, dot: 0 })
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            let mut added = Vec::new();
            for item in &items {
                if item.dot != 0 {
                    continue;
                }
                let production = grammar.production(item.production);
                if let Some(&symbol) = production.right().first() {
                    if !grammar.symbol(symbol).is_terminal() {
                        added.extend(grammar.productions_of(symbol).iter().map(
                            |&production| Item { production, dot: 0 },
                        ));
                    }
                }
            }
            for item in added {
                changed |= items.insert(item);
            }
        }

        nonkernels.insert(id, items.into_iter().collect());
    }
    nonkernels
}
