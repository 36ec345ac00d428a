//! Parse-table construction and conflict resolution.
//!
//! Shift and goto entries come straight off the automaton edges; reduce
//! entries are written for each reduction's lookahead terminals. When two
//! actions land in the same cell the conflict is arbitrated by operator
//! precedence and associativity, and every arbitration is recorded in the
//! resolutions log.

use crate::{
    grammar::{Assoc, Grammar, ProductionID, SymbolID},
    lalr::Lookaheads,
    lr0::{Automaton, StateID},
    types::Map,
};
use std::{cmp::Ordering, fmt};

/// The action stored in a table cell. Goto entries share the table with
/// the terminal actions; they are keyed by nonterminal ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(StateID),
    Reduce(ProductionID),
    Accept,
    Goto(StateID),

    /// Reject the lookahead symbol. Behaves like an absent entry but is
    /// written explicitly when a nonassociative operator ties a
    /// shift/reduce conflict, which also keeps the row out of the
    /// default-action compression.
    Fail,

    /// Conflicting candidates retained under `no_default_resolve`.
    /// Encountering such a cell at parse time is fatal.
    Ambiguous {
        shift: Option<StateID>,
        reduces: Vec<ProductionID>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

/// One arbitrated table cell: what won, what was discarded, and whether
/// the outcome was a by-default pick rather than a precedence decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: StateID,
    pub symbol: SymbolID,
    pub kind: ConflictKind,
    /// `None` when the cell was emptied (equal precedence, nonassoc).
    pub chosen: Option<Action>,
    pub discarded: Action,
    pub by_default: bool,
}

impl Resolution {
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        ResolutionDisplay {
            grammar,
            resolution: self,
        }
    }
}

struct ResolutionDisplay<'g> {
    grammar: &'g Grammar,
    resolution: &'g Resolution,
}

impl fmt::Display for ResolutionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            grammar,
            resolution,
        } = self;
        write!(
            f,
            "state {:?}, token {}: ",
            resolution.state,
            grammar.symbol(resolution.symbol).name()
        )?;
        match &resolution.chosen {
            Some(chosen) => {
                describe(f, grammar, chosen)?;
                f.write_str(" preferred over ")?;
                describe(f, grammar, &resolution.discarded)?;
            }
            None => {
                f.write_str("nonassociative operator, dropped ")?;
                describe(f, grammar, &resolution.discarded)?;
                f.write_str(" and the competing shift")?;
            }
        }
        if resolution.by_default {
            f.write_str(" (by default)")?;
        }
        Ok(())
    }
}

fn describe(f: &mut fmt::Formatter<'_>, grammar: &Grammar, action: &Action) -> fmt::Result {
    match action {
        Action::Shift(..) => f.write_str("shift"),
        Action::Reduce(p) => {
            write!(f, "reduce({})", grammar.production(*p).display(grammar))
        }
        Action::Accept => f.write_str("accept"),
        Action::Fail => f.write_str("fail"),
        Action::Goto(..) | Action::Ambiguous { .. } => f.write_str("<multiple>"),
    }
}

#[derive(Debug)]
pub struct ParseTable {
    /// Action/goto row per state, indexed by state id.
    pub rows: Vec<Map<SymbolID, Action>>,
    /// States whose single entry is a reduction taken without consulting
    /// the lookahead.
    pub default_actions: Map<StateID, ProductionID>,
    /// Number of by-default resolutions.
    pub conflicts: usize,
    /// The per-cell arbitration log.
    pub resolutions: Vec<Resolution>,
}

impl ParseTable {
    #[tracing::instrument(skip_all)]
    pub fn generate(
        grammar: &Grammar,
        automaton: &Automaton,
        lookaheads: &Lookaheads,
    ) -> Self {
        let mut rows = Vec::with_capacity(automaton.len());
        let mut log = ResolutionLog::default();

        let all_terminals: Vec<SymbolID> = grammar.terminals().map(|(id, _)| id).collect();

        for (state, data) in automaton.states() {
            let mut row: Map<SymbolID, Action> = Map::default();

            for (&symbol, &target) in &data.transitions {
                if symbol == SymbolID::EOI {
                    // The $end edge out of the accept kernel is the
                    // accepting configuration.
                    row.insert(symbol, Action::Accept);
                } else if grammar.symbol(symbol).is_terminal() {
                    row.insert(symbol, Action::Shift(target));
                } else {
                    row.insert(symbol, Action::Goto(target));
                }
            }

            // In conflict-free states the lookahead sets only matter for
            // table density, so `on_demand_lookahead` fills the whole row
            // instead of consulting them.
            let fill_all = grammar.on_demand_lookahead() && !data.has_conflicts;
            for &production in &data.reductions {
                if production == ProductionID::ACCEPT {
                    continue;
                }

                let assigned: Vec<SymbolID>;
                let terminals: &[SymbolID] = if fill_all {
                    &all_terminals[..]
                } else {
                    assigned = lookaheads.get(state, production).iter().collect();
                    &assigned[..]
                };

                for &symbol in terminals {
                    match row.get(&symbol) {
                        None => {
                            row.insert(symbol, Action::Reduce(production));
                        }
                        Some(existing) => {
                            let existing = existing.clone();
                            let resolved =
                                resolve(grammar, state, symbol, existing, production, &mut log);
                            row.insert(symbol, resolved);
                        }
                    }
                }
            }

            rows.push(row);
        }

        let mut default_actions = Map::default();
        for ((state, _), row) in automaton.states().zip(&rows) {
            if row.len() == 1 {
                if let Some((_, Action::Reduce(production))) = row.first() {
                    default_actions.insert(state, *production);
                }
            }
        }

        tracing::debug!(
            states = rows.len(),
            conflicts = log.conflicts,
            defaults = default_actions.len(),
            "parse table built"
        );

        Self {
            rows,
            default_actions,
            conflicts: log.conflicts,
            resolutions: log.resolutions,
        }
    }

    pub fn action(&self, state: StateID, symbol: SymbolID) -> Option<&Action> {
        self.rows.get(state.raw() as usize)?.get(&symbol)
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        TableDisplay {
            grammar,
            table: self,
        }
    }
}

struct TableDisplay<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl fmt::Display for TableDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { grammar, table } = self;
        for (raw, row) in table.rows.iter().enumerate() {
            if raw > 0 {
                writeln!(f)?;
            }
            writeln!(f, "#### state {:03}", raw)?;
            writeln!(f, "## actions")?;
            for (symbol, action) in row {
                if matches!(action, Action::Goto(..)) {
                    continue;
                }
                let name = grammar.symbol(*symbol).name();
                match action {
                    Action::Shift(next) => writeln!(f, "- {} => shift({:?})", name, next)?,
                    Action::Reduce(p) => writeln!(
                        f,
                        "- {} => reduce({})",
                        name,
                        grammar.production(*p).display(grammar)
                    )?,
                    Action::Accept => writeln!(f, "- {} => accept", name)?,
                    Action::Fail => writeln!(f, "- {} => fail", name)?,
                    Action::Ambiguous { shift, reduces } => {
                        writeln!(f, "- {} => ambiguous:", name)?;
                        if let Some(next) = shift {
                            writeln!(f, "  - shift({:?})", next)?;
                        }
                        for p in reduces {
                            writeln!(
                                f,
                                "  - reduce({})",
                                grammar.production(*p).display(grammar)
                            )?;
                        }
                    }
                    Action::Goto(..) => {}
                }
            }
            writeln!(f, "## gotos")?;
            for (symbol, action) in row {
                if let Action::Goto(next) = action {
                    writeln!(
                        f,
                        "- {} => goto({:?})",
                        grammar.symbol(*symbol).name(),
                        next
                    )?;
                }
            }
        }
        if !table.default_actions.is_empty() {
            writeln!(f, "\n#### default actions")?;
            for (state, production) in &table.default_actions {
                writeln!(
                    f,
                    "- {:?} => reduce({})",
                    state,
                    grammar.production(*production).display(grammar)
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct ResolutionLog {
    conflicts: usize,
    resolutions: Vec<Resolution>,
}

impl ResolutionLog {
    fn push(&mut self, resolution: Resolution) {
        if resolution.by_default {
            self.conflicts += 1;
        }
        self.resolutions.push(resolution);
    }
}

/// Arbitrate a cell that already holds `existing` when `reduce` arrives.
/// Returns the new cell content.
fn resolve(
    grammar: &Grammar,
    state: StateID,
    symbol: SymbolID,
    existing: Action,
    reduce: ProductionID,
    log: &mut ResolutionLog,
) -> Action {
    match existing {
        Action::Shift(next) => {
            let operator = grammar.operator(symbol);
            let production = grammar.production(reduce).prec();

            let (chosen, by_default) = match (production, operator) {
                (Some(p), Some(o)) => match Ord::cmp(&p.level, &o.level) {
                    Ordering::Less => (Some(Action::Shift(next)), false),
                    Ordering::Greater => (Some(Action::Reduce(reduce)), false),
                    Ordering::Equal => match o.assoc {
                        Assoc::Left => (Some(Action::Reduce(reduce)), false),
                        Assoc::Right => (Some(Action::Shift(next)), false),
                        Assoc::Nonassoc => (None, false),
                    },
                },
                // Unspecified precedence on either side: shift, by default.
                _ => (Some(Action::Shift(next)), true),
            };

            let discarded = match &chosen {
                Some(Action::Shift(..)) | None => Action::Reduce(reduce),
                _ => Action::Shift(next),
            };
            log.push(Resolution {
                state,
                symbol,
                kind: ConflictKind::ShiftReduce,
                chosen: chosen.clone(),
                discarded,
                by_default,
            });

            if by_default && grammar.no_default_resolve() {
                return Action::Ambiguous {
                    shift: Some(next),
                    reduces: vec![reduce],
                };
            }
            chosen.unwrap_or(Action::Fail)
        }

        Action::Reduce(prior) => {
            // The lower-numbered production wins.
            let (winner, loser) = if prior <= reduce {
                (prior, reduce)
            } else {
                (reduce, prior)
            };
            log.push(Resolution {
                state,
                symbol,
                kind: ConflictKind::ReduceReduce,
                chosen: Some(Action::Reduce(winner)),
                discarded: Action::Reduce(loser),
                by_default: true,
            });

            if grammar.no_default_resolve() {
                return Action::Ambiguous {
                    shift: None,
                    reduces: vec![prior, reduce],
                };
            }
            Action::Reduce(winner)
        }

        // Accepting is the reduction of production 0 and wins as the
        // lower-numbered production.
        Action::Accept => {
            log.push(Resolution {
                state,
                symbol,
                kind: ConflictKind::ReduceReduce,
                chosen: Some(Action::Accept),
                discarded: Action::Reduce(reduce),
                by_default: true,
            });
            Action::Accept
        }

        // A cell a nonassociative tie already emptied stays empty.
        Action::Fail => Action::Fail,

        Action::Ambiguous { shift, mut reduces } => {
            let kind = if shift.is_some() {
                ConflictKind::ShiftReduce
            } else {
                ConflictKind::ReduceReduce
            };
            let winner = reduces.iter().copied().min().map(|p| p.min(reduce));
            log.push(Resolution {
                state,
                symbol,
                kind,
                chosen: winner.map(Action::Reduce),
                discarded: Action::Reduce(reduce),
                by_default: true,
            });
            reduces.push(reduce);
            Action::Ambiguous { shift, reduces }
        }

        Action::Goto(..) => unreachable!("goto cells are keyed by nonterminals"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{first_follow::FirstFollow, grammar::GrammarSpec};

    fn build(spec: &GrammarSpec) -> (Grammar, Automaton, ParseTable) {
        let grammar = Grammar::from_spec(spec, &mut |_| {}).unwrap();
        let sets = FirstFollow::new(&grammar);
        let automaton = Automaton::generate(&grammar);
        let lookaheads = Lookaheads::assign(&grammar, &automaton, &sets);
        let table = ParseTable::generate(&grammar, &automaton, &lookaheads);
        (grammar, automaton, table)
    }

    #[test]
    fn accept_replaces_the_eoi_shift() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a"]);
        let (grammar, automaton, table) = build(&spec);

        let s = grammar.symbol_id("S").unwrap();
        let after_s = automaton.state(StateID::START).transitions[&s];
        assert_eq!(
            table.action(after_s, SymbolID::EOI),
            Some(&Action::Accept)
        );
    }

    #[test]
    fn single_reduction_rows_are_compressed() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["A"]);
        spec.rule("A", ["a"]);
        let (grammar, automaton, table) = build(&spec);

        let a = grammar.symbol_id("a").unwrap();
        let after_a = automaton.state(StateID::START).transitions[&a];
        assert!(table.default_actions.contains_key(&after_a));

        // Rows with anything besides a lone reduction stay uncompressed.
        assert!(!table.default_actions.contains_key(&StateID::START));
    }

    #[test]
    fn conflict_count_matches_by_default_resolutions() {
        // Dangling else: one shift/reduce conflict, shifted by default.
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["if E then S", "if E then S else S", "x"]);
        spec.rule("E", ["e"]);
        let (_, _, table) = build(&spec);

        assert_eq!(table.conflicts, 1);
        assert_eq!(
            table.conflicts,
            table.resolutions.iter().filter(|r| r.by_default).count()
        );
        assert!(matches!(
            table.resolutions[0],
            Resolution {
                kind: ConflictKind::ShiftReduce,
                chosen: Some(Action::Shift(..)),
                by_default: true,
                ..
            }
        ));
    }
}
