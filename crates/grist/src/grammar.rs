//! Grammar types and the grammar loader.
//!
//! [`Grammar::from_spec`] turns a structured [`GrammarSpec`] into the
//! immutable grammar the rest of the pipeline runs on: interned symbols,
//! numbered productions, the operator table, and the augmented accept
//! production `$accept : S $end`.

use crate::{
    actions::{self, ActionGroup, NameMap},
    types::Map,
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolID(u32);

impl SymbolID {
    /// The accept pseudo-nonterminal `$accept`.
    pub const ACCEPT: Self = Self(0);
    /// The end-of-input marker `$end`.
    pub const EOI: Self = Self(1);
    /// The reserved `error` terminal wired into the recovery scheme.
    pub const ERROR: Self = Self(2);

    const OFFSET: u32 = 3;

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::ACCEPT => f.write_str("$accept"),
            &Self::EOI => f.write_str("$end"),
            &Self::ERROR => f.write_str("error"),
            Self(raw) => write!(f, "S#{:03}", raw),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID(u32);

impl ProductionID {
    /// The synthetic top-level production `$accept : S $end`.
    pub const ACCEPT: Self = Self(0);

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::ACCEPT => f.write_str("P#Accept"),
            Self(raw) => write!(f, "P#{:03}", raw),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

#[derive(Debug)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
}

/// Operator precedence: level is 1-based, and a higher level binds
/// tighter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub level: u16,
    pub assoc: Assoc,
}

/// A set of terminal symbol ids, backed by a bit set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}

impl TerminalSet {
    pub fn contains(&self, id: SymbolID) -> bool {
        self.inner.contains(id.0 as usize)
    }

    pub fn insert(&mut self, id: SymbolID) -> bool {
        self.inner.insert(id.0 as usize)
    }

    pub fn union_with(&mut self, other: &Self) {
        self.inner.union_with(&other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SymbolID> + '_ {
        self.inner.iter().map(|raw| SymbolID(raw as u32))
    }
}

impl FromIterator<SymbolID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = SymbolID>,
    {
        Self {
            inner: iter.into_iter().map(|id| id.0 as usize).collect(),
        }
    }
}

/// A numbered production rule `A : X1 X2 ... Xn`.
#[derive(Debug)]
pub struct Production {
    left: SymbolID,
    right: Vec<SymbolID>,
    prec: Option<Precedence>,
    action: Option<usize>,
}

impl Production {
    pub fn left(&self) -> SymbolID {
        self.left
    }

    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    pub fn prec(&self) -> Option<Precedence> {
        self.prec
    }

    /// Index into [`Grammar::action_groups`] of this production's semantic
    /// action, if it has one.
    pub fn action_group(&self) -> Option<usize> {
        self.action
    }

    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> impl fmt::Display + 'g {
        ProductionDisplay {
            grammar,
            production: self,
        }
    }
}

struct ProductionDisplay<'g> {
    grammar: &'g Grammar,
    production: &'g Production,
}

impl fmt::Display for ProductionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            grammar,
            production,
        } = self;
        write!(f, "{} :", grammar.symbol(production.left).name())?;
        if production.right.is_empty() {
            f.write_str(" ε")?;
        } else {
            for symbol in &production.right {
                write!(f, " {}", grammar.symbol(*symbol).name())?;
            }
        }
        Ok(())
    }
}

/// One right-hand-side alternative of a nonterminal: the symbols, an
/// optional semantic action body, and an optional explicit precedence
/// operator.
#[derive(Debug, Clone, Default)]
pub struct Alternative {
    /// Whitespace-delimited symbols; a symbol may carry a bracketed alias
    /// (`expr[lhs]`) usable inside the action body.
    pub rhs: String,
    pub action: Option<String>,
    pub prec: Option<String>,
}

impl Alternative {
    pub fn new(rhs: &str) -> Self {
        Self {
            rhs: rhs.to_owned(),
            ..Self::default()
        }
    }

    pub fn action(mut self, body: &str) -> Self {
        self.action = Some(body.to_owned());
        self
    }

    pub fn prec(mut self, operator: &str) -> Self {
        self.prec = Some(operator.to_owned());
        self
    }
}

impl From<&str> for Alternative {
    fn from(rhs: &str) -> Self {
        Self::new(rhs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Name for an emitted parser module; invalid identifiers fall back to
    /// `"parser"`.
    pub module_name: Option<String>,
    /// Retain conflicting actions in the table instead of resolving them by
    /// default.
    pub no_default_resolve: bool,
    /// Fill reduce actions for every terminal in conflict-free states
    /// instead of consulting the assigned lookahead sets.
    pub on_demand_lookahead: bool,
}

/// The structured grammar description consumed by the loader.
#[derive(Debug, Default)]
pub struct GrammarSpec {
    /// Nonterminal name → alternatives, in declaration order.
    pub bnf: Map<String, Vec<Alternative>>,
    /// Optionally declared terminals, checked against the set discovered in
    /// the rules.
    pub tokens: Option<Vec<String>>,
    /// Operator declarations, lowest precedence level first.
    pub operators: Vec<(Assoc, Vec<String>)>,
    /// Start symbol; defaults to the lhs of the first declared rule.
    pub start: Option<String>,
    /// Extra parameter names threaded into an emitted action dispatcher.
    pub parse_params: Vec<String>,
    /// Opaque preamble spliced ahead of an emitted action dispatcher.
    pub action_include: Option<String>,
    /// Opaque preamble spliced into an emitted module.
    pub module_include: Option<String>,
    pub options: GeneratorOptions,
}

impl GrammarSpec {
    pub fn rule<I, A>(&mut self, name: &str, alternatives: I) -> &mut Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Alternative>,
    {
        self.bnf
            .entry(name.to_owned())
            .or_default()
            .extend(alternatives.into_iter().map(Into::into));
        self
    }

    /// Append one precedence level; earlier calls bind less tightly.
    pub fn operator(&mut self, assoc: Assoc, symbols: &[&str]) -> &mut Self {
        self.operators
            .push((assoc, symbols.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn start_symbol(&mut self, name: &str) -> &mut Self {
        self.start = Some(name.to_owned());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("start symbol `{0}` is not a nonterminal of the grammar")]
    UnknownStartSymbol(String),
}

/// The immutable grammar the pipeline runs on.
#[derive(Debug)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    symbol_ids: Map<String, SymbolID>,
    productions: Vec<Production>,
    by_nonterminal: Map<SymbolID, Vec<ProductionID>>,
    start_symbol: SymbolID,
    operators: Map<SymbolID, Precedence>,
    action_groups: Vec<ActionGroup>,
    module_name: String,
    parse_params: Vec<String>,
    action_include: Option<String>,
    module_include: Option<String>,
    options: GeneratorOptions,
}

impl Grammar {
    /// Load and augment a grammar. Non-fatal findings are routed through
    /// `trace`.
    pub fn from_spec(
        spec: &GrammarSpec,
        trace: &mut dyn FnMut(&str),
    ) -> Result<Self, GrammarError> {
        if spec.bnf.values().all(|alternatives| alternatives.is_empty()) {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut loader = Loader::new(spec);
        loader.load(trace)?;
        loader.finish(trace)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolID, &Symbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(raw, symbol)| (SymbolID(raw as u32), symbol))
    }

    pub fn terminals(&self) -> impl Iterator<Item = (SymbolID, &Symbol)> + '_ {
        self.symbols().filter(|(_, symbol)| symbol.is_terminal())
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (SymbolID, &Symbol)> + '_ {
        self.symbols().filter(|(_, symbol)| !symbol.is_terminal())
    }

    pub fn symbol(&self, id: SymbolID) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_id(&self, name: &str) -> Option<SymbolID> {
        self.symbol_ids.get(name).copied()
    }

    pub fn productions(&self) -> impl Iterator<Item = (ProductionID, &Production)> + '_ {
        self.productions
            .iter()
            .enumerate()
            .map(|(raw, production)| (ProductionID(raw as u32), production))
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[id.0 as usize]
    }

    /// Productions of `nonterminal`, in declaration order.
    pub fn productions_of(&self, nonterminal: SymbolID) -> &[ProductionID] {
        self.by_nonterminal
            .get(&nonterminal)
            .map(|ids| &ids[..])
            .unwrap_or(&[])
    }

    pub fn start_symbol(&self) -> SymbolID {
        self.start_symbol
    }

    pub fn operator(&self, symbol: SymbolID) -> Option<Precedence> {
        self.operators.get(&symbol).copied()
    }

    /// The distinct rewritten action bodies and the productions sharing
    /// them, for an emitted dispatcher.
    pub fn action_groups(&self) -> &[ActionGroup] {
        &self.action_groups[..]
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn parse_params(&self) -> &[String] {
        &self.parse_params[..]
    }

    pub fn action_include(&self) -> Option<&str> {
        self.action_include.as_deref()
    }

    pub fn module_include(&self) -> Option<&str> {
        self.module_include.as_deref()
    }

    pub fn no_default_resolve(&self) -> bool {
        self.options.no_default_resolve
    }

    pub fn on_demand_lookahead(&self) -> bool {
        self.options.on_demand_lookahead
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminals: ")?;
        for (i, (_, symbol)) in self.terminals().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(symbol.name())?;
        }
        write!(f, "\nnonterminals: ")?;
        for (i, (_, symbol)) in self.nonterminals().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(symbol.name())?;
        }
        writeln!(f, "\nstart_symbol: {}", self.symbol(self.start_symbol).name())?;
        writeln!(f, "rules:")?;
        for (id, production) in self.productions() {
            writeln!(f, "  [{:02}] {}", id.raw(), production.display(self))?;
        }
        Ok(())
    }
}

struct Loader<'s> {
    spec: &'s GrammarSpec,
    symbols: Vec<Symbol>,
    symbol_ids: Map<String, SymbolID>,
    productions: Vec<Production>,
    by_nonterminal: Map<SymbolID, Vec<ProductionID>>,
    op_table: Map<&'s str, Precedence>,
    action_groups: Vec<ActionGroup>,
    group_index: Map<String, usize>,
}

impl<'s> Loader<'s> {
    fn new(spec: &'s GrammarSpec) -> Self {
        let mut loader = Self {
            spec,
            symbols: Vec::new(),
            symbol_ids: Map::default(),
            productions: Vec::new(),
            by_nonterminal: Map::default(),
            op_table: Map::default(),
            action_groups: Vec::new(),
            group_index: Map::default(),
        };

        for (name, kind) in [
            ("$accept", SymbolKind::Nonterminal),
            ("$end", SymbolKind::Terminal),
            ("error", SymbolKind::Terminal),
        ] {
            loader.intern(name, kind);
        }
        debug_assert_eq!(loader.symbols.len() as u32, SymbolID::OFFSET);

        for (level, (assoc, symbols)) in spec.operators.iter().enumerate() {
            let prec = Precedence {
                level: level as u16 + 1,
                assoc: *assoc,
            };
            for symbol in symbols {
                loader.op_table.insert(symbol.as_str(), prec);
            }
        }

        loader
    }

    fn intern(&mut self, name: &str, kind: SymbolKind) -> SymbolID {
        if let Some(&id) = self.symbol_ids.get(name) {
            return id;
        }
        let id = SymbolID(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_owned(),
            kind,
        });
        self.symbol_ids.insert(name.to_owned(), id);
        id
    }

    fn load(&mut self, trace: &mut dyn FnMut(&str)) -> Result<(), GrammarError> {
        // Reserve production id 0 for the accept production; its rhs is
        // filled in once the start symbol is known.
        self.productions.push(Production {
            left: SymbolID::ACCEPT,
            right: Vec::new(),
            prec: None,
            action: None,
        });

        for (lhs_name, alternatives) in &self.spec.bnf {
            let left = self.intern(lhs_name, SymbolKind::Nonterminal);
            for alternative in alternatives {
                self.load_alternative(left, alternative, trace);
            }
        }

        Ok(())
    }

    fn load_alternative(
        &mut self,
        left: SymbolID,
        alternative: &Alternative,
        trace: &mut dyn FnMut(&str),
    ) {
        let mut right = Vec::new();
        let mut names = NameMap::default();

        for word in alternative.rhs.split_whitespace() {
            let (symbol_name, alias) = strip_alias(word);
            let kind = if self.spec.bnf.contains_key(symbol_name) {
                SymbolKind::Nonterminal
            } else {
                SymbolKind::Terminal
            };
            let id = self.intern(symbol_name, kind);
            right.push(id);

            let position = right.len();
            names.add(symbol_name, position);
            if let Some(alias) = alias {
                names.add(alias, position);
            }
        }

        // Explicit %prec wins; otherwise inherit from the right-most rhs
        // terminal present in the operator table.
        let prec = match &alternative.prec {
            Some(operator) => match self.op_table.get(operator.as_str()) {
                Some(&prec) => Some(prec),
                None => {
                    trace(&format!(
                        "no precedence declared for operator `{}`",
                        operator
                    ));
                    None
                }
            },
            None => right
                .iter()
                .rev()
                .filter(|&&id| self.symbols[id.0 as usize].is_terminal())
                .find_map(|&id| self.op_table.get(self.symbols[id.0 as usize].name()))
                .copied(),
        };

        let id = ProductionID(self.productions.len() as u32);
        let action = match alternative.action.as_deref() {
            Some(body) => {
                let rewritten = actions::rewrite(body, &names, right.len());
                let index = match self.group_index.get(&rewritten) {
                    Some(&index) => index,
                    None => {
                        let index = self.action_groups.len();
                        self.action_groups.push(ActionGroup {
                            body: rewritten.clone(),
                            productions: Vec::new(),
                        });
                        self.group_index.insert(rewritten, index);
                        index
                    }
                };
                self.action_groups[index].productions.push(id);
                Some(index)
            }
            None => None,
        };

        self.productions.push(Production {
            left,
            right,
            prec,
            action,
        });
        self.by_nonterminal.entry(left).or_default().push(id);
    }

    fn finish(mut self, trace: &mut dyn FnMut(&str)) -> Result<Grammar, GrammarError> {
        let start_name = match &self.spec.start {
            Some(name) => name.as_str(),
            None => self
                .spec
                .bnf
                .keys()
                .next()
                .map(String::as_str)
                .ok_or(GrammarError::EmptyGrammar)?,
        };
        let start_symbol = match self.symbol_ids.get(start_name) {
            Some(&id) if !self.symbols[id.0 as usize].is_terminal() => id,
            _ => return Err(GrammarError::UnknownStartSymbol(start_name.to_owned())),
        };

        // Augment: $accept : S $end.
        self.productions[ProductionID::ACCEPT.0 as usize].right =
            vec![start_symbol, SymbolID::EOI];
        self.by_nonterminal
            .entry(SymbolID::ACCEPT)
            .or_default()
            .insert(0, ProductionID::ACCEPT);

        if let Some(declared) = &self.spec.tokens {
            let discovered = self
                .symbols
                .iter()
                .skip(SymbolID::OFFSET as usize)
                .filter(|symbol| symbol.is_terminal())
                .count();
            if declared.len() != discovered {
                trace(&format!(
                    "token count mismatch: {} declared, {} found in rules",
                    declared.len(),
                    discovered
                ));
            }
        }

        let module_name = match &self.spec.options.module_name {
            Some(name) if valid_module_name(name) => name.clone(),
            Some(name) => {
                trace(&format!(
                    "`{}` is not a valid module name; falling back to `parser`",
                    name
                ));
                "parser".to_owned()
            }
            None => "parser".to_owned(),
        };

        let operators = self
            .symbols
            .iter()
            .enumerate()
            .filter_map(|(raw, symbol)| {
                let prec = self.op_table.get(symbol.name())?;
                Some((SymbolID(raw as u32), *prec))
            })
            .collect();

        Ok(Grammar {
            symbols: self.symbols,
            symbol_ids: self.symbol_ids,
            productions: self.productions,
            by_nonterminal: self.by_nonterminal,
            start_symbol,
            operators,
            action_groups: self.action_groups,
            module_name,
            parse_params: self.spec.parse_params.clone(),
            action_include: self.spec.action_include.clone(),
            module_include: self.spec.module_include.clone(),
            options: self.spec.options.clone(),
        })
    }
}

/// Split `expr[lhs]` into the symbol name and its alias.
fn strip_alias(word: &str) -> (&str, Option<&str>) {
    match word.find('[') {
        Some(open) if word.ends_with(']') => {
            (&word[..open], Some(&word[open + 1..word.len() - 1]))
        }
        _ => (word, None),
    }
}

fn valid_module_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_ident)
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || unicode_ident::is_xid_start(c) => {}
        _ => return false,
    }
    chars.all(unicode_ident::is_xid_continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(spec: &GrammarSpec) -> Grammar {
        Grammar::from_spec(spec, &mut |_| {}).unwrap()
    }

    #[test]
    fn reserved_symbols_come_first() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a S", "a"]);
        let grammar = load(&spec);

        assert_eq!(grammar.symbol_id("$accept"), Some(SymbolID::ACCEPT));
        assert_eq!(grammar.symbol_id("$end"), Some(SymbolID::EOI));
        assert_eq!(grammar.symbol_id("error"), Some(SymbolID::ERROR));
        assert_eq!(grammar.symbol_id("S"), Some(SymbolID(3)));
        assert_eq!(grammar.symbol_id("a"), Some(SymbolID(4)));
        assert!(grammar.symbol(SymbolID(4)).is_terminal());
    }

    #[test]
    fn augments_with_accept_production() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a"]);
        let grammar = load(&spec);

        let accept = grammar.production(ProductionID::ACCEPT);
        assert_eq!(accept.left(), SymbolID::ACCEPT);
        assert_eq!(
            accept.right(),
            &[grammar.start_symbol(), SymbolID::EOI][..]
        );
    }

    #[test]
    fn production_precedence_inherits_rightmost_operator() {
        let mut spec = GrammarSpec::default();
        spec.operator(Assoc::Left, &["+"])
            .operator(Assoc::Left, &["*"]);
        spec.rule("E", [Alternative::new("E + E * E"), Alternative::new("id")]);
        let grammar = load(&spec);

        let (id, _) = grammar
            .productions()
            .find(|(_, p)| p.right().len() == 5)
            .unwrap();
        let prec = grammar.production(id).prec().unwrap();
        assert_eq!(prec.level, 2);

        let star = grammar.symbol_id("*").unwrap();
        assert_eq!(grammar.operator(star).unwrap().level, 2);
    }

    #[test]
    fn explicit_prec_wins() {
        let mut spec = GrammarSpec::default();
        spec.operator(Assoc::Left, &["+"])
            .operator(Assoc::Right, &["UMINUS"]);
        spec.rule(
            "E",
            [
                Alternative::new("- E").prec("UMINUS"),
                Alternative::new("E + E"),
                Alternative::new("id"),
            ],
        );
        let grammar = load(&spec);

        let (id, _) = grammar
            .productions()
            .find(|(_, p)| p.right().len() == 2)
            .unwrap();
        assert_eq!(grammar.production(id).prec().unwrap().level, 2);
    }

    #[test]
    fn groups_identical_action_bodies() {
        let mut spec = GrammarSpec::default();
        spec.rule(
            "list",
            [
                Alternative::new("item").action("$$ = $1;"),
                Alternative::new("single").action("$$ = $1;"),
                Alternative::new("list item").action("$$ = $1;"),
            ],
        );
        spec.rule("item", ["x"]);
        spec.rule("single", ["y"]);
        let grammar = load(&spec);

        // The first two alternatives rewrite to the same slot reference;
        // the third addresses a deeper slot and gets its own group.
        assert_eq!(grammar.action_groups().len(), 2);
        assert_eq!(grammar.action_groups()[0].productions.len(), 2);
        assert_eq!(grammar.action_groups()[1].productions.len(), 1);
    }

    #[test]
    fn empty_grammar_is_fatal() {
        let spec = GrammarSpec::default();
        assert!(matches!(
            Grammar::from_spec(&spec, &mut |_| {}),
            Err(GrammarError::EmptyGrammar)
        ));
    }

    #[test]
    fn unknown_start_symbol_is_fatal() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a"]);
        spec.start_symbol("a");
        assert!(matches!(
            Grammar::from_spec(&spec, &mut |_| {}),
            Err(GrammarError::UnknownStartSymbol(name)) if name == "a"
        ));
    }

    #[test]
    fn token_count_mismatch_warns() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a b"]);
        spec.tokens = Some(vec!["a".to_owned()]);

        let mut warnings = Vec::new();
        Grammar::from_spec(&spec, &mut |msg| warnings.push(msg.to_owned())).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("token count mismatch"));
    }

    #[test]
    fn invalid_module_name_falls_back() {
        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a"]);
        spec.options.module_name = Some("1bad name".to_owned());
        let grammar = load(&spec);
        assert_eq!(grammar.module_name(), "parser");

        let mut spec = GrammarSpec::default();
        spec.rule("S", ["a"]);
        spec.options.module_name = Some("calc.parser".to_owned());
        let grammar = load(&spec);
        assert_eq!(grammar.module_name(), "calc.parser");
    }

    #[test]
    fn strips_aliases() {
        let mut spec = GrammarSpec::default();
        spec.rule("E", [Alternative::new("E[lhs] + E[rhs]").action("$$ = $lhs + $rhs;")]);
        spec.rule("S", ["E"]);
        let grammar = load(&spec);

        // The alias brackets never become symbols.
        assert!(grammar.symbol_id("E[lhs]").is_none());
        let body = &grammar.action_groups()[0].body;
        assert!(!body.contains("$lhs"), "alias not rewritten: {}", body);
    }
}
