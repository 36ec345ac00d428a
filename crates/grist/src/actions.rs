//! Semantic-action bodies.
//!
//! Action bodies are opaque text. The loader rewrites their positional
//! references into the slot names of the runtime dispatch context and
//! groups identical bodies so an emitted dispatcher carries one arm per
//! distinct body:
//!
//! - `$$` / `@$`: the result value / location slot (`yyval.value`,
//!   `yyval.location`)
//! - `$k` / `@k`: the value / location stack slot of the k-th rhs symbol
//!   (1-based), addressed relative to the stack top
//! - `$name` / `@name`: positional references through symbol names and
//!   bracketed aliases; a repeated name is reachable as `name1`, `name2`,
//!   and so on, with the bare name bound to its first occurrence
//! - `YYACCEPT` / `YYABORT`: early returns out of the dispatcher

use crate::{grammar::ProductionID, types::Map};

/// One distinct rewritten action body and the productions sharing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGroup {
    pub body: String,
    pub productions: Vec<ProductionID>,
}

/// Positional names visible inside one alternative's action body.
#[derive(Debug, Default)]
pub(crate) struct NameMap {
    positions: Map<String, usize>,
    counts: Map<String, usize>,
}

impl NameMap {
    pub(crate) fn add(&mut self, name: &str, position: usize) {
        let count = self.counts.entry(name.to_owned()).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.positions.insert(name.to_owned(), position);
            self.positions.insert(format!("{}1", name), position);
        } else {
            self.positions.insert(format!("{}{}", name, count), position);
        }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Rewrite the stack references of one action body; `rhs_len` is the
/// length of the alternative the body is attached to.
pub(crate) fn rewrite(body: &str, names: &NameMap, rhs_len: usize) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        match c {
            '$' | '@' => {
                let (stack, result) = if c == '$' {
                    ("yyvals", "yyval.value")
                } else {
                    ("yylocs", "yyval.location")
                };
                let tail = &rest[1..];

                if tail.starts_with('$') {
                    out.push_str(result);
                    rest = &tail[1..];
                } else if let Some((k, remaining)) = leading_number(tail) {
                    out.push_str(&slot(stack, k, rhs_len));
                    rest = remaining;
                } else if let Some((name, remaining)) = leading_ident(tail) {
                    match names.get(name) {
                        Some(k) => out.push_str(&slot(stack, k, rhs_len)),
                        None => {
                            out.push(c);
                            out.push_str(name);
                        }
                    }
                    rest = remaining;
                } else {
                    out.push(c);
                    rest = tail;
                }
            }
            _ if is_ident_start(c) => {
                let (ident, remaining) = leading_ident(rest).unwrap();
                match ident {
                    "YYACCEPT" => out.push_str("return true"),
                    "YYABORT" => out.push_str("return false"),
                    _ => out.push_str(ident),
                }
                rest = remaining;
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out
}

/// The stack slot of the k-th rhs symbol, addressed from the top.
fn slot(stack: &str, k: usize, rhs_len: usize) -> String {
    let offset = k as i64 - rhs_len as i64;
    match offset {
        0 => format!("{}[yytop]", stack),
        d if d < 0 => format!("{}[yytop - {}]", stack, -d),
        d => format!("{}[yytop + {}]", stack, d),
    }
}

fn leading_number(s: &str) -> Option<(usize, &str)> {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let k = s[..digits].parse().ok()?;
    Some((k, &s[digits..]))
}

fn leading_ident(s: &str) -> Option<(&str, &str)> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return None,
    }
    let end = chars
        .find(|&(_, c)| !unicode_ident::is_xid_continue(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}
