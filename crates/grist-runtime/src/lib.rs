//! Runtime support for parsers produced by the `grist` parser generator.
//!
//! The generator hands a [`ParserDef`] (the interned symbol table, the
//! production summaries and the per-state action rows) to a [`Parser`],
//! which drives a user-supplied [`Lexer`] and dispatches semantic actions
//! through the [`Actions`] trait.

pub mod definition;
pub mod lexer;
pub mod parser;

pub use crate::{
    definition::{Action, ParserDef},
    lexer::{Lexer, Location, Token},
    parser::{ActionResult, Actions, ParseError, Parser, ReduceContext},
};
