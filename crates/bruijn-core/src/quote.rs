//! Quotation: reading semantic values back into syntax.
//!
//! Quotation is untyped. Closures are opened under a fresh placeholder and
//! their bodies evaluated, so the result is a deep normal form.

use crate::common::Level;
use crate::eval::{eval_binder, Result};
use crate::syn::{self, RcSyntax, Syntax};
use crate::val::{Closure, Literal, Value};
use tracing::trace;

/// Read `value` back as a term valid under `depth` binders.
pub fn quote(value: &Value, depth: usize) -> Result<RcSyntax> {
    match value {
        Value::Literal(literal) => Ok(quote_literal(literal, depth)),
        Value::Placeholder(level) => Ok(quote_placeholder(*level, depth)),
        Value::Closure(closure) => quote_closure(closure, depth),
    }
}

fn quote_literal(literal: &Literal, depth: usize) -> RcSyntax {
    debug_assert!(
        literal.depth <= depth,
        "literal from depth {} read back at depth {depth}",
        literal.depth
    );
    syn::lift(&literal.term, depth - literal.depth)
}

fn quote_placeholder(level: Level, depth: usize) -> RcSyntax {
    Syntax::variable_rc(level.to_index(depth))
}

fn quote_closure(closure: &Closure, depth: usize) -> Result<RcSyntax> {
    trace!(target: "normalize", depth, binder = %closure.lambda.name, "open");
    let lambda = &closure.lambda;
    let (domain, body) = eval_binder(&lambda.domain, &lambda.body, &closure.context, depth)?;
    Ok(Syntax::lambda_rc(lambda.name.clone(), domain, body))
}
