use crate::common::Level;
use crate::quote::quote;
use crate::syn::{self, RcSyntax, Syntax};
use crate::val::{Closure, Context, UnboundVariable, Value};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    UnboundVariable(#[from] UnboundVariable),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Evaluate `stx` under `ctx`, with `depth` binders opened so far.
///
/// Lambdas are not entered. Applications of closures are reduced along the
/// whole spine, and anything stuck is read back into a literal.
pub fn eval(stx: &RcSyntax, ctx: &Context, depth: usize) -> Result<Value> {
    trace!(target: "normalize", kind = ?stx.kind(), depth, "eval");
    match &**stx {
        Syntax::Variable(var) => Ok(ctx.lookup(var.index)?.clone()),
        Syntax::Constant(_) | Syntax::Sort(_) | Syntax::Numeral(_) => {
            Ok(Value::literal(stx.clone(), depth))
        }
        Syntax::Lambda(lambda) => Ok(Value::closure(lambda.clone(), ctx.clone())),
        Syntax::Pi(pi) => eval_pi(pi, ctx, depth),
        Syntax::Application(app) => eval_application(app, ctx, depth),
    }
}

/// Normalize a binder's domain at `depth`, and its body under a fresh
/// placeholder at `depth + 1`.
pub(crate) fn eval_binder(
    domain: &RcSyntax,
    body: &RcSyntax,
    ctx: &Context,
    depth: usize,
) -> Result<(RcSyntax, RcSyntax)> {
    let domain = quote(&eval(domain, ctx, depth)?, depth)?;
    let ctx = ctx.extend(Value::placeholder(Level::new(depth)));
    let body = quote(&eval(body, &ctx, depth + 1)?, depth + 1)?;
    Ok((domain, body))
}

fn eval_pi(pi: &syn::Pi, ctx: &Context, depth: usize) -> Result<Value> {
    let (domain, body) = eval_binder(&pi.domain, &pi.body, ctx, depth)?;
    Ok(Value::literal(
        Syntax::pi_rc(pi.name.clone(), domain, body),
        depth,
    ))
}

/// Enter a closure, binding its variable to `arg`. The body runs at the
/// caller's depth: applying a closure opens no binder.
pub fn run_closure(closure: &Closure, arg: Value, depth: usize) -> Result<Value> {
    let ctx = closure.context.extend(arg);
    eval(&closure.lambda.body, &ctx, depth)
}

fn eval_application(app: &syn::Application, ctx: &Context, depth: usize) -> Result<Value> {
    let mut head = eval(&app.function, ctx, depth)?;
    for (i, arg) in app.arguments.iter().enumerate() {
        match head {
            Value::Closure(closure) => {
                trace!(target: "normalize", depth, "beta");
                let arg = eval(arg, ctx, depth)?;
                head = run_closure(&closure, arg, depth)?;
            }
            stuck => return eval_stuck(&stuck, &app.arguments[i..], ctx, depth),
        }
    }
    Ok(head)
}

/// Read back a head that cannot be applied, along with the arguments it was
/// applied to, as a single application.
fn eval_stuck(head: &Value, arguments: &[RcSyntax], ctx: &Context, depth: usize) -> Result<Value> {
    trace!(target: "normalize", depth, arguments = arguments.len(), "stuck");
    let function = quote(head, depth)?;
    let arguments = arguments
        .iter()
        .map(|arg| quote(&eval(arg, ctx, depth)?, depth))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::literal(
        Syntax::application_rc(function, arguments),
        depth,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Index;
    use crate::name::Name;
    use crate::syn::parse_syntax;

    fn parse(input: &str) -> RcSyntax {
        parse_syntax(input).unwrap()
    }

    fn literal_term(value: &Value) -> &RcSyntax {
        match value {
            Value::Literal(literal) => &literal.term,
            other => panic!("expected a literal, got {other:?}"),
        }
    }

    #[test]
    fn test_eval_atoms_are_literals() {
        for input in ["@c", "Prop", "𝒰2", "7"] {
            let term = parse(input);
            let value = eval(&term, &Context::new(), 0).unwrap();
            assert_eq!(literal_term(&value), &term);
        }
    }

    #[test]
    fn test_eval_lambda_is_a_closure() {
        let term = parse("λ(%x : Prop) → (λ(%y : Prop) → %y) %x");
        let ctx = Context::new().extend(Value::placeholder(Level::new(0)));
        let value = eval(&term, &ctx, 1).unwrap();
        let Value::Closure(closure) = value else {
            panic!("expected a closure");
        };
        // The body is left as written.
        assert!(closure.lambda.body.is_application());
        assert_eq!(closure.context.len(), 1);
    }

    #[test]
    fn test_eval_variable_looks_up_the_context() {
        let ctx = Context::new()
            .extend(Value::literal(parse("@a"), 0))
            .extend(Value::placeholder(Level::new(0)));
        let value = eval(&Syntax::variable_rc(Index(1)), &ctx, 1).unwrap();
        assert_eq!(literal_term(&value), &parse("@a"));
        let value = eval(&Syntax::variable_rc(Index(0)), &ctx, 1).unwrap();
        assert!(matches!(value, Value::Placeholder(level) if level == Level::new(0)));
    }

    #[test]
    fn test_eval_unbound_variable() {
        let err = eval(&Syntax::variable_rc(Index(2)), &Context::new(), 0).unwrap_err();
        assert_eq!(
            err,
            Error::UnboundVariable(UnboundVariable {
                index: Index(2),
                length: 0
            })
        );
    }

    #[test]
    fn test_eval_beta_along_the_spine() {
        let term = parse("(λ(%x : Prop) (%y : Prop) → %y) @a @b");
        let value = eval(&term, &Context::new(), 0).unwrap();
        assert_eq!(literal_term(&value), &parse("@b"));
    }

    #[test]
    fn test_eval_partial_application_is_a_closure() {
        let term = parse("(λ(%x : Prop) (%y : Prop) → %x) @a");
        let value = eval(&term, &Context::new(), 0).unwrap();
        assert!(value.is_closure());
    }

    #[test]
    fn test_eval_stuck_head_keeps_remaining_arguments() {
        // The head reduces to a constant after one argument, which then
        // sticks with the remaining two.
        let term = parse("(λ(%x : Prop) → @f) @a ((λ(%y : Prop) → %y) @b) @c");
        let value = eval(&term, &Context::new(), 0).unwrap();
        assert_eq!(literal_term(&value), &parse("@f @b @c"));
    }

    #[test]
    fn test_eval_stuck_placeholder_head() {
        let ctx = Context::new().extend(Value::placeholder(Level::new(0)));
        let term = Syntax::application_rc(Syntax::variable_rc(Index(0)), [parse("@a")]);
        let value = eval(&term, &ctx, 1).unwrap();
        assert_eq!(
            literal_term(&value),
            &Syntax::application_rc(Syntax::variable_rc(Index(0)), [parse("@a")])
        );
    }

    #[test]
    fn test_eval_pi_normalizes_both_parts() {
        let term = parse("∀(%x : (λ(%t : 𝒰1) → %t) 𝒰0) → (λ(%y : 𝒰0) → %y) %x");
        let value = eval(&term, &Context::new(), 0).unwrap();
        let expected = Syntax::pi_rc(
            Name::from("x"),
            parse("𝒰0"),
            Syntax::variable_rc(Index(0)),
        );
        assert_eq!(literal_term(&value), &expected);
    }

    #[test]
    fn test_eval_long_spine() {
        // (λ(%x : Prop) → %x) applied to itself many times, then to @a.
        let id = parse("λ(%x : Prop) → %x");
        let mut arguments = vec![id.clone(); 10_000];
        arguments.push(parse("@a"));
        let term = Syntax::application_rc(id, arguments);
        let value = eval(&term, &Context::new(), 0).unwrap();
        assert_eq!(literal_term(&value), &parse("@a"));
    }
}
