//! De Bruijn shifting and substitution over core syntax.

use crate::common::Index;
use crate::syn::{Application, Lambda, Pi, RcSyntax, Syntax};
use std::rc::Rc;

/// Shift every free variable of `term` outward by `amount` binders.
pub fn lift(term: &RcSyntax, amount: usize) -> RcSyntax {
    if amount == 0 {
        return term.clone();
    }
    lift_above(term, amount, 0)
}

fn lift_above(term: &RcSyntax, amount: usize, cutoff: usize) -> RcSyntax {
    match &**term {
        Syntax::Variable(var) if var.index.is_bound(cutoff) => term.clone(),
        Syntax::Variable(var) => Syntax::variable_rc(var.index.raise(amount)),
        Syntax::Constant(_) | Syntax::Sort(_) | Syntax::Numeral(_) => term.clone(),
        Syntax::Application(app) => {
            let function = lift_above(&app.function, amount, cutoff);
            let arguments = app
                .arguments
                .iter()
                .map(|arg| lift_above(arg, amount, cutoff))
                .collect();
            Rc::new(Syntax::Application(Application::new(function, arguments)))
        }
        Syntax::Lambda(Lambda { name, domain, body }) => Syntax::lambda_rc(
            name.clone(),
            lift_above(domain, amount, cutoff),
            lift_above(body, amount, cutoff + 1),
        ),
        Syntax::Pi(Pi { name, domain, body }) => Syntax::pi_rc(
            name.clone(),
            lift_above(domain, amount, cutoff),
            lift_above(body, amount, cutoff + 1),
        ),
    }
}

/// Substitute `value` for the variable bound by the binder whose body is
/// `body`, and drop that binder: free variables above it move in by one.
pub fn instantiate(body: &RcSyntax, value: &RcSyntax) -> RcSyntax {
    instantiate_at(body, value, 0)
}

fn instantiate_at(term: &RcSyntax, value: &RcSyntax, depth: usize) -> RcSyntax {
    match &**term {
        Syntax::Variable(var) => {
            let i = var.index.to_usize();
            if i < depth {
                term.clone()
            } else if i == depth {
                lift(value, depth)
            } else {
                Syntax::variable_rc(Index(i - 1))
            }
        }
        Syntax::Constant(_) | Syntax::Sort(_) | Syntax::Numeral(_) => term.clone(),
        Syntax::Application(app) => {
            // The head may become an application itself; keep the spine flat.
            let function = instantiate_at(&app.function, value, depth);
            let arguments: Vec<_> = app
                .arguments
                .iter()
                .map(|arg| instantiate_at(arg, value, depth))
                .collect();
            Syntax::application_rc(function, arguments)
        }
        Syntax::Lambda(Lambda { name, domain, body }) => Syntax::lambda_rc(
            name.clone(),
            instantiate_at(domain, value, depth),
            instantiate_at(body, value, depth + 1),
        ),
        Syntax::Pi(Pi { name, domain, body }) => Syntax::pi_rc(
            name.clone(),
            instantiate_at(domain, value, depth),
            instantiate_at(body, value, depth + 1),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;

    fn var(i: usize) -> RcSyntax {
        Syntax::variable_rc(Index(i))
    }

    fn c(name: &str) -> RcSyntax {
        Syntax::constant_rc(Name::from(name))
    }

    fn lam(body: RcSyntax) -> RcSyntax {
        Syntax::lambda_rc(Name::from("x"), Syntax::prop_rc(), body)
    }

    #[test]
    fn test_lift_skips_bound_variables() {
        let term = lam(Syntax::application_rc(var(0), [var(1)]));
        let lifted = lift(&term, 2);
        assert_eq!(lifted, lam(Syntax::application_rc(var(0), [var(3)])));
    }

    #[test]
    fn test_lift_by_zero_shares() {
        let term = lam(var(1));
        assert!(Rc::ptr_eq(&lift(&term, 0), &term));
    }

    #[test]
    fn test_instantiate_replaces_and_lowers() {
        // body: f $0 $1, under one binder
        let body = Syntax::application_rc(c("f"), [var(0), var(1)]);
        let result = instantiate(&body, &c("a"));
        assert_eq!(result, Syntax::application_rc(c("f"), [c("a"), var(0)]));
    }

    #[test]
    fn test_instantiate_lifts_value_under_binders() {
        // body: λx. $1   value: !0 (free)
        let body = lam(var(1));
        let result = instantiate(&body, &var(0));
        assert_eq!(result, lam(var(1)));

        // body: λx. $0 is untouched
        let body = lam(var(0));
        assert_eq!(instantiate(&body, &c("a")), lam(var(0)));
    }

    #[test]
    fn test_instantiate_flattens_new_spines() {
        // body: $0 b, value: f a  ==>  f a b
        let body = Syntax::application_rc(var(0), [c("b")]);
        let value = Syntax::application_rc(c("f"), [c("a")]);
        let result = instantiate(&body, &value);
        assert_eq!(result, Syntax::application_rc(c("f"), [c("a"), c("b")]));
    }
}
