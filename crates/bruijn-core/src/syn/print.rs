use crate::common::Index;
use crate::syn::{Application, Constant, Lambda, Numeral, Pi, Sort, Syntax, Variable};
use bruijn_support::pp::{
    self, print_binder, print_internal, print_lhs, print_rhs, State, TermPrec, INDENT, PP,
    PPTerm,
};
use elegance::{Printer, Render};
use std::fmt::{self, Display, Formatter};

const ATOM: TermPrec = (None, None);
const BINDER: TermPrec = (None, Some(0));
const ARROW: TermPrec = (Some(2), Some(1));
const APP: TermPrec = (Some(4), Some(5));

pub fn dump_syntax(syntax: &Syntax) {
    pp::dump(syntax);
}

pub fn print_syntax_to_string(syntax: &Syntax) -> String {
    pp::dump_to_str(syntax)
}

impl Display for Syntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&print_syntax_to_string(self))
    }
}

impl PP for Syntax {
    fn print<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        match self {
            Syntax::Variable(var) => var.print(st, p),
            Syntax::Constant(constant) => constant.print(st, p),
            Syntax::Sort(sort) => sort.print(st, p),
            Syntax::Numeral(num) => num.print(st, p),
            Syntax::Application(app) => app.print(st, p),
            Syntax::Lambda(lam) => lam.print(st, p),
            Syntax::Pi(pi) if pi.body.has_free_var(Index(0)) => Forall(pi).print(st, p),
            Syntax::Pi(pi) => Arrow(pi).print(st, p),
        }
    }
}

impl PPTerm for Variable {
    const PREC: TermPrec = ATOM;

    fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        // Bound variables print as the level of their binder, free ones as
        // the distance past the outermost binder.
        if self.index.is_bound(st.depth()) {
            p.text_owned(self.index.to_level(st.depth()).to_string())
        } else {
            p.text_owned(self.index.to_negative_level(st.depth()).to_string())
        }
    }
}

impl PPTerm for Constant {
    const PREC: TermPrec = ATOM;

    fn print_content<R: Render>(&self, _: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        p.text_owned(format!("@{}", self.name))
    }
}

impl PPTerm for Sort {
    const PREC: TermPrec = ATOM;

    fn print_content<R: Render>(&self, _: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        match self {
            Sort::Prop => p.text("Prop"),
            Sort::Type(level) => p.text_owned(format!("𝒰{level}")),
        }
    }
}

impl PPTerm for Numeral {
    const PREC: TermPrec = ATOM;

    fn print_content<R: Render>(&self, _: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        p.text_owned(self.value.to_string())
    }
}

impl PPTerm for Application {
    const PREC: TermPrec = APP;

    fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        p.cgroup(INDENT, |p| {
            print_lhs(st, p, &*self.function, APP.0)?;
            let last = self.arguments.len() - 1;
            for (i, arg) in self.arguments.iter().enumerate() {
                p.space()?;
                // Only the last argument may extend to the right.
                let st = if i == last { st } else { st.set_rhs_prec(APP.0) };
                print_rhs(st, p, &**arg, APP.1)?;
            }
            Ok(())
        })
    }
}

fn print_binder_group<R: Render>(
    st: State,
    p: &mut Printer<R>,
    domain: &Syntax,
) -> Result<(), R::Error> {
    p.text("(")?;
    p.cgroup(INDENT, |p| {
        print_binder(st, p)?;
        p.text(" :")?;
        p.space()?;
        print_internal(st, p, domain)
    })?;
    p.text(")")
}

impl PPTerm for Lambda {
    const PREC: TermPrec = BINDER;

    fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        let mut st = st;
        let mut next = self;
        p.cgroup(INDENT, |p| {
            p.text("λ")?;
            loop {
                print_binder_group(st, p, &next.domain)?;
                st = st.inc_depth();
                match &*next.body {
                    Syntax::Lambda(lam) => next = lam,
                    _ => break,
                }
                p.space()?;
            }
            p.text(" →")?;
            p.space()?;
            print_rhs(st, p, &*next.body, None)
        })
    }
}

/// A dependent function type, printed with its binders.
struct Forall<'a>(&'a Pi);

impl PPTerm for Forall<'_> {
    const PREC: TermPrec = BINDER;

    fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        let mut st = st;
        let mut next = self.0;
        p.cgroup(INDENT, |p| {
            p.text("∀")?;
            loop {
                print_binder_group(st, p, &next.domain)?;
                st = st.inc_depth();
                match &*next.body {
                    Syntax::Pi(pi) if pi.body.has_free_var(Index(0)) => next = pi,
                    _ => break,
                }
                p.space()?;
            }
            p.text(" →")?;
            p.space()?;
            print_rhs(st, p, &*next.body, None)
        })
    }
}

/// A function type whose codomain ignores its argument.
struct Arrow<'a>(&'a Pi);

impl PPTerm for Arrow<'_> {
    const PREC: TermPrec = ARROW;

    fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        p.cgroup(0, |p| {
            print_lhs(st, p, &*self.0.domain, ARROW.0)?;
            p.text(" →")?;
            p.space()?;
            // The codomain still sits under the (unused) binder.
            print_rhs(st.inc_depth(), p, &*self.0.body, ARROW.1)
        })
    }
}
