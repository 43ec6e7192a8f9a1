//! A small precedence-aware layer over the `elegance` pretty printer.
//!
//! Terms implement [`PPTerm`], declaring how tightly they bind on their left
//! and right edges. The blanket [`PP`] impl wraps a term in parentheses when
//! the ambient precedence is at least as tight as the term's own.

use elegance::{Io, Printer, Render};

pub type Prec = Option<usize>;
pub type TermPrec = (Prec, Prec);

pub const COLUMNS: usize = 80;
pub const INDENT: isize = 2;

/// The ambient printing state.
#[derive(Clone, Copy, Debug, Default)]
pub struct State {
    /// Number of binders entered so far.
    depth: usize,
    /// Precedence of whatever sits immediately to the left of the term.
    lhs_prec: Prec,
    /// Precedence of whatever sits immediately to the right of the term.
    rhs_prec: Prec,
}

impl State {
    pub fn new() -> State {
        State::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn inc_depth(&self) -> State {
        State {
            depth: self.depth + 1,
            ..*self
        }
    }

    pub fn reset_prec(&self) -> State {
        State {
            lhs_prec: None,
            rhs_prec: None,
            ..*self
        }
    }

    pub fn set_lhs_prec(&self, lhs_prec: Prec) -> State {
        State { lhs_prec, ..*self }
    }

    pub fn set_rhs_prec(&self, rhs_prec: Prec) -> State {
        State { rhs_prec, ..*self }
    }
}

pub trait PP {
    fn print<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error>;
}

impl<T: PP> PP for std::rc::Rc<T> {
    fn print<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        self.as_ref().print(st, p)
    }
}

/// A term with operator precedence on each edge. `None` means the edge is
/// closed (an atom, or a keyword that cannot be captured).
pub trait PPTerm {
    const PREC: TermPrec;

    fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error>;
}

impl<T: PPTerm> PP for T {
    fn print<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        if needs_parens(&st, T::PREC) {
            p.cgroup(1, |p| {
                p.text("(")?;
                self.print_content(st.reset_prec(), p)?;
                p.text(")")
            })
        } else {
            self.print_content(st, p)
        }
    }
}

fn binds_tighter(ambient: Prec, own: Prec) -> bool {
    matches!((ambient, own), (Some(ambient), Some(own)) if ambient >= own)
}

fn needs_parens(st: &State, (lhs, rhs): TermPrec) -> bool {
    binds_tighter(st.lhs_prec, lhs) || binds_tighter(st.rhs_prec, rhs)
}

/// Print `x` as the left operand of an operator binding at `prec`.
pub fn print_lhs<R, T>(st: State, p: &mut Printer<R>, x: &T, prec: Prec) -> Result<(), R::Error>
where
    R: Render,
    T: PP + ?Sized,
{
    x.print(st.set_rhs_prec(prec), p)
}

/// Print `x` as the right operand of an operator binding at `prec`.
pub fn print_rhs<R, T>(st: State, p: &mut Printer<R>, x: &T, prec: Prec) -> Result<(), R::Error>
where
    R: Render,
    T: PP + ?Sized,
{
    x.print(st.set_lhs_prec(prec), p)
}

/// Print `x` in a delimited position, e.g. between parentheses.
pub fn print_internal<R, T>(st: State, p: &mut Printer<R>, x: &T) -> Result<(), R::Error>
where
    R: Render,
    T: PP + ?Sized,
{
    x.print(st.reset_prec(), p)
}

/// Print the binder introduced at the current depth.
pub fn print_binder<R: Render>(st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
    p.text_owned(format!("%{}", st.depth))
}

pub fn dump<T: PP + ?Sized>(x: &T) {
    let mut p = Printer::new(Io(std::io::stdout()), COLUMNS);
    let _ = x.print(State::new(), &mut p);
    let _ = p.hard_break();
    let _ = p.finish();
}

pub fn dump_to_str<T: PP + ?Sized>(x: &T) -> String {
    dump_to_str_width(x, COLUMNS)
}

pub fn dump_to_str_width<T: PP + ?Sized>(x: &T, columns: usize) -> String {
    let mut p = Printer::new(String::new(), columns);
    let _ = x.print(State::new(), &mut p);
    p.finish().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Atom(&'static str);

    impl PPTerm for Atom {
        const PREC: TermPrec = (None, None);

        fn print_content<R: Render>(&self, _: State, p: &mut Printer<R>) -> Result<(), R::Error> {
            p.text(self.0)
        }
    }

    struct Arrow(Box<Node>, Box<Node>);

    enum Node {
        Atom(Atom),
        Arrow(Arrow),
    }

    impl PP for Node {
        fn print<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
            match self {
                Node::Atom(a) => a.print(st, p),
                Node::Arrow(a) => a.print(st, p),
            }
        }
    }

    impl PPTerm for Arrow {
        const PREC: TermPrec = (Some(2), Some(1));

        fn print_content<R: Render>(&self, st: State, p: &mut Printer<R>) -> Result<(), R::Error> {
            print_lhs(st, p, &*self.0, Some(2))?;
            p.text(" → ")?;
            print_rhs(st, p, &*self.1, Some(1))
        }
    }

    fn arrow(a: Node, b: Node) -> Node {
        Node::Arrow(Arrow(Box::new(a), Box::new(b)))
    }

    fn atom(s: &'static str) -> Node {
        Node::Atom(Atom(s))
    }

    #[test]
    fn test_right_nested_arrow_has_no_parens() {
        let x = arrow(atom("a"), arrow(atom("b"), atom("c")));
        assert_eq!(dump_to_str(&x), "a → b → c");
    }

    #[test]
    fn test_left_nested_arrow_is_parenthesized() {
        let x = arrow(arrow(atom("a"), atom("b")), atom("c"));
        assert_eq!(dump_to_str(&x), "(a → b) → c");
    }

    #[test]
    fn test_binder_uses_depth() {
        let mut p = Printer::new(String::new(), COLUMNS);
        print_binder(State::new().inc_depth().inc_depth(), &mut p).unwrap();
        assert_eq!(p.finish().unwrap(), "%2");
    }
}
