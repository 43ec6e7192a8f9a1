use crate::common::{Index, Level};
use crate::syn::{self, RcSyntax};
use std::fmt;
use std::rc::Rc;

/// An expression that is already normal relative to its own free variables.
///
/// The term was produced at binding depth `depth`, and its free indices are
/// relative to that depth. Reading it back deeper shifts those indices past
/// the binders opened in between.
#[derive(Clone, Debug)]
pub struct Literal {
    pub term: RcSyntax,
    pub depth: usize,
}

impl Literal {
    pub fn new(term: RcSyntax, depth: usize) -> Literal {
        Literal { term, depth }
    }
}

/// A closure represents a pending evaluation: a lambda that has not been
/// entered, together with the environment in force where it was found.
///
/// Applying the closure extends the captured environment with the argument,
/// which performs the substitution for the bound variable as the body is
/// evaluated.
#[derive(Clone, Debug)]
pub struct Closure {
    pub lambda: syn::Lambda,
    pub context: Context,
}

impl Closure {
    pub fn new(lambda: syn::Lambda, context: Context) -> Closure {
        Closure { lambda, context }
    }
}

/// Values in the semantic domain.
#[derive(Clone, Debug)]
pub enum Value {
    Literal(Literal),
    Closure(Closure),
    /// A bound variable whose binder has been opened, named by the depth at
    /// which it was opened.
    Placeholder(Level),
}

impl Value {
    pub fn literal(term: RcSyntax, depth: usize) -> Value {
        Value::Literal(Literal::new(term, depth))
    }

    pub fn closure(lambda: syn::Lambda, context: Context) -> Value {
        Value::Closure(Closure::new(lambda, context))
    }

    pub fn placeholder(level: Level) -> Value {
        Value::Placeholder(level)
    }

    pub fn is_closure(&self) -> bool {
        matches!(self, Value::Closure(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unbound variable {index} in a context of length {length}")]
pub struct UnboundVariable {
    pub index: Index,
    pub length: usize,
}

struct Frame {
    value: Value,
    next: Option<Rc<Frame>>,
    len: usize,
}

/// A mapping from bound variables to their values. The most recently bound
/// variable is at the front, so a de Bruijn index is a position in the list.
///
/// Contexts are persistent: extending one allocates a new front node that
/// shares the old list as its tail.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Rc<Frame>>,
}

impl Context {
    pub fn new() -> Context {
        Context { head: None }
    }

    /// A new context with `value` bound to index 0. `self` is left as is.
    #[must_use]
    pub fn extend(&self, value: Value) -> Context {
        let len = self.len() + 1;
        let frame = Frame {
            value,
            next: self.head.clone(),
            len,
        };
        Context {
            head: Some(Rc::new(frame)),
        }
    }

    pub fn lookup(&self, index: Index) -> Result<&Value, UnboundVariable> {
        self.iter()
            .nth(index.to_usize())
            .ok_or(UnboundVariable {
                index,
                length: self.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |frame| frame.len)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterate from the innermost binding outward.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Unlink uniquely owned frames one at a time so that dropping a long
        // context does not recurse once per frame.
        let mut next = self.head.take();
        while let Some(frame) = next {
            match Rc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.next.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct Iter<'a> {
    next: Option<&'a Frame>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        let frame = self.next?;
        self.next = frame.next.as_deref();
        Some(&frame.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syn::Syntax;

    fn level(l: usize) -> Value {
        Value::placeholder(Level::new(l))
    }

    fn as_level(value: &Value) -> Level {
        match value {
            Value::Placeholder(level) => *level,
            other => panic!("expected a placeholder, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_counts_from_the_front() {
        let ctx = Context::new().extend(level(0)).extend(level(1)).extend(level(2));
        assert_eq!(ctx.len(), 3);
        assert_eq!(as_level(ctx.lookup(Index(0)).unwrap()), Level::new(2));
        assert_eq!(as_level(ctx.lookup(Index(2)).unwrap()), Level::new(0));
    }

    #[test]
    fn test_lookup_past_the_end_fails() {
        let ctx = Context::new().extend(level(0));
        assert_eq!(
            ctx.lookup(Index(1)).unwrap_err(),
            UnboundVariable {
                index: Index(1),
                length: 1
            }
        );
        assert!(Context::new().lookup(Index(0)).is_err());
    }

    #[test]
    fn test_extend_shares_the_tail() {
        let base = Context::new().extend(level(0));
        let left = base.extend(level(1));
        let right = base.extend(Value::literal(Syntax::prop_rc(), 0));
        assert_eq!(base.len(), 1);
        assert_eq!(as_level(left.lookup(Index(1)).unwrap()), Level::new(0));
        assert!(matches!(right.lookup(Index(0)), Ok(Value::Literal(_))));
        drop(base);
        assert_eq!(as_level(left.lookup(Index(1)).unwrap()), Level::new(0));
    }

    #[test]
    fn test_drop_long_context() {
        let mut ctx = Context::new();
        for l in 0..200_000 {
            ctx = ctx.extend(level(l));
        }
        assert_eq!(ctx.len(), 200_000);
        drop(ctx);
    }

    #[test]
    fn test_debug_lists_values() {
        let ctx = Context::new().extend(level(0));
        assert_eq!(format!("{ctx:?}"), "[Placeholder(Level(0))]");
    }
}
