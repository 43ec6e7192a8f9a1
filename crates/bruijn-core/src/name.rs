use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

use bruijn_support::pp::{State, PP};
use elegance::{Printer, Render};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(text: &str) -> Symbol {
        Symbol(Rc::from(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Symbol {
        Symbol::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Symbol {
        Symbol(Rc::from(s))
    }
}

/// One segment of a hierarchical name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Component {
    Sym(Symbol),
    Num(usize),
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Component::Sym(sym) => sym.fmt(f),
            Component::Num(num) => num.fmt(f),
        }
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Component {
        Component::Sym(s.into())
    }
}

impl From<String> for Component {
    fn from(s: String) -> Component {
        Component::Sym(s.into())
    }
}

impl From<usize> for Component {
    fn from(n: usize) -> Component {
        Component::Num(n)
    }
}

/// A name path, stored innermost-last so that extending a name shares its
/// prefix.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Path {
    Anonymous,
    Ext(Rc<Path>, Component),
}

impl Path {
    fn fmt_dotted(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Path::Anonymous => Ok(()),
            Path::Ext(prefix, c) => {
                if let Path::Ext(..) = **prefix {
                    prefix.fmt_dotted(f)?;
                    f.write_str(".")?;
                }
                c.fmt(f)
            }
        }
    }
}

/// A hierarchical name such as `Nat.succ`. Used for constants and, as a
/// printing hint only, for binders.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Name(Rc<Path>);

impl Name {
    pub fn anon() -> Name {
        Name(Rc::new(Path::Anonymous))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(*self.0, Path::Anonymous)
    }

    pub fn ext<T>(&self, c: T) -> Name
    where
        T: Into<Component>,
    {
        Name(Rc::new(Path::Ext(self.0.clone(), c.into())))
    }

    /// Build a name from its dotted form. Purely numeric segments become
    /// numeric components.
    pub fn from_dotted(text: &str) -> Name {
        text.split('.')
            .filter(|segment| !segment.is_empty())
            .fold(Name::anon(), |name, segment| match segment.parse::<usize>() {
                Ok(n) => name.ext(n),
                Err(_) => name.ext(segment),
            })
    }

    /// The last component, if any.
    pub fn last(&self) -> Option<&Component> {
        match &*self.0 {
            Path::Anonymous => None,
            Path::Ext(_, c) => Some(c),
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Path::Anonymous => f.write_str("_"),
            path => path.fmt_dotted(f),
        }
    }
}

impl PP for Name {
    fn print<R: Render>(&self, _: State, p: &mut Printer<R>) -> Result<(), R::Error> {
        p.text_owned(self.to_string())
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Name {
        Name::from_dotted(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Name {
        Name::from_dotted(&text)
    }
}
