use crate::common::{Index, UniverseLevel};
use crate::name::Name;
use std::rc::Rc;

pub type RcSyntax = Rc<Syntax>;

/// The kind tag of a syntax node.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Kind {
    Variable,
    Constant,
    Sort,
    Numeral,
    Application,
    Lambda,
    Pi,
}

/// Core terms. Variables are de Bruijn indices, binders carry a name that is
/// kept for display only.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub enum Syntax {
    Variable(Variable),
    Constant(Constant),
    Sort(Sort),
    Numeral(Numeral),
    Application(Application),
    Lambda(Lambda),
    Pi(Pi),
}

impl Syntax {
    pub fn variable(index: Index) -> Syntax {
        Syntax::Variable(Variable::new(index))
    }

    pub fn variable_rc(index: Index) -> RcSyntax {
        Rc::new(Syntax::variable(index))
    }

    pub fn constant(name: Name) -> Syntax {
        Syntax::Constant(Constant::new(name))
    }

    pub fn constant_rc(name: Name) -> RcSyntax {
        Rc::new(Syntax::constant(name))
    }

    pub fn sort(sort: Sort) -> Syntax {
        Syntax::Sort(sort)
    }

    pub fn sort_rc(sort: Sort) -> RcSyntax {
        Rc::new(Syntax::sort(sort))
    }

    pub fn prop_rc() -> RcSyntax {
        Syntax::sort_rc(Sort::Prop)
    }

    pub fn type_rc(level: UniverseLevel) -> RcSyntax {
        Syntax::sort_rc(Sort::Type(level))
    }

    pub fn numeral(value: u64) -> Syntax {
        Syntax::Numeral(Numeral::new(value))
    }

    pub fn numeral_rc(value: u64) -> RcSyntax {
        Rc::new(Syntax::numeral(value))
    }

    /// Apply `function` to `arguments`, keeping the spine flat: when
    /// `function` is already an application the new arguments are appended
    /// to its argument list. With no arguments this is `function` itself.
    pub fn application_rc<I>(function: RcSyntax, arguments: I) -> RcSyntax
    where
        I: IntoIterator<Item = RcSyntax>,
    {
        let mut arguments = arguments.into_iter().peekable();
        if arguments.peek().is_none() {
            return function;
        }
        let app = match &*function {
            Syntax::Application(app) => {
                let mut spine = app.arguments.clone();
                spine.extend(arguments);
                Application::new(app.function.clone(), spine)
            }
            _ => Application::new(function, arguments.collect()),
        };
        Rc::new(Syntax::Application(app))
    }

    pub fn lambda(name: Name, domain: RcSyntax, body: RcSyntax) -> Syntax {
        Syntax::Lambda(Lambda::new(name, domain, body))
    }

    pub fn lambda_rc(name: Name, domain: RcSyntax, body: RcSyntax) -> RcSyntax {
        Rc::new(Syntax::lambda(name, domain, body))
    }

    pub fn pi(name: Name, domain: RcSyntax, body: RcSyntax) -> Syntax {
        Syntax::Pi(Pi::new(name, domain, body))
    }

    pub fn pi_rc(name: Name, domain: RcSyntax, body: RcSyntax) -> RcSyntax {
        Rc::new(Syntax::pi(name, domain, body))
    }

    /// The non-dependent function type `domain → codomain`. The codomain is
    /// written outside the new binder and is lifted under it.
    pub fn arrow_rc(domain: RcSyntax, codomain: &RcSyntax) -> RcSyntax {
        Syntax::pi_rc(Name::anon(), domain, crate::syn::lift(codomain, 1))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Syntax::Variable(_) => Kind::Variable,
            Syntax::Constant(_) => Kind::Constant,
            Syntax::Sort(_) => Kind::Sort,
            Syntax::Numeral(_) => Kind::Numeral,
            Syntax::Application(_) => Kind::Application,
            Syntax::Lambda(_) => Kind::Lambda,
            Syntax::Pi(_) => Kind::Pi,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.kind() == Kind::Variable
    }

    pub fn is_application(&self) -> bool {
        self.kind() == Kind::Application
    }

    pub fn is_lambda(&self) -> bool {
        self.kind() == Kind::Lambda
    }

    pub fn is_pi(&self) -> bool {
        self.kind() == Kind::Pi
    }

    /// The smallest `n` such that every free variable of the term has an
    /// index below `n`, measured from outside the term. Zero for closed terms.
    pub fn free_var_bound(&self) -> usize {
        match self {
            Syntax::Variable(var) => var.index.to_usize() + 1,
            Syntax::Constant(_) | Syntax::Sort(_) | Syntax::Numeral(_) => 0,
            Syntax::Application(app) => app
                .arguments
                .iter()
                .map(|arg| arg.free_var_bound())
                .fold(app.function.free_var_bound(), usize::max),
            Syntax::Lambda(Lambda { domain, body, .. }) | Syntax::Pi(Pi { domain, body, .. }) => {
                domain
                    .free_var_bound()
                    .max(body.free_var_bound().saturating_sub(1))
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.free_var_bound() == 0
    }

    /// Whether the variable `index` occurs free in the term.
    pub fn has_free_var(&self, index: Index) -> bool {
        match self {
            Syntax::Variable(var) => var.index == index,
            Syntax::Constant(_) | Syntax::Sort(_) | Syntax::Numeral(_) => false,
            Syntax::Application(app) => {
                app.function.has_free_var(index)
                    || app.arguments.iter().any(|arg| arg.has_free_var(index))
            }
            Syntax::Lambda(Lambda { domain, body, .. }) | Syntax::Pi(Pi { domain, body, .. }) => {
                domain.has_free_var(index) || body.has_free_var(index.raise(1))
            }
        }
    }
}

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub struct Variable {
    pub index: Index,
}

impl Variable {
    pub fn new(index: Index) -> Variable {
        Variable { index }
    }
}

/// An opaque named constant. Constants never unfold.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct Constant {
    pub name: Name,
}

impl Constant {
    pub fn new(name: Name) -> Constant {
        Constant { name }
    }
}

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum Sort {
    Prop,
    Type(UniverseLevel),
}

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub struct Numeral {
    pub value: u64,
}

impl Numeral {
    pub fn new(value: u64) -> Numeral {
        Numeral { value }
    }
}

/// An application of a head to one or more arguments.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct Application {
    pub function: RcSyntax,
    pub arguments: Vec<RcSyntax>,
}

impl Application {
    pub fn new(function: RcSyntax, arguments: Vec<RcSyntax>) -> Application {
        debug_assert!(!arguments.is_empty(), "application without arguments");
        Application {
            function,
            arguments,
        }
    }

    pub fn num_args(&self) -> usize {
        self.arguments.len()
    }
}

/// A function `λ(x : domain) → body`.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct Lambda {
    pub name: Name,
    pub domain: RcSyntax,
    pub body: RcSyntax,
}

impl Lambda {
    pub fn new(name: Name, domain: RcSyntax, body: RcSyntax) -> Lambda {
        Lambda { name, domain, body }
    }
}

/// A dependent function type `∀(x : domain) → body`.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct Pi {
    pub name: Name,
    pub domain: RcSyntax,
    pub body: RcSyntax,
}

impl Pi {
    pub fn new(name: Name, domain: RcSyntax, body: RcSyntax) -> Pi {
        Pi { name, domain, body }
    }
}
