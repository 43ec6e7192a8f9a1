pub mod basic;
pub mod parse;
pub mod print;
pub mod subst;

pub use basic::*;
pub use parse::parse_syntax;
pub use print::*;
pub use subst::{instantiate, lift};
