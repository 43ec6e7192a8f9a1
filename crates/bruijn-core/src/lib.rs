pub mod common;
pub mod eval;
pub mod name;
pub mod normalize;
pub mod quote;
pub mod syn;
pub mod val;

pub use eval::Error;
pub use normalize::normalize;
pub use syn::{RcSyntax, Syntax};
