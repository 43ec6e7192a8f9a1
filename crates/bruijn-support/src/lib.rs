pub mod loc;
pub mod pp;

pub use loc::*;
