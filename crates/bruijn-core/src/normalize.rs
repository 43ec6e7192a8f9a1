use crate::eval::{eval, Result};
use crate::quote::quote;
use crate::syn::RcSyntax;
use crate::val::Context;
use tracing::trace;

/// Compute the beta normal form of a closed term.
///
/// The result is fully normalized under binders and in binder types. Lambdas
/// are left eta-long. Constants never unfold, so applications headed by a
/// constant or a variable are left in place with normalized arguments.
///
/// Fails if the term has a variable with no binder. Does not terminate on
/// terms without a normal form.
pub fn normalize(stx: &RcSyntax) -> Result<RcSyntax> {
    trace!(target: "normalize", input = %stx, "normalize");
    let value = eval(stx, &Context::new(), 0)?;
    let result = quote(&value, 0)?;
    trace!(target: "normalize", output = %result, "normalized");
    Ok(result)
}
