//! Keyword evaluation, one module per keyword family.
//!
//! Families run in a fixed order. `unevaluatedProperties` and `unevaluatedItems` run after every
//! other applicator of the node has recorded what it evaluated.
mod annotations;
mod array;
mod combinators;
mod if_;
mod numeric;
mod object;
mod reference;
mod string;
mod type_;
mod unevaluated;

use jsonschema_ir::JsonValue;

use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
    node::Pattern,
};

pub(crate) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    reference::evaluate(ev, input, output);
    type_::evaluate(ev, input, output);
    numeric::evaluate(ev, input, output);
    string::evaluate(ev, input, output);
    combinators::evaluate(ev, input, output);
    if_::evaluate(ev, input, output);
    object::evaluate(ev, input, output);
    array::evaluate(ev, input, output);
    unevaluated::evaluate(ev, input, output);
    annotations::evaluate(input, output);
}

/// Match `text` against a compiled pattern keyword.
pub(super) fn is_match(
    pattern: &Pattern,
    keyword: &'static str,
    text: &str,
    instance: &JsonValue,
) -> Result<bool, ValidationError> {
    let Some(compiled) = &pattern.compiled else {
        return Err(ValidationError::internal(
            keyword,
            &format!("Pattern '{}' was not compiled", pattern.source),
        ));
    };
    compiled.is_match(text).map_err(|error| {
        tracing::debug!(pattern = %pattern.source, error = %error, "Pattern matching failed");
        ValidationError::backtrack_limit(keyword, instance, &pattern.source)
    })
}

/// Trace every present keyword as not applicable to the instance type.
pub(super) fn ignore(ev: &mut Evaluator<'_, '_>, input: &Input<'_, '_>, keywords: &[(&str, bool)]) {
    for (keyword, present) in keywords {
        if *present {
            ev.trace(input, keyword, None::<bool>);
        }
    }
}
