//! `type`, `enum` and `const`.
use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
};

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let instance = input.instance;
    if let Some(types) = &input.keywords.types {
        let valid = types.set.matches(instance);
        if !valid {
            output.fail(ValidationError::type_mismatch(instance, &types.types));
        }
        ev.trace(input, "type", valid);
    }
    if let Some(options) = &input.keywords.enumeration {
        // Canonical equality: `1 == 1.0`, object key order is irrelevant
        let valid = options.iter().any(|option| option == instance);
        if !valid {
            output.fail(ValidationError::enumeration(instance, options));
        }
        ev.trace(input, "enum", valid);
    }
    if let Some(expected) = &input.keywords.constant {
        let valid = expected == instance;
        if !valid {
            output.fail(ValidationError::constant(instance, expected));
        }
        ev.trace(input, "const", valid);
    }
}
