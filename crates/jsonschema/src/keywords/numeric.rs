//! `multipleOf` and the four numeric bounds.
use fraction::{BigFraction, BigUint};
use jsonschema_ir::{JsonValue, Number};

use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
};

type Check = fn(&Number, &Number) -> bool;
type Error = fn(&JsonValue, &JsonValue) -> ValidationError;

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let keywords = input.keywords;
    let JsonValue::Number(number) = input.instance else {
        super::ignore(
            ev,
            input,
            &[
                ("multipleOf", keywords.multiple_of.is_some()),
                ("maximum", keywords.maximum.is_some()),
                ("exclusiveMaximum", keywords.exclusive_maximum.is_some()),
                ("minimum", keywords.minimum.is_some()),
                ("exclusiveMinimum", keywords.exclusive_minimum.is_some()),
            ],
        );
        return;
    };
    if let Some(multiple_of) = &keywords.multiple_of {
        let valid = is_multiple_of(number, multiple_of);
        if !valid {
            output.fail(ValidationError::multiple_of(
                input.instance,
                &JsonValue::Number(*multiple_of),
            ));
        }
        ev.trace(input, "multipleOf", valid);
    }
    let bounds: [(&str, Option<&Number>, Check, Error); 4] = [
        ("maximum", keywords.maximum.as_ref(), Number::le, ValidationError::maximum),
        (
            "exclusiveMaximum",
            keywords.exclusive_maximum.as_ref(),
            Number::lt,
            ValidationError::exclusive_maximum,
        ),
        ("minimum", keywords.minimum.as_ref(), Number::ge, ValidationError::minimum),
        (
            "exclusiveMinimum",
            keywords.exclusive_minimum.as_ref(),
            Number::gt,
            ValidationError::exclusive_minimum,
        ),
    ];
    for (keyword, limit, check, error) in bounds {
        let Some(limit) = limit else {
            continue;
        };
        let valid = check(number, limit);
        if !valid {
            output.fail(error(input.instance, &JsonValue::Number(*limit)));
        }
        ev.trace(input, keyword, valid);
    }
}

#[allow(clippy::float_cmp)]
fn is_multiple_of(number: &Number, multiple_of: &Number) -> bool {
    match (number, multiple_of) {
        (Number::PositiveInteger(item), Number::PositiveInteger(multiple)) => {
            *multiple != 0 && item % multiple == 0
        }
        (Number::NegativeInteger(item), Number::PositiveInteger(multiple)) => {
            *multiple != 0 && item.unsigned_abs() % multiple == 0
        }
        _ => {
            let item = number.as_f64();
            let multiple = multiple_of.as_f64();
            if multiple_of.is_integer() && item.fract() != 0.0 {
                return false;
            }
            let remainder = (item / multiple) % 1.;
            if remainder.is_nan() {
                // Involves heap allocations via the underlying `BigUint` type
                let fraction = BigFraction::from(item) / BigFraction::from(multiple);
                if let Some(denom) = fraction.denom() {
                    denom == &BigUint::from(1_u8)
                } else {
                    true
                }
            } else {
                remainder < f64::EPSILON
            }
        }
    }
}
