//! `if`, `then` and `else`.
use crate::{
    error::ValidationError,
    evaluator::{Evaluator, Input, Output},
};

pub(super) fn evaluate<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
) {
    let keywords = input.keywords;
    let Some(condition) = keywords.if_ else {
        // `then` and `else` without `if` have no effect
        super::ignore(
            ev,
            input,
            &[
                ("then", keywords.then_.is_some()),
                ("else", keywords.else_.is_some()),
            ],
        );
        return;
    };
    let outcome = ev.in_place(input, condition, input.evaluation_path.join("if"));
    let matched = outcome.unit.is_valid();
    ev.trace(input, "if", matched);
    if matched {
        // A failed condition is not an error and leaves nothing behind
        output.apply(outcome);
    }
    let (keyword, branch) = if matched {
        ("then", keywords.then_)
    } else {
        ("else", keywords.else_)
    };
    let Some(branch) = branch else {
        return;
    };
    let outcome = ev.in_place(input, branch, input.evaluation_path.join(keyword));
    let valid = outcome.unit.is_valid();
    output.apply(outcome);
    if !valid {
        output.fail(if matched {
            ValidationError::if_then(input.instance)
        } else {
            ValidationError::if_else(input.instance)
        });
    }
    ev.trace(input, keyword, valid);
}
