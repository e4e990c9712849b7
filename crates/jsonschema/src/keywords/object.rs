//! Object keywords.
use ahash::AHashSet;
use jsonschema_ir::{JsonValue, Map};

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
    let Some(object) = input.instance.as_object() else {
        super::ignore(
            ev,
            input,
            &[
                ("maxProperties", keywords.max_properties.is_some()),
                ("minProperties", keywords.min_properties.is_some()),
                ("required", keywords.required.is_some()),
                ("dependentRequired", keywords.dependent_required.is_some()),
                ("properties", keywords.properties.is_some()),
                ("patternProperties", keywords.pattern_properties.is_some()),
                ("additionalProperties", keywords.additional_properties.is_some()),
                ("propertyNames", keywords.property_names.is_some()),
                ("dependentSchemas", keywords.dependent_schemas.is_some()),
            ],
        );
        return;
    };
    counts(ev, input, output, object);
    required(ev, input, output, object);
    let mut covered = AHashSet::new();
    properties(ev, input, output, object, &mut covered);
    pattern_properties(ev, input, output, object, &mut covered);
    additional_properties(ev, input, output, object, &covered);
    property_names(ev, input, output, object);
    dependent_schemas(ev, input, output, object);
}

fn counts(ev: &mut Evaluator<'_, '_>, input: &Input<'_, '_>, output: &mut Output<'_>, object: &Map) {
    let size = object.len() as u64;
    if let Some(limit) = input.keywords.max_properties {
        let valid = size <= limit;
        if !valid {
            output.fail(ValidationError::max_properties(input.instance, limit));
        }
        ev.trace(input, "maxProperties", valid);
    }
    if let Some(limit) = input.keywords.min_properties {
        let valid = size >= limit;
        if !valid {
            output.fail(ValidationError::min_properties(input.instance, limit));
        }
        ev.trace(input, "minProperties", valid);
    }
}

fn required(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, '_>,
    output: &mut Output<'_>,
    object: &Map,
) {
    if let Some(names) = &input.keywords.required {
        let mut valid = true;
        for name in names {
            if !object.contains_key(name) {
                valid = false;
                output.fail(ValidationError::required(input.instance, name));
            }
        }
        ev.trace(input, "required", valid);
    }
    if let Some(dependencies) = &input.keywords.dependent_required {
        let mut valid = true;
        for (property, required) in dependencies {
            if !object.contains_key(property) {
                continue;
            }
            for name in required {
                if !object.contains_key(name) {
                    valid = false;
                    output.fail(ValidationError::dependent_required(
                        input.instance,
                        name,
                        property,
                    ));
                }
            }
        }
        ev.trace(input, "dependentRequired", valid);
    }
}

fn properties<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    object: &'i Map,
    covered: &mut AHashSet<&'i str>,
) {
    let Some(properties) = &input.keywords.properties else {
        return;
    };
    let path = input.evaluation_path.join("properties");
    let mut valid = true;
    let mut matched = Vec::new();
    for (name, value) in object {
        let Some(child) = properties.get(name) else {
            continue;
        };
        covered.insert(name.as_str());
        let outcome = ev.descend(
            input,
            *child,
            value,
            &input.instance_location.join(name),
            path.join(name),
        );
        valid &= outcome.unit.is_valid();
        output.attach(outcome.unit);
        output.evaluated.properties.insert(name.as_str());
        matched.push(JsonValue::from(name.as_str()));
    }
    output.annotate("properties", JsonValue::Array(matched));
    ev.trace(input, "properties", valid);
}

fn pattern_properties<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    object: &'i Map,
    covered: &mut AHashSet<&'i str>,
) {
    let Some(patterns) = &input.keywords.pattern_properties else {
        return;
    };
    let path = input.evaluation_path.join("patternProperties");
    let mut valid = true;
    let mut matched = Vec::new();
    for (name, value) in object {
        let mut hit = false;
        for (pattern, child) in patterns {
            match super::is_match(pattern, "patternProperties", name, input.instance) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    valid = false;
                    output.fail(error);
                    continue;
                }
            }
            // A name may match several patterns, each one applies
            hit = true;
            let outcome = ev.descend(
                input,
                *child,
                value,
                &input.instance_location.join(name),
                path.join(&pattern.source),
            );
            valid &= outcome.unit.is_valid();
            output.attach(outcome.unit);
        }
        if hit {
            covered.insert(name.as_str());
            output.evaluated.properties.insert(name.as_str());
            matched.push(JsonValue::from(name.as_str()));
        }
    }
    output.annotate("patternProperties", JsonValue::Array(matched));
    ev.trace(input, "patternProperties", valid);
}

fn additional_properties<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    object: &'i Map,
    covered: &AHashSet<&'i str>,
) {
    let Some(child) = input.keywords.additional_properties else {
        return;
    };
    let rest = object
        .iter()
        .filter(|(name, _)| !covered.contains(name.as_str()));
    if ev.is_false(input.target.sibling(child)) {
        let unexpected: Vec<JsonValue> = rest.map(|(name, _)| JsonValue::from(name.as_str())).collect();
        let valid = unexpected.is_empty();
        if !valid {
            output.fail(ValidationError::additional_properties(
                input.instance,
                unexpected,
            ));
        }
        ev.trace(input, "additionalProperties", valid);
        return;
    }
    let path = input.evaluation_path.join("additionalProperties");
    let mut valid = true;
    let mut matched = Vec::new();
    for (name, value) in rest {
        let outcome = ev.descend(
            input,
            child,
            value,
            &input.instance_location.join(name),
            path.clone(),
        );
        valid &= outcome.unit.is_valid();
        output.attach(outcome.unit);
        output.evaluated.properties.insert(name.as_str());
        matched.push(JsonValue::from(name.as_str()));
    }
    output.annotate("additionalProperties", JsonValue::Array(matched));
    ev.trace(input, "additionalProperties", valid);
}

fn property_names(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, '_>,
    output: &mut Output<'_>,
    object: &Map,
) {
    let Some(child) = input.keywords.property_names else {
        return;
    };
    let path = input.evaluation_path.join("propertyNames");
    let mut valid = true;
    for name in object.keys() {
        let name = JsonValue::String(name.clone());
        let outcome = ev.descend(input, child, &name, input.instance_location, path.clone());
        valid &= outcome.unit.is_valid();
        output.attach(outcome.unit);
    }
    ev.trace(input, "propertyNames", valid);
}

fn dependent_schemas<'i>(
    ev: &mut Evaluator<'_, '_>,
    input: &Input<'_, 'i>,
    output: &mut Output<'i>,
    object: &Map,
) {
    let Some(dependencies) = &input.keywords.dependent_schemas else {
        return;
    };
    let path = input.evaluation_path.join("dependentSchemas");
    let mut valid = true;
    for (property, child) in dependencies {
        if !object.contains_key(property) {
            continue;
        }
        let outcome = ev.in_place(input, *child, path.join(property));
        valid &= outcome.unit.is_valid();
        output.apply(outcome);
    }
    ev.trace(input, "dependentSchemas", valid);
}
