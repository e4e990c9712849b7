#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&[u8], &[u8])| {
    let (schema, instance) = data;
    if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(schema) {
        if let Ok(instance) = serde_json::from_slice::<serde_json::Value>(instance) {
            if let Ok(compiled) = jsonschema::schema_for(&schema) {
                let evaluation = compiled.evaluate(&instance);
                let _ = evaluation.list();
                let _ = evaluation.hierarchical();
            }
        }
    }
});
