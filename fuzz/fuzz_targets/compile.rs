#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(compiled) = jsonschema::schema_for(&schema) {
            let _ = compiled.to_value();
        }
    }
});
