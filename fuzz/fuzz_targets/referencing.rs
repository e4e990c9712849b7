#![no_main]
use libfuzzer_sys::fuzz_target;

const BASE: &str = "http://example.com/root.json";

fuzz_target!(|data: (&[u8], &str)| {
    let (schema, reference) = data;
    if let Ok(base) = referencing::uri::from_str(BASE) {
        let _ = referencing::uri::resolve_against(&base, reference);
    }
    if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(schema) {
        let registry = jsonschema::Registry::new();
        if let Ok(compiled) = registry.compile(&schema, Some(BASE)) {
            let _ = registry.resolve(&compiled, reference);
            let _ = registry.unresolved_references(&compiled);
        }
    }
});
