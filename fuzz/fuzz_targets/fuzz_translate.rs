#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the one-shot translator in both dialects; it must never panic.
    let _ = y2x86::translate_with(data, y2x86::Dialect::Legacy);
    let _ = y2x86::translate_with(data, y2x86::Dialect::Canonical);

    // Fuzz the builder with listing and a high base address.
    let mut t = y2x86::Translator::new();
    t.base_address(0xFFFF_FF00).enable_listing();
    if let Ok(result) = t.translate(data) {
        let _ = result.listing();
        for (source, _) in result.address_map().iter() {
            let _ = result.output_address(source);
        }
    }
});
