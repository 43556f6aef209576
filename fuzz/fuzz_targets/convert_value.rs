#![no_main]

use csvload_types::{ConverterRegistry, Culture, TargetType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Every converter must be total over arbitrary text
    if let Ok(text) = std::str::from_utf8(data) {
        let registry = ConverterRegistry::default();
        let cultures = [Culture::invariant(), Culture::de_de(), Culture::fr_fr()];
        for culture in &cultures {
            for target in [
                TargetType::Text,
                TargetType::Bit,
                TargetType::Int,
                TargetType::BigInt,
                TargetType::Float,
                TargetType::Decimal,
                TargetType::Money,
                TargetType::DateTime,
                TargetType::Guid,
                TargetType::Vector,
            ] {
                let _ = registry.convert(target, text, culture);
            }
        }
    }
});
