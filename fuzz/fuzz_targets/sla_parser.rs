#![no_main]

use libfuzzer_sys::fuzz_target;
use slabreach::sla::SlaDuration;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must never panic, and a successful parse must survive Display
        if let Ok(sla) = input.parse::<SlaDuration>() {
            assert_eq!(sla.to_string().parse::<SlaDuration>(), Ok(sla));
        }
    }
});
