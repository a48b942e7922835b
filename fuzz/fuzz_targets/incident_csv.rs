#![no_main]

use libfuzzer_sys::fuzz_target;
use slabreach::ingest::read_incidents;

fuzz_target!(|data: &[u8]| {
    let _ = read_incidents(data);
});
