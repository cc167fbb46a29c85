//! Fuzz target: evok JSON-RPC reply decoding
//!
//! Feeds arbitrary bytes through `parse_response` and, when a result comes
//! out, through every typed decoder.  None of them may panic; a malformed
//! reply must surface as an error.
//!
//! cargo fuzz run fuzz_rpc_response

#![no_main]

use kegwash::adapters::evok::{decode_input, decode_relay, decode_sensor, parse_response};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(result) = parse_response("sensor_get", data) {
        let _ = decode_relay(&result);
        let _ = decode_input(&result);
        if let Ok(reading) = decode_sensor(&result) {
            // A decoded sensor reply always came from a 4+ element array.
            assert!(result.as_array().is_some_and(|a| a.len() >= 4));
            let _ = reading.lost;
        }
    }
});
