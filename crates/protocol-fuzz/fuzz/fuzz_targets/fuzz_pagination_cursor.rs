#![no_main]

use libfuzzer_sys::fuzz_target;
use protocol_fuzz::pagination;

fuzz_target!(|data: &[u8]| {
    let Ok(cursor) = std::str::from_utf8(data) else { return };
    // Malformed cursors must come back as a rejection, never a panic.
    let _ = pagination::parse_cursor(cursor);
});
