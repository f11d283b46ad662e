#![no_main]

use libfuzzer_sys::fuzz_target;
use protocol_fuzz::pkce;

/// Splits the fuzzer's byte string into a verifier and a challenge on the
/// first `|`, always exercising S256 since "plain" is rejected outright.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let Some((verifier, challenge)) = text.split_once('|') else { return };
    let _ = pkce::verify_code_challenge(verifier, challenge, "S256");
});
