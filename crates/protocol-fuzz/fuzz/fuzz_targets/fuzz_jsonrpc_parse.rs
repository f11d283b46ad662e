#![no_main]

use libfuzzer_sys::fuzz_target;
use protocol_fuzz::jsonrpc::JsonRpcRequest;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the deserializer, only return Ok or Err.
    let _ = serde_json::from_slice::<JsonRpcRequest>(data);
});
