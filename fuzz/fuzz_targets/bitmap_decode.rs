#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = bitmap::Limits::for_testing();
    if let Ok(buffer) = bitmap::decode_bitmap(data, &limits) {
        // once quantized, encoding is a fixed point
        let once = bitmap::encode_bitmap(&buffer.snapshot());
        let decoded = bitmap::decode_bitmap(&once, &bitmap::Limits::unlimited())
            .expect("re-encoded bitmap must decode");
        assert_eq!(bitmap::encode_bitmap(&decoded.snapshot()), once);
    }
    let _ = bitmap::decode_png(data, &limits);
});
