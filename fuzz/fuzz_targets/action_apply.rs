#![no_main]

use libfuzzer_sys::fuzz_target;
use protocol::{parse_request, Limits, Request};
use raster::RasterBuffer;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(Request::Mutate(mutation)) = parse_request(text, &Limits::for_testing()) else {
        return;
    };
    let mut canvas = RasterBuffer::blank(64, 48);
    mutation.apply(&mut canvas);
});
