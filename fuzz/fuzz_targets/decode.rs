#![no_main]
use libfuzzer_sys::fuzz_target;
use tamp::Decompressor;

const MAX_WINDOW: usize = 1 << tamp::MAX_WINDOW_BITS;

// Feeds arbitrary, possibly-adversarial bytes straight into a freshly
// initialized decompressor. The only property under test is "never
// panics, never writes outside `output`, and rejects bad offsets with
// `Oob` instead of reading outside `window`" (spec "Bounds safety").
fuzz_target!(|data: &[u8]| {
    let mut window = [0u8; MAX_WINDOW];
    let mut decompressor = Decompressor::new(&mut window, tamp::MAX_WINDOW_BITS).unwrap();
    let mut output = [0u8; 4096];
    let mut pos = 0;
    loop {
        let (consumed, _written, res) = decompressor.decompress(&data[pos..], &mut output);
        pos += consumed;
        match res {
            Ok(()) => {
                if pos == data.len() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
});
