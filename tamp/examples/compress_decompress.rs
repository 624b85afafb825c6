use tamp::{Compressor, Conf, Decompressor};

fn main() {
    let conf = Conf::default();
    let mut cwindow = [0u8; 1024];
    let mut compressor = Compressor::new(conf, &mut cwindow, false).unwrap();
    let mut compressed = [0u8; 512];

    let input = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed volutpat odio eget dolor aliquam, eu consequat magna viverra. Proin at pretium nulla, sed sagittis lorem. Suspendisse potenti. Fusce tempor ex non mauris scelerisque, vestibulum porta metus pretium. Nunc pharetra dapibus elit, sed blandit nisl sodales ut. Cras est massa, porttitor in mattis et, convallis vitae orci. Donec ac blandit justo. Donec porttitor dui nec congue condimentum. Vivamus aliquet est diam, sed bibendum turpis commodo nec. Nulla ut euismod dui. Vestibulum feugiat risus dui, in lacinia nulla euismod id. Duis sed maximus quam, in malesuada nulla. Praesent malesuada elementum erat eleifend ornare. Nulla eget facilisis lacus.";
    let (_consumed, written, res) = compressor.compress(input, &mut compressed);
    res.unwrap();
    let (flush_written, res) = compressor.flush(&mut compressed[written..], false);
    res.unwrap();
    let total = written + flush_written;

    let mut dwindow = [0u8; 1024];
    let mut decompressor = Decompressor::new(&mut dwindow, conf.window()).unwrap();
    let mut decompressed = [0u8; 512];
    let (_, written, res) = decompressor.decompress(&compressed[..total], &mut decompressed);
    // A one-shot decode of a complete stream may legitimately report
    // `InputExhausted` instead of `Ok` — trailing zero-padding bits are
    // indistinguishable from a truncated token without an in-band
    // end-of-stream marker (spec §6.2).
    assert!(matches!(res, Ok(()) | Err(tamp::Error::InputExhausted)));

    assert_eq!(&decompressed[..written], input);

    println!("original size: {}", input.len());
    println!("compressed size: {}", total);
}
