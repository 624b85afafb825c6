//! The decompressor state machine (spec §4.4).

use crate::bitbuf::BitSource;
use crate::conf;
use crate::conf::Conf;
use crate::dictionary;
use crate::huffman;
use crate::Error;

/// A streaming LZSS + static-Huffman decompressor.
///
/// The window buffer is sized to `2^window_bits_max` bytes — the
/// instance's physical capacity — while the *active* window used by any
/// one stream is its leading `2^conf.window()` bytes, so a single
/// caller-owned buffer can serve streams whose header picks a smaller
/// window than the capacity the caller provisioned for (spec §3, §4.1).
pub struct Decompressor<'a> {
    window: &'a mut [u8],
    window_bits_max: u8,
    conf: Option<Conf>,
    min_pattern_size: u8,
    window_pos: usize,
    bits: BitSource,
    /// Bytes already committed to `window` by the most recent token but
    /// not yet copied out to a caller's output buffer. Re-derived from
    /// `window` itself rather than cached elsewhere, so resuming after
    /// an `OutputFull` needs no state beyond this one counter (spec §9).
    pending: u8,
}

impl<'a> Decompressor<'a> {
    /// Initializes a decompressor whose window buffer is `window`, which
    /// must be exactly `2^window_bits_max` bytes. The stream's own
    /// configuration — including its actual window size — is read from
    /// its header by the first `decompress` call, unless `configure` is
    /// called first to supply it out of band.
    pub fn new(window: &'a mut [u8], window_bits_max: u8) -> Result<Self, Error> {
        if !(conf::MIN_WINDOW_BITS..=conf::MAX_WINDOW_BITS).contains(&window_bits_max) {
            return Err(Error::InvalidConf);
        }
        if window.len() != (1usize << window_bits_max) {
            return Err(Error::InvalidConf);
        }
        Ok(Self {
            window,
            window_bits_max,
            conf: None,
            min_pattern_size: 0,
            window_pos: 0,
            bits: BitSource::new(),
            pending: 0,
        })
    }

    /// The stream configuration, once known (after the header byte has
    /// been read, or after `configure`).
    pub fn conf(&self) -> Option<Conf> {
        self.conf
    }

    /// Supplies the stream configuration directly, skipping the header
    /// byte that `decompress` would otherwise expect as the first byte
    /// of input. Used when the header was already read out of band.
    ///
    /// Must be called before any input has been decoded.
    pub fn configure(&mut self, conf: Conf) -> Result<(), Error> {
        if self.conf.is_some() || self.pending != 0 || self.bits.len() != 0 {
            return Err(Error::InvalidConf);
        }
        if conf.window() > self.window_bits_max {
            return Err(Error::InvalidConf);
        }
        self.apply_conf(conf);
        Ok(())
    }

    fn apply_conf(&mut self, conf: Conf) {
        if !conf.use_custom_dictionary() {
            dictionary::initialize_dictionary(&mut self.window[..conf.window_size()]);
        }
        self.min_pattern_size = conf.min_pattern_size();
        self.window_pos = 0;
        self.conf = Some(conf);
    }

    fn append_to_window(&mut self, byte: u8, window_size: usize) {
        self.window[self.window_pos] = byte;
        self.window_pos += 1;
        if self.window_pos == window_size {
            self.window_pos = 0;
        }
    }

    /// Decompresses as much of `input` into `output` as it can in one
    /// call, returning `(input consumed, output written, status)`.
    ///
    /// `Ok(())` means every available input byte was consumed (more
    /// input is needed to continue) or `output` filled up after some
    /// progress was made. `Err(InputExhausted)` / `Err(OutputFull)` mean
    /// *no* progress at all was possible this call — the instance is
    /// unchanged and the caller must supply more of the missing
    /// resource before calling again. `Err(InvalidConf)` and
    /// `Err(Oob)` are fatal; the instance must be discarded.
    pub fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> (usize, usize, Result<(), Error>) {
        let mut consumed = 0usize;
        let mut written = 0usize;

        loop {
            while self.pending > 0 {
                if written == output.len() {
                    let status = if written == 0 { Err(Error::OutputFull) } else { Ok(()) };
                    return (consumed, written, status);
                }
                let window_size = self.conf.unwrap().window_size();
                let src = (self.window_pos + window_size - self.pending as usize) % window_size;
                output[written] = self.window[src];
                written += 1;
                self.pending -= 1;
            }

            consumed += self.bits.refill(&input[consumed..]);

            if self.conf.is_none() {
                if self.bits.len() < 8 {
                    return (consumed, written, Ok(()));
                }
                let byte = self.bits.peek(8) as u8;
                let parsed = match conf::parse_header_byte(byte) {
                    Ok(c) => c,
                    Err(e) => return (consumed, written, Err(e)),
                };
                if parsed.window() > self.window_bits_max {
                    return (consumed, written, Err(Error::InvalidConf));
                }
                self.bits.consume(8);
                self.apply_conf(parsed);
                continue;
            }

            let conf = self.conf.unwrap();

            if self.bits.len() == 0 {
                return (consumed, written, Ok(()));
            }

            let tag = self.bits.peek(1);
            if tag == 1 {
                let needed = 1 + conf.literal();
                if self.bits.len() < needed {
                    return (consumed, written, Err(Error::InputExhausted));
                }
                let value = self.bits.peek(needed);
                let literal = (value & ((1u32 << conf.literal()) - 1)) as u8;
                self.bits.consume(needed);
                self.append_to_window(literal, conf.window_size());
                self.pending = 1;
                continue;
            }

            let available = self.bits.len().min(9);
            let peek9 = (self.bits.peek(available) << (9 - available)) as u16;
            match huffman::decode_length_code(peek9, available) {
                None => {
                    return (consumed, written, Err(Error::InputExhausted));
                }
                Some((huffman::Symbol::Flush, code_bits)) => {
                    self.bits.consume(code_bits);
                    self.bits.align_to_byte();
                    continue;
                }
                Some((huffman::Symbol::Length(index), code_bits)) => {
                    let needed = code_bits + conf.window();
                    if self.bits.len() < needed {
                        return (consumed, written, Err(Error::InputExhausted));
                    }
                    let value = self.bits.peek(needed);
                    let offset = (value & ((1u32 << conf.window()) - 1)) as usize;
                    let match_size = (index + self.min_pattern_size) as usize;
                    let window_size = conf.window_size();
                    if offset + match_size > window_size {
                        return (consumed, written, Err(Error::Oob));
                    }
                    self.bits.consume(needed);
                    for i in 0..match_size {
                        let byte = self.window[(offset + i) % window_size];
                        self.append_to_window(byte, window_size);
                    }
                    self.pending = match_size as u8;
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::Compressor;

    const MAX_WINDOW: usize = 1 << conf::MAX_WINDOW_BITS;

    /// Compresses `data` under `conf` into `compressed`, returning the
    /// byte count. Scratch buffers are fixed-size stack arrays sized to
    /// the largest supported window, sliced down to `conf.window_size()`
    /// — no heap allocation, matching the library's own constraints.
    fn compress_all(data: &[u8], conf: Conf, compressed: &mut [u8]) -> usize {
        let mut storage = [0u8; MAX_WINDOW];
        let window = &mut storage[..conf.window_size()];
        let mut compressor = Compressor::new(conf, window, false).unwrap();
        let (consumed, written, res) = compressor.compress(data, compressed);
        assert!(res.is_ok());
        assert_eq!(consumed, data.len());
        let (flush_written, res) = compressor.flush(&mut compressed[written..], false);
        assert!(res.is_ok());
        written + flush_written
    }

    fn roundtrip(data: &[u8], conf: Conf) -> ([u8; 8192], usize) {
        let mut compressed = [0u8; 8192];
        let total = compress_all(data, conf, &mut compressed);

        let mut dstorage = [0u8; MAX_WINDOW];
        let dwindow = &mut dstorage[..conf.window_size()];
        let mut decompressor = Decompressor::new(dwindow, conf.window()).unwrap();
        let mut out = [0u8; 8192];
        let (consumed, written, res) = decompressor.decompress(&compressed[..total], &mut out);
        // Trailing zero-padding bits are indistinguishable from the
        // start of a truncated token (spec §6.2: no in-band
        // end-of-stream marker), so a one-shot decode of a complete
        // stream may legitimately report `InputExhausted` even though
        // every real token has already been decoded.
        assert!(matches!(res, Ok(()) | Err(Error::InputExhausted)), "{res:?}");
        assert_eq!(consumed, total);
        (out, written)
    }

    #[test]
    fn small_text_round_trips() {
        let conf = Conf::default();
        let data = b"the quick brown fox jumps over the lazy dog the quick brown fox";
        let (out, len) = roundtrip(data, conf);
        assert_eq!(&out[..len], data);
    }

    #[test]
    fn repeated_byte_round_trips() {
        let conf = Conf::new(10, 8, false).unwrap();
        let data = [0xFFu8; 4096];
        let (out, len) = roundtrip(&data, conf);
        assert_eq!(&out[..len], &data[..]);
    }

    #[test]
    fn empty_input_round_trips() {
        let conf = Conf::default();
        let (out, len) = roundtrip(b"", conf);
        assert_eq!(&out[..len], b"");
    }

    #[test]
    fn rejects_window_larger_than_capacity() {
        let mut window = [0u8; 256];
        let mut decompressor = Decompressor::new(&mut window, 8).unwrap();
        let conf = Conf::new(12, 8, false).unwrap();
        let header = conf::write_header(&conf);
        let mut out = [0u8; 16];
        let (_, _, res) = decompressor.decompress(&[header], &mut out);
        assert_eq!(res, Err(Error::InvalidConf));
    }

    #[test]
    fn adversarial_offset_triggers_oob() {
        // window=8 (256 bytes), handcraft a back-reference whose offset
        // plus match length runs past the window.
        let conf = Conf::new(8, 8, false).unwrap();
        let header = conf::write_header(&conf);
        let mut bits = crate::bitbuf::BitSink::new();
        bits.push(header as u32, 8);
        // Length code index 13 (longest, 7 bits) plus a window offset of
        // 255 deliberately pushes offset+match_size past 256.
        let (code, code_bits) = huffman::encode_length(13);
        bits.push(code, code_bits);
        bits.push(255, 8);
        let mut out_bytes = [0u8; 8];
        let written = bits.partial_flush(&mut out_bytes);
        let tail = bits.pad_and_flush_final(&mut out_bytes[written..]);
        let total = written + tail;

        let mut window = [0u8; 256];
        let mut decompressor = Decompressor::new(&mut window, 8).unwrap();
        let mut out = [0u8; 64];
        let (_, _, res) = decompressor.decompress(&out_bytes[..total], &mut out);
        assert_eq!(res, Err(Error::Oob));
    }

    #[test]
    fn single_byte_chunks_still_round_trip() {
        let conf = Conf::default();
        let data = b"mississippi mississippi mississippi";
        let mut compressed = [0u8; 4096];
        let total = compress_all(data, conf, &mut compressed);

        let mut dstorage = [0u8; MAX_WINDOW];
        let dwindow = &mut dstorage[..conf.window_size()];
        let mut decompressor = Decompressor::new(dwindow, conf.window()).unwrap();
        let mut result = [0u8; 256];
        let mut result_len = 0;
        let mut pos = 0;
        while pos < total {
            let mut out = [0u8; 1];
            let (consumed, written, res) = decompressor.decompress(&compressed[pos..pos + 1], &mut out);
            assert!(matches!(res, Ok(()) | Err(Error::InputExhausted)));
            pos += consumed;
            result[result_len..result_len + written].copy_from_slice(&out[..written]);
            result_len += written;
        }
        assert_eq!(&result[..result_len], data);
    }
}
