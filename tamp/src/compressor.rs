//! The compressor state machine (spec §4.3).

use crate::bitbuf::BitSink;
use crate::conf::Conf;
use crate::dictionary;
use crate::huffman;
use crate::ring::InputRing;
use crate::Error;

#[derive(Debug, Clone, Copy)]
struct LazyMatch {
    index: usize,
    size: u8,
}

/// A streaming LZSS + static-Huffman compressor.
///
/// Owns no memory beyond a few dozen bytes of bookkeeping state; the
/// window is a caller-supplied, lifetime-bound slice (spec §3: "neither
/// takes ownership of the window buffer").
pub struct Compressor<'a> {
    window: &'a mut [u8],
    window_pos: usize,
    conf: Conf,
    min_pattern_size: u8,
    input: InputRing,
    bits: BitSink,
    lazy_matching: bool,
    lazy_cache: Option<LazyMatch>,
}

impl<'a> Compressor<'a> {
    /// Initializes a compressor over `window`, which must be exactly
    /// `conf.window_size()` bytes. Unless `conf.use_custom_dictionary()`,
    /// fills `window` with the deterministic dictionary (spec §4.2) and
    /// queues the header byte for the first `poll`/`compress`/`flush`
    /// call to emit.
    ///
    /// `lazy_matching` enables the encoder-only, bit-stream-visible
    /// speculative matching of spec §4.3.3; it is not part of `Conf`
    /// because it has no representation on the wire.
    pub fn new(conf: Conf, window: &'a mut [u8], lazy_matching: bool) -> Result<Self, Error> {
        if window.len() != conf.window_size() {
            return Err(Error::InvalidConf);
        }
        if !conf.use_custom_dictionary() {
            dictionary::initialize_dictionary(window);
        }
        let min_pattern_size = conf.min_pattern_size();
        let mut bits = BitSink::new();
        bits.push(crate::conf::write_header(&conf) as u32, 8);
        Ok(Self {
            window,
            window_pos: 0,
            conf,
            min_pattern_size,
            input: InputRing::new(),
            bits,
            lazy_matching,
            lazy_cache: None,
        })
    }

    /// The configuration this instance was built with.
    pub fn conf(&self) -> Conf {
        self.conf
    }

    /// Whether the internal 16-byte input ring is full; when true,
    /// `sink` cannot accept more bytes until a `poll` drains it.
    pub fn is_full(&self) -> bool {
        self.input.is_full()
    }

    /// Appends up to `16 - pending` bytes of `input` to the internal
    /// ring, returning how many were consumed.
    pub fn sink(&mut self, input: &[u8]) -> usize {
        self.input.push_slice(input)
    }

    fn append_to_window(&mut self, byte: u8) {
        self.window[self.window_pos] = byte;
        self.window_pos += 1;
        if self.window_pos == self.window.len() {
            self.window_pos = 0;
        }
    }

    /// The byte the decoder will actually read for the `len`-th position
    /// of a candidate match starting at window index `idx`, accounting
    /// for the decoder's self-overlapping copy (spec §4.4.1
    /// "source-overlap rule"): once a match's read cursor reaches
    /// `window_pos`, it starts reading bytes that very copy has already
    /// written, repeating with period `window_pos - idx`. Matching
    /// against the raw, not-yet-overwritten window content instead would
    /// let the encoder accept a match the decoder can't reproduce.
    fn match_source_byte(&self, idx: usize, len: usize) -> u8 {
        let w = self.window.len();
        let period = if idx == self.window_pos {
            w
        } else {
            (self.window_pos + w - idx) % w
        };
        self.window[(idx + (len % period)) % w]
    }

    /// Longest match between the window and the ring content starting
    /// `start` bytes into the ring, or `None` if nothing reaches
    /// `min_pattern_size`. Ties break toward the smallest window index
    /// (spec §4.3.2).
    fn find_match(&self, start: usize) -> Option<(usize, u8)> {
        let avail = self.input.len().saturating_sub(start);
        if avail == 0 {
            return None;
        }
        let max_len = avail.min(self.min_pattern_size as usize + 13);
        if max_len < self.min_pattern_size as usize {
            return None;
        }
        let w = self.window.len();
        let mut best: Option<(usize, u8)> = None;
        let mut best_len = (self.min_pattern_size as usize) - 1;

        for idx in 0..=(w - self.min_pattern_size as usize) {
            let mut len = 0;
            while len < max_len && idx + len < w && self.match_source_byte(idx, len) == self.input.peek(start + len) {
                len += 1;
            }
            if len > best_len {
                best_len = len;
                best = Some((idx, len as u8));
                if best_len == max_len {
                    break;
                }
            }
        }
        best
    }

    /// Decides this poll's match, applying the lazy-matching rule of
    /// spec §4.3.3. Returns `(window_index, match_size)` with
    /// `match_size < min_pattern_size` meaning "no match, emit a
    /// literal".
    fn decide_match(&mut self) -> (usize, u8) {
        if let Some(cached) = self.lazy_cache.take() {
            return (cached.index, cached.size);
        }
        let Some((idx0, size0)) = self.find_match(0) else {
            return (0, 0);
        };
        if self.lazy_matching
            && size0 >= self.min_pattern_size
            && size0 <= 8
            && self.input.len() >= size0 as usize + 2
        {
            if let Some((idx1, size1)) = self.find_match(1) {
                if size1 > size0 {
                    let covers_window_pos =
                        self.window_pos >= idx1 && self.window_pos < idx1 + size1 as usize;
                    if !covers_window_pos {
                        self.lazy_cache = Some(LazyMatch { index: idx1, size: size1 });
                        return (0, 0);
                    }
                }
            }
        }
        (idx0, size0)
    }

    /// Emits at most one literal or one pattern token from the input
    /// ring, then flushes whole bytes out (spec §4.3.4).
    pub fn poll(&mut self, output: &mut [u8]) -> (usize, Result<(), Error>) {
        let mut written = self.bits.partial_flush(output);
        if self.bits.len() >= 8 {
            return (written, Err(Error::OutputFull));
        }
        if self.input.is_empty() {
            return (written, Ok(()));
        }

        let (match_index, match_size) = self.decide_match();

        if match_size < self.min_pattern_size {
            let byte = self.input.peek(0);
            if byte as u32 >= (1u32 << self.conf.literal()) {
                return (written, Err(Error::ExcessBits));
            }
            self.bits.push(1, 1);
            self.bits.push(byte as u32, self.conf.literal());
            self.append_to_window(byte);
            self.input.pop();
        } else {
            let code_index = match_size - self.min_pattern_size;
            let (code, bits) = huffman::encode_length(code_index);
            self.bits.push(code, bits);
            self.bits.push(match_index as u32, self.conf.window());
            for _ in 0..match_size {
                let byte = self.input.peek(0);
                self.append_to_window(byte);
                self.input.pop();
            }
        }

        written += self.bits.partial_flush(&mut output[written..]);
        (written, Ok(()))
    }

    /// Alternates `sink` and `poll` until either `input` or `output` is
    /// exhausted (spec §4.3).
    ///
    /// Only polls as much as is needed to keep making room to sink the
    /// rest of `input`; it does not drain the ring once `input` runs
    /// out; some of the most recent bytes may still be sitting unpolled
    /// in the ring afterward. Call `flush` to force them out.
    pub fn compress(&mut self, input: &[u8], output: &mut [u8]) -> (usize, usize, Result<(), Error>) {
        let mut consumed = 0;
        let mut written = 0;
        loop {
            consumed += self.sink(&input[consumed..]);
            if consumed == input.len() || written == output.len() {
                return (consumed, written, Ok(()));
            }
            let (w, res) = self.poll(&mut output[written..]);
            written += w;
            if let Err(e) = res {
                return (consumed, written, Err(e));
            }
        }
    }

    /// Drains the input ring via `poll`, then optionally emits the
    /// FLUSH symbol, then zero-pads and flushes any remaining partial
    /// byte (spec §4.3.5).
    ///
    /// With `write_token = true` the instance remains usable: a later
    /// call can keep appending tokens after the FLUSH. With
    /// `write_token = false` the stream ends cleanly.
    pub fn flush(&mut self, output: &mut [u8], write_token: bool) -> (usize, Result<(), Error>) {
        let mut written = 0;
        loop {
            let (w, res) = self.poll(&mut output[written..]);
            written += w;
            if let Err(e) = res {
                return (written, Err(e));
            }
            if self.input.is_empty() {
                break;
            }
        }

        if write_token && self.bits.len() > 0 {
            if output.len() - written < 2 {
                return (written, Err(Error::OutputFull));
            }
            let (code, bits) = huffman::encode_flush();
            self.bits.push(code, bits);
        }

        written += self.bits.partial_flush(&mut output[written..]);

        if self.bits.len() > 0 {
            if written >= output.len() {
                return (written, Err(Error::OutputFull));
            }
            written += self.bits.pad_and_flush_final(&mut output[written..]);
        }

        (written, Ok(()))
    }

    /// Convenience: `compress` followed by `flush`.
    pub fn compress_and_flush(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        write_token: bool,
    ) -> (usize, usize, Result<(), Error>) {
        let (consumed, written, res) = self.compress(input, output);
        if res.is_err() {
            return (consumed, written, res);
        }
        let (flush_written, res) = self.flush(&mut output[written..], write_token);
        (consumed, written + flush_written, res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_queues_the_header_byte() {
        let conf = Conf::new(10, 8, false).unwrap();
        let mut window = [0u8; 1024];
        let mut compressor = Compressor::new(conf, &mut window, false).unwrap();
        let mut out = [0u8; 1];
        let (written, res) = compressor.flush(&mut out, false);
        assert!(res.is_ok());
        assert!(written >= 1);
        assert_eq!(out[0], crate::conf::write_header(&conf));
    }

    #[test]
    fn excess_bits_rejected_without_corrupting_prior_output() {
        let conf = Conf::new(10, 7, false).unwrap();
        let mut window = [0u8; 1024];
        let mut compressor = Compressor::new(conf, &mut window, false).unwrap();
        let mut out = [0u8; 64];
        let (consumed, written, res) = compressor.compress(&[200u8], &mut out);
        assert_eq!(consumed, 1);
        assert!(res.is_ok());
        // The offending byte is still sitting unpolled in the ring;
        // flush is what actually tries to encode it.
        let (flush_written, flush_res) = compressor.flush(&mut out[written..], false);
        assert_eq!(flush_res, Err(Error::ExcessBits));
        // Nothing beyond the header should have been written.
        assert_eq!(written + flush_written, 1);
    }

    #[test]
    fn empty_input_flushes_to_just_the_header() {
        let conf = Conf::default();
        let mut window = [0u8; 1024];
        let mut compressor = Compressor::new(conf, &mut window, false).unwrap();
        let mut out = [0u8; 8];
        let (written, res) = compressor.flush(&mut out, false);
        assert!(res.is_ok());
        assert_eq!(written, 1);
        assert_eq!(out[0], crate::conf::write_header(&conf));
    }

    #[test]
    fn idempotent_flush_on_empty_buffer() {
        let conf = Conf::default();
        let mut window = [0u8; 1024];
        let mut compressor = Compressor::new(conf, &mut window, false).unwrap();
        let mut out = [0u8; 8];
        let (w1, _) = compressor.flush(&mut out, false);
        assert_eq!(w1, 1);
        let (w2, res2) = compressor.flush(&mut out, false);
        assert!(res2.is_ok());
        assert_eq!(w2, 0);
    }

    /// Regression test for the source-overlap rule (spec §4.4.1,
    /// DESIGN.md). `find_match` must only ever claim a match that the
    /// decompressor's self-overlapping copy loop can actually reproduce;
    /// a long run of one repeated byte is the case most likely to pick a
    /// window index whose match range straddles `window_pos` once the
    /// token being matched is long enough to read past its own start.
    #[test]
    fn self_overlapping_match_round_trips() {
        use crate::decompressor::Decompressor;

        let conf = Conf::new(8, 8, false).unwrap();
        let data = [0x42u8; 2000];
        let mut cwindow = [0u8; 256];
        let mut compressor = Compressor::new(conf, &mut cwindow, false).unwrap();
        let mut compressed = [0u8; 4096];
        let (consumed, written, res) = compressor.compress(&data, &mut compressed);
        assert!(res.is_ok());
        assert_eq!(consumed, data.len());
        let (flush_written, res) = compressor.flush(&mut compressed[written..], false);
        assert!(res.is_ok());
        let total = written + flush_written;

        let mut dwindow = [0u8; 256];
        let mut decompressor = Decompressor::new(&mut dwindow, conf.window()).unwrap();
        let mut out = [0u8; 2000];
        let (_, out_written, res) = decompressor.decompress(&compressed[..total], &mut out);
        assert!(matches!(res, Ok(()) | Err(Error::InputExhausted)), "{res:?}");
        assert_eq!(&out[..out_written], &data[..]);
    }
}
