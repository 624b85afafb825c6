//! `tamp`: a lossless, byte-oriented LZSS + static-Huffman compression
//! codec for memory-constrained, typically `no_std` targets.
//!
//! Both [`Compressor`] and [`Decompressor`] are streaming state machines
//! that borrow their window buffer from the caller instead of owning it,
//! so an embedded caller can place that buffer in whatever memory region
//! (stack, a static, a DMA-visible region) its platform calls for.
//! Neither type allocates.
//!
//! ```
//! use tamp::{Compressor, Conf, Decompressor};
//!
//! let conf = Conf::default();
//! let mut cwindow = [0u8; 1024];
//! let mut compressor = Compressor::new(conf, &mut cwindow, false).unwrap();
//!
//! let input = b"the quick brown fox jumps over the lazy dog";
//! let mut compressed = [0u8; 128];
//! let (_, written, res) = compressor.compress(input, &mut compressed);
//! res.unwrap();
//! let (flush_written, res) = compressor.flush(&mut compressed[written..], false);
//! res.unwrap();
//! let total = written + flush_written;
//!
//! let mut dwindow = [0u8; 1024];
//! let mut decompressor = Decompressor::new(&mut dwindow, conf.window()).unwrap();
//! let mut decompressed = [0u8; 128];
//! let (_, written, res) = decompressor.decompress(&compressed[..total], &mut decompressed);
//! // A one-shot decode of a complete stream may legitimately report
//! // `InputExhausted` instead of `Ok` (see its docs for why).
//! assert!(res.is_ok() || res == Err(tamp::Error::InputExhausted));
//! assert_eq!(&decompressed[..written], input);
//! ```

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bitbuf;
mod conf;
mod dictionary;
mod error;
mod huffman;

#[cfg(feature = "compressor")]
mod compressor;
#[cfg(feature = "compressor")]
mod ring;

#[cfg(feature = "decompressor")]
mod decompressor;

pub use conf::{read_header, write_header, Conf, MAX_LITERAL_BITS, MAX_WINDOW_BITS, MIN_LITERAL_BITS, MIN_WINDOW_BITS};
pub use dictionary::{compute_min_pattern_size, initialize_dictionary};
pub use error::Error;

#[cfg(feature = "compressor")]
pub use compressor::Compressor;

#[cfg(feature = "decompressor")]
pub use decompressor::Decompressor;
