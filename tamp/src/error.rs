//! Error kinds shared by the compressor and decompressor.

use thiserror::Error;

/// Everything that can go wrong in the core, recoverable and fatal alike.
///
/// `OutputFull` and `InputExhausted` are expected control-flow returns in
/// streaming usage: the instance is left in a well-defined, still-usable
/// state and the caller should supply more output space / more input and
/// call again. `InvalidConf`, `ExcessBits` and `Oob` are fatal: the
/// instance must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Header reserved bits were set, a parameter was out of range, or
    /// `window` exceeded the decompressor's `window_bits_max`.
    #[error("invalid configuration")]
    InvalidConf,
    /// A literal byte had bits set above position `literal - 1`.
    #[error("literal value does not fit in the configured literal width")]
    ExcessBits,
    /// Not enough bits were buffered to decode a complete token; no partial
    /// decode was committed.
    #[error("not enough input to make progress")]
    InputExhausted,
    /// Not enough room in the output buffer to emit at least one token.
    #[error("not enough output space to make progress")]
    OutputFull,
    /// A decoded back-reference's `offset + match_size` exceeded the
    /// window size. The stream is corrupt or adversarial.
    #[error("back-reference out of window bounds")]
    Oob,
}
