/// Error type shared across the codec and reassembler.
pub mod error;
