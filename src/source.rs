//! Byte source abstraction.
//!
//! The tokenizer's only dependency on its environment is a blocking
//! `read(buf) -> bytes_written` operation that returns zero at end of input.
//! That is exactly `std::io::Read`, so it is reused directly rather than
//! inventing a parallel trait, reserving custom traits for genuinely new
//! behavior.
pub use std::io::Read as ByteSource;
