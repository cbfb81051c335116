//! Huffzip: a byte-oriented Huffman entropy coder.
//!
//! Given a byte buffer, huffzip derives symbol frequencies, builds an optimal
//! prefix-free binary code (a Huffman tree), and recodes the buffer into a
//! compact packed bitstream; the inverse operation reconstructs the original
//! bytes exactly. The payload is self-describing: it carries the code table,
//! the declared symbol count, the exact padding, and a CRC32 of the original
//! data.
//!
//! Basic usage to compress a file:
//!
//! `$> huffzip -z test.txt`
//!
//! This will compress the file and create the file test.txt.hfz.
//! The original file will be deleted unless --keep is given.
//!
pub mod bitstream;
pub mod compression;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::compress_buffer;
pub use compression::decompress::decompress_buffer;
pub use compression::payload::{CompressedPayload, PayloadError};
