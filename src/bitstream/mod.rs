//! The bitstream module forms the bit-level I/O subsystem for huffzip.
//!
//! Huffman codewords are variable-length bit sequences, so neither the encoder
//! output nor the wire format is byte aligned. The BitPacker packs an arbitrary
//! bit sequence into bytes, remembering how many bits of the final byte are
//! real data. The BitReader walks a byte slice bit by bit under an explicit bit
//! limit, so the decoder can never wander into the zero padding at the end of
//! a stream.
//!
//! This subsystem is designed to interface with the other modules within
//! huffzip. It has not been generalized for wider use.
//!
pub mod bitpacker;
pub mod bitreader;

pub use bitpacker::BitPacker;
pub use bitreader::BitReader;
