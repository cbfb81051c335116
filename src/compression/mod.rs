//! The compression module manages both directions of the huffzip transform.
//!
//! Compression:
//! - Frequency count: one pass over the input bytes.
//! - Huffman tree: greedy merge of the two lightest nodes, FIFO tie-breaking.
//! - Code table: depth-first walk of the tree.
//! - Bit packing: codewords concatenated in input order, packed 8 per byte.
//!
//! Decompression is the inverse. It validates the transmitted code table,
//! walks the packed bits through a decode trie, stops exactly at the declared
//! symbol count, and checks the result against the stored CRC32.
//!
pub mod compress;
pub mod decompress;
pub mod payload;
