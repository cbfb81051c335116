//! The huffman_coding module builds the prefix-free code at the heart of
//! huffzip. Decoding the huffman data happens in the decompress function.
//!
//! Construction is the classical greedy merge: every distinct input byte
//! starts as a leaf weighted by its frequency count, and the two lightest
//! nodes are repeatedly merged until a single root remains. That tree has
//! minimum weighted external path length, so the codes read off its edges are
//! an optimal prefix code for the input.
//!
//! Ties between equal weights are broken by insertion order (FIFO).
//! Re-sorting an array on every merge would leave tie resolution to sort
//! stability; here the rule is part of the heap key, so identical input
//! always produces an identical tree, an identical code table, and an
//! identical bitstream.
//!
pub mod code_table;
pub mod tree;

pub use code_table::{CodeTable, Codeword};
pub use tree::{build_tree, Node, NodeData};
