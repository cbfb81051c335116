use std::fmt;

use rustc_hash::FxHashMap;

use super::tree::{Node, NodeData};

/// A single Huffman codeword: the low `len` bits of `bits`, most significant
/// bit first. A leaf at depth d needs a total input weight of at least
/// Fib(d+2), so any input whose length fits in a u64 produces codes of at
/// most 92 bits. 128 bits of storage covers that with room to spare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub bits: u128,
    pub len: u8,
}

impl fmt::Display for Codeword {
    /// Render as a '0'/'1' string for tracing and tests.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            write!(f, "{}", (self.bits >> i) & 1)?;
        }
        Ok(())
    }
}

/// Symbol to codeword map read off the Huffman tree. Prefix-free by
/// construction: distinct leaves lie on distinct root paths and no leaf is an
/// ancestor of another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeTable {
    codes: FxHashMap<u8, Codeword>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the tree depth first, appending 0 when descending left and 1 when
    /// descending right; the accumulated bits at each leaf are its symbol's
    /// codeword.
    pub fn from_tree(root: &Node) -> Self {
        let mut table = CodeTable::new();
        match root.node_data {
            // A single-symbol alphabet leaves the root as a bare leaf. The
            // symbol still needs a non-empty codeword, so it gets the single
            // bit 0.
            NodeData::Leaf(sym) => {
                table.codes.insert(sym, Codeword { bits: 0, len: 1 });
            }
            NodeData::Kids(..) => walk(root, 0, 0, &mut table.codes),
        }
        table
    }

    /// Insert an entry directly. Used when rebuilding a table from a payload
    /// header. Returns the previous codeword if the symbol was already mapped.
    pub fn insert(&mut self, sym: u8, code: Codeword) -> Option<Codeword> {
        self.codes.insert(sym, code)
    }

    pub fn get(&self, sym: u8) -> Option<Codeword> {
        self.codes.get(&sym).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order. Serialization iterates here so the
    /// wire bytes are reproducible.
    pub fn sorted_entries(&self) -> Vec<(u8, Codeword)> {
        let mut entries: Vec<(u8, Codeword)> = self.codes.iter().map(|(&s, &c)| (s, c)).collect();
        entries.sort_unstable_by_key(|&(s, _)| s);
        entries
    }
}

fn walk(node: &Node, bits: u128, len: u8, codes: &mut FxHashMap<u8, Codeword>) {
    match &node.node_data {
        NodeData::Leaf(sym) => {
            codes.insert(*sym, Codeword { bits, len });
        }
        NodeData::Kids(left, right) => {
            walk(left, bits << 1, len + 1, codes);
            walk(right, bits << 1 | 1, len + 1, codes);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::huffman_coding::tree::build_tree;

    fn table_of(data: &[u8]) -> CodeTable {
        let mut freqs = vec![0_u64; 256];
        data.iter().for_each(|&el| freqs[el as usize] += 1);
        CodeTable::from_tree(&build_tree(&freqs).unwrap())
    }

    /// True when one codeword is a prefix of the other.
    fn is_prefix(a: &Codeword, b: &Codeword) -> bool {
        let (short, long) = if a.len <= b.len { (a, b) } else { (b, a) };
        long.bits >> (long.len - short.len) == short.bits
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let table = table_of(b"aaaa");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b'a'), Some(Codeword { bits: 0, len: 1 }));
    }

    #[test]
    fn majority_symbol_gets_one_bit() {
        // 'a' holds over half the total weight, so it must sit at depth 1.
        let table = table_of(b"aaaaaaaaaabcd");
        assert_eq!(table.get(b'a').unwrap().len, 1);
    }

    #[test]
    fn codes_are_prefix_free() {
        let table = table_of(b"Oh freddled gruntbuggly, thy micturations are to me");
        let entries = table.sorted_entries();
        for (i, (_, a)) in entries.iter().enumerate() {
            assert!(a.len > 0);
            for (_, b) in entries.iter().skip(i + 1) {
                assert!(!is_prefix(a, b), "{} is a prefix of {}", a, b);
            }
        }
    }

    #[test]
    fn fifo_ties_give_expected_codes() {
        // Matches the tree shape checked in the tree tests: a=00 b=01 c=10 d=11.
        let table = table_of(b"abcd");
        assert_eq!(table.get(b'a').unwrap().to_string(), "00");
        assert_eq!(table.get(b'b').unwrap().to_string(), "01");
        assert_eq!(table.get(b'c').unwrap().to_string(), "10");
        assert_eq!(table.get(b'd').unwrap().to_string(), "11");
    }

    #[test]
    fn display_renders_leading_zeros() {
        let code = Codeword { bits: 0b0010, len: 4 };
        assert_eq!(code.to_string(), "0010");
    }
}
