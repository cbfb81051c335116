//! The decompress module restores the original bytes from a
//! CompressedPayload.
//!
//! The transmitted code table is untrusted, so it is first compiled into a
//! decode trie, which proves prefix-freedom as a side effect: a codeword that
//! routes through an existing leaf, or terminates on an interior node, cannot
//! coexist with the rest of the table. Decoding then walks the trie bit by
//! bit, emitting a symbol and resetting to the root at each leaf, until the
//! declared symbol count is reached. The bit reader is fenced at the declared
//! bit length, so flush padding is never examined, let alone decoded.
//!

use std::fs;
use std::io::{self, Error, Write};

use log::{error, info, trace};

use crate::bitstream::BitReader;
use crate::huffman_coding::CodeTable;
use crate::tools::cli::HzOpts;

use super::compress::EXTENSION;
use super::payload::{CompressedPayload, PayloadError};

/// One node of the decode trie. Interior nodes have sym == None.
#[derive(Debug, Default)]
struct TrieNode {
    sym: Option<u8>,
    kids: [Option<Box<TrieNode>>; 2],
}

/// Compile the code table into a decode trie, validating prefix-freedom.
fn build_decode_trie(table: &CodeTable) -> Result<TrieNode, PayloadError> {
    let mut root = TrieNode::default();
    for (sym, code) in table.sorted_entries() {
        let mut node = &mut root;
        for i in (0..code.len).rev() {
            if node.sym.is_some() {
                // Some earlier codeword is a proper prefix of this one.
                return Err(PayloadError::InvalidCodeTable("codewords are not prefix-free"));
            }
            let bit = ((code.bits >> i) & 1) as usize;
            node = node.kids[bit].get_or_insert_with(Box::default).as_mut();
        }
        if node.sym.is_some() || node.kids.iter().any(|k| k.is_some()) {
            // Either a duplicate codeword, or this one is a prefix of an
            // earlier, longer one.
            return Err(PayloadError::InvalidCodeTable("codewords are not prefix-free"));
        }
        node.sym = Some(sym);
    }
    Ok(root)
}

/// Decode a CompressedPayload back into the original bytes. All failure modes
/// are typed; nothing is silently masked or retried.
pub fn decompress_buffer(payload: &CompressedPayload) -> Result<Vec<u8>, PayloadError> {
    if payload.symbol_count == 0 {
        if payload.bit_length != 0 {
            return Err(PayloadError::CorruptPayload("data bits without symbols"));
        }
        return verify_crc(Vec::new(), payload.crc);
    }
    if payload.code_table.is_empty() {
        return Err(PayloadError::InvalidCodeTable("symbols without codewords"));
    }
    // Fewer bits on hand than declared means the tail of the stream is gone.
    if payload.bit_length > payload.data.len() as u64 * 8 {
        return Err(PayloadError::TruncatedPayload);
    }
    // Every codeword is at least one bit, so this payload cannot possibly
    // deliver the declared symbol count.
    if payload.symbol_count > payload.bit_length {
        return Err(PayloadError::TruncatedPayload);
    }

    let trie = build_decode_trie(&payload.code_table)?;
    trace!(
        "Decode trie built from {} codewords.",
        payload.code_table.len()
    );

    let mut br = BitReader::with_limit(&payload.data, payload.bit_length);
    let mut out: Vec<u8> = Vec::with_capacity(payload.symbol_count as usize);
    let mut node = &trie;
    while (out.len() as u64) < payload.symbol_count {
        let bit = br.bit().ok_or(PayloadError::TruncatedPayload)?;
        node = node.kids[bit]
            .as_deref()
            .ok_or(PayloadError::CorruptPayload("bit sequence matches no codeword"))?;
        if let Some(sym) = node.sym {
            out.push(sym);
            node = &trie;
        }
    }
    verify_crc(out, payload.crc)
}

fn verify_crc(out: Vec<u8>, stored: u32) -> Result<Vec<u8>, PayloadError> {
    let computed = crc32fast::hash(&out);
    if computed != stored {
        return Err(PayloadError::ChecksumMismatch { stored, computed });
    }
    Ok(out)
}

/// Decompress every file named in opts. Output goes to the input name with
/// the .hfz extension stripped (or to stdout with --stdout); the compressed
/// file is removed afterwards unless --keep was given.
pub fn decompress(opts: &HzOpts) -> io::Result<()> {
    for fname in &opts.files {
        let bytes = fs::read(fname)?;
        let restored = CompressedPayload::from_bytes(&bytes)
            .and_then(|payload| decompress_buffer(&payload))
            .map_err(|e| {
                error!("Could not decompress {}: {}", fname, e);
                Error::new(io::ErrorKind::InvalidData, e)
            })?;

        if opts.stdout {
            io::stdout().write_all(&restored)?;
            continue;
        }

        let out_name = match fname.strip_suffix(EXTENSION) {
            Some(stem) => stem.to_string(),
            None => format!("{}.out", fname),
        };
        if !opts.force_overwrite && std::path::Path::new(&out_name).exists() {
            log::warn!("{} already exists. Use --force to overwrite it.", out_name);
            continue;
        }
        fs::write(&out_name, &restored)?;
        info!(
            "Decompressed {} into {} ({} bytes).",
            fname,
            out_name,
            restored.len()
        );

        if !opts.keep_input_files {
            fs::remove_file(fname)?;
        }
    }
    Ok(())
}

/// Integrity test: decode each file in memory and report, writing nothing.
pub fn test(opts: &HzOpts) -> io::Result<()> {
    for fname in &opts.files {
        let bytes = fs::read(fname)?;
        match CompressedPayload::from_bytes(&bytes).and_then(|payload| decompress_buffer(&payload))
        {
            Ok(restored) => info!("{} ok ({} bytes).", fname, restored.len()),
            Err(e) => {
                error!("{} failed the integrity test: {}", fname, e);
                return Err(Error::new(io::ErrorKind::InvalidData, e));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::compress::compress_buffer;
    use crate::huffman_coding::Codeword;

    fn round_trip(data: &[u8]) {
        let payload = compress_buffer(data);
        assert_eq!(decompress_buffer(&payload).unwrap(), data);
    }

    #[test]
    fn round_trip_text() {
        round_trip(b"So long, and thanks for all the fish.");
        round_trip(b"TEMP:25.5C,TEMP:25.5C");
        round_trip(b"abracadabra");
    }

    #[test]
    fn round_trip_edges() {
        round_trip(b"");
        round_trip(b"aaaa");
        round_trip(b"x");
        let all: Vec<u8> = (0..=255).collect();
        round_trip(&all);
    }

    #[test]
    fn round_trip_through_the_wire() {
        let data = b"Making a silly test.";
        let bytes = compress_buffer(data).to_bytes();
        let payload = CompressedPayload::from_bytes(&bytes).unwrap();
        assert_eq!(decompress_buffer(&payload).unwrap(), data);
    }

    #[test]
    fn truncated_data_is_detected() {
        let mut payload = compress_buffer(b"the quick brown fox jumps over the lazy dog");
        // Lose the final byte of packed bits but keep the declared counts.
        payload.data.pop();
        assert_eq!(
            decompress_buffer(&payload),
            Err(PayloadError::TruncatedPayload)
        );
    }

    #[test]
    fn phantom_symbols_from_padding_are_impossible() {
        // Four one-bit symbols in a padded byte. Claiming a fifth symbol must
        // fail rather than decode a padding bit.
        let mut payload = compress_buffer(b"aaaa");
        payload.symbol_count = 5;
        assert_eq!(
            decompress_buffer(&payload),
            Err(PayloadError::TruncatedPayload)
        );
    }

    #[test]
    fn overdeclared_bit_length_is_detected() {
        let mut payload = compress_buffer(b"hello world");
        payload.bit_length = payload.data.len() as u64 * 8 + 1;
        assert_eq!(
            decompress_buffer(&payload),
            Err(PayloadError::TruncatedPayload)
        );
    }

    #[test]
    fn prefix_collision_is_rejected() {
        // "0" is a prefix of "01": no valid Huffman table contains both.
        let mut payload = compress_buffer(b"ab");
        payload.code_table.insert(b'a', Codeword { bits: 0b0, len: 1 });
        payload.code_table.insert(b'b', Codeword { bits: 0b01, len: 2 });
        assert_eq!(
            decompress_buffer(&payload),
            Err(PayloadError::InvalidCodeTable("codewords are not prefix-free"))
        );
    }

    #[test]
    fn duplicate_codeword_is_rejected() {
        let mut payload = compress_buffer(b"ab");
        payload.code_table.insert(b'a', Codeword { bits: 0, len: 1 });
        payload.code_table.insert(b'b', Codeword { bits: 0, len: 1 });
        assert_eq!(
            decompress_buffer(&payload),
            Err(PayloadError::InvalidCodeTable("codewords are not prefix-free"))
        );
    }

    #[test]
    fn checksum_mismatch_is_reported() {
        let mut payload = compress_buffer(b"hello world");
        let stored = payload.crc ^ 1;
        payload.crc = stored;
        match decompress_buffer(&payload) {
            Err(PayloadError::ChecksumMismatch { stored: s, .. }) => assert_eq!(s, stored),
            other => panic!("expected a checksum mismatch, got {:?}", other),
        }
    }

    #[test]
    fn corrupt_data_bits_fail_loudly() {
        // Flipping bits either yields the wrong symbols (caught by the crc)
        // or breaks the bit boundaries (caught earlier). Never a silent pass.
        let mut payload = compress_buffer(b"mostly harmless, mostly");
        payload.data[0] ^= 0xff;
        assert!(decompress_buffer(&payload).is_err());
    }
}
