//! The compress module manages the compression side of huffzip.
//!
//! Compression happens in the following steps:
//! - Frequency count: One linear pass over the input producing a count per
//!   distinct byte value.
//! - Tree construction: Greedy merging of the two lightest nodes until a
//!   single root remains, with FIFO tie-breaking for determinism.
//! - Code assignment: A depth-first walk of the tree yields one prefix-free
//!   codeword per distinct byte.
//! - Bit packing: Each input byte is replaced by its codeword and the result
//!   is packed 8 bits per byte, recording the exact bit count so the decoder
//!   can tell real data from flush padding.
//!
//! The whole pipeline is total: any byte buffer, including the empty one,
//! compresses without error.
//!

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, info, trace, warn};

use crate::bitstream::BitPacker;
use crate::huffman_coding::{build_tree, CodeTable};
use crate::tools::cli::HzOpts;
use crate::tools::freq_count::freqs;

use super::payload::CompressedPayload;

/// Extension appended to compressed files.
pub const EXTENSION: &str = ".hfz";

/// Compress a memory buffer into a CompressedPayload. Never fails: the code
/// table is derived from the very buffer it encodes, so every symbol the
/// encoder meets has a codeword.
pub fn compress_buffer(data: &[u8]) -> CompressedPayload {
    // The empty input is a valid zero-length payload, not an error.
    if data.is_empty() {
        return CompressedPayload {
            code_table: CodeTable::new(),
            symbol_count: 0,
            crc: crc32fast::hash(data),
            bit_length: 0,
            data: Vec::new(),
        };
    }

    let freq_table = freqs(data);
    let root = build_tree(&freq_table).expect("non-empty input must yield a tree");
    let code_table = CodeTable::from_tree(&root);
    debug!(
        "Built {} codewords for {} input bytes.",
        code_table.len(),
        data.len()
    );

    let mut bp = BitPacker::new(data.len());
    let mut bit_length = 0_u64;
    for &sym in data {
        // A miss here means the table was not derived from this input, which
        // is a programming error, not a recoverable condition.
        let code = code_table
            .get(sym)
            .expect("symbol missing from its own code table");
        bp.push_bits(code.bits, code.len);
        bit_length += code.len as u64;
    }
    bp.flush();
    trace!("Packed {} symbols into {} bits.", data.len(), bit_length);

    CompressedPayload {
        code_table,
        symbol_count: data.len() as u64,
        crc: crc32fast::hash(data),
        bit_length,
        data: bp.output,
    }
}

/// Compress every input file named in opts. Each file is written next to its
/// input with the .hfz extension (or to stdout with --stdout); the input is
/// removed afterwards unless --keep was given.
pub fn compress(opts: &HzOpts) -> io::Result<()> {
    for fname in &opts.files {
        let data = fs::read(fname)?;
        let payload = compress_buffer(&data);
        let out = payload.to_bytes();

        if opts.stdout {
            io::stdout().write_all(&out)?;
            continue;
        }

        let out_name = format!("{}{}", fname, EXTENSION);
        if !opts.force_overwrite && Path::new(&out_name).exists() {
            warn!("{} already exists. Use --force to overwrite it.", out_name);
            continue;
        }
        fs::write(&out_name, &out)?;
        info!(
            "Compressed {} from {} to {} bytes ({:.1}% of the original).",
            fname,
            data.len(),
            out.len(),
            out.len() as f64 * 100.0 / data.len().max(1) as f64
        );

        if !opts.keep_input_files {
            fs::remove_file(fname)?;
        }
    }
    Ok(())
}
