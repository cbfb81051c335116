//! The payload module defines the CompressedPayload data object and its
//! self-describing wire format.
//!
//! A payload carries everything the decoder needs: the code table, the number
//! of symbols to reproduce, a CRC32 of the original bytes, and the packed code
//! bits with their exact bit length. Without the symbol count and the padding
//! count the format would not be self-describing: a decoder could read flush
//! padding as one more short codeword and emit a phantom trailing symbol.
//!
//! Wire layout:
//!
//! ```text
//! bytes 0..=3   magic "HFZ1"
//! byte  4       count of padding bits in the final byte (0-7)
//! bytes 5..     bit-packed, most significant bit first:
//!               u16  distinct symbol count (0..=256)
//!               u32  CRC32 of the original bytes
//!               u64  original symbol count (two 32 bit halves)
//!               per distinct symbol, ascending:
//!                   u8 symbol, u8 codeword length (1..=128), codeword bits
//!               the encoded data bits
//!               zero padding to the byte boundary
//! ```
//!

use thiserror::Error;

use crate::bitstream::{BitPacker, BitReader};
use crate::huffman_coding::{CodeTable, Codeword};

/// Magic prefix of the wire format.
const MAGIC: [u8; 4] = *b"HFZ1";

/// Longest legal codeword. See Codeword for why 128 bits always suffice.
pub const MAX_CODE_LEN: u8 = 128;

/// Everything that can go wrong consuming an externally supplied payload.
/// Compression itself cannot fail; only the decode side touches untrusted
/// data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    /// The wire data is malformed, or the declared metadata is inconsistent
    /// with the buffer that came with it.
    #[error("corrupt payload: {0}")]
    CorruptPayload(&'static str),
    /// The transmitted code table cannot be used: codewords are not
    /// prefix-free, have illegal lengths, or a symbol is mapped twice.
    #[error("invalid code table: {0}")]
    InvalidCodeTable(&'static str),
    /// The bitstream ended before the declared symbol count was decoded.
    #[error("bitstream ended before the declared symbol count was decoded")]
    TruncatedPayload,
    /// The reconstructed bytes do not hash to the stored checksum.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
}

/// The immutable result of one compression call. Built once by the encoder,
/// consumed by the decoder or serialized to the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPayload {
    pub code_table: CodeTable,
    /// Number of symbols the decoder must reproduce.
    pub symbol_count: u64,
    /// CRC32 of the original input bytes.
    pub crc: u32,
    /// Exact count of valid bits in `data`; anything past it is flush padding.
    pub bit_length: u64,
    /// The packed code bits.
    pub data: Vec<u8>,
}

impl CompressedPayload {
    /// Serialize to the wire format described in the module header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let entries = self.code_table.sorted_entries();
        let mut bp = BitPacker::new(self.data.len() + 4 * entries.len() + 32);

        bp.out16(entries.len() as u16);
        bp.out32(self.crc);
        // The u64 symbol count goes out as two 32 bit halves.
        bp.out32((self.symbol_count >> 32) as u32);
        bp.out32(self.symbol_count as u32);

        for (sym, code) in &entries {
            bp.out8(*sym);
            bp.out8(code.len);
            bp.push_bits(code.bits, code.len);
        }

        // Append the data bits: whole bytes first, then the partial tail.
        let full = (self.bit_length / 8) as usize;
        for &byte in &self.data[..full] {
            bp.out8(byte);
        }
        let tail = (self.bit_length % 8) as u8;
        if tail > 0 {
            bp.push_bits((self.data[full] >> (8 - tail)) as u128, tail);
        }

        bp.flush();
        let padding = (8 - bp.last_bits) % 8;

        let mut out = Vec::with_capacity(bp.output.len() + 5);
        out.extend_from_slice(&MAGIC);
        out.push(padding);
        out.extend_from_slice(&bp.output);
        out
    }

    /// Rebuild a payload from wire bytes, validating the header as it goes.
    /// Prefix-freedom of the table is checked later, when the decoder builds
    /// its trie.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, PayloadError> {
        const EARLY_END: PayloadError =
            PayloadError::CorruptPayload("header ended before it was complete");

        if buf.len() < MAGIC.len() + 1 {
            return Err(PayloadError::CorruptPayload("buffer shorter than the header"));
        }
        if buf[..MAGIC.len()] != MAGIC {
            return Err(PayloadError::CorruptPayload("bad magic"));
        }
        let padding = buf[MAGIC.len()];
        if padding > 7 {
            return Err(PayloadError::CorruptPayload("padding count exceeds 7 bits"));
        }
        let packed = &buf[MAGIC.len() + 1..];
        let total_bits = packed.len() as u64 * 8;
        if u64::from(padding) > total_bits {
            return Err(PayloadError::CorruptPayload("padding count exceeds the buffer"));
        }
        let mut br = BitReader::with_limit(packed, total_bits - u64::from(padding));

        let distinct = br.bint(16).ok_or(EARLY_END)?;
        if distinct > 256 {
            return Err(PayloadError::CorruptPayload("more than 256 distinct symbols"));
        }
        let crc = br.bint(32).ok_or(EARLY_END)? as u32;
        let hi = br.bint(32).ok_or(EARLY_END)? as u64;
        let lo = br.bint(32).ok_or(EARLY_END)? as u64;
        let symbol_count = hi << 32 | lo;

        let mut code_table = CodeTable::new();
        for _ in 0..distinct {
            let sym = br.byte().ok_or(EARLY_END)?;
            let len = br.byte().ok_or(EARLY_END)?;
            if len == 0 || len > MAX_CODE_LEN {
                return Err(PayloadError::InvalidCodeTable("codeword length out of range"));
            }
            let mut bits = 0_u128;
            for _ in 0..len {
                bits = bits << 1 | br.bit().ok_or(EARLY_END)? as u128;
            }
            if code_table.insert(sym, Codeword { bits, len }).is_some() {
                return Err(PayloadError::InvalidCodeTable("symbol mapped twice"));
            }
        }

        // Whatever is left is the data section; its length is exact because
        // the reader was fenced at the padding boundary.
        let bit_length = br.bits_left();
        let mut bp = BitPacker::new(bit_length as usize / 8 + 1);
        while br.bits_left() >= 8 {
            match br.byte() {
                Some(byte) => bp.out8(byte),
                None => break,
            }
        }
        let tail = br.bits_left() as u8;
        if tail > 0 {
            if let Some(bits) = br.bint(tail as usize) {
                bp.push_bits(bits as u128, tail);
            }
        }
        bp.flush();

        Ok(CompressedPayload {
            code_table,
            symbol_count,
            crc,
            bit_length,
            data: bp.output,
        })
    }
}
