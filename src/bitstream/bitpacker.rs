use log::error;

/// Packs a bit sequence into bytes for output.
pub struct BitPacker {
    pub output: Vec<u8>,
    /// Count of valid bits in the last byte of output after flush(). Zero
    /// means the final byte is fully used.
    pub last_bits: u8,
    queue: u64,
    q_bits: u8,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of the size specified.
    /// Call flush() to empty the bit queue into the buffer before reading
    /// the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            last_bits: 0,
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all out.XX functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Put the low `depth` (1-32) bits of data on the stream, most significant
    /// bit first. The queue never holds more than 7 bits on entry, so a 32 bit
    /// push always fits.
    fn out_bits(&mut self, data: u32, depth: u8) {
        debug_assert!((1..=32).contains(&depth));
        self.queue <<= depth; //shift queue by bit length
        self.queue |= (data as u64) & (u64::MAX >> (64 - depth)); //add data portion to queue
        self.q_bits += depth; //update depth of queue bits
        self.write_stream();
    }

    /// Puts an 8 bit word of pre-packed binary encoded data on the stream.
    pub fn out8(&mut self, data: u8) {
        self.out_bits(data as u32, 8);
    }

    /// Puts a 16 bit word of pre-packed binary encoded data on the stream.
    pub fn out16(&mut self, data: u16) {
        self.out_bits(data as u32, 16);
    }

    /// Puts a 32 bit word of pre-packed binary encoded data on the stream.
    pub fn out32(&mut self, data: u32) {
        self.out_bits(data, 32);
    }

    /// Writes the low `len` bits of `bits`, most significant bit first. This
    /// is the codeword path: lengths up to 128 are legal, so the push is
    /// chunked through the 64 bit queue 32 bits at a time.
    pub fn push_bits(&mut self, bits: u128, mut len: u8) {
        while len > 32 {
            len -= 32;
            self.out_bits((bits >> len) as u32, 32);
        }
        if len > 0 {
            self.out_bits(bits as u32, len);
        }
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the
    /// least significant bits. last_bits records how many bits of the final
    /// byte are real data.
    pub fn flush(&mut self) {
        self.last_bits = self.q_bits % 8;
        if self.q_bits > 0 {
            self.queue <<= 8 - self.q_bits; //pad the queue with zeros
            self.q_bits += 8 - self.q_bits;
            self.write_stream(); // write out all that is left
            if self.q_bits > 0 {
                error!("Stuff left in the BitPacker queue.");
            }
        }
    }

    /// Number of bits written so far, including any still in the queue.
    pub fn bit_len(&self) -> u64 {
        self.output.len() as u64 * 8 + self.q_bits as u64
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format! {"[{}.{}]", self.bit_len() / 8, self.bit_len() % 8}
    }
}
