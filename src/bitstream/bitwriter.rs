use std::io::Write;

/// How many pending bytes we hold before pushing them to the sink.
const OUT_BUF_SIZE: usize = 4096;

/// Writes the output bitstream. Bits are packed MSB first into an internal
/// queue; whole bytes drain into a small buffer which is handed to the sink
/// as it fills. `flush` pads the last partial byte with zero bits - it MUST
/// be called (the orchestrator does) before the sink is released, or
/// trailing bits stay in the queue.
pub struct BitWriter<W: Write> {
    /// The output sink.
    sink: W,
    /// Pending bytes not yet written to the sink.
    buffer: Vec<u8>,
    /// Bits waiting to be packed into bytes.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Total bits accepted, used for trace reporting.
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            buffer: Vec::with_capacity(OUT_BUF_SIZE),
            queue: 0,
            q_bits: 0,
            bits_written: 0,
        }
    }

    /// Append the low `count` bits of `data`, most significant first.
    /// `count` must be 1-32.
    pub fn write_bits(&mut self, count: u8, data: u32) -> std::io::Result<()> {
        debug_assert!(count >= 1 && count <= 32);
        debug_assert!(count == 32 || (data as u64) < (1_u64 << count));
        self.queue = (self.queue << count) | data as u64;
        self.q_bits += count;
        self.bits_written += count as u64;
        self.drain_queue()
    }

    /// Put a whole byte on the stream.
    pub fn out8(&mut self, data: u8) -> std::io::Result<()> {
        self.write_bits(8, data as u32)
    }

    /// Put two bytes on the stream, big-endian.
    pub fn out16(&mut self, data: u16) -> std::io::Result<()> {
        self.write_bits(16, data as u32)
    }

    /// Put a 24-bit field on the stream.
    pub fn out24(&mut self, data: u32) -> std::io::Result<()> {
        self.write_bits(24, data & 0x00ff_ffff)
    }

    /// Put four bytes on the stream, big-endian.
    pub fn out32(&mut self, data: u32) -> std::io::Result<()> {
        self.write_bits(32, data)
    }

    /// Move whole bytes from the bit queue into the byte buffer, and the
    /// byte buffer into the sink once it is full enough.
    fn drain_queue(&mut self) -> std::io::Result<()> {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.buffer.push(byte);
            self.q_bits -= 8;
        }
        if self.buffer.len() >= OUT_BUF_SIZE {
            self.sink.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Pad the final partial byte (if any) with zero bits and push
    /// everything through to the sink.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.q_bits > 0 {
            let pad = 8 - self.q_bits;
            self.queue <<= pad;
            self.q_bits += pad;
        }
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.buffer.push(byte);
            self.q_bits -= 8;
        }
        self.sink.write_all(&self.buffer)?;
        self.buffer.clear();
        self.sink.flush()
    }

    /// Push buffered whole bytes to the sink without padding the queue.
    pub fn flush_bytes(&mut self) -> std::io::Result<()> {
        self.sink.write_all(&self.buffer)?;
        self.buffer.clear();
        self.sink.flush()
    }

    /// Current bit position in the stream, for trace reporting.
    pub fn loc(&self) -> u64 {
        self.bits_written
    }

    /// Hand the sink back. Call `flush` first.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod test {
    use super::BitWriter;

    #[test]
    fn out8_test() {
        let mut bw = BitWriter::new(Vec::new());
        bw.out8(b'x').unwrap();
        bw.flush().unwrap();
        assert_eq!(bw.into_inner(), b"x");
    }

    #[test]
    fn partial_byte_is_padded() {
        let mut bw = BitWriter::new(Vec::new());
        bw.out8(255).unwrap();
        bw.out8(1).unwrap();
        bw.out8(128).unwrap();
        bw.out8(255).unwrap();
        bw.write_bits(3, 0b111).unwrap();
        bw.flush().unwrap();
        assert_eq!(bw.into_inner(), vec![255, 1, 128, 255, 224]);
    }

    #[test]
    fn bits_cross_byte_boundary() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_bits(8, 0xff).unwrap();
        bw.write_bits(2, 0b11).unwrap();
        bw.flush().unwrap();
        assert_eq!(bw.into_inner(), vec![0b1111_1111, 0b1100_0000]);
    }

    #[test]
    fn wide_fields() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_bits(1, 0).unwrap();
        bw.out24(0x0031_4159).unwrap();
        bw.out32(0xdead_beef).unwrap();
        bw.flush().unwrap();
        // the single zero bit shifts everything right by one
        assert_eq!(
            bw.into_inner(),
            vec![0x18, 0xa0, 0xac, 0xef, 0x56, 0xdf, 0x77, 0x80]
        );
    }

    #[test]
    fn loc_counts_bits() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_bits(3, 0b101).unwrap();
        bw.out16(0xffff).unwrap();
        assert_eq!(bw.loc(), 19);
    }
}
