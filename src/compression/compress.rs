use std::io::{self, Write};

use log::{debug, info};

use super::compress_block::compress_block;
use crate::bitstream::bitwriter::BitWriter;
use crate::bwt::block_sort::WORK_FACTOR;
use crate::error::{Error, Result};
use crate::huffman_coding::MAX_ALPHA_SIZE;
use crate::tools::crc::{stream_crc, Crc};
use crate::tools::rle1::{write_run, RunState, MAX_RUN};

/// Default table refinement passes in the Huffman stage.
pub const DEFAULT_ITERATIONS: usize = 4;

/// One block's worth of state, reused across blocks. `data` holds the
/// run-length pre-encoded bytes; the later pipeline stages fill in the
/// transform output and coding metadata.
pub struct Block {
    pub data: Vec<u8>,
    /// Most bytes `data` may hold: the nominal block size less a safety
    /// margin so a final five-byte run cannot overrun it.
    pub capacity: usize,
    pub crc: Crc,
    pub randomised: bool,
    pub orig_ptr: u32,
    pub bwt: Vec<u8>,
    pub rle2: Vec<u16>,
    pub freqs: [u32; MAX_ALPHA_SIZE],
    pub eob: u16,
    pub sym_map: Vec<u16>,
    pub seq: u32,
}

impl Block {
    pub fn new(block_size: usize) -> Self {
        let capacity = block_size * 100_000 - 20;
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            crc: Crc::new(),
            randomised: false,
            orig_ptr: 0,
            bwt: Vec::new(),
            rle2: Vec::new(),
            freqs: [0; MAX_ALPHA_SIZE],
            eob: 0,
            sym_map: Vec::with_capacity(17),
            seq: 0,
        }
    }

    /// Make the block ready for the next round of input. The sequence
    /// counter survives; everything else is cleared.
    fn reset(&mut self) {
        self.data.clear();
        self.crc.reset();
        self.randomised = false;
        self.orig_ptr = 0;
        self.bwt.clear();
        self.rle2.clear();
        self.freqs = [0; MAX_ALPHA_SIZE];
        self.eob = 0;
        self.sym_map.clear();
    }
}

/// A compressing writer. Bytes pushed in with `write` are run-length
/// pre-encoded into blocks; each block that fills is transformed and
/// coded onto the sink. `finish` closes the final block and writes the
/// stream trailer - nothing valid comes out of the sink until then for
/// the last partial block.
///
/// Also usable through `std::io::Write` for composing with other
/// writers; `finish` must still be called before dropping it.
pub struct BzEncoder<W: Write> {
    bw: BitWriter<W>,
    block: Block,
    run: RunState,
    stream_crc: u32,
    iterations: usize,
    work_factor: i32,
    bytes_in: u64,
    finished: bool,
}

impl<W: Write> BzEncoder<W> {
    /// Start a compressed stream on `sink`. `block_size` is the nominal
    /// block size in units of 100kB and must be 1-9; the four-byte
    /// stream header goes out immediately.
    pub fn new(sink: W, block_size: usize) -> Result<Self> {
        if !(1..=9).contains(&block_size) {
            return Err(Error::BlockSize(block_size));
        }
        let mut bw = BitWriter::new(sink);
        bw.out8(b'B')?;
        bw.out8(b'Z')?;
        bw.out8(b'h')?;
        bw.out8(b'0' + block_size as u8)?;
        info!("stream opened, block size {}00kB", block_size);
        Ok(Self {
            bw,
            block: Block::new(block_size),
            run: RunState::new(),
            stream_crc: 0,
            iterations: DEFAULT_ITERATIONS,
            work_factor: WORK_FACTOR,
            bytes_in: 0,
            finished: false,
        })
    }

    /// Change the number of Huffman refinement passes (default 4).
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Change the block sort effort limit, in work units per input byte.
    /// Lower values randomise repetitive blocks sooner.
    pub fn work_factor(mut self, work_factor: i32) -> Self {
        self.work_factor = work_factor.max(0);
        self
    }

    /// Compress a buffer of input. Output reaches the sink as blocks
    /// fill, so large inputs stream with one block of memory in use.
    ///
    /// A sink failure leaves the encoder unusable: the block that was
    /// being flushed is half emitted, so later calls fail with
    /// [`Error::Finished`].
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::Finished);
        }
        for &byte in buf {
            if let Err(err) = self.push_byte(byte) {
                self.finished = true;
                return Err(err);
            }
            self.bytes_in += 1;
        }
        Ok(())
    }

    /// Close the final block, write the stream trailer and flush the
    /// sink. The encoder accepts no input afterwards, whether the
    /// trailer went out cleanly or not.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(Error::Finished);
        }
        let result = self.close_stream();
        self.finished = true;
        result
    }

    fn close_stream(&mut self) -> Result<()> {
        if let Some(byte) = self.run.current.take() {
            let length = self.run.length;
            self.run.clear();
            self.flush_run(byte, length)?;
        }
        if !self.block.data.is_empty() {
            self.end_block()?;
        }
        self.bw.write_bits(24, 0x17_72_45)?;
        self.bw.write_bits(24, 0x38_50_90)?;
        self.bw.out32(self.stream_crc)?;
        self.bw.flush()?;
        info!(
            "stream closed: {} bytes in, {} blocks, stream crc {:08x}",
            self.bytes_in, self.block.seq, self.stream_crc
        );
        Ok(())
    }

    /// Total bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.bytes_in
    }

    /// Blocks emitted so far.
    pub fn blocks(&self) -> u32 {
        self.block.seq
    }

    /// Hand the sink back. Meaningful only after `finish`.
    pub fn into_inner(self) -> W {
        self.bw.into_inner()
    }

    /// Feed one byte to the run accumulator, flushing the previous run
    /// once it breaks (different byte, or the run length limit).
    fn push_byte(&mut self, byte: u8) -> Result<()> {
        match self.run.current {
            Some(b) if b == byte && self.run.length < MAX_RUN => self.run.length += 1,
            Some(b) => {
                let length = self.run.length;
                self.run.current = Some(byte);
                self.run.length = 1;
                self.flush_run(b, length)?;
            }
            None => {
                self.run.current = Some(byte);
                self.run.length = 1;
            }
        }
        Ok(())
    }

    /// Append a finished run to the block, closing the block first when
    /// the run might not fit. Closing is deferred to this point so a
    /// block only ends when more input actually arrives for it.
    fn flush_run(&mut self, byte: u8, length: u32) -> Result<()> {
        if self.block.data.len() + 5 > self.block.capacity {
            self.end_block()?;
        }
        write_run(&mut self.block, byte, length);
        Ok(())
    }

    /// Compress and emit the current block, folding its CRC into the
    /// stream CRC.
    fn end_block(&mut self) -> Result<()> {
        self.block.seq += 1;
        let block_crc = self.block.crc.result();
        self.stream_crc = stream_crc(self.stream_crc, block_crc);
        debug!(
            "closing block {}: crc {:08x}, stream crc {:08x}",
            self.block.seq, block_crc, self.stream_crc
        );
        compress_block(
            &mut self.bw,
            &mut self.block,
            block_crc,
            self.iterations,
            self.work_factor,
        )?;
        self.block.reset();
        Ok(())
    }
}

impl<W: Write> io::Write for BzEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BzEncoder::write(self, buf)?;
        Ok(buf.len())
    }

    /// Push through bytes already produced. Pending bits and the open
    /// block stay put; only `finish` can close them.
    fn flush(&mut self) -> io::Result<()> {
        self.bw.flush_bytes()
    }
}

/// Smallest block size whose single block covers `input_len` bytes, for
/// callers sizing the stream to a known input. Saturates at 9.
pub fn choose_block_size(input_len: u64) -> usize {
    (1..=9)
        .find(|&size| size as u64 * 100_000 >= input_len)
        .unwrap_or(9)
}
