//! Bit-granularity input and output streams.
//!
//! Both directions work MSB first: writing `0b101` in 3 bits and reading 3
//! bits back yields `0b101`. The reader reports exhaustion with `Ok(None)`,
//! distinct from every valid value, and can be rewound to the first bit.
//! The writer buffers a partial byte until [`BitWrite::close`] pads it with
//! zeros.

use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

/// Maximum number of bits moved by a single read or write.
pub const MAX_BITS: u32 = 32;

/// Sequential source of bits.
pub trait BitRead {
    /// Reads `len` bits (at most [`MAX_BITS`]), returning `Ok(None)` when fewer
    /// than `len` bits are left in the stream.
    fn read_bits(&mut self, len: u32) -> io::Result<Option<u32>>;

    /// Repositions the stream at its first bit.
    fn reset(&mut self) -> io::Result<()>;

    /// Number of bits returned so far, across resets.
    fn bits_read(&self) -> usize;
}

/// Sequential sink of bits.
pub trait BitWrite {
    /// Writes the low `len` bits of `value` (at most [`MAX_BITS`]).
    fn write_bits(&mut self, len: u32, value: u32) -> io::Result<()>;

    /// Pads the trailing partial byte with zeros and flushes. Further calls
    /// are no-ops.
    fn close(&mut self) -> io::Result<()>;

    /// Number of bits written so far, padding excluded.
    fn bits_written(&self) -> usize;
}

pub struct BinaryReader<R: Read + Seek> {
    is: BufReader<R>,
    pub read_bits: usize,
    /// The lowest `fill` bits are buffered and not yet returned
    current: u64,
    fill: usize,
}

impl<R: Read + Seek> BinaryReader<R> {
    pub fn new(input_stream: R) -> Self {
        BinaryReader {
            is: BufReader::new(input_stream),
            read_bits: 0,
            current: 0,
            fill: 0,
        }
    }

    /// Reads the next byte from the underlying stream.
    fn read(&mut self) -> io::Result<Option<u64>> {
        let mut byte = [0u8; 1];
        loop {
            match self.is.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0] as u64)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Feeds whole bytes into `current` until at least `len` bits are buffered.
    /// Returns `false` if the stream ran dry first.
    fn refill(&mut self, len: usize) -> io::Result<bool> {
        while self.fill < len {
            match self.read()? {
                Some(byte) => {
                    self.current = (self.current << 8) | byte;
                    self.fill += 8;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }
}

impl BinaryReader<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }
}

impl<R: Read + Seek> BitRead for BinaryReader<R> {
    fn read_bits(&mut self, len: u32) -> io::Result<Option<u32>> {
        assert!(len <= MAX_BITS, "Cannot read {} bits into an integer", len);

        if len == 0 {
            return Ok(Some(0));
        }

        let len = len as usize;
        if !self.refill(len)? {
            return Ok(None);
        }

        self.fill -= len;
        let x = (self.current >> self.fill) & ((1 << len) - 1);
        self.current &= (1 << self.fill) - 1;
        self.read_bits += len;

        Ok(Some(x as u32))
    }

    fn reset(&mut self) -> io::Result<()> {
        self.is.seek(SeekFrom::Start(0))?;
        self.current = 0;
        self.fill = 0;
        Ok(())
    }

    fn bits_read(&self) -> usize {
        self.read_bits
    }
}

pub struct BinaryWriter<W: Write> {
    os: BufWriter<W>,
    pub written_bits: usize,
    current: u64,
    /// Bits still free in `current` before it makes up a whole byte
    free: usize,
    closed: bool,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(output_stream: W) -> Self {
        BinaryWriter {
            os: BufWriter::new(output_stream),
            written_bits: 0,
            current: 0,
            free: 8,
            closed: false,
        }
    }

    #[inline(always)]
    fn write(&mut self, b: u64) -> io::Result<()> {
        self.os.write_all(&[b as u8])
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: usize) -> io::Result<()> {
        self.free -= len;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.write(self.current)?;
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len;
        Ok(())
    }

    /// Closes the stream and hands back the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.close()?;
        self.os.into_inner().map_err(|e| e.into_error())
    }
}

impl BinaryWriter<Vec<u8>> {
    pub fn in_memory() -> Self {
        Self::new(Vec::new())
    }
}

impl<W: Write> BitWrite for BinaryWriter<W> {
    fn write_bits(&mut self, len: u32, value: u32) -> io::Result<()> {
        assert!(len <= MAX_BITS, "Cannot write {} bits from an integer", len);

        if self.closed {
            return Err(io::Error::new(io::ErrorKind::Other, "write on a closed bit stream"));
        }

        let x = value as u64;
        let mut len = len as usize;

        while len > 0 {
            let chunk = len.min(self.free);
            self.write_in_current(x >> (len - chunk), chunk)?;
            len -= chunk;
        }

        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }

        if self.free != 8 {
            self.write(self.current)?;
            self.free = 8;
            self.current = 0;
        }

        self.os.flush()?;
        self.closed = true;
        Ok(())
    }

    fn bits_written(&self) -> usize {
        self.written_bits
    }
}
