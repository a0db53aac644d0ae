use crate::SerdeErr;

/// Reads bits back in the order [`crate::BitWriter`] produced them.
pub struct BitReader<'b> {
    buffer: &'b [u8],
    byte_index: usize,
    bit_index: u8,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            byte_index: 0,
            bit_index: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let Some(byte) = self.buffer.get(self.byte_index) else {
            return Err(SerdeErr);
        };

        let bit = (byte >> self.bit_index) & 1 == 1;

        self.bit_index += 1;
        if self.bit_index >= 8 {
            self.bit_index = 0;
            self.byte_index += 1;
        }

        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let mut output: u8 = 0;
        for index in 0..8 {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    /// Bits left before the reader runs off the end of the buffer. Length
    /// prefixes are checked against this before any entries are read.
    pub fn bits_remaining(&self) -> u32 {
        let total = self.buffer.len() as u64 * 8;
        let consumed = self.byte_index as u64 * 8 + u64::from(self.bit_index);
        total.saturating_sub(consumed).min(u64::from(u32::MAX)) as u32
    }
}
