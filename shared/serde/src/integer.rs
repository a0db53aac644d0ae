use crate::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Unsigned integer packed into exactly `BITS` bits. Used for ranged values
/// such as cargo quantities (0..=100 fits in 7 bits).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UnsignedInteger<const BITS: u8> {
    value: u64,
}

impl<const BITS: u8> UnsignedInteger<BITS> {
    /// # Panics
    /// Panics if `value` does not fit in `BITS` bits. Callers clamp ranged
    /// values before encoding.
    pub fn new<T: Into<u64>>(value: T) -> Self {
        let value = value.into();
        if BITS == 0 || BITS > 63 {
            panic!("can't create an integer with {} bits", BITS);
        }
        if value >= 1u64 << BITS {
            panic!(
                "with {} bits, can't encode number greater than {}",
                BITS,
                (1u64 << BITS) - 1
            );
        }
        Self { value }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<const BITS: u8> Serde for UnsignedInteger<BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.value;
        for _ in 0..BITS {
            writer.write_bit(value & 1 != 0);
            value >>= 1;
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut value: u64 = 0;
        for index in 0..BITS {
            if reader.read_bit()? {
                value |= 1 << index;
            }
        }
        Ok(Self { value })
    }
}

impl<const BITS: u8> ConstBitLength for UnsignedInteger<BITS> {
    fn const_bit_length() -> u32 {
        u32::from(BITS)
    }
}

/// Unsigned integer written in `BITS`-sized groups, each preceded by a
/// "more follows" bit. Small values stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UnsignedVariableInteger<const BITS: u8> {
    value: u64,
}

impl<const BITS: u8> UnsignedVariableInteger<BITS> {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        if BITS == 0 || BITS > 63 {
            panic!("can't create a variable integer with {} bit groups", BITS);
        }
        Self {
            value: value.into(),
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<const BITS: u8> Serde for UnsignedVariableInteger<BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.value;
        loop {
            let proceed = value >= 1u64 << BITS;
            writer.write_bit(proceed);
            for _ in 0..BITS {
                writer.write_bit(value & 1 != 0);
                value >>= 1;
            }
            if !proceed {
                return;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let proceed = reader.read_bit()?;
            for _ in 0..BITS {
                if reader.read_bit()? {
                    if shift >= 64 {
                        return Err(SerdeErr);
                    }
                    value |= 1 << shift;
                }
                shift += 1;
            }
            if !proceed {
                return Ok(Self { value });
            }
            if shift >= 64 {
                return Err(SerdeErr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        BitReader, BitWriter, ConstBitLength, Serde, UnsignedInteger, UnsignedVariableInteger,
    };

    #[test]
    fn read_write_unsigned() {
        let mut writer = BitWriter::new();

        let in_1 = UnsignedInteger::<7>::new(100u8);
        let in_2 = UnsignedInteger::<20>::new(535_221u32);
        let in_3 = UnsignedInteger::<2>::new(3u8);

        in_1.ser(&mut writer);
        in_2.ser(&mut writer);
        in_3.ser(&mut writer);

        let buffer = writer.to_bytes();
        let mut reader = BitReader::new(&buffer);

        assert_eq!(UnsignedInteger::<7>::de(&mut reader).unwrap(), in_1);
        assert_eq!(UnsignedInteger::<20>::de(&mut reader).unwrap(), in_2);
        assert_eq!(UnsignedInteger::<2>::de(&mut reader).unwrap(), in_3);
        assert_eq!(UnsignedInteger::<7>::const_bit_length(), 7);
    }

    #[test]
    fn read_write_unsigned_variable() {
        let mut writer = BitWriter::new();

        let in_1 = UnsignedVariableInteger::<7>::new(3u8);
        let in_2 = UnsignedVariableInteger::<7>::new(300u16);
        let in_3 = UnsignedVariableInteger::<3>::new(123_456u32);

        in_1.ser(&mut writer);
        in_2.ser(&mut writer);
        in_3.ser(&mut writer);

        let buffer = writer.to_bytes();
        let mut reader = BitReader::new(&buffer);

        assert_eq!(UnsignedVariableInteger::<7>::de(&mut reader).unwrap(), in_1);
        assert_eq!(UnsignedVariableInteger::<7>::de(&mut reader).unwrap(), in_2);
        assert_eq!(UnsignedVariableInteger::<3>::de(&mut reader).unwrap(), in_3);
    }

    #[test]
    fn small_variable_values_use_one_group() {
        assert_eq!(UnsignedVariableInteger::<7>::new(5u8).bit_length(), 8);
        assert_eq!(UnsignedVariableInteger::<7>::new(200u8).bit_length(), 16);
    }

    #[test]
    #[should_panic]
    fn out_of_range_value_panics() {
        let _ = UnsignedInteger::<7>::new(128u8);
    }
}
