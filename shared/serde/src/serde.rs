use crate::{BitCounter, BitReader, BitWrite, SerdeErr, UnsignedVariableInteger};

/// A type that can be written to and read from a bit stream.
pub trait Serde: Sized {
    fn ser(&self, writer: &mut dyn BitWrite);

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` would write.
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Implemented by types whose encoding never varies in length.
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}

// Booleans

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Fixed-width numbers

macro_rules! impl_serde_for_number {
    ($type:ty, $bytes:expr) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                for byte in self.to_le_bytes() {
                    writer.write_byte(byte);
                }
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; $bytes];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$type>::from_le_bytes(bytes))
            }
        }

        impl ConstBitLength for $type {
            fn const_bit_length() -> u32 {
                $bytes * 8
            }
        }
    };
}

impl_serde_for_number!(u8, 1);
impl_serde_for_number!(u16, 2);
impl_serde_for_number!(u32, 4);
impl_serde_for_number!(i32, 4);
impl_serde_for_number!(f32, 4);

// Strings

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.len() as u64).ser(writer);
        for byte in self.as_bytes() {
            writer.write_byte(*byte);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = UnsignedVariableInteger::<7>::de(reader)?.get();
        // refuse lengths the buffer cannot possibly hold before allocating
        if length.saturating_mul(8) > u64::from(reader.bits_remaining()) {
            return Err(SerdeErr);
        }
        let mut bytes = Vec::with_capacity(length as usize);
        for _ in 0..length {
            bytes.push(reader.read_byte()?);
        }
        String::from_utf8(bytes).map_err(|_| SerdeErr)
    }
}

// Optionals: a presence bit, then the value if present

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                true.ser(writer);
                value.ser(writer);
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BitReader, BitWriter, ConstBitLength, Serde, SerdeErr};

    #[test]
    fn read_write_mixed_values() {
        let mut writer = BitWriter::new();

        true.ser(&mut writer);
        7u8.ser(&mut writer);
        65_535u16.ser(&mut writer);
        (-1_000_000i32).ser(&mut writer);
        12.5f32.ser(&mut writer);
        String::from("steelbar").ser(&mut writer);
        Some(3u16).ser(&mut writer);
        Option::<u16>::None.ser(&mut writer);

        let bytes = writer.to_bytes();
        let mut reader = BitReader::new(&bytes);

        assert!(bool::de(&mut reader).unwrap());
        assert_eq!(u8::de(&mut reader).unwrap(), 7);
        assert_eq!(u16::de(&mut reader).unwrap(), 65_535);
        assert_eq!(i32::de(&mut reader).unwrap(), -1_000_000);
        assert_eq!(f32::de(&mut reader).unwrap(), 12.5);
        assert_eq!(String::de(&mut reader).unwrap(), "steelbar");
        assert_eq!(Option::<u16>::de(&mut reader).unwrap(), Some(3));
        assert_eq!(Option::<u16>::de(&mut reader).unwrap(), None);
    }

    #[test]
    fn bit_length_matches_const_bit_length() {
        assert_eq!(5u16.bit_length(), u16::const_bit_length());
        assert_eq!(false.bit_length(), 1);
        assert_eq!(Some(1u8).bit_length(), 9);
    }

    #[test]
    fn truncated_string_is_rejected() {
        let mut writer = BitWriter::new();
        String::from("a long identifier").ser(&mut writer);
        let bytes = writer.to_bytes();

        let truncated = &bytes[..4];
        let mut reader = BitReader::new(truncated);
        assert_eq!(String::de(&mut reader), Err(SerdeErr));
    }
}
