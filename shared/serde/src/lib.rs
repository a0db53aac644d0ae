//! # Fathom Serde
//! Bit-level serialization primitives for the campaign wire protocol.
//!
//! Values are packed least-significant-bit first into a growable buffer, so a
//! boolean costs a single bit and ranged integers cost only the bits their
//! range needs.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod integer;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::{UnsignedInteger, UnsignedVariableInteger};
pub use serde::{ConstBitLength, Serde};
