#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Identifies a leaf inside a shape hierarchy.
///
/// The id is a path of bit fields: every compound level pushes its child index
/// into the low bits, unused high bits are all ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SubShapeId {
    value: u32,
}

impl SubShapeId {
    /// Number of bits available in an id
    pub const MAX_BITS: u32 = 32;

    /// An id that addresses the root shape
    pub const EMPTY: SubShapeId = SubShapeId { value: u32::MAX };

    /// Creates an id from its raw value
    #[inline]
    pub fn from_value(value: u32) -> Self {
        Self { value }
    }

    /// Returns the raw value
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value == u32::MAX
    }

    /// Pops the lowest `bits` bits, returning them and the remainder of the path
    pub fn pop_id(&self, bits: u32) -> (u32, SubShapeId) {
        if bits >= Self::MAX_BITS {
            return (self.value, Self::EMPTY);
        }

        let mask = (1u32 << bits) - 1;
        let fill = !(u32::MAX >> bits);
        (self.value & mask, Self::from_value((self.value >> bits) | fill))
    }
}

impl Default for SubShapeId {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Builds a [`SubShapeId`] while descending into a shape hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubShapeIdCreator {
    value: u32,
    current_bit: u32,
}

impl SubShapeIdCreator {
    /// Returns a creator with `id` appended to the path
    pub fn push_id(&self, id: u32, bits: u32) -> Self {
        debug_assert!(self.current_bit + bits <= SubShapeId::MAX_BITS);
        debug_assert!(bits >= 32 || id < (1u32 << bits));

        Self {
            value: self.value | (id << self.current_bit),
            current_bit: self.current_bit + bits,
        }
    }

    /// Returns the id built so far
    pub fn id(&self) -> SubShapeId {
        let fill = if self.current_bit >= SubShapeId::MAX_BITS {
            0
        } else {
            u32::MAX << self.current_bit
        };
        SubShapeId::from_value(self.value | fill)
    }

    /// Number of bits used so far
    #[inline]
    pub fn num_bits_written(&self) -> u32 {
        self.current_bit
    }
}
