use num_traits::{One, PrimInt};

/// Trait implemented by flag enums whose discriminant is a bit index.
///
/// The backing integer is chosen through `Storage`; collision layers use `u32` because that is
/// what Rapier's interaction groups hold.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A set of flags packed into one integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    /// Every bit set, including bits no flag is assigned to.
    pub fn all() -> Self {
        Self { bits: !T::zero() }
    }

    pub fn none() -> Self {
        Self { bits: T::zero() }
    }

    pub fn from_flags<U: FlagBitmask<Storage = T> + Copy>(flags: &[U]) -> Self {
        let mut set = Self::none();
        set.add_many(flags);
        set
    }

    pub fn is_all(&self) -> bool {
        self.bits == !T::zero()
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, flags: &[U]) {
        for &flag in flags {
            self.add(flag);
        }
    }

    /// True if any bit is set in both sets.
    pub fn intersects(&self, other: &Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }
}

/// Declare a bit-indexed enum and implement `FlagBitmask` for it.
///
/// Variants take bit indices in declaration order.
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_bitmask_flags!(Sample, u16, { A, B, C });

    #[test]
    fn add_remove_has() {
        let mut set = BitmaskFlags::<u16>::none();
        set.add(Sample::A);
        set.add(Sample::C);
        assert_eq!(set.bits, 0b101);
        assert!(set.has(Sample::C));

        set.remove(Sample::A);
        assert!(!set.has(Sample::A));
        assert!(!set.has(Sample::B));
    }

    #[test]
    fn all_covers_unassigned_bits() {
        let all = BitmaskFlags::<u16>::all();
        assert!(all.is_all());
        assert!(all.has(Sample::B));
        assert!(!BitmaskFlags::from_flags(&[Sample::A, Sample::B, Sample::C]).is_all());
    }
}
