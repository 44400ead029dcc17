use std::fmt;

/// Integer identifying a method or variant name for dynamic dispatch.
///
/// Derived from the name alone, so equal names give equal selectors within a
/// process. Not guaranteed collision-free and not meant to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub i32);

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hashes a variant or method name into a [`Selector`].
///
/// `accu = 223 * accu + byte` over the raw bytes, reduced to 31 bits, then
/// sign-extended from bit 30 so the result is identical on every word size.
pub fn hash_variant(name: &[u8]) -> Selector {
    let mut accu: u64 = 0;
    for &byte in name {
        accu = accu.wrapping_mul(223).wrapping_add(u64::from(byte));
    }
    let accu = (accu & 0x7FFF_FFFF) as i64;
    let signed = if accu > 0x3FFF_FFFF {
        accu - (1 << 31)
    } else {
        accu
    };
    Selector(signed as i32)
}
