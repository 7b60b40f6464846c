//! Reversible integer obfuscation for identifiers.
//!
//! Multiplies by an odd constant modulo 2^63 and XORs the result with a
//! fixed key, so sequential IDs come out as opaque values that are cheap
//! to recover. This hides ordering from casual inspection; it is not
//! encryption.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};

/// Largest value the codec can carry (63 usable bits).
pub const ID_MASK: u64 = i64::MAX as u64;

/// Modulus for the multiplicative inverse (2^63).
const MODULUS: u64 = ID_MASK + 1;

/// Obfuscates and recovers 63-bit integers.
#[derive(Clone)]
pub struct Coder {
    prime: u64,
    prime_inv: u64,
    xor: u64,
}

impl Coder {
    /// Build a codec from an odd multiplier and an XOR key.
    ///
    /// Fails when `prime` has no multiplicative inverse modulo 2^63,
    /// which is the case for every even value.
    pub fn new(prime: i64, xor: i64) -> Result<Self> {
        let prime_inv =
            mod_inverse(prime as u64, MODULUS).ok_or(Error::NotInvertible(prime))?;
        Ok(Self {
            prime: prime as u64,
            prime_inv,
            xor: xor as u64,
        })
    }

    /// Map a plain value to its obfuscated form.
    ///
    /// Only the low 63 bits participate; nonnegative values round-trip
    /// exactly through [`show`](Self::show).
    #[inline]
    pub fn hide(&self, plain: i64) -> i64 {
        let hidden = ((plain as u64).wrapping_mul(self.prime) & ID_MASK) ^ self.xor;
        hidden as i64
    }

    /// Recover the plain value from its obfuscated form.
    #[inline]
    pub fn show(&self, hidden: i64) -> i64 {
        let shown = ((hidden as u64) ^ self.xor).wrapping_mul(self.prime_inv) & ID_MASK;
        shown as i64
    }
}

// Key material stays out of logs.
impl fmt::Debug for Coder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coder").finish_non_exhaustive()
    }
}

/// A plain integer paired with the codec that hides it in JSON.
///
/// Serializes as the obfuscated value in a decimal string, so 63-bit IDs
/// also survive JavaScript consumers untouched.
#[derive(Clone, Copy)]
pub struct ObfInt<'a> {
    value: i64,
    coder: &'a Coder,
}

impl<'a> ObfInt<'a> {
    /// Wrap a plain value.
    pub fn new(value: i64, coder: &'a Coder) -> Self {
        Self { value, coder }
    }

    /// Recover the wrapper from an obfuscated value.
    pub fn from_hidden(hidden: i64, coder: &'a Coder) -> Self {
        Self {
            value: coder.show(hidden),
            coder,
        }
    }

    /// The plain value.
    pub fn as_i64(&self) -> i64 {
        self.value
    }

    /// The obfuscated form.
    pub fn hide(&self) -> i64 {
        self.coder.hide(self.value)
    }
}

impl fmt::Debug for ObfInt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObfInt")
            .field("hidden", &self.hide())
            .finish()
    }
}

impl Serialize for ObfInt<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.hide())
    }
}

/// Multiplicative inverse of `a` modulo `m`, when it exists.
///
/// `m` must divide 2^64 so that the wrapped Bezout coefficient reduces
/// correctly; the single caller passes 2^63.
fn mod_inverse(a: u64, m: u64) -> Option<u64> {
    let (x, g) = extended_gcd(a, m);
    if g == 1 {
        Some(x % m)
    } else {
        None
    }
}

/// Extended GCD over u64, tracking the first Bezout coefficient modulo
/// 2^64 through wrapping arithmetic.
fn extended_gcd(mut a: u64, mut b: u64) -> (u64, u64) {
    let (mut x, mut x1) = (1u64, 0u64);
    while b != 0 {
        let q = a / b;
        let r = a % b;
        let x2 = x.wrapping_sub(q.wrapping_mul(x1));
        x = x1;
        x1 = x2;
        a = b;
        b = r;
    }
    (x, a)
}
