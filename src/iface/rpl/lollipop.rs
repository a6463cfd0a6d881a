//! Sequence counters of RPL, see [RFC 6550 § 7.2]. Values from 128 and greater are used as a
//! linear region to bootstrap a counter after a restart. Values below 128 form the circular
//! region. Two values on opposite sides of the tip are ordered by their distance: when the
//! distance across the wrap is within the sequence window, the value in the linear region is the
//! older one.
//!
//! Counters are incremented modulo 256, so a counter always moves forward through both regions.
//!
//! [RFC 6550 § 7.2]: https://datatracker.ietf.org/doc/html/rfc6550#section-7.2

use core::cmp::Ordering;

use super::consts::{SEQUENCE_TIP, SEQUENCE_WINDOW};

/// Compare two 8-bit sequence numbers using lollipop arithmetic.
///
/// `compare_sequence(x, x.wrapping_add(1))` is [Ordering::Less] for every `x`.
pub fn compare_sequence(a: u8, b: u8) -> Ordering {
    let (a16, b16) = (a as u16, b as u16);
    let window = SEQUENCE_WINDOW as u16;

    if a >= SEQUENCE_TIP && b < SEQUENCE_TIP {
        if 256 + b16 - a16 <= window {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    } else if b >= SEQUENCE_TIP && a < SEQUENCE_TIP {
        if 256 + a16 - b16 <= window {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    } else {
        a.cmp(&b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceCounter(u8);

impl Default for SequenceCounter {
    fn default() -> Self {
        // RFC6550 7.2 recommends 240 (256 - SEQUENCE_WINDOW) as the initialization value of the
        // counter.
        Self(240)
    }
}

impl SequenceCounter {
    /// Create a new sequence counter.
    ///
    /// Use `Self::default()` when a new sequence counter needs to be created with a value that is
    /// recommended in RFC6550 7.2, being 240.
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Return the value of the sequence counter.
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Increment the sequence counter, wrapping from 255 back to 0.
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

// The relation is not transitive across the tip, hence no `Ord`.
impl PartialOrd for SequenceCounter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare_sequence(self.0, other.0))
    }
}
