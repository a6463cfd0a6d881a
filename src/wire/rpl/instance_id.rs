/// An RPL Instance ID, as carried in the first byte of every control message.
///
/// Bit 7 distinguishes global instances from local ones.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstanceId {
    Global(u8),
    Local(u8),
}

impl From<u8> for InstanceId {
    fn from(val: u8) -> Self {
        const MASK: u8 = 0b0111_1111;

        if (val >> 7) & 0b1 == 0b0 {
            Self::Global(val & MASK)
        } else {
            Self::Local(val & MASK)
        }
    }
}

impl From<InstanceId> for u8 {
    fn from(val: InstanceId) -> Self {
        match val {
            InstanceId::Global(val) => val & 0b0111_1111,
            InstanceId::Local(val) => 0b1000_0000 | val,
        }
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::Global(0)
    }
}

impl core::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Global(id) => write!(f, "G{id}"),
            Self::Local(id) => write!(f, "L{id}"),
        }
    }
}

impl InstanceId {
    /// Return the real part of the ID.
    pub fn id(&self) -> u8 {
        match self {
            Self::Global(val) => *val,
            Self::Local(val) => *val,
        }
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, InstanceId::Local(_))
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self, InstanceId::Global(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_and_local() {
        assert_eq!(InstanceId::from(0x1e), InstanceId::Global(0x1e));
        assert_eq!(InstanceId::from(0x81), InstanceId::Local(0x01));
        assert!(InstanceId::from(0x7f).is_global());
        assert!(InstanceId::from(0x80).is_local());
    }

    #[test]
    fn byte_value_survives_conversion() {
        for raw in [0x00u8, 0x01, 0x1e, 0x7f, 0x80, 0xc3, 0xff] {
            assert_eq!(u8::from(InstanceId::from(raw)), raw);
        }
    }
}
