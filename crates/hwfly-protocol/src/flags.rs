//! FPGA status flags (0x26 0x0B)

use bitflags::bitflags;

bitflags! {
    /// Status register returned by the read-status-flags command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct StatusFlags: u8 {
        /// FPGA is still clocking out a command to the eMMC
        const BUSY_SENDING       = 1 << 0;
        /// Last glitch attempt hit
        const GLITCH_SUCCESS     = 1 << 1;
        /// Last glitch attempt timed out
        const GLITCH_TIMEOUT     = 1 << 2;
        const UNKNOWN1           = 1 << 3;
        /// Loader payload received from the host
        const LOADER_DATA_RCVD   = 1 << 4;
        const UNKNOWN2           = 1 << 5;
        /// Glitch delta-time has been captured
        const GLITCH_DT_CAPTURED = 1 << 6;
        const UNKNOWN3           = 1 << 7;
    }
}

/// Flag labels in bit order: (mask, label, short label)
pub const FLAG_LABELS: &[(StatusFlags, &str, &str)] = &[
    (StatusFlags::BUSY_SENDING, "BUSY_SENDING", "bs"),
    (StatusFlags::GLITCH_SUCCESS, "GLITCH_SUCCESS", "g+"),
    (StatusFlags::GLITCH_TIMEOUT, "GLITCH_TIMEOUT", "g-"),
    (StatusFlags::UNKNOWN1, "UNKNOWN1", "u1"),
    (StatusFlags::LOADER_DATA_RCVD, "LOADER_DATA_RCVD", "ld"),
    (StatusFlags::UNKNOWN2, "UNKNOWN2", "u2"),
    (StatusFlags::GLITCH_DT_CAPTURED, "GLITCH_DT_CAPTURED", "dc"),
    (StatusFlags::UNKNOWN3, "UNKNOWN3", "u3"),
];

impl StatusFlags {
    /// Labels of the set flags joined with `", "`, or `NONE`
    pub fn describe(&self) -> String {
        self.join(|&(_, label, _)| label, ", ", "NONE")
    }

    /// Short labels of the set flags joined with `","`, or `_`
    pub fn describe_short(&self) -> String {
        self.join(|&(_, _, short)| short, ",", "_")
    }

    fn join(
        &self,
        pick: impl Fn(&(StatusFlags, &'static str, &'static str)) -> &'static str,
        separator: &str,
        none: &str,
    ) -> String {
        let parts: Vec<&str> = FLAG_LABELS
            .iter()
            .filter(|(mask, _, _)| self.contains(*mask))
            .map(pick)
            .collect();
        if parts.is_empty() {
            none.to_string()
        } else {
            parts.join(separator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusFlags, FLAG_LABELS};
    use proptest::prelude::*;

    #[test]
    fn test_no_flags() {
        let flags = StatusFlags::from_bits_retain(0x00);
        assert_eq!(flags.describe(), "NONE");
        assert_eq!(flags.describe_short(), "_");
    }

    #[test]
    fn test_all_flags_in_bit_order() {
        let flags = StatusFlags::from_bits_retain(0xFF);
        assert_eq!(
            flags.describe(),
            "BUSY_SENDING, GLITCH_SUCCESS, GLITCH_TIMEOUT, UNKNOWN1, \
             LOADER_DATA_RCVD, UNKNOWN2, GLITCH_DT_CAPTURED, UNKNOWN3"
        );
        assert_eq!(flags.describe_short(), "bs,g+,g-,u1,ld,u2,dc,u3");
    }

    #[test]
    fn test_mixed_flags() {
        let flags = StatusFlags::GLITCH_SUCCESS | StatusFlags::GLITCH_DT_CAPTURED;
        assert_eq!(flags.describe(), "GLITCH_SUCCESS, GLITCH_DT_CAPTURED");
        assert_eq!(flags.describe_short(), "g+,dc");
    }

    #[test]
    fn test_table_covers_every_bit_once() {
        let mut seen = 0u8;
        for (mask, _, _) in FLAG_LABELS {
            assert_eq!(mask.bits().count_ones(), 1);
            assert_eq!(seen & mask.bits(), 0);
            seen |= mask.bits();
        }
        assert_eq!(seen, 0xFF);
    }

    proptest! {
        #[test]
        fn label_count_matches_bit_count(bits: u8) {
            let flags = StatusFlags::from_bits_retain(bits);
            let described = flags.describe();
            let count = if bits == 0 { 1 } else { bits.count_ones() as usize };
            prop_assert_eq!(described.split(", ").count(), count);
        }
    }
}
