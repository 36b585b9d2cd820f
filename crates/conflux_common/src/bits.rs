//! Bit-width arithmetic shared by the netlist, FSM and FIFO sizing code.

/// Number of bits needed to represent `n`; `bit_length(0) == 0`.
pub fn bit_length(n: u64) -> u32 {
    u64::BITS - n.leading_zeros()
}

/// Ceiling of log2 of `n`, with `clog2(0) == clog2(1) == 0`.
pub fn clog2(n: u64) -> u32 {
    bit_length(n.saturating_sub(1))
}

/// Address width of a FIFO of the given depth. Never narrower than one bit.
pub fn addr_width(depth: u32) -> u32 {
    clog2(u64::from(depth)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_length_small_values() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(2), 2);
        assert_eq!(bit_length(7), 3);
        assert_eq!(bit_length(8), 4);
    }

    #[test]
    fn clog2_rounds_up() {
        assert_eq!(clog2(0), 0);
        assert_eq!(clog2(1), 0);
        assert_eq!(clog2(2), 1);
        assert_eq!(clog2(3), 2);
        assert_eq!(clog2(8), 3);
        assert_eq!(clog2(9), 4);
    }

    #[test]
    fn fifo_addr_width() {
        assert_eq!(addr_width(1), 1);
        assert_eq!(addr_width(2), 1);
        assert_eq!(addr_width(8), 3);
        assert_eq!(addr_width(9), 4);
    }
}
