//! Macros shared by the addressing-mode and instruction layers.

/// Join two bytes into a little-endian address.
#[macro_export]
macro_rules! bytes_to_addr {
    ($fst: expr, $snd: expr) => {{
        (u16::from($snd) << 8) | u16::from($fst)
    }};
}

/// A bus access made by the executing instruction. Every such access costs
/// one cycle; accesses the real chip does not make (raw stack traffic, the
/// reset sequence) go straight to the memory object instead.
#[macro_export]
macro_rules! bus {
    (read $state: expr, $mem: expr, $addr: expr) => {{
        $state.cycles += 1;
        $mem.read($addr)
    }};
    (write $state: expr, $mem: expr, $addr: expr, $data: expr) => {{
        $state.cycles += 1;
        $mem.write($addr, $data)
    }};
}

/// Charge internal (non-bus) cycles.
#[macro_export]
macro_rules! adj_cycles {
    ($state: expr, $delta: expr) => {{
        $state.cycles = $state.cycles.wrapping_add($delta as u64)
    }};
}
