/// Event fabric channels the radio publishes on.
///
/// The numbers are DPPI channel indices shared with the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channels {
    /// Radio READY event.
    pub radio_ready: u8,
    /// Radio DISABLED event.
    pub radio_disabled: u8,
    /// Radio TXREADY event.
    pub radio_txready: u8,
}

impl Channels {
    /// Channel enable mask bit for `channel`, or 0 if it is out of range.
    pub(crate) fn bit(channel: u8) -> u32 {
        1u32.checked_shl(u32::from(channel)).unwrap_or(0)
    }
}

/// Accelerator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Priority of the accelerator interrupt.
    pub irq_priority: u8,
    /// Radio event channels.
    pub channels: Channels,
}
