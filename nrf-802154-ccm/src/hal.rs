//! Hardware seams of the CCM accelerator.
//!
//! The transform never touches registers directly. A board or chip crate implements these traits for the
//! accelerator instance, its interrupt line and, on chips where the radio and the accelerator sit in
//! different power domains, the bridge between their event fabrics.

use bitflags::bitflags;

use crate::job_list::Job;
use crate::security::MacLength;

/// Contents of the accelerator MODE register.
///
/// The accelerator always runs as an 802.15.4 encryptor at 250 kbit/s; implementations write those fields
/// as constants and take the MAC length from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CcmConfig {
    /// MAC length.
    pub mac_length: MacLength,
}

impl CcmConfig {
    /// The configuration for a frame with a `mac_length` MIC.
    pub const fn ieee802154(mac_length: MacLength) -> Self {
        Self { mac_length }
    }
}

/// Accelerator event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The transform finished.
    End,
    /// The accelerator hit an internal error.
    Error,
}

/// Accelerator task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Task {
    /// Start processing the job lists.
    Start,
    /// Stop processing.
    Stop,
}

bitflags! {
    /// Accelerator interrupt sources.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Interrupts: u32 {
        /// END event.
        const END = 1 << 1;
        /// ERROR event.
        const ERROR = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Interrupts {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Interrupts({=u32:#x})", self.bits())
    }
}

/// Register interface of a CCM accelerator instance.
pub trait CcmPeripheral {
    /// Power up the peripheral.
    fn enable(&mut self);
    /// Power down the peripheral, abandoning any transform in progress.
    fn disable(&mut self);
    /// Write the MODE register.
    fn configure(&mut self, config: &CcmConfig);
    /// Load the key, most significant word last.
    fn set_key(&mut self, key: &[u32; 4]);
    /// Load the nonce, most significant word last.
    fn set_nonce(&mut self, nonce: &[u32; 4]);
    /// Point the input DMA at a terminated job list.
    fn set_in_jobs(&mut self, jobs: *const Job);
    /// Point the output DMA at a terminated job list.
    fn set_out_jobs(&mut self, jobs: *const Job);
    /// Select which associated-data bits are authenticated.
    fn set_adata_mask(&mut self, mask: u8);
    /// Whether `event` is set.
    fn event_check(&self, event: Event) -> bool;
    /// Clear `event`.
    fn event_clear(&mut self, event: Event);
    /// Enable the interrupt sources in `mask`.
    fn int_enable(&mut self, mask: Interrupts);
    /// Disable the interrupt sources in `mask`.
    fn int_disable(&mut self, mask: Interrupts);
    /// Currently enabled interrupt sources.
    fn int_enabled(&self) -> Interrupts;
    /// Let `channel` trigger `task`.
    fn subscribe_set(&mut self, task: Task, channel: u8);
    /// Detach `task` from the event fabric.
    fn subscribe_clear(&mut self, task: Task);
    /// Trigger `task` from software.
    fn task_trigger(&mut self, task: Task);
}

/// The interrupt line of the accelerator.
///
/// The handler bound to this line must call [`TransformEngine::on_interrupt`](crate::TransformEngine::on_interrupt),
/// directly or through [`SharedEngine::on_interrupt`](crate::SharedEngine::on_interrupt).
pub trait IrqLine {
    /// Register the handler and set its priority. Called once.
    fn init(&mut self, priority: u8);
    /// Unmask the line.
    fn enable(&mut self);
    /// Mask the line.
    fn disable(&mut self);
    /// Drop a pending request.
    fn clear_pending(&mut self);
}

/// Bridge carrying radio events into the accelerator's event domain.
pub trait EventBridge {
    /// One-time domain setup, run before the first transform.
    fn init(&mut self) {}
    /// Forward `channel` from the radio domain to the accelerator domain.
    fn connect(&mut self, channel: u8);
    /// Enable the accelerator-domain channels in `mask`.
    fn enable_channels(&mut self, mask: u32);
    /// Disable the accelerator-domain channels in `mask`.
    fn disable_channels(&mut self, mask: u32);
}
