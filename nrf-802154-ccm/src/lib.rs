//! Inline AES-CCM* for outgoing IEEE 802.15.4 frames.
//!
//! This crate drives the CCM accelerator of nRF54 series chips so that a frame is encrypted and
//! authenticated while the radio ramps up, without a software crypto pass. The MAC layer hands a frame and
//! its key material to a [`TransformEngine`]; the accelerator fills a work buffer through DMA, started and
//! stopped by the radio's own events, and the radio transmits from that buffer.
//!
//! Register access stays outside of this crate: implement [`hal::CcmPeripheral`], [`hal::IrqLine`] and,
//! for accelerators in another power domain than the radio, [`hal::EventBridge`].
//!
//! # Example
//!
//! ```rust,ignore
//! use nrf_802154_ccm::variant::Autonomous;
//! use nrf_802154_ccm::{Accelerator, Channels, Config, Mem, SharedEngine, TransformEngine, TransformRequest};
//! use static_cell::StaticCell;
//!
//! static ENGINE: SharedEngine<'static, Autonomous, Ccm, CcmIrq> = SharedEngine::new();
//! static MEM: StaticCell<Mem> = StaticCell::new();
//!
//! #[interrupt]
//! fn CCM00() {
//!     ENGINE.on_interrupt();
//! }
//!
//! let config = Config {
//!     irq_priority: 1,
//!     channels: Channels {
//!         radio_ready: 10,
//!         radio_disabled: 11,
//!         radio_txready: 12,
//!     },
//! };
//! let accelerator = Accelerator::new(Autonomous, Ccm::new(p.CCM00), CcmIrq, config);
//! ENGINE.install(TransformEngine::new(accelerator, MEM.init(Mem::new())));
//!
//! // `frame` is a `&'static [u8]` laid out as [PHR][MHR][aux security header][payload][MIC][FCS]
//! let request = TransformRequest::new(frame, key, nonce, security_level)
//!     .with_auth_data(&frame[1..header_end])
//!     .with_plain_text(&frame[header_end..payload_end]);
//! ENGINE.with(|engine| engine.prepare(&request)).unwrap()?;
//!
//! // ... program the radio, then right before triggering TXEN:
//! ENGINE.with(|engine| engine.start(frame));
//!
//! if ENGINE.wait_secured().await {
//!     ENGINE.with(|engine| radio.transmit(engine.work_buffer().get(frame)));
//! }
//! ```

#![no_std]
#![deny(missing_docs)]

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod accelerator;
mod config;
mod error;
#[cfg(test)]
mod fake;
pub mod hal;
mod job_list;
pub mod security;
mod shared;
mod transform;
pub mod variant;
mod work_buffer;

pub use accelerator::*;
pub use config::*;
pub use error::*;
pub use job_list::*;
pub use shared::*;
pub use transform::*;
pub use work_buffer::*;
