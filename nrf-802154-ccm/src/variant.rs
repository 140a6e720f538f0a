//! Accelerator flavours.
//!
//! Two generations of the CCM peripheral drive 802.15.4 frames. They share the transform logic and differ
//! only in job list tagging, the width of the output length field, how the start task is triggered and
//! whether radio events have to cross a domain bridge. A [`Variant`] captures those differences.

use crate::config::{Channels, Config};
use crate::hal::EventBridge;
use crate::job_list::{JobLayout, OutMlen};
use crate::work_buffer::Prefill;

/// What starts the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartTrigger {
    /// The START task is subscribed to this event channel.
    Event(u8),
    /// START is triggered by software from [`TransformEngine::start`](crate::TransformEngine::start).
    Software,
}

/// Flavour-specific behaviour of the accelerator.
pub trait Variant {
    /// Job list tags and shape.
    const LAYOUT: JobLayout;

    /// How the work buffer is seeded before a transform.
    fn prefill(&self) -> Prefill;

    /// What starts the transform.
    fn start_trigger(&self, channels: &Channels) -> StartTrigger;

    /// One-time setup before the first transform.
    fn init(&mut self) {}

    /// Route radio events to the accelerator.
    fn connect(&mut self, _config: &Config) {}

    /// Undo [`connect`](Self::connect). Must tolerate being called when nothing is connected.
    fn disconnect(&mut self, _config: &Config) {}
}

/// Accelerator sharing an event domain with the radio.
///
/// The radio READY event starts the transform and DISABLED stops it, without software on the hot path.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Autonomous;

impl Variant for Autonomous {
    const LAYOUT: JobLayout = JobLayout {
        tags: [0; 4],
        out_mlen: OutMlen::Split,
    };

    fn prefill(&self) -> Prefill {
        Prefill::Phr
    }

    fn start_trigger(&self, channels: &Channels) -> StartTrigger {
        StartTrigger::Event(channels.radio_ready)
    }
}

/// Accelerator in a different event domain from the radio, reached through `B`.
///
/// The radio DISABLED event is bridged to stop the transform. By default the transform is started in
/// software; [`Bridged::ps_compliant`] bridges TXREADY and lets it start the transform instead, which does
/// not support frames with information elements.
pub struct Bridged<B> {
    bridge: B,
    ps_compliant: bool,
}

impl<B: EventBridge> Bridged<B> {
    /// Software-started transforms.
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            ps_compliant: false,
        }
    }

    /// Transforms started by the bridged radio TXREADY event.
    pub fn ps_compliant(bridge: B) -> Self {
        Self {
            bridge,
            ps_compliant: true,
        }
    }
}

impl<B: EventBridge> Variant for Bridged<B> {
    const LAYOUT: JobLayout = JobLayout {
        tags: [11, 12, 13, 14],
        out_mlen: OutMlen::Single,
    };

    fn prefill(&self) -> Prefill {
        if self.ps_compliant {
            Prefill::Phr
        } else {
            Prefill::Header
        }
    }

    fn start_trigger(&self, channels: &Channels) -> StartTrigger {
        if self.ps_compliant {
            StartTrigger::Event(channels.radio_txready)
        } else {
            StartTrigger::Software
        }
    }

    fn init(&mut self) {
        self.bridge.init();
    }

    fn connect(&mut self, config: &Config) {
        let channels = &config.channels;
        let mut mask = Channels::bit(channels.radio_disabled);

        self.bridge.connect(channels.radio_disabled);
        if self.ps_compliant {
            self.bridge.connect(channels.radio_txready);
            mask |= Channels::bit(channels.radio_txready);
        }

        self.bridge.enable_channels(mask);
    }

    fn disconnect(&mut self, config: &Config) {
        // DISABLED stays routed, the radio driver shares it.
        self.bridge
            .disable_channels(Channels::bit(config.channels.radio_txready));
    }
}
