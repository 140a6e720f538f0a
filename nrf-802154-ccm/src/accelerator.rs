use core::sync::atomic::{compiler_fence, Ordering};

use crate::config::Config;
use crate::hal::{CcmConfig, CcmPeripheral, Event, Interrupts, IrqLine, Task};
use crate::job_list::JobLists;
use crate::security::MacLength;
use crate::variant::{StartTrigger, Variant};
use crate::work_buffer::{Prefill, WorkBuffer};

/// Every associated-data bit is authenticated.
const ADATA_MASK: u8 = 0xff;

/// What the interrupt handler found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Outcome {
    /// The accelerator raised its ERROR event.
    Fault,
    /// The transform ended; the work buffer is secured and the accelerator disabled.
    Completed,
    /// Nothing enabled was pending.
    Spurious,
}

/// Owner of the CCM peripheral and its interrupt line.
pub struct Accelerator<V: Variant, P: CcmPeripheral, I: IrqLine> {
    variant: V,
    ccm: P,
    irq: I,
    config: Config,
    initialized: bool,
}

impl<V: Variant, P: CcmPeripheral, I: IrqLine> Accelerator<V, P, I> {
    /// Take ownership of the accelerator.
    ///
    /// The peripheral is left disabled and detached from the event fabric.
    pub fn new(variant: V, ccm: P, irq: I, config: Config) -> Self {
        let mut this = Self {
            variant,
            ccm,
            irq,
            config,
            initialized: false,
        };
        this.disable();
        this
    }

    pub(crate) fn prefill(&self) -> Prefill {
        self.variant.prefill()
    }

    /// Program a transform described by `jobs` and arm it on the radio events.
    pub(crate) fn configure(&mut self, jobs: &JobLists, key: &[u32; 4], nonce: &[u32; 4], mac_length: MacLength) {
        if !self.initialized {
            self.variant.init();
            self.irq.init(self.config.irq_priority);
            self.initialized = true;
        }

        self.irq.clear_pending();
        self.irq.enable();

        // The job lists must be in memory before the accelerator can be started.
        compiler_fence(Ordering::Release);

        self.ccm.enable();
        self.ccm.configure(&CcmConfig::ieee802154(mac_length));
        self.ccm.set_key(key);
        self.ccm.set_nonce(nonce);
        self.ccm.set_in_jobs(jobs.input_ptr());
        self.ccm.set_out_jobs(jobs.output_ptr());
        self.ccm.event_clear(Event::Error);
        self.ccm.event_clear(Event::End);
        self.ccm.int_enable(Interrupts::ERROR | Interrupts::END);
        self.ccm.set_adata_mask(ADATA_MASK);

        self.variant.connect(&self.config);
        if let StartTrigger::Event(channel) = self.variant.start_trigger(&self.config.channels) {
            self.ccm.subscribe_set(Task::Start, channel);
        }
        self.ccm.subscribe_set(Task::Stop, self.config.channels.radio_disabled);
    }

    /// Kick off an armed transform if the flavour has no hardware start trigger.
    pub(crate) fn start(&mut self) {
        if self.variant.start_trigger(&self.config.channels) == StartTrigger::Software {
            self.ccm.task_trigger(Task::Start);
        }
    }

    /// Detach from the event fabric and power down.
    ///
    /// Everything is cleared unconditionally, so this is safe to call in any state and more than once.
    pub fn disable(&mut self) {
        self.irq.disable();
        self.variant.disconnect(&self.config);
        self.ccm.subscribe_clear(Task::Start);
        self.ccm.subscribe_clear(Task::Stop);
        self.ccm.int_disable(Interrupts::ERROR | Interrupts::END);
        self.ccm.disable();
    }

    /// Service the accelerator interrupt.
    ///
    /// Events are only processed while their interrupt is enabled, so a completion racing [`disable`](Self::disable)
    /// is dropped.
    pub(crate) fn on_interrupt(&mut self, work: &mut WorkBuffer) -> Outcome {
        let enabled = self.ccm.int_enabled();

        if enabled.contains(Interrupts::ERROR) && self.ccm.event_check(Event::Error) {
            self.ccm.event_clear(Event::Error);
            return Outcome::Fault;
        }

        if enabled.contains(Interrupts::END) && self.ccm.event_check(Event::End) {
            self.ccm.event_clear(Event::End);
            compiler_fence(Ordering::Acquire);

            // Secured must be visible before the accelerator is seen disabled.
            work.mark_secured();
            self.disable();
            return Outcome::Completed;
        }

        Outcome::Spurious
    }
}
