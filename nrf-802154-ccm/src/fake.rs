//! Host stand-in for the accelerator, its interrupt line and the domain bridge.

use core::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use crate::config::{Channels, Config};
use crate::hal::{CcmConfig, CcmPeripheral, Event, EventBridge, Interrupts, IrqLine, Task};
use crate::job_list::{unpack_u32x4_be, Job};
use crate::security::{KEY_SIZE, NONCE_SIZE};

pub(crate) const READY: u8 = 3;
pub(crate) const DISABLED: u8 = 4;
pub(crate) const TXREADY: u8 = 5;

pub(crate) const CONFIG: Config = Config {
    irq_priority: 2,
    channels: Channels {
        radio_ready: READY,
        radio_disabled: DISABLED,
        radio_txready: TXREADY,
    },
};

#[derive(Default)]
pub(crate) struct Hw {
    pub enabled: bool,
    pub mode: Option<CcmConfig>,
    pub key: [u32; 4],
    pub nonce: [u32; 4],
    pub in_jobs: Option<*const Job>,
    pub out_jobs: Option<*const Job>,
    pub adata_mask: u8,
    pub end: bool,
    pub error: bool,
    pub int_enabled: Interrupts,
    pub start_channel: Option<u8>,
    pub stop_channel: Option<u8>,
    pub running: bool,
    pub software_starts: usize,

    pub irq_priority: Option<u8>,
    pub irq_inits: usize,
    pub irq_enabled: bool,
    pub irq_pending: bool,

    /// Radio events only reach the accelerator through enabled bridge channels.
    pub bridged: bool,
    pub bridge_inits: usize,
    pub bridge_routes: Vec<u8>,
    pub bridge_enabled: u32,
}

impl Default for Interrupts {
    fn default() -> Self {
        Interrupts::empty()
    }
}

pub(crate) type Shared = Rc<RefCell<Hw>>;

pub(crate) fn hw() -> Shared {
    Rc::new(RefCell::new(Hw::default()))
}

pub(crate) fn bridged_hw() -> Shared {
    let hw = hw();
    hw.borrow_mut().bridged = true;
    hw
}

impl Hw {
    /// The radio publishes an event on `channel`.
    pub fn publish(&mut self, channel: u8) {
        if self.bridged && self.bridge_enabled & Channels::bit(channel) == 0 {
            return;
        }
        if !self.enabled {
            return;
        }
        if self.start_channel == Some(channel) {
            self.running = true;
        }
        if self.stop_channel == Some(channel) {
            self.running = false;
        }
    }

    /// Run a started transform to completion.
    ///
    /// Returns `false` if the accelerator was not running.
    pub fn complete(&mut self) -> bool {
        if !(self.enabled && self.running) {
            return false;
        }
        let (Some(input), Some(output), Some(mode)) = (self.in_jobs, self.out_jobs, self.mode) else {
            return false;
        };

        // SAFETY: the chains and the regions they describe are kept alive by the engine while enabled.
        let stream = unsafe { gather(input) };
        let alen = usize::from(u16::from_le_bytes([stream[0], stream[1]]));
        let mlen = usize::from(u16::from_le_bytes([stream[2], stream[3]]));
        let adata = &stream[4..4 + alen];
        let mdata = &stream[4 + alen..4 + alen + mlen];

        let key = unpack_u32x4_be(&self.key, KEY_SIZE);
        let nonce = unpack_u32x4_be(&self.nonce, NONCE_SIZE);
        let sealed = seal(&key, &nonce[..NONCE_SIZE], adata, mdata, mode.mac_length.bytes());

        let mut out = Vec::new();
        out.extend_from_slice(&(alen as u16).to_le_bytes());
        out.extend_from_slice(&(sealed.len() as u16).to_le_bytes());
        out.extend_from_slice(adata);
        out.extend_from_slice(&sealed);

        // SAFETY: as above, the output regions point into the engine's memory.
        unsafe { scatter(output, &out) };

        self.running = false;
        self.end = true;
        self.raise(Interrupts::END);
        true
    }

    /// The accelerator hits an internal error.
    pub fn fault(&mut self) {
        self.running = false;
        self.error = true;
        self.raise(Interrupts::ERROR);
    }

    fn raise(&mut self, source: Interrupts) {
        if self.int_enabled.contains(source) {
            self.irq_pending = true;
        }
    }
}

/// Deterministic stand-in for CCM*: keystream XOR followed by a folded tag.
pub(crate) fn seal(key: &[u8], nonce: &[u8], adata: &[u8], mdata: &[u8], mac: usize) -> Vec<u8> {
    let mut out: Vec<u8> = mdata
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()] ^ nonce[i % nonce.len()] ^ i as u8)
        .collect();
    let sum = adata
        .iter()
        .chain(mdata)
        .fold(0u8, |acc, b| acc.rotate_left(1) ^ b);
    out.extend((0..mac).map(|j| sum ^ key[j] ^ 0x5a ^ j as u8));
    out
}

unsafe fn gather(mut job: *const Job) -> Vec<u8> {
    let mut stream = Vec::new();
    loop {
        let entry = *job;
        if entry.is_terminator() {
            return stream;
        }
        stream.extend_from_slice(core::slice::from_raw_parts(entry.ptr(), entry.len()));
        job = job.add(1);
    }
}

unsafe fn scatter(mut job: *const Job, mut data: &[u8]) {
    loop {
        let entry = *job;
        if entry.is_terminator() {
            return;
        }
        let n = entry.len().min(data.len());
        core::ptr::copy_nonoverlapping(data.as_ptr(), entry.ptr().cast_mut(), n);
        data = &data[n..];
        job = job.add(1);
    }
}

pub(crate) struct FakeCcm(pub Shared);

impl CcmPeripheral for FakeCcm {
    fn enable(&mut self) {
        self.0.borrow_mut().enabled = true;
    }

    fn disable(&mut self) {
        let mut hw = self.0.borrow_mut();
        hw.enabled = false;
        hw.running = false;
    }

    fn configure(&mut self, config: &CcmConfig) {
        self.0.borrow_mut().mode = Some(*config);
    }

    fn set_key(&mut self, key: &[u32; 4]) {
        self.0.borrow_mut().key = *key;
    }

    fn set_nonce(&mut self, nonce: &[u32; 4]) {
        self.0.borrow_mut().nonce = *nonce;
    }

    fn set_in_jobs(&mut self, jobs: *const Job) {
        self.0.borrow_mut().in_jobs = Some(jobs);
    }

    fn set_out_jobs(&mut self, jobs: *const Job) {
        self.0.borrow_mut().out_jobs = Some(jobs);
    }

    fn set_adata_mask(&mut self, mask: u8) {
        self.0.borrow_mut().adata_mask = mask;
    }

    fn event_check(&self, event: Event) -> bool {
        let hw = self.0.borrow();
        match event {
            Event::End => hw.end,
            Event::Error => hw.error,
        }
    }

    fn event_clear(&mut self, event: Event) {
        let mut hw = self.0.borrow_mut();
        match event {
            Event::End => hw.end = false,
            Event::Error => hw.error = false,
        }
    }

    fn int_enable(&mut self, mask: Interrupts) {
        self.0.borrow_mut().int_enabled.insert(mask);
    }

    fn int_disable(&mut self, mask: Interrupts) {
        self.0.borrow_mut().int_enabled.remove(mask);
    }

    fn int_enabled(&self) -> Interrupts {
        self.0.borrow().int_enabled
    }

    fn subscribe_set(&mut self, task: Task, channel: u8) {
        let mut hw = self.0.borrow_mut();
        match task {
            Task::Start => hw.start_channel = Some(channel),
            Task::Stop => hw.stop_channel = Some(channel),
        }
    }

    fn subscribe_clear(&mut self, task: Task) {
        let mut hw = self.0.borrow_mut();
        match task {
            Task::Start => hw.start_channel = None,
            Task::Stop => hw.stop_channel = None,
        }
    }

    fn task_trigger(&mut self, task: Task) {
        let mut hw = self.0.borrow_mut();
        match task {
            Task::Start => {
                hw.software_starts += 1;
                if hw.enabled {
                    hw.running = true;
                }
            }
            Task::Stop => hw.running = false,
        }
    }
}

pub(crate) struct FakeIrq(pub Shared);

impl IrqLine for FakeIrq {
    fn init(&mut self, priority: u8) {
        let mut hw = self.0.borrow_mut();
        hw.irq_priority = Some(priority);
        hw.irq_inits += 1;
    }

    fn enable(&mut self) {
        self.0.borrow_mut().irq_enabled = true;
    }

    fn disable(&mut self) {
        self.0.borrow_mut().irq_enabled = false;
    }

    fn clear_pending(&mut self) {
        self.0.borrow_mut().irq_pending = false;
    }
}

pub(crate) struct FakeBridge(pub Shared);

impl EventBridge for FakeBridge {
    fn init(&mut self) {
        self.0.borrow_mut().bridge_inits += 1;
    }

    fn connect(&mut self, channel: u8) {
        let mut hw = self.0.borrow_mut();
        if !hw.bridge_routes.contains(&channel) {
            hw.bridge_routes.push(channel);
        }
    }

    fn enable_channels(&mut self, mask: u32) {
        self.0.borrow_mut().bridge_enabled |= mask;
    }

    fn disable_channels(&mut self, mask: u32) {
        self.0.borrow_mut().bridge_enabled &= !mask;
    }
}
