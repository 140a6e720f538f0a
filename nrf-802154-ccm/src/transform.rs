use crate::accelerator::{Accelerator, Outcome};
use crate::hal::{CcmPeripheral, IrqLine};
use crate::job_list::{pack_u32x4_be, JobLists};
use crate::security::{MacLength, SecurityLevel, KEY_SIZE, MAX_PACKET_SIZE, NONCE_SIZE, PHR_OFFSET, PHR_SIZE};
use crate::variant::Variant;
use crate::work_buffer::WorkBuffer;
use crate::Error;

/// One frame to secure.
///
/// `raw_frame` is `[PHR][PSDU]`. The associated data and the plaintext usually point into the PSDU, but
/// any memory outliving the engine will do. A region may be `None` only if its length is zero.
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    /// The frame as it would be handed to the radio.
    pub raw_frame: &'a [u8],
    /// Authenticated, unencrypted data.
    pub auth_data: Option<&'a [u8]>,
    /// Number of bytes of `auth_data` to authenticate.
    pub auth_data_len: usize,
    /// Data to encrypt.
    pub plain_text: Option<&'a [u8]>,
    /// Number of bytes of `plain_text` to encrypt.
    pub plain_text_len: usize,
    /// CCM* key.
    pub key: [u8; KEY_SIZE],
    /// CCM* nonce.
    pub nonce: [u8; NONCE_SIZE],
    /// Security level of the frame, see [`SecurityLevel`].
    pub mic_level: u8,
}

impl<'a> TransformRequest<'a> {
    /// A request with neither associated data nor plaintext.
    pub fn new(raw_frame: &'a [u8], key: [u8; KEY_SIZE], nonce: [u8; NONCE_SIZE], mic_level: u8) -> Self {
        Self {
            raw_frame,
            auth_data: None,
            auth_data_len: 0,
            plain_text: None,
            plain_text_len: 0,
            key,
            nonce,
            mic_level,
        }
    }

    /// Authenticate all of `data`.
    pub fn with_auth_data(self, data: &'a [u8]) -> Self {
        Self {
            auth_data: Some(data),
            auth_data_len: data.len(),
            ..self
        }
    }

    /// Encrypt all of `data`.
    pub fn with_plain_text(self, data: &'a [u8]) -> Self {
        Self {
            plain_text: Some(data),
            plain_text_len: data.len(),
            ..self
        }
    }

    fn validate(&self) -> Result<Checked<'a>, Error> {
        let psdu_len = *self.raw_frame.get(PHR_OFFSET).ok_or(Error::MissingFrame)?;
        let auth = region(self.auth_data, self.auth_data_len).ok_or(Error::MissingAuthData)??;
        let plain = region(self.plain_text, self.plain_text_len).ok_or(Error::MissingPlainText)??;

        let mac = SecurityLevel::try_from(self.mic_level)?
            .mac_length()
            .ok_or(Error::UnsupportedSecurityLevel(self.mic_level))?;

        let psdu_len = usize::from(psdu_len);
        if psdu_len > MAX_PACKET_SIZE {
            return Err(Error::FrameTooLong);
        }

        let plain_text_offset = match self.auth_data {
            Some(_) => PHR_SIZE + auth.len(),
            None => PHR_SIZE + psdu_len,
        };
        // The secured frame handed to the radio ends at the PSDU length, which also bounds the work buffer.
        if plain_text_offset + plain.len() + mac.bytes() > PHR_SIZE + psdu_len {
            return Err(Error::RegionOutsideFrame);
        }

        Ok(Checked {
            auth,
            plain,
            mac,
            plain_text_offset,
        })
    }
}

/// `None` if a non-empty region is missing.
fn region(data: Option<&[u8]>, len: usize) -> Option<Result<&[u8], Error>> {
    let empty: &[u8] = &[];
    match data {
        Some(data) => Some(data.get(..len).ok_or(Error::RegionTooShort)),
        None if len == 0 => Some(Ok(empty)),
        None => None,
    }
}

struct Checked<'a> {
    auth: &'a [u8],
    plain: &'a [u8],
    mac: MacLength,
    plain_text_offset: usize,
}

/// Lifecycle of the accelerator as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcceleratorState {
    /// Nothing in flight.
    Idle,
    /// A request was accepted and the hardware is being programmed.
    Configuring,
    /// Waiting for the start trigger.
    Armed,
    /// The transform was started.
    Running,
    /// The work buffer holds the secured frame.
    Completed,
    /// The accelerator faulted.
    Error,
}

/// Memory the accelerator reads and writes through DMA.
///
/// It has to stay put for as long as a transform may be in flight, so the engine borrows it instead of
/// owning it. Typically a `static`:
///
/// ```rust,ignore
/// static MEM: StaticCell<Mem> = StaticCell::new();
/// let mem = MEM.init(Mem::new());
/// ```
pub struct Mem {
    work: WorkBuffer,
    jobs: JobLists,
}

impl Mem {
    /// Create zeroed memory.
    pub const fn new() -> Self {
        Self {
            work: WorkBuffer::new(),
            jobs: JobLists::new(),
        }
    }
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

/// Inline CCM* transform of outgoing 802.15.4 frames.
///
/// The MAC layer calls [`prepare`](Self::prepare) with a frame, [`start`](Self::start) when it hands the
/// frame to the radio and finally reads the secured frame from [`work_buffer`](Self::work_buffer). The
/// accelerator interrupt handler must call [`on_interrupt`](Self::on_interrupt).
///
/// Frames passed to `prepare` are borrowed for `'d`, the lifetime of the engine itself, so the accelerator
/// can never read freed memory.
pub struct TransformEngine<'d, V: Variant, P: CcmPeripheral, I: IrqLine> {
    accelerator: Accelerator<V, P, I>,
    mem: &'d mut Mem,
    state: AcceleratorState,
}

impl<'d, V: Variant, P: CcmPeripheral, I: IrqLine> TransformEngine<'d, V, P, I> {
    /// Create an idle engine.
    pub fn new(accelerator: Accelerator<V, P, I>, mem: &'d mut Mem) -> Self {
        mem.work.reset();
        Self {
            accelerator,
            mem,
            state: AcceleratorState::Idle,
        }
    }

    /// Validate `request`, stage it in the work buffer and arm the accelerator.
    ///
    /// On error nothing was touched: the work buffer, the job lists and the hardware are as before.
    pub fn prepare(&mut self, request: &TransformRequest<'d>) -> Result<(), Error> {
        match self.state {
            AcceleratorState::Configuring | AcceleratorState::Armed | AcceleratorState::Running => {
                debug!("ccm: prepare while {:?}", self.state);
                return Err(Error::Busy);
            }
            AcceleratorState::Error => return Err(Error::Faulted),
            AcceleratorState::Idle | AcceleratorState::Completed => {}
        }

        let checked = request.validate().inspect_err(|err| {
            debug!("ccm: request rejected: {:?}", err);
        })?;

        self.state = AcceleratorState::Configuring;

        let out = self
            .mem
            .work
            .acquire(request.raw_frame, checked.plain_text_offset, self.accelerator.prefill());
        self.mem
            .jobs
            .build(&V::LAYOUT, checked.auth, checked.plain, out, checked.mac.bytes());
        self.accelerator.configure(
            &self.mem.jobs,
            &pack_u32x4_be(&request.key),
            &pack_u32x4_be(&request.nonce),
            checked.mac,
        );

        self.state = AcceleratorState::Armed;
        trace!(
            "ccm: armed, {} bytes at offset {}",
            checked.plain.len() + checked.mac.bytes(),
            checked.plain_text_offset
        );
        Ok(())
    }

    /// The radio is about to transmit `frame`.
    ///
    /// Starts the accelerator on flavours without a hardware start trigger. Calling it for a frame that is
    /// not armed does nothing.
    pub fn start(&mut self, frame: &[u8]) {
        if self.state != AcceleratorState::Armed || !self.mem.work.is_enabled_for(frame) {
            warn!("ccm: start while {:?}", self.state);
            return;
        }

        self.accelerator.start();
        self.state = AcceleratorState::Running;
    }

    /// Give up on the transform of `frame`.
    ///
    /// Always disables the accelerator and returns to [`AcceleratorState::Idle`], whatever the state and
    /// frame. A completion still pending is discarded.
    pub fn abort(&mut self, frame: &[u8]) {
        trace!(
            "ccm: abort while {:?}, own frame: {}",
            self.state,
            self.mem.work.is_enabled_for(frame)
        );
        self.accelerator.disable();
        self.state = AcceleratorState::Idle;
    }

    /// Return to [`AcceleratorState::Idle`] and detach the work buffer from its frame.
    pub fn reset(&mut self) {
        trace!("ccm: reset");
        self.accelerator.disable();
        self.mem.work.reset();
        self.state = AcceleratorState::Idle;
    }

    /// Accelerator interrupt handler.
    ///
    /// # Panics
    ///
    /// If the accelerator reports an error.
    pub fn on_interrupt(&mut self) {
        match self.accelerator.on_interrupt(&mut self.mem.work) {
            Outcome::Completed => {
                trace!("ccm: transform complete");
                self.state = AcceleratorState::Completed;
            }
            Outcome::Fault => {
                self.state = AcceleratorState::Error;
                panic!("CCM accelerator error");
            }
            Outcome::Spurious => trace!("ccm: spurious interrupt"),
        }
    }

    /// Current state.
    pub fn state(&self) -> AcceleratorState {
        self.state
    }

    /// The work buffer, holding the secured frame once [`WorkBuffer::is_secured`] is `true`.
    pub fn work_buffer(&self) -> &WorkBuffer {
        &self.mem.work
    }

    /// The job lists of the last prepared transform.
    pub fn job_lists(&self) -> &JobLists {
        &self.mem.jobs
    }
}

impl<V: Variant, P: CcmPeripheral, I: IrqLine> Drop for TransformEngine<'_, V, P, I> {
    fn drop(&mut self) {
        self.accelerator.disable();
    }
}
