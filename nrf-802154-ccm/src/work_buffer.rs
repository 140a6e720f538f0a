use core::ptr::NonNull;

use crate::security::{MAX_PACKET_SIZE, PHR_OFFSET, PHR_SIZE, PSDU_OFFSET};

/// Size of the work buffer: a PHR followed by the largest PSDU.
pub const WORK_BUFFER_SIZE: usize = PHR_SIZE + MAX_PACKET_SIZE;

/// How the work buffer is seeded before the accelerator writes into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prefill {
    /// Copy the PHR and zero the PSDU. The accelerator echoes the header itself.
    Phr,
    /// Copy the whole unencrypted prefix and zero the transformed region.
    Header,
}

/// Where the accelerator writes its output.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputRegions {
    /// Associated data echo, right after the PHR.
    pub(crate) assoc: *mut u8,
    /// Ciphertext and MAC, at the plaintext offset.
    pub(crate) cipher: *mut u8,
}

/// Scratch copy of the frame being transformed.
///
/// Layout: `[PHR][associated data][ciphertext + MAC]`. The split between the unencrypted prefix and the
/// transformed region is the plaintext offset.
///
/// While a transform is in flight the accelerator writes into this buffer through DMA; its contents are
/// only meaningful once [`is_secured`](Self::is_secured) returns `true`.
pub struct WorkBuffer {
    data: [u8; WORK_BUFFER_SIZE],
    len: usize,
    plain_text_offset: usize,
    frame: Option<NonNull<u8>>,
    secured: bool,
}

// SAFETY: `frame` is only compared against other pointers, never dereferenced.
unsafe impl Send for WorkBuffer {}

impl WorkBuffer {
    /// Create an empty work buffer, not associated with any frame.
    pub const fn new() -> Self {
        Self {
            data: [0; WORK_BUFFER_SIZE],
            len: 0,
            plain_text_offset: 0,
            frame: None,
            secured: false,
        }
    }

    /// Associate the buffer with `frame` and seed it for a transform starting at `plain_text_offset`.
    ///
    /// The caller has checked that the PSDU length and `plain_text_offset` fit the buffer.
    pub(crate) fn acquire(&mut self, frame: &[u8], plain_text_offset: usize, prefill: Prefill) -> OutputRegions {
        let psdu_len = usize::from(frame[PHR_OFFSET]);
        let end = PHR_SIZE + psdu_len;

        self.frame = NonNull::new(frame.as_ptr().cast_mut());
        self.len = end;
        self.plain_text_offset = plain_text_offset;
        self.secured = false;

        match prefill {
            Prefill::Phr => {
                self.data[..PHR_SIZE].copy_from_slice(&frame[..PHR_SIZE]);
                self.data[PSDU_OFFSET..end].fill(0);
            }
            Prefill::Header => {
                let copied = plain_text_offset.min(frame.len());
                self.data[..copied].copy_from_slice(&frame[..copied]);
                self.data[copied..plain_text_offset].fill(0);
                if end > plain_text_offset {
                    self.data[plain_text_offset..end].fill(0);
                }
            }
        }

        OutputRegions {
            assoc: self.data[PSDU_OFFSET..].as_mut_ptr(),
            cipher: self.data[plain_text_offset..].as_mut_ptr(),
        }
    }

    /// Record that the accelerator finished writing the buffer.
    pub(crate) fn mark_secured(&mut self) {
        self.secured = true;
    }

    /// Forget the frame association.
    pub(crate) fn reset(&mut self) {
        self.frame = None;
        self.len = 0;
        self.plain_text_offset = 0;
        self.secured = false;
    }

    /// Whether the buffer holds a completed transform.
    pub fn is_secured(&self) -> bool {
        self.secured
    }

    /// Offset of the transformed region from the start of the buffer.
    pub fn plain_text_offset(&self) -> usize {
        self.plain_text_offset
    }

    /// Whether the buffer was last acquired for `frame`.
    pub fn is_enabled_for(&self, frame: &[u8]) -> bool {
        self.frame.is_some_and(|p| core::ptr::eq(p.as_ptr(), frame.as_ptr()))
    }

    /// The frame to hand to the radio for `frame`: the work buffer if it was acquired for it, the original otherwise.
    pub fn get<'a>(&'a self, frame: &'a [u8]) -> &'a [u8] {
        if self.is_enabled_for(frame) {
            &self.data[..self.len]
        } else {
            frame
        }
    }

    /// The transformed frame, PHR included, once secured.
    pub fn secured_frame(&self) -> Option<&[u8]> {
        self.secured.then(|| &self.data[..self.len])
    }
}

impl Default for WorkBuffer {
    fn default() -> Self {
        Self::new()
    }
}
