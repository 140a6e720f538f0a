//! DMA job lists for the CCM accelerator.
//!
//! The accelerator reads its input as a chain of `{pointer, length, tag}` entries and scatters its output
//! over a second chain. Both chains end with a null entry. The input stream is
//! `[alen][mlen][associated data][plaintext]`, the output stream is
//! `[alen][mlen][associated data][ciphertext + MAC]`.

use core::ptr;

use crate::work_buffer::OutputRegions;

/// Number of entries in the input chain, terminator included.
pub const IN_JOBS: usize = 5;
/// Maximum number of entries in the output chain, terminator included.
pub const OUT_JOBS: usize = 6;

/// One DMA job list entry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    ptr: *mut u8,
    // Length in the low 24 bits, tag in the high 8.
    info: u32,
}

impl Job {
    /// End of a job list.
    pub const TERMINATOR: Job = Job {
        ptr: ptr::null_mut(),
        info: 0,
    };

    const LEN_MASK: u32 = 0x00ff_ffff;
    const TAG_SHIFT: u32 = 24;

    fn new(ptr: *mut u8, len: usize, tag: u8) -> Self {
        debug_assert!(len <= Self::LEN_MASK as usize);
        Self {
            ptr,
            info: (len as u32 & Self::LEN_MASK) | (u32::from(tag) << Self::TAG_SHIFT),
        }
    }

    fn input(data: &[u8], tag: u8) -> Self {
        // An empty slice still has a non-null dangling pointer, so it can never be mistaken for the terminator.
        Self::new(data.as_ptr().cast_mut(), data.len(), tag)
    }

    /// Start of the region.
    pub fn ptr(&self) -> *const u8 {
        self.ptr
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        (self.info & Self::LEN_MASK) as usize
    }

    /// Whether the region is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attribute tag the accelerator uses to tell the regions apart.
    pub fn tag(&self) -> u8 {
        (self.info >> Self::TAG_SHIFT) as u8
    }

    /// Whether this entry ends the list.
    pub fn is_terminator(&self) -> bool {
        self.ptr.is_null()
    }
}

/// Width of the `mlen` field the accelerator writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutMlen {
    /// Two one-byte entries, low byte first.
    Split,
    /// One two-byte entry.
    Single,
}

/// Tagging and shape of the job lists for one accelerator flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JobLayout {
    /// Tags of the `alen`, `mlen`, associated data and message entries.
    pub tags: [u8; 4],
    /// Output `mlen` field shape.
    pub out_mlen: OutMlen,
}

impl JobLayout {
    const ALEN: usize = 0;
    const MLEN: usize = 1;
    const ADATA: usize = 2;
    const MDATA: usize = 3;
}

#[repr(C)]
struct Params {
    in_alen: [u8; 2],
    in_mlen: [u8; 2],
    out_alen: [u8; 2],
    out_mlen: [u8; 2],
}

/// Input and output job lists, plus the length fields they point at.
///
/// The accelerator holds pointers into this struct while a transform is in flight, so it lives in the
/// caller-provided [`Mem`](crate::Mem) and is never moved.
#[repr(C, align(8))]
pub struct JobLists {
    input: [Job; IN_JOBS],
    output: [Job; OUT_JOBS],
    output_len: usize,
    params: Params,
}

// SAFETY: the raw pointers are only handed to the accelerator, never dereferenced by this crate.
unsafe impl Send for JobLists {}

impl JobLists {
    /// Create empty, terminated job lists.
    pub const fn new() -> Self {
        Self {
            input: [Job::TERMINATOR; IN_JOBS],
            output: [Job::TERMINATOR; OUT_JOBS],
            output_len: 1,
            params: Params {
                in_alen: [0; 2],
                in_mlen: [0; 2],
                out_alen: [0; 2],
                out_mlen: [0; 2],
            },
        }
    }

    /// Describe one transform of `auth` and `plain` into `out`, producing `mac_size` extra bytes.
    pub(crate) fn build(
        &mut self,
        layout: &JobLayout,
        auth: &[u8],
        plain: &[u8],
        out: OutputRegions,
        mac_size: usize,
    ) {
        let tags = &layout.tags;

        // The accelerator reads the length fields little-endian regardless of host order.
        self.params.in_alen = (auth.len() as u16).to_le_bytes();
        self.params.in_mlen = (plain.len() as u16).to_le_bytes();
        self.params.out_alen = [0; 2];
        self.params.out_mlen = [0; 2];

        self.input = [
            Job::new(self.params.in_alen.as_mut_ptr(), 2, tags[JobLayout::ALEN]),
            Job::new(self.params.in_mlen.as_mut_ptr(), 2, tags[JobLayout::MLEN]),
            Job::input(auth, tags[JobLayout::ADATA]),
            Job::input(plain, tags[JobLayout::MDATA]),
            Job::TERMINATOR,
        ];

        let mut output = [Job::TERMINATOR; OUT_JOBS];
        let mut n = 0;
        output[n] = Job::new(self.params.out_alen.as_mut_ptr(), 2, tags[JobLayout::ALEN]);
        n += 1;
        match layout.out_mlen {
            OutMlen::Split => {
                let (lsb, msb) = self.params.out_mlen.split_at_mut(1);
                output[n] = Job::new(lsb.as_mut_ptr(), 1, tags[JobLayout::MLEN]);
                output[n + 1] = Job::new(msb.as_mut_ptr(), 1, tags[JobLayout::MLEN]);
                n += 2;
            }
            OutMlen::Single => {
                output[n] = Job::new(self.params.out_mlen.as_mut_ptr(), 2, tags[JobLayout::MLEN]);
                n += 1;
            }
        }
        output[n] = Job::new(out.assoc, auth.len(), tags[JobLayout::ADATA]);
        output[n + 1] = Job::new(out.cipher, plain.len() + mac_size, tags[JobLayout::MDATA]);
        n += 2;

        self.output = output;
        self.output_len = n + 1;
    }

    /// The input chain, terminator included.
    pub fn input(&self) -> &[Job] {
        &self.input
    }

    /// The output chain, terminator included.
    pub fn output(&self) -> &[Job] {
        &self.output[..self.output_len]
    }

    /// The output entry receiving the ciphertext and MAC.
    pub fn cipher_job(&self) -> Option<&Job> {
        self.output().iter().rev().find(|job| !job.is_terminator())
    }

    pub(crate) fn input_ptr(&self) -> *const Job {
        self.input.as_ptr()
    }

    pub(crate) fn output_ptr(&self) -> *const Job {
        self.output.as_ptr()
    }
}

impl Default for JobLists {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack a 13 to 16 byte string into the four big-endian words the accelerator expects.
///
/// The leading `len % 4` bytes (four if the length is aligned) go right-justified into word 3. The remaining
/// bytes fill words 2, 1 and 0 in that order.
pub fn pack_u32x4_be(input: &[u8]) -> [u32; 4] {
    debug_assert!((13..=16).contains(&input.len()));

    let head = match input.len() % 4 {
        0 => 4,
        n => n,
    };
    let (first, rest) = input.split_at(head);

    let mut words = [0u32; 4];
    words[3] = first.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b));
    for (word, chunk) in words[..3].iter_mut().rev().zip(rest.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

/// Byte-by-byte inverse of [`pack_u32x4_be`] for an input of `len` bytes.
#[cfg(test)]
pub(crate) fn unpack_u32x4_be(words: &[u32; 4], len: usize) -> [u8; 16] {
    let head = match len % 4 {
        0 => 4,
        n => n,
    };
    let mut out = [0u8; 16];
    for i in 0..head {
        out[i] = (words[3] >> (8 * (head - 1 - i))) as u8;
    }
    let mut pos = head;
    for word in words[..3].iter().rev() {
        for shift in [24, 16, 8, 0] {
            if pos < len {
                out[pos] = (word >> shift) as u8;
            }
            pos += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::MacLength;

    const AUTONOMOUS: JobLayout = JobLayout {
        tags: [0; 4],
        out_mlen: OutMlen::Split,
    };
    const BRIDGED: JobLayout = JobLayout {
        tags: [11, 12, 13, 14],
        out_mlen: OutMlen::Single,
    };

    fn regions(buf: &mut [u8; 128], offset: usize) -> OutputRegions {
        OutputRegions {
            assoc: buf[1..].as_mut_ptr(),
            cipher: buf[offset..].as_mut_ptr(),
        }
    }

    #[test]
    fn key_packs_into_reversed_words() {
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        assert_eq!(
            pack_u32x4_be(&key),
            [0x0c0d0e0f, 0x08090a0b, 0x04050607, 0x00010203]
        );
    }

    #[test]
    fn nonce_head_byte_is_right_justified() {
        let nonce: [u8; 13] = core::array::from_fn(|i| 0xa0 + i as u8);
        assert_eq!(
            pack_u32x4_be(&nonce),
            [0xa9aaabac, 0xa5a6a7a8, 0xa1a2a3a4, 0x000000a0]
        );
    }

    #[test]
    fn packing_round_trips() {
        let key = [0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c];
        assert_eq!(unpack_u32x4_be(&pack_u32x4_be(&key), 16), key);

        let nonce = [0xac, 0xde, 0x48, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x02];
        assert_eq!(&unpack_u32x4_be(&pack_u32x4_be(&nonce), 13)[..13], &nonce);
    }

    #[test]
    fn input_chain_carries_little_endian_lengths() {
        let auth = [0u8; 0x0102];
        let plain = [0u8; 3];
        let mut buf = [0u8; 128];
        let mut jobs = JobLists::new();

        jobs.build(&AUTONOMOUS, &auth[..0x0102], &plain, regions(&mut buf, 1), 4);

        assert_eq!(jobs.params.in_alen, [0x02, 0x01]);
        assert_eq!(jobs.params.in_mlen, [0x03, 0x00]);
        let input = jobs.input();
        assert_eq!(input.len(), IN_JOBS);
        assert_eq!(input[0].len(), 2);
        assert_eq!(input[1].len(), 2);
        assert_eq!(input[2].ptr(), auth.as_ptr());
        assert_eq!(input[3].ptr(), plain.as_ptr());
        assert!(input[4].is_terminator());
    }

    #[test]
    fn empty_regions_keep_the_chain_terminated_once() {
        let mut buf = [0u8; 128];
        let mut jobs = JobLists::new();

        jobs.build(&BRIDGED, &[], &[], regions(&mut buf, 1), 8);

        let input = jobs.input();
        assert!(input[..4].iter().all(|job| !job.is_terminator()));
        assert!(input[2].is_empty() && input[3].is_empty());
        assert!(input[4].is_terminator());
        assert_eq!(jobs.output().iter().filter(|job| job.is_terminator()).count(), 1);
    }

    #[test]
    fn cipher_entry_is_plaintext_plus_mac() {
        let plain = [0xaa; 16];
        let auth = [0x11; 5];
        for layout in [AUTONOMOUS, BRIDGED] {
            for mac in [MacLength::M0, MacLength::M4, MacLength::M8, MacLength::M16] {
                let mut buf = [0u8; 128];
                let mut jobs = JobLists::new();
                jobs.build(&layout, &auth, &plain, regions(&mut buf, 6), mac.bytes());

                let cipher = jobs.cipher_job().copied();
                assert_eq!(cipher.map(|job| job.len()), Some(16 + mac.bytes()));
                assert_eq!(cipher.map(|job| job.ptr()), Some(buf[6..].as_ptr()));
            }
        }
    }

    #[test]
    fn autonomous_output_splits_mlen() {
        let mut buf = [0u8; 128];
        let mut jobs = JobLists::new();
        jobs.build(&AUTONOMOUS, &[1, 2], &[3], regions(&mut buf, 3), 4);

        let lens: [usize; 6] = core::array::from_fn(|i| jobs.output()[i].len());
        assert_eq!(lens, [2, 1, 1, 2, 5, 0]);
        assert!(jobs.output().iter().all(|job| job.tag() == 0));
        assert_eq!(jobs.output()[2].ptr(), jobs.output()[1].ptr().wrapping_add(1));
    }

    #[test]
    fn bridged_output_uses_tagged_single_mlen() {
        let mut buf = [0u8; 128];
        let mut jobs = JobLists::new();
        jobs.build(&BRIDGED, &[1, 2], &[3], regions(&mut buf, 3), 4);

        let output = jobs.output();
        assert_eq!(output.len(), 5);
        let tags: [u8; 4] = core::array::from_fn(|i| output[i].tag());
        assert_eq!(tags, [11, 12, 13, 14]);
        assert_eq!(output[1].len(), 2);
        assert!(output[4].is_terminator());
        let in_tags: [u8; 4] = core::array::from_fn(|i| jobs.input()[i].tag());
        assert_eq!(in_tags, [11, 12, 13, 14]);
    }
}
