//! Error types for the CCM* transform.

/// A transform request was rejected.
///
/// Every variant is reported synchronously by [`TransformEngine::prepare`](crate::TransformEngine::prepare),
/// before the work buffer or the accelerator is touched. Accelerator faults are not represented here: they
/// are fatal and panic from the interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The raw frame is empty, so there is no PHR to read.
    MissingFrame,
    /// `auth_data_len` is non-zero but no associated data was supplied.
    MissingAuthData,
    /// `plain_text_len` is non-zero but no plaintext was supplied.
    MissingPlainText,
    /// A supplied region is shorter than its declared length.
    RegionTooShort,
    /// The security level has no MAC length the accelerator can produce.
    UnsupportedSecurityLevel(u8),
    /// The PSDU length field exceeds the largest 802.15.4 frame.
    FrameTooLong,
    /// The ciphertext and MIC would end past the frame's declared length.
    RegionOutsideFrame,
    /// A transform is already armed or running.
    Busy,
    /// The accelerator faulted and must be aborted or reset first.
    Faulted,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MissingFrame => f.write_str("raw frame is empty"),
            Error::MissingAuthData => f.write_str("associated data length set without data"),
            Error::MissingPlainText => f.write_str("plaintext length set without data"),
            Error::RegionTooShort => f.write_str("region shorter than its declared length"),
            Error::UnsupportedSecurityLevel(level) => write!(f, "unsupported security level {}", level),
            Error::FrameTooLong => f.write_str("frame does not fit the work buffer"),
            Error::RegionOutsideFrame => f.write_str("transformed region ends past the frame"),
            Error::Busy => f.write_str("a transform is already in flight"),
            Error::Faulted => f.write_str("accelerator faulted"),
        }
    }
}

impl core::error::Error for Error {}
