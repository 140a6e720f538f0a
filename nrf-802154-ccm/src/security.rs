//! 802.15.4 security levels and frame geometry.

use crate::Error;

/// Size of the PHY header, in bytes.
pub const PHR_SIZE: usize = 1;
/// Offset of the length field within the PHY header.
pub const PHR_OFFSET: usize = 0;
/// Offset of the first PSDU byte within a raw frame.
pub const PSDU_OFFSET: usize = PHR_OFFSET + PHR_SIZE;
/// Maximum PSDU length, FCS included.
pub const MAX_PACKET_SIZE: usize = 127;

/// Size of a CCM* key, in bytes.
pub const KEY_SIZE: usize = 16;
/// Size of a CCM* nonce, in bytes.
pub const NONCE_SIZE: usize = 13;

/// Security level of an auxiliary security header.
///
/// The low two bits select the MIC length, bit 2 enables encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SecurityLevel {
    /// No security.
    None = 0,
    /// Authentication only, 32-bit MIC.
    Mic32 = 1,
    /// Authentication only, 64-bit MIC.
    Mic64 = 2,
    /// Authentication only, 128-bit MIC.
    Mic128 = 3,
    /// Encryption only.
    Enc = 4,
    /// Encryption with a 32-bit MIC.
    EncMic32 = 5,
    /// Encryption with a 64-bit MIC.
    EncMic64 = 6,
    /// Encryption with a 128-bit MIC.
    EncMic128 = 7,
}

impl SecurityLevel {
    const ENCRYPTION: u8 = 0x04;

    /// MAC length the accelerator has to produce, or `None` if the level carries nothing to transform.
    pub const fn mac_length(self) -> Option<MacLength> {
        match self {
            SecurityLevel::None => None,
            SecurityLevel::Enc => Some(MacLength::M0),
            SecurityLevel::Mic32 | SecurityLevel::EncMic32 => Some(MacLength::M4),
            SecurityLevel::Mic64 | SecurityLevel::EncMic64 => Some(MacLength::M8),
            SecurityLevel::Mic128 | SecurityLevel::EncMic128 => Some(MacLength::M16),
        }
    }

    /// Whether the payload is encrypted at this level.
    pub const fn is_encrypted(self) -> bool {
        self as u8 & Self::ENCRYPTION != 0
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => SecurityLevel::None,
            1 => SecurityLevel::Mic32,
            2 => SecurityLevel::Mic64,
            3 => SecurityLevel::Mic128,
            4 => SecurityLevel::Enc,
            5 => SecurityLevel::EncMic32,
            6 => SecurityLevel::EncMic64,
            7 => SecurityLevel::EncMic128,
            _ => return Err(Error::UnsupportedSecurityLevel(value)),
        })
    }
}

/// MAC length setting of the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacLength {
    /// No MAC.
    M0,
    /// 4-byte MAC.
    M4,
    /// 8-byte MAC.
    M8,
    /// 16-byte MAC.
    M16,
}

impl MacLength {
    /// Length of the MAC in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            MacLength::M0 => 0,
            MacLength::M4 => 4,
            MacLength::M8 => 8,
            MacLength::M16 => 16,
        }
    }
}
