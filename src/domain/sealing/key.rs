//! Merchant key derivation.
//!
//! The gateway does not use the issued production key directly: the last
//! two characters go through a fixed transposition before the whole key is
//! hex-decoded into the HMAC key. The transform is a vendor quirk and must
//! be reproduced bit-for-bit; any drift breaks interoperability with a
//! system this code does not control. Do not clean it up.

use secrecy::{ExposeSecret, SecretString};

use super::errors::SealError;

/// Number of characters of the merchant key consumed by derivation.
const KEY_LEN: usize = 40;

/// The derived binary HMAC key.
///
/// Recomputed on every seal/verify call rather than cached, so a rotated
/// configuration key takes effect immediately.
#[derive(Clone)]
pub struct UsableKey(Vec<u8>);

impl UsableKey {
    /// Derive the usable key from the merchant production key.
    ///
    /// # Errors
    ///
    /// `InvalidKeyFormat` if the key is shorter than 40 characters or the
    /// derived string is not valid hexadecimal.
    pub fn derive(production_key: &SecretString) -> Result<Self, SealError> {
        let chars: Vec<char> = production_key.expose_secret().chars().collect();
        if chars.len() < KEY_LEN {
            return Err(SealError::InvalidKeyFormat("shorter than 40 characters"));
        }

        // Head: the first 38 characters pass through unchanged.
        let mut derived: String = chars[..38].iter().collect();

        // Tail: characters 38,39 padded with a literal "00".
        let final_part = [chars[38], chars[39], '0', '0'];
        let code = final_part[0] as u32;

        if code > 70 && code < 97 {
            let mapped = char::from_u32(code - 23)
                .ok_or(SealError::InvalidKeyFormat("unmappable tail character"))?;
            derived.push(mapped);
            derived.push(final_part[1]);
        } else if final_part[1] == 'M' {
            derived.push(final_part[0]);
            derived.push('0');
        } else {
            derived.push(final_part[0]);
            derived.push(final_part[1]);
        }

        let bytes = hex::decode(&derived)
            .map_err(|_| SealError::InvalidKeyFormat("derived key is not hexadecimal"))?;

        Ok(UsableKey(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Keep the derived key out of debug output, same as the source key.
impl std::fmt::Debug for UsableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UsableKey([REDACTED])")
    }
}
