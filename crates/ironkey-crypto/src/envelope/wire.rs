//! Raw byte layout for the wire/armor collaborator.
//!
//! This core produces and consumes only this binary layout; textual
//! (armor) encodings live downstream. All integers are Big-Endian:
//!
//! ```text
//! u8        alg
//! [u8; 24]  body_nonce
//! u32 len ‖ body_ct
//! u16       recipient count
//! per recipient:
//!   [u8; 32]  ephemeral_public
//!   [u8; 24]  nonce
//!   u16 len ‖ wrapped_cek
//!   u16 len ‖ to (UTF-8 short-fingerprint string)
//! ```
//!
//! # Security
//!
//! Decoding validates every length before allocating, reads exactly the
//! claimed sizes, rejects trailing bytes, and never panics on arbitrary
//! input. Structural validity only: a decoded envelope still carries
//! unauthenticated ciphertext until [`super::open`] verifies it.

use bytes::BufMut;

use super::{Envelope, EnvelopeAlg, EnvelopeError, NONCE_SIZE, RecipientEntry};

impl Envelope {
    /// Largest body ciphertext accepted when decoding (16 MB).
    pub const MAX_BODY_SIZE: u32 = 16 * 1024 * 1024;

    /// Encode into the wire layout.
    ///
    /// # Errors
    ///
    /// `Malformed` if a variable-length field exceeds its length prefix
    /// (body over [`Envelope::MAX_BODY_SIZE`], oversized wrap or handle,
    /// more than `u16::MAX` recipients).
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<(), EnvelopeError> {
        let malformed =
            |reason: &str| EnvelopeError::Malformed { reason: reason.to_string() };

        if self.body_ct.len() > Self::MAX_BODY_SIZE as usize {
            return Err(malformed("body exceeds maximum size"));
        }
        let recipient_count =
            u16::try_from(self.recipients.len()).map_err(|_| malformed("too many recipients"))?;

        dst.put_u8(self.alg.to_u8());
        dst.put_slice(&self.body_nonce);
        dst.put_u32(self.body_ct.len() as u32);
        dst.put_slice(&self.body_ct);
        dst.put_u16(recipient_count);

        for entry in &self.recipients {
            let wrapped_len = u16::try_from(entry.wrapped_cek.len())
                .map_err(|_| malformed("wrapped key exceeds u16 length"))?;
            let to = entry.to.to_string();
            let to_len =
                u16::try_from(to.len()).map_err(|_| malformed("recipient handle too long"))?;

            dst.put_slice(&entry.ephemeral_public);
            dst.put_slice(&entry.nonce);
            dst.put_u16(wrapped_len);
            dst.put_slice(&entry.wrapped_cek);
            dst.put_u16(to_len);
            dst.put_slice(to.as_bytes());
        }

        Ok(())
    }

    /// Decode from the wire layout.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAlgorithm` for an unknown algorithm byte
    /// - `Malformed` for truncation, oversized claims, trailing bytes, or
    ///   an unparseable recipient handle
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let mut cursor = Cursor { bytes };

        let alg_byte = cursor.take_u8()?;
        let alg = EnvelopeAlg::from_u8(alg_byte)
            .ok_or(EnvelopeError::UnsupportedAlgorithm { alg: alg_byte })?;

        let body_nonce = cursor.take_array::<NONCE_SIZE>()?;
        let body_len = cursor.take_u32()?;
        if body_len > Self::MAX_BODY_SIZE {
            return Err(EnvelopeError::Malformed {
                reason: format!("claimed body size {body_len} exceeds maximum"),
            });
        }
        let body_ct = cursor.take_vec(body_len as usize)?;

        let recipient_count = cursor.take_u16()?;
        let mut recipients = Vec::with_capacity(usize::from(recipient_count));
        for _ in 0..recipient_count {
            let ephemeral_public = cursor.take_array::<32>()?;
            let nonce = cursor.take_array::<NONCE_SIZE>()?;

            let wrapped_len = cursor.take_u16()?;
            let wrapped_cek = cursor.take_vec(usize::from(wrapped_len))?;

            let to_len = cursor.take_u16()?;
            let to_bytes = cursor.take_vec(usize::from(to_len))?;
            let to = std::str::from_utf8(&to_bytes)
                .map_err(|_| EnvelopeError::Malformed {
                    reason: "recipient handle is not UTF-8".to_string(),
                })?
                .parse()
                .map_err(|_| EnvelopeError::Malformed {
                    reason: "recipient handle is not a short fingerprint".to_string(),
                })?;

            recipients.push(RecipientEntry { ephemeral_public, nonce, wrapped_cek, to });
        }

        if !cursor.bytes.is_empty() {
            return Err(EnvelopeError::Malformed {
                reason: format!("{} trailing bytes", cursor.bytes.len()),
            });
        }

        Ok(Self { alg, body_nonce, body_ct, recipients })
    }
}

/// Bounds-checked reader over the input slice.
struct Cursor<'a> {
    bytes: &'a [u8],
}

impl Cursor<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], EnvelopeError> {
        if self.bytes.len() < n {
            return Err(EnvelopeError::Malformed {
                reason: format!("truncated: need {n} bytes, have {}", self.bytes.len()),
            });
        }
        let (head, rest) = self.bytes.split_at(n);
        self.bytes = rest;
        Ok(head)
    }

    fn take_u8(&mut self) -> Result<u8, EnvelopeError> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self) -> Result<u16, EnvelopeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn take_u32(&mut self) -> Result<u32, EnvelopeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], EnvelopeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn take_vec(&mut self, n: usize) -> Result<Vec<u8>, EnvelopeError> {
        Ok(self.take(n)?.to_vec())
    }
}
