//! Password-based authenticated encryption for collection blobs.
//!
//! Blobs are AES-256-GCM ciphertexts under a key derived from the password
//! with Argon2id. Everything needed to re-derive the key except the password
//! travels with the blob:
//!
//! ```text
//! {"v": 1, "algorithm": "aes-256-gcm", "kdf": "argon2id",
//!  "salt": <base64>, "m_cost": 19456, "t_cost": 2, "p_cost": 1,
//!  "nonce": <base64, 12 bytes>, "ciphertext": <base64, includes GCM tag>}
//! ```
//!
//! Opening distinguishes a damaged envelope ([`CodecError::MalformedBlob`])
//! from a tag that does not verify ([`CodecError::AuthenticationFailed`]).
//! GCM cannot tell a wrong password from a tampered ciphertext, so both
//! surface as authentication failures.

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use argon2::{Algorithm, Argon2, Params, Version};
use base64ct::{Base64, Encoding};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

mod errors;

pub use errors::CodecError;

/// Envelope format version.
pub const BLOB_VERSION: u8 = 1;
/// Cipher identifier written into every blob.
pub const ALGORITHM: &str = "aes-256-gcm";
/// Key derivation identifier written into every blob.
pub const KDF: &str = "argon2id";

/// Salt length for Argon2 in bytes
pub const SALT_LENGTH: usize = 16;
/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;
/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Default Argon2 memory cost in KiB (19 MiB)
pub const DEFAULT_ARGON2_M_COST: u32 = 19 * 1024;
/// Default Argon2 time cost (iterations)
pub const DEFAULT_ARGON2_T_COST: u32 = 2;
/// Default Argon2 parallelism
pub const DEFAULT_ARGON2_P_COST: u32 = 1;
/// Largest memory cost accepted from a blob (1 GiB)
pub const MAX_ARGON2_M_COST: u32 = 1024 * 1024;
/// Largest time cost accepted from a blob
pub const MAX_ARGON2_T_COST: u32 = 64;
/// Largest parallelism accepted from a blob
pub const MAX_ARGON2_P_COST: u32 = 16;

/// A derived AES-256 key, zeroized on drop.
pub type Key = Zeroizing<[u8; KEY_LENGTH]>;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Iterations
    pub t_cost: u32,
    /// Parallelism
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: DEFAULT_ARGON2_M_COST,
            t_cost: DEFAULT_ARGON2_T_COST,
            p_cost: DEFAULT_ARGON2_P_COST,
        }
    }
}

impl KdfParams {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost,
            t_cost,
            p_cost,
        }
    }

    /// The cheapest parameters Argon2 accepts. Only for tests.
    #[cfg(any(test, feature = "testing"))]
    pub fn fast() -> Self {
        Self::new(8, 1, 1)
    }

    fn argon2(&self) -> Result<Argon2<'static>, CodecError> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_LENGTH))
            .map_err(|e| CodecError::KeyDerivation {
                reason: format!("Invalid Argon2 parameters: {e}"),
            })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Generates a random salt for key derivation.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives an AES-256 key from `password` and `salt` with Argon2id.
pub fn derive_key(password: &str, salt: &[u8], params: KdfParams) -> Result<Key, CodecError> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    params
        .argon2()?
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| CodecError::KeyDerivation {
            reason: e.to_string(),
        })?;
    Ok(key)
}

/// Wire representation of an envelope; byte fields are base64.
#[derive(Serialize, Deserialize)]
struct EnvelopeRepr {
    v: u8,
    algorithm: String,
    kdf: String,
    salt: String,
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    nonce: String,
    ciphertext: String,
}

/// A decoded blob: key derivation inputs plus the sealed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: Vec<u8>,
    pub params: KdfParams,
    nonce: [u8; NONCE_LENGTH],
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parses and validates a blob without decrypting it.
    pub fn parse(blob: &[u8]) -> Result<Self, CodecError> {
        let malformed = |reason: String| CodecError::MalformedBlob { reason };

        let repr: EnvelopeRepr =
            serde_json::from_slice(blob).map_err(|e| malformed(format!("invalid envelope: {e}")))?;

        if repr.v != BLOB_VERSION {
            return Err(malformed(format!(
                "unsupported blob version {}; only version {BLOB_VERSION} is supported",
                repr.v
            )));
        }
        if repr.algorithm != ALGORITHM {
            return Err(malformed(format!(
                "unsupported algorithm: {}",
                repr.algorithm
            )));
        }
        if repr.kdf != KDF {
            return Err(malformed(format!("unsupported KDF: {}", repr.kdf)));
        }
        if repr.m_cost > MAX_ARGON2_M_COST {
            return Err(malformed(format!(
                "Argon2 memory cost {} exceeds limit {MAX_ARGON2_M_COST}",
                repr.m_cost
            )));
        }
        if repr.t_cost > MAX_ARGON2_T_COST {
            return Err(malformed(format!(
                "Argon2 time cost {} exceeds limit {MAX_ARGON2_T_COST}",
                repr.t_cost
            )));
        }
        if repr.p_cost > MAX_ARGON2_P_COST {
            return Err(malformed(format!(
                "Argon2 parallelism {} exceeds limit {MAX_ARGON2_P_COST}",
                repr.p_cost
            )));
        }

        let decode = |name: &str, b64: &str| {
            Base64::decode_vec(b64).map_err(|_| malformed(format!("{name}: invalid base64")))
        };
        let salt = decode("salt", &repr.salt)?;
        let nonce: [u8; NONCE_LENGTH] = decode("nonce", &repr.nonce)?
            .try_into()
            .map_err(|v: Vec<u8>| {
                malformed(format!(
                    "nonce: expected {NONCE_LENGTH} bytes, got {}",
                    v.len()
                ))
            })?;
        let ciphertext = decode("ciphertext", &repr.ciphertext)?;

        Ok(Self {
            salt,
            params: KdfParams::new(repr.m_cost, repr.t_cost, repr.p_cost),
            nonce,
            ciphertext,
        })
    }

    /// Serializes the envelope to its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let repr = EnvelopeRepr {
            v: BLOB_VERSION,
            algorithm: ALGORITHM.to_string(),
            kdf: KDF.to_string(),
            salt: Base64::encode_string(&self.salt),
            m_cost: self.params.m_cost,
            t_cost: self.params.t_cost,
            p_cost: self.params.p_cost,
            nonce: Base64::encode_string(&self.nonce),
            ciphertext: Base64::encode_string(&self.ciphertext),
        };
        // A struct of strings and integers always serializes
        serde_json::to_vec(&repr).unwrap_or_default()
    }
}

/// Encrypts `plaintext` under an already derived key.
///
/// `salt` and `params` must be the inputs `key` was derived from; they are
/// recorded in the blob for decryption.
pub fn seal(
    key: &[u8; KEY_LENGTH],
    salt: &[u8],
    params: KdfParams,
    plaintext: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CodecError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext =
        cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CodecError::EncryptionFailed {
                reason: e.to_string(),
            })?;

    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    nonce_bytes.copy_from_slice(nonce.as_slice());

    Ok(Envelope {
        salt: salt.to_vec(),
        params,
        nonce: nonce_bytes,
        ciphertext,
    }
    .to_bytes())
}

/// Decrypts a parsed envelope with an already derived key.
pub fn open(key: &[u8; KEY_LENGTH], envelope: &Envelope) -> Result<Zeroizing<Vec<u8>>, CodecError> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CodecError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;
    let nonce = Nonce::from_slice(&envelope.nonce);
    cipher
        .decrypt(nonce, envelope.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CodecError::AuthenticationFailed)
}

/// Encrypts `plaintext` with `password`, using a fresh salt.
pub fn encrypt(password: &str, plaintext: &[u8], params: KdfParams) -> Result<Vec<u8>, CodecError> {
    let salt = generate_salt();
    let key = derive_key(password, &salt, params)?;
    seal(&key, &salt, params, plaintext)
}

/// Decrypts a blob produced by [`encrypt`] or [`seal`].
pub fn decrypt(password: &str, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, CodecError> {
    let envelope = Envelope::parse(blob)?;
    let key = derive_key(password, &envelope.salt, envelope.params).map_err(|e| {
        // Parameters come from the blob; unusable ones mean the blob is bad
        CodecError::MalformedBlob {
            reason: e.to_string(),
        }
    })?;
    open(&key, &envelope)
}
