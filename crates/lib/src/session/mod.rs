//! Unlocked sessions.
//!
//! A [`Session`] holds the password that encrypts and decrypts collection blobs.
//! It is acquired explicitly with [`Session::unlock`], passed by reference to
//! every [`Store`](crate::Store) operation, and released with
//! [`Session::lock`] or by dropping it. The password and every derived key are
//! zeroized on release.
//!
//! Argon2 is deliberately expensive, so the session caches derived keys per
//! salt. Blobs written during one session all share the session's write salt
//! and need a single derivation.

use std::sync::{Mutex, PoisonError};

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    Error, Result,
    codec::{self, CodecError, Envelope, KdfParams, Key, SALT_LENGTH},
};

mod errors;

pub use errors::SessionError;

/// Derived keys kept per session; older entries are evicted first.
const KEY_CACHE_CAPACITY: usize = 4;

/// Securely stored password with automatic zeroization
#[derive(Zeroize, ZeroizeOnDrop)]
struct Password(String);

struct CachedKey {
    salt: Vec<u8>,
    params: KdfParams,
    key: Key,
}

/// An unlocked password with an explicit lifetime.
pub struct Session {
    password: Option<Password>,
    write_salt: [u8; SALT_LENGTH],
    keys: Mutex<Vec<CachedKey>>,
}

impl Session {
    /// Creates a session holding no password.
    pub fn locked() -> Self {
        Self {
            password: None,
            write_salt: codec::generate_salt(),
            keys: Mutex::new(Vec::new()),
        }
    }

    /// Acquires a session for `password`.
    pub fn unlock(password: impl Into<String>) -> Self {
        let mut session = Self::locked();
        session.password = Some(Password(password.into()));
        session
    }

    pub fn is_unlocked(&self) -> bool {
        self.password.is_some()
    }

    /// Replaces the session password.
    ///
    /// Cached keys are discarded and later writes use a fresh salt.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.lock();
        self.password = Some(Password(password.into()));
    }

    /// Releases the password and every derived key.
    pub fn lock(&mut self) {
        self.password = None;
        self.write_salt = codec::generate_salt();
        self.keys
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Encrypts `plaintext` with the session password.
    pub(crate) fn encrypt(&self, plaintext: &[u8], params: KdfParams) -> Result<Vec<u8>> {
        let salt = self.write_salt;
        let blob = self.with_key(&salt, params, |key| {
            codec::seal(key, &salt, params, plaintext)
        })?;
        Ok(blob)
    }

    /// Decrypts a blob with the session password.
    pub(crate) fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let envelope = Envelope::parse(blob)?;
        self.with_key(&envelope.salt, envelope.params, |key| {
            codec::open(key, &envelope)
        })
        .map_err(|e| match e {
            // Parameters come from the blob; unusable ones mean the blob is bad
            Error::Codec(CodecError::KeyDerivation { reason }) => {
                CodecError::MalformedBlob { reason }.into()
            }
            other => other,
        })
    }

    /// Runs `f` with the key for `salt` and `params`, deriving it once.
    fn with_key<R>(
        &self,
        salt: &[u8],
        params: KdfParams,
        f: impl FnOnce(&Key) -> std::result::Result<R, CodecError>,
    ) -> Result<R> {
        let password = self.password.as_ref().ok_or(SessionError::Locked)?;
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(pos) = keys
            .iter()
            .position(|k| k.params == params && k.salt == salt)
        {
            return Ok(f(&keys[pos].key)?);
        }

        let key = codec::derive_key(&password.0, salt, params)?;
        let result = f(&key)?;
        if keys.len() >= KEY_CACHE_CAPACITY {
            keys.remove(0);
        }
        keys.push(CachedKey {
            salt: salt.to_vec(),
            params,
            key,
        });
        Ok(result)
    }

    #[cfg(test)]
    fn cached_keys(&self) -> usize {
        self.keys.lock().unwrap().len()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("unlocked", &self.is_unlocked())
            .finish_non_exhaustive()
    }
}
