//! Reversible encryption seam for token storage.
//!
//! The store never sees plaintext at rest; it delegates to a
//! [`SecretCipher`]. The default implementation binds blobs to a
//! per-installation key, so an embedder with access to a stronger
//! platform facility (an OS keychain, say) can supply its own.

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::{Error, Result};

/// Nonce length for AES-256-GCM, prepended to every blob.
const NONCE_LEN: usize = 12;

/// Key length for AES-256-GCM.
const KEY_LEN: usize = 32;

/// Reversible encryption used for tokens at rest.
///
/// Both operations are fallible: the backing facility may be unusable
/// (no key material, unwritable data directory), and a blob may have
/// been corrupted or produced under a different machine identity.
pub trait SecretCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>>;
}

/// AES-256-GCM under a key generated once per installation.
///
/// The key lives next to the credential store in the application data
/// directory, readable only by the owning user. Blobs encrypted on one
/// installation do not decrypt on another, which is the intended
/// behavior for machine-bound tokens.
pub struct MachineKeyCipher {
    key: [u8; KEY_LEN],
}

impl MachineKeyCipher {
    /// Load the installation key from `key_path`, generating and
    /// persisting a fresh one on first use.
    ///
    /// Any failure to read, create, or validate the key file surfaces
    /// as [`Error::EncryptionUnavailable`].
    pub fn load_or_create(key_path: &Path) -> Result<Self> {
        if key_path.exists() {
            let bytes = fs::read(key_path)
                .map_err(|e| Error::unavailable(format!("cannot read machine key: {e}")))?;
            let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
                Error::unavailable(format!(
                    "machine key at {} has unexpected length",
                    key_path.display()
                ))
            })?;
            return Ok(Self { key });
        }

        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        persist_key(key_path, &key)?;
        tracing::debug!(path = %key_path.display(), "generated new machine key");
        Ok(Self { key })
    }

    fn aead(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| Error::unavailable("machine key has invalid length"))
    }
}

impl SecretCipher for MachineKeyCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let aead = self.aead()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = aead
            .encrypt(nonce, plaintext)
            .map_err(|_| Error::unavailable("encryption failed"))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() <= NONCE_LEN {
            return Err(Error::DecryptionFailed);
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

        let aead = self.aead()?;
        aead.decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| Error::DecryptionFailed)
    }
}

/// Write the key file with owner-only permissions.
fn persist_key(key_path: &Path, key: &[u8]) -> Result<()> {
    if let Some(parent) = key_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::unavailable(format!("cannot create data directory: {e}")))?;
    }

    fs::write(key_path, key)
        .map_err(|e| Error::unavailable(format!("cannot write machine key: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::Permissions::from_mode(0o600);
        fs::set_permissions(key_path, permissions)
            .map_err(|e| Error::unavailable(format!("cannot restrict machine key: {e}")))?;
    }

    Ok(())
}

/// Default key file location for this path of the store.
pub(crate) fn key_path_for(store_dir: &Path) -> PathBuf {
    store_dir.join("machine.key")
}
