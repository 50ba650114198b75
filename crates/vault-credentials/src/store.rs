//! Encrypted token store keyed by remote identity.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use fs2::FileExt;

use vault_remote::RemoteDescriptor;

use crate::cipher::{MachineKeyCipher, SecretCipher, key_path_for};
use crate::{Error, Result};

/// Encrypted credential store for one application installation.
///
/// One flat JSON file maps lowercased `host/owner/repo` keys to
/// base64-encoded encrypted blobs. The file is pretty-printed so a user
/// can inspect which repositories have stored tokens; the blobs
/// themselves are opaque.
///
/// Tokens are addressed exclusively through a [`RemoteDescriptor`] —
/// never by vault directory — so repointing a vault at a different
/// remote automatically uses (or requires) a different credential.
pub struct TokenVault {
    store_path: PathBuf,
    cipher: Box<dyn SecretCipher>,
}

impl TokenVault {
    /// Create a store at an explicit path with an explicit cipher.
    pub fn new(store_path: impl Into<PathBuf>, cipher: Box<dyn SecretCipher>) -> Self {
        Self {
            store_path: store_path.into(),
            cipher,
        }
    }

    /// Open the per-installation store in the platform data directory,
    /// with the machine-bound default cipher.
    pub fn open_default() -> Result<Self> {
        let dir = default_data_dir()
            .ok_or_else(|| Error::unavailable("platform data directory is not available"))?;
        let cipher = MachineKeyCipher::load_or_create(&key_path_for(&dir))?;
        Ok(Self::new(dir.join("credentials.json"), Box::new(cipher)))
    }

    /// Path of the backing JSON file.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Encrypt `token` and persist it under the descriptor's key,
    /// replacing any prior entry for the same repository.
    pub fn save(&self, descriptor: &RemoteDescriptor, token: &str) -> Result<()> {
        let blob = self.cipher.encrypt(token.as_bytes())?;
        let encoded = BASE64.encode(blob);
        let key = descriptor.credential_key();

        self.mutate(|entries| {
            entries.insert(key.clone(), encoded);
        })?;

        tracing::debug!(key = %key, "stored credential");
        Ok(())
    }

    /// Decrypt and return the stored token for this repository, or
    /// `None` when no entry exists.
    pub fn load(&self, descriptor: &RemoteDescriptor) -> Result<Option<String>> {
        let entries = read_entries(&self.store_path)?;
        let Some(encoded) = entries.get(&descriptor.credential_key()) else {
            return Ok(None);
        };

        let blob = BASE64.decode(encoded).map_err(|_| Error::DecryptionFailed)?;
        let plaintext = self.cipher.decrypt(&blob)?;
        let token = String::from_utf8(plaintext).map_err(|_| Error::DecryptionFailed)?;
        Ok(Some(token))
    }

    /// Remove the entry for this repository. Absent entries are a no-op.
    pub fn clear(&self, descriptor: &RemoteDescriptor) -> Result<()> {
        if !self.store_path.exists() {
            return Ok(());
        }
        let key = descriptor.credential_key();
        self.mutate(|entries| {
            entries.remove(&key);
        })
    }

    /// Whether an entry exists for this repository, without decrypting.
    pub fn contains(&self, descriptor: &RemoteDescriptor) -> Result<bool> {
        let entries = read_entries(&self.store_path)?;
        Ok(entries.contains_key(&descriptor.credential_key()))
    }

    /// Run one read-modify-write cycle under the store lock.
    ///
    /// Concurrent saves for different repositories must not lose each
    /// other's entries, so the full cycle is the critical section: an
    /// exclusive advisory lock on a sidecar file guards a fresh read,
    /// the mutation, and an atomic temp-then-rename write.
    fn mutate(&self, mutation: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let lock_path = lock_path_for(&self.store_path);
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;
        lock_file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: self.store_path.clone(),
        })?;

        let result = (|| {
            let mut entries = read_entries(&self.store_path)?;
            mutation(&mut entries);
            write_entries_atomic(&self.store_path, &entries)
        })();

        let _ = FileExt::unlock(&lock_file);
        result
    }
}

/// Per-installation data directory for the engine.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("vaultsync"))
}

fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".lock");
    store_path.with_file_name(name)
}

fn read_entries(store_path: &Path) -> Result<BTreeMap<String, String>> {
    if !store_path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(store_path).map_err(|e| Error::io(store_path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the full record set with a temp-then-rename so a crash never
/// leaves a partially written store.
fn write_entries_atomic(store_path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let content = serde_json::to_string_pretty(entries)?;

    let temp_name = format!(
        ".{}.{}.tmp",
        store_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = store_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    fs::rename(&temp_path, store_path).map_err(|e| Error::io(store_path, e))?;
    Ok(())
}
