//! Encrypted per-repository token storage
//!
//! Tokens are keyed by remote identity (`host/owner/repo`, lowercased),
//! encrypted before they touch disk, and persisted in a single
//! pretty-printed JSON file under the application data directory. Every
//! save/clear runs as a locked read-modify-write so concurrent callers
//! cannot lose each other's entries.

pub mod cipher;
pub mod error;
pub mod store;

pub use cipher::{MachineKeyCipher, SecretCipher};
pub use error::{Error, Result};
pub use store::{TokenVault, default_data_dir};
