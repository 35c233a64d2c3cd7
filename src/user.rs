//! User accounts, as far as host spawning needs them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named public key registered by a user.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PublicKey {
    /// Name the user gave the key.
    pub name: String,
    /// Key material in `authorized_keys` format.
    pub key: String,
}

/// A platform user.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct User {
    /// Username.
    pub id: String,
    /// Registered public keys.
    pub public_keys: Vec<PublicKey>,
}

/// Raised when a key name is not registered for a user.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("user {user} has no public key named '{name}'")]
pub struct KeyNotFound {
    /// User searched.
    pub user: String,
    /// Key name requested.
    pub name: String,
}

impl User {
    /// Returns the key registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] when no key has that name.
    pub fn public_key(&self, name: &str) -> Result<&str, KeyNotFound> {
        self.public_keys
            .iter()
            .find(|key| key.name == name)
            .map(|key| key.key.as_str())
            .ok_or_else(|| KeyNotFound {
                user: self.id.clone(),
                name: name.to_owned(),
            })
    }
}
