//! Error types shared across the provisioning core.
//!
//! Every public operation returns [`ProvisionError`], whose variants map onto
//! the failure kinds a transport layer needs to distinguish. Batch checks that
//! must report every problem at once collect their findings in an
//! [`ErrorList`].

use std::fmt;

use thiserror::Error;

/// Kind of record a lookup failed to find.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    /// A distro template.
    Distro,
    /// A task.
    Task,
    /// A user account.
    User,
    /// A container pool.
    ContainerPool,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Distro => "distro",
            Self::Task => "task",
            Self::User => "user",
            Self::ContainerPool => "container pool",
        };
        f.write_str(label)
    }
}

/// Errors raised while building host intents or querying spawned hosts.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProvisionError {
    /// Raised when a referenced distro, task, user, or pool does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Kind of record that was looked up.
        kind: EntityKind,
        /// Identifier used for the lookup.
        id: String,
    },
    /// Raised when settings are malformed or structurally invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Raised when `host.create` parameters do not match the expected shape.
    #[error("invalid host.create parameters: {0}")]
    Decode(String),
    /// Raised when a storage collaborator fails.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// Raised when a caller omits a required argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Raised when several independent steps failed together.
    #[error("{0}")]
    Aggregate(ErrorList<ProvisionError>),
}

impl ProvisionError {
    /// Builds a [`ProvisionError::NotFound`] for the given record.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Non-empty, ordered collection of errors reported together.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorList<E> {
    errors: Vec<E>,
}

impl<E> ErrorList<E> {
    /// Wraps the collected errors, returning `None` when nothing failed.
    #[must_use]
    pub fn from_vec(errors: Vec<E>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Converts collected errors into a `Result`, failing when any exist.
    ///
    /// # Errors
    ///
    /// Returns the list when at least one error was collected.
    pub fn into_result(errors: Vec<E>) -> Result<(), Self> {
        Self::from_vec(errors).map_or(Ok(()), Err)
    }

    /// Returns the number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; an [`ErrorList`] holds at least one error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the collected errors in the order they were found.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.errors.iter()
    }

    /// Returns the collected errors.
    #[must_use]
    pub fn into_vec(self) -> Vec<E> {
        self.errors
    }
}

impl<'a, E> IntoIterator for &'a ErrorList<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: fmt::Display> fmt::Display for ErrorList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl<E: std::error::Error> std::error::Error for ErrorList<E> {}
