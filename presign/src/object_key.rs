use std::{fmt, str::FromStr};

use thiserror::Error;

/// Maximum key length accepted by S3, in bytes
pub const MAX_KEY_LENGTH: usize = 1024;

/// Reasons an object key is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectKeyError {
    /// Key is empty
    #[error("object key is empty")]
    Empty,

    /// Key is longer than [`MAX_KEY_LENGTH`]
    #[error("object key exceeds 1024 bytes")]
    TooLong,

    /// Key has no `/` separating owner and file name
    #[error("object key must have the form ownerId/fileName")]
    MissingOwner,

    /// Key contains an empty, `.` or `..` segment
    #[error("object key contains an invalid path segment: {0:?}")]
    InvalidSegment(String),
}

/// Address of a single object, by convention `{ownerId}/{fileName}`
///
/// The owner segment is everything before the first `/`; the file name is the
/// remainder and may itself contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    key: String,
    owner_len: usize,
}

impl ObjectKey {
    /// Builds a key from its two parts
    ///
    /// # Errors
    ///
    /// Returns an `ObjectKeyError` when the joined key is not a valid key
    pub fn new(owner_id: &str, file_name: &str) -> Result<Self, ObjectKeyError> {
        if owner_id.contains('/') {
            return Err(ObjectKeyError::InvalidSegment(owner_id.to_string()));
        }
        format!("{owner_id}/{file_name}").parse()
    }

    /// Owner segment of the key
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.key[..self.owner_len]
    }

    /// File name part of the key, after the owner segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.key[self.owner_len + 1..]
    }

    /// Full key as stored in the bucket
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl FromStr for ObjectKey {
    type Err = ObjectKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if key.is_empty() {
            return Err(ObjectKeyError::Empty);
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(ObjectKeyError::TooLong);
        }

        let owner_len = key.find('/').ok_or(ObjectKeyError::MissingOwner)?;

        if let Some(segment) = key
            .split('/')
            .find(|segment| segment.is_empty() || *segment == "." || *segment == "..")
        {
            return Err(ObjectKeyError::InvalidSegment(segment.to_string()));
        }

        Ok(Self {
            key: key.to_string(),
            owner_len,
        })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
