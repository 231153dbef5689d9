//! Error types for ring operations

/// Result alias used by every public ring operation
pub type RingResult<T> = Result<T, RingError>;

/// Errors returned by the ring
///
/// All of them are local and recoverable: the ring is left unchanged when
/// one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// No node is present, nothing can be looked up or assigned
    #[error("ring is empty: no nodes available")]
    Empty,

    /// The referenced node is not part of the ring
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The key has no recorded assignment
    #[error("key not assigned: {0}")]
    KeyNotFound(String),

    /// A node with this id is already part of the ring
    #[error("node already exists: {0}")]
    AlreadyExists(String),

    /// Node ids must be non-empty
    #[error("node id must not be empty")]
    InvalidNodeId,
}

/// Coarse classification of a [`RingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Empty,
    NotFound,
    AlreadyExists,
    Invalid,
}

impl RingError {
    /// Collapse node and key lookups failures into a single `NotFound` kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            RingError::Empty => ErrorKind::Empty,
            RingError::NodeNotFound(_) | RingError::KeyNotFound(_) => ErrorKind::NotFound,
            RingError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RingError::InvalidNodeId => ErrorKind::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_not_found() {
        assert_eq!(RingError::NodeNotFound("a".into()).kind(), ErrorKind::NotFound);
        assert_eq!(RingError::KeyNotFound("k".into()).kind(), ErrorKind::NotFound);
        assert_eq!(RingError::Empty.kind(), ErrorKind::Empty);
        assert_eq!(RingError::AlreadyExists("a".into()).kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_display_names_the_subject() {
        assert_eq!(RingError::NodeNotFound("cache-2".into()).to_string(), "node not found: cache-2");
        assert_eq!(RingError::KeyNotFound("user:1".into()).to_string(), "key not assigned: user:1");
    }
}
