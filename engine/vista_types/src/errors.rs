//! Engine error taxonomy.
//!
//! Hard failures are returned as [`EngineError`]. They fall into three groups:
//!
//! - **Structural violations**: writing a read-only or return-value slot,
//!   invoking with an empty parameter, assigning an incompatible argument.
//! - **Unsupported operations**: unclassifiable types, refused collection
//!   changes, expressions that cannot be checked.
//! - **Domain failures**: errors raised by user getters, setters and
//!   operations, carried through unchanged.
//!
//! Soft conditions are not errors; they go to the registry's warning channel.
//!
//! Factory functions are the preferred way to build errors at call sites.

/// Result of a fallible engine operation.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    // Classification
    #[error("type `{name}` is not supported by the engine")]
    InvalidType { name: String },
    #[error("type `{name}` is already registered")]
    DuplicateType { name: String },

    // Structural
    #[error("`{node}` is read-only")]
    ReadOnly { node: String },
    #[error("`{node}` holds a return value and cannot be written")]
    ReturnValueReadOnly { node: String },
    #[error("missing argument `{name}` (position {index})")]
    MissingArgument { index: usize, name: String },
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    #[error("`{method}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("`{node}` is no longer attached to its owner")]
    DetachedNode { node: String },
    #[error("a `{found}` value has no identity to attach metadata to")]
    NotAReferenceValue { found: String },
    #[error("receiver is not a `{expected}`")]
    ReceiverMismatch { expected: String },

    // Unsupported
    #[error("unsupported collection change: {kind}")]
    UnsupportedChange { kind: String },
    #[error("malformed expression: {reason}")]
    MalformedExpression { reason: String },
    #[error("`{owner}` has no exposed member `{member}`")]
    UnknownMember { owner: String, member: String },

    // Domain
    #[error("{message}")]
    Domain { message: String },
}

impl EngineError {
    /// True for errors the caller caused by misusing a node.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EngineError::ReadOnly { .. }
                | EngineError::ReturnValueReadOnly { .. }
                | EngineError::MissingArgument { .. }
                | EngineError::TypeMismatch { .. }
                | EngineError::ArityMismatch { .. }
                | EngineError::IndexOutOfRange { .. }
                | EngineError::DetachedNode { .. }
                | EngineError::NotAReferenceValue { .. }
                | EngineError::ReceiverMismatch { .. }
        )
    }

    /// True for operations the engine refuses to perform at all.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidType { .. }
                | EngineError::UnsupportedChange { .. }
                | EngineError::MalformedExpression { .. }
                | EngineError::UnknownMember { .. }
        )
    }
}

#[cold]
pub fn invalid_type(name: impl Into<String>) -> EngineError {
    EngineError::InvalidType { name: name.into() }
}

#[cold]
pub fn duplicate_type(name: impl Into<String>) -> EngineError {
    EngineError::DuplicateType { name: name.into() }
}

#[cold]
pub fn read_only(node: impl Into<String>) -> EngineError {
    EngineError::ReadOnly { node: node.into() }
}

#[cold]
pub fn return_value_read_only(node: impl Into<String>) -> EngineError {
    EngineError::ReturnValueReadOnly { node: node.into() }
}

#[cold]
pub fn missing_argument(index: usize, name: impl Into<String>) -> EngineError {
    EngineError::MissingArgument {
        index,
        name: name.into(),
    }
}

#[cold]
pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> EngineError {
    EngineError::TypeMismatch {
        expected: expected.into(),
        found: found.into(),
    }
}

#[cold]
pub fn arity_mismatch(method: impl Into<String>, expected: usize, found: usize) -> EngineError {
    EngineError::ArityMismatch {
        method: method.into(),
        expected,
        found,
    }
}

#[cold]
pub fn index_out_of_range(index: usize, len: usize) -> EngineError {
    EngineError::IndexOutOfRange { index, len }
}

#[cold]
pub fn detached_node(node: impl Into<String>) -> EngineError {
    EngineError::DetachedNode { node: node.into() }
}

#[cold]
pub fn not_a_reference_value(found: impl Into<String>) -> EngineError {
    EngineError::NotAReferenceValue {
        found: found.into(),
    }
}

#[cold]
pub fn receiver_mismatch(expected: impl Into<String>) -> EngineError {
    EngineError::ReceiverMismatch {
        expected: expected.into(),
    }
}

#[cold]
pub fn unsupported_change(kind: impl Into<String>) -> EngineError {
    EngineError::UnsupportedChange { kind: kind.into() }
}

#[cold]
pub fn malformed_expression(reason: impl Into<String>) -> EngineError {
    EngineError::MalformedExpression {
        reason: reason.into(),
    }
}

#[cold]
pub fn unknown_member(owner: impl Into<String>, member: impl Into<String>) -> EngineError {
    EngineError::UnknownMember {
        owner: owner.into(),
        member: member.into(),
    }
}

/// Wrap a failure raised by domain code.
#[cold]
pub fn domain(message: impl Into<String>) -> EngineError {
    EngineError::Domain {
        message: message.into(),
    }
}
