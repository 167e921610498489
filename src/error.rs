//! Decode faults reported by this crate.
//!
//! Errors never unwind through the decoders as panics: every decoding
//! function returns a [`Fault`] carrying the failure kind and the byte
//! offset at which it was detected, and the dispatcher records the first
//! fault on the returned [`Service`](crate::Service) next to whatever was
//! decoded before the failure.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of decode failure kinds.
///
/// The numeric codes and `MMS_ERR_*` names are stable; they surface in
/// rendered diagnostics and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorKind {
    /// A required byte slice is missing or empty.
    #[error("MMS_ERR_NULL")]
    Null,

    /// A fixed tag byte did not match its expected value.
    #[error("MMS_ERR_FLAG")]
    Flag,

    /// A length prefix is invalid, overruns the input, or child and
    /// parent lengths disagree.
    #[error("MMS_ERR_LENGTH")]
    Length,

    /// An unknown value tag inside a Data CHOICE.
    #[error("MMS_ERR_DATATYPE")]
    DataType,

    /// An unknown top-level message class byte.
    #[error("MMS_ERR_MSGTYPE")]
    MsgType,

    /// The invoke-id field is malformed or wider than 32 bits.
    #[error("MMS_ERR_INVOKE")]
    Invoke,

    /// An unknown confirmed-request service id.
    #[error("MMS_ERR_REQTYPE")]
    ReqType,

    /// An unknown confirmed-response service id.
    #[error("MMS_ERR_RESPTYPE")]
    RespType,

    /// Allocation failure. Unreachable from safe Rust; retained so the
    /// diagnostic name set stays closed and stable.
    #[error("MMS_ERR_MEMALLOC")]
    MemAlloc,

    /// A sub-node could not be constructed from its decoded fields.
    #[error("MMS_ERR_DATANODE")]
    DataNode,

    /// A domain reference is structurally malformed.
    #[error("MMS_ERR_DOMAIN")]
    Domain,

    /// A recursion bound was exceeded.
    #[error("MMS_ERR_DEPTH")]
    Depth,
}

impl ErrorKind {
    /// The stable negative error code of this kind.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::Null => -1,
            ErrorKind::Flag => -2,
            ErrorKind::Length => -3,
            ErrorKind::DataType => -4,
            ErrorKind::MsgType => -5,
            ErrorKind::Invoke => -6,
            ErrorKind::ReqType => -7,
            ErrorKind::RespType => -8,
            ErrorKind::MemAlloc => -9,
            ErrorKind::DataNode => -10,
            ErrorKind::Domain => -11,
            ErrorKind::Depth => -12,
        }
    }

    /// The stable diagnostic name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Null => "MMS_ERR_NULL",
            ErrorKind::Flag => "MMS_ERR_FLAG",
            ErrorKind::Length => "MMS_ERR_LENGTH",
            ErrorKind::DataType => "MMS_ERR_DATATYPE",
            ErrorKind::MsgType => "MMS_ERR_MSGTYPE",
            ErrorKind::Invoke => "MMS_ERR_INVOKE",
            ErrorKind::ReqType => "MMS_ERR_REQTYPE",
            ErrorKind::RespType => "MMS_ERR_RESPTYPE",
            ErrorKind::MemAlloc => "MMS_ERR_MEMALLOC",
            ErrorKind::DataNode => "MMS_ERR_DATANODE",
            ErrorKind::Domain => "MMS_ERR_DOMAIN",
            ErrorKind::Depth => "MMS_ERR_DEPTH",
        }
    }
}

/// A decode failure: what went wrong and where.
///
/// `offset` is the cursor position at the point of failure, i.e. the
/// offset of the byte that could not be accepted. It always satisfies
/// `0 <= offset <= input.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[error("{kind} at byte offset {offset}")]
pub struct Fault {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl Fault {
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        Fault { kind, offset }
    }
}

/// Result alias used by every decoder in this crate.
pub(crate) type Result<T> = core::result::Result<T, Fault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let table = [
            (ErrorKind::Null, -1, "MMS_ERR_NULL"),
            (ErrorKind::Flag, -2, "MMS_ERR_FLAG"),
            (ErrorKind::Length, -3, "MMS_ERR_LENGTH"),
            (ErrorKind::DataType, -4, "MMS_ERR_DATATYPE"),
            (ErrorKind::MsgType, -5, "MMS_ERR_MSGTYPE"),
            (ErrorKind::Invoke, -6, "MMS_ERR_INVOKE"),
            (ErrorKind::ReqType, -7, "MMS_ERR_REQTYPE"),
            (ErrorKind::RespType, -8, "MMS_ERR_RESPTYPE"),
            (ErrorKind::MemAlloc, -9, "MMS_ERR_MEMALLOC"),
            (ErrorKind::DataNode, -10, "MMS_ERR_DATANODE"),
            (ErrorKind::Domain, -11, "MMS_ERR_DOMAIN"),
            (ErrorKind::Depth, -12, "MMS_ERR_DEPTH"),
        ];
        for (kind, code, name) in table.iter() {
            assert_eq!(kind.code(), *code);
            assert_eq!(kind.name(), *name);
            assert_eq!(kind.to_string(), *name);
        }
    }

    #[test]
    fn fault_display() {
        let fault = Fault::new(ErrorKind::Flag, 17);
        assert_eq!(fault.to_string(), "MMS_ERR_FLAG at byte offset 17");
    }
}
