//! The decoded message: service class, payload and fault state.

use std::fmt;

use crate::error::Fault;
use crate::locale::{ProcessLocale, Translate};
use crate::node::{Init, Node};
use crate::render::{render_service, RenderBuf};
use crate::value::DataValue;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The confirmed services this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServiceId {
    FileOpen,
    FileRead,
    FileClose,
    FileDirectory,
    GetNameList,
    Read,
    Write,
    GetVariableAccessAttributes,
    GetNamedVariableListAttributes,
}

impl ServiceId {
    /// The wire service-id byte.
    pub fn code(self) -> u8 {
        match self {
            ServiceId::FileOpen => 0x48,
            ServiceId::FileRead => 0x49,
            ServiceId::FileClose => 0x4a,
            ServiceId::FileDirectory => 0x4d,
            ServiceId::GetNameList => 0xa1,
            ServiceId::Read => 0xa4,
            ServiceId::Write => 0xa5,
            ServiceId::GetVariableAccessAttributes => 0xa6,
            ServiceId::GetNamedVariableListAttributes => 0xac,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<ServiceId> {
        match code {
            0x48 => Some(ServiceId::FileOpen),
            0x49 => Some(ServiceId::FileRead),
            0x4a => Some(ServiceId::FileClose),
            0x4d => Some(ServiceId::FileDirectory),
            0xa1 => Some(ServiceId::GetNameList),
            0xa4 => Some(ServiceId::Read),
            0xa5 => Some(ServiceId::Write),
            0xa6 => Some(ServiceId::GetVariableAccessAttributes),
            0xac => Some(ServiceId::GetNamedVariableListAttributes),
            _ => None,
        }
    }
}

/// Message class and payload of a decoded PDU.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServiceKind {
    /// A Confirmed-Request PDU.
    Request {
        invoke_id: u32,
        service: ServiceId,
        items: Vec<Node>,
    },

    /// A Confirmed-Response PDU. `more_follows` and `deletable` are
    /// populated only for the services that define them.
    Response {
        invoke_id: u32,
        service: ServiceId,
        items: Vec<Node>,
        more_follows: Option<bool>,
        deletable: Option<bool>,
    },

    /// An unsolicited informationReport.
    Report { values: Vec<DataValue> },

    InitiateRequest(Init),

    InitiateResponse(Init),

    /// Nothing was recognised before the first fault.
    Empty,
}

/// A decoded MMS message.
///
/// [`parse`](crate::parse) always returns a `Service`; when decoding fails
/// partway, `fault` records the first failure and the payload holds
/// whatever was understood before it. The service owns its whole tree and
/// dropping it drops everything exactly once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Service {
    pub kind: ServiceKind,
    pub fault: Option<Fault>,
}

impl Service {
    pub(crate) fn empty() -> Service {
        Service {
            kind: ServiceKind::Empty,
            fault: None,
        }
    }

    /// The stable error code: 0 for success, negative otherwise.
    pub fn error_code(&self) -> i32 {
        self.fault.map_or(0, |f| f.kind.code())
    }

    /// The byte offset of the first fault; 0 for success.
    pub fn offset(&self) -> usize {
        self.fault.map_or(0, |f| f.offset)
    }

    /// The invoke id, for the confirmed classes that carry one.
    pub fn invoke_id(&self) -> Option<u32> {
        match self.kind {
            ServiceKind::Request { invoke_id, .. } | ServiceKind::Response { invoke_id, .. } => {
                Some(invoke_id)
            }
            _ => None,
        }
    }

    /// Render through `translator`, writing at most `limit` bytes.
    ///
    /// Faulted services render a parsing diagnostic instead of their
    /// structure. The result is always valid UTF-8 and never longer than
    /// `limit` bytes.
    pub fn to_text(&self, translator: &dyn Translate, limit: usize) -> String {
        let mut buf = RenderBuf::new(limit);
        render_service(self, translator, &mut buf);
        buf.finish()
    }
}

impl fmt::Display for Service {
    /// Unbounded rendering through the process-wide locale.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(&ProcessLocale, usize::MAX))
    }
}
