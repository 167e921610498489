//! A [sans-I/O](https://sans-io.readthedocs.io/how-to-sans-io.html)
//! decoder and pretty-printer for MMS (Manufacturing Message
//! Specification, ISO 9506) application-layer messages as used in
//! industrial automation, notably IEC 61850.
//!
//! The crate consumes one framed byte sequence and produces a structured
//! [`Service`] tree plus a human-readable rendering of it. There is no
//! networking here: transport, session and presentation layers are
//! somebody else's problem, and no encoder is provided.
//!
//! ```
//! // a read response carrying a single boolean
//! let frame = [0xa1, 0x0a, 0x02, 0x01, 0x01, 0xa4, 0x05, 0xa1, 0x03, 0x83, 0x01, 0x01];
//! let service = mms::parse(&frame);
//! assert_eq!(service.error_code(), 0);
//! let text = service.to_text(&mms::Identity, 1024);
//! assert!(text.contains("boolean:{true}"));
//! ```
//!
//! Decoding never panics and never discards: a malformed frame comes back
//! as a `Service` carrying the first [`Fault`] (kind plus byte offset) next
//! to whatever was decoded before it, and renders as a parsing diagnostic.
//!
//! Common abbreviations:
//!
//! - MMS: Manufacturing Message Specification;
//! - PDU: protocol data unit, one MMS application message;
//! - FRSM: file read state machine, an open-file handle;
//! - VMD: virtual manufacturing device;
//! - CBB: conformance building block;
//! - TLV: tag-length-value encoding, here a BER-derived variant;

mod cursor;
mod error;
mod locale;
mod node;
mod parser;
mod render;
mod service;
mod text;
mod value;

pub use error::{ErrorKind, Fault};
pub use locale::{locale, set_locale, Catalog, Identity, Lang, ProcessLocale, Translate};
pub use node::{
    DirEntry, FileAttr, FileClose, FileOpenReq, FileOpenResp, FileReadReq, FileReadResp, FileSpec,
    FileStamp, Init, NameReq, Node, TypeConstraint, TypeDesc, VarSpec, WriteReq, WriteResult,
};
pub use parser::{parse, TYPE_DEPTH_LIMIT};
pub use render::{data_error_name, RenderBuf};
pub use service::{Service, ServiceId, ServiceKind};
pub use text::MmsStr;
pub use value::{BinaryTime, DataValue, UtcTime, DATA_DEPTH_LIMIT};

/// Render `service` through the process-wide locale, writing at most
/// `limit` bytes. Convenience wrapper over [`Service::to_text`].
pub fn to_text(service: &Service, limit: usize) -> String {
    service.to_text(&ProcessLocale, limit)
}
