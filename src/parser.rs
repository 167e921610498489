//! The service dispatcher.
//!
//! [`parse`] classifies a framed byte sequence by its first byte
//! (Confirmed-Request, Confirmed-Response, informationReport,
//! Initiate-Request, Initiate-Response), extracts the invoke id for the
//! confirmed classes, routes on the service-id byte, and runs the matching
//! per-service decoder. Every decoder shares the cursor discipline of
//! [`cursor`](crate::cursor): consume, count, and cross-check against the
//! enclosing length prefix.
//!
//! On failure the first fault is recorded on the returned service together
//! with whatever payload had been decoded up to that point; nothing is
//! discarded and nothing panics.

use crate::cursor::Cursor;
use crate::error::{ErrorKind, Fault, Result};
use crate::node::{
    DirEntry, FileAttr, FileClose, FileOpenReq, FileOpenResp, FileReadReq, FileReadResp, FileSpec,
    FileStamp, Init, NameReq, Node, TypeConstraint, TypeDesc, VarSpec, WriteReq, WriteResult,
};
use crate::service::{Service, ServiceId, ServiceKind};
use crate::text::MmsStr;
use crate::value::{decode_access_result, decode_value, DataValue, DATA_DEPTH_LIMIT};

/// Maximum nesting of structured type descriptors.
pub const TYPE_DEPTH_LIMIT: usize = 9;

/// Decode one framed MMS message.
///
/// Always returns a [`Service`]; a decode failure is recorded as the
/// service's fault next to the partially decoded payload.
pub fn parse(data: &[u8]) -> Service {
    let mut svc = Service::empty();
    if data.is_empty() {
        svc.fault = Some(Fault::new(ErrorKind::Null, 0));
        return svc;
    }
    let mut cur = Cursor::new(data);
    if let Err(fault) = dispatch(&mut cur, &mut svc) {
        svc.fault = Some(fault);
    }
    svc
}

fn dispatch(cur: &mut Cursor<'_>, svc: &mut Service) -> Result<()> {
    let at = cur.pos();
    match cur.u8()? {
        0xa0 => confirmed(cur, svc, false),
        0xa1 => confirmed(cur, svc, true),
        0xa3 => report(cur, svc),
        0xa8 => initiate(cur, svc, false),
        0xa9 => initiate(cur, svc, true),
        _ => Err(Fault::new(ErrorKind::MsgType, at)),
    }
}

/// Outer length prefix; it must cover the rest of the input exactly.
fn outer_length(cur: &mut Cursor<'_>) -> Result<usize> {
    let len = cur.length()?;
    let end = cur.pos() + len;
    if end != cur.input_len() {
        return Err(cur.fault(ErrorKind::Length));
    }
    Ok(end)
}

/// The invoke-id TLV: `0x02 len value`, at most four value bytes.
fn invoke(cur: &mut Cursor<'_>) -> Result<u32> {
    let at = cur.pos();
    if cur.u8()? != 0x02 {
        return Err(Fault::new(ErrorKind::Invoke, at));
    }
    let size_at = cur.pos();
    let size = cur.u8()? as usize;
    if size > 4 {
        return Err(Fault::new(ErrorKind::Invoke, size_at));
    }
    cur.uint(size)
}

fn confirmed(cur: &mut Cursor<'_>, svc: &mut Service, response: bool) -> Result<()> {
    let end = outer_length(cur)?;
    let invoke_id = invoke(cur)?;

    // file services arrive behind a context-specific prefix
    if let Some(0xbf) | Some(0x9f) = cur.peek() {
        cur.u8()?;
    }

    let sid_at = cur.pos();
    let sid = cur.u8()?;
    let service = ServiceId::from_code(sid).ok_or_else(|| {
        let kind = if response {
            ErrorKind::RespType
        } else {
            ErrorKind::ReqType
        };
        Fault::new(kind, sid_at)
    })?;

    let slen = cur.length()?;
    if cur.pos() + slen != end {
        return Err(cur.fault(ErrorKind::Length));
    }

    let mut items = Vec::new();
    let mut more_follows = None;
    let mut deletable = None;
    let result = if response {
        response_payload(cur, end, service, &mut items, &mut more_follows, &mut deletable)
    } else {
        request_payload(cur, end, service, &mut items)
    };
    svc.kind = if response {
        ServiceKind::Response {
            invoke_id,
            service,
            items,
            more_follows,
            deletable,
        }
    } else {
        ServiceKind::Request {
            invoke_id,
            service,
            items,
        }
    };
    result.and_then(|()| cur.close(end))
}

fn request_payload(
    cur: &mut Cursor<'_>,
    end: usize,
    service: ServiceId,
    items: &mut Vec<Node>,
) -> Result<()> {
    match service {
        ServiceId::Read => read_request(cur, end, items),
        ServiceId::Write => write_request(cur, end, items),
        ServiceId::GetNameList => name_list_request(cur, end, items),
        ServiceId::GetVariableAccessAttributes | ServiceId::GetNamedVariableListAttributes => {
            attributes_request(cur, end, items)
        }
        ServiceId::FileDirectory => file_dir_request(cur, end, items),
        ServiceId::FileOpen => file_open_request(cur, end, items),
        ServiceId::FileRead => {
            let frsm = cur.uint(end - cur.pos())?;
            items.push(Node::FileReadReq(FileReadReq { frsm }));
            Ok(())
        }
        ServiceId::FileClose => {
            let value = cur.uint(end - cur.pos())?;
            items.push(Node::FileClose(FileClose {
                request: true,
                value,
            }));
            Ok(())
        }
    }
}

fn response_payload(
    cur: &mut Cursor<'_>,
    end: usize,
    service: ServiceId,
    items: &mut Vec<Node>,
    more_follows: &mut Option<bool>,
    deletable: &mut Option<bool>,
) -> Result<()> {
    match service {
        ServiceId::Read => read_response(cur, end, items),
        ServiceId::Write => write_response(cur, end, items),
        ServiceId::GetNameList => name_list_response(cur, end, items, more_follows),
        ServiceId::GetVariableAccessAttributes => var_access_response(cur, end, items, deletable),
        ServiceId::GetNamedVariableListAttributes => var_list_response(cur, end, items, deletable),
        ServiceId::FileDirectory => file_dir_response(cur, end, items),
        ServiceId::FileOpen => file_open_response(cur, end, items),
        ServiceId::FileRead => file_read_response(cur, end, items),
        ServiceId::FileClose => {
            let value = if cur.pos() == end {
                0
            } else {
                cur.uint(end - cur.pos())?
            };
            items.push(Node::FileClose(FileClose {
                request: false,
                value,
            }));
            Ok(())
        }
    }
}

/// A wrapper length that must reach exactly to `end`.
fn exact_wrapper(cur: &mut Cursor<'_>, tag: u8, end: usize) -> Result<()> {
    cur.expect(tag)?;
    let len = cur.length()?;
    if cur.pos() + len != end {
        return Err(cur.fault(ErrorKind::Length));
    }
    Ok(())
}

/// A fixed-width single-byte field: `tag 0x01 value`.
fn fixed_u8(cur: &mut Cursor<'_>, tag: u8) -> Result<u8> {
    cur.expect(tag)?;
    let at = cur.pos();
    if cur.length()? != 1 {
        return Err(Fault::new(ErrorKind::Length, at));
    }
    cur.u8()
}

/// A domain reference: `0xa1` wrapping two sibling IDENTIFIER items that
/// jointly fill it. The first is the domain name, the second the item
/// name.
fn domain_reference(cur: &mut Cursor<'_>, end: usize) -> Result<VarSpec> {
    exact_wrapper(cur, 0xa1, end)?;
    cur.expect(0x1a)?;
    let dlen = cur.length()?;
    if cur.peek_ahead(dlen) != Some(0x1a) {
        return Err(Fault::new(ErrorKind::Domain, cur.pos() + dlen));
    }
    let domain = MmsStr::from(cur.bytes(dlen)?);
    cur.expect(0x1a)?;
    let ilen = cur.length()?;
    if cur.pos() + ilen != end {
        return Err(cur.fault(ErrorKind::Length));
    }
    let item = MmsStr::from(cur.bytes(ilen)?);
    Ok(VarSpec { domain, item })
}

/// One variable specification: `0x30` SEQUENCE of one `0xa0` name holding
/// a domain reference.
fn var_spec(cur: &mut Cursor<'_>) -> Result<VarSpec> {
    cur.expect(0x30)?;
    let len = cur.length()?;
    let end = cur.pos() + len;
    exact_wrapper(cur, 0xa0, end)?;
    let spec = domain_reference(cur, end)?;
    cur.close(end)?;
    Ok(spec)
}

fn read_request(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    exact_wrapper(cur, 0xa1, end)?;
    exact_wrapper(cur, 0xa0, end)?;
    while cur.pos() < end {
        items.push(Node::VarSpec(var_spec(cur)?));
    }
    cur.close(end)
}

fn read_response(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    exact_wrapper(cur, 0xa1, end)?;
    while cur.pos() < end {
        items.push(Node::Data(decode_access_result(cur)?));
    }
    cur.close(end)
}

fn write_request(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    cur.expect(0xa0)?;
    let len = cur.length()?;
    let specs_end = cur.pos() + len;
    if specs_end > end {
        return Err(cur.fault(ErrorKind::Length));
    }
    let mut specs = Vec::new();
    while cur.pos() < specs_end {
        specs.push(var_spec(cur)?);
    }
    cur.close(specs_end)?;

    exact_wrapper(cur, 0xa0, end)?;
    let mut values = Vec::new();
    while cur.pos() < end {
        values.push(decode_value(cur, DATA_DEPTH_LIMIT)?);
    }
    cur.close(end)?;

    // the two lists zip positionally; a count mismatch still returns the
    // zipped prefix but flags the request
    let mismatch = specs.len() != values.len();
    let at = cur.pos();
    for (spec, value) in specs.into_iter().zip(values.into_iter()) {
        items.push(Node::WriteReq(WriteReq { spec, value }));
    }
    if mismatch {
        return Err(Fault::new(ErrorKind::Length, at));
    }
    Ok(())
}

fn write_response(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    while cur.pos() < end {
        let at = cur.pos();
        match cur.u8()? {
            0x81 => {
                let len_at = cur.pos();
                if cur.length()? != 0 {
                    return Err(Fault::new(ErrorKind::Length, len_at));
                }
                items.push(Node::WriteResult(WriteResult {
                    okay: true,
                    code: 0,
                }));
            }
            0x80 => {
                let len_at = cur.pos();
                if cur.length()? != 1 {
                    return Err(Fault::new(ErrorKind::Length, len_at));
                }
                items.push(Node::WriteResult(WriteResult {
                    okay: false,
                    code: cur.u8()?,
                }));
            }
            _ => return Err(Fault::new(ErrorKind::Flag, at)),
        }
    }
    Ok(())
}

fn name_list_request(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    cur.expect(0xa0)?;
    let len = cur.length()?;
    let class_end = cur.pos() + len;
    let class = fixed_u8(cur, 0x80)?;
    cur.close(class_end)?;

    let mut req = NameReq {
        class,
        ..NameReq::default()
    };

    cur.expect(0xa1)?;
    let slen = cur.length()?;
    let scope_end = cur.pos() + slen;
    if class == NameReq::DOMAIN {
        // empty vmd-specific scope; the domain text is substituted at
        // render time
        cur.expect(0x80)?;
        let at = cur.pos();
        if cur.length()? != 0 {
            return Err(Fault::new(ErrorKind::Length, at));
        }
    } else {
        cur.expect(0x81)?;
        let dlen = cur.length()?;
        req.domain.set(cur.bytes(dlen)?);
    }
    cur.close(scope_end)?;

    if cur.pos() < end && cur.peek() == Some(0x82) {
        cur.u8()?;
        let clen = cur.length()?;
        req.continue_after.set(cur.bytes(clen)?);
    }
    cur.close(end)?;
    items.push(Node::NameReq(req));
    Ok(())
}

fn name_list_response(
    cur: &mut Cursor<'_>,
    end: usize,
    items: &mut Vec<Node>,
    more_follows: &mut Option<bool>,
) -> Result<()> {
    while cur.pos() < end && cur.peek() == Some(0x1a) {
        cur.u8()?;
        let len = cur.length()?;
        items.push(Node::IdStr(MmsStr::from(cur.bytes(len)?)));
    }
    if cur.pos() < end && cur.peek() == Some(0x81) {
        cur.u8()?;
        let at = cur.pos();
        if cur.length()? != 1 {
            return Err(Fault::new(ErrorKind::Length, at));
        }
        *more_follows = Some(cur.u8()? != 0);
    }
    cur.close(end)
}

fn attributes_request(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    exact_wrapper(cur, 0xa0, end)?;
    let spec = domain_reference(cur, end)?;
    cur.close(end)?;
    items.push(Node::VarSpec(spec));
    Ok(())
}

/// `0x80 01 deletable` prefix shared by the attribute responses.
fn read_deletable(cur: &mut Cursor<'_>, deletable: &mut Option<bool>) -> Result<()> {
    *deletable = Some(fixed_u8(cur, 0x80)? != 0);
    Ok(())
}

fn var_access_response(
    cur: &mut Cursor<'_>,
    end: usize,
    items: &mut Vec<Node>,
    deletable: &mut Option<bool>,
) -> Result<()> {
    read_deletable(cur, deletable)?;
    exact_wrapper(cur, 0xa2, end)?;
    exact_wrapper(cur, 0xa2, end)?;
    while cur.pos() < end {
        items.push(Node::TypeDesc(type_desc(cur, TYPE_DEPTH_LIMIT)?));
    }
    cur.close(end)
}

fn var_list_response(
    cur: &mut Cursor<'_>,
    end: usize,
    items: &mut Vec<Node>,
    deletable: &mut Option<bool>,
) -> Result<()> {
    read_deletable(cur, deletable)?;
    exact_wrapper(cur, 0xa1, end)?;
    while cur.pos() < end {
        items.push(Node::VarSpec(var_spec(cur)?));
    }
    cur.close(end)
}

/// One type descriptor: `0x30 → 0x80 name, 0xa1 constraint`. The first
/// constraint byte is the type code; the complex code 0xa2 nests further
/// descriptors, bounded by `depth`.
fn type_desc(cur: &mut Cursor<'_>, depth: usize) -> Result<TypeDesc> {
    if depth == 0 {
        return Err(cur.fault(ErrorKind::Depth));
    }
    cur.expect(0x30)?;
    let len = cur.length()?;
    let end = cur.pos() + len;
    cur.expect(0x80)?;
    let nlen = cur.length()?;
    let name = MmsStr::from(cur.bytes(nlen)?);
    exact_wrapper(cur, 0xa1, end)?;
    let code_at = cur.pos();
    let code = cur.u8()?;
    let constraint = match code {
        0xa2 => {
            let mlen = cur.length()?;
            if cur.pos() + mlen != end {
                return Err(cur.fault(ErrorKind::Length));
            }
            let mut members = Vec::new();
            while cur.pos() < end {
                members.push(type_desc(cur, depth - 1)?);
            }
            TypeConstraint::Nested(members)
        }
        0x85 | 0x86 | 0x84 | 0x90 | 0x8a => {
            let clen = cur.length()?;
            TypeConstraint::MaxLength(cur.uint(clen)?)
        }
        0x83 | 0x91 => {
            let at = cur.pos();
            if cur.length()? != 0 {
                return Err(Fault::new(ErrorKind::Length, at));
            }
            TypeConstraint::None
        }
        0xa7 => {
            let at = cur.pos();
            if cur.length()? != 7 {
                return Err(Fault::new(ErrorKind::Length, at));
            }
            cur.bytes(7)?;
            TypeConstraint::Float
        }
        _ => return Err(Fault::new(ErrorKind::DataType, code_at)),
    };
    cur.close(end)?;
    Ok(TypeDesc {
        name,
        code,
        constraint,
    })
}

fn file_dir_request(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    exact_wrapper(cur, 0xa0, end)?;
    cur.expect(0x19)?;
    let plen = cur.length()?;
    if cur.pos() + plen != end {
        return Err(cur.fault(ErrorKind::Length));
    }
    items.push(Node::FileSpec(FileSpec {
        path: MmsStr::from(cur.bytes(plen)?),
    }));
    Ok(())
}

fn file_dir_response(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    exact_wrapper(cur, 0xa0, end)?;
    let count = cur.u8()? as usize;
    let len = cur.length()?;
    if cur.pos() + len != end {
        return Err(cur.fault(ErrorKind::Length));
    }
    let mut entries = Vec::new();
    while cur.pos() < end {
        entries.push(dir_entry(cur)?);
    }
    cur.close(end)?;
    // the declared count must match; otherwise the list is discarded
    if entries.len() != count {
        entries.clear();
    }
    items.extend(entries.into_iter().map(Node::DirEntry));
    Ok(())
}

/// One directory entry: `0x30` wrapping `0xa0 → 0x19 filename` and
/// `0xa1 → (0x80 size, 0x81 timestamp)`.
fn dir_entry(cur: &mut Cursor<'_>) -> Result<DirEntry> {
    cur.expect(0x30)?;
    let len = cur.length()?;
    let end = cur.pos() + len;
    cur.expect(0xa0)?;
    let nlen = cur.length()?;
    let name_end = cur.pos() + nlen;
    cur.expect(0x19)?;
    let flen = cur.length()?;
    if cur.pos() + flen != name_end {
        return Err(cur.fault(ErrorKind::Length));
    }
    let name = MmsStr::from(cur.bytes(flen)?);
    exact_wrapper(cur, 0xa1, end)?;
    let attr = file_attr(cur)?;
    cur.close(end)?;
    Ok(DirEntry { name, attr })
}

/// `0x80 size, 0x81 15-byte timestamp`. The timestamp's terminating byte
/// is consumed and discarded; the 14 digits must all be numeric.
fn file_attr(cur: &mut Cursor<'_>) -> Result<FileAttr> {
    cur.expect(0x80)?;
    let slen = cur.length()?;
    let size = cur.uint(slen)?;
    cur.expect(0x81)?;
    let at = cur.pos();
    if cur.length()? != 0x0f {
        return Err(Fault::new(ErrorKind::Length, at));
    }
    let stamp_at = cur.pos();
    let raw = cur.bytes(0x0f)?;
    let stamp = FileStamp::parse(&raw[..14])
        .ok_or_else(|| Fault::new(ErrorKind::DataNode, stamp_at))?;
    Ok(FileAttr { size, stamp })
}

fn file_open_request(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    cur.expect(0xa0)?;
    let len = cur.length()?;
    let wrap_end = cur.pos() + len;
    cur.expect(0x19)?;
    let plen = cur.length()?;
    if cur.pos() + plen != wrap_end {
        return Err(cur.fault(ErrorKind::Length));
    }
    let path = MmsStr::from(cur.bytes(plen)?);
    cur.expect(0x81)?;
    let vlen = cur.length()?;
    let position = cur.uint(vlen)?;
    cur.close(end)?;
    items.push(Node::FileOpenReq(FileOpenReq { path, position }));
    Ok(())
}

fn file_open_response(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    cur.expect(0x80)?;
    let flen = cur.length()?;
    let frsm = cur.uint(flen)?;
    exact_wrapper(cur, 0xa1, end)?;
    let attr = file_attr(cur)?;
    cur.close(end)?;
    items.push(Node::FileOpenResp(FileOpenResp { frsm, attr }));
    Ok(())
}

fn file_read_response(cur: &mut Cursor<'_>, end: usize, items: &mut Vec<Node>) -> Result<()> {
    cur.expect(0x80)?;
    let plen = cur.length()?;
    let payload = cur.bytes(plen)?;

    let mut node = FileReadResp::default();
    node.size = plen as u32;
    for (dst, src) in node.head.iter_mut().zip(payload.iter()) {
        *dst = *src;
    }
    if payload.len() >= 4 {
        node.tail.copy_from_slice(&payload[payload.len() - 4..]);
    }

    if cur.pos() < end && cur.peek() == Some(0x81) {
        cur.u8()?;
        let at = cur.pos();
        if cur.length()? != 1 {
            return Err(Fault::new(ErrorKind::Length, at));
        }
        node.more_follows = cur.u8()? != 0;
    }
    cur.close(end)?;
    items.push(Node::FileReadResp(node));
    Ok(())
}

fn report(cur: &mut Cursor<'_>, svc: &mut Service) -> Result<()> {
    let end = outer_length(cur)?;
    let mut values = Vec::new();
    let result = report_body(cur, end, &mut values);
    svc.kind = ServiceKind::Report { values };
    result
}

fn report_body(cur: &mut Cursor<'_>, end: usize, values: &mut Vec<DataValue>) -> Result<()> {
    exact_wrapper(cur, 0xa0, end)?;
    // the named-variable-list header carrying the report variant name
    cur.expect(0xa1)?;
    let nlen = cur.length()?;
    let name_end = cur.pos() + nlen;
    cur.expect(0x80)?;
    let vlen = cur.length()?;
    if cur.pos() + vlen != name_end {
        return Err(cur.fault(ErrorKind::Length));
    }
    cur.bytes(vlen)?;
    exact_wrapper(cur, 0xa0, end)?;
    while cur.pos() < end {
        values.push(decode_access_result(cur)?);
    }
    cur.close(end)
}

fn initiate(cur: &mut Cursor<'_>, svc: &mut Service, response: bool) -> Result<()> {
    let end = outer_length(cur)?;
    let mut init = Init::default();
    let result = initiate_body(cur, end, &mut init);
    svc.kind = if response {
        ServiceKind::InitiateResponse(init)
    } else {
        ServiceKind::InitiateRequest(init)
    };
    result
}

fn initiate_body(cur: &mut Cursor<'_>, end: usize, init: &mut Init) -> Result<()> {
    cur.expect(0x80)?;
    let dlen = cur.length()?;
    init.local_detail = cur.uint(dlen)?;
    init.max_calling = fixed_u8(cur, 0x81)?;
    init.max_called = fixed_u8(cur, 0x82)?;
    init.nest_level = fixed_u8(cur, 0x83)?;

    exact_wrapper(cur, 0xa4, end)?;
    init.version = fixed_u8(cur, 0x80)?;

    cur.expect(0x81)?;
    let at = cur.pos();
    if cur.length()? != 3 {
        return Err(Fault::new(ErrorKind::Length, at));
    }
    init.cbb_padding = cur.u8()?;
    let b = cur.bytes(2)?;
    init.param_cbb = [b[0], b[1]];

    cur.expect(0x82)?;
    let at = cur.pos();
    if cur.length()? != 0x0c {
        return Err(Fault::new(ErrorKind::Length, at));
    }
    init.services_padding = cur.u8()?;
    init.services.copy_from_slice(cur.bytes(11)?);
    cur.close(end)
}
