//! Textual rendering of decoded services.
//!
//! Output is assembled into a [`RenderBuf`] that enforces a hard byte
//! limit: it never writes past the limit and truncates only at UTF-8
//! character boundaries. Every user-visible master literal passes through
//! the caller's [`Translate`] implementation before `%`-token substitution,
//! so a catalogue can swap the English text for another language while the
//! renderer supplies the values.

use bitvec::prelude::*;
use chrono::{TimeZone, Utc};

use crate::locale::Translate;
use crate::node::{
    DirEntry, FileAttr, FileClose, FileOpenReq, FileOpenResp, FileReadReq, FileReadResp, FileSpec,
    Init, NameReq, Node, TypeConstraint, TypeDesc, VarSpec, WriteReq, WriteResult,
};
use crate::service::{Service, ServiceId, ServiceKind};
use crate::text::MmsStr;
use crate::value::{BinaryTime, DataValue, UtcTime};

/// An output buffer with a hard byte limit.
pub struct RenderBuf {
    out: String,
    limit: usize,
}

impl RenderBuf {
    pub fn new(limit: usize) -> Self {
        RenderBuf {
            out: String::new(),
            limit,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Append `s`, truncating at the limit on a character boundary.
    pub fn push_str(&mut self, s: &str) {
        let room = self.limit - self.out.len();
        if s.len() <= room {
            self.out.push_str(s);
            return;
        }
        let mut cut = room;
        while cut > 0 && !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.out.push_str(&s[..cut]);
    }

    pub fn push_char(&mut self, c: char) {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp));
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Substitute printf-style tokens (`%s %u %d %c %f %x`, with optional
/// width such as `%04d`) with pre-formatted arguments, in order. `%%`
/// emits a literal percent sign.
pub(crate) fn fill(template: &str, args: &[&str]) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + 16);
    let mut arg = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'%' {
                out.push('%');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j].is_ascii_digit() || bytes[j] == b'.') {
                j += 1;
            }
            if j < bytes.len() && matches!(bytes[j], b'd' | b'u' | b's' | b'c' | b'f' | b'x' | b'X')
            {
                if let Some(a) = args.get(arg) {
                    out.push_str(a);
                }
                arg += 1;
                i = j + 1;
                continue;
            }
            out.push('%');
            i += 1;
        } else {
            let start = i;
            while i < bytes.len() && bytes[i] != b'%' {
                i += 1;
            }
            // runs split only at ASCII '%', so the boundary is valid
            out.push_str(&template[start..i]);
        }
    }
    out
}

/// The fixed DataAccessError name set; codes outside 0..=11 yield an
/// empty name.
pub fn data_error_name(code: u8) -> &'static str {
    match code {
        0 => "object-invalidated",
        1 => "hardware-fault",
        2 => "temporarily-unavailable",
        3 => "object-access-denied",
        4 => "object-undefined",
        5 => "invalid-address",
        6 => "type-unsupported",
        7 => "type-inconsistent",
        8 => "object-attribute-inconsistent",
        9 => "object-access-unsupported",
        10 => "object-non-existent",
        11 => "object-value-invalid",
        _ => "",
    }
}

/// Entry templates of the 85-bit services-supported bitmap, in bit order.
static SERVICE_NAMES: [&str; 85] = [
    "status:%s,\n",
    "getNameList:%s,\n",
    "identify:%s,\n",
    "rename:%s,\n",
    "read:%s,\n",
    "write:%s,\n",
    "getVariableAccessAttributes:%s,\n",
    "defineNamedVariable:%s,\n",
    "defineScatteredAccess:%s,\n",
    "getScatteredAccessAttributes:%s,\n",
    "deleteVariableAccess:%s,\n",
    "defineNamedVariableList:%s,\n",
    "getNamedVariableListAttributes:%s,\n",
    "deleteNamedVariableList:%s,\n",
    "defineNamedType:%s,\n",
    "getNamedTypeAttributes:%s,\n",
    "deleteNamedType:%s,\n",
    "input:%s,\n",
    "output:%s,\n",
    "takeControl:%s,\n",
    "relinquishControl:%s,\n",
    "defineSemaphore:%s,\n",
    "deleteSemaphore:%s,\n",
    "reportSemaphoreStatus:%s,\n",
    "reportPoolSemaphoreStatus:%s,\n",
    "reportSemaphoreEntryStatus:%s,\n",
    "initiateDownloadSequence:%s,\n",
    "downloadSegment:%s,\n",
    "terminateDownloadSequence:%s,\n",
    "initiateUploadSequence:%s,\n",
    "uploadSegment:%s,\n",
    "terminateUploadSequence:%s,\n",
    "requestDomainDownload:%s,\n",
    "requestDomainUpload:%s,\n",
    "loadDomainContent:%s,\n",
    "storeDomainContent:%s,\n",
    "deleteDomain:%s,\n",
    "getDomainAttributes:%s,\n",
    "createProgramInvocation:%s,\n",
    "deleteProgramInvocation:%s,\n",
    "start:%s,\n",
    "stop:%s,\n",
    "resume:%s,\n",
    "reset:%s,\n",
    "kill:%s,\n",
    "getProgramInvocationAttributes:%s,\n",
    "obtainFile:%s,\n",
    "defineEventCondition:%s,\n",
    "deleteEventCondition:%s,\n",
    "getEventConditionAttributes:%s,\n",
    "reportEventConditionStatus:%s,\n",
    "alterEventConditionMonitoring:%s,\n",
    "triggerEvent:%s,\n",
    "defineEventAction:%s,\n",
    "deleteEventAction:%s,\n",
    "getEventActionAttributes:%s,\n",
    "reportActionStatus:%s,\n",
    "defineEventEnrollment:%s,\n",
    "deleteEventEnrollment:%s,\n",
    "alterEventEnrollment:%s,\n",
    "reportEventEnrollmentStatus:%s,\n",
    "getEventEnrollmentAttributes:%s,\n",
    "acknowledgeEventNotification:%s,\n",
    "getAlarmSummary:%s,\n",
    "getAlarmEnrollmentSummary:%s,\n",
    "readJournal:%s,\n",
    "writeJournal:%s,\n",
    "initializeJournal:%s,\n",
    "reportJournalStatus:%s,\n",
    "createJournal:%s,\n",
    "deleteJournal:%s,\n",
    "getCapabilityList:%s,\n",
    "fileOpen:%s,\n",
    "fileRead:%s,\n",
    "fileClose:%s,\n",
    "fileRename:%s,\n",
    "fileDelete:%s,\n",
    "fileDirectory:%s,\n",
    "unsolicitedStatus:%s,\n",
    "informationReport:%s,\n",
    "eventNotification:%s,\n",
    "attachToEventCondition:%s,\n",
    "attachToSemaphore:%s,\n",
    "conclude:%s,\n",
    "cancel:%s,\n",
];

/// Entry templates of the 11-bit parameter CBB bitmap, in bit order.
static CBB_NAMES: [&str; 11] = [
    "str1:%s,\n",
    "str2:%s,\n",
    "vnam:%s,\n",
    "valt:%s,\n",
    "vadr:%s,\n",
    "vsca:%s,\n",
    "tpy:%s,\n",
    "vlis:%s,\n",
    "real:%s,\n",
    "spare_bit9:%s,\n",
    "cei:%s,\n",
];

fn bool_str(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

fn flag_char(flag: bool) -> &'static str {
    if flag {
        "T"
    } else {
        "F"
    }
}

/// Render a decoded service. A faulted service renders a parsing
/// diagnostic instead of its structure.
pub(crate) fn render_service(svc: &Service, tr: &dyn Translate, buf: &mut RenderBuf) {
    if let Some(fault) = svc.fault {
        let tpl = tr.translate("message parsing error:{error:%s, position:%u}");
        buf.push_str(&fill(tpl, &[fault.kind.name(), &fault.offset.to_string()]));
        return;
    }
    match &svc.kind {
        ServiceKind::Empty => {}
        ServiceKind::Request { service, items, .. } => {
            render_confirmed(buf, tr, *service, false, items, None, None)
        }
        ServiceKind::Response {
            service,
            items,
            more_follows,
            deletable,
            ..
        } => render_confirmed(buf, tr, *service, true, items, *more_follows, *deletable),
        ServiceKind::Report { values } => {
            buf.push_str(tr.translate("informationReport:{"));
            for value in values {
                buf.push_char('\n');
                render_value(value, tr, buf);
            }
            if !values.is_empty() {
                buf.push_char('\n');
            }
            buf.push_char('}');
        }
        ServiceKind::InitiateRequest(init) | ServiceKind::InitiateResponse(init) => {
            render_init(init, tr, buf)
        }
    }
}

/// Header literal for the list-style services; `None` for the services
/// that render their single node bare.
fn list_header(service: ServiceId, response: bool) -> Option<&'static str> {
    match (service, response) {
        (ServiceId::Read, false) => Some("readVarRequest:{"),
        (ServiceId::Read, true) => Some("readVarResponse:{"),
        (ServiceId::Write, false) => Some("writeVarRequest:{"),
        (ServiceId::Write, true) => Some("writeVarResponse:{"),
        (ServiceId::GetNameList, false) => Some("getNamesRequest:{"),
        (ServiceId::GetNameList, true) => Some("getNamesResponse:{"),
        (ServiceId::GetVariableAccessAttributes, false) => Some("varAccessAttributesRequest:{"),
        (ServiceId::GetVariableAccessAttributes, true) => Some("varAccessAttributesResponse:{"),
        (ServiceId::GetNamedVariableListAttributes, false) => Some("varListAttributesRequest:{"),
        (ServiceId::GetNamedVariableListAttributes, true) => Some("varListAttributesResponse:{"),
        (ServiceId::FileDirectory, false) => Some("fileDirRequest:{"),
        (ServiceId::FileDirectory, true) => Some("fileDirResponse:{"),
        (ServiceId::FileOpen, _) | (ServiceId::FileRead, _) | (ServiceId::FileClose, _) => None,
    }
}

fn render_confirmed(
    buf: &mut RenderBuf,
    tr: &dyn Translate,
    service: ServiceId,
    response: bool,
    items: &[Node],
    more_follows: Option<bool>,
    deletable: Option<bool>,
) {
    let header = match list_header(service, response) {
        Some(header) => header,
        None => {
            if let Some(node) = items.first() {
                render_node(node, tr, buf);
            }
            return;
        }
    };
    buf.push_str(tr.translate(header));
    let mut any = false;
    if let Some(flag) = deletable {
        buf.push_char('\n');
        buf.push_str(&fill(tr.translate("deletable:%c"), &[flag_char(flag)]));
        any = true;
    }
    for node in items {
        buf.push_char('\n');
        render_node(node, tr, buf);
        any = true;
    }
    if let Some(flag) = more_follows {
        buf.push_char('\n');
        buf.push_str(&fill(tr.translate("moreFollows:%c"), &[flag_char(flag)]));
        any = true;
    }
    if any {
        buf.push_char('\n');
    }
    buf.push_char('}');
}

pub(crate) fn render_node(node: &Node, tr: &dyn Translate, buf: &mut RenderBuf) {
    match node {
        Node::FileSpec(spec) => render_file_spec(spec, tr, buf),
        Node::DirEntry(entry) => render_dir_entry(entry, tr, buf),
        Node::VarSpec(spec) => render_var_spec(spec, tr, buf),
        Node::Data(value) => render_value(value, tr, buf),
        Node::NameReq(req) => render_name_req(req, tr, buf),
        Node::IdStr(name) => {
            buf.push_str(&fill(tr.translate("id_string:{%s}"), &[&name.display()]))
        }
        Node::WriteResult(result) => render_write_result(result, tr, buf),
        Node::WriteReq(req) => render_write_req(req, tr, buf),
        Node::FileOpenReq(req) => render_file_open_req(req, tr, buf),
        Node::FileOpenResp(resp) => render_file_open_resp(resp, tr, buf),
        Node::FileReadReq(req) => render_file_read_req(req, tr, buf),
        Node::FileReadResp(resp) => render_file_read_resp(resp, tr, buf),
        Node::FileClose(close) => render_file_close(close, tr, buf),
        Node::TypeDesc(desc) => render_type_desc(desc, tr, buf),
    }
}

fn render_file_spec(spec: &FileSpec, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("pathSpec:{path:%s}"),
        &[&spec.path.display()],
    ));
}

fn render_file_attr(attr: &FileAttr, tr: &dyn Translate, buf: &mut RenderBuf) {
    let tpl = tr.translate("fileAttr:{size:%u, UTC_stamp:%04d-%02d-%02d %02d:%02d:%02d}");
    let stamp = attr.stamp;
    buf.push_str(&fill(
        tpl,
        &[
            &attr.size.to_string(),
            &format!("{:04}", stamp.year),
            &format!("{:02}", stamp.month),
            &format!("{:02}", stamp.day),
            &format!("{:02}", stamp.hour),
            &format!("{:02}", stamp.minute),
            &format!("{:02}", stamp.second),
        ],
    ));
}

fn render_dir_entry(entry: &DirEntry, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("directoryEntry:{path:%s, "),
        &[&entry.name.display()],
    ));
    render_file_attr(&entry.attr, tr, buf);
    buf.push_char('}');
}

fn render_var_spec(spec: &VarSpec, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("varSpec:{%s/%s}"),
        &[&spec.domain.display(), &spec.item.display()],
    ));
}

fn render_name_req(req: &NameReq, tr: &dyn Translate, buf: &mut RenderBuf) {
    let class = tr.translate(req.class_name().unwrap_or(""));
    let vmd: MmsStr;
    let domain = if req.class == NameReq::DOMAIN && req.domain.is_empty() {
        vmd = MmsStr::from(tr.translate("vmdSpecific"));
        vmd.display()
    } else {
        req.domain.display()
    };
    buf.push_str(&fill(
        tr.translate("nameRequest:{type:%s, domain:%s"),
        &[class, &domain],
    ));
    if req.continue_after.is_empty() {
        buf.push_char('}');
    } else {
        buf.push_str(&fill(
            tr.translate(", continueAfter:%s}"),
            &[&req.continue_after.display()],
        ));
    }
}

fn render_write_result(result: &WriteResult, tr: &dyn Translate, buf: &mut RenderBuf) {
    if result.okay {
        buf.push_str(tr.translate("writeResult:{success}"));
        return;
    }
    let name = tr.translate(data_error_name(result.code));
    buf.push_str(&fill(tr.translate("writeResult:{%s}"), &[name]));
}

fn render_write_req(req: &WriteReq, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("writeValue:{%s/%s:"),
        &[&req.spec.domain.display(), &req.spec.item.display()],
    ));
    render_value(&req.value, tr, buf);
    buf.push_char('}');
}

fn render_file_open_req(req: &FileOpenReq, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("fileOpenRequest:{path:%s, position:%u}"),
        &[&req.path.display(), &req.position.to_string()],
    ));
}

fn render_file_open_resp(resp: &FileOpenResp, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("fileOpenResponse:{fileHandle:%u, "),
        &[&resp.frsm.to_string()],
    ));
    render_file_attr(&resp.attr, tr, buf);
    buf.push_char('}');
}

fn render_file_read_req(req: &FileReadReq, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("fileReadRequest:{fileHandle:%u}"),
        &[&req.frsm.to_string()],
    ));
}

fn render_file_read_resp(resp: &FileReadResp, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("fileReadResponse:{size:%u"),
        &[&resp.size.to_string()],
    ));
    if resp.size > 0 {
        let h = resp.head;
        buf.push_str(&fill(
            tr.translate(", start:0x%02x 0x%02x 0x%02x 0x%02x"),
            &[
                &format!("{:02x}", h[0]),
                &format!("{:02x}", h[1]),
                &format!("{:02x}", h[2]),
                &format!("{:02x}", h[3]),
            ],
        ));
        if resp.size >= 5 {
            let t = resp.tail;
            buf.push_str(&fill(
                tr.translate(", end:0x%02x 0x%02x 0x%02x 0x%02x}"),
                &[
                    &format!("{:02x}", t[0]),
                    &format!("{:02x}", t[1]),
                    &format!("{:02x}", t[2]),
                    &format!("{:02x}", t[3]),
                ],
            ));
        }
    }
    buf.push_str(&fill(
        tr.translate(", follow:%c}"),
        &[flag_char(resp.more_follows)],
    ));
}

fn render_file_close(close: &FileClose, tr: &dyn Translate, buf: &mut RenderBuf) {
    if close.request {
        buf.push_str(&fill(
            tr.translate("fileCloseRequest:{fileHandle:%u}"),
            &[&close.value.to_string()],
        ));
    } else if close.value == 0 {
        buf.push_str(tr.translate("fileCloseResponse:{success}"));
    } else {
        buf.push_str(tr.translate("fileCloseResponse:{failed}"));
    }
}

fn render_type_desc(desc: &TypeDesc, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("Attribute:{name:%s"),
        &[&desc.name.display()],
    ));
    match &desc.constraint {
        TypeConstraint::Nested(members) => {
            for member in members {
                buf.push_char(',');
                render_type_desc(member, tr, buf);
            }
        }
        constraint => {
            let name = tr.translate(TypeDesc::type_name(desc.code).unwrap_or(""));
            buf.push_str(&fill(tr.translate(", type:%s"), &[name]));
            if let TypeConstraint::MaxLength(max) = constraint {
                buf.push_str(&fill(tr.translate(", length:%u"), &[&max.to_string()]));
            }
        }
    }
    buf.push_char('}');
}

fn render_init(init: &Init, tr: &dyn Translate, buf: &mut RenderBuf) {
    buf.push_str(&fill(
        tr.translate("InitializePDU:{\nlocalDetailCalling:%u,\n"),
        &[&init.local_detail.to_string()],
    ));
    buf.push_str(&fill(
        tr.translate("maxCalling:%u,\n"),
        &[&init.max_calling.to_string()],
    ));
    buf.push_str(&fill(
        tr.translate("maxCalled:%u,\n"),
        &[&init.max_called.to_string()],
    ));
    buf.push_str(&fill(
        tr.translate("structNestLevel:%u,\n"),
        &[&init.nest_level.to_string()],
    ));

    buf.push_str(&fill(
        tr.translate("InitializeDetail:{\nversion: %u,\n"),
        &[&init.version.to_string()],
    ));

    buf.push_str(tr.translate("paramterCBB:{\n"));
    let cbb_bits = init.param_cbb[..].view_bits::<Msb0>();
    for (idx, name) in CBB_NAMES.iter().enumerate() {
        buf.push_str(&fill(tr.translate(name), &[bool_str(cbb_bits[idx])]));
    }
    buf.push_char('}');

    buf.push_str(tr.translate("\nservicesSupportedCalled:{\n"));
    let service_bits = init.services[..].view_bits::<Msb0>();
    for (idx, name) in SERVICE_NAMES.iter().enumerate() {
        buf.push_str(&fill(tr.translate(name), &[bool_str(service_bits[idx])]));
    }
    buf.push_char('}');

    buf.push_str("\n}");
    buf.push_str("\n}");
}

pub(crate) fn render_value(value: &DataValue, tr: &dyn Translate, buf: &mut RenderBuf) {
    match value {
        DataValue::Boolean(b) => {
            buf.push_str(&fill(tr.translate("boolean:{%s}"), &[bool_str(*b)]))
        }
        DataValue::Integer(i) => {
            buf.push_str(&fill(tr.translate("integer:{%d}"), &[&i.to_string()]))
        }
        DataValue::Unsigned(u) => buf.push_str(&fill(
            tr.translate("unsigned integer:{%u}"),
            &[&u.to_string()],
        )),
        DataValue::Float(f) => buf.push_str(&fill(
            tr.translate("float:{%f}"),
            &[&format!("{:.6}", f)],
        )),
        DataValue::BitString(raw) => render_bit_string(raw, tr, buf),
        DataValue::OctetString(raw) => {
            let mut hex = String::with_capacity(raw.len() * 2);
            for b in raw.as_bytes() {
                hex.push_str(&format!("{:02x}", b));
            }
            buf.push_str(&fill(
                tr.translate("octet-string:{length:%u, data:%s}"),
                &[&raw.len().to_string(), &hex],
            ));
        }
        DataValue::VisibleString(s) => buf.push_str(&fill(
            tr.translate("string:{length:%u, data:%s}"),
            &[&s.len().to_string(), &s.display()],
        )),
        DataValue::BinaryTime(bt) => buf.push_str(&fill(
            tr.translate("binary-time:{UTC:%s}"),
            &[&binary_time_text(bt)],
        )),
        DataValue::UtcTime(t) => {
            buf.push_str(&fill(tr.translate("UTC-time:{%s}"), &[&utc_time_text(t)]))
        }
        DataValue::Structure(children) => {
            buf.push_str(tr.translate("structure:{ "));
            for child in children {
                render_value(child, tr, buf);
                buf.push_char(' ');
            }
            buf.push_char('}');
        }
        DataValue::Error(code) => {
            let name = tr.translate(data_error_name(*code));
            buf.push_str(&fill(tr.translate("accessError:{%s}"), &[name]));
        }
        DataValue::Invalid => buf.push_str(tr.translate("invalid")),
    }
}

fn render_bit_string(raw: &MmsStr, tr: &dyn Translate, buf: &mut RenderBuf) {
    let bytes = raw.as_bytes();
    let (unused, payload) = match bytes.split_first() {
        Some((unused, payload)) => (usize::from(*unused), payload),
        None => (0, &[][..]),
    };
    let total = payload.len() * 8;
    let count = total - unused.min(total);
    let bits = payload.view_bits::<Msb0>();
    let mut digits = String::with_capacity(count);
    for idx in 0..count {
        digits.push(if bits[idx] { '1' } else { '0' });
    }
    buf.push_str(&fill(
        tr.translate("bit-string:{length:%u, data:%s}"),
        &[&count.to_string(), &digits],
    ));
}

/// 1984-01-01T00:00:00Z as a Unix timestamp: the binary-time epoch.
const BINARY_TIME_EPOCH: i64 = 441_763_200;

fn binary_time_text(bt: &BinaryTime) -> String {
    let secs =
        BINARY_TIME_EPOCH + i64::from(bt.days) * 86_400 + i64::from(bt.msecs / 1000);
    clock_text(secs, bt.msecs % 1000)
}

fn utc_time_text(t: &UtcTime) -> String {
    let millis = (u32::from(t.fraction) * 1000) >> 16;
    clock_text(i64::from(t.seconds), millis)
}

fn clock_text(secs: i64, millis: u32) -> String {
    match Utc.timestamp_opt(secs, 0).single() {
        Some(dt) => format!("{}.{:03}", dt.format("%Y-%m-%d %H:%M:%S"), millis),
        None => format!("0000-00-00 00:00:00.{:03}", millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Identity;

    fn render(value: &DataValue) -> String {
        let mut buf = RenderBuf::new(4096);
        render_value(value, &Identity, &mut buf);
        buf.finish()
    }

    #[test]
    fn fill_substitutes_in_order() {
        assert_eq!(
            fill("varSpec:{%s/%s}", &["LD0", "ST$Beh$stVal"]),
            "varSpec:{LD0/ST$Beh$stVal}"
        );
        assert_eq!(fill("size:%u, at:%04d", &["9", "0042"]), "size:9, at:0042");
        assert_eq!(fill("100%%", &[]), "100%");
    }

    #[test]
    fn buffer_never_exceeds_its_limit() {
        let mut buf = RenderBuf::new(10);
        buf.push_str("0123456789abcdef");
        buf.push_str("more");
        buf.push_char('!');
        let out = buf.finish();
        assert_eq!(out, "0123456789");
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn buffer_truncates_on_char_boundaries() {
        let mut buf = RenderBuf::new(4);
        buf.push_str("a文字");
        let out = buf.finish();
        assert!(out.len() <= 4);
        assert_eq!(out, "a文");
    }

    #[test]
    fn primitive_values() {
        assert_eq!(render(&DataValue::Boolean(true)), "boolean:{true}");
        assert_eq!(render(&DataValue::Integer(-5)), "integer:{-5}");
        assert_eq!(
            render(&DataValue::Unsigned(1000)),
            "unsigned integer:{1000}"
        );
        assert_eq!(render(&DataValue::Float(1.5)), "float:{1.500000}");
        assert_eq!(
            render(&DataValue::VisibleString(MmsStr::from("abc"))),
            "string:{length:3, data:abc}"
        );
        assert_eq!(
            render(&DataValue::OctetString(MmsStr::from(&[0xde, 0xad][..]))),
            "octet-string:{length:2, data:dead}"
        );
    }

    #[test]
    fn bit_string_digits_are_msb_first() {
        // 6 unused bits: 10 bits total from 0xaa 0x80
        let raw = MmsStr::from(&[0x06, 0xaa, 0x80][..]);
        assert_eq!(
            render(&DataValue::BitString(raw)),
            "bit-string:{length:10, data:1010101010}"
        );
    }

    #[test]
    fn binary_time_epoch_is_1984() {
        let v = DataValue::BinaryTime(BinaryTime { days: 0, msecs: 0 });
        assert_eq!(render(&v), "binary-time:{UTC:1984-01-01 00:00:00.000}");

        let v = DataValue::BinaryTime(BinaryTime {
            days: 1,
            msecs: 3_723_456,
        });
        assert_eq!(render(&v), "binary-time:{UTC:1984-01-02 01:02:03.456}");
    }

    #[test]
    fn utc_time_fraction_floors_to_millis() {
        let v = DataValue::UtcTime(UtcTime {
            seconds: 0,
            fraction: 0x8000,
        });
        assert_eq!(render(&v), "UTC-time:{1970-01-01 00:00:00.500}");
    }

    #[test]
    fn structure_children_are_space_separated() {
        let v = DataValue::Structure(vec![DataValue::Boolean(true), DataValue::Integer(7)]);
        assert_eq!(render(&v), "structure:{ boolean:{true} integer:{7} }");
    }

    #[test]
    fn access_error_names() {
        assert_eq!(
            render(&DataValue::Error(10)),
            "accessError:{object-non-existent}"
        );
        assert_eq!(render(&DataValue::Error(42)), "accessError:{}");
    }
}
