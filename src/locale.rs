//! Message catalogues for rendered output.
//!
//! The renderer passes every user-visible master literal through a
//! [`Translate`] implementation before substituting values. The default is
//! the identity; a [`Catalog`] maps master literals to another language.
//! A thin process-wide locale ([`set_locale`]/[`ProcessLocale`]) wraps the
//! injectable for callers that do not want to thread a translator through.
//!
//! The contract is total: a translator never returns an empty string for a
//! mapped literal, and returns its input unchanged when no mapping exists.

use std::sync::RwLock;

/// Supported locale identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    EnUs,
    EnUk,
    ZhCn,
    ZhTw,
}

impl Lang {
    /// Numeric identifier of this locale.
    pub fn id(self) -> u32 {
        match self {
            Lang::EnUs => 1,
            Lang::EnUk => 2,
            Lang::ZhCn => 3,
            Lang::ZhTw => 4,
        }
    }

    /// Parse a locale tag such as `zh_CN`.
    pub fn from_tag(tag: &str) -> Option<Lang> {
        match tag {
            "en_US" => Some(Lang::EnUs),
            "en_UK" => Some(Lang::EnUk),
            "zh_CN" => Some(Lang::ZhCn),
            "zh_TW" => Some(Lang::ZhTw),
            _ => None,
        }
    }
}

/// Maps an English master literal to its localised form.
pub trait Translate {
    /// Returns the localised string for `source`, or `source` itself when
    /// no mapping exists. Never returns an empty string for a mapped
    /// literal and never fails.
    fn translate<'a>(&self, source: &'a str) -> &'a str;
}

/// The identity translator: English master strings pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Translate for Identity {
    fn translate<'a>(&self, source: &'a str) -> &'a str {
        source
    }
}

/// A static message catalogue.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pairs: &'static [(&'static str, &'static str)],
}

impl Catalog {
    /// The catalogue for `lang`. Locales without recorded translations
    /// fall back to an empty table, i.e. the identity.
    pub fn for_lang(lang: Lang) -> Catalog {
        match lang {
            Lang::ZhCn => Catalog { pairs: ZH_CN_PAIRS },
            Lang::EnUs | Lang::EnUk | Lang::ZhTw => Catalog { pairs: &[] },
        }
    }
}

impl Translate for Catalog {
    fn translate<'a>(&self, source: &'a str) -> &'a str {
        for (from, to) in self.pairs {
            if *from == source {
                return to;
            }
        }
        source
    }
}

static LOCALE: RwLock<Lang> = RwLock::new(Lang::EnUs);

/// Set the process-wide locale consulted by [`ProcessLocale`].
///
/// Changing the locale concurrently with rendering is not meaningful; set
/// it once at startup.
pub fn set_locale(lang: Lang) {
    let mut guard = LOCALE.write().unwrap_or_else(|e| e.into_inner());
    *guard = lang;
}

/// The current process-wide locale.
pub fn locale() -> Lang {
    *LOCALE.read().unwrap_or_else(|e| e.into_inner())
}

/// A translator backed by the process-wide locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLocale;

impl Translate for ProcessLocale {
    fn translate<'a>(&self, source: &'a str) -> &'a str {
        Catalog::for_lang(locale()).translate(source)
    }
}

/// Simplified-Chinese catalogue.
static ZH_CN_PAIRS: &[(&str, &str)] = &[
    (
        "message parsing error:{error:%s, position:%u}",
        "报文解析错误:{错误:%s, 位置:%u}",
    ),
    (
        "fileAttr:{size:%u, UTC_stamp:%04d-%02d-%02d %02d:%02d:%02d}",
        "文件属性:{大小:%u, UTC时间戳:%04d-%02d-%02d %02d:%02d:%02d}",
    ),
    (
        "fileOpenRequest:{path:%s, position:%u}",
        "文件打开请求:{路径:%s, 位置:%u}",
    ),
    (
        "fileOpenResponse:{fileHandle:%u, ",
        "文件打开响应:{文件句柄:%u, ",
    ),
    (
        "fileReadRequest:{fileHandle:%u}",
        "文件读取请求:{文件句柄:%u}",
    ),
    ("fileReadResponse:{size:%u", "文件读取响应:{大小：%u"),
    (
        ", start:0x%02x 0x%02x 0x%02x 0x%02x",
        ", 起始字节:0x%02x 0x%02x 0x%02x 0x%02x",
    ),
    (
        ", end:0x%02x 0x%02x 0x%02x 0x%02x}",
        ", 终止字节:0x%02X 0x%02x 0x%02x 0x%02x}",
    ),
    (", follow:%c}", ", 后续:%c}"),
    (
        "fileCloseRequest:{fileHandle:%u}",
        "文件关闭请求:{文件句柄:%u}",
    ),
    ("fileCloseResponse:{success}", "文件关闭响应:{成功}"),
    ("fileCloseResponse:{failed}", "文件关闭响应:{失败}"),
    ("fileDirRequest:{", "文件目录请求:{"),
    ("pathSpec:{path:%s}", "指定路径:{路径:%s}"),
    ("directoryEntry:{path:%s, ", "目录项:{路径:%s, "),
    ("varSpec:{%s/%s}", "指定变量:{%s/%s}"),
];
