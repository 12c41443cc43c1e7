// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 节目提取
//!
//! 把文件根目录下的一个文件转换为订阅源中的一期节目。
//! 只有文件名以 [`AUDIO_TYPES`] 中某个后缀结尾的文件才会被收录，其余文件被静默跳过。

use std::time::SystemTime;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::{
    config::Config,
    exception::Exception,
    param::AUDIO_TYPES,
    util::{format_rfc1123, parse_rfc1123},
};

/// 订阅源中的一期节目，仅在一次请求内存在。
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    title: String,
    pub_date: String,
    enclosure_url: String,
    mime_type: &'static str,
    length: u64,
}

impl Episode {
    pub fn new(
        title: String,
        pub_date: String,
        enclosure_url: String,
        mime_type: &'static str,
        length: u64,
    ) -> Self {
        Self {
            title,
            pub_date,
            enclosure_url,
            mime_type,
            length,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// RFC 1123 格式的发布时间
    pub fn pub_date(&self) -> &str {
        &self.pub_date
    }

    /// 发布时间的 Unix 时间戳，无法解析时为 `None`
    pub fn timestamp(&self) -> Option<i64> {
        parse_rfc1123(&self.pub_date)
    }

    pub fn enclosure_url(&self) -> &str {
        &self.enclosure_url
    }

    /// 节目没有独立的标识，`guid` 直接使用下载地址
    pub fn guid(&self) -> &str {
        &self.enclosure_url
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn length(&self) -> u64 {
        self.length
    }
}

/// 按白名单顺序查找第一个匹配的后缀，返回 `(后缀, MIME 类型)`。
pub fn match_audio_type(file_name: &str) -> Option<(&'static str, &'static str)> {
    AUDIO_TYPES
        .iter()
        .find(|(suffix, _)| file_name.ends_with(suffix))
        .copied()
}

/// 节目相对路径中需要编码的字符。`/` 保留为分隔符，`%` 保留并由 [`check_escapes`] 校验。
const ENCLOSURE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// 拼接下载地址：`base` 原样保留（不改写主机大小写与端口），`relative` 按路径段规则编码。
///
/// 结果必须是可解析的绝对 URL，且其中每个 `%` 都后随两位十六进制数字，否则返回 `Exception::Url`。
pub fn enclosure_url(base: &str, relative: &str) -> Result<String, Exception> {
    let url = format!("{}{}", base, utf8_percent_encode(relative, ENCLOSURE_PATH));
    check_escapes(&url)?;
    Url::parse(&url).map_err(|e| Exception::Url(format!("\"{}\": {}", url, e)))?;
    Ok(url)
}

fn check_escapes(url: &str) -> Result<(), Exception> {
    for (i, _) in url.match_indices('%') {
        let escape = url.get(i + 1..i + 3).unwrap_or_default();
        if escape.len() != 2 || !escape.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Exception::Url(format!("\"{}\": invalid URL escape", url)));
        }
    }
    Ok(())
}

/// 从单个文件构造节目。
///
/// - `file_name`：不含目录的文件名，用于匹配后缀和生成标题。
/// - `path`：遍历时得到的完整路径，去掉其中第一次出现的 `file_root` 后拼接到 `rss.url` 之后。
///
/// 标题是去掉**第一次出现**的后缀子串后的文件名，因此 `podcast.mp3.mp3`
/// 的标题是 `podcast.mp3`，而 `a.mp3b.mp3` 的标题是 `ab.mp3`。
///
/// 文件不在白名单内时返回 `Ok(None)`；拼出的 URL 无法解析时返回 `Exception::Url`。
pub fn extract_episode(
    file_name: &str,
    modified: SystemTime,
    size: u64,
    path: &str,
    config: &Config,
) -> Result<Option<Episode>, Exception> {
    let (suffix, mime_type) = match match_audio_type(file_name) {
        Some(found) => found,
        None => return Ok(None),
    };

    let title = file_name.replacen(suffix, "", 1);
    let relative = path.replacen(config.file_root(), "", 1);
    let enclosure_url = enclosure_url(config.url(), &relative)?;

    Ok(Some(Episode {
        title,
        pub_date: format_rfc1123(modified),
        enclosure_url,
        mime_type,
        length: size,
    }))
}
