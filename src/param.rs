// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 集中定义服务器与订阅源生成共用的常量：
//! - HTTP 状态码及其原因短语。
//! - 静态文件服务使用的 MIME 类型映射表。
//! - 订阅源可收录的音频后缀白名单（有序，先匹配者优先）。
//! - RSS/Atom/iTunes 命名空间与订阅源响应的 `Content-Type`。
//! - HTTP 方法、版本及编码格式的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// 目录请求时优先返回的首页文件名
pub const HTML_INDEX: &str = "index.html";

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "castr";

/// HTTP 协议规定的换行符
pub const CRLF: &str = "\r\n";

/// 订阅源响应使用的 `Content-Type`
pub const FEED_CONTENT_TYPE: &str = "application/atom+xml";

/// `<atom:link>` 的 `type` 属性
pub const FEED_SELF_LINK_TYPE: &str = "application/rss+xml";

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const RSS_VERSION: &str = "2.0";

/// 可作为节目收录的音频后缀及其 MIME 类型。
///
/// 顺序即匹配优先级：文件名以哪个后缀结尾，就取第一个命中的条目。
pub const AUDIO_TYPES: &[(&str, &str)] = &[
    (".mp3", "audio/mpeg"),
    (".m4a", "audio/m4a"),
    (".m4b", "audio/m4b"),
];

lazy_static! {
    /// 服务器当前允许处理的 HTTP 方法列表，用于 `Allow` 响应头。
    pub static ref ALLOWED_METHODS: Vec<HttpRequestMethod> = {
        vec![
            HttpRequestMethod::Get,
            HttpRequestMethod::Head,
            HttpRequestMethod::Options,
        ]
    };
}

lazy_static! {
    /// 服务器会产生的 HTTP 状态码与原因短语。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(206, "Partial Content");
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(416, "Range Not Satisfiable");
        map.insert(500, "Internal Server Error");
        map
    };
}

lazy_static! {
    /// 静态文件后缀名（不含点）到 MIME 类型的映射表。
    ///
    /// 音频条目与 [`AUDIO_TYPES`] 保持一致，保证订阅源中的 `enclosure type`
    /// 与实际下载时的 `Content-Type` 相同。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        for &(suffix, mime) in AUDIO_TYPES {
            map.insert(suffix.trim_start_matches('.'), mime);
        }
        map.insert("aac", "audio/aac");
        map.insert("flac", "audio/flac");
        map.insert("ogg", "audio/ogg");
        map.insert("oga", "audio/ogg");
        map.insert("opus", "audio/opus");
        map.insert("wav", "audio/wav");
        map.insert("mp4", "video/mp4");
        map.insert("m4v", "video/mp4");
        map.insert("webm", "video/webm");
        map.insert("jpg", "image/jpeg");
        map.insert("jpeg", "image/jpeg");
        map.insert("png", "image/png");
        map.insert("gif", "image/gif");
        map.insert("webp", "image/webp");
        map.insert("svg", "image/svg+xml");
        map.insert("ico", "image/x-icon");
        map.insert("htm", "text/html;charset=utf-8");
        map.insert("html", "text/html;charset=utf-8");
        map.insert("css", "text/css;charset=utf-8");
        map.insert("js", "text/javascript;charset=utf-8");
        map.insert("json", "application/json");
        map.insert("xml", "text/xml");
        map.insert("txt", "text/plain;charset=utf-8");
        map.insert("md", "text/markdown;charset=utf-8");
        map.insert("cue", "text/plain;charset=utf-8");
        map.insert("pdf", "application/pdf");
        map.insert("zip", "application/zip");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy)]
pub enum HttpVersion {
    V1_1,
}

/// 可识别的 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    Get,
    Head,
    Options,
    Post,
}

/// 支持的内容编码（压缩）格式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpEncoding {
    Gzip,
    Deflate,
    Br,
}

use std::fmt;

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_1 => write!(f, "HTTP/1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
            HttpRequestMethod::Post => write!(f, "POST"),
        }
    }
}

impl fmt::Display for HttpEncoding {
    /// `Content-Encoding` 头所使用的标识符
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpEncoding::Gzip => write!(f, "gzip"),
            HttpEncoding::Deflate => write!(f, "deflate"),
            HttpEncoding::Br => write!(f, "br"),
        }
    }
}
