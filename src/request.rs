// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求解析模块
//!
//! 将 TCP 流中读取的请求头字节解析为 `Request`：
//! 1. 请求行（方法、路径、版本）。
//! 2. `User-Agent`、`Accept-Encoding`、`Range` 标头。
//! 3. 路由用的路径：去掉查询串并进行百分号解码，拒绝 `..` 与空字节。

use crate::{exception::Exception, param::*};
use log::error;
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone)]
pub struct Request {
    method: HttpRequestMethod,
    /// 请求行中的原始目标（可能含查询串、仍为编码形式）
    path: String,
    version: HttpVersion,
    user_agent: String,
    /// 客户端支持的压缩编码（按出现顺序）
    accept_encoding: Vec<HttpEncoding>,
    /// `(起始字节, 结束字节)`，结束为 `None` 表示直到文件末尾
    range: Option<(u64, Option<u64>)>,
}

impl Request {
    /// 从请求头字节构建 `Request`。
    ///
    /// `id` 为连接序号，仅用于日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string.trim_end_matches('\0'),
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let mut lines = request_string.split(CRLF);
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split(' ').collect();
        if parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(Exception::MalformedRequest);
        }

        let method_str = parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "OPTIONS" => HttpRequestMethod::Options,
            "POST" => HttpRequestMethod::Post,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        let version_str = parts[parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 路径中含有未编码空格时尽量恢复
        let path = parts[1..parts.len() - 1].join(" ");

        let mut user_agent = String::new();
        let mut accept_encoding = vec![];
        let mut range = None;
        for line in lines {
            if line.is_empty() {
                break;
            }
            let (name, value) = match line.split_once(':') {
                Some((n, v)) => (n.trim().to_lowercase(), v.trim()),
                None => continue,
            };
            match name.as_str() {
                "user-agent" => user_agent = value.to_string(),
                "accept-encoding" => accept_encoding = parse_accept_encoding(value),
                "range" => range = parse_range(value),
                _ => {}
            }
        }

        Ok(Self {
            method,
            path,
            version,
            user_agent,
            accept_encoding,
            range,
        })
    }

    /// 路由使用的路径：去掉查询串与片段并解码。
    ///
    /// 解码结果不是合法 UTF-8、含有空字节或含有 `..` 路径段时返回 `Exception::InvalidPath`。
    pub fn route_path(&self) -> Result<String, Exception> {
        let raw = self.raw_path();
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| Exception::InvalidPath)?;
        if decoded.contains('\0') || decoded.split(['/', '\\']).any(|seg| seg == "..") {
            return Err(Exception::InvalidPath);
        }
        Ok(decoded.into_owned())
    }

    /// 去掉查询串与片段，但仍保持编码形式的路径
    pub fn raw_path(&self) -> &str {
        let end = self.path.find(['?', '#']).unwrap_or(self.path.len());
        &self.path[..end]
    }
}

/// 只要出现关键字即视为支持，忽略 q 值
fn parse_accept_encoding(value: &str) -> Vec<HttpEncoding> {
    let mut encodings = vec![];
    for token in value.split(',') {
        let name = token.split(';').next().unwrap_or_default().trim();
        let encoding = match name.to_lowercase().as_str() {
            "gzip" => HttpEncoding::Gzip,
            "deflate" => HttpEncoding::Deflate,
            "br" => HttpEncoding::Br,
            _ => continue,
        };
        if !encodings.contains(&encoding) {
            encodings.push(encoding);
        }
    }
    encodings
}

/// 解析单区间 `bytes=start-end`，多区间和后缀区间（`bytes=-500`）不支持，按无 Range 处理
fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let ranges = value.strip_prefix("bytes=")?;
    if ranges.contains(',') {
        return None;
    }
    let (start, end) = ranges.split_once('-')?;
    let start = start.trim().parse::<u64>().ok()?;
    let end = match end.trim() {
        "" => None,
        e => Some(e.parse::<u64>().ok()?),
    };
    Some((start, end))
}

impl Request {
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn accept_encoding(&self) -> &[HttpEncoding] {
        &self.accept_encoding
    }

    pub fn range(&self) -> Option<(u64, Option<u64>)> {
        self.range
    }
}
