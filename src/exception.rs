// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在处理请求与生成播客订阅源时可能出现的各类异常。
//!
//! ## 分类
//! - **协议层**：请求报文无法解析、方法或版本不受支持、路径非法、文件不存在。
//! - **订阅源生成**：配置文件错误、文件系统遍历失败、URL 构造失败、XML 序列化失败、
//!   以及没有任何可用节目（空订阅源）。
//!
//! 所有变体都不会被重试。订阅源相关的异常在连接处理器中被统一转换为 `500` 响应，
//! 不会导致进程退出。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行无法拆分为方法、路径与版本三部分。
    MalformedRequest,
    /// 使用了服务器无法识别的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 在文件根目录下未找到所请求的文件，对应 `404 Not Found`。
    FileNotFound,
    /// 请求路径包含 `..`、空字节或无法解码的字节序列，对应 `400 Bad Request`。
    InvalidPath,
    /// 配置文件缺失、无法读取、无法解析或未通过校验。
    Config(String),
    /// 遍历文件根目录或读取文件元数据时发生 I/O 错误。
    Filesystem(String),
    /// 订阅源基础 URL 或拼接出的节目 URL 无法解析。
    Url(String),
    /// XML 编码失败。
    Serialization(String),
    /// 文件根目录下没有任何符合条件的音频文件，因此不存在“最新节目”。
    EmptyFeed,
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequest => write!(f, "Malformed request line"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            FileNotFound => write!(f, "File not found (404)"),
            InvalidPath => write!(f, "Invalid path (400)"),
            Config(msg) => write!(f, "Configuration error: {}", msg),
            Filesystem(msg) => write!(f, "Filesystem error: {}", msg),
            Url(msg) => write!(f, "URL error: {}", msg),
            Serialization(msg) => write!(f, "XML serialization error: {}", msg),
            EmptyFeed => write!(f, "No episodes found under the file root"),
        }
    }
}

impl Exception {
    /// 该异常在连接处理器中应被映射到的 HTTP 状态码。
    pub fn status_code(&self) -> u16 {
        match self {
            FileNotFound => 404,
            InvalidPath | MalformedRequest | RequestIsNotUtf8 | UnsupportedHttpVersion => 400,
            UnSupportedRequestMethod => 405,
            Config(_) | Filesystem(_) | Url(_) | Serialization(_) | EmptyFeed => 500,
        }
    }
}
