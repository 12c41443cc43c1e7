// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 配置模块
//!
//! 从 TOML 文件加载订阅源元数据与服务器参数：
//!
//! ```toml
//! [rss]
//! title = "My Library"
//! description = "Audiobooks and talks"
//! url = "http://media.local:8080"
//!
//! [server]
//! listen = ":8080"
//! feed_path = "/feed.xml"
//! file_root = "/srv/media"
//! ```
//!
//! 缺失的字段被加载为空字符串，不会在加载阶段报错；使用前必须调用
//! [`Config::validate`]。订阅源处理器在每次请求时都会重新加载配置文件。

use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::warn;
use std::fs;
use std::path::Path;
use url::Url;

use crate::exception::Exception;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    rss: RssSection,
    #[serde(default)]
    server: ServerSection,
}

/// `[rss]` 段：订阅源频道信息
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RssSection {
    title: String,
    description: String,
    url: String,
}

/// `[server]` 段：监听地址、订阅源路径、文件根目录以及运行参数
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerSection {
    listen: String,
    feed_path: String,
    file_root: String,
    worker_threads: usize,
    streaming_threshold: u64,
    chunk_size: usize,
    enable_range_requests: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: String::new(),
            feed_path: String::new(),
            file_root: String::new(),
            worker_threads: 0,
            streaming_threshold: 10485760, // 10MB
            chunk_size: 262144,            // 256KB
            enable_range_requests: true,
        }
    }
}

impl Config {
    /// 读取并解析配置文件。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Exception> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Exception::Config(format!("无法读取配置文件{}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// 从 TOML 文本构建配置对象。
    pub fn parse(text: &str) -> Result<Self, Exception> {
        let mut config: Config = toml::from_str(text)
            .map_err(|e| Exception::Config(format!("无法解析配置文件: {}", e)))?;
        if config.server.worker_threads == 0 {
            config.server.worker_threads = num_cpus::get();
        }
        if config.server.chunk_size == 0 {
            warn!("chunk_size被设置为0，将使用默认值262144。");
            config.server.chunk_size = ServerSection::default().chunk_size;
        }
        Ok(config)
    }

    /// 检查订阅源生成所依赖的不变量：
    /// 基础 URL 可解析，订阅源路径以 `/` 开头，文件根目录存在且是目录。
    pub fn validate(&self) -> Result<(), Exception> {
        Url::parse(&self.rss.url)
            .map_err(|e| Exception::Url(format!("rss.url \"{}\": {}", self.rss.url, e)))?;
        if self.server.listen.is_empty() {
            return Err(Exception::Config("server.listen 不能为空".to_string()));
        }
        if !self.server.feed_path.starts_with('/') {
            return Err(Exception::Config(format!(
                "server.feed_path \"{}\" 必须以/开头",
                self.server.feed_path
            )));
        }
        let metadata = fs::metadata(&self.server.file_root).map_err(|e| {
            Exception::Filesystem(format!("server.file_root \"{}\": {}", self.server.file_root, e))
        })?;
        if !metadata.is_dir() {
            return Err(Exception::Config(format!(
                "server.file_root \"{}\" 不是目录",
                self.server.file_root
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn title(&self) -> &str {
        &self.rss.title
    }

    pub fn description(&self) -> &str {
        &self.rss.description
    }

    pub fn url(&self) -> &str {
        &self.rss.url
    }

    pub fn listen(&self) -> &str {
        &self.server.listen
    }

    /// 可直接交给 `TcpListener::bind` 的监听地址，`":8080"` 形式表示监听所有网卡。
    pub fn listen_addr(&self) -> String {
        if self.server.listen.starts_with(':') {
            format!("0.0.0.0{}", self.server.listen)
        } else {
            self.server.listen.clone()
        }
    }

    pub fn feed_path(&self) -> &str {
        &self.server.feed_path
    }

    pub fn file_root(&self) -> &str {
        &self.server.file_root
    }

    pub fn worker_threads(&self) -> usize {
        self.server.worker_threads
    }

    pub fn streaming_threshold(&self) -> u64 {
        self.server.streaming_threshold
    }

    pub fn chunk_size(&self) -> usize {
        self.server.chunk_size
    }

    pub fn enable_range_requests(&self) -> bool {
        self.server.enable_range_requests
    }
}
