// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

#![allow(dead_code)]

use castr::{serve, Config, ServerState};

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

pub const BASE_URL: &str = "http://media.test";
pub const FEED_PATH: &str = "/feed.xml";

/// 在临时目录中运行的服务器实例
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
    pub handle: JoinHandle<()>,
    pub root: PathBuf,
    pub config_path: PathBuf,
    _dir: TempDir,
}

pub fn config_text(root: &Path) -> String {
    format!(
        "[rss]\ntitle = \"Test Library\"\ndescription = \"Audio under test\"\nurl = \"{}\"\n\n[server]\nlisten = \"127.0.0.1:0\"\nfeed_path = \"{}\"\nfile_root = {:?}\nstreaming_threshold = 1024\nchunk_size = 100\n",
        BASE_URL,
        FEED_PATH,
        root.to_str().unwrap()
    )
}

/// 写入文件并把修改时间设置为 `secs`（Unix 时间戳）
pub fn write_file(root: &Path, relative: &str, contents: &[u8], secs: u64) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    set_mtime(&path, secs);
    path
}

pub fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(mtime(secs)).unwrap();
}

pub fn mtime(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

pub async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("media");
    fs::create_dir(&root).unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, config_text(&root)).unwrap();

    let config = Config::load(&config_path).unwrap();
    config.validate().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(ServerState::new(&config_path, config));
    let handle = tokio::spawn(serve(listener, Arc::clone(&state)));

    TestServer {
        addr,
        state,
        handle,
        root,
        config_path,
        _dir: dir,
    }
}

/// 解析后的 HTTP 响应
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await.unwrap();
    parse_response(&bytes)
}

pub async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    let request = format!("GET {} HTTP/1.1\r\nHost: media.test\r\n\r\n", path);
    send_raw(addr, request.as_bytes()).await
}

pub fn parse_response(bytes: &[u8]) -> RawResponse {
    let split = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = std::str::from_utf8(&bytes[..split]).unwrap();
    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);
    let headers = lines
        .filter_map(|l| l.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    RawResponse {
        status,
        headers,
        body: bytes[split + 4..].to_vec(),
    }
}
