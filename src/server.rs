// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接处理
//!
//! 监听循环为每个 TCP 连接派生一个任务，任务内完成：读取请求头 → 解析 → 路由 → 发送响应。
//!
//! 路由规则：
//! 1. 路径等于启动时配置的 `feed_path`：重新加载配置并生成订阅源。
//!    生成失败时返回不带响应体的 `500`，服务器继续运行。
//! 2. 其余路径映射到 `file_root` 下的静态文件；目录优先返回 `index.html`，否则返回目录列表。

use crate::{
    config::Config,
    exception::Exception,
    feed::Feed,
    param::{HttpRequestMethod, HTML_INDEX},
    request::Request,
    response::{FileStream, Response},
    rss,
};

use log::{debug, error, info, warn};
use tokio::{
    fs::File as TokioFile,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::Notify,
};

use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// 请求头的最大长度，超过后直接返回 `400`
const MAX_REQUEST_HEAD: usize = 8192;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// 所有连接共享的服务器状态
#[derive(Debug)]
pub struct ServerState {
    config_path: PathBuf,
    /// 启动时载入的配置，提供路由与传输参数
    config: Config,
    active_connection: Mutex<u32>,
    shutdown: Notify,
}

impl ServerState {
    pub fn new<P: Into<PathBuf>>(config_path: P, config: Config) -> Self {
        Self {
            config_path: config_path.into(),
            config,
            active_connection: Mutex::new(0),
            shutdown: Notify::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 当前活跃连接数
    pub fn active_connections(&self) -> u32 {
        self.active_connection.lock().map(|n| *n).unwrap_or(0)
    }

    /// 通知监听循环退出。已经建立的连接会继续处理完。
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    fn connection_opened(&self) {
        if let Ok(mut n) = self.active_connection.lock() {
            *n += 1;
        }
    }

    fn connection_closed(&self) {
        if let Ok(mut n) = self.active_connection.lock() {
            *n = n.saturating_sub(1);
        }
    }
}

/// 监听循环，直到 [`ServerState::shutdown`] 被调用。
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) {
    let mut id: u128 = 0;
    loop {
        let (mut stream, addr) = tokio::select! {
            _ = state.shutdown.notified() => {
                info!("主循环接收到停机指令，正在退出...");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    error!("接受TCP连接失败：{}", e);
                    continue;
                }
            },
        };
        debug!("新的连接：{}", addr);
        debug!("[ID{}]TCP连接已建立", id);

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            state.connection_opened();
            handle_connection(&mut stream, id, &state).await;
            state.connection_closed();
        });
        id += 1;
    }
}

/// 读取请求头，直到遇到空行、连接关闭或超过 [`MAX_REQUEST_HEAD`]。
async fn read_request_head(stream: &mut TcpStream, id: u128) -> Option<Vec<u8>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) if buffer.is_empty() => return None,
            Ok(0) => return Some(buffer),
            Ok(n) => n,
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                return None;
            }
        };
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            buffer.truncate(pos + 4);
            return Some(buffer);
        }
        if buffer.len() > MAX_REQUEST_HEAD {
            return Some(buffer);
        }
    }
}

/// 丢弃客户端尚未发送完的数据，最多等待 `DRAIN_TIMEOUT`
async fn discard_remaining(stream: &mut TcpStream) {
    let mut sink = [0u8; 1024];
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while let Ok(n) = stream.read(&mut sink).await {
            if n == 0 {
                break;
            }
        }
    })
    .await;
}

async fn handle_connection(stream: &mut TcpStream, id: u128, state: &ServerState) {
    let head = match read_request_head(stream, id).await {
        Some(head) => head,
        None => return,
    };
    debug!("[ID{}]HTTP请求接收完毕", id);

    let start_time = Instant::now();

    if head.len() > MAX_REQUEST_HEAD {
        warn!("[ID{}]请求头超过{}字节，返回400", id, MAX_REQUEST_HEAD);
        send(stream, &Response::from_status_code(400, &[], false, id), id).await;
        discard_remaining(stream).await;
        return;
    }

    let request = match Request::try_from(&head, id) {
        Ok(req) => req,
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            send(stream, &Response::from_status_code(e.status_code(), &[], false, id), id).await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    let response = match request.method() {
        HttpRequestMethod::Options => Response::from_status_code(204, request.accept_encoding(), false, id),
        HttpRequestMethod::Get | HttpRequestMethod::Head => route(&request, id, state).await,
        _ => Response::from_status_code(405, request.accept_encoding(), false, id),
    };

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, ",
        id,
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    send(stream, &response, id).await;
    if let Some(file) = response.stream() {
        send_file(stream, file, state.config().chunk_size(), id).await;
    }
}

async fn route(request: &Request, id: u128, state: &ServerState) -> Response {
    let headonly = request.method() == HttpRequestMethod::Head;
    let path = match request.route_path() {
        Ok(path) => path,
        Err(e) => {
            warn!("[ID{}]请求的路径：{} 非法，返回400", id, request.path());
            return Response::from_status_code(e.status_code(), request.accept_encoding(), headonly, id);
        }
    };
    debug!("[ID{}]路由匹配开始: path='{}'", id, path);

    if path == state.config().feed_path() {
        return feed_response(request, id, state, headonly).await;
    }

    match static_response(request, &path, id, state, headonly) {
        Ok(response) => response,
        Err(Exception::FileNotFound) => {
            warn!("[ID{}]请求的路径：{} 不存在，返回404", id, request.path());
            Response::from_status_code(404, request.accept_encoding(), headonly, id)
        }
        Err(e) => {
            error!("[ID{}]处理请求时发生异常: {}", id, e);
            Response::from_status_code(e.status_code(), request.accept_encoding(), headonly, id)
        }
    }
}

/// 在阻塞线程池中生成订阅源，失败时返回不带响应体的 `500`。
async fn feed_response(request: &Request, id: u128, state: &ServerState, headonly: bool) -> Response {
    let config_path = state.config_path().to_path_buf();
    let generated = tokio::task::spawn_blocking(move || generate_feed(&config_path, id)).await;
    match generated {
        Ok(Ok((xml, last_modified))) => Response::from_feed(
            xml,
            last_modified.as_deref(),
            request.accept_encoding(),
            headonly,
            id,
        ),
        Ok(Err(e)) => {
            error!("[ID{}]订阅源生成失败，返回500: {}", id, e);
            Response::empty(500)
        }
        Err(e) => {
            error!("[ID{}]订阅源生成任务异常终止，返回500: {}", id, e);
            Response::empty(500)
        }
    }
}

/// 重新加载配置并完整生成一次订阅源，返回 XML 与 `Last-Modified` 的值。
///
/// 没有任何节目时 `Last-Modified` 为 `None`，其余所有错误原样返回。
pub fn generate_feed<P: AsRef<Path>>(
    config_path: P,
    id: u128,
) -> Result<(Vec<u8>, Option<String>), Exception> {
    let config = Config::load(config_path)?;
    config.validate()?;
    let feed = Feed::build(&config, id)?;
    let xml = rss::render(&feed)?;
    let last_modified = match feed.last_modified() {
        Ok(date) => Some(date.to_string()),
        Err(Exception::EmptyFeed) => {
            debug!("[ID{}]订阅源中没有节目，省略Last-Modified", id);
            None
        }
        Err(e) => return Err(e),
    };
    Ok((xml, last_modified))
}

fn static_response(
    request: &Request,
    path: &str,
    id: u128,
    state: &ServerState,
    headonly: bool,
) -> Result<Response, Exception> {
    let config = state.config();
    let full_path = Path::new(config.file_root()).join(path.trim_start_matches('/'));
    debug!("[ID{}]映射物理路径：{}", id, full_path.display());

    let metadata = std::fs::metadata(&full_path).map_err(|_| Exception::FileNotFound)?;
    if !metadata.is_dir() {
        return Response::from_file(&full_path, request, id, headonly, config);
    }

    let index = full_path.join(HTML_INDEX);
    if index.is_file() {
        return Response::from_file(&index, request, id, headonly, config);
    }
    Response::from_dir(
        &full_path,
        request.raw_path(),
        request.accept_encoding(),
        id,
        headonly,
    )
}

async fn send(stream: &mut TcpStream, response: &Response, id: u128) {
    let bytes = response.as_bytes();
    debug!("[ID{}]发送响应，长度: {}", id, bytes.len());
    if let Err(e) = stream.write_all(&bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}

/// 从 `file.offset` 起分块发送 `file.length` 字节。
async fn send_file(stream: &mut TcpStream, file: &FileStream, chunk_size: usize, id: u128) {
    let mut handle = match TokioFile::open(&file.path).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("[ID{}]无法打开流文件: {}", id, e);
            return;
        }
    };
    if file.offset > 0 {
        if let Err(e) = handle.seek(SeekFrom::Start(file.offset)).await {
            error!("[ID{}]文件定位失败: {}", id, e);
            return;
        }
    }

    debug!(
        "[ID{}]开始流式传输，偏移: {}, 长度: {} bytes",
        id, file.offset, file.length
    );
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut remaining = file.length;
    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        match handle.read(&mut buffer[..want]).await {
            Ok(0) => {
                warn!("[ID{}]文件提前结束，还有{}字节未发送", id, remaining);
                break;
            }
            Ok(n) => {
                if let Err(e) = stream.write_all(&buffer[..n]).await {
                    error!("[ID{}]流式写入失败: {}", id, e);
                    return;
                }
                remaining -= n as u64;
            }
            Err(e) => {
                error!("[ID{}]读取文件失败: {}", id, e);
                return;
            }
        }
    }
    let _ = stream.flush().await;
    debug!("[ID{}]流式传输完成，共发送 {} 字节", id, file.length - remaining);
}
