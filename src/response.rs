// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use crate::{
    config::Config,
    exception::Exception,
    param::*,
    request::Request,
    util::{format_rfc1123, HtmlBuilder, ListingEntry},
};

use brotli::enc::{self, backward_references::BrotliEncoderParams};
use bytes::Bytes;
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression,
};
use log::{debug, error};

use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

/// 需要由连接处理器从磁盘分块发送的响应体
#[derive(Debug, Clone, PartialEq)]
pub struct FileStream {
    pub path: PathBuf,
    pub offset: u64,
    pub length: u64,
}

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    content_length: u64,
    date: SystemTime,
    last_modified: Option<String>,
    content_encoding: Option<HttpEncoding>,
    server_name: String,
    allow: Option<Vec<HttpRequestMethod>>,
    content: Option<Bytes>,
    content_range: Option<String>,
    accept_ranges: Option<String>,
    stream: Option<FileStream>,
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: 0,
            date: SystemTime::now(),
            last_modified: None,
            content_encoding: None,
            server_name: SERVER_NAME.to_string(),
            allow: None,
            content: None,
            content_range: None,
            accept_ranges: None,
            stream: None,
        }
    }

    /// 不带响应体的状态响应，订阅源生成失败时返回 `500`。
    pub fn empty(code: u16) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        response
    }

    /// 带 HTML 说明页的状态响应；`204` 用于 OPTIONS，附带 `Allow` 头且没有响应体。
    ///
    /// `headonly` 时只保留头部，`Content-Length` 仍为说明页长度。
    pub fn from_status_code(
        code: u16,
        accept_encoding: &[HttpEncoding],
        headonly: bool,
        id: u128,
    ) -> Self {
        let mut response = Self::new();
        response.set_code(code);
        if code == 204 {
            response.allow = Some(ALLOWED_METHODS.to_vec());
            return response;
        }
        if code == 405 {
            response.allow = Some(ALLOWED_METHODS.to_vec());
        }
        let page = match code {
            404 => HtmlBuilder::from_status_code(404, Some("<h2>噢！</h2><p>你指定的文件无法找到。</p>")),
            405 => HtmlBuilder::from_status_code(
                405,
                Some("<h2>噢！</h2><p>本服务器只支持GET、HEAD和OPTIONS方法。</p>"),
            ),
            _ => HtmlBuilder::from_status_code(code, None),
        }
        .build();
        let encoding = match headonly {
            true => None,
            false => decide_encoding(accept_encoding),
        };
        response.set_body(page.into_bytes(), "text/html;charset=utf-8", encoding, headonly, id);
        response
    }

    /// 订阅源响应。`last_modified` 为 `None`（没有任何节目）时省略 `Last-Modified` 头。
    pub fn from_feed(
        xml: Vec<u8>,
        last_modified: Option<&str>,
        accept_encoding: &[HttpEncoding],
        headonly: bool,
        id: u128,
    ) -> Self {
        let mut response = Self::new();
        response.last_modified = last_modified.map(str::to_string);
        let encoding = match headonly {
            true => None,
            false => decide_encoding(accept_encoding),
        };
        response.set_body(xml, FEED_CONTENT_TYPE, encoding, headonly, id);
        response
    }

    /// 静态文件响应。
    ///
    /// - 单区间 Range 请求返回 `206`，起点越界返回 `416`，终点越界时截断到文件末尾。
    /// - 超过 `streaming_threshold` 的文件与所有区间响应都交给连接处理器分块发送。
    /// - 其余文件读入内存，非已压缩类型按 `Accept-Encoding` 压缩。
    pub fn from_file(
        path: &Path,
        request: &Request,
        id: u128,
        headonly: bool,
        config: &Config,
    ) -> Result<Self, Exception> {
        let mut response = Self::new();

        let file_metadata = fs::metadata(path)
            .map_err(|e| Exception::Filesystem(format!("{}: {}", path.display(), e)))?;
        let file_size = file_metadata.len();
        let modified = file_metadata
            .modified()
            .map_err(|e| Exception::Filesystem(format!("{}: {}", path.display(), e)))?;
        response.last_modified = Some(format_rfc1123(modified));

        let mime = get_mime(path);
        debug!("[ID{}]MIME类型: {}, 文件大小: {} bytes", id, mime, file_size);

        let range = match config.enable_range_requests() {
            true => {
                response.accept_ranges = Some("bytes".to_string());
                request.range()
            }
            false => None,
        };

        if let Some((start, end)) = range {
            if start >= file_size {
                debug!("[ID{}]Range起点{}超出文件大小{}", id, start, file_size);
                response.set_code(416);
                response.content_range = Some(format!("bytes */{}", file_size));
                return Ok(response);
            }
            let last = file_size - 1;
            let end = end.map_or(last, |e| e.min(last));
            if start > end {
                response.set_code(416);
                response.content_range = Some(format!("bytes */{}", file_size));
                return Ok(response);
            }
            let length = end - start + 1;
            debug!("[ID{}]处理Range请求: bytes {}-{}/{}", id, start, end, file_size);
            response.set_code(206);
            response.content_range = Some(format!("bytes {}-{}/{}", start, end, file_size));
            response.content_type = Some(mime.to_string());
            response.content_length = length;
            if !headonly {
                response.stream = Some(FileStream {
                    path: path.to_path_buf(),
                    offset: start,
                    length,
                });
            }
            return Ok(response);
        }

        if headonly {
            response.content_type = Some(mime.to_string());
            response.content_length = file_size;
            return Ok(response);
        }

        if file_size > config.streaming_threshold() {
            debug!("[ID{}]文件超过流式阈值，使用分块发送", id);
            response.content_type = Some(mime.to_string());
            response.content_length = file_size;
            response.stream = Some(FileStream {
                path: path.to_path_buf(),
                offset: 0,
                length: file_size,
            });
            return Ok(response);
        }

        let mut contents = Vec::with_capacity(file_size as usize);
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut contents))
            .map_err(|e| Exception::Filesystem(format!("{}: {}", path.display(), e)))?;
        let encoding = match should_skip_compression(mime) {
            true => None,
            false => decide_encoding(request.accept_encoding()),
        };
        response.set_body(contents, mime, encoding, false, id);
        Ok(response)
    }

    /// 目录列表页面。`base` 为原始请求路径，用于生成链接。
    pub fn from_dir(
        dir: &Path,
        base: &str,
        accept_encoding: &[HttpEncoding],
        id: u128,
        headonly: bool,
    ) -> Result<Self, Exception> {
        let fs_error = |e: io::Error| Exception::Filesystem(format!("{}: {}", dir.display(), e));
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(fs_error)? {
            let entry = entry.map_err(fs_error)?;
            let metadata = entry.metadata().map_err(fs_error)?;
            entries.push(ListingEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified: metadata.modified().map_err(fs_error)?,
            });
        }
        debug!("[ID{}]目录{}下共有{}个条目", id, dir.display(), entries.len());

        let page = HtmlBuilder::from_dir(base, &mut entries).build();
        let encoding = match headonly {
            true => None,
            false => decide_encoding(accept_encoding),
        };
        let mut response = Self::new();
        response.set_body(page.into_bytes(), "text/html;charset=utf-8", encoding, headonly, id);
        Ok(response)
    }

    /// 设置内存中的响应体；压缩失败时退回未压缩内容。
    fn set_body(
        &mut self,
        body: Vec<u8>,
        content_type: &str,
        encoding: Option<HttpEncoding>,
        headonly: bool,
        id: u128,
    ) {
        let (body, encoding) = match compress(&body, encoding) {
            Ok(compressed) => (compressed, encoding),
            Err(e) => {
                error!("[ID{}]压缩失败: {}，返回未压缩内容", id, e);
                (body, None)
            }
        };
        self.content_type = Some(content_type.to_string());
        self.content_encoding = encoding;
        self.content_length = body.len() as u64;
        self.content = match headonly {
            true => None,
            false => Some(Bytes::from(body)),
        };
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&phrase) => phrase.to_string(),
            None => {
                error!("非法的状态码：{}", code);
                "Unknown".to_string()
            }
        };
        self
    }

    /// 序列化状态行与响应头；内存中的响应体（如果有）紧随其后。
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "{} {} {}{}",
            self.version, self.status_code, self.information, CRLF
        );
        if let Some(t) = &self.content_type {
            header.push_str(&format!("Content-Type: {}{}", t, CRLF));
        }
        if let Some(e) = self.content_encoding {
            header.push_str(&format!("Content-Encoding: {}{}", e, CRLF));
        }
        header.push_str(&format!("Content-Length: {}{}", self.content_length, CRLF));
        header.push_str(&format!("Date: {}{}", format_rfc1123(self.date), CRLF));
        if let Some(m) = &self.last_modified {
            header.push_str(&format!("Last-Modified: {}{}", m, CRLF));
        }
        header.push_str(&format!("Server: {}{}", self.server_name, CRLF));
        if let Some(a) = &self.allow {
            let methods: Vec<String> = a.iter().map(|m| m.to_string()).collect();
            header.push_str(&format!("Allow: {}{}", methods.join(", "), CRLF));
        }
        if let Some(r) = &self.accept_ranges {
            header.push_str(&format!("Accept-Ranges: {}{}", r, CRLF));
        }
        if let Some(r) = &self.content_range {
            header.push_str(&format!("Content-Range: {}{}", r, CRLF));
        }
        header.push_str(CRLF);

        let mut bytes = header.into_bytes();
        if let Some(c) = &self.content {
            bytes.extend_from_slice(c);
        }
        bytes
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn content_encoding(&self) -> Option<HttpEncoding> {
        self.content_encoding
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// 需要分块发送的文件区间
    pub fn stream(&self) -> Option<&FileStream> {
        self.stream.as_ref()
    }
}

fn compress(data: &[u8], mode: Option<HttpEncoding>) -> io::Result<Vec<u8>> {
    let result = match mode {
        Some(HttpEncoding::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Deflate) => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Br) => {
            let params = BrotliEncoderParams::default();
            let mut output = Vec::new();
            enc::BrotliCompress(&mut io::Cursor::new(data), &mut output, &params)?;
            Ok(output)
        }
        None => Ok(data.to_vec()),
    };

    if let (Some(mode), Ok(compressed)) = (mode, &result) {
        debug!(
            "压缩完成: {}, 原始大小: {} bytes, 压缩后: {} bytes",
            mode,
            data.len(),
            compressed.len()
        );
    }
    result
}

/// 已压缩的媒体与归档格式不再压缩
fn should_skip_compression(mime_type: &str) -> bool {
    let skip_types = [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "video/",
        "audio/",
        "application/zip",
        "application/pdf",
    ];

    skip_types
        .iter()
        .any(|&skip_type| mime_type.starts_with(skip_type))
}

fn decide_encoding(accept_encoding: &[HttpEncoding]) -> Option<HttpEncoding> {
    [HttpEncoding::Br, HttpEncoding::Gzip, HttpEncoding::Deflate]
        .into_iter()
        .find(|e| accept_encoding.contains(e))
}

fn get_mime(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|e| MIME_TYPES.get(e.as_str()).copied())
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn request(raw: &str) -> Request {
        Request::try_from(raw.as_bytes(), 1).unwrap()
    }

    fn config(threshold: u64, ranges: bool) -> Config {
        Config::parse(&format!(
            "[server]\nstreaming_threshold = {}\nenable_range_requests = {}\n",
            threshold, ranges
        ))
        .unwrap()
    }

    fn header_text(response: &Response) -> String {
        let bytes = response.as_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        text.split("\r\n\r\n").next().unwrap().to_string()
    }

    #[test]
    fn test_compress_none() {
        let data = b"Hello, World!".to_vec();
        assert_eq!(compress(&data, None).unwrap(), data);
    }

    #[test]
    fn test_compress_gzip_round_trip() {
        let data = b"<rss><channel><title>x</title></channel></rss>".repeat(20);
        let result = compress(&data, Some(HttpEncoding::Gzip)).unwrap();
        assert_eq!(&result[0..2], &[0x1f, 0x8b]);

        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(&result[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_compress_all_modes_shrink_repetitive_data() {
        let data = vec![b'A'; 10000];
        for mode in [HttpEncoding::Gzip, HttpEncoding::Deflate, HttpEncoding::Br] {
            let result = compress(&data, Some(mode)).unwrap();
            assert!(result.len() < data.len(), "{:?}", mode);
        }
    }

    #[test]
    fn test_decide_encoding_preference() {
        assert_eq!(
            decide_encoding(&[HttpEncoding::Gzip, HttpEncoding::Br]),
            Some(HttpEncoding::Br)
        );
        assert_eq!(
            decide_encoding(&[HttpEncoding::Deflate, HttpEncoding::Gzip]),
            Some(HttpEncoding::Gzip)
        );
        assert_eq!(
            decide_encoding(&[HttpEncoding::Deflate]),
            Some(HttpEncoding::Deflate)
        );
        assert_eq!(decide_encoding(&[]), None);
    }

    #[test]
    fn test_get_mime() {
        assert_eq!(get_mime(Path::new("a.mp3")), "audio/mpeg");
        assert_eq!(get_mime(Path::new("b.M4A")), "audio/m4a");
        assert_eq!(get_mime(Path::new("c.m4b")), "audio/m4b");
        assert_eq!(get_mime(Path::new("cover.jpg")), "image/jpeg");
        assert_eq!(get_mime(Path::new("notes")), "application/octet-stream");
        assert_eq!(get_mime(Path::new("x.unknown")), "application/octet-stream");
    }

    #[test]
    fn test_skip_compression_for_audio() {
        assert!(should_skip_compression("audio/mpeg"));
        assert!(should_skip_compression("image/png"));
        assert!(!should_skip_compression("text/plain;charset=utf-8"));
        assert!(!should_skip_compression(FEED_CONTENT_TYPE));
    }

    #[test]
    fn test_as_bytes_basic() {
        let response = Response::new();
        let text = String::from_utf8(response.as_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(text.contains("Server: castr\r\n"));
        assert!(text.contains("Date: "));
        assert!(text.ends_with("\r\n\r\n"));
        assert!(!text.contains("Last-Modified"));
    }

    #[test]
    fn test_set_code_phrases() {
        for (code, expected) in [
            (200, "OK"),
            (206, "Partial Content"),
            (404, "Not Found"),
            (416, "Range Not Satisfiable"),
            (500, "Internal Server Error"),
        ] {
            let mut response = Response::new();
            response.set_code(code);
            assert_eq!(response.status_code(), code);
            assert_eq!(response.information(), expected);
        }
    }

    #[test]
    fn test_empty_500_has_no_body() {
        let response = Response::empty(500);
        let text = String::from_utf8(response.as_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(!text.contains("Content-Type"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_options_response() {
        let response = Response::from_status_code(204, &[HttpEncoding::Gzip], false, 1);
        let text = header_text(&response);
        assert!(text.starts_with("HTTP/1.1 204 No Content"));
        assert!(text.contains("Allow: GET, HEAD, OPTIONS"));
        assert!(response.content().is_none());
        assert!(!text.contains("Content-Encoding"));
    }

    #[test]
    fn test_404_page() {
        let response = Response::from_status_code(404, &[], false, 1);
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.content_type(), Some("text/html;charset=utf-8"));
        let body = String::from_utf8(response.content().unwrap().to_vec()).unwrap();
        assert!(body.contains("404"));
        assert_eq!(response.content_length(), body.len() as u64);
    }

    #[test]
    fn test_head_status_page_has_no_body() {
        let full = Response::from_status_code(404, &[HttpEncoding::Gzip], false, 1);
        let head = Response::from_status_code(404, &[HttpEncoding::Gzip], true, 1);
        assert_eq!(head.status_code(), 404);
        assert!(head.content().is_none());
        assert!(head.content_length() > 0);
        let text = header_text(&head);
        assert!(!text.contains("Content-Encoding"));
        assert!(String::from_utf8(head.as_bytes()).unwrap().ends_with("\r\n\r\n"));
        assert!(full.content().is_some());
    }

    #[test]
    fn test_feed_response_headers() {
        let xml = b"<?xml version=\"1.0\"?><rss/>".to_vec();
        let response = Response::from_feed(
            xml.clone(),
            Some("Mon, 02 Jan 2006 15:04:05 GMT"),
            &[],
            false,
            1,
        );
        let text = header_text(&response);
        assert!(text.contains("Content-Type: application/atom+xml\r\n"));
        assert!(text.contains("Last-Modified: Mon, 02 Jan 2006 15:04:05 GMT"));
        assert_eq!(response.content().unwrap().as_ref(), xml.as_slice());
    }

    #[test]
    fn test_feed_response_without_last_modified() {
        let response = Response::from_feed(b"<rss/>".to_vec(), None, &[], false, 1);
        assert!(!header_text(&response).contains("Last-Modified"));
        assert_eq!(response.status_code(), 200);
    }

    #[test]
    fn test_feed_response_gzip_and_head() {
        let xml = b"<item></item>".repeat(100);
        let response = Response::from_feed(xml.clone(), None, &[HttpEncoding::Gzip], false, 1);
        assert_eq!(response.content_encoding(), Some(HttpEncoding::Gzip));
        assert!(response.content_length() < xml.len() as u64);

        let head = Response::from_feed(xml.clone(), None, &[HttpEncoding::Gzip], true, 1);
        assert!(head.content().is_none());
        assert_eq!(head.content_encoding(), None);
        assert_eq!(head.content_length(), xml.len() as u64);
    }

    #[test]
    fn test_from_file_small_text_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();

        let req = request("GET /notes.txt HTTP/1.1\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1024, true)).unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content().unwrap().as_ref(), b"hello");
        assert_eq!(response.content_length(), 5);
        assert!(response.stream().is_none());
        assert!(response.last_modified().unwrap().ends_with("GMT"));
        assert!(header_text(&response).contains("Accept-Ranges: bytes"));
    }

    #[test]
    fn test_from_file_audio_never_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, vec![0u8; 4096]).unwrap();

        let req = request("GET /a.mp3 HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1 << 20, true)).unwrap();
        assert_eq!(response.content_encoding(), None);
        assert_eq!(response.content_type(), Some("audio/mpeg"));
        assert_eq!(response.content_length(), 4096);
    }

    #[test]
    fn test_from_file_large_file_streams() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.m4b");
        fs::write(&path, vec![1u8; 2048]).unwrap();

        let req = request("GET /long.m4b HTTP/1.1\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1024, true)).unwrap();
        assert!(response.content().is_none());
        assert_eq!(
            response.stream(),
            Some(&FileStream {
                path: path.clone(),
                offset: 0,
                length: 2048
            })
        );
        assert_eq!(response.content_length(), 2048);
    }

    #[test]
    fn test_from_file_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, vec![7u8; 1000]).unwrap();

        let req = request("GET /a.mp3 HTTP/1.1\r\nRange: bytes=100-199\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1 << 20, true)).unwrap();
        assert_eq!(response.status_code(), 206);
        assert_eq!(response.content_length(), 100);
        assert!(header_text(&response).contains("Content-Range: bytes 100-199/1000"));
        assert_eq!(response.stream().unwrap().offset, 100);

        // 终点越界时截断
        let req = request("GET /a.mp3 HTTP/1.1\r\nRange: bytes=900-5000\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1 << 20, true)).unwrap();
        assert!(header_text(&response).contains("Content-Range: bytes 900-999/1000"));
        assert_eq!(response.content_length(), 100);
    }

    #[test]
    fn test_from_file_unsatisfiable_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, vec![7u8; 10]).unwrap();

        let req = request("GET /a.mp3 HTTP/1.1\r\nRange: bytes=10-\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1 << 20, true)).unwrap();
        assert_eq!(response.status_code(), 416);
        assert!(header_text(&response).contains("Content-Range: bytes */10"));
        assert!(response.stream().is_none());
    }

    #[test]
    fn test_from_file_range_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, vec![7u8; 10]).unwrap();

        let req = request("GET /a.mp3 HTTP/1.1\r\nRange: bytes=0-4\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, false, &config(1 << 20, false)).unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content_length(), 10);
        assert!(!header_text(&response).contains("Accept-Ranges"));
    }

    #[test]
    fn test_from_file_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, vec![7u8; 10]).unwrap();

        let req = request("HEAD /a.mp3 HTTP/1.1\r\n\r\n");
        let response = Response::from_file(&path, &req, 1, true, &config(1 << 20, true)).unwrap();
        assert_eq!(response.content_length(), 10);
        assert!(response.content().is_none());
        assert!(response.stream().is_none());
    }

    #[test]
    fn test_from_dir_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("season 1")).unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();

        let response = Response::from_dir(dir.path(), "/", &[], 1, false).unwrap();
        let body = String::from_utf8(response.content().unwrap().to_vec()).unwrap();
        assert!(body.contains(r#"href="/a.mp3""#));
        assert!(body.contains(r#"href="/season%201/""#));
        assert_eq!(response.content_type(), Some("text/html;charset=utf-8"));
    }

    #[test]
    fn test_from_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = Response::from_dir(&dir.path().join("nope"), "/nope", &[], 1, false);
        assert!(matches!(result, Err(Exception::Filesystem(_))));
    }
}
