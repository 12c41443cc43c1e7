// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::param::STATUS_CODES;

/// 目录列表中需要转义的 URL 路径段字符
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

/// RFC 1123 格式，时区固定为 GMT，同时满足 RSS `pubDate` 与 HTTP 日期头的要求
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn format_rfc1123(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(RFC1123_FORMAT).to_string()
}

/// 解析 RFC 1123 日期并返回 Unix 时间戳，无法解析时返回 `None`。
pub fn parse_rfc1123(date: &str) -> Option<i64> {
    DateTime::parse_from_rfc2822(date)
        .map(|d| d.timestamp())
        .ok()
}

/// 目录列表中的一行
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: SystemTime,
}

pub struct HtmlBuilder {
    title: String,
    css: String,
    body: String,
}

impl HtmlBuilder {
    /// 状态码页面。`note` 为空时使用标准原因短语，未知状态码退化为 `"Error"`。
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let title = format!("{}", code);
        let css = r"
            body {
                width: 35em;
                margin: 0 auto;
                font-family: Tahoma, Verdana, Arial, sans-serif;
            }
            "
        .to_string();
        let description = match note {
            Some(n) => n,
            None => STATUS_CODES.get(&code).copied().unwrap_or("Error"),
        };
        let body = format!("<h1>{}</h1>\n<p>{}</p>", code, description);
        Self { title, css, body }
    }

    /// 目录列表页面。`base` 是原始（未解码）的请求路径，用于拼接链接。
    pub fn from_dir(base: &str, entries: &mut Vec<ListingEntry>) -> Self {
        sort_dir_entries(entries);

        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let shown = escape_html(&base);

        let mut body = String::new();
        body.push_str(&format!("<h1>{}的文件列表</h1><hr>", shown));
        body.push_str("<table>");
        body.push_str(
            r#"
            <tr><td>文件名</td><td>大小</td><td>修改时间</td></tr>
            <tr><td><a href="../">..</a></td><td></td><td></td></tr>
            "#,
        );
        for entry in entries.iter() {
            let local_time: DateTime<Local> = entry.modified.into();
            let formatted_time = local_time.format("%Y-%m-%d %H:%M:%S").to_string();
            let href = format!(
                "{}{}{}",
                base,
                utf8_percent_encode(&entry.name, PATH_SEGMENT),
                if entry.is_dir { "/" } else { "" }
            );
            let label = if entry.is_dir {
                format!("{}/", escape_html(&entry.name))
            } else {
                escape_html(&entry.name)
            };
            let size = if entry.is_dir {
                "文件夹".to_string()
            } else {
                format_file_size(entry.size)
            };
            body.push_str(&format!(
                "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&href),
                label,
                size,
                formatted_time
            ));
        }
        body.push_str("</table>");

        let css = r"
            table { border-collapse: collapse; width: 100%; }
            td, th { padding: 8px; border: none; white-space: pre-wrap; }
            "
        .to_string();
        HtmlBuilder {
            title: format!("{}的文件列表", shown),
            css,
            body,
        }
    }

    pub fn build(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html>
    <head>
        <meta charset="utf-8">
        <title>{}</title>
        <style>{}</style>
    </head>
    <body>
    {}
    </body>
</html>"##,
            self.title, self.css, self.body
        )
    }
}

pub fn format_file_size(size: u64) -> String {
    let units = ["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < units.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, units[unit_index])
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// 目录在前，同类按名称排序
fn sort_dir_entries(entries: &mut [ListingEntry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}
