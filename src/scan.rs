// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::exception::Exception;

/// 遍历得到的一个非目录条目
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// 根目录与各级子目录拼接得到的完整路径
    pub path: String,
    pub file_name: String,
    pub modified: SystemTime,
    pub size: u64,
}

/// 递归遍历 `root`，返回其下所有非目录条目。
///
/// 每一层按文件名排序，保证结果可复现。任何 I/O 错误都会使整个遍历失败，不返回部分结果。
pub fn scan<P: AsRef<Path>>(root: P) -> Result<Vec<ScannedFile>, Exception> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Exception::Filesystem(e.to_string()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let metadata = entry
            .metadata()
            .map_err(|e| Exception::Filesystem(format!("{}: {}", path.display(), e)))?;
        let modified = metadata
            .modified()
            .map_err(|e| Exception::Filesystem(format!("{}: {}", path.display(), e)))?;
        files.push(ScannedFile {
            path: path.to_string_lossy().into_owned(),
            file_name: entry.file_name().to_string_lossy().into_owned(),
            modified,
            size: metadata.len(),
        });
    }
    Ok(files)
}
