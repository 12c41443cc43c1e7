// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 订阅源构建
//!
//! 每次请求都从头完成一次：遍历文件根目录 → 提取节目 → 按发布时间倒序排列。
//! 结果只在本次请求内使用，不做任何缓存。

use log::debug;
use url::Url;

use crate::{
    config::Config,
    episode::{extract_episode, Episode},
    exception::Exception,
    scan::scan,
};

/// 频道元数据
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: String,
    pub description: String,
    /// 规范化后的 `rss.url`
    pub link: String,
    /// 指向订阅源自身的地址：`rss.url` 的路径被替换为 `feed_path`
    pub self_link: String,
}

impl Channel {
    pub fn from_config(config: &Config) -> Result<Self, Exception> {
        let link = Url::parse(config.url())
            .map_err(|e| Exception::Url(format!("rss.url \"{}\": {}", config.url(), e)))?;
        let mut self_link = link.clone();
        self_link.set_path(config.feed_path());
        Ok(Self {
            title: config.title().to_string(),
            description: config.description().to_string(),
            link: link.to_string(),
            self_link: self_link.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Feed {
    channel: Channel,
    episodes: Vec<Episode>,
}

impl Feed {
    /// 以给定顺序组装订阅源，不会重新排序。
    pub fn new(channel: Channel, episodes: Vec<Episode>) -> Self {
        Self { channel, episodes }
    }

    /// 遍历 `file_root` 并生成完整的订阅源。任何一个文件出错都会使整次构建失败。
    pub fn build(config: &Config, id: u128) -> Result<Self, Exception> {
        let channel = Channel::from_config(config)?;
        let files = scan(config.file_root())?;
        debug!("[ID{}]文件根目录{}下共有{}个文件", id, config.file_root(), files.len());

        let mut episodes = Vec::new();
        let mut skipped = 0usize;
        for file in &files {
            match extract_episode(&file.file_name, file.modified, file.size, &file.path, config)? {
                Some(episode) => {
                    debug!(
                        "[ID{}]收录节目：{}，类型：{}",
                        id,
                        episode.title(),
                        episode.mime_type()
                    );
                    episodes.push(episode);
                }
                None => skipped += 1,
            }
        }
        sort_episodes(&mut episodes);
        debug!(
            "[ID{}]订阅源构建完成：{}期节目，跳过{}个非音频文件",
            id,
            episodes.len(),
            skipped
        );

        Ok(Self { channel, episodes })
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// 最新一期节目的发布时间，用作 `Last-Modified`。没有节目时返回 `Exception::EmptyFeed`。
    pub fn last_modified(&self) -> Result<&str, Exception> {
        self.episodes
            .first()
            .map(|e| e.pub_date())
            .ok_or(Exception::EmptyFeed)
    }
}

/// 按发布时间倒序稳定排序；无法解析的日期排在所有真实日期（包括 1970 年以前）之后。
pub fn sort_episodes(episodes: &mut [Episode]) {
    episodes.sort_by_cached_key(|e| std::cmp::Reverse(e.timestamp()));
}
