// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 订阅源 XML 输出
//!
//! 输出结构固定：
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss xmlns:atom="…" xmlns:itunes="…" version="2.0">
//!  <channel>
//!   <title/> <description/> <link/>
//!   <atom:link href="…" rel="self" type="application/rss+xml"/>
//!   <item>
//!    <title/> <guid/> <pubDate/>
//!    <enclosure url="…" type="…" length="…"/>
//!   </item>
//!  </channel>
//! </rss>
//! ```
//!
//! 值为空的元素与属性不会输出，每级缩进一个空格。

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    episode::Episode,
    exception::Exception,
    feed::{Channel, Feed},
    param::{ATOM_NAMESPACE, FEED_SELF_LINK_TYPE, ITUNES_NAMESPACE, RSS_VERSION},
};

type XmlWriter = Writer<Vec<u8>>;

/// 将订阅源序列化为带 XML 声明的字节串。
pub fn render(feed: &Feed) -> Result<Vec<u8>, Exception> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("xmlns:atom", ATOM_NAMESPACE));
    rss.push_attribute(("xmlns:itunes", ITUNES_NAMESPACE));
    rss.push_attribute(("version", RSS_VERSION));
    emit(&mut writer, Event::Start(rss))?;

    emit(&mut writer, Event::Start(BytesStart::new("channel")))?;
    write_channel(&mut writer, feed.channel())?;
    for episode in feed.episodes() {
        write_item(&mut writer, episode)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("channel")))?;

    emit(&mut writer, Event::End(BytesEnd::new("rss")))?;
    Ok(writer.into_inner())
}

fn write_channel(writer: &mut XmlWriter, channel: &Channel) -> Result<(), Exception> {
    text_element(writer, "title", &channel.title)?;
    text_element(writer, "description", &channel.description)?;
    text_element(writer, "link", &channel.link)?;
    empty_element(
        writer,
        "atom:link",
        &[
            ("href", channel.self_link.as_str()),
            ("rel", "self"),
            ("type", FEED_SELF_LINK_TYPE),
        ],
    )
}

fn write_item(writer: &mut XmlWriter, episode: &Episode) -> Result<(), Exception> {
    emit(writer, Event::Start(BytesStart::new("item")))?;
    text_element(writer, "title", episode.title())?;
    text_element(writer, "guid", episode.guid())?;
    text_element(writer, "pubDate", episode.pub_date())?;

    // 长度为 0 视为空值，与其他空字段一样省略
    let length = match episode.length() {
        0 => String::new(),
        n => n.to_string(),
    };
    empty_element(
        writer,
        "enclosure",
        &[
            ("url", episode.enclosure_url()),
            ("type", episode.mime_type()),
            ("length", length.as_str()),
        ],
    )?;
    emit(writer, Event::End(BytesEnd::new("item")))
}

fn text_element(writer: &mut XmlWriter, name: &str, value: &str) -> Result<(), Exception> {
    if value.is_empty() {
        return Ok(());
    }
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(value)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// 只带属性的元素；所有属性都为空时整个元素省略。
fn empty_element(
    writer: &mut XmlWriter,
    name: &str,
    attributes: &[(&str, &str)],
) -> Result<(), Exception> {
    if attributes.iter().all(|(_, value)| value.is_empty()) {
        return Ok(());
    }
    let mut element = BytesStart::new(name);
    for &(key, value) in attributes {
        if !value.is_empty() {
            element.push_attribute((key, value));
        }
    }
    emit(writer, Event::Empty(element))
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), Exception> {
    writer
        .write_event(event)
        .map_err(|e| Exception::Serialization(e.to_string()))
}
