// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

pub mod config;
pub mod episode;
pub mod exception;
pub mod feed;
pub mod param;
pub mod request;
pub mod response;
pub mod rss;
pub mod scan;
pub mod server;
pub mod util;

pub use config::Config;
pub use episode::Episode;
pub use exception::Exception;
pub use feed::{Channel, Feed};
pub use param::{HttpEncoding, HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use response::Response;
pub use server::{serve, ServerState};
pub use util::HtmlBuilder;
