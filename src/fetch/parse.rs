//! RSS feed parsing.
//!
//! The trending feed is RSS 2.0 with extra elements in the `ht:` namespace:
//!
//! ```xml
//! <rss xmlns:ht="https://trends.google.com/trending/rss" version="2.0">
//!   <channel>
//!     <title>Daily Search Trends</title>
//!     <item>
//!       <title>example</title>
//!       <ht:approx_traffic>200+</ht:approx_traffic>
//!       <pubDate>Mon, 19 Oct 2026 10:00:00 -0700</pubDate>
//!       <ht:picture>https://…</ht:picture>
//!       <ht:picture_source>Source</ht:picture_source>
//!       <ht:news_item>
//!         <ht:news_item_title>Headline</ht:news_item_title>
//!         <ht:news_item_url>https://…</ht:news_item_url>
//!         <ht:news_item_picture>https://…</ht:news_item_picture>
//!         <ht:news_item_source>Outlet</ht:news_item_source>
//!       </ht:news_item>
//!     </item>
//!   </channel>
//! </rss>
//! ```
//!
//! Items without a title are skipped; ranks are assigned in document order
//! over the items that remain.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::types::{NewsItem, TrendRecord};
use crate::{Result, TrendsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Traffic,
    Published,
    Picture,
    PictureSource,
    NewsTitle,
    NewsUrl,
    NewsSource,
    NewsPicture,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Field::Title),
            b"ht:approx_traffic" => Some(Field::Traffic),
            b"pubDate" => Some(Field::Published),
            b"ht:picture" => Some(Field::Picture),
            b"ht:picture_source" => Some(Field::PictureSource),
            b"ht:news_item_title" => Some(Field::NewsTitle),
            b"ht:news_item_url" => Some(Field::NewsUrl),
            b"ht:news_item_source" => Some(Field::NewsSource),
            b"ht:news_item_picture" => Some(Field::NewsPicture),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    traffic: Option<String>,
    published: Option<String>,
    picture: Option<String>,
    picture_source: Option<String>,
    news: Vec<NewsItem>,
}

impl ItemBuilder {
    fn set(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Traffic => append(&mut self.traffic, text),
            Field::Published => append(&mut self.published, text),
            Field::Picture => append(&mut self.picture, text),
            Field::PictureSource => append(&mut self.picture_source, text),
            // News fields outside an <ht:news_item> are ignored.
            _ => {}
        }
    }

    fn finish(self, rank: usize) -> TrendRecord {
        TrendRecord {
            title: self.title.trim().to_string(),
            rank,
            traffic: self.traffic,
            published: self.published,
            picture: self.picture,
            picture_source: self.picture_source,
            news: self.news,
        }
    }
}

fn set_news(news: &mut NewsItem, field: Field, text: &str) {
    match field {
        Field::NewsTitle => news.title.push_str(text),
        Field::NewsUrl => news.url.push_str(text),
        Field::NewsSource => append(&mut news.source, text),
        Field::NewsPicture => append(&mut news.picture, text),
        _ => {}
    }
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}

/// Parse a trending RSS body into records.
///
/// Fails with [`TrendsError::Parse`] on malformed XML, a missing `<channel>`,
/// or a document that ends inside an `<item>`.
pub fn parse_feed(body: &str) -> Result<Vec<TrendRecord>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut saw_channel = false;
    let mut records = Vec::new();
    let mut item: Option<ItemBuilder> = None;
    let mut news: Option<NewsItem> = None;
    let mut field: Option<Field> = None;

    loop {
        let text = match reader.read_event()? {
            Event::Start(e) => {
                match e.name().as_ref() {
                    b"channel" => saw_channel = true,
                    b"item" => item = Some(ItemBuilder::default()),
                    b"ht:news_item" if item.is_some() => news = Some(NewsItem::default()),
                    tag => field = Field::from_tag(tag),
                }
                continue;
            }
            Event::End(e) => {
                match e.name().as_ref() {
                    b"item" => {
                        if let Some(done) = item.take()
                            && !done.title.trim().is_empty()
                        {
                            let rank = records.len() + 1;
                            records.push(done.finish(rank));
                        }
                    }
                    b"ht:news_item" => {
                        if let (Some(done), Some(parent)) = (news.take(), item.as_mut())
                            && !done.url.is_empty()
                        {
                            parent.news.push(done);
                        }
                    }
                    _ => {}
                }
                field = None;
                continue;
            }
            Event::Text(t) => t.unescape()?.into_owned(),
            Event::CData(c) => String::from_utf8_lossy(&c).into_owned(),
            Event::Eof => break,
            _ => continue,
        };

        let (Some(f), Some(current)) = (field, item.as_mut()) else {
            continue;
        };
        match news.as_mut() {
            Some(n) => set_news(n, f, &text),
            None => current.set(f, &text),
        }
    }

    if item.is_some() {
        return Err(TrendsError::Parse("feed ended inside an <item>".into()));
    }
    if !saw_channel {
        return Err(TrendsError::Parse("response is not an RSS feed (no <channel>)".into()));
    }
    Ok(records)
}
