//! Feeds and articles as seen by the navigation screens.
//!
//! Fetching and parsing are handled elsewhere; screens only need shared,
//! mutable access to titles, links and read flags.

use crate::error::MatcherError;
use crate::filter::{Filter, Matchable};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a feed. Screens on the same thread share feeds.
pub type FeedRef = Rc<RefCell<Feed>>;

/// Shared handle to an article, so query feeds and their source feeds see
/// the same read flag.
pub type ItemRef = Rc<RefCell<Item>>;

/// URL prefix of query pseudo-feeds
pub const QUERY_PREFIX: &str = "query:";

/// A single article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub guid: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_unread")]
    pub unread: bool,
}

fn default_unread() -> bool {
    true
}

impl Item {
    pub fn new(guid: &str, title: &str) -> Self {
        Self {
            guid: guid.to_string(),
            title: title.to_string(),
            unread: true,
            ..Self::default()
        }
    }
}

impl Matchable for Item {
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "guid" => Some(self.guid.clone()),
            "title" => Some(self.title.clone()),
            "link" => Some(self.link.clone()),
            "author" => Some(self.author.clone()),
            "content" => Some(self.content.clone()),
            "unread" => Some(if self.unread { "yes" } else { "no" }.to_string()),
            _ => None,
        }
    }
}

/// A feed: a titled list of articles. URLs starting with `query:` denote
/// query feeds whose articles are computed from every other feed.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub items: Vec<ItemRef>,
}

impl Feed {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Build a feed owning the given articles
    pub fn with_items(url: &str, title: &str, items: Vec<Item>) -> Self {
        Self {
            items: items.into_iter().map(|i| Rc::new(RefCell::new(i))).collect(),
            ..Self::new(url, title)
        }
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> FeedRef {
        Rc::new(RefCell::new(self))
    }

    pub fn is_query(&self) -> bool {
        self.url.starts_with(QUERY_PREFIX)
    }

    /// Filter expression of a query feed (`query:<title>:<expr>`)
    pub fn query_expression(&self) -> Option<&str> {
        self.url
            .strip_prefix(QUERY_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .map(|(_, expr)| expr)
    }

    /// Title to display; query feeds fall back to the title in their URL
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        self.url
            .strip_prefix(QUERY_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .map(|(title, _)| title.to_string())
            .unwrap_or_else(|| self.url.clone())
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|i| i.borrow().unread).count()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Position of the article with the given guid
    pub fn position_of(&self, guid: &str) -> Option<usize> {
        self.items.iter().position(|i| i.borrow().guid == guid)
    }

    pub fn item(&self, guid: &str) -> Option<ItemRef> {
        self.items.iter().find(|i| i.borrow().guid == guid).cloned()
    }

    /// Mark every article read
    pub fn mark_all_read(&self) {
        for item in &self.items {
            item.borrow_mut().unread = false;
        }
    }
}

impl Matchable for Feed {
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.display_title()),
            "rssurl" => Some(self.url.clone()),
            "tags" => Some(self.tags.join(" ")),
            "unread_count" => Some(self.unread_count().to_string()),
            "total_count" => Some(self.total_count().to_string()),
            _ => None,
        }
    }
}

/// Recompute the articles of a query feed from every non-query feed.
///
/// Non-query feeds are left untouched.
pub fn refresh_query_feed(feed: &FeedRef, all_feeds: &[FeedRef]) -> Result<(), MatcherError> {
    let expr = match feed.borrow().query_expression() {
        Some(expr) => expr.to_string(),
        None => return Ok(()),
    };
    let filter = Filter::parse(&expr)?;

    let mut items = Vec::new();
    for source in all_feeds {
        if Rc::ptr_eq(source, feed) || source.borrow().is_query() {
            continue;
        }
        for item in &source.borrow().items {
            if filter.matches(&*item.borrow())? {
                items.push(Rc::clone(item));
            }
        }
    }

    feed.borrow_mut().items = items;
    Ok(())
}

/// Title of the transient feed built by [`search_feeds`]
pub const SEARCH_RESULT_TITLE: &str = "Search result";

/// Collect every article whose title or content contains `phrase`, ignoring
/// case, into a transient feed. Articles shared by several feeds (query
/// feeds) appear once.
pub fn search_feeds(feeds: &[FeedRef], phrase: &str) -> Feed {
    let needle = phrase.to_lowercase();
    let mut items: Vec<ItemRef> = Vec::new();
    for feed in feeds {
        for item in &feed.borrow().items {
            let matches = {
                let item = item.borrow();
                item.title.to_lowercase().contains(&needle)
                    || item.content.to_lowercase().contains(&needle)
            };
            if matches && !items.iter().any(|seen| Rc::ptr_eq(seen, item)) {
                items.push(Rc::clone(item));
            }
        }
    }
    Feed {
        items,
        ..Feed::new("", SEARCH_RESULT_TITLE)
    }
}

/// Suggest a file name for saving an article with the given title
pub fn filename_suggestion(title: &str) -> String {
    let mut name: String = title
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() => Some(c),
            '/' | ' ' | '\r' | '\n' => Some('_'),
            _ => None,
        })
        .collect();
    if name.is_empty() {
        return "article.txt".to_string();
    }
    name.push_str(".txt");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(guid: &str, unread: bool) -> Item {
        Item {
            unread,
            ..Item::new(guid, &format!("Title {}", guid))
        }
    }

    #[test]
    fn test_counts() {
        let feed = Feed::with_items("http://a", "A", vec![item("1", true), item("2", false)]);
        assert_eq!(feed.total_count(), 2);
        assert_eq!(feed.unread_count(), 1);
        feed.mark_all_read();
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn test_query_feed_title_and_expression() {
        let feed = Feed::new("query:Unread:unread = yes", "");
        assert!(feed.is_query());
        assert_eq!(feed.display_title(), "Unread");
        assert_eq!(feed.query_expression(), Some("unread = yes"));
    }

    #[test]
    fn test_refresh_query_feed_shares_items() {
        let a = Feed::with_items("http://a", "A", vec![item("1", true), item("2", false)]).into_ref();
        let b = Feed::with_items("http://b", "B", vec![item("3", true)]).into_ref();
        let query = Feed::new("query:Unread:unread = yes", "").into_ref();
        let all = vec![a.clone(), b, query.clone()];

        refresh_query_feed(&query, &all).unwrap();
        assert_eq!(query.borrow().total_count(), 2);

        // marking read through the query feed is visible in the source feed
        query.borrow().items[0].borrow_mut().unread = false;
        assert_eq!(a.borrow().unread_count(), 0);
    }

    #[test]
    fn test_refresh_query_feed_reports_bad_expression() {
        let query = Feed::new("query:Broken:nosuch = 1", "").into_ref();
        let a = Feed::with_items("http://a", "A", vec![item("1", true)]).into_ref();
        let err = refresh_query_feed(&query, &[a, query.clone()]).unwrap_err();
        assert_eq!(err, MatcherError::AttributeUnavailable("nosuch".to_string()));
    }

    #[test]
    fn test_search_feeds() {
        let mut rust = Item::new("1", "Rust 2.0 released");
        rust.content = "A new edition".to_string();
        let mut other = Item::new("2", "Weather");
        other.content = "rain, then RUST-colored sunset".to_string();
        let a = Feed::with_items("http://a", "A", vec![rust, other, Item::new("3", "Unrelated")]).into_ref();

        let query = Feed::new("query:All:unread = \"yes\"", "").into_ref();
        refresh_query_feed(&query, &[a.clone(), query.clone()]).unwrap();

        let result = search_feeds(&[a.clone(), query], "rust");
        assert_eq!(result.title, SEARCH_RESULT_TITLE);
        assert_eq!(result.total_count(), 2);
        assert!(Rc::ptr_eq(&result.items[0], &a.borrow().items[0]));

        assert_eq!(search_feeds(&[a], "nothing like this").total_count(), 0);
    }

    #[test]
    fn test_filename_suggestion() {
        assert_eq!(filename_suggestion("Hello, World/2"), "Hello_World_2.txt");
        assert_eq!(filename_suggestion("!!!"), "article.txt");
    }
}
