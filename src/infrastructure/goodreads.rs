//! # Goodreads Quote Source
//!
//! Scrapes the public tag pages on goodreads.com (`/quotes/tag/<tag>`) and picks a
//! random quote. The markup is not an API, so every extraction step degrades to
//! `NotFound` / `Unparseable` instead of failing the command.

use crate::domain::traits::{QuoteLookup, QuoteSource};
use crate::domain::types::Quote;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.goodreads.com";

/// Longest quote text we pass on.
pub const MAX_QUOTE_LEN: usize = 2048;

static SMALL_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<span class="smallText">(.*?)</span>"#).expect("static regex"));
static SHOWING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*([\d,]+)\s+of\s+([\d,]+)").expect("static regex"));
static QUOTE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="quoteText">(.*?)</div>"#).expect("static regex"));
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<span class="authorOrTitle">(.*?)</span>"#).expect("static regex"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<a class="authorOrTitle"[^>]*>(.*?)</a>"#).expect("static regex"));
static QUOTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="quoteFooter">.*?<div class="right">\s*<a[^>]*href="([^"]+)""#)
        .expect("static regex")
});
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>|[^<]+").expect("static regex"));
static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<\s*(/?)\s*([a-zA-Z0-9]+)").expect("static regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

pub struct GoodreadsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GoodreadsClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("maiden/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .build()?;
        let base_url = Url::parse(base_url).with_context(|| format!("Invalid base url {base_url}"))?;
        Ok(Self { http, base_url })
    }

    fn tag_url(&self, tag: &str, page: Option<usize>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be a base url", self.base_url))?
            .extend(["quotes", "tag", tag]);
        if let Some(page) = page {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<String> {
        tracing::debug!("Fetching {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl QuoteSource for GoodreadsClient {
    async fn random_quote(&self, tag: &str) -> Result<QuoteLookup> {
        let Some(tag) = normalize_tag(tag) else {
            return Ok(QuoteLookup::NotFound);
        };

        let first_page = self.fetch(self.tag_url(&tag, None)?).await?;

        let Some(showing) = showing_text(&first_page) else {
            return Ok(QuoteLookup::NotFound);
        };
        let Some((per_page, total)) = parse_showing(&showing) else {
            tracing::warn!("Unexpected Goodreads counter {:?} for tag {}", showing, tag);
            return Ok(QuoteLookup::Unparseable);
        };
        if total == 0 || per_page == 0 {
            return Ok(QuoteLookup::NotFound);
        }

        let index = rand::thread_rng().gen_range(0..total);
        let (page, offset) = (index / per_page, index % per_page);

        // Pages are 1-based on the site; the first one is already in hand
        let document = if page == 0 {
            first_page
        } else {
            self.fetch(self.tag_url(&tag, Some(page + 1))?).await?
        };

        let quotes = parse_quotes(&document, &self.base_url);
        let Some(chosen) = quotes.get(offset).or(quotes.last()) else {
            return Ok(QuoteLookup::NotFound);
        };

        Ok(QuoteLookup::Found(Quote {
            text: chosen.text.clone(),
            author: chosen.author.clone(),
            title: chosen.title.clone(),
            url: chosen.url.clone(),
            index,
            total,
        }))
    }
}

/// Whitespace runs become `-`, everything is lowercased and non-Latin characters
/// are dropped. `None` when nothing usable is left.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag: String = tag
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|&c| is_latin(c))
        .collect();

    (!tag.trim_matches('-').is_empty()).then_some(tag)
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '-' | '_' | '\'' | '.')
        || (('\u{00C0}'..='\u{024F}').contains(&c) && c.is_alphabetic())
}

fn showing_text(html: &str) -> Option<String> {
    SMALL_TEXT
        .captures(html)
        .map(|caps| collapse_whitespace(&strip_tags(&caps[1])))
}

/// Parses `Showing 1-30 of 1,234` into `(30, 1234)`.
pub fn parse_showing(text: &str) -> Option<(usize, usize)> {
    let caps = SHOWING.captures(text)?;
    let number = |m: &str| m.replace(',', "").parse::<usize>().ok();
    Some((number(&caps[1])?, number(&caps[2])?))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedQuote {
    pub text: String,
    pub author: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

pub fn parse_quotes(html: &str, base_url: &Url) -> Vec<ScrapedQuote> {
    html.split(r#"<div class="quote "#)
        .skip(1)
        .filter_map(|block| {
            let inner = QUOTE_TEXT.captures(block)?;
            let author = AUTHOR
                .captures(block)
                .map(|caps| collapse_whitespace(&strip_tags(&caps[1])))
                .map(|author| author.trim_matches(&[' ', ','][..]).to_string())
                .filter(|author| !author.is_empty());
            let title = TITLE
                .captures(block)
                .map(|caps| collapse_whitespace(&strip_tags(&caps[1])))
                .filter(|title| !title.is_empty());
            let url = QUOTE_URL
                .captures(block)
                .and_then(|caps| base_url.join(&decode_entities(&caps[1])).ok())
                .map(|url| url.to_string());

            Some(ScrapedQuote {
                text: truncate(render_quote_text(&inner[1])),
                author,
                title,
                url,
            })
        })
        .collect()
}

/// Turns the inner HTML of a `quoteText` block into markdown.
///
/// Top-level text is trimmed and the `― Author` attribution dropped;
/// `<br>` becomes a newline (never more than two in a row); emphasis tags become
/// markdown; any other element is dropped together with its content.
pub fn render_quote_text(html: &str) -> String {
    // (tag name, kept)
    let mut open: Vec<(String, bool)> = Vec::new();
    let mut newlines = 0;
    let mut out = String::new();

    for token in TOKEN.find_iter(html).map(|m| m.as_str()) {
        let Some(tag) = TAG_NAME.captures(token) else {
            if token.starts_with('<') {
                // comments, doctype
                continue;
            }
            let text = decode_entities(token);
            if open.is_empty() {
                let trimmed = text.split_once('―').map_or(text.as_str(), |(before, _)| before);
                if trimmed.trim().is_empty() {
                    continue;
                }
                if trimmed.starts_with(char::is_whitespace)
                    && !out.is_empty()
                    && !out.ends_with(char::is_whitespace)
                {
                    out.push(' ');
                }
                newlines = 0;
                out.push_str(trimmed.trim());
                out.push(' ');
            } else if open.iter().all(|(_, kept)| *kept) {
                out.push_str(&text);
            }
            continue;
        };

        let closing = !tag[1].is_empty();
        let name = tag[2].to_lowercase();
        let void = matches!(name.as_str(), "br" | "img" | "hr" | "wbr") || token.ends_with("/>");

        if closing {
            if let Some(pos) = open.iter().rposition(|(n, _)| *n == name) {
                for (n, kept) in open.drain(pos..).rev() {
                    if kept {
                        out.push_str(markup(&n).unwrap_or_default());
                    }
                }
            }
            continue;
        }

        if open.is_empty() {
            if name == "br" {
                if newlines < 2 {
                    newlines += 1;
                    out.push('\n');
                }
                continue;
            }
            newlines = 0;
        }

        if void {
            continue;
        }

        let ancestors_kept = open.iter().all(|(_, kept)| *kept);
        let kept = ancestors_kept && markup(&name).is_some();
        if kept {
            out.push_str(markup(&name).unwrap_or_default());
        }
        open.push((name, kept));
    }

    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn markup(tag: &str) -> Option<&'static str> {
    match tag {
        "i" | "em" => Some("_"),
        "b" | "strong" => Some("**"),
        "u" => Some("__"),
        _ => None,
    }
}

fn truncate(text: String) -> String {
    if text.chars().count() < MAX_QUOTE_LEN {
        return text;
    }
    let kept: String = text.chars().take(MAX_QUOTE_LEN - 2).collect();
    format!("{kept} …")
}

fn strip_tags(html: &str) -> String {
    decode_entities(&ANY_TAG.replace_all(html, ""))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Named and numeric entities; unknown ones are left as written.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).replace('\u{a0}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="leftContainer">
  <span class="smallText">
    Showing 1-30 of 2,345
  </span>
  <div class="quote mediumText ">
    <div class="quoteDetails ">
      <div class="quoteText">
        &ldquo;Be yourself;<br> everyone else is <i>already</i> taken.&rdquo;
        <br>  &#8213;
        <span class="authorOrTitle">
          Oscar Wilde,
        </span>
        <span id=quote_book_link_1><a class="authorOrTitle" href="/work/1">De Profundis</a></span>
      </div>
    </div>
    <div class="quoteFooter">
      <div class="greyText smallText left">tags: humor</div>
      <div class="right">
        <a class="smallText" title="View this quote" href="/quotes/19884-be-yourself">Likes</a>
      </div>
    </div>
  </div>
  <div class="quote mediumText ">
    <div class="quoteText">
      &ldquo;So many books,<br><br><br><br> so little <b>time</b>.&rdquo;
      ― <span class="authorOrTitle">Frank Zappa</span>
    </div>
  </div>
</div>
"#;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Happy  Days").as_deref(), Some("happy-days"));
        assert_eq!(normalize_tag("café\tlife").as_deref(), Some("café-life"));
        assert_eq!(normalize_tag("愛"), None);
        assert_eq!(normalize_tag("   "), None);
        assert_eq!(normalize_tag("love/hate?").as_deref(), Some("lovehate"));
    }

    #[test]
    fn test_tag_url_is_encoded() {
        let client = GoodreadsClient::with_base_url("https://www.goodreads.com").unwrap();
        let url = client.tag_url("café-life", Some(3)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.goodreads.com/quotes/tag/caf%C3%A9-life?page=3"
        );
    }

    #[test]
    fn test_parse_showing() {
        assert_eq!(parse_showing("Showing 1-30 of 2,345"), Some((30, 2345)));
        assert_eq!(parse_showing("Showing 1-7 of 7"), Some((7, 7)));
        assert_eq!(parse_showing("Showing lots"), None);
        assert_eq!(
            showing_text(PAGE).as_deref(),
            Some("Showing 1-30 of 2,345")
        );
    }

    #[test]
    fn test_parse_quotes() {
        let base = Url::parse(BASE_URL).unwrap();
        let quotes = parse_quotes(PAGE, &base);
        assert_eq!(quotes.len(), 2);

        assert_eq!(
            quotes[0],
            ScrapedQuote {
                text: "“Be yourself;\neveryone else is _already_ taken.”".to_string(),
                author: Some("Oscar Wilde".to_string()),
                title: Some("De Profundis".to_string()),
                url: Some("https://www.goodreads.com/quotes/19884-be-yourself".to_string()),
            }
        );

        assert_eq!(quotes[1].text, "“So many books,\n\nso little **time**.”");
        assert_eq!(quotes[1].author.as_deref(), Some("Frank Zappa"));
        assert_eq!(quotes[1].title, None);
        assert_eq!(quotes[1].url, None);
    }

    #[test]
    fn test_long_quotes_are_truncated() {
        let text = truncate("x".repeat(5000));
        assert_eq!(text.chars().count(), MAX_QUOTE_LEN);
        assert!(text.ends_with(" …"));
        assert_eq!(truncate("short".to_string()), "short");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &#65;&#x42; &bogus;"), "a & b AB &bogus;");
        assert_eq!(
            decode_entities("caf&eacute; &ndash; na&iuml;ve&nbsp;&laquo;x&raquo;"),
            "café – naïve «x»"
        );
    }
}
