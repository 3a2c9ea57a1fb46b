//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's matcher, providing a
/// simplified interface for checking if URLs are allowed.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = no usable policy for this host)
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt cannot be fetched or read.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if no policy document was available for the host
    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The robots.txt product token (e.g. "jobsweep")
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}

/// Extracts the robots.txt product token from a full User-Agent header
///
/// Robots.txt groups name a product ("jobsweep"), not a full header.
/// Parenthesized comments are skipped. A browser-style header starting with
/// `Mozilla/` names the crawler in its last `product/version`; any other
/// header names it first.
///
/// # Examples
///
/// ```
/// use jobsweep::robots::robots_token;
///
/// assert_eq!(robots_token("Mozilla/5.0 (X11) Chrome/124.0 jobsweep/1.0"), "jobsweep");
/// assert_eq!(robots_token("MyBot/1.0 (+https://example.test/bot)"), "MyBot");
/// assert_eq!(robots_token("TestBot"), "TestBot");
/// ```
pub fn robots_token(user_agent: &str) -> &str {
    let products = products(user_agent);

    let product = match products.first() {
        Some(first) if product_name(first).eq_ignore_ascii_case("mozilla") => products
            .iter()
            .rev()
            .find(|product| product.contains('/'))
            .copied(),
        first => first.copied(),
    };

    match product.map(product_name) {
        Some(name) if !name.is_empty() => name,
        _ => "*",
    }
}

/// Whitespace-separated words of a header that sit outside `(...)` comments
fn products(user_agent: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in user_agent.char_indices() {
        let boundary = c.is_whitespace() || c == '(' || c == ')';
        if boundary {
            if let Some(begin) = start.take() {
                words.push(&user_agent[begin..i]);
            }
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if !boundary && depth == 0 && start.is_none() => start = Some(i),
            _ => {}
        }
    }
    if let Some(begin) = start {
        words.push(&user_agent[begin..]);
    }

    words
}

fn product_name(product: &str) -> &str {
    product.split('/').next().unwrap_or(product)
}
