//! Per-host robots.txt cache
//!
//! Policies are fetched lazily, at most once per host per run, and are never
//! refreshed mid-run.

use crate::robots::parser::{robots_token, ParsedRobots};
use crate::url::host_key;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use url::Url;

type PolicySlot = Arc<OnceCell<Arc<ParsedRobots>>>;

/// Caches the crawling policy of every host the run touches
///
/// Each host gets a [`OnceCell`] so concurrent first requests to the same
/// host share a single robots.txt download; after population the entry is
/// read-only.
pub struct PolicyCache {
    client: Client,
    agent_token: String,
    entries: Mutex<HashMap<String, PolicySlot>>,
}

impl PolicyCache {
    /// Creates an empty cache that fetches with `client`
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests
    /// * `user_agent` - Full User-Agent header; its product token selects
    ///   the robots.txt group
    pub fn new(client: Client, user_agent: &str) -> Self {
        Self {
            client,
            agent_token: robots_token(user_agent).to_string(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether the host's policy allows fetching `url`
    ///
    /// A host whose robots.txt cannot be retrieved is treated as having no
    /// restrictions. URLs without a host are never allowed.
    pub async fn allowed(&self, url: &Url) -> bool {
        match self.policy_for(url).await {
            Some(policy) => policy.is_allowed(url.as_str(), &self.agent_token),
            None => false,
        }
    }

    /// Returns the number of hosts with a cached (or in-flight) policy
    pub fn cached_hosts(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    async fn policy_for(&self, url: &Url) -> Option<Arc<ParsedRobots>> {
        let host = host_key(url)?;

        let slot = {
            let mut entries = self.entries.lock().ok()?;
            entries
                .entry(host.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let policy = slot
            .get_or_init(|| async {
                let robots_url = robots_url(url);
                Arc::new(fetch_robots(&self.client, &robots_url).await)
            })
            .await;

        Some(Arc::clone(policy))
    }
}

/// Builds the well-known robots.txt URL for the URL's origin
fn robots_url(url: &Url) -> Url {
    let mut robots_url = url.clone();
    robots_url.set_path("/robots.txt");
    robots_url.set_query(None);
    robots_url.set_fragment(None);
    robots_url
}

/// Fetches and parses robots.txt, falling back to allow-all on any failure
pub async fn fetch_robots(client: &Client, robots_url: &Url) -> ParsedRobots {
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    let response = match client.get(robots_url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt at {} returned HTTP {}, treating as allow-all",
            robots_url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("Failed to read robots.txt body from {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_robots_url() {
        let url = Url::parse("https://example.test/jobs/1?q=x#frag").unwrap();
        assert_eq!(
            robots_url(&url).as_str(),
            "https://example.test/robots.txt"
        );
    }

    #[tokio::test]
    async fn test_explicit_disallow_honored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
            )
            .mount(&server)
            .await;

        let cache = PolicyCache::new(Client::new(), "TestBot/1.0");
        let allowed = Url::parse(&format!("{}/jobs/1", server.uri())).unwrap();
        let denied = Url::parse(&format!("{}/private/jobs/2", server.uri())).unwrap();

        assert!(cache.allowed(&allowed).await);
        assert!(!cache.allowed(&denied).await);
    }

    #[tokio::test]
    async fn test_missing_robots_allows_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let cache = PolicyCache::new(Client::new(), "TestBot/1.0");
        let url = Url::parse(&format!("{}/private/anything", server.uri())).unwrap();

        assert!(cache.allowed(&url).await);
    }

    #[tokio::test]
    async fn test_server_error_allows_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let cache = PolicyCache::new(Client::new(), "TestBot/1.0");
        let url = Url::parse(&format!("{}/jobs", server.uri())).unwrap();

        assert!(cache.allowed(&url).await);
    }

    #[tokio::test]
    async fn test_unreachable_host_allows_everything() {
        let cache = PolicyCache::new(Client::new(), "TestBot/1.0");
        // Port 9 (discard) on localhost is expected to refuse connections
        let url = Url::parse("http://127.0.0.1:9/jobs").unwrap();

        assert!(cache.allowed(&url).await);
    }

    #[tokio::test]
    async fn test_policy_fetched_once_per_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = PolicyCache::new(Client::new(), "TestBot/1.0");
        for i in 0..5 {
            let url = Url::parse(&format!("{}/jobs/{}", server.uri(), i)).unwrap();
            assert!(cache.allowed(&url).await);
        }

        assert_eq!(cache.cached_hosts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_share_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(PolicyCache::new(Client::new(), "TestBot/1.0"));
        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            let url = Url::parse(&format!("{}/jobs/{}", server.uri(), i)).unwrap();
            handles.push(tokio::spawn(async move { cache.allowed(&url).await }));
        }

        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }
}
