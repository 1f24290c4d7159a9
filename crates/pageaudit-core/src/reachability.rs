//! Sitemap and robots.txt reachability
//!
//! `SiteReachability` is plain data and always available so the metrics
//! aggregator stays synchronous. The network probe that fills it lives
//! behind the `live-probe` feature.

use serde::{Deserialize, Serialize};

use crate::robots_txt::RobotsTxt;

/// Sitemap locations tried before falling back to robots.txt
pub const SITEMAP_PATHS: &[&str] = &["sitemap.xml", "sitemap-index.xml"];

/// What the probe learned about the page's origin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReachability {
    pub sitemap_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots: Option<RobotsTxt>,
}

impl SiteReachability {
    /// Nothing probed: no sitemap, no robots.txt
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn robots_txt_found(&self) -> bool {
        self.robots.is_some()
    }
}

#[cfg(feature = "live-probe")]
pub use live::HttpSiteProbe;

#[cfg(feature = "live-probe")]
mod live {
    use std::time::Duration;

    use reqwest::{Client, StatusCode, redirect};

    use super::{SITEMAP_PATHS, SiteReachability};
    use crate::error::{Error, Result};
    use crate::robots_txt::{RobotsTxt, parse_robots_txt};
    use crate::url_utils::origin_url;

    const USER_AGENT: &str = concat!("pageaudit/", env!("CARGO_PKG_VERSION"));

    /// Redirect hops followed when fetching robots.txt
    const MAX_ROBOTS_REDIRECTS: usize = 5;

    /// Sequential HEAD/GET probe with a hard per-request timeout
    ///
    /// Every failure (network error, timeout, non-2xx/3xx status) is a miss.
    /// There are no retries. Sitemap HEADs never follow redirects; the
    /// robots.txt GET follows a few hops since sites
    /// commonly redirect it to https or www.
    #[derive(Debug, Clone)]
    pub struct HttpSiteProbe {
        client: Client,
        robots_client: Client,
        timeout: Duration,
    }

    impl HttpSiteProbe {
        pub fn new(timeout: Duration) -> Result<Self> {
            let client = build_client(timeout, redirect::Policy::none())?;
            let robots_client =
                build_client(timeout, redirect::Policy::limited(MAX_ROBOTS_REDIRECTS))?;
            Ok(Self {
                client,
                robots_client,
                timeout,
            })
        }

        /// Probe the origin of `page_url`
        ///
        /// robots.txt is always fetched since the crawlability check needs
        /// it; its `Sitemap:` entries are only tried when neither well-known
        /// sitemap location answers.
        pub async fn probe(&self, page_url: &str) -> SiteReachability {
            let mut reach = SiteReachability::unknown();

            for path in SITEMAP_PATHS {
                let url = origin_url(page_url, path);
                if self.head_reachable(&url).await {
                    reach.sitemap_found = true;
                    reach.sitemap_url = Some(url);
                    break;
                }
            }

            reach.robots = self.fetch_robots(&origin_url(page_url, "robots.txt")).await;

            if !reach.sitemap_found {
                let declared = reach
                    .robots
                    .as_ref()
                    .map(|robots| robots.sitemaps.clone())
                    .unwrap_or_default();
                for url in declared {
                    if self.head_reachable(&url).await {
                        reach.sitemap_found = true;
                        reach.sitemap_url = Some(url);
                        break;
                    }
                }
            }

            if !reach.sitemap_found {
                tracing::warn!(page_url, "no reachable sitemap");
            }
            reach
        }

        async fn head_reachable(&self, url: &str) -> bool {
            match tokio::time::timeout(self.timeout, self.client.head(url).send()).await {
                Ok(Ok(response)) => {
                    let status = response.status();
                    tracing::debug!(url, %status, "sitemap probe");
                    is_reachable(status)
                }
                Ok(Err(e)) => {
                    tracing::debug!(url, error = %e, "sitemap probe failed");
                    false
                }
                Err(_) => {
                    tracing::debug!(url, timeout = ?self.timeout, "sitemap probe timed out");
                    false
                }
            }
        }

        async fn fetch_robots(&self, url: &str) -> Option<RobotsTxt> {
            match tokio::time::timeout(self.timeout, self.get_text(url)).await {
                Ok(Ok(body)) => body.map(|content| parse_robots_txt(&content)),
                Ok(Err(e)) => {
                    tracing::debug!(url, error = %e, "robots.txt fetch failed");
                    None
                }
                Err(_) => {
                    tracing::debug!(url, "robots.txt fetch timed out");
                    None
                }
            }
        }

        async fn get_text(&self, url: &str) -> reqwest::Result<Option<String>> {
            let response = self.robots_client.get(url).send().await?;
            if !response.status().is_success() {
                tracing::debug!(url, status = %response.status(), "robots.txt not available");
                return Ok(None);
            }
            response.text().await.map(Some)
        }
    }

    fn build_client(timeout: Duration, policy: redirect::Policy) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .redirect(policy)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::HttpClient)
    }

    fn is_reachable(status: StatusCode) -> bool {
        status.is_success() || status.is_redirection()
    }

    #[cfg(test)]
    mod tests {
        use std::time::Instant;

        use tokio::net::TcpListener;

        use super::*;

        fn probe() -> HttpSiteProbe {
            HttpSiteProbe::new(Duration::from_secs(5)).unwrap()
        }

        #[tokio::test]
        async fn sitemap_xml_found_first() {
            let mut server = mockito::Server::new_async().await;
            let sitemap = server
                .mock("HEAD", "/sitemap.xml")
                .with_status(200)
                .create_async()
                .await;
            let index = server
                .mock("HEAD", "/sitemap-index.xml")
                .with_status(200)
                .expect(0)
                .create_async()
                .await;

            let reach = probe().probe(&format!("{}/blog/post", server.url())).await;

            assert!(reach.sitemap_found);
            assert_eq!(reach.sitemap_url, Some(format!("{}/sitemap.xml", server.url())));
            assert!(!reach.robots_txt_found());
            sitemap.assert_async().await;
            index.assert_async().await;
        }

        #[tokio::test]
        async fn redirect_counts_as_reachable() {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("HEAD", "/sitemap.xml")
                .with_status(404)
                .create_async()
                .await;
            server
                .mock("HEAD", "/sitemap-index.xml")
                .with_status(301)
                .with_header("location", "/elsewhere.xml")
                .create_async()
                .await;

            let reach = probe().probe(&server.url()).await;
            assert!(reach.sitemap_found);
            assert_eq!(
                reach.sitemap_url,
                Some(format!("{}/sitemap-index.xml", server.url()))
            );
        }

        #[tokio::test]
        async fn falls_back_to_robots_sitemaps() {
            let mut server = mockito::Server::new_async().await;
            let robots = format!(
                "User-agent: *\nDisallow: /private\nSitemap: {0}/missing.xml\nSitemap: {0}/maps/main.xml\n",
                server.url()
            );
            server
                .mock("GET", "/robots.txt")
                .with_status(200)
                .with_body(robots)
                .create_async()
                .await;
            server
                .mock("HEAD", "/missing.xml")
                .with_status(404)
                .create_async()
                .await;
            server
                .mock("HEAD", "/maps/main.xml")
                .with_status(200)
                .create_async()
                .await;

            let reach = probe().probe(&server.url()).await;
            assert!(reach.sitemap_found);
            assert_eq!(reach.sitemap_url, Some(format!("{}/maps/main.xml", server.url())));
            let robots = reach.robots.expect("robots.txt parsed");
            assert_eq!(robots.sitemaps.len(), 2);
            assert_eq!(robots.agent_rules["*"].disallow, vec!["/private"]);
        }

        #[tokio::test]
        async fn redirected_robots_txt_is_followed() {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("GET", "/robots.txt")
                .with_status(301)
                .with_header("location", "/real-robots.txt")
                .create_async()
                .await;
            server
                .mock("GET", "/real-robots.txt")
                .with_status(200)
                .with_body(format!(
                    "User-agent: *\nDisallow: /\nSitemap: {}/maps/main.xml\n",
                    server.url()
                ))
                .create_async()
                .await;
            server
                .mock("HEAD", "/maps/main.xml")
                .with_status(200)
                .create_async()
                .await;

            let reach = probe().probe(&server.url()).await;
            assert!(reach.robots_txt_found());
            assert!(reach.sitemap_found);
            assert_eq!(reach.sitemap_url, Some(format!("{}/maps/main.xml", server.url())));
            let robots = reach.robots.expect("robots.txt parsed");
            assert_eq!(robots.agent_rules["*"].disallow, vec!["/"]);
        }

        #[tokio::test]
        async fn silent_host_times_out() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let mut held = Vec::new();
                while let Ok((stream, _)) = listener.accept().await {
                    held.push(stream);
                }
            });

            let probe = HttpSiteProbe::new(Duration::from_millis(200)).unwrap();
            let started = Instant::now();
            let reach = probe.probe(&format!("http://{addr}/page")).await;

            assert_eq!(reach, SiteReachability::unknown());
            assert!(started.elapsed() < Duration::from_secs(3));
        }

        #[tokio::test]
        async fn nothing_reachable() {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("GET", "/robots.txt")
                .with_status(500)
                .create_async()
                .await;

            let reach = probe().probe(&server.url()).await;
            assert_eq!(reach, SiteReachability::unknown());
        }

        #[tokio::test]
        async fn connection_errors_are_misses() {
            let reach = probe().probe("http://127.0.0.1:1/").await;
            assert!(!reach.sitemap_found);
            assert!(reach.robots.is_none());
        }
    }
}
