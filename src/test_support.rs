// src/test_support.rs
// =============================================================================
// Test helpers shared by the module tests.
//
// - FakeSite: an in-memory website implementing Fetcher, with an artificial
//   per-page delay and counters for how often (and how concurrently) pages
//   were fetched
// - TestServer: a tiny HTTP/1.1 responder on a local port, so HttpFetcher can
//   be tested without internet access
// =============================================================================

use futures::future::BoxFuture;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

use crate::page::{FetchError, Fetcher};

// The five-page site: "/" links to four pages, each links back home
pub fn hub_site_pages() -> Vec<(&'static str, String)> {
    let mut pages = vec![(
        "/",
        r#"<html><body>
            <h1>Home Page</h1>
            <p>Welcome to the home page.</p>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/page3">Page 3</a>
            <a href="/page4">Page 4</a>
        </body></html>"#
            .to_string(),
    )];
    for (path, n) in [("/page1", 1), ("/page2", 2), ("/page3", 3), ("/page4", 4)] {
        pages.push((
            path,
            format!(
                r#"<html><body>
                    <h1>Page {n}</h1>
                    <p>This is page {n}.</p>
                    <a href="/">Home</a>
                </body></html>"#
            ),
        ));
    }
    pages
}

#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    delay: Duration,
    fetches: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSite {
    pub fn new<P: Into<String>>(pages: Vec<(&str, P)>, delay: Duration) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(path, html)| (path.to_string(), html.into()))
                .collect(),
            delay,
            ..Self::default()
        }
    }

    pub fn hub(delay: Duration) -> Self {
        Self::new(hub_site_pages(), delay)
    }

    // How many times a path was requested
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn serve(&self, url: &Url) -> Result<String, FetchError> {
        let path = url.path().to_string();
        *self.fetches.lock().entry(path.clone()).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.pages
            .get(&path)
            .cloned()
            .ok_or(FetchError::Status(StatusCode::NOT_FOUND))
    }
}

impl Fetcher for FakeSite {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.serve(url))
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    status: u16,
    content_type: String,
    body: String,
    delay: Duration,
}

impl Route {
    pub fn new(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn html(body: &str) -> Self {
        Self::new(200, "text/html; charset=utf-8", body)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct TestServer {
    addr: SocketAddr,
    user_agents: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let user_agents = Arc::new(Mutex::new(Vec::new()));

        let agents = user_agents.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let agents = agents.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, &routes, &agents).await;
                });
            }
        });

        Self {
            addr,
            user_agents,
            task,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    agents: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let mut lines = request.lines();
    let target = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let path = target
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or("/");

    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("user-agent") {
                agents.lock().push(value.trim().to_string());
            }
        }
    }

    let route = routes
        .get(path)
        .cloned()
        .unwrap_or_else(|| Route::new(404, "text/html", "not found"));
    tokio::time::sleep(route.delay).await;

    let reason = StatusCode::from_u16(route.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        reason,
        route.content_type,
        route.body.len(),
        route.body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
