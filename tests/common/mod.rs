//! Common test utilities: scripted backends, a tiny HTTP responder and temp dirs
#![allow(dead_code)]

use bunyang::api::{
    AnalysisBackend, AnalysisRequest, AnalysisResult, ApiError, CopySamples, HistoryEntry,
    LeadForm, SiteDetails, SiteResult, SiteSearch,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Scripted answer for one query
#[derive(Debug, Clone)]
pub enum Reply {
    Sites(Vec<SiteResult>),
    Http(u16),
    InvalidResponse,
    ClientTimeout,
    /// Never answers
    Hang,
}

#[derive(Debug, Clone)]
struct Script {
    delay: Duration,
    reply: Reply,
}

/// Fake `SiteSearch` with per-query replies and call accounting
pub struct ScriptedSearch {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
    completed: AtomicUsize,
    aborted: AtomicUsize,
}

impl ScriptedSearch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            aborted: AtomicUsize::new(0),
        })
    }

    /// Answer `query` with `reply` after `delay`
    pub fn script(&self, query: &str, delay: Duration, reply: Reply) {
        self.scripts
            .lock()
            .unwrap()
            .insert(query.to_string(), Script { delay, reply });
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Requests whose future was dropped before it produced a reply
    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a> {
    finished: bool,
    aborted: &'a AtomicUsize,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait::async_trait]
impl SiteSearch for ScriptedSearch {
    async fn search_sites(&self, query: &str) -> Result<Vec<SiteResult>, ApiError> {
        self.calls.lock().unwrap().push(query.to_string());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or(Script {
                delay: Duration::ZERO,
                reply: Reply::Sites(Vec::new()),
            });

        let mut guard = InFlightGuard {
            finished: false,
            aborted: &self.aborted,
        };

        tokio::time::sleep(script.delay).await;
        if matches!(script.reply, Reply::Hang) {
            std::future::pending::<()>().await;
        }

        guard.finished = true;
        self.completed.fetch_add(1, Ordering::SeqCst);

        match script.reply {
            Reply::Sites(sites) => Ok(sites),
            Reply::Http(status) => Err(ApiError::Http {
                status,
                body: "error".to_string(),
            }),
            Reply::InvalidResponse => Err(ApiError::InvalidResponse(
                "invalid type: map, expected a sequence".to_string(),
            )),
            Reply::ClientTimeout => Err(ApiError::Timeout),
            Reply::Hang => unreachable!("hang never completes"),
        }
    }
}

pub fn site(id: &str, name: &str, address: &str) -> SiteResult {
    SiteResult::new(id, name, address)
}

/// Fake `AnalysisBackend` that records what it was sent
#[derive(Default)]
pub struct FakeBackend {
    pub details: Mutex<HashMap<String, SiteDetails>>,
    pub analysis: Mutex<Option<AnalysisResult>>,
    pub copy: Mutex<Option<CopySamples>>,
    pub history: Mutex<Vec<HistoryEntry>>,
    pub analyze_requests: Mutex<Vec<AnalysisRequest>>,
    pub copy_requests: Mutex<Vec<AnalysisRequest>>,
    pub leads: Mutex<Vec<LeadForm>>,
    pub history_queries: Mutex<Vec<Option<String>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn unavailable() -> ApiError {
    ApiError::Http {
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for FakeBackend {
    async fn site_details(&self, id: &str) -> Result<SiteDetails, ApiError> {
        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(ApiError::Http {
                status: 404,
                body: "not found".to_string(),
            })
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError> {
        self.analyze_requests.lock().unwrap().push(request.clone());
        self.analysis.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn regenerate_copy(&self, request: &AnalysisRequest) -> Result<CopySamples, ApiError> {
        self.copy_requests.lock().unwrap().push(request.clone());
        self.copy.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn submit_lead(&self, lead: &LeadForm) -> Result<(), ApiError> {
        self.leads.lock().unwrap().push(lead.clone());
        Ok(())
    }

    async fn history(&self, email: Option<&str>) -> Result<Vec<HistoryEntry>, ApiError> {
        self.history_queries
            .lock()
            .unwrap()
            .push(email.map(str::to_string));
        Ok(self.history.lock().unwrap().clone())
    }
}

/// A request as seen by [`TestServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, exactly as sent
    pub target: String,
    pub body: String,
}

/// Canned response for [`TestServer`]
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl CannedResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> CannedResponse + Send + Sync>;

/// Minimal HTTP/1.1 responder on an ephemeral local port
pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> CannedResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handler: Handler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let Some(request) = read_request(&mut stream).await else {
                        return;
                    };
                    recorded.lock().unwrap().push(request.clone());

                    let response = handler(&request);
                    tokio::time::sleep(response.delay).await;

                    let head = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        response.status,
                        reason_phrase(response.status),
                        response.body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(response.body.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            task,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        target,
        body,
    })
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Temporary directory fixture for config and log files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read test file")
    }
}
