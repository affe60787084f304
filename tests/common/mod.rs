//! In-process HTTP stub for the commerce backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as seen by the stub
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

type Routes = Arc<Mutex<HashMap<(String, String), (u16, String)>>>;

/// Stub server answering canned responses per method and path
pub struct StubBackend {
    pub base_url: String,
    routes: Routes,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let routes: Routes = Arc::default();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (r, q) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (r, q) = (r.clone(), q.clone());
                tokio::spawn(async move {
                    let _ = serve(stream, r, q).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            routes,
            requests,
        }
    }

    pub fn route(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes.lock().expect("routes").insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests").clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Stock token route issuing `token` valid for `expires_in` seconds
    pub fn token(&self, token: &str, expires_in: i64) {
        self.route(
            "POST",
            "/oauth/access_token",
            200,
            &format!(r#"{{"access_token":"{token}","expires_in":{expires_in},"token_type":"Bearer"}}"#),
        );
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: Routes,
    requests: Arc<Mutex<Vec<Recorded>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < head_end + length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(head_end + length);
    let body = String::from_utf8_lossy(&buf[head_end..body_end]).to_string();

    let (status, payload) = routes
        .lock()
        .expect("routes")
        .get(&(method.clone(), path.clone()))
        .cloned()
        .unwrap_or((404, r#"{"errors":[{"title":"Not Found"}]}"#.to_string()));

    requests.lock().expect("requests").push(Recorded {
        method,
        path,
        headers,
        body,
    });

    let response = format!(
        "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
