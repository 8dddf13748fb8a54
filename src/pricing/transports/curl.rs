//! Fallback transport that shells out to a command-line HTTP client.

use std::io;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::pricing::transport::{HttpResponse, HttpTransport, TransportError, TransportRequest};

/// Silent, fail on HTTP errors, print the body.
const CURL_ARGS: &[&str] = &["--silent", "--show-error", "--fail"];

// curl exit codes we can map onto transport errors.
const EXIT_COULDNT_RESOLVE_HOST: i32 = 6;
const EXIT_COULDNT_CONNECT: i32 = 7;
const EXIT_HTTP_ERROR: i32 = 22;
const EXIT_OPERATION_TIMEDOUT: i32 = 28;
const EXIT_SSL_CONNECT_ERROR: i32 = 35;
const EXIT_PEER_FAILED_VERIFICATION: i32 = 60;

/// Transport that runs `curl <url>` and treats its stdout as the body.
///
/// TLS verification is left to curl's own defaults. Whether the program
/// exists is checked once, on first use.
pub struct CurlTransport {
    program: String,
    available: OnceCell<bool>,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::with_program("curl")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            available: OnceCell::new(),
        }
    }

    /// Skip the availability check and report a fixed answer.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = OnceCell::new_with(Some(available));
        self
    }

    async fn check_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpTransport for CurlTransport {
    async fn get(&self, request: &TransportRequest) -> Result<HttpResponse, TransportError> {
        let mut command = Command::new(&self.program);
        command
            .args(CURL_ARGS)
            .arg(&request.url)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(request.timeout, command.output())
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    TransportError::Unavailable(format!("{} not found in PATH", self.program))
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(exit_error(output.status.code(), stderr));
        }

        let body = String::from_utf8(output.stdout)
            .map_err(|e| TransportError::Body(e.to_string()))?;

        // curl --fail only exits 0 for non-error statuses.
        Ok(HttpResponse::new(200, body))
    }

    async fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.check_available()).await
    }

    fn name(&self) -> &str {
        "curl"
    }
}

fn exit_error(code: Option<i32>, stderr: String) -> TransportError {
    match code {
        Some(EXIT_OPERATION_TIMEDOUT) => TransportError::Timeout,
        Some(EXIT_COULDNT_RESOLVE_HOST | EXIT_COULDNT_CONNECT) => TransportError::Connect(stderr),
        Some(EXIT_SSL_CONNECT_ERROR | EXIT_PEER_FAILED_VERIFICATION) => TransportError::Tls(stderr),
        Some(EXIT_HTTP_ERROR) => match http_status(&stderr) {
            Some(status) => TransportError::Status(status),
            None => TransportError::Request(format!("HTTP error: {stderr}")),
        },
        Some(code) => TransportError::Request(format!("curl exited with {code}: {stderr}")),
        None => TransportError::Request("curl terminated by signal".to_string()),
    }
}

/// Status code from `--fail` output, e.g.
/// `curl: (22) The requested URL returned error: 503`.
fn http_status(stderr: &str) -> Option<u16> {
    let (_, rest) = stderr.rsplit_once("returned error:")?;
    rest.split_whitespace().next()?.parse().ok()
}
