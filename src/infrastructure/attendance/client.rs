//! Attendance service abstraction and its reqwest implementation

use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{RequestBuilder, Response, Url};
use tracing::debug;

use super::error::ServiceError;
use crate::domain::{ClockReceipt, EmployeeId, EmployeePresence};

const PRESENCE_PATH: &str = "api/stato-dipendenti";
const CLOCK_PATH: &str = "timbratura";

/// Connection settings for the attendance server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub server: String,
    /// Raw `Cookie` header value of an existing login session
    pub session_cookie: Option<String>,
    /// `None` keeps the transport default
    pub request_timeout: Option<Duration>,
}

/// The two endpoints the board talks to
#[async_trait::async_trait]
pub trait AttendanceService: Send + Sync + 'static {
    /// `GET /api/stato-dipendenti`
    async fn fetch_presence(&self) -> Result<Vec<EmployeePresence>, ServiceError>;

    /// `POST /timbratura` with `dipendente_id`
    async fn toggle_clock(&self, employee: &EmployeeId) -> Result<ClockReceipt, ServiceError>;

    /// Server display name
    fn endpoint_name(&self) -> String;
}

pub struct HttpAttendanceService {
    http: reqwest::Client,
    base: Url,
    session_cookie: Option<String>,
}

impl HttpAttendanceService {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        let base = parse_base_url(&settings.server)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
            session_cookie: settings
                .session_cookie
                .clone()
                .filter(|value| !value.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ServiceError> {
        self.base.join(path).map_err(|err| ServiceError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            reason: err.to_string(),
        })
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.as_str()),
            None => request,
        }
    }

    async fn checked_body(response: Response) -> Result<String, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status { status });
        }
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl AttendanceService for HttpAttendanceService {
    async fn fetch_presence(&self) -> Result<Vec<EmployeePresence>, ServiceError> {
        let url = self.url(PRESENCE_PATH)?;
        debug!(%url, "fetching presence list");

        let response = self.with_session(self.http.get(url)).send().await?;
        let body = Self::checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn toggle_clock(&self, employee: &EmployeeId) -> Result<ClockReceipt, ServiceError> {
        let url = self.url(CLOCK_PATH)?;
        debug!(%url, employee = %employee, "submitting clock toggle");

        let request = self
            .http
            .post(url)
            .form(&[("dipendente_id", employee.as_str())]);
        let response = self.with_session(request).send().await?;
        let body = Self::checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint_name(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }
}

/// Accepts `host:port`, `http://host` or a URL with a path prefix.
fn parse_base_url(server: &str) -> Result<Url, ServiceError> {
    let trimmed = server.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|err| ServiceError::InvalidUrl {
        url: server.to_string(),
        reason: err.to_string(),
    })?;
    // Url::join replaces the last segment unless the path ends with '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn settings(server: &str) -> ServiceSettings {
        ServiceSettings {
            server: server.to_string(),
            session_cookie: None,
            request_timeout: None,
        }
    }

    #[test]
    fn base_url_gets_scheme_and_trailing_slash() {
        let url = parse_base_url("localhost:5003").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5003/");

        let url = parse_base_url("https://hr.example.com/presenze").unwrap();
        assert_eq!(url.as_str(), "https://hr.example.com/presenze/");
    }

    #[test]
    fn endpoint_urls_keep_path_prefix() {
        let service = HttpAttendanceService::new(&settings("https://hr.example.com/presenze")).unwrap();
        assert_eq!(
            service.url(PRESENCE_PATH).unwrap().as_str(),
            "https://hr.example.com/presenze/api/stato-dipendenti"
        );
        assert_eq!(
            service.url(CLOCK_PATH).unwrap().as_str(),
            "https://hr.example.com/presenze/timbratura"
        );
        assert_eq!(service.endpoint_name(), "https://hr.example.com/presenze");
    }

    #[test]
    fn rejects_unparseable_server() {
        let err = parse_base_url("http://").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUrl { .. }));
    }

    #[test]
    fn blank_cookie_is_dropped() {
        let mut cfg = settings("localhost:5003");
        cfg.session_cookie = Some("   ".into());
        let service = HttpAttendanceService::new(&cfg).unwrap();
        assert!(service.session_cookie.is_none());
    }

    /// What a one-shot local server saw
    struct CapturedRequest {
        head: String,
        body: String,
    }

    impl CapturedRequest {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
            })
        }
    }

    /// Accept one connection, record it and answer with a canned response.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before the request head");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let mut captured = CapturedRequest {
                head: String::from_utf8_lossy(&buf[..head_end]).into_owned(),
                body: String::new(),
            };
            let len: usize = captured
                .header("content-length")
                .and_then(|value| value.parse().ok())
                .unwrap_or(0);
            while buf.len() < head_end + len {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            captured.body = String::from_utf8_lossy(&buf[head_end..]).into_owned();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            captured
        });

        (format!("http://{addr}"), handle)
    }

    fn local_service(server: &str, cookie: Option<&str>) -> HttpAttendanceService {
        HttpAttendanceService {
            http: reqwest::Client::builder().no_proxy().build().unwrap(),
            base: parse_base_url(server).unwrap(),
            session_cookie: cookie.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn fetch_presence_reads_the_status_list() {
        let (server, request) = serve_once(
            "200 OK",
            "application/json",
            r#"[{"id": 3, "nome": "Anna", "cognome": "Bianchi", "presente": true, "inizio": "08:15"},
                {"id": "4", "nome": "Carlo", "cognome": "Rossi", "presente": false, "inizio": null}]"#,
        )
        .await;

        let records = local_service(&server, None).fetch_presence().await.unwrap();
        let request = request.await.unwrap();

        assert_eq!(request.request_line(), "GET /api/stato-dipendenti HTTP/1.1");
        assert!(request.header("cookie").is_none());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "3");
        assert_eq!(records[0].clock_in(), Some("08:15"));
        assert_eq!(records[1].id.as_str(), "4");
        assert!(!records[1].presente);
    }

    #[tokio::test]
    async fn toggle_posts_form_with_session_cookie() {
        let (server, request) = serve_once(
            "200 OK",
            "application/json",
            r#"{"success": true, "message": "Timbratura registrata", "tipo": "ingresso"}"#,
        )
        .await;

        let receipt = local_service(&server, Some("session=abc123"))
            .toggle_clock(&EmployeeId::new("7"))
            .await
            .unwrap();
        let request = request.await.unwrap();

        assert_eq!(request.request_line(), "POST /timbratura HTTP/1.1");
        assert_eq!(
            request.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.body, "dipendente_id=7");
        assert_eq!(request.header("cookie"), Some("session=abc123"));
        assert!(receipt.success);
        assert_eq!(receipt.message_text(), "Timbratura registrata");
    }

    #[tokio::test]
    async fn server_error_is_a_status_failure() {
        let (server, request) =
            serve_once("500 Internal Server Error", "text/plain", "boom").await;

        let err = local_service(&server, None)
            .toggle_clock(&EmployeeId::new("7"))
            .await
            .unwrap_err();
        request.await.unwrap();

        match err {
            ServiceError::Status { status } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_page_instead_of_json_is_a_decode_failure() {
        let (server, request) = serve_once(
            "200 OK",
            "text/html; charset=utf-8",
            "<!DOCTYPE html><html><body><form action=\"/login\"></form></body></html>",
        )
        .await;

        let err = local_service(&server, None).fetch_presence().await.unwrap_err();
        request.await.unwrap();

        assert!(matches!(err, ServiceError::Decode(_)));
    }
}
