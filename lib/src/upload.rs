use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::{to_bytes, Bytes};
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, Uri};
use hyper_rustls::HttpsConnector;
use serde::Deserialize;

use crate::error::Error;
use crate::multipart::Form;

pub const DEFAULT_BASE_URL: &str = "https://demo.gradientone.com";

const AUTH_TOKEN_HEADER: &str = "Auth-Token";
const UPLOAD_CATEGORY: &str = "Result";

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub base_url: Uri,
    pub auth_token: String,
    /// Zero disables the deadline.
    pub timeout: Duration,
}

impl UploadConfig {
    /// `{base_url}/uploads`, tolerating a trailing slash on the base.
    pub fn endpoint(&self) -> Result<Uri, Error> {
        let base = self.base_url.to_string();
        Ok(format!("{}/uploads", base.trim_end_matches('/')).parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    result: UploadResult,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct UploadResult {
    command_id: Option<String>,
    info: Option<UploadInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct UploadInfo {
    results_link: Option<String>,
}

impl UploadResponse {
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        let res: UploadResponse = serde_json::from_slice(body)?;
        if res.result.command_id.is_none() {
            return Err(Error::MalformedResponse("result.command_id"));
        }
        if res.results_link_opt().is_none() {
            return Err(Error::MalformedResponse("result.info.results_link"));
        }
        Ok(res)
    }

    pub fn command_id(&self) -> &str {
        self.result.command_id.as_deref().unwrap_or_default()
    }

    pub fn results_link(&self) -> &str {
        self.results_link_opt().unwrap_or_default()
    }

    fn results_link_opt(&self) -> Option<&str> {
        self.result
            .info
            .as_ref()
            .and_then(|info| info.results_link.as_deref())
    }
}

/// Posts result files to the platform's upload endpoint.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: Client<HttpsConnector<HttpConnector>>,
    config: Arc<UploadConfig>,
}

impl Uploader {
    pub fn new(config: UploadConfig) -> Self {
        let mut root_store = rustls::RootCertStore::empty();
        match rustls_native_certs::load_native_certs() {
            Ok(certs) => {
                let ders: Vec<Vec<u8>> = certs.into_iter().map(|c| c.0).collect();
                let (added, ignored) = root_store.add_parsable_certificates(&ders);
                log::debug!("loaded {} native root certs ({} ignored)", added, ignored);
            }
            Err(err) => log::warn!("could not load native root certs: {}", err),
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http);

        Uploader {
            client: Client::builder().build::<_, Body>(https),
            config: Arc::new(config),
        }
    }

    /// Uploads `payload` as a JSON file named `filename`.
    pub async fn upload(
        &self,
        filename: &str,
        payload: impl Into<Bytes>,
    ) -> Result<UploadResponse, Error> {
        let url = self.config.endpoint()?;
        let form = Form::default()
            .file("file", filename, "application/json", payload)
            .text("category", UPLOAD_CATEGORY);

        let req = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(CONTENT_TYPE, form.content_type())
            .header(AUTH_TOKEN_HEADER, &self.config.auth_token)
            .body(Body::from(form.into_body()))?;

        log::info!("uploading {} to {}", filename, url);
        let began = Instant::now();

        let timeout = self.config.timeout;
        let res = if timeout.is_zero() {
            self.client.request(req).await?
        } else {
            match tokio::time::timeout(timeout, self.client.request(req)).await {
                Ok(res) => res?,
                Err(_) => return Err(Error::Timeout(timeout)),
            }
        };

        let code = res.status();
        let body = to_bytes(res.into_body()).await?;
        log::debug!("upload answered {} in {:?}", code, began.elapsed());

        if !code.is_success() {
            return Err(Error::Status {
                code,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        UploadResponse::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Response, Server, StatusCode};
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    #[derive(Debug)]
    struct Received {
        path: String,
        token: Option<String>,
        content_type: String,
        body: Bytes,
    }

    // Serves a single canned answer and reports every request it sees.
    async fn serve(
        status: StatusCode,
        answer: &'static str,
        delay: Duration,
    ) -> (SocketAddr, mpsc::UnboundedReceiver<Received>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let make_svc = make_service_fn(move |_| {
            let tx = tx.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    let tx = tx.clone();
                    async move {
                        let path = req.uri().path().to_string();
                        let token = req
                            .headers()
                            .get(AUTH_TOKEN_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let content_type = req
                            .headers()
                            .get(CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        let body = to_bytes(req.into_body()).await?;
                        let _ = tx.send(Received {
                            path,
                            token,
                            content_type,
                            body,
                        });
                        tokio::time::sleep(delay).await;
                        Ok::<_, hyper::Error>(
                            Response::builder()
                                .status(status)
                                .body(Body::from(answer))
                                .unwrap(),
                        )
                    }
                }))
            }
        });

        let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_svc);
        let addr = server.local_addr();
        tokio::spawn(server);
        (addr, rx)
    }

    fn uploader(addr: SocketAddr, timeout: Duration) -> Uploader {
        Uploader::new(UploadConfig {
            base_url: format!("http://{}/", addr).parse().unwrap(),
            auth_token: "secret-token".to_string(),
            timeout,
        })
    }

    const OK_ANSWER: &str = r#"{"result":{"command_id":"C5676628396616577","info":{"results_link":"https://acme.gradientone.com/results/C5676628396616577"}}}"#;

    #[tokio::test]
    async fn posts_multipart_form_with_token() {
        let (addr, mut rx) = serve(StatusCode::OK, OK_ANSWER, Duration::ZERO).await;
        let res = uploader(addr, Duration::from_secs(5))
            .upload("sample_result.json", &b"{\"fields\":[]}"[..])
            .await
            .unwrap();

        assert_eq!(res.command_id(), "C5676628396616577");
        assert_eq!(
            res.results_link(),
            "https://acme.gradientone.com/results/C5676628396616577"
        );

        let got = rx.recv().await.unwrap();
        assert_eq!(got.path, "/uploads");
        assert_eq!(got.token.as_deref(), Some("secret-token"));
        assert!(got.content_type.starts_with("multipart/form-data; boundary="));

        let body = String::from_utf8(got.body.to_vec()).unwrap();
        assert!(body.contains("name=\"file\"; filename=\"sample_result.json\""));
        assert!(body.contains("Content-Type: application/json\r\n\r\n{\"fields\":[]}\r\n"));
        assert!(body.contains("name=\"category\"\r\n\r\nResult\r\n"));
    }

    #[tokio::test]
    async fn rejected_upload_reports_status() {
        let (addr, _rx) = serve(StatusCode::UNAUTHORIZED, "bad token", Duration::ZERO).await;
        let err = uploader(addr, Duration::ZERO)
            .upload("sample_result.json", Bytes::new())
            .await
            .unwrap_err();
        match err {
            Error::Status { code, body } => {
                assert_eq!(code, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "bad token");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let (addr, _rx) = serve(StatusCode::OK, OK_ANSWER, Duration::from_secs(2)).await;
        let err = uploader(addr, Duration::from_millis(50))
            .upload("sample_result.json", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn missing_results_link_is_malformed() {
        let (addr, _rx) = serve(
            StatusCode::OK,
            r#"{"result":{"command_id":"C1","info":{}}}"#,
            Duration::ZERO,
        )
        .await;
        let err = uploader(addr, Duration::ZERO)
            .upload("sample_result.json", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedResponse("result.info.results_link")
        ));
    }

    #[test]
    fn response_without_command_id_is_malformed() {
        let err = UploadResponse::parse(br#"{"result":{"info":{"results_link":"x"}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse("result.command_id")));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let mut config = UploadConfig {
            base_url: Uri::from_static("https://demo.gradientone.com"),
            auth_token: String::new(),
            timeout: Duration::ZERO,
        };
        assert_eq!(
            config.endpoint().unwrap().to_string(),
            "https://demo.gradientone.com/uploads"
        );
        config.base_url = Uri::from_static("https://acme.example.com/api/");
        assert_eq!(
            config.endpoint().unwrap().to_string(),
            "https://acme.example.com/api/uploads"
        );
    }
}
