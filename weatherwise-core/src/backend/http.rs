use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response, Url, header::CONTENT_DISPOSITION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

use crate::{
    export::{CsvDownload, DownloadRequest, ExportFormat, JsonEnvelope},
    model::{Fetched, ForecastQuery, ForecastResult, HealthStatus, HistoricalAnalysis, HistoricalQuery},
};

use super::DashboardBackend;

const HISTORICAL_PATH: &str = "api/historical-analysis";
const FORECAST_PATH: &str = "api/forecast";
const DOWNLOAD_PATH: &str = "api/download";
const HEALTH_PATH: &str = "api/health";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            http: build_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for '{path}'"))
    }

    async fn get_payload<T>(&self, path: &str, params: &[(&str, String)], what: &str) -> Result<Fetched<T>>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(path)?;
        debug!(%url, ?params, "GET {what}");

        let res = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request"))?;

        let body = success_body(res, what).await?;

        let raw: Value = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse {what} JSON"))?;

        Fetched::from_value(raw).with_context(|| format!("Invalid {what} payload"))
    }

    async fn post_download(&self, format: ExportFormat, data: &Value) -> Result<Response> {
        let url = self.endpoint(DOWNLOAD_PATH)?;
        debug!(%url, %format, "POST download");

        let res = self
            .http
            .post(url)
            .json(&DownloadRequest { format, data })
            .send()
            .await
            .with_context(|| format!("Failed to send {format} download request"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!(
                "{} download failed with status {}: {}",
                format,
                status,
                truncate_body(&body),
            ));
        }

        Ok(res)
    }
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn historical_analysis(&self, query: &HistoricalQuery) -> Result<Fetched<HistoricalAnalysis>> {
        self.get_payload(HISTORICAL_PATH, &query.to_params(), "historical analysis")
            .await
    }

    async fn forecast(&self, query: &ForecastQuery) -> Result<Fetched<ForecastResult>> {
        self.get_payload(FORECAST_PATH, &query.to_params(), "forecast").await
    }

    async fn download_csv(&self, data: &Value) -> Result<CsvDownload> {
        let res = self.post_download(ExportFormat::Csv, data).await?;

        let content_disposition = res
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = res
            .bytes()
            .await
            .context("Failed to read CSV download body")?
            .to_vec();

        Ok(CsvDownload { content_disposition, bytes })
    }

    async fn download_json(&self, data: &Value) -> Result<JsonEnvelope> {
        let res = self.post_download(ExportFormat::Json, data).await?;

        let body = res.text().await.context("Failed to read JSON download body")?;

        serde_json::from_str(&body).context("Failed to parse JSON download envelope")
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(HEALTH_PATH)?;

        let res = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send health check request")?;

        let body = success_body(res, "health check").await?;

        serde_json::from_str(&body).context("Failed to parse health check JSON")
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // A trailing slash keeps any path prefix when endpoints are joined.
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };

    let url = Url::parse(&normalized)
        .with_context(|| format!("Invalid backend base URL '{base_url}'"))?;

    if url.cannot_be_a_base() {
        return Err(anyhow!("Invalid backend base URL '{base_url}': not a hierarchical URL"));
    }

    Ok(url)
}

fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

async fn success_body(res: Response, what: &str) -> Result<String> {
    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read {what} response body"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "{} request failed with status {}: {}",
            what,
            status,
            truncate_body(&body),
        ));
    }

    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures,
        model::{Activity, Crop},
    };
    use serde_json::json;
    use std::{
        io::{Read, Write},
        net::{TcpListener, TcpStream},
        thread::{self, JoinHandle},
    };

    /// Serves `response` to a single connection and hands back the raw request.
    fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (base, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some((head, body)) = text.split_once("\r\n\r\n") {
                let length = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if body.len() >= length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!("HTTP/1.1 {status}\r\n");
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ));
        out
    }

    fn request_body(request: &str) -> Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn endpoints_join_onto_base() {
        let backend = HttpBackend::new("http://localhost:5000", None).expect("valid");
        assert_eq!(
            backend.endpoint(FORECAST_PATH).unwrap().as_str(),
            "http://localhost:5000/api/forecast"
        );
    }

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let backend = HttpBackend::new("https://example.org/weatherwise", None).expect("valid");
        assert_eq!(
            backend.endpoint(HISTORICAL_PATH).unwrap().as_str(),
            "https://example.org/weatherwise/api/historical-analysis"
        );
    }

    #[test]
    fn rejects_non_hierarchical_base() {
        let err = HttpBackend::new("mailto:someone@example.org", None).unwrap_err();
        assert!(err.to_string().contains("Invalid backend base URL"));
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(250);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "☔".repeat(201);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
    }

    #[tokio::test]
    async fn historical_analysis_sends_query_parameters() {
        let body = fixtures::historical_json().to_string();
        let (base, server) = serve_once(response(
            "200 OK",
            &[("Content-Type", "application/json")],
            &body,
        ));
        let backend = HttpBackend::new(&base, None).unwrap();

        let query = HistoricalQuery {
            lat: "18.5".into(),
            lon: "73.8".into(),
            date: "2027-03-15".parse().unwrap(),
            activity: Activity::Harvest,
            crop: Crop::Wheat,
        };
        let fetched = backend.historical_analysis(&query).await.unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with(
            "GET /api/historical-analysis?lat=18.5&lon=73.8&date=2027-03-15&activity=harvest&crop=wheat HTTP/1.1\r\n"
        ));
        assert_eq!(fetched.data.location.name, "Pune, Maharashtra, India");
        assert_eq!(fetched.raw, fixtures::historical_json());
    }

    #[tokio::test]
    async fn error_status_is_a_fetch_failure() {
        let (base, server) = serve_once(response("500 Internal Server Error", &[], "boom"));
        let backend = HttpBackend::new(&base, None).unwrap();

        let query = ForecastQuery {
            lat: "28.6".into(),
            lon: "77.2".into(),
            activity: Activity::Event,
            crop: Crop::Wheat,
        };
        let err = backend.forecast(&query).await.unwrap_err();

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/forecast?lat=28.6&lon=77.2&activity=event&crop=wheat "));
        assert_eq!(
            err.to_string(),
            "forecast request failed with status 500 Internal Server Error: boom"
        );
    }

    #[tokio::test]
    async fn csv_download_posts_data_and_reads_filename() {
        let (base, server) = serve_once(response(
            "200 OK",
            &[
                ("Content-Type", "text/csv"),
                ("Content-Disposition", "attachment; filename=weatherwise_analysis_Pune.csv"),
            ],
            "year,rained\n2023,true\n",
        ));
        let backend = HttpBackend::new(&base, None).unwrap();

        let csv = backend.download_csv(&json!({"x": 1})).await.unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/download HTTP/1.1\r\n"));
        assert_eq!(request_body(&request), json!({"format": "csv", "data": {"x": 1}}));
        assert_eq!(csv.filename(), "weatherwise_analysis_Pune.csv");
        assert_eq!(csv.bytes, b"year,rained\n2023,true\n");
    }

    #[tokio::test]
    async fn json_download_decodes_envelope() {
        let envelope = json!({"success": true, "filename": "r.json", "content": {"a": 1}});
        let (base, server) = serve_once(response(
            "200 OK",
            &[("Content-Type", "application/json")],
            &envelope.to_string(),
        ));
        let backend = HttpBackend::new(&base, None).unwrap();

        let decoded = backend.download_json(&json!({"x": 1})).await.unwrap();

        let request = server.join().unwrap();
        assert_eq!(request_body(&request), json!({"format": "json", "data": {"x": 1}}));
        assert!(decoded.success);
        assert_eq!(decoded.filename.as_deref(), Some("r.json"));
        assert_eq!(decoded.content, json!({"a": 1}));
    }

    #[tokio::test]
    async fn download_error_status_carries_body() {
        let (base, server) = serve_once(response("400 Bad Request", &[], "No data provided"));
        let backend = HttpBackend::new(&base, None).unwrap();

        let err = backend.download_csv(&json!({})).await.unwrap_err();

        server.join().unwrap();
        assert_eq!(
            err.to_string(),
            "csv download failed with status 400 Bad Request: No data provided"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        // A port that was just released has nothing listening on it.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let backend = HttpBackend::new(
            &format!("http://127.0.0.1:{port}"),
            Some(Duration::from_secs(2)),
        )
        .expect("valid");

        let err = backend.health().await.unwrap_err();
        assert!(err.to_string().contains("Failed to send health check request"));
    }
}
