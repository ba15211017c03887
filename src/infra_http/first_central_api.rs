//! Reqwest-backed First Central credit bureau adapter.
//!
//! Owns transport details only: endpoint resolution, request timeout, HTTP
//! status mapping and JSON decoding. Chain ordering lives in the credit
//! report service.

use super::first_central_dto::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_LOGIN_PATH: &str = "login";
pub const DEFAULT_MATCH_PATH: &str = "ConnectConsumerMatch";
pub const DEFAULT_REPORT_PATH: &str = "GetConsumerFullCreditReport";

#[derive(Debug, Clone)]
pub struct FirstCentralConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub login_path: String,
    pub match_path: String,
    pub report_path: String,
    pub enquiry_reason: String,
    pub product_id: String,
}

struct Endpoints {
    login: Url,
    consumer_match: Url,
    report: Url,
}

pub struct FirstCentralHttpApi {
    client: Client,
    endpoints: Endpoints,
    username: String,
    password: String,
    enquiry_reason: String,
    product_id: String,
}

impl FirstCentralHttpApi {
    pub fn new(config: FirstCentralConfig) -> Result<Self, CreditBureauError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CreditBureauError::Configuration(e.to_string()))?;
        let endpoints = Endpoints {
            login: endpoint(&config.base_url, &config.login_path)?,
            consumer_match: endpoint(&config.base_url, &config.match_path)?,
            report: endpoint(&config.base_url, &config.report_path)?,
        };
        Ok(Self {
            client,
            endpoints,
            username: config.username,
            password: config.password,
            enquiry_reason: config.enquiry_reason,
            product_id: config.product_id,
        })
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        stage: ChainStage,
        url: &Url,
        body: &B,
    ) -> Result<Vec<u8>, CreditBureauError> {
        debug!(%stage, %url, "calling credit bureau");
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| map_transport_error(stage, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(stage, e))?;
        if !status.is_success() {
            return Err(map_status_error(stage, status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl CreditBureauApi for FirstCentralHttpApi {
    async fn login(&self) -> Result<DataTicket, CreditBureauError> {
        let request = LoginRequestDto {
            username: &self.username,
            password: &self.password,
        };
        let body = self
            .post_json(ChainStage::Login, &self.endpoints.login, &request)
            .await?;
        parse_login(&body)
    }

    async fn match_consumer(
        &self,
        ticket: &DataTicket,
        identifier: &str,
    ) -> Result<Vec<ConsumerMatch>, CreditBureauError> {
        let request = ConsumerMatchRequestDto {
            data_ticket: ticket.as_str(),
            enquiry_reason: &self.enquiry_reason,
            consumer_name: "",
            date_of_birth: "",
            identification: identifier,
            account_number: "",
            product_id: &self.product_id,
        };
        let body = self
            .post_json(
                ChainStage::ConsumerMatch,
                &self.endpoints.consumer_match,
                &request,
            )
            .await?;
        parse_matches(&body)
    }

    async fn fetch_report(
        &self,
        request: &ReportRequest,
    ) -> Result<CreditReport, CreditBureauError> {
        let dto = ReportRequestDto::from(request);
        let body = self
            .post_json(ChainStage::Report, &self.endpoints.report, &dto)
            .await?;
        parse_report(&body)
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url, CreditBureauError> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| {
        CreditBureauError::Configuration(format!("invalid bureau endpoint {joined:?}: {e}"))
    })
}

fn map_transport_error(stage: ChainStage, error: reqwest::Error) -> CreditBureauError {
    if error.is_timeout() {
        CreditBureauError::Timeout {
            stage,
            message: error.to_string(),
        }
    } else {
        CreditBureauError::Transport {
            stage,
            message: error.to_string(),
        }
    }
}

fn map_status_error(stage: ChainStage, status: StatusCode, body: &[u8]) -> CreditBureauError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CreditBureauError::Timeout {
            stage,
            message: format!("status {}", status.as_u16()),
        },
        _ => CreditBureauError::Status {
            stage,
            status: status.as_u16(),
            body: body_preview(body),
        },
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use warp::Filter;

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Serves a scripted bureau on an ephemeral port and records every body.
    fn spawn_bureau(report_status: u16, matches: Value) -> (SocketAddr, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));

        let record = {
            let seen = seen.clone();
            move |name: &'static str| {
                let seen = seen.clone();
                warp::any().and(warp::body::json()).map(move |body: Value| {
                    seen.lock().unwrap().push((name.to_string(), body.clone()));
                    body
                })
            }
        };

        let login = warp::post()
            .and(warp::path("login"))
            .and(record("login"))
            .map(|_body: Value| warp::reply::json(&json!([{ "DataTicket": "ticket-xyz" }])));
        let consumer_match = warp::post()
            .and(warp::path("ConnectConsumerMatch"))
            .and(record("match"))
            .map(move |_body: Value| warp::reply::json(&matches));
        let report = warp::post()
            .and(warp::path("GetConsumerFullCreditReport"))
            .and(record("report"))
            .map(move |body: Value| {
                let status = warp::http::StatusCode::from_u16(report_status).unwrap();
                warp::reply::with_status(warp::reply::json(&json!([{ "Echo": body }])), status)
            });

        let (addr, server) =
            warp::serve(login.or(consumer_match).or(report)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        (addr, seen)
    }

    fn api(addr: SocketAddr) -> FirstCentralHttpApi {
        FirstCentralHttpApi::new(FirstCentralConfig {
            base_url: format!("http://{addr}/"),
            username: "svc-user".to_string(),
            password: "svc-pass".to_string(),
            timeout: Duration::from_secs(5),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            match_path: DEFAULT_MATCH_PATH.to_string(),
            report_path: DEFAULT_REPORT_PATH.to_string(),
            enquiry_reason: "Loan application".to_string(),
            product_id: "45".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn runs_the_three_calls_with_bureau_wire_format() {
        let (addr, seen) = spawn_bureau(
            200,
            json!([{ "MatchingEngineID": 77, "EnquiryID": "88", "ConsumerID": "99" }]),
        );
        let api = api(addr);

        let ticket = api.login().await.unwrap();
        assert_eq!(ticket.as_str(), "ticket-xyz");

        let matches = api.match_consumer(&ticket, "22471069115").await.unwrap();
        let matched = BureauSession::authenticate(ticket)
            .select_match(matches)
            .unwrap();
        let report = api.fetch_report(&matched.report_request()).await.unwrap();

        assert_eq!(
            report.0,
            json!([{ "Echo": {
                "DataTicket": "ticket-xyz",
                "consumerID": "99",
                "EnquiryID": "88",
                "consumerMergeList": "",
                "SubscriberEnquiryEngineID": "77"
            }}])
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "login");
        assert_eq!(seen[0].1, json!({ "username": "svc-user", "password": "svc-pass" }));
        assert_eq!(seen[1].0, "match");
        assert_eq!(seen[1].1["DataTicket"], "ticket-xyz");
        assert_eq!(seen[1].1["Identification"], "22471069115");
        assert_eq!(seen[1].1["ProductID"], "45");
    }

    #[tokio::test]
    async fn non_success_status_with_json_body_is_a_failure() {
        let (addr, _seen) = spawn_bureau(
            500,
            json!([{ "MatchingEngineID": 1, "EnquiryID": 2, "ConsumerID": 3 }]),
        );
        let api = api(addr);
        let ticket = api.login().await.unwrap();
        let matched = BureauSession::authenticate(ticket.clone())
            .select_match(api.match_consumer(&ticket, "1").await.unwrap())
            .unwrap();

        let err = api.fetch_report(&matched.report_request()).await.unwrap_err();
        assert!(
            matches!(
                err,
                CreditBureauError::Status {
                    stage: ChainStage::Report,
                    status: 500,
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn unreachable_bureau_is_a_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(addr).login().await.unwrap_err();
        assert!(matches!(
            err,
            CreditBureauError::Transport {
                stage: ChainStage::Login,
                ..
            }
        ));
    }

    #[test]
    fn maps_gateway_timeouts_to_timeout() {
        let err = map_status_error(ChainStage::ConsumerMatch, StatusCode::GATEWAY_TIMEOUT, b"");
        assert!(matches!(err, CreditBureauError::Timeout { .. }));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = endpoint("not a url", "login").unwrap_err();
        assert!(matches!(err, CreditBureauError::Configuration(_)));
    }

    #[test]
    fn truncates_long_bodies_in_previews() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.len(), 163);
        assert!(preview.ends_with("..."));
    }
}
