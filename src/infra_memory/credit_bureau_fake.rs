use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use serde_json::json;
use std::sync::Mutex;

/// Canned in-process bureau. The default script answers every call with a
/// single match and a small report; tests swap parts of the script to
/// simulate bureau misbehaviour.
pub struct FakeCreditBureauApi {
    ticket: Option<String>,
    matches: Vec<ConsumerMatch>,
    report: serde_json::Value,
    calls: Mutex<Vec<ChainStage>>,
}

impl FakeCreditBureauApi {
    pub fn new() -> Self {
        Self {
            ticket: Some("fake-data-ticket".to_string()),
            matches: vec![ConsumerMatch {
                matching_engine_id: "1000001".to_string(),
                enquiry_id: "2000001".to_string(),
                consumer_id: "3000001".to_string(),
            }],
            report: json!([
                { "SubjectList": [{ "ConsumerID": "3000001", "Reference": "fake" }] },
                { "CreditAccountSummary": [{ "TotalOutstandingdebt": "0.00" }] }
            ]),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_ticket(mut self, ticket: Option<&str>) -> Self {
        self.ticket = ticket.map(str::to_string);
        self
    }

    pub fn with_matches(mut self, matches: Vec<ConsumerMatch>) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_report(mut self, report: serde_json::Value) -> Self {
        self.report = report;
        self
    }

    /// Stages called so far, in order.
    pub fn calls(&self) -> Vec<ChainStage> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, stage: ChainStage) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(stage);
        }
    }
}

impl Default for FakeCreditBureauApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CreditBureauApi for FakeCreditBureauApi {
    async fn login(&self) -> Result<DataTicket, CreditBureauError> {
        self.record(ChainStage::Login);
        Ok(DataTicket::parse(self.ticket.clone())?)
    }

    async fn match_consumer(
        &self,
        ticket: &DataTicket,
        _identifier: &str,
    ) -> Result<Vec<ConsumerMatch>, CreditBureauError> {
        self.record(ChainStage::ConsumerMatch);
        if self.ticket.as_deref() != Some(ticket.as_str()) {
            return Err(CreditBureauError::Status {
                stage: ChainStage::ConsumerMatch,
                status: 401,
                body: "unknown data ticket".to_string(),
            });
        }
        Ok(self.matches.clone())
    }

    async fn fetch_report(
        &self,
        request: &ReportRequest,
    ) -> Result<CreditReport, CreditBureauError> {
        self.record(ChainStage::Report);
        if !self
            .matches
            .iter()
            .any(|m| m.consumer_id == request.consumer_id)
        {
            return Err(CreditBureauError::Status {
                stage: ChainStage::Report,
                status: 404,
                body: format!("unknown consumer {}", request.consumer_id),
            });
        }
        Ok(CreditReport(self.report.clone()))
    }
}
