//! Value types and the report-fetch state machine for the credit bureau chain.
//!
//! A chain runs `NotAuthenticated → Authenticated → Matched → ReportFetched`.
//! Each state owns exactly the data the next call needs, so a step can never
//! be attempted with a missing ticket or consumer reference.

use serde::Serialize;
use std::fmt;

/// Which call of the chain an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStage {
    Login,
    ConsumerMatch,
    Report,
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainStage::Login => "login",
            ChainStage::ConsumerMatch => "consumer match",
            ChainStage::Report => "report",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("bureau login returned no data ticket")]
    MissingDataTicket,
    #[error("bureau found no consumer matching the identifier")]
    NoConsumerMatch,
}

/// Session credential issued by the bureau login endpoint. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct DataTicket(String);

impl DataTicket {
    pub fn parse(raw: Option<String>) -> Result<Self, ChainError> {
        match raw {
            Some(ticket) if !ticket.trim().is_empty() => Ok(DataTicket(ticket)),
            _ => Err(ChainError::MissingDataTicket),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DataTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataTicket(***)")
    }
}

/// One candidate returned by the consumer-match step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerMatch {
    pub matching_engine_id: String,
    pub enquiry_id: String,
    pub consumer_id: String,
}

/// Everything the report endpoint needs, assembled from a matched session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub data_ticket: DataTicket,
    pub consumer_id: String,
    pub enquiry_id: String,
    pub matching_engine_id: String,
}

/// Raw full-credit-report payload. Always a JSON object or array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CreditReport(pub serde_json::Value);

pub struct BureauSession;

impl BureauSession {
    pub fn authenticate(ticket: DataTicket) -> Authenticated {
        Authenticated { ticket }
    }
}

#[derive(Debug)]
pub struct Authenticated {
    ticket: DataTicket,
}

impl Authenticated {
    pub fn ticket(&self) -> &DataTicket {
        &self.ticket
    }

    /// The bureau ranks candidates; the first one is taken.
    pub fn select_match(self, candidates: Vec<ConsumerMatch>) -> Result<Matched, ChainError> {
        let consumer = candidates
            .into_iter()
            .next()
            .ok_or(ChainError::NoConsumerMatch)?;
        Ok(Matched {
            ticket: self.ticket,
            consumer,
        })
    }
}

#[derive(Debug)]
pub struct Matched {
    ticket: DataTicket,
    consumer: ConsumerMatch,
}

impl Matched {
    pub fn consumer(&self) -> &ConsumerMatch {
        &self.consumer
    }

    pub fn report_request(&self) -> ReportRequest {
        ReportRequest {
            data_ticket: self.ticket.clone(),
            consumer_id: self.consumer.consumer_id.clone(),
            enquiry_id: self.consumer.enquiry_id.clone(),
            matching_engine_id: self.consumer.matching_engine_id.clone(),
        }
    }

    pub fn complete(self, report: CreditReport) -> ReportFetched {
        ReportFetched {
            consumer: self.consumer,
            report,
        }
    }
}

#[derive(Debug)]
pub struct ReportFetched {
    pub consumer: ConsumerMatch,
    pub report: CreditReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(n: u32) -> ConsumerMatch {
        ConsumerMatch {
            matching_engine_id: format!("engine-{n}"),
            enquiry_id: format!("enquiry-{n}"),
            consumer_id: format!("consumer-{n}"),
        }
    }

    #[test]
    fn rejects_missing_or_blank_ticket() {
        assert_eq!(DataTicket::parse(None), Err(ChainError::MissingDataTicket));
        assert_eq!(
            DataTicket::parse(Some("  ".to_string())),
            Err(ChainError::MissingDataTicket)
        );
    }

    #[test]
    fn ticket_is_redacted_in_debug_output() {
        let ticket = DataTicket::parse(Some("secret-ticket".to_string())).unwrap();
        assert!(!format!("{ticket:?}").contains("secret-ticket"));
    }

    #[test]
    fn empty_match_list_fails_explicitly() {
        let ticket = DataTicket::parse(Some("t".to_string())).unwrap();
        let err = BureauSession::authenticate(ticket)
            .select_match(Vec::new())
            .unwrap_err();
        assert_eq!(err, ChainError::NoConsumerMatch);
    }

    #[test]
    fn first_candidate_feeds_the_report_request() {
        let ticket = DataTicket::parse(Some("ticket-1".to_string())).unwrap();
        let matched = BureauSession::authenticate(ticket)
            .select_match(vec![candidate(1), candidate(2)])
            .unwrap();

        let request = matched.report_request();
        assert_eq!(request.data_ticket.as_str(), "ticket-1");
        assert_eq!(request.consumer_id, "consumer-1");
        assert_eq!(request.enquiry_id, "enquiry-1");
        assert_eq!(request.matching_engine_id, "engine-1");

        let fetched = matched.complete(CreditReport(serde_json::json!([{"section": "summary"}])));
        assert_eq!(fetched.consumer, candidate(1));
    }
}
