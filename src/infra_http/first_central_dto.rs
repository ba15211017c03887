//! Wire shapes of the First Central REST API.
//!
//! Requests borrow from the caller; responses decode into these DTOs first
//! and are then checked and mapped into domain values in one pass.

use crate::application_port::CreditBureauError;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponseDto {
    #[serde(rename = "DataTicket", default)]
    pub(super) data_ticket: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ConsumerMatchRequestDto<'a> {
    #[serde(rename = "DataTicket")]
    pub(super) data_ticket: &'a str,
    #[serde(rename = "EnquiryReason")]
    pub(super) enquiry_reason: &'a str,
    #[serde(rename = "ConsumerName")]
    pub(super) consumer_name: &'a str,
    #[serde(rename = "DateOfBirth")]
    pub(super) date_of_birth: &'a str,
    #[serde(rename = "Identification")]
    pub(super) identification: &'a str,
    #[serde(rename = "AccountNumber")]
    pub(super) account_number: &'a str,
    #[serde(rename = "ProductID")]
    pub(super) product_id: &'a str,
}

/// Bureau ids arrive as JSON strings or numbers depending on the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum IdValueDto {
    Text(String),
    Number(serde_json::Number),
}

impl IdValueDto {
    fn into_non_empty(self) -> Option<String> {
        let value = match self {
            IdValueDto::Text(s) => s.trim().to_string(),
            IdValueDto::Number(n) => n.to_string(),
        };
        if value.is_empty() { None } else { Some(value) }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ConsumerMatchDto {
    #[serde(rename = "MatchingEngineID", default)]
    pub(super) matching_engine_id: Option<IdValueDto>,
    #[serde(rename = "EnquiryID", default)]
    pub(super) enquiry_id: Option<IdValueDto>,
    #[serde(rename = "ConsumerID", default)]
    pub(super) consumer_id: Option<IdValueDto>,
}

impl ConsumerMatchDto {
    fn into_domain(self, index: usize) -> Result<ConsumerMatch, CreditBureauError> {
        let field = |value: Option<IdValueDto>, name: &str| {
            value.and_then(IdValueDto::into_non_empty).ok_or_else(|| {
                CreditBureauError::malformed(
                    ChainStage::ConsumerMatch,
                    format!("candidate {index} has no {name}"),
                )
            })
        };
        Ok(ConsumerMatch {
            matching_engine_id: field(self.matching_engine_id, "MatchingEngineID")?,
            enquiry_id: field(self.enquiry_id, "EnquiryID")?,
            consumer_id: field(self.consumer_id, "ConsumerID")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ReportRequestDto<'a> {
    #[serde(rename = "DataTicket")]
    pub(super) data_ticket: &'a str,
    #[serde(rename = "consumerID")]
    pub(super) consumer_id: &'a str,
    #[serde(rename = "EnquiryID")]
    pub(super) enquiry_id: &'a str,
    #[serde(rename = "consumerMergeList")]
    pub(super) consumer_merge_list: &'a str,
    #[serde(rename = "SubscriberEnquiryEngineID")]
    pub(super) subscriber_enquiry_engine_id: &'a str,
}

impl<'a> From<&'a ReportRequest> for ReportRequestDto<'a> {
    fn from(request: &'a ReportRequest) -> Self {
        ReportRequestDto {
            data_ticket: request.data_ticket.as_str(),
            consumer_id: &request.consumer_id,
            enquiry_id: &request.enquiry_id,
            consumer_merge_list: "",
            subscriber_enquiry_engine_id: &request.matching_engine_id,
        }
    }
}

/// The bureau usually answers with an array but some gateways unwrap
/// single-element results.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    stage: ChainStage,
    body: &[u8],
) -> Result<T, CreditBureauError> {
    serde_json::from_slice(body)
        .map_err(|e| CreditBureauError::malformed(stage, format!("invalid JSON payload: {e}")))
}

pub(super) fn parse_login(body: &[u8]) -> Result<DataTicket, CreditBureauError> {
    let tickets: OneOrMany<LoginResponseDto> = decode(ChainStage::Login, body)?;
    let raw = tickets
        .into_vec()
        .into_iter()
        .next()
        .and_then(|dto| dto.data_ticket);
    Ok(DataTicket::parse(raw)?)
}

pub(super) fn parse_matches(body: &[u8]) -> Result<Vec<ConsumerMatch>, CreditBureauError> {
    let candidates: OneOrMany<ConsumerMatchDto> = decode(ChainStage::ConsumerMatch, body)?;
    candidates
        .into_vec()
        .into_iter()
        .enumerate()
        .map(|(index, dto)| dto.into_domain(index))
        .collect()
}

pub(super) fn parse_report(body: &[u8]) -> Result<CreditReport, CreditBureauError> {
    let payload: serde_json::Value = decode(ChainStage::Report, body)?;
    if !(payload.is_object() || payload.is_array()) {
        return Err(CreditBureauError::malformed(
            ChainStage::Report,
            "report must be a JSON object or array",
        ));
    }
    Ok(CreditReport(payload))
}
