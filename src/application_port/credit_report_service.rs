use crate::domain_model::{ChainError, ChainStage, ConsumerMatch, CreditReport};

#[derive(Debug, thiserror::Error)]
pub enum CreditBureauError {
    #[error("consumer identifier is required")]
    MissingIdentifier,
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("bureau {stage} call timed out: {message}")]
    Timeout { stage: ChainStage, message: String },
    #[error("bureau {stage} call failed: {message}")]
    Transport { stage: ChainStage, message: String },
    #[error("bureau {stage} call returned status {status}: {body}")]
    Status {
        stage: ChainStage,
        status: u16,
        body: String,
    },
    #[error("bureau {stage} response is malformed: {message}")]
    MalformedResponse { stage: ChainStage, message: String },
    #[error("invalid bureau configuration: {0}")]
    Configuration(String),
}

impl CreditBureauError {
    pub fn malformed(stage: ChainStage, message: impl Into<String>) -> Self {
        CreditBureauError::MalformedResponse {
            stage,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreditReportResult {
    pub consumer: ConsumerMatch,
    pub report: CreditReport,
}

#[async_trait::async_trait]
pub trait CreditReportService: Send + Sync {
    /// Runs login, consumer match and report fetch for `identifier`.
    async fn fetch_credit_report(
        &self,
        identifier: &str,
    ) -> Result<CreditReportResult, CreditBureauError>;
}
