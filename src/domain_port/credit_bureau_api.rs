use crate::application_port::*;
use crate::domain_model::*;

/// The three calls offered by the remote credit bureau.
#[async_trait::async_trait]
pub trait CreditBureauApi: Send + Sync {
    async fn login(&self) -> Result<DataTicket, CreditBureauError>;

    /// Candidates in the bureau's ranking order; may be empty.
    async fn match_consumer(
        &self,
        ticket: &DataTicket,
        identifier: &str,
    ) -> Result<Vec<ConsumerMatch>, CreditBureauError>;

    async fn fetch_report(&self, request: &ReportRequest)
    -> Result<CreditReport, CreditBureauError>;
}
