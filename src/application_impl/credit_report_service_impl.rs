use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one login → match → report chain per call. Nothing is cached
/// between calls, each report starts from a fresh bureau login.
pub struct RealCreditReportService {
    bureau: Arc<dyn CreditBureauApi>,
}

impl RealCreditReportService {
    pub fn new(bureau: Arc<dyn CreditBureauApi>) -> Self {
        Self { bureau }
    }

    async fn run_chain(&self, identifier: &str) -> Result<ReportFetched, CreditBureauError> {
        let ticket = self.bureau.login().await?;
        let session = BureauSession::authenticate(ticket);
        debug!("bureau session authenticated");

        let candidates = self
            .bureau
            .match_consumer(session.ticket(), identifier)
            .await?;
        debug!(candidates = candidates.len(), "bureau consumer match returned");
        let matched = session.select_match(candidates)?;
        debug!(consumer_id = %matched.consumer().consumer_id, "bureau consumer matched");

        let report = self.bureau.fetch_report(&matched.report_request()).await?;
        Ok(matched.complete(report))
    }
}

#[async_trait::async_trait]
impl CreditReportService for RealCreditReportService {
    async fn fetch_credit_report(
        &self,
        identifier: &str,
    ) -> Result<CreditReportResult, CreditBureauError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CreditBureauError::MissingIdentifier);
        }

        match self.run_chain(identifier).await {
            Ok(fetched) => {
                info!(consumer_id = %fetched.consumer.consumer_id, "credit report fetched");
                Ok(CreditReportResult {
                    consumer: fetched.consumer,
                    report: fetched.report,
                })
            }
            Err(e) => {
                warn!("credit report chain failed: {}", e);
                Err(e)
            }
        }
    }
}
