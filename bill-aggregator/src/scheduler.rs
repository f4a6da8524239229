use crate::config::Config;
use crate::digest::run_digest_job;
use crate::interaction_manager::InteractionManager;
use crate::keyword_manager::KeywordManager;
use crate::traits::{BillSearch, DigestMailer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Runs the digest job once per configured interval (daily by default).
/// The first run fires immediately on startup; each run is serialized,
/// matching the job's single-threaded batch semantics.
pub struct DigestScheduler {
    period: Duration,
}

impl DigestScheduler {
    pub fn new(interval_hours: u64) -> Self {
        Self {
            period: Duration::from_secs(interval_hours * 3600),
        }
    }

    pub async fn run(
        &self,
        search: Arc<dyn BillSearch>,
        keywords: Arc<KeywordManager>,
        interactions: Arc<InteractionManager>,
        mailer: Arc<dyn DigestMailer>,
        config: Config,
    ) {
        let mut ticker = interval(self.period);
        info!(
            "Digest scheduler running every {} hours",
            self.period.as_secs() / 3600
        );

        loop {
            ticker.tick().await;

            match run_digest_job(
                search.as_ref(),
                &keywords,
                &interactions,
                mailer.clone(),
                &config,
            )
            .await
            {
                Ok(sent) => info!("Digest run complete, {} emails sent", sent),
                Err(e) => error!("Digest run failed: {}", e),
            }
        }
    }
}
