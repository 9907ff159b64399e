use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::Result;

use super::quest::QuestService;
use super::workspaces::Workspaces;

/// Background manager that tops up quests for users who are running low.
#[derive(Clone)]
pub struct QuestRefreshManager {
    workspaces: Workspaces,
    quests: QuestService,
    min_active_quests: usize,
    interval_secs: u64,
}

impl QuestRefreshManager {
    pub fn new(
        workspaces: Workspaces,
        quests: QuestService,
        min_active_quests: usize,
        interval_secs: u64,
    ) -> Self {
        Self {
            workspaces,
            quests,
            min_active_quests,
            interval_secs,
        }
    }

    /// Refresh immediately, then once per interval until `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        loop {
            if let Err(e) = self.run_once().await {
                error!("Quest refresh error: {}", e);
            }
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Quest refresh manager shutting down...");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(self.interval_secs)) => {}
            }
        }
    }

    /// Run a single pass over every active user.
    ///
    /// Users with `min_active_quests` or fewer active quests get a fresh
    /// batch. Failures for one user are logged and skipped. Returns the
    /// number of users that received new quests.
    pub async fn run_once(&self) -> Result<u64> {
        info!("Starting quest refresh process");

        let users = self.workspaces.admin().list_active_users().await?;
        if users.is_empty() {
            info!("No active users found for quest refresh");
            return Ok(0);
        }

        debug!("Found {} active users to check for quest refresh", users.len());

        let mut refreshed_count = 0u64;
        let mut error_count = 0u64;

        for name in &users {
            match self.refresh_user(name).await {
                Ok(true) => {
                    refreshed_count += 1;
                    info!(user = name.as_str(), "Quests generated");
                }
                Ok(false) => {
                    debug!(user = name.as_str(), "Enough active quests, skipping");
                }
                Err(e) => {
                    error_count += 1;
                    error!(
                        user = name.as_str(),
                        error = %e,
                        "Failed to refresh quests, continuing with next user"
                    );
                }
            }
        }

        info!(
            "Quest refresh complete: {} refreshed, {} errors out of {} users",
            refreshed_count,
            error_count,
            users.len()
        );

        Ok(refreshed_count)
    }

    /// Returns `Ok(true)` if a new batch was generated.
    async fn refresh_user(&self, name: &str) -> Result<bool> {
        let workspace = self.workspaces.open(name).await?;
        let active = QuestService::active_in(&workspace).await?;
        if active.len() > self.min_active_quests {
            return Ok(false);
        }

        debug!(
            user = name,
            active = active.len(),
            "Active quests at or below threshold"
        );
        self.quests.generate_in(&workspace).await?;
        Ok(true)
    }
}
