use contracts::shared::logger::{LogBucket, LogEntry, LogStatistics, LogsOverview};

use super::classify::ClassificationRules;
use super::store::LogStore;

/// Reduce a newest-first window of log rows to one statistics document.
///
/// Counts cover the whole window; `recent_successes` / `recent_failures` are
/// the first `sample_cap` rows of their bucket, in window order.
pub fn compute_statistics(
    newest_first: &[LogEntry],
    rules: &ClassificationRules,
    sample_cap: usize,
) -> LogStatistics {
    let mut stats = LogStatistics {
        total_logs: newest_first.len() as u64,
        ..Default::default()
    };

    for entry in newest_first {
        let c = rules.classify(entry);
        match c.bucket {
            LogBucket::Success => {
                stats.success_count += 1;
                if stats.recent_successes.len() < sample_cap {
                    stats.recent_successes.push(entry.clone());
                }
            }
            LogBucket::Error => {
                stats.error_count += 1;
                if stats.recent_failures.len() < sample_cap {
                    stats.recent_failures.push(entry.clone());
                }
            }
            LogBucket::Warning => stats.warning_count += 1,
            LogBucket::Info => stats.info_count += 1,
        }
        if c.critical {
            stats.critical_errors += 1;
        }
        if c.episode_failure {
            stats.failed_episodes += 1;
        }
        if c.successful_grab {
            stats.successful_grabs += 1;
        }
    }

    stats.token_status = rules.latest_token_status(newest_first);
    stats
}

/// Statistics over the newest `window` rows. A store failure of any kind
/// yields zeroed statistics.
pub async fn get_log_statistics(
    store: &dyn LogStore,
    rules: &ClassificationRules,
    window: u64,
    sample_cap: usize,
) -> LogStatistics {
    match store.query_statistics_window(window).await {
        Ok(rows) => compute_statistics(&rows, rules, sample_cap),
        Err(e) if e.kind.is_unavailability() => {
            tracing::warn!(kind = ?e.kind, "Log store unavailable, returning empty statistics: {}", e.message);
            LogStatistics::default()
        }
        Err(e) => {
            tracing::error!("Failed to compute log statistics: {}", e);
            LogStatistics::default()
        }
    }
}

/// Newest `limit` rows, empty on any store failure.
pub async fn get_recent_logs(store: &dyn LogStore, limit: u64) -> Vec<LogEntry> {
    match store.query_recent_logs(limit).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(kind = ?e.kind, "Failed to fetch recent logs: {}", e.message);
            Vec::new()
        }
    }
}

/// Statistics and recent rows, fetched concurrently. Each half degrades on its own.
pub async fn get_logs_overview(
    store: &dyn LogStore,
    rules: &ClassificationRules,
    window: u64,
    sample_cap: usize,
    recent_limit: u64,
) -> LogsOverview {
    let (statistics, recent_logs) = tokio::join!(
        get_log_statistics(store, rules, window, sample_cap),
        get_recent_logs(store, recent_limit),
    );

    tracing::debug!(
        total_logs = statistics.total_logs,
        recent_logs = recent_logs.len(),
        "Logs overview computed"
    );

    LogsOverview {
        statistics,
        recent_logs,
    }
}
