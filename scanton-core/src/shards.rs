use crate::api::backfill::{ShardProgress, ShardStatus};

/// Roll-up of every shard for the progress panel header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardSummary {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub overall_percent: f64,
    pub longest_eta: Option<String>,
}

impl ShardSummary {
    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

pub fn summarize(shards: &[ShardProgress]) -> ShardSummary {
    let mut summary = ShardSummary {
        total: shards.len(),
        ..Default::default()
    };
    if shards.is_empty() {
        return summary;
    }

    for shard in shards {
        match shard.status {
            ShardStatus::Pending => summary.pending += 1,
            ShardStatus::Running => summary.running += 1,
            ShardStatus::Completed => summary.completed += 1,
            ShardStatus::Failed => summary.failed += 1,
            ShardStatus::Unknown => {}
        }
    }

    summary.overall_percent = overall_percent(shards);
    summary.longest_eta = shards
        .iter()
        .filter(|s| s.status != ShardStatus::Completed)
        .filter_map(|s| {
            let eta = s.eta.as_deref()?;
            Some((parse_eta_seconds(eta)?, eta))
        })
        .max_by_key(|(secs, _)| *secs)
        .map(|(_, eta)| eta.to_string());
    summary
}

/// Event-weighted when every shard knows its total, otherwise the mean of
/// the per-shard percentages. Completed shards count as 100.
fn overall_percent(shards: &[ShardProgress]) -> f64 {
    let totals: Option<Vec<u64>> = shards
        .iter()
        .map(|s| s.total_events.filter(|t| *t > 0))
        .collect();

    let percent = match totals {
        Some(totals) => {
            let total: u64 = totals.iter().sum();
            let processed: u64 = shards
                .iter()
                .zip(&totals)
                .map(|(s, t)| {
                    if s.status == ShardStatus::Completed {
                        *t
                    } else {
                        s.processed_events.min(*t)
                    }
                })
                .sum();
            processed as f64 / total as f64 * 100.0
        }
        None => {
            let sum: f64 = shards
                .iter()
                .map(|s| {
                    if s.status == ShardStatus::Completed {
                        100.0
                    } else {
                        s.progress_percent.clamp(0.0, 100.0)
                    }
                })
                .sum();
            sum / shards.len() as f64
        }
    };
    percent.clamp(0.0, 100.0)
}

/// Parse ETA strings like "2h 15m", "45m", "1d 3h" or "30s".
/// Returns None for anything unrecognised.
pub fn parse_eta_seconds(eta: &str) -> Option<u64> {
    let mut total = 0u64;
    let mut seen = false;
    for token in eta.split_whitespace() {
        let split = token.find(|c: char| !c.is_ascii_digit())?;
        let (digits, unit) = token.split_at(split);
        let value: u64 = digits.parse().ok()?;
        let factor = match unit {
            "d" => 86_400,
            "h" => 3_600,
            "m" => 60,
            "s" => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(factor)?)?;
        seen = true;
    }
    seen.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard(index: u32, status: ShardStatus, percent: f64, processed: u64, total: Option<u64>, eta: Option<&str>) -> ShardProgress {
        ShardProgress {
            shard_index: index,
            status,
            progress_percent: percent,
            processed_events: processed,
            total_events: total,
            eta: eta.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_weighted_when_totals_known() {
        let shards = vec![
            shard(0, ShardStatus::Completed, 100.0, 900, Some(900), None),
            shard(1, ShardStatus::Running, 10.0, 10, Some(100), Some("5m")),
        ];
        let summary = summarize(&shards);
        assert!((summary.overall_percent - 91.0).abs() < 1e-9);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.running, 1);
        assert!(!summary.is_finished());
    }

    #[test]
    fn test_mean_when_a_total_is_missing() {
        let shards = vec![
            shard(0, ShardStatus::Running, 40.0, 400, Some(1000), None),
            shard(1, ShardStatus::Running, 20.0, 0, None, None),
            shard(2, ShardStatus::Failed, 0.0, 0, None, None),
        ];
        let summary = summarize(&shards);
        assert!((summary.overall_percent - 20.0).abs() < 1e-9);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_longest_eta_ignores_completed_and_garbage() {
        let shards = vec![
            shard(0, ShardStatus::Running, 50.0, 0, None, Some("45m")),
            shard(1, ShardStatus::Running, 10.0, 0, None, Some("2h 15m")),
            shard(2, ShardStatus::Completed, 100.0, 0, None, Some("9d")),
            shard(3, ShardStatus::Pending, 0.0, 0, None, Some("calculating...")),
        ];
        assert_eq!(summarize(&shards).longest_eta.as_deref(), Some("2h 15m"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.overall_percent, 0.0);
        assert!(!summary.is_finished());
    }

    #[test]
    fn test_parse_eta() {
        assert_eq!(parse_eta_seconds("1d 3h"), Some(97_200));
        assert_eq!(parse_eta_seconds("30s"), Some(30));
        assert_eq!(parse_eta_seconds(""), None);
        assert_eq!(parse_eta_seconds("soon"), None);
        assert_eq!(parse_eta_seconds("12"), None);
        assert_eq!(parse_eta_seconds("999999999999999d"), None);
        assert_eq!(parse_eta_seconds("18446744073709551615s 1s"), None);
    }
}
