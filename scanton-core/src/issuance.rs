use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// One step of the Canton Coin issuance curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IssuanceStage {
    pub label: &'static str,
    /// Start of the stage, in years since network launch.
    pub starts_at_years: f64,
    /// Annual mint cap in CC.
    pub annual_mint: f64,
    pub sv_share: f64,
    pub validator_share: f64,
    pub app_share: f64,
}

pub static ISSUANCE_CURVE: [IssuanceStage; 5] = [
    IssuanceStage {
        label: "Bootstrap",
        starts_at_years: 0.0,
        annual_mint: 40_000_000_000.0,
        sv_share: 0.80,
        validator_share: 0.05,
        app_share: 0.15,
    },
    IssuanceStage {
        label: "Early growth",
        starts_at_years: 0.5,
        annual_mint: 20_000_000_000.0,
        sv_share: 0.48,
        validator_share: 0.12,
        app_share: 0.40,
    },
    IssuanceStage {
        label: "Growth",
        starts_at_years: 1.5,
        annual_mint: 10_000_000_000.0,
        sv_share: 0.20,
        validator_share: 0.18,
        app_share: 0.62,
    },
    IssuanceStage {
        label: "Maturity",
        starts_at_years: 5.0,
        annual_mint: 5_000_000_000.0,
        sv_share: 0.10,
        validator_share: 0.21,
        app_share: 0.69,
    },
    IssuanceStage {
        label: "Long term",
        starts_at_years: 10.0,
        annual_mint: 2_500_000_000.0,
        sv_share: 0.05,
        validator_share: 0.20,
        app_share: 0.75,
    },
];

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

pub fn network_launch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn years_since_launch(now: DateTime<Utc>) -> f64 {
    let elapsed = (now - network_launch()).num_seconds().max(0) as f64;
    elapsed / SECONDS_PER_YEAR
}

/// Stage active at `years` after launch. Negative input is clamped to launch.
pub fn stage_for_elapsed(years: f64) -> &'static IssuanceStage {
    ISSUANCE_CURVE
        .iter()
        .rev()
        .find(|s| years >= s.starts_at_years)
        .unwrap_or(&ISSUANCE_CURVE[0])
}

/// First stage that starts after `years`, if any.
pub fn next_stage(years: f64) -> Option<&'static IssuanceStage> {
    ISSUANCE_CURVE.iter().find(|s| s.starts_at_years > years)
}

/// Theoretical mint per round for a stage given the round length.
pub fn mint_per_round(stage: &IssuanceStage, round_minutes: f64) -> f64 {
    let rounds_per_year = 365.25 * 24.0 * 60.0 / round_minutes;
    stage.annual_mint / rounds_per_year
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(stage_for_elapsed(0.0).label, "Bootstrap");
        assert_eq!(stage_for_elapsed(0.49).label, "Bootstrap");
        assert_eq!(stage_for_elapsed(0.5).label, "Early growth");
        assert_eq!(stage_for_elapsed(1.5).label, "Growth");
        assert_eq!(stage_for_elapsed(4.99).label, "Growth");
        assert_eq!(stage_for_elapsed(5.0).label, "Maturity");
        assert_eq!(stage_for_elapsed(25.0).label, "Long term");
        assert_eq!(stage_for_elapsed(-1.0).label, "Bootstrap");
    }

    #[test]
    fn test_shares_sum_to_one() {
        for stage in ISSUANCE_CURVE {
            let total = stage.sv_share + stage.validator_share + stage.app_share;
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", stage.label, total);
        }
    }

    #[test]
    fn test_next_stage() {
        assert_eq!(next_stage(0.7).map(|s| s.label), Some("Growth"));
        assert!(next_stage(12.0).is_none());
    }

    #[test]
    fn test_years_since_launch_is_clamped() {
        let before = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(years_since_launch(before), 0.0);
        let after = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let years = years_since_launch(after);
        assert!((years - 1.0).abs() < 0.01, "got {}", years);
    }

    #[test]
    fn test_mint_per_round() {
        let stage = &ISSUANCE_CURVE[4];
        let per_round = mint_per_round(stage, 10.0);
        let rounds = 365.25 * 24.0 * 6.0;
        assert!((per_round * rounds - stage.annual_mint).abs() < 1.0);
    }
}
