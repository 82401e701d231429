use serde::{Deserialize, Serialize};

use crate::amount::de_amount;

/// One closed mining round as reported by the Scan API `round-totals` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTotals {
    pub closed_round: u64,
    pub closed_round_effective_at: String,
    #[serde(deserialize_with = "de_amount")]
    pub app_rewards: f64,
    #[serde(deserialize_with = "de_amount")]
    pub validator_rewards: f64,
    #[serde(deserialize_with = "de_amount")]
    pub change_to_initial_amount_as_of_round_zero: f64,
    #[serde(deserialize_with = "de_amount")]
    pub change_to_holding_fees_rate: f64,
    #[serde(deserialize_with = "de_amount")]
    pub total_amulet_balance: f64,
}

impl RoundTotals {
    pub fn minted(&self) -> f64 {
        self.app_rewards + self.validator_rewards
    }

    /// Whatever was minted but did not show up as net supply change was burned.
    pub fn burned(&self) -> f64 {
        (self.minted() - self.change_to_initial_amount_as_of_round_zero).max(0.0)
    }
}

/// Burn/mint totals over a window of rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplySnapshot {
    pub first_round: u64,
    pub last_round: u64,
    pub rounds: usize,
    pub minted: f64,
    pub burned: f64,
    pub net_change: f64,
    pub total_supply: f64,
}

impl SupplySnapshot {
    /// Fold a set of rounds; ordering of the input does not matter.
    pub fn from_rounds(rounds: &[RoundTotals]) -> Option<Self> {
        let first = rounds.iter().min_by_key(|r| r.closed_round)?;
        let last = rounds.iter().max_by_key(|r| r.closed_round)?;

        let minted: f64 = rounds.iter().map(RoundTotals::minted).sum();
        let burned: f64 = rounds.iter().map(RoundTotals::burned).sum();
        Some(Self {
            first_round: first.closed_round,
            last_round: last.closed_round,
            rounds: rounds.len(),
            minted,
            burned,
            net_change: minted - burned,
            total_supply: last.total_amulet_balance,
        })
    }

    /// Share of minted coin that was burned again, in percent.
    pub fn burn_ratio_percent(&self) -> f64 {
        if self.minted <= 0.0 {
            0.0
        } else {
            self.burned / self.minted * 100.0
        }
    }
}
