use serde::{Deserialize, Serialize};

/// Stage labels produced by the external zero-shot stage classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleStage {
    CipDiscuss,
    CipVote,
    CipAnnounce,
    Tokenomics,
    TokenomicsAnnounce,
    SvAnnounce,
    #[serde(other)]
    Other,
}

impl LifecycleStage {
    pub const ALL: [LifecycleStage; 7] = [
        LifecycleStage::CipDiscuss,
        LifecycleStage::CipVote,
        LifecycleStage::CipAnnounce,
        LifecycleStage::Tokenomics,
        LifecycleStage::TokenomicsAnnounce,
        LifecycleStage::SvAnnounce,
        LifecycleStage::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleStage::CipDiscuss => "cip-discuss",
            LifecycleStage::CipVote => "cip-vote",
            LifecycleStage::CipAnnounce => "cip-announce",
            LifecycleStage::Tokenomics => "tokenomics",
            LifecycleStage::TokenomicsAnnounce => "tokenomics-announce",
            LifecycleStage::SvAnnounce => "sv-announce",
            LifecycleStage::Other => "other",
        }
    }

    /// Announcements close a lifecycle; everything else may still move.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleStage::CipAnnounce
                | LifecycleStage::TokenomicsAnnounce
                | LifecycleStage::SvAnnounce
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageInference {
    pub stage: LifecycleStage,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_serde() {
        for stage in LifecycleStage::ALL {
            let encoded = serde_json::to_string(&stage).unwrap();
            assert_eq!(encoded, format!("\"{}\"", stage.label()));
        }
    }

    #[test]
    fn test_unknown_label_is_other() {
        let stage: LifecycleStage = serde_json::from_str("\"cip-withdrawn\"").unwrap();
        assert_eq!(stage, LifecycleStage::Other);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(LifecycleStage::SvAnnounce.is_terminal());
        assert!(!LifecycleStage::CipVote.is_terminal());
    }
}
