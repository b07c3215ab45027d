//! # Prover configuration
//!
//! Every field has a default, so a config file only needs to mention what
//! it changes.

use serde::{Deserialize, Serialize};

/// Which matched facts must come from the live antecedent before a
/// conditional theorem `A1 and ... and An implies B` may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplicationStrictness {
    /// At least one of the `Ai` is matched against a local theorem.
    AtLeastOneLocal,
    /// `A1` is matched against a local theorem; the others against anything.
    FirstPatternLocal,
    /// Any fact may be used, including library theorems only.
    Unrestricted,
}

impl Default for ImplicationStrictness {
    fn default() -> Self {
        ImplicationStrictness::AtLeastOneLocal
    }
}

/// Budgets and policies of the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Maximum number of applied steps, counting the ones that were undone.
    pub max_steps: usize,
    /// Wall-clock budget, in milliseconds.
    pub timeout_ms: u64,
    /// Depth of the main proof search.
    pub max_depth: usize,
    /// Rounds of antecedent development before the main search.
    pub antecedent_development_rounds: usize,
    /// Applications considered per transformation, per search node.
    pub max_applications_per_transformation: usize,
    pub implication_strictness: ImplicationStrictness,
    /// Keep only the productive steps of a proof, and replay them.
    pub minimize_proof: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            max_steps: 20_000,
            timeout_ms: 5_000,
            max_depth: 3,
            antecedent_development_rounds: 3,
            max_applications_per_transformation: 16,
            implication_strictness: ImplicationStrictness::default(),
            minimize_proof: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_config() {
        let c: ProverConfig =
            serde_json::from_str(r#"{"max_depth": 5, "implication_strictness": "Unrestricted"}"#)
                .unwrap();
        assert_eq!(5, c.max_depth);
        assert_eq!(ImplicationStrictness::Unrestricted, c.implication_strictness);
        assert_eq!(ProverConfig::default().max_steps, c.max_steps);
    }

    #[test]
    fn test_empty_config() {
        let c: ProverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(ProverConfig::default(), c);
    }
}
