//! Engine configuration types.

use serde::{Deserialize, Serialize};

/// Limits and switches shared by the unification and rewriting procedures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default bound on normalisation passes for theory rewriting
    /// (`None` means unbounded)
    pub rewrite_bound: Option<usize>,
    /// Maximum number of usable Diophantine basis vectors in AC unification
    pub ac_max_basis: usize,
    /// Maximum size of one completion frontier of the Diophantine solver
    pub ac_max_frontier: usize,
    /// Enumerate AC unifier candidates on the rayon thread pool
    pub ac_parallel: bool,
    /// Rule applications allowed in one E-AC run, over all branches
    pub eac_max_steps: usize,
    /// Largest equation set an E-AC branch may reach before `SearchLimit`
    pub eac_max_equations: usize,
    /// Name prefix of fresh variables
    pub fresh_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rewrite_bound: None,
            ac_max_basis: 20,
            ac_max_frontier: 100_000,
            ac_parallel: true,
            eac_max_steps: 2_000,
            eac_max_equations: 64,
            fresh_prefix: "v_".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON object; missing fields take their default values
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "rewrite_bound": 10, "ac_parallel": false }"#)
            .unwrap();
        assert_eq!(config.rewrite_bound, Some(10));
        assert!(!config.ac_parallel);
        assert_eq!(config.ac_max_basis, 20);
        assert_eq!(config.fresh_prefix, "v_");
        assert_eq!(config.eac_max_equations, 64);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig {
            eac_max_steps: 42,
            ..EngineConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(EngineConfig::from_json_str("{ \"ac_max_basis\": \"many\" }").is_err());
    }
}
