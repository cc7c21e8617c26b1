//! Training hyperparameter configuration.

use serde::{Deserialize, Serialize};

/// Hyperparameters for a fine-tuning run.
///
/// Every field has a documented default, so a payload may carry any subset of
/// fields and the rest fill in server-compatible values. This replaces the
/// untyped configuration blob older dashboard builds sent with `/estimate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Optimizer step size. Default: 0.001
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Samples per optimizer step. Default: 32
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Full passes over the training set. Default: 10
    #[serde(default = "default_epochs")]
    pub epochs: u32,

    /// Optimizer algorithm name. Default: "adam"
    #[serde(default = "default_optimizer")]
    pub optimizer: String,

    /// L2 regularization factor. Default: 0.01
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f64,

    /// Token length inputs are truncated/padded to. Default: 2048
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: u32,

    /// Learning-rate warmup steps. Default: 100
    #[serde(default = "default_warmup_steps")]
    pub warmup_steps: u32,
}

fn default_learning_rate() -> f64 {
    0.001
}

fn default_batch_size() -> u32 {
    32
}

fn default_epochs() -> u32 {
    10
}

fn default_optimizer() -> String {
    "adam".to_string()
}

fn default_weight_decay() -> f64 {
    0.01
}

fn default_max_sequence_length() -> u32 {
    2048
}

fn default_warmup_steps() -> u32 {
    100
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            batch_size: default_batch_size(),
            epochs: default_epochs(),
            optimizer: default_optimizer(),
            weight_decay: default_weight_decay(),
            max_sequence_length: default_max_sequence_length(),
            warmup_steps: default_warmup_steps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.learning_rate, 0.001);
        assert_eq!(hp.batch_size, 32);
        assert_eq!(hp.epochs, 10);
        assert_eq!(hp.optimizer, "adam");
        assert_eq!(hp.weight_decay, 0.01);
        assert_eq!(hp.max_sequence_length, 2048);
        assert_eq!(hp.warmup_steps, 100);
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let json = r#"{"learning_rate": 0.1, "epochs": 3}"#;
        let hp: Hyperparameters = serde_json::from_str(json).unwrap();

        assert_eq!(hp.learning_rate, 0.1);
        assert_eq!(hp.epochs, 3);
        assert_eq!(hp.batch_size, 32, "absent fields should take defaults");
        assert_eq!(hp.optimizer, "adam");
    }

    #[test]
    fn test_empty_payload_is_all_defaults() {
        let hp: Hyperparameters = serde_json::from_str("{}").unwrap();
        assert_eq!(hp, Hyperparameters::default());
    }

    #[test]
    fn test_round_trip() {
        let hp = Hyperparameters {
            learning_rate: 0.0005,
            batch_size: 4,
            epochs: 3,
            optimizer: "adamw".to_string(),
            weight_decay: 0.1,
            max_sequence_length: 1024,
            warmup_steps: 50,
        };
        let json = serde_json::to_string(&hp).unwrap();
        let parsed: Hyperparameters = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hp);
    }
}
