//! Risk bucket classification of RUL predictions.
//!
//! A pure mapping from one scalar prediction to one of four labels. The
//! boundaries are inclusive on the lower bucket: a prediction exactly at
//! the critical threshold is still "Crítico". No floor is enforced on
//! predictions, so a negative estimate lands in "Crítico" rather than a
//! separate error bucket. Only a NaN prediction falls through to
//! "Indefinido".

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Coarse risk category derived from a predicted RUL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBucket {
    /// `RUL <= critical`: intervention needed now.
    Critico,
    /// `critical < RUL <= attention`: schedule maintenance.
    Atencao,
    /// `RUL > attention`: healthy.
    Normal,
    /// The prediction was not a comparable number (NaN).
    Indefinido,
}

impl RiskBucket {
    /// Human-readable label, as reported to operators.
    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::Critico => "Crítico",
            RiskBucket::Atencao => "Atenção",
            RiskBucket::Normal => "Normal",
            RiskBucket::Indefinido => "Indefinido",
        }
    }
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Risk boundaries in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Upper bound (inclusive) of the critical bucket.
    pub critical: f64,
    /// Upper bound (inclusive) of the attention bucket.
    pub attention: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 40.0,
            attention: 80.0,
        }
    }
}

impl RiskThresholds {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.critical.is_finite() || !self.attention.is_finite() {
            return Err(PipelineError::Config(
                "risk thresholds must be finite".to_string(),
            ));
        }
        if self.critical >= self.attention {
            return Err(PipelineError::Config(format!(
                "critical threshold ({}) must be below attention threshold ({})",
                self.critical, self.attention
            )));
        }
        Ok(())
    }

    /// Map a prediction to its risk bucket.
    pub fn classify(&self, rul: f64) -> RiskBucket {
        if rul.is_nan() {
            RiskBucket::Indefinido
        } else if rul <= self.critical {
            RiskBucket::Critico
        } else if rul <= self.attention {
            RiskBucket::Atencao
        } else {
            RiskBucket::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_values() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(40.0), RiskBucket::Critico);
        assert_eq!(t.classify(40.01), RiskBucket::Atencao);
        assert_eq!(t.classify(80.0), RiskBucket::Atencao);
        assert_eq!(t.classify(80.01), RiskBucket::Normal);
    }

    #[test]
    fn test_nan_is_indefinido() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(f64::NAN), RiskBucket::Indefinido);
    }

    #[test]
    fn test_negative_prediction_is_critico() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(-12.5), RiskBucket::Critico);
        assert_eq!(t.classify(f64::NEG_INFINITY), RiskBucket::Critico);
    }

    #[test]
    fn test_infinite_prediction_is_normal() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(f64::INFINITY), RiskBucket::Normal);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskBucket::Critico.label(), "Crítico");
        assert_eq!(RiskBucket::Atencao.label(), "Atenção");
        assert_eq!(RiskBucket::Normal.label(), "Normal");
        assert_eq!(RiskBucket::Indefinido.label(), "Indefinido");
        assert_eq!(RiskBucket::Atencao.to_string(), "Atenção");
    }

    #[test]
    fn test_threshold_validation() {
        assert!(RiskThresholds::default().validate().is_ok());
        assert!(RiskThresholds {
            critical: 80.0,
            attention: 40.0
        }
        .validate()
        .is_err());
        assert!(RiskThresholds {
            critical: f64::NAN,
            attention: 80.0
        }
        .validate()
        .is_err());
    }
}
