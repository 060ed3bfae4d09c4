//! Rule-based risk tiers for crossing requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Requests carrying fewer documents than this land at least in `Medio`.
pub const MIN_DOCUMENTS: usize = 4;

const URGENT_MARKERS: &[&str] = &["urgente"];
const HIGH_RISK_MARKERS: &[&str] = &["falta", "vencid"];
const REVIEW_MARKERS: &[&str] = &["verificaci"];

/// Priority declared on a crossing request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Baja,
    #[default]
    Normal,
    Alta,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Baja => "baja",
            Self::Normal => "normal",
            Self::Alta => "alta",
        }
    }

    /// Lenient parse: anything unrecognised is treated as `Normal`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority '{0}' (expected normal, alta, or baja)")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "baja" => Ok(Self::Baja),
            "normal" => Ok(Self::Normal),
            "alta" => Ok(Self::Alta),
            _ => Err(UnknownPriority(raw.to_string())),
        }
    }
}

/// Severity tier; variants are declared in ascending order so `Ord` follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Bajo,
    Medio,
    Alto,
    Urgente,
}

impl RiskLevel {
    pub const fn ordered() -> [Self; 4] {
        [Self::Bajo, Self::Medio, Self::Alto, Self::Urgente]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bajo => "bajo",
            Self::Medio => "medio",
            Self::Alto => "alto",
            Self::Urgente => "urgente",
        }
    }

    /// Tiers that put a request straight into inspector review.
    pub const fn requires_review(self) -> bool {
        matches!(self, Self::Alto | Self::Urgente)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared fields of a request that feed the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskInput {
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub observations: String,
    pub document_count: usize,
}

/// Ordered decision list; the first matching rule decides the tier.
pub fn classify(input: &RiskInput) -> RiskLevel {
    let observations = input.observations.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| observations.contains(m));

    if input.priority == Priority::Alta || mentions(URGENT_MARKERS) {
        RiskLevel::Urgente
    } else if mentions(HIGH_RISK_MARKERS) {
        RiskLevel::Alto
    } else if input.document_count < MIN_DOCUMENTS || mentions(REVIEW_MARKERS) {
        RiskLevel::Medio
    } else {
        RiskLevel::Bajo
    }
}

/// String-typed entry point; an unknown priority counts as `normal`.
pub fn classify_risk(priority: &str, observations: &str, document_count: usize) -> RiskLevel {
    classify(&RiskInput {
        priority: Priority::parse_lenient(priority),
        observations: observations.to_string(),
        document_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alta_priority_is_urgent_regardless_of_documents() {
        assert_eq!(classify_risk("alta", "", 4), RiskLevel::Urgente);
        assert_eq!(classify_risk("alta", "Todo en orden", 0), RiskLevel::Urgente);
    }

    #[test]
    fn urgent_marker_beats_missing_documents() {
        assert_eq!(
            classify_risk("baja", "Traslado URGENTE, falta padrón", 1),
            RiskLevel::Urgente
        );
    }

    #[test]
    fn missing_or_expired_paperwork_is_high() {
        assert_eq!(
            classify_risk("normal", "Falta Revisión Técnica", 3),
            RiskLevel::Alto
        );
        assert_eq!(
            classify_risk("normal", "Seguro VENCIDO", 6),
            RiskLevel::Alto
        );
    }

    #[test]
    fn few_documents_or_pending_verification_is_medium() {
        assert_eq!(classify_risk("normal", "", 3), RiskLevel::Medio);
        assert_eq!(
            classify_risk("baja", "Pendiente verificación de padrón", 5),
            RiskLevel::Medio
        );
    }

    #[test]
    fn clean_request_is_low() {
        assert_eq!(classify_risk("normal", "Todo en orden", 5), RiskLevel::Bajo);
        assert_eq!(classify_risk("baja", "", MIN_DOCUMENTS), RiskLevel::Bajo);
    }

    #[test]
    fn unknown_priority_behaves_as_normal() {
        assert_eq!(classify_risk("critica", "", 4), RiskLevel::Bajo);
        assert_eq!(classify_risk(" ALTA ", "", 4), RiskLevel::Urgente);
    }

    #[test]
    fn levels_order_by_severity() {
        let mut shuffled = vec![
            RiskLevel::Alto,
            RiskLevel::Bajo,
            RiskLevel::Urgente,
            RiskLevel::Medio,
        ];
        shuffled.sort();
        assert_eq!(shuffled, RiskLevel::ordered().to_vec());
        assert!(RiskLevel::Urgente.requires_review());
        assert!(!RiskLevel::Medio.requires_review());
    }

    #[test]
    fn risk_input_deserializes_with_defaults() {
        let input: RiskInput =
            serde_json::from_str(r#"{"document_count": 2}"#).expect("payload parses");
        assert_eq!(input.priority, Priority::Normal);
        assert_eq!(classify(&input), RiskLevel::Medio);
    }
}
