use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::risk::{Priority, RiskLevel};
use crate::rut::Rut;

/// Identifier wrapper for crossing requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingDirection {
    Entrada,
    Salida,
}

impl CrossingDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entrada => "entrada",
            Self::Salida => "salida",
        }
    }
}

/// Vehicle and driver paperwork presented at the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Licencia,
    PermisoCirculacion,
    RevisionTecnica,
    SeguroObligatorio,
    Padron,
    Otro,
}

impl DocumentKind {
    /// Kinds every request must carry.
    pub const fn required() -> [Self; 3] {
        [
            Self::Licencia,
            Self::PermisoCirculacion,
            Self::SeguroObligatorio,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Licencia => "licencia de conducir",
            Self::PermisoCirculacion => "permiso de circulación",
            Self::RevisionTecnica => "revisión técnica",
            Self::SeguroObligatorio => "seguro obligatorio",
            Self::Padron => "padrón",
            Self::Otro => "otro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub kind: DocumentKind,
    pub number: String,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

/// Inbound crossing request as captured at the registration desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingSubmission {
    pub driver_name: String,
    pub driver_rut: String,
    pub vehicle_plate: String,
    pub direction: CrossingDirection,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub documents: Vec<DocumentDescriptor>,
    #[serde(default)]
    pub submitted_on: Option<NaiveDate>,
}

/// Submission after intake checks: RUT parsed, plate normalized, findings attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingProfile {
    pub request_id: RequestId,
    pub driver_name: String,
    pub driver_rut: Rut,
    pub vehicle_plate: String,
    pub direction: CrossingDirection,
    pub priority: Priority,
    pub observations: String,
    pub documents: Vec<DocumentDescriptor>,
    pub findings: Vec<String>,
    pub submitted_on: NaiveDate,
}

impl CrossingProfile {
    /// Declared observations followed by intake findings, one per line.
    pub fn risk_observations(&self) -> String {
        let mut lines = Vec::with_capacity(self.findings.len() + 1);
        if !self.observations.trim().is_empty() {
            lines.push(self.observations.trim());
        }
        lines.extend(self.findings.iter().map(String::as_str));
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pendiente,
    EnRevision,
    Aprobada,
    Rechazada,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnRevision => "en_revision",
            Self::Aprobada => "aprobada",
            Self::Rechazada => "rechazada",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pendiente | Self::EnRevision)
    }

    /// Initial status for a freshly classified request.
    pub const fn for_risk(level: RiskLevel) -> Self {
        if level.requires_review() {
            Self::EnRevision
        } else {
            Self::Pendiente
        }
    }
}

/// Inspector decision on an open request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub approve: bool,
    pub inspector: String,
    #[serde(default)]
    pub notes: Option<String>,
}
