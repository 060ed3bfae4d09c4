use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::RequestId;
use crate::risk::RiskLevel;

/// Who a notification is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Supervisor,
    Inspector,
    Driver,
}

/// Destination and template chosen for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationRoute {
    pub audience: Audience,
    pub template: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub audience: Audience,
    pub template: String,
    pub request_id: RequestId,
    pub details: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(route: NotificationRoute, request_id: RequestId) -> Self {
        Self {
            audience: route.audience,
            template: route.template.to_string(),
            request_id,
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Outbound notification hook, injected into the crossing service.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Routing table for freshly classified requests.
pub fn route_for(level: RiskLevel, notify_low_risk: bool) -> Option<NotificationRoute> {
    let (audience, template) = match level {
        RiskLevel::Urgente => (Audience::Supervisor, "crossing_urgent"),
        RiskLevel::Alto => (Audience::Inspector, "crossing_high_risk"),
        RiskLevel::Medio => (Audience::Inspector, "crossing_review"),
        RiskLevel::Bajo if notify_low_risk => (Audience::Inspector, "crossing_low_risk"),
        RiskLevel::Bajo => return None,
    };
    Some(NotificationRoute { audience, template })
}

/// Route used to tell the driver how the review ended.
pub fn route_for_decision(approved: bool) -> NotificationRoute {
    NotificationRoute {
        audience: Audience::Driver,
        template: if approved {
            "crossing_approved"
        } else {
            "crossing_rejected"
        },
    }
}
