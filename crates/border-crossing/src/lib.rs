//! Vehicle control core for a border crossing: RUT checks, risk tiers, and the
//! crossing-request review workflow built on top of them.

pub mod config;
pub mod crossings;
pub mod error;
pub mod risk;
pub mod rut;
pub mod telemetry;

pub use risk::{classify, classify_risk, Priority, RiskInput, RiskLevel};
pub use rut::{check_digit, format_rut, validate_rut, Rut, RutError};
