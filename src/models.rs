use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder shown when no active member holds a role.
pub const UNASSIGNED: &str = "Sin asignar";

/// Committee roles, in the order the task catalog declares them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Coordinadora,
    Secretaria,
    #[serde(rename = "Gestor del Conocimiento")]
    GestorDelConocimiento,
    #[serde(rename = "Vocal I")]
    VocalI,
    #[serde(rename = "Vocal II")]
    VocalII,
    Subcoordinador,
    Prosecretaria,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Coordinadora,
        Role::Secretaria,
        Role::GestorDelConocimiento,
        Role::VocalI,
        Role::VocalII,
        Role::Subcoordinador,
        Role::Prosecretaria,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coordinadora => "Coordinadora",
            Role::Secretaria => "Secretaria",
            Role::GestorDelConocimiento => "Gestor del Conocimiento",
            Role::VocalI => "Vocal I",
            Role::VocalII => "Vocal II",
            Role::Subcoordinador => "Subcoordinador",
            Role::Prosecretaria => "Prosecretaria",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts the display name in any case; `-` and `_` stand in for spaces
    /// so `vocal-ii` works on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().to_lowercase() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
                format!("unknown role '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// A committee member (stored in the `profiles` collection).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ActivityType {
    Diplomado,
    Taller,
    Conferencia,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityType::Diplomado => "Diplomado",
            ActivityType::Taller => "Taller",
            ActivityType::Conferencia => "Conferencia",
        };
        f.write_str(s)
    }
}

/// A planned course or event. Immutable once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub date: NaiveDate,
    #[serde(default)]
    pub hours: f64,
    pub created_at: DateTime<Utc>,
}

/// A checklist item assigned to a role-holder for one activity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub activity_id: u64,
    pub title: String,
    pub description: String,
    pub role: Role,
    pub assigned_to: String,
    /// Whether the task must be backed by evidence (a signed document, minutes, ...).
    #[serde(default)]
    pub evidence_required: bool,
}

/// Status vocabulary of an aval. Only `Pendiente -> Aprobado | Rechazado`
/// is reachable; the other two are kept for records written elsewhere.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AvalStatus {
    Pendiente,
    #[serde(rename = "En Proceso")]
    EnProceso,
    Aprobado,
    Rechazado,
    Finalizado,
}

impl AvalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvalStatus::Pendiente => "Pendiente",
            AvalStatus::EnProceso => "En Proceso",
            AvalStatus::Aprobado => "Aprobado",
            AvalStatus::Rechazado => "Rechazado",
            AvalStatus::Finalizado => "Finalizado",
        }
    }
}

impl fmt::Display for AvalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external approval request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Aval {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub applicant_name: String,
    pub activity_name: String,
    pub email: String,
    #[serde(default)]
    pub form_url: Option<String>,
    pub status: AvalStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Payment request letter.
    Pago,
    /// Supplies request letter.
    Suministros,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Pago => f.write_str("pago"),
            DocumentType::Suministros => f.write_str("suministros"),
        }
    }
}

/// A letter generated against an activity. Append-only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InternalDocument {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: DocumentType,
    pub activity_name: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}
