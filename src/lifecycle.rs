//! Approval request (aval) lifecycle.
//!
//! ```text
//! Pendiente ──► Aprobado   (terminal)
//!     │
//!     └──────► Rechazado  (terminal, reason required)
//! ```
//!
//! Both operations are pure: persisting the returned aval is up to the caller.

use chrono::Utc;

use crate::error::LifecycleError;
use crate::models::{Aval, AvalStatus};

/// Fields an external applicant fills in.
#[derive(Debug, Clone, Default)]
pub struct NewAval {
    pub applicant_name: String,
    pub activity_name: String,
    pub email: String,
    /// Path of the uploaded request form, if one was attached.
    pub form_url: Option<String>,
}

fn required(value: &str, field: &'static str) -> Result<String, LifecycleError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(LifecycleError::Validation { field });
    }
    Ok(v.to_string())
}

/// Builds a new `Pendiente` aval from an applicant's submission.
///
/// The returned aval has id `0` until the store assigns one.
pub fn submit(req: NewAval) -> Result<Aval, LifecycleError> {
    let applicant_name = required(&req.applicant_name, "applicant_name")?;
    let activity_name = required(&req.activity_name, "activity_name")?;
    let email = required(&req.email, "email")?;
    if !email.contains('@') {
        return Err(LifecycleError::Validation { field: "email" });
    }
    let form_url = req.form_url.filter(|u| !u.trim().is_empty());

    Ok(Aval {
        id: 0,
        created_at: Utc::now(),
        applicant_name,
        activity_name,
        email,
        form_url,
        status: AvalStatus::Pendiente,
        rejection_reason: None,
    })
}

/// Applies an admin decision to a pending aval.
///
/// Only `Aprobado` and `Rechazado` are accepted targets. A rejection needs a
/// non-blank reason; an approval drops whatever reason was passed.
pub fn decide(aval: &Aval, status: AvalStatus, reason: Option<&str>) -> Result<Aval, LifecycleError> {
    if aval.status != AvalStatus::Pendiente {
        return Err(LifecycleError::InvalidTransition { from: aval.status, to: status });
    }

    let rejection_reason = match status {
        AvalStatus::Aprobado => None,
        AvalStatus::Rechazado => {
            let reason = reason.map(str::trim).filter(|r| !r.is_empty());
            match reason {
                Some(r) => Some(r.to_string()),
                None => return Err(LifecycleError::MissingReason),
            }
        }
        other => {
            return Err(LifecycleError::InvalidTransition { from: aval.status, to: other });
        }
    };

    Ok(Aval {
        status,
        rejection_reason,
        ..aval.clone()
    })
}
