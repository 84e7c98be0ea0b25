use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::{ExportDocument, ExportError};
use crate::assessment::domain::{CefrLevel, TestResult, UserId, UserProfile};
use crate::assessment::progress::has_reached_target;
use crate::assessment::scale::info_for;

/// `CEFR-<level>-<last 8 characters of the user id, uppercased>`.
pub fn certificate_id(level: CefrLevel, user_id: &UserId) -> String {
    let id = user_id.as_str();
    let tail: String = id
        .chars()
        .skip(id.chars().count().saturating_sub(8))
        .collect();
    format!("CEFR-{level}-{}", tail.to_uppercase())
}

#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    pub holder: String,
    pub level: CefrLevel,
    pub level_description: &'static str,
    pub achieved_on: DateTime<Utc>,
    pub certificate_id: String,
}

/// Issues a certificate for `result`, which must meet the user's target.
pub fn issue_certificate(
    result: &TestResult,
    user: &UserProfile,
) -> Result<Certificate, ExportError> {
    if !has_reached_target(result, user) {
        return Err(ExportError::CertificateLocked {
            achieved: result.cefr_level,
            target: user.target_cefr,
        });
    }

    let certificate = Certificate {
        holder: user.name.clone(),
        level: result.cefr_level,
        level_description: info_for(result.cefr_level).description,
        achieved_on: result.completed_at,
        certificate_id: certificate_id(result.cefr_level, &user.id),
    };
    info!(id = %certificate.certificate_id, "certificate issued");
    Ok(certificate)
}

impl Certificate {
    pub fn achieved_on_label(&self) -> String {
        self.achieved_on.format("%B %-d, %Y").to_string()
    }

    /// Characters of the holder name that cannot appear in a file name
    /// (path separators and the like) become `_`.
    pub fn file_name(&self) -> String {
        let holder: String = self
            .holder
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("CEFR_Certificate_{}_{}.txt", self.level, holder)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CERTIFICATE OF ACHIEVEMENT");
        let _ = writeln!(out);
        let _ = writeln!(out, "This is to certify that");
        let _ = writeln!(out, "{}", self.holder);
        let _ = writeln!(out, "has successfully demonstrated proficiency in");
        let _ = writeln!(out, "English Speaking Skills");
        let _ = writeln!(out, "and has achieved the level of");
        let _ = writeln!(out, "{} ({})", self.level, self.level_description);
        let _ = writeln!(
            out,
            "according to the Common European Framework of Reference for Languages (CEFR)"
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Date of Achievement: {}", self.achieved_on_label());
        let _ = writeln!(out, "Certificate ID: {}", self.certificate_id);
        out
    }

    pub fn to_document(&self) -> ExportDocument {
        ExportDocument {
            file_name: self.file_name(),
            body: self.render(),
        }
    }
}
