use std::fmt::Write as _;

use serde::Serialize;

use super::{wrap, ExportDocument};
use crate::assessment::domain::{CefrLevel, TestResult, UserProfile, MAX_SCORE};

const FEEDBACK_WIDTH: usize = 72;

#[derive(Debug, Clone, Serialize)]
pub struct SubskillLine {
    pub label: &'static str,
    pub score: f64,
}

/// Printable summary of one assessment result.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsReport {
    pub name: String,
    pub date: String,
    pub duration_minutes: u32,
    pub cefr_level: CefrLevel,
    pub overall_score: f64,
    pub subskills: Vec<SubskillLine>,
    pub feedback: String,
}

impl ResultsReport {
    pub fn new(result: &TestResult, user: &UserProfile) -> Self {
        Self {
            name: user.name.clone(),
            date: result.completed_at.format("%Y-%m-%d").to_string(),
            duration_minutes: result.duration / 60,
            cefr_level: result.cefr_level,
            overall_score: result.overall_score,
            subskills: result
                .subskills
                .entries()
                .into_iter()
                .map(|(skill, score)| SubskillLine {
                    label: skill.label(),
                    score,
                })
                .collect(),
            feedback: result.feedback.clone(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("CEFR_Report_{}_{}.txt", self.cefr_level, self.date)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CEFR Speaking Assessment Report");
        let _ = writeln!(out);
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Date: {}", self.date);
        let _ = writeln!(out, "Duration: {} minutes", self.duration_minutes);
        let _ = writeln!(out);
        let _ = writeln!(out, "CEFR Level: {}", self.cefr_level);
        let _ = writeln!(
            out,
            "Overall Score: {:.1}/{:.1}",
            self.overall_score, MAX_SCORE
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Subskill Breakdown:");
        for line in &self.subskills {
            let _ = writeln!(out, "  {}: {:.1}", line.label, line.score);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Feedback:");
        for line in wrap(&self.feedback, FEEDBACK_WIDTH) {
            let _ = writeln!(out, "{line}");
        }
        out
    }

    pub fn to_document(&self) -> ExportDocument {
        ExportDocument {
            file_name: self.file_name(),
            body: self.render(),
        }
    }
}
