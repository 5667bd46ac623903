use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

use crate::extraction::ExtractedText;

pub const UPLOAD_SUCCESS: &str =
    "Resume uploaded and processed successfully! Proceed with your selected action.";
pub const MISSING_JOB_DESCRIPTION: &str = "Please provide a job description before proceeding.";
pub const SUGGESTIONS_SUCCESS: &str = "Suggestions generated successfully!";

/// Where a session is in the upload → analyze → display flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingUpload,
    /// Terminal error display for the current upload; only a re-upload leaves it.
    ExtractionFailed,
    Uploaded,
    AwaitingJobDescription,
    GeneratingSuggestions,
    ResultDisplayed,
}

/// The three-position mode selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    #[serde(alias = "")]
    Unset,
    JobMatch,
    GeneralAts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            message: message.into(),
        }
    }
}

/// Model output as displayed in the expandable result panel. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub mode: AnalysisMode,
    pub heading: String,
    pub expander_label: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_score: Option<u8>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn job_match(body: String, alignment_score: u8) -> Self {
        Self {
            mode: AnalysisMode::JobMatch,
            heading: "🔍 Resume Analysis Results".to_string(),
            expander_label: "View Detailed Analysis".to_string(),
            body,
            alignment_score: Some(alignment_score),
            generated_at: Utc::now(),
        }
    }

    pub fn ats_suggestions(body: String) -> Self {
        Self {
            mode: AnalysisMode::GeneralAts,
            heading: "💡 ATS Resume Suggestions".to_string(),
            expander_label: "View Suggestions".to_string(),
            body,
            alignment_score: None,
            generated_at: Utc::now(),
        }
    }
}

/// An action that the current state does not accept.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot {action} while the session is {state:?}: {hint}")]
pub struct InvalidTransition {
    pub action: &'static str,
    pub state: SessionState,
    pub hint: &'static str,
}

/// One user's page. Holds the extracted resume text, never the PDF bytes.
#[derive(Debug)]
pub struct Session {
    pub(crate) id: Uuid,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_active: Instant,
    pub(crate) state: SessionState,
    pub(crate) mode: AnalysisMode,
    pub(crate) filename: Option<String>,
    pub(crate) resume: Option<ExtractedText>,
    pub(crate) job_description: Option<String>,
    pub(crate) result: Option<AnalysisResult>,
    pub(crate) banners: Vec<Banner>,
}

/// JSON snapshot of a session for the page.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    pub mode: AnalysisMode,
    pub filename: Option<String>,
    pub resume_chars: Option<usize>,
    pub job_description: Option<String>,
    pub banners: Vec<Banner>,
    pub result: Option<AnalysisResult>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: Instant::now(),
            state: SessionState::Idle,
            mode: AnalysisMode::Unset,
            filename: None,
            resume: None,
            job_description: None,
            result: None,
            banners: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn idle_for(&self) -> std::time::Duration {
        self.last_active.elapsed()
    }

    pub(crate) fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            state: self.state,
            mode: self.mode,
            filename: self.filename.clone(),
            resume_chars: self.resume.as_ref().map(|r| r.as_str().chars().count()),
            job_description: self.job_description.clone(),
            banners: self.banners.clone(),
            result: self.result.clone(),
            created_at: self.created_at,
        }
    }
}
