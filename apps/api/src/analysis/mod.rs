//! Resume analysis: prompt rendering and the model-call pipelines.
//!
//! Job-match flow: score (JSON) → evaluation (uses the score) → guidance.
//! The guidance branch is chosen here from the parsed score, not by the model.
//!
//! General ATS flow: a single suggestions call.

pub mod prompts;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::analysis::prompts::{
    ALIGNMENT_SCORE_PROMPT, ATS_SUGGESTIONS_PROMPT, INTERVIEW_PREP_PROMPT,
    JOB_MATCH_EVALUATION_PROMPT, RESUBMISSION_NOTICE,
};
use crate::extraction::ExtractedText;
use crate::llm_client::prompts::{render, JSON_ONLY_SYSTEM};
use crate::llm_client::{generate_json, AnalysisClient, LlmError};

/// Minimum alignment score (inclusive) that earns interview preparation guidance.
pub const INTERVIEW_THRESHOLD: u8 = 7;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Service(#[from] LlmError),

    #[error("alignment score {0} is outside 1-10")]
    InvalidScore(f64),
}

impl AnalysisError {
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Service(e) => e.user_message(),
            AnalysisError::InvalidScore(_) => {
                "The analysis service returned an invalid alignment score. Please try again."
                    .to_string()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

pub fn build_score_prompt(resume_text: &str, job_description: &str) -> String {
    render(
        ALIGNMENT_SCORE_PROMPT,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
        ],
    )
}

pub fn build_evaluation_prompt(resume_text: &str, job_description: &str, score: u8) -> String {
    let score = score.to_string();
    render(
        JOB_MATCH_EVALUATION_PROMPT,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
            ("alignment_score", &score),
        ],
    )
}

pub fn build_interview_prompt(resume_text: &str, job_description: &str, score: u8) -> String {
    let score = score.to_string();
    render(
        INTERVIEW_PREP_PROMPT,
        &[
            ("resume_text", resume_text),
            ("job_description", job_description),
            ("alignment_score", &score),
        ],
    )
}

pub fn build_ats_prompt(resume_text: &str) -> String {
    render(ATS_SUGGESTIONS_PROMPT, &[("resume_text", resume_text)])
}

// ────────────────────────────────────────────────────────────────────────────
// Guidance branch
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidancePath {
    InterviewPreparation,
    Resubmit,
}

/// Chooses what follows the evaluation for a given score.
pub fn guidance_path(score: u8) -> GuidancePath {
    if score >= INTERVIEW_THRESHOLD {
        GuidancePath::InterviewPreparation
    } else {
        GuidancePath::Resubmit
    }
}

pub fn resubmission_notice(score: u8) -> String {
    let score = score.to_string();
    let threshold = INTERVIEW_THRESHOLD.to_string();
    render(
        RESUBMISSION_NOTICE,
        &[("alignment_score", &score), ("threshold", &threshold)],
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum Guidance {
    InterviewPreparation(String),
    Resubmit(String),
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    alignment_score: f64,
}

/// Rounds the model's score and rejects anything outside 1..=10.
fn validate_score(raw: f64) -> Result<u8, AnalysisError> {
    let rounded = raw.round();
    if raw.is_finite() && (1.0..=10.0).contains(&rounded) {
        Ok(rounded as u8)
    } else {
        Err(AnalysisError::InvalidScore(raw))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of a job-match analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub alignment_score: u8,
    pub evaluation: String,
    pub guidance: Guidance,
}

impl MatchReport {
    /// Markdown shown in the result panel.
    pub fn to_markdown(&self) -> String {
        match &self.guidance {
            Guidance::InterviewPreparation(text) => format!(
                "{}\n\n## Interview Preparation Roadmap\n\n{}",
                self.evaluation.trim_end(),
                text.trim()
            ),
            Guidance::Resubmit(text) => {
                format!("{}\n\n## Next Steps\n\n{}", self.evaluation.trim_end(), text)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

/// Runs the analysis pipelines against an injected model client.
/// Every model call is bounded by `timeout`; nothing is retried.
#[derive(Clone)]
pub struct Analyzer {
    client: Arc<dyn AnalysisClient>,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(client: Arc<dyn AnalysisClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Job-match analysis. `job_description` must already be validated non-empty.
    pub async fn analyze_job_match(
        &self,
        resume: &ExtractedText,
        job_description: &str,
    ) -> Result<MatchReport, AnalysisError> {
        let resume_text = resume.as_str();
        let started = Instant::now();

        let score_prompt = build_score_prompt(resume_text, job_description);
        let reply: ScoreReply = self
            .bounded(generate_json(
                self.client.as_ref(),
                &score_prompt,
                JSON_ONLY_SYSTEM,
            ))
            .await?;
        let score = validate_score(reply.alignment_score)?;
        info!(score, model = self.client.model(), "Alignment score computed");

        let evaluation_prompt = build_evaluation_prompt(resume_text, job_description, score);
        let evaluation = self
            .bounded(self.client.generate(&evaluation_prompt, None))
            .await?;

        let guidance = match guidance_path(score) {
            GuidancePath::InterviewPreparation => {
                let prompt = build_interview_prompt(resume_text, job_description, score);
                let text = self.bounded(self.client.generate(&prompt, None)).await?;
                Guidance::InterviewPreparation(text)
            }
            GuidancePath::Resubmit => Guidance::Resubmit(resubmission_notice(score)),
        };

        info!(
            score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Job-match analysis complete"
        );

        Ok(MatchReport {
            alignment_score: score,
            evaluation,
            guidance,
        })
    }

    /// General ATS suggestions for the resume alone.
    pub async fn suggest_ats(&self, resume: &ExtractedText) -> Result<String, AnalysisError> {
        let started = Instant::now();
        let prompt = build_ats_prompt(resume.as_str());
        let suggestions = self.bounded(self.client.generate(&prompt, None)).await?;
        info!(
            model = self.client.model(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ATS suggestions generated"
        );
        Ok(suggestions)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, LlmError>
    where
        F: std::future::Future<Output = Result<T, LlmError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
    }
}
