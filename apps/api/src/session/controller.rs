//! Interaction controller: the session state machine.
//!
//! Idle → AwaitingUpload → Uploaded → {AwaitingJobDescription, GeneratingSuggestions}
//! → ResultDisplayed, with ExtractionFailed as the terminal display for a bad upload.
//!
//! Callers hold the session lock for the whole action, model call included,
//! so one session runs one action at a time.

use tracing::{info, warn};

use crate::analysis::Analyzer;
use crate::extraction::{extract_document, UploadedDocument};
use crate::session::model::{
    AnalysisMode, AnalysisResult, Banner, InvalidTransition, Session, SessionState,
    MISSING_JOB_DESCRIPTION, SUGGESTIONS_SUCCESS, UPLOAD_SUCCESS,
};

impl Session {
    /// Idle → AwaitingUpload.
    pub fn page_loaded(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::AwaitingUpload;
        }
        self.touch();
    }

    /// Replaces the resume and clears every downstream result.
    ///
    /// Nothing is written until extraction finishes, so a dropped request
    /// leaves the previous upload in place.
    pub async fn upload(&mut self, document: UploadedDocument) -> Result<(), InvalidTransition> {
        if self.state == SessionState::Idle {
            return Err(self.reject("upload a resume", "load the page first"));
        }
        self.touch();

        let filename = document.filename.clone();
        let outcome = extract_document(document).await;

        self.resume = None;
        self.job_description = None;
        self.result = None;
        self.banners.clear();
        self.filename = Some(filename);

        match outcome {
            Ok(text) => {
                self.resume = Some(text);
                self.banners.push(Banner::success(UPLOAD_SUCCESS));
                self.state = self.ready_state();
            }
            Err(e) => {
                self.banners.push(Banner::error(e.to_string()));
                self.state = SessionState::ExtractionFailed;
            }
        }
        self.touch();
        info!(session_id = %self.id, state = ?self.state, "Upload processed");
        Ok(())
    }

    /// Moves the selector. Switching modes discards the previous result.
    pub fn select_mode(&mut self, mode: AnalysisMode) -> Result<(), InvalidTransition> {
        if self.state == SessionState::Idle {
            return Err(self.reject("select a mode", "load the page first"));
        }
        self.touch();
        if mode == self.mode && self.state != SessionState::GeneratingSuggestions {
            return Ok(());
        }
        self.mode = mode;

        if self.resume.is_some() {
            self.reset_downstream();
            self.state = self.ready_state();
        }
        info!(session_id = %self.id, mode = ?mode, state = ?self.state, "Mode selected");
        Ok(())
    }

    /// Job-match trigger. An empty description warns and changes nothing else.
    pub async fn analyze(
        &mut self,
        job_description: &str,
        analyzer: &Analyzer,
    ) -> Result<(), InvalidTransition> {
        let accepts = self.mode == AnalysisMode::JobMatch
            && self.resume.is_some()
            && matches!(
                self.state,
                SessionState::AwaitingJobDescription | SessionState::ResultDisplayed
            );
        if !accepts {
            return Err(self.reject(
                "analyze against a job description",
                "upload a resume and select job-match mode first",
            ));
        }
        self.touch();

        if job_description.trim().is_empty() {
            self.banners.retain(|b| b.message != MISSING_JOB_DESCRIPTION);
            self.banners.push(Banner::warning(MISSING_JOB_DESCRIPTION));
            return Ok(());
        }

        let Some(resume) = self.resume.as_ref() else {
            return Err(self.reject("analyze", "no resume text is available"));
        };
        let outcome = analyzer.analyze_job_match(resume, job_description).await;

        self.reset_downstream();
        self.job_description = Some(job_description.to_string());
        match outcome {
            Ok(report) => {
                self.result = Some(AnalysisResult::job_match(
                    report.to_markdown(),
                    report.alignment_score,
                ));
                self.state = SessionState::ResultDisplayed;
            }
            Err(e) => {
                warn!(session_id = %self.id, "Job-match analysis failed: {e}");
                self.banners.push(Banner::error(e.user_message()));
                self.state = SessionState::AwaitingJobDescription;
            }
        }
        self.touch();
        Ok(())
    }

    /// General-ATS trigger. The session reads GeneratingSuggestions while
    /// the model call is in flight.
    pub async fn generate_suggestions(
        &mut self,
        analyzer: &Analyzer,
    ) -> Result<(), InvalidTransition> {
        let accepts = self.mode == AnalysisMode::GeneralAts
            && matches!(
                self.state,
                SessionState::Uploaded | SessionState::ResultDisplayed
            );
        if !accepts {
            return Err(self.reject(
                "generate ATS suggestions",
                "upload a resume and select general ATS mode first",
            ));
        }
        let Some(resume) = self.resume.clone() else {
            return Err(self.reject("generate ATS suggestions", "no resume text is available"));
        };
        self.touch();

        let pending = InFlight::enter(self, SessionState::GeneratingSuggestions);
        let outcome = analyzer.suggest_ats(&resume).await;

        pending.commit(|session| {
            session.reset_downstream();
            match outcome {
                Ok(text) => {
                    session.result = Some(AnalysisResult::ats_suggestions(text));
                    session.banners.push(Banner::success(SUGGESTIONS_SUCCESS));
                    session.state = SessionState::ResultDisplayed;
                }
                Err(e) => {
                    warn!(session_id = %session.id, "ATS suggestion generation failed: {e}");
                    session.banners.push(Banner::error(e.user_message()));
                    session.state = SessionState::Uploaded;
                }
            }
            session.touch();
        });
        Ok(())
    }

    /// State reached after a successful upload for the current mode.
    fn ready_state(&self) -> SessionState {
        match self.mode {
            AnalysisMode::JobMatch => SessionState::AwaitingJobDescription,
            AnalysisMode::Unset | AnalysisMode::GeneralAts => SessionState::Uploaded,
        }
    }

    /// Drops results and transient banners; keeps the upload confirmation.
    fn reset_downstream(&mut self) {
        self.result = None;
        self.banners.clear();
        if self.resume.is_some() {
            self.banners.push(Banner::success(UPLOAD_SUCCESS));
        }
    }

    fn reject(&self, action: &'static str, hint: &'static str) -> InvalidTransition {
        InvalidTransition {
            action,
            state: self.state,
            hint,
        }
    }
}

/// Holds a session in a transient state for the length of a model call.
/// Dropped without `commit`, as when the request future is cancelled, it
/// puts the previous state back.
struct InFlight<'a> {
    session: Option<&'a mut Session>,
    previous: SessionState,
}

impl<'a> InFlight<'a> {
    fn enter(session: &'a mut Session, transient: SessionState) -> Self {
        let previous = session.state;
        session.state = transient;
        Self {
            session: Some(session),
            previous,
        }
    }

    /// Applies the final outcome; the closure sets the next state.
    fn commit(mut self, apply: impl FnOnce(&mut Session)) {
        if let Some(session) = self.session.take() {
            apply(session);
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.state = self.previous;
        }
    }
}
