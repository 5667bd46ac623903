// All LLM prompt templates for resume analysis.
// Placeholders are filled by `llm_client::prompts::render`.

/// Alignment scoring prompt. Replace `{resume_text}`, `{job_description}`.
/// Paired with `llm_client::prompts::JSON_ONLY_SYSTEM`.
pub const ALIGNMENT_SCORE_PROMPT: &str = r#"As an experienced Technical Human Resource Manager, rate how well the candidate's resume aligns with the job description.

CANDIDATE RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Return a JSON object with this EXACT schema (no extra fields):
{
  "alignment_score": 7
}

Rules:
1. alignment_score is a whole number from 1 (no alignment) to 10 (ideal candidate)
2. Judge only on evidence present in the resume
3. Return ONLY the JSON object, with no code fences."#;

/// Job-match evaluation prompt.
/// Replace: {resume_text}, {job_description}, {alignment_score}
pub const JOB_MATCH_EVALUATION_PROMPT: &str = r#"As an experienced Technical Human Resource Manager, provide a detailed professional evaluation of the candidate's resume : {resume_text} against the job description: {job_description}.

The candidate's overall alignment with the role has already been scored {alignment_score}/10. Report exactly this score and keep the final verdict consistent with it.

Please analyze:
    1. Overall alignment with the role, on a scale of 1-10
    2. Key strengths and qualifications that match
    3. Notable gaps or areas for improvement
    4. Specific recommendations for enhancing the resume
    5. Final verdict on suitability for the role

Format the response with clear headings and professional language."#;

/// Interview preparation prompt, sent only when the score clears the threshold.
/// Replace: {resume_text}, {job_description}, {alignment_score}
pub const INTERVIEW_PREP_PROMPT: &str = r#"A candidate's resume scored {alignment_score}/10 against the job description below and is moving forward.

CANDIDATE RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Provide a brief roadmap for the candidate to prepare for the interview:
    1. Preparation steps in priority order
    2. Sample interview questions likely for this role
    3. Key points from the resume to highlight in answers

Format the response with clear headings and professional language."#;

/// Fixed guidance for scores below the threshold. Replace: {alignment_score}, {threshold}
pub const RESUBMISSION_NOTICE: &str = "The alignment score of {alignment_score}/10 is below the \
    interview-readiness threshold of {threshold}/10. Make the suggested changes to your resume \
    and apply again.";

/// General ATS analysis prompt. Replace `{resume_text}`.
/// Must not mention a job description.
pub const ATS_SUGGESTIONS_PROMPT: &str = r#"As an ATS (Applicant Tracking System) expert, analyze the following resume: {resume_text}

Provide:
    1. Overall resume score (%)
    2. Resume format and structure analysis
    3. Specific keywords found
    4. Overall strengths and weaknesses
    5. Specific recommendations for improvement

Start with the percentage match prominently displayed.
At the end, create a more cleaner and structured resume that is more likely to be selected by the ATS."#;
