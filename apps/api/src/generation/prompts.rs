// All LLM prompt constants for the generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::generation::analysis::JobAnalysis;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::Prompt;
use crate::models::profile::{JobContext, SourceProfile};

/// Keywords passed to the generator as emphasis hints.
const EMPHASIS_KEYWORDS: usize = 15;

/// System prompt for CV optimization.
pub const OPTIMIZE_SYSTEM: &str = "You are an expert CV writer tailoring an existing CV \
    to a target job. You rewrite wording and ordering of bullets for relevance; \
    you never change facts.";

/// Optimization prompt template.
/// Replace: {grounding_instruction}, {contact_instruction}, {keywords},
///          {requirements}, {company}, {role}, {job_description}, {source_json}
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Rewrite the SOURCE CV for the TARGET JOB and return it as ONE JSON object with this EXACT schema:
{
  "contact": {"name": "", "email": "", "phone": "", "address": "", "links": [""]},
  "headline": "",
  "summary": "",
  "experience": [
    {"title": "", "organization": "", "location": "", "start_date": "", "end_date": "", "bullets": [""]}
  ],
  "education": [
    {"degree": "", "institution": "", "location": "", "start_date": "", "end_date": "", "details": [""]}
  ],
  "skills": {"hard": [""], "soft": [""]},
  "certifications": [""],
  "languages": [{"name": "", "proficiency": ""}],
  "projects": [
    {"name": "", "description": "", "technologies": [""], "link": "", "bullets": [""]}
  ]
}

HARD RULES:
- Copy the contact block EXACTLY, character for character.{contact_instruction}
- Keep every experience and education entry with its organization/institution, start date and end date unchanged, in the SOURCE order. You may drop an entry only if it is irrelevant.
- Skills, certifications and languages: only items from the SOURCE CV. You may reorder them and move skills between "hard" and "soft". Keep language proficiency labels unchanged.
- Projects: only projects from the SOURCE CV, identified by the same name.
- Rewrite summary and bullets to emphasise what is relevant. Do not add numbers, tools or responsibilities that are not in the SOURCE CV.
- If a keyword below is not supported by the SOURCE CV, leave it out. Never add it.

KEYWORDS TO EMPHASISE (only where the SOURCE CV already supports them):
{keywords}

KEY REQUIREMENTS:
{requirements}

TARGET JOB:
Company: {company}
Role: {role}
{job_description}

SOURCE CV (JSON):
{source_json}"#;

/// Builds the optimization prompt for one request.
pub fn build_optimize_prompt(
    source: &SourceProfile,
    job: &JobContext,
    analysis: &JobAnalysis,
) -> Result<Prompt, serde_json::Error> {
    let source_json = serde_json::to_string_pretty(source)?;

    let keywords = analysis.top_keywords(EMPHASIS_KEYWORDS);
    let keywords = if keywords.is_empty() {
        "(none extracted)".to_string()
    } else {
        keywords.join(", ")
    };

    let requirements = if analysis.hard_requirements.is_empty() {
        "(none extracted)".to_string()
    } else {
        analysis
            .hard_requirements
            .iter()
            .map(|r| format!("- {}", r.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user = OPTIMIZE_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{contact_instruction}", &contact_instruction(job))
        .replace("{keywords}", &keywords)
        .replace("{requirements}", &requirements)
        .replace("{company}", or_unspecified(&job.company))
        .replace("{role}", or_unspecified(&job.role))
        .replace("{job_description}", &job.description)
        .replace("{source_json}", &source_json);

    Ok(Prompt {
        system: format!("{OPTIMIZE_SYSTEM} {JSON_ONLY_SYSTEM}"),
        user,
    })
}

/// Per-field replacements requested by the caller, e.g. a preferred email.
fn contact_instruction(job: &JobContext) -> String {
    let overrides: Vec<String> = ["name", "email", "phone", "address"]
        .iter()
        .filter_map(|field| {
            job.contact_override
                .get(field)
                .map(|value| format!("\n  EXCEPTION: {} TO USE: {value}", field.to_uppercase()))
        })
        .collect();
    overrides.concat()
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not specified)"
    } else {
        value
    }
}
