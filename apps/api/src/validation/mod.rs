//! Integrity Validator: Diffs a generated profile against its source.
//!
//! Findings are data, never errors: every check contributes issues to a
//! `ValidationReport` and the caller decides what to do with a failed one.
//! Fabrication is an error, omission is a warning.

mod containment;
mod correspondence;

use serde::{Deserialize, Serialize};

use crate::models::profile::{GeneratedProfile, JobContext, SourceProfile};

pub use containment::{normalize, ContainmentPolicy};

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    EmptyContact,
    ContactMismatch,
    ContactOverrideIgnored,
    HallucinatedSkill,
    HallucinatedCertification,
    HallucinatedLanguage,
    ProficiencyChanged,
    OmittedSkill,
    OmittedCertification,
    OmittedLanguage,
    UnmatchedExperience,
    OmittedExperience,
    ExperienceReordered,
    UnmatchedEducation,
    OmittedEducation,
    EducationReordered,
    DateRangeChanged,
    DegreeChanged,
    TitleChanged,
    UnmatchedProject,
    OmittedProject,
}

/// One finding. `item` names the offending entry when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub message: String,
}

/// A contact field whose generated value differs from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactChange {
    pub field: String,
    pub original: String,
    pub generated: String,
    /// The difference is explained by the caller's contact override.
    pub overridden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub contact_diff: Vec<ContactChange>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Accumulates findings while checks run.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    contact_diff: Vec<ContactChange>,
}

impl Findings {
    fn error(&mut self, code: IssueCode, field: &str, item: Option<String>, message: String) {
        self.errors.push(ValidationIssue {
            code,
            field: field.to_string(),
            item,
            message,
        });
    }

    fn warning(&mut self, code: IssueCode, field: &str, item: Option<String>, message: String) {
        self.warnings.push(ValidationIssue {
            code,
            field: field.to_string(),
            item,
            message,
        });
    }

    fn into_report(self) -> ValidationReport {
        ValidationReport {
            passed: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            contact_diff: self.contact_diff,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Compares `generated` against `source`. Pure and deterministic.
pub fn validate(
    source: &SourceProfile,
    generated: &GeneratedProfile,
    job: &JobContext,
    policy: &ContainmentPolicy,
) -> ValidationReport {
    let mut findings = Findings::default();

    check_contact(source, generated, job, &mut findings);
    containment::check(source, generated, policy, &mut findings);
    correspondence::check(source, generated, &mut findings);

    findings.into_report()
}

fn check_contact(
    source: &SourceProfile,
    generated: &GeneratedProfile,
    job: &JobContext,
    findings: &mut Findings,
) {
    if generated.contact.is_empty() {
        findings.error(
            IssueCode::EmptyContact,
            "contact",
            None,
            "generated profile has an empty contact block; generation or repair produced nothing usable"
                .to_string(),
        );
        return;
    }

    let overrides = &job.contact_override;
    for ((field, original), (_, produced)) in source
        .contact
        .scalar_fields()
        .into_iter()
        .zip(generated.contact.scalar_fields())
    {
        let requested = overrides.get(field);
        if produced == original {
            if let Some(requested) = requested.filter(|r| *r != original) {
                findings.warning(
                    IssueCode::ContactOverrideIgnored,
                    &format!("contact.{field}"),
                    None,
                    format!("requested {field} '{requested}' was not applied"),
                );
            }
            continue;
        }

        let overridden = requested == Some(produced);
        findings.contact_diff.push(ContactChange {
            field: field.to_string(),
            original: original.to_string(),
            generated: produced.to_string(),
            overridden,
        });
        if !overridden {
            findings.error(
                IssueCode::ContactMismatch,
                &format!("contact.{field}"),
                Some(produced.to_string()),
                format!("{field} changed from '{original}' to '{produced}'"),
            );
        }
    }

    let source_links = &source.contact.links;
    let generated_links = &generated.contact.links;
    for i in 0..source_links.len().max(generated_links.len()) {
        let original = source_links.get(i).map(String::as_str).unwrap_or("");
        let produced = generated_links.get(i).map(String::as_str).unwrap_or("");
        if original == produced {
            continue;
        }
        let field = format!("links[{i}]");
        findings.contact_diff.push(ContactChange {
            field: field.clone(),
            original: original.to_string(),
            generated: produced.to_string(),
            overridden: false,
        });
        findings.error(
            IssueCode::ContactMismatch,
            &format!("contact.{field}"),
            Some(produced.to_string()),
            format!("link changed from '{original}' to '{produced}'"),
        );
    }
}
