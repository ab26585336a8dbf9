//! Template Renderer: Projects a validated profile into a document.
//!
//! Rendering is a pure function of (profile, template): the same inputs always
//! produce byte-identical output. Only a profile whose validation passed, or
//! one explicitly forced with its findings attached as warnings, can be
//! rendered.

mod document;
mod engine;
mod escape;
pub mod handlers;
mod templates;

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::models::profile::GeneratedProfile;
use crate::validation::ValidationReport;
use escape::Markup;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateRenderError {
    #[error("unknown template '{0}' (expected one of: classic, modern, brilliant, html, markdown)")]
    UnknownTemplate(String),

    #[error("required field '{0}' is empty")]
    MissingField(String),

    #[error("profile failed validation with {errors} errors; pass force to render anyway")]
    ValidationFailed { errors: usize },

    #[error("template '{template}' is malformed: {reason}")]
    Malformed { template: &'static str, reason: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Template registry
// ────────────────────────────────────────────────────────────────────────────

/// Closed set of built-in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    Classic,
    Modern,
    Brilliant,
    Html,
    Markdown,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        Self::Classic,
        Self::Modern,
        Self::Brilliant,
        Self::Html,
        Self::Markdown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Brilliant => "brilliant",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    /// Alternative names accepted by `from_str`, besides the id itself.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Classic => &["simple", "resume"],
            Self::Modern => &[],
            Self::Brilliant => &["brilliant-cv"],
            Self::Html => &["web"],
            Self::Markdown => &["md"],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Classic => "Single-column Typst layout",
            Self::Modern => "Typst layout with a two-column header",
            Self::Brilliant => "Typst layout with section icons and skill chips",
            Self::Html => "Standalone HTML document",
            Self::Markdown => "Plain Markdown",
        }
    }

    pub fn markup(self) -> Markup {
        match self {
            Self::Classic | Self::Modern | Self::Brilliant => Markup::Typst,
            Self::Html => Markup::Html,
            Self::Markdown => Markup::Markdown,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self.markup() {
            Markup::Typst => "text/vnd.typst; charset=utf-8",
            Markup::Html => "text/html; charset=utf-8",
            Markup::Markdown => "text/markdown; charset=utf-8",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::Classic => templates::CLASSIC,
            Self::Modern => templates::MODERN,
            Self::Brilliant => templates::BRILLIANT,
            Self::Html => templates::HTML,
            Self::Markdown => templates::MARKDOWN,
        }
    }
}

impl FromStr for TemplateId {
    type Err = TemplateRenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted || id.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| TemplateRenderError::UnknownTemplate(s.trim().to_string()))
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// A generated profile cleared for rendering.
#[derive(Debug, Clone)]
pub struct ValidatedProfile<'a> {
    profile: &'a GeneratedProfile,
    warnings: Vec<String>,
}

impl<'a> ValidatedProfile<'a> {
    /// Accepts a profile whose report passed. Its warnings travel with it.
    pub fn accept(
        profile: &'a GeneratedProfile,
        report: &ValidationReport,
    ) -> Result<Self, TemplateRenderError> {
        if !report.passed {
            return Err(TemplateRenderError::ValidationFailed {
                errors: report.error_count(),
            });
        }
        Ok(Self {
            profile,
            warnings: report.warnings.iter().map(|w| w.message.clone()).collect(),
        })
    }

    /// Accepts any profile; errors and warnings are all surfaced as warnings.
    pub fn force(profile: &'a GeneratedProfile, report: &ValidationReport) -> Self {
        Self {
            profile,
            warnings: report
                .errors
                .iter()
                .chain(&report.warnings)
                .map(|issue| issue.message.clone())
                .collect(),
        }
    }
}

/// Immutable output of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    template_id: TemplateId,
    content: Bytes,
    warnings: Vec<String>,
}

impl RenderedArtifact {
    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_type(&self) -> &'static str {
        self.template_id.content_type()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}

/// Renders a validated profile. The four scalar contact fields must be
/// non-empty. Links are not checked here: a link the source has but the
/// profile dropped already fails validation as a contact mismatch, so it only
/// reaches this point through `force`.
pub fn render(
    validated: &ValidatedProfile<'_>,
    template: TemplateId,
) -> Result<RenderedArtifact, TemplateRenderError> {
    let profile = validated.profile;
    for (field, value) in profile.contact.scalar_fields() {
        if value.trim().is_empty() {
            return Err(TemplateRenderError::MissingField(format!("contact.{field}")));
        }
    }

    let tokens = engine::parse(template.source()).map_err(|e| TemplateRenderError::Malformed {
        template: template.as_str(),
        reason: e.to_string(),
    })?;
    let content = engine::render(&tokens, &document::document(profile), template.markup());

    Ok(RenderedArtifact {
        template_id: template,
        content: Bytes::from(content),
        warnings: validated.warnings.clone(),
    })
}
