//! Candidate profile data model.
//!
//! `Profile` is the shared shape. `SourceProfile` wraps it as frozen ground truth,
//! `GeneratedProfile` wraps it as an untrusted hypothesis emitted by the generator.
//! Neither wrapper exposes mutable access after construction.

use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::lenient;

// ────────────────────────────────────────────────────────────────────────────
// Shared shape
// ────────────────────────────────────────────────────────────────────────────

/// Contact block. Every field is a plain string compared byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBlock {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, alias = "location", deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub links: Vec<String>,
}

impl ContactBlock {
    /// True when no contact field carries any content.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.email.trim().is_empty()
            && self.phone.trim().is_empty()
            && self.address.trim().is_empty()
            && self.links.iter().all(|l| l.trim().is_empty())
    }

    /// Scalar fields as `(field_name, value)` pairs, in display order.
    pub fn scalar_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("address", self.address.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, alias = "job_title", deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, alias = "company", deserialize_with = "lenient::string")]
    pub organization: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub end_date: String,
    #[serde(default, alias = "four_tasks", deserialize_with = "lenient::string_list")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub degree: String,
    #[serde(default, alias = "school", deserialize_with = "lenient::string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub details: Vec<String>,
}

/// Skills partitioned into hard and soft.
///
/// Decodes either `{"hard": [...], "soft": [...]}` (also `hard_skills`/`soft_skills`)
/// or a flat list, which is treated as hard skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Skills {
    pub hard: Vec<String>,
    pub soft: Vec<String>,
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        self.hard.is_empty() && self.soft.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.hard.iter().chain(self.soft.iter())
    }
}

impl<'de> Deserialize<'de> for Skills {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Partitioned {
            #[serde(default, alias = "hard_skills", deserialize_with = "lenient::string_list")]
            hard: Vec<String>,
            #[serde(default, alias = "soft_skills", deserialize_with = "lenient::string_list")]
            soft: Vec<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            // Flat must be tried first: a derived struct also accepts sequences.
            Flat(Vec<serde_json::Value>),
            Text(String),
            Nothing(()),
            Partitioned(Partitioned),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Partitioned(p) => Skills {
                hard: p.hard,
                soft: p.soft,
            },
            Shape::Flat(items) => Skills {
                hard: items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
                    .filter(|s| !s.is_empty())
                    .collect(),
                soft: Vec::new(),
            },
            Shape::Text(text) => Skills {
                hard: lenient::split_list(&text),
                soft: Vec::new(),
            },
            Shape::Nothing(()) => Skills::default(),
        })
    }
}

/// A spoken language with its proficiency label.
///
/// Also decodes the compact `"English (Native)"` string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: String,
    pub proficiency: String,
}

impl Language {
    pub fn new(name: &str, proficiency: &str) -> Self {
        Self {
            name: name.to_string(),
            proficiency: proficiency.to_string(),
        }
    }

    fn from_compact(text: &str) -> Self {
        let text = text.trim();
        match (text.find('('), text.rfind(')')) {
            (Some(open), Some(close)) if open < close => Self {
                name: text[..open].trim().to_string(),
                proficiency: text[open + 1..close].trim().to_string(),
            },
            _ => match text.split_once(" - ").or_else(|| text.split_once(':')) {
                Some((name, level)) => Self::new(name.trim(), level.trim()),
                None => Self::new(text, ""),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Full {
            #[serde(default, alias = "language", deserialize_with = "lenient::string")]
            name: String,
            #[serde(default, alias = "level", deserialize_with = "lenient::string")]
            proficiency: String,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Full(Full),
            Compact(String),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Full(f) => Language {
                name: f.name,
                proficiency: f.proficiency,
            },
            Shape::Compact(s) => Language::from_compact(&s),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, alias = "project_name", deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, alias = "tech_stack", deserialize_with = "lenient::string_list")]
    pub technologies: Vec<String>,
    #[serde(default, alias = "url", deserialize_with = "lenient::string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub bullets: Vec<String>,
}

/// The common profile structure shared by source and generated profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, alias = "user_information", deserialize_with = "lenient::or_default")]
    pub contact: ContactBlock,
    #[serde(default, alias = "main_job_title", deserialize_with = "lenient::string")]
    pub headline: String,
    #[serde(default, alias = "profile_description", deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(default, alias = "experiences", deserialize_with = "lenient::vec_or_null")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "lenient::vec_or_null")]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default, alias = "certificate", deserialize_with = "lenient::string_list")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_null")]
    pub languages: Vec<Language>,
    #[serde(default, deserialize_with = "lenient::vec_or_null")]
    pub projects: Vec<Project>,
}

// ────────────────────────────────────────────────────────────────────────────
// Source / generated wrappers
// ────────────────────────────────────────────────────────────────────────────

/// Original candidate data. Frozen baseline for every comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceProfile(Profile);

impl SourceProfile {
    pub fn new(profile: Profile) -> Self {
        Self(profile)
    }
}

impl Deref for SourceProfile {
    type Target = Profile;

    fn deref(&self) -> &Profile {
        &self.0
    }
}

/// Generator hypothesis. Untrusted until validated; never structurally altered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedProfile(Profile);

impl GeneratedProfile {
    pub fn new(profile: Profile) -> Self {
        Self(profile)
    }

    /// Placeholder produced when repair recovers an empty document.
    pub fn empty() -> Self {
        Self(Profile::default())
    }
}

impl Deref for GeneratedProfile {
    type Target = Profile;

    fn deref(&self) -> &Profile {
        &self.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job context
// ────────────────────────────────────────────────────────────────────────────

/// Caller-supplied replacement values for contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactOverride {
    /// Override value for a scalar contact field, if one was supplied.
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => self.name.as_deref(),
            "email" => self.email.as_deref(),
            "phone" => self.phone.as_deref(),
            "address" => self.address.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        ["name", "email", "phone", "address"]
            .iter()
            .all(|f| self.get(f).is_none())
    }
}

/// Target job. Immutable once constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(alias = "job_description")]
    pub description: String,
    #[serde(default)]
    pub contact_override: ContactOverride,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_decodes_legacy_field_names() {
        let json = r#"{
            "user_information": {"name": "Jane Doe", "email": "jane@example.com"},
            "main_job_title": "Backend Engineer",
            "profile_description": "Builds APIs.",
            "experiences": [{
                "job_title": "Senior Engineer",
                "company": "Tech Corp",
                "start_date": "01/2020",
                "end_date": "Present",
                "four_tasks": ["Built scalable APIs."]
            }],
            "skills": {"hard_skills": ["Rust"], "soft_skills": ["Leadership"]},
            "certificate": ["AWS SAA"]
        }"#;
        let p: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(p.contact.name, "Jane Doe");
        assert_eq!(p.headline, "Backend Engineer");
        assert_eq!(p.experience[0].organization, "Tech Corp");
        assert_eq!(p.experience[0].bullets, vec!["Built scalable APIs."]);
        assert_eq!(p.skills.hard, vec!["Rust"]);
        assert_eq!(p.skills.soft, vec!["Leadership"]);
        assert_eq!(p.certifications, vec!["AWS SAA"]);
    }

    #[test]
    fn test_flat_skill_list_is_hard_skills() {
        let p: Profile = serde_json::from_str(r#"{"skills": ["Python", "Docker"]}"#).unwrap();
        assert_eq!(p.skills.hard, vec!["Python", "Docker"]);
        assert!(p.skills.soft.is_empty());
    }

    #[test]
    fn test_skills_as_text() {
        let p: Profile = serde_json::from_str(r#"{"skills": "Python, Docker"}"#).unwrap();
        assert_eq!(p.skills.hard, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_null_skills_and_lists() {
        let p: Profile = serde_json::from_str(
            r#"{"contact": null, "skills": null, "experience": null, "languages": null}"#,
        )
        .unwrap();
        assert!(p.contact.is_empty());
        assert!(p.skills.is_empty());
        assert!(p.experience.is_empty());
        assert!(p.languages.is_empty());
    }

    #[test]
    fn test_language_compact_form() {
        let p: Profile =
            serde_json::from_str(r#"{"languages": ["English (Native)", {"name": "German", "proficiency": "B1"}]}"#)
                .unwrap();
        assert_eq!(p.languages[0], Language::new("English", "Native"));
        assert_eq!(p.languages[1], Language::new("German", "B1"));
    }

    #[test]
    fn test_language_without_level() {
        assert_eq!(Language::from_compact("Tatar"), Language::new("Tatar", ""));
        assert_eq!(
            Language::from_compact("Russian - Native"),
            Language::new("Russian", "Native")
        );
    }

    #[test]
    fn test_contact_block_is_empty() {
        assert!(ContactBlock::default().is_empty());
        let c = ContactBlock {
            links: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(c.is_empty());
        let c = ContactBlock {
            phone: "+1 555-0123".to_string(),
            ..Default::default()
        };
        assert!(!c.is_empty());
    }

    #[test]
    fn test_contact_override_ignores_blank_values() {
        let o = ContactOverride {
            email: Some("  ".to_string()),
            phone: Some("+31 6 1234".to_string()),
            ..Default::default()
        };
        assert_eq!(o.get("email"), None);
        assert_eq!(o.get("phone"), Some("+31 6 1234"));
        assert!(!o.is_empty());
        assert!(ContactOverride::default().is_empty());
    }

    #[test]
    fn test_source_profile_serializes_transparently() {
        let source = SourceProfile::new(Profile {
            headline: "Engineer".to_string(),
            ..Default::default()
        });
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["headline"], "Engineer");
        let back: SourceProfile = serde_json::from_value(value).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn test_job_context_requires_description() {
        let result: Result<JobContext, _> = serde_json::from_str(r#"{"company": "Acme"}"#);
        assert!(result.is_err());
        let job: JobContext =
            serde_json::from_str(r#"{"job_description": "Rust engineer"}"#).unwrap();
        assert_eq!(job.description, "Rust engineer");
        assert!(job.contact_override.is_empty());
    }
}
