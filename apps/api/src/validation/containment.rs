//! Set containment for skills, certifications and languages.
//!
//! Matching is deliberately shallow: case folding and whitespace collapsing
//! only. Anything looser has to be granted explicitly through aliases.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::{Findings, IssueCode};
use crate::models::profile::{Language, Profile};

/// Case-folds and collapses internal whitespace.
pub fn normalize(item: &str) -> String {
    item.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Explicit inference allowances: a generated item accepted when any of the
/// listed source items is present. Empty means strict containment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainmentPolicy {
    aliases: BTreeMap<String, Vec<String>>,
}

impl ContainmentPolicy {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: &BTreeMap<String, Vec<String>>) -> Self {
        Self {
            aliases: aliases
                .iter()
                .map(|(generated, sources)| {
                    (normalize(generated), sources.iter().map(|s| normalize(s)).collect())
                })
                .collect(),
        }
    }

    /// Source items (normalized) that justify `generated`, if any.
    fn justifying<'a>(&'a self, generated: &str, source: &HashSet<String>) -> Vec<&'a str> {
        self.aliases
            .get(generated)
            .map(|sources| {
                sources
                    .iter()
                    .filter(|s| source.contains(s.as_str()))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Which list is being compared. Selects issue codes and field names.
#[derive(Debug, Clone, Copy)]
enum ItemKind {
    Skill,
    Certification,
    Language,
}

impl ItemKind {
    fn field(self) -> &'static str {
        match self {
            Self::Skill => "skills",
            Self::Certification => "certifications",
            Self::Language => "languages",
        }
    }

    fn hallucinated(self) -> IssueCode {
        match self {
            Self::Skill => IssueCode::HallucinatedSkill,
            Self::Certification => IssueCode::HallucinatedCertification,
            Self::Language => IssueCode::HallucinatedLanguage,
        }
    }

    fn omitted(self) -> IssueCode {
        match self {
            Self::Skill => IssueCode::OmittedSkill,
            Self::Certification => IssueCode::OmittedCertification,
            Self::Language => IssueCode::OmittedLanguage,
        }
    }
}

pub(super) fn check(source: &Profile, generated: &Profile, policy: &ContainmentPolicy, findings: &mut Findings) {
    check_items(
        ItemKind::Skill,
        source.skills.iter(),
        generated.skills.iter(),
        policy,
        findings,
    );
    check_items(
        ItemKind::Certification,
        source.certifications.iter(),
        generated.certifications.iter(),
        policy,
        findings,
    );
    check_items(
        ItemKind::Language,
        source.languages.iter().map(|l| &l.name),
        generated.languages.iter().map(|l| &l.name),
        policy,
        findings,
    );
    check_proficiency(&source.languages, &generated.languages, findings);
}

fn check_items<'a>(
    kind: ItemKind,
    source: impl Iterator<Item = &'a String>,
    generated: impl Iterator<Item = &'a String>,
    policy: &ContainmentPolicy,
    findings: &mut Findings,
) {
    // normalized → first spelling seen, in source order
    let mut source_items: Vec<(String, &str)> = Vec::new();
    let mut source_set: HashSet<String> = HashSet::new();
    for item in source.filter(|s| !s.trim().is_empty()) {
        let key = normalize(item);
        if source_set.insert(key.clone()) {
            source_items.push((key, item.as_str()));
        }
    }

    let mut covered: HashSet<String> = HashSet::new();
    let mut reported: HashSet<String> = HashSet::new();
    for item in generated.filter(|s| !s.trim().is_empty()) {
        let key = normalize(item);
        if source_set.contains(&key) {
            covered.insert(key);
            continue;
        }
        let justifying = policy.justifying(&key, &source_set);
        if !justifying.is_empty() {
            covered.extend(justifying.into_iter().map(String::from));
            continue;
        }
        if reported.insert(key) {
            findings.error(
                kind.hallucinated(),
                kind.field(),
                Some(item.clone()),
                format!("'{item}' is not present in the source profile"),
            );
        }
    }

    for (key, original) in source_items {
        if !covered.contains(&key) {
            findings.warning(
                kind.omitted(),
                kind.field(),
                Some(original.to_string()),
                format!("'{original}' from the source profile was omitted"),
            );
        }
    }
}

fn check_proficiency(source: &[Language], generated: &[Language], findings: &mut Findings) {
    let source_levels: HashMap<String, &Language> =
        source.iter().map(|l| (normalize(&l.name), l)).collect();

    for lang in generated {
        let Some(original) = source_levels.get(&normalize(&lang.name)) else {
            continue;
        };
        if !lang.proficiency.trim().is_empty()
            && normalize(&lang.proficiency) != normalize(&original.proficiency)
        {
            findings.error(
                IssueCode::ProficiencyChanged,
                "languages",
                Some(lang.name.clone()),
                format!(
                    "proficiency for '{}' changed from '{}' to '{}'",
                    lang.name, original.proficiency, lang.proficiency
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Skills;

    fn profile_with_skills(hard: &[&str], soft: &[&str]) -> Profile {
        Profile {
            skills: Skills {
                hard: hard.iter().map(|s| s.to_string()).collect(),
                soft: soft.iter().map(|s| s.to_string()).collect(),
            },
            ..Default::default()
        }
    }

    fn run(source: &Profile, generated: &Profile, policy: &ContainmentPolicy) -> Findings {
        let mut findings = Findings::default();
        check(source, generated, policy, &mut findings);
        findings
    }

    #[test]
    fn test_normalize_folds_case_and_whitespace() {
        assert_eq!(normalize("  Machine   Learning "), "machine learning");
        assert_eq!(normalize("PYTHON"), "python");
    }

    #[test]
    fn test_regrouping_between_hard_and_soft_is_allowed() {
        let source = profile_with_skills(&["Python", "Teamwork"], &[]);
        let generated = profile_with_skills(&["python"], &["teamwork"]);
        let findings = run(&source, &generated, &ContainmentPolicy::strict());
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn test_inferred_skill_is_fabrication_without_alias() {
        let source = profile_with_skills(&["spreadsheets"], &[]);
        let generated = profile_with_skills(&["Excel"], &[]);
        let findings = run(&source, &generated, &ContainmentPolicy::strict());
        assert_eq!(findings.errors.len(), 1);
        assert_eq!(findings.errors[0].code, IssueCode::HallucinatedSkill);
        assert_eq!(findings.warnings.len(), 1);
        assert_eq!(findings.warnings[0].code, IssueCode::OmittedSkill);
    }

    #[test]
    fn test_alias_allows_configured_inference() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Excel".to_string(), vec!["Spreadsheets".to_string()]);
        let policy = ContainmentPolicy::with_aliases(&aliases);

        let source = profile_with_skills(&["spreadsheets"], &[]);
        let generated = profile_with_skills(&["Excel"], &[]);
        let findings = run(&source, &generated, &policy);
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty(), "alias use covers the source item");
    }

    #[test]
    fn test_alias_needs_source_item_present() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Excel".to_string(), vec!["spreadsheets".to_string()]);
        let policy = ContainmentPolicy::with_aliases(&aliases);

        let source = profile_with_skills(&["Python"], &[]);
        let generated = profile_with_skills(&["Python", "Excel"], &[]);
        let findings = run(&source, &generated, &policy);
        assert_eq!(findings.errors.len(), 1);
    }

    #[test]
    fn test_duplicate_hallucination_reported_once() {
        let source = profile_with_skills(&["Python"], &[]);
        let generated = profile_with_skills(&["Python", "Go"], &["go"]);
        let findings = run(&source, &generated, &ContainmentPolicy::strict());
        assert_eq!(findings.errors.len(), 1);
    }

    #[test]
    fn test_language_and_proficiency() {
        let source = Profile {
            languages: vec![Language::new("English", "Native"), Language::new("German", "B1")],
            ..Default::default()
        };
        let generated = Profile {
            languages: vec![
                Language::new("English", "native"),
                Language::new("German", "C2"),
                Language::new("French", "B2"),
            ],
            ..Default::default()
        };
        let findings = run(&source, &generated, &ContainmentPolicy::strict());
        let codes: Vec<IssueCode> = findings.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains(&IssueCode::HallucinatedLanguage));
        assert!(codes.contains(&IssueCode::ProficiencyChanged));
    }

    #[test]
    fn test_certification_omission_is_warning() {
        let source = Profile {
            certifications: vec!["AWS SAA".to_string(), "CKA".to_string()],
            ..Default::default()
        };
        let generated = Profile {
            certifications: vec!["aws  saa".to_string()],
            ..Default::default()
        };
        let findings = run(&source, &generated, &ContainmentPolicy::strict());
        assert!(findings.errors.is_empty());
        assert_eq!(findings.warnings.len(), 1);
        assert_eq!(findings.warnings[0].item.as_deref(), Some("CKA"));
    }
}
