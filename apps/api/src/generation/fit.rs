//! Fit report: Keyword coverage of the source profile against a job analysis.
//!
//! Algorithm:
//! 1. For each keyword in `JobAnalysis.keyword_inventory`:
//!    - skill exact (normalized) match → strength 1.0
//!    - whole-word mention in headline, summary, experience, projects or
//!      certifications → strength 0.6
//!    - no match → strength 0.0
//! 2. overall_score = Σ(strength × weighted_score) / Σ(weighted_score) × 100
//! 3. Classify: strong (≥0.8), partial (0.4–0.79), gap (<0.4)
//!
//! Gaps are reported, never filled: the generator is told to emphasise what
//! exists, not to add what is missing.

use serde::{Deserialize, Serialize};

use crate::generation::analysis::JobAnalysis;
use crate::models::profile::Profile;
use crate::validation::normalize;

/// A keyword covered by the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMatch {
    pub keyword: String,
    /// Where the profile covers it.
    pub evidence: String,
    pub strength: f32, // 0.0 – 1.0
}

/// A keyword the profile does not cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub keyword: String,
    pub jd_frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub overall_score: u32,             // 0-100
    pub strong_matches: Vec<FitMatch>,  // strength ≥ 0.8
    pub partial_matches: Vec<FitMatch>, // 0.4 – 0.79
    pub gaps: Vec<Gap>,                 // strength < 0.4
    pub recommendation: String,
}

impl FitReport {
    /// Keywords the profile covers, strong first.
    pub fn matched_keywords(&self) -> Vec<&str> {
        self.strong_matches
            .iter()
            .chain(&self.partial_matches)
            .map(|m| m.keyword.as_str())
            .collect()
    }
}

pub fn score_fit(profile: &Profile, analysis: &JobAnalysis) -> FitReport {
    let keywords = &analysis.keyword_inventory;

    if keywords.is_empty() {
        return FitReport {
            overall_score: 0,
            strong_matches: vec![],
            partial_matches: vec![],
            gaps: vec![],
            recommendation: "No keywords found in the job description; cannot score fit.".to_string(),
        };
    }

    let skills: Vec<String> = profile.skills.iter().map(|s| normalize(s)).collect();
    let passages = passages(profile);

    let mut strong_matches = Vec::new();
    let mut partial_matches = Vec::new();
    let mut gaps = Vec::new();
    let mut total_weighted = 0.0_f32;
    let mut total_score = 0.0_f32;

    for kw_entry in keywords {
        let keyword = normalize(&kw_entry.keyword);
        total_weighted += kw_entry.weighted_score;

        let (strength, evidence) = if skills.contains(&keyword) {
            (1.0, "skills".to_string())
        } else if let Some((origin, _)) = passages
            .iter()
            .find(|(_, text)| contains_term(text, &keyword))
        {
            (0.6, origin.clone())
        } else {
            (0.0, String::new())
        };

        total_score += strength * kw_entry.weighted_score;

        if strength >= 0.8 {
            strong_matches.push(FitMatch {
                keyword: kw_entry.keyword.clone(),
                evidence,
                strength,
            });
        } else if strength >= 0.4 {
            partial_matches.push(FitMatch {
                keyword: kw_entry.keyword.clone(),
                evidence,
                strength,
            });
        } else {
            gaps.push(Gap {
                keyword: kw_entry.keyword.clone(),
                jd_frequency: kw_entry.frequency,
            });
        }
    }

    let overall_score = if total_weighted > 0.0 {
        ((total_score / total_weighted) * 100.0).round() as u32
    } else {
        0
    };

    FitReport {
        overall_score,
        recommendation: build_recommendation(overall_score, &gaps),
        strong_matches,
        partial_matches,
        gaps,
    }
}

/// Lower-cased free-text passages with a label saying where each came from.
fn passages(profile: &Profile) -> Vec<(String, String)> {
    let mut out = vec![
        ("headline".to_string(), profile.headline.to_lowercase()),
        ("summary".to_string(), profile.summary.to_lowercase()),
    ];
    for exp in &profile.experience {
        let text = std::iter::once(exp.title.as_str())
            .chain(exp.bullets.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        out.push((format!("experience: {}", exp.organization), text.to_lowercase()));
    }
    for project in &profile.projects {
        let text = std::iter::once(project.description.as_str())
            .chain(project.technologies.iter().map(String::as_str))
            .chain(project.bullets.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n");
        out.push((format!("project: {}", project.name), text.to_lowercase()));
    }
    out.push(("certifications".to_string(), profile.certifications.join("\n").to_lowercase()));
    out
}

/// Whole-word containment: `go` matches "in Go," but not "good".
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Builds a human-readable recommendation string from score and gaps.
fn build_recommendation(score: u32, gaps: &[Gap]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(|g| g.keyword.as_str()).collect();

    if score >= 80 {
        "Strong fit. The profile directly covers the key requirements.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate fit ({score}/100). Not covered by the profile: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}. These are reported only and will not be added.",
            top_gaps.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::analysis::KeywordEntry;
    use crate::models::profile::{ExperienceEntry, Skills};

    fn analysis(keywords: Vec<(&str, u32, f32)>) -> JobAnalysis {
        JobAnalysis {
            keyword_inventory: keywords
                .into_iter()
                .map(|(kw, freq, pw)| KeywordEntry {
                    keyword: kw.to_string(),
                    frequency: freq,
                    position_weight: pw,
                    weighted_score: freq as f32 * pw,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn profile(skills: &[&str], bullets: &[&str]) -> Profile {
        Profile {
            skills: Skills {
                hard: skills.iter().map(|s| s.to_string()).collect(),
                soft: vec![],
            },
            experience: vec![ExperienceEntry {
                organization: "Tech Corp".to_string(),
                bullets: bullets.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_perfect_skill_match_scores_strong() {
        let report = score_fit(
            &profile(&["Rust", "Distributed Systems"], &[]),
            &analysis(vec![("rust", 5, 0.8), ("distributed systems", 3, 0.6)]),
        );
        assert!(report.overall_score >= 80, "Expected ≥80, got {}", report.overall_score);
        assert_eq!(report.strong_matches.len(), 2);
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_text_match_scores_partial() {
        let report = score_fit(
            &profile(&[], &["Ran Kubernetes deployments for 40 services"]),
            &analysis(vec![("Kubernetes", 3, 0.8)]),
        );
        assert_eq!(report.partial_matches.len(), 1);
        assert_eq!(report.partial_matches[0].evidence, "experience: Tech Corp");
        assert!(report.strong_matches.is_empty());
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_no_match_creates_gap() {
        let report = score_fit(&profile(&["Python"], &[]), &analysis(vec![("Rust", 5, 0.8)]));
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].keyword, "Rust");
        assert_eq!(report.gaps[0].jd_frequency, 5);
        assert_eq!(report.overall_score, 0);
    }

    #[test]
    fn test_partial_word_is_not_a_mention() {
        let report = score_fit(
            &profile(&[], &["Good communication with stakeholders"]),
            &analysis(vec![("Go", 1, 1.0)]),
        );
        assert_eq!(report.gaps.len(), 1);
    }

    #[test]
    fn test_empty_keywords_returns_zero_score() {
        let report = score_fit(&profile(&["Rust"], &[]), &analysis(vec![]));
        assert_eq!(report.overall_score, 0);
        assert!(report.strong_matches.is_empty());
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_overall_score_bounded_0_to_100() {
        let report = score_fit(
            &profile(&["Rust"], &[]),
            &analysis(vec![("Rust", 10, 1.0), ("Java", 1, 0.1)]),
        );
        assert!(report.overall_score <= 100);
        assert_eq!(report.matched_keywords(), vec!["Rust"]);
    }

    #[test]
    fn test_contains_term_boundaries() {
        assert!(contains_term("built apis in go, rust", "go"));
        assert!(contains_term("c++ and python", "c++"));
        assert!(!contains_term("good stuff", "go"));
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn test_recommendation_levels() {
        assert!(build_recommendation(85, &[]).contains("Strong fit"));
        let gaps = vec![Gap {
            keyword: "Kafka".to_string(),
            jd_frequency: 3,
        }];
        let moderate = build_recommendation(65, &gaps);
        assert!(moderate.contains("Kafka") && moderate.contains("65"));
        let low = build_recommendation(30, &gaps);
        assert!(low.contains("30") && low.contains("will not be added"));
    }
}
