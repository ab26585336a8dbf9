//! Job analysis: Extracts requirements and weighted keywords from a raw job description.
//!
//! Deterministic and local: no backend call. The result feeds the generation
//! prompt as emphasis hints and the fit report; it never adds content to a profile.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::profile::JobContext;

/// Keywords kept after ranking.
const MAX_KEYWORDS: usize = 25;

const HARD_MARKERS: [&str; 6] = [
    "required",
    "must have",
    "must-have",
    "you will need",
    "minimum",
    "mandatory",
];

const SOFT_MARKERS: [&str; 6] = ["preferred", "nice to have", "nice-to-have", "a plus", "bonus", "desirable"];

/// Capitalised words that are never keywords on their own.
const STOP_WORDS: [&str; 48] = [
    "a", "about", "all", "an", "and", "any", "are", "as", "at", "be", "benefits", "bonus", "but",
    "by", "e.g", "engineer", "experience", "for", "from", "have", "i.e", "in", "join", "junior",
    "lead", "must", "nice", "of", "on", "or", "our", "plus", "preferred", "principal", "required",
    "requirements", "responsibilities", "role", "senior", "staff", "team", "the", "to", "us",
    "we", "with", "you", "your",
];

/// Where in the description a line sits. Drives the keyword position weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSection {
    About,
    Responsibilities,
    Requirements,
    Title,
}

impl JobSection {
    /// title=1.0, requirements=0.8, responsibilities=0.6, about=0.3
    pub fn weight(self) -> f32 {
        match self {
            Self::Title => 1.0,
            Self::Requirements => 0.8,
            Self::Responsibilities => 0.6,
            Self::About => 0.3,
        }
    }

    fn from_header(line: &str) -> Option<Self> {
        let lower = line.trim_start_matches(['-', '•', '*', '#', ' ']).to_lowercase();
        let starts = |prefixes: &[&str]| prefixes.iter().any(|p| lower.starts_with(p));
        if starts(&[
            "requirements",
            "required",
            "must have",
            "qualifications",
            "what you bring",
            "you have",
            "you need",
            "skills",
            "nice to have",
            "preferred",
        ]) {
            Some(Self::Requirements)
        } else if starts(&[
            "responsibilities",
            "you will",
            "what you'll do",
            "what you will do",
            "the role",
            "your role",
        ]) {
            Some(Self::Responsibilities)
        } else if starts(&["about", "who we are", "our company", "benefits", "why join", "perks"]) {
            Some(Self::About)
        } else {
            None
        }
    }
}

/// A single requirement extracted from the description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub text: String,
    pub is_required: bool,
}

/// A single keyword, weighted by position and frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// Highest section weight the keyword appears under.
    pub position_weight: f32,
    /// frequency * position_weight
    pub weighted_score: f32,
}

/// Structured output of job analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub hard_requirements: Vec<Requirement>,
    pub soft_signals: Vec<String>,
    pub keyword_inventory: Vec<KeywordEntry>,
}

impl JobAnalysis {
    /// Keywords in rank order.
    pub fn top_keywords(&self, n: usize) -> Vec<&str> {
        self.keyword_inventory
            .iter()
            .take(n)
            .map(|k| k.keyword.as_str())
            .collect()
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z][A-Za-z0-9]*(?:[+#]+|(?:[./][A-Za-z0-9]+)+)?")
            .expect("keyword token pattern is valid")
    })
}

fn clause_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[.!?;:](?:\s+|$)|[•·]|\s[-–—]\s").expect("clause separator pattern is valid")
    })
}

/// Analyses the job description. The role, when given, counts as title text.
pub fn analyze(job: &JobContext) -> JobAnalysis {
    let company_words: HashSet<String> = token_pattern()
        .find_iter(&job.company)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let mut lines: Vec<(JobSection, &str)> = Vec::new();
    if !job.role.trim().is_empty() {
        lines.push((JobSection::Title, job.role.trim()));
    }

    let mut section = JobSection::Responsibilities;
    let mut seen_title = !lines.is_empty();
    for line in job.description.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !seen_title {
            seen_title = true;
            lines.push((JobSection::Title, line));
            continue;
        }
        if let Some(header) = JobSection::from_header(line) {
            section = header;
        }
        lines.push((section, line));
    }

    let mut hard_requirements = Vec::new();
    let mut soft_signals = Vec::new();
    let mut tally: BTreeMap<String, KeywordTally> = BTreeMap::new();

    for (section, line) in &lines {
        for clause in clause_pattern().split(line).map(str::trim).filter(|c| c.len() > 2) {
            classify_clause(clause, *section, &mut hard_requirements, &mut soft_signals);
            count_keywords(clause, *section, &company_words, &mut tally);
        }
    }

    let mut keyword_inventory: Vec<KeywordEntry> = tally
        .into_values()
        .filter(|t| t.technical)
        .map(|t| {
            let position_weight = t.section.weight();
            KeywordEntry {
                weighted_score: t.frequency as f32 * position_weight,
                keyword: t.display,
                frequency: t.frequency,
                position_weight,
            }
        })
        .collect();
    keyword_inventory.sort_by(|a, b| {
        b.weighted_score
            .total_cmp(&a.weighted_score)
            .then_with(|| a.keyword.to_lowercase().cmp(&b.keyword.to_lowercase()))
    });
    keyword_inventory.truncate(MAX_KEYWORDS);

    JobAnalysis {
        hard_requirements,
        soft_signals,
        keyword_inventory,
    }
}

fn classify_clause(
    clause: &str,
    section: JobSection,
    hard: &mut Vec<Requirement>,
    soft: &mut Vec<String>,
) {
    if JobSection::from_header(clause).is_some() && clause.split_whitespace().count() <= 3 {
        return;
    }
    let lower = clause.to_lowercase();
    if SOFT_MARKERS.iter().any(|m| lower.contains(m)) {
        soft.push(clause.to_string());
    } else if HARD_MARKERS.iter().any(|m| lower.contains(m)) || section == JobSection::Requirements {
        hard.push(Requirement {
            text: clause.to_string(),
            is_required: true,
        });
    }
}

struct KeywordTally {
    display: String,
    frequency: u32,
    section: JobSection,
    technical: bool,
}

fn count_keywords(
    clause: &str,
    section: JobSection,
    company_words: &HashSet<String>,
    tally: &mut BTreeMap<String, KeywordTally>,
) {
    for (idx, m) in token_pattern().find_iter(clause).enumerate() {
        let token = m.as_str();
        let key = token.to_lowercase();
        if STOP_WORDS.contains(&key.as_str()) || company_words.contains(&key) {
            continue;
        }
        let technical = looks_technical(token, idx == 0);
        let entry = tally.entry(key).or_insert_with(|| KeywordTally {
            display: token.to_string(),
            frequency: 0,
            section,
            technical: false,
        });
        entry.frequency += 1;
        entry.section = entry.section.max(section);
        if technical && !entry.technical {
            entry.technical = true;
            entry.display = token.to_string();
        }
    }
}

/// Technical-looking: carries `+ # . /`, mixes letters and digits, is an
/// acronym, or is capitalised somewhere other than the start of a clause.
fn looks_technical(token: &str, clause_initial: bool) -> bool {
    if token.contains(['+', '#', '.', '/']) {
        return true;
    }
    if token.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    if token.len() >= 2 && token.chars().all(|c| c.is_ascii_uppercase()) {
        return true;
    }
    !clause_initial && token.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
