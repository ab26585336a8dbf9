//! 1:1 correspondence of experience, education and project entries.
//!
//! Entries are paired by a key derived from the fields that identify them
//! (organization + start date, institution + start date, project name).
//! Generated entries may be re-summarized, never invented or reordered.

use super::containment::normalize;
use super::{Findings, IssueCode};
use crate::models::profile::{EducationEntry, ExperienceEntry, Profile, Project};

/// How one kind of entry is identified and described.
trait Keyed {
    const FIELD: &'static str;
    const UNMATCHED: IssueCode;
    const OMITTED: IssueCode;
    /// `None` for kinds without chronological ordering.
    const REORDERED: Option<IssueCode>;

    fn key(&self) -> (String, String);
    fn label(&self) -> String;

    /// Differences that matter once two entries are paired.
    fn compare(&self, _original: &Self, _findings: &mut Findings) {}
}

impl Keyed for ExperienceEntry {
    const FIELD: &'static str = "experience";
    const UNMATCHED: IssueCode = IssueCode::UnmatchedExperience;
    const OMITTED: IssueCode = IssueCode::OmittedExperience;
    const REORDERED: Option<IssueCode> = Some(IssueCode::ExperienceReordered);

    fn key(&self) -> (String, String) {
        (normalize(&self.organization), normalize(&self.start_date))
    }

    fn label(&self) -> String {
        format!("{} ({})", self.organization, self.start_date)
    }

    fn compare(&self, original: &Self, findings: &mut Findings) {
        if normalize(&self.end_date) != normalize(&original.end_date) {
            findings.error(
                IssueCode::DateRangeChanged,
                Self::FIELD,
                Some(self.label()),
                format!(
                    "end date for {} changed from '{}' to '{}'",
                    self.organization, original.end_date, self.end_date
                ),
            );
        }
        if normalize(&self.title) != normalize(&original.title) {
            findings.warning(
                IssueCode::TitleChanged,
                Self::FIELD,
                Some(self.label()),
                format!("title changed from '{}' to '{}'", original.title, self.title),
            );
        }
    }
}

impl Keyed for EducationEntry {
    const FIELD: &'static str = "education";
    const UNMATCHED: IssueCode = IssueCode::UnmatchedEducation;
    const OMITTED: IssueCode = IssueCode::OmittedEducation;
    const REORDERED: Option<IssueCode> = Some(IssueCode::EducationReordered);

    fn key(&self) -> (String, String) {
        (normalize(&self.institution), normalize(&self.start_date))
    }

    fn label(&self) -> String {
        format!("{} ({})", self.institution, self.start_date)
    }

    fn compare(&self, original: &Self, findings: &mut Findings) {
        if normalize(&self.end_date) != normalize(&original.end_date) {
            findings.error(
                IssueCode::DateRangeChanged,
                Self::FIELD,
                Some(self.label()),
                format!(
                    "end date for {} changed from '{}' to '{}'",
                    self.institution, original.end_date, self.end_date
                ),
            );
        }
        if normalize(&self.degree) != normalize(&original.degree) {
            findings.error(
                IssueCode::DegreeChanged,
                Self::FIELD,
                Some(self.label()),
                format!("degree changed from '{}' to '{}'", original.degree, self.degree),
            );
        }
    }
}

impl Keyed for Project {
    const FIELD: &'static str = "projects";
    const UNMATCHED: IssueCode = IssueCode::UnmatchedProject;
    const OMITTED: IssueCode = IssueCode::OmittedProject;
    const REORDERED: Option<IssueCode> = None;

    fn key(&self) -> (String, String) {
        (normalize(&self.name), String::new())
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

pub(super) fn check(source: &Profile, generated: &Profile, findings: &mut Findings) {
    pair(&source.experience, &generated.experience, findings);
    pair(&source.education, &generated.education, findings);
    pair(&source.projects, &generated.projects, findings);
}

fn pair<T: Keyed>(source: &[T], generated: &[T], findings: &mut Findings) {
    let mut used = vec![false; source.len()];
    let mut matched_order: Vec<usize> = Vec::new();

    for entry in generated {
        let key = entry.key();
        let found = (0..source.len()).find(|&i| !used[i] && source[i].key() == key);

        match found {
            Some(i) => {
                used[i] = true;
                matched_order.push(i);
                entry.compare(&source[i], findings);
            }
            None => findings.error(
                T::UNMATCHED,
                T::FIELD,
                Some(entry.label()),
                format!("{} has no counterpart in the source profile", entry.label()),
            ),
        }
    }

    for (entry, _) in source.iter().zip(&used).filter(|(_, used)| !**used) {
        findings.warning(
            T::OMITTED,
            T::FIELD,
            Some(entry.label()),
            format!("{} from the source profile was omitted", entry.label()),
        );
    }

    if let Some(code) = T::REORDERED {
        if matched_order.windows(2).any(|w| w[0] > w[1]) {
            findings.error(
                code,
                T::FIELD,
                None,
                format!("{} entries are not in the source order", T::FIELD),
            );
        }
    }
}
