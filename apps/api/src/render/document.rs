//! Projection of a profile into the value tree templates render against.

use super::engine::Value;
use super::escape::format_range;
use crate::models::profile::{EducationEntry, ExperienceEntry, Language, Profile, Project};

pub fn document(profile: &Profile) -> Value {
    let contact = &profile.contact;
    Value::record([
        ("name", text(&contact.name)),
        ("email", text(&contact.email)),
        ("phone", text(&contact.phone)),
        ("address", text(&contact.address)),
        ("links", texts(&contact.links)),
        ("headline", text(&profile.headline)),
        ("summary", text(&profile.summary)),
        ("experience", Value::List(profile.experience.iter().map(experience).collect())),
        ("education", Value::List(profile.education.iter().map(education).collect())),
        ("skills", skill_groups(profile)),
        ("certifications", texts(&profile.certifications)),
        ("languages", Value::List(profile.languages.iter().map(language).collect())),
        ("projects", Value::List(profile.projects.iter().map(project).collect())),
    ])
}

fn experience(entry: &ExperienceEntry) -> Value {
    Value::record([
        ("title", text(&entry.title)),
        ("organization", text(&entry.organization)),
        ("location", text(&entry.location)),
        ("dates", Value::Text(format_range(&entry.start_date, &entry.end_date))),
        ("bullets", texts(&entry.bullets)),
    ])
}

fn education(entry: &EducationEntry) -> Value {
    Value::record([
        ("degree", text(&entry.degree)),
        ("institution", text(&entry.institution)),
        ("location", text(&entry.location)),
        ("dates", Value::Text(format_range(&entry.start_date, &entry.end_date))),
        ("details", texts(&entry.details)),
    ])
}

fn language(language: &Language) -> Value {
    Value::record([
        ("name", text(&language.name)),
        ("proficiency", text(&language.proficiency)),
    ])
}

fn project(project: &Project) -> Value {
    Value::record([
        ("name", text(&project.name)),
        ("description", text(&project.description)),
        ("technologies", Value::Text(joined(&project.technologies))),
        ("link", text(&project.link)),
        ("bullets", texts(&project.bullets)),
    ])
}

/// One group per non-empty skill partition.
fn skill_groups(profile: &Profile) -> Value {
    let groups = [("Technical", &profile.skills.hard), ("Soft skills", &profile.skills.soft)]
        .into_iter()
        .filter(|(_, items)| items.iter().any(|s| !s.trim().is_empty()))
        .map(|(group, items)| {
            Value::record([
                ("group", Value::Text(group.to_string())),
                ("items", texts(items)),
                ("joined", Value::Text(joined(items))),
            ])
        })
        .collect();
    Value::List(groups)
}

fn text(value: &str) -> Value {
    Value::Text(value.trim().to_string())
}

fn texts(values: &[String]) -> Value {
    Value::List(
        values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| Value::Text(v.to_string()))
            .collect(),
    )
}

fn joined(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
