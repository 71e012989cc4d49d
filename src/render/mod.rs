// src/render/mod.rs
//! Pure transformation of an analysis record into display data

pub mod labels;
pub mod report;

use serde::Serialize;
use std::cmp::Ordering;

use crate::types::analysis::{
    AnalysisRecord, Course, OrderedMap, Score, COURSE_RECOMMENDATIONS_KEY,
};
use labels::{category_label, is_known_category, role_label, CATEGORY_LABELS};

/// Shown in place of a score that was not measured
pub const NOT_AVAILABLE: &str = "N/A";

/// "82.5%" for a finite score, `NOT_AVAILABLE` otherwise
pub fn format_percent(score: Option<f64>) -> String {
    match score.filter(|v| v.is_finite()) {
        Some(value) => format!("{:.1}%", value),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// "77.0/100" for a finite score, `NOT_AVAILABLE` otherwise
pub fn format_out_of_100(score: Option<f64>) -> String {
    match score.filter(|v| v.is_finite()) {
        Some(value) => format!("{:.1}/100", value),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn text_or_placeholder(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleRow {
    pub key: String,
    pub label: String,
    pub score: Option<f64>,
    pub display: String,
}

impl RoleRow {
    fn new(key: &str, score: Score) -> Self {
        Self {
            key: key.to_string(),
            label: role_label(key).to_string(),
            score: score.value(),
            display: format_percent(score.value()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub key: String,
    pub label: String,
    pub score: Option<f64>,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub name: String,
    pub email: String,
    pub university: String,
    pub study_period: String,
    pub base_score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationCard {
    pub university: String,
    pub rank: Option<String>,
    pub score: f64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillLine {
    pub skill: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryBlock {
    pub industry: String,
    pub skills: Vec<SkillLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationBlock {
    pub category: String,
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCard {
    pub name: String,
    pub platform: Option<String>,
    pub duration: Option<String>,
    pub level: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl CourseCard {
    fn from_course(course: &Course) -> Option<Self> {
        let name = course.display_name()?.to_string();
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            name,
            platform: clean(&course.platform),
            duration: clean(&course.duration),
            level: clean(&course.level),
            url: clean(&course.url),
            description: clean(&course.description),
        })
    }

    /// "Coursera | 3 months | advanced", skipping absent parts
    pub fn details_line(&self) -> String {
        [&self.platform, &self.duration, &self.level]
            .iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<&str>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingSkillsBlock {
    pub role: String,
    pub label: String,
    pub skills: Vec<String>,
}

/// Everything a results view shows for one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub id: Option<String>,
    pub candidate: CandidateSummary,
    pub education_card: Option<EducationCard>,
    pub best_fit: Option<RoleRow>,
    pub roles: Vec<RoleRow>,
    pub chart: Vec<ChartBar>,
    pub categories: Vec<CategoryRow>,
    pub industries: Vec<IndustryBlock>,
    pub recommendations: Vec<RecommendationBlock>,
    pub courses: Vec<CourseCard>,
    pub missing_skills: Vec<MissingSkillsBlock>,
}

/// Higher scores first; unmeasured scores after all measured ones
fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Roles sorted by descending score; equal scores keep payload order
pub fn rank_roles(scores: &OrderedMap<Score>) -> Vec<RoleRow> {
    let mut rows: Vec<RoleRow> = scores
        .iter()
        .map(|(key, score)| RoleRow::new(key, *score))
        .collect();
    // sort_by is stable
    rows.sort_by(|a, b| compare_desc(a.score, b.score));
    rows
}

fn best_fit(record: &AnalysisRecord, ranked: &[RoleRow]) -> Option<RoleRow> {
    let declared = record
        .role_fit
        .as_ref()
        .and_then(|fit| fit.best_fit.as_ref())
        .and_then(|best| {
            best.role
                .as_deref()
                .filter(|role| !role.is_empty())
                .map(|role| RoleRow::new(role, best.score))
        });
    declared.or_else(|| ranked.first().cloned())
}

fn categories(record: &AnalysisRecord) -> Vec<CategoryRow> {
    let mut keys: Vec<&str> = CATEGORY_LABELS.iter().map(|(key, _)| *key).collect();
    keys.extend(
        record
            .detailed_analysis
            .keys()
            .filter(|key| !is_known_category(key)),
    );

    keys.into_iter()
        .map(|key| {
            let score = record
                .detailed_analysis
                .get(key)
                .and_then(|entry| entry.score.value());
            CategoryRow {
                key: key.to_string(),
                label: category_label(key).to_string(),
                score,
                display: format_percent(score),
            }
        })
        .collect()
}

fn candidate(record: &AnalysisRecord) -> CandidateSummary {
    let personal = record.personal_data.as_ref();
    let education = record.education.as_ref();
    CandidateSummary {
        name: text_or_placeholder(personal.and_then(|p| p.name.as_deref())),
        email: text_or_placeholder(personal.and_then(|p| p.email.as_deref())),
        university: text_or_placeholder(education.and_then(|e| e.university.as_deref())),
        study_period: text_or_placeholder(education.and_then(|e| e.years.as_deref())),
        base_score: format_out_of_100(record.base_score.value()),
    }
}

fn education_card(record: &AnalysisRecord) -> Option<EducationCard> {
    let education = record.education.as_ref()?;
    let score = education.score.value()?;
    Some(EducationCard {
        university: text_or_placeholder(education.university.as_deref()),
        rank: education.rank.clone().filter(|r| !r.trim().is_empty()),
        score,
        display: format_out_of_100(Some(score)),
    })
}

fn industries(record: &AnalysisRecord) -> Vec<IndustryBlock> {
    record
        .industry_relevance
        .iter()
        .filter_map(|(industry, skills)| {
            let skills: Vec<SkillLine> = skills
                .iter()
                .filter_map(|entry| {
                    let skill = entry.skill.as_deref()?.trim();
                    (!skill.is_empty()).then(|| SkillLine {
                        skill: skill.to_string(),
                        description: entry.description.clone(),
                    })
                })
                .collect();
            (!skills.is_empty()).then(|| IndustryBlock {
                industry: industry.to_string(),
                skills,
            })
        })
        .collect()
}

fn recommendation_blocks(record: &AnalysisRecord) -> Vec<RecommendationBlock> {
    record
        .recommendations
        .categories
        .iter()
        .filter(|(category, _)| *category != COURSE_RECOMMENDATIONS_KEY)
        .filter(|(_, items)| !items.is_empty())
        .map(|(category, items)| RecommendationBlock {
            category: category.to_string(),
            title: category_label(category).to_string(),
            items: items.iter().cloned().collect(),
        })
        .collect()
}

fn course_cards(record: &AnalysisRecord) -> Vec<CourseCard> {
    record
        .recommendations
        .courses
        .iter()
        .chain(record.learning_recommendations.iter())
        .filter_map(CourseCard::from_course)
        .collect()
}

fn missing_skills(record: &AnalysisRecord) -> Vec<MissingSkillsBlock> {
    record
        .missing_skills
        .iter()
        .filter(|(_, skills)| !skills.is_empty())
        .map(|(role, skills)| MissingSkillsBlock {
            role: role.to_string(),
            label: role_label(role).to_string(),
            skills: skills.iter().cloned().collect(),
        })
        .collect()
}

/// Build the display model for a record. Never fails on a well-typed record.
pub fn render(record: &AnalysisRecord) -> DisplayModel {
    let roles = rank_roles(record.role_scores());
    let chart = roles
        .iter()
        .filter_map(|row| {
            row.score.map(|percentage| ChartBar {
                label: row.label.clone(),
                percentage,
            })
        })
        .collect();

    DisplayModel {
        id: record.identifier().map(str::to_string),
        candidate: candidate(record),
        education_card: education_card(record),
        best_fit: best_fit(record, &roles),
        chart,
        categories: categories(record),
        industries: industries(record),
        recommendations: recommendation_blocks(record),
        courses: course_cards(record),
        missing_skills: missing_skills(record),
        roles,
    }
}
