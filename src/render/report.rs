// src/render/report.rs
//! Plain-text rendering of display models for the terminal

use crate::history::HistorySummary;
use crate::render::{DisplayModel, NOT_AVAILABLE};

const BAR_WIDTH: usize = 30;

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n{}\n", title, "-".repeat(title.chars().count())));
}

/// Horizontal bar for a percentage in [0, 100]
pub fn bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn render_text(model: &DisplayModel) -> String {
    let mut out = String::new();

    out.push_str("Analysis results");
    if let Some(id) = &model.id {
        out.push_str(&format!(" ({})", id));
    }
    out.push('\n');

    heading(&mut out, "Candidate");
    out.push_str(&format!("Name:         {}\n", model.candidate.name));
    out.push_str(&format!("Email:        {}\n", model.candidate.email));
    out.push_str(&format!("University:   {}\n", model.candidate.university));
    out.push_str(&format!("Study period: {}\n", model.candidate.study_period));
    out.push_str(&format!("Base score:   {}\n", model.candidate.base_score));

    if let Some(card) = &model.education_card {
        heading(&mut out, "Education score");
        let rank = card.rank.as_deref().unwrap_or(NOT_AVAILABLE);
        out.push_str(&format!(
            "{} [{}] {} ({})\n",
            card.display,
            bar(card.score),
            card.university,
            rank
        ));
    }

    heading(&mut out, "Best fitting role");
    match &model.best_fit {
        Some(best) => out.push_str(&format!("{} ({})\n", best.label, best.display)),
        None => out.push_str("No role could be determined\n"),
    }

    if !model.roles.is_empty() {
        heading(&mut out, "Role compatibility");
        let width = model
            .roles
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);
        for row in &model.roles {
            let graph = row.score.map(bar).unwrap_or_else(|| " ".repeat(BAR_WIDTH));
            out.push_str(&format!(
                "{:<width$}  {}  {:>6}\n",
                row.label,
                graph,
                row.display,
                width = width
            ));
        }
    }

    heading(&mut out, "Detailed analysis");
    for category in &model.categories {
        out.push_str(&format!("{:<12} {}\n", category.label, category.display));
    }

    if !model.industries.is_empty() {
        heading(&mut out, "Skills by industry");
        for block in &model.industries {
            out.push_str(&format!("{}\n", block.industry));
            for line in &block.skills {
                match &line.description {
                    Some(description) => {
                        out.push_str(&format!("  - {}: {}\n", line.skill, description))
                    }
                    None => out.push_str(&format!("  - {}\n", line.skill)),
                }
            }
        }
    }

    if !model.recommendations.is_empty() {
        heading(&mut out, "Areas to improve");
        for block in &model.recommendations {
            out.push_str(&format!("{}\n", block.title));
            for item in &block.items {
                out.push_str(&format!("  - {}\n", item));
            }
        }
    }

    if !model.missing_skills.is_empty() {
        heading(&mut out, "Missing skills by role");
        for block in &model.missing_skills {
            out.push_str(&format!("{}: {}\n", block.label, block.skills.join(", ")));
        }
    }

    if !model.courses.is_empty() {
        heading(&mut out, "Recommended courses");
        for course in &model.courses {
            out.push_str(&format!("* {}\n", course.name));
            let details = course.details_line();
            if !details.is_empty() {
                out.push_str(&format!("  {}\n", details));
            }
            if let Some(description) = &course.description {
                out.push_str(&format!("  {}\n", description));
            }
            if let Some(url) = &course.url {
                out.push_str(&format!("  {}\n", url));
            }
        }
    }

    out
}

pub fn render_history(rows: &[HistorySummary]) -> String {
    if rows.is_empty() {
        return "No analyses yet.\n".to_string();
    }

    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "[{}] {} | {} | {}\n",
            row.id, row.candidate_name, row.filename, row.upload_date
        ));
        for role in &row.top3_roles {
            out.push_str(&format!("    {}: {}\n", role.label, role.display));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use crate::types::analysis::AnalysisRecord;
    use serde_json::json;

    #[test]
    fn test_bar_is_clamped() {
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(100.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(250.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(50.0).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_text_report_sections() {
        let record: AnalysisRecord = serde_json::from_value(json!({
            "id": "r-1",
            "base_score": 70,
            "role_fit": {"best_fit": {"role": "ml_engineer", "score": 80}},
            "role_matches": {"ml_engineer": 80, "ai_manager": "?"},
            "recommendations": {
                "skills": ["Learn Airflow"],
                "course_recommendations": [{"name": "Airflow Basics", "url": "https://example.com/a"}]
            }
        }))
        .unwrap();
        let text = render_text(&render(&record));

        assert!(text.starts_with("Analysis results (r-1)"));
        assert!(text.contains("ML Engineer (80.0%)"));
        assert!(text.contains("Base score:   70.0/100"));
        assert!(text.contains("Education    N/A"));
        assert!(text.contains("  - Learn Airflow"));
        assert!(text.contains("* Airflow Basics"));
        assert!(!text.contains("Missing skills by role"));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(render_history(&[]), "No analyses yet.\n");
    }
}
