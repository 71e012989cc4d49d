// src/web/fixtures.rs
//! Deterministic analysis records for the stub service.
//!
//! Scores are derived from the file name, so uploading the same file twice
//! yields the same analysis.

use crate::render::labels::{CATEGORY_LABELS, ROLE_LABELS};
use crate::types::analysis::{
    AnalysisRecord, BestFit, CategoryScore, Course, EducationSummary, Items, OrderedMap,
    PersonalData, Recommendations, RoleFit, Score, SkillRelevance,
};
use crate::utils::display_name_from_filename;

/// FNV-1a over the file name
fn seed_from(filename: &str) -> u64 {
    filename.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Score in [35.0, 95.0] with one decimal, picked by `slot`
fn score_for(seed: u64, slot: u32) -> f64 {
    let mixed = seed.rotate_left(slot * 7) ^ u64::from(slot).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    35.0 + (mixed % 601) as f64 / 10.0
}

fn skill(name: &str, description: &str) -> SkillRelevance {
    SkillRelevance {
        skill: Some(name.to_string()),
        description: Some(description.to_string()),
    }
}

fn course(name: &str, platform: &str, duration: &str, level: &str, url: &str) -> Course {
    Course {
        name: Some(name.to_string()),
        platform: Some(platform.to_string()),
        duration: Some(duration.to_string()),
        level: Some(level.to_string()),
        url: Some(url.to_string()),
        ..Course::default()
    }
}

fn strings(items: &[&str]) -> Items<String> {
    Items(items.iter().map(|s| s.to_string()).collect())
}

pub fn fixture_record(id: &str, filename: &str) -> AnalysisRecord {
    let seed = seed_from(filename);
    let name = display_name_from_filename(filename);
    let email = format!(
        "{}@example.com",
        name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(".")
    );

    let role_matches: OrderedMap<Score> = ROLE_LABELS
        .iter()
        .zip(0u32..)
        .map(|((key, _), slot)| (*key, Score::new(score_for(seed, slot))))
        .collect();

    let best_fit = role_matches
        .iter()
        .filter_map(|(key, score)| score.value().map(|v| (key, v)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, value)| BestFit {
            role: Some(key.to_string()),
            score: Score::new(value),
        });

    let detailed_analysis: OrderedMap<CategoryScore> = CATEGORY_LABELS
        .iter()
        .zip(10u32..)
        .map(|((key, _), slot)| {
            (
                *key,
                CategoryScore {
                    score: Score::new(score_for(seed, slot)),
                },
            )
        })
        .collect();

    let mut industry_relevance = OrderedMap::new();
    industry_relevance.insert(
        "Technology",
        Items(vec![
            skill("Python", "Core language for data pipelines and modelling"),
            skill("SQL", "Querying and shaping relational data"),
        ]),
    );
    industry_relevance.insert(
        "Finance",
        Items(vec![skill("Statistics", "Risk and forecasting models")]),
    );

    let mut categories = OrderedMap::new();
    categories.insert(
        "skills",
        strings(&["Deepen cloud platform experience", "Practice MLOps tooling"]),
    );
    categories.insert(
        "experience",
        strings(&["Lead an end-to-end analytics project"]),
    );

    let recommendations = Recommendations {
        categories,
        courses: Items(vec![
            course(
                "Machine Learning Specialization",
                "Coursera",
                "3 months",
                "Intermediate",
                "https://www.coursera.org/specializations/machine-learning-introduction",
            ),
            course(
                "Data Engineering Zoomcamp",
                "DataTalks.Club",
                "9 weeks",
                "Beginner",
                "https://github.com/DataTalksClub/data-engineering-zoomcamp",
            ),
        ]),
    };

    let mut missing_skills = OrderedMap::new();
    missing_skills.insert("ml_engineer", strings(&["Kubernetes", "Model serving"]));
    missing_skills.insert("data_architect", strings(&["Data modelling"]));

    AnalysisRecord {
        id: Some(id.to_string()),
        resume_id: Some(id.to_string()),
        base_score: Score::new(score_for(seed, 20)),
        role_fit: Some(RoleFit {
            best_fit,
            all_roles: role_matches.clone(),
        }),
        role_matches,
        detailed_analysis,
        industry_relevance,
        recommendations,
        learning_recommendations: Items::default(),
        missing_skills,
        personal_data: Some(PersonalData {
            name: Some(name),
            email: Some(email),
        }),
        education: Some(EducationSummary {
            university: Some("State Technical University".to_string()),
            years: Some("2015-2019".to_string()),
            rank: Some("Top 10%".to_string()),
            score: Score::new(score_for(seed, 21)),
        }),
    }
}
