// src/render/labels.rs
//! Display labels for the role and category keys the service emits

pub const ROLE_LABELS: [(&str, &str); 8] = [
    ("data_scientist", "Data Scientist"),
    ("data_engineer", "Data Engineer"),
    ("technical_analyst", "Technical Analyst"),
    ("ai_manager", "AI Manager"),
    ("ml_engineer", "ML Engineer"),
    ("data_architect", "Data Architect"),
    ("business_intelligence_analyst", "BI Analyst"),
    ("research_scientist", "Research Scientist"),
];

/// Fixed categories of `detailed_analysis`, in display order
pub const CATEGORY_LABELS: [(&str, &str); 4] = [
    ("education", "Education"),
    ("experience", "Experience"),
    ("skills", "Skills"),
    ("languages", "Languages"),
];

fn lookup<'a>(table: &[(&'static str, &'static str)], key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Label of a role key, the raw key when unknown
pub fn role_label(key: &str) -> &str {
    lookup(&ROLE_LABELS, key)
}

/// Label of a category key, the raw key when unknown
pub fn category_label(key: &str) -> &str {
    lookup(&CATEGORY_LABELS, key)
}

pub fn is_known_category(key: &str) -> bool {
    CATEGORY_LABELS.iter().any(|(k, _)| *k == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_keys() {
        assert_eq!(role_label("business_intelligence_analyst"), "BI Analyst");
        assert_eq!(role_label("prompt_engineer"), "prompt_engineer");
        assert_eq!(category_label("languages"), "Languages");
        assert_eq!(category_label("certificates"), "certificates");
        assert!(is_known_category("skills"));
        assert!(!is_known_category("certificates"));
    }
}
