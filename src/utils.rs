// src/utils.rs
use anyhow::Result;
use std::path::Path;

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

/// Content type sent with an uploaded resume
pub fn content_type_for(file_name: &str) -> &'static str {
    match get_file_extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("doc") => "application/msword",
        _ => "application/octet-stream",
    }
}

/// Last path component of a client-supplied file name
pub fn base_file_name(raw: &str) -> &str {
    raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw)
}

/// Human-readable name from a resume file name, e.g. "jane_doe-cv.pdf" -> "Jane Doe Cv"
pub fn display_name_from_filename(filename: &str) -> String {
    let stem = Path::new(base_file_name(filename))
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    stem.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("test.pdf"), Some("pdf".to_string()));
        assert_eq!(
            get_file_extension("document.DOCX"),
            Some("docx".to_string())
        );
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("test.pdf", &["pdf", "docx"]).is_ok());
        assert!(validate_file_extension("test.txt", &["pdf", "docx"]).is_err());
        assert!(validate_file_extension("noext", &["pdf"]).is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("cv.PDF"), "application/pdf");
        assert_eq!(content_type_for("cv.txt"), "application/octet-stream");
    }

    #[test]
    fn test_base_file_name() {
        assert_eq!(base_file_name("C:\\Users\\me\\cv.docx"), "cv.docx");
        assert_eq!(base_file_name("/tmp/upload/cv.pdf"), "cv.pdf");
        assert_eq!(base_file_name("cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_display_name_from_filename() {
        assert_eq!(display_name_from_filename("jane_doe-CV.pdf"), "Jane Doe Cv");
        assert_eq!(display_name_from_filename("ivan petrov.docx"), "Ivan Petrov");
    }
}
