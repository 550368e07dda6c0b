use std::path::Path;

use crate::models::{CandidateFields, CandidateForm};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates the candidate form: every scalar field present and non-blank,
/// experience a finite non-negative number.
pub fn validate_candidate_form(form: &CandidateForm) -> Result<CandidateFields, ValidationError> {
    let required = [
        &form.first_name,
        &form.last_name,
        &form.position_applied,
        &form.current_position,
        &form.experience_years,
    ];

    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ValidationError {
            code: "MISSING_FIELD",
            message: "All fields are required.".to_string(),
        });
    }

    let experience: f64 = form
        .experience_years
        .trim()
        .parse()
        .map_err(|_| invalid_experience())?;

    if !experience.is_finite() || experience < 0.0 {
        return Err(invalid_experience());
    }

    Ok(CandidateFields {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        position_applied: form.position_applied.trim().to_string(),
        current_position: form.current_position.trim().to_string(),
        experience_years: experience,
    })
}

fn invalid_experience() -> ValidationError {
    ValidationError {
        code: "INVALID_EXPERIENCE",
        message: "Experience in Years must be a non-negative number.".to_string(),
    }
}

/// Sanitizes a declared filename: strips any path components, replaces
/// reserved characters, truncates safely for UTF-8. Falls back to the given
/// default when nothing usable remains.
pub fn sanitize_filename(filename: &str, fallback: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if sanitized.is_empty() {
        fallback.to_string()
    } else {
        sanitized
    }
}
