//! Validação de argumentos antes de qualquer chamada de rede

use crate::error::{BloomyError, Result};

/// Valida que um título está presente e não é vazio após trim
pub fn validate_title(title: Option<&str>, context: &str) -> Result<()> {
    let Some(title) = title else {
        return Err(BloomyError::Validation(format!("{context} cannot be nil")));
    };
    if title.trim().is_empty() {
        return Err(BloomyError::Validation(format!("{context} cannot be empty")));
    }
    Ok(())
}

/// Valida que um ID é um inteiro estritamente positivo
pub fn validate_id(id: i64, context: &str) -> Result<()> {
    if id <= 0 {
        return Err(BloomyError::Validation(format!(
            "{context} must be a positive integer"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_title_is_rejected() {
        let err = validate_title(None, "title").unwrap_err();
        assert!(matches!(err, BloomyError::Validation(_)));
        assert_eq!(err.to_string(), "title cannot be nil");
    }

    #[test]
    fn test_blank_title_is_rejected() {
        for blank in ["", "   ", "\t\n"] {
            let err = validate_title(Some(blank), "title").unwrap_err();
            assert_eq!(err.to_string(), "title cannot be empty");
        }
    }

    #[test]
    fn test_valid_title_passes() {
        assert!(validate_title(Some("ok"), "title").is_ok());
        assert!(validate_title(Some("  ok  "), "title").is_ok());
    }

    #[test]
    fn test_non_positive_ids_are_rejected() {
        for bad in [0, -5] {
            let err = validate_id(bad, "meeting_id").unwrap_err();
            assert_eq!(err.to_string(), "meeting_id must be a positive integer");
        }
    }

    #[test]
    fn test_positive_id_passes() {
        assert!(validate_id(7, "id").is_ok());
    }
}
