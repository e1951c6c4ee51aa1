//! Tenant slug normalization

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

/// Slugs that collide with data-store system names or administrative roles
pub const RESERVED_TENANT_SLUGS: &[&str] = &[
    "postgres",
    "template0",
    "template1",
    "admin",
    "default",
    "public",
    "master",
    "root",
    "system",
];

static SLUG_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-z0-9-]{3,50}$").ok());

fn matches_slug_pattern(slug: &str) -> bool {
    SLUG_PATTERN.as_ref().is_some_and(|pattern| pattern.is_match(slug))
}

/// Normalize a raw tenant slug and reject anything unsafe to embed in
/// database or role names.
///
/// The slug is trimmed and lowercased first, so `" Acme "` becomes `"acme"`.
pub fn validate_and_normalize_slug(raw_slug: Option<&str>) -> Result<String, ValidationError> {
    let raw_slug = raw_slug.ok_or(ValidationError::Missing("tenant_slug"))?;
    let slug = raw_slug.trim().to_lowercase();

    if slug.is_empty() {
        return Err(ValidationError::Missing("tenant_slug"));
    }

    if slug.contains('_') || slug.contains(' ') {
        return Err(ValidationError::IllegalCharacters);
    }

    if RESERVED_TENANT_SLUGS.contains(&slug.as_str()) {
        return Err(ValidationError::Reserved(slug));
    }

    if !matches_slug_pattern(&slug) {
        return Err(ValidationError::Malformed);
    }

    Ok(slug)
}

/// Require a non-blank company name, returning it trimmed
pub fn validate_company_name(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ValidationError::Missing("company_name")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(validate_and_normalize_slug(Some("  Acme-Corp ")).unwrap(), "acme-corp");
    }

    #[test]
    fn test_rejects_reserved_variants() {
        assert_eq!(
            validate_and_normalize_slug(Some("Template1")),
            Err(ValidationError::Reserved("template1".to_string()))
        );
        assert_eq!(
            validate_and_normalize_slug(Some("POSTGRES")),
            Err(ValidationError::Reserved("postgres".to_string()))
        );
    }

    #[test]
    fn test_rejects_underscores_and_spaces() {
        assert_eq!(
            validate_and_normalize_slug(Some("template_1")),
            Err(ValidationError::IllegalCharacters)
        );
        assert_eq!(
            validate_and_normalize_slug(Some("acme corp")),
            Err(ValidationError::IllegalCharacters)
        );
    }

    #[test]
    fn test_rejects_bad_length_and_symbols() {
        assert_eq!(validate_and_normalize_slug(Some("ab")), Err(ValidationError::Malformed));
        assert_eq!(
            validate_and_normalize_slug(Some(&"a".repeat(51))),
            Err(ValidationError::Malformed)
        );
        assert_eq!(validate_and_normalize_slug(Some("acme;drop")), Err(ValidationError::Malformed));
        assert_eq!(validate_and_normalize_slug(Some("café-bar")), Err(ValidationError::Malformed));
        assert!(validate_and_normalize_slug(Some(&"a".repeat(50))).is_ok());
        assert!(validate_and_normalize_slug(Some("acme-2024")).is_ok());
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(
            validate_and_normalize_slug(None),
            Err(ValidationError::Missing("tenant_slug"))
        );
        assert_eq!(
            validate_and_normalize_slug(Some("   ")),
            Err(ValidationError::Missing("tenant_slug"))
        );
        assert_eq!(
            validate_company_name(Some("  ")),
            Err(ValidationError::Missing("company_name"))
        );
        assert_eq!(validate_company_name(Some(" Acme Inc ")).unwrap(), "Acme Inc");
    }
}
