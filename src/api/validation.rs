/// Maximum length of an email address (RFC 5321 path limit)
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum username length
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Validate username format: letters, digits and `@.+-_`, up to 150 characters
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("This field may not be blank.".to_string());
    }

    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(format!("Ensure this field has no more than {} characters.", USERNAME_MAX_LENGTH));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    Ok(())
}

/// Validate email address syntax
///
/// Checks a single `@` separating a non-empty local part from a dotted domain
/// whose labels are alphanumeric with inner hyphens, and a local part made of
/// dot-separated atoms.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    const INVALID: &str = "Enter a valid email address.";

    if email.is_empty() || email.len() > EMAIL_MAX_LENGTH {
        return Err(INVALID.to_string());
    }

    let (local, domain) = email.rsplit_once('@').ok_or_else(|| INVALID.to_string())?;

    let local_ok = !local.is_empty()
        && local.len() <= 64
        && local.split('.').all(|atom| {
            !atom.is_empty()
                && atom
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c))
        });

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    if local_ok && domain_ok {
        Ok(())
    } else {
        Err(INVALID.to_string())
    }
}

/// Lowercase the domain part; the local part is case-sensitive
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        for email in ["a@x.com", "x@y.com", "first.last+tag@mail.example.org", "o'neil@clinic-1.co.uk"] {
            assert!(validate_email_format(email).is_ok(), "{email} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "plain", "@x.com", "a@", "a@x", "a@@x.com", "a b@x.com", "a..b@x.com", "a@-x.com", "a@x.c0m"] {
            assert!(validate_email_format(email).is_err(), "{email} should be invalid");
        }
    }

    #[test]
    fn normalizes_domain_only() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "Alice@example.com");
    }

    #[test]
    fn username_rules() {
        assert!(validate_username_format("alice").is_ok());
        assert!(validate_username_format("dr.who+1@clinic").is_ok());
        assert!(validate_username_format("").is_err());
        assert!(validate_username_format("bad name").is_err());
        assert!(validate_username_format(&"x".repeat(151)).is_err());
    }
}
