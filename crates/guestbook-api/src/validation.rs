use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}.!#$%&'*+/=?^_`{|}~-]+@[\p{L}\p{N}-]+(?:\.[\p{L}\p{N}-]+)+$")
        .expect("compile email regex")
});

const EMAIL_MAX: usize = 254;
pub const PASSWORD_MIN: usize = 8;

/// The domain part must contain at least one dot.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX && EMAIL_REGEX.is_match(email)
}

/// Lowercases the domain part; the local part is kept as typed.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_owned(),
    }
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));

        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email(&format!("{}@x.com", "a".repeat(250))));
    }

    #[test]
    fn test_internationalized_email() {
        assert!(is_valid_email("josé@exämple.com"));
        assert!(is_valid_email("用户@例子.中国"));
        assert!(!is_valid_email("josé@exämple"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("Alice@X.COM"), "Alice@x.com");
        assert_eq!(normalize_email("a@b@Example.ORG"), "a@b@example.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_is_valid_password() {
        assert!(is_valid_password("password1"));
        assert!(is_valid_password("12345678"));
        assert!(!is_valid_password("short"));
        assert!(!is_valid_password(""));
    }
}
