use crate::{
    users::dto::{RegisterRequest, UpdateUserRequest},
    validation::{is_valid_email, FieldErrors},
};

const MIN_PASSWORD_LEN: usize = 8;

/// Uppercase letter, digit and a symbol (anything outside [A-Za-z0-9_]).
fn has_required_classes(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric() && c != '_')
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", "should be at least 8 characters");
    }
    if !has_required_classes(password) {
        errors.push("password", "must contain letter, number and symbol");
    }
}

pub fn validate_register(req: &RegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match req.name.as_deref() {
        Some(name) if !name.is_empty() => {}
        _ => errors.push("name", "is required"),
    }

    match req.email.as_deref() {
        Some(email) if !email.is_empty() => {
            if !is_valid_email(email) {
                errors.push("email", "format is not valid");
            }
        }
        _ => errors.push("email", "is required"),
    }

    match req.password.as_deref() {
        Some(password) if !password.is_empty() => check_password(password, &mut errors),
        _ => errors.push("password", "is required"),
    }

    errors
}

pub fn validate_update(req: &UpdateUserRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if req.email.is_some() {
        errors.push("email", "email is not allowed");
    }

    if let Some(password) = req.password.as_deref() {
        check_password(password, &mut errors);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: name.map(String::from),
            email: email.map(String::from),
            password: password.map(String::from),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let errors = validate_register(&register(Some("A"), Some("a@a.com"), Some("Weak1$pw")));
        assert!(errors.is_empty());
    }

    #[test]
    fn short_weak_password_collects_both_messages() {
        let errors = validate_register(&register(Some("A"), Some("bad-email"), Some("weak")));
        assert_eq!(
            errors.messages("password"),
            [
                "should be at least 8 characters",
                "must contain letter, number and symbol"
            ]
        );
        assert_eq!(errors.messages("email"), ["format is not valid"]);
    }

    #[test]
    fn missing_fields_are_required() {
        let errors = validate_register(&register(None, None, None));
        assert_eq!(errors.messages("name"), ["is required"]);
        assert_eq!(errors.messages("email"), ["is required"]);
        assert_eq!(errors.messages("password"), ["is required"]);
    }

    #[test]
    fn long_password_still_needs_all_classes() {
        let errors = validate_register(&register(Some("A"), Some("a@a.com"), Some("alllowercase1$")));
        assert_eq!(
            errors.messages("password"),
            ["must contain letter, number and symbol"]
        );
        // Underscore does not count as a symbol.
        let errors = validate_register(&register(Some("A"), Some("a@a.com"), Some("Upper_123")));
        assert_eq!(
            errors.messages("password"),
            ["must contain letter, number and symbol"]
        );
    }

    #[test]
    fn update_forbids_email() {
        let errors = validate_update(&UpdateUserRequest {
            name: Some("B".into()),
            password: None,
            email: Some("x@x.com".into()),
        });
        assert_eq!(errors.messages("email"), ["email is not allowed"]);
    }

    #[test]
    fn update_without_fields_is_valid() {
        let errors = validate_update(&UpdateUserRequest {
            name: None,
            password: None,
            email: None,
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn update_password_still_checked() {
        let errors = validate_update(&UpdateUserRequest {
            name: None,
            password: Some("weak".into()),
            email: None,
        });
        assert_eq!(errors.messages("password").len(), 2);
    }
}
