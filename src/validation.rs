//! Client-side form validation.
//!
//! Fields opt in with `data-validate="<rule>"` and are checked live on every
//! `input` event. Submissions additionally run [`require_fields`] so an
//! incomplete form never reaches the network.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element, Event};

use crate::constants::{CSS_INVALID_FEEDBACK, CSS_IS_INVALID, CSS_IS_VALID, MSG_REQUIRED_FIELDS};
use crate::dom_utils;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Email,
    Phone,
    Cedula,
    Number,
}

impl FieldRule {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "required" => Some(FieldRule::Required),
            "email" => Some(FieldRule::Email),
            "phone" => Some(FieldRule::Phone),
            "cedula" => Some(FieldRule::Cedula),
            "number" => Some(FieldRule::Number),
            _ => None,
        }
    }
}

pub fn validate(rule: FieldRule, value: &str) -> Result<(), ValidationError> {
    let ok = match rule {
        FieldRule::Required => !value.trim().is_empty(),
        FieldRule::Email => is_email(value),
        FieldRule::Phone => is_phone(value),
        FieldRule::Cedula => is_cedula(value),
        FieldRule::Number => {
            let trimmed = value.trim();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_ok()
        }
    };
    if ok {
        Ok(())
    } else {
        Err(match rule {
            FieldRule::Required => ValidationError::Required,
            FieldRule::Email => ValidationError::Email,
            FieldRule::Phone => ValidationError::Phone,
            FieldRule::Cedula => ValidationError::Cedula,
            FieldRule::Number => ValidationError::Number,
        })
    }
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain
/// with text on both sides.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Digits, spaces, `-`, `+`, parentheses; at least ten characters.
fn is_phone(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '+' | '(' | ')'))
        && value.chars().count() >= 10
}

/// Colombian national id: 8 to 10 digits.
fn is_cedula(value: &str) -> bool {
    (8..=10).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Block a submission when any `(name, value)` pair is blank.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), ValidationError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        log::debug!("submission blocked, missing: {}", missing.join(", "));
        Err(ValidationError::MissingFields(MSG_REQUIRED_FIELDS.to_string()))
    }
}

/// Check one `[data-validate]` control and reflect the result in its
/// classes and sibling `.invalid-feedback`. Unknown rules pass.
pub fn validate_field(document: &Document, field: &Element) -> Result<bool, JsValue> {
    let Some(rule) = field
        .get_attribute("data-validate")
        .as_deref()
        .and_then(FieldRule::parse)
    else {
        return Ok(true);
    };

    let result = validate(rule, &dom_utils::element_value(field));
    let classes = field.class_list();
    classes.remove_2(CSS_IS_VALID, CSS_IS_INVALID)?;
    classes.add_1(if result.is_ok() { CSS_IS_VALID } else { CSS_IS_INVALID })?;

    let Some(parent) = field.parent_element() else {
        return Ok(result.is_ok());
    };
    let feedback = parent.query_selector(&format!(".{}", CSS_INVALID_FEEDBACK))?;
    match (&result, feedback) {
        (Err(e), Some(existing)) => existing.set_text_content(Some(&e.to_string())),
        (Err(e), None) => {
            let el = dom_utils::create_text(document, "div", Some(CSS_INVALID_FEEDBACK), &e.to_string())?;
            parent.append_child(&el)?;
        }
        (Ok(()), Some(existing)) => existing.remove(),
        (Ok(()), None) => {}
    }
    Ok(result.is_ok())
}

/// Validate every `[data-validate]` control below `form`; returns whether
/// all of them passed.
pub fn validate_form(document: &Document, form: &Element) -> Result<bool, JsValue> {
    let mut all_ok = true;
    for field in dom_utils::query_all(form, "[data-validate]") {
        all_ok &= validate_field(document, &field)?;
    }
    Ok(all_ok)
}

/// Document-level live validation for `[data-validate]` controls.
pub fn install_live_validation(document: &Document) -> Result<(), JsValue> {
    let doc = document.clone();
    let cb = Closure::wrap(Box::new(move |e: Event| {
        let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if target.matches("[data-validate]").unwrap_or(false) {
            if let Err(err) = validate_field(&doc, &target) {
                log::warn!("field validation failed: {:?}", err);
            }
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_ignores_whitespace() {
        assert_eq!(validate(FieldRule::Required, "   "), Err(ValidationError::Required));
        assert!(validate(FieldRule::Required, " x ").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate(FieldRule::Email, "ana@registro.gov.co").is_ok());
        assert!(validate(FieldRule::Email, "ana@registro").is_err());
        assert!(validate(FieldRule::Email, "ana@.co").is_err());
        assert!(validate(FieldRule::Email, "a b@x.co").is_err());
        assert!(validate(FieldRule::Email, "a@b@x.co").is_err());
    }

    #[test]
    fn phone_needs_ten_characters() {
        assert!(validate(FieldRule::Phone, "+57 (300) 123-4567").is_ok());
        assert!(validate(FieldRule::Phone, "300123456").is_err());
        assert!(validate(FieldRule::Phone, "300-ABC-4567").is_err());
    }

    #[test]
    fn cedula_is_eight_to_ten_digits() {
        assert!(validate(FieldRule::Cedula, "12345678").is_ok());
        assert!(validate(FieldRule::Cedula, "1234567890").is_ok());
        assert!(validate(FieldRule::Cedula, "1234567").is_err());
        assert!(validate(FieldRule::Cedula, "12345678901").is_err());
        assert!(validate(FieldRule::Cedula, "1234567a").is_err());
    }

    #[test]
    fn number_rule() {
        assert!(validate(FieldRule::Number, "42.5").is_ok());
        assert!(validate(FieldRule::Number, "").is_err());
        assert!(validate(FieldRule::Number, "cuarenta").is_err());
    }

    #[test]
    fn messages_match_the_forms() {
        assert_eq!(ValidationError::Cedula.to_string(), "Ingresa una cédula válida (8-10 dígitos)");
    }

    #[test]
    fn require_fields_blocks_blank_values() {
        assert!(require_fields(&[("nombre", "Ana"), ("cedula", "123")]).is_ok());
        assert_eq!(
            require_fields(&[("nombre", "Ana"), ("telefono", " ")]),
            Err(ValidationError::MissingFields(MSG_REQUIRED_FIELDS.to_string()))
        );
    }

    #[test]
    fn unknown_rules_do_not_parse() {
        assert_eq!(FieldRule::parse("cedula"), Some(FieldRule::Cedula));
        assert_eq!(FieldRule::parse("zip"), None);
    }
}
