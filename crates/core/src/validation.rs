//! Form validation for login, registration and listings.
//!
//! The rules are declared with `#[derive(Validate)]` on the request types;
//! this module holds the custom checks they reference and folds
//! [`ValidationErrors`] into one [`CoreError::Validation`] message of
//! `field: reason` entries joined by `"; "`.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::categories;
use crate::error::CoreError;
use crate::types::{ListingForm, LoginRequest, RegisterRequest};

pub fn validate_login(req: &LoginRequest) -> Result<(), CoreError> {
    check(req)
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), CoreError> {
    check(req)
}

/// Validate the post/edit listing form.
///
/// Name, price, category and sub-category are required. The price must
/// parse as a finite non-negative number and the category pair must exist
/// in the catalogue.
pub fn validate_listing(form: &ListingForm) -> Result<(), CoreError> {
    check(form)
}

fn check<T: Validate>(value: &T) -> Result<(), CoreError> {
    value
        .validate()
        .map_err(|errors| CoreError::Validation(format_validation_errors(&errors)))
}

/// `field: reason` entries sorted by field. Struct-level errors carry no
/// field prefix.
fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, field_errors) in fields {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| match error.code.as_ref() {
                    "email" => "Invalid email address".to_string(),
                    "length" => "Invalid length".to_string(),
                    _ => format!("Invalid {field}"),
                });
            if field == "__all__" {
                messages.push(message);
            } else {
                messages.push(format!("{field}: {message}"));
            }
        }
    }

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub(crate) fn validate_price(price: &str) -> Result<(), ValidationError> {
    let price = price.trim();
    if price.is_empty() {
        return Err(invalid("required", "required"));
    }
    match price.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
        _ => Err(invalid("price", "must be a non-negative number")),
    }
}

pub(crate) fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.is_empty() {
        return Err(invalid("required", "required"));
    }
    match categories::find(category) {
        Some(_) => Ok(()),
        None => Err(invalid("category", format!("unknown category '{category}'"))),
    }
}

/// Unknown categories are already reported on the category field.
pub(crate) fn validate_sub_category(form: &ListingForm) -> Result<(), ValidationError> {
    if form.item_sub_category.is_empty() || categories::find(&form.item_category).is_none() {
        return Ok(());
    }
    if categories::contains(&form.item_category, &form.item_sub_category) {
        Ok(())
    } else {
        Err(invalid(
            "sub_category",
            format!(
                "'{}' is not a sub-category of '{}'",
                form.item_sub_category, form.item_category
            ),
        ))
    }
}
