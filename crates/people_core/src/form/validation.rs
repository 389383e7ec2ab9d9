//! Field validation rules for the record form.
//!
//! # Invariants
//! - Date-of-birth bounds are inclusive: today and exactly 100 years ago pass.
//! - Whitespace-only names count as empty.

use crate::clock::hundred_years_before;
use crate::model::person::PersonFields;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FirstName,
    LastName,
    DateOfBirth,
}

impl FormField {
    pub const ALL: [FormField; 3] = [Self::FirstName, Self::LastName, Self::DateOfBirth];

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::DateOfBirth => "Date of Birth",
        }
    }
}

/// Field-level, user-correctable validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    FirstNameRequired,
    LastNameRequired,
    DateOfBirthRequired,
    DateOfBirthInFuture,
    DateOfBirthTooOld,
}

impl ValidationError {
    pub fn field(self) -> FormField {
        match self {
            Self::FirstNameRequired => FormField::FirstName,
            Self::LastNameRequired => FormField::LastName,
            Self::DateOfBirthRequired | Self::DateOfBirthInFuture | Self::DateOfBirthTooOld => {
                FormField::DateOfBirth
            }
        }
    }

    /// Inline message shown next to the field.
    pub fn message(self) -> &'static str {
        match self {
            Self::FirstNameRequired => "First Name is required",
            Self::LastNameRequired => "Last Name is required",
            Self::DateOfBirthRequired => "Date of Birth is required",
            Self::DateOfBirthInFuture => "Date of Birth cannot be in the future",
            Self::DateOfBirthTooOld => "Date of Birth cannot be more than 100 years ago",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for ValidationError {}

/// At most one error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub first_name: Option<ValidationError>,
    pub last_name: Option<ValidationError>,
    pub date_of_birth: Option<ValidationError>,
}

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<ValidationError> {
        match field {
            FormField::FirstName => self.first_name,
            FormField::LastName => self.last_name,
            FormField::DateOfBirth => self.date_of_birth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = ValidationError> + '_ {
        FormField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self.iter().map(ValidationError::message).collect::<Vec<_>>();
        f.write_str(&messages.join("; "))
    }
}

pub fn validate_first_name(value: &str) -> Option<ValidationError> {
    value
        .trim()
        .is_empty()
        .then_some(ValidationError::FirstNameRequired)
}

pub fn validate_last_name(value: &str) -> Option<ValidationError> {
    value
        .trim()
        .is_empty()
        .then_some(ValidationError::LastNameRequired)
}

pub fn validate_date_of_birth(
    value: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<ValidationError> {
    let Some(date_of_birth) = value else {
        return Some(ValidationError::DateOfBirthRequired);
    };
    if date_of_birth > today {
        return Some(ValidationError::DateOfBirthInFuture);
    }
    if date_of_birth < hundred_years_before(today) {
        return Some(ValidationError::DateOfBirthTooOld);
    }
    None
}

/// Validates an already-assembled field set, as write paths do.
pub fn validate_fields(fields: &PersonFields, today: NaiveDate) -> FieldErrors {
    FieldErrors {
        first_name: validate_first_name(&fields.first_name),
        last_name: validate_last_name(&fields.last_name),
        date_of_birth: validate_date_of_birth(Some(fields.date_of_birth), today),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        validate_date_of_birth, validate_first_name, validate_last_name, FieldErrors,
        ValidationError,
    };
    use chrono::{Days, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn names_are_required() {
        assert_eq!(
            validate_first_name(""),
            Some(ValidationError::FirstNameRequired)
        );
        assert_eq!(
            validate_last_name("   "),
            Some(ValidationError::LastNameRequired)
        );
        assert_eq!(validate_first_name("Anna"), None);
    }

    #[test]
    fn date_of_birth_bounds_are_inclusive() {
        let today = today();
        let oldest = NaiveDate::from_ymd_opt(1924, 6, 15).unwrap();
        assert_eq!(validate_date_of_birth(Some(today), today), None);
        assert_eq!(validate_date_of_birth(Some(oldest), today), None);
        assert_eq!(
            validate_date_of_birth(Some(today + Days::new(1)), today),
            Some(ValidationError::DateOfBirthInFuture)
        );
        assert_eq!(
            validate_date_of_birth(Some(oldest - Days::new(1)), today),
            Some(ValidationError::DateOfBirthTooOld)
        );
        assert_eq!(
            validate_date_of_birth(None, today),
            Some(ValidationError::DateOfBirthRequired)
        );
    }

    #[test]
    fn leap_day_today_rejects_february_28_a_century_back() {
        let today = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
        assert_eq!(
            validate_date_of_birth(NaiveDate::from_ymd_opt(1900, 2, 28), today),
            Some(ValidationError::DateOfBirthTooOld)
        );
        assert_eq!(
            validate_date_of_birth(NaiveDate::from_ymd_opt(1900, 3, 1), today),
            None
        );
    }

    #[test]
    fn messages_match_inline_copy() {
        assert_eq!(
            ValidationError::DateOfBirthInFuture.to_string(),
            "Date of Birth cannot be in the future"
        );
        assert_eq!(
            ValidationError::DateOfBirthTooOld.to_string(),
            "Date of Birth cannot be more than 100 years ago"
        );
    }

    #[test]
    fn field_errors_iterate_in_field_order() {
        let errors = FieldErrors {
            first_name: None,
            last_name: Some(ValidationError::LastNameRequired),
            date_of_birth: Some(ValidationError::DateOfBirthRequired),
        };
        assert!(!errors.is_empty());
        assert_eq!(
            errors.iter().collect::<Vec<_>>(),
            vec![
                ValidationError::LastNameRequired,
                ValidationError::DateOfBirthRequired
            ]
        );
        assert_eq!(
            errors.to_string(),
            "Last Name is required; Date of Birth is required"
        );
        assert!(FieldErrors::default().is_empty());
    }
}
