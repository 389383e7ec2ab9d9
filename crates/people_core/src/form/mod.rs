//! Add/edit record form.
//!
//! # Responsibility
//! - Hold the editable values of one record, their validation state and the
//!   derived age.
//! - Turn valid input into a create or update submission.
//!
//! # Invariants
//! - Every value change re-validates all fields; errors become visible once
//!   a field is touched (blurred or submitted).
//! - Age is recomputed synchronously whenever the date of birth changes and is
//!   never part of a submission.
//! - A closed form holds no values.

pub mod validation;

use crate::clock::age_on;
use crate::model::person::{PersonFields, PersonId, PersonPayload, PersonRecord};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use validation::{
    validate_date_of_birth, validate_first_name, validate_last_name, FieldErrors, FormField,
    ValidationError,
};

/// Which record the open form targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(PersonId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Open(FormMode),
}

/// Raw field values as typed, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Touched {
    first_name: bool,
    last_name: bool,
    date_of_birth: bool,
}

impl Touched {
    fn mark(&mut self, field: FormField) {
        match field {
            FormField::FirstName => self.first_name = true,
            FormField::LastName => self.last_name = true,
            FormField::DateOfBirth => self.date_of_birth = true,
        }
    }

    fn get(&self, field: FormField) -> bool {
        match field {
            FormField::FirstName => self.first_name,
            FormField::LastName => self.last_name,
            FormField::DateOfBirth => self.date_of_birth,
        }
    }

    fn all() -> Self {
        Self {
            first_name: true,
            last_name: true,
            date_of_birth: true,
        }
    }
}

/// Validated result of a form submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Create(PersonFields),
    Update { id: PersonId, fields: PersonFields },
}

impl FormSubmission {
    pub fn payload(&self) -> PersonPayload {
        match self {
            Self::Create(fields) => PersonPayload::for_create(fields),
            Self::Update { id, fields } => PersonPayload::for_update(id, fields),
        }
    }
}

/// Form submit failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Submit was requested while no dialog is open.
    Closed,
    /// One or more fields are invalid.
    Invalid(FieldErrors),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "record form is not open"),
            Self::Invalid(errors) => write!(f, "{errors}"),
        }
    }
}

impl Error for FormError {}

/// Record form state machine: `Closed -> Open(Create | Edit) -> Closed`.
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    state: FormState,
    values: FormValues,
    touched: Touched,
    errors: FieldErrors,
    age: Option<u32>,
}

impl RecordForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open(_))
    }

    pub fn mode(&self) -> Option<&FormMode> {
        match &self.state {
            FormState::Open(mode) => Some(mode),
            FormState::Closed => None,
        }
    }

    /// Opens a blank form for a new record.
    pub fn open_create(&mut self) {
        *self = Self {
            state: FormState::Open(FormMode::Create),
            ..Self::default()
        };
    }

    /// Opens the form pre-filled from `record`, with its age pre-computed.
    pub fn open_edit(&mut self, record: &PersonRecord, today: NaiveDate) {
        *self = Self {
            state: FormState::Open(FormMode::Edit(record.id.clone())),
            values: FormValues {
                first_name: record.first_name.clone(),
                last_name: record.last_name.clone(),
                date_of_birth: Some(record.date_of_birth),
            },
            age: age_on(record.date_of_birth, today),
            ..Self::default()
        };
        self.revalidate(today);
    }

    /// Closes the form and drops its values.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn set_first_name(&mut self, value: impl Into<String>, today: NaiveDate) {
        if self.is_open() {
            self.values.first_name = value.into();
            self.revalidate(today);
        }
    }

    pub fn set_last_name(&mut self, value: impl Into<String>, today: NaiveDate) {
        if self.is_open() {
            self.values.last_name = value.into();
            self.revalidate(today);
        }
    }

    /// Sets the date of birth and recomputes the derived age.
    pub fn set_date_of_birth(&mut self, value: Option<NaiveDate>, today: NaiveDate) {
        if self.is_open() {
            self.values.date_of_birth = value;
            self.age = value.and_then(|date_of_birth| age_on(date_of_birth, today));
            self.revalidate(today);
        }
    }

    /// Marks `field` touched so its error becomes visible.
    pub fn blur(&mut self, field: FormField, today: NaiveDate) {
        if self.is_open() {
            self.touched.mark(field);
            self.revalidate(today);
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Derived age in completed years; `None` without a past date of birth.
    pub fn age(&self) -> Option<u32> {
        self.age
    }

    /// Current errors of every field, touched or not.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error to render next to `field`.
    pub fn visible_error(&self, field: FormField) -> Option<ValidationError> {
        if self.touched.get(field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    /// Validates every field and assembles the submission.
    ///
    /// The form stays open either way; the caller closes it once the backend
    /// call succeeds.
    pub fn submit(&mut self, today: NaiveDate) -> Result<FormSubmission, FormError> {
        let FormState::Open(mode) = &self.state else {
            return Err(FormError::Closed);
        };
        let mode = mode.clone();
        self.touched = Touched::all();
        self.revalidate(today);
        if !self.errors.is_empty() {
            return Err(FormError::Invalid(self.errors.clone()));
        }
        let Some(date_of_birth) = self.values.date_of_birth else {
            return Err(FormError::Invalid(self.errors.clone()));
        };

        let fields = PersonFields {
            first_name: self.values.first_name.clone(),
            last_name: self.values.last_name.clone(),
            date_of_birth,
        };
        Ok(match mode {
            FormMode::Create => FormSubmission::Create(fields),
            FormMode::Edit(id) => FormSubmission::Update { id, fields },
        })
    }

    /// Dialog title for the current mode.
    pub fn title(&self) -> &'static str {
        match self.mode() {
            Some(FormMode::Edit(_)) => "Edit Person",
            _ => "Add New Person",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode() {
            Some(FormMode::Edit(_)) => "Update",
            _ => "Add",
        }
    }

    fn revalidate(&mut self, today: NaiveDate) {
        self.errors = FieldErrors {
            first_name: validate_first_name(&self.values.first_name),
            last_name: validate_last_name(&self.values.last_name),
            date_of_birth: validate_date_of_birth(self.values.date_of_birth, today),
        };
    }
}
