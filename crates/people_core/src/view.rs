//! Presentation-free projections of store state for front ends.

use crate::api::backend::PeopleBackend;
use crate::clock::Clock;
use crate::form::validation::FormField;
use crate::form::RecordForm;
use crate::model::person::PersonRecord;
use crate::store::notification::Notification;
use crate::store::pagination::PAGE_SIZE_OPTIONS;
use crate::store::DirectoryStore;
use chrono::{Local, NaiveDate};
use std::fmt::Write;

/// One table row, with dates rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    /// Server-computed age; blank when the backend sent none.
    pub age: String,
    pub date_created: String,
}

impl PersonRow {
    pub fn from_record(record: &PersonRecord, date_format: &str) -> Self {
        Self {
            id: record.id.to_string(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            date_of_birth: format_display_date(record.date_of_birth, date_format),
            age: record.age.map(|age| age.to_string()).unwrap_or_default(),
            date_created: record
                .date_created
                .map(|created| {
                    format_display_date(created.with_timezone(&Local).date_naive(), date_format)
                })
                .unwrap_or_default(),
        }
    }
}

/// Open dialog as a front end renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub title: String,
    pub submit_label: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Read-only derived age; blank until a past date of birth is set.
    pub age: String,
    /// Visible inline errors, in field order.
    pub errors: Vec<(FormField, String)>,
}

impl FormSnapshot {
    pub fn capture(form: &RecordForm) -> Option<Self> {
        if !form.is_open() {
            return None;
        }
        let values = form.values();
        Some(Self {
            title: form.title().to_string(),
            submit_label: form.submit_label().to_string(),
            first_name: values.first_name.clone(),
            last_name: values.last_name.clone(),
            date_of_birth: values.date_of_birth,
            age: form.age().map(|age| age.to_string()).unwrap_or_default(),
            errors: FormField::ALL
                .into_iter()
                .filter_map(|field| {
                    form.visible_error(field)
                        .map(|err| (field, err.message().to_string()))
                })
                .collect(),
        })
    }
}

/// Everything the list view renders at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub rows: Vec<PersonRow>,
    pub filtered_count: usize,
    pub page_index: u32,
    pub page_size: u32,
    pub page_size_options: Vec<u32>,
    pub search_term: String,
    pub pending_delete: Option<String>,
    pub form: Option<FormSnapshot>,
    pub notification: Option<Notification>,
}

impl DirectorySnapshot {
    pub fn capture<B: PeopleBackend, C: Clock>(
        store: &DirectoryStore<B, C>,
        date_format: &str,
    ) -> Self {
        let pagination = store.pagination();
        Self {
            rows: store
                .filtered_view()
                .into_iter()
                .map(|record| PersonRow::from_record(record, date_format))
                .collect(),
            filtered_count: store.filtered_count(),
            page_index: pagination.page_index,
            page_size: pagination.page_size,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            search_term: store.search_term().to_string(),
            pending_delete: store
                .confirmation()
                .pending_id()
                .map(|id| id.to_string()),
            form: FormSnapshot::capture(store.form()),
            notification: store.notification().cloned(),
        }
    }
}

/// Renders `date` with a strftime `format`, falling back to ISO form when the
/// format is invalid.
pub fn format_display_date(date: NaiveDate, format: &str) -> String {
    let mut rendered = String::new();
    if write!(rendered, "{}", date.format(format)).is_err() {
        return date.to_string();
    }
    rendered
}
