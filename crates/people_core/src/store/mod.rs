//! Directory store: the list view's state and its backend round trips.
//!
//! # Responsibility
//! - Own the loaded page, search term, pagination, delete confirmation,
//!   record form and notification banner in one value.
//! - Perform list/create/update/delete calls and re-fetch after mutations.
//!
//! # Invariants
//! - The loaded page is replaced wholesale; records are never edited in place.
//! - A failed call leaves the loaded page and pagination untouched.
//! - A response older than the latest issued fetch is discarded.
//! - At most one record awaits delete confirmation.
//! - No call is retried.

pub mod confirm;
pub mod notification;
pub mod pagination;
pub mod search;

use crate::api::backend::PeopleBackend;
use crate::api::error::{ApiResult, NetworkError};
use crate::clock::Clock;
use crate::config::{ClientConfig, SearchWindowing};
use crate::form::validation::{validate_fields, FieldErrors, FormField};
use crate::form::{FormError, FormSubmission, RecordForm};
use crate::model::person::{PersonFields, PersonId, PersonPayload, PersonRecord};
use chrono::NaiveDate;
use confirm::DeleteConfirmation;
use log::{error, info, warn};
use notification::{Notification, MSG_PERSON_ADDED, MSG_PERSON_DELETED, MSG_PERSON_UPDATED};
use pagination::{normalize_page_size, Pagination};
use search::{filter_records, window_filtered};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend call failed.
    Network(NetworkError),
    /// Input was rejected before any backend call.
    Validation(FieldErrors),
    /// Target record is not on the loaded page.
    NotFound(PersonId),
    /// Form operation requested while the form is closed.
    FormClosed,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(err) => write!(f, "{err}"),
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::NotFound(id) => write!(f, "person not found on current page: {id}"),
            Self::FormClosed => write!(f, "record form is not open"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NetworkError> for StoreError {
    fn from(value: NetworkError) -> Self {
        Self::Network(value)
    }
}

impl From<FormError> for StoreError {
    fn from(value: FormError) -> Self {
        match value {
            FormError::Closed => Self::FormClosed,
            FormError::Invalid(errors) => Self::Validation(errors),
        }
    }
}

/// Handle for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    /// Monotonic per store; higher is newer.
    pub sequence: u64,
    /// Page window the fetch was issued for.
    pub pagination: Pagination,
}

/// What happened to a fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Response replaced the loaded page.
    Applied { records: usize },
    /// A newer fetch was issued; the response was dropped.
    Stale,
}

/// A backend write built by the store and sent by the caller.
///
/// Splitting prepare, send and apply lets a front end run the network call
/// without holding the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingMutation {
    Create(PersonPayload),
    Update { id: PersonId, payload: PersonPayload },
    Delete(PersonId),
}

impl PendingMutation {
    /// Sends the request; the echoed record is ignored since a re-fetch follows.
    pub fn send<B: PeopleBackend>(&self, backend: &B) -> ApiResult<()> {
        match self {
            Self::Create(payload) => backend.create_person(payload).map(|_| ()),
            Self::Update { id, payload } => backend.update_person(id, payload).map(|_| ()),
            Self::Delete(id) => backend.delete_person(id),
        }
    }

    /// Target record; `None` for creates.
    pub fn person_id(&self) -> Option<&PersonId> {
        match self {
            Self::Create(_) => None,
            Self::Update { id, .. } | Self::Delete(id) => Some(id),
        }
    }

    fn event(&self) -> &'static str {
        match self {
            Self::Create(_) => "person_create",
            Self::Update { .. } => "person_update",
            Self::Delete(_) => "person_delete",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            Self::Create(_) => MSG_PERSON_ADDED,
            Self::Update { .. } => MSG_PERSON_UPDATED,
            Self::Delete(_) => MSG_PERSON_DELETED,
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            Self::Delete(_) => "Error deleting person",
            _ => "Error saving person",
        }
    }
}

/// State and operations of the people list view.
pub struct DirectoryStore<B: PeopleBackend, C: Clock> {
    backend: B,
    clock: C,
    records: Vec<PersonRecord>,
    search_term: String,
    pagination: Pagination,
    windowing: SearchWindowing,
    confirmation: DeleteConfirmation,
    form: RecordForm,
    notification: Option<Notification>,
    latest_request: u64,
}

impl<B: PeopleBackend, C: Clock> DirectoryStore<B, C> {
    /// Creates an empty store with default page size and windowing.
    pub fn new(backend: B, clock: C) -> Self {
        Self {
            backend,
            clock,
            records: Vec::new(),
            search_term: String::new(),
            pagination: Pagination::default(),
            windowing: SearchWindowing::default(),
            confirmation: DeleteConfirmation::Idle,
            form: RecordForm::new(),
            notification: None,
            latest_request: 0,
        }
    }

    /// Creates an empty store using configured page size and windowing.
    pub fn from_config(backend: B, clock: C, config: &ClientConfig) -> Self {
        let mut store = Self::new(backend, clock);
        store.pagination = Pagination::new(config.page_size);
        store.windowing = config.search_windowing;
        store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Initial fetch with the current page parameters.
    pub fn mount(&mut self) -> Result<LoadOutcome, StoreError> {
        self.reload()
    }

    /// Re-fetches the current page.
    pub fn reload(&mut self) -> Result<LoadOutcome, StoreError> {
        let Pagination {
            page_index,
            page_size,
        } = self.pagination;
        self.load_page(page_index, page_size)
    }

    /// Fetches one page and replaces the loaded records on success.
    pub fn load_page(&mut self, page_index: u32, page_size: u32) -> Result<LoadOutcome, StoreError> {
        let ticket = self.begin_load(page_index, page_size);
        let result = self
            .backend
            .list_people(ticket.pagination.wire_page(), ticket.pagination.page_size);
        self.apply_load(ticket, result)
    }

    /// Issues a new fetch sequence number; every older ticket becomes stale.
    pub fn begin_load(&mut self, page_index: u32, page_size: u32) -> LoadTicket {
        self.latest_request += 1;
        LoadTicket {
            sequence: self.latest_request,
            pagination: Pagination {
                page_index,
                page_size: normalize_page_size(page_size),
            },
        }
    }

    /// Applies a fetch response if `ticket` is still the latest request.
    ///
    /// List failures are logged only; no notification is raised for them.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: ApiResult<Vec<PersonRecord>>,
    ) -> Result<LoadOutcome, StoreError> {
        if ticket.sequence < self.latest_request {
            info!(
                "event=fetch_stale module=store status=discarded request_seq={} latest_seq={}",
                ticket.sequence, self.latest_request
            );
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                self.pagination = ticket.pagination;
                info!(
                    "event=people_fetch module=store status=ok page={} limit={} count={} request_seq={}",
                    ticket.pagination.wire_page(),
                    ticket.pagination.page_size,
                    count,
                    ticket.sequence
                );
                Ok(LoadOutcome::Applied { records: count })
            }
            Err(err) => {
                error!(
                    "event=people_fetch module=store status=error page={} limit={} request_seq={} error_code={} error={}",
                    ticket.pagination.wire_page(),
                    ticket.pagination.page_size,
                    ticket.sequence,
                    err.code(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Moves to another zero-based page and fetches it.
    pub fn set_page(&mut self, page_index: u32) -> Result<LoadOutcome, StoreError> {
        self.load_page(page_index, self.pagination.page_size)
    }

    /// Changes rows per page, returns to the first page and fetches it.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<LoadOutcome, StoreError> {
        self.load_page(0, page_size)
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn record(&self, id: &PersonId) -> Option<&PersonRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Looks a record up by its rendered id, for string-only callers.
    pub fn record_by_key(&self, key: &str) -> Option<&PersonRecord> {
        let key = key.trim();
        self.records
            .iter()
            .find(|record| record.id.to_string() == key)
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn windowing(&self) -> SearchWindowing {
        self.windowing
    }

    /// Updates the filter term. Never touches the network.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Loaded records matching the search term, windowed per policy.
    pub fn filtered_view(&self) -> Vec<&PersonRecord> {
        window_filtered(
            filter_records(&self.records, &self.search_term),
            self.pagination,
            self.windowing,
        )
    }

    /// Number of loaded records matching the search term, before windowing.
    pub fn filtered_count(&self) -> usize {
        filter_records(&self.records, &self.search_term).len()
    }

    /// Creates a person, then reloads the current page.
    pub fn create_record(&mut self, fields: &PersonFields) -> Result<(), StoreError> {
        let mutation = self.prepare_create(fields)?;
        self.run_mutation(&mutation)
    }

    /// Replaces a person's fields by id, then reloads the current page.
    pub fn update_record(&mut self, id: &PersonId, fields: &PersonFields) -> Result<(), StoreError> {
        let mutation = self.prepare_update(id, fields)?;
        self.run_mutation(&mutation)
    }

    /// Validates `fields` and builds the create request without sending it.
    pub fn prepare_create(&self, fields: &PersonFields) -> Result<PendingMutation, StoreError> {
        self.check_fields(fields)?;
        Ok(PendingMutation::Create(PersonPayload::for_create(fields)))
    }

    /// Validates `fields` and builds the update request without sending it.
    pub fn prepare_update(
        &self,
        id: &PersonId,
        fields: &PersonFields,
    ) -> Result<PendingMutation, StoreError> {
        self.check_fields(fields)?;
        Ok(PendingMutation::Update {
            id: id.clone(),
            payload: PersonPayload::for_update(id, fields),
        })
    }

    /// Records the outcome of a sent mutation: logs it and raises the banner.
    ///
    /// A successful delete also clears the confirmation if it still targets
    /// the deleted id. Does not re-fetch; callers follow up with a load.
    pub fn apply_mutation(
        &mut self,
        mutation: &PendingMutation,
        result: ApiResult<()>,
    ) -> Result<(), StoreError> {
        let event = mutation.event();
        match result {
            Ok(()) => {
                match mutation.person_id() {
                    Some(id) => info!("event={event} module=store status=ok person_id={id}"),
                    None => info!("event={event} module=store status=ok"),
                }
                if let PendingMutation::Delete(id) = mutation {
                    if self.confirmation.pending_id() == Some(id) {
                        self.confirmation = DeleteConfirmation::Idle;
                    }
                }
                self.notification = Some(Notification::success(mutation.success_message()));
                Ok(())
            }
            Err(err) => {
                match mutation.person_id() {
                    Some(id) => error!(
                        "event={event} module=store status=error person_id={id} error_code={} error={}",
                        err.code(),
                        err
                    ),
                    None => error!(
                        "event={event} module=store status=error error_code={} error={}",
                        err.code(),
                        err
                    ),
                }
                self.notification = Some(Notification::error(format!(
                    "{}: {err}",
                    mutation.failure_prefix()
                )));
                Err(err.into())
            }
        }
    }

    /// Asks for confirmation before deleting `id`; replaces any pending one.
    pub fn request_delete(&mut self, id: PersonId) {
        self.confirmation = DeleteConfirmation::PendingConfirmation(id);
    }

    /// Drops the pending confirmation without side effects.
    pub fn cancel_delete(&mut self) {
        self.confirmation = DeleteConfirmation::Idle;
    }

    pub fn confirmation(&self) -> &DeleteConfirmation {
        &self.confirmation
    }

    /// Deletes the pending record and reloads the current page.
    ///
    /// Returns `Ok(None)` when nothing is pending. On failure the
    /// confirmation stays pending so the user can retry or cancel.
    pub fn confirm_delete(&mut self) -> Result<Option<PersonId>, StoreError> {
        let Some(mutation) = self.prepare_delete() else {
            return Ok(None);
        };
        self.run_mutation(&mutation)?;
        Ok(mutation.person_id().cloned())
    }

    /// Delete request for the pending confirmation, if any.
    pub fn prepare_delete(&self) -> Option<PendingMutation> {
        self.confirmation
            .pending_id()
            .map(|id| PendingMutation::Delete(id.clone()))
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    /// Opens a blank add dialog.
    pub fn open_create_form(&mut self) {
        self.form.open_create();
    }

    /// Opens the edit dialog pre-filled from a loaded record.
    pub fn open_edit_form(&mut self, id: &PersonId) -> Result<(), StoreError> {
        let today = self.clock.today();
        let record = self
            .records
            .iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        self.form.open_edit(record, today);
        Ok(())
    }

    /// Closes the dialog without side effects.
    pub fn cancel_form(&mut self) {
        self.form.close();
    }

    pub fn set_form_first_name(&mut self, value: impl Into<String>) {
        let today = self.clock.today();
        self.form.set_first_name(value, today);
    }

    pub fn set_form_last_name(&mut self, value: impl Into<String>) {
        let today = self.clock.today();
        self.form.set_last_name(value, today);
    }

    pub fn set_form_date_of_birth(&mut self, value: Option<NaiveDate>) {
        let today = self.clock.today();
        self.form.set_date_of_birth(value, today);
    }

    pub fn blur_form_field(&mut self, field: FormField) {
        let today = self.clock.today();
        self.form.blur(field, today);
    }

    /// Validates the open form and sends it as a create or update.
    ///
    /// The form closes only after the backend accepted the submission;
    /// validation or network failures leave it open.
    pub fn submit_form(&mut self) -> Result<(), StoreError> {
        let mutation = self.prepare_submit()?;
        let result = mutation.send(&self.backend);
        self.apply_submit(&mutation, result)?;
        self.reload_after_mutation();
        Ok(())
    }

    /// Validates the open form and builds its request without sending it.
    pub fn prepare_submit(&mut self) -> Result<PendingMutation, StoreError> {
        let today = self.clock.today();
        match self.form.submit(today) {
            Ok(FormSubmission::Create(fields)) => {
                Ok(PendingMutation::Create(PersonPayload::for_create(&fields)))
            }
            Ok(FormSubmission::Update { id, fields }) => Ok(PendingMutation::Update {
                payload: PersonPayload::for_update(&id, &fields),
                id,
            }),
            Err(err) => {
                if let FormError::Invalid(errors) = &err {
                    warn!(
                        "event=form_submit module=store status=invalid error_count={}",
                        errors.iter().count()
                    );
                }
                Err(err.into())
            }
        }
    }

    /// [`apply_mutation`](Self::apply_mutation) for a form submission;
    /// closes the form on success.
    pub fn apply_submit(
        &mut self,
        mutation: &PendingMutation,
        result: ApiResult<()>,
    ) -> Result<(), StoreError> {
        self.apply_mutation(mutation, result)?;
        self.form.close();
        Ok(())
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn check_fields(&self, fields: &PersonFields) -> Result<(), StoreError> {
        let errors = validate_fields(fields, self.clock.today());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }

    fn run_mutation(&mut self, mutation: &PendingMutation) -> Result<(), StoreError> {
        let result = mutation.send(&self.backend);
        self.apply_mutation(mutation, result)?;
        self.reload_after_mutation();
        Ok(())
    }

    /// A failed re-fetch is logged by `apply_load` and does not undo the
    /// mutation's success.
    fn reload_after_mutation(&mut self) {
        let _ = self.reload();
    }
}
