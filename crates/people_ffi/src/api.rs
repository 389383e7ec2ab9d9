//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the directory view-model to Dart via FRB as use-case level
//!   functions.
//! - Return one flat response envelope carrying the state to render.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Calls that reach the network are async on the Dart side and never hold
//!   the store lock while a request is out; pure state calls stay `sync`.
//! - One directory store per process. A response that lost a race to a newer
//!   fetch, or to a reopened directory, is discarded.
//! - List fetch failures come back as `ok=false` for diagnostics only; the UI
//!   shows banners from `view.notification`, never from `message`.

use log::{info, warn};
use people_core::model::wire::parse_calendar_date;
use people_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ApiResult, ClientConfig, DirectorySnapshot, DirectoryStore, FormField, FormSnapshot,
    HttpPeopleBackend, LoadOutcome, LoadTicket, NotificationKind, PeopleBackend, PendingMutation,
    PersonId, StoreError, SystemClock,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

type Store = DirectoryStore<HttpPeopleBackend, SystemClock>;
type ApplyMutation = fn(&mut Store, &PendingMutation, ApiResult<()>) -> Result<(), StoreError>;

static DIRECTORY: OnceLock<Mutex<Option<FfiDirectory>>> = OnceLock::new();
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

struct FfiDirectory {
    store: Store,
    date_format: String,
    /// Changes on every `directory_open`; in-flight results for an older
    /// generation are dropped.
    generation: u64,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRowItem {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub age: String,
    pub date_created: String,
}

/// Inline error next to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorItem {
    /// `first_name|last_name|date_of_birth`.
    pub field: String,
    pub message: String,
}

/// Open add/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: String,
    pub submit_label: String,
    pub first_name: String,
    pub last_name: String,
    /// ISO calendar date, for the date picker.
    pub date_of_birth: Option<String>,
    /// Read-only derived age.
    pub age: String,
    pub errors: Vec<FieldErrorItem>,
}

/// Banner to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    /// `success|error`.
    pub kind: String,
    pub message: String,
    pub auto_hide_ms: u32,
}

/// Everything the list screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryView {
    pub rows: Vec<PersonRowItem>,
    pub filtered_count: u32,
    pub page_index: u32,
    pub page_size: u32,
    pub page_size_options: Vec<u32>,
    pub search_term: String,
    /// Set while the delete confirmation dialog is open.
    pub pending_delete_id: Option<String>,
    pub form: Option<FormView>,
    pub notification: Option<NotificationItem>,
}

/// Response envelope for every directory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResponse {
    /// Whether the requested action succeeded.
    pub ok: bool,
    /// Human-readable diagnostics.
    pub message: String,
    /// State after the action; `None` when no directory is open.
    pub view: Option<DirectoryView>,
}

/// Opens (or re-opens) the directory and loads the first page.
///
/// `base_url` overrides `PEOPLE_BASE_URL`; other settings come from the
/// environment.
pub fn directory_open(base_url: Option<String>) -> DirectoryResponse {
    let config = match resolve_config(base_url) {
        Ok(config) => config,
        Err(err) => return failure_without_view(format!("directory_open failed: {err}")),
    };
    let backend = match HttpPeopleBackend::new(&config) {
        Ok(backend) => backend,
        Err(err) => return failure_without_view(format!("directory_open failed: {err}")),
    };

    let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
    *lock_directory() = Some(FfiDirectory {
        store: DirectoryStore::from_config(backend, SystemClock, &config),
        date_format: config.date_display_format.clone(),
        generation,
    });
    info!("event=directory_open module=ffi status=ok generation={generation}");
    fetch_page("directory_open", "Directory loaded.", begin_reload)
}

/// Returns the current state without side effects.
#[flutter_rust_bridge::frb(sync)]
pub fn directory_snapshot() -> DirectoryResponse {
    with_directory("directory_snapshot", |_| Ok(String::new()))
}

/// Re-fetches the current page.
pub fn directory_reload() -> DirectoryResponse {
    fetch_page("directory_reload", "Page reloaded.", begin_reload)
}

/// Moves to a zero-based page.
pub fn directory_set_page(page_index: u32) -> DirectoryResponse {
    fetch_page("directory_set_page", "", |store| {
        let page_size = store.pagination().page_size;
        store.begin_load(page_index, page_size)
    })
}

/// Changes rows per page and returns to the first page.
pub fn directory_set_page_size(page_size: u32) -> DirectoryResponse {
    fetch_page("directory_set_page_size", "", |store| store.begin_load(0, page_size))
}

/// Updates the client-side search term.
#[flutter_rust_bridge::frb(sync)]
pub fn directory_set_search(term: String) -> DirectoryResponse {
    with_directory("directory_set_search", |directory| {
        directory.store.set_search_term(term);
        Ok(String::new())
    })
}

/// Opens the delete confirmation for one record.
#[flutter_rust_bridge::frb(sync)]
pub fn directory_request_delete(id: String) -> DirectoryResponse {
    with_directory("directory_request_delete", |directory| {
        let id = resolve_id(&directory.store, &id);
        directory.store.request_delete(id);
        Ok(String::new())
    })
}

/// Closes the delete confirmation without deleting.
#[flutter_rust_bridge::frb(sync)]
pub fn directory_cancel_delete() -> DirectoryResponse {
    with_directory("directory_cancel_delete", |directory| {
        directory.store.cancel_delete();
        Ok(String::new())
    })
}

/// Deletes the pending record, then reloads the current page.
pub fn directory_confirm_delete() -> DirectoryResponse {
    run_mutation(
        "directory_confirm_delete",
        |store| Ok(store.prepare_delete()),
        Store::apply_mutation,
    )
}

/// Hides the current banner.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_dismiss() -> DirectoryResponse {
    with_directory("notification_dismiss", |directory| {
        directory.store.dismiss_notification();
        Ok(String::new())
    })
}

/// Opens a blank add dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn form_open_create() -> DirectoryResponse {
    with_directory("form_open_create", |directory| {
        directory.store.open_create_form();
        Ok(String::new())
    })
}

/// Opens the edit dialog for a record on the loaded page.
#[flutter_rust_bridge::frb(sync)]
pub fn form_open_edit(id: String) -> DirectoryResponse {
    with_directory("form_open_edit", |directory| {
        let id = resolve_id(&directory.store, &id);
        directory
            .store
            .open_edit_form(&id)
            .map(|()| String::new())
            .map_err(|err| err.to_string())
    })
}

/// Closes the dialog without saving.
#[flutter_rust_bridge::frb(sync)]
pub fn form_cancel() -> DirectoryResponse {
    with_directory("form_cancel", |directory| {
        directory.store.cancel_form();
        Ok(String::new())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn form_set_first_name(value: String) -> DirectoryResponse {
    with_directory("form_set_first_name", |directory| {
        directory.store.set_form_first_name(value);
        Ok(String::new())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn form_set_last_name(value: String) -> DirectoryResponse {
    with_directory("form_set_last_name", |directory| {
        directory.store.set_form_last_name(value);
        Ok(String::new())
    })
}

/// Sets the date of birth from an ISO date; blank or `None` clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn form_set_date_of_birth(value: Option<String>) -> DirectoryResponse {
    with_directory("form_set_date_of_birth", |directory| {
        let date = match value.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            None => None,
            Some(raw) => Some(
                parse_calendar_date(raw).ok_or_else(|| format!("invalid date `{raw}`"))?,
            ),
        };
        directory.store.set_form_date_of_birth(date);
        Ok(String::new())
    })
}

/// Marks a field touched (`first_name|last_name|date_of_birth`).
#[flutter_rust_bridge::frb(sync)]
pub fn form_blur(field: String) -> DirectoryResponse {
    with_directory("form_blur", |directory| {
        let field = parse_field(&field).ok_or_else(|| format!("unknown form field `{field}`"))?;
        directory.store.blur_form_field(field);
        Ok(String::new())
    })
}

/// Validates and saves the open dialog, then reloads the current page.
pub fn form_submit() -> DirectoryResponse {
    run_mutation(
        "form_submit",
        |store| store.prepare_submit().map(Some),
        Store::apply_submit,
    )
}

fn resolve_config(base_url: Option<String>) -> Result<ClientConfig, String> {
    let override_url = base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let config = match override_url {
        Some(url) => ClientConfig::from_lookup(|key| {
            if key == people_core::config::ENV_BASE_URL {
                Some(url.clone())
            } else {
                std::env::var(key).ok()
            }
        }),
        None => ClientConfig::from_env(),
    };
    config.map_err(|err| err.to_string())
}

fn lock_directory() -> MutexGuard<'static, Option<FfiDirectory>> {
    let lock = DIRECTORY.get_or_init(|| Mutex::new(None));
    // Poisoned locks are recovered; FFI calls must not panic.
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_directory(
    action: &str,
    f: impl FnOnce(&mut FfiDirectory) -> Result<String, String>,
) -> DirectoryResponse {
    let mut guard = lock_directory();
    let Some(directory) = guard.as_mut() else {
        return not_open(action);
    };
    let result = f(directory);
    respond(directory, action, result)
}

/// Like [`with_directory`], but only if the directory was not reopened since
/// `generation` was read.
fn with_generation(
    action: &str,
    generation: u64,
    f: impl FnOnce(&mut FfiDirectory) -> Result<String, String>,
) -> DirectoryResponse {
    with_directory(action, |directory| {
        if directory.generation != generation {
            return Err("directory was reopened while the request was in flight".to_string());
        }
        f(directory)
    })
}

/// Issues a fetch under the lock, runs it without the lock, then applies it.
/// A response overtaken by a newer fetch is discarded by the store.
fn fetch_page(
    action: &str,
    done: &str,
    begin: impl FnOnce(&mut Store) -> LoadTicket,
) -> DirectoryResponse {
    let started = lock_directory().as_mut().map(|directory| {
        let ticket = begin(&mut directory.store);
        (directory.generation, ticket, directory.store.backend().clone())
    });
    let Some((generation, ticket, backend)) = started else {
        return not_open(action);
    };

    let result = backend.list_people(ticket.pagination.wire_page(), ticket.pagination.page_size);

    with_generation(action, generation, |directory| {
        match directory.store.apply_load(ticket, result) {
            Ok(LoadOutcome::Applied { .. }) => Ok(done.to_string()),
            Ok(LoadOutcome::Stale) => Ok("Superseded by a newer request.".to_string()),
            Err(err) => Err(err.to_string()),
        }
    })
}

fn begin_reload(store: &mut Store) -> LoadTicket {
    let pagination = store.pagination();
    store.begin_load(pagination.page_index, pagination.page_size)
}

/// Prepares a write under the lock, sends it without the lock, applies the
/// outcome, then reloads the current page the same way.
///
/// A failed reload after an accepted write still reports success.
fn run_mutation(
    action: &str,
    prepare: impl FnOnce(&mut Store) -> Result<Option<PendingMutation>, StoreError>,
    apply: ApplyMutation,
) -> DirectoryResponse {
    let (generation, mutation, backend) = {
        let mut guard = lock_directory();
        let Some(directory) = guard.as_mut() else {
            return not_open(action);
        };
        match prepare(&mut directory.store) {
            Ok(Some(mutation)) => (
                directory.generation,
                mutation,
                directory.store.backend().clone(),
            ),
            Ok(None) => return respond(directory, action, Ok("Nothing to do.".to_string())),
            Err(err) => return respond(directory, action, Err(err.to_string())),
        }
    };

    let result = mutation.send(&backend);

    let applied = with_generation(action, generation, |directory| {
        apply(&mut directory.store, &mutation, result)
            .map(|()| String::new())
            .map_err(|err| err.to_string())
    });
    if !applied.ok {
        return applied;
    }

    let done = match &mutation {
        PendingMutation::Delete(id) => format!("Deleted {id}."),
        _ => "Saved.".to_string(),
    };
    let reloaded = fetch_page(action, "", begin_reload);
    if reloaded.ok {
        DirectoryResponse {
            message: done,
            ..reloaded
        }
    } else {
        DirectoryResponse {
            ok: true,
            message: format!("{done} Reload failed: {}", reloaded.message),
            view: reloaded.view,
        }
    }
}

fn respond(
    directory: &FfiDirectory,
    action: &str,
    result: Result<String, String>,
) -> DirectoryResponse {
    let view = Some(to_directory_view(&DirectorySnapshot::capture(
        &directory.store,
        &directory.date_format,
    )));
    match result {
        Ok(message) => DirectoryResponse {
            ok: true,
            message,
            view,
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error action={action}");
            DirectoryResponse {
                ok: false,
                message: format!("{action} failed: {err}"),
                view,
            }
        }
    }
}

fn not_open(action: &str) -> DirectoryResponse {
    failure_without_view(format!(
        "{action} failed: directory not open; call directory_open first"
    ))
}

fn failure_without_view(message: String) -> DirectoryResponse {
    DirectoryResponse {
        ok: false,
        message,
        view: None,
    }
}

/// Matches a loaded record by rendered id first so text ids that look
/// numeric keep their wire shape.
fn resolve_id(store: &Store, raw: &str) -> PersonId {
    store
        .record_by_key(raw)
        .map(|record| record.id.clone())
        .unwrap_or_else(|| PersonId::parse(raw))
}

fn parse_field(raw: &str) -> Option<FormField> {
    match raw.trim() {
        "first_name" | "firstName" => Some(FormField::FirstName),
        "last_name" | "lastName" => Some(FormField::LastName),
        "date_of_birth" | "dateOfBirth" => Some(FormField::DateOfBirth),
        _ => None,
    }
}

fn field_key(field: FormField) -> &'static str {
    match field {
        FormField::FirstName => "first_name",
        FormField::LastName => "last_name",
        FormField::DateOfBirth => "date_of_birth",
    }
}

fn to_directory_view(snapshot: &DirectorySnapshot) -> DirectoryView {
    DirectoryView {
        rows: snapshot
            .rows
            .iter()
            .map(|row| PersonRowItem {
                id: row.id.clone(),
                first_name: row.first_name.clone(),
                last_name: row.last_name.clone(),
                date_of_birth: row.date_of_birth.clone(),
                age: row.age.clone(),
                date_created: row.date_created.clone(),
            })
            .collect(),
        filtered_count: u32::try_from(snapshot.filtered_count).unwrap_or(u32::MAX),
        page_index: snapshot.page_index,
        page_size: snapshot.page_size,
        page_size_options: snapshot.page_size_options.clone(),
        search_term: snapshot.search_term.clone(),
        pending_delete_id: snapshot.pending_delete.clone(),
        form: snapshot.form.as_ref().map(to_form_view),
        notification: snapshot.notification.as_ref().map(|banner| NotificationItem {
            kind: match banner.kind {
                NotificationKind::Success => "success".to_string(),
                NotificationKind::Error => "error".to_string(),
            },
            message: banner.message.clone(),
            auto_hide_ms: banner.auto_hide_ms,
        }),
    }
}

fn to_form_view(form: &FormSnapshot) -> FormView {
    FormView {
        title: form.title.clone(),
        submit_label: form.submit_label.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        date_of_birth: form.date_of_birth.map(|date| date.format("%Y-%m-%d").to_string()),
        age: form.age.clone(),
        errors: form
            .errors
            .iter()
            .map(|(field, message)| FieldErrorItem {
                field: field_key(*field).to_string(),
                message: message.clone(),
            })
            .collect(),
    }
}
