//! Command-line front end for the people directory.
//!
//! # Responsibility
//! - Drive `people_core` flows (list, add, edit, delete) from a terminal.
//! - Keep output plain text so it can be piped.
//!
//! # Invariants
//! - Backend settings come from `PEOPLE_*` environment variables.
//! - Deletes require confirmation unless `--yes` is passed.
//! - Any failed operation exits non-zero.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use people_core::model::wire::parse_calendar_date;
use people_core::{
    init_logging, ClientConfig, Clock, DirectorySnapshot, DirectoryStore, HttpPeopleBackend,
    NotificationKind, PeopleBackend, PersonId, StoreError, SystemClock,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

type Store = DirectoryStore<HttpPeopleBackend, SystemClock>;

const MAX_PAGES_SCANNED: u32 = 1_000;

#[derive(Parser, Debug)]
#[command(name = "people")]
#[command(about = "Browse and edit the people directory", version)]
struct Args {
    /// Backend base URL (overrides PEOPLE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core health check and version
    Ping,
    /// Show one page of people
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Rows per page (10, 25 or 50)
        #[arg(long)]
        limit: Option<u32>,
        /// Case-insensitive filter on first or last name
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a person
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        dob: NaiveDate,
    },
    /// Edit an existing person; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        dob: Option<NaiveDate>,
    },
    /// Delete a person
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    if let Command::Ping = args.command {
        println!("people_core ping={}", people_core::ping());
        println!("people_core version={}", people_core::core_version());
        return Ok(());
    }

    let config = load_config(args.base_url.as_deref())?;
    if let Some(dir) = &config.log_dir {
        init_logging(config.log_level, &dir.to_string_lossy())?;
    }
    let backend = HttpPeopleBackend::new(&config).map_err(|err| err.to_string())?;
    let mut store = DirectoryStore::from_config(backend, SystemClock, &config);
    let date_format = config.date_display_format.clone();

    let result = match args.command {
        Command::Ping => Ok(()),
        Command::List {
            page,
            limit,
            search,
        } => list(&mut store, page, limit, search, &date_format),
        Command::Add { first, last, dob } => add(&mut store, first, last, dob),
        Command::Edit {
            id,
            first,
            last,
            dob,
        } => edit(&mut store, &id, first, last, dob),
        Command::Delete { id, yes } => delete(&mut store, &id, yes),
    };
    print_notification(&store);
    result
}

fn load_config(base_url: Option<&str>) -> Result<ClientConfig, String> {
    let config = match base_url {
        Some(url) => ClientConfig::from_lookup(|key| {
            if key == people_core::config::ENV_BASE_URL {
                Some(url.to_string())
            } else {
                std::env::var(key).ok()
            }
        }),
        None => ClientConfig::from_env(),
    };
    config.map_err(|err| err.to_string())
}

fn list(
    store: &mut Store,
    page: u32,
    limit: Option<u32>,
    search: Option<String>,
    date_format: &str,
) -> Result<(), String> {
    let page_size = limit.unwrap_or(store.pagination().page_size);
    store
        .load_page(page, page_size)
        .map_err(|err| format!("could not load people: {err}"))?;
    if let Some(term) = search {
        store.set_search_term(term);
    }

    let snapshot = DirectorySnapshot::capture(store, date_format);
    print_table(&snapshot);
    Ok(())
}

fn add(store: &mut Store, first: String, last: String, dob: NaiveDate) -> Result<(), String> {
    store.open_create_form();
    store.set_form_first_name(first);
    store.set_form_last_name(last);
    store.set_form_date_of_birth(Some(dob));
    store.submit_form().map_err(describe_store_error)
}

fn edit(
    store: &mut Store,
    raw_id: &str,
    first: Option<String>,
    last: Option<String>,
    dob: Option<NaiveDate>,
) -> Result<(), String> {
    let id = find_record(store, raw_id)?;
    store.open_edit_form(&id).map_err(describe_store_error)?;
    if let Some(first) = first {
        store.set_form_first_name(first);
    }
    if let Some(last) = last {
        store.set_form_last_name(last);
    }
    if dob.is_some() {
        store.set_form_date_of_birth(dob);
    }
    store.submit_form().map_err(describe_store_error)
}

fn delete(store: &mut Store, raw_id: &str, yes: bool) -> Result<(), String> {
    store.request_delete(PersonId::parse(raw_id));
    if !yes && !confirm_on_stdin("Are you sure you want to delete this person?")? {
        store.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }
    match store.confirm_delete() {
        Ok(Some(id)) => {
            info!("event=cli_delete module=cli status=ok id={id}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => Err(describe_store_error(err)),
    }
}

/// Walks pages from the start until the record is loaded.
///
/// Stops at a short page, at a page identical to the previous one (a backend
/// that ignores `page`), or after `MAX_PAGES_SCANNED` pages.
fn find_record<B: PeopleBackend, C: Clock>(
    store: &mut DirectoryStore<B, C>,
    raw_id: &str,
) -> Result<PersonId, String> {
    let page_size = store.pagination().page_size;
    let mut previous: Option<Vec<PersonId>> = None;
    for page in 0..MAX_PAGES_SCANNED {
        store
            .load_page(page, page_size)
            .map_err(|err| format!("could not load people: {err}"))?;
        if let Some(record) = store.record_by_key(raw_id) {
            return Ok(record.id.clone());
        }
        let ids: Vec<PersonId> = store.records().iter().map(|record| record.id.clone()).collect();
        if ids.len() < page_size as usize || previous.as_ref() == Some(&ids) {
            break;
        }
        previous = Some(ids);
    }
    Err(format!("person `{raw_id}` not found"))
}

fn confirm_on_stdin(prompt: &str) -> Result<bool, String> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().map_err(|err| err.to_string())?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|err| err.to_string())?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn describe_store_error(err: StoreError) -> String {
    match err {
        StoreError::Validation(errors) => errors
            .iter()
            .map(|error| error.message().to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn print_notification(store: &Store) {
    if let Some(banner) = store.notification() {
        match banner.kind {
            NotificationKind::Success => println!("{}", banner.message),
            NotificationKind::Error => eprintln!("{}", banner.message),
        }
    }
}

fn print_table(snapshot: &DirectorySnapshot) {
    const HEADERS: [&str; 6] = ["ID", "First Name", "Last Name", "Date of Birth", "Age", "Created"];

    let rows: Vec<[&str; 6]> = snapshot
        .rows
        .iter()
        .map(|row| {
            [
                row.id.as_str(),
                row.first_name.as_str(),
                row.last_name.as_str(),
                row.date_of_birth.as_str(),
                row.age.as_str(),
                row.date_created.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    print_line(&HEADERS, &widths);
    for row in &rows {
        print_line(row, &widths);
    }
    println!(
        "page {} | {} per page | {} shown",
        snapshot.page_index + 1,
        snapshot.page_size,
        snapshot.filtered_count
    );
}

fn print_line(cells: &[&str; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", line.trim_end());
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got `{raw}`"))
}
