//! Client-side search over the loaded page.

use crate::config::SearchWindowing;
use crate::model::person::PersonRecord;
use crate::store::pagination::Pagination;

/// Case-insensitive substring match on first name, last name, or
/// `"first last"`. An empty term matches everything.
pub fn matches_search(record: &PersonRecord, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record.first_name.to_lowercase().contains(&needle)
        || record.last_name.to_lowercase().contains(&needle)
        || record.full_name().to_lowercase().contains(&needle)
}

/// Records matching `term`, in page order.
pub fn filter_records<'a>(records: &'a [PersonRecord], term: &str) -> Vec<&'a PersonRecord> {
    records
        .iter()
        .filter(|record| matches_search(record, term))
        .collect()
}

/// Applies the windowing policy to already-filtered records.
pub fn window_filtered<'a>(
    filtered: Vec<&'a PersonRecord>,
    pagination: Pagination,
    windowing: SearchWindowing,
) -> Vec<&'a PersonRecord> {
    match windowing {
        SearchWindowing::PageLocal => filtered,
        SearchWindowing::Legacy => {
            let (start, end) = pagination.window();
            filtered
                .into_iter()
                .skip(start)
                .take(end - start)
                .collect()
        }
    }
}
