//! Flutter-facing bindings over `people_core`.

pub mod api;
