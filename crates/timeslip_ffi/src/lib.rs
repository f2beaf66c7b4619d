//! Flutter-facing bindings for the Timeslip journal.

pub mod api;
