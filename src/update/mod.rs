//! Update log entries
//!
//! An update is logged either as a versioned delta or as a full
//! replacement document. [`UpdateLogEntry`] enforces that exactly one is
//! recorded; the `serialization` helpers read fields back out of the wire
//! form.

mod errors;
mod log_entry;
mod serialization;

pub use errors::UpdateEntryError;
pub use log_entry::UpdateLogEntry;
pub use serialization::{
    extract_new_value_for_field, extract_update_version, is_field_removed_by_update,
    make_delta_entry, make_replacement_entry, UpdateOplogEntryVersion, DIFF_FIELD, VERSION_FIELD,
};
