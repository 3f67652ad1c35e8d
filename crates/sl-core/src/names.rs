//! Strongly-typed names for remote entities, store tables, and models.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Machine name of a remote collection, e.g. `FNCLOG`.
    pub struct EntityName = "entity";
}

define_newtype_string! {
    /// Name of a table in the analytical store. Often a non-ASCII label.
    pub struct TableName = "table";
}

define_newtype_string! {
    /// Name of a derived model, taken from its definition file stem.
    pub struct ModelName = "model";
}

impl EntityName {
    /// Case-insensitive comparison against a name typed on the command line.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}
