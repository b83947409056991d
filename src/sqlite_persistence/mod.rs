mod constraints;
mod versioned_schema;

pub use constraints::{constraint_violation, ConstraintViolation};
pub use versioned_schema::{
    migrate_if_needed, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    View, BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
