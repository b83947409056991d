use rusqlite::ErrorCode;

#[derive(Debug, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A UNIQUE constraint failed. Holds the `table.column` list SQLite reports.
    Unique(String),
    ForeignKey,
    Other,
}

/// Classifies `err` when it comes from a failed constraint, `None` for any other error.
pub fn constraint_violation(err: &rusqlite::Error) -> Option<ConstraintViolation> {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Some(match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    let columns = message
                        .as_deref()
                        .and_then(|m| m.strip_prefix("UNIQUE constraint failed: "))
                        .unwrap_or_default();
                    ConstraintViolation::Unique(columns.to_string())
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintViolation::ForeignKey,
                _ => ConstraintViolation::Other,
            })
        }
        _ => None,
    }
}
