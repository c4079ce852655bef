//! Correlation identifiers for tying log lines to one operation.

use uuid::Uuid;

/// Length of a correlation identifier.
pub const CORRELATION_ID_LEN: usize = 8;

/// Creates a fresh correlation id.
///
/// The id is the leading hex block of a random v4 UUID. It only groups log
/// lines and carries no other meaning.
#[must_use]
pub fn create_correlation_id() -> String {
    let mut buf = Uuid::encode_buffer();
    let hyphenated = Uuid::new_v4().hyphenated().encode_lower(&mut buf);
    hyphenated[..CORRELATION_ID_LEN].to_string()
}
