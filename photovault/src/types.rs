//! Common type definitions.

/// Backend account identifier.
///
/// The backup service hands these out as positive integers on login and
/// expects them back verbatim when scoping uploads, listings, and downloads.
pub type UserId = u64;
