//! Marker types distinguishing kinds of [`DateTimeOf`].
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marks the moment an entity was created.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marks the moment an entity was last modified.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marks the moment something stops being valid.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
