//! Naming conventions for path segments.
//!
//! # Responsibilities
//! - Turn a raw, hyphen-delimited URL segment into a conventionally-cased
//!   identifier
//! - Provide the namespace, controller and action specializations
//!
//! # Design Decisions
//! - Pure functions, no allocation beyond the returned string
//! - Any input is accepted; an empty segment yields the bare suffix
//! - Only determinism for the same raw input is promised, re-applying the
//!   transform to an already transformed identifier is meaningless

/// Suffix appended to every controller identifier.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// Suffix appended to every action identifier.
pub const ACTION_SUFFIX: &str = "Action";

/// Title-case the hyphen-delimited words of `segment` and join them.
///
/// `"user-profile"` becomes `"UserProfile"`, `"POST-archive"` becomes
/// `"PostArchive"`.
pub fn transform(segment: &str) -> String {
    let spaced = segment.replace('-', " ").to_lowercase();

    let mut out = String::with_capacity(spaced.len());
    for word in spaced.split(' ') {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Identifier for a namespace segment.
pub fn namespace_identifier(segment: &str) -> String {
    transform(segment)
}

/// Identifier for a controller segment, e.g. `"UserProfileController"`.
pub fn controller_identifier(segment: &str) -> String {
    let mut name = transform(segment);
    name.push_str(CONTROLLER_SUFFIX);
    name
}

/// Identifier for an action segment, e.g. `"editInfoAction"`.
pub fn action_identifier(segment: &str) -> String {
    let base = transform(segment);
    let mut chars = base.chars();
    let mut name = match chars.next() {
        Some(first) => {
            let mut s: String = first.to_lowercase().collect();
            s.push_str(chars.as_str());
            s
        }
        None => String::new(),
    };
    name.push_str(ACTION_SUFFIX);
    name
}
