/// Lazily compiled `regex::Regex` for a literal pattern.
///
/// Only used with patterns known to be valid at compile time.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Lazily compiled `fancy_regex::Regex` for a literal pattern that needs lookaround.
#[macro_export]
macro_rules! fancy_regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<fancy_regex::Regex> =
            once_cell::sync::Lazy::new(|| fancy_regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
