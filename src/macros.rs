/// Lazily compiled static regex using the router's pattern syntax
/// (case-insensitive, verbose). Intended for constant sources only.
#[macro_export]
macro_rules! regex {
    ($pat:expr) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
            regex::RegexBuilder::new($pat).case_insensitive(true).ignore_whitespace(true).build().unwrap()
        });
        &*RE
    }};
}

/// Build the `Vec<NamedPattern>` a provider returns from `patterns()`.
///
/// ```ignore
/// patterns![
///     "LOGIN" => LOGIN_RE,
///     "PASSWORD" => PASS_TOKEN_RE; requires InputTraits::HAS_DIGITS,
/// ]
/// ```
#[macro_export]
macro_rules! patterns {
    ( $( $name:literal => $src:expr $(; requires $req:expr)? ),* $(,)? ) => {
        vec![ $(
            $crate::NamedPattern {
                name: $name.to_string(),
                source: $src.to_string(),
                requires: { $crate::InputTraits::empty() $(| $req)? },
            }
        ),* ]
    };
}
