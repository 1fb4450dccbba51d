//! Input canonicalization.
//!
//! Rules are authored against lowercase, accent-free Spanish with single
//! spaces, so every turn is normalized before matching:
//!
//! ```text
//! "  Quiero  INICIAR\tsesión "  ->  "quiero iniciar sesion"
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Trim, lowercase, strip diacritics (NFD minus combining marks) and collapse
/// whitespace runs to a single space. Idempotent; empty input stays empty.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut out = String::with_capacity(stripped.len());
    for word in stripped.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
