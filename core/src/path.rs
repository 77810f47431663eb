//! Resource path resolution.

/// Suffix every resource URL carries, selecting the JSON wire format.
pub const JSON_SUFFIX: &str = ".json";

pub const SEPARATOR: char = '/';

/// Join `base` and an optional relative path into a canonical resource path.
///
/// A missing or blank relative path refers to `base` itself. Otherwise the
/// trimmed path is joined with exactly one leading separator. The JSON suffix
/// is always appended.
pub fn resolve(base: &str, relative: Option<&str>) -> String {
    let relative = relative.map(str::trim).unwrap_or_default();

    let mut path = String::with_capacity(base.len() + relative.len() + JSON_SUFFIX.len() + 1);
    path.push_str(base);
    if !relative.is_empty() {
        if !relative.starts_with(SEPARATOR) {
            path.push(SEPARATOR);
        }
        path.push_str(relative);
    }
    path.push_str(JSON_SUFFIX);
    path
}
