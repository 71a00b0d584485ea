pub mod file_getter;
pub mod getter;
pub mod http_getter;

pub use file_getter::FileGetter;
pub use getter::Getter;
pub use http_getter::HttpGetter;

/// Scheme used for sources that carry none, i.e. plain local paths.
pub const FILE_SCHEME: &str = "file";

/// Returns the lower-cased scheme of `source`, or `"file"` for bare paths.
///
/// `https://host/a.tgz` → `https`, `/tmp/a.tgz` → `file`.
pub fn scheme_of(source: &str) -> String {
    match source.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() => scheme.to_ascii_lowercase(),
        _ => FILE_SCHEME.to_string(),
    }
}

/// Last non-empty path segment of `source`. Query and fragment are dropped
/// for URL schemes only; local paths may legitimately contain `?` or `#`.
///
/// `https://host/dl/a.tgz?x=1` → `a.tgz`, `/tmp/track#1.mp3` → `track#1.mp3`.
/// Returns `None` when there is none, as for `https://host/`.
pub fn file_name_of(source: &str) -> Option<&str> {
    let path = match source.split_once("://") {
        Some((_, rest)) if scheme_of(source) != FILE_SCHEME => {
            let path = match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            };
            path.split(['?', '#']).next().unwrap_or(path)
        }
        Some((_, rest)) => rest,
        None => source,
    };
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
}
