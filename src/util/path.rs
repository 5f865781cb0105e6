use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Unresolvable input is returned as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Case-insensitive extension check; `ext` is given without the dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|actual| actual.eq_ignore_ascii_case(ext))
}

/// `path` with `.ext` appended to the full file name.
pub fn with_extension_appended(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Label for a file in the workspace: its stem, or `fallback`.
pub fn display_name(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_upper_case_extension_when_checking_then_matches() {
        assert!(has_extension(Path::new("a/Doc.ST"), "st"));
        assert!(!has_extension(Path::new("a/Doc.md"), "st"));
        assert!(!has_extension(Path::new("a/Doc"), "st"));
    }

    #[test]
    fn given_dotted_name_when_appending_then_keeps_existing_suffix() {
        assert_eq!(
            with_extension_appended(Path::new("dir/notes.v2"), "st"),
            PathBuf::from("dir/notes.v2.st")
        );
    }

    #[test]
    fn given_no_stem_when_naming_then_uses_fallback() {
        assert_eq!(display_name(Path::new("dir/Doc.st"), "Unnamed"), "Doc");
        assert_eq!(display_name(Path::new(""), "Unnamed"), "Unnamed");
    }
}
