use crate::classify::url_path;

/// Split off the extension of a file name. Dots at the very start of the name
/// never begin an extension, so `.bashrc` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    }
}

/// A short human name for the resource behind a URL: its last path segment
/// without extension, treating `.tar.*` double extensions as one.
///
/// ```
/// assert_eq!(unfurl::name_from_url("http://host/path/archive.tar.gz"), "archive");
/// assert_eq!(unfurl::name_from_url("http://host/path/data.zip"), "data");
/// ```
pub fn name_from_url(url: &str) -> String {
    let path = url_path(url);
    let base = path.rsplit('/').next().unwrap_or_default();
    let (name, _) = split_extension(base);
    if name.ends_with(".tar") {
        return split_extension(name).0.to_string();
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_extension() {
        assert_eq!(name_from_url("http://host/path/data.zip"), "data");
        assert_eq!(name_from_url("http://host/path/data.tgz"), "data");
    }

    #[test]
    fn strips_tar_double_extension() {
        assert_eq!(name_from_url("http://host/path/archive.tar.gz"), "archive");
        assert_eq!(name_from_url("http://host/nc_spm.tar.bz2?x=1"), "nc_spm");
    }

    #[test]
    fn keeps_other_inner_dots() {
        assert_eq!(name_from_url("http://host/tool-1.2.zip"), "tool-1.2");
        assert_eq!(name_from_url("http://host/a.b.c"), "a.b");
    }

    #[test]
    fn leading_dots_are_not_extensions() {
        assert_eq!(name_from_url("http://host/.hidden"), ".hidden");
        assert_eq!(name_from_url("http://host/..tar"), "..tar");
        assert_eq!(name_from_url("http://host/.config.zip"), ".config");
    }

    #[test]
    fn trailing_slash_gives_empty_name() {
        assert_eq!(name_from_url("http://host/dir/"), "");
        assert_eq!(name_from_url("plain"), "plain");
    }
}
