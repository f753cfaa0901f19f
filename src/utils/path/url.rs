//! URL helpers for link rewriting.

/// Split a URL at the first `?` or `#` into (path, suffix).
///
/// The suffix keeps its leading delimiter and is empty when there is none.
#[inline]
pub fn split_path_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_suffix() {
        assert_eq!(split_path_suffix("/page?x=1"), ("/page", "?x=1"));
        assert_eq!(split_path_suffix("/page#top?no"), ("/page", "#top?no"));
        assert_eq!(split_path_suffix("/page"), ("/page", ""));
        assert_eq!(split_path_suffix("#only"), ("", "#only"));
    }
}
