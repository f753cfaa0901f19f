//! Heading anchor slugs.

/// Turn heading text into a URL fragment.
///
/// Transliterates to ASCII, keeps only alphanumerics, lowercases, and joins
/// words with single hyphens. `"Hello, World!"` becomes `"hello-world"`.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_sep = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_drops_punctuation() {
        assert_eq!(slugify("What's new? (v1.2)"), "whats-new-v12");
        assert_eq!(slugify("$price * 2 + tax ~ @home: \"ok\"!"), "price-2-tax-home-ok");
        assert_eq!(slugify("snake_case_name"), "snakecasename");
    }

    #[test]
    fn test_transliterates() {
        assert_eq!(slugify("Café Über"), "cafe-uber");
    }

    #[test]
    fn test_deterministic_and_empty() {
        assert_eq!(slugify("Same Text"), slugify("Same Text"));
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
