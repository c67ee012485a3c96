//! Centralized filename parsing for the `YYYY-MM-DD-slug` convention.
//!
//! Every source file follows the same naming pattern: an optional ISO date
//! prefix followed by the slug, then one or more extensions:
//!
//! - `2020-01-02-hello-world.md` → date `2020-01-02`, slug `hello-world`
//! - `about.html` → no date, slug `about`
//! - `2021-06-01-fic.tar.html` → date `2021-06-01`, slug `fic` (stem ends at the first dot)
//!
//! The slug is used verbatim in output paths. Group headings on listing pages
//! get an anchor derived through [`sanitize_slug`].

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DATE_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d\d\d\d-\d\d-\d\d)-)?(.+)$").expect("date/slug pattern must compile")
});

/// Result of parsing a source filename like `2020-01-02-hello.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Date prefix if present (e.g., `2020-01-02`).
    pub date: Option<String>,
    /// Everything after the date prefix, up to the first dot.
    pub slug: String,
    /// Last extension, lowercased (`md`, `html`, ...). Empty if none.
    pub extension: String,
}

/// Parse a source filename following the `YYYY-MM-DD-slug.ext` convention.
///
/// Accepts a bare filename or a path; only the final component is used.
pub fn parse_source_name(path: &Path) -> ParsedName {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match DATE_SLUG.captures(stem) {
        Some(caps) => ParsedName {
            date: caps.get(1).map(|m| m.as_str().to_string()),
            slug: caps[2].to_string(),
            extension,
        },
        // Empty stem (e.g. `.hidden`)
        None => ParsedName {
            date: None,
            slug: String::new(),
            extension,
        },
    }
}

/// Title-case a folder name for display: `short-stories` → `Short Stories`.
pub fn folder_title(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

const MAX_SLUG_LEN: usize = 80;

/// Sanitize a title string for use in URLs and element ids.
///
/// - Lowercases ASCII letters
/// - Replaces non-alphanumeric characters (except dashes) with dashes
/// - Collapses consecutive dashes into one
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn sanitize_slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(slug.len());
    let mut prev_dash = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    let trimmed = collapsed.trim_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> ParsedName {
        parse_source_name(Path::new(name))
    }

    #[test]
    fn dated_markdown_file() {
        let p = parse("2020-01-02-hello-world.md");
        assert_eq!(p.date.as_deref(), Some("2020-01-02"));
        assert_eq!(p.slug, "hello-world");
        assert_eq!(p.extension, "md");
    }

    #[test]
    fn undated_html_file() {
        let p = parse("about.html");
        assert_eq!(p.date, None);
        assert_eq!(p.slug, "about");
        assert_eq!(p.extension, "html");
    }

    #[test]
    fn stem_ends_at_first_dot() {
        let p = parse("2021-06-01-fic.v2.html");
        assert_eq!(p.date.as_deref(), Some("2021-06-01"));
        assert_eq!(p.slug, "fic");
        assert_eq!(p.extension, "html");
    }

    #[test]
    fn path_uses_final_component() {
        let p = parse("content/blog/2020-01-01-a.html");
        assert_eq!(p.date.as_deref(), Some("2020-01-01"));
        assert_eq!(p.slug, "a");
    }

    #[test]
    fn date_without_slug_is_the_slug() {
        // The prefix needs a trailing dash and a non-empty remainder
        let p = parse("2020-01-01.html");
        assert_eq!(p.date, None);
        assert_eq!(p.slug, "2020-01-01");
    }

    #[test]
    fn malformed_date_stays_in_slug() {
        let p = parse("20-01-01-post.md");
        assert_eq!(p.date, None);
        assert_eq!(p.slug, "20-01-01-post");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(parse("Post.MD").extension, "md");
    }

    #[test]
    fn folder_title_capitalizes_words() {
        assert_eq!(folder_title("blog"), "Blog");
        assert_eq!(folder_title("short-stories"), "Short Stories");
        assert_eq!(folder_title("WORKS"), "Works");
    }

    #[test]
    fn sanitize_slug_for_group_anchor() {
        assert_eq!(sanitize_slug("Iron Man (Movies)"), "iron-man-movies");
        assert_eq!(sanitize_slug("  --Foo & Bar--  "), "foo-bar");
    }

    #[test]
    fn sanitize_slug_truncates_at_dash() {
        let long = "word ".repeat(30);
        let slug = sanitize_slug(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }
}
