use once_cell::sync::Lazy;
use regex::Regex;

const STAR_PARAM: &str = "star";

static STAR_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[?&])star=([^&#]+)").expect("valid star param regex"));

/// Link that points a recipient at one star: `<base>?star=<id>`. A fragment
/// on the base stays at the end of the link.
pub fn share_url(base_url: &str, star_id: &str) -> String {
    let (base, fragment) = match base_url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (base_url, None),
    };
    let separator = if base.ends_with('?') || base.ends_with('&') {
        ""
    } else if base.contains('?') {
        "&"
    } else {
        "?"
    };
    match fragment {
        Some(fragment) => format!("{base}{separator}{STAR_PARAM}={star_id}#{fragment}"),
        None => format!("{base}{separator}{STAR_PARAM}={star_id}"),
    }
}

/// Extracts the star id from a full link or a bare query string.
pub fn star_id_from_link(link: &str) -> Option<String> {
    STAR_PARAM_RE
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::{share_url, star_id_from_link};

    #[test]
    fn builds_links_against_plain_and_query_bases() {
        assert_eq!(share_url("https://jar.example/", "abc"), "https://jar.example/?star=abc");
        assert_eq!(
            share_url("https://jar.example/?lang=en", "abc"),
            "https://jar.example/?lang=en&star=abc"
        );
        assert_eq!(share_url("https://jar.example/?", "abc"), "https://jar.example/?star=abc");
    }

    #[test]
    fn keeps_fragment_after_the_star_param() {
        assert_eq!(
            share_url("https://jar.example/#/recap", "abc"),
            "https://jar.example/?star=abc#/recap"
        );
        assert_eq!(
            share_url("https://jar.example/?lang=en#top", "abc"),
            "https://jar.example/?lang=en&star=abc#top"
        );
        assert_eq!(share_url("https://jar.example/#", "abc"), "https://jar.example/?star=abc#");

        let link = share_url("https://jar.example/#/recap", "abc");
        assert_eq!(star_id_from_link(&link).as_deref(), Some("abc"));
    }

    #[test]
    fn parses_star_id_from_links() {
        assert_eq!(star_id_from_link("https://jar.example/?star=abc").as_deref(), Some("abc"));
        assert_eq!(star_id_from_link("?lang=en&star=abc#top").as_deref(), Some("abc"));
        assert_eq!(star_id_from_link("star=abc").as_deref(), Some("abc"));
        assert!(star_id_from_link("https://jar.example/?superstar=abc").is_none());
        assert!(star_id_from_link("https://jar.example/?star=").is_none());
        assert!(star_id_from_link("https://jar.example/").is_none());
    }

    #[test]
    fn parsing_round_trips_a_built_link() {
        let link = share_url("https://jar.example/", "6f1c2b7e-0000-4000-8000-000000000001");
        assert_eq!(
            star_id_from_link(&link).as_deref(),
            Some("6f1c2b7e-0000-4000-8000-000000000001")
        );
    }
}
