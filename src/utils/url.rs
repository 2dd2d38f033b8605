// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::Result;
use crate::models::SiteConfig;

/// Resolve a potentially relative URL against a base URL.
///
/// # Examples
/// ```
/// use brewmap::utils::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://untappd.com/search?q=x").unwrap();
/// assert_eq!(
///     resolve_url(&base, "/HalfAcreBeerCompany"),
///     "https://untappd.com/HalfAcreBeerCompany"
/// );
/// ```
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Build the brewery search URL for a search term.
///
/// The term is form-urlencoded, so spaces become `+`.
///
/// # Examples
/// ```
/// use brewmap::models::SiteConfig;
/// use brewmap::utils::url::search_url;
///
/// let url = search_url(&SiteConfig::default(), "Crown Brewing Company").unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://untappd.com/search?q=Crown+Brewing+Company&type=brewery"
/// );
/// ```
pub fn search_url(site: &SiteConfig, term: &str) -> Result<Url> {
    let mut url = site.base()?.join(&site.search_path)?;
    url.query_pairs_mut()
        .append_pair("q", term)
        .append_pair("type", &site.search_type);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://untappd.com/search?q=half").unwrap();
        assert_eq!(
            resolve_url(&base, "/w/half-acre-beer-company/1234"),
            "https://untappd.com/w/half-acre-beer-company/1234"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_search_url_encodes_punctuation() {
        let url = search_url(&SiteConfig::default(), "Chain O'Lakes Brewing Company").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Chain O'Lakes Brewing Company".to_string()),
                ("type".to_string(), "brewery".to_string()),
            ]
        );
        assert!(url.as_str().contains("q=Chain+O%27Lakes+Brewing+Company"));
    }

    #[test]
    fn test_search_url_uses_configured_base() {
        let site = SiteConfig {
            base_url: "http://127.0.0.1:4000".into(),
            ..SiteConfig::default()
        };
        let url = search_url(&site, "Pipeworks").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4000/search?q=Pipeworks&type=brewery");
    }
}
