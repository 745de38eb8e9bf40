//! Detail-document location resolution
//!
//! Index rows usually carry an `XMLREF`. Older handlers only list the entry
//! page, which advertises its XML form through an alternate link:
//! `<a rel="alternate" type="application/xml" href="xml?id=...">`.

use std::sync::LazyLock;

use errlog_core::TextFetcher;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{ExportError, ResolutionError};

/// First link-like node with `rel=alternate` and an XML media type
static ALTERNATE_XML: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[rel="alternate"][type*="xml"], link[rel="alternate"][type*="xml"]"#)
        .expect("invalid selector")
});

/// Resolves where an entry's XML document lives.
pub struct Resolver<F> {
    fetcher: F,
}

impl<F: TextFetcher> Resolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Return `explicit` unchanged, or discover the location from the page
    /// at `primary`.
    ///
    /// `Ok(None)` means the page has no alternate XML link.
    pub fn resolve(
        &self,
        primary: &Url,
        explicit: Option<&Url>,
    ) -> Result<Option<Url>, ExportError> {
        if let Some(url) = explicit {
            return Ok(Some(url.clone()));
        }

        log::debug!("Resolving XML reference from {primary}");
        let html = self.fetcher.get(primary)?;
        let found = find_alternate_xml(&html, primary)?;
        match &found {
            Some(url) => log::debug!("{primary} -> {url}"),
            None => log::debug!("{primary}: no alternate XML link"),
        }
        Ok(found)
    }
}

/// Locate the alternate XML link in `html`, resolved against `base`.
pub fn find_alternate_xml(html: &str, base: &Url) -> Result<Option<Url>, ResolutionError> {
    let document = Html::parse_document(html);
    let Some(href) = document
        .select(&ALTERNATE_XML)
        .next()
        .and_then(|node| node.value().attr("href"))
    else {
        return Ok(None);
    };

    base.join(href)
        .map(Some)
        .map_err(|source| ResolutionError::InvalidReference {
            href: href.to_string(),
            base: base.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use errlog_core::FetchError;

    use super::*;
    use crate::testing::MapFetcher;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn explicit_reference_skips_network() {
        let resolver = Resolver::new(MapFetcher::default());
        let explicit = url("http://h/x/1");

        let resolved = resolver
            .resolve(&url("http://h/e/1"), Some(&explicit))
            .unwrap();

        assert_eq!(resolved, Some(explicit));
        assert!(resolver.fetcher().requests.borrow().is_empty());
    }

    #[test]
    fn relative_href_joined_with_page() {
        let page = r#"<html><head></head><body>
            <a href="/">home</a>
            <a rel="alternate" type="text/xml" href="1.xml">XML</a>
        </body></html>"#;
        let resolver = Resolver::new(MapFetcher::with("http://h/e/1", page));

        let resolved = resolver.resolve(&url("http://h/e/1"), None).unwrap();
        assert_eq!(resolved, Some(url("http://h/e/1.xml")));
        assert_eq!(resolver.fetcher().requests.borrow().len(), 1);
    }

    #[test]
    fn elmah_detail_page_query_href() {
        let page = r#"<a rel="alternate" type="application/xml" title="XML" href="xml?id=7e3c">XML</a>"#;
        let base = url("http://h/elmah.axd/detail?id=7e3c");

        assert_eq!(
            find_alternate_xml(page, &base).unwrap(),
            Some(url("http://h/elmah.axd/xml?id=7e3c"))
        );
    }

    #[test]
    fn absolute_href_kept() {
        let page = r#"<a rel="alternate" type="text/xml" href="https://other/x/1">x</a>"#;
        assert_eq!(
            find_alternate_xml(page, &url("http://h/e/1")).unwrap(),
            Some(url("https://other/x/1"))
        );
    }

    #[test]
    fn link_element_in_head() {
        let page = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="feed">
        </head></html>"#;
        assert_eq!(
            find_alternate_xml(page, &url("http://h/elmah.axd")).unwrap(),
            Some(url("http://h/feed"))
        );
    }

    #[test]
    fn first_match_in_document_order() {
        let page = r#"
            <a rel="alternate" type="text/xml" href="first.xml">1</a>
            <a rel="alternate" type="text/xml" href="second.xml">2</a>"#;
        assert_eq!(
            find_alternate_xml(page, &url("http://h/e/")).unwrap(),
            Some(url("http://h/e/first.xml"))
        );
    }

    #[test]
    fn requires_both_rel_and_xml_type() {
        let page = r#"
            <a rel="alternate" type="application/json" href="1.json">json</a>
            <a rel="nofollow" type="text/xml" href="1.xml">xml</a>"#;
        assert_eq!(find_alternate_xml(page, &url("http://h/e/1")).unwrap(), None);
    }

    #[test]
    fn no_link_is_none() {
        let resolver = Resolver::new(MapFetcher::with("http://h/e/1", "<p>nothing</p>"));
        assert_eq!(resolver.resolve(&url("http://h/e/1"), None).unwrap(), None);
    }

    #[test]
    fn match_without_href_is_none() {
        let page = r#"<a rel="alternate" type="text/xml">xml</a>"#;
        assert_eq!(find_alternate_xml(page, &url("http://h/e/1")).unwrap(), None);
    }

    #[test]
    fn fetch_failure_propagates() {
        let resolver = Resolver::new(MapFetcher::default());
        let err = resolver.resolve(&url("http://h/e/1"), None).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Fetch(FetchError::Transport {
                status: Some(404),
                ..
            })
        ));
    }
}
