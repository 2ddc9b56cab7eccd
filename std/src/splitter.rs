use knotwork_core::{Fragment, SNIPPET_FRAGMENT_ID, Splitter};
use regex::Regex;
use std::sync::LazyLock;

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>.*?</script\s*>").expect("script pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'=<>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

const SNIPPET_TYPE: &str = "text/x-handlebars-template";

/// Decides on attribute names; values such as a `src` path never count.
fn is_snippet(attributes: &str) -> bool {
    ATTRIBUTE.captures_iter(attributes).any(|attribute| {
        let Some(name) = attribute.get(1).map(|m| m.as_str().to_ascii_lowercase()) else {
            return false;
        };
        if name == "data-service" || name.starts_with("data-service-") {
            return true;
        }
        let value = attribute
            .get(2)
            .or_else(|| attribute.get(3))
            .or_else(|| attribute.get(4))
            .map(|m| m.as_str().trim());
        name == "type" && value.is_some_and(|v| v.eq_ignore_ascii_case(SNIPPET_TYPE))
    })
}

/// Cuts an HTML page into raw and snippet fragments.
///
/// A `<script>` element carrying a `data-service*` attribute or
/// `type="text/x-handlebars-template"` becomes a snippet. Everything else,
/// other scripts included, stays raw.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFragmentSplitter;

impl HtmlFragmentSplitter {
    pub fn new() -> Self {
        Self
    }
}

impl Splitter for HtmlFragmentSplitter {
    fn split(&self, template: &str) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut last = 0;

        for script in SCRIPT.captures_iter(template) {
            let (Some(whole), Some(attributes)) = (script.get(0), script.get(1)) else {
                continue;
            };
            if !is_snippet(attributes.as_str()) {
                continue;
            }
            fragments.extend(Fragment::raw(&template[last..whole.start()]).ok());
            fragments.extend(Fragment::snippet(SNIPPET_FRAGMENT_ID, whole.as_str()).ok());
            last = whole.end();
        }
        fragments.extend(Fragment::raw(&template[last..]).ok());

        tracing::trace!(fragments = fragments.len(), "Template split");
        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids_and_contents(fragments: &[Fragment]) -> Vec<(&str, &str)> {
        fragments.iter().map(|f| (f.id(), f.content())).collect()
    }

    #[test]
    fn splits_around_snippets() {
        let page = concat!(
            "<html><body>",
            r#"<script data-service="/service/a" type="text/x-handlebars-template">{{a}}</script>"#,
            "<hr/>",
            r#"<script type="text/x-handlebars-template">static</script>"#,
            "</body></html>",
        );

        let fragments = HtmlFragmentSplitter.split(page);
        let ids: Vec<_> = fragments.iter().map(Fragment::id).collect();
        assert_eq!(ids, vec!["_raw", "_snippet", "_raw", "_snippet", "_raw"]);

        let rebuilt: String = fragments.iter().map(Fragment::content).collect();
        assert_eq!(rebuilt, page);
    }

    #[test]
    fn ordinary_scripts_stay_raw() {
        let page = r#"<head><script src="/app.js"></script><script>var x = 1;</script></head>"#;
        let fragments = HtmlFragmentSplitter.split(page);
        assert_eq!(ids_and_contents(&fragments), vec![("_raw", page)]);
    }

    #[test]
    fn marker_inside_an_attribute_value_stays_raw() {
        let page = concat!(
            "<p>a</p>",
            r#"<script src="/js/data-service.js"></script>"#,
            r#"<script src="/t.js?type=text/x-handlebars-template" data-note='data-service="x"'></script>"#,
        );
        let fragments = HtmlFragmentSplitter.split(page);
        assert_eq!(ids_and_contents(&fragments), vec![("_raw", page)]);
    }

    #[test]
    fn unquoted_and_mixed_case_markers() {
        let page = r#"<script TYPE=text/x-handlebars-template>{{x}}</script><script Data-Service='/a'>y</script>"#;
        let fragments = HtmlFragmentSplitter.split(page);
        let ids: Vec<_> = fragments.iter().map(Fragment::id).collect();
        assert_eq!(ids, vec!["_snippet", "_snippet"]);
    }

    #[test]
    fn named_service_marks_a_snippet() {
        let page = r#"<SCRIPT data-service-labels="/l">{{labels.x}}</SCRIPT>"#;
        let fragments = HtmlFragmentSplitter.split(page);
        assert_eq!(ids_and_contents(&fragments), vec![("_snippet", page)]);
    }

    #[test]
    fn no_empty_fragments() {
        let page = r#"<script data-service="/a">1</script><script data-service="/b">2</script>"#;
        let fragments = HtmlFragmentSplitter.split(page);
        assert_eq!(fragments.len(), 2);
        assert!(fragments.iter().all(|f| !f.is_raw()));

        assert!(HtmlFragmentSplitter.split("").is_empty());
    }

    #[test]
    fn multiline_snippets() {
        let page = "<div>\n<script data-service=\"/a\">\n  <p>{{x}}</p>\n</script>\n</div>";
        let fragments = HtmlFragmentSplitter.split(page);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].content(), "<div>\n");
        assert_eq!(fragments[2].content(), "\n</div>");
    }
}
