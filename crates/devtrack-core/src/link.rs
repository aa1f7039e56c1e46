//! Deep links for device actions.
//!
//! An action is a link to the current page (origin and path, query dropped)
//! with the [`ActionParams`] in the fragment. Opening it in a new browsing
//! context lets the page pick the action up from its own location.

use devtrack_proto::{ActionParams, FRAGMENT_PREFIX};
use url::Url;

use crate::dom::Document;

/// `href` for `params` relative to `page`.
pub fn link_href(page: &Url, params: &ActionParams) -> String {
    let mut target = page.clone();
    target.set_query(None);
    let fragment = format!("{}{}", FRAGMENT_PREFIX.trim_start_matches('#'), params.to_fragment());
    target.set_fragment(Some(&fragment));
    target.into()
}

/// Build a detached `<a>` opening `params` in a new browsing context.
pub fn build_link<D: Document>(doc: &mut D, params: &ActionParams, text: &str) -> D::Node {
    let href = link_href(doc.location(), params);
    let anchor = doc.create_element("a");
    doc.set_attribute(anchor, "href", &href);
    doc.set_attribute(anchor, "rel", "noopener noreferrer");
    doc.set_attribute(anchor, "target", "_blank");
    doc.set_text(anchor, text);
    anchor
}

#[cfg(test)]
mod tests {
    use devtrack_proto::StreamParams;

    use super::*;
    use crate::dom::MemoryDocument;

    fn page() -> Url {
        Url::parse("https://dash.example:8000/app/index.html?debug=1#old").unwrap()
    }

    #[test]
    fn href_replaces_query_and_fragment() {
        let params = ActionParams::Shell { udid: "emulator-5554".into() };
        assert_eq!(
            link_href(&page(), &params),
            "https://dash.example:8000/app/index.html#!action=shell&udid=emulator-5554"
        );
    }

    #[test]
    fn anchor_opens_in_new_context() {
        let mut doc = MemoryDocument::new(page());
        let params = ActionParams::Devtools { udid: "X".into() };
        let anchor = build_link(&mut doc, &params, "Devtools");

        assert_eq!(doc.tag_name(anchor), "a");
        assert_eq!(doc.attribute(anchor, "target").as_deref(), Some("_blank"));
        assert_eq!(doc.attribute(anchor, "rel").as_deref(), Some("noopener noreferrer"));
        assert_eq!(doc.text_content(anchor), "Devtools");
    }

    #[test]
    fn href_fragment_decodes_to_params() {
        let params = ActionParams::Stream(StreamParams {
            udid: "serial with spaces/&=".into(),
            decoder: "broadway".into(),
            ip: "192.168.1.20".into(),
            port: 8886,
            query: Some("a=b&c=d".into()),
        });

        let href = link_href(&page(), &params);
        let parsed = Url::parse(&href).unwrap();
        let decoded = ActionParams::from_fragment(parsed.fragment().unwrap()).unwrap();
        assert_eq!(decoded, params);
    }
}
