//! Embedded Next.js payload extraction.
//!
//! fmplapla station pages carry their metadata in the standard
//! `<script id="__NEXT_DATA__" type="application/json">` element. The
//! whole document is parsed and the payload deserialized into whatever
//! shape the caller declares; an absent or malformed payload is simply
//! `None`, which extractors surface as their own not-found condition.

use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use tracing::debug;

pub fn extract_next_data<T: DeserializeOwned>(html: &str) -> Option<T> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let script = document.select(&selector).next()?;
    let payload: String = script.text().collect();
    match serde_json::from_str(&payload) {
        Ok(data) => Some(data),
        Err(err) => {
            debug!(%err, "embedded payload did not deserialize");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extracts_payload() {
        let html = r#"
            <html><body>
            <script id="__NEXT_DATA__" type="application/json">
                {"props": {"pageProps": {"station": {"id": "fmnishitokyo"}}}}
            </script>
            </body></html>
        "#;
        let data: Value = extract_next_data(html).expect("payload should parse");
        assert_eq!(data["props"]["pageProps"]["station"]["id"], "fmnishitokyo");
    }

    #[test]
    fn test_absent_payload_is_none() {
        let html = "<html><body><p>no data here</p></body></html>";
        assert!(extract_next_data::<Value>(html).is_none());
    }

    #[test]
    fn test_malformed_payload_is_none() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{broken</script>"#;
        assert!(extract_next_data::<Value>(html).is_none());
    }

    #[test]
    fn test_other_scripts_are_ignored() {
        let html = r#"
            <script type="application/json">{"decoy": true}</script>
            <script id="__NEXT_DATA__" type="application/json">{"real": true}</script>
        "#;
        let data: Value = extract_next_data(html).unwrap();
        assert_eq!(data["real"], true);
    }
}
