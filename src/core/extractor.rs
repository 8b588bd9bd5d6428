//! Turns one obituary detail page into a candidate service event.

use crate::core::date_recognizer;
use crate::domain::model::ServiceEvent;
use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use scraper::{Html, Node, Selector};
use url::Url;

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Text of the first `<h1>`, whitespace-collapsed; empty when absent.
pub fn heading_text(document: &Html) -> String {
    let heading = Selector::parse("h1").expect("static selector is valid");
    document
        .select(&heading)
        .next()
        .map(|h1| h1.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// All rendered text of the page as one whitespace-normalised string.
pub fn visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()));
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

/// `None` when the page has no heading or no embedded service date.
pub fn extract_event(html: &str, source_link: Option<String>) -> Option<ServiceEvent> {
    let document = Html::parse_document(html);
    let name = heading_text(&document);
    let date_time = date_recognizer::search_embedded(&visible_text(&document))?;
    ServiceEvent::new(&name, date_time, source_link)
}

/// One fetch per call. Transport errors are returned; a page without a usable
/// event is `Ok(None)`.
pub async fn fetch_event<F: PageFetcher>(fetcher: &F, url: &Url) -> Result<Option<ServiceEvent>> {
    let html = fetcher.fetch_text(url.as_str()).await?;
    let event = extract_event(&html, Some(url.to_string()));
    if event.is_none() {
        tracing::debug!("No service event found on {}", url);
    }
    Ok(event)
}
