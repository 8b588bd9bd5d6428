//! Reads a listing page: detail-page links, or inline service cards.

use crate::core::date_recognizer;
use crate::domain::model::{DetailReference, ServiceEvent};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

const CARD_SELECTOR: &str = ".obit-item";
const CARD_NAME_SELECTOR: &str = ".obit-name";
const CARD_DATE_SELECTOR: &str = ".service-date";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// Site-relative links starting with `prefix`, in first-seen order with
/// exact duplicates dropped.
pub fn discover_references(html: &str, prefix: &str) -> Vec<DetailReference> {
    let document = Html::parse_document(html);
    let links = selector("a[href]");
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for anchor in document.select(&links) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if !href.starts_with(prefix) || href.starts_with("//") {
            continue;
        }
        if seen.insert(href.to_string()) {
            references.push(DetailReference::new(href));
        }
    }

    references
}

/// Candidates carried inline by `.obit-item` cards. Cards without a name or a
/// recognisable service date are skipped.
pub fn discover_cards(html: &str, base: &Url) -> Vec<ServiceEvent> {
    let document = Html::parse_document(html);
    let cards = selector(CARD_SELECTOR);
    let names = selector(CARD_NAME_SELECTOR);
    let dates = selector(CARD_DATE_SELECTOR);
    let links = selector("a[href]");

    document
        .select(&cards)
        .filter_map(|card| {
            let name = element_text(card.select(&names).next()?);
            let date_text = element_text(card.select(&dates).next()?);
            let date_time = date_recognizer::recognize(&date_text)?.to_datetime();
            let link = card
                .select(&links)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| base.join(href.trim()).ok())
                .map(|url| url.to_string());
            ServiceEvent::new(&name, date_time, link)
        })
        .collect()
}
