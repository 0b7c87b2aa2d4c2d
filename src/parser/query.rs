//! Small typed helpers over `scraper` so the extractors read as
//! "select first / select all / text / attribute".

use scraper::{ElementRef, Html, Selector};

/// Parse a selector that is known to be valid at compile time.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

pub fn select_first<'a>(doc: &'a Html, sel: &Selector) -> Option<ElementRef<'a>> {
    doc.select(sel).next()
}

pub fn select_first_in<'a>(node: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    node.select(sel).next()
}

pub fn select_all<'a>(doc: &'a Html, sel: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    doc.select(sel)
}

/// Concatenated descendant text, trimmed.
pub fn text(node: ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}

pub fn attr<'a>(node: ElementRef<'a>, name: &str) -> Option<&'a str> {
    node.value().attr(name)
}

/// First text node anywhere in the document containing `needle`.
pub fn find_text_node<'a>(doc: &'a Html, needle: &str) -> Option<&'a str> {
    doc.root_element().text().find(|t| t.contains(needle))
}
