//! Rule-driven field extraction from marketplace HTML.
//!
//! A field is described by an ordered list of [`Rule`]s. Each rule picks the
//! first element matching its selector inside a scope and reads a raw string
//! from it; the field's parser in [`parse`] then accepts or rejects that
//! string. The first accepted value wins.
//!
//! `scraper::Html` is `!Send`, so everything here is synchronous and callers
//! drop the document before their next `.await`.

mod layout;
pub mod parse;

use mandi_core::error::AppError;
use scraper::{ElementRef, Selector};

pub use layout::{DetailLayout, DetailSpec, ExtractContext, SearchLayout, SearchSpec};

/// How a rule reads a value from the element its selector matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    /// Concatenated descendant text.
    Text,
    /// A single attribute.
    Attr(&'static str),
    /// The attribute if present and non-blank, else the text.
    AttrOrText(&'static str),
    /// The text if non-blank, else the attribute.
    TextOrAttr(&'static str),
    /// The first of several attributes that is present and non-blank.
    AnyAttr(&'static [&'static str]),
}

/// Uncompiled rule: a CSS selector and how to read the matched element.
pub type RuleSpec = (&'static str, Read);

#[derive(Debug, Clone)]
pub struct Rule {
    selector: Selector,
    read: Read,
}

impl Rule {
    pub fn compile(css: &str, read: Read) -> Result<Self, AppError> {
        Ok(Self {
            selector: compile_selector(css)?,
            read,
        })
    }

    /// Read the first element matching this rule inside `scope`.
    pub fn apply(&self, scope: ElementRef<'_>) -> Option<String> {
        scope
            .select(&self.selector)
            .next()
            .and_then(|el| read_element(el, self.read))
    }

    /// Read every element matching this rule inside `scope`.
    pub fn apply_all<'a>(&'a self, scope: ElementRef<'a>) -> impl Iterator<Item = String> + 'a {
        scope
            .select(&self.selector)
            .filter_map(|el| read_element(el, self.read))
    }
}

fn read_element(el: ElementRef<'_>, read: Read) -> Option<String> {
    let text = || non_blank(el.text().collect::<String>());
    let attr = |name: &str| el.value().attr(name).and_then(|v| non_blank(v.to_string()));

    match read {
        Read::Text => text(),
        Read::Attr(name) => attr(name),
        Read::AttrOrText(name) => attr(name).or_else(text),
        Read::TextOrAttr(name) => text().or_else(|| attr(name)),
        Read::AnyAttr(names) => names.iter().find_map(|name| attr(*name)),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First value produced by `rules` that `parse` accepts.
pub fn first_accepted<T>(
    rules: &[Rule],
    scope: ElementRef<'_>,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    rules
        .iter()
        .filter_map(|rule| rule.apply(scope))
        .find_map(|raw| parse(raw.as_str()))
}

pub(crate) fn compile_selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("Invalid selector '{css}': {e}")))
}

pub(crate) fn compile_selectors(css: &[&str]) -> Result<Vec<Selector>, AppError> {
    css.iter().map(|s| compile_selector(s)).collect()
}

pub(crate) fn compile_rules(specs: &[RuleSpec]) -> Result<Vec<Rule>, AppError> {
    specs
        .iter()
        .map(|(css, read)| Rule::compile(css, *read))
        .collect()
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    const CARD: &str = r#"<html><body><div class="card">
        <h2 title="  Title attr  "><span>  Visible title  </span></h2>
        <img class="lazy" data-src="https://img.example/a.jpg">
        <i class="stars" aria-label="4.1 out of 5 stars"></i>
        <span class="empty">   </span>
    </div></body></html>"#;

    fn with_card<T>(f: impl FnOnce(ElementRef<'_>) -> T) -> T {
        let doc = Html::parse_document(CARD);
        f(doc.root_element())
    }

    #[test]
    fn read_variants() {
        with_card(|scope| {
            let get = |css: &str, how: Read| Rule::compile(css, how).unwrap().apply(scope);

            assert_eq!(get("h2", Read::Text).as_deref(), Some("Visible title"));
            assert_eq!(get("h2", Read::Attr("title")).as_deref(), Some("Title attr"));
            assert_eq!(get("h2", Read::AttrOrText("title")).as_deref(), Some("Title attr"));
            assert_eq!(
                get("i.stars", Read::TextOrAttr("aria-label")).as_deref(),
                Some("4.1 out of 5 stars")
            );
            assert_eq!(
                get("img", Read::AnyAttr(&["src", "data-src"])).as_deref(),
                Some("https://img.example/a.jpg")
            );
            assert_eq!(get("span.empty", Read::Text), None);
            assert_eq!(get("table", Read::Text), None);
        });
    }

    #[test]
    fn first_accepted_skips_rejected_values() {
        with_card(|scope| {
            let rules = compile_rules(&[
                ("span.empty", Read::Text),
                ("h2", Read::Text),
                ("i.stars", Read::Attr("aria-label")),
            ])
            .unwrap();

            let rating = first_accepted(&rules, scope, parse::rating);
            assert_eq!(rating, Some(4.1));
        });
    }

    #[test]
    fn invalid_selector_is_parse_error() {
        let err = Rule::compile("div[", Read::Text).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
