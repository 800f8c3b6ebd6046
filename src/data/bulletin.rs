//! Bulletin XML parsing
//!
//! Turns raw citypage XML into the generic `Node` tree from `value`. Elements
//! without attributes or children collapse to plain text, repeated sibling
//! names become lists, and attributes are kept by name. No schema knowledge
//! lives here; that belongs to the normalizer.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::value::{Element, Node};
use super::BulletinError;

/// A parsed bulletin document
#[derive(Debug, Clone, PartialEq)]
pub struct Bulletin {
    root: Element,
}

impl Bulletin {
    /// Parses raw bulletin text into a document tree
    pub fn parse(xml: &str) -> Result<Self, BulletinError> {
        let mut reader = Reader::from_str(xml);
        // Stack of open elements; the bottom entry is the document itself
        let mut stack: Vec<(String, Element)> = vec![(String::new(), Element::default())];

        loop {
            let event = reader
                .read_event()
                .map_err(|e| BulletinError::Malformed(e.to_string()))?;

            match event {
                Event::Start(start) => {
                    let (name, element) = open_element(&start)?;
                    stack.push((name, element));
                }
                Event::Empty(start) => {
                    let (name, element) = open_element(&start)?;
                    attach(&mut stack, name, element);
                }
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(BulletinError::Malformed(
                            "closing tag without matching opening tag".to_string(),
                        ));
                    }
                    if let Some((name, element)) = stack.pop() {
                        attach(&mut stack, name, element);
                    }
                }
                Event::Text(text) => {
                    let raw = String::from_utf8_lossy(&text);
                    append_text(&mut stack, &unescape(&raw)?);
                }
                Event::CData(data) => {
                    append_text(&mut stack, &String::from_utf8_lossy(&data));
                }
                Event::GeneralRef(reference) => {
                    let entity = format!("&{};", String::from_utf8_lossy(&reference));
                    append_text(&mut stack, &unescape(&entity)?);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(BulletinError::Malformed(format!(
                "unexpected end of document inside <{}>",
                stack.last().map(|(name, _)| name.as_str()).unwrap_or_default()
            )));
        }

        let (_, root) = stack.remove(0);
        Ok(Self { root })
    }

    /// Returns a top-level section of the document, e.g. `siteData`
    pub fn section(&self, name: &str) -> Option<&Node> {
        self.root.child(name)
    }
}

/// Reads the name and attributes of an opening tag
fn open_element(start: &BytesStart<'_>) -> Result<(String, Element), BulletinError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::default();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| BulletinError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attribute.value);
        let value = unescape(&raw)?;
        element.attributes.insert(key, value.trim().to_string());
    }

    Ok((name, element))
}

/// Closes an element and hangs it under the current parent
fn attach(stack: &mut [(String, Element)], name: String, mut element: Element) {
    let text = element.text.take().map(|t| t.trim().to_string());
    let text = text.filter(|t| !t.is_empty());

    let node = if element.attributes.is_empty() && element.children.is_empty() {
        Node::Text(text.unwrap_or_default())
    } else {
        element.text = text;
        Node::Element(element)
    };

    if let Some((_, parent)) = stack.last_mut() {
        parent.push_child(name, node);
    }
}

fn append_text(stack: &mut [(String, Element)], fragment: &str) {
    if let Some((_, current)) = stack.last_mut() {
        current
            .text
            .get_or_insert_with(String::new)
            .push_str(fragment);
    }
}

fn unescape(raw: &str) -> Result<Cow<'_, str>, BulletinError> {
    quick_xml::escape::unescape(raw).map_err(|e| BulletinError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::{as_sequence, extract_text};

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<siteData>
  <location>
    <province code="ab">Alberta</province>
    <name code="s0000403" lat="51.09N" lon="115.35W">Canmore</name>
  </location>
  <currentConditions>
    <condition>Mostly Cloudy &amp; cool</condition>
    <temperature unitType="metric" units="C">12.3</temperature>
    <wind>
      <speed unitType="metric" units="km/h">10</speed>
      <gust unitType="metric" units="km/h"></gust>
    </wind>
  </currentConditions>
  <forecastGroup>
    <forecast><period textForecastName="Today">Monday</period></forecast>
    <forecast><period textForecastName="Tonight">Monday night</period></forecast>
  </forecastGroup>
  <empty/>
</siteData>"#;

    #[test]
    fn test_parse_builds_sections() {
        let bulletin = Bulletin::parse(SAMPLE).expect("sample should parse");
        let site = bulletin.section("siteData").expect("siteData present");

        assert_eq!(extract_text(site.path(&["location", "name"])), "Canmore");
        assert_eq!(
            site.path(&["location", "province"])
                .and_then(|n| n.attribute("code")),
            Some("ab")
        );
    }

    #[test]
    fn test_parse_collapses_plain_elements_and_unescapes() {
        let bulletin = Bulletin::parse(SAMPLE).unwrap();
        let site = bulletin.section("siteData").unwrap();

        let condition = site.path(&["currentConditions", "condition"]);
        assert_eq!(condition, Some(&Node::Text("Mostly Cloudy & cool".to_string())));
        assert!(matches!(site.child("empty"), Some(Node::Text(t)) if t.is_empty()));
    }

    #[test]
    fn test_parse_keeps_attributes_with_text() {
        let bulletin = Bulletin::parse(SAMPLE).unwrap();
        let site = bulletin.section("siteData").unwrap();

        let temperature = site.path(&["currentConditions", "temperature"]).unwrap();
        assert_eq!(temperature.attribute("units"), Some("C"));
        assert_eq!(extract_text(Some(temperature)), "12.3");

        let gust = site.path(&["currentConditions", "wind", "gust"]);
        assert_eq!(extract_text(gust), "");
    }

    #[test]
    fn test_parse_repeated_elements_become_list() {
        let bulletin = Bulletin::parse(SAMPLE).unwrap();
        let site = bulletin.section("siteData").unwrap();

        let forecasts = as_sequence(site.path(&["forecastGroup", "forecast"]));
        assert_eq!(forecasts.len(), 2);
        let names: Vec<_> = forecasts
            .iter()
            .filter_map(|f| f.child("period").and_then(|p| p.attribute("textForecastName")))
            .collect();
        assert_eq!(names, vec!["Today", "Tonight"]);
    }

    #[test]
    fn test_parse_missing_section() {
        let bulletin = Bulletin::parse("<other><x>1</x></other>").unwrap();
        assert!(bulletin.section("siteData").is_none());
        assert!(bulletin.section("other").is_some());
    }

    #[test]
    fn test_parse_rejects_unbalanced_document() {
        assert!(Bulletin::parse("<siteData><location>").is_err());
        assert!(Bulletin::parse("<a></b>").is_err());
    }
}
