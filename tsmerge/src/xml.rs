//! A small element tree built from quick-xml events.
//!
//! The catalog reader only needs tagged nodes with attributes and ordered
//! children, so the whole document is materialized first and then walked.
//! Text is kept exactly as written (no trimming): whitespace inside
//! `<source>` and `<translation>` is significant.

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Element {
    /// Parses a whole document and returns its root element.
    pub fn parse_document(text: &str) -> Result<Element, Error> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => stack.push(Element::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Element::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::malformed("closing tag without opening tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|err| Error::malformed(format!("CDATA section: {}", err)))?;
                        top.push_text(text);
                    }
                }
                Event::Comment(e) => {
                    if let Some(top) = stack.last_mut() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|err| Error::malformed(format!("comment: {}", err)))?;
                        top.children.push(Node::Comment(text.to_string()));
                    }
                }
                Event::Eof => break,
                // Declaration, doctype and processing instructions carry no catalog data.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::malformed(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }
        root.ok_or_else(|| Error::malformed("document has no root element"))
    }

    fn from_start(start: &BytesStart) -> Result<Element, Error> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::malformed(format!("<{}>: {}", name, e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        match self.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => self.children.push(Node::Text(text.to_string())),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text between them.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) | Node::Comment(_) => None,
        })
    }

    /// Raw text of the comments directly inside this element.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|node| match node {
            Node::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), Error> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::malformed(format!(
                "unexpected second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = Element::parse_document(concat!(
            r#"<?xml version="1.0"?><!DOCTYPE TS>"#,
            r#"<TS version="2.1"><context><name>Main</name></context></TS>"#,
        ))
        .unwrap();
        assert_eq!(root.name, "TS");
        assert_eq!(root.attr("version"), Some("2.1"));
        let context = root.child("context").unwrap();
        let name = context.child("name").unwrap();
        assert_eq!(name.children, vec![Node::Text("Main".to_string())]);
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let root = Element::parse_document("<a>  spaced &amp; escaped  </a>").unwrap();
        assert_eq!(
            root.children,
            vec![Node::Text("  spaced & escaped  ".to_string())]
        );
    }

    #[test]
    fn test_cdata_joins_adjacent_text() {
        let root = Element::parse_document("<a>x<![CDATA[<y>]]>z</a>").unwrap();
        assert_eq!(root.children, vec![Node::Text("x<y>z".to_string())]);
    }

    #[test]
    fn test_comments_are_kept_apart_from_text() {
        let root = Element::parse_document("<m><!-- note --><s>x</s>a<!--b-->c</m>").unwrap();
        assert_eq!(root.comments().collect::<Vec<_>>(), vec![" note ", "b"]);
        assert_eq!(root.elements().count(), 1);
        assert_eq!(
            root.children[2..],
            [
                Node::Text("a".to_string()),
                Node::Comment("b".to_string()),
                Node::Text("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_elements_keep_attributes() {
        let root =
            Element::parse_document(r#"<m><location filename="a.cpp" line="+2"/></m>"#).unwrap();
        let location = root.child("location").unwrap();
        assert_eq!(location.attr("filename"), Some("a.cpp"));
        assert_eq!(location.attr("line"), Some("+2"));
        assert!(location.children.is_empty());
    }

    #[test]
    fn test_unclosed_document_is_malformed() {
        let err = Element::parse_document("<TS><context>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_mismatched_end_tag_is_malformed() {
        let err = Element::parse_document("<TS><context></TS>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_document_is_malformed() {
        let err = Element::parse_document("<?xml version=\"1.0\"?>\n").unwrap_err();
        assert!(err.to_string().contains("no root element"));
    }
}
