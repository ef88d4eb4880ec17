//! Support for Android `strings.xml` resource files.
//!
//! Reads `<string>`, `<plurals>` and `<string-array>` elements plus XML
//! comments into a [`ResourceTree`], preserving document order. Any other
//! element under `<resources>` is skipped.

use quick_xml::{
    Reader, Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{PluralGroup, ResourceNode, ResourceTree, Scalar, StringArray},
};

impl Parser for ResourceTree {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        // Whitespace matters for telling a text child from no child at all.
        xml_reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut tree = ResourceTree::default();
        let mut depth = 0usize;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if depth == 0 => {
                    if e.name().as_ref() != b"resources" {
                        return Err(Error::DataMismatch(format!(
                            "expected <resources> root, found <{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    depth = 1;
                }
                Ok(Event::Start(e)) => {
                    let e = e.into_owned();
                    match e.name().as_ref() {
                        b"string" => {
                            tree.push(ResourceNode::Scalar(parse_string(&e, &mut xml_reader)?))
                        }
                        b"plurals" => {
                            tree.push(ResourceNode::Plural(parse_plurals(&e, &mut xml_reader)?))
                        }
                        b"string-array" => {
                            tree.push(ResourceNode::Array(parse_array(&e, &mut xml_reader)?))
                        }
                        _ => skip_element(&e, &mut xml_reader)?,
                    }
                }
                Ok(Event::Empty(e)) if depth == 1 => match e.name().as_ref() {
                    b"string" => {
                        let (name, translatable) = string_attributes(&e)?;
                        tree.push(ResourceNode::Scalar(Scalar {
                            name,
                            value: None,
                            cdata: false,
                            translatable,
                        }));
                    }
                    b"plurals" => tree.push(ResourceNode::Plural(PluralGroup {
                        name: required_attribute(&e, "plurals", "name")?,
                        items: Vec::new(),
                    })),
                    b"string-array" => tree.push(ResourceNode::Array(StringArray {
                        name: required_attribute(&e, "string-array", "name")?,
                        items: Vec::new(),
                    })),
                    _ => {}
                },
                Ok(Event::Comment(e)) if depth == 1 => {
                    tree.push(ResourceNode::Comment(bytes_to_string(&e)?));
                }
                Ok(Event::End(_)) if depth == 1 => depth = 0,
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }
        Ok(tree)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(&mut writer);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        xml_writer.write_event(Event::Start(BytesStart::new("resources")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;

        for node in &self.nodes {
            xml_writer.write_event(Event::Text(BytesText::new("    ")))?;
            match node {
                ResourceNode::Scalar(s) => {
                    let mut elem = BytesStart::new("string");
                    elem.push_attribute(("name", s.name.as_str()));
                    if !s.translatable {
                        elem.push_attribute(("translatable", "false"));
                    }
                    match &s.value {
                        None => xml_writer.write_event(Event::Empty(elem))?,
                        Some(value) => {
                            xml_writer.write_event(Event::Start(elem))?;
                            if s.cdata {
                                xml_writer.write_event(Event::CData(BytesCData::new(value)))?;
                            } else {
                                xml_writer.write_event(Event::Text(BytesText::new(value)))?;
                            }
                            xml_writer.write_event(Event::End(BytesEnd::new("string")))?;
                        }
                    }
                }
                ResourceNode::Plural(p) => {
                    let mut elem = BytesStart::new("plurals");
                    elem.push_attribute(("name", p.name.as_str()));
                    xml_writer.write_event(Event::Start(elem))?;
                    for (quantity, text) in &p.items {
                        let mut item = BytesStart::new("item");
                        item.push_attribute(("quantity", quantity.as_str()));
                        write_item(&mut xml_writer, item, text)?;
                    }
                    xml_writer.write_event(Event::Text(BytesText::new("\n    ")))?;
                    xml_writer.write_event(Event::End(BytesEnd::new("plurals")))?;
                }
                ResourceNode::Array(a) => {
                    let mut elem = BytesStart::new("string-array");
                    elem.push_attribute(("name", a.name.as_str()));
                    xml_writer.write_event(Event::Start(elem))?;
                    for text in &a.items {
                        write_item(&mut xml_writer, BytesStart::new("item"), text)?;
                    }
                    xml_writer.write_event(Event::Text(BytesText::new("\n    ")))?;
                    xml_writer.write_event(Event::End(BytesEnd::new("string-array")))?;
                }
                ResourceNode::Comment(text) => {
                    xml_writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
                }
            }
            xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("resources")))?;
        xml_writer.write_event(Event::Text(BytesText::new("\n")))?;
        Ok(())
    }
}

fn write_item<W: Write>(
    xml_writer: &mut Writer<W>,
    item: BytesStart<'_>,
    text: &str,
) -> Result<(), Error> {
    xml_writer.write_event(Event::Text(BytesText::new("\n        ")))?;
    xml_writer.write_event(Event::Start(item))?;
    xml_writer.write_event(Event::Text(BytesText::new(text)))?;
    xml_writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn bytes_to_string(bytes: &[u8]) -> Result<String, Error> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::DataMismatch(e.to_string()))
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn required_attribute(
    e: &BytesStart,
    element: &'static str,
    attribute_name: &'static str,
) -> Result<String, Error> {
    attribute(e, attribute_name.as_bytes())?.ok_or(Error::MissingAttribute {
        element,
        attribute: attribute_name,
    })
}

fn string_attributes(e: &BytesStart) -> Result<(String, bool), Error> {
    let name = required_attribute(e, "string", "name")?;
    let translatable = attribute(e, b"translatable")?.is_none_or(|v| v != "false");
    Ok((name, translatable))
}

/// Collects the text of everything up to the matching end tag.
///
/// Returns the concatenated text (nested markup contributes its text only),
/// whether any child node was seen, and whether the first child was CDATA.
fn read_text_content<R: BufRead>(
    xml_reader: &mut Reader<R>,
) -> Result<(String, bool, bool), Error> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut has_children = false;
    let mut first_is_cdata = false;
    let mut depth = 0usize;

    loop {
        let event = xml_reader.read_event_into(&mut buf)?;
        if !has_children && !matches!(event, Event::End(_) | Event::Eof) {
            has_children = true;
            first_is_cdata = matches!(event, Event::CData(_));
        }
        match event {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&bytes_to_string(&e)?),
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(Error::DataMismatch("unexpected end of file".to_string()));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok((text, has_children, first_is_cdata))
}

fn parse_string<R: BufRead>(e: &BytesStart, xml_reader: &mut Reader<R>) -> Result<Scalar, Error> {
    let (name, translatable) = string_attributes(e)?;
    let (text, has_children, cdata) = read_text_content(xml_reader)?;
    Ok(Scalar {
        name,
        value: has_children.then_some(text),
        cdata,
        translatable,
    })
}

fn parse_plurals<R: BufRead>(
    e: &BytesStart,
    xml_reader: &mut Reader<R>,
) -> Result<PluralGroup, Error> {
    let name = required_attribute(e, "plurals", "name")?;
    let mut items = Vec::new();
    read_items(xml_reader, |item, text| {
        let quantity = required_attribute(item, "item", "quantity")?;
        items.push((quantity, text));
        Ok(())
    })?;
    Ok(PluralGroup { name, items })
}

fn parse_array<R: BufRead>(
    e: &BytesStart,
    xml_reader: &mut Reader<R>,
) -> Result<StringArray, Error> {
    let name = required_attribute(e, "string-array", "name")?;
    let mut items = Vec::new();
    read_items(xml_reader, |_, text| {
        items.push(text);
        Ok(())
    })?;
    Ok(StringArray { name, items })
}

/// Feeds every `<item>` child to `on_item` until the parent's end tag.
/// Non-element children and other elements are passed over.
fn read_items<R: BufRead>(
    xml_reader: &mut Reader<R>,
    mut on_item: impl FnMut(&BytesStart, String) -> Result<(), Error>,
) -> Result<(), Error> {
    let mut buf = Vec::new();
    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"item" => {
                let e = e.into_owned();
                let (text, _, _) = read_text_content(xml_reader)?;
                on_item(&e, text)?;
            }
            Event::Empty(e) if e.name().as_ref() == b"item" => {
                let e = e.into_owned();
                on_item(&e, String::new())?;
            }
            Event::Start(e) => {
                let e = e.into_owned();
                skip_element(&e, xml_reader)?;
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(Error::DataMismatch("unexpected end of file".to_string()));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn skip_element<R: BufRead>(e: &BytesStart, xml_reader: &mut Reader<R>) -> Result<(), Error> {
    let mut buf = Vec::new();
    xml_reader.read_to_end_into(e.to_end().name(), &mut buf)?;
    Ok(())
}
