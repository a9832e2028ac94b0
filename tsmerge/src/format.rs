//! Reading and writing the Qt Linguist `.ts` dialect.
//!
//! The reader walks the element tree from [`crate::xml`] and fails with
//! [`Error::MalformedCatalog`] when required structure is missing or an
//! attribute has the wrong type. The writer is deterministic and follows
//! lupdate's layout: XML declaration, `<!DOCTYPE TS>`, root attributes in the
//! order `version`, `language`, `sourcelanguage`, four-space indentation.

use std::io::Write;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::Error,
    traits::Parser,
    types::{Catalog, Context, Extra, Location, Message, Translation, TranslationState},
    xml::{Element, Node},
};

/// Version written when a catalog does not carry one.
pub const DEFAULT_VERSION: &str = "2.1";

/// Qt joins length variants of one string with this character.
pub const LENGTH_VARIANT_SEPARATOR: char = '\u{9c}';

const INDENT: &str = "    ";

/// Prefix of the XML comments that carry translations which lost a merge.
const ALTERNATIVE_PREFIX: &str = " alternative translation: ";

impl Parser for Catalog {
    fn from_str(text: &str) -> Result<Self, Error> {
        parse_catalog(text)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml = Writer::new(&mut writer);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        line_break(&mut xml)?;
        xml.write_event(Event::DocType(BytesText::from_escaped("TS")))?;
        line_break(&mut xml)?;

        let mut root = BytesStart::new("TS");
        if let Some(version) = &self.version {
            root.push_attribute(("version", version.as_str()));
        }
        if let Some(language) = &self.language {
            root.push_attribute(("language", language.as_str()));
        }
        if let Some(source_language) = &self.source_language {
            root.push_attribute(("sourcelanguage", source_language.as_str()));
        }
        xml.write_event(Event::Start(root))?;
        line_break(&mut xml)?;

        if !self.dependencies.is_empty() {
            write_dependencies(&mut xml, &self.dependencies)?;
        }
        for context in &self.contexts {
            write_context(&mut xml, context)?;
        }

        xml.write_event(Event::End(BytesEnd::new("TS")))?;
        line_break(&mut xml)?;
        Ok(())
    }
}

fn parse_catalog(text: &str) -> Result<Catalog, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let root = Element::parse_document(text)?;
    if root.name != "TS" {
        return Err(Error::malformed(format!(
            "root element must be <TS>, found <{}>",
            root.name
        )));
    }

    let mut catalog = Catalog {
        version: non_empty_attr(&root, "version"),
        source_language: non_empty_attr(&root, "sourcelanguage"),
        language: non_empty_attr(&root, "language"),
        dependencies: Vec::new(),
        contexts: Vec::new(),
    };

    for child in root.elements() {
        match child.name.as_str() {
            "dependencies" => catalog.dependencies.extend(parse_dependencies(child)?),
            "context" => catalog.contexts.push(parse_context(child)?),
            other => tracing::debug!(element = other, "skipping unsupported <TS> child"),
        }
    }

    Ok(catalog)
}

fn parse_dependencies(element: &Element) -> Result<Vec<String>, Error> {
    element
        .elements()
        .filter(|e| e.name == "dependency")
        .map(|e| {
            e.attr("catalog")
                .map(str::to_string)
                .ok_or_else(|| Error::malformed("<dependency> without catalog attribute"))
        })
        .collect()
}

fn parse_context(element: &Element) -> Result<Context, Error> {
    let mut name = None;
    let mut context = Context {
        encoding: element.attr("encoding").map(str::to_string),
        ..Default::default()
    };

    for child in element.elements() {
        match child.name.as_str() {
            "name" => name = Some(text_of(child)?),
            "comment" => context.comment = Some(text_of(child)?),
            "message" => context.messages.push(parse_message(child)?),
            other => tracing::debug!(element = other, "skipping unsupported <context> child"),
        }
    }

    context.name = name.ok_or_else(|| Error::malformed("<context> without <name>"))?;
    Ok(context)
}

fn parse_message(element: &Element) -> Result<Message, Error> {
    let numerus = match element.attr("numerus") {
        Some(value) => parse_yes_no(value)
            .ok_or_else(|| Error::malformed(format!("invalid numerus attribute `{}`", value)))?,
        None => false,
    };

    let mut message = Message {
        id: element.attr("id").map(str::to_string),
        numerus,
        translation: if numerus {
            Translation::Numerus(Vec::new())
        } else {
            Translation::default()
        },
        alternatives: element
            .comments()
            .filter_map(|c| c.strip_prefix(ALTERNATIVE_PREFIX))
            .map(|c| c.strip_suffix(' ').unwrap_or(c).to_string())
            .collect(),
        ..Default::default()
    };
    let mut source = None;

    for child in element.elements() {
        match child.name.as_str() {
            "location" => message.locations.push(parse_location(child)?),
            "source" => source = Some(text_of(child)?),
            "oldsource" => message.old_source = Some(text_of(child)?),
            "comment" => message.comment = Some(text_of(child)?),
            "oldcomment" => message.old_comment = Some(text_of(child)?),
            "extracomment" => message.extra_comment = Some(text_of(child)?),
            "translatorcomment" => message.translator_comment = Some(text_of(child)?),
            "translation" => {
                let (translation, state) = parse_translation(child, numerus)?;
                message.translation = translation;
                message.state = state;
            }
            name if name.starts_with("extra-") => message.extras.push(Extra {
                name: name.to_string(),
                value: text_of(child)?,
            }),
            other => tracing::debug!(element = other, "skipping unsupported <message> child"),
        }
    }

    message.source = source.ok_or_else(|| {
        let hint = message.id.as_deref().unwrap_or("<no id>");
        Error::malformed(format!("<message> without <source> (id {})", hint))
    })?;
    Ok(message)
}

/// Plural messages always get [`Translation::Numerus`], even when no
/// `<numerusform>` is present yet.
fn parse_translation(
    element: &Element,
    numerus: bool,
) -> Result<(Translation, TranslationState), Error> {
    let state = match element.attr("type") {
        Some(value) => value.parse::<TranslationState>().map_err(Error::malformed)?,
        None => TranslationState::Finished,
    };

    let forms: Vec<&Element> = element
        .elements()
        .filter(|e| e.name == "numerusform")
        .collect();
    let translation = if !forms.is_empty() {
        Translation::Numerus(forms.into_iter().map(text_of).collect::<Result<_, _>>()?)
    } else if numerus {
        let text = text_of(element)?;
        if text.is_empty() {
            Translation::Numerus(Vec::new())
        } else {
            Translation::Numerus(vec![text])
        }
    } else {
        Translation::Singular(text_of(element)?)
    };

    Ok((translation, state))
}

fn parse_location(element: &Element) -> Result<Location, Error> {
    let line = element.attr("line").map(str::to_string);
    if let Some(line) = &line {
        line.parse::<i64>()
            .map_err(|_| Error::malformed(format!("invalid location line `{}`", line)))?;
    }
    Ok(Location {
        filename: element.attr("filename").map(str::to_string),
        line,
    })
}

/// Text content of an element, decoding `<byte>` and `<lengthvariant>` children.
fn text_of(element: &Element) -> Result<String, Error> {
    let variants: Vec<&Element> = element
        .elements()
        .filter(|e| e.name == "lengthvariant")
        .collect();
    if !variants.is_empty() {
        let parts = variants
            .into_iter()
            .map(text_of)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(parts.join(&LENGTH_VARIANT_SEPARATOR.to_string()));
    }

    let mut text = String::new();
    for node in &element.children {
        match node {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name == "byte" => text.push(parse_byte(e)?),
            Node::Element(e) => tracing::debug!(
                element = %e.name,
                parent = %element.name,
                "skipping markup in text"
            ),
            Node::Comment(_) => {}
        }
    }
    Ok(text)
}

fn parse_byte(element: &Element) -> Result<char, Error> {
    let value = element
        .attr("value")
        .ok_or_else(|| Error::malformed("<byte> without value"))?;
    let code = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix('x')) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        value.parse::<u32>().ok()
    };
    code.and_then(char::from_u32)
        .ok_or_else(|| Error::malformed(format!("invalid <byte> value `{}`", value)))
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

fn non_empty_attr(element: &Element, key: &str) -> Option<String> {
    element
        .attr(key)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn write_dependencies<W: Write>(xml: &mut Writer<W>, dependencies: &[String]) -> Result<(), Error> {
    xml.write_event(Event::Start(BytesStart::new("dependencies")))?;
    line_break(xml)?;
    for dependency in dependencies {
        let mut element = BytesStart::new("dependency");
        element.push_attribute(("catalog", dependency.as_str()));
        indent(xml, 1)?;
        xml.write_event(Event::Empty(element))?;
        line_break(xml)?;
    }
    xml.write_event(Event::End(BytesEnd::new("dependencies")))?;
    line_break(xml)
}

fn write_context<W: Write>(xml: &mut Writer<W>, context: &Context) -> Result<(), Error> {
    let mut start = BytesStart::new("context");
    if let Some(encoding) = &context.encoding {
        start.push_attribute(("encoding", encoding.as_str()));
    }
    xml.write_event(Event::Start(start))?;
    line_break(xml)?;

    write_text_element(xml, 1, "name", &context.name)?;
    if let Some(comment) = &context.comment {
        write_text_element(xml, 1, "comment", comment)?;
    }
    for message in &context.messages {
        write_message(xml, message)?;
    }

    xml.write_event(Event::End(BytesEnd::new("context")))?;
    line_break(xml)
}

fn write_message<W: Write>(xml: &mut Writer<W>, message: &Message) -> Result<(), Error> {
    let mut start = BytesStart::new("message");
    if let Some(id) = &message.id {
        start.push_attribute(("id", id.as_str()));
    }
    if message.numerus {
        start.push_attribute(("numerus", "yes"));
    }
    indent(xml, 1)?;
    xml.write_event(Event::Start(start))?;
    line_break(xml)?;

    for location in &message.locations {
        let mut element = BytesStart::new("location");
        if let Some(filename) = &location.filename {
            element.push_attribute(("filename", filename.as_str()));
        }
        if let Some(line) = &location.line {
            element.push_attribute(("line", line.as_str()));
        }
        indent(xml, 2)?;
        xml.write_event(Event::Empty(element))?;
        line_break(xml)?;
    }

    write_text_element(xml, 2, "source", &message.source)?;
    let optional = [
        ("oldsource", &message.old_source),
        ("comment", &message.comment),
        ("oldcomment", &message.old_comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            write_text_element(xml, 2, name, value)?;
        }
    }

    for alternative in &message.alternatives {
        let comment = format!("{}{} ", ALTERNATIVE_PREFIX, comment_safe(alternative));
        indent(xml, 2)?;
        xml.write_event(Event::Comment(BytesText::from_escaped(comment)))?;
        line_break(xml)?;
    }

    let mut translation = BytesStart::new("translation");
    if let Some(kind) = message.state.type_attribute() {
        translation.push_attribute(("type", kind));
    }
    match &message.translation {
        Translation::Singular(text) => write_variant_element(xml, 2, translation, text)?,
        Translation::Numerus(forms) if forms.is_empty() => {
            write_variant_element(xml, 2, translation, "")?
        }
        Translation::Numerus(forms) => {
            indent(xml, 2)?;
            xml.write_event(Event::Start(translation))?;
            line_break(xml)?;
            for form in forms {
                write_variant_element(xml, 3, BytesStart::new("numerusform"), form)?;
            }
            indent(xml, 2)?;
            xml.write_event(Event::End(BytesEnd::new("translation")))?;
            line_break(xml)?;
        }
    }

    for extra in &message.extras {
        write_text_element(xml, 2, &extra.name, &extra.value)?;
    }

    indent(xml, 1)?;
    xml.write_event(Event::End(BytesEnd::new("message")))?;
    line_break(xml)
}

/// Writes `<name>text</name>` on its own line.
fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    depth: usize,
    name: &str,
    text: &str,
) -> Result<(), Error> {
    indent(xml, depth)?;
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    write_text(xml, text)?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    line_break(xml)
}

/// Writes translation text, splitting length variants into `<lengthvariant>` children.
fn write_variant_element<W: Write>(
    xml: &mut Writer<W>,
    depth: usize,
    mut start: BytesStart<'_>,
    text: &str,
) -> Result<(), Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    indent(xml, depth)?;
    if !text.contains(LENGTH_VARIANT_SEPARATOR) {
        xml.write_event(Event::Start(start))?;
        write_text(xml, text)?;
        xml.write_event(Event::End(BytesEnd::new(name)))?;
        return line_break(xml);
    }

    start.push_attribute(("variants", "yes"));
    xml.write_event(Event::Start(start))?;
    line_break(xml)?;
    for variant in text.split(LENGTH_VARIANT_SEPARATOR) {
        write_text_element(xml, depth + 1, "lengthvariant", variant)?;
    }
    indent(xml, depth)?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    line_break(xml)
}

/// Escapes text; characters XML 1.0 cannot carry become `<byte value="xNN"/>`.
fn write_text<W: Write>(xml: &mut Writer<W>, text: &str) -> Result<(), Error> {
    let mut plain = String::new();
    for c in text.chars() {
        if needs_byte_element(c) {
            if !plain.is_empty() {
                xml.write_event(Event::Text(BytesText::new(&plain)))?;
                plain.clear();
            }
            let value = format!("x{:x}", c as u32);
            let mut byte = BytesStart::new("byte");
            byte.push_attribute(("value", value.as_str()));
            xml.write_event(Event::Empty(byte))?;
        } else {
            plain.push(c);
        }
    }
    if !plain.is_empty() {
        xml.write_event(Event::Text(BytesText::new(&plain)))?;
    }
    Ok(())
}

/// Comment bodies may not contain `--` or characters XML cannot carry.
fn comment_safe(text: &str) -> String {
    let mut safe = String::with_capacity(text.len());
    for c in text.chars().filter(|c| !needs_byte_element(*c)) {
        if c == '-' && safe.ends_with('-') {
            safe.push(' ');
        }
        safe.push(c);
    }
    safe
}

fn needs_byte_element(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

fn indent<W: Write>(xml: &mut Writer<W>, depth: usize) -> Result<(), Error> {
    if depth > 0 {
        xml.write_event(Event::Text(BytesText::from_escaped(INDENT.repeat(depth))))?;
    }
    Ok(())
}

fn line_break<W: Write>(xml: &mut Writer<W>) -> Result<(), Error> {
    xml.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        <?xml version="1.0" encoding="utf-8"?>
        <!DOCTYPE TS>
        <TS version="2.1" language="de_DE" sourcelanguage="en">
        <context>
            <name>MainWindow</name>
            <message>
                <location filename="../src/mainwindow.cpp" line="42"/>
                <location filename="../src/mainwindow.cpp" line="+7"/>
                <source>Open file</source>
                <comment>menu entry</comment>
                <translation>Datei öffnen</translation>
            </message>
            <message numerus="yes">
                <source>%n file(s)</source>
                <translation type="unfinished">
                    <numerusform>%n Datei</numerusform>
                    <numerusform></numerusform>
                </translation>
            </message>
            <message id="quit.action">
                <source>Quit</source>
                <extracomment>Shown in the tray</extracomment>
                <translation type="vanished">Beenden</translation>
                <extra-po-flags>c-format</extra-po-flags>
            </message>
        </context>
        </TS>
    "#};

    /// A catalog with one context `A` holding the given `<message>` markup.
    fn single_message(message: &str) -> String {
        format!("<TS><context><name>A</name>{}</context></TS>", message)
    }

    #[test]
    fn test_parse_sample_catalog() {
        let catalog = Catalog::from_str(SAMPLE).unwrap();
        assert_eq!(catalog.version.as_deref(), Some("2.1"));
        assert_eq!(catalog.language.as_deref(), Some("de_DE"));
        assert_eq!(catalog.source_language.as_deref(), Some("en"));
        assert_eq!(catalog.contexts().len(), 1);

        let context = &catalog.contexts()[0];
        assert_eq!(context.name, "MainWindow");
        assert_eq!(context.messages.len(), 3);

        let open = &context.messages[0];
        assert_eq!(open.source, "Open file");
        assert_eq!(open.comment.as_deref(), Some("menu entry"));
        assert_eq!(open.translation, Translation::Singular("Datei öffnen".to_string()));
        assert_eq!(open.state, TranslationState::Finished);
        assert_eq!(open.locations.len(), 2);
        assert_eq!(open.locations[1].line.as_deref(), Some("+7"));

        let files = &context.messages[1];
        assert!(files.numerus);
        assert_eq!(files.state, TranslationState::Unfinished);
        assert_eq!(
            files.translation,
            Translation::Numerus(vec!["%n Datei".to_string(), String::new()])
        );

        let quit = &context.messages[2];
        assert_eq!(quit.id.as_deref(), Some("quit.action"));
        assert_eq!(quit.state, TranslationState::Vanished);
        assert_eq!(quit.extra_comment.as_deref(), Some("Shown in the tray"));
        assert_eq!(quit.extras.len(), 1);
        assert_eq!(quit.extras[0].name, "extra-po-flags");
    }

    #[test]
    fn test_roundtrip_sample_is_stable() {
        let catalog = Catalog::from_str(SAMPLE).unwrap();
        let written = catalog.to_bytes().unwrap();
        let reparsed = Catalog::from_bytes(&written).unwrap();
        assert_eq!(catalog, reparsed);
        assert_eq!(written, reparsed.to_bytes().unwrap());
    }

    #[test]
    fn test_writer_layout() {
        let mut catalog = Catalog::new(Some("en".to_string()), Some("fr".to_string()));
        catalog.contexts.push(
            Context::new("Main").with_message(
                Message::new("Hello")
                    .with_location("main.cpp", Some("12"))
                    .with_translation("Bonjour", TranslationState::Finished),
            ),
        );
        catalog
            .contexts
            .push(Context::new("Empty").with_message(Message::new("Todo")));

        let written = String::from_utf8(catalog.to_bytes().unwrap()).unwrap();
        let expected = indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <!DOCTYPE TS>
            <TS version="2.1" language="fr" sourcelanguage="en">
            <context>
                <name>Main</name>
                <message>
                    <location filename="main.cpp" line="12"/>
                    <source>Hello</source>
                    <translation>Bonjour</translation>
                </message>
            </context>
            <context>
                <name>Empty</name>
                <message>
                    <source>Todo</source>
                    <translation type="unfinished"></translation>
                </message>
            </context>
            </TS>
        "#};
        assert_eq!(written, expected);
    }

    #[test]
    fn test_writer_omits_absent_root_attributes() {
        let catalog = Catalog {
            version: Some("2.1".to_string()),
            ..Default::default()
        };
        let written = String::from_utf8(catalog.to_bytes().unwrap()).unwrap();
        assert!(written.contains("<TS version=\"2.1\">"));
    }

    #[test]
    fn test_missing_root_is_malformed() {
        let err = Catalog::from_str("<resources></resources>").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("<TS>"));
    }

    #[test]
    fn test_context_without_name_is_malformed() {
        let err =
            Catalog::from_str("<TS><context><message><source>x</source></message></context></TS>")
                .unwrap_err();
        assert!(err.to_string().contains("without <name>"));
    }

    #[test]
    fn test_message_without_source_is_malformed() {
        let err = Catalog::from_str(&single_message(
            "<message><translation>x</translation></message>",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("without <source>"));
    }

    #[test]
    fn test_wrongly_typed_attributes_are_malformed() {
        let bad_type = single_message(
            r#"<message><source>x</source><translation type="done"/></message>"#,
        );
        assert!(Catalog::from_str(&bad_type).unwrap_err().is_malformed());

        let bad_numerus =
            single_message(r#"<message numerus="maybe"><source>x</source></message>"#);
        assert!(Catalog::from_str(&bad_numerus).unwrap_err().is_malformed());

        let bad_line = single_message(concat!(
            r#"<message><location filename="a.cpp" line="ten"/>"#,
            "<source>x</source></message>",
        ));
        assert!(Catalog::from_str(&bad_line).unwrap_err().is_malformed());

        let bad_dependency = r#"<TS><dependencies><dependency/></dependencies></TS>"#;
        assert!(Catalog::from_str(bad_dependency).unwrap_err().is_malformed());
    }

    #[test]
    fn test_missing_translation_is_unfinished() {
        let catalog =
            Catalog::from_str(&single_message("<message><source>x</source></message>")).unwrap();
        let message = &catalog.contexts()[0].messages[0];
        assert_eq!(message.state, TranslationState::Unfinished);
        assert!(!message.has_translation());
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let catalog = Catalog::from_str(&single_message(
            "<message><source> padded </source><translation>  x\n</translation></message>",
        ))
        .unwrap();
        let message = &catalog.contexts()[0].messages[0];
        assert_eq!(message.source, " padded ");
        assert_eq!(message.translation, Translation::Singular("  x\n".to_string()));
    }

    #[test]
    fn test_byte_elements_roundtrip() {
        let catalog = Catalog::from_str(&single_message(concat!(
            r#"<message><source>Bell<byte value="x7"/>!</source>"#,
            r#"<translation>Glocke<byte value="7"/></translation></message>"#,
        )))
        .unwrap();
        let message = &catalog.contexts()[0].messages[0];
        assert_eq!(message.source, "Bell\u{7}!");
        assert_eq!(message.translation, Translation::Singular("Glocke\u{7}".to_string()));

        let written = String::from_utf8(catalog.to_bytes().unwrap()).unwrap();
        assert!(written.contains("<source>Bell<byte value=\"x7\"/>!</source>"));
        assert_eq!(Catalog::from_str(&written).unwrap(), catalog);
    }

    #[test]
    fn test_length_variants_roundtrip() {
        let catalog = Catalog::from_str(&single_message(concat!(
            r#"<message><source>Settings</source><translation variants="yes">"#,
            "<lengthvariant>Einstellungen</lengthvariant>",
            "<lengthvariant>Einst.</lengthvariant>",
            "</translation></message>",
        )))
        .unwrap();
        let message = &catalog.contexts()[0].messages[0];
        assert_eq!(
            message.translation,
            Translation::Singular("Einstellungen\u{9c}Einst.".to_string())
        );

        let written = String::from_utf8(catalog.to_bytes().unwrap()).unwrap();
        assert!(written.contains("<translation variants=\"yes\">"));
        assert!(written.contains("<lengthvariant>Einst.</lengthvariant>"));
        assert_eq!(Catalog::from_str(&written).unwrap(), catalog);
    }

    #[test]
    fn test_escaping_roundtrip() {
        let mut catalog = Catalog::new(None, Some("fr".to_string()));
        catalog.contexts.push(
            Context::new("A & B").with_message(
                Message::new("<b>Bold</b> & co")
                    .with_translation("<b>Gras</b> & cie", TranslationState::Finished),
            ),
        );
        let written = catalog.to_bytes().unwrap();
        assert_eq!(Catalog::from_bytes(&written).unwrap(), catalog);
    }

    #[test]
    fn test_dependencies_roundtrip() {
        let catalog = Catalog::from_str(indoc! {r#"
            <TS version="2.1" language="de">
            <dependencies>
                <dependency catalog="qtbase_de"/>
                <dependency catalog="qtmultimedia_de"/>
            </dependencies>
            <context>
                <name>Main</name>
            </context>
            </TS>
        "#})
        .unwrap();
        assert_eq!(catalog.dependencies, vec!["qtbase_de", "qtmultimedia_de"]);
        assert_eq!(catalog.contexts().len(), 1);

        let written = String::from_utf8(catalog.to_bytes().unwrap()).unwrap();
        let expected = indoc! {r#"
            <TS version="2.1" language="de">
            <dependencies>
                <dependency catalog="qtbase_de"/>
                <dependency catalog="qtmultimedia_de"/>
            </dependencies>
            <context>
        "#};
        assert!(written.contains(expected), "{}", written);
        assert_eq!(Catalog::from_str(&written).unwrap(), catalog);
    }

    #[test]
    fn test_empty_plural_stays_numerus() {
        let catalog = Catalog::from_str(&single_message(concat!(
            r#"<message numerus="yes"><source>%n file(s)</source>"#,
            r#"<translation type="unfinished"></translation></message>"#,
        )))
        .unwrap();
        let message = &catalog.contexts()[0].messages[0];
        assert_eq!(message.translation, Translation::Numerus(Vec::new()));

        let missing = Catalog::from_str(&single_message(
            r#"<message numerus="yes"><source>%n file(s)</source></message>"#,
        ))
        .unwrap();
        assert_eq!(missing, catalog);

        let mut built = Catalog::new(None, Some("de".to_string()));
        built.contexts.push(Context::new("A").with_message(
            Message::new("%n file(s)").with_numerus_forms(Vec::new(), TranslationState::Unfinished),
        ));
        let written = built.to_bytes().unwrap();
        assert_eq!(Catalog::from_bytes(&written).unwrap(), built);
    }

    #[test]
    fn test_alternatives_are_written_as_comments() {
        let mut message =
            Message::new("Hello").with_translation("Salut", TranslationState::Finished);
        message.alternatives = vec!["Bonjour".to_string(), "A -- B".to_string()];
        let mut catalog = Catalog::new(None, Some("fr".to_string()));
        catalog.contexts.push(Context::new("Main").with_message(message));

        let written = String::from_utf8(catalog.to_bytes().unwrap()).unwrap();
        let expected = concat!(
            "        <source>Hello</source>\n",
            "        <!-- alternative translation: Bonjour -->\n",
            "        <!-- alternative translation: A - - B -->\n",
            "        <translation>Salut</translation>\n",
        );
        assert!(written.contains(expected), "{}", written);

        let reparsed = Catalog::from_str(&written).unwrap();
        let alternatives = &reparsed.contexts()[0].messages[0].alternatives;
        assert_eq!(alternatives, &vec!["Bonjour".to_string(), "A - - B".to_string()]);
    }

    #[test]
    fn test_unrelated_comments_are_ignored() {
        let catalog = Catalog::from_str(&single_message(concat!(
            "<message><!-- reviewed --><source>x<!-- inline -->y</source>",
            "<translation>z</translation></message>",
        )))
        .unwrap();
        let message = &catalog.contexts()[0].messages[0];
        assert_eq!(message.source, "xy");
        assert!(message.alternatives.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = Catalog::from_bytes(b"<TS>\xff</TS>").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let with_bom = format!("\u{feff}{}", SAMPLE);
        let catalog = Catalog::from_str(&with_bom).unwrap();
        assert_eq!(catalog.contexts().len(), 1);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app-de.ts");
        std::fs::write(&path, SAMPLE).unwrap();
        let catalog = Catalog::read_from(&path).unwrap();
        assert_eq!(catalog.message_count(), 3);
    }
}
