//! Structured text format: elements with attributes, one per line.
//!
//! Properties save themselves as elements like `<Integer value="42"/>`.
//! Bulk data is not written inline: the property hands its side-file bytes
//! to the [`Writer`], which assigns a unique file name for the element to
//! reference. On restore the [`XmlReader`] records those references so the
//! caller can feed the side-files back once the text has been read.

use std::borrow::Cow;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::ReadError;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for saving properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write bulk lists inline instead of to side-files.
    pub force_xml: bool,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            force_xml: false,
            indent: 4,
        }
    }
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force_xml(mut self, force_xml: bool) -> Self {
        self.force_xml = force_xml;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// A side-file produced while saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Writer for the structured text format.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: String,
    depth: usize,
    options: SaveOptions,
    files: Vec<SideFile>,
    file_names: FxHashSet<String>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SaveOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    /// Returns true if bulk lists must be written inline.
    pub fn is_force_xml(&self) -> bool {
        self.options.force_xml
    }

    /// Returns the text written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Returns the side-files registered so far.
    pub fn files(&self) -> &[SideFile] {
        &self.files
    }

    /// Consumes the writer, returning the text and the side-files.
    pub fn into_parts(self) -> (String, Vec<SideFile>) {
        (self.buf, self.files)
    }

    fn indent(&mut self) {
        let width = self.depth * self.options.indent;
        self.buf.extend(std::iter::repeat_n(' ', width));
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        for (key, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(key);
            self.buf.push_str("=\"");
            self.buf.push_str(&encode_attribute(value));
            self.buf.push('"');
        }
    }

    /// Writes `<name a="..."/>`.
    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.open_tag(name, attrs);
        self.buf.push_str("/>\n");
    }

    /// Writes `<name a="...">` and nests following elements.
    pub fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.open_tag(name, attrs);
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    /// Closes an element opened with [`start_element`](Self::start_element).
    pub fn end_element(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    /// Registers side-file bytes and returns the unique name to reference.
    ///
    /// `base` is a name like `FloatList.bin`; on collision a counter is
    /// inserted before the extension.
    pub fn add_file(&mut self, base: &str, data: Vec<u8>) -> String {
        let name = self.unique_file_name(base);
        debug!(file = %name, bytes = data.len(), "registered side-file");
        self.file_names.insert(name.clone());
        self.files.push(SideFile {
            name: name.clone(),
            data,
        });
        name
    }

    fn unique_file_name(&self, base: &str) -> String {
        if !self.file_names.contains(base) {
            return base.to_string();
        }
        let (stem, ext) = match base.rfind('.') {
            Some(dot) => base.split_at(dot),
            None => (base, ""),
        };
        (1..)
            .map(|n| format!("{stem}{n}{ext}"))
            .find(|candidate| !self.file_names.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Escapes a string for use inside a double-quoted attribute.
pub fn encode_attribute(value: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>' | '"' | '\'' | '\n' | '\r' | '\t');
    if !value.contains(needs_escape) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Resolves character and entity references in an attribute value.
pub fn decode_entities(raw: &str) -> Result<Cow<'_, str>, ReadError> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';').ok_or_else(|| ReadError::UnknownEntity {
            entity: after.chars().take(8).collect(),
        })?;
        let entity = &after[..semi];
        let c = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(u32::from_str))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        match c {
            Some(c) => out.push(c),
            None => {
                return Err(ReadError::UnknownEntity {
                    entity: entity.to_string(),
                });
            }
        }
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}

// =============================================================================
// DECODING
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    empty: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Start(StartTag),
    End(String),
}

/// A side-file reference seen while restoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// File name in the archive.
    pub file: String,
    /// Name of the property that asked for it.
    pub property: String,
}

/// Reader for the structured text format.
///
/// The document is tokenized up front. Reads are strict: `read_element`
/// expects the very next start tag to carry the given name, so restoring a
/// property against the wrong element fails instead of wandering.
#[derive(Debug, Clone)]
pub struct XmlReader {
    tokens: Vec<Token>,
    pos: usize,
    current: Option<StartTag>,
    // Set while the last element read was self-closing and nothing else has
    // been read since; its end element is implicit.
    open_empty: bool,
    files: Vec<PendingFile>,
}

impl XmlReader {
    /// Tokenizes `text`.
    pub fn new(text: &str) -> Result<Self, ReadError> {
        Ok(Self {
            tokens: tokenize(text)?,
            pos: 0,
            current: None,
            open_empty: false,
            files: Vec::new(),
        })
    }

    /// Returns the name of the next start element without consuming it.
    pub fn peek_element(&self) -> Option<&str> {
        match self.tokens.get(self.pos) {
            Some(Token::Start(tag)) => Some(&tag.name),
            _ => None,
        }
    }

    /// Returns true if the whole document has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Reads the next start element, which must be named `name`.
    pub fn read_element(&mut self, name: &str) -> Result<(), ReadError> {
        match self.tokens.get(self.pos) {
            Some(Token::Start(tag)) if tag.name == name => {
                self.open_empty = tag.empty;
                self.current = Some(tag.clone());
                self.pos += 1;
                Ok(())
            }
            Some(Token::Start(tag)) => Err(ReadError::UnexpectedElement {
                expected: name.to_string(),
                found: tag.name.clone(),
            }),
            Some(Token::End(found)) => Err(ReadError::UnexpectedElement {
                expected: name.to_string(),
                found: format!("/{found}"),
            }),
            None => Err(ReadError::UnexpectedEof {
                expected: format!("<{name}>"),
            }),
        }
    }

    /// Reads up to and including the end of element `name`, skipping any
    /// nested content not consumed yet.
    pub fn read_end_element(&mut self, name: &str) -> Result<(), ReadError> {
        if self.open_empty {
            if let Some(current) = &self.current {
                if current.name == name {
                    self.open_empty = false;
                    return Ok(());
                }
            }
        }
        self.open_empty = false;

        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            match token {
                Token::Start(tag) if !tag.empty => depth += 1,
                Token::Start(_) => {}
                Token::End(found) if depth == 0 => {
                    if found == name {
                        return Ok(());
                    }
                    return Err(ReadError::UnexpectedEndElement {
                        expected: name.to_string(),
                        found: found.clone(),
                    });
                }
                Token::End(_) => depth -= 1,
            }
        }
        Err(ReadError::UnexpectedEof {
            expected: format!("</{name}>"),
        })
    }

    /// Returns true if the element read last was self-closing.
    pub fn is_empty_element(&self) -> bool {
        self.open_empty
    }

    fn current(&self) -> Result<&StartTag, ReadError> {
        self.current.as_ref().ok_or(ReadError::NoCurrentElement)
    }

    /// Name of the element read last.
    pub fn element_name(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.name.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| t.attrs.iter().any(|(k, _)| k == name))
    }

    /// Returns an attribute of the current element.
    pub fn attribute(&self, name: &str) -> Result<&str, ReadError> {
        let tag = self.current()?;
        tag.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| ReadError::MissingAttribute {
                element: tag.name.clone(),
                name: name.to_string(),
            })
    }

    /// Returns an attribute, or `None` when absent.
    pub fn attribute_opt(&self, name: &str) -> Option<&str> {
        self.attribute(name).ok()
    }

    /// Parses an attribute of the current element.
    pub fn parse_attribute<T: FromStr>(
        &self,
        name: &str,
        expected: &'static str,
    ) -> Result<T, ReadError> {
        let value = self.attribute(name)?;
        value.trim().parse().map_err(|_| ReadError::InvalidAttribute {
            element: self.element_name().unwrap_or_default().to_string(),
            name: name.to_string(),
            expected,
            value: value.to_string(),
        })
    }

    pub fn attribute_i64(&self, name: &str) -> Result<i64, ReadError> {
        self.parse_attribute(name, "integer")
    }

    pub fn attribute_u32(&self, name: &str) -> Result<u32, ReadError> {
        self.parse_attribute(name, "unsigned integer")
    }

    pub fn attribute_f64(&self, name: &str) -> Result<f64, ReadError> {
        self.parse_attribute(name, "float")
    }

    pub fn attribute_f32(&self, name: &str) -> Result<f32, ReadError> {
        self.parse_attribute(name, "float")
    }

    /// Parses a `count` style attribute.
    pub fn attribute_count(&self, name: &str) -> Result<usize, ReadError> {
        self.parse_attribute(name, "count")
    }

    /// Records a side-file to be restored into `property` once the text is
    /// read.
    pub fn add_file(&mut self, file: &str, property: &str) {
        debug!(file, property, "side-file pending");
        self.files.push(PendingFile {
            file: file.to_string(),
            property: property.to_string(),
        });
    }

    pub fn pending_files(&self) -> &[PendingFile] {
        &self.files
    }

    pub fn take_pending_files(&mut self) -> Vec<PendingFile> {
        std::mem::take(&mut self.files)
    }
}

// -----------------------------------------------------------------------------
// Tokenizer
// -----------------------------------------------------------------------------

fn malformed(position: usize, context: &'static str) -> ReadError {
    ReadError::Malformed { position, context }
}

/// Returns the byte offset just past `terminator`, searching from `from`.
fn skip_past(
    text: &str,
    from: usize,
    terminator: &str,
    context: &'static str,
) -> Result<usize, ReadError> {
    text[from..]
        .find(terminator)
        .map(|i| from + i + terminator.len())
        .ok_or_else(|| malformed(from, context))
}

fn is_name_end(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '>' | '=')
}

fn tokenize(text: &str) -> Result<Vec<Token>, ReadError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        let rest = &text[start..];

        pos = if rest.starts_with("<?") {
            skip_past(text, start, "?>", "unterminated processing instruction")?
        } else if rest.starts_with("<!--") {
            skip_past(text, start, "-->", "unterminated comment")?
        } else if rest.starts_with("<![CDATA[") {
            skip_past(text, start, "]]>", "unterminated CDATA section")?
        } else if rest.starts_with("<!") {
            skip_past(text, start, ">", "unterminated declaration")?
        } else if let Some(body) = rest.strip_prefix("</") {
            let close = body
                .find('>')
                .ok_or_else(|| malformed(start, "unterminated end tag"))?;
            let name = body[..close].trim();
            if name.is_empty() {
                return Err(malformed(start, "empty end tag"));
            }
            tokens.push(Token::End(name.to_string()));
            start + 2 + close + 1
        } else {
            let (tag, end) = parse_start_tag(text, start)?;
            tokens.push(Token::Start(tag));
            end
        };
    }

    Ok(tokens)
}

fn parse_start_tag(text: &str, start: usize) -> Result<(StartTag, usize), ReadError> {
    let mut pos = start + 1;

    let name_len = text[pos..].find(is_name_end).unwrap_or(text.len() - pos);
    if name_len == 0 {
        return Err(malformed(pos, "missing element name"));
    }
    let name = text[pos..pos + name_len].to_string();
    pos += name_len;

    let mut attrs = Vec::new();
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.starts_with("/>") {
            return Ok((StartTag { name, attrs, empty: true }, pos + 2));
        }
        if trimmed.starts_with('>') {
            return Ok((StartTag { name, attrs, empty: false }, pos + 1));
        }
        if trimmed.is_empty() {
            return Err(malformed(start, "unterminated start tag"));
        }

        let key_len = trimmed.find(is_name_end).unwrap_or(trimmed.len());
        if key_len == 0 {
            return Err(malformed(pos, "missing attribute name"));
        }
        let key = trimmed[..key_len].to_string();
        pos += key_len;

        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        let Some(after_eq) = trimmed.strip_prefix('=') else {
            return Err(malformed(pos, "expected '=' after attribute name"));
        };
        pos += 1;

        let trimmed = after_eq.trim_start();
        pos += after_eq.len() - trimmed.len();
        let quote = match trimmed.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(malformed(pos, "expected quoted attribute value")),
        };
        let body = &trimmed[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| malformed(pos, "unterminated attribute value"))?;
        let value = decode_entities(&body[..close])?.into_owned();
        pos += 1 + close + 1;

        attrs.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_writer_layout() {
        let mut w = Writer::new();
        w.start_element("IntegerList", &[("count", "2")]);
        w.empty_element("I", &[("v", "1")]);
        w.empty_element("I", &[("v", "-2")]);
        w.end_element("IntegerList");
        assert_eq!(
            w.as_str(),
            "<IntegerList count=\"2\">\n    <I v=\"1\"/>\n    <I v=\"-2\"/>\n</IntegerList>\n"
        );
    }

    #[test]
    fn test_encode_attribute() {
        assert_eq!(encode_attribute("plain"), "plain");
        assert!(matches!(encode_attribute("plain"), Cow::Borrowed(_)));
        assert_eq!(
            encode_attribute("a<b>&\"c\"'\n\t"),
            "a&lt;b&gt;&amp;&quot;c&quot;&apos;&#10;&#9;"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("x &amp; y &#65;&#x42;").unwrap(), "x & y AB");
        assert!(matches!(
            decode_entities("&bogus;"),
            Err(ReadError::UnknownEntity { .. })
        ));
        assert!(matches!(
            decode_entities("a & b"),
            Err(ReadError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_unique_file_names() {
        let mut w = Writer::new();
        assert_eq!(w.add_file("FloatList.bin", vec![1]), "FloatList.bin");
        assert_eq!(w.add_file("FloatList.bin", vec![2]), "FloatList1.bin");
        assert_eq!(w.add_file("FloatList.bin", vec![3]), "FloatList2.bin");
        assert_eq!(w.add_file("Data", vec![]), "Data");
        assert_eq!(w.add_file("Data", vec![]), "Data1");
        assert_eq!(w.files().len(), 5);
    }

    #[test]
    fn test_reader_elements_and_attributes() {
        let text = r#"<?xml version="1.0"?>
            <!-- comment -->
            <Map count="1">
                <Item key="a &amp; b" value='x"y'/>
            </Map>"#;
        let mut r = XmlReader::new(text).unwrap();
        r.read_element("Map").unwrap();
        assert_eq!(r.attribute_count("count").unwrap(), 1);
        r.read_element("Item").unwrap();
        assert_eq!(r.attribute("key").unwrap(), "a & b");
        assert_eq!(r.attribute("value").unwrap(), "x\"y");
        assert!(!r.has_attribute("missing"));
        r.read_end_element("Map").unwrap();
        assert!(r.is_at_end());
    }

    #[test]
    fn test_read_element_is_strict() {
        let mut r = XmlReader::new("<Float value=\"1\"/>").unwrap();
        let err = r.read_element("Integer").unwrap_err();
        assert_eq!(
            err,
            ReadError::UnexpectedElement {
                expected: "Integer".into(),
                found: "Float".into()
            }
        );
    }

    #[test]
    fn test_read_end_element_skips_nested_content() {
        let text = "<Outer><Unknown a=\"1\"><Deep/></Unknown><Other/></Outer><Next/>";
        let mut r = XmlReader::new(text).unwrap();
        r.read_element("Outer").unwrap();
        r.read_end_element("Outer").unwrap();
        r.read_element("Next").unwrap();
    }

    #[test]
    fn test_read_end_element_of_empty_element() {
        let mut r = XmlReader::new("<List count=\"0\"/><Next/>").unwrap();
        r.read_element("List").unwrap();
        r.read_end_element("List").unwrap();
        r.read_element("Next").unwrap();
    }

    #[test]
    fn test_missing_and_invalid_attributes() {
        let mut r = XmlReader::new("<Integer value=\"abc\"/>").unwrap();
        r.read_element("Integer").unwrap();
        assert!(matches!(
            r.attribute_i64("value"),
            Err(ReadError::InvalidAttribute { expected: "integer", .. })
        ));
        assert!(matches!(
            r.attribute("other"),
            Err(ReadError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_malformed_markup() {
        assert!(matches!(
            XmlReader::new("<Integer value=\"1\""),
            Err(ReadError::Malformed { .. })
        ));
        assert!(matches!(
            XmlReader::new("<Integer value=1/>"),
            Err(ReadError::Malformed { .. })
        ));
        assert!(matches!(
            XmlReader::new("<!-- open"),
            Err(ReadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unexpected_eof() {
        let mut r = XmlReader::new("<A>").unwrap();
        r.read_element("A").unwrap();
        assert!(matches!(
            r.read_end_element("A"),
            Err(ReadError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            r.read_element("B"),
            Err(ReadError::UnexpectedEof { .. })
        ));
    }

    proptest! {
        #[test]
        fn attribute_roundtrip(value in "\\PC*|[<>&\"'\n\r\t ]{0,16}") {
            let mut w = Writer::new();
            w.empty_element("String", &[("value", &value)]);
            let mut r = XmlReader::new(w.as_str()).unwrap();
            r.read_element("String").unwrap();
            prop_assert_eq!(r.attribute("value").unwrap(), value.as_str());
        }
    }
}
