//! ELMAH error document decoding using quick-xml
//!
//! An error document looks like:
//!
//! ```xml
//! <error host="WEB01" type="System.Exception" message="Boom" source="App"
//!        detail="System.Exception: Boom&#xD;&#xA;   at ..." time="2011-03-01T10:00:00Z">
//!   <serverVariables>
//!     <item name="HTTP_HOST"><value string="example.com" /></item>
//!   </serverVariables>
//! </error>
//! ```
//!
//! Only `type` and `message` are required. Scalar fields may also appear as
//! child elements (`<type>T</type>`); collections are skipped.

use std::collections::BTreeMap;

use errlog_core::FetchError;
use quick_xml::Reader;
use quick_xml::events::Event;

const ROOT: &[u8] = b"error";
const KIND_FIELD: &str = "type";
const MESSAGE_FIELD: &str = "message";

/// Decoded error document: two required display fields plus everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDocument {
    kind: String,
    message: String,
    fields: BTreeMap<String, String>,
}

impl ErrorDocument {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Build from raw name/value pairs, taking out `type` and `message`.
    pub fn from_fields(mut fields: BTreeMap<String, String>) -> Result<Self, FetchError> {
        let kind = fields
            .remove(KIND_FIELD)
            .ok_or_else(|| missing_field(KIND_FIELD))?;
        let message = fields
            .remove(MESSAGE_FIELD)
            .ok_or_else(|| missing_field(MESSAGE_FIELD))?;
        Ok(Self {
            kind,
            message,
            fields,
        })
    }

    /// Exception type name
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Any other field (`host`, `source`, `time`, `statusCode`, `detail`, ...)
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

fn missing_field(name: &str) -> FetchError {
    FetchError::Decode(format!("error document has no '{name}'"))
}

/// Decoder capability for detail documents
pub trait ErrorDecoder {
    fn decode(&self, xml: &str) -> Result<ErrorDocument, FetchError>;
}

impl<T: ErrorDecoder + ?Sized> ErrorDecoder for &T {
    fn decode(&self, xml: &str) -> Result<ErrorDocument, FetchError> {
        (**self).decode(xml)
    }
}

/// Decoder for the ELMAH `<error>` XML layout
#[derive(Debug, Clone, Copy, Default)]
pub struct ElmahXmlDecoder;

impl ErrorDecoder for ElmahXmlDecoder {
    fn decode(&self, xml: &str) -> Result<ErrorDocument, FetchError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let (root, self_closing) = loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(e) => break (e, false),
                Event::Empty(e) => break (e, true),
                Event::Eof => return Err(FetchError::Decode("empty document".to_string())),
                _ => {}
            }
        };

        if root.name().as_ref() != ROOT {
            return Err(FetchError::Decode(format!(
                "expected <error> root, found <{}>",
                String::from_utf8_lossy(root.name().as_ref())
            )));
        }

        let mut fields = BTreeMap::new();
        for attr in root.attributes() {
            let attr = attr.map_err(|e| FetchError::Decode(format!("bad attribute: {e}")))?;
            let value = attr.unescape_value().map_err(malformed)?;
            fields.insert(
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            );
        }

        if !self_closing {
            read_child_fields(&mut reader, &mut fields)?;
        }

        ErrorDocument::from_fields(fields)
    }
}

/// Collect `<name>text</name>` children of the root; attributes win on clashes.
fn read_child_fields(
    reader: &mut Reader<&[u8]>,
    fields: &mut BTreeMap<String, String>,
) -> Result<(), FetchError> {
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                let key = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(text) = read_scalar(reader)? {
                    fields.entry(key).or_insert(text);
                }
            }
            Event::Empty(e) => {
                let key = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                fields.entry(key).or_default();
            }
            Event::End(e) if e.name().as_ref() == ROOT => return Ok(()),
            Event::Eof => return Err(truncated()),
            _ => {}
        }
    }
}

/// Read up to the end of the current element.
///
/// Returns its text and CDATA content, or `None` when it holds child
/// elements (a collection such as `serverVariables`).
fn read_scalar(reader: &mut Reader<&[u8]>) -> Result<Option<String>, FetchError> {
    let mut text = String::new();
    let mut scalar = true;
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Text(t) if depth == 0 => text.push_str(&t.unescape().map_err(malformed)?),
            Event::CData(c) if depth == 0 => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(_) => {
                scalar = false;
                depth += 1;
            }
            Event::Empty(_) => scalar = false,
            Event::End(_) if depth == 0 => return Ok(scalar.then_some(text)),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(truncated()),
            _ => {}
        }
    }
}

fn truncated() -> FetchError {
    FetchError::Decode("unexpected end of document inside <error>".to_string())
}

fn malformed(e: quick_xml::Error) -> FetchError {
    FetchError::Decode(format!("malformed XML: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELMAH_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<error errorId="7e3c" application="/LM/W3SVC/1/ROOT" host="WEB01"
       type="System.InvalidOperationException" message="Sequence contains no elements"
       source="System.Core" detail="System.InvalidOperationException: boom&#xD;&#xA;   at Foo()"
       time="2011-03-01T10:00:00.0000000Z" statusCode="500">
  <serverVariables>
    <item name="HTTP_HOST"><value string="example.com" /></item>
  </serverVariables>
  <queryString />
</error>"#;

    #[test]
    fn decode_attribute_layout() {
        let doc = ElmahXmlDecoder.decode(ELMAH_XML).unwrap();
        assert_eq!(doc.kind(), "System.InvalidOperationException");
        assert_eq!(doc.message(), "Sequence contains no elements");
        assert_eq!(doc.field("host"), Some("WEB01"));
        assert_eq!(doc.field("statusCode"), Some("500"));
        assert_eq!(
            doc.field("detail"),
            Some("System.InvalidOperationException: boom\r\n   at Foo()")
        );
    }

    #[test]
    fn decode_skips_collections() {
        let doc = ElmahXmlDecoder.decode(ELMAH_XML).unwrap();
        assert!(doc.field("serverVariables").is_none());
        assert!(doc.field("item").is_none());
        // Empty element reads as empty text
        assert_eq!(doc.field("queryString"), Some(""));
        assert!(doc.field("type").is_none());
    }

    #[test]
    fn decode_element_layout() {
        let doc = ElmahXmlDecoder
            .decode("<error><type>T</type><message>M &amp; more</message></error>")
            .unwrap();
        assert_eq!(doc.kind(), "T");
        assert_eq!(doc.message(), "M & more");
    }

    #[test]
    fn empty_message_element() {
        let doc = ElmahXmlDecoder
            .decode("<error><type>T</type><message/></error>")
            .unwrap();
        assert_eq!(doc.kind(), "T");
        assert_eq!(doc.message(), "");
    }

    #[test]
    fn cdata_message_element() {
        let doc = ElmahXmlDecoder
            .decode("<error><type>T</type><message><![CDATA[a < b]]></message></error>")
            .unwrap();
        assert_eq!(doc.message(), "a < b");
    }

    #[test]
    fn nested_child_is_collection() {
        let doc = ElmahXmlDecoder
            .decode(
                "<error><type>T</type><message>M</message>\
                 <form>x<item name=\"a\"><value string=\"1\" /></item></form></error>",
            )
            .unwrap();
        assert!(doc.field("form").is_none());
        assert!(doc.field("item").is_none());
    }

    #[test]
    fn attributes_take_precedence() {
        let doc = ElmahXmlDecoder
            .decode(r#"<error type="A" message="m"><type>B</type></error>"#)
            .unwrap();
        assert_eq!(doc.kind(), "A");
    }

    #[test]
    fn self_closing_root() {
        let doc = ElmahXmlDecoder
            .decode(r#"<error type="T" message="" />"#)
            .unwrap();
        assert_eq!(doc.kind(), "T");
        assert_eq!(doc.message(), "");
    }

    #[test]
    fn missing_message_is_decode_error() {
        let err = ElmahXmlDecoder
            .decode(r#"<error type="T" />"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(m) if m.contains("message")));
    }

    #[test]
    fn wrong_root_is_decode_error() {
        let err = ElmahXmlDecoder
            .decode("<html><body>login</body></html>")
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(m) if m.contains("<html>")));
    }

    #[test]
    fn empty_document_is_decode_error() {
        assert!(matches!(
            ElmahXmlDecoder.decode("").unwrap_err(),
            FetchError::Decode(_)
        ));
    }

    #[test]
    fn truncated_document_is_decode_error() {
        assert!(matches!(
            ElmahXmlDecoder
                .decode(r#"<error type="T" message="M"><serverVariables>"#)
                .unwrap_err(),
            FetchError::Decode(_)
        ));
    }

    #[test]
    fn from_fields_keeps_remainder() {
        let fields = BTreeMap::from([
            ("type".to_string(), "T".to_string()),
            ("message".to_string(), "M".to_string()),
            ("user".to_string(), "alice".to_string()),
        ]);
        let doc = ErrorDocument::from_fields(fields).unwrap();
        assert_eq!(doc.fields().len(), 1);
        assert_eq!(doc.field("user"), Some("alice"));
    }
}
