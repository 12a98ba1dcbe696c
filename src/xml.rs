//! MSBuild-flavoured XML serialization.
//!
//! Every document goes out as UTF-8 with a byte-order mark, an
//! `<?xml version="1.0" encoding="utf-8"?>` declaration, two-space indentation
//! and CRLF line endings, wrapped in a `<Project ToolsVersion="4.0">` root in
//! the MSBuild namespace.

use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::GenError;

pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
pub const TOOLS_VERSION: &str = "4.0";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// CrlfWriter
// ---------------------------------------------------------------------------

/// Rewrites every bare `\n` passing through it as `\r\n`.
///
/// quick-xml only knows `\n` for indentation. Sitting under the XML writer,
/// this also normalizes newlines that end up inside text content. An existing
/// `\r\n` is passed through unchanged.
pub struct CrlfWriter<W> {
    inner: W,
    last: Option<u8>,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, last: None }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, &b) in buf.iter().enumerate() {
            if b == b'\n' {
                let prev = if i == 0 { self.last } else { Some(buf[i - 1]) };
                if prev != Some(b'\r') {
                    self.inner.write_all(&buf[start..i])?;
                    self.inner.write_all(b"\r")?;
                    start = i;
                }
            }
        }
        self.inner.write_all(&buf[start..])?;
        if let Some(&b) = buf.last() {
            self.last = Some(b);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Document writer
// ---------------------------------------------------------------------------

/// Thin wrapper over an indenting [`quick_xml::Writer`] that maps every write
/// failure into [`GenError::Xml`].
pub struct DocumentWriter {
    writer: Writer<CrlfWriter<Vec<u8>>>,
}

impl DocumentWriter {
    /// Start a document: BOM, declaration and the opening `<Project>` tag.
    pub fn begin() -> Result<Self, GenError> {
        let mut sink = CrlfWriter::new(Vec::new());
        sink.write_all(UTF8_BOM).map_err(GenError::xml)?;

        let mut doc = Self {
            writer: Writer::new_with_indent(sink, b' ', 2),
        };
        doc.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        doc.event(Event::Start(
            BytesStart::new("Project")
                .with_attributes([("ToolsVersion", TOOLS_VERSION), ("xmlns", MSBUILD_NAMESPACE)]),
        ))?;
        Ok(doc)
    }

    /// Close `<Project>` and hand back the encoded bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, GenError> {
        self.end("Project")?;
        Ok(self.writer.into_inner().into_inner())
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), GenError> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(start))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), GenError> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(elem))
    }

    pub fn end(&mut self, name: &str) -> Result<(), GenError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>` on a single line.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), GenError> {
        self.start(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), GenError> {
        self.writer.write_event(event).map_err(GenError::xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crlf(chunks: &[&[u8]]) -> Vec<u8> {
        let mut w = CrlfWriter::new(Vec::new());
        for chunk in chunks {
            w.write_all(chunk).unwrap();
        }
        w.into_inner()
    }

    #[test]
    fn bare_newlines_become_crlf() {
        assert_eq!(crlf(&[b"a\nb\n"]), b"a\r\nb\r\n");
    }

    #[test]
    fn existing_crlf_is_kept() {
        assert_eq!(crlf(&[b"a\r\nb"]), b"a\r\nb");
    }

    #[test]
    fn crlf_split_across_writes_is_kept() {
        assert_eq!(crlf(&[b"a\r", b"\nb"]), b"a\r\nb");
        assert_eq!(crlf(&[b"a", b"\nb"]), b"a\r\nb");
    }

    #[test]
    fn document_has_bom_declaration_and_root() {
        let bytes = DocumentWriter::begin().unwrap().finish().unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n"));
        assert!(text.contains(
            "<Project ToolsVersion=\"4.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">"
        ));
        assert!(text.trim_end().ends_with("</Project>"));
    }

    #[test]
    fn children_are_indented_two_spaces() {
        let mut doc = DocumentWriter::begin().unwrap();
        doc.start("ItemGroup", &[]).unwrap();
        doc.empty("None", &[("Include", "a.txt")]).unwrap();
        doc.end("ItemGroup").unwrap();
        let text = String::from_utf8(doc.finish().unwrap()).unwrap();

        assert!(text.contains("\r\n  <ItemGroup>\r\n    <None Include=\"a.txt\""));
        assert!(text.contains("\r\n  </ItemGroup>\r\n</Project>"));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut doc = DocumentWriter::begin().unwrap();
        doc.empty("None", &[("Include", "a&b<c>.txt")]).unwrap();
        let text = String::from_utf8(doc.finish().unwrap()).unwrap();

        assert!(text.contains("Include=\"a&amp;b&lt;c&gt;.txt\""));
    }
}
