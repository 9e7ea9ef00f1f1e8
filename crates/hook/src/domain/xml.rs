//! Order-preserving XML tree
//!
//! A minimal DOM over quick-xml events. Everything the reader reports is
//! kept (attribute order, whitespace, comments, CDATA, processing
//! instructions) so that decoding and re-encoding a document without changes
//! yields an equivalent document.
//!
//! Text is stored in its escaped form and written back verbatim; attribute
//! values are stored unescaped and escaped again on output, with tabs and
//! line breaks as character references.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use std::borrow::Cow;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("syntax error near byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),

    #[error("failed to write XML: {0}")]
    Write(String),
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data in escaped form
    Text(String),
    CData(String),
    Comment(String),
    /// Content between `<?` and `?>`, without the XML declaration
    ProcessingInstruction(String),
    /// Content between `<?` and `?>` of the XML declaration
    Declaration(String),
    DocType(String),
}

impl Node {
    fn as_element_named(&self, name: &str) -> Option<&Element> {
        match self {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        }
    }

    fn as_element_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        match self {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name, prefix included (e.g. `qemu:commandline`)
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|n| n.as_element_named(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .find_map(|n| n.as_element_named_mut(name))
    }

    /// All child elements with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter_map(move |n| n.as_element_named(name))
    }

    /// Concatenated direct text content (still escaped)
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A parsed document: the root element plus whatever surrounds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn parse(input: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(input);
        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| XmlError::Syntax {
                position,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => builder.open(element_from_start(&start, position)?),
                Event::Empty(start) => {
                    builder.push(Node::Element(element_from_start(&start, position)?))?
                }
                Event::End(_) => builder.close()?,
                Event::Text(text) => builder.push(Node::Text(utf8(&text, position)?))?,
                Event::CData(cdata) => builder.push(Node::CData(utf8(&cdata, position)?))?,
                Event::Comment(comment) => builder.push(Node::Comment(utf8(&comment, position)?))?,
                Event::Decl(decl) => builder.push(Node::Declaration(utf8(&decl, position)?))?,
                Event::PI(pi) => builder.push(Node::ProcessingInstruction(utf8(&pi, position)?))?,
                Event::DocType(doctype) => builder.push(Node::DocType(utf8(&doctype, position)?))?,
                Event::Eof => break,
            }
        }

        builder.finish()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        Ok(writer.into_inner())
    }
}

#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    fn close(&mut self) -> Result<(), XmlError> {
        // The reader already rejects unbalanced end tags.
        match self.open.pop() {
            Some(element) => self.push(Node::Element(element)),
            None => Err(XmlError::Syntax {
                position: 0,
                message: "unexpected end tag".to_string(),
            }),
        }
    }

    fn push(&mut self, node: Node) -> Result<(), XmlError> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        match node {
            Node::Element(element) if self.root.is_none() => self.root = Some(element),
            Node::Element(element) => return Err(XmlError::MultipleRoots(element.name)),
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Document, XmlError> {
        if let Some(unclosed) = self.open.pop() {
            return Err(XmlError::Unclosed(unclosed.name));
        }

        Ok(Document {
            prolog: self.prolog,
            root: self.root.ok_or(XmlError::MissingRoot)?,
            epilog: self.epilog,
        })
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::Syntax {
            position,
            message: e.to_string(),
        })
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, XmlError> {
    let mut element = Element::new(utf8(start.name().as_ref(), position)?);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Syntax {
            position,
            message: e.to_string(),
        })?;
        let key = utf8(attribute.key.as_ref(), position)?;
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Syntax {
                position,
                message: e.to_string(),
            })?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }

    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Markup characters plus the whitespace a reader would otherwise normalize
/// to a space (`\n`, `\r`, `\t`) are written as references.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => write_event(writer, Event::Text(BytesText::from_escaped(text.as_str()))),
        Node::CData(data) => write_event(writer, Event::CData(BytesCData::new(data.as_str()))),
        Node::Comment(comment) => write_event(
            writer,
            Event::Comment(BytesText::from_escaped(comment.as_str())),
        ),
        Node::Declaration(content) | Node::ProcessingInstruction(content) => {
            write_raw(writer, &format!("<?{}?>", content))
        }
        Node::DocType(content) => write_raw(writer, &format!("<!DOCTYPE {}>", content)),
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn write_raw(writer: &mut Writer<Vec<u8>>, raw: &str) -> Result<(), XmlError> {
    writer
        .get_mut()
        .write_all(raw.as_bytes())
        .map_err(|e| XmlError::Write(e.to_string()))
}
