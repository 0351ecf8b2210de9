use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use sougraph_core::{Symbol, bare_class_name, method_fq_name};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SouError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("invalid utf-8 in .sou input: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Streaming `.sou` reader yielding `Symbol` records in document order.
///
/// The underlying XML reader runs in lenient mode (end-name checking off) so
/// that exports with stray closing tags still stream; structural recovery
/// beyond that is not attempted.
///
/// A `<class>` element becomes the *pending* class until its fate is decided:
/// a `<comment>` whose `<class-id>` matches merges its body into the record,
/// and the record is emitted when a comment arrives, when the next class
/// supplants it, at a `<methods>` boundary, or at end of input.
pub struct SouReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_class: Option<Symbol>,
    ready: VecDeque<Symbol>,
    done: bool,
}

enum TopLevel {
    Class,
    Comment,
    Methods,
    Eof,
    Other,
}

impl SouReader<BufReader<File>> {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SouError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> SouReader<R> {
    pub fn from_reader(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.check_end_names(false);

        Self {
            reader,
            buf: Vec::new(),
            pending_class: None,
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Next symbol in document order, or `None` at end of input.
    pub fn next_symbol(&mut self) -> Result<Option<Symbol>, SouError> {
        loop {
            if let Some(symbol) = self.ready.pop_front() {
                return Ok(Some(symbol));
            }
            if self.done {
                return Ok(None);
            }

            self.buf.clear();
            let top = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref start) => match start.local_name().as_ref() {
                    b"class" => TopLevel::Class,
                    b"comment" => TopLevel::Comment,
                    b"methods" => TopLevel::Methods,
                    _ => TopLevel::Other,
                },
                Event::Eof => TopLevel::Eof,
                _ => TopLevel::Other,
            };

            match top {
                TopLevel::Class => self.read_class()?,
                TopLevel::Comment => self.read_comment()?,
                TopLevel::Methods => self.read_methods()?,
                TopLevel::Eof => {
                    self.done = true;
                    if let Some(pending) = self.pending_class.take() {
                        self.ready.push_back(pending);
                    }
                }
                TopLevel::Other => {}
            }
        }
    }

    /// Consumes a `<class>` element, capturing its bare name and exact inner
    /// XML, and installs it as the pending class. A previously pending class
    /// is flushed first, with an empty comment.
    fn read_class(&mut self) -> Result<(), SouError> {
        let mut depth = 1usize;
        let mut inner = String::new();
        let mut name_text = String::new();
        let mut in_name = false;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    if depth == 1 && start.local_name().as_ref() == b"name" {
                        in_name = true;
                    }
                    depth += 1;
                    push_start(&mut inner, &start)?;
                }
                Event::Empty(start) => push_empty(&mut inner, &start)?,
                Event::End(end) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    if in_name && end.local_name().as_ref() == b"name" {
                        in_name = false;
                    }
                    push_end(&mut inner, &end)?;
                }
                Event::Text(text) => {
                    if in_name {
                        name_text.push_str(&text.unescape()?);
                    }
                    push_text(&mut inner, &text)?;
                }
                Event::CData(cdata) => {
                    let raw = std::str::from_utf8(&cdata)?;
                    if in_name {
                        name_text.push_str(raw);
                    }
                    push_cdata(&mut inner, &cdata)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let bare = bare_class_name(name_text.trim()).to_owned();
        let class = Symbol::new_type(bare, inner.trim());
        if let Some(previous) = self.pending_class.replace(class) {
            self.ready.push_back(previous);
        }

        Ok(())
    }

    /// Consumes a `<comment>` element. When a class is pending, the comment
    /// body is merged if the comment's class id matches, and the pending
    /// class is emitted either way.
    fn read_comment(&mut self) -> Result<(), SouError> {
        let fields = self.read_child_texts()?;

        if let Some(mut pending) = self.pending_class.take() {
            let class_id = fields.class_id.trim();
            if !pending.name.is_empty() && bare_class_name(class_id).ends_with(&pending.name) {
                pending.comment = fields.body.trim().to_owned();
            }
            self.ready.push_back(pending);
        }

        Ok(())
    }

    /// Consumes a `<methods>` element and queues one `Method` symbol per
    /// `<body selector="...">` entry. A pending class is flushed first so
    /// emission order follows the document.
    fn read_methods(&mut self) -> Result<(), SouError> {
        let mut depth = 1usize;
        let mut class_id = String::new();
        let mut in_class_id = false;
        let mut current_body: Option<(String, String)> = None;
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    if depth == 1 {
                        match start.local_name().as_ref() {
                            b"class-id" => in_class_id = true,
                            b"body" => {
                                if let Some(selector) = selector_attribute(&start)? {
                                    current_body = Some((selector, String::new()));
                                }
                            }
                            _ => {}
                        }
                    }
                    depth += 1;
                }
                Event::Empty(start) => {
                    if depth == 1
                        && start.local_name().as_ref() == b"body"
                        && let Some(selector) = selector_attribute(&start)?
                    {
                        entries.push((selector, String::new()));
                    }
                }
                Event::End(end) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    if depth == 1 {
                        match end.local_name().as_ref() {
                            b"class-id" => in_class_id = false,
                            b"body" => {
                                if let Some(entry) = current_body.take() {
                                    entries.push(entry);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::Text(text) => {
                    if in_class_id {
                        class_id.push_str(&text.unescape()?);
                    } else if depth == 2
                        && let Some((_, body)) = current_body.as_mut()
                    {
                        body.push_str(&text.unescape()?);
                    }
                }
                Event::CData(cdata) => {
                    let raw = std::str::from_utf8(&cdata)?;
                    if in_class_id {
                        class_id.push_str(raw);
                    } else if depth == 2
                        && let Some((_, body)) = current_body.as_mut()
                    {
                        body.push_str(raw);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(pending) = self.pending_class.take() {
            self.ready.push_back(pending);
        }

        let class_name = bare_class_name(class_id.trim()).to_owned();
        for (selector, body) in entries {
            self.ready
                .push_back(Symbol::new_method(&class_name, &selector, body.trim()));
        }

        Ok(())
    }

    fn read_child_texts(&mut self) -> Result<ChildTexts, SouError> {
        let mut depth = 1usize;
        let mut fields = ChildTexts::default();
        let mut current: Option<Field> = None;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    if depth == 1 {
                        current = match start.local_name().as_ref() {
                            b"class-id" => Some(Field::ClassId),
                            b"body" => Some(Field::Body),
                            _ => None,
                        };
                    }
                    depth += 1;
                }
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    if depth == 1 {
                        current = None;
                    }
                }
                Event::Text(text) => {
                    let unescaped = text.unescape()?;
                    match current {
                        Some(Field::ClassId) => fields.class_id.push_str(&unescaped),
                        Some(Field::Body) => fields.body.push_str(&unescaped),
                        None => {}
                    }
                }
                Event::CData(cdata) => {
                    let raw = std::str::from_utf8(&cdata)?;
                    match current {
                        Some(Field::ClassId) => fields.class_id.push_str(raw),
                        Some(Field::Body) => fields.body.push_str(raw),
                        None => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(fields)
    }
}

impl<R: BufRead> Iterator for SouReader<R> {
    type Item = Result<Symbol, SouError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_symbol().transpose()
    }
}

#[derive(Default)]
struct ChildTexts {
    class_id: String,
    body: String,
}

enum Field {
    ClassId,
    Body,
}

/// Running totals for a parse pass, mirroring the ingest pipeline's summary
/// output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SouStats {
    pub types: u64,
    pub methods: u64,
    pub body_lines: u64,
}

impl SouStats {
    pub fn record(&mut self, symbol: &Symbol) {
        match symbol.kind {
            sougraph_core::SymbolKind::Type => self.types += 1,
            sougraph_core::SymbolKind::Method => self.methods += 1,
        }
        self.body_lines += symbol.body.lines().count() as u64;
    }

    pub fn total(&self) -> u64 {
        self.types + self.methods
    }

    pub fn mean_body_lines(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.body_lines as f64 / self.total() as f64
        }
    }
}

/// Collects the fully-qualified method name set of a `.sou` file.
///
/// Unlike `SouReader`, the class id is kept whole: metadata consumers want
/// `Namespace.Class.selector`, not the bare class name.
pub fn method_names(path: impl AsRef<Path>) -> Result<HashSet<String>, SouError> {
    let file = File::open(path)?;
    method_names_from_reader(BufReader::new(file))
}

pub fn method_names_from_reader<R: BufRead>(inner: R) -> Result<HashSet<String>, SouError> {
    let mut reader = Reader::from_reader(inner);
    reader.check_end_names(false);

    let mut names = HashSet::new();
    let mut buf = Vec::new();
    let mut depth_in_methods: Option<usize> = None;
    let mut in_class_id = false;
    let mut class_id = String::new();
    let mut selectors: Vec<String> = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => match depth_in_methods.as_mut() {
                None => {
                    if start.local_name().as_ref() == b"methods" {
                        depth_in_methods = Some(1);
                        in_class_id = false;
                        class_id.clear();
                        selectors.clear();
                    }
                }
                Some(depth) => {
                    if *depth == 1 {
                        match start.local_name().as_ref() {
                            b"class-id" => in_class_id = true,
                            b"body" => {
                                if let Some(selector) = selector_attribute(&start)? {
                                    selectors.push(selector);
                                }
                            }
                            _ => {}
                        }
                    }
                    *depth += 1;
                }
            },
            Event::Empty(start) => {
                if depth_in_methods == Some(1)
                    && start.local_name().as_ref() == b"body"
                    && let Some(selector) = selector_attribute(&start)?
                {
                    selectors.push(selector);
                }
            }
            Event::End(end) => {
                if let Some(depth) = depth_in_methods.as_mut() {
                    *depth -= 1;
                    if *depth == 1 && end.local_name().as_ref() == b"class-id" {
                        in_class_id = false;
                    }
                    if *depth == 0 {
                        let class_id = class_id.trim();
                        if !class_id.is_empty() {
                            for selector in selectors.drain(..) {
                                names.insert(method_fq_name(class_id, &selector));
                            }
                        }
                        depth_in_methods = None;
                    }
                }
            }
            Event::Text(text) => {
                if in_class_id {
                    class_id.push_str(&text.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(names)
}

fn selector_attribute(start: &BytesStart<'_>) -> Result<Option<String>, SouError> {
    let Some(attr) = start.try_get_attribute("selector")? else {
        return Ok(None);
    };
    Ok(Some(attr.unescape_value()?.into_owned()))
}

// Inner-XML reconstruction. The Bytes* events deref to the exact byte slice
// between the angle brackets, so the original markup (attribute order,
// escaping) is preserved verbatim.

fn push_start(out: &mut String, start: &BytesStart<'_>) -> Result<(), SouError> {
    out.push('<');
    out.push_str(std::str::from_utf8(start)?);
    out.push('>');
    Ok(())
}

fn push_empty(out: &mut String, start: &BytesStart<'_>) -> Result<(), SouError> {
    out.push('<');
    out.push_str(std::str::from_utf8(start)?);
    out.push_str("/>");
    Ok(())
}

fn push_end(out: &mut String, end: &BytesEnd<'_>) -> Result<(), SouError> {
    out.push_str("</");
    out.push_str(std::str::from_utf8(end)?);
    out.push('>');
    Ok(())
}

fn push_text(out: &mut String, text: &BytesText<'_>) -> Result<(), SouError> {
    out.push_str(std::str::from_utf8(text)?);
    Ok(())
}

fn push_cdata(out: &mut String, cdata: &BytesCData<'_>) -> Result<(), SouError> {
    out.push_str("<![CDATA[");
    out.push_str(std::str::from_utf8(cdata)?);
    out.push_str("]]>");
    Ok(())
}
