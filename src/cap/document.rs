use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use thiserror::Error;

/// Namespace prefix shared by every CAP revision (1.0, 1.1, 1.2).
pub const CAP_NAMESPACE_PREFIX: &str = "urn:oasis:names:tc:emergency:cap:";

/// Maximum element nesting accepted in a CAP document.
/// Real alerts are at most five or six levels deep.
const MAX_DOCUMENT_DEPTH: usize = 64;

/// Errors that make a CAP document unreadable as a whole.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Nesting depth exceeds the safety limit.
    #[error("document nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// The input contained no element at all.
    #[error("document has no root element")]
    NoRoot,
}

/// One element of a parsed CAP document.
///
/// Only what the alert extraction needs is kept: the local name, whether the
/// element lives in the CAP namespace, its concatenated text, and its children.
/// Attributes are not used by CAP and are dropped.
#[derive(Debug, Clone, Default)]
pub struct Element {
    name: String,
    in_cap_namespace: bool,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Parses a complete document and returns its root element.
    ///
    /// # Security
    ///
    /// quick-xml (0.37) never expands `<!ENTITY>` declarations; custom entities
    /// surface as an unescape error, which fails the document.
    ///
    /// Text is decoded with the encoding named in the XML declaration, or a
    /// byte order mark, defaulting to UTF-8.
    pub fn parse(bytes: &[u8]) -> Result<Element, DocumentError> {
        let mut reader = NsReader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            // Follows the encoding from the XML declaration once it has been read
            let decoder = reader.decoder();
            match reader.read_resolved_event_into(&mut buf) {
                Ok((ns, Event::Start(e))) => {
                    if open.len() >= MAX_DOCUMENT_DEPTH {
                        return Err(DocumentError::MaxDepthExceeded(MAX_DOCUMENT_DEPTH));
                    }
                    open.push(Element::new(&ns, e.local_name().as_ref()));
                }
                Ok((ns, Event::Empty(e))) => {
                    let element = Element::new(&ns, e.local_name().as_ref());
                    attach(&mut open, &mut root, element);
                }
                Ok((_, Event::End(_))) => {
                    if let Some(element) = open.pop() {
                        attach(&mut open, &mut root, element);
                    }
                }
                Ok((_, Event::Text(t))) => {
                    if let Some(current) = open.last_mut() {
                        let text = t.unescape().map_err(|e| DocumentError::Xml(e.to_string()))?;
                        current.text.push_str(&text);
                    }
                }
                Ok((_, Event::CData(c))) => {
                    if let Some(current) = open.last_mut() {
                        let text = decoder
                            .decode(&c)
                            .map_err(|e| DocumentError::Xml(e.to_string()))?;
                        current.text.push_str(&text);
                    }
                }
                Ok((_, Event::Eof)) => break,
                Err(e) => return Err(DocumentError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(DocumentError::Xml("unexpected end of document".to_string()));
        }
        root.ok_or(DocumentError::NoRoot)
    }

    fn new(ns: &ResolveResult<'_>, local_name: &[u8]) -> Element {
        let in_cap_namespace = match ns {
            ResolveResult::Bound(namespace) => namespace
                .as_ref()
                .starts_with(CAP_NAMESPACE_PREFIX.as_bytes()),
            _ => false,
        };
        Element {
            name: String::from_utf8_lossy(local_name).into_owned(),
            in_cap_namespace,
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True if this is the CAP element `name`.
    pub fn is(&self, name: &str) -> bool {
        self.in_cap_namespace && self.name == name
    }

    /// All descendant CAP elements called `name`, in document order.
    /// The element itself is not included.
    pub fn descendants<'a, 'n>(&'a self, name: &'n str) -> Descendants<'a, 'n> {
        Descendants {
            pending: self.children.iter().rev().collect(),
            name,
        }
    }

    /// First descendant CAP element called `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants(name).next()
    }
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Depth-first, document-order walk over matching descendants.
pub struct Descendants<'a, 'n> {
    pending: Vec<&'a Element>,
    name: &'n str,
}

impl<'a> Iterator for Descendants<'a, '_> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(element) = self.pending.pop() {
            self.pending.extend(element.children.iter().rev());
            if element.is(self.name) {
                return Some(element);
            }
        }
        None
    }
}
