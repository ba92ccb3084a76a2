//! XML parsing into node trees

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use crate::core::node::Node;
use crate::xml::diagnostics::XmlError;

/// An element being read, with any whitespace-only text seen so far
struct Open {
    node: Node,
    blank: String,
}

/// Parse XML text into its root node.
///
/// Text is kept byte for byte, edge whitespace included. Whitespace-only
/// text is indentation unless the element turns out to be a leaf with no
/// other text.
///
/// Returns `Ok(None)` when the input holds no root element at all (an empty
/// file, or only a declaration and comments).
pub fn parse_str(input: &str, name: &str) -> Result<Option<Node>, XmlError> {
    let mut reader = Reader::from_str(input);

    let syntax = |reader: &Reader<&[u8]>, source: quick_xml::Error| XmlError::Syntax {
        name: name.to_string(),
        position: reader.buffer_position() as u64,
        source,
    };

    let mut open: Vec<Open> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(syntax(&reader, e)),
        };
        match event {
            Event::Start(start) => {
                let node = element(&start).map_err(|e| syntax(&reader, e))?;
                open.push(Open {
                    node,
                    blank: String::new(),
                });
            }
            Event::Empty(start) => {
                let node = element(&start).map_err(|e| syntax(&reader, e))?;
                attach(node, &mut open, &mut root);
            }
            Event::End(_) => {
                if let Some(Open { mut node, blank }) = open.pop() {
                    if node.children().is_empty() && node.text().is_none() {
                        node.set_text(blank);
                    }
                    attach(node, &mut open, &mut root);
                }
            }
            Event::Text(text) => {
                if let Some(current) = open.last_mut() {
                    let text = text.unescape().map_err(|e| syntax(&reader, e))?;
                    if is_blank(&text) {
                        current.blank.push_str(&text);
                    } else {
                        current.node.append_text(&text);
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current.node.append_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(XmlError::Unclosed {
            name: name.to_string(),
            tag: unclosed.node.tag().to_string(),
        });
    }

    Ok(root)
}

/// Read and parse an XML file
pub fn read_file(path: &Path) -> Result<Option<Node>, XmlError> {
    let content = std::fs::read_to_string(path).map_err(|source| XmlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content, &path.display().to_string())
}

fn element(start: &BytesStart<'_>) -> Result<Node, quick_xml::Error> {
    let mut node = Node::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;
        node.set_attr(key, value);
    }
    Ok(node)
}

// XML whitespace only; U+00A0 is content
fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

// Only the first top-level element is kept as the root
fn attach(node: Node, open: &mut [Open], root: &mut Option<Node>) {
    match open.last_mut() {
        Some(parent) => parent.node.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
