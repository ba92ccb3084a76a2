//! XML serialization of node trees

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::Path;

use crate::core::node::Node;
use crate::xml::diagnostics::XmlError;

/// Serialize a node tree as a standalone XML document
pub fn to_string(root: &Node) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_node(&mut writer, root)?;
    let mut out = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    out.push('\n');
    Ok(out)
}

/// Serialize a node tree to a file, replacing any previous content
pub fn write_file(path: &Path, root: &Node) -> Result<(), XmlError> {
    let content = to_string(root)?;
    std::fs::write(path, content).map_err(|source| XmlError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), XmlError> {
    let mut start = BytesStart::new(node.tag());
    for (key, value) in node.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children().is_empty() && node.text().is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = node.text() {
        writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
    }
    for child in node.children() {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag())))?;
    Ok(())
}

// Non-breaking spaces are written as a character reference
fn escape_text(text: &str) -> String {
    escape(text).replace('\u{a0}', "&#xa0;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::reader::parse_str;

    #[test]
    fn test_empty_element_is_self_closing() {
        let node = Node::new("team").with_attr("slug", "core").with_attr("name", "Core");
        let xml = to_string(&node).unwrap();
        insta::assert_snapshot!(xml.lines().nth(1).unwrap(), @r#"<team slug="core" name="Core"/>"#);
    }

    #[test]
    fn test_label_spaces_written_as_character_reference() {
        let node = Node::new("label").with_text("help\u{a0}wanted");
        let xml = to_string(&node).unwrap();
        assert!(xml.contains("<label>help&#xa0;wanted</label>"));
    }

    #[test]
    fn test_special_characters_escaped() {
        let node = Node::new("title")
            .with_attr("note", "a \"quoted\" <value>")
            .with_text("Fish & <Chips>");
        let xml = to_string(&node).unwrap();
        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(!xml.contains("<value>"));
    }

    #[test]
    fn test_edge_whitespace_reads_back_verbatim() {
        let tree = Node::new("issue")
            .with_child(Node::new("title").with_text(" a "))
            .with_child(Node::new("title").with_text("\tFish & <Chips>\u{a0} "))
            .with_child(Node::new("title").with_text("  "));
        let xml = to_string(&tree).unwrap();
        let back = parse_str(&xml, "roundtrip").unwrap().unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_written_tree_reads_back_equal() {
        let tree = Node::new("organization")
            .with_attr("name", "acme")
            .with_attr("type", "organization")
            .with_child(Node::new("description").with_text("Makers & shakers"))
            .with_child(
                Node::new("repo")
                    .with_attr("name", "widgets")
                    .with_child(Node::new("label").with_text("good\u{a0}first\u{a0}issue")),
            )
            .with_child(Node::new("reports"));
        let xml = to_string(&tree).unwrap();
        let back = parse_str(&xml, "roundtrip").unwrap().unwrap();
        assert_eq!(back, tree);
    }
}
