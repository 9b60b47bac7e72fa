/// XML serialization module - writes XmlNode structures back to XML files
///
/// Board documents are regenerated through this writer after a stitching
/// run, so the output must be stable: attributes are written in the order
/// they are stored and empty elements are self-closed.

use crate::parse_xml::XmlNode;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serializes an XmlNode and all its descendants to an XML string
pub fn xml_node_to_string(node: &XmlNode) -> Result<String> {
    let mut buffer = Vec::with_capacity(1024);
    buffer.extend_from_slice(b"<?xml version=\"1.0\"?>\n");
    write_node_pretty(node, &mut buffer, 0).context("Failed to serialize XML")?;
    String::from_utf8(buffer).context("serialized XML was not valid UTF-8")
}

/// Serializes an XmlNode tree to a file on disk
pub fn xml_node_to_file<P: AsRef<Path>>(node: &XmlNode, file_path: P) -> Result<()> {
    let file = File::create(&file_path)
        .with_context(|| format!("Failed to create XML file {}", file_path.as_ref().display()))?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    writer.write_all(b"<?xml version=\"1.0\"?>\n").context("Failed to write XML declaration")?;
    write_node_pretty(node, &mut writer, 0).context("Failed to serialize XML")?;
    writer.flush().context("Failed to flush XML writer")?;
    Ok(())
}

fn write_node_pretty<W: Write>(node: &XmlNode, writer: &mut W, indent_level: usize) -> io::Result<()> {
    write_indent(writer, indent_level)?;
    writer.write_all(b"<")?;
    writer.write_all(node.name.as_bytes())?;

    for (key, value) in &node.attributes {
        writer.write_all(b" ")?;
        writer.write_all(key.as_bytes())?;
        writer.write_all(b"=\"")?;
        write_escaped(writer, value, true)?;
        writer.write_all(b"\"")?;
    }

    let text = node.text_content.trim();
    let has_text = !text.is_empty();
    if node.children.is_empty() && !has_text {
        writer.write_all(b" />\n")?;
        return Ok(());
    }

    writer.write_all(b">\n")?;

    if has_text {
        write_indent(writer, indent_level + 1)?;
        write_escaped(writer, text, false)?;
        writer.write_all(b"\n")?;
    }

    for child in &node.children {
        write_node_pretty(child, writer, indent_level + 1)?;
    }

    write_indent(writer, indent_level)?;
    writer.write_all(b"</")?;
    writer.write_all(node.name.as_bytes())?;
    writer.write_all(b">\n")?;
    Ok(())
}

fn write_indent<W: Write>(writer: &mut W, indent_level: usize) -> io::Result<()> {
    for _ in 0..indent_level {
        writer.write_all(b"  ")?;
    }
    Ok(())
}

/// Escapes special XML characters; quotes only matter inside attributes
fn write_escaped<W: Write>(writer: &mut W, input: &str, in_attribute: bool) -> io::Result<()> {
    let mut last = 0;
    for (idx, ch) in input.char_indices() {
        let entity = match ch {
            '&' => Some(b"&amp;" as &[u8]),
            '<' => Some(b"&lt;" as &[u8]),
            '>' => Some(b"&gt;" as &[u8]),
            '"' if in_attribute => Some(b"&quot;" as &[u8]),
            '\'' if in_attribute => Some(b"&apos;" as &[u8]),
            _ => None,
        };

        if let Some(bytes) = entity {
            if last < idx {
                writer.write_all(input[last..idx].as_bytes())?;
            }
            writer.write_all(bytes)?;
            last = idx + ch.len_utf8();
        }
    }

    if last < input.len() {
        writer.write_all(input[last..].as_bytes())?;
    }
    Ok(())
}
