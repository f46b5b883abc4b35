//! Plugin descriptor (`plugin.xml`) reader.

use std::path::Path;

use overlay_core::{OverlayError, Platform, Result};
use roxmltree::{Document, Node};

use crate::error::ParseError;

/// A file entry declared in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `<js-module src="..." name="..."/>`
    JsModule { src: String, name: String },

    /// `<asset src="..." target="..."/>`
    Asset { src: String, target: String },
}

impl Declaration {
    pub fn src(&self) -> &str {
        match self {
            Self::JsModule { src, .. } | Self::Asset { src, .. } => src,
        }
    }
}

/// Declarations of one `plugin.xml`, split by scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    /// Entries directly under `<plugin>`, applying to every platform.
    pub common: Vec<Declaration>,

    /// Entries under `<platform name="...">`, keyed by platform name.
    pub platforms: Vec<(String, Vec<Declaration>)>,
}

impl Descriptor {
    /// Common entries followed by the entries of every section for `platform`.
    pub fn declarations_for(&self, platform: Platform) -> impl Iterator<Item = &Declaration> {
        let specific = self
            .platforms
            .iter()
            .filter(move |(name, _)| name == platform.name())
            .flat_map(|(_, decls)| decls.iter());

        self.common.iter().chain(specific)
    }
}

/// Parses a descriptor from an XML string.
pub fn parse_descriptor(content: &str) -> std::result::Result<Descriptor, ParseError> {
    let doc = Document::parse(content).map_err(|e| {
        let pos = e.pos();
        ParseError::at_line_col(e.to_string(), content, pos.row as usize, pos.col as usize)
    })?;

    let root = doc.root_element();
    let mut descriptor = Descriptor {
        common: collect_declarations(root, content)?,
        platforms: Vec::new(),
    };

    for section in root.children().filter(|n| is_element(n, "platform")) {
        let name = required_attribute(section, "name", content)?;
        descriptor
            .platforms
            .push((name.to_string(), collect_declarations(section, content)?));
    }

    Ok(descriptor)
}

/// Reads and parses `plugin.xml` at `path`.
pub fn read_descriptor(path: &Path) -> Result<Descriptor> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        OverlayError::configuration(path, format!("cannot read plugin descriptor: {}", e))
    })?;

    parse_descriptor(&content).map_err(|e| OverlayError::configuration(path, e.located_message()))
}

fn collect_declarations(
    parent: Node<'_, '_>,
    content: &str,
) -> std::result::Result<Vec<Declaration>, ParseError> {
    let mut declarations = Vec::new();

    for node in parent.children().filter(Node::is_element) {
        let declaration = match node.tag_name().name() {
            "js-module" => Declaration::JsModule {
                src: required_attribute(node, "src", content)?.to_string(),
                name: required_attribute(node, "name", content)?.to_string(),
            },
            "asset" => Declaration::Asset {
                src: required_attribute(node, "src", content)?.to_string(),
                target: required_attribute(node, "target", content)?.to_string(),
            },
            _ => continue,
        };
        declarations.push(declaration);
    }

    Ok(declarations)
}

fn is_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn required_attribute<'a>(
    node: Node<'a, '_>,
    attribute: &str,
    content: &str,
) -> std::result::Result<&'a str, ParseError> {
    node.attribute(attribute).ok_or_else(|| {
        ParseError::at(
            format!(
                "<{}> is missing the '{}' attribute",
                node.tag_name().name(),
                attribute
            ),
            content,
            node.range(),
        )
    })
}
