//! Template parser.
//!
//! Turns report template text into a small tree of literal text,
//! placeholders, and blocks. Block markers are checked for balance here so
//! evaluation never has to guess where a loop or conditional ends.
//!
//! Syntax:
//! - `{{name}}` placeholder
//! - `{{#name}}...{{/name}}` block (loop over a list or conditional on a flag)
//! - `{{^name}}...{{/name}}` inverted block (renders when the flag is false or the list empty)
//!
//! Anything between `{{` and `}}` that is not a valid name is kept as literal text.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::TemplateError;

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Placeholder(String),
    Block {
        name: String,
        inverted: bool,
        body: Vec<Node>,
    },
}

/// A parsed, marker-balanced template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
    source_len: usize,
}

enum Tag<'a> {
    Var(&'a str),
    Open { name: &'a str, inverted: bool },
    Close(&'a str),
}

struct OpenBlock {
    name: String,
    inverted: bool,
    offset: usize,
    parent: Vec<Node>,
}

impl Template {
    /// Parse template text.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut text = String::new();
        let mut pos = 0;

        while let Some(found) = source[pos..].find("{{") {
            let start = pos + found;
            let Some(close) = source[start + 2..].find("}}") else {
                break;
            };
            let inner = &source[start + 2..start + 2 + close];
            let end = start + 2 + close + 2;

            let Some(tag) = classify(inner) else {
                // Not a tag; keep the braces and rescan right after them.
                text.push_str(&source[pos..start + 2]);
                pos = start + 2;
                continue;
            };

            text.push_str(&source[pos..start]);
            flush_text(&mut text, &mut nodes);

            match tag {
                Tag::Var(name) => nodes.push(Node::Placeholder(name.to_string())),
                Tag::Open { name, inverted } => stack.push(OpenBlock {
                    name: name.to_string(),
                    inverted,
                    offset: start,
                    parent: std::mem::take(&mut nodes),
                }),
                Tag::Close(name) => {
                    let Some(open) = stack.pop() else {
                        return Err(syntax_error(
                            source,
                            start,
                            format!("closing marker `{{{{/{name}}}}}` has no matching opening marker"),
                        ));
                    };
                    if open.name != name {
                        return Err(syntax_error(
                            source,
                            start,
                            format!(
                                "expected `{{{{/{}}}}}` but found `{{{{/{name}}}}}`",
                                open.name
                            ),
                        ));
                    }
                    let body = std::mem::replace(&mut nodes, open.parent);
                    nodes.push(Node::Block {
                        name: open.name,
                        inverted: open.inverted,
                        body,
                    });
                }
            }
            pos = end;
        }

        text.push_str(&source[pos..]);
        flush_text(&mut text, &mut nodes);

        if let Some(open) = stack.pop() {
            return Err(syntax_error(
                source,
                open.offset,
                format!("block `{}` is never closed", open.name),
            ));
        }

        Ok(Self {
            nodes,
            source_len: source.len(),
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Length of the source text, used as an output capacity hint.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Every placeholder and block name referenced anywhere in the template.
    pub fn referenced_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_names(&self.nodes, &mut names);
        names
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

fn classify(inner: &str) -> Option<Tag<'_>> {
    let tag = if let Some(name) = inner.strip_prefix('#') {
        Tag::Open {
            name,
            inverted: false,
        }
    } else if let Some(name) = inner.strip_prefix('^') {
        Tag::Open {
            name,
            inverted: true,
        }
    } else if let Some(name) = inner.strip_prefix('/') {
        Tag::Close(name)
    } else {
        Tag::Var(inner)
    };

    let name = match &tag {
        Tag::Var(n) | Tag::Close(n) | Tag::Open { name: n, .. } => *n,
    };
    is_valid_name(name).then_some(tag)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn flush_text(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

fn collect_names(nodes: &[Node], names: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Placeholder(name) => {
                names.insert(name.clone());
            }
            Node::Block { name, body, .. } => {
                names.insert(name.clone());
                collect_names(body, names);
            }
        }
    }
}

fn syntax_error(source: &str, offset: usize, message: String) -> TemplateError {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    TemplateError::Syntax {
        line,
        column,
        message,
    }
}
