//! Template evaluation.
//!
//! Walks a parsed [`Template`] against a stack of [`Scope`]s. Lookups search
//! from the innermost scope outwards, so a section's `totalQuestions`
//! shadows the report-level one inside the section loop while report-level
//! names stay reachable.
//!
//! A block bound to a list repeats its body once per item. A block bound to a
//! flag keeps or drops its body. Names with no binding are written back
//! verbatim, markers included.

use std::collections::BTreeMap;

use crate::error::TemplateError;
use crate::template::{Node, Template};
use crate::view::ViewModel;

/// A value a template name can be bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Flag(bool),
    List(Vec<Scope>),
}

impl Value {
    pub fn text(value: impl ToString) -> Self {
        Value::Text(value.to_string())
    }
}

/// Name → value bindings for one level of the template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    values: BTreeMap<&'static str, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Parse `source` and render it against `view`.
pub fn apply(source: &str, view: &ViewModel) -> Result<String, TemplateError> {
    let template = Template::parse(source)?;
    Ok(render(&template, &view.to_scope()))
}

/// Render a parsed template against a root scope.
pub fn render(template: &Template, root: &Scope) -> String {
    let mut out = String::with_capacity(template.source_len());
    let mut stack = vec![root];
    render_nodes(template.nodes(), &mut stack, &mut out);
    out
}

fn render_nodes<'a>(nodes: &[Node], stack: &mut Vec<&'a Scope>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Placeholder(name) => match lookup(stack, name) {
                Some(Value::Text(value)) => out.push_str(value),
                Some(Value::Flag(flag)) => out.push_str(if *flag { "true" } else { "false" }),
                Some(Value::List(_)) | None => {
                    out.push_str("{{");
                    out.push_str(name);
                    out.push_str("}}");
                }
            },
            Node::Block {
                name,
                inverted,
                body,
            } => match lookup(stack, name) {
                Some(Value::List(items)) => {
                    if *inverted {
                        if items.is_empty() {
                            render_nodes(body, stack, out);
                        }
                    } else {
                        for item in items {
                            stack.push(item);
                            render_nodes(body, stack, out);
                            stack.pop();
                        }
                    }
                }
                Some(Value::Flag(flag)) => {
                    if *flag != *inverted {
                        render_nodes(body, stack, out);
                    }
                }
                Some(Value::Text(value)) => {
                    if value.is_empty() == *inverted {
                        render_nodes(body, stack, out);
                    }
                }
                None => {
                    out.push_str(if *inverted { "{{^" } else { "{{#" });
                    out.push_str(name);
                    out.push_str("}}");
                    render_nodes(body, stack, out);
                    out.push_str("{{/");
                    out.push_str(name);
                    out.push_str("}}");
                }
            },
        }
    }
}

fn lookup<'a>(stack: &[&'a Scope], name: &str) -> Option<&'a Value> {
    for scope in stack.iter().rev() {
        let scope: &'a Scope = *scope;
        if let Some(value) = scope.get(name) {
            return Some(value);
        }
    }
    None
}
