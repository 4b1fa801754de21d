//! Structured documentation parsing.
//!
//! Documentation text is split into a short and long description plus typed sections:
//! parameters, return value, raised errors, examples, and any extra sections named in the
//! configuration. Two grammars are understood, selected by [`DocstringFormat`]:
//!
//! - `google`: `Args:`, `Returns:`, `Raises:` ... headers with indented items of the form
//!   `name (type): description`.
//! - `markdown`: rustdoc style `# Arguments`, `# Returns`, `# Errors` ... headings with bullet
//!   items of the form ``* `name` - description``.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grammar used to parse documentation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringFormat {
    #[default]
    Google,
    #[serde(alias = "rustdoc")]
    Markdown,
}

impl FromStr for DocstringFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "google" => Ok(DocstringFormat::Google),
            "markdown" | "rustdoc" => Ok(DocstringFormat::Markdown),
            _ => Err(Error::UnsupportedDocstringFormat(value.to_string())),
        }
    }
}

impl fmt::Display for DocstringFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocstringFormat::Google => write!(f, "google"),
            DocstringFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// A documented parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParam {
    pub arg_name: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// The documented return (or yield) value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocReturns {
    pub type_name: Option<String>,
    pub description: Option<String>,
    /// Set when the value is documented under `Yields`
    pub is_generator: bool,
}

/// A documented error condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRaises {
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// A usage example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocExample {
    pub description: Option<String>,
}

/// An item of a free-form section. `args` is `[section title, item name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMeta {
    pub args: Vec<String>,
    pub description: Option<String>,
}

/// Parsed documentation of one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocstring {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<DocReturns>,
    pub raises: Vec<DocRaises>,
    pub examples: Vec<DocExample>,
    pub meta: Vec<DocMeta>,
}

impl ParsedDocstring {
    /// Short and long description joined by a blank line.
    pub fn description(&self) -> Option<String> {
        match (&self.short_description, &self.long_description) {
            (Some(short), Some(long)) => Some(format!("{}\n\n{}", short, long)),
            (Some(short), None) => Some(short.clone()),
            (None, Some(long)) => Some(long.clone()),
            (None, None) => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&DocParam> {
        self.params.iter().find(|param| param.arg_name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SectionKind {
    Params,
    Returns,
    Yields,
    Raises,
    Examples,
    /// A configured extra section, carrying its canonical name
    Extra(String),
}

/// Parses documentation text according to a grammar and a set of extra section names.
pub struct DocstringParser {
    format: DocstringFormat,
    extra_sections: Vec<String>,
}

impl DocstringParser {
    pub fn new(format: DocstringFormat, extra_sections: &[String]) -> Self {
        Self {
            format,
            extra_sections: extra_sections.to_vec(),
        }
    }

    /// Parses `text`; missing documentation yields an empty result.
    pub fn parse(&self, text: Option<&str>) -> ParsedDocstring {
        let mut parsed = ParsedDocstring::default();
        let Some(text) = text else {
            return parsed;
        };

        let lines: Vec<&str> = text.lines().collect();
        let (description, sections) = match self.format {
            DocstringFormat::Google => self.split_google(&lines),
            DocstringFormat::Markdown => self.split_markdown(&lines),
        };

        let (short, long) = split_description(&description);
        parsed.short_description = short;
        parsed.long_description = long;

        for (kind, body) in sections {
            match &kind {
                SectionKind::Params => {
                    for (head, rest) in self.items(&body) {
                        let (name, type_name, description) = self.split_item(&head, &rest);
                        let (arg_name, type_name) = split_type(&name, type_name);
                        parsed.params.push(DocParam {
                            arg_name,
                            type_name,
                            description,
                        });
                    }
                }
                SectionKind::Returns | SectionKind::Yields => {
                    let (type_name, description) = self.split_returns(&body);
                    parsed.returns = Some(DocReturns {
                        type_name,
                        description,
                        is_generator: kind == SectionKind::Yields,
                    });
                }
                SectionKind::Raises => {
                    let items = self.items(&body);
                    if items.is_empty() {
                        if let Some(description) = join_block(&body) {
                            parsed.raises.push(DocRaises {
                                type_name: None,
                                description: Some(description),
                            });
                        }
                    }
                    for (head, rest) in items {
                        let (name, _, description) = self.split_item(&head, &rest);
                        parsed.raises.push(DocRaises {
                            type_name: Some(name),
                            description,
                        });
                    }
                }
                SectionKind::Examples => {
                    if let Some(description) = join_block(&body) {
                        parsed.examples.push(DocExample {
                            description: Some(description),
                        });
                    }
                }
                SectionKind::Extra(title) => {
                    for (head, rest) in self.items(&body) {
                        let (name, _, description) = self.split_item(&head, &rest);
                        parsed.meta.push(DocMeta {
                            args: vec![title.clone(), name],
                            description,
                        });
                    }
                }
            }
        }

        parsed
    }

    fn classify(&self, title: &str) -> Option<SectionKind> {
        let lowered = title.trim().to_ascii_lowercase();
        let kind = match lowered.as_str() {
            "args" | "arguments" | "parameters" | "params" | "attributes" | "fields" | "keyword args"
            | "keyword arguments" | "other parameters" => SectionKind::Params,
            "returns" | "return" => SectionKind::Returns,
            "yields" | "yield" => SectionKind::Yields,
            "raises" | "raise" | "exceptions" | "except" | "errors" | "panics" => SectionKind::Raises,
            "examples" | "example" => SectionKind::Examples,
            _ => {
                let canonical = self
                    .extra_sections
                    .iter()
                    .find(|section| section.to_ascii_lowercase() == lowered)?;
                SectionKind::Extra(canonical.clone())
            }
        };
        Some(kind)
    }

    /// `Title:` headers at the base indentation start a section. Any other unindented text
    /// closes the open section and belongs to the description.
    fn split_google<'a>(&self, lines: &[&'a str]) -> (Vec<&'a str>, Vec<(SectionKind, Vec<&'a str>)>) {
        let mut description = Vec::new();
        let mut sections: Vec<(SectionKind, Vec<&'a str>)> = Vec::new();
        let mut in_section = false;

        for &line in lines {
            if indent_of(line) == 0 && !line.trim().is_empty() {
                if let Some(kind) = line
                    .trim()
                    .strip_suffix(':')
                    .and_then(|title| self.classify(title))
                {
                    sections.push((kind, Vec::new()));
                    in_section = true;
                    continue;
                }
                in_section = false;
            }
            match sections.last_mut() {
                Some((_, body)) if in_section => body.push(line),
                _ => description.push(line),
            }
        }

        (description, sections)
    }

    /// `# Heading` lines outside code fences start a section.
    fn split_markdown<'a>(&self, lines: &[&'a str]) -> (Vec<&'a str>, Vec<(SectionKind, Vec<&'a str>)>) {
        let mut description = Vec::new();
        let mut sections: Vec<(SectionKind, Vec<&'a str>)> = Vec::new();
        let mut in_fence = false;

        for &line in lines {
            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
            } else if !in_fence {
                if let Some(kind) = heading(trimmed).and_then(|title| self.classify(title)) {
                    sections.push((kind, Vec::new()));
                    continue;
                }
            }
            match sections.last_mut() {
                Some((_, body)) => body.push(line),
                None => description.push(line),
            }
        }

        (description, sections)
    }

    /// Splits a section body into items: each item is its first line plus continuation lines.
    /// Google items start at the base indentation, and the first line always opens one.
    fn items(&self, body: &[&str]) -> Vec<(String, Vec<String>)> {
        let mut items: Vec<(String, Vec<String>)> = Vec::new();
        let base = body
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| indent_of(line))
            .min()
            .unwrap_or(0);

        for line in body {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let starts_item = match self.format {
                DocstringFormat::Google => indent_of(line) == base || items.is_empty(),
                DocstringFormat::Markdown => bullet(trimmed).is_some(),
            };
            if starts_item {
                let head = match self.format {
                    DocstringFormat::Google => trimmed,
                    DocstringFormat::Markdown => bullet(trimmed).unwrap_or(trimmed),
                };
                items.push((head.to_string(), Vec::new()));
            } else if let Some((_, rest)) = items.last_mut() {
                rest.push(trimmed.to_string());
            }
        }

        items
    }

    /// Splits an item into name, optional `(type)` and description.
    fn split_item(&self, head: &str, rest: &[String]) -> (String, Option<String>, Option<String>) {
        let (name, type_name, first) = match self.format {
            DocstringFormat::Google => match split_at_colon(head) {
                Some((name, desc)) => (name.to_string(), None, desc.to_string()),
                None => (head.to_string(), None, String::new()),
            },
            DocstringFormat::Markdown => split_markdown_item(head),
        };

        let mut parts: Vec<&str> = Vec::new();
        if !first.is_empty() {
            parts.push(&first);
        }
        parts.extend(rest.iter().map(String::as_str));
        let description = if parts.is_empty() { None } else { Some(parts.join("\n")) };

        (name, type_name, description)
    }

    fn split_returns(&self, body: &[&str]) -> (Option<String>, Option<String>) {
        let Some(text) = join_block(body) else {
            return (None, None);
        };
        if self.format == DocstringFormat::Google {
            let (first, remainder) = text.split_once('\n').unwrap_or((&text, ""));
            if let Some((type_name, desc)) = split_at_colon(first) {
                if is_type_like(type_name) {
                    let description = [desc, remainder]
                        .iter()
                        .filter(|part| !part.is_empty())
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("\n");
                    let description = if description.is_empty() { None } else { Some(description) };
                    return (Some(type_name.to_string()), description);
                }
            }
        }
        (None, Some(text))
    }
}

/// Leading spaces and tabs, in bytes. Other whitespace is content.
fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn heading(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    line[hashes..].strip_prefix(' ').map(str::trim)
}

fn bullet(line: &str) -> Option<&str> {
    ["* ", "- ", "+ "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

/// Short description is the first paragraph, long description the rest.
fn split_description(lines: &[&str]) -> (Option<String>, Option<String>) {
    let text = lines.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return (None, None);
    }
    match text.split_once("\n\n") {
        Some((short, long)) => {
            let short = short.lines().map(str::trim).collect::<Vec<_>>().join(" ");
            let long = long.trim();
            (Some(short), if long.is_empty() { None } else { Some(long.to_string()) })
        }
        None => (
            Some(text.lines().map(str::trim).collect::<Vec<_>>().join(" ")),
            None,
        ),
    }
}

/// Dedented text of a block, without surrounding blank lines.
fn join_block(body: &[&str]) -> Option<String> {
    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()?;
    let text = body
        .iter()
        .map(|line| &line[indent_of(line).min(indent)..])
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim_matches('\n').trim_end();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Splits at the first `:` outside brackets that is followed by whitespace or ends the text.
fn split_at_colon(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let bytes = text.as_bytes();
    for (index, ch) in text.char_indices() {
        match ch {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ':' if depth <= 0 => {
                let next = bytes.get(index + 1).copied();
                let prev = index.checked_sub(1).and_then(|i| bytes.get(i)).copied();
                if prev != Some(b':') && next.map_or(true, |b| b.is_ascii_whitespace()) {
                    return Some((text[..index].trim(), text[index + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    None
}

/// `name (type)` into name and type; an explicit type wins over the one parsed here.
fn split_type(name: &str, explicit: Option<String>) -> (String, Option<String>) {
    if explicit.is_some() {
        return (name.to_string(), explicit);
    }
    if let Some(open) = name.find('(') {
        if name.ends_with(')') {
            let type_name = name[open + 1..name.len() - 1].trim().trim_matches('`');
            let type_name = if type_name.is_empty() { None } else { Some(type_name.to_string()) };
            return (name[..open].trim().to_string(), type_name);
        }
    }
    (name.to_string(), None)
}

fn split_markdown_item(head: &str) -> (String, Option<String>, String) {
    let (name, rest) = if let Some(stripped) = head.strip_prefix('`') {
        match stripped.split_once('`') {
            Some((name, rest)) => (name.to_string(), rest.trim_start()),
            None => (stripped.to_string(), ""),
        }
    } else if let Some((name, rest)) = head.split_once(" - ") {
        (name.trim().to_string(), rest)
    } else if let Some((name, rest)) = split_at_colon(head) {
        return (name.to_string(), None, rest.to_string());
    } else {
        return (head.to_string(), None, String::new());
    };

    let mut rest = rest;
    let mut type_name = None;
    if let Some(stripped) = rest.strip_prefix('(') {
        if let Some((inner, after)) = stripped.split_once(')') {
            type_name = Some(inner.trim().trim_matches('`').to_string());
            rest = after.trim_start();
        }
    }
    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix("- "))
        .or_else(|| rest.strip_prefix('-'))
        .unwrap_or(rest)
        .trim();

    (name, type_name, rest.to_string())
}

fn is_type_like(text: &str) -> bool {
    let mut depth = 0i32;
    for ch in text.chars() {
        match ch {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => return false,
            _ => {}
        }
    }
    !text.is_empty()
}
