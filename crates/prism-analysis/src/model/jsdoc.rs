//! A small JSDoc reader.
//!
//! Only the parts the scanners consume are modelled: the free-text
//! description and a flat list of `@tag {type} name description` entries.
//! Type expressions are kept as their source text.

use serde::Serialize;

/// Tags whose first word after the optional `{type}` is a name.
const NAMED_TAGS: &[&str] = &[
    "appliesMixin",
    "arg",
    "argument",
    "augments",
    "demo",
    "event",
    "extends",
    "fires",
    "memberof",
    "mixes",
    "mixinFunction",
    "namespace",
    "param",
    "polymerBehavior",
    "prop",
    "property",
];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Tag {
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A parsed doc comment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Annotation {
    pub description: String,
    pub tags: Vec<Tag>,
}

impl Annotation {
    /// Parse the text of a `/** ... */` comment. Delimiters are optional.
    pub fn parse(comment: &str) -> Self {
        let body = strip_delimiters(comment);

        let mut description = Vec::new();
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for line in body.lines().map(clean_line) {
            if line.starts_with('@') {
                blocks.push(vec![line]);
            } else if let Some(block) = blocks.last_mut() {
                block.push(line);
            } else {
                description.push(line);
            }
        }

        Self {
            description: description.join("\n").trim().to_string(),
            tags: blocks
                .iter()
                .map(|block| parse_tag(&block.join("\n")))
                .collect(),
        }
    }

    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|tag| tag.title == title)
    }

    pub fn tag(&self, title: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.title == title)
    }

    pub fn tags_titled<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |tag| tag.title == title)
    }

    /// The `{type}` of the first `@type` tag.
    pub fn type_tag(&self) -> Option<&str> {
        self.tag("type").and_then(|tag| tag.kind.as_deref())
    }

    /// Explicit `@public`/`@protected`/`@private` annotation.
    pub fn privacy(&self) -> Option<Privacy> {
        self.tags.iter().find_map(|tag| match tag.title.as_str() {
            "public" => Some(Privacy::Public),
            "protected" => Some(Privacy::Protected),
            "private" => Some(Privacy::Private),
            _ => None,
        })
    }

    /// Description, falling back to the text of a describing tag such as
    /// `@type {string} the name of the animal`.
    pub fn description_or_tag_text(&self) -> Option<String> {
        if !self.description.is_empty() {
            return Some(self.description.clone());
        }
        self.tags
            .iter()
            .filter(|tag| matches!(tag.title.as_str(), "public" | "private" | "protected" | "type"))
            .find_map(|tag| tag.description.clone())
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Protected,
    Private,
}

/// Privacy from jsdoc, otherwise inferred from naming conventions.
pub fn privacy_of(name: &str, annotation: Option<&Annotation>) -> Privacy {
    if let Some(privacy) = annotation.and_then(Annotation::privacy) {
        return privacy;
    }
    if name.starts_with("__") {
        Privacy::Private
    } else if name.starts_with('_') || name.ends_with('_') {
        Privacy::Protected
    } else {
        Privacy::Public
    }
}

/// The longest description wins; earlier candidates win ties.
pub fn pick_best_description<'a>(candidates: impl IntoIterator<Item = &'a str>) -> String {
    let mut best = "";
    for candidate in candidates {
        if candidate.len() > best.len() {
            best = candidate;
        }
    }
    best.to_string()
}

fn strip_delimiters(comment: &str) -> &str {
    let trimmed = comment.trim();
    let trimmed = trimmed
        .strip_prefix("/**")
        .or_else(|| trimmed.strip_prefix("/*"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("*/").unwrap_or(trimmed)
}

fn clean_line(line: &str) -> &str {
    let line = line.trim_start();
    let line = line.strip_prefix('*').unwrap_or(line);
    let line = line.strip_prefix(' ').unwrap_or(line);
    line.trim_end()
}

fn parse_tag(text: &str) -> Tag {
    let text = text.trim_start_matches('@');
    let (title, mut rest) = split_word(text);

    let mut tag = Tag {
        title: title.to_string(),
        ..Tag::default()
    };

    if rest.starts_with('{') {
        if let Some(close) = matching_brace(rest) {
            tag.kind = Some(rest[1..close].trim().to_string());
            rest = rest[close + 1..].trim_start();
        }
    }

    if NAMED_TAGS.contains(&title) && !rest.is_empty() {
        let (name, remainder) = split_word(rest);
        let name = name
            .trim_start_matches('[')
            .split(['=', ']'])
            .next()
            .unwrap_or_default();
        if !name.is_empty() {
            tag.name = Some(name.to_string());
        }
        rest = remainder;
    }

    let description = rest.trim().trim_start_matches("- ").trim();
    if !description.is_empty() {
        tag.description = Some(description.to_string());
    }
    tag
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_description_and_tags() {
        let doc = Annotation::parse(
            "/**\n * A fancy button.\n *\n * More text.\n * @customElement\n * @param {string} label - The label\n * @demo demo/index.html Basic demo\n */",
        );
        assert_eq!(doc.description, "A fancy button.\n\nMore text.");
        assert!(doc.has_tag("customElement"));

        let param = doc.tag("param").unwrap();
        assert_eq!(param.kind.as_deref(), Some("string"));
        assert_eq!(param.name.as_deref(), Some("label"));
        assert_eq!(param.description.as_deref(), Some("The label"));

        let demo = doc.tag("demo").unwrap();
        assert_eq!(demo.name.as_deref(), Some("demo/index.html"));
        assert_eq!(demo.description.as_deref(), Some("Basic demo"));
    }

    #[test]
    fn single_line_type_comment() {
        let doc = Annotation::parse("/** @type {{a: number}} the shape */");
        assert_eq!(doc.type_tag(), Some("{a: number}"));
        assert_eq!(doc.description_or_tag_text().as_deref(), Some("the shape"));
    }

    #[test]
    fn named_tags_take_the_first_word() {
        let doc = Annotation::parse("/** @polymerBehavior Polymer.IronButtonState */");
        assert_eq!(
            doc.tag("polymerBehavior").and_then(|t| t.name.as_deref()),
            Some("Polymer.IronButtonState")
        );
        let doc = Annotation::parse("/** @polymerBehavior */");
        assert_eq!(doc.tag("polymerBehavior").and_then(|t| t.name.as_deref()), None);
    }

    #[test]
    fn optional_param_names_are_unwrapped() {
        let doc = Annotation::parse("/** @param {number=} [count=3] how many */");
        assert_eq!(doc.tag("param").and_then(|t| t.name.as_deref()), Some("count"));
    }

    #[test]
    fn privacy_inference() {
        assert_eq!(privacy_of("foo", None), Privacy::Public);
        assert_eq!(privacy_of("_foo", None), Privacy::Protected);
        assert_eq!(privacy_of("foo_", None), Privacy::Protected);
        assert_eq!(privacy_of("__foo", None), Privacy::Private);

        let doc = Annotation::parse("/** @private */");
        assert_eq!(privacy_of("foo", Some(&doc)), Privacy::Private);
    }

    #[test]
    fn best_description_prefers_longest_then_first() {
        assert_eq!(pick_best_description(["short", "much longer"]), "much longer");
        assert_eq!(pick_best_description(["aaa", "bbb"]), "aaa");
        assert_eq!(pick_best_description(["", ""]), "");
    }
}
