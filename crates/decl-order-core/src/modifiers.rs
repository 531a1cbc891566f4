//! Modifier and annotation trees, and their normalized text form.
//!
//! Rule patterns are matched against a single string built from a member's
//! modifiers. The format is stable for a given tree:
//!
//! - top-level modifiers appear in source order, separated by one space;
//! - keywords and tokens contribute their literal text;
//! - annotations render as `@Name` or `@Name(args)` with no whitespace
//!   inside the parentheses;
//! - nested expressions and annotations are flattened depth-first, left to
//!   right.
//!
//! `@SuppressWarnings(value = {"a", "b"}) private static final` therefore
//! becomes `@SuppressWarnings(value={"a","b"}) private static final`.

use serde::{Deserialize, Serialize};

/// A node in a member's modifier list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierNode {
    /// Modifier keyword such as `public` or `static`.
    Keyword(String),
    /// Annotation, possibly with arguments.
    Annotation(Annotation),
    /// Composite expression inside annotation arguments.
    Expression(Vec<ModifierNode>),
    /// Leaf token inside annotation arguments (literal, identifier, punctuation).
    Token(String),
}

impl ModifierNode {
    /// Shorthand for [`ModifierNode::Keyword`].
    #[must_use]
    pub fn keyword(text: impl Into<String>) -> Self {
        Self::Keyword(text.into())
    }

    /// Shorthand for [`ModifierNode::Token`].
    #[must_use]
    pub fn token(text: impl Into<String>) -> Self {
        Self::Token(text.into())
    }

    /// Flattens this node into its normalized text.
    #[must_use]
    pub fn flatten(&self) -> String {
        match self {
            Self::Keyword(text) | Self::Token(text) => text.clone(),
            Self::Annotation(annotation) => annotation.flatten(),
            Self::Expression(children) => concat(children),
        }
    }
}

/// An annotation such as `@Override` or `@Named("x")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation name without `@` (may be qualified, e.g. `javax.inject.Named`).
    pub name: String,
    /// Argument nodes between the parentheses; `None` for marker annotations.
    pub arguments: Option<Vec<ModifierNode>>,
}

impl Annotation {
    /// Creates a marker annotation.
    #[must_use]
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: None,
        }
    }

    /// Creates an annotation with arguments.
    #[must_use]
    pub fn with_arguments(name: impl Into<String>, arguments: Vec<ModifierNode>) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments),
        }
    }

    /// Flattens this annotation into `@Name` or `@Name(args)`.
    #[must_use]
    pub fn flatten(&self) -> String {
        match &self.arguments {
            None => format!("@{}", self.name),
            Some(arguments) => format!("@{}({})", self.name, concat(arguments)),
        }
    }
}

impl From<Annotation> for ModifierNode {
    fn from(annotation: Annotation) -> Self {
        Self::Annotation(annotation)
    }
}

fn concat(nodes: &[ModifierNode]) -> String {
    nodes.iter().map(ModifierNode::flatten).collect()
}

/// Flattens a member's modifier list. No modifiers yields an empty string.
#[must_use]
pub fn flatten_modifiers(modifiers: Option<&[ModifierNode]>) -> String {
    modifiers
        .unwrap_or_default()
        .iter()
        .map(ModifierNode::flatten)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn kw(text: &str) -> ModifierNode {
        ModifierNode::keyword(text)
    }

    fn tok(text: &str) -> ModifierNode {
        ModifierNode::token(text)
    }

    #[test]
    fn missing_modifiers_flatten_to_empty() {
        assert_eq!(flatten_modifiers(None), "");
        assert_eq!(flatten_modifiers(Some(&[])), "");
    }

    #[test]
    fn keywords_are_space_separated() {
        let mods = [kw("private"), kw("static"), kw("final")];
        assert_snapshot!(flatten_modifiers(Some(&mods)), @"private static final");
    }

    #[test]
    fn marker_and_empty_argument_annotations() {
        let mods = [
            Annotation::marker("Override").into(),
            Annotation::with_arguments("Deprecated", vec![]).into(),
            kw("public"),
        ];
        assert_snapshot!(flatten_modifiers(Some(&mods)), @"@Override @Deprecated() public");
    }

    #[test]
    fn nested_arguments_flatten_depth_first() {
        // @SuppressWarnings(value = {"a", "b"}) private static final
        let array = ModifierNode::Expression(vec![
            tok("{"),
            ModifierNode::Expression(vec![tok("\""), tok("a"), tok("\"")]),
            tok(","),
            ModifierNode::Expression(vec![tok("\""), tok("b"), tok("\"")]),
            tok("}"),
        ]);
        let pair = ModifierNode::Expression(vec![tok("value"), tok("="), array]);
        let mods = [
            Annotation::with_arguments("SuppressWarnings", vec![pair]).into(),
            kw("private"),
            kw("static"),
            kw("final"),
        ];
        assert_snapshot!(
            flatten_modifiers(Some(&mods)),
            @r#"@SuppressWarnings(value={"a","b"}) private static final"#
        );
    }

    #[test]
    fn annotations_nested_in_arguments() {
        // @Outer(inner = @Inner(1), flag = true)
        let inner = Annotation::with_arguments("Inner", vec![tok("1")]);
        let mods = [Annotation::with_arguments(
            "Outer",
            vec![
                ModifierNode::Expression(vec![tok("inner"), tok("="), inner.into()]),
                tok(","),
                ModifierNode::Expression(vec![tok("flag"), tok("="), tok("true")]),
            ],
        )
        .into()];
        assert_snapshot!(flatten_modifiers(Some(&mods)), @"@Outer(inner=@Inner(1),flag=true)");
    }

    #[test]
    fn no_sibling_is_dropped() {
        let mods = [
            kw("protected"),
            Annotation::marker("javax.inject.Inject").into(),
            kw("synchronized"),
        ];
        let text = flatten_modifiers(Some(&mods));
        assert_eq!(text, "protected @javax.inject.Inject synchronized");
    }
}
