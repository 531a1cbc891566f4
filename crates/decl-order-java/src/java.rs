//! Java language extractor using Tree-sitter.
//!
//! Walks the syntax tree depth-first and reports every class-like body as an
//! `EnterBody`/`LeaveBody` pair, with the body's direct member declarations
//! in between. Anonymous classes, enum constant bodies and local classes
//! produce their own nested bodies.

use decl_order_core::{Annotation, DeclEvent, Location, MemberCategory, MemberDecl, ModifierNode};
use std::path::PathBuf;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

use crate::extractor::{ExtractError, FileAnalysis, LanguageExtractor};

const LANGUAGE_ID: &str = "java";

/// Work item of the iterative tree walk.
enum Step<'t> {
    /// Any node outside a member slot.
    Node(Node<'t>),
    /// A direct child of a body, which may be a member declaration.
    Slot(Node<'t>),
    /// End of the innermost body.
    Leave,
}

/// Extracts declaration events from Java source.
pub struct JavaExtractor {
    language: Language,
}

impl JavaExtractor {
    /// Creates a new Java extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
    }

    fn is_body(kind: &str) -> bool {
        matches!(
            kind,
            "class_body" | "interface_body" | "enum_body" | "annotation_type_body"
        )
    }

    fn category(kind: &str) -> Option<MemberCategory> {
        match kind {
            "field_declaration" | "constant_declaration" => Some(MemberCategory::Field),
            "constructor_declaration" | "compact_constructor_declaration" => {
                Some(MemberCategory::Constructor)
            }
            "method_declaration" | "annotation_type_element_declaration" => {
                Some(MemberCategory::Method)
            }
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => Some(MemberCategory::InnerType),
            _ => None,
        }
    }

    /// Children in source order, without comments.
    fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        let children = node
            .children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        children
    }

    /// Name node of a member: the first declarator for fields.
    fn name_node<'t>(node: &Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "field_declaration" | "constant_declaration" => node
                .child_by_field_name("declarator")
                .and_then(|declarator| declarator.child_by_field_name("name")),
            _ => node.child_by_field_name("name"),
        }
    }

    fn extract_modifiers(node: &Node<'_>, src: &[u8]) -> Option<Vec<ModifierNode>> {
        let children = Self::children(node);
        let modifiers = children.iter().find(|child| child.kind() == "modifiers")?;

        Some(
            Self::children(modifiers)
                .iter()
                .map(|child| match Self::annotation(child, src) {
                    Some(annotation) => annotation.into(),
                    None => ModifierNode::keyword(Self::text(child, src)),
                })
                .collect(),
        )
    }

    fn annotation(node: &Node<'_>, src: &[u8]) -> Option<Annotation> {
        let name = || {
            node.child_by_field_name("name")
                .map(|name| Self::text(&name, src))
                .unwrap_or_default()
        };

        match node.kind() {
            "marker_annotation" => Some(Annotation::marker(name())),
            "annotation" => {
                let arguments = node
                    .child_by_field_name("arguments")
                    .map(|list| {
                        Self::children(&list)
                            .iter()
                            .filter(|child| !matches!(child.kind(), "(" | ")"))
                            .map(|child| Self::argument(child, src))
                            .collect()
                    })
                    .unwrap_or_default();
                Some(Annotation::with_arguments(name(), arguments))
            }
            _ => None,
        }
    }

    fn argument(node: &Node<'_>, src: &[u8]) -> ModifierNode {
        if let Some(annotation) = Self::annotation(node, src) {
            return annotation.into();
        }
        let children = Self::children(node);
        if children.is_empty() {
            ModifierNode::token(Self::text(node, src))
        } else {
            ModifierNode::Expression(
                children
                    .iter()
                    .map(|child| Self::argument(child, src))
                    .collect(),
            )
        }
    }

    fn extract_member(node: &Node<'_>, category: MemberCategory, src: &[u8]) -> MemberDecl {
        let start = node.start_position();
        let name = Self::name_node(node);
        let end = name.map_or(node.end_byte(), |n| n.end_byte());

        let location = Location::new(PathBuf::new(), start.row + 1, start.column + 1)
            .with_span(node.start_byte(), end - node.start_byte());

        let mut member = MemberDecl::new(category, location);
        if let Some(name) = name {
            member = member.with_name(Self::text(&name, src));
        }
        if let Some(modifiers) = Self::extract_modifiers(node, src) {
            member = member.with_modifiers(modifiers);
        }
        member
    }

    fn collect_events(root: Node<'_>, src: &[u8]) -> Vec<DeclEvent> {
        let mut events = Vec::new();
        let mut stack = vec![Step::Node(root)];

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Leave => {
                    events.push(DeclEvent::LeaveBody);
                    continue;
                }
                Step::Slot(node) => {
                    // Members after a recovered syntax error stay members.
                    if matches!(node.kind(), "enum_body_declarations" | "ERROR") {
                        Self::push_reversed(&mut stack, &node, Step::Slot);
                        continue;
                    }
                    if let Some(category) = Self::category(node.kind()) {
                        let member = Self::extract_member(&node, category, src);
                        events.push(DeclEvent::Member(member));
                    }
                    node
                }
                Step::Node(node) => node,
            };

            if Self::is_body(node.kind()) {
                events.push(DeclEvent::EnterBody);
                stack.push(Step::Leave);
                Self::push_reversed(&mut stack, &node, Step::Slot);
            } else {
                Self::push_reversed(&mut stack, &node, Step::Node);
            }
        }

        events
    }

    /// Pushes children so that they pop in source order.
    fn push_reversed<'t>(
        stack: &mut Vec<Step<'t>>,
        node: &Node<'t>,
        wrap: fn(Node<'t>) -> Step<'t>,
    ) {
        stack.extend(Self::children(node).into_iter().rev().map(wrap));
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for JavaExtractor {
    fn language_id(&self) -> &'static str {
        LANGUAGE_ID
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|source| ExtractError::Language {
                language: LANGUAGE_ID,
                source,
            })?;

        let src = source.as_bytes();
        let tree = parser
            .parse(src, None)
            .ok_or(ExtractError::NoTree {
                language: LANGUAGE_ID,
            })?;
        let root = tree.root_node();

        let has_syntax_errors = root.has_error();
        if has_syntax_errors {
            debug!("Java source contains syntax errors; continuing with recovered tree");
        }

        Ok(FileAnalysis {
            file_path: PathBuf::new(),
            events: Self::collect_events(root, src),
            has_syntax_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl_order_core::MemberCategory::{Constructor, Field, InnerType, Method};

    #[test]
    fn inner_types_are_members() {
        let a = analyze("class A { interface B {} enum C { X } record D() {} @interface E {} }\n");
        assert_eq!(
            members(&a),
            vec![
                (InnerType, "B".into(), String::new()),
                (InnerType, "C".into(), String::new()),
                (InnerType, "D".into(), String::new()),
                (InnerType, "E".into(), String::new()),
            ]
        );
    }

    fn analyze(src: &str) -> FileAnalysis {
        JavaExtractor::new()
            .analyze(src)
            .expect("java grammar should load")
    }

    /// Members as `(category, name, modifier text)`.
    fn members(a: &FileAnalysis) -> Vec<(MemberCategory, String, String)> {
        a.members()
            .map(|m| {
                (
                    m.category,
                    m.name.clone().unwrap_or_default(),
                    m.modifier_text(),
                )
            })
            .collect()
    }

    /// Compact rendering of the event stream: `{`, `}`, or the member name.
    fn shape(a: &FileAnalysis) -> String {
        a.events
            .iter()
            .map(|e| match e {
                DeclEvent::EnterBody => "{".to_string(),
                DeclEvent::LeaveBody => "}".to_string(),
                DeclEvent::Member(m) => m.name.clone().unwrap_or_else(|| "?".into()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn extracts_member_categories() {
        let a = analyze(
            r"
class Foo {
    private int count;
    Foo() {}
    void run() {}
    static class Inner {}
}
",
        );
        assert_eq!(
            members(&a),
            vec![
                (Field, "count".into(), "private".into()),
                (Constructor, "Foo".into(), String::new()),
                (Method, "run".into(), String::new()),
                (InnerType, "Inner".into(), "static".into()),
            ]
        );
        assert!(!a.has_syntax_errors);
    }

    #[test]
    fn top_level_type_is_not_a_member() {
        let a = analyze("public class Foo { int a; }\n");
        assert_eq!(shape(&a), "{ a }");
    }

    #[test]
    fn nested_bodies_follow_their_member() {
        let a = analyze(
            r"
class Outer {
    int a;
    class Inner {
        int b;
    }
    void m() {}
}
",
        );
        assert_eq!(shape(&a), "{ a Inner { b } m }");
    }

    #[test]
    fn anonymous_and_local_classes_are_nested_bodies() {
        let a = analyze(
            r"
class Outer {
    Runnable r = new Runnable() {
        public void run() {}
    };
    void m() {
        class Local {
            int x;
        }
    }
}
",
        );
        assert_eq!(shape(&a), "{ r { run } m { x } }");
    }

    #[test]
    fn enum_members_come_from_body_declarations() {
        let a = analyze(
            r"
enum Color {
    RED {
        void paint() {}
    },
    GREEN;

    private final int rgb = 0;
    Color() {}
}
",
        );
        assert_eq!(shape(&a), "{ { paint } rgb Color }");
    }

    #[test]
    fn interface_and_annotation_members() {
        let a = analyze(
            r#"
interface Api {
    int VERSION = 1;
    void call();
}
@interface Marker {
    String value() default "";
}
"#,
        );
        assert_eq!(
            members(&a),
            vec![
                (Field, "VERSION".into(), String::new()),
                (Method, "call".into(), String::new()),
                (Method, "value".into(), String::new()),
            ]
        );
    }

    #[test]
    fn records_have_compact_constructors() {
        let a = analyze(
            r"
record Point(int x, int y) {
    static int ORIGIN = 0;
    Point {
    }
}
",
        );
        assert_eq!(
            members(&a)
                .into_iter()
                .map(|(c, _, _)| c)
                .collect::<Vec<_>>(),
            vec![Field, Constructor]
        );
    }

    #[test]
    fn annotation_arguments_are_flattened() {
        let a = analyze(
            r#"
class Foo {
    @SuppressWarnings(value = {"a", "b"}) private static final int X = 1;
    @Override
    public String toString() { return ""; }
    @Named("db") /* note */ protected Object source;
}
"#,
        );
        let texts: Vec<String> = members(&a).into_iter().map(|(_, _, t)| t).collect();
        insta::assert_debug_snapshot!(texts, @r#"
        [
            "@SuppressWarnings(value={\"a\",\"b\"}) private static final",
            "@Override public",
            "@Named(\"db\") protected",
        ]
        "#);
    }

    #[test]
    fn member_without_modifiers_has_none() {
        let a = analyze("class Foo { int a; }\n");
        let field = a.members().next().expect("field member");
        assert!(field.modifiers.is_none());
        assert_eq!(field.modifier_text(), "");
    }

    #[test]
    fn location_spans_to_member_name() {
        let src = "class Foo {\n    private int count = 0;\n}\n";
        let a = analyze(src);
        let field = a.members().next().expect("field member");
        assert_eq!(field.location.line, 2);
        assert_eq!(field.location.column, 5);
        let span = &src[field.location.offset..field.location.offset + field.location.length];
        assert_eq!(span, "private int count");
    }

    #[test]
    fn events_are_balanced() {
        let a = analyze(
            r"
class A { class B { class C { int x; } } Object o = new Object() { }; }
",
        );
        assert_eq!(a.body_count(), 4);
        let leaves = a
            .events
            .iter()
            .filter(|e| matches!(e, DeclEvent::LeaveBody))
            .count();
        assert_eq!(leaves, 4);
    }

    #[test]
    fn syntax_errors_are_tolerated() {
        let a = analyze("class Foo {\n    int a\n    void m() {}\n}\n");
        assert!(a.has_syntax_errors);
        let leaves = a
            .events
            .iter()
            .filter(|e| matches!(e, DeclEvent::LeaveBody))
            .count();
        assert_eq!(a.body_count(), leaves);
    }

    #[test]
    fn empty_source() {
        let a = analyze("");
        assert!(a.events.is_empty());
    }
}
