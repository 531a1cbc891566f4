//! The custom declaration order check.
//!
//! [`DeclarationOrderCheck`] holds the options and the parsed rule list. It
//! is immutable while files are checked and can be shared across threads;
//! each file gets its own [`OrderTraversal`].

use crate::matcher::Evaluation;
use crate::modifiers::{flatten_modifiers, ModifierNode};
use crate::rules::{MatchRule, MemberCategory, RuleList, RuleParseError, RuleParser};
use crate::scope::ScopeController;
use crate::types::{Label, Location, Severity, Suggestion, Violation};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Check code for declaration order violations.
pub const CODE: &str = "DO001";

/// Check name for declaration order violations.
pub const NAME: &str = "custom-declaration-order";

/// A member declaration as reported by a language front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    /// Syntactic category.
    pub category: MemberCategory,
    /// Declared name, when the front end can tell.
    pub name: Option<String>,
    /// Modifier list; `None` when the declaration has none.
    pub modifiers: Option<Vec<ModifierNode>>,
    /// Position of the declaration.
    pub location: Location,
}

impl MemberDecl {
    /// Creates a declaration without name or modifiers.
    #[must_use]
    pub fn new(category: MemberCategory, location: Location) -> Self {
        Self {
            category,
            name: None,
            modifiers: None,
            location,
        }
    }

    /// Sets the declared name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the modifier list.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<ModifierNode>) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Normalized modifier text matched by rule patterns.
    #[must_use]
    pub fn modifier_text(&self) -> String {
        flatten_modifiers(self.modifiers.as_deref())
    }
}

/// One tree-walk event, in depth-first source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclEvent {
    /// A structural unit body was entered.
    EnterBody,
    /// A member declaration of the innermost open body.
    Member(MemberDecl),
    /// The innermost open body ended.
    LeaveBody,
}

/// Options and rules for the declaration order check.
#[derive(Debug, Clone)]
pub struct DeclarationOrderCheck {
    rules: RuleList,
    ignore_case: bool,
    severity: Severity,
}

impl Default for DeclarationOrderCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationOrderCheck {
    /// Creates a check with no rules (disabled) and error severity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RuleList::new(),
            ignore_case: false,
            severity: Severity::Error,
        }
    }

    /// Returns the check code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        CODE
    }

    /// Returns the check name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        NAME
    }

    /// Returns a brief description of what this check enforces.
    #[must_use]
    pub fn description(&self) -> &'static str {
        "Enforces a configured order of fields, constructors, methods, and inner types"
    }

    /// Parses and installs the declaration order.
    ///
    /// Patterns are compiled with the case mode set so far.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleParseError`] for any malformed fragment; the previous
    /// rules are kept in that case.
    pub fn set_custom_declaration_order(&mut self, order: &str) -> Result<(), RuleParseError> {
        self.rules = RuleParser::new().ignore_case(self.ignore_case).parse(order)?;
        debug!(
            "Declaration order set with {} rule(s), ignore_case={}",
            self.rules.len(),
            self.ignore_case
        );
        Ok(())
    }

    /// Sets whether rule patterns ignore case.
    ///
    /// Rules already installed are recompiled; later calls to
    /// [`set_custom_declaration_order`](Self::set_custom_declaration_order)
    /// use this mode as their default.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleParseError`] if an existing pattern fails to recompile.
    pub fn set_ignore_regex_case(&mut self, ignore_case: bool) -> Result<(), RuleParseError> {
        self.rules.set_ignore_case(ignore_case)?;
        self.ignore_case = ignore_case;
        Ok(())
    }

    /// Sets the severity of reported violations.
    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    /// Builder form of [`set_custom_declaration_order`](Self::set_custom_declaration_order).
    ///
    /// # Errors
    ///
    /// See [`set_custom_declaration_order`](Self::set_custom_declaration_order).
    pub fn with_order(mut self, order: &str) -> Result<Self, RuleParseError> {
        self.set_custom_declaration_order(order)?;
        Ok(self)
    }

    /// Builder form of [`set_ignore_regex_case`](Self::set_ignore_regex_case).
    ///
    /// # Errors
    ///
    /// See [`set_ignore_regex_case`](Self::set_ignore_regex_case).
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Result<Self, RuleParseError> {
        self.set_ignore_regex_case(ignore_case)?;
        Ok(self)
    }

    /// Builder form of [`set_severity`](Self::set_severity).
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// The parsed rule list.
    #[must_use]
    pub fn rules(&self) -> &RuleList {
        &self.rules
    }

    /// Severity of reported violations.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether the rule patterns ignore case.
    #[must_use]
    pub fn ignores_case(&self) -> bool {
        self.ignore_case
    }

    /// Returns false when no order is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Whether members of `category` can match any rule.
    #[must_use]
    pub fn tracks(&self, category: MemberCategory) -> bool {
        self.rules.iter().any(|rule| rule.category() == category)
    }

    /// Starts checking one file.
    #[must_use]
    pub fn traversal(&self, file: &Path) -> OrderTraversal<'_> {
        OrderTraversal {
            check: self,
            file: file.to_path_buf(),
            scopes: ScopeController::new(&self.rules),
            violations: Vec::new(),
        }
    }

    /// Checks a complete event stream for one file.
    #[must_use]
    pub fn check_events<'e, I>(&self, file: &Path, events: I) -> Vec<Violation>
    where
        I: IntoIterator<Item = &'e DeclEvent>,
    {
        let mut traversal = self.traversal(file);
        for event in events {
            traversal.handle(event);
        }
        traversal.finish()
    }
}

/// Ordering state for a single file.
#[derive(Debug)]
pub struct OrderTraversal<'c> {
    check: &'c DeclarationOrderCheck,
    file: PathBuf,
    scopes: ScopeController<'c>,
    violations: Vec<Violation>,
}

impl OrderTraversal<'_> {
    /// Dispatches one event.
    pub fn handle(&mut self, event: &DeclEvent) {
        match event {
            DeclEvent::EnterBody => self.enter_body(),
            DeclEvent::Member(member) => self.visit_member(member),
            DeclEvent::LeaveBody => self.leave_body(),
        }
    }

    /// A structural unit body was entered.
    pub fn enter_body(&mut self) {
        self.scopes.enter_body();
    }

    /// The innermost structural unit body ended.
    pub fn leave_body(&mut self) {
        self.scopes.leave_body();
    }

    /// Evaluates a member of the innermost body.
    pub fn visit_member(&mut self, member: &MemberDecl) {
        if !self.check.tracks(member.category) {
            return;
        }

        let text = member.modifier_text();
        let outcome = self
            .scopes
            .on_member(member.category, &text, &member.location);

        if let Evaluation::Violation { rule, current } = outcome.evaluation {
            debug!(
                "{}:{}: {} matches rule #{} behind pointer #{} (modifiers: {:?})",
                self.file.display(),
                member.location.line,
                member.category,
                rule + 1,
                current + 1,
                text
            );
            let violation = self.build_violation(member, rule, current, outcome.anchor);
            self.violations.push(violation);
        }
    }

    /// Violations collected so far.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Ends the traversal and returns its violations.
    #[must_use]
    pub fn finish(self) -> Vec<Violation> {
        if self.scopes.depth() != 0 {
            debug!(
                "{}: traversal ended with {} open bodies",
                self.file.display(),
                self.scopes.depth()
            );
        }
        self.violations
    }

    fn build_violation(
        &self,
        member: &MemberDecl,
        rule: usize,
        current: usize,
        anchor: Option<Location>,
    ) -> Violation {
        let rules = self.check.rules();
        let matched = describe_rule(rules.get(rule), rule);
        let reached = describe_rule(rules.get(current), current);
        let subject = match &member.name {
            Some(name) => format!("{} `{name}`", member.category.describe()),
            None => member.category.describe().to_string(),
        };

        let location = member.location.clone().in_file(self.file.clone());
        let mut violation = Violation::new(
            CODE,
            NAME,
            self.check.severity,
            location,
            format!("Out-of-order {subject}: matches {matched} after {reached} was reached"),
        )
        .with_suggestion(Suggestion::new(format!(
            "Move this {} before the members matching {reached}",
            member.category.describe()
        )));

        if let Some(anchor) = anchor {
            violation = violation.with_label(Label::new(
                anchor.in_file(self.file.clone()),
                format!("{reached} reached here"),
            ));
        }

        violation
    }
}

fn describe_rule(rule: Option<&MatchRule>, index: usize) -> String {
    match rule {
        Some(rule) => format!("rule #{} `{rule}`", index + 1),
        None => format!("rule #{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::Annotation;
    use MemberCategory::{Constructor, Field, InnerType, Method};

    fn member(category: MemberCategory, line: usize, mods: &[&str]) -> DeclEvent {
        let decl = MemberDecl::new(category, Location::new(PathBuf::new(), line, 5));
        let decl = if mods.is_empty() {
            decl
        } else {
            decl.with_modifiers(mods.iter().map(|m| ModifierNode::keyword(*m)).collect())
        };
        DeclEvent::Member(decl)
    }

    fn check(order: &str) -> DeclarationOrderCheck {
        DeclarationOrderCheck::new()
            .with_order(order)
            .expect("order should parse")
    }

    fn run(check: &DeclarationOrderCheck, events: &[DeclEvent]) -> Vec<Violation> {
        check.check_events(Path::new("src/Foo.java"), events)
    }

    #[test]
    fn method_then_field_reports_one_violation() {
        let c = check("Field###Method");
        let events = [
            DeclEvent::EnterBody,
            member(Method, 2, &[]),
            member(Field, 3, &[]),
            DeclEvent::LeaveBody,
        ];
        let violations = run(&c, &events);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.code, CODE);
        assert_eq!(v.rule, NAME);
        assert_eq!(v.severity, Severity::Error);
        assert_eq!(v.location.line, 3);
        assert_eq!(v.location.file, PathBuf::from("src/Foo.java"));
        assert_eq!(
            v.message,
            "Out-of-order field: matches rule #1 `Field` after rule #2 `Method` was reached"
        );
        assert_eq!(v.labels.len(), 1);
        assert_eq!(v.labels[0].location.line, 2);
        assert_eq!(v.labels[0].message, "rule #2 `Method` reached here");
    }

    #[test]
    fn field_then_method_is_clean() {
        let c = check("Field###Method");
        let events = [
            DeclEvent::EnterBody,
            member(Field, 2, &[]),
            member(Method, 3, &[]),
            DeclEvent::LeaveBody,
        ];
        assert!(run(&c, &events).is_empty());
    }

    #[test]
    fn violation_message_includes_member_name() {
        let c = check("Field(static)###Field###Method");
        let late = MemberDecl::new(Field, Location::new(PathBuf::new(), 9, 5))
            .with_name("INSTANCE")
            .with_modifiers(vec![
                ModifierNode::keyword("private"),
                ModifierNode::keyword("static"),
            ]);
        let events = [
            DeclEvent::EnterBody,
            member(Field, 2, &["private"]),
            member(Method, 4, &["public"]),
            DeclEvent::Member(late),
            DeclEvent::LeaveBody,
        ];
        let violations = run(&c, &events);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Out-of-order field `INSTANCE`: matches rule #1 `Field(static)` \
             after rule #3 `Method` was reached"
        );
        assert_eq!(
            violations[0].suggestion.as_ref().map(|s| s.message.as_str()),
            Some("Move this field before the members matching rule #3 `Method`")
        );
    }

    #[test]
    fn all_violations_in_a_file_are_collected() {
        let c = check("Field###CTOR###Method");
        let events = [
            DeclEvent::EnterBody,
            member(Method, 1, &[]),
            member(Field, 2, &[]),
            member(Constructor, 3, &[]),
            member(Field, 4, &[]),
            member(Method, 5, &[]),
            DeclEvent::LeaveBody,
        ];
        let lines: Vec<usize> = run(&c, &events).iter().map(|v| v.location.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn nested_bodies_are_independent() {
        let c = check("Field###Method###InnerClass");
        let events = [
            DeclEvent::EnterBody,
            member(Field, 1, &[]),
            member(InnerType, 2, &["static"]),
            DeclEvent::EnterBody,
            member(Method, 3, &[]),
            member(Field, 4, &[]),
            DeclEvent::LeaveBody,
            member(InnerType, 6, &[]),
            DeclEvent::LeaveBody,
        ];
        let violations = run(&c, &events);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 4);
    }

    #[test]
    fn annotations_participate_in_matching() {
        let c = check("Field(@Inject)###Field###Method");
        let injected = MemberDecl::new(Field, Location::new(PathBuf::new(), 5, 5))
            .with_modifiers(vec![
                Annotation::marker("Inject").into(),
                ModifierNode::keyword("private"),
            ]);
        assert_eq!(injected.modifier_text(), "@Inject private");

        let events = [
            DeclEvent::EnterBody,
            member(Field, 2, &["private"]),
            member(Method, 3, &[]),
            DeclEvent::Member(injected),
            DeclEvent::LeaveBody,
        ];
        assert_eq!(run(&c, &events).len(), 1);
    }

    #[test]
    fn case_mode_applies_in_either_order() {
        let before = DeclarationOrderCheck::new()
            .with_ignore_case(true)
            .and_then(|c| c.with_order("Field(STATIC)###Method"))
            .expect("order should parse");
        let after = DeclarationOrderCheck::new()
            .with_order("Field(STATIC)###Method")
            .and_then(|c| c.with_ignore_case(true))
            .expect("order should parse");

        let events = [
            DeclEvent::EnterBody,
            member(Method, 1, &[]),
            member(Field, 2, &["static"]),
            DeclEvent::LeaveBody,
        ];
        assert_eq!(run(&before, &events).len(), 1);
        assert_eq!(run(&after, &events).len(), 1);

        let sensitive = check("Field(STATIC)###Method");
        assert!(run(&sensitive, &events).is_empty());
    }

    #[test]
    fn empty_order_disables_check() {
        let c = DeclarationOrderCheck::new();
        assert!(!c.is_enabled());
        let events = [
            DeclEvent::EnterBody,
            member(Method, 1, &[]),
            member(Field, 2, &[]),
            DeclEvent::LeaveBody,
        ];
        assert!(run(&c, &events).is_empty());
    }

    #[test]
    fn untracked_categories_are_skipped() {
        let c = check("Field###Method");
        assert!(c.tracks(Field));
        assert!(!c.tracks(Constructor));
        assert!(!c.tracks(InnerType));
    }

    #[test]
    fn bad_order_keeps_previous_rules() {
        let mut c = check("Field###Method");
        assert!(c.set_custom_declaration_order("Foo(x)").is_err());
        assert_eq!(c.rules().len(), 2);
    }

    #[test]
    fn severity_is_configurable() {
        let c = check("Field###Method").with_severity(Severity::Warning);
        let events = [
            DeclEvent::EnterBody,
            member(Method, 1, &[]),
            member(Field, 2, &[]),
            DeclEvent::LeaveBody,
        ];
        assert_eq!(run(&c, &events)[0].severity, Severity::Warning);
    }
}
