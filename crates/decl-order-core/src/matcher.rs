//! The order matching state machine.

use crate::rules::{MemberCategory, RuleList};

/// Ordering progress within one structural unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderState {
    current_index: usize,
}

impl OrderState {
    /// Creates a state pointing at the first rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the lowest rule not yet passed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }
}

/// Outcome of evaluating one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The declaration is in order. `rule` is the matched rule index, or
    /// `None` if no rule constrains this declaration.
    Pass {
        /// Index of the matched rule.
        rule: Option<usize>,
    },
    /// The declaration only matches rules that were already passed.
    Violation {
        /// Lowest matching rule index, below `current`.
        rule: usize,
        /// Current pointer at the time of the violation.
        current: usize,
    },
}

impl Evaluation {
    /// Returns true for [`Evaluation::Violation`].
    #[must_use]
    pub fn is_violation(self) -> bool {
        matches!(self, Self::Violation { .. })
    }
}

/// Evaluates declarations against an ordered rule list.
///
/// The matcher only reads the rule list; all progress lives in the
/// [`OrderState`] passed to [`OrderMatcher::evaluate`].
#[derive(Debug, Clone, Copy)]
pub struct OrderMatcher<'r> {
    rules: &'r RuleList,
}

impl<'r> OrderMatcher<'r> {
    /// Creates a matcher over `rules`.
    #[must_use]
    pub fn new(rules: &'r RuleList) -> Self {
        Self { rules }
    }

    /// Decides whether a declaration is in order and advances `state`.
    ///
    /// The first matching rule at or after the pointer wins and becomes the
    /// new pointer. If none matches there but an earlier rule does, the
    /// declaration is out of order and `state` is left untouched. A
    /// declaration that matches no rule always passes.
    pub fn evaluate(
        &self,
        category: MemberCategory,
        modifiers: &str,
        state: &mut OrderState,
    ) -> Evaluation {
        let current = state.current_index;

        if let Some(i) = self.first_match(current, self.rules.len(), category, modifiers) {
            state.current_index = i;
            return Evaluation::Pass { rule: Some(i) };
        }

        match self.first_match(0, current, category, modifiers) {
            Some(rule) => Evaluation::Violation { rule, current },
            None => Evaluation::Pass { rule: None },
        }
    }

    /// Lowest index in `[start, end)` whose rule matches.
    fn first_match(
        &self,
        start: usize,
        end: usize,
        category: MemberCategory,
        modifiers: &str,
    ) -> Option<usize> {
        self.rules
            .iter()
            .enumerate()
            .skip(start)
            .take(end.saturating_sub(start))
            .find(|(_, rule)| rule.matches(category, modifiers))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MemberCategory::{Constructor, Field, InnerType, Method};

    fn rules(order: &str) -> RuleList {
        RuleList::parse(order).expect("order should parse")
    }

    /// Runs a sequence through one state, returning the evaluations.
    fn run(rules: &RuleList, decls: &[(MemberCategory, &str)]) -> (Vec<Evaluation>, OrderState) {
        let matcher = OrderMatcher::new(rules);
        let mut state = OrderState::new();
        let evals = decls
            .iter()
            .map(|(cat, mods)| matcher.evaluate(*cat, mods, &mut state))
            .collect();
        (evals, state)
    }

    fn violations(evals: &[Evaluation]) -> usize {
        evals.iter().filter(|e| e.is_violation()).count()
    }

    #[test]
    fn bare_categories_in_order_pass() {
        let r = rules("Field###Method");
        let (evals, state) = run(&r, &[(Field, ""), (Method, "public")]);
        assert_eq!(violations(&evals), 0);
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn bare_categories_out_of_order_violate_once() {
        let r = rules("Field###Method");
        let (evals, _) = run(&r, &[(Method, ""), (Field, "")]);
        assert_eq!(
            evals,
            vec![
                Evaluation::Pass { rule: Some(1) },
                Evaluation::Violation { rule: 0, current: 1 },
            ]
        );
    }

    #[test]
    fn repeated_category_at_pointer_passes() {
        let r = rules("Field###CTOR###Method");
        let (evals, state) = run(
            &r,
            &[(Field, ""), (Field, ""), (Constructor, ""), (Method, ""), (Method, "")],
        );
        assert_eq!(violations(&evals), 0);
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn prefers_closest_forward_match() {
        // Both rule 1 and rule 3 match a static method; rule 1 must win.
        let r = rules("Field###Method(static)###CTOR###Method");
        let (evals, state) = run(&r, &[(Method, "public static")]);
        assert_eq!(evals, vec![Evaluation::Pass { rule: Some(1) }]);
        assert_eq!(state.current_index(), 1);

        // A constructor can still follow, then a plain method.
        let (evals, _) = run(
            &r,
            &[(Method, "public static"), (Constructor, ""), (Method, "public")],
        );
        assert_eq!(violations(&evals), 0);
    }

    #[test]
    fn later_rule_of_same_category_absorbs_member() {
        // Once the pointer sits on the plain `Method` rule, a static method
        // matches at the pointer even though `Method(static)` was skipped.
        let r = rules("Method(static)###Field###Method");
        let (evals, state) = run(&r, &[(Method, "public"), (Method, "static")]);
        assert_eq!(violations(&evals), 0);
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn static_field_after_instance_field_violates() {
        let r = rules("Field(static)###Field(private)###Method");
        let (evals, _) = run(
            &r,
            &[(Field, "private"), (Method, "public"), (Field, "private static")],
        );
        assert_eq!(
            evals[2],
            Evaluation::Violation { rule: 0, current: 2 },
            "static field after a method must be reported"
        );
    }

    #[test]
    fn unmatched_declarations_never_change_state() {
        let r = rules("Field(static)###Method(public)");
        let (evals, state) = run(
            &r,
            &[
                (Method, "public"),
                (InnerType, "private static"),
                (Constructor, ""),
                (Method, "private"),
            ],
        );
        assert_eq!(violations(&evals), 0);
        assert_eq!(evals[1], Evaluation::Pass { rule: None });
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn violation_does_not_move_pointer() {
        let r = rules("Field###CTOR###Method");
        let (evals, state) = run(
            &r,
            &[(Method, ""), (Field, ""), (Constructor, ""), (Method, "")],
        );
        assert_eq!(violations(&evals), 2);
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn pointer_is_monotonic() {
        let r = rules("Field(static)###Field###CTOR###Method(static)###Method###InnerClass");
        let decls = [
            (Field, "static"),
            (Method, ""),
            (Field, ""),
            (InnerType, ""),
            (Constructor, ""),
            (Method, "static"),
            (Field, "static"),
            (Method, ""),
        ];
        let matcher = OrderMatcher::new(&r);
        let mut state = OrderState::new();
        let mut last = state.current_index();
        for (cat, mods) in decls {
            matcher.evaluate(cat, mods, &mut state);
            assert!(state.current_index() >= last);
            last = state.current_index();
        }
    }

    #[test]
    fn empty_rule_list_accepts_everything() {
        let r = RuleList::new();
        let (evals, state) = run(&r, &[(Method, ""), (Field, ""), (InnerType, "")]);
        assert_eq!(violations(&evals), 0);
        assert_eq!(state.current_index(), 0);
    }
}
