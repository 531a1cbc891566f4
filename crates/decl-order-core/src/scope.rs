//! Per-body ordering state driven by enter/leave events.
//!
//! Every structural unit body (class, interface, enum, record, annotation,
//! anonymous class) gets its own [`OrderState`]. Nested bodies restart at the
//! first rule and never affect the enclosing body's progress.

use crate::matcher::{Evaluation, OrderMatcher, OrderState};
use crate::rules::{MemberCategory, RuleList};
use crate::types::Location;
use tracing::warn;

/// Ordering state of one open body.
#[derive(Debug, Clone, Default)]
struct ScopeFrame {
    state: OrderState,
    /// Member that moved the pointer to its current rule.
    anchor: Option<Location>,
}

/// Stack of open bodies, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a fresh state for a newly entered body.
    pub fn push(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    /// Pops the innermost state. Returns `None` if no body is open.
    pub fn pop(&mut self) -> Option<OrderState> {
        self.frames.pop().map(|frame| frame.state)
    }

    /// Number of open bodies.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost state, if any body is open.
    #[must_use]
    pub fn current(&self) -> Option<&OrderState> {
        self.frames.last().map(|frame| &frame.state)
    }

    fn top_mut(&mut self) -> Option<&mut ScopeFrame> {
        self.frames.last_mut()
    }
}

/// Result of evaluating one member inside its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOutcome {
    /// Matcher decision.
    pub evaluation: Evaluation,
    /// Member that reached the current rule, for violation context.
    pub anchor: Option<Location>,
}

/// Drives an [`OrderMatcher`] over one traversal.
///
/// The controller never fails. Events that arrive out of balance are
/// logged and tolerated.
#[derive(Debug)]
pub struct ScopeController<'r> {
    matcher: OrderMatcher<'r>,
    stack: ScopeStack,
}

impl<'r> ScopeController<'r> {
    /// Creates a controller with no open body.
    #[must_use]
    pub fn new(rules: &'r RuleList) -> Self {
        Self {
            matcher: OrderMatcher::new(rules),
            stack: ScopeStack::new(),
        }
    }

    /// Number of open bodies.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Handles entry into a structural unit body.
    pub fn enter_body(&mut self) {
        self.stack.push();
    }

    /// Handles exit from a structural unit body.
    pub fn leave_body(&mut self) {
        if self.stack.pop().is_none() {
            warn!("Body exit without a matching body entry; ignoring");
        }
    }

    /// Evaluates a member against the innermost body's state.
    pub fn on_member(
        &mut self,
        category: MemberCategory,
        modifiers: &str,
        location: &Location,
    ) -> MemberOutcome {
        let Some(frame) = self.stack.top_mut() else {
            warn!(
                "Member at {}:{} outside any body; evaluating in isolation",
                location.line, location.column
            );
            let mut detached = OrderState::new();
            return MemberOutcome {
                evaluation: self.matcher.evaluate(category, modifiers, &mut detached),
                anchor: None,
            };
        };

        let before = frame.state.current_index();
        let evaluation = self.matcher.evaluate(category, modifiers, &mut frame.state);

        if let Evaluation::Pass { rule: Some(i) } = evaluation {
            if i != before || frame.anchor.is_none() {
                frame.anchor = Some(location.clone());
            }
        }

        MemberOutcome {
            evaluation,
            anchor: frame.anchor.clone(),
        }
    }
}
