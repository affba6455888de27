use super::types::{Frame, Insets, LayoutDirection, Rule, RuleTable, SizeSpec, Subject};

/// Per-box layout metadata: declared constraints, the direction-resolved view
/// of them, margins, desired size and the edges computed by the last pass.
#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub margins: Insets,
    /// Anchor the box to the container edge when a pairing rule's anchor is
    /// missing or collapsed.
    pub align_with_parent_if_missing: bool,
    rtl_compatibility: bool,
    declared: RuleTable,
    resolved: RuleTable,
    version: u64,
    resolved_for: Option<(u64, LayoutDirection)>,
    pub(crate) left: Option<i32>,
    pub(crate) top: Option<i32>,
    pub(crate) right: Option<i32>,
    pub(crate) bottom: Option<i32>,
}

impl LayoutParams {
    pub fn new(width: SizeSpec, height: SizeSpec) -> Self {
        Self {
            width,
            height,
            margins: Insets::default(),
            align_with_parent_if_missing: false,
            rtl_compatibility: false,
            declared: RuleTable::new(),
            resolved: RuleTable::new(),
            version: 0,
            resolved_for: None,
            left: None,
            top: None,
            right: None,
            bottom: None,
        }
    }

    pub fn with_margins(mut self, margins: Insets) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_rule(mut self, rule: Rule, subject: impl Into<Subject>) -> Self {
        self.add_rule(rule, subject);
        self
    }

    pub fn add_rule(&mut self, rule: Rule, subject: impl Into<Subject>) {
        let subject = subject.into();
        let subject = if subject.is_set() { subject } else { Subject::Unset };
        self.declared.set(rule, subject);
        self.version += 1;
    }

    pub fn add_verb(&mut self, rule: Rule) {
        self.add_rule(rule, Subject::True);
    }

    pub fn remove_rule(&mut self, rule: Rule) {
        self.add_rule(rule, Subject::Unset);
    }

    /// Declared value of a rule, as authored.
    pub fn rule(&self, rule: Rule) -> Subject {
        self.declared.get(rule)
    }

    pub fn declared_rules(&self) -> &RuleTable {
        &self.declared
    }

    /// Direction-absolute rules from the last resolution. Start/end slots are
    /// always unset here.
    pub fn resolved_rules(&self) -> &RuleTable {
        &self.resolved
    }

    pub fn rtl_compatibility(&self) -> bool {
        self.rtl_compatibility
    }

    /// Legacy aliasing: explicit left/right rules win over start/end rules.
    pub fn set_rtl_compatibility(&mut self, enabled: bool) {
        if self.rtl_compatibility != enabled {
            self.rtl_compatibility = enabled;
            self.version += 1;
        }
    }

    pub fn needs_resolution(&self, direction: LayoutDirection) -> bool {
        self.resolved_for != Some((self.version, direction))
    }

    /// Recomputes the resolved table when the declared rules or the direction
    /// changed since the last call.
    pub fn resolve_rules(&mut self, direction: LayoutDirection) -> &RuleTable {
        if self.needs_resolution(direction) {
            self.resolved = resolve_rule_table(&self.declared, direction, self.rtl_compatibility);
            self.resolved_for = Some((self.version, direction));
        }
        &self.resolved
    }

    pub fn left(&self) -> Option<i32> {
        self.left
    }

    pub fn top(&self) -> Option<i32> {
        self.top
    }

    pub fn right(&self) -> Option<i32> {
        self.right
    }

    pub fn bottom(&self) -> Option<i32> {
        self.bottom
    }

    pub fn frame(&self) -> Option<Frame> {
        Some(Frame::new(self.left?, self.top?, self.right?, self.bottom?))
    }

    pub(crate) fn offset_horizontal(&mut self, delta: i32) {
        self.left = self.left.map(|left| left + delta);
        self.right = self.right.map(|right| right + delta);
    }

    pub(crate) fn offset_vertical(&mut self, delta: i32) {
        self.top = self.top.map(|top| top + delta);
        self.bottom = self.bottom.map(|bottom| bottom + delta);
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::new(SizeSpec::Wrap, SizeSpec::Wrap)
    }
}

// (start, end, left, right) for each rule family.
const RELATIVE_FAMILIES: [(Rule, Rule, Rule, Rule); 3] = [
    (Rule::AlignStart, Rule::AlignEnd, Rule::AlignLeft, Rule::AlignRight),
    (Rule::StartOf, Rule::EndOf, Rule::LeftOf, Rule::RightOf),
    (
        Rule::AlignParentStart,
        Rule::AlignParentEnd,
        Rule::AlignParentLeft,
        Rule::AlignParentRight,
    ),
];

pub fn resolve_rule_table(
    declared: &RuleTable,
    direction: LayoutDirection,
    rtl_compatibility: bool,
) -> RuleTable {
    let mut rules = *declared;
    let rtl = direction.is_rtl();

    for (start, end, left, right) in RELATIVE_FAMILIES {
        if rtl_compatibility {
            if rules.has(start) {
                if !rules.has(left) {
                    rules[left] = rules[start];
                }
                rules[start] = Subject::Unset;
            }
            if rules.has(end) {
                if !rules.has(right) {
                    rules[right] = rules[end];
                }
                rules[end] = Subject::Unset;
            }
            continue;
        }

        if (rules.has(start) || rules.has(end)) && (rules.has(left) || rules.has(right)) {
            rules[left] = Subject::Unset;
            rules[right] = Subject::Unset;
        }
        if rules.has(start) {
            let target = if rtl { right } else { left };
            rules[target] = rules[start];
            rules[start] = Subject::Unset;
        }
        if rules.has(end) {
            let target = if rtl { left } else { right };
            rules[target] = rules[end];
            rules[end] = Subject::Unset;
        }
    }

    rules
}
