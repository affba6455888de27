use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Identifier of a box inside one container. Ids are positive; a box with no
/// id can be positioned but never used as an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(pub u32);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const RULE_COUNT: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    LeftOf,
    RightOf,
    Above,
    Below,
    AlignBaseline,
    AlignLeft,
    AlignTop,
    AlignRight,
    AlignBottom,
    AlignParentLeft,
    AlignParentTop,
    AlignParentRight,
    AlignParentBottom,
    #[serde(alias = "center")]
    CenterInParent,
    CenterHorizontal,
    CenterVertical,
    StartOf,
    EndOf,
    AlignStart,
    AlignEnd,
    AlignParentStart,
    AlignParentEnd,
}

impl Rule {
    pub const ALL: [Rule; RULE_COUNT] = [
        Rule::LeftOf,
        Rule::RightOf,
        Rule::Above,
        Rule::Below,
        Rule::AlignBaseline,
        Rule::AlignLeft,
        Rule::AlignTop,
        Rule::AlignRight,
        Rule::AlignBottom,
        Rule::AlignParentLeft,
        Rule::AlignParentTop,
        Rule::AlignParentRight,
        Rule::AlignParentBottom,
        Rule::CenterInParent,
        Rule::CenterHorizontal,
        Rule::CenterVertical,
        Rule::StartOf,
        Rule::EndOf,
        Rule::AlignStart,
        Rule::AlignEnd,
        Rule::AlignParentStart,
        Rule::AlignParentEnd,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let rule = match token {
            "leftOf" | "toLeftOf" => Rule::LeftOf,
            "rightOf" | "toRightOf" => Rule::RightOf,
            "above" => Rule::Above,
            "below" => Rule::Below,
            "alignBaseline" => Rule::AlignBaseline,
            "alignLeft" => Rule::AlignLeft,
            "alignTop" => Rule::AlignTop,
            "alignRight" => Rule::AlignRight,
            "alignBottom" => Rule::AlignBottom,
            "alignParentLeft" => Rule::AlignParentLeft,
            "alignParentTop" => Rule::AlignParentTop,
            "alignParentRight" => Rule::AlignParentRight,
            "alignParentBottom" => Rule::AlignParentBottom,
            "center" | "centerInParent" => Rule::CenterInParent,
            "centerHorizontal" => Rule::CenterHorizontal,
            "centerVertical" => Rule::CenterVertical,
            "startOf" | "toStartOf" => Rule::StartOf,
            "endOf" | "toEndOf" => Rule::EndOf,
            "alignStart" => Rule::AlignStart,
            "alignEnd" => Rule::AlignEnd,
            "alignParentStart" => Rule::AlignParentStart,
            "alignParentEnd" => Rule::AlignParentEnd,
            _ => return None,
        };
        Some(rule)
    }

    /// Rules whose value names a sibling box.
    pub fn takes_anchor(self) -> bool {
        matches!(
            self,
            Rule::LeftOf
                | Rule::RightOf
                | Rule::Above
                | Rule::Below
                | Rule::AlignBaseline
                | Rule::AlignLeft
                | Rule::AlignTop
                | Rule::AlignRight
                | Rule::AlignBottom
                | Rule::StartOf
                | Rule::EndOf
                | Rule::AlignStart
                | Rule::AlignEnd
        )
    }

    /// Start/end rules that only mean something once a direction is known.
    pub fn is_relative(self) -> bool {
        matches!(
            self,
            Rule::StartOf
                | Rule::EndOf
                | Rule::AlignStart
                | Rule::AlignEnd
                | Rule::AlignParentStart
                | Rule::AlignParentEnd
        )
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::LeftOf => "leftOf",
            Rule::RightOf => "rightOf",
            Rule::Above => "above",
            Rule::Below => "below",
            Rule::AlignBaseline => "alignBaseline",
            Rule::AlignLeft => "alignLeft",
            Rule::AlignTop => "alignTop",
            Rule::AlignRight => "alignRight",
            Rule::AlignBottom => "alignBottom",
            Rule::AlignParentLeft => "alignParentLeft",
            Rule::AlignParentTop => "alignParentTop",
            Rule::AlignParentRight => "alignParentRight",
            Rule::AlignParentBottom => "alignParentBottom",
            Rule::CenterInParent => "centerInParent",
            Rule::CenterHorizontal => "centerHorizontal",
            Rule::CenterVertical => "centerVertical",
            Rule::StartOf => "startOf",
            Rule::EndOf => "endOf",
            Rule::AlignStart => "alignStart",
            Rule::AlignEnd => "alignEnd",
            Rule::AlignParentStart => "alignParentStart",
            Rule::AlignParentEnd => "alignParentEnd",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Pairing rules that create dependency edges along this axis.
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Axis::Horizontal => &[
                Rule::LeftOf,
                Rule::RightOf,
                Rule::AlignLeft,
                Rule::AlignRight,
                Rule::StartOf,
                Rule::EndOf,
                Rule::AlignStart,
                Rule::AlignEnd,
            ],
            Axis::Vertical => &[
                Rule::Above,
                Rule::Below,
                Rule::AlignBaseline,
                Rule::AlignTop,
                Rule::AlignBottom,
            ],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Value of one rule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subject {
    #[default]
    Unset,
    True,
    Anchor(BoxId),
}

impl Subject {
    /// Maps the classic integer encoding: 0 is unset, -1 is `TRUE`, positive
    /// values are box ids.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Subject::Unset,
            raw if raw < 0 => Subject::True,
            raw => u32::try_from(raw).map_or(Subject::True, |id| Subject::Anchor(BoxId(id))),
        }
    }

    /// An anchor on id 0 is the same as no rule at all.
    pub fn is_set(self) -> bool {
        !matches!(self, Subject::Unset | Subject::Anchor(BoxId(0)))
    }

    pub fn anchor(self) -> Option<BoxId> {
        match self {
            Subject::Anchor(id) if id.0 > 0 => Some(id),
            _ => None,
        }
    }
}

impl From<bool> for Subject {
    fn from(value: bool) -> Self {
        if value { Subject::True } else { Subject::Unset }
    }
}

impl From<BoxId> for Subject {
    fn from(id: BoxId) -> Self {
        if id.0 == 0 {
            Subject::Unset
        } else {
            Subject::Anchor(id)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleTable([Subject; RULE_COUNT]);

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rule: Rule) -> Subject {
        self.0[rule.index()]
    }

    pub fn set(&mut self, rule: Rule, subject: Subject) {
        self.0[rule.index()] = subject;
    }

    pub fn has(&self, rule: Rule) -> bool {
        self.get(rule).is_set()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rule, Subject)> + '_ {
        Rule::ALL
            .iter()
            .map(|rule| (*rule, self.get(*rule)))
            .filter(|(_, subject)| subject.is_set())
    }

    pub fn has_relative_rules(&self) -> bool {
        self.iter().any(|(rule, _)| rule.is_relative())
    }
}

impl Index<Rule> for RuleTable {
    type Output = Subject;

    fn index(&self, rule: Rule) -> &Subject {
        &self.0[rule.index()]
    }
}

impl IndexMut<Rule> for RuleTable {
    fn index_mut(&mut self, rule: Rule) -> &mut Subject {
        &mut self.0[rule.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

impl LayoutDirection {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "LTR" => Some(Self::Ltr),
            "RTL" => Some(Self::Rtl),
            _ => None,
        }
    }

    pub fn is_rtl(self) -> bool {
        self == LayoutDirection::Rtl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Invisible,
    Gone,
}

impl Visibility {
    pub fn is_gone(self) -> bool {
        self == Visibility::Gone
    }
}

/// Desired size of a box along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeSpec {
    Exact(i32),
    Fill,
    #[default]
    Wrap,
}

impl SizeSpec {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "fill" | "match_parent" | "fill_parent" => Some(SizeSpec::Fill),
            "wrap" | "wrap_content" => Some(SizeSpec::Wrap),
            other => other
                .parse::<i32>()
                .ok()
                .filter(|size| *size >= 0)
                .map(SizeSpec::Exact),
        }
    }

    pub fn exact(self) -> Option<i32> {
        match self {
            SizeSpec::Exact(size) if size >= 0 => Some(size),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Final edges of a box in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Frame {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasureMode {
    Exactly,
    AtMost,
    Unspecified,
}

/// Directive handed to a box when it is measured along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub mode: MeasureMode,
    pub size: i32,
}

impl MeasureSpec {
    pub fn exactly(size: i32) -> Self {
        Self {
            mode: MeasureMode::Exactly,
            size,
        }
    }

    pub fn at_most(size: i32) -> Self {
        Self {
            mode: MeasureMode::AtMost,
            size,
        }
    }

    pub fn unspecified() -> Self {
        Self {
            mode: MeasureMode::Unspecified,
            size: 0,
        }
    }

    /// Resolves a content size against this directive, the way a leaf box
    /// answers a measure request.
    pub fn constrain(self, content: i32) -> i32 {
        match self.mode {
            MeasureMode::Exactly => self.size,
            MeasureMode::AtMost => content.min(self.size),
            MeasureMode::Unspecified => content,
        }
    }
}

impl fmt::Display for MeasureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            MeasureMode::Exactly => write!(f, "exactly {}", self.size),
            MeasureMode::AtMost => write!(f, "at most {}", self.size),
            MeasureMode::Unspecified => f.write_str("unspecified"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_from_raw_matches_classic_encoding() {
        assert_eq!(Subject::from_raw(0), Subject::Unset);
        assert_eq!(Subject::from_raw(-1), Subject::True);
        assert_eq!(Subject::from_raw(7), Subject::Anchor(BoxId(7)));
        assert_eq!(Subject::True.anchor(), None);
        assert_eq!(Subject::Anchor(BoxId(0)).anchor(), None);
    }

    #[test]
    fn anchor_on_id_zero_is_unset() {
        assert_eq!(Subject::from(BoxId(0)), Subject::Unset);
        assert!(!Subject::Anchor(BoxId(0)).is_set());

        let mut table = RuleTable::new();
        table.set(Rule::LeftOf, Subject::Anchor(BoxId(0)));
        assert!(!table.has(Rule::LeftOf));
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn axis_rule_sets_are_disjoint_and_anchor_only() {
        for rule in Axis::Horizontal.rules() {
            assert!(rule.takes_anchor());
            assert!(!Axis::Vertical.rules().contains(rule));
        }
        for rule in Axis::Vertical.rules() {
            assert!(rule.takes_anchor());
        }
        let anchored = Rule::ALL.iter().filter(|rule| rule.takes_anchor()).count();
        assert_eq!(
            anchored,
            Axis::Horizontal.rules().len() + Axis::Vertical.rules().len()
        );
    }

    #[test]
    fn rule_tokens_round_trip_through_display() {
        for rule in Rule::ALL {
            assert_eq!(Rule::from_token(&rule.to_string()), Some(rule));
        }
        assert_eq!(Rule::from_token("center"), Some(Rule::CenterInParent));
        assert_eq!(Rule::from_token("nowhere"), None);
    }

    #[test]
    fn measure_spec_constrains_content() {
        assert_eq!(MeasureSpec::exactly(40).constrain(100), 40);
        assert_eq!(MeasureSpec::at_most(40).constrain(100), 40);
        assert_eq!(MeasureSpec::at_most(400).constrain(100), 100);
        assert_eq!(MeasureSpec::unspecified().constrain(100), 100);
    }
}
