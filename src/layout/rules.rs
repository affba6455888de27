use super::params::LayoutParams;
use super::ranking::DependencyGraph;
use super::types::{Insets, Rule, RuleTable};
use super::{ConstrainedBox, MeasurableHost};

/// Shared inputs of the edge rules for one measure pass.
pub(super) struct RuleContext<'a, H: MeasurableHost> {
    pub host: &'a H,
    pub graph: &'a DependencyGraph,
    pub padding: Insets,
}

impl<H: MeasurableHost> RuleContext<'_, H> {
    /// First non-gone box reached through `rule`, following collapsed anchors
    /// through their own rule of the same kind.
    pub fn related_box(&self, rules: &RuleTable, rule: Rule) -> Option<usize> {
        let mut anchor = rules.get(rule).anchor()?;
        // a chain of gone boxes can loop; every child is visited at most once
        for _ in 0..=self.host.child_count() {
            let index = self.graph.lookup(anchor)?;
            let child = self.host.child(index);
            if !child.visibility().is_gone() {
                return Some(index);
            }
            anchor = child.params().resolved_rules().get(rule).anchor()?;
        }
        None
    }

    fn anchor_params(&self, rules: &RuleTable, rule: Rule) -> Option<&LayoutParams> {
        self.related_box(rules, rule)
            .map(|index| self.host.child(index).params())
    }

    /// Left and right edges of child `index`. `my_width` is `None` while the
    /// container width is unbounded.
    pub fn horizontal_edges(&self, index: usize, my_width: Option<i32>) -> (Option<i32>, Option<i32>) {
        let params = self.host.child(index).params();
        let rules = params.resolved_rules();
        let margins = params.margins;
        let fallback = params.align_with_parent_if_missing;
        let start_edge = self.padding.left + margins.left;
        let end_edge = my_width.map(|width| width - self.padding.right - margins.right);

        let mut left = None;
        let mut right = None;

        if let Some(anchor) = self.anchor_params(rules, Rule::LeftOf) {
            right = anchor
                .left
                .map(|edge| edge - (anchor.margins.left + margins.right));
        } else if fallback && rules.has(Rule::LeftOf) && end_edge.is_some() {
            right = end_edge;
        }

        if let Some(anchor) = self.anchor_params(rules, Rule::RightOf) {
            left = anchor
                .right
                .map(|edge| edge + (anchor.margins.right + margins.left));
        } else if fallback && rules.has(Rule::RightOf) {
            left = Some(start_edge);
        }

        if let Some(anchor) = self.anchor_params(rules, Rule::AlignLeft) {
            left = anchor.left.map(|edge| edge + margins.left);
        } else if fallback && rules.has(Rule::AlignLeft) {
            left = Some(start_edge);
        }

        if let Some(anchor) = self.anchor_params(rules, Rule::AlignRight) {
            right = anchor.right.map(|edge| edge - margins.right);
        } else if fallback && rules.has(Rule::AlignRight) && end_edge.is_some() {
            right = end_edge;
        }

        if rules.has(Rule::AlignParentLeft) {
            left = Some(start_edge);
        }
        if rules.has(Rule::AlignParentRight) && end_edge.is_some() {
            right = end_edge;
        }

        (left, right)
    }

    /// Top and bottom edges of child `index`. Baseline alignment wins over
    /// every other vertical rule and leaves the bottom edge open.
    pub fn vertical_edges(
        &self,
        index: usize,
        my_height: Option<i32>,
        own_baseline: Option<i32>,
    ) -> (Option<i32>, Option<i32>) {
        let params = self.host.child(index).params();
        let rules = params.resolved_rules();

        if let Some(offset) = self.baseline_offset(rules) {
            let top = match own_baseline {
                Some(baseline) => offset - baseline,
                None => offset,
            };
            return (Some(top), None);
        }

        let margins = params.margins;
        let fallback = params.align_with_parent_if_missing;
        let start_edge = self.padding.top + margins.top;
        let end_edge = my_height.map(|height| height - self.padding.bottom - margins.bottom);

        let mut top = None;
        let mut bottom = None;

        if let Some(anchor) = self.anchor_params(rules, Rule::Above) {
            bottom = anchor
                .top
                .map(|edge| edge - (anchor.margins.top + margins.bottom));
        } else if fallback && rules.has(Rule::Above) && end_edge.is_some() {
            bottom = end_edge;
        }

        if let Some(anchor) = self.anchor_params(rules, Rule::Below) {
            top = anchor
                .bottom
                .map(|edge| edge + (anchor.margins.bottom + margins.top));
        } else if fallback && rules.has(Rule::Below) {
            top = Some(start_edge);
        }

        if let Some(anchor) = self.anchor_params(rules, Rule::AlignTop) {
            top = anchor.top.map(|edge| edge + margins.top);
        } else if fallback && rules.has(Rule::AlignTop) {
            top = Some(start_edge);
        }

        if let Some(anchor) = self.anchor_params(rules, Rule::AlignBottom) {
            bottom = anchor.bottom.map(|edge| edge - margins.bottom);
        } else if fallback && rules.has(Rule::AlignBottom) && end_edge.is_some() {
            bottom = end_edge;
        }

        if rules.has(Rule::AlignParentTop) {
            top = Some(start_edge);
        }
        if rules.has(Rule::AlignParentBottom) && end_edge.is_some() {
            bottom = end_edge;
        }

        (top, bottom)
    }

    fn baseline_offset(&self, rules: &RuleTable) -> Option<i32> {
        let index = self.related_box(rules, Rule::AlignBaseline)?;
        let anchor = self.host.child(index);
        let baseline = anchor.baseline()?;
        anchor.params().top.map(|top| top + baseline)
    }
}
