mod error;
mod gravity;
mod measure;
mod params;
mod ranking;
mod rules;
pub(crate) mod types;

pub use error::{LayoutError, UnresolvedBox};
pub use gravity::{Gravity, HorizontalGravity, VerticalGravity};
pub use params::{LayoutParams, resolve_rule_table};
pub use ranking::DependencyGraph;
pub use types::*;

use measure::{AxisConstraint, child_measure_spec, horizontal_pass_height_spec};
use rules::RuleContext;

use crate::config::ContainerConfig;
use tracing::debug;

/// Width assumed by an RTL container measured without a width bound. Children
/// are laid out against it and shifted back once the real width is known.
pub const DEFAULT_WIDTH: i32 = 0x10000;

/// A box the solver can position.
pub trait ConstrainedBox {
    fn id(&self) -> Option<BoxId>;

    fn visibility(&self) -> Visibility {
        Visibility::Visible
    }

    fn params(&self) -> &LayoutParams;

    fn params_mut(&mut self) -> &mut LayoutParams;

    fn measure(&mut self, width: MeasureSpec, height: MeasureSpec);

    /// Size chosen by the last `measure` call.
    fn measured_size(&self) -> Size;

    /// Distance from the top edge to the text baseline, if the box has one.
    fn baseline(&self) -> Option<i32> {
        None
    }

    fn layout(&mut self, _frame: Frame) {}
}

/// Ordered children with stable indices. `child` and `child_mut` are only
/// called with indices below `child_count`.
pub trait MeasurableHost {
    type Child: ConstrainedBox;

    fn child_count(&self) -> usize;

    fn child(&self, index: usize) -> &Self::Child;

    fn child_mut(&mut self, index: usize) -> &mut Self::Child;
}

impl<C: ConstrainedBox> MeasurableHost for Vec<C> {
    type Child = C;

    fn child_count(&self) -> usize {
        self.len()
    }

    fn child(&self, index: usize) -> &C {
        &self[index]
    }

    fn child_mut(&mut self, index: usize) -> &mut C {
        &mut self[index]
    }
}

/// Relative-positioning container: resolves per-child rules into frames.
pub struct RelativeLayout<H: MeasurableHost> {
    host: H,
    config: ContainerConfig,
    graph: DependencyGraph,
    sorted_horizontal: Vec<usize>,
    sorted_vertical: Vec<usize>,
    dirty_hierarchy: bool,
    baseline_child: Option<usize>,
    measured: Option<Size>,
}

impl<H: MeasurableHost> RelativeLayout<H> {
    pub fn new(host: H, config: ContainerConfig) -> Self {
        Self {
            host,
            config,
            graph: DependencyGraph::new(),
            sorted_horizontal: Vec::new(),
            sorted_vertical: Vec::new(),
            dirty_hierarchy: true,
            baseline_child: None,
            measured: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the children. The cached orderings are dropped since
    /// the child set may change.
    pub fn host_mut(&mut self) -> &mut H {
        self.invalidate();
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn set_direction(&mut self, direction: LayoutDirection) {
        if self.config.direction != direction {
            self.config.direction = direction;
            self.invalidate();
        }
    }

    pub fn set_padding(&mut self, padding: Insets) {
        self.config.padding = padding;
    }

    pub fn set_minimum_size(&mut self, width: i32, height: i32) {
        self.config.min_width = width;
        self.config.min_height = height;
    }

    pub fn set_gravity(&mut self, gravity: Gravity) {
        self.config.gravity = gravity;
    }

    pub fn set_horizontal_gravity(&mut self, gravity: HorizontalGravity) {
        self.config.gravity.horizontal = gravity;
    }

    pub fn set_vertical_gravity(&mut self, gravity: VerticalGravity) {
        self.config.gravity.vertical = gravity;
    }

    /// Box left out of the gravity shift.
    pub fn set_ignore_gravity(&mut self, id: Option<BoxId>) {
        self.config.ignore_gravity = id;
    }

    /// Forces the next `measure` to rebuild both orderings.
    pub fn invalidate(&mut self) {
        self.dirty_hierarchy = true;
        self.measured = None;
    }

    pub fn add_rule(
        &mut self,
        index: usize,
        rule: Rule,
        subject: impl Into<Subject>,
    ) -> Result<(), LayoutError> {
        self.check_index(index)?;
        self.host
            .child_mut(index)
            .params_mut()
            .add_rule(rule, subject);
        self.invalidate();
        Ok(())
    }

    pub fn remove_rule(&mut self, index: usize, rule: Rule) -> Result<(), LayoutError> {
        self.add_rule(index, rule, Subject::Unset)
    }

    /// Declared (not direction-resolved) value of a child's rule.
    pub fn rule(&self, index: usize, rule: Rule) -> Result<Subject, LayoutError> {
        self.check_index(index)?;
        Ok(self.host.child(index).params().rule(rule))
    }

    pub fn index_of(&self, id: BoxId) -> Option<usize> {
        (0..self.host.child_count()).find(|index| self.host.child(*index).id() == Some(id))
    }

    /// Evaluation order of the last successful sort for `axis`.
    pub fn sorted_children(&self, axis: Axis) -> &[usize] {
        match axis {
            Axis::Horizontal => &self.sorted_horizontal,
            Axis::Vertical => &self.sorted_vertical,
        }
    }

    pub fn measured_size(&self) -> Option<Size> {
        self.measured
    }

    /// Child whose baseline the container reports.
    pub fn baseline_child(&self) -> Option<usize> {
        self.baseline_child
    }

    pub fn baseline(&self) -> Option<i32> {
        self.baseline_child
            .and_then(|index| self.host.child(index).baseline())
    }

    /// Frame of a visible child after a successful `measure`.
    pub fn child_frame(&self, index: usize) -> Option<Frame> {
        if self.measured.is_none() || index >= self.host.child_count() {
            return None;
        }
        let child = self.host.child(index);
        if child.visibility().is_gone() {
            return None;
        }
        child.params().frame()
    }

    /// Hands every visible child its frame from the last `measure`.
    pub fn layout(&mut self) {
        if self.measured.is_none() {
            return;
        }
        for index in 0..self.host.child_count() {
            let child = self.host.child_mut(index);
            if child.visibility().is_gone() {
                continue;
            }
            if let Some(frame) = child.params().frame() {
                child.layout(frame);
            }
        }
    }

    pub fn measure(
        &mut self,
        width_spec: MeasureSpec,
        height_spec: MeasureSpec,
    ) -> Result<Size, LayoutError> {
        self.measured = None;
        self.baseline_child = None;

        let config = self.config;
        let direction = config.direction;
        let rtl = direction.is_rtl();
        let padding = config.padding;
        let compat = config.compat;
        let broken_specs = compat.allow_broken_measure_specs();
        let count = self.host.child_count();

        let mut rules_changed = false;
        for index in 0..count {
            let params = self.host.child_mut(index).params_mut();
            if params.needs_resolution(direction) {
                params.resolve_rules(direction);
                rules_changed = true;
            }
        }
        if rules_changed || self.dirty_hierarchy || self.graph.len() != count {
            self.sort_children()?;
        }

        let mut my_width = (width_spec.mode != MeasureMode::Unspecified).then_some(width_spec.size);
        let my_height = (height_spec.mode != MeasureMode::Unspecified).then_some(height_spec.size);
        let mut width = if width_spec.mode == MeasureMode::Exactly {
            width_spec.size
        } else {
            0
        };
        let mut height = if height_spec.mode == MeasureMode::Exactly {
            height_spec.size
        } else {
            0
        };

        let horizontal_gravity = config.gravity.is_horizontal_active();
        let vertical_gravity = config.gravity.is_vertical_active();
        let ignore = if horizontal_gravity || vertical_gravity {
            config.ignore_gravity.and_then(|id| self.index_of(id))
        } else {
            None
        };

        let wrap_width = width_spec.mode != MeasureMode::Exactly;
        let wrap_height = height_spec.mode != MeasureMode::Exactly;
        if rtl && my_width.is_none() {
            my_width = Some(DEFAULT_WIDTH);
        }
        let assumed_width = my_width.unwrap_or(DEFAULT_WIDTH);

        let mut offset_horizontal = false;
        let mut offset_vertical = false;

        for &index in &self.sorted_horizontal {
            if self.host.child(index).visibility().is_gone() {
                continue;
            }
            let (left, right) = RuleContext {
                host: &self.host,
                graph: &self.graph,
                padding,
            }
            .horizontal_edges(index, my_width);

            let child = self.host.child_mut(index);
            let params = child.params_mut();
            params.left = left;
            params.right = right;

            let child_width = child_measure_spec(
                &AxisConstraint::horizontal(child.params(), &padding),
                my_width,
                broken_specs,
            );
            let child_height = horizontal_pass_height_spec(child.params(), my_height, &padding, &compat);
            child.measure(child_width, child_height);

            if position_horizontal(child, &padding, my_width, wrap_width, rtl) {
                offset_horizontal = true;
            }
        }

        let mut bounds_left = i32::MAX;
        let mut bounds_top = i32::MAX;
        let mut bounds_right = i32::MIN;
        let mut bounds_bottom = i32::MIN;
        let include_margins = compat.wrap_content_includes_margins();

        for &index in &self.sorted_vertical {
            if self.host.child(index).visibility().is_gone() {
                continue;
            }
            let own_baseline = self.host.child(index).baseline();
            let (top, bottom) = RuleContext {
                host: &self.host,
                graph: &self.graph,
                padding,
            }
            .vertical_edges(index, my_height, own_baseline);

            let child = self.host.child_mut(index);
            let params = child.params_mut();
            params.top = top;
            params.bottom = bottom;

            let child_width = child_measure_spec(
                &AxisConstraint::horizontal(child.params(), &padding),
                my_width,
                broken_specs,
            );
            let child_height = child_measure_spec(
                &AxisConstraint::vertical(child.params(), &padding),
                my_height,
                broken_specs,
            );
            child.measure(child_width, child_height);

            if position_vertical(child, &padding, my_height, wrap_height) {
                offset_vertical = true;
            }

            let params = child.params();
            let margins = params.margins;
            let Some(frame) = params.frame() else {
                continue;
            };

            if wrap_width {
                let extent = match (rtl, include_margins) {
                    (true, true) => assumed_width - frame.left - margins.left,
                    (true, false) => assumed_width - frame.left,
                    (false, true) => frame.right + margins.right,
                    (false, false) => frame.right,
                };
                width = width.max(extent);
            }
            if wrap_height {
                let extent = if include_margins {
                    frame.bottom + margins.bottom
                } else {
                    frame.bottom
                };
                height = height.max(extent);
            }

            if Some(index) != ignore || vertical_gravity {
                bounds_left = bounds_left.min(frame.left - margins.left);
                bounds_top = bounds_top.min(frame.top - margins.top);
            }
            if Some(index) != ignore || horizontal_gravity {
                bounds_right = bounds_right.max(frame.right + margins.right);
                bounds_bottom = bounds_bottom.max(frame.bottom + margins.bottom);
            }
        }

        // top-most, then left-most; RTL offsets come later so left is the start edge
        let mut baseline_key: Option<(i32, i32)> = None;
        for &index in &self.sorted_vertical {
            let child = self.host.child(index);
            if child.visibility().is_gone() {
                continue;
            }
            let Some(frame) = child.params().frame() else {
                continue;
            };
            let key = (frame.top, frame.left);
            if baseline_key.is_none_or(|best| key < best) {
                baseline_key = Some(key);
                self.baseline_child = Some(index);
            }
        }

        if wrap_width {
            // the running width already holds the left padding
            width += padding.right;
            if let Some(declared) = config.width.exact() {
                width = width.max(declared);
            }
            width = width.max(config.min_width);
            width = width_spec.constrain(width);

            if offset_horizontal {
                for &index in &self.sorted_vertical {
                    let child = self.host.child_mut(index);
                    if child.visibility().is_gone() {
                        continue;
                    }
                    let measured = child.measured_size().width;
                    let params = child.params_mut();
                    let rules = *params.resolved_rules();
                    if rules.has(Rule::CenterInParent) || rules.has(Rule::CenterHorizontal) {
                        center(&mut params.left, &mut params.right, measured, width);
                    } else if rules.has(Rule::AlignParentRight) {
                        let left = width - padding.right - measured;
                        params.left = Some(left);
                        params.right = Some(left + measured);
                    }
                }
            }
        }

        if wrap_height {
            height += padding.bottom;
            if let Some(declared) = config.height.exact() {
                height = height.max(declared);
            }
            height = height.max(config.min_height);
            height = height_spec.constrain(height);

            if offset_vertical {
                for &index in &self.sorted_vertical {
                    let child = self.host.child_mut(index);
                    if child.visibility().is_gone() {
                        continue;
                    }
                    let measured = child.measured_size().height;
                    let params = child.params_mut();
                    let rules = *params.resolved_rules();
                    if rules.has(Rule::CenterInParent) || rules.has(Rule::CenterVertical) {
                        center(&mut params.top, &mut params.bottom, measured, height);
                    } else if rules.has(Rule::AlignParentBottom) {
                        let top = height - padding.bottom - measured;
                        params.top = Some(top);
                        params.bottom = Some(top + measured);
                    }
                }
            }
        }

        if (horizontal_gravity || vertical_gravity)
            && bounds_left <= bounds_right
            && bounds_top <= bounds_bottom
        {
            let self_bounds = Frame::new(
                padding.left,
                padding.top,
                width - padding.right,
                height - padding.bottom,
            );
            let content = config.gravity.apply(
                bounds_right - bounds_left,
                bounds_bottom - bounds_top,
                self_bounds,
                direction,
            );
            let dx = content.left - bounds_left;
            let dy = content.top - bounds_top;
            if dx != 0 || dy != 0 {
                for &index in &self.sorted_vertical {
                    let child = self.host.child_mut(index);
                    if child.visibility().is_gone() || Some(index) == ignore {
                        continue;
                    }
                    let params = child.params_mut();
                    if horizontal_gravity {
                        params.offset_horizontal(dx);
                    }
                    if vertical_gravity {
                        params.offset_vertical(dy);
                    }
                }
            }
        }

        if rtl {
            let offset = assumed_width - width;
            for &index in &self.sorted_vertical {
                let child = self.host.child_mut(index);
                if !child.visibility().is_gone() {
                    child.params_mut().offset_horizontal(-offset);
                }
            }
        }

        let size = Size::new(width, height);
        debug!(
            width,
            height,
            children = count,
            ?direction,
            width_spec = %width_spec,
            height_spec = %height_spec,
            "measured relative layout"
        );
        self.measured = Some(size);
        Ok(size)
    }

    fn sort_children(&mut self) -> Result<(), LayoutError> {
        self.graph.clear();
        for index in 0..self.host.child_count() {
            let child = self.host.child(index);
            self.graph
                .add(index, child.id(), child.params().resolved_rules());
        }
        self.sorted_vertical = self.graph.sort(Axis::Vertical)?;
        self.sorted_horizontal = self.graph.sort(Axis::Horizontal)?;
        self.dirty_hierarchy = false;
        debug!(children = self.graph.len(), "rebuilt child orderings");
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), LayoutError> {
        let count = self.host.child_count();
        if index < count {
            Ok(())
        } else {
            Err(LayoutError::ChildOutOfRange { index, count })
        }
    }
}

fn center(start: &mut Option<i32>, end: &mut Option<i32>, measured: i32, container: i32) {
    let offset = (container - measured) / 2;
    *start = Some(offset);
    *end = Some(offset + measured);
}

/// Fills in the open horizontal edges of a measured child. Returns whether
/// the child has to be corrected once a wrapped width is final.
fn position_horizontal<C: ConstrainedBox>(
    child: &mut C,
    padding: &Insets,
    my_width: Option<i32>,
    wrap_content: bool,
    rtl: bool,
) -> bool {
    let measured = child.measured_size().width;
    let params = child.params_mut();
    let rules = *params.resolved_rules();
    let margins = params.margins;

    match (params.left, params.right) {
        (None, Some(right)) => params.left = Some(right - measured),
        (Some(left), None) => params.right = Some(left + measured),
        (Some(_), Some(_)) => {}
        (None, None) => {
            if rules.has(Rule::CenterInParent) || rules.has(Rule::CenterHorizontal) {
                match my_width.filter(|_| !wrap_content) {
                    Some(width) => center(&mut params.left, &mut params.right, measured, width),
                    None => {
                        let left = padding.left + margins.left;
                        params.left = Some(left);
                        params.right = Some(left + measured);
                    }
                }
                return true;
            }
            match my_width.filter(|_| rtl) {
                Some(width) => {
                    let right = width - padding.right - margins.right;
                    params.right = Some(right);
                    params.left = Some(right - measured);
                }
                None => {
                    let left = padding.left + margins.left;
                    params.left = Some(left);
                    params.right = Some(left + measured);
                }
            }
        }
    }

    // corrected in LTR only: in RTL the final shift already moves these boxes
    !rtl && rules.has(Rule::AlignParentRight)
}

fn position_vertical<C: ConstrainedBox>(
    child: &mut C,
    padding: &Insets,
    my_height: Option<i32>,
    wrap_content: bool,
) -> bool {
    let measured = child.measured_size().height;
    let params = child.params_mut();
    let rules = *params.resolved_rules();
    let margins = params.margins;

    match (params.top, params.bottom) {
        (None, Some(bottom)) => params.top = Some(bottom - measured),
        (Some(top), None) => params.bottom = Some(top + measured),
        (Some(_), Some(_)) => {}
        (None, None) => {
            let centered = rules.has(Rule::CenterInParent) || rules.has(Rule::CenterVertical);
            match my_height.filter(|_| centered && !wrap_content) {
                Some(height) => center(&mut params.top, &mut params.bottom, measured, height),
                None => {
                    let top = padding.top + margins.top;
                    params.top = Some(top);
                    params.bottom = Some(top + measured);
                }
            }
            if centered {
                return true;
            }
        }
    }

    rules.has(Rule::AlignParentBottom)
}
