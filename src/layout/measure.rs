use super::params::LayoutParams;
use super::types::{Insets, MeasureMode, MeasureSpec, SizeSpec};
use crate::config::CompatConfig;

/// One axis of a child as seen by the measure step: resolved edges (if any),
/// desired size, margins and the container padding on both sides.
#[derive(Debug, Clone, Copy)]
pub(super) struct AxisConstraint {
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub size: SizeSpec,
    pub start_margin: i32,
    pub end_margin: i32,
    pub start_padding: i32,
    pub end_padding: i32,
}

impl AxisConstraint {
    pub fn horizontal(params: &LayoutParams, padding: &Insets) -> Self {
        Self {
            start: params.left,
            end: params.right,
            size: params.width,
            start_margin: params.margins.left,
            end_margin: params.margins.right,
            start_padding: padding.left,
            end_padding: padding.right,
        }
    }

    pub fn vertical(params: &LayoutParams, padding: &Insets) -> Self {
        Self {
            start: params.top,
            end: params.bottom,
            size: params.height,
            start_margin: params.margins.top,
            end_margin: params.margins.bottom,
            start_padding: padding.top,
            end_padding: padding.bottom,
        }
    }
}

/// Directive for one axis of a child. `my_size` is `None` when the container
/// itself was measured without a bound on that axis.
pub(super) fn child_measure_spec(
    axis: &AxisConstraint,
    my_size: Option<i32>,
    allow_broken_measure_specs: bool,
) -> MeasureSpec {
    if my_size.is_none() && !allow_broken_measure_specs {
        if let (Some(start), Some(end)) = (axis.start, axis.end) {
            return MeasureSpec::exactly((end - start).max(0));
        }
        if let Some(size) = axis.size.exact() {
            return MeasureSpec::exactly(size);
        }
        return MeasureSpec::unspecified();
    }

    // legacy containers carried the unbounded marker through the arithmetic
    let is_unspecified = my_size.is_none();
    let my_size = my_size.unwrap_or(-1);

    let start = axis
        .start
        .unwrap_or(axis.start_padding + axis.start_margin);
    let end = axis
        .end
        .unwrap_or(my_size - axis.end_padding - axis.end_margin);
    let max_available = end - start;

    let unbounded_or_exact = if is_unspecified {
        MeasureMode::Unspecified
    } else {
        MeasureMode::Exactly
    };

    if axis.start.is_some() && axis.end.is_some() {
        return MeasureSpec {
            mode: unbounded_or_exact,
            size: max_available.max(0),
        };
    }

    match axis.size {
        SizeSpec::Exact(size) if size >= 0 => {
            if max_available >= 0 {
                MeasureSpec::exactly(max_available.min(size))
            } else {
                MeasureSpec::exactly(size)
            }
        }
        SizeSpec::Fill => MeasureSpec {
            mode: unbounded_or_exact,
            size: max_available.max(0),
        },
        SizeSpec::Wrap if max_available >= 0 => MeasureSpec::at_most(max_available),
        _ => MeasureSpec::unspecified(),
    }
}

/// Height directive used while the horizontal pass measures a child, before
/// any vertical rule has been applied.
pub(super) fn horizontal_pass_height_spec(
    params: &LayoutParams,
    my_height: Option<i32>,
    padding: &Insets,
    compat: &CompatConfig,
) -> MeasureSpec {
    if my_height.is_none() && !compat.allow_broken_measure_specs() {
        return match params.height.exact() {
            Some(height) => MeasureSpec::exactly(height),
            None => MeasureSpec::unspecified(),
        };
    }

    let my_height = my_height.unwrap_or(-1);
    let max_height = if compat.measure_vertical_with_padding_margin() {
        (my_height - padding.top - padding.bottom - params.margins.top - params.margins.bottom).max(0)
    } else {
        my_height.max(0)
    };

    if params.height == SizeSpec::Fill {
        MeasureSpec::exactly(max_height)
    } else {
        MeasureSpec::at_most(max_height)
    }
}
