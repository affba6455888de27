use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{Frame, LayoutDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalGravity {
    #[default]
    Start,
    Left,
    Center,
    Right,
    End,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalGravity {
    #[default]
    Top,
    Center,
    Bottom,
    Fill,
}

/// Container-level alignment of the children's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gravity {
    pub horizontal: HorizontalGravity,
    pub vertical: VerticalGravity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pull {
    Before,
    After,
    Center,
    Fill,
}

impl Gravity {
    pub const CENTER: Gravity = Gravity {
        horizontal: HorizontalGravity::Center,
        vertical: VerticalGravity::Center,
    };

    pub fn new(horizontal: HorizontalGravity, vertical: VerticalGravity) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Whether children are shifted horizontally. `Left` counts as active,
    /// only `Start` leaves the horizontal positions alone.
    pub fn is_horizontal_active(self) -> bool {
        self.horizontal != HorizontalGravity::Start
    }

    pub fn is_vertical_active(self) -> bool {
        self.vertical != VerticalGravity::Top
    }

    /// Parses `|`-separated tokens such as `center_horizontal|bottom`. Tokens
    /// combine like flags, so the result does not depend on their order: a
    /// side beats `center` and opposite sides make `fill`. An axis without a
    /// token keeps its default (`start`, `top`).
    pub fn parse(spec: &str) -> Option<Self> {
        let mut horizontal = None;
        let mut vertical = None;
        for token in spec.split('|').map(str::trim).filter(|t| !t.is_empty()) {
            let (h, v) = match token {
                "start" => (Some(HorizontalGravity::Start), None),
                "left" => (Some(HorizontalGravity::Left), None),
                "center_horizontal" => (Some(HorizontalGravity::Center), None),
                "right" => (Some(HorizontalGravity::Right), None),
                "end" => (Some(HorizontalGravity::End), None),
                "fill_horizontal" => (Some(HorizontalGravity::Fill), None),
                "top" => (None, Some(VerticalGravity::Top)),
                "center_vertical" => (None, Some(VerticalGravity::Center)),
                "bottom" => (None, Some(VerticalGravity::Bottom)),
                "fill_vertical" => (None, Some(VerticalGravity::Fill)),
                "center" => (
                    Some(HorizontalGravity::Center),
                    Some(VerticalGravity::Center),
                ),
                "fill" => (Some(HorizontalGravity::Fill), Some(VerticalGravity::Fill)),
                _ => return None,
            };
            if let Some(h) = h {
                horizontal = Some(merge_horizontal(horizontal, h));
            }
            if let Some(v) = v {
                vertical = Some(merge_vertical(vertical, v));
            }
        }
        Some(Gravity::new(
            horizontal.unwrap_or_default(),
            vertical.unwrap_or_default(),
        ))
    }

    /// Places a `width` x `height` rectangle inside `container`.
    pub fn apply(self, width: i32, height: i32, container: Frame, direction: LayoutDirection) -> Frame {
        let horizontal = match (self.horizontal, direction) {
            (HorizontalGravity::Left, _)
            | (HorizontalGravity::Start, LayoutDirection::Ltr)
            | (HorizontalGravity::End, LayoutDirection::Rtl) => Pull::Before,
            (HorizontalGravity::Right, _)
            | (HorizontalGravity::End, LayoutDirection::Ltr)
            | (HorizontalGravity::Start, LayoutDirection::Rtl) => Pull::After,
            (HorizontalGravity::Center, _) => Pull::Center,
            (HorizontalGravity::Fill, _) => Pull::Fill,
        };
        let vertical = match self.vertical {
            VerticalGravity::Top => Pull::Before,
            VerticalGravity::Bottom => Pull::After,
            VerticalGravity::Center => Pull::Center,
            VerticalGravity::Fill => Pull::Fill,
        };
        let (left, right) = place(horizontal, width, container.left, container.right);
        let (top, bottom) = place(vertical, height, container.top, container.bottom);
        Frame::new(left, top, right, bottom)
    }
}

fn place(pull: Pull, size: i32, start: i32, end: i32) -> (i32, i32) {
    match pull {
        Pull::Before => (start, start + size),
        Pull::After => (end - size, end),
        Pull::Center => {
            let offset = start + (end - start - size) / 2;
            (offset, offset + size)
        }
        Pull::Fill => (start, end),
    }
}

fn merge_horizontal(
    current: Option<HorizontalGravity>,
    next: HorizontalGravity,
) -> HorizontalGravity {
    use HorizontalGravity::*;
    match (current, next) {
        (None, next) => next,
        (Some(Fill), _) | (Some(_), Fill) => Fill,
        (Some(Center), next) => next,
        (Some(current), Center) => current,
        (Some(Left | Start), Right | End) | (Some(Right | End), Left | Start) => Fill,
        (Some(Start), Left) | (Some(Left), Start) => Start,
        (Some(End), Right) | (Some(Right), End) => End,
        (Some(_), next) => next,
    }
}

fn merge_vertical(current: Option<VerticalGravity>, next: VerticalGravity) -> VerticalGravity {
    use VerticalGravity::*;
    match (current, next) {
        (None, next) => next,
        (Some(Fill), _) | (Some(_), Fill) => Fill,
        (Some(Center), next) => next,
        (Some(current), Center) => current,
        (Some(Top), Bottom) | (Some(Bottom), Top) => Fill,
        (Some(_), next) => next,
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let horizontal = match self.horizontal {
            HorizontalGravity::Start => "start",
            HorizontalGravity::Left => "left",
            HorizontalGravity::Center => "center_horizontal",
            HorizontalGravity::Right => "right",
            HorizontalGravity::End => "end",
            HorizontalGravity::Fill => "fill_horizontal",
        };
        let vertical = match self.vertical {
            VerticalGravity::Top => "top",
            VerticalGravity::Center => "center_vertical",
            VerticalGravity::Bottom => "bottom",
            VerticalGravity::Fill => "fill_vertical",
        };
        write!(f, "{horizontal}|{vertical}")
    }
}

impl TryFrom<String> for Gravity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Gravity::parse(&value).ok_or_else(|| format!("unknown gravity `{value}`"))
    }
}

impl From<Gravity> for String {
    fn from(gravity: Gravity) -> Self {
        gravity.to_string()
    }
}
