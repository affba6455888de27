use crate::config::ContainerConfig;
use crate::layout::{
    BoxId, ConstrainedBox, Frame, Gravity, Insets, LayoutDirection, LayoutParams, MeasureSpec,
    RelativeLayout, Size, Visibility,
};
use std::collections::BTreeMap;

/// One box of a parsed scene: a leaf with a fixed content size.
#[derive(Debug, Clone)]
pub struct SceneBox {
    pub name: String,
    pub id: BoxId,
    pub params: LayoutParams,
    pub visibility: Visibility,
    pub content: Size,
    pub content_baseline: Option<i32>,
    measured: Size,
    frame: Option<Frame>,
}

impl SceneBox {
    pub fn new(name: impl Into<String>, id: BoxId) -> Self {
        Self {
            name: name.into(),
            id,
            params: LayoutParams::default(),
            visibility: Visibility::Visible,
            content: Size::default(),
            content_baseline: None,
            measured: Size::default(),
            frame: None,
        }
    }

    /// Frame handed over by the last `RelativeLayout::layout`.
    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }
}

impl ConstrainedBox for SceneBox {
    fn id(&self) -> Option<BoxId> {
        Some(self.id)
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn params(&self) -> &LayoutParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut LayoutParams {
        &mut self.params
    }

    fn measure(&mut self, width: MeasureSpec, height: MeasureSpec) {
        self.measured = Size::new(
            width.constrain(self.content.width),
            height.constrain(self.content.height),
        );
    }

    fn measured_size(&self) -> Size {
        self.measured
    }

    fn baseline(&self) -> Option<i32> {
        self.content_baseline
    }

    fn layout(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Direction from the `relative` header; `None` keeps the configured one.
    pub direction: Option<LayoutDirection>,
    pub padding: Option<Insets>,
    pub gravity: Option<Gravity>,
    pub ignore_gravity: Option<BoxId>,
    pub min_size: Option<Size>,
    pub boxes: Vec<SceneBox>,
    /// Every name the scene mentions, declared boxes and dangling anchors.
    pub names: BTreeMap<String, BoxId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_of(&self, name: &str) -> Option<BoxId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: BoxId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, candidate)| **candidate == id)
            .map(|(name, _)| name.as_str())
    }

    /// Scene statements layered over `base`.
    pub fn container_config(&self, base: &ContainerConfig) -> ContainerConfig {
        let mut config = *base;
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(padding) = self.padding {
            config.padding = padding;
        }
        if let Some(gravity) = self.gravity {
            config.gravity = gravity;
        }
        if let Some(id) = self.ignore_gravity {
            config.ignore_gravity = Some(id);
        }
        if let Some(size) = self.min_size {
            config.min_width = size.width;
            config.min_height = size.height;
        }
        config
    }

    pub fn into_layout(self, base: &ContainerConfig) -> RelativeLayout<Vec<SceneBox>> {
        let config = self.container_config(base);
        let compatibility = config.compat.rtl_compatibility_mode();
        let mut boxes = self.boxes;
        for scene_box in &mut boxes {
            scene_box.params.set_rtl_compatibility(compatibility);
        }
        RelativeLayout::new(boxes, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompatConfig;
    use crate::layout::{Rule, SizeSpec};

    #[test]
    fn scene_box_measures_like_a_fixed_leaf() {
        let mut leaf = SceneBox::new("a", BoxId(1));
        leaf.content = Size::new(80, 30);
        leaf.measure(MeasureSpec::at_most(50), MeasureSpec::unspecified());
        assert_eq!(leaf.measured_size(), Size::new(50, 30));
        leaf.measure(MeasureSpec::exactly(120), MeasureSpec::at_most(100));
        assert_eq!(leaf.measured_size(), Size::new(120, 30));
    }

    #[test]
    fn scene_settings_override_base_config() {
        let mut scene = Scene::new();
        scene.direction = Some(LayoutDirection::Rtl);
        scene.min_size = Some(Size::new(10, 20));
        let base = ContainerConfig {
            padding: Insets::uniform(3),
            ..ContainerConfig::default()
        };
        let config = scene.container_config(&base);
        assert_eq!(config.direction, LayoutDirection::Rtl);
        assert_eq!(config.padding, Insets::uniform(3));
        assert_eq!((config.min_width, config.min_height), (10, 20));
    }

    #[test]
    fn legacy_level_switches_boxes_to_compatibility_aliasing() {
        let mut scene = Scene::new();
        let mut leaf = SceneBox::new("a", BoxId(1));
        leaf.params = LayoutParams::new(SizeSpec::Exact(10), SizeSpec::Exact(10))
            .with_rule(Rule::AlignParentStart, true);
        scene.boxes.push(leaf);
        scene.names.insert("a".into(), BoxId(1));
        assert_eq!(scene.name_of(BoxId(1)), Some("a"));

        let base = ContainerConfig {
            direction: LayoutDirection::Rtl,
            compat: CompatConfig {
                target_api_level: 16,
                ..CompatConfig::default()
            },
            ..ContainerConfig::default()
        };
        let mut layout = scene.into_layout(&base);
        layout
            .measure(MeasureSpec::exactly(100), MeasureSpec::exactly(100))
            .unwrap();
        // start stays on the left even though the container is RTL
        assert_eq!(layout.child_frame(0), Some(Frame::new(0, 0, 10, 10)));
    }
}
