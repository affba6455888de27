use crate::ir::SceneBox;
use crate::layout::{ConstrainedBox, Frame, LayoutDirection, RelativeLayout, Size, Visibility};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: LayoutDirection,
    pub width: i32,
    pub height: i32,
    pub baseline: Option<i32>,
    pub boxes: Vec<BoxDump>,
}

#[derive(Debug, Serialize)]
pub struct BoxDump {
    pub name: String,
    pub id: u32,
    pub visibility: Visibility,
    pub measured: Size,
    /// `None` for gone boxes.
    pub frame: Option<Frame>,
}

impl LayoutDump {
    pub fn from_layout(layout: &RelativeLayout<Vec<SceneBox>>) -> Self {
        let size = layout.measured_size().unwrap_or_default();
        let boxes = layout
            .host()
            .iter()
            .enumerate()
            .map(|(index, scene_box)| BoxDump {
                name: scene_box.name.clone(),
                id: scene_box.id.0,
                visibility: scene_box.visibility,
                measured: scene_box.measured_size(),
                frame: layout.child_frame(index),
            })
            .collect();

        LayoutDump {
            direction: layout.config().direction,
            width: size.width,
            height: size.height,
            baseline: layout.baseline(),
            boxes,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "container {}x{} {:?} baseline={}",
            self.width,
            self.height,
            self.direction,
            self.baseline
                .map_or_else(|| "none".to_string(), |b| b.to_string())
        );
        for entry in &self.boxes {
            match entry.frame {
                Some(frame) => {
                    let _ = writeln!(
                        out,
                        "{} #{} [{}, {}, {}, {}] {}x{}",
                        entry.name,
                        entry.id,
                        frame.left,
                        frame.top,
                        frame.right,
                        frame.bottom,
                        frame.width(),
                        frame.height()
                    );
                }
                None => {
                    let _ = writeln!(out, "{} #{} gone", entry.name, entry.id);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContainerConfig;
    use crate::parser::parse_scene;
    use crate::layout::MeasureSpec;

    #[test]
    fn dumps_frames_and_gone_boxes() {
        let scene = parse_scene(
            "relative\nbox a width=40 height=10\nbox b width=20 height=10 below=a\nbox c visibility=gone",
        )
        .unwrap()
        .scene;
        let mut layout = scene.into_layout(&ContainerConfig::default());
        layout
            .measure(MeasureSpec::at_most(200), MeasureSpec::at_most(200))
            .unwrap();
        let dump = LayoutDump::from_layout(&layout);
        assert_eq!((dump.width, dump.height), (40, 20));
        assert_eq!(dump.boxes[1].frame, Some(Frame::new(0, 10, 20, 20)));
        assert_eq!(dump.boxes[2].frame, None);

        let text = dump.to_text();
        assert!(text.starts_with("container 40x20 Ltr baseline=none"));
        assert!(text.contains("b #2 [0, 10, 20, 20] 20x10"));
        assert!(text.contains("c #3 gone"));

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["direction"], "ltr");
        assert_eq!(json["boxes"][0]["frame"]["right"], 40);
    }
}
