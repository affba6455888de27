use std::path::Path;

use relative_layout_rs::layout::{Frame, LayoutDirection};
use relative_layout_rs::layout_dump::BoxDump;
use relative_layout_rs::{Config, LayoutDump, layout_source};

fn fixture_source(rel: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {}", rel);
    std::fs::read_to_string(&path).expect("fixture read failed")
}

fn layout_fixture(rel: &str) -> LayoutDump {
    layout_source(&fixture_source(rel), &Config::default()).expect("layout failed")
}

fn entry<'a>(dump: &'a LayoutDump, name: &str) -> &'a BoxDump {
    dump.boxes
        .iter()
        .find(|entry| entry.name == name)
        .unwrap_or_else(|| panic!("no box named {name}"))
}

fn assert_frames(dump: &LayoutDump, fixture: &str, expected: &[(&str, Frame)]) {
    for (name, frame) in expected {
        assert_eq!(
            entry(dump, name).frame,
            Some(*frame),
            "{fixture}: frame of `{name}`"
        );
    }
}

#[test]
fn lay_out_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "baseline.rl",
        "form.rl",
        "gone.rl",
        "gravity.rl",
        "rtl.rl",
        "wrap.rl",
    ];

    for rel in candidates {
        let dump = layout_fixture(rel);
        assert!(dump.width > 0 && dump.height > 0, "{rel}: empty container");
        for entry in &dump.boxes {
            if let Some(frame) = entry.frame {
                assert_eq!(frame.width(), entry.measured.width, "{rel}: {}", entry.name);
                assert_eq!(frame.height(), entry.measured.height, "{rel}: {}", entry.name);
            }
        }
    }
}

#[test]
fn form_fixture_chains_siblings() {
    let dump = layout_fixture("form.rl");
    assert_eq!((dump.width, dump.height), (1080, 94));
    assert_frames(
        &dump,
        "form.rl",
        &[
            ("label", Frame::new(10, 10, 110, 30)),
            ("field", Frame::new(118, 10, 318, 40)),
            ("hint", Frame::new(118, 44, 268, 60)),
            ("submit", Frame::new(990, 60, 1070, 84)),
        ],
    );
}

#[test]
fn rtl_fixture_mirrors_start_and_end() {
    let dump = layout_fixture("rtl.rl");
    assert_eq!(dump.direction, LayoutDirection::Rtl);
    assert_eq!((dump.width, dump.height), (1080, 34));
    assert_frames(
        &dump,
        "rtl.rl",
        &[
            ("icon", Frame::new(1056, 0, 1080, 24)),
            ("title", Frame::new(844, 0, 1044, 24)),
            ("note", Frame::new(1030, 24, 1080, 34)),
        ],
    );
}

#[test]
fn rtl_flag_is_overridden_by_scene_header() {
    let mut config = Config::default();
    config.container.direction = LayoutDirection::Rtl;
    let source = fixture_source("rtl.rl");

    // a bare header keeps the configured direction
    let bare = source.replacen("relative RTL", "relative", 1);
    let dump = layout_source(&bare, &config).expect("layout failed");
    assert_eq!(dump.direction, LayoutDirection::Rtl);
    assert_eq!(entry(&dump, "icon").frame, Some(Frame::new(1056, 0, 1080, 24)));

    let ltr = source.replacen("relative RTL", "relative LTR", 1);
    let dump = layout_source(&ltr, &config).expect("layout failed");
    assert_eq!(dump.direction, LayoutDirection::Ltr);
    assert_eq!(entry(&dump, "icon").frame, Some(Frame::new(0, 0, 24, 24)));
}

#[test]
fn gravity_fixture_moves_content_block() {
    let dump = layout_fixture("gravity.rl");
    assert_eq!((dump.width, dump.height), (400, 200));
    assert_frames(
        &dump,
        "gravity.rl",
        &[
            ("a", Frame::new(300, 130, 400, 180)),
            ("b", Frame::new(300, 180, 360, 200)),
        ],
    );
}

#[test]
fn wrap_fixture_recenters_after_width_is_known() {
    let dump = layout_fixture("wrap.rl");
    assert_eq!((dump.width, dump.height), (80, 30));
    assert_frames(
        &dump,
        "wrap.rl",
        &[
            ("a", Frame::new(5, 5, 45, 15)),
            ("b", Frame::new(45, 5, 75, 15)),
            ("c", Frame::new(30, 15, 50, 25)),
        ],
    );
}

#[test]
fn baseline_fixture_aligns_text_lines() {
    let dump = layout_fixture("baseline.rl");
    assert_eq!((dump.width, dump.height), (1080, 33));
    assert_eq!(dump.baseline, Some(22));
    assert_frames(
        &dump,
        "baseline.rl",
        &[
            ("label", Frame::new(0, 10, 60, 30)),
            ("value", Frame::new(60, 3, 140, 33)),
        ],
    );
}

#[test]
fn gone_fixture_falls_through_collapsed_and_missing_anchors() {
    let dump = layout_fixture("gone.rl");
    assert_eq!(dump.height, 20);
    assert_eq!(entry(&dump, "b").frame, None);
    assert_frames(
        &dump,
        "gone.rl",
        &[
            ("c", Frame::new(0, 10, 50, 20)),
            ("d", Frame::new(0, 0, 30, 10)),
        ],
    );
}

#[test]
fn cycle_fixture_is_rejected() {
    let err = layout_source(&fixture_source("cycle.rl"), &Config::default())
        .expect_err("cycle should fail");
    let message = format!("{err:#}");
    assert!(message.contains("circular dependencies"), "{message}");
    assert!(message.contains("horizontal"), "{message}");
}
