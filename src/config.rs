use crate::layout::{
    BoxId, Gravity, Insets, LayoutDirection, MeasureMode, MeasureSpec, SizeSpec,
};
use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behavior switches keyed on the platform level a layout was authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompatConfig {
    pub target_api_level: u32,
    pub rtl_supported: bool,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            target_api_level: 34,
            rtl_supported: true,
        }
    }
}

impl CompatConfig {
    /// Unbounded containers hand children directives derived from a negative
    /// size instead of passing the flexibility on.
    pub fn allow_broken_measure_specs(&self) -> bool {
        self.target_api_level <= 17
    }

    pub fn measure_vertical_with_padding_margin(&self) -> bool {
        self.target_api_level >= 18
    }

    pub fn wrap_content_includes_margins(&self) -> bool {
        self.target_api_level >= 19
    }

    /// Left/right rules win over start/end rules and the direction is ignored.
    pub fn rtl_compatibility_mode(&self) -> bool {
        self.target_api_level < 17 || !self.rtl_supported
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerConfig {
    pub padding: Insets,
    pub gravity: Gravity,
    pub ignore_gravity: Option<BoxId>,
    pub direction: LayoutDirection,
    /// Suggested minimum size applied to wrapped axes.
    pub min_width: i32,
    pub min_height: i32,
    /// The container's own declared size. An exact value is a floor for a
    /// wrapped axis.
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub compat: CompatConfig,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            padding: Insets::default(),
            gravity: Gravity::default(),
            ignore_gravity: None,
            direction: LayoutDirection::Ltr,
            min_width: 0,
            min_height: 0,
            width: SizeSpec::Wrap,
            height: SizeSpec::Wrap,
            compat: CompatConfig::default(),
        }
    }
}

/// Outer directives the container is measured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureConfig {
    pub width: i32,
    pub height: i32,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            width_mode: MeasureMode::Exactly,
            height_mode: MeasureMode::AtMost,
        }
    }
}

impl MeasureConfig {
    pub fn width_spec(&self) -> MeasureSpec {
        spec(self.width_mode, self.width)
    }

    pub fn height_spec(&self) -> MeasureSpec {
        spec(self.height_mode, self.height)
    }
}

fn spec(mode: MeasureMode, size: i32) -> MeasureSpec {
    match mode {
        MeasureMode::Exactly => MeasureSpec::exactly(size),
        MeasureMode::AtMost => MeasureSpec::at_most(size),
        MeasureMode::Unspecified => MeasureSpec::unspecified(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub container: ContainerConfig,
    pub measure: MeasureConfig,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InsetsFile {
    Uniform(i32),
    Sides {
        left: Option<i32>,
        top: Option<i32>,
        right: Option<i32>,
        bottom: Option<i32>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeFile {
    Pixels(i32),
    Keyword(String),
}

impl SizeFile {
    fn resolve(self) -> anyhow::Result<SizeSpec> {
        match self {
            SizeFile::Pixels(px) if px >= 0 => Ok(SizeSpec::Exact(px)),
            SizeFile::Pixels(px) => Err(anyhow!("negative size {px}")),
            SizeFile::Keyword(word) => {
                SizeSpec::from_token(&word).ok_or_else(|| anyhow!("unknown size `{word}`"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeasureConfigFile {
    width: Option<i32>,
    height: Option<i32>,
    width_mode: Option<MeasureMode>,
    height_mode: Option<MeasureMode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    direction: Option<String>,
    padding: Option<InsetsFile>,
    gravity: Option<String>,
    ignore_gravity: Option<u32>,
    min_width: Option<i32>,
    min_height: Option<i32>,
    width: Option<SizeFile>,
    height: Option<SizeFile>,
    target_api_level: Option<u32>,
    rtl_supported: Option<bool>,
    measure: Option<MeasureConfigFile>,
}

impl ConfigFile {
    fn apply(self, config: &mut Config) -> anyhow::Result<()> {
        let container = &mut config.container;
        if let Some(v) = self.direction {
            container.direction = LayoutDirection::from_token(&v)
                .ok_or_else(|| anyhow!("unknown layout direction `{v}`"))?;
        }
        if let Some(v) = self.padding {
            container.padding = match v {
                InsetsFile::Uniform(all) => Insets::uniform(all),
                InsetsFile::Sides {
                    left,
                    top,
                    right,
                    bottom,
                } => Insets::new(
                    left.unwrap_or(container.padding.left),
                    top.unwrap_or(container.padding.top),
                    right.unwrap_or(container.padding.right),
                    bottom.unwrap_or(container.padding.bottom),
                ),
            };
        }
        if let Some(v) = self.gravity {
            container.gravity =
                Gravity::parse(&v).ok_or_else(|| anyhow!("unknown gravity `{v}`"))?;
        }
        if let Some(v) = self.ignore_gravity {
            container.ignore_gravity = (v > 0).then_some(BoxId(v));
        }
        if let Some(v) = self.min_width {
            container.min_width = v;
        }
        if let Some(v) = self.min_height {
            container.min_height = v;
        }
        if let Some(v) = self.width {
            container.width = v.resolve().context("invalid container width")?;
        }
        if let Some(v) = self.height {
            container.height = v.resolve().context("invalid container height")?;
        }
        if let Some(v) = self.target_api_level {
            container.compat.target_api_level = v;
        }
        if let Some(v) = self.rtl_supported {
            container.compat.rtl_supported = v;
        }
        if let Some(measure) = self.measure {
            if let Some(v) = measure.width {
                config.measure.width = v;
            }
            if let Some(v) = measure.height {
                config.measure.height = v;
            }
            if let Some(v) = measure.width_mode {
                config.measure.width_mode = v;
            }
            if let Some(v) = measure.height_mode {
                config.measure.height_mode = v;
            }
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    parsed.apply(&mut config)?;
    Ok(config)
}

/// Merges a scene's `%%{init: ...}%%` object over an already loaded config.
pub fn merge_init_config(mut config: Config, init: serde_json::Value) -> anyhow::Result<Config> {
    let parsed: ConfigFile =
        serde_json::from_value(init).context("invalid init directive")?;
    parsed.apply(&mut config)?;
    Ok(config)
}
