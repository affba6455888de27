use crate::config::{Config, load_config};
use crate::layout_source;
use crate::layout::{LayoutDirection, MeasureMode};
use crate::layout_dump::LayoutDump;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rlay", version, about = "Relative layout solver for text scenes")]
pub struct Args {
    /// Input file (.rl or Markdown) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width offered to the container
    #[arg(short = 'w', long = "width")]
    pub width: Option<i32>,

    /// Height offered to the container
    #[arg(short = 'H', long = "height")]
    pub height: Option<i32>,

    #[arg(long = "widthMode", value_enum)]
    pub width_mode: Option<ModeArg>,

    #[arg(long = "heightMode", value_enum)]
    pub height_mode: Option<ModeArg>,

    /// Lay out right-to-left unless the scene header says otherwise
    #[arg(long = "rtl")]
    pub rtl: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Exactly,
    AtMost,
    Unspecified,
}

impl From<ModeArg> for MeasureMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Exactly => MeasureMode::Exactly,
            ModeArg::AtMost => MeasureMode::AtMost,
            ModeArg::Unspecified => MeasureMode::Unspecified,
        }
    }
}

/// Input as read from disk or stdin. Markdown may hold several scenes.
enum Source {
    Scene(String),
    Markdown(String),
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut base_config = load_config(args.config.as_deref())?;
    apply_args(&mut base_config, &args);

    let scenes = match read_input(args.input.as_deref())? {
        Source::Scene(text) => vec![text],
        Source::Markdown(text) => extract_scene_blocks(&text),
    };
    if scenes.is_empty() {
        return Err(anyhow::anyhow!("No relative scenes found in input"));
    }

    let dumps = scenes
        .iter()
        .enumerate()
        .map(|(idx, scene)| {
            layout_source(scene, &base_config).with_context(|| format!("scene {}", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let output = format_dumps(&dumps, args.output_format)?;
    match args.output.as_deref() {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().lock().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.measure.width = width;
    }
    if let Some(height) = args.height {
        config.measure.height = height;
    }
    if let Some(mode) = args.width_mode {
        config.measure.width_mode = mode.into();
    }
    if let Some(mode) = args.height_mode {
        config.measure.height_mode = mode.into();
    }
    if args.rtl {
        config.container.direction = LayoutDirection::Rtl;
    }
}

/// One scene prints as a single dump, several as a JSON array or as text
/// blocks separated by a blank line.
fn format_dumps(dumps: &[LayoutDump], format: OutputFormat) -> Result<String> {
    let mut out = match (format, dumps) {
        (OutputFormat::Json, [single]) => serde_json::to_string_pretty(single)?,
        (OutputFormat::Json, all) => serde_json::to_string_pretty(all)?,
        (OutputFormat::Text, all) => all
            .iter()
            .map(LayoutDump::to_text)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn read_input(path: Option<&Path>) -> Result<Source> {
    let Some(path) = path.filter(|path| *path != Path::new("-")) else {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(Source::Scene(text));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let markdown = matches!(
        path.extension().and_then(OsStr::to_str),
        Some("md" | "markdown")
    );
    Ok(if markdown {
        Source::Markdown(text)
    } else {
        Source::Scene(text)
    })
}

/// Bodies of the fenced blocks whose info string starts with `relative`. The
/// info string becomes the block's header line.
fn extract_scene_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut open: Option<(&str, Vec<&str>)> = None;

    for line in input.lines() {
        let trimmed = line.trim();
        if let Some((fence, body)) = &mut open {
            let closes = trimmed
                .strip_prefix(*fence)
                .is_some_and(|rest| rest.trim().is_empty());
            if closes {
                blocks.push(body.join("\n"));
                open = None;
            } else {
                body.push(line);
            }
        } else if let Some((fence, header)) = scene_fence(trimmed) {
            open = Some((fence, vec![header]));
        }
    }

    blocks
}

fn scene_fence(line: &str) -> Option<(&'static str, &str)> {
    ["```", "~~~"].into_iter().find_map(|fence| {
        let header = line
            .strip_prefix(fence)?
            .trim_start_matches(&fence[..1])
            .trim();
        header.starts_with("relative").then_some((fence, header))
    })
}
