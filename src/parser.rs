use crate::ir::{Scene, SceneBox};
use crate::layout::{
    BoxId, Gravity, Insets, LayoutDirection, LayoutParams, Rule, Size, SizeSpec, Subject,
    Visibility,
};
use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^relative(?:\s+(\w+))?$").unwrap());
static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());
static BOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^box\s+([A-Za-z_][\w-]*)(?:\s+(.*))?$").unwrap());
static CONTENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)x(\d+)$").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub scene: Scene,
    pub init_config: Option<serde_json::Value>,
}

/// Parses a `relative` scene. Box names get ids 1..n in declaration order;
/// anchors naming no declared box get fresh ids after those.
pub fn parse_scene(input: &str) -> Result<ParseOutput> {
    let (lines, init_config) = preprocess_input(input);
    let Some(((header_no, header), statements)) = lines.split_first() else {
        bail!("empty scene: expected a `relative` header");
    };
    let caps = HEADER_RE
        .captures(header)
        .ok_or_else(|| anyhow!("line {header_no}: expected `relative [LTR|RTL]`, found `{header}`"))?;

    let mut scene = Scene::new();
    if let Some(token) = caps.get(1) {
        let direction = LayoutDirection::from_token(token.as_str())
            .ok_or_else(|| anyhow!("line {header_no}: unknown direction `{}`", token.as_str()))?;
        scene.direction = Some(direction);
    }

    for (line_no, line) in statements {
        if let Some(caps) = BOX_RE.captures(line) {
            let name = &caps[1];
            if scene.names.contains_key(name) {
                bail!("line {line_no}: box `{name}` is declared twice");
            }
            let id = next_id(&scene)?;
            scene.names.insert(name.to_string(), id);
        }
    }

    for (line_no, line) in statements {
        parse_statement(&mut scene, line).with_context(|| format!("line {line_no}"))?;
    }

    Ok(ParseOutput { scene, init_config })
}

/// Numbered statements with comments stripped, plus the last readable init
/// directive.
fn preprocess_input(input: &str) -> (Vec<(usize, String)>, Option<serde_json::Value>) {
    let mut init_config = None;
    let statements = input
        .lines()
        .enumerate()
        .filter_map(|(idx, raw_line)| {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if let Some(caps) = INIT_RE.captures(line) {
                if let Some(value) = read_init_directive(&caps[1], line_no) {
                    init_config = Some(value);
                }
                return None;
            }
            let statement = line.split_once("%%").map_or(line, |(code, _)| code).trim();
            (!statement.is_empty()).then(|| (line_no, statement.to_string()))
        })
        .collect();
    (statements, init_config)
}

fn read_init_directive(text: &str, line_no: usize) -> Option<serde_json::Value> {
    let value = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .or_else(|| json5::from_str::<serde_json::Value>(text).ok());
    if value.is_none() {
        warn!(line = line_no, "ignoring unreadable init directive");
    }
    value
}

fn next_id(scene: &Scene) -> Result<BoxId> {
    let next = u32::try_from(scene.names.len() + 1).context("too many boxes")?;
    Ok(BoxId(next))
}

fn anchor_id(scene: &mut Scene, name: &str) -> Result<BoxId> {
    if let Some(id) = scene.id_of(name) {
        return Ok(id);
    }
    let id = next_id(scene)?;
    warn!(anchor = name, %id, "anchor names no declared box");
    scene.names.insert(name.to_string(), id);
    Ok(id)
}

fn parse_statement(scene: &mut Scene, line: &str) -> Result<()> {
    if let Some(caps) = BOX_RE.captures(line) {
        let name = caps[1].to_string();
        let attributes = caps.get(2).map_or("", |m| m.as_str());
        let scene_box = parse_box(scene, &name, attributes)?;
        scene.boxes.push(scene_box);
        return Ok(());
    }

    let (keyword, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(keyword, rest)| (keyword, rest.trim()));
    match keyword {
        "padding" => {
            let values = parse_ints(rest)?;
            scene.padding = Some(match values.as_slice() {
                [all] => Insets::uniform(*all),
                [left, top, right, bottom] => Insets::new(*left, *top, *right, *bottom),
                _ => bail!("padding takes one value or four (left top right bottom)"),
            });
        }
        "gravity" => {
            let gravity = Gravity::parse(rest).ok_or_else(|| anyhow!("unknown gravity `{rest}`"))?;
            scene.gravity = Some(gravity);
        }
        "ignoreGravity" => {
            if rest.is_empty() {
                bail!("ignoreGravity needs a box name");
            }
            scene.ignore_gravity = Some(anchor_id(scene, rest)?);
        }
        "minSize" => {
            let values = parse_ints(rest)?;
            let [width, height] = values.as_slice() else {
                bail!("minSize takes a width and a height");
            };
            scene.min_size = Some(Size::new(*width, *height));
        }
        _ => bail!("unknown statement `{line}`"),
    }
    Ok(())
}

fn parse_ints(text: &str) -> Result<Vec<i32>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .with_context(|| format!("expected a number, found `{part}`"))
        })
        .collect()
}

fn parse_size(value: &str) -> Result<SizeSpec> {
    SizeSpec::from_token(value).ok_or_else(|| anyhow!("invalid size `{value}`"))
}

fn parse_box(scene: &mut Scene, name: &str, attributes: &str) -> Result<SceneBox> {
    let id = scene
        .id_of(name)
        .ok_or_else(|| anyhow!("box `{name}` was not declared"))?;
    let mut scene_box = SceneBox::new(name, id);
    let mut params = LayoutParams::default();

    for token in attributes.split_whitespace() {
        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (token, None),
        };
        match (key, value) {
            ("width", Some(v)) => params.width = parse_size(v)?,
            ("height", Some(v)) => params.height = parse_size(v)?,
            ("margin", Some(v)) => {
                let values = parse_ints(v)?;
                params.margins = match values.as_slice() {
                    [all] => Insets::uniform(*all),
                    [left, top, right, bottom] => Insets::new(*left, *top, *right, *bottom),
                    _ => bail!("margin takes one value or four (left,top,right,bottom)"),
                };
            }
            ("marginLeft", Some(v)) => params.margins.left = parse_int(v)?,
            ("marginTop", Some(v)) => params.margins.top = parse_int(v)?,
            ("marginRight", Some(v)) => params.margins.right = parse_int(v)?,
            ("marginBottom", Some(v)) => params.margins.bottom = parse_int(v)?,
            ("content", Some(v)) => {
                let caps = CONTENT_RE
                    .captures(v)
                    .ok_or_else(|| anyhow!("content expects <width>x<height>, found `{v}`"))?;
                scene_box.content = Size::new(parse_int(&caps[1])?, parse_int(&caps[2])?);
            }
            ("baseline", Some(v)) => scene_box.content_baseline = Some(parse_int(v)?),
            ("visibility", Some(v)) => {
                scene_box.visibility = match v {
                    "visible" => Visibility::Visible,
                    "invisible" => Visibility::Invisible,
                    "gone" => Visibility::Gone,
                    _ => bail!("unknown visibility `{v}`"),
                };
            }
            ("alignWithParentIfMissing", None) => params.align_with_parent_if_missing = true,
            (key, value) => {
                let rule = Rule::from_token(key)
                    .ok_or_else(|| anyhow!("unknown attribute `{token}` on box `{name}`"))?;
                let subject = match (rule.takes_anchor(), value) {
                    (true, Some(anchor)) if !anchor.is_empty() => {
                        Subject::Anchor(anchor_id(scene, anchor)?)
                    }
                    (false, None) => Subject::True,
                    (true, _) => bail!("rule `{rule}` needs an anchor: `{rule}=<name>`"),
                    (false, Some(_)) => bail!("rule `{rule}` takes no anchor"),
                };
                params.add_rule(rule, subject);
            }
        }
    }

    scene_box.params = params;
    Ok(scene_box)
}

fn parse_int(text: &str) -> Result<i32> {
    text.parse::<i32>()
        .with_context(|| format!("expected a number, found `{text}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_scene() {
        let input = "relative RTL\npadding 4\nbox title width=fill content=100x20 alignParentTop\nbox body below=title marginTop=8";
        let parsed = parse_scene(input).unwrap();
        let scene = parsed.scene;
        assert_eq!(scene.direction, Some(LayoutDirection::Rtl));
        assert_eq!(scene.padding, Some(Insets::uniform(4)));
        assert_eq!(scene.boxes.len(), 2);

        let title = &scene.boxes[0];
        assert_eq!(title.id, BoxId(1));
        assert_eq!(title.params.width, SizeSpec::Fill);
        assert_eq!(title.content, Size::new(100, 20));
        assert_eq!(title.params.rule(Rule::AlignParentTop), Subject::True);

        let body = &scene.boxes[1];
        assert_eq!(body.params.rule(Rule::Below), Subject::Anchor(BoxId(1)));
        assert_eq!(body.params.margins.top, 8);
    }

    #[test]
    fn forward_references_resolve_to_declared_ids() {
        let input = "relative\nbox a rightOf=b\nbox b alignParentLeft";
        let scene = parse_scene(input).unwrap().scene;
        assert_eq!(scene.direction, None);
        assert_eq!(scene.boxes[0].params.rule(Rule::RightOf), Subject::Anchor(BoxId(2)));
    }

    #[test]
    fn undeclared_anchor_gets_fresh_id() {
        let input = "relative LTR\nbox a leftOf=ghost alignWithParentIfMissing\nbox b";
        let scene = parse_scene(input).unwrap().scene;
        assert_eq!(scene.id_of("ghost"), Some(BoxId(3)));
        assert!(scene.boxes[0].params.align_with_parent_if_missing);
        assert_eq!(scene.boxes.len(), 2);
    }

    #[test]
    fn reads_init_directive_and_comments() {
        let input = "%%{init: {gravity: 'center', padding: 2}}%%\n%% a comment\nrelative\nbox a visibility=gone %% trailing\nminSize 30 40\ngravity bottom\nignoreGravity a";
        let parsed = parse_scene(input).unwrap();
        let init = parsed.init_config.unwrap();
        assert_eq!(init["gravity"], "center");
        let scene = parsed.scene;
        assert_eq!(scene.boxes[0].visibility, Visibility::Gone);
        assert_eq!(scene.min_size, Some(Size::new(30, 40)));
        assert_eq!(scene.ignore_gravity, Some(BoxId(1)));
        assert!(scene.gravity.unwrap().is_vertical_active());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_scene("").is_err());
        assert!(parse_scene("box a").is_err());
        assert!(parse_scene("relative UP").is_err());
        assert!(parse_scene("relative\nbox a\nbox a").is_err());
        assert!(parse_scene("relative\nbox a leftOf").is_err());
        assert!(parse_scene("relative\nbox a alignParentLeft=b").is_err());
        assert!(parse_scene("relative\nbox a width=-4").is_err());
        assert!(parse_scene("relative\nbox a sparkle").is_err());
        assert!(parse_scene("relative\npadding 1 2").is_err());
        assert!(parse_scene("relative\nstack a").is_err());
    }

    #[test]
    fn margin_shorthand_and_sides() {
        let input = "relative\nbox a margin=1,2,3,4 marginRight=9 baseline=12";
        let scene = parse_scene(input).unwrap().scene;
        assert_eq!(scene.boxes[0].params.margins, Insets::new(1, 2, 9, 4));
        assert_eq!(scene.boxes[0].content_baseline, Some(12));
    }
}
