#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, ContainerConfig, load_config, merge_init_config};
pub use ir::{Scene, SceneBox};
pub use layout::{ConstrainedBox, LayoutError, MeasurableHost, RelativeLayout};
pub use layout_dump::LayoutDump;
pub use parser::parse_scene;

/// Parses a scene, merges its init directive over `config`, measures it with
/// the configured directives and lays it out.
pub fn layout_source(source: &str, config: &Config) -> anyhow::Result<LayoutDump> {
    let parsed = parse_scene(source)?;
    let mut config = *config;
    if let Some(init_cfg) = parsed.init_config {
        config = merge_init_config(config, init_cfg)?;
    }
    let mut layout = parsed.scene.into_layout(&config.container);
    layout.measure(config.measure.width_spec(), config.measure.height_spec())?;
    layout.layout();
    Ok(LayoutDump::from_layout(&layout))
}
