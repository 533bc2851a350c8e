//! Entry point: load a car or track description into a scene graph.
//!
//! `--settings=<file.ron>` engine settings, `--data=<dir>` content root,
//! `--scene=<path>` description file relative to the content root.

mod load_drawable;
mod settings;

use anyhow::{Context, Result};
use asset::ContentManager;
use corelib::camera::FreeCamera;
use corelib::config::ConfigTree;
use corelib::{Vec3, vec3};
use renderer::HeadlessDevice;

use crate::load_drawable::{DrawableNode, LoadDrawable};
use crate::settings::Settings;

fn parse_flag(name: &str) -> Option<String> {
    // Accept: --name=value; the last occurrence wins
    let prefix = format!("--{name}=");
    std::env::args()
        .filter_map(|arg| arg.strip_prefix(&prefix).map(str::to_owned))
        .last()
}

/// Walk config sections depth first, loading every entry that names a texture.
fn load_sections(
    loader: &mut LoadDrawable<'_>,
    cfg: &ConfigTree,
    top: &mut DrawableNode,
) -> (usize, usize) {
    let (mut loaded, mut failed) = (0, 0);
    if cfg.child("texture").is_some() {
        if loader.load(cfg, top, None, None) {
            loaded += 1;
        } else {
            failed += 1;
        }
    }
    for section in cfg.children().filter(|c| c.children().next().is_some()) {
        let (l, f) = load_sections(loader, section, top);
        loaded += l;
        failed += f;
    }
    (loaded, failed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut settings = match parse_flag("settings") {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    if let Some(data) = parse_flag("data") {
        settings.data_path = data;
    }
    log::info!(
        "Starting trackside. data={}, texture_size={:?}, anisotropy={}",
        settings.data_path,
        settings.texture_size,
        settings.anisotropy
    );

    let device = renderer::share(HeadlessDevice::new(settings.caps.clone()));
    let mut content = ContentManager::new(device.clone(), settings.data_path.as_str())
        .context("initializing content")?;

    let [x, y, z] = settings.camera_offset;
    let mut camera = FreeCamera::new(vec3(x, y, z));

    let Some(scene) = parse_flag("scene") else {
        log::info!("No --scene given, nothing to load");
        return Ok(());
    };
    let scene_file = std::path::Path::new(&settings.data_path).join(&scene);
    let text = std::fs::read_to_string(&scene_file)
        .with_context(|| format!("reading scene {}", scene_file.display()))?;
    let cfg = ConfigTree::parse(scene.as_str(), &text)
        .with_context(|| format!("parsing scene {}", scene_file.display()))?;

    let scene_dir = std::path::Path::new(&scene)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut error = String::new();
    let mut root = DrawableNode::new();
    let mut loader = LoadDrawable::new(&scene_dir, settings.anisotropy, &mut content, &mut error)
        .texture_size(settings.texture_size);
    let (loaded, failed) = load_sections(&mut loader, &cfg, &mut root);

    camera.reset(cfg.get::<Vec3>("camera.position").unwrap_or(Vec3::ZERO));
    log::info!(
        "Loaded {loaded} drawables ({failed} failed): \
         {} models, {} textures, {} child nodes; camera at {}",
        content.models().len(),
        content.textures().len(),
        root.children().len(),
        camera.position
    );
    if !error.is_empty() {
        log::warn!("{} problems while loading {scene}", error.lines().count());
    }

    let dev = device.borrow();
    log::info!(
        "Device holds {} textures and {} buffers",
        dev.texture_count(),
        dev.buffer_count()
    );
    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
