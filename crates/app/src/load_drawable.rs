//! Build scene drawables from car and track config entries.

use std::fmt::{self, Write};
use std::rc::Rc;

use asset::{ContentManager, Model, SizeTier, Texture, TextureInfo};
use corelib::config::{ConfigTree, ConfigValue};
use corelib::scene::{DrawHandle, Key, NodeHandle, SceneNode};
use corelib::transform::Transform;
use corelib::{Vec3, Vec4};

/// Something the renderer can draw: geometry, up to three texture slots and a tint.
#[derive(Clone)]
pub struct Drawable {
    pub model: Rc<Model>,
    /// Diffuse, misc (specular/reflection mask) and normal map.
    pub textures: [Rc<Texture>; 3],
    pub color: Vec4,
    /// Drawn over already lit geometry (emissive lights).
    pub decal: bool,
}

impl fmt::Debug for Drawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drawable")
            .field("indices", &self.model.index_count())
            .field("textures", &self.textures.each_ref().map(|t| t.id()))
            .field("color", &self.color)
            .field("decal", &self.decal)
            .finish()
    }
}

pub type DrawableNode = SceneNode<Drawable>;

/// Loads drawables relative to one content directory (a car or a track).
pub struct LoadDrawable<'a> {
    path: &'a str,
    anisotropy: u32,
    texture_size: SizeTier,
    content: &'a mut ContentManager,
    error: &'a mut dyn Write,
}

impl<'a> LoadDrawable<'a> {
    pub fn new(
        path: &'a str,
        anisotropy: u32,
        content: &'a mut ContentManager,
        error: &'a mut dyn Write,
    ) -> Self {
        Self {
            path,
            anisotropy,
            texture_size: SizeTier::Full,
            content,
            error,
        }
    }

    pub fn texture_size(mut self, size: SizeTier) -> Self {
        self.texture_size = size;
        self
    }

    /// Load the drawable described by `cfg` into `topnode`.
    ///
    /// An entry without `texture` has nothing to draw and succeeds untouched.
    /// `node` selects (and creates when null) the child node to draw into;
    /// `draw` receives the handle of the inserted drawable. An unknown `draw`
    /// type loads the assets but inserts nothing.
    pub fn load(
        &mut self,
        cfg: &ConfigTree,
        topnode: &mut DrawableNode,
        node: Option<&mut NodeHandle>,
        draw: Option<&mut DrawHandle>,
    ) -> bool {
        let Some(textures) = cfg.get::<Vec<String>>("texture") else {
            return true;
        };
        let Some(mesh) = cfg.get_or_report::<String>("mesh", self.error) else {
            return false;
        };
        self.load_with(&mesh, &textures, cfg, topnode, node, draw)
    }

    /// Like [`LoadDrawable::load`] with mesh and texture names given explicitly.
    pub fn load_with(
        &mut self,
        mesh_name: &str,
        texture_names: &[String],
        cfg: &ConfigTree,
        topnode: &mut DrawableNode,
        node: Option<&mut NodeHandle>,
        draw: Option<&mut DrawHandle>,
    ) -> bool {
        let Some(textures) = self.load_textures(texture_names) else {
            return false;
        };
        let Some(model) = self.load_model(mesh_name, cfg) else {
            return false;
        };

        let color = cfg.get::<Vec4>("color").unwrap_or(Vec4::ONE);
        let mut drawable = Drawable {
            model,
            textures,
            color,
            decal: false,
        };

        let mut child = node.map(|handle| {
            if handle.is_null() {
                *handle = topnode.add_node();
            }
            *handle
        });

        let position = cfg.get::<Vec3>("position");
        let rotation = cfg.get::<Vec3>("rotation");
        if position.is_some() || rotation.is_some() {
            // placed relative to the parent: needs its own node
            let handle = *child.get_or_insert_with(|| topnode.add_node());
            if let Some(placed) = topnode.node_mut(handle) {
                let transform = placed.transform_mut();
                transform.set_translation(position.unwrap_or(Vec3::ZERO));
                let degrees = rotation.unwrap_or(Vec3::ZERO);
                transform.set_rotation(Transform::rotation_from_degrees(degrees));
            }
        }

        let target = match child {
            Some(handle) => match topnode.node_mut(handle) {
                Some(target) => target,
                None => {
                    let _ = writeln!(self.error, "Scene node {handle:?} no longer exists");
                    return false;
                }
            },
            None => topnode,
        };

        let drawlist = target.drawlist_mut();
        let inserted = match cfg.get::<String>("draw").as_deref() {
            Some("emissive") => {
                drawable.decal = true;
                drawlist.emissive.insert(drawable)
            }
            Some("transparent") => drawlist.blend.insert(drawable),
            None => drawlist.opaque.insert(drawable),
            Some(other) => {
                log::warn!("Unknown draw type '{other}' for mesh {mesh_name}, not drawn");
                return true;
            }
        };
        if let Some(draw) = draw {
            *draw = inserted;
        }
        true
    }

    fn load_textures(&mut self, names: &[String]) -> Option<[Rc<Texture>; 3]> {
        let Some(diffuse) = names.first() else {
            let _ = writeln!(self.error, "No texture defined");
            return None;
        };

        let mut info = TextureInfo {
            mipmap: true,
            anisotropy: self.anisotropy,
            size: self.texture_size,
            ..TextureInfo::default()
        };
        let diffuse = self.content.load_texture(self.error, self.path, diffuse, &info);
        let misc = match names.get(1) {
            Some(name) => self.content.load_texture(self.error, self.path, name, &info),
            None => self.content.zero_texture(),
        };
        let normal = match names.get(2) {
            Some(name) => {
                // normal maps keep their precision
                info.compress = false;
                self.content.load_texture(self.error, self.path, name, &info)
            }
            None => self.content.zero_texture(),
        };
        Some([diffuse, misc, normal])
    }

    /// Mesh `name`, or its scaled variant cached as `name + scale` when `scale` is set.
    fn load_model(&mut self, name: &str, cfg: &ConfigTree) -> Option<Rc<Model>> {
        let model = self.content.load_model(self.error, self.path, name)?;

        let Some(scale_text) = cfg.get::<String>("scale") else {
            return Some(model);
        };
        let scaled_name = format!("{name}{scale_text}");
        if let Some(scaled) = self.content.get_model(self.path, &scaled_name) {
            return Some(scaled);
        }

        let Some(scale) = Vec3::parse_value(&scale_text) else {
            let _ = writeln!(self.error, "Invalid scale '{scale_text}' for mesh {name}");
            return None;
        };
        let mut mesh = model.mesh().clone();
        mesh.scale(scale.x, scale.y, scale.z);
        self.content
            .load_model_from_mesh(self.error, self.path, &scaled_name, &mesh)
    }
}
