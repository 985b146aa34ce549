//! Scene graph service seam
//!
//! The app only ever talks to a `SceneGraph`: it uploads rasters, creates a
//! handful of meshes once, then moves/recolors them every frame. The wgpu
//! implementation lives in `renderer`; `HeadlessScene` records calls for
//! tests and the native driver.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::texture::Raster;

/// Half of the visible board-space height on a landscape viewport
pub const VIEW_HALF_EXTENT: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::new(scale, scale, 1.0))
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local point to world space
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Geometry in local units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshKind {
    /// Unit square centered on the origin (-0.5..0.5)
    Quad,
    /// Annulus of outer radius 1; `inner` is the inner radius
    Ring { inner: f32, segments: u32 },
    /// One small square per point, positions in world space
    Points { size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDesc {
    pub kind: MeshKind,
    pub texture: Option<TextureId>,
    pub color: [f32; 4],
    pub transform: Transform,
    pub visible: bool,
}

impl MeshDesc {
    pub fn new(kind: MeshKind) -> Self {
        Self {
            kind,
            texture: None,
            color: [1.0; 4],
            transform: Transform::IDENTITY,
            visible: true,
        }
    }

    pub fn textured(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn colored(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn placed(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Orthographic camera sized so the board always fits the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    pub half_width: f32,
    pub half_height: f32,
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::for_viewport(1, 1)
    }
}

impl OrthoCamera {
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        if aspect >= 1.0 {
            Self {
                half_width: VIEW_HALF_EXTENT * aspect,
                half_height: VIEW_HALF_EXTENT,
            }
        } else {
            Self {
                half_width: VIEW_HALF_EXTENT,
                half_height: VIEW_HALF_EXTENT / aspect,
            }
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::orthographic_rh(
            -self.half_width,
            self.half_width,
            -self.half_height,
            self.half_height,
            -10.0,
            10.0,
        )
    }

    /// Pixel position inside a `width` x `height` viewport to board space
    pub fn screen_to_board(&self, px: f32, py: f32, width: f32, height: f32) -> Vec2 {
        let ndc_x = px / width.max(1.0) * 2.0 - 1.0;
        let ndc_y = 1.0 - py / height.max(1.0) * 2.0;
        Vec2::new(ndc_x * self.half_width, ndc_y * self.half_height)
    }

    /// Longest visible extent, for sizing full-screen layers
    pub fn cover_size(&self) -> f32 {
        2.0 * self.half_width.max(self.half_height)
    }
}

/// Rendering service consumed by the app
pub trait SceneGraph {
    fn create_texture(&mut self, raster: &Raster) -> TextureId;

    /// Rewrite pixels of an existing texture
    fn update_texture(&mut self, id: TextureId, raster: &Raster);

    fn create_mesh(&mut self, desc: MeshDesc) -> MeshId;

    fn set_transform(&mut self, id: MeshId, transform: Transform);

    fn set_color(&mut self, id: MeshId, color: [f32; 4]);

    /// Replace the positions of a `Points` mesh
    fn set_points(&mut self, id: MeshId, points: &[Vec3]);

    fn set_visible(&mut self, id: MeshId, visible: bool);

    /// Release a mesh and its GPU resources
    fn remove_mesh(&mut self, id: MeshId);

    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, camera: &OrthoCamera);
}

#[derive(Debug, Clone)]
pub struct MeshRecord {
    pub desc: MeshDesc,
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRecord {
    pub width: u32,
    pub height: u32,
    pub uploads: u32,
}

/// Scene graph that only keeps books
#[derive(Debug, Default)]
pub struct HeadlessScene {
    textures: HashMap<TextureId, TextureRecord>,
    meshes: HashMap<MeshId, MeshRecord>,
    next_id: u32,
    size: (u32, u32),
    frames: u64,
    removed: u32,
}

impl HeadlessScene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Default::default()
        }
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshRecord> {
        self.meshes.get(&id)
    }

    pub fn texture(&self, id: TextureId) -> Option<TextureRecord> {
        self.textures.get(&id).copied()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Total pixel uploads (creation counts as one)
    pub fn texture_uploads(&self) -> u32 {
        self.textures.values().map(|t| t.uploads).sum()
    }

    pub fn removed_meshes(&self) -> u32 {
        self.removed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl SceneGraph for HeadlessScene {
    fn create_texture(&mut self, raster: &Raster) -> TextureId {
        let id = TextureId(self.next());
        self.textures.insert(
            id,
            TextureRecord {
                width: raster.width(),
                height: raster.height(),
                uploads: 1,
            },
        );
        id
    }

    fn update_texture(&mut self, id: TextureId, raster: &Raster) {
        if let Some(tex) = self.textures.get_mut(&id) {
            tex.width = raster.width();
            tex.height = raster.height();
            tex.uploads += 1;
        }
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> MeshId {
        let id = MeshId(self.next());
        self.meshes.insert(
            id,
            MeshRecord {
                desc,
                points: Vec::new(),
            },
        );
        id
    }

    fn set_transform(&mut self, id: MeshId, transform: Transform) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.desc.transform = transform;
        }
    }

    fn set_color(&mut self, id: MeshId, color: [f32; 4]) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.desc.color = color;
        }
    }

    fn set_points(&mut self, id: MeshId, points: &[Vec3]) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.points.clear();
            mesh.points.extend_from_slice(points);
        }
    }

    fn set_visible(&mut self, id: MeshId, visible: bool) {
        if let Some(mesh) = self.meshes.get_mut(&id) {
            mesh.desc.visible = visible;
        }
    }

    fn remove_mesh(&mut self, id: MeshId) {
        if self.meshes.remove(&id).is_some() {
            self.removed += 1;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn render(&mut self, _camera: &OrthoCamera) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_keeps_board_visible() {
        let wide = OrthoCamera::for_viewport(1600, 900);
        assert_eq!(wide.half_height, VIEW_HALF_EXTENT);
        assert!(wide.half_width > wide.half_height);

        let tall = OrthoCamera::for_viewport(600, 1200);
        assert_eq!(tall.half_width, VIEW_HALF_EXTENT);
        assert!((tall.half_height - 2.6).abs() < 1e-5);
    }

    #[test]
    fn test_screen_to_board() {
        let cam = OrthoCamera::for_viewport(800, 800);
        let center = cam.screen_to_board(400.0, 400.0, 800.0, 800.0);
        assert!(center.length() < 1e-6);
        let top_left = cam.screen_to_board(0.0, 0.0, 800.0, 800.0);
        assert!((top_left - Vec2::new(-1.3, 1.3)).length() < 1e-5);
    }

    #[test]
    fn test_view_proj_maps_extent_to_ndc() {
        let cam = OrthoCamera::for_viewport(800, 800);
        let p = cam.view_proj().project_point3(Vec3::new(1.3, -1.3, 0.0));
        assert!((p.x - 1.0).abs() < 1e-5 && (p.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_apply() {
        let t = Transform::at(Vec3::new(1.0, 2.0, 0.0)).with_uniform_scale(2.0);
        assert_eq!(t.apply(Vec3::new(0.5, 0.5, 0.0)), Vec3::new(2.0, 3.0, 0.0));
        let m = t.matrix().transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((m - Vec3::new(2.0, 3.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_headless_bookkeeping() {
        let mut scene = HeadlessScene::new(10, 10);
        let tex = scene.create_texture(&Raster::new(4, 4));
        let mesh = scene.create_mesh(MeshDesc::new(MeshKind::Quad).textured(tex));
        scene.update_texture(tex, &Raster::new(4, 4));
        scene.set_points(mesh, &[Vec3::ZERO]);
        scene.set_visible(mesh, false);
        scene.render(&OrthoCamera::default());
        assert_eq!(scene.texture_uploads(), 2);
        assert!(!scene.mesh(mesh).unwrap().desc.visible);
        scene.remove_mesh(mesh);
        assert_eq!(scene.mesh_count(), 0);
        assert_eq!(scene.removed_meshes(), 1);
        assert_eq!(scene.frames(), 1);
    }
}
