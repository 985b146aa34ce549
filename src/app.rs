//! Application state and the per-frame pipeline
//!
//! `App` owns every piece of client state. `frame` runs the fixed order
//! sample aim → dispatch throw → advance flight → advance sparkles →
//! sync scene → render. Network work happens outside: a dispatched throw
//! comes back as a `ThrowTicket` for the session to send, and its answer is
//! fed back through `resolve_throw`.

use glam::{Vec2, Vec3};

use crate::hud::{FpsCounter, HudController, HudView};
use crate::leaderboard::LeaderboardPanel;
use crate::net::{ApiError, GameState, ThrowRequest, ThrowResult};
use crate::scene::{MeshDesc, MeshId, MeshKind, OrthoCamera, SceneGraph, TextureId, Transform};
use crate::settings::Settings;
use crate::sim::{
    AimController, AimInput, AimMode, AimSample, DartFlight, FlightEvent, SeededRng,
    SparkleField, classify, is_celebratory,
};
use crate::texture::{LayerKind, TextureCache};

/// Mixed into the game seed for cosmetic randomness
const FX_SEED_SALT: u32 = 0xA5C3_17D1;

const RETICLE_Z: f32 = 0.1;
const RETICLE_INNER: f32 = 0.86;
const RETICLE_IDLE: [f32; 4] = [1.0, 1.0, 1.0, 0.85];
const RETICLE_HOLDING: [f32; 4] = [1.0, 0.82, 0.25, 1.0];
const RETICLE_PENDING: [f32; 4] = [0.6, 0.6, 0.65, 0.9];

const DART_SCALE: Vec3 = Vec3::new(0.035, 0.24, 1.0);
/// Board quad spans radius 1
const BOARD_SCALE: f32 = 2.0;
/// Layers overscan the view so parallax never shows an edge
const LAYER_OVERSCAN: f32 = 1.15;

const SPARKLE_SIZE: f32 = 0.012;
const SPARKLE_RGB: [f32; 3] = [1.0, 0.86, 0.35];

/// A throw that has been committed locally and must be sent
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowTicket {
    /// HUD epoch at dispatch; the response is dropped if it changed
    pub epoch: u64,
    pub request: ThrowRequest,
}

/// What one frame produced
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub aim: AimSample,
    pub throw: Option<ThrowTicket>,
}

struct SceneHandles {
    layers: Vec<(LayerKind, MeshId, TextureId)>,
    reticle: MeshId,
    dart: MeshId,
    /// (burst id, points mesh)
    sparkles: Vec<(u32, MeshId)>,
}

pub struct App {
    settings: Settings,
    aim: AimController,
    flight: DartFlight,
    sparkles: SparkleField,
    hud: HudController,
    leaderboard: LeaderboardPanel,
    textures: TextureCache,
    fx_rng: SeededRng,
    input: AimInput,
    camera: OrthoCamera,
    handles: Option<SceneHandles>,
    last_frame_ms: Option<f64>,
    fps: FpsCounter,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let quality = settings.quality;
        let mut app = Self {
            aim: AimController::new(),
            flight: DartFlight::new(),
            sparkles: SparkleField::new(quality.max_bursts(), quality.particles_per_burst()),
            hud: HudController::new(),
            leaderboard: LeaderboardPanel::new(),
            textures: TextureCache::new(quality.background_size()),
            fx_rng: SeededRng::new(FX_SEED_SALT),
            input: AimInput::default(),
            camera: OrthoCamera::default(),
            handles: None,
            last_frame_ms: None,
            fps: FpsCounter::default(),
            settings,
        };
        app.apply_settings(app.settings.clone());
        app
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hud(&self) -> &HudController {
        &self.hud
    }

    pub fn aim(&self) -> &AimController {
        &self.aim
    }

    pub fn flight(&self) -> &DartFlight {
        &self.flight
    }

    pub fn sparkles(&self) -> &SparkleField {
        &self.sparkles
    }

    pub fn leaderboard(&self) -> &LeaderboardPanel {
        &self.leaderboard
    }

    pub fn leaderboard_mut(&mut self) -> &mut LeaderboardPanel {
        &mut self.leaderboard
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Take new preferences; motion and sparkle caps apply immediately
    pub fn apply_settings(&mut self, settings: Settings) {
        self.aim.set_drift_scale(settings.drift_scale());
        self.flight.set_spin_scale(settings.spin_scale());

        let bursts = settings.quality.max_bursts();
        let particles = settings.quality.particles_per_burst();
        if self.sparkles.max_bursts() != bursts || self.sparkles.particles_per_burst() != particles
        {
            self.sparkles = SparkleField::new(bursts, particles);
        }
        if !settings.sparkles {
            self.sparkles.clear();
        }
        self.settings = settings;
    }

    pub fn resize<S: SceneGraph>(&mut self, width: u32, height: u32, scene: &mut S) {
        self.camera = OrthoCamera::for_viewport(width, height);
        scene.resize(width, height);
    }

    /// Pointer-down or Space pressed
    pub fn press(&mut self) {
        self.input.press = true;
    }

    /// Pointer-up, pointer-cancel or Space released
    pub fn release(&mut self) {
        self.input.release = true;
    }

    /// Install a fresh record from the server (fetch or new game)
    pub fn replace_state(&mut self, state: GameState, now_ms: f64) {
        self.aim.reset();
        self.aim.rescale(state.darts_left, state.darts_total);
        self.flight.reset();
        self.sparkles.clear();
        self.fx_rng = SeededRng::new(state.resolved_seed() ^ FX_SEED_SALT);
        self.hud.replace_state(state, now_ms);
    }

    pub fn show_error(&mut self, error: &ApiError, now_ms: f64) {
        self.hud.show_toast(error.to_string(), now_ms);
    }

    /// Commit a throw if every guard passes: darts left, nothing in the air,
    /// no cooldown, no other request pending.
    pub fn dispatch_throw(&mut self, now_ms: f64, shot: AimSample) -> Option<ThrowTicket> {
        let state = self.hud.state()?;
        if state.darts_left <= 0
            || self.hud.is_animating()
            || self.flight.is_animating()
            || self.aim.is_pending()
            || self.aim.in_cooldown(now_ms)
        {
            log::debug!("Throw ignored by guard at {now_ms:.0}ms");
            return None;
        }

        let request = ThrowRequest {
            game_id: state.game_id.clone(),
            aim_x: shot.x,
            aim_y: shot.y,
            radius: shot.radius,
            client_elapsed_ms: self.hud.elapsed_ms(now_ms),
        };
        self.hud.set_animating(true);
        self.aim.begin_pending(shot.into());
        log::debug!(
            "Throw dispatched at ({:.3}, {:.3}) r={:.3}",
            shot.x,
            shot.y,
            shot.radius
        );
        Some(ThrowTicket {
            epoch: self.hud.epoch(),
            request,
        })
    }

    /// Apply the server's answer to a ticket. Returns true if state changed.
    pub fn resolve_throw(
        &mut self,
        ticket: ThrowTicket,
        result: Result<ThrowResult, ApiError>,
        now_ms: f64,
    ) -> bool {
        if ticket.epoch != self.hud.epoch() {
            log::warn!(
                "Dropping stale throw response (epoch {} != {})",
                ticket.epoch,
                self.hud.epoch()
            );
            return false;
        }
        self.aim.resolve_pending();

        let result = match result {
            Ok(result) => result,
            Err(err) => {
                log::warn!("Throw failed: {err}");
                self.hud.show_toast(err.to_string(), now_ms);
                self.hud.set_animating(false);
                return false;
            }
        };

        log::info!(
            "Throw {}: {} for {} ({} left)",
            result.throw_index,
            result.segment.label,
            result.segment.points,
            result.darts_left
        );
        let hit = Vec2::new(result.hit.x, result.hit.y);
        let celebrate = is_celebratory(result.segment.points);

        let Some(state) = self.hud.apply_throw(result) else {
            self.hud.set_animating(false);
            return false;
        };
        let (left, total) = (state.darts_left, state.darts_total);

        self.aim.start_cooldown(now_ms);
        self.aim.rescale(left, total);
        if !self.flight.launch(hit, now_ms, &mut self.fx_rng, celebrate) {
            self.hud.set_animating(false);
        }
        if left <= 0 {
            self.hud.schedule_summary(now_ms);
        }
        true
    }

    /// A qualifying throw sparkles on the frame its dart lands, at the hit
    /// point, not when the server result arrives
    fn on_landed(&mut self, hit: Vec2, celebrate: bool, now_ms: f64) {
        self.hud.set_animating(false);
        if celebrate && self.settings.sparkles {
            let id = self.sparkles.spawn(hit, now_ms, &mut self.fx_rng);
            log::debug!("Sparkle burst {id} at ({:.2}, {:.2})", hit.x, hit.y);
        }
    }

    /// Run one frame
    pub fn frame<S: SceneGraph>(&mut self, now_ms: f64, scene: &mut S) -> FrameReport {
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0).clamp(0.0, 0.1) as f32);
        self.last_frame_ms = Some(now_ms);
        self.fps.record(now_ms);

        let input = std::mem::take(&mut self.input);
        let can_throw = self.hud.can_throw() && !self.flight.is_animating();
        let tick = self.aim.advance(now_ms, &input, can_throw);
        let throw = tick
            .released
            .and_then(|shot| self.dispatch_throw(now_ms, shot));

        if let Some(FlightEvent::Landed { hit, celebrate }) = self.flight.advance(now_ms) {
            self.on_landed(hit, celebrate, now_ms);
        }

        self.sparkles.advance(dt);
        self.hud.advance(now_ms);

        self.sync_scene(scene, tick.sample);
        scene.render(&self.camera);

        FrameReport {
            aim: tick.sample,
            throw,
        }
    }

    pub fn hud_view(&self, now_ms: f64) -> HudView {
        let state = self.hud.state();
        let aim = self.aim.last_sample();

        let mut summary = self.hud.round_summary();
        if let Some(summary) = summary.as_mut()
            && !self.leaderboard.is_empty()
        {
            summary.rank_hint = self.leaderboard.potential_rank(summary.total_score);
        }

        HudView {
            score: state.map_or(0, |s| s.total_score),
            darts_left: state.map_or(0, |s| s.darts_left),
            darts_total: state.map_or(0, |s| s.darts_total),
            recent: self.hud.recent_throws(),
            hover: classify(aim.x, aim.y).label(),
            toast: self.hud.toast().map(|t| t.message.clone()),
            summary,
            leaderboard: self.leaderboard.is_open().then(|| self.leaderboard.rows()),
            fps: self.settings.show_fps.then(|| self.fps.fps()),
            can_throw: self.hud.can_throw()
                && !self.flight.is_animating()
                && !self.aim.in_cooldown(now_ms),
        }
    }

    /// Build the fixed scene objects on first use
    fn ensure_scene<S: SceneGraph>(&mut self, scene: &mut S) {
        if self.handles.is_some() {
            return;
        }

        let layers: Vec<_> = self
            .textures
            .layers()
            .map(|(kind, raster)| {
                let texture = scene.create_texture(raster);
                let mesh = scene.create_mesh(
                    MeshDesc::new(MeshKind::Quad)
                        .textured(texture)
                        .placed(Transform::at(Vec3::new(0.0, 0.0, kind.depth()))),
                );
                (kind, mesh, texture)
            })
            .collect();

        let board_texture = scene.create_texture(self.textures.board());
        scene.create_mesh(
            MeshDesc::new(MeshKind::Quad)
                .textured(board_texture)
                .placed(Transform::IDENTITY.with_uniform_scale(BOARD_SCALE)),
        );

        let reticle = scene.create_mesh(
            MeshDesc::new(MeshKind::Ring {
                inner: RETICLE_INNER,
                segments: 64,
            })
            .colored(RETICLE_IDLE),
        );
        let dart = scene.create_mesh(
            MeshDesc::new(MeshKind::Quad).colored(self.flight.variant().color()),
        );

        log::info!("Scene built ({} background layers)", layers.len());
        self.handles = Some(SceneHandles {
            layers,
            reticle,
            dart,
            sparkles: Vec::new(),
        });
    }

    fn sync_scene<S: SceneGraph>(&mut self, scene: &mut S, aim: AimSample) {
        self.ensure_scene(scene);
        let seed = self.hud.state().map(GameState::resolved_seed);
        let Some(handles) = self.handles.as_mut() else {
            return;
        };

        if let Some(seed) = seed
            && self.textures.apply_seed(seed)
        {
            for (kind, _, texture) in &handles.layers {
                scene.update_texture(*texture, self.textures.layer(*kind));
            }
        }

        let cover = self.camera.cover_size() * LAYER_OVERSCAN;
        for (kind, mesh, _) in &handles.layers {
            let speed = kind.parallax_speed();
            let offset = Vec3::new(-aim.x * speed, -aim.y * speed * 0.5, kind.depth());
            scene.set_transform(*mesh, Transform::at(offset).with_uniform_scale(cover));
        }

        let reticle_color = match self.aim.mode() {
            AimMode::Idle => RETICLE_IDLE,
            AimMode::Holding(_) => RETICLE_HOLDING,
            AimMode::Pending(_) => RETICLE_PENDING,
        };
        scene.set_transform(
            handles.reticle,
            Transform::at(Vec3::new(aim.x, aim.y, RETICLE_Z)).with_uniform_scale(aim.radius),
        );
        scene.set_color(handles.reticle, reticle_color);
        scene.set_visible(handles.reticle, self.hud.state().is_some());

        let pose = self.flight.pose();
        scene.set_transform(
            handles.dart,
            Transform::at(pose.position)
                .with_rotation(pose.rotation)
                .with_scale(DART_SCALE),
        );
        scene.set_color(handles.dart, self.flight.variant().color());

        let bursts = self.sparkles.bursts();
        handles.sparkles.retain(|(id, mesh)| {
            let alive = bursts.iter().any(|b| b.id == *id);
            if !alive {
                scene.remove_mesh(*mesh);
            }
            alive
        });
        for burst in bursts {
            let existing = handles
                .sparkles
                .iter()
                .find(|(id, _)| *id == burst.id)
                .map(|(_, mesh)| *mesh);
            let mesh = match existing {
                Some(mesh) => mesh,
                None => {
                    let mesh = scene.create_mesh(MeshDesc::new(MeshKind::Points {
                        size: SPARKLE_SIZE,
                    }));
                    handles.sparkles.push((burst.id, mesh));
                    mesh
                }
            };
            let points: Vec<Vec3> = burst.particles.iter().map(|p| p.position).collect();
            scene.set_points(mesh, &points);
            let [r, g, b] = SPARKLE_RGB;
            scene.set_color(mesh, [r, g, b, burst.opacity()]);
        }
    }

    /// Points meshes currently owned by live bursts
    pub fn sparkle_mesh_count(&self) -> usize {
        self.handles.as_ref().map_or(0, |h| h.sparkles.len())
    }
}
