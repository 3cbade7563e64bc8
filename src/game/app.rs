//! The playable game: session, menus, audio and drawing glued to the engine

use std::path::PathBuf;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use winit::keyboard::KeyCode;

use super::black_hole::BlackHole;
use super::particles::ParticleKind;
use super::pause_button::PauseButton;
use super::score::ScoreModel;
use super::session::GameSession;
use crate::assets::LevelLayout;
use crate::audio::AudioManager;
use crate::core::{EngineContext, EventQueue, Game, GameConfig, GameEvent};
use crate::input::{PointerEvent, PointerId};
use crate::renderer::{
    BlackHoleView, FlareInstance, Light, Material, MeshInstance, SceneView, UiInstance,
};
use crate::ui::font::{layout_text, layout_text_centered, pixel_size};
use crate::ui::{MenuAction, MenuManager, ScoreRow, UiQuad};

/// Wind before the first level starts
const IDLE_WIND: Vec2 = Vec2::new(0.1, 0.2);
/// Score digit height in menu space
const SCORE_TEXT_HEIGHT: f32 = 0.045;
const OVERLAY_TEXT_HEIGHT: f32 = 0.025;
const OVERLAY_COLOR: Vec4 = Vec4::new(0.6, 1.0, 0.6, 1.0);
/// Pad under each platform's ball
const PAD_SIZE: Vec3 = Vec3::new(5.0, 5.0, 0.8);
const FLARE_COLOR: Vec4 = Vec4::new(1.0, 0.85, 0.55, 0.9);
/// How long a score stays brightened after a point lands
const SCORE_FLASH_MS: f32 = 250.0;

pub struct BloksGame {
    session: GameSession,
    menu: MenuManager,
    audio: Option<AudioManager>,
    sound_dir: PathBuf,
    viewport: Vec2,
    /// Per platform, 1.0 right after a point and fading to 0.0
    score_flash: [f32; 4],
}

impl BloksGame {
    pub fn new(config: GameConfig, layout: LevelLayout, sound_dir: impl Into<PathBuf>) -> Self {
        Self {
            session: GameSession::new(config, layout),
            menu: MenuManager::new(),
            audio: None,
            sound_dir: sound_dir.into(),
            viewport: Vec2::new(1280.0, 720.0),
            score_flash: [0.0; 4],
        }
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn menu(&self) -> &MenuManager {
        &self.menu
    }

    fn apply_wind(&mut self, wind: Vec2) {
        if let Some(audio) = &mut self.audio {
            audio.apply_wind_effect(wind.x, wind.y);
        }
    }

    fn open_in_game_menu(&mut self) {
        self.menu.to_in_game_menu();
        self.apply_wind(Vec2::ZERO);
    }

    /// Returns `true` if the game should quit
    fn apply_menu_action(&mut self, action: MenuAction) -> bool {
        match action {
            MenuAction::NewGame => {
                log::info!("Starting a new game");
                self.session.load_level();
                false
            }
            MenuAction::Resume => false,
            MenuAction::Exit => true,
        }
    }

    /// Send a pointer event to the menu or, with no menu shown, to the
    /// session. Returns `true` if the game should quit.
    fn route_pointer(&mut self, event: &PointerEvent, events: &mut EventQueue) -> bool {
        if self.menu.is_menu_shown() {
            if event.id != PointerId::Mouse {
                return false;
            }
            let point = MenuManager::pointer_to_menu(event.position, self.viewport);
            return match self.menu.handle_pointer(event.phase, point) {
                Some(action) => self.apply_menu_action(action),
                None => false,
            };
        }

        if self.session.handle_pointer(event, self.viewport, events) {
            self.open_in_game_menu();
        }
        false
    }

    fn show_winning_screen(&mut self, scores: &ScoreModel) {
        let rows = scores
            .entries()
            .iter()
            .map(|entry| ScoreRow {
                label: entry.color.name().to_string(),
                score: entry.score,
                color: entry.color.rgba(),
            })
            .collect();
        self.menu.to_winning_screen(rows);
    }

    /// React to what the simulation reported last frame
    fn handle_events(&mut self, events: &EventQueue) {
        for event in events.iter() {
            match event {
                GameEvent::BlockHit { .. } => {
                    if let Some(audio) = &self.audio {
                        audio.play_hit_sound();
                    }
                }
                GameEvent::PointScored { platform, score } => {
                    if let Some(flash) = self.score_flash.get_mut(*platform) {
                        *flash = 1.0;
                    }
                    log::trace!("Platform {platform} scored, now {score}");
                }
                GameEvent::BallSpawned { platform } => {
                    log::debug!("Ball ready on platform {platform}");
                }
                GameEvent::BallLaunched { platform, impulse } => {
                    log::debug!("Platform {platform} launched a ball with impulse {impulse}");
                }
                GameEvent::BallLost { platform } => {
                    log::debug!("Platform {platform} lost a ball to the black hole");
                }
                GameEvent::LevelCleared => {
                    log::info!("Level cleared");
                }
            }
        }
    }

    #[must_use]
    pub fn score_flash(&self, platform: usize) -> f32 {
        self.score_flash.get(platform).copied().unwrap_or(0.0)
    }

    /// Advance everything that is not input. Menus freeze the world.
    fn tick(&mut self, dt_ms: f32, events: &mut EventQueue) {
        if self.menu.is_menu_shown() {
            return;
        }
        for flash in &mut self.score_flash {
            *flash = (*flash - dt_ms / SCORE_FLASH_MS).max(0.0);
        }
        if let Some(scores) = self.session.update(dt_ms, events) {
            self.show_winning_screen(&scores);
        }
        self.apply_wind(self.session.wind());
    }

    /// Collect everything to draw this frame
    pub fn build_scene(&self, overlay: Option<&[String]>) -> SceneView {
        let session = &self.session;
        let mut scene = SceneView {
            light: Light::new(session.light_position()),
            black_hole: Some(BlackHoleView {
                size: BlackHole::PANE_SIZE,
                spin: session.black_hole().rotation_matrix(),
                tint: Vec4::ONE,
            }),
            ..Default::default()
        };

        if let (Some(level), Some(transform)) = (session.level(), session.level_transform()) {
            scene.light = scene.light.with_glow(level.glow());
            let level_matrix = transform.matrix();
            let material = Material::blok();
            scene.cubes.extend(level.blocks().map(|(_, block)| {
                let local = Mat4::from_scale_rotation_translation(
                    Vec3::splat(block.half_extent * 2.0),
                    block.rotation,
                    block.center,
                );
                MeshInstance::new(level_matrix * local, &material)
            }));
        }

        let debris_size = ParticleKind::Explosion.size();
        scene.cubes.extend(session.explosions().active().map(|particle| {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(debris_size * particle.scale()),
                particle.orientation(),
                particle.position,
            );
            MeshInstance::new(model, &Material::debris(particle.color))
        }));

        for platform in session.platforms() {
            let model = Mat4::from_scale_rotation_translation(
                PAD_SIZE,
                Quat::IDENTITY,
                platform.position(),
            );
            scene.cubes.push(MeshInstance::new(
                model,
                &Material::platform(platform.color().rgba()),
            ));
        }

        let pause = session.pause_button();
        let scale = pause.scale();
        let bar = Vec3::new(0.5, PauseButton::HALF_SIZE * 1.6, 0.3) * scale;
        for offset in [-0.6, 0.6] {
            let center = pause.position() + Vec3::new(offset * scale, 0.0, 0.0);
            let model = Mat4::from_scale_rotation_translation(bar, Quat::IDENTITY, center);
            scene.cubes.push(MeshInstance::new(model, &Material::pause()));
        }

        scene.spheres.extend(
            session
                .balls()
                .into_iter()
                .map(|(transform, color)| {
                    MeshInstance::new(transform.matrix(), &Material::shiny(color))
                }),
        );

        let flare_size = ParticleKind::Light.size();
        scene
            .flares
            .extend(session.lights().active().map(|particle| {
                FlareInstance::new(
                    particle.position,
                    flare_size * particle.scale(),
                    particle.rotation.z.to_radians(),
                    FLARE_COLOR,
                )
            }));

        let mut quads = if self.menu.is_menu_shown() {
            self.menu.quads(self.viewport)
        } else {
            self.score_quads()
        };
        if let Some(lines) = overlay {
            quads.extend(self.overlay_quads(lines));
        }
        scene.ui = quads.iter().map(UiInstance::from).collect();

        scene
    }

    /// Three-digit scores next to each platform
    fn score_quads(&self) -> Vec<UiQuad> {
        let pixel = pixel_size(SCORE_TEXT_HEIGHT, self.viewport);
        let camera = self.session.camera();
        let mut quads = Vec::new();
        for platform in self.session.platforms() {
            let Some(screen) = camera.world_to_screen(platform.score_anchor(), self.viewport)
            else {
                continue;
            };
            let center = MenuManager::pointer_to_menu(screen, self.viewport);
            let base = platform.color().rgba();
            let flash = self.score_flash(platform.index()) * 0.6;
            let color = base.truncate().lerp(Vec3::ONE, flash).extend(base.w);
            quads.extend(layout_text_centered(
                &platform.score_display().text(),
                center,
                pixel,
                color,
            ));
        }
        quads
    }

    fn overlay_quads(&self, lines: &[String]) -> Vec<UiQuad> {
        let pixel = pixel_size(OVERLAY_TEXT_HEIGHT, self.viewport);
        let line_height = OVERLAY_TEXT_HEIGHT * 1.4;
        lines
            .iter()
            .enumerate()
            .flat_map(|(index, line)| {
                let origin = Vec2::new(0.01, 0.99 - index as f32 * line_height);
                layout_text(line, origin, pixel, OVERLAY_COLOR)
            })
            .collect()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
        self.session.resize(width, height);
    }
}

impl Game for BloksGame {
    fn init(&mut self, engine: &mut EngineContext) {
        self.resize(engine.width(), engine.height());

        self.audio = match AudioManager::new(&self.sound_dir) {
            Ok(audio) => Some(audio),
            Err(e) => {
                log::warn!("Audio disabled: {e}");
                None
            }
        };
        self.apply_wind(IDLE_WIND);
    }

    fn update(&mut self, engine: &mut EngineContext) {
        if engine.input.is_key_just_pressed(KeyCode::F3) {
            engine.debug.toggle();
        }
        if engine.input.is_key_just_pressed(KeyCode::Escape) && !self.menu.is_menu_shown() {
            self.open_in_game_menu();
        }

        let pointers = engine.input.pointer_events().to_vec();
        for event in &pointers {
            if self.route_pointer(event, &mut engine.events) {
                engine.quit();
                return;
            }
        }

        self.handle_events(&engine.events);
        self.tick(engine.time.delta_millis(), &mut engine.events);
    }

    fn render(&mut self, engine: &mut EngineContext) {
        let overlay = engine
            .debug
            .enabled
            .then(|| engine.debug.overlay_lines());
        let scene = self.build_scene(overlay.as_deref());

        if let Some(renderer) = engine.renderer_mut() {
            renderer.update_camera(self.session.camera());
            renderer.render(&scene);
        }
    }

    fn on_resize(&mut self, _engine: &mut EngineContext, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn shutdown(&mut self, _engine: &mut EngineContext) {
        log::info!("Shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerPhase;
    use crate::ui::MenuState;

    fn game() -> BloksGame {
        let mut config = GameConfig::default();
        config.particles.seed = Some(7);
        BloksGame::new(config, LevelLayout::default(), "does/not/exist")
    }

    fn mouse(phase: PointerPhase, position: Vec2) -> PointerEvent {
        PointerEvent {
            id: PointerId::Mouse,
            phase,
            position,
        }
    }

    #[test]
    fn test_starts_on_main_menu_with_frozen_world() {
        let mut game = game();
        let mut events = EventQueue::new();
        assert_eq!(game.menu().state(), MenuState::MainMenu);

        game.tick(100.0, &mut events);
        assert_eq!(game.session().clock_ms(), 0.0);
        assert_eq!(game.session().black_hole().spin(), 0.0);
    }

    #[test]
    fn test_new_game_loads_level_and_unfreezes() {
        let mut game = game();
        let mut events = EventQueue::new();
        assert!(!game.apply_menu_action(MenuAction::NewGame));
        game.menu.hide();
        assert!(game.session().has_level());

        game.tick(50.0, &mut events);
        assert!(game.session().clock_ms() > 0.0);
        assert_eq!(game.session().balls().len(), 4);
    }

    #[test]
    fn test_exit_requests_quit() {
        let mut game = game();
        assert!(game.apply_menu_action(MenuAction::Exit));
        assert!(!game.apply_menu_action(MenuAction::Resume));
    }

    #[test]
    fn test_touch_ignored_while_menu_shown() {
        let mut game = game();
        let mut events = EventQueue::new();
        let touch = PointerEvent {
            id: PointerId::Touch(3),
            phase: PointerPhase::Pressed,
            position: Vec2::new(640.0, 360.0),
        };
        assert!(!game.route_pointer(&touch, &mut events));
        assert_eq!(game.menu().state(), MenuState::MainMenu);
    }

    #[test]
    fn test_pause_button_opens_in_game_menu() {
        let mut game = game();
        let mut events = EventQueue::new();
        game.apply_menu_action(MenuAction::NewGame);
        game.menu.hide();

        let pause = game.session().pause_button().position();
        let screen = game
            .session()
            .camera()
            .world_to_screen(pause, game.viewport)
            .unwrap();
        game.route_pointer(&mouse(PointerPhase::Pressed, screen), &mut events);
        assert!(!game.menu().is_menu_shown());
        game.route_pointer(&mouse(PointerPhase::Released, screen), &mut events);
        assert_eq!(game.menu().state(), MenuState::InGameMenu);
    }

    #[test]
    fn test_point_scored_flashes_that_score() {
        let mut game = game();
        let mut events = EventQueue::new();
        game.apply_menu_action(MenuAction::NewGame);
        game.menu.hide();

        events.push(GameEvent::PointScored {
            platform: 2,
            score: 1,
        });
        events.push(GameEvent::BallLost { platform: 0 });
        events.push(GameEvent::LevelCleared);
        events.swap();
        game.handle_events(&events);
        assert_eq!(game.score_flash(2), 1.0);
        assert_eq!(game.score_flash(0), 0.0);

        events.swap();
        game.tick(SCORE_FLASH_MS / 2.0, &mut events);
        assert!((game.score_flash(2) - 0.5).abs() < 1e-6);
        game.tick(SCORE_FLASH_MS, &mut events);
        assert_eq!(game.score_flash(2), 0.0);
    }

    #[test]
    fn test_scene_contents() {
        let mut game = game();
        let menu_scene = game.build_scene(None);
        assert!(menu_scene.black_hole.is_some());
        assert!(!menu_scene.ui.is_empty());
        // Four pads and two pause bars, no level yet
        assert_eq!(menu_scene.cubes.len(), 6);

        game.apply_menu_action(MenuAction::NewGame);
        game.menu.hide();
        let blocks = game.session().level().map_or(0, |l| l.block_count());
        assert!(blocks > 0);
        let scene = game.build_scene(None);
        assert_eq!(scene.cubes.len(), blocks + 6);
        // Score digits replace the menu
        assert!(!scene.ui.is_empty());
    }

    #[test]
    fn test_overlay_adds_quads() {
        let game = game();
        let plain = game.build_scene(None).ui.len();
        let lines = vec!["FPS 60".to_string()];
        assert!(game.build_scene(Some(&lines)).ui.len() > plain);
    }

    #[test]
    fn test_winning_screen_rows_follow_scores() {
        use crate::game::{BallColor, ScoreEntry};

        let mut game = game();
        let mut scores = ScoreModel::default();
        scores.set_scores([
            ScoreEntry {
                score: 2,
                color: BallColor::Blue,
            },
            ScoreEntry {
                score: 5,
                color: BallColor::Red,
            },
        ]);
        game.show_winning_screen(&scores);
        assert_eq!(game.menu().state(), MenuState::WinningScreen);
        assert_eq!(game.menu().scores()[0].label, "RED");
        assert_eq!(game.menu().scores()[1].score, 2);
    }
}
