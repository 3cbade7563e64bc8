//! Menu screens: main menu, in-game menu and the winning screen
//!
//! While a menu is shown the world is frozen and every pointer event goes
//! here. Pointer positions are first converted to menu space with
//! [`MenuManager::pointer_to_menu`].

use glam::{Vec2, Vec4};

use super::font::{layout_text_centered, pixel_size};
use super::rect::{Rect, RectStyle, UiQuad};
use crate::input::PointerPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    Hidden,
    #[default]
    MainMenu,
    InGameMenu,
    WinningScreen,
}

/// What the game has to do after a menu click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Load a fresh level; the menu is already hidden
    NewGame,
    /// The menu closed and the game continues
    Resume,
    /// Quit the application
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonKind {
    NewGame,
    Resume,
    Exit,
    MainMenu,
}

impl ButtonKind {
    fn label(self) -> &'static str {
        match self {
            Self::NewGame => "NEW GAME",
            Self::Resume => "RESUME",
            Self::Exit => "EXIT",
            Self::MainMenu => "MAIN MENU",
        }
    }
}

/// A score row for the winning screen
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub label: String,
    pub score: u32,
    pub color: Vec4,
}

#[derive(Debug, Default)]
pub struct MenuManager {
    state: MenuState,
    /// Button under the last press, cleared on release
    armed: Option<ButtonKind>,
    scores: Vec<ScoreRow>,
}

impl MenuManager {
    const BUTTON_SIZE: Vec2 = Vec2::new(0.32, 0.1);
    const BUTTON_GAP: f32 = 0.03;
    const TEXT_HEIGHT: f32 = 0.04;
    const TITLE_HEIGHT: f32 = 0.08;

    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a window pixel to menu space, y up
    #[must_use]
    pub fn pointer_to_menu(position: Vec2, viewport: Vec2) -> Vec2 {
        Vec2::new(
            position.x / viewport.x.max(1.0),
            1.0 - position.y / viewport.y.max(1.0),
        )
    }

    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    #[must_use]
    pub fn is_menu_shown(&self) -> bool {
        self.state != MenuState::Hidden
    }

    pub fn to_main_menu(&mut self) {
        self.set_state(MenuState::MainMenu);
    }

    pub fn to_in_game_menu(&mut self) {
        self.set_state(MenuState::InGameMenu);
    }

    /// Show final scores, which must already be sorted
    pub fn to_winning_screen(&mut self, scores: Vec<ScoreRow>) {
        self.scores = scores;
        self.set_state(MenuState::WinningScreen);
    }

    pub fn hide(&mut self) {
        self.set_state(MenuState::Hidden);
    }

    #[must_use]
    pub fn scores(&self) -> &[ScoreRow] {
        &self.scores
    }

    fn set_state(&mut self, state: MenuState) {
        log::debug!("Menu {:?} -> {:?}", self.state, state);
        self.state = state;
        self.armed = None;
    }

    fn buttons(&self) -> &'static [ButtonKind] {
        match self.state {
            MenuState::Hidden => &[],
            MenuState::MainMenu => &[ButtonKind::NewGame, ButtonKind::Exit],
            MenuState::InGameMenu => &[ButtonKind::Resume, ButtonKind::NewGame, ButtonKind::Exit],
            MenuState::WinningScreen => &[ButtonKind::MainMenu],
        }
    }

    /// Button rectangles stacked downward from just below the middle
    fn button_rects(&self) -> Vec<(ButtonKind, Rect)> {
        let top = match self.state {
            MenuState::WinningScreen => -0.3,
            _ => 0.05,
        };
        self.buttons()
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let y = top - i as f32 * (Self::BUTTON_SIZE.y + Self::BUTTON_GAP);
                let rect = Rect::centered(Vec2::new(0.5, 0.5 + y), Self::BUTTON_SIZE);
                (kind, rect)
            })
            .collect()
    }

    fn button_at(&self, point: Vec2) -> Option<ButtonKind> {
        self.button_rects()
            .into_iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(kind, _)| kind)
    }

    /// Handle a press or release at a menu-space point.
    ///
    /// A button fires when released over the same button it was pressed on.
    pub fn handle_pointer(&mut self, phase: PointerPhase, point: Vec2) -> Option<MenuAction> {
        if !self.is_menu_shown() {
            return None;
        }
        match phase {
            PointerPhase::Pressed => {
                self.armed = self.button_at(point);
                None
            }
            PointerPhase::Released => {
                let armed = self.armed.take()?;
                if self.button_at(point) != Some(armed) {
                    return None;
                }
                self.activate(armed)
            }
        }
    }

    fn activate(&mut self, button: ButtonKind) -> Option<MenuAction> {
        match button {
            ButtonKind::NewGame => {
                self.hide();
                Some(MenuAction::NewGame)
            }
            ButtonKind::Resume => {
                self.hide();
                Some(MenuAction::Resume)
            }
            ButtonKind::Exit => Some(MenuAction::Exit),
            ButtonKind::MainMenu => {
                self.to_main_menu();
                None
            }
        }
    }

    /// Quads for the current screen
    pub fn quads(&self, viewport: Vec2) -> Vec<UiQuad> {
        if !self.is_menu_shown() {
            return Vec::new();
        }
        let mut quads = vec![UiQuad::new(
            Vec2::ZERO,
            Vec2::ONE,
            Vec4::new(0.0, 0.0, 0.0, 0.6),
        )];

        let white = Vec4::ONE;
        let title = match self.state {
            MenuState::WinningScreen => "GAME OVER",
            MenuState::InGameMenu => "PAUSED",
            _ => "BLACK HOLE BLOKS",
        };
        quads.extend(layout_text_centered(
            title,
            Vec2::new(0.5, 0.8),
            pixel_size(Self::TITLE_HEIGHT, viewport),
            white,
        ));

        let text_pixel = pixel_size(Self::TEXT_HEIGHT, viewport);
        if self.state == MenuState::WinningScreen {
            for (i, row) in self.scores.iter().enumerate() {
                let y = 0.62 - i as f32 * 0.08;
                let text = format!("{:<8}{:>5}", row.label, row.score);
                quads.extend(layout_text_centered(&text, Vec2::new(0.5, y), text_pixel, row.color));
            }
        }

        let style = RectStyle::default();
        for (kind, rect) in self.button_rects() {
            let pressed = self.armed == Some(kind);
            let rect = if pressed {
                rect.with_style(style.with_background(Vec4::new(0.3, 0.22, 0.05, 0.9)))
            } else {
                rect.with_style(style)
            };
            quads.extend(rect.quads());
            quads.extend(layout_text_centered(
                kind.label(),
                rect.center,
                text_pixel,
                white,
            ));
        }
        quads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(menu: &mut MenuManager, point: Vec2) -> Option<MenuAction> {
        menu.handle_pointer(PointerPhase::Pressed, point);
        menu.handle_pointer(PointerPhase::Released, point)
    }

    fn center_of(menu: &MenuManager, kind: ButtonKind) -> Vec2 {
        menu.button_rects()
            .into_iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| r.center)
            .unwrap()
    }

    #[test]
    fn test_pointer_to_menu_flips_y() {
        let p = MenuManager::pointer_to_menu(Vec2::new(320.0, 90.0), Vec2::new(640.0, 360.0));
        assert_eq!(p, Vec2::new(0.5, 0.75));
    }

    #[test]
    fn test_new_game_from_main_menu() {
        let mut menu = MenuManager::new();
        assert_eq!(menu.state(), MenuState::MainMenu);
        let point = center_of(&menu, ButtonKind::NewGame);
        assert_eq!(click(&mut menu, point), Some(MenuAction::NewGame));
        assert!(!menu.is_menu_shown());
    }

    #[test]
    fn test_in_game_menu_buttons() {
        let mut menu = MenuManager::new();
        menu.to_in_game_menu();
        let resume = center_of(&menu, ButtonKind::Resume);
        let exit = center_of(&menu, ButtonKind::Exit);

        assert_eq!(click(&mut menu, exit), Some(MenuAction::Exit));
        assert!(menu.is_menu_shown());
        assert_eq!(click(&mut menu, resume), Some(MenuAction::Resume));
        assert_eq!(menu.state(), MenuState::Hidden);
    }

    #[test]
    fn test_release_elsewhere_cancels() {
        let mut menu = MenuManager::new();
        let new_game = center_of(&menu, ButtonKind::NewGame);
        menu.handle_pointer(PointerPhase::Pressed, new_game);
        assert_eq!(
            menu.handle_pointer(PointerPhase::Released, Vec2::new(0.02, 0.02)),
            None
        );
        assert!(menu.is_menu_shown());
    }

    #[test]
    fn test_winning_screen_returns_to_main_menu() {
        let mut menu = MenuManager::new();
        menu.to_winning_screen(vec![ScoreRow {
            label: "RED".into(),
            score: 12,
            color: Vec4::ONE,
        }]);
        assert_eq!(menu.scores().len(), 1);
        assert!(!menu.quads(Vec2::new(1280.0, 720.0)).is_empty());

        let back = center_of(&menu, ButtonKind::MainMenu);
        assert_eq!(click(&mut menu, back), None);
        assert_eq!(menu.state(), MenuState::MainMenu);
    }

    #[test]
    fn test_hidden_menu_ignores_pointer() {
        let mut menu = MenuManager::new();
        menu.hide();
        assert_eq!(click(&mut menu, Vec2::splat(0.5)), None);
        assert!(menu.quads(Vec2::new(100.0, 100.0)).is_empty());
    }
}
