//! On-screen pause button

use glam::Vec3;

/// What a pointer event did to the button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseInput {
    /// Not for the button; pass the event on
    Ignored,
    /// Pressed and armed; the event is consumed
    Pressed,
    /// Released over the button after a press
    Clicked,
}

#[derive(Debug, Clone)]
pub struct PauseButton {
    position: Vec3,
    radius: f32,
    pressed: bool,
    scale: f32,
}

impl PauseButton {
    /// Half the pane edge
    pub const HALF_SIZE: f32 = 1.5;

    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            pressed: false,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn hit_test(&self, pos: Vec3) -> bool {
        self.position.distance(pos) < self.radius
    }

    /// Press at a point on the button plane
    pub fn handle_press(&mut self, pos: Vec3) -> PauseInput {
        if !self.hit_test(pos) {
            return PauseInput::Ignored;
        }
        self.pressed = true;
        self.scale = 0.95;
        PauseInput::Pressed
    }

    /// Release at a point on the button plane. Always restores the scale.
    /// A release is never consumed, so platforms still see it.
    pub fn handle_release(&mut self, pos: Vec3) -> PauseInput {
        let clicked = self.pressed && self.hit_test(pos);
        self.pressed = false;
        self.scale = 1.0;
        if clicked {
            log::debug!("Pause button clicked");
            PauseInput::Clicked
        } else {
            PauseInput::Ignored
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_cycle() {
        let mut button = PauseButton::new(Vec3::new(0.0, -8.5, 70.0), 2.0);
        let on = Vec3::new(0.5, -8.0, 70.0);
        let off = Vec3::new(0.0, -5.0, 70.0);

        assert_eq!(button.handle_press(off), PauseInput::Ignored);
        assert_eq!(button.handle_release(on), PauseInput::Ignored);

        assert_eq!(button.handle_press(on), PauseInput::Pressed);
        assert_eq!(button.scale(), 0.95);
        assert_eq!(button.handle_release(on), PauseInput::Clicked);
        assert_eq!(button.scale(), 1.0);

        // Dragging off cancels
        button.handle_press(on);
        assert_eq!(button.handle_release(off), PauseInput::Ignored);
        assert_eq!(button.scale(), 1.0);
    }
}
