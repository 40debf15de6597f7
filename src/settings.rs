use std::time::Duration;

use bevy::prelude::*;

use crate::proximity::DEFAULT_TRIGGER_RADIUS;

#[derive(Resource, Clone, Debug)]
pub struct SceneSettings {
    pub trigger_radius: f32,
    pub out_of_bounds_height: f32,
    pub secret_chance: f64,
    pub secret_delay: Duration,
    // Off: a pull armed before a manual warp still fires afterwards.
    pub cancel_pending_on_transition: bool,
    pub seed: Option<u64>,
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_height: f32,
    pub mouse_sensitivity: f32,
    pub fov_degrees: f32,
    pub fullscreen: bool,
    pub show_help: bool,
    pub show_diagnostics: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            trigger_radius: DEFAULT_TRIGGER_RADIUS,
            out_of_bounds_height: 15.0,
            secret_chance: 0.05,
            secret_delay: Duration::from_millis(1200),
            cancel_pending_on_transition: false,
            seed: None,
            move_speed: 7.0,
            gravity: 20.0,
            jump_height: 2.5,
            mouse_sensitivity: 0.002,
            fov_degrees: 92.0,
            fullscreen: false,
            show_help: true,
            show_diagnostics: false,
        }
    }
}

#[derive(Resource)]
pub struct Keybinds {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub jump: KeyCode,
    pub primary: MouseButton,
    pub return_to_hub: KeyCode,
    pub help: KeyCode,
    pub diagnostics: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            jump: KeyCode::Space,
            primary: MouseButton::Left,
            return_to_hub: KeyCode::KeyR,
            help: KeyCode::KeyH,
            diagnostics: KeyCode::F3,
        }
    }
}
