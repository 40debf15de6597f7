use std::collections::VecDeque;

use bevy::diagnostic::{DiagnosticsStore, EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::egui::{self, Align2, Color32, FontId, RichText};
use bevy_egui::{EguiContexts, EguiPlugin};

use crate::input::Avatar;
use crate::settings::SceneSettings;
use crate::state::{RenderCommand, RoomStateMachine, TickSet, GLITCH_WARNING};

const NARRATION_LINES: usize = 8;

/// Most recent narrative lines, newest last.
#[derive(Resource, Default)]
pub struct NarrationLog(pub VecDeque<String>);

impl NarrationLog {
    pub fn push(&mut self, line: String) {
        if self.0.len() == NARRATION_LINES {
            self.0.pop_front();
        }
        self.0.push_back(line);
    }
}

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<NarrationLog>()
            .add_systems(Update, record_narration.in_set(TickSet::Render))
            .add_systems(Update, (ui_system, glitch_banner).after(TickSet::Render));
    }
}

fn record_narration(mut commands: EventReader<RenderCommand>, mut log: ResMut<NarrationLog>) {
    for command in commands.read() {
        if let RenderCommand::Narrate(line) = command {
            log.push(line.clone());
        }
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut settings: ResMut<SceneSettings>,
    mut machine: ResMut<RoomStateMachine>,
    log: Res<NarrationLog>,
    time: Res<Time>,
    avatar_q: Query<&Transform, With<Avatar>>,
    diagnostics: Res<DiagnosticsStore>,
) {
    egui::Window::new("Observatory").show(contexts.ctx_mut(), |ui| {
        let state = machine.state().clone();
        ui.label(format!("Room: {}", state.current_room().label()));
        if let Ok(t) = avatar_q.get_single() {
            let p = t.translation;
            ui.label(format!("Position: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
        }
        if let Some(pending) = state.pending_transition() {
            let left = pending.fire_at.saturating_sub(time.elapsed());
            ui.label(format!("Pull in {:.1}s", left.as_secs_f32()));
        }

        ui.separator();

        if ui
            .checkbox(
                &mut settings.cancel_pending_on_transition,
                "Warping cancels a pending pull",
            )
            .changed()
        {
            machine.pull_mut().cancel_on_transition = settings.cancel_pending_on_transition;
        }

        ui.separator();

        for line in &log.0 {
            ui.label(line.as_str());
        }
    });

    if settings.show_help {
        egui::Window::new("Help").show(contexts.ctx_mut(), |ui| {
            ui.label("WASD/Arrows: Move");
            ui.label("Mouse: Look");
            ui.label("Space: Jump");
            ui.label("Left Mouse: Use warp pad / talk to the star");
            ui.label("R: Return to Observatory");
            ui.label("Esc: Release cursor");
            ui.label("H: Toggle Help");
            ui.label("F3: Toggle Diagnostics");
        });
    }

    if settings.show_diagnostics {
        egui::Window::new("Diagnostics").show(contexts.ctx_mut(), |ui| {
            if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
                if let Some(value) = fps.smoothed() {
                    ui.label(format!("FPS: {:.1}", value));
                }
            }
            if let Some(entity_count) = diagnostics.get(&EntityCountDiagnosticsPlugin::ENTITY_COUNT)
            {
                if let Some(value) = entity_count.value() {
                    ui.label(format!("Entities: {}", value));
                }
            }
        });
    }
}

fn glitch_banner(mut contexts: EguiContexts, machine: Res<RoomStateMachine>) {
    if machine.pending_transition().is_none() {
        return;
    }
    egui::Area::new("glitch_banner".into())
        .anchor(Align2::CENTER_TOP, egui::Vec2::new(0.0, 24.0))
        .show(contexts.ctx_mut(), |ui| {
            let text = RichText::new(GLITCH_WARNING)
                .font(FontId::proportional(32.0))
                .color(Color32::from_rgb(255, 128, 191));
            ui.label(text);
        });
}
