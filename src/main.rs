mod cli;
mod dispatch;
mod input;
mod proximity;
mod rooms;
mod scene;
mod settings;
mod state;
mod ui;

use bevy::core_pipeline::bloom::BloomSettings;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::diagnostic::{EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::WindowMode;
use clap::Parser;
use dispatch::DispatchPlugin;
use input::{CameraRig, InputPlugin};
use rooms::{descriptor_of, RoomId};
use scene::ScenePlugin;
use settings::SceneSettings;
use state::RoomStatePlugin;
use ui::UiPlugin;

fn main() {
    let settings = cli::Args::parse().into_settings();
    let mode = if settings.fullscreen {
        WindowMode::BorderlessFullscreen
    } else {
        WindowMode::Windowed
    };

    App::new()
        .insert_resource(Msaa::Sample4)
        .insert_resource(settings)
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(EntityCountDiagnosticsPlugin)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "B3313 Engine – Comet Observatory Demo".into(),
                resolution: (1400., 900.).into(),
                decorations: true,
                mode,
                ..default()
            }),
            ..default()
        }))
        .add_plugins((RoomStatePlugin, DispatchPlugin, InputPlugin, ScenePlugin, UiPlugin))
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands, settings: Res<SceneSettings>) {
    let hub = descriptor_of(RoomId::Observatory);
    commands.spawn((
        Camera3dBundle {
            camera: Camera {
                hdr: true,
                ..default()
            },
            projection: PerspectiveProjection {
                fov: settings.fov_degrees.to_radians(),
                ..default()
            }
            .into(),
            tonemapping: Tonemapping::TonyMcMapface,
            transform: Transform::from_translation(hub.camera_position),
            ..default()
        },
        BloomSettings::default(),
        CameraRig {
            offset: hub.camera_position - hub.spawn_position,
        },
        MainCamera,
    ));
}

#[derive(Component)]
pub struct MainCamera;
