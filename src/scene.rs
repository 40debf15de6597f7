use bevy::color::LinearRgba;
use bevy::prelude::*;

use crate::input::{Avatar, CameraRig, FLOOR_HALF_EXTENT, PAD_HALF_EXTENTS, STAR_RADIUS};
use crate::proximity::{AnchorKind, ProximityIndex};
use crate::rooms::{descriptor_of, RoomId};
use crate::state::{RenderCommand, TickSet};
use crate::MainCamera;

const OBS_COLOR: Color = Color::srgb(210.0 / 255.0, 230.0 / 255.0, 1.0);
const FLOOR_COLOR: Color = Color::srgb(160.0 / 255.0, 180.0 / 255.0, 210.0 / 255.0);
const STAR_COLOR: Color = Color::srgb(1.0, 0.92, 0.016);
const ENGINE_COLOR: Color = Color::srgba(90.0 / 255.0, 90.0 / 255.0, 160.0 / 255.0, 240.0 / 255.0);
const ENGINE_CORE_COLOR: Color = Color::srgb(123.0 / 255.0, 123.0 / 255.0, 179.0 / 255.0);
const ENGINE_SPOKE_COLOR: Color = Color::srgb(81.0 / 255.0, 81.0 / 255.0, 144.0 / 255.0);
const GLASS_COLOR: Color = Color::srgba(160.0 / 255.0, 220.0 / 255.0, 1.0, 120.0 / 255.0);
const NODE_COLOR: Color = Color::srgb(0.0, 0.5, 1.0);
const ENGINE_CENTER: Vec3 = Vec3::new(0.0, 0.0, -8.0);

pub struct ScenePlugin;
impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(descriptor_of(RoomId::Observatory).ambient_tint))
            .insert_resource(AmbientLight {
                color: Color::srgb_u8(170, 170, 255),
                brightness: 300.0,
            })
            .add_systems(Startup, (spawn_hub, spawn_engine_room, spawn_avatar))
            .add_systems(Update, apply_render_commands.in_set(TickSet::Render));
    }
}

/// Dome and pad colours for a warp target.
fn room_color(room: RoomId) -> (Color, Color) {
    match room {
        RoomId::RedDome => (Color::srgb(1.0, 0.0, 0.0), Color::srgb(0.8, 0.0, 0.0)),
        RoomId::GreenDome => (Color::srgb(0.0, 1.0, 0.0), Color::srgb(0.0, 0.8, 0.0)),
        RoomId::CyanDome => (Color::srgb(0.0, 1.0, 1.0), Color::srgb(0.0, 0.8, 0.8)),
        RoomId::Observatory | RoomId::SecretZone => (OBS_COLOR, OBS_COLOR),
    }
}

fn spawn_hub(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    index: Res<ProximityIndex>,
) {
    let sphere = meshes.add(Sphere::new(0.5));
    let pad = meshes.add(Cuboid::from_size(PAD_HALF_EXTENTS * 2.0));

    commands.spawn(PbrBundle {
        mesh: meshes.add(
            Plane3d::default()
                .mesh()
                .size(FLOOR_HALF_EXTENT * 2.0, FLOOR_HALF_EXTENT * 2.0),
        ),
        material: materials.add(FLOOR_COLOR),
        ..default()
    });
    commands.spawn(PbrBundle {
        mesh: sphere.clone(),
        material: materials.add(OBS_COLOR),
        transform: Transform::from_xyz(0.0, 3.0, 0.0).with_scale(Vec3::splat(7.0)),
        ..default()
    });

    for anchor in index.anchors() {
        match anchor.kind {
            AnchorKind::WarpPad(room) => {
                let (dome_color, pad_color) = room_color(room);
                commands.spawn(PbrBundle {
                    mesh: sphere.clone(),
                    material: materials.add(dome_color),
                    transform: Transform::from_translation(anchor.position + Vec3::Y)
                        .with_scale(Vec3::splat(2.0)),
                    ..default()
                });
                commands.spawn(PbrBundle {
                    mesh: pad.clone(),
                    material: materials.add(pad_color),
                    transform: Transform::from_translation(anchor.position),
                    ..default()
                });
            }
            AnchorKind::Npc => {
                commands.spawn(PbrBundle {
                    mesh: sphere.clone(),
                    material: materials.add(StandardMaterial {
                        base_color: STAR_COLOR,
                        emissive: LinearRgba::rgb(4.0, 3.5, 0.2),
                        ..default()
                    }),
                    transform: Transform::from_translation(anchor.position)
                        .with_scale(Vec3::splat(STAR_RADIUS * 2.0)),
                    ..default()
                });
            }
        }
    }

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 3.0, -5.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
}

fn spawn_engine_room(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let cylinder = meshes.add(Cylinder::new(0.5, 1.0));
    let engine = materials.add(StandardMaterial {
        base_color: ENGINE_COLOR,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    // base
    commands.spawn(PbrBundle {
        mesh: cylinder.clone(),
        material: engine,
        transform: Transform::from_translation(ENGINE_CENTER + Vec3::Y * 1.2)
            .with_scale(Vec3::new(7.0, 0.8, 7.0)),
        ..default()
    });
    // glass ring
    commands.spawn(PbrBundle {
        mesh: meshes.add(Torus::new(3.65, 4.35)),
        material: materials.add(StandardMaterial {
            base_color: GLASS_COLOR,
            alpha_mode: AlphaMode::Blend,
            ..default()
        }),
        transform: Transform::from_translation(ENGINE_CENTER + Vec3::Y * 2.3),
        ..default()
    });
    // core
    commands.spawn(PbrBundle {
        mesh: cylinder,
        material: materials.add(ENGINE_CORE_COLOR),
        transform: Transform::from_translation(ENGINE_CENTER + Vec3::Y * 4.0)
            .with_scale(Vec3::new(2.0, 4.5, 2.0)),
        ..default()
    });

    let spoke = meshes.add(Cuboid::new(0.4, 0.4, 7.0));
    let spoke_material = materials.add(ENGINE_SPOKE_COLOR);
    for step in 0..8 {
        let angle = (step as f32 * 45.0).to_radians();
        commands.spawn(PbrBundle {
            mesh: spoke.clone(),
            material: spoke_material.clone(),
            transform: Transform::from_translation(ENGINE_CENTER + Vec3::Y * 2.0)
                .with_rotation(Quat::from_rotation_y(angle)),
            ..default()
        });
    }

    let node = meshes.add(Sphere::new(0.2));
    let node_material = materials.add(StandardMaterial {
        base_color: NODE_COLOR,
        emissive: LinearRgba::rgb(0.0, 1.5, 3.0),
        ..default()
    });
    for i in 0..8 {
        let theta = i as f32 * std::f32::consts::TAU / 8.0;
        let at = ENGINE_CENTER + Vec3::new(4.0 * theta.cos(), 2.5, 4.0 * theta.sin());
        commands.spawn(PbrBundle {
            mesh: node.clone(),
            material: node_material.clone(),
            transform: Transform::from_translation(at),
            ..default()
        });
    }
}

fn spawn_avatar(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let spawn = descriptor_of(RoomId::Observatory).spawn_position;
    commands
        .spawn((
            Avatar::default(),
            SpatialBundle::from_transform(Transform::from_translation(spawn)),
        ))
        .with_children(|parent| {
            parent.spawn(PbrBundle {
                mesh: meshes.add(Capsule3d::new(0.4, 1.0)),
                material: materials.add(Color::srgb(0.9, 1.0, 0.9)),
                transform: Transform::from_xyz(0.0, 0.9, 0.0),
                ..default()
            });
        });
}

fn apply_render_commands(
    mut commands: EventReader<RenderCommand>,
    mut avatars: Query<(&mut Avatar, &mut Transform), Without<MainCamera>>,
    mut rigs: Query<&mut CameraRig, With<MainCamera>>,
    mut clear_color: ResMut<ClearColor>,
) {
    for command in commands.read() {
        match command {
            RenderCommand::SetAvatarPosition(at) => {
                let Ok((mut avatar, mut t)) = avatars.get_single_mut() else {
                    warn!("no avatar to move to {:?}", at);
                    continue;
                };
                t.translation = *at;
                avatar.vertical_velocity = 0.0;
                avatar.grounded = false;
            }
            RenderCommand::SetCameraPosition(at) => {
                let Ok((_, avatar_t)) = avatars.get_single() else {
                    continue;
                };
                if let Ok(mut rig) = rigs.get_single_mut() {
                    rig.offset = *at - avatar_t.translation;
                }
            }
            RenderCommand::SetAmbientTint(color) => {
                clear_color.0 = *color;
            }
            RenderCommand::Narrate(line) => {
                info!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchPlugin, PlayerAction};
    use crate::settings::SceneSettings;
    use crate::state::tests::high_rng;
    use crate::state::{RoomRng, RoomStateMachine, RoomStatePlugin};

    fn headless_app() -> App {
        let mut app = App::new();
        app.insert_resource(SceneSettings::default())
            .init_resource::<Time>()
            .insert_resource(ClearColor(Color::BLACK))
            .insert_resource(RoomRng(Box::new(high_rng())))
            .add_plugins((RoomStatePlugin, DispatchPlugin))
            .add_systems(Update, apply_render_commands.in_set(TickSet::Render));
        app.world_mut()
            .spawn((CameraRig::default(), Transform::default(), MainCamera));
        app
    }

    fn spawn_avatar_at(app: &mut App, at: Vec3) -> Entity {
        app.world_mut()
            .spawn((Avatar::default(), Transform::from_translation(at)))
            .id()
    }

    fn camera_offset(app: &mut App) -> Vec3 {
        let mut rigs = app.world_mut().query::<&CameraRig>();
        rigs.single(app.world()).offset
    }

    #[test]
    fn startup_poses_avatar_in_the_hub() {
        let mut app = headless_app();
        let avatar = spawn_avatar_at(&mut app, Vec3::new(5.0, 0.0, 5.0));
        app.update();
        let hub = descriptor_of(RoomId::Observatory);
        assert_eq!(
            app.world().get::<Transform>(avatar).unwrap().translation,
            hub.spawn_position
        );
        assert_eq!(camera_offset(&mut app), hub.camera_position - hub.spawn_position);
        assert_eq!(app.world().resource::<ClearColor>().0, hub.ambient_tint);
    }

    #[test]
    fn red_pad_press_lands_avatar_in_red_dome() {
        let mut app = headless_app();
        app.update();
        let avatar = spawn_avatar_at(&mut app, Vec3::new(11.0, 1.0, 0.0));
        app.world_mut().send_event(PlayerAction::Primary);
        app.update();

        let red = descriptor_of(RoomId::RedDome);
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::RedDome
        );
        assert_eq!(
            app.world().get::<Transform>(avatar).unwrap().translation,
            Vec3::new(11.0, 3.0, 0.0)
        );
        assert_eq!(camera_offset(&mut app), red.camera_position - red.spawn_position);
        assert_eq!(app.world().resource::<ClearColor>().0, red.ambient_tint);
    }

    #[test]
    fn hub_key_from_cyan_dome_returns_home() {
        let mut app = headless_app();
        app.update();
        let avatar = spawn_avatar_at(&mut app, Vec3::new(0.0, 1.0, 11.0));
        app.world_mut().send_event(PlayerAction::Primary);
        app.update();
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::CyanDome
        );

        app.world_mut().send_event(PlayerAction::ReturnToHub);
        app.update();
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::Observatory
        );
        assert_eq!(
            app.world().get::<Transform>(avatar).unwrap().translation,
            descriptor_of(RoomId::Observatory).spawn_position
        );
    }
}
