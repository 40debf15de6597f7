use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::transform::TransformSystem;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::dispatch::PlayerAction;
use crate::proximity::{AnchorKind, ProximityIndex};
use crate::settings::{Keybinds, SceneSettings};
use crate::state::TickSet;
use crate::MainCamera;

/// Half extent of the hub floor; outside it there is nothing to stand on.
pub const FLOOR_HALF_EXTENT: f32 = 16.0;
const TERMINAL_VELOCITY: f32 = 50.0;
const PITCH_LIMIT: f32 = 1.54;

/// The avatar body is an upright cylinder standing on its feet position.
const AVATAR_RADIUS: f32 = 0.4;
const AVATAR_HEIGHT: f32 = 1.8;
/// Warp pads are solid boxes centred on their anchors.
pub const PAD_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.0, 0.5);
/// The star is a solid sphere centred on its anchor.
pub const STAR_RADIUS: f32 = 0.45;
const SKIN: f32 = 1e-3;

/// First-person avatar. The transform translation is the feet position.
#[derive(Component, Default)]
pub struct Avatar {
    pub vertical_velocity: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub grounded: bool,
}

/// Camera placement relative to the avatar, in the avatar's heading frame
/// (negative z is behind).
#[derive(Component, Default)]
pub struct CameraRig {
    pub offset: Vec3,
}

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Keybinds>()
            .add_systems(Startup, grab_cursor)
            .add_systems(
                Update,
                (
                    cursor_toggle,
                    mouse_look,
                    walk,
                    fall,
                    action_triggers,
                    help_toggle,
                    diagnostics_toggle,
                )
                    .chain()
                    .in_set(TickSet::Input),
            )
            .add_systems(PostUpdate, follow_avatar.before(TransformSystem::TransformPropagate));
    }
}

fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    set_grab(&mut window, true);
}

fn set_grab(window: &mut Window, grabbed: bool) {
    window.cursor.visible = !grabbed;
    window.cursor.grab_mode = if grabbed {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
}

fn cursor_toggle(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    if keys.just_pressed(KeyCode::Escape) {
        set_grab(&mut window, false);
    } else if buttons.just_pressed(MouseButton::Left)
        && window.cursor.grab_mode == CursorGrabMode::None
    {
        set_grab(&mut window, true);
    }
}

fn mouse_look(
    mut motion: EventReader<MouseMotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<SceneSettings>,
    mut avatars: Query<(&mut Avatar, &mut Transform)>,
) {
    let grabbed = windows
        .get_single()
        .map(|w| w.cursor.grab_mode != CursorGrabMode::None)
        .unwrap_or(false);
    let Ok((mut avatar, mut t)) = avatars.get_single_mut() else {
        motion.clear();
        return;
    };
    for m in motion.read() {
        if !grabbed {
            continue;
        }
        avatar.yaw -= m.delta.x * settings.mouse_sensitivity;
        avatar.pitch = (avatar.pitch - m.delta.y * settings.mouse_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
    t.rotation = Quat::from_rotation_y(avatar.yaw);
}

fn walk(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    settings: Res<SceneSettings>,
    index: Res<ProximityIndex>,
    mut avatars: Query<(&Avatar, &mut Transform)>,
) {
    let dt = time.delta_seconds();
    let Ok((avatar, mut t)) = avatars.get_single_mut() else {
        return;
    };
    // x = strafe right, y = ahead
    let mut dir = Vec2::ZERO;
    if keys.pressed(keybinds.forward) || keys.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keys.pressed(keybinds.back) || keys.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if keys.pressed(keybinds.left) || keys.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keys.pressed(keybinds.right) || keys.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }

    if dir.length_squared() > 1e-6 {
        let heading = Quat::from_rotation_y(avatar.yaw);
        let ahead = heading * Vec3::NEG_Z;
        let right = heading * Vec3::X;
        let step = (ahead * dir.y + right * dir.x).normalize() * settings.move_speed * dt;
        t.translation = push_out_of_pads(t.translation + step, &index);
    }
}

/// Gravity, jumping, the hub floor and the solid pads and star. Off the floor
/// the avatar keeps falling.
fn fall(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    settings: Res<SceneSettings>,
    index: Res<ProximityIndex>,
    mut avatars: Query<(&mut Avatar, &mut Transform)>,
) {
    let dt = time.delta_seconds();
    let Ok((mut avatar, mut t)) = avatars.get_single_mut() else {
        return;
    };

    if keys.just_pressed(keybinds.jump) && avatar.grounded {
        avatar.vertical_velocity = (2.0 * settings.gravity * settings.jump_height).sqrt();
        avatar.grounded = false;
    }

    let prev_y = t.translation.y;
    avatar.vertical_velocity =
        (avatar.vertical_velocity - settings.gravity * dt).max(-TERMINAL_VELOCITY);
    t.translation.y += avatar.vertical_velocity * dt;

    if let Some(top) = landing_height(t.translation, prev_y, &index) {
        t.translation.y = top;
        avatar.vertical_velocity = 0.0;
        avatar.grounded = true;
    } else {
        avatar.grounded = false;
    }

    let pushed = push_out_of_star(t.translation, &index);
    if pushed.y > t.translation.y {
        // resting on top of the star
        avatar.vertical_velocity = 0.0;
        avatar.grounded = true;
    } else if pushed.y < t.translation.y {
        avatar.vertical_velocity = avatar.vertical_velocity.min(0.0);
    }
    t.translation = pushed;
}

fn pad_boxes(index: &ProximityIndex) -> impl Iterator<Item = Vec3> + '_ {
    index.anchors().iter().filter_map(|a| match a.kind {
        AnchorKind::WarpPad(_) => Some(a.position),
        AnchorKind::Npc => None,
    })
}

/// Closest point of a pad's footprint to `feet`, both on the ground plane.
fn footprint_closest(feet: Vec3, pad: Vec3) -> Vec2 {
    let p = Vec2::new(feet.x, feet.z);
    let c = Vec2::new(pad.x, pad.z);
    let h = Vec2::new(PAD_HALF_EXTENTS.x, PAD_HALF_EXTENTS.z);
    p.clamp(c - h, c + h)
}

/// Highest surface crossed on the way down from `prev_y` to `feet.y`: the hub
/// floor or the top of a pad under the avatar. Only lands from above, so
/// something that slipped under the floor stays lost.
fn landing_height(feet: Vec3, prev_y: f32, index: &ProximityIndex) -> Option<f32> {
    let over_floor =
        feet.x.abs() <= FLOOR_HALF_EXTENT && feet.z.abs() <= FLOOR_HALF_EXTENT;
    let pad_tops = pad_boxes(index)
        .filter(|pad| {
            let closest = footprint_closest(feet, *pad);
            closest.distance(Vec2::new(feet.x, feet.z)) < AVATAR_RADIUS
        })
        .map(|pad| pad.y + PAD_HALF_EXTENTS.y);
    over_floor
        .then_some(0.0)
        .into_iter()
        .chain(pad_tops)
        .filter(|top| prev_y >= *top && feet.y <= *top)
        .reduce(f32::max)
}

/// Moves the avatar sideways out of any pad it overlaps.
fn push_out_of_pads(mut feet: Vec3, index: &ProximityIndex) -> Vec3 {
    for pad in pad_boxes(index) {
        let bottom = pad.y - PAD_HALF_EXTENTS.y;
        let top = pad.y + PAD_HALF_EXTENTS.y;
        if feet.y >= top - SKIN || feet.y + AVATAR_HEIGHT <= bottom {
            continue;
        }
        let p = Vec2::new(feet.x, feet.z);
        let closest = footprint_closest(feet, pad);
        let delta = p - closest;
        let dist = delta.length();
        if dist >= AVATAR_RADIUS {
            continue;
        }
        let out = if dist > 1e-5 {
            closest + delta / dist * AVATAR_RADIUS
        } else {
            // centre inside the box: leave through the nearest face
            let c = Vec2::new(pad.x, pad.z);
            let h = Vec2::new(PAD_HALF_EXTENTS.x, PAD_HALF_EXTENTS.z);
            let local = p - c;
            let depth = h - local.abs();
            if depth.x < depth.y {
                Vec2::new(c.x + (h.x + AVATAR_RADIUS) * local.x.signum(), p.y)
            } else {
                Vec2::new(p.x, c.y + (h.y + AVATAR_RADIUS) * local.y.signum())
            }
        };
        feet.x = out.x;
        feet.z = out.y;
    }
    feet
}

/// Moves the avatar out of the star along the shortest way.
fn push_out_of_star(mut feet: Vec3, index: &ProximityIndex) -> Vec3 {
    let reach = AVATAR_RADIUS + STAR_RADIUS;
    for star in index.anchors().iter().filter(|a| a.kind == AnchorKind::Npc) {
        let s = star.position;
        let nearest = Vec3::new(feet.x, s.y.clamp(feet.y, feet.y + AVATAR_HEIGHT), feet.z);
        let delta = nearest - s;
        let dist = delta.length();
        if dist >= reach {
            continue;
        }
        let normal = if dist > 1e-5 { delta / dist } else { Vec3::NEG_Y };
        feet += normal * (reach - dist);
    }
    feet
}

fn action_triggers(
    mut actions: EventWriter<PlayerAction>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keybinds: Res<Keybinds>,
) {
    if mouse.just_pressed(keybinds.primary) {
        actions.send(PlayerAction::Primary);
    }
    if keys.just_pressed(keybinds.return_to_hub) {
        actions.send(PlayerAction::ReturnToHub);
    }
}

fn help_toggle(
    mut settings: ResMut<SceneSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
) {
    if keys.just_pressed(keybinds.help) {
        settings.show_help = !settings.show_help;
    }
}

fn diagnostics_toggle(
    mut settings: ResMut<SceneSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
) {
    if keys.just_pressed(keybinds.diagnostics) {
        settings.show_diagnostics = !settings.show_diagnostics;
    }
}

fn follow_avatar(
    avatars: Query<(&Avatar, &Transform), Without<MainCamera>>,
    mut cameras: Query<(&CameraRig, &mut Transform), With<MainCamera>>,
) {
    let Ok((avatar, at)) = avatars.get_single() else {
        return;
    };
    let Ok((rig, mut t)) = cameras.get_single_mut() else {
        return;
    };
    let heading = Quat::from_rotation_y(avatar.yaw);
    let local = Vec3::new(rig.offset.x, rig.offset.y, -rig.offset.z);
    t.translation = at.translation + heading * local;
    t.rotation = heading * Quat::from_rotation_x(avatar.pitch);
}
