use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::input::Avatar;
use crate::proximity::{AnchorKind, ProximityIndex};
use crate::rooms::RoomId;
use crate::settings::SceneSettings;
use crate::state::{RenderCommand, RenderSink, RoomRng, RoomStateMachine, TickSet, Timestamp};

pub const STAR_DIALOGUE: [&str; 4] = [
    "⭐ Star: Welcome, visitor. The galaxy remembers you.",
    "⭐ Star: Time flows strangely here. Beware the domes.",
    "⭐ Star: Have you found the secret yet?",
    "⭐ Star: Sometimes the rooms don't lead where you expect...",
];

pub const SNAP_BACK_LINE: &str = "Reality snapped back to the Observatory.";

/// One event per discrete press.
#[derive(Event, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerAction {
    Primary,
    ReturnToHub,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Warped(RoomId),
    Spoke,
    SnappedBack,
    ReturnedToHub,
    Nothing,
}

/// Resolves player actions against the anchors and drives the state machine.
pub struct InteractionDispatcher<'a> {
    pub index: &'a ProximityIndex,
    pub radius: f32,
    pub out_of_bounds_height: f32,
}

impl<'a> InteractionDispatcher<'a> {
    pub fn new(index: &'a ProximityIndex, settings: &SceneSettings) -> Self {
        Self {
            index,
            radius: settings.trigger_radius,
            out_of_bounds_height: settings.out_of_bounds_height,
        }
    }

    pub fn dispatch(
        &self,
        action: PlayerAction,
        avatar: Vec3,
        now: Timestamp,
        machine: &mut RoomStateMachine,
        rng: &mut dyn RngCore,
        sink: &mut impl RenderSink,
    ) -> Outcome {
        match action {
            PlayerAction::ReturnToHub => self.return_to_hub(now, machine, rng, sink),
            PlayerAction::Primary => self.primary(avatar, now, machine, rng, sink),
        }
    }

    /// Goes home from anywhere; the avatar's position plays no part.
    pub fn return_to_hub(
        &self,
        now: Timestamp,
        machine: &mut RoomStateMachine,
        rng: &mut dyn RngCore,
        sink: &mut impl RenderSink,
    ) -> Outcome {
        machine.transition(RoomId::Observatory, now, rng, sink);
        Outcome::ReturnedToHub
    }

    fn primary(
        &self,
        avatar: Vec3,
        now: Timestamp,
        machine: &mut RoomStateMachine,
        rng: &mut dyn RngCore,
        sink: &mut impl RenderSink,
    ) -> Outcome {
        match self.index.nearest_anchor_within(avatar, self.radius) {
            Some(anchor) => match anchor.kind {
                AnchorKind::WarpPad(target) => {
                    machine.transition(target, now, rng, sink);
                    Outcome::Warped(target)
                }
                AnchorKind::Npc => {
                    if let Some(line) = STAR_DIALOGUE.choose(rng) {
                        sink.emit(RenderCommand::Narrate(line.to_string()));
                    }
                    Outcome::Spoke
                }
            },
            None if avatar.y.abs() > self.out_of_bounds_height => {
                sink.emit(RenderCommand::Narrate(SNAP_BACK_LINE.to_string()));
                machine.transition(RoomId::Observatory, now, rng, sink);
                Outcome::SnappedBack
            }
            None => Outcome::Nothing,
        }
    }
}

pub struct DispatchPlugin;
impl Plugin for DispatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProximityIndex>()
            .add_event::<PlayerAction>()
            .add_systems(Update, dispatch_actions.in_set(TickSet::Dispatch));
    }
}

fn dispatch_actions(
    time: Res<Time>,
    settings: Res<SceneSettings>,
    index: Res<ProximityIndex>,
    avatar_q: Query<&Transform, With<Avatar>>,
    mut actions: EventReader<PlayerAction>,
    mut machine: ResMut<RoomStateMachine>,
    mut rng: ResMut<RoomRng>,
    mut commands: EventWriter<RenderCommand>,
) {
    let avatar = avatar_q.get_single().map(|t| t.translation).ok();
    let dispatcher = InteractionDispatcher::new(&index, &settings);
    let now = time.elapsed();
    for action in actions.read() {
        let outcome = match (*action, avatar) {
            (PlayerAction::ReturnToHub, _) => {
                dispatcher.return_to_hub(now, &mut machine, rng.0.as_mut(), &mut commands)
            }
            (PlayerAction::Primary, Some(at)) => dispatcher.dispatch(
                *action,
                at,
                now,
                &mut machine,
                rng.0.as_mut(),
                &mut commands,
            ),
            (PlayerAction::Primary, None) => {
                debug!("primary press with no avatar in the scene, dropped");
                continue;
            }
        };
        debug!("{:?} at {:?}: {:?}", action, avatar, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::descriptor_of;
    use crate::state::tests::{high_rng, low_rng};
    use crate::state::{RoomStatePlugin, SecretPull};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn machine() -> RoomStateMachine {
        RoomStateMachine::new(SecretPull::from(&SceneSettings::default()))
    }

    fn press_with(
        machine: &mut RoomStateMachine,
        action: PlayerAction,
        avatar: Vec3,
        rng: &mut dyn RngCore,
    ) -> (Outcome, Vec<RenderCommand>) {
        let index = ProximityIndex::default();
        let settings = SceneSettings::default();
        let dispatcher = InteractionDispatcher::new(&index, &settings);
        let mut out = Vec::new();
        let outcome = dispatcher.dispatch(
            action,
            avatar,
            Duration::from_secs(1),
            machine,
            rng,
            &mut out,
        );
        (outcome, out)
    }

    fn press(
        machine: &mut RoomStateMachine,
        action: PlayerAction,
        avatar: Vec3,
    ) -> (Outcome, Vec<RenderCommand>) {
        press_with(machine, action, avatar, &mut high_rng())
    }

    #[test]
    fn red_pad_warps_to_red_dome() {
        let mut m = machine();
        let (outcome, out) = press(&mut m, PlayerAction::Primary, Vec3::new(11.0, 1.0, 0.0));
        assert_eq!(outcome, Outcome::Warped(RoomId::RedDome));
        assert_eq!(m.current_room(), RoomId::RedDome);
        assert_eq!(
            out.first(),
            Some(&RenderCommand::SetAvatarPosition(Vec3::new(11.0, 3.0, 0.0)))
        );
    }

    #[test]
    fn green_and_cyan_pads_warp() {
        let mut m = machine();
        press(&mut m, PlayerAction::Primary, Vec3::new(-11.0, 0.5, 0.0));
        assert_eq!(m.current_room(), RoomId::GreenDome);
        press(&mut m, PlayerAction::Primary, Vec3::new(0.0, 0.0, 10.5));
        assert_eq!(m.current_room(), RoomId::CyanDome);
    }

    #[test]
    fn star_speaks_without_changing_room() {
        let mut m = machine();
        let mut rng = StdRng::seed_from_u64(3313);
        let (outcome, out) = press_with(
            &mut m,
            PlayerAction::Primary,
            Vec3::new(0.0, 2.5, 0.0),
            &mut rng,
        );
        assert_eq!(outcome, Outcome::Spoke);
        assert_eq!(m.current_room(), RoomId::Observatory);
        assert_eq!(out.len(), 1);
        let RenderCommand::Narrate(line) = &out[0] else {
            panic!("expected dialogue, got {:?}", out[0]);
        };
        assert!(STAR_DIALOGUE.contains(&line.as_str()));
    }

    #[test]
    fn star_dialogue_uses_injected_rng() {
        let mut m = machine();
        let (_, out) = press_with(
            &mut m,
            PlayerAction::Primary,
            Vec3::new(0.0, 3.0, 0.0),
            &mut low_rng(),
        );
        assert_eq!(out, vec![RenderCommand::Narrate(STAR_DIALOGUE[0].to_string())]);
    }

    #[test]
    fn falling_out_of_bounds_snaps_back() {
        let mut m = machine();
        press(&mut m, PlayerAction::Primary, Vec3::new(11.0, 1.0, 0.0));
        let (outcome, out) = press(&mut m, PlayerAction::Primary, Vec3::new(0.0, 20.0, 0.0));
        assert_eq!(outcome, Outcome::SnappedBack);
        assert_eq!(m.current_room(), RoomId::Observatory);
        assert_eq!(out[0], RenderCommand::Narrate(SNAP_BACK_LINE.to_string()));
        assert_eq!(
            out[1],
            RenderCommand::SetAvatarPosition(descriptor_of(RoomId::Observatory).spawn_position)
        );

        let (outcome, _) = press(&mut m, PlayerAction::Primary, Vec3::new(40.0, -16.0, 3.0));
        assert_eq!(outcome, Outcome::SnappedBack);
    }

    #[test]
    fn in_bounds_miss_is_a_no_op() {
        let mut m = machine();
        press(&mut m, PlayerAction::Primary, Vec3::new(0.0, 1.0, 11.0));
        let (outcome, out) = press(&mut m, PlayerAction::Primary, Vec3::new(6.0, 0.0, 6.0));
        assert_eq!(outcome, Outcome::Nothing);
        assert!(out.is_empty());
        assert_eq!(m.current_room(), RoomId::CyanDome);
    }

    #[test]
    fn return_to_hub_ignores_position() {
        let mut m = machine();
        press(&mut m, PlayerAction::Primary, Vec3::new(0.0, 1.0, 11.0));
        assert_eq!(m.current_room(), RoomId::CyanDome);
        // standing right on the red pad does not matter
        let (outcome, _) = press(&mut m, PlayerAction::ReturnToHub, Vec3::new(11.0, 1.0, 0.0));
        assert_eq!(outcome, Outcome::ReturnedToHub);
        assert_eq!(m.current_room(), RoomId::Observatory);
    }

    fn headless_app() -> App {
        let mut app = App::new();
        app.insert_resource(SceneSettings::default())
            .init_resource::<Time>()
            .insert_resource(RoomRng(Box::new(high_rng())))
            .add_plugins((RoomStatePlugin, DispatchPlugin));
        app
    }

    fn place_avatar(app: &mut App, at: Vec3) -> Entity {
        app.world_mut()
            .spawn((Avatar::default(), Transform::from_translation(at)))
            .id()
    }

    #[test]
    fn queued_action_warps_through_the_app() {
        let mut app = headless_app();
        place_avatar(&mut app, Vec3::new(11.0, 1.0, 0.0));
        app.update();
        app.world_mut().send_event(PlayerAction::Primary);
        app.update();
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::RedDome
        );

        app.world_mut().send_event(PlayerAction::ReturnToHub);
        app.update();
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::Observatory
        );
    }

    #[test]
    fn return_to_hub_needs_no_avatar() {
        let mut app = headless_app();
        app.update();
        let mut out: Vec<RenderCommand> = Vec::new();
        app.world_mut().resource_mut::<RoomStateMachine>().transition(
            RoomId::CyanDome,
            Duration::ZERO,
            &mut high_rng(),
            &mut out,
        );

        app.world_mut().send_event(PlayerAction::ReturnToHub);
        app.update();
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::Observatory
        );
    }

    #[test]
    fn primary_without_an_avatar_is_dropped() {
        let mut app = headless_app();
        app.update();
        app.world_mut().send_event(PlayerAction::Primary);
        app.update();
        // the press happened with nobody in the scene; it must not replay later
        place_avatar(&mut app, Vec3::new(11.0, 1.0, 0.0));
        app.update();
        assert_eq!(
            app.world().resource::<RoomStateMachine>().current_room(),
            RoomId::Observatory
        );
    }
}
