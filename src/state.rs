use std::time::Duration;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::rooms::{descriptor_of, RoomId};
use crate::settings::SceneSettings;

/// Monotonic time since startup.
pub type Timestamp = Duration;

pub const GLITCH_WARNING: &str = "A strange force pulls you away...";

/// Per-tick ordering: input → dispatch → timers → render.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Input,
    Dispatch,
    Timers,
    Render,
}

/// Outbound commands for the scene collaborator.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum RenderCommand {
    SetAvatarPosition(Vec3),
    SetCameraPosition(Vec3),
    SetAmbientTint(Color),
    Narrate(String),
}

pub trait RenderSink {
    fn emit(&mut self, command: RenderCommand);
}

impl RenderSink for Vec<RenderCommand> {
    fn emit(&mut self, command: RenderCommand) {
        self.push(command);
    }
}

impl RenderSink for EventWriter<'_, RenderCommand> {
    fn emit(&mut self, command: RenderCommand) {
        self.send(command);
    }
}

#[derive(Resource)]
pub struct RoomRng(pub Box<dyn RngCore + Send + Sync>);

impl RoomRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(Box::new(StdRng::seed_from_u64(seed))),
            None => Self(Box::new(StdRng::from_entropy())),
        }
    }
}

impl FromWorld for RoomRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world.get_resource::<SceneSettings>().and_then(|s| s.seed);
        Self::from_seed(seed)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingTransition {
    pub target: RoomId,
    pub fire_at: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameState {
    current_room: RoomId,
    pending_transition: Option<PendingTransition>,
}

impl GameState {
    pub fn current_room(&self) -> RoomId {
        self.current_room
    }

    pub fn pending_transition(&self) -> Option<PendingTransition> {
        self.pending_transition
    }
}

/// Tuning for the delayed pull into the secret zone.
#[derive(Clone, Debug, PartialEq)]
pub struct SecretPull {
    pub chance: f64,
    pub delay: Duration,
    pub cancel_on_transition: bool,
}

impl From<&SceneSettings> for SecretPull {
    fn from(settings: &SceneSettings) -> Self {
        Self {
            chance: settings.secret_chance,
            delay: settings.secret_delay,
            cancel_on_transition: settings.cancel_pending_on_transition,
        }
    }
}

/// Sole owner and writer of the `GameState`.
#[derive(Resource, Debug)]
pub struct RoomStateMachine {
    state: GameState,
    pull: SecretPull,
}

impl FromWorld for RoomStateMachine {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<SceneSettings>()
            .cloned()
            .unwrap_or_default();
        Self::new(SecretPull::from(&settings))
    }
}

impl RoomStateMachine {
    pub fn new(pull: SecretPull) -> Self {
        Self {
            state: GameState::default(),
            pull,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_room(&self) -> RoomId {
        self.state.current_room
    }

    pub fn pending_transition(&self) -> Option<PendingTransition> {
        self.state.pending_transition
    }

    pub fn pull_mut(&mut self) -> &mut SecretPull {
        &mut self.pull
    }

    /// Enters `target`, re-posing avatar and camera and retinting the sky. Any
    /// non-secret entry rolls once for a delayed pull into the secret zone.
    pub fn transition(
        &mut self,
        target: RoomId,
        now: Timestamp,
        rng: &mut dyn RngCore,
        sink: &mut impl RenderSink,
    ) {
        let from = self.state.current_room;
        self.state.current_room = target;
        debug!("room transition {:?} -> {:?}", from, target);

        if self.pull.cancel_on_transition {
            if let Some(stale) = self.state.pending_transition.take() {
                debug!("cancelled pending pull due at {:?}", stale.fire_at);
            }
        }

        let room = descriptor_of(target);
        sink.emit(RenderCommand::SetAvatarPosition(room.spawn_position));
        sink.emit(RenderCommand::SetCameraPosition(room.camera_position));
        sink.emit(RenderCommand::SetAmbientTint(room.ambient_tint));
        sink.emit(RenderCommand::Narrate(room.flavor_text.to_string()));

        if target == RoomId::SecretZone {
            return;
        }
        let sample: f64 = rng.gen();
        if sample >= self.pull.chance {
            return;
        }
        if let Some(pending) = self.state.pending_transition {
            debug!("pull already armed for {:?}, not re-arming", pending.fire_at);
            return;
        }
        let fire_at = now + self.pull.delay;
        self.state.pending_transition = Some(PendingTransition {
            target: RoomId::SecretZone,
            fire_at,
        });
        debug!("secret pull armed, fires at {:?}", fire_at);
        sink.emit(RenderCommand::Narrate(GLITCH_WARNING.to_string()));
    }

    /// Fires the pending transition once `now` reaches its deadline.
    pub fn poll(
        &mut self,
        now: Timestamp,
        rng: &mut dyn RngCore,
        sink: &mut impl RenderSink,
    ) -> Option<RoomId> {
        let pending = self.state.pending_transition?;
        if now < pending.fire_at {
            return None;
        }
        self.state.pending_transition = None;
        self.transition(pending.target, now, rng, sink);
        Some(pending.target)
    }
}

pub struct RoomStatePlugin;
impl Plugin for RoomStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoomStateMachine>()
            .init_resource::<RoomRng>()
            .add_event::<RenderCommand>()
            .configure_sets(
                Update,
                (
                    TickSet::Input,
                    TickSet::Dispatch,
                    TickSet::Timers,
                    TickSet::Render,
                )
                    .chain(),
            )
            .add_systems(Startup, enter_observatory)
            .add_systems(Update, fire_pending_transition.in_set(TickSet::Timers));
    }
}

pub const CONTROLS_LINE: &str =
    "Controls: WASD to move, Mouse to look, Space to jump, LMB near warp/star, 'R' to return to Observatory.";

fn enter_observatory(
    time: Res<Time>,
    mut machine: ResMut<RoomStateMachine>,
    mut rng: ResMut<RoomRng>,
    mut commands: EventWriter<RenderCommand>,
) {
    machine.transition(
        RoomId::Observatory,
        time.elapsed(),
        rng.0.as_mut(),
        &mut commands,
    );
    commands.send(RenderCommand::Narrate(CONTROLS_LINE.to_string()));
}

fn fire_pending_transition(
    time: Res<Time>,
    mut machine: ResMut<RoomStateMachine>,
    mut rng: ResMut<RoomRng>,
    mut commands: EventWriter<RenderCommand>,
) {
    if let Some(room) = machine.poll(time.elapsed(), rng.0.as_mut(), &mut commands) {
        debug!("pending pull fired into {:?}", room);
    }
}
