use bevy::prelude::*;

/// The five zones the avatar can occupy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum RoomId {
    #[default]
    Observatory,
    RedDome,
    GreenDome,
    CyanDome,
    SecretZone,
}

impl RoomId {
    pub const ALL: [RoomId; 5] = [
        RoomId::Observatory,
        RoomId::RedDome,
        RoomId::GreenDome,
        RoomId::CyanDome,
        RoomId::SecretZone,
    ];

    pub fn label(&self) -> &'static str {
        match *self {
            RoomId::Observatory => "Observatory",
            RoomId::RedDome => "Red Dome",
            RoomId::GreenDome => "Green Dome",
            RoomId::CyanDome => "Cyan Dome",
            RoomId::SecretZone => "??? Secret Zone",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomDescriptor {
    pub spawn_position: Vec3,
    pub camera_position: Vec3,
    pub ambient_tint: Color,
    pub flavor_text: &'static str,
}

/// Static room table. Exhaustive over `RoomId`, so every room has exactly one entry.
pub fn descriptor_of(room: RoomId) -> RoomDescriptor {
    match room {
        RoomId::Observatory => RoomDescriptor {
            spawn_position: Vec3::new(0.0, 2.0, 0.0),
            camera_position: Vec3::new(0.0, 5.0, -18.0),
            ambient_tint: Color::srgb_u8(40, 45, 85),
            flavor_text: "You feel a cosmic breeze. Welcome to the Observatory.",
        },
        RoomId::RedDome => RoomDescriptor {
            spawn_position: Vec3::new(11.0, 3.0, 0.0),
            camera_position: Vec3::new(11.0, 5.0, 0.0),
            ambient_tint: Color::srgb_u8(110, 40, 40),
            flavor_text: "Red Dome: Gravity feels heavy. The walls pulse faintly.",
        },
        RoomId::GreenDome => RoomDescriptor {
            spawn_position: Vec3::new(-11.0, 3.0, 0.0),
            camera_position: Vec3::new(-11.0, 5.0, 0.0),
            ambient_tint: Color::srgb_u8(38, 120, 40),
            flavor_text: "Green Dome: Music echoes in reverse. You sense being watched.",
        },
        RoomId::CyanDome => RoomDescriptor {
            spawn_position: Vec3::new(0.0, 3.0, 11.0),
            camera_position: Vec3::new(0.0, 5.0, 11.0),
            ambient_tint: Color::srgb_u8(60, 210, 240),
            flavor_text: "Cyan Dome: Time feels weird. Space loops around you.",
        },
        RoomId::SecretZone => RoomDescriptor {
            spawn_position: Vec3::new(0.0, 10.0, 0.0),
            camera_position: Vec3::new(0.0, 18.0, 0.0),
            ambient_tint: Color::srgb_u8(255, 128, 191), // pink
            flavor_text: "??? Secret Zone: Everything glitches and loops.",
        },
    }
}
