use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::settings::SceneSettings;

#[derive(Parser, Debug)]
#[command(about = "Comet Observatory hub with warp domes and a hidden room", version)]
pub struct Args {
    /// Open the window fullscreen instead of windowed
    #[arg(long)]
    pub fullscreen: bool,

    /// Seed the random source so warps, pulls and dialogue repeat run to run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Chance that entering an ordinary room arms the pull into the secret zone
    #[arg(long, default_value_t = 0.05, value_parser = finite::<f64>)]
    pub secret_chance: f64,

    /// Seconds between arming the pull and being pulled
    #[arg(long, default_value_t = 1.2, value_parser = finite::<f64>)]
    pub secret_delay: f64,

    /// Clear a pending pull whenever the player warps somewhere else first
    #[arg(long)]
    pub cancel_pending: bool,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 92.0, value_parser = finite::<f32>)]
    pub fov: f32,
}

/// Parses a number, refusing NaN and the infinities.
fn finite<T>(raw: &str) -> Result<T, String>
where
    T: FromStr + Copy + Into<f64>,
{
    let value: T = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    let wide: f64 = value.into();
    if wide.is_finite() {
        Ok(value)
    } else {
        Err(format!("`{raw}` is not a finite number"))
    }
}

impl Args {
    pub fn into_settings(self) -> SceneSettings {
        SceneSettings {
            fullscreen: self.fullscreen,
            seed: self.seed,
            secret_chance: self.secret_chance.clamp(0.0, 1.0),
            secret_delay: Duration::from_millis((self.secret_delay.max(0.0) * 1000.0).round() as u64),
            cancel_pending_on_transition: self.cancel_pending,
            fov_degrees: self.fov.clamp(30.0, 150.0),
            ..SceneSettings::default()
        }
    }
}
