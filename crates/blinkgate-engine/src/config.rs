use std::time::Duration;

use blinkgate_core::{BlinkConfig, GeometryConfig, MirrorScale};

/// Engine configuration, loaded from `BLINKGATE_*` environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Centered-window and face-size bounds.
    pub geometry: GeometryConfig,
    /// Blink aperture-ratio threshold.
    pub blink: BlinkConfig,
    /// Whether the oracle sees the horizontally mirrored preview.
    pub mirror: MirrorScale,
    /// Delay between the blink latch and the start of the countdown.
    pub blink_delay: Duration,
    /// Countdown length in ticks.
    pub countdown_ticks: u32,
    /// Interval between countdown ticks.
    pub tick_interval: Duration,
    /// Pacing between detection cycles, also the retry interval while the
    /// video source reports zero dimensions.
    pub frame_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            blink: BlinkConfig::default(),
            mirror: MirrorScale::Normal,
            blink_delay: Duration::from_millis(1000),
            countdown_ticks: 3,
            tick_interval: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(33),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `BLINKGATE_*` environment variables,
    /// falling back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let geometry = GeometryConfig {
            window_x_min: env_f32("BLINKGATE_WINDOW_X_MIN", defaults.geometry.window_x_min),
            window_x_max: env_f32("BLINKGATE_WINDOW_X_MAX", defaults.geometry.window_x_max),
            window_y_min: env_f32("BLINKGATE_WINDOW_Y_MIN", defaults.geometry.window_y_min),
            window_y_max: env_f32("BLINKGATE_WINDOW_Y_MAX", defaults.geometry.window_y_max),
            face_width_min: env_f32("BLINKGATE_FACE_WIDTH_MIN", defaults.geometry.face_width_min),
            face_width_max: env_f32("BLINKGATE_FACE_WIDTH_MAX", defaults.geometry.face_width_max),
            face_height_min: env_f32(
                "BLINKGATE_FACE_HEIGHT_MIN",
                defaults.geometry.face_height_min,
            ),
            face_height_max: env_f32(
                "BLINKGATE_FACE_HEIGHT_MAX",
                defaults.geometry.face_height_max,
            ),
        };

        Self {
            geometry,
            blink: BlinkConfig {
                ratio_threshold: env_f32("BLINKGATE_BLINK_RATIO", defaults.blink.ratio_threshold),
            },
            mirror: if std::env::var("BLINKGATE_MIRRORED")
                .map(|v| v != "0")
                .unwrap_or(false)
            {
                MirrorScale::Mirrored
            } else {
                MirrorScale::Normal
            },
            blink_delay: Duration::from_millis(env_u64("BLINKGATE_BLINK_DELAY_MS", 1000)),
            countdown_ticks: env_u32("BLINKGATE_COUNTDOWN_TICKS", defaults.countdown_ticks),
            tick_interval: Duration::from_millis(env_u64("BLINKGATE_TICK_INTERVAL_MS", 1000)),
            frame_interval: Duration::from_millis(env_u64("BLINKGATE_FRAME_INTERVAL_MS", 33)),
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
