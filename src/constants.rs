/// Audio and frame-driver tuning constants.
///
/// The soundscape is fixed by design; these values keep magic numbers out of
/// the graph builder and the lifecycle controller.
// Noise loop layer
pub const NOISE_LOOP_SECONDS: f32 = 4.0;
pub const NOISE_AMPLITUDE: f32 = 0.6;
pub const NOISE_ENVELOPE_EXPONENT: f32 = 1.8;
pub const NOISE_LOWPASS_HZ: f32 = 1800.0;
pub const NOISE_LOWPASS_Q: f32 = 0.8;
pub const NOISE_GAIN: f32 = 0.35;

// Shimmer layer
pub const SHIMMER_HZ: f32 = 420.0;
pub const SHIMMER_FLOOR: f32 = 0.0001; // base value of the modulated gain
pub const LFO_HZ: f32 = 0.28;
pub const LFO_DEPTH: f32 = 0.12;

// Output
pub const MASTER_GAIN: f32 = 0.2;

// Lifecycle
pub const RESUME_RETRY_LIMIT: u32 = 3; // extra resume calls while the device stays suspended

// Seed streams derived from the configured seed
pub const DROPLET_SEED_STREAM: u64 = 1;
pub const SPARKLE_SEED_STREAM: u64 = 2;
pub const NOISE_SEED_STREAM: u64 = 3;
