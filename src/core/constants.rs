use std::f32::consts::FRAC_PI_2;

// Shared motion and layout constants for the sliced-melon loop.

// Cut cycle (blade pass and half split share one rate)
pub const CUT_RATE: f32 = 0.6; // radians of cycle phase per second
pub const BLADE_PHASE_OFFSET: f32 = -FRAC_PI_2; // blade starts fully raised
pub const SPLIT_PHASE_OFFSET: f32 = -FRAC_PI_2; // halves start touching

// Blade poses
pub const KNIFE_GROUP_POSITION: [f32; 3] = [0.0, 0.25, 0.0];
pub const BLADE_RAISED: [f32; 2] = [1.5, 1.2]; // x, y
pub const BLADE_LOWERED: [f32; 2] = [-1.1, -0.2];
pub const BLADE_TILT_DEG: [f32; 2] = [-25.0, 18.0]; // raised -> lowered
pub const BLADE_SIZE: [f32; 3] = [0.08, 2.4, 0.35];
pub const HANDLE_RADII: [f32; 2] = [0.14, 0.2]; // top, bottom
pub const HANDLE_HEIGHT: f32 = 0.8;
pub const HANDLE_SEGMENTS: u32 = 20;
pub const HANDLE_POSITION: [f32; 3] = [0.0, -1.25, 0.0];

// Half split
pub const HALF_GAP_CLOSED: f32 = 0.05;
pub const HALF_GAP_OPEN: f32 = 0.85;
pub const HALF_OPEN_DEG: f32 = 26.0;

// Global sway and bob (continuous, not eased)
pub const SWAY_RATE: f32 = 0.2;
pub const SWAY_AMPLITUDE: f32 = 0.25; // radians
pub const BOB_RATE: f32 = 0.9;
pub const BOB_AMPLITUDE: f32 = 0.05;

// Float wobble nested inside the sway group
pub const FLOAT_SPEED: f32 = 1.8;
pub const FLOAT_ROTATION_INTENSITY: f32 = 0.6;
pub const FLOAT_INTENSITY: f32 = 0.7;

// Melon body
pub const OUTER_RADIUS: f32 = 1.10;
pub const FLESH_RADIUS: f32 = 0.95;
pub const RIND_RADIUS: f32 = 1.02;
pub const HEMISPHERE_SEGMENTS: u32 = 128;

// Seeds on each cut face
pub const SEEDS_PER_HALF: usize = 14;
pub const SEED_CLUSTER_OFFSET: [f32; 2] = [0.45, 0.2]; // x (mirrored), y
pub const SEED_ELLIPSE: [f32; 2] = [0.35, 0.25];
pub const SEED_DEPTH: f32 = 0.03;
pub const SEED_TILT: f32 = 0.3;
pub const SEED_CONE: [f32; 2] = [0.02, 0.08]; // radius, height
pub const SEED_SEGMENTS: u32 = 8;

// Juice droplets
pub const DROPLET_COUNT: usize = 60;
pub const DROPLET_RADIAL_MIN: f32 = 0.2;
pub const DROPLET_RADIAL_SPAN: f32 = 0.4;
pub const DROPLET_HEIGHT_SPAN: f32 = 0.8;
pub const DROPLET_SCALE_MIN: f32 = 0.015;
pub const DROPLET_SCALE_SPAN: f32 = 0.025;
pub const DROPLET_SPEED_MIN: f32 = 0.6;
pub const DROPLET_SPEED_SPAN: f32 = 0.8;
pub const DROPLET_ORBIT_RATE: f32 = 0.6; // relative to the droplet's local time
pub const DROPLET_BOB: f32 = 0.2;
pub const DROPLET_SEGMENTS: u32 = 16;

// Ambient sparkles
pub const SPARKLE_COUNT: usize = 80;
pub const SPARKLE_EXTENT: f32 = 3.5; // cube edge
pub const SPARKLE_SPEED: f32 = 0.2;
pub const SPARKLE_JITTER: f32 = 0.2;
pub const SPARKLE_SIZE: f32 = 2.0;
pub const SPARKLE_WORLD_SCALE: f32 = 0.006; // world radius per unit of size
pub const SPARKLE_OPACITY: f32 = 0.6;

// Camera (fixed framing)
pub const CAMERA_EYE: [f32; 3] = [0.0, 0.2, 4.5];
pub const CAMERA_FOV_DEG: f32 = 32.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Palette
pub const GLASS_COLOR: u32 = 0x71f3ff;
pub const FLESH_COLOR: u32 = 0xfe5f73;
pub const RIND_COLOR: u32 = 0x24bd62;
pub const SEED_COLOR: u32 = 0x0d1f0c;
pub const BLADE_COLOR: u32 = 0xf5f5f5;
pub const HANDLE_COLOR: u32 = 0x242424;
pub const SPARKLE_COLOR: u32 = 0xc8fbff;

// Contact shadow
pub const SHADOW_POSITION: [f32; 3] = [0.0, -1.05, 0.0];
pub const SHADOW_OPACITY: f32 = 0.45;
pub const SHADOW_SCALE: f32 = 6.0;
pub const SHADOW_BLUR: f32 = 2.2;
pub const SHADOW_FAR: f32 = 6.0;
