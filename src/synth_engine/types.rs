pub type Sample = f32;

pub const NUM_CHANNELS: usize = 2;
