//! Raw frame formats.
//!
//! This module describes how incoming PCM bytes are laid out and turns
//! each frame into the single f32 sample the pipeline works on:
//! - Sample format decoding (i16 / f32, little-endian)
//! - Channel selection (mono, left, right, or both averaged)

mod convert;

pub use convert::{
    f32_slice_to_f32_bytes, f32_slice_to_i16_bytes, f32_to_i16, i16_to_f32, ChannelSelection,
    FrameFormat, SampleFormat,
};
