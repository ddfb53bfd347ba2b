use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::config::ChannelOrder;
use crate::media::RawFrame;

pub const INPUT_SIZE: usize = 224;
pub const CHANNELS: usize = 3;

/// Classifier input: shape (1, 224, 224, 3), values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array4<f32>);

impl NormalizedTensor {
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameNormalizer {
    channel_order: ChannelOrder,
}

impl FrameNormalizer {
    pub fn new(channel_order: ChannelOrder) -> Self {
        Self { channel_order }
    }

    /// Stretches the frame to 224x224 (aspect ratio is not kept) and scales
    /// each channel by 1/255.
    pub fn normalize(&self, frame: RawFrame) -> NormalizedTensor {
        let size = INPUT_SIZE as u32;
        let resized = imageops::resize(frame.pixels(), size, size, FilterType::Triangle);

        let order = self.channel_order;
        let tensor = Array4::from_shape_fn((1, INPUT_SIZE, INPUT_SIZE, CHANNELS), |(_, y, x, c)| {
            let pixel = resized.get_pixel(x as u32, y as u32);
            let channel = match order {
                ChannelOrder::Rgb => c,
                ChannelOrder::Bgr => CHANNELS - 1 - c,
            };
            f32::from(pixel[channel]) / 255.0
        });
        NormalizedTensor(tensor)
    }
}
