// 썸네일 모듈 - 스크러버용 프레임 샘플링

pub mod job;
pub mod sampler;

pub use job::ThumbnailJob;
pub use sampler::{encode_jpeg, FrameSampler, FrameSource, SampleError, SamplerConfig, Thumbnail, ThumbnailStrip};
