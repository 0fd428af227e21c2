// FFmpeg 래퍼 모듈
// 소스 파일 정보 조회 + 썸네일용 프레임 디코딩

pub mod decoder;

pub use decoder::{probe, DecodeResult, Decoder, FfmpegProbe, Frame, MediaInfo, PixelFormat};
