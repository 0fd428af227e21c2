// 프레임 샘플러 - 스크러버 썸네일 스트립 생성
// 하나의 미디어 소스는 재생 위치가 하나뿐이므로 seek → 준비 대기 → 캡처를 엄격히 순차 실행
// 중간 실패 시 그때까지의 썸네일 + 에러를 돌려줌 (타임라인은 계속 사용 가능)

use thiserror::Error;

use crate::ffmpeg::{Frame, PixelFormat};

/// 썸네일을 뽑아낼 미디어 소스 (숨겨진 재생 요소 역할)
pub trait FrameSource {
    /// timestamp로 이동하고 해당 프레임이 준비될 때까지 대기
    fn seek(&mut self, timestamp_ms: i64) -> Result<(), String>;
    /// 현재 위치의 프레임을 RGBA로 캡처
    fn capture(&mut self) -> Result<Frame, String>;
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("Invalid video duration: {0}ms")]
    InvalidDuration(i64),
    #[error("Seek to {timestamp_ms}ms failed: {reason}")]
    Seek { timestamp_ms: i64, reason: String },
    #[error("Frame capture at {timestamp_ms}ms failed: {reason}")]
    Capture { timestamp_ms: i64, reason: String },
    #[error("Thumbnail encoding at {timestamp_ms}ms failed: {reason}")]
    Encode { timestamp_ms: i64, reason: String },
    #[error("Thumbnail generation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// 스트립 썸네일 개수
    pub thumbnail_count: usize,
    pub thumb_width: u32,
    pub thumb_height: u32,
    /// JPEG 품질 (1~100)
    pub jpeg_quality: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            thumbnail_count: 20,
            thumb_width: 160,
            thumb_height: 90,
            jpeg_quality: 70,
        }
    }
}

/// JPEG 인코딩된 썸네일 한 장
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub timestamp_ms: i64,
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// 샘플링 결과 (error가 있으면 thumbnails는 부분 결과)
#[derive(Debug, Clone, Default)]
pub struct ThumbnailStrip {
    pub thumbnails: Vec<Thumbnail>,
    pub error: Option<SampleError>,
}

/// RGBA 프레임 → JPEG (알파 채널 제거)
pub fn encode_jpeg(frame: Frame, quality: u8) -> Result<Thumbnail, String> {
    if frame.format != PixelFormat::RGBA {
        return Err(format!("Unsupported pixel format: {:?}", frame.format));
    }

    let (width, height, timestamp_ms) = (frame.width, frame.height, frame.timestamp_ms);
    let rgba = image::RgbaImage::from_raw(width, height, frame.data)
        .ok_or_else(|| format!("Frame buffer does not match {}x{}", width, height))?;
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| format!("JPEG encode failed: {}", e))?;

    Ok(Thumbnail {
        timestamp_ms,
        width,
        height,
        jpeg,
    })
}

pub struct FrameSampler {
    config: SamplerConfig,
}

impl FrameSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// 균등 간격 타임스탬프: i * duration / count
    pub fn timestamps(&self, duration_ms: i64) -> Vec<i64> {
        let count = self.config.thumbnail_count as i64;
        if count == 0 || duration_ms <= 0 {
            return Vec::new();
        }
        (0..count).map(|i| i * duration_ms / count).collect()
    }

    pub fn sample(&self, source: &mut dyn FrameSource, duration_ms: i64) -> ThumbnailStrip {
        self.sample_with(source, duration_ms, &mut |_, _, _| true)
    }

    /// on_thumbnail(썸네일, 완료 개수, 전체 개수) → false 반환 시 중단
    pub fn sample_with(
        &self,
        source: &mut dyn FrameSource,
        duration_ms: i64,
        on_thumbnail: &mut dyn FnMut(&Thumbnail, usize, usize) -> bool,
    ) -> ThumbnailStrip {
        let mut strip = ThumbnailStrip::default();
        if duration_ms <= 0 {
            strip.error = Some(SampleError::InvalidDuration(duration_ms));
            return strip;
        }

        let timestamps = self.timestamps(duration_ms);
        let total = timestamps.len();

        for timestamp_ms in timestamps {
            match self.capture_one(source, timestamp_ms) {
                Ok(thumbnail) => {
                    let keep_going = on_thumbnail(&thumbnail, strip.thumbnails.len() + 1, total);
                    strip.thumbnails.push(thumbnail);
                    if !keep_going {
                        strip.error = Some(SampleError::Cancelled);
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("thumbnail sampling stopped: {}", e);
                    strip.error = Some(e);
                    break;
                }
            }
        }

        // 재생 위치 원위치
        if let Err(e) = source.seek(0) {
            log::warn!("thumbnail source reset failed: {}", e);
        }

        log::info!(
            "thumbnail sampling done: {}/{} frames{}",
            strip.thumbnails.len(),
            total,
            if strip.error.is_some() { " (partial)" } else { "" }
        );
        strip
    }

    fn capture_one(&self, source: &mut dyn FrameSource, timestamp_ms: i64) -> Result<Thumbnail, SampleError> {
        source
            .seek(timestamp_ms)
            .map_err(|reason| SampleError::Seek { timestamp_ms, reason })?;
        let frame = source
            .capture()
            .map_err(|reason| SampleError::Capture { timestamp_ms, reason })?;
        encode_jpeg(frame, self.config.jpeg_quality)
            .map_err(|reason| SampleError::Encode { timestamp_ms, reason })
    }
}
