// FFmpeg Decoder 모듈 (ffmpeg-next)
// 용도: 소스 파일 정보 조회 + 썸네일용 seek/캡처 (FrameSource 구현)

use ffmpeg_next as ffmpeg;
use std::path::Path;

use crate::editor::MediaProbe;
use crate::thumbnail::FrameSource;

/// 비디오 프레임 데이터
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
    pub timestamp_ms: i64,
}

/// 픽셀 포맷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGBA,
    RGB,
}

/// 소스 파일 정보
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub duration_ms: i64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl MediaInfo {
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// 디코딩 결과 (에러와 "프레임 없음"을 구분)
pub enum DecodeResult {
    Frame(Frame),
    /// EOF 도달 + 탐색 중 마지막으로 본 프레임
    EndOfStream(Frame),
    /// EOF 도달 + 사용 가능한 프레임 없음
    EndOfStreamEmpty,
}

/// 입력 컨텍스트 열기
/// 1차 시도: 기본 오픈
/// 2차 시도: moov atom이 파일 끝에 있는 경우 (휴대폰 녹화본 등) - probesize 확장
fn open_input(file_path: &Path) -> Result<ffmpeg::format::context::Input, String> {
    ffmpeg::init().map_err(|e| format!("FFmpeg init failed: {}", e))?;

    ffmpeg::format::input(&file_path)
        .or_else(|_| {
            let mut opts = ffmpeg::Dictionary::new();
            opts.set("probesize", "100000000"); // 100MB
            opts.set("analyzeduration", "30000000"); // 30초
            ffmpeg::format::input_with_dictionary(&file_path, opts)
        })
        .map_err(|e| format!("Failed to open file: {}", e))
}

fn stream_duration_ms(input_ctx: &ffmpeg::format::context::Input, stream: &ffmpeg::format::stream::Stream) -> i64 {
    if stream.duration() > 0 {
        let time_base = stream.time_base();
        (stream.duration() * i64::from(time_base.numerator()) * 1000) / i64::from(time_base.denominator())
    } else if input_ctx.duration() > 0 {
        input_ctx.duration() / 1000
    } else {
        0
    }
}

/// 파일 정보 조회 (길이/해상도/fps)
pub fn probe(file_path: &Path) -> Result<MediaInfo, String> {
    let input_ctx = open_input(file_path)?;

    // 오디오 전용 파일도 길이는 필요 (오디오 트랙 추가)
    if let Some(stream) = input_ctx.streams().best(ffmpeg::media::Type::Video) {
        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| format!("Failed to create context: {}", e))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|e| format!("Failed to get video decoder: {}", e))?;

        return Ok(MediaInfo {
            duration_ms: stream_duration_ms(&input_ctx, &stream),
            width: decoder.width(),
            height: decoder.height(),
            fps: f64::from(stream.avg_frame_rate()),
        });
    }

    let stream = input_ctx
        .streams()
        .best(ffmpeg::media::Type::Audio)
        .ok_or("No audio or video stream found")?;
    Ok(MediaInfo {
        duration_ms: stream_duration_ms(&input_ctx, &stream),
        width: 0,
        height: 0,
        fps: 0.0,
    })
}

/// ffmpeg 기반 길이 조회 (삽입/오디오 추가 시 사용)
pub struct FfmpegProbe;

impl MediaProbe for FfmpegProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, String> {
        let info = probe(path)?;
        if info.duration_ms <= 0 {
            return Err(format!("Unknown duration: {}", path.display()));
        }
        Ok(info.duration_secs())
    }
}

/// 썸네일용 비디오 디코더 (출력 해상도 = 썸네일 크기, RGBA)
pub struct Decoder {
    input_ctx: ffmpeg::format::context::Input,
    video_stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    width: u32,
    height: u32,
    fps: f64,
    /// 마지막 seek으로 준비된 프레임 (capture 대상)
    current_frame: Option<Frame>,
}

impl Decoder {
    /// 비디오 파일 열기 (썸네일 크기로 직접 스케일 - 불필요한 다운스케일 방지)
    pub fn open_with_resolution(file_path: &Path, target_width: u32, target_height: u32) -> Result<Self, String> {
        let input_ctx = open_input(file_path)?;

        let video_stream = input_ctx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or("No video stream found")?;
        let video_stream_index = video_stream.index();

        let mut context = ffmpeg::codec::context::Context::from_parameters(video_stream.parameters())
            .map_err(|e| format!("Failed to create context: {}", e))?;

        // 썸네일은 프레임 단위 랜덤 접근이라 스레드 2개면 충분
        context.set_threading(ffmpeg::threading::Config {
            kind: ffmpeg::threading::Type::Frame,
            count: 2,
        });

        let decoder = context
            .decoder()
            .video()
            .map_err(|e| format!("Failed to get video decoder: {}", e))?;

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGBA,
            target_width,
            target_height,
            ffmpeg::software::scaling::Flags::FAST_BILINEAR,
        )
        .map_err(|e| format!("Failed to create scaler: {}", e))?;

        let fps = f64::from(video_stream.avg_frame_rate());

        Ok(Self {
            input_ctx,
            video_stream_index,
            decoder,
            scaler,
            width: target_width,
            height: target_height,
            fps,
            current_frame: None,
        })
    }

    /// timestamp로 seek 후 목표 PTS에 도달할 때까지 디코딩
    pub fn decode_frame(&mut self, timestamp_ms: i64) -> Result<DecodeResult, String> {
        self.seek_input(timestamp_ms)?;

        let target_info = {
            let stream = self
                .input_ctx
                .stream(self.video_stream_index)
                .ok_or("Video stream not found")?;
            let tb = stream.time_base();
            let frame_duration_ms = (1000.0 / self.fps.max(1.0)).max(1.0) as i64;
            let target_pts = (timestamp_ms * i64::from(tb.denominator())) / (i64::from(tb.numerator()) * 1000);
            let tolerance_pts =
                (frame_duration_ms * i64::from(tb.denominator())) / (i64::from(tb.numerator()) * 1000);
            (target_pts, tolerance_pts)
        };

        let mut decoded_frame: Option<ffmpeg::frame::Video> = None;
        // 목표 PTS 전에 EOF가 나면 마지막으로 본 프레임 사용 (짧은 파일 끝부분)
        let mut latest_seen_frame: Option<ffmpeg::frame::Video> = None;

        for (stream, packet) in self.input_ctx.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }
            // 손상 패킷은 스킵 (flush하면 이후 패킷도 디코딩 불가)
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            loop {
                let mut frame = ffmpeg::frame::Video::empty();
                if self.decoder.receive_frame(&mut frame).is_err() {
                    break;
                }
                if is_pts_at_target(target_info, &frame) {
                    decoded_frame = Some(frame);
                    break;
                }
                latest_seen_frame = Some(frame);
            }

            if decoded_frame.is_some() {
                break;
            }
        }

        match (decoded_frame, latest_seen_frame) {
            (Some(raw), _) => Ok(DecodeResult::Frame(self.convert_frame(&raw, timestamp_ms)?)),
            (None, Some(raw)) => Ok(DecodeResult::EndOfStream(self.convert_frame(&raw, timestamp_ms)?)),
            (None, None) => Ok(DecodeResult::EndOfStreamEmpty),
        }
    }

    /// 스케일러 통과 후 RGBA 버퍼로 복사 (stride 제거)
    fn convert_frame(&mut self, raw_frame: &ffmpeg::frame::Video, timestamp_ms: i64) -> Result<Frame, String> {
        let mut scaled = ffmpeg::frame::Video::empty();
        self.scaler
            .run(raw_frame, &mut scaled)
            .map_err(|e| format!("Failed to scale frame: {}", e))?;

        let row_size = self.width as usize * 4;
        let src_data = scaled.data(0);
        let linesize = scaled.stride(0);

        // bounds check: 손상 프레임이면 panic 대신 Err
        if linesize < row_size {
            return Err(format!("Invalid stride: {} < {} (width * 4)", linesize, row_size));
        }
        let required = (self.height as usize).saturating_sub(1) * linesize + row_size;
        if src_data.len() < required {
            return Err(format!(
                "Frame data too small: got {} bytes, need {} ({}x{}, stride={})",
                src_data.len(),
                required,
                self.width,
                self.height,
                linesize
            ));
        }

        let mut data = vec![0u8; row_size * self.height as usize];
        for (y, dst_row) in data.chunks_exact_mut(row_size).enumerate() {
            let src_offset = y * linesize;
            dst_row.copy_from_slice(&src_data[src_offset..src_offset + row_size]);
        }

        Ok(Frame {
            width: self.width,
            height: self.height,
            format: PixelFormat::RGBA,
            data,
            timestamp_ms,
        })
    }

    /// 입력 컨텍스트 seek (실패 시 flush 후 1회 재시도)
    fn seek_input(&mut self, timestamp_ms: i64) -> Result<(), String> {
        // stream_index = -1 이므로 AV_TIME_BASE(마이크로초) 단위
        let timestamp_us = timestamp_ms * 1000;

        match self.input_ctx.seek(timestamp_us, ..timestamp_us) {
            Ok(_) => {
                self.decoder.flush();
                Ok(())
            }
            Err(e) => {
                self.decoder.flush();
                self.input_ctx
                    .seek(timestamp_us, ..timestamp_us)
                    .map(|_| self.decoder.flush())
                    .map_err(|_| format!("Seek failed after retry: {}", e))
            }
        }
    }
}

impl FrameSource for Decoder {
    /// seek + 목표 프레임 디코딩 완료 = "프레임 준비" 신호
    fn seek(&mut self, timestamp_ms: i64) -> Result<(), String> {
        self.current_frame = match self.decode_frame(timestamp_ms)? {
            DecodeResult::Frame(f) | DecodeResult::EndOfStream(f) => Some(f),
            DecodeResult::EndOfStreamEmpty => None,
        };
        if self.current_frame.is_none() && timestamp_ms > 0 {
            return Err(format!("No frame available at {}ms (EndOfStreamEmpty)", timestamp_ms));
        }
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, String> {
        self.current_frame
            .clone()
            .ok_or_else(|| "No decoded frame to capture".to_string())
    }
}

/// PTS가 목표에 도달했는지 (PTS >= target - tolerance, PTS 없으면 수락)
fn is_pts_at_target(target_info: (i64, i64), frame: &ffmpeg::frame::Video) -> bool {
    let (target_pts, tolerance_pts) = target_info;
    match frame.pts() {
        Some(pts) => pts >= target_pts - tolerance_pts,
        None => true,
    }
}

// 실제 비디오 파일이 필요하므로 ignore
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    #[ignore] // 실제 비디오 파일 필요
    fn test_probe() {
        let info = probe(&PathBuf::from("test.mp4")).unwrap();
        assert!(info.duration_ms > 0);
    }

    #[test]
    #[ignore] // 실제 비디오 파일 필요
    fn test_seek_and_capture() {
        let mut decoder = Decoder::open_with_resolution(&PathBuf::from("test.mp4"), 160, 90).unwrap();
        decoder.seek(1000).unwrap();
        let frame = decoder.capture().unwrap();
        assert_eq!((frame.width, frame.height), (160, 90));
        assert_eq!(frame.data.len(), 160 * 90 * 4);
    }

    #[test]
    fn test_probe_missing_file_is_error() {
        assert!(probe(&PathBuf::from("definitely-missing-file.mp4")).is_err());
    }
}
