// 편집 지시서 (EditInstructions) - 렌더/업로드 담당자에게 넘기는 유일한 산출물
// 타임라인 최종 상태 + 전역 설정(마스터 볼륨, 총 길이, 원본 파일)을 한 번에 직렬화

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::timeline::{AudioTrack, TextOverlay, Timeline, VideoSegment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInstructions {
    pub segments: Vec<VideoSegment>,
    pub audio_tracks: Vec<AudioTrack>,
    pub text_overlays: Vec<TextOverlay>,
    /// 총 길이 (초)
    pub duration: f64,
    /// 원본 비디오 마스터 볼륨 (0~1)
    pub video_volume: f32,
    pub original_video_file: PathBuf,
}

impl EditInstructions {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 순수 함수 - 타임라인이 이미 보장하는 것 외에는 검증하지 않음
pub fn build_instructions(timeline: &Timeline, video_volume: f32, original_video_file: &Path) -> EditInstructions {
    EditInstructions {
        segments: timeline.segments().to_vec(),
        audio_tracks: timeline.audio_tracks().to_vec(),
        text_overlays: timeline.text_overlays().to_vec(),
        duration: timeline.total_duration(),
        video_volume,
        original_video_file: original_video_file.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_copies_final_state() {
        let mut timeline = Timeline::new(PathBuf::from("clip.mp4"), 30.0).unwrap();
        assert!(timeline.split_segment_at(1, 10.0));
        timeline.add_text_overlay("hi");
        timeline.add_audio_track(PathBuf::from("bgm.mp3"), "bgm", 12.0).unwrap();

        let instructions = build_instructions(&timeline, 0.8, Path::new("clip.mp4"));
        assert_eq!(instructions.segments.len(), 2);
        assert_eq!(instructions.text_overlays.len(), 1);
        assert_eq!(instructions.audio_tracks.len(), 1);
        assert_eq!(instructions.duration, 30.0);
        assert_eq!(instructions.video_volume, 0.8);
        assert_eq!(instructions.original_video_file, PathBuf::from("clip.mp4"));
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let timeline = Timeline::new(PathBuf::from("clip.mp4"), 8.0).unwrap();
        let json = build_instructions(&timeline, 1.0, Path::new("clip.mp4"))
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["originalVideoFile"], "clip.mp4");
        assert_eq!(value["videoVolume"], 1.0);
        assert_eq!(value["duration"], 8.0);
        assert!(value["audioTracks"].as_array().unwrap().is_empty());
        assert!(value["textOverlays"].as_array().unwrap().is_empty());
        assert_eq!(value["segments"][0]["startTime"], 0.0);
        assert_eq!(value["segments"][0]["endTime"], 8.0);
        assert_eq!(value["segments"][0]["sourceFile"], "clip.mp4");
    }
}
