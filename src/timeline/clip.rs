// 클립 모듈 - 메인 타임라인의 비디오 세그먼트 + 독립 오디오 트랙

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 클립/오버레이 공용 ID (Timeline이 단조 증가로 발급)
pub type ClipId = u64;

/// 길이 0 판정 허용 오차 (초)
pub(crate) const TIME_EPSILON: f64 = 1e-9;

/// 분할 지점이 구간 내부(경계 제외)인지 확인
pub(crate) fn is_strictly_inside(start: f64, end: f64, time: f64) -> bool {
    time.is_finite() && time > start && time < end
}

/// cut 결과 구간 계산: time 중심으로 half_window 양쪽을 잘라냄
/// 각 경계는 원래 [start, end]로 클램프, 길이 0 조각은 None
pub(crate) fn cut_ranges(
    start: f64,
    end: f64,
    time: f64,
    half_window: f64,
) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
    let left_end = start.max(time - half_window);
    let right_start = end.min(time + half_window);

    let left = (left_end - start > TIME_EPSILON).then_some((start, left_end));
    let right = (end - right_start > TIME_EPSILON).then_some((right_start, end));
    (left, right)
}

/// 비디오 세그먼트 - 하나의 소스 파일에서 잘라낸 연속 구간
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSegment {
    pub id: ClipId,
    /// 타임라인 시작 (초)
    pub start_time: f64,
    /// 타임라인 끝 (초, start_time보다 큼)
    pub end_time: f64,
    pub source_file: PathBuf,
    /// 소스 파일 내 시작 위치 (초) - split/cut 시 오른쪽 조각만 전진
    pub source_start: f64,
    pub is_muted: bool,
    /// 0.0~1.0
    pub volume: f32,
}

impl VideoSegment {
    pub fn new(id: ClipId, source_file: PathBuf, start_time: f64, end_time: f64) -> Self {
        Self {
            id,
            start_time,
            end_time,
            source_file,
            source_start: 0.0,
            is_muted: false,
            volume: 1.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// 경계를 제외한 내부에 time이 있는지
    pub fn contains_strictly(&self, time: f64) -> bool {
        is_strictly_inside(self.start_time, self.end_time, time)
    }

    /// 같은 소스/뮤트/볼륨을 물려받는 [start, end) 조각 생성
    pub(crate) fn piece(&self, id: ClipId, start_time: f64, end_time: f64) -> Self {
        Self {
            id,
            start_time,
            end_time,
            source_file: self.source_file.clone(),
            source_start: self.source_start + (start_time - self.start_time),
            is_muted: self.is_muted,
            volume: self.volume,
        }
    }

    /// time에서 두 조각으로 분할 (내용 손실 없음)
    /// 범위 밖이면 None
    pub fn split_at(&self, time: f64, left_id: ClipId, right_id: ClipId) -> Option<(Self, Self)> {
        if !self.contains_strictly(time) {
            return None;
        }
        Some((
            self.piece(left_id, self.start_time, time),
            self.piece(right_id, time, self.end_time),
        ))
    }

    /// time 중심 구간을 잘라낸 조각들 (길이 0 조각은 제외)
    /// 범위 밖이거나 두 조각 모두 길이 0이면 None
    pub fn cut_at(
        &self,
        time: f64,
        half_window: f64,
        left_id: ClipId,
        right_id: ClipId,
    ) -> Option<Vec<Self>> {
        if !self.contains_strictly(time) {
            return None;
        }
        let (left, right) = cut_ranges(self.start_time, self.end_time, time, half_window);
        let pieces: Vec<Self> = [left.map(|r| (left_id, r)), right.map(|r| (right_id, r))]
            .into_iter()
            .flatten()
            .map(|(id, (start, end))| self.piece(id, start, end))
            .collect();

        if pieces.is_empty() {
            None
        } else {
            Some(pieces)
        }
    }
}

/// 오디오 트랙 - 비디오 위에 겹쳐지는 독립 오디오 클립 (트랙끼리 겹침 허용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTrack {
    pub id: ClipId,
    pub source_file: PathBuf,
    pub name: String,
    pub start_time: f64,
    pub duration: f64,
    pub source_start: f64,
    /// 0.0~1.0
    pub volume: f32,
    pub is_muted: bool,
}

impl AudioTrack {
    pub fn new(id: ClipId, source_file: PathBuf, name: String, start_time: f64, duration: f64) -> Self {
        Self {
            id,
            source_file,
            name,
            start_time,
            duration,
            source_start: 0.0,
            volume: 1.0,
            is_muted: false,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn contains_strictly(&self, time: f64) -> bool {
        is_strictly_inside(self.start_time, self.end_time(), time)
    }

    pub(crate) fn piece(&self, id: ClipId, start_time: f64, end_time: f64) -> Self {
        Self {
            id,
            source_file: self.source_file.clone(),
            name: self.name.clone(),
            start_time,
            duration: end_time - start_time,
            source_start: self.source_start + (start_time - self.start_time),
            volume: self.volume,
            is_muted: self.is_muted,
        }
    }

    pub fn split_at(&self, time: f64, left_id: ClipId, right_id: ClipId) -> Option<(Self, Self)> {
        if !self.contains_strictly(time) {
            return None;
        }
        Some((
            self.piece(left_id, self.start_time, time),
            self.piece(right_id, time, self.end_time()),
        ))
    }

    pub fn cut_at(
        &self,
        time: f64,
        half_window: f64,
        left_id: ClipId,
        right_id: ClipId,
    ) -> Option<Vec<Self>> {
        if !self.contains_strictly(time) {
            return None;
        }
        let (left, right) = cut_ranges(self.start_time, self.end_time(), time, half_window);
        let pieces: Vec<Self> = [left.map(|r| (left_id, r)), right.map(|r| (right_id, r))]
            .into_iter()
            .flatten()
            .map(|(id, (start, end))| self.piece(id, start, end))
            .collect();

        if pieces.is_empty() {
            None
        } else {
            Some(pieces)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64) -> VideoSegment {
        VideoSegment::new(1, PathBuf::from("clip.mp4"), start, end)
    }

    #[test]
    fn test_split_inherits_source_and_advances_in_point() {
        let mut seg = segment(0.0, 10.0);
        seg.is_muted = true;
        seg.volume = 0.4;

        let (left, right) = seg.split_at(4.0, 2, 3).unwrap();
        assert_eq!((left.start_time, left.end_time), (0.0, 4.0));
        assert_eq!((right.start_time, right.end_time), (4.0, 10.0));
        assert_eq!(left.source_file, PathBuf::from("clip.mp4"));
        assert_eq!(right.source_file, PathBuf::from("clip.mp4"));
        assert_eq!(right.source_start, 4.0);
        assert!(left.is_muted && right.is_muted);
        assert_eq!(right.volume, 0.4);
    }

    #[test]
    fn test_split_on_boundary_is_rejected() {
        let seg = segment(0.0, 10.0);
        assert!(seg.split_at(0.0, 2, 3).is_none());
        assert!(seg.split_at(10.0, 2, 3).is_none());
        assert!(seg.split_at(12.0, 2, 3).is_none());
        assert!(seg.split_at(f64::NAN, 2, 3).is_none());
    }

    #[test]
    fn test_cut_removes_one_second_window() {
        let pieces = segment(0.0, 10.0).cut_at(5.0, 0.5, 2, 3).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!((pieces[0].start_time, pieces[0].end_time), (0.0, 4.5));
        assert_eq!((pieces[1].start_time, pieces[1].end_time), (5.5, 10.0));
        assert_eq!(pieces[1].source_start, 5.5);
    }

    #[test]
    fn test_cut_near_start_drops_zero_length_piece() {
        let pieces = segment(0.0, 1.0).cut_at(0.2, 0.5, 2, 3).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].id, 3);
        assert!((pieces[0].start_time - 0.7).abs() < 1e-9);
        assert_eq!(pieces[0].end_time, 1.0);
    }

    #[test]
    fn test_cut_consuming_whole_segment_is_rejected() {
        assert!(segment(0.0, 0.8).cut_at(0.4, 0.5, 2, 3).is_none());
    }

    #[test]
    fn test_audio_split_keeps_name() {
        let track = AudioTrack::new(7, PathBuf::from("bgm.mp3"), "bgm".into(), 2.0, 6.0);
        let (left, right) = track.split_at(5.0, 8, 9).unwrap();
        assert_eq!((left.start_time, left.duration), (2.0, 3.0));
        assert_eq!((right.start_time, right.duration), (5.0, 3.0));
        assert_eq!(right.name, "bgm");
        assert_eq!(right.source_start, 3.0);
    }
}
