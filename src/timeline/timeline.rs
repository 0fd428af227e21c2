// 타임라인 모듈 - 숏폼 편집기의 정본(canonical) 상태
// 모든 변경은 아래 명령 메서드로만 이루어짐
// 도메인 경계 위반(범위 밖 시간, 범위 밖 이동 등)은 에러가 아니라 무시(false 반환)

use std::path::PathBuf;

use thiserror::Error;

use super::clip::{AudioTrack, ClipId, VideoSegment, TIME_EPSILON};
use super::overlay::{CanvasPosition, TextOverlay, TextStyle};
use crate::history::EditorSnapshot;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimelineError {
    #[error("Cannot delete the only remaining segment")]
    LastSegment,
    #[error("Invalid source duration: {0}")]
    InvalidDuration(f64),
}

/// 편집 규칙 상수
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    /// cut이 제거하는 구간 길이 (초, time 중심)
    pub cut_window: f64,
    /// add_text_overlay 기본 길이 (초)
    pub overlay_duration: f64,
    pub min_overlay_duration: f64,
    /// 새 오버레이 기본 크기 (%)
    pub overlay_width: f64,
    pub overlay_height: f64,
    /// 리사이즈 최소 크기 (%)
    pub min_overlay_size: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cut_window: 1.0,
            overlay_duration: 5.0,
            min_overlay_duration: 0.1,
            overlay_width: 40.0,
            overlay_height: 10.0,
            min_overlay_size: 5.0,
        }
    }
}

/// [lo, hi] 클램프 (hi < lo 이면 lo)
fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn sort_by_start(segments: &mut [VideoSegment]) {
    segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}

/// 타임라인 - 비디오 세그먼트 + 텍스트 오버레이 + 오디오 트랙
#[derive(Debug, Clone)]
pub struct Timeline {
    /// 항상 start_time 오름차순, 최소 1개
    segments: Vec<VideoSegment>,
    active_segment_id: Option<ClipId>,
    text_overlays: Vec<TextOverlay>,
    audio_tracks: Vec<AudioTrack>,
    playhead: f64,
    config: TimelineConfig,
    /// 스냅샷 복원 시에도 되감지 않음 (ID 재사용 방지)
    next_id: ClipId,
}

impl Timeline {
    /// 소스 비디오 로드 시 생성 - 전체 길이를 덮는 세그먼트 1개
    pub fn new(source_file: PathBuf, duration: f64) -> Result<Self, TimelineError> {
        Self::with_config(source_file, duration, TimelineConfig::default())
    }

    pub fn with_config(
        source_file: PathBuf,
        duration: f64,
        config: TimelineConfig,
    ) -> Result<Self, TimelineError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(TimelineError::InvalidDuration(duration));
        }

        let first = VideoSegment::new(1, source_file, 0.0, duration);
        Ok(Self {
            active_segment_id: Some(first.id),
            segments: vec![first],
            text_overlays: Vec::new(),
            audio_tracks: Vec::new(),
            playhead: 0.0,
            config,
            next_id: 2,
        })
    }

    fn alloc_id(&mut self) -> ClipId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn segments(&self) -> &[VideoSegment] {
        &self.segments
    }

    pub fn text_overlays(&self) -> &[TextOverlay] {
        &self.text_overlays
    }

    pub fn audio_tracks(&self) -> &[AudioTrack] {
        &self.audio_tracks
    }

    pub fn active_segment_id(&self) -> Option<ClipId> {
        self.active_segment_id
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// 총 길이 = 세그먼트 end_time 최댓값 (cut 간격 포함)
    pub fn total_duration(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end_time)
            .fold(0.0, f64::max)
    }

    pub fn segment(&self, id: ClipId) -> Option<&VideoSegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn text_overlay(&self, id: ClipId) -> Option<&TextOverlay> {
        self.text_overlays.iter().find(|o| o.id == id)
    }

    pub fn audio_track(&self, id: ClipId) -> Option<&AudioTrack> {
        self.audio_tracks.iter().find(|t| t.id == id)
    }

    pub fn set_active_segment(&mut self, id: ClipId) -> bool {
        if self.segment(id).is_none() {
            return false;
        }
        self.active_segment_id = Some(id);
        true
    }

    /// 재생 위치 이동 (히스토리 대상 아님, 다음 스냅샷에 함께 기록됨)
    pub fn set_playhead(&mut self, time: f64) {
        if time.is_finite() {
            self.playhead = clamp_range(time, 0.0, self.total_duration());
        }
    }

    // ============================================================
    // 비디오 세그먼트 편집
    // ============================================================

    /// 세그먼트를 time에서 두 개로 분할, 앞 조각이 활성 선택을 이어받음
    pub fn split_segment_at(&mut self, segment_id: ClipId, time: f64) -> bool {
        let Some(index) = self.segments.iter().position(|s| s.id == segment_id) else {
            return false;
        };
        if !self.segments[index].contains_strictly(time) {
            return false;
        }

        let (left_id, right_id) = (self.alloc_id(), self.alloc_id());
        let Some((left, right)) = self.segments[index].split_at(time, left_id, right_id) else {
            return false;
        };

        self.segments.splice(index..=index, [left, right]);
        if self.active_segment_id == Some(segment_id) {
            self.active_segment_id = Some(left_id);
        }
        true
    }

    /// time 중심 cut_window 구간을 제거 (파괴적 편집, 간격이 남음)
    /// 길이 0 조각은 버림
    pub fn cut_segment_at(&mut self, segment_id: ClipId, time: f64) -> bool {
        let Some(index) = self.segments.iter().position(|s| s.id == segment_id) else {
            return false;
        };
        let half_window = self.config.cut_window / 2.0;
        if !self.segments[index].contains_strictly(time) {
            return false;
        }

        let (left_id, right_id) = (self.alloc_id(), self.alloc_id());
        let Some(pieces) = self.segments[index].cut_at(time, half_window, left_id, right_id) else {
            return false;
        };

        let keep_active = pieces[0].id;
        self.segments.splice(index..=index, pieces);
        if self.active_segment_id == Some(segment_id) {
            self.active_segment_id = Some(keep_active);
        }
        true
    }

    /// 새 소스 파일 삽입
    /// - at_time이 세그먼트 내부: 그 세그먼트를 at_time에서 나누고 새 클립을 끼워넣음.
    ///   새 클립은 [at_time, min(at_time+duration, 원래 end)) 을 차지하고
    ///   뒤쪽 조각은 시작점(in-point)만 밀림. 이후 세그먼트들의 시간은 그대로.
    /// - 그 외: 타임라인 끝에 붙임
    pub fn insert_segment(&mut self, source_file: PathBuf, duration: f64, at_time: f64) -> Option<ClipId> {
        if !(duration.is_finite() && duration > 0.0) || !at_time.is_finite() {
            return None;
        }

        let new_id = self.alloc_id();

        match self.segments.iter().position(|s| s.contains_strictly(at_time)) {
            Some(index) => {
                let host = self.segments.remove(index);
                let insert_end = (at_time + duration).min(host.end_time);

                let head = host.piece(self.alloc_id(), host.start_time, at_time);
                self.segments.push(head);
                self.segments
                    .push(VideoSegment::new(new_id, source_file, at_time, insert_end));
                if host.end_time - insert_end > TIME_EPSILON {
                    let tail = host.piece(self.alloc_id(), insert_end, host.end_time);
                    self.segments.push(tail);
                }
            }
            None => {
                let start = self.total_duration();
                self.segments
                    .push(VideoSegment::new(new_id, source_file, start, start + duration));
            }
        }

        sort_by_start(&mut self.segments);
        self.active_segment_id = Some(new_id);
        Some(new_id)
    }

    /// 세그먼트 삭제 - 마지막 1개는 삭제 불가
    /// 반환: Ok(true)=삭제, Ok(false)=ID 없음
    pub fn delete_segment(&mut self, segment_id: ClipId) -> Result<bool, TimelineError> {
        let Some(index) = self.segments.iter().position(|s| s.id == segment_id) else {
            return Ok(false);
        };
        if self.segments.len() <= 1 {
            return Err(TimelineError::LastSegment);
        }

        self.segments.remove(index);
        let next_active = &self.segments[index.saturating_sub(1)];
        self.active_segment_id = Some(next_active.id);
        Ok(true)
    }

    /// 길이를 유지한 채 시작 시간 변경
    /// [0, total_duration] 밖으로 나가면 무시
    pub fn move_segment(&mut self, segment_id: ClipId, new_start_time: f64) -> bool {
        let bound = self.total_duration();
        self.move_segment_within(segment_id, new_start_time, bound)
    }

    /// 드래그 중에는 press 시점의 총 길이를 경계로 사용
    pub(crate) fn move_segment_within(&mut self, segment_id: ClipId, new_start_time: f64, bound: f64) -> bool {
        let Some(segment) = self.segments.iter_mut().find(|s| s.id == segment_id) else {
            return false;
        };
        let duration = segment.duration();
        if !new_start_time.is_finite()
            || new_start_time < 0.0
            || new_start_time + duration > bound + TIME_EPSILON
        {
            return false;
        }
        if segment.start_time == new_start_time {
            return false;
        }

        segment.start_time = new_start_time;
        segment.end_time = new_start_time + duration;
        sort_by_start(&mut self.segments);
        true
    }

    pub fn set_segment_volume(&mut self, segment_id: ClipId, volume: f32) -> bool {
        match self.segments.iter_mut().find(|s| s.id == segment_id) {
            Some(segment) => {
                segment.volume = clamp_volume(volume);
                true
            }
            None => false,
        }
    }

    pub fn set_segment_muted(&mut self, segment_id: ClipId, muted: bool) -> bool {
        match self.segments.iter_mut().find(|s| s.id == segment_id) {
            Some(segment) => {
                segment.is_muted = muted;
                true
            }
            None => false,
        }
    }

    // ============================================================
    // 텍스트 오버레이
    // ============================================================

    /// 재생 위치에서 시작하는 기본 스타일 오버레이 (캔버스 중앙)
    pub fn add_text_overlay(&mut self, text: &str) -> ClipId {
        let id = self.alloc_id();
        self.text_overlays.push(TextOverlay {
            id,
            text: text.to_string(),
            position: CanvasPosition { x: 50.0, y: 50.0 },
            width: self.config.overlay_width,
            height: self.config.overlay_height,
            rotation: 0.0,
            start_time: self.playhead,
            duration: self.config.overlay_duration,
            style: TextStyle::default(),
        });
        id
    }

    fn overlay_mut(&mut self, id: ClipId) -> Option<&mut TextOverlay> {
        self.text_overlays.iter_mut().find(|o| o.id == id)
    }

    pub fn update_text_overlay_position(&mut self, id: ClipId, x: f64, y: f64) -> bool {
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.position = CanvasPosition::clamped(x, y);
                true
            }
            None => false,
        }
    }

    pub fn update_text_overlay_style(&mut self, id: ClipId, style: TextStyle) -> bool {
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.style = style.sanitized();
                true
            }
            None => false,
        }
    }

    pub fn update_text_overlay_text(&mut self, id: ClipId, text: &str) -> bool {
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// 길이 변경 - [min_overlay_duration, 총 길이 - 시작] 으로 제한
    pub fn update_text_overlay_duration(&mut self, id: ClipId, duration: f64) -> bool {
        if !duration.is_finite() || duration <= 0.0 {
            return false;
        }
        let total = self.total_duration();
        let min = self.config.min_overlay_duration;
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.duration = clamp_range(duration, min, total - overlay.start_time);
                true
            }
            None => false,
        }
    }

    /// 시작 시간 변경 - [0, 총 길이 - duration] 으로 제한
    pub fn update_text_overlay_start_time(&mut self, id: ClipId, start_time: f64) -> bool {
        if !start_time.is_finite() {
            return false;
        }
        let total = self.total_duration();
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.start_time = clamp_range(start_time, 0.0, total - overlay.duration);
                true
            }
            None => false,
        }
    }

    pub fn update_text_overlay_size(&mut self, id: ClipId, width: f64, height: f64) -> bool {
        if !width.is_finite() || !height.is_finite() {
            return false;
        }
        let min = self.config.min_overlay_size;
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.width = clamp_range(width, min, 100.0);
                overlay.height = clamp_range(height, min, 100.0);
                true
            }
            None => false,
        }
    }

    pub fn update_text_overlay_rotation(&mut self, id: ClipId, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.rotation = degrees.rem_euclid(360.0);
                true
            }
            None => false,
        }
    }

    pub fn delete_text_overlay(&mut self, id: ClipId) -> bool {
        let before = self.text_overlays.len();
        self.text_overlays.retain(|o| o.id != id);
        self.text_overlays.len() != before
    }

    // ============================================================
    // 오디오 트랙 (겹침 허용, 최소 개수 제약 없음)
    // ============================================================

    /// 재생 위치에서 시작하는 오디오 트랙 추가
    pub fn add_audio_track(&mut self, source_file: PathBuf, name: &str, duration: f64) -> Option<ClipId> {
        if !(duration.is_finite() && duration > 0.0) {
            return None;
        }
        let id = self.alloc_id();
        self.audio_tracks.push(AudioTrack::new(
            id,
            source_file,
            name.to_string(),
            self.playhead,
            duration,
        ));
        Some(id)
    }

    pub fn split_audio_track_at(&mut self, track_id: ClipId, time: f64) -> bool {
        let Some(index) = self.audio_tracks.iter().position(|t| t.id == track_id) else {
            return false;
        };
        if !self.audio_tracks[index].contains_strictly(time) {
            return false;
        }

        let (left_id, right_id) = (self.alloc_id(), self.alloc_id());
        match self.audio_tracks[index].split_at(time, left_id, right_id) {
            Some((left, right)) => {
                self.audio_tracks.splice(index..=index, [left, right]);
                true
            }
            None => false,
        }
    }

    pub fn cut_audio_track_at(&mut self, track_id: ClipId, time: f64) -> bool {
        let Some(index) = self.audio_tracks.iter().position(|t| t.id == track_id) else {
            return false;
        };
        let half_window = self.config.cut_window / 2.0;
        if !self.audio_tracks[index].contains_strictly(time) {
            return false;
        }

        let (left_id, right_id) = (self.alloc_id(), self.alloc_id());
        match self.audio_tracks[index].cut_at(time, half_window, left_id, right_id) {
            Some(pieces) => {
                self.audio_tracks.splice(index..=index, pieces);
                true
            }
            None => false,
        }
    }

    pub fn move_audio_track(&mut self, track_id: ClipId, new_start_time: f64) -> bool {
        let bound = self.total_duration();
        self.move_audio_track_within(track_id, new_start_time, bound)
    }

    pub(crate) fn move_audio_track_within(&mut self, track_id: ClipId, new_start_time: f64, bound: f64) -> bool {
        let Some(track) = self.audio_tracks.iter_mut().find(|t| t.id == track_id) else {
            return false;
        };
        if !new_start_time.is_finite()
            || new_start_time < 0.0
            || new_start_time + track.duration > bound + TIME_EPSILON
            || track.start_time == new_start_time
        {
            return false;
        }
        track.start_time = new_start_time;
        true
    }

    pub fn delete_audio_track(&mut self, track_id: ClipId) -> bool {
        let before = self.audio_tracks.len();
        self.audio_tracks.retain(|t| t.id != track_id);
        self.audio_tracks.len() != before
    }

    pub fn set_audio_volume(&mut self, track_id: ClipId, volume: f32) -> bool {
        match self.audio_tracks.iter_mut().find(|t| t.id == track_id) {
            Some(track) => {
                track.volume = clamp_volume(volume);
                true
            }
            None => false,
        }
    }

    pub fn set_audio_muted(&mut self, track_id: ClipId, muted: bool) -> bool {
        match self.audio_tracks.iter_mut().find(|t| t.id == track_id) {
            Some(track) => {
                track.is_muted = muted;
                true
            }
            None => false,
        }
    }

    // ============================================================
    // 스냅샷
    // ============================================================

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            segments: self.segments.clone(),
            active_segment_id: self.active_segment_id,
            text_overlays: self.text_overlays.clone(),
            audio_tracks: self.audio_tracks.clone(),
            current_playhead_time: self.playhead,
        }
    }

    /// 스냅샷 상태로 되돌림 (next_id는 유지)
    pub fn restore(&mut self, snapshot: &EditorSnapshot) {
        self.segments = snapshot.segments.clone();
        self.active_segment_id = snapshot.active_segment_id;
        self.text_overlays = snapshot.text_overlays.clone();
        self.audio_tracks = snapshot.audio_tracks.clone();
        self.playhead = snapshot.current_playhead_time;
    }
}
