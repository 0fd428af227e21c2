// 편집 세션 - 타임라인 + 히스토리 + 드래그 + 호스트 상태를 묶는 단일 진입점
// 명령 하나 / 제스처 하나마다 최대 1회 commit (실제로 바뀐 경우만)
// 모든 실패는 여기서 흡수되어 상태 값(에러 문자열, busy)으로만 노출됨

use std::path::{Path, PathBuf};

use crate::export::{build_instructions, EditInstructions, RenderSink, SaveError};
use crate::history::{EditorSnapshot, HistoryManager};
use crate::interaction::{DragController, DragOutcome, DragState, InputEvent};
use crate::timeline::{ClipId, TextStyle, Timeline, TimelineConfig, TimelineError};

/// 새 파일의 길이를 알아내는 포트 (ffmpeg 또는 테스트용 가짜)
pub trait MediaProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub timeline: TimelineConfig,
    /// None이면 히스토리 무제한
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            history_limit: Some(200),
        }
    }
}

/// 호스트 UI에 노출되는 상태 (에러 문자열 1개 + busy)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorStatus {
    pub error: Option<String>,
    pub busy: bool,
}

pub struct EditorSession {
    timeline: Timeline,
    history: HistoryManager,
    drag: DragController,
    original_file: PathBuf,
    /// 원본 비디오 마스터 볼륨 (0~1)
    video_volume: f32,
    status: EditorStatus,
}

impl EditorSession {
    pub fn new(source_file: PathBuf, duration: f64) -> Result<Self, TimelineError> {
        Self::with_config(source_file, duration, EditorConfig::default())
    }

    pub fn with_config(source_file: PathBuf, duration: f64, config: EditorConfig) -> Result<Self, TimelineError> {
        let timeline = Timeline::with_config(source_file.clone(), duration, config.timeline)?;
        let initial = timeline.snapshot();
        let history = match config.history_limit {
            Some(limit) => HistoryManager::with_limit(initial, limit),
            None => HistoryManager::new(initial),
        };

        log::info!("editor session opened: {:?} ({:.3}s)", source_file, duration);

        Ok(Self {
            timeline,
            history,
            drag: DragController::new(),
            original_file: source_file,
            video_volume: 1.0,
            status: EditorStatus::default(),
        })
    }

    /// 소스 파일 길이를 조회해서 세션 생성
    pub fn open(source_file: PathBuf, probe: &dyn MediaProbe) -> Result<Self, String> {
        let duration = probe.duration_secs(&source_file)?;
        Self::new(source_file, duration).map_err(|e| e.to_string())
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn original_file(&self) -> &Path {
        &self.original_file
    }

    pub fn video_volume(&self) -> f32 {
        self.video_volume
    }

    pub fn status(&self) -> &EditorStatus {
        &self.status
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        self.timeline.snapshot()
    }

    pub fn clear_error(&mut self) {
        self.status.error = None;
    }

    /// 비동기 작업(썸네일 등) 실패를 에러 문자열로 기록
    pub fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("editor error: {}", message);
        self.status.error = Some(message);
    }

    // ==================== 히스토리 ====================

    /// 현재 히스토리 항목과 내용이 다르면 commit
    fn commit_if_changed(&mut self) -> bool {
        let snapshot = self.timeline.snapshot();
        if self.history.current().same_content(&snapshot) {
            return false;
        }
        self.history.commit(snapshot);
        true
    }

    /// 명령 실행 후 바뀐 경우만 commit
    /// 제스처 진행 중에는 명령을 거부 (드래그 중간 상태가 commit되지 않도록)
    fn edit<R: Default>(&mut self, command: impl FnOnce(&mut Timeline) -> R) -> R {
        if !self.drag.is_idle() {
            log::debug!("command ignored during gesture");
            return R::default();
        }
        let result = command(&mut self.timeline);
        self.commit_if_changed();
        result
    }

    /// 반환: 호스트 플레이어를 옮길 재생 위치 (되돌릴 항목 없으면 None)
    pub fn undo(&mut self) -> Option<f64> {
        if !self.drag.is_idle() {
            return None;
        }
        let snapshot = self.history.undo()?.clone();
        self.timeline.restore(&snapshot);
        Some(snapshot.current_playhead_time)
    }

    pub fn redo(&mut self) -> Option<f64> {
        if !self.drag.is_idle() {
            return None;
        }
        let snapshot = self.history.redo()?.clone();
        self.timeline.restore(&snapshot);
        Some(snapshot.current_playhead_time)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== 입력 ====================

    /// 포인터/터치 이벤트 주입 - 제스처 종료 시 1회 commit
    pub fn handle_input(&mut self, event: InputEvent) -> DragOutcome {
        let outcome = self.drag.handle(event, &mut self.timeline);
        if outcome == DragOutcome::Finished && self.commit_if_changed() {
            log::debug!("gesture committed (history depth={})", self.history.len());
        }
        outcome
    }

    // ==================== 전역 설정 ====================

    /// 재생 위치 변경 (히스토리 기록 안 함)
    pub fn set_playhead(&mut self, time: f64) {
        self.timeline.set_playhead(time);
    }

    pub fn set_video_volume(&mut self, volume: f32) {
        self.video_volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    // ==================== 세그먼트 ====================

    pub fn set_active_segment(&mut self, segment_id: ClipId) -> bool {
        self.edit(|t| t.set_active_segment(segment_id))
    }

    pub fn split_segment_at(&mut self, segment_id: ClipId, time: f64) -> bool {
        self.edit(|t| t.split_segment_at(segment_id, time))
    }

    pub fn cut_segment_at(&mut self, segment_id: ClipId, time: f64) -> bool {
        self.edit(|t| t.cut_segment_at(segment_id, time))
    }

    pub fn insert_segment(&mut self, source_file: PathBuf, duration: f64, at_time: f64) -> Option<ClipId> {
        self.edit(|t| t.insert_segment(source_file, duration, at_time))
    }

    /// 파일 길이를 조회해서 삽입 (조회 실패는 에러 문자열로)
    pub fn insert_file(&mut self, probe: &dyn MediaProbe, source_file: PathBuf, at_time: f64) -> Option<ClipId> {
        match probe.duration_secs(&source_file) {
            Ok(duration) => self.insert_segment(source_file, duration, at_time),
            Err(e) => {
                self.report_error(format!("Failed to read {}: {}", source_file.display(), e));
                None
            }
        }
    }

    /// 마지막 세그먼트 삭제 시도는 차단 에러로 보고
    pub fn delete_segment(&mut self, segment_id: ClipId) -> Result<bool, TimelineError> {
        if !self.drag.is_idle() {
            log::debug!("delete ignored during gesture");
            return Ok(false);
        }
        match self.timeline.delete_segment(segment_id) {
            Ok(deleted) => {
                self.commit_if_changed();
                Ok(deleted)
            }
            Err(e) => {
                self.report_error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn move_segment(&mut self, segment_id: ClipId, new_start_time: f64) -> bool {
        self.edit(|t| t.move_segment(segment_id, new_start_time))
    }

    pub fn set_segment_volume(&mut self, segment_id: ClipId, volume: f32) -> bool {
        self.edit(|t| t.set_segment_volume(segment_id, volume))
    }

    pub fn set_segment_muted(&mut self, segment_id: ClipId, muted: bool) -> bool {
        self.edit(|t| t.set_segment_muted(segment_id, muted))
    }

    // ==================== 텍스트 오버레이 ====================

    /// 제스처 진행 중이면 None
    pub fn add_text_overlay(&mut self, text: &str) -> Option<ClipId> {
        self.edit(|t| Some(t.add_text_overlay(text)))
    }

    pub fn update_text_overlay_position(&mut self, id: ClipId, x: f64, y: f64) -> bool {
        self.edit(|t| t.update_text_overlay_position(id, x, y))
    }

    pub fn update_text_overlay_style(&mut self, id: ClipId, style: TextStyle) -> bool {
        self.edit(|t| t.update_text_overlay_style(id, style))
    }

    pub fn update_text_overlay_text(&mut self, id: ClipId, text: &str) -> bool {
        self.edit(|t| t.update_text_overlay_text(id, text))
    }

    pub fn update_text_overlay_duration(&mut self, id: ClipId, duration: f64) -> bool {
        self.edit(|t| t.update_text_overlay_duration(id, duration))
    }

    pub fn update_text_overlay_start_time(&mut self, id: ClipId, start_time: f64) -> bool {
        self.edit(|t| t.update_text_overlay_start_time(id, start_time))
    }

    pub fn update_text_overlay_size(&mut self, id: ClipId, width: f64, height: f64) -> bool {
        self.edit(|t| t.update_text_overlay_size(id, width, height))
    }

    pub fn update_text_overlay_rotation(&mut self, id: ClipId, degrees: f64) -> bool {
        self.edit(|t| t.update_text_overlay_rotation(id, degrees))
    }

    pub fn delete_text_overlay(&mut self, id: ClipId) -> bool {
        self.edit(|t| t.delete_text_overlay(id))
    }

    // ==================== 오디오 트랙 ====================

    pub fn add_audio_track(&mut self, source_file: PathBuf, name: &str, duration: f64) -> Option<ClipId> {
        self.edit(|t| t.add_audio_track(source_file, name, duration))
    }

    pub fn add_audio_file(&mut self, probe: &dyn MediaProbe, source_file: PathBuf, name: &str) -> Option<ClipId> {
        match probe.duration_secs(&source_file) {
            Ok(duration) => self.add_audio_track(source_file, name, duration),
            Err(e) => {
                self.report_error(format!("Failed to read {}: {}", source_file.display(), e));
                None
            }
        }
    }

    pub fn split_audio_track_at(&mut self, track_id: ClipId, time: f64) -> bool {
        self.edit(|t| t.split_audio_track_at(track_id, time))
    }

    pub fn cut_audio_track_at(&mut self, track_id: ClipId, time: f64) -> bool {
        self.edit(|t| t.cut_audio_track_at(track_id, time))
    }

    pub fn move_audio_track(&mut self, track_id: ClipId, new_start_time: f64) -> bool {
        self.edit(|t| t.move_audio_track(track_id, new_start_time))
    }

    pub fn delete_audio_track(&mut self, track_id: ClipId) -> bool {
        self.edit(|t| t.delete_audio_track(track_id))
    }

    pub fn set_audio_volume(&mut self, track_id: ClipId, volume: f32) -> bool {
        self.edit(|t| t.set_audio_volume(track_id, volume))
    }

    pub fn set_audio_muted(&mut self, track_id: ClipId, muted: bool) -> bool {
        self.edit(|t| t.set_audio_muted(track_id, muted))
    }

    // ==================== 저장 ====================

    pub fn build_instructions(&self) -> EditInstructions {
        build_instructions(&self.timeline, self.video_volume, &self.original_file)
    }

    /// 렌더 담당자에게 1회 전달 (결과는 기다리지 않음)
    /// 실패해도 모델은 그대로 사용 가능, 에러 문자열만 갱신
    pub fn save(&mut self, sink: &dyn RenderSink) -> Result<(), SaveError> {
        let instructions = self.begin_save()?;
        let result = sink.submit(&instructions);
        self.finish_save(result)
    }

    /// 저장 1단계 - busy 설정 후 지시서 생성
    /// 이미 저장 중이면 Busy
    pub fn begin_save(&mut self) -> Result<EditInstructions, SaveError> {
        if self.status.busy {
            return Err(SaveError::Busy);
        }
        self.status.busy = true;
        self.status.error = None;
        Ok(self.build_instructions())
    }

    /// 저장 2단계 - 전달 결과 반영, busy 해제
    pub fn finish_save(&mut self, result: Result<(), SaveError>) -> Result<(), SaveError> {
        self.status.busy = false;
        if let Err(e) = &result {
            self.report_error(format!("Failed to start saving: {}", e));
        }
        result
    }
}
