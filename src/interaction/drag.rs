// 드래그 상호작용 상태 머신
// 아키텍처: (상태, 이벤트) → 새 상태 + Timeline 변경
// - 세그먼트/오디오: press 시점 앵커 기준 delta 방식 (시간 좌표)
// - 오버레이: 매 move마다 절대 좌표에서 재계산 (캔버스 % 좌표 / 타임라인 시간 좌표)
// - 히스토리 commit은 여기서 하지 않음. Finished를 받은 쪽이 제스처당 1회 commit

use super::input::{is_positive_extent, DragTarget, InputEvent, PointerKind, PointerPosition};
use crate::timeline::{ClipId, Timeline};

/// 드래그 상태
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    DraggingSegment {
        segment_id: ClipId,
        press_x: f64,
        drag_start_time: f64,
        container_width: f64,
        /// press 시점 총 길이 (제스처 동안 이동 경계)
        total_duration: f64,
    },
    DraggingAudioTrack {
        track_id: ClipId,
        press_x: f64,
        drag_start_time: f64,
        container_width: f64,
        total_duration: f64,
    },
    DraggingOverlayOnCanvas {
        overlay_id: ClipId,
        /// 기존 % 위치를 오프셋으로 보존하는 앵커 (px)
        anchor: PointerPosition,
        canvas_width: f64,
        canvas_height: f64,
    },
    DraggingOverlayOnTimeline {
        overlay_id: ClipId,
        timeline_left: f64,
        timeline_width: f64,
    },
    ResizingOverlay {
        overlay_id: ClipId,
        press: PointerPosition,
        start_width: f64,
        start_height: f64,
        canvas_width: f64,
        canvas_height: f64,
    },
}

/// 이벤트 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// 상태 변화 없음 (Idle에서 move, 다른 포인터 종류 등)
    Ignored,
    /// 제스처 시작 (Idle → 드래그 상태)
    Started,
    /// 제스처 진행 중 move (changed=false면 경계 밖이라 마지막 유효 위치 유지)
    Updated { changed: bool },
    /// 제스처 종료 → 호출자가 히스토리 commit 1회
    Finished,
}

pub struct DragController {
    state: DragState,
    /// 진행 중 제스처의 포인터 종류
    active_kind: Option<PointerKind>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            active_kind: None,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    /// 이벤트 하나 처리
    pub fn handle(&mut self, event: InputEvent, timeline: &mut Timeline) -> DragOutcome {
        match event {
            InputEvent::Press { kind, target, pointer } => self.on_press(kind, target, pointer, timeline),
            InputEvent::Move { kind, pointer } => self.on_move(kind, pointer, timeline),
            InputEvent::Release { kind } => {
                if self.active_kind != Some(kind) {
                    return DragOutcome::Ignored;
                }
                self.finish()
            }
            InputEvent::CaptureLost => self.finish(),
        }
    }

    fn finish(&mut self) -> DragOutcome {
        if self.is_idle() {
            return DragOutcome::Ignored;
        }
        log::debug!("drag finished: {:?}", self.state);
        self.state = DragState::Idle;
        self.active_kind = None;
        DragOutcome::Finished
    }

    /// Idle → 드래그 상태 전이 (대상이 없거나 영역 크기가 0이면 Idle 유지)
    fn on_press(
        &mut self,
        kind: PointerKind,
        target: DragTarget,
        pointer: PointerPosition,
        timeline: &Timeline,
    ) -> DragOutcome {
        if !self.is_idle() || !pointer.x.is_finite() || !pointer.y.is_finite() {
            return DragOutcome::Ignored;
        }

        let next = match target {
            DragTarget::Segment { id, container_width } => {
                let segment = match timeline.segment(id) {
                    Some(s) if is_positive_extent(container_width) => s,
                    _ => return DragOutcome::Ignored,
                };
                DragState::DraggingSegment {
                    segment_id: id,
                    press_x: pointer.x,
                    drag_start_time: segment.start_time,
                    container_width,
                    total_duration: timeline.total_duration(),
                }
            }
            DragTarget::AudioTrack { id, container_width } => {
                let track = match timeline.audio_track(id) {
                    Some(t) if is_positive_extent(container_width) => t,
                    _ => return DragOutcome::Ignored,
                };
                DragState::DraggingAudioTrack {
                    track_id: id,
                    press_x: pointer.x,
                    drag_start_time: track.start_time,
                    container_width,
                    total_duration: timeline.total_duration(),
                }
            }
            DragTarget::CanvasOverlay { id, canvas_width, canvas_height } => {
                let overlay = match timeline.text_overlay(id) {
                    Some(o) if is_positive_extent(canvas_width) && is_positive_extent(canvas_height) => o,
                    _ => return DragOutcome::Ignored,
                };
                let anchor = PointerPosition::new(
                    pointer.x - overlay.position.x * canvas_width / 100.0,
                    pointer.y - overlay.position.y * canvas_height / 100.0,
                );
                DragState::DraggingOverlayOnCanvas {
                    overlay_id: id,
                    anchor,
                    canvas_width,
                    canvas_height,
                }
            }
            DragTarget::TimelineOverlay { id, timeline_left, timeline_width } => {
                if timeline.text_overlay(id).is_none()
                    || !is_positive_extent(timeline_width)
                    || !timeline_left.is_finite()
                {
                    return DragOutcome::Ignored;
                }
                DragState::DraggingOverlayOnTimeline {
                    overlay_id: id,
                    timeline_left,
                    timeline_width,
                }
            }
            DragTarget::ResizeHandle { id, canvas_width, canvas_height } => {
                let overlay = match timeline.text_overlay(id) {
                    Some(o) if is_positive_extent(canvas_width) && is_positive_extent(canvas_height) => o,
                    _ => return DragOutcome::Ignored,
                };
                DragState::ResizingOverlay {
                    overlay_id: id,
                    press: pointer,
                    start_width: overlay.width,
                    start_height: overlay.height,
                    canvas_width,
                    canvas_height,
                }
            }
        };

        log::debug!("drag started ({:?}): {:?}", kind, next);
        self.state = next;
        self.active_kind = Some(kind);
        DragOutcome::Started
    }

    fn on_move(&mut self, kind: PointerKind, pointer: PointerPosition, timeline: &mut Timeline) -> DragOutcome {
        if self.is_idle() || self.active_kind != Some(kind) {
            return DragOutcome::Ignored;
        }
        if !pointer.x.is_finite() || !pointer.y.is_finite() {
            return DragOutcome::Updated { changed: false };
        }

        let changed = match self.state {
            DragState::Idle => return DragOutcome::Ignored,
            DragState::DraggingSegment {
                segment_id,
                press_x,
                drag_start_time,
                container_width,
                total_duration,
            } => {
                let delta_time = (pointer.x - press_x) / container_width * total_duration;
                let new_start = (drag_start_time + delta_time).max(0.0);
                crate::debug_log!("[DRAG] segment {} → {:.3}s", segment_id, new_start);
                // 경계 밖이면 포인터가 앞질러 가도 마지막 유효 위치 유지
                timeline.move_segment_within(segment_id, new_start, total_duration)
            }
            DragState::DraggingAudioTrack {
                track_id,
                press_x,
                drag_start_time,
                container_width,
                total_duration,
            } => {
                let delta_time = (pointer.x - press_x) / container_width * total_duration;
                let new_start = (drag_start_time + delta_time).max(0.0);
                crate::debug_log!("[DRAG] audio {} → {:.3}s", track_id, new_start);
                timeline.move_audio_track_within(track_id, new_start, total_duration)
            }
            DragState::DraggingOverlayOnCanvas {
                overlay_id,
                anchor,
                canvas_width,
                canvas_height,
            } => {
                let x = (pointer.x - anchor.x) / canvas_width * 100.0;
                let y = (pointer.y - anchor.y) / canvas_height * 100.0;
                crate::debug_log!("[DRAG] overlay {} → ({:.1}%, {:.1}%)", overlay_id, x, y);
                timeline.update_text_overlay_position(overlay_id, x, y)
            }
            DragState::DraggingOverlayOnTimeline {
                overlay_id,
                timeline_left,
                timeline_width,
            } => {
                let start = (pointer.x - timeline_left) / timeline_width * timeline.total_duration();
                timeline.update_text_overlay_start_time(overlay_id, start)
            }
            DragState::ResizingOverlay {
                overlay_id,
                press,
                start_width,
                start_height,
                canvas_width,
                canvas_height,
            } => {
                let width = start_width + (pointer.x - press.x) / canvas_width * 100.0;
                let height = start_height + (pointer.y - press.y) / canvas_height * 100.0;
                timeline.update_text_overlay_size(overlay_id, width, height)
            }
        };

        DragOutcome::Updated { changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn timeline_30s_split_at_10() -> Timeline {
        let mut tl = Timeline::new(PathBuf::from("source.mp4"), 30.0).unwrap();
        let id = tl.segments()[0].id;
        tl.split_segment_at(id, 10.0);
        tl
    }

    fn press(target: DragTarget, x: f64, y: f64) -> InputEvent {
        InputEvent::Press {
            kind: PointerKind::Mouse,
            target,
            pointer: PointerPosition::new(x, y),
        }
    }

    fn mouse_move(x: f64, y: f64) -> InputEvent {
        InputEvent::Move {
            kind: PointerKind::Mouse,
            pointer: PointerPosition::new(x, y),
        }
    }

    #[test]
    fn test_segment_drag_is_delta_based() {
        let mut tl = timeline_30s_split_at_10();
        let first = tl.segments()[0].id;
        let mut drag = DragController::new();

        // 300px = 30초 → 1px = 0.1초
        let target = DragTarget::Segment { id: first, container_width: 300.0 };
        assert_eq!(drag.handle(press(target, 500.0, 0.0), &mut tl), DragOutcome::Started);
        assert!(matches!(drag.state(), DragState::DraggingSegment { drag_start_time, .. } if *drag_start_time == 0.0));

        assert_eq!(
            drag.handle(mouse_move(550.0, 0.0), &mut tl),
            DragOutcome::Updated { changed: true }
        );
        assert_eq!(tl.segment(first).unwrap().start_time, 5.0);

        // 포인터가 경계를 앞질러 가면 마지막 유효 위치 유지
        assert_eq!(
            drag.handle(mouse_move(900.0, 0.0), &mut tl),
            DragOutcome::Updated { changed: false }
        );
        assert_eq!(tl.segment(first).unwrap().start_time, 5.0);

        // 왼쪽으로 넘어가면 0에 고정
        drag.handle(mouse_move(100.0, 0.0), &mut tl);
        assert_eq!(tl.segment(first).unwrap().start_time, 0.0);

        assert_eq!(drag.handle(InputEvent::Release { kind: PointerKind::Mouse }, &mut tl), DragOutcome::Finished);
        assert!(drag.is_idle());
    }

    #[test]
    fn test_canvas_overlay_drag_preserves_offset_and_clamps() {
        let mut tl = timeline_30s_split_at_10();
        let id = tl.add_text_overlay("hi");
        let mut drag = DragController::new();

        let target = DragTarget::CanvasOverlay { id, canvas_width: 200.0, canvas_height: 400.0 };
        // 오버레이 중심(50%,50%)이 아닌 곳을 잡아도 위치가 튀지 않음
        drag.handle(press(target, 130.0, 210.0), &mut tl);
        drag.handle(mouse_move(130.0, 210.0), &mut tl);
        let p = tl.text_overlay(id).unwrap().position;
        assert!((p.x - 50.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9);

        drag.handle(mouse_move(150.0, 250.0), &mut tl);
        let p = tl.text_overlay(id).unwrap().position;
        assert!((p.x - 60.0).abs() < 1e-9 && (p.y - 60.0).abs() < 1e-9);

        for (x, y) in [(-5000.0, -5000.0), (9000.0, 9000.0), (-10.0, 9000.0)] {
            drag.handle(mouse_move(x, y), &mut tl);
            let p = tl.text_overlay(id).unwrap().position;
            assert!((0.0..=100.0).contains(&p.x));
            assert!((0.0..=100.0).contains(&p.y));
        }
    }

    #[test]
    fn test_timeline_overlay_drag_clamps_start() {
        let mut tl = timeline_30s_split_at_10();
        let id = tl.add_text_overlay("hi");
        let mut drag = DragController::new();

        let target = DragTarget::TimelineOverlay { id, timeline_left: 20.0, timeline_width: 600.0 };
        drag.handle(press(target, 20.0, 0.0), &mut tl);
        assert!(matches!(drag.state(), DragState::DraggingOverlayOnTimeline { .. }));

        drag.handle(mouse_move(320.0, 0.0), &mut tl);
        assert_eq!(tl.text_overlay(id).unwrap().start_time, 15.0);

        drag.handle(mouse_move(620.0, 0.0), &mut tl);
        assert_eq!(tl.text_overlay(id).unwrap().start_time, 25.0);

        drag.handle(mouse_move(-100.0, 0.0), &mut tl);
        assert_eq!(tl.text_overlay(id).unwrap().start_time, 0.0);
    }

    #[test]
    fn test_resize_changes_size_not_position() {
        let mut tl = timeline_30s_split_at_10();
        let id = tl.add_text_overlay("hi");
        let mut drag = DragController::new();

        let target = DragTarget::ResizeHandle { id, canvas_width: 200.0, canvas_height: 100.0 };
        drag.handle(press(target, 0.0, 0.0), &mut tl);
        drag.handle(mouse_move(20.0, 5.0), &mut tl);

        let overlay = tl.text_overlay(id).unwrap();
        assert_eq!((overlay.width, overlay.height), (50.0, 15.0));
        assert_eq!((overlay.position.x, overlay.position.y), (50.0, 50.0));
    }

    #[test]
    fn test_audio_track_drag() {
        let mut tl = timeline_30s_split_at_10();
        let id = tl.add_audio_track(PathBuf::from("bgm.mp3"), "bgm", 10.0).unwrap();
        let mut drag = DragController::new();

        drag.handle(press(DragTarget::AudioTrack { id, container_width: 300.0 }, 0.0, 0.0), &mut tl);
        drag.handle(mouse_move(100.0, 0.0), &mut tl);
        assert_eq!(tl.audio_track(id).unwrap().start_time, 10.0);
        drag.handle(mouse_move(250.0, 0.0), &mut tl);
        assert_eq!(tl.audio_track(id).unwrap().start_time, 10.0);
    }

    #[test]
    fn test_touch_and_mouse_do_not_mix() {
        let mut tl = timeline_30s_split_at_10();
        let first = tl.segments()[0].id;
        let mut drag = DragController::new();

        let started = drag.handle(
            InputEvent::Press {
                kind: PointerKind::Touch,
                target: DragTarget::Segment { id: first, container_width: 300.0 },
                pointer: PointerPosition::new(0.0, 0.0),
            },
            &mut tl,
        );
        assert_eq!(started, DragOutcome::Started);

        // 터치 후 에뮬레이션된 마우스 이벤트는 무시
        assert_eq!(drag.handle(mouse_move(50.0, 0.0), &mut tl), DragOutcome::Ignored);
        assert_eq!(drag.handle(InputEvent::Release { kind: PointerKind::Mouse }, &mut tl), DragOutcome::Ignored);

        let moved = drag.handle(
            InputEvent::Move { kind: PointerKind::Touch, pointer: PointerPosition::new(50.0, 0.0) },
            &mut tl,
        );
        assert_eq!(moved, DragOutcome::Updated { changed: true });
        assert_eq!(drag.handle(InputEvent::Release { kind: PointerKind::Touch }, &mut tl), DragOutcome::Finished);
    }

    #[test]
    fn test_idle_transitions() {
        let mut tl = timeline_30s_split_at_10();
        let mut drag = DragController::new();

        assert_eq!(drag.handle(mouse_move(10.0, 10.0), &mut tl), DragOutcome::Ignored);
        assert_eq!(drag.handle(InputEvent::Release { kind: PointerKind::Mouse }, &mut tl), DragOutcome::Ignored);
        assert_eq!(drag.handle(InputEvent::CaptureLost, &mut tl), DragOutcome::Ignored);

        // 없는 대상, 폭 0 컨테이너
        let missing = DragTarget::Segment { id: 999, container_width: 300.0 };
        assert_eq!(drag.handle(press(missing, 0.0, 0.0), &mut tl), DragOutcome::Ignored);
        let first = tl.segments()[0].id;
        let zero = DragTarget::Segment { id: first, container_width: 0.0 };
        assert_eq!(drag.handle(press(zero, 0.0, 0.0), &mut tl), DragOutcome::Ignored);
        assert!(drag.is_idle());
    }

    #[test]
    fn test_capture_lost_ends_gesture() {
        let mut tl = timeline_30s_split_at_10();
        let first = tl.segments()[0].id;
        let mut drag = DragController::new();

        drag.handle(press(DragTarget::Segment { id: first, container_width: 300.0 }, 0.0, 0.0), &mut tl);
        // 진행 중 두 번째 press는 무시
        let second = tl.segments()[1].id;
        assert_eq!(
            drag.handle(press(DragTarget::Segment { id: second, container_width: 300.0 }, 0.0, 0.0), &mut tl),
            DragOutcome::Ignored
        );
        assert_eq!(drag.handle(InputEvent::CaptureLost, &mut tl), DragOutcome::Finished);
        assert!(drag.is_idle());
    }
}
