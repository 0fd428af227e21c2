// Editor FFI - 호스트 UI 연동
// 세션 생성/파괴, 편집 명령, 포인터 이벤트, undo/redo, 상태 조회
// 도메인 no-op(범위 밖 시간 등)은 Success 반환 - 호스트는 editor_get_state_json으로 다시 그림

use std::ffi::{c_char, c_void};
use std::sync::Mutex;

use super::types::{
    into_c_string, path_arg, str_arg, ErrorCode, TARGET_AUDIO_TRACK, TARGET_CANVAS_OVERLAY, TARGET_RESIZE_HANDLE,
    TARGET_SEGMENT, TARGET_TIMELINE_OVERLAY,
};
use crate::editor::EditorSession;
use crate::ffmpeg::FfmpegProbe;
use crate::interaction::{DragTarget, InputEvent, PointerKind, PointerPosition};
use crate::timeline::TextStyle;

type EditorHandle = Mutex<EditorSession>;

/// 핸들 잠금 후 실행 (null이면 NullPointer, poisoned면 InvalidParam)
pub(crate) fn with_session<R>(editor: *mut c_void, f: impl FnOnce(&mut EditorSession) -> R) -> Result<R, ErrorCode> {
    if editor.is_null() {
        return Err(ErrorCode::NullPointer);
    }
    let handle = unsafe { &*(editor as *const EditorHandle) };
    let mut session = handle.lock().map_err(|_| ErrorCode::InvalidParam)?;
    Ok(f(&mut session))
}

fn run(editor: *mut c_void, f: impl FnOnce(&mut EditorSession)) -> i32 {
    match with_session(editor, f) {
        Ok(()) => ErrorCode::Success as i32,
        Err(code) => code as i32,
    }
}

/// 세션 생성
/// duration_ms <= 0 이면 ffmpeg로 길이 조회
#[no_mangle]
pub extern "C" fn editor_create(file_path: *const c_char, duration_ms: i64, out_editor: *mut *mut c_void) -> i32 {
    if file_path.is_null() || out_editor.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let Some(path) = (unsafe { path_arg(file_path) }) else {
        return ErrorCode::InvalidParam as i32;
    };

    let session = if duration_ms > 0 {
        EditorSession::new(path, duration_ms as f64 / 1000.0).map_err(|e| (ErrorCode::InvalidParam, e.to_string()))
    } else {
        EditorSession::open(path, &FfmpegProbe).map_err(|e| (ErrorCode::Ffmpeg, e))
    };

    match session {
        Ok(session) => {
            let handle: Box<EditorHandle> = Box::new(Mutex::new(session));
            unsafe {
                *out_editor = Box::into_raw(handle) as *mut c_void;
            }
            ErrorCode::Success as i32
        }
        Err((code, msg)) => {
            log::error!("editor_create failed: {}", msg);
            code as i32
        }
    }
}

/// 세션 파괴 (편집 취소 또는 저장 완료 후)
#[no_mangle]
pub extern "C" fn editor_destroy(editor: *mut c_void) -> i32 {
    if editor.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    unsafe {
        let _ = Box::from_raw(editor as *mut EditorHandle);
    }

    ErrorCode::Success as i32
}

// ==================== 세그먼트 ====================

#[no_mangle]
pub extern "C" fn editor_split_segment(editor: *mut c_void, segment_id: u64, time: f64) -> i32 {
    run(editor, |s| {
        s.split_segment_at(segment_id, time);
    })
}

/// time 중심 1초 구간 제거
#[no_mangle]
pub extern "C" fn editor_cut_segment(editor: *mut c_void, segment_id: u64, time: f64) -> i32 {
    run(editor, |s| {
        s.cut_segment_at(segment_id, time);
    })
}

/// 파일 삽입 (길이는 ffmpeg로 조회)
/// out_segment_id: 새 세그먼트 ID (삽입되지 않으면 0)
#[no_mangle]
pub extern "C" fn editor_insert_segment(
    editor: *mut c_void,
    file_path: *const c_char,
    at_time: f64,
    out_segment_id: *mut u64,
) -> i32 {
    if file_path.is_null() || out_segment_id.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let Some(path) = (unsafe { path_arg(file_path) }) else {
        return ErrorCode::InvalidParam as i32;
    };

    match with_session(editor, |s| s.insert_file(&FfmpegProbe, path, at_time)) {
        Ok(id) => {
            unsafe {
                *out_segment_id = id.unwrap_or(0);
            }
            ErrorCode::Success as i32
        }
        Err(code) => code as i32,
    }
}

/// 마지막 세그먼트 삭제 시도 → Rejected (에러 문자열은 editor_get_error)
#[no_mangle]
pub extern "C" fn editor_delete_segment(editor: *mut c_void, segment_id: u64) -> i32 {
    match with_session(editor, |s| s.delete_segment(segment_id)) {
        Ok(Ok(_)) => ErrorCode::Success as i32,
        Ok(Err(_)) => ErrorCode::Rejected as i32,
        Err(code) => code as i32,
    }
}

#[no_mangle]
pub extern "C" fn editor_move_segment(editor: *mut c_void, segment_id: u64, new_start_time: f64) -> i32 {
    run(editor, |s| {
        s.move_segment(segment_id, new_start_time);
    })
}

#[no_mangle]
pub extern "C" fn editor_set_active_segment(editor: *mut c_void, segment_id: u64) -> i32 {
    run(editor, |s| {
        s.set_active_segment(segment_id);
    })
}

#[no_mangle]
pub extern "C" fn editor_set_segment_volume(editor: *mut c_void, segment_id: u64, volume: f32) -> i32 {
    run(editor, |s| {
        s.set_segment_volume(segment_id, volume);
    })
}

/// muted: 0=해제, 그 외=음소거
#[no_mangle]
pub extern "C" fn editor_set_segment_muted(editor: *mut c_void, segment_id: u64, muted: i32) -> i32 {
    run(editor, |s| {
        s.set_segment_muted(segment_id, muted != 0);
    })
}

// ==================== 텍스트 오버레이 ====================

/// 현재 재생 위치에 기본 스타일 오버레이 추가
/// 드래그 제스처 진행 중이면 Busy
#[no_mangle]
pub extern "C" fn editor_add_text_overlay(editor: *mut c_void, text: *const c_char, out_overlay_id: *mut u64) -> i32 {
    if text.is_null() || out_overlay_id.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let Some(text) = (unsafe { str_arg(text) }) else {
        return ErrorCode::InvalidParam as i32;
    };

    match with_session(editor, |s| s.add_text_overlay(text)) {
        Ok(Some(id)) => {
            unsafe {
                *out_overlay_id = id;
            }
            ErrorCode::Success as i32
        }
        // 드래그 제스처 진행 중
        Ok(None) => ErrorCode::Busy as i32,
        Err(code) => code as i32,
    }
}

#[no_mangle]
pub extern "C" fn editor_update_text_overlay_text(editor: *mut c_void, overlay_id: u64, text: *const c_char) -> i32 {
    if text.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let Some(text) = (unsafe { str_arg(text) }) else {
        return ErrorCode::InvalidParam as i32;
    };
    run(editor, |s| {
        s.update_text_overlay_text(overlay_id, text);
    })
}

/// x, y: 캔버스 % (0~100으로 클램프)
#[no_mangle]
pub extern "C" fn editor_update_text_overlay_position(editor: *mut c_void, overlay_id: u64, x: f64, y: f64) -> i32 {
    run(editor, |s| {
        s.update_text_overlay_position(overlay_id, x, y);
    })
}

/// style_json: TextStyle JSON (camelCase, 빠진 필드는 기본값)
#[no_mangle]
pub extern "C" fn editor_update_text_overlay_style(
    editor: *mut c_void,
    overlay_id: u64,
    style_json: *const c_char,
) -> i32 {
    if style_json.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let Some(json) = (unsafe { str_arg(style_json) }) else {
        return ErrorCode::InvalidParam as i32;
    };
    let style: TextStyle = match serde_json::from_str(json) {
        Ok(style) => style,
        Err(e) => {
            log::warn!("editor_update_text_overlay_style: invalid style: {}", e);
            return ErrorCode::InvalidParam as i32;
        }
    };
    run(editor, |s| {
        s.update_text_overlay_style(overlay_id, style);
    })
}

#[no_mangle]
pub extern "C" fn editor_update_text_overlay_duration(editor: *mut c_void, overlay_id: u64, duration: f64) -> i32 {
    run(editor, |s| {
        s.update_text_overlay_duration(overlay_id, duration);
    })
}

#[no_mangle]
pub extern "C" fn editor_update_text_overlay_start_time(editor: *mut c_void, overlay_id: u64, start_time: f64) -> i32 {
    run(editor, |s| {
        s.update_text_overlay_start_time(overlay_id, start_time);
    })
}

#[no_mangle]
pub extern "C" fn editor_update_text_overlay_size(editor: *mut c_void, overlay_id: u64, width: f64, height: f64) -> i32 {
    run(editor, |s| {
        s.update_text_overlay_size(overlay_id, width, height);
    })
}

#[no_mangle]
pub extern "C" fn editor_update_text_overlay_rotation(editor: *mut c_void, overlay_id: u64, degrees: f64) -> i32 {
    run(editor, |s| {
        s.update_text_overlay_rotation(overlay_id, degrees);
    })
}

#[no_mangle]
pub extern "C" fn editor_delete_text_overlay(editor: *mut c_void, overlay_id: u64) -> i32 {
    run(editor, |s| {
        s.delete_text_overlay(overlay_id);
    })
}

// ==================== 오디오 트랙 ====================

/// 현재 재생 위치에 오디오 트랙 추가 (길이는 ffmpeg로 조회)
/// name이 null이면 파일 이름 사용
#[no_mangle]
pub extern "C" fn editor_add_audio_track(
    editor: *mut c_void,
    file_path: *const c_char,
    name: *const c_char,
    out_track_id: *mut u64,
) -> i32 {
    if file_path.is_null() || out_track_id.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let Some(path) = (unsafe { path_arg(file_path) }) else {
        return ErrorCode::InvalidParam as i32;
    };
    let name = unsafe { str_arg(name) }
        .map(str::to_string)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    match with_session(editor, |s| s.add_audio_file(&FfmpegProbe, path, &name)) {
        Ok(id) => {
            unsafe {
                *out_track_id = id.unwrap_or(0);
            }
            ErrorCode::Success as i32
        }
        Err(code) => code as i32,
    }
}

#[no_mangle]
pub extern "C" fn editor_split_audio_track(editor: *mut c_void, track_id: u64, time: f64) -> i32 {
    run(editor, |s| {
        s.split_audio_track_at(track_id, time);
    })
}

#[no_mangle]
pub extern "C" fn editor_cut_audio_track(editor: *mut c_void, track_id: u64, time: f64) -> i32 {
    run(editor, |s| {
        s.cut_audio_track_at(track_id, time);
    })
}

#[no_mangle]
pub extern "C" fn editor_move_audio_track(editor: *mut c_void, track_id: u64, new_start_time: f64) -> i32 {
    run(editor, |s| {
        s.move_audio_track(track_id, new_start_time);
    })
}

#[no_mangle]
pub extern "C" fn editor_delete_audio_track(editor: *mut c_void, track_id: u64) -> i32 {
    run(editor, |s| {
        s.delete_audio_track(track_id);
    })
}

#[no_mangle]
pub extern "C" fn editor_set_audio_volume(editor: *mut c_void, track_id: u64, volume: f32) -> i32 {
    run(editor, |s| {
        s.set_audio_volume(track_id, volume);
    })
}

#[no_mangle]
pub extern "C" fn editor_set_audio_muted(editor: *mut c_void, track_id: u64, muted: i32) -> i32 {
    run(editor, |s| {
        s.set_audio_muted(track_id, muted != 0);
    })
}

// ==================== 전역 설정 ====================

/// 재생 위치 동기화 (히스토리 기록 안 함)
#[no_mangle]
pub extern "C" fn editor_set_playhead(editor: *mut c_void, time: f64) -> i32 {
    run(editor, |s| s.set_playhead(time))
}

#[no_mangle]
pub extern "C" fn editor_set_video_volume(editor: *mut c_void, volume: f32) -> i32 {
    run(editor, |s| s.set_video_volume(volume))
}

// ==================== 포인터 이벤트 ====================

/// target_kind별 extent 의미
/// - TARGET_SEGMENT / TARGET_AUDIO_TRACK: extent_a = 타임라인 컨테이너 너비
/// - TARGET_CANVAS_OVERLAY / TARGET_RESIZE_HANDLE: extent_a, extent_b = 캔버스 너비, 높이
/// - TARGET_TIMELINE_OVERLAY: extent_a, extent_b = 타임라인 left, 너비
fn drag_target(target_kind: i32, id: u64, extent_a: f64, extent_b: f64) -> Option<DragTarget> {
    match target_kind {
        TARGET_SEGMENT => Some(DragTarget::Segment { id, container_width: extent_a }),
        TARGET_AUDIO_TRACK => Some(DragTarget::AudioTrack { id, container_width: extent_a }),
        TARGET_CANVAS_OVERLAY => Some(DragTarget::CanvasOverlay {
            id,
            canvas_width: extent_a,
            canvas_height: extent_b,
        }),
        TARGET_TIMELINE_OVERLAY => Some(DragTarget::TimelineOverlay {
            id,
            timeline_left: extent_a,
            timeline_width: extent_b,
        }),
        TARGET_RESIZE_HANDLE => Some(DragTarget::ResizeHandle {
            id,
            canvas_width: extent_a,
            canvas_height: extent_b,
        }),
        _ => None,
    }
}

/// pointer_kind: 0=마우스, 그 외=터치
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn editor_pointer_down(
    editor: *mut c_void,
    pointer_kind: i32,
    target_kind: i32,
    target_id: u64,
    x: f64,
    y: f64,
    extent_a: f64,
    extent_b: f64,
) -> i32 {
    let Some(target) = drag_target(target_kind, target_id, extent_a, extent_b) else {
        return ErrorCode::InvalidParam as i32;
    };
    let event = InputEvent::Press {
        kind: PointerKind::from_i32(pointer_kind),
        target,
        pointer: PointerPosition::new(x, y),
    };
    run(editor, |s| {
        s.handle_input(event);
    })
}

#[no_mangle]
pub extern "C" fn editor_pointer_move(editor: *mut c_void, pointer_kind: i32, x: f64, y: f64) -> i32 {
    let event = InputEvent::Move {
        kind: PointerKind::from_i32(pointer_kind),
        pointer: PointerPosition::new(x, y),
    };
    run(editor, |s| {
        s.handle_input(event);
    })
}

/// 제스처 종료 → 히스토리 1회 기록
#[no_mangle]
pub extern "C" fn editor_pointer_up(editor: *mut c_void, pointer_kind: i32) -> i32 {
    let event = InputEvent::Release {
        kind: PointerKind::from_i32(pointer_kind),
    };
    run(editor, |s| {
        s.handle_input(event);
    })
}

/// release 없이 포인터 캡처를 잃었을 때 (release와 동일하게 처리)
#[no_mangle]
pub extern "C" fn editor_pointer_capture_lost(editor: *mut c_void) -> i32 {
    run(editor, |s| {
        s.handle_input(InputEvent::CaptureLost);
    })
}

// ==================== 히스토리 ====================

/// out_playhead: 호스트 플레이어를 옮길 위치
/// 되돌릴 항목이 없으면 Rejected
#[no_mangle]
pub extern "C" fn editor_undo(editor: *mut c_void, out_playhead: *mut f64) -> i32 {
    history_step(editor, out_playhead, EditorSession::undo)
}

#[no_mangle]
pub extern "C" fn editor_redo(editor: *mut c_void, out_playhead: *mut f64) -> i32 {
    history_step(editor, out_playhead, EditorSession::redo)
}

fn history_step(editor: *mut c_void, out_playhead: *mut f64, step: fn(&mut EditorSession) -> Option<f64>) -> i32 {
    if out_playhead.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    match with_session(editor, step) {
        Ok(Some(playhead)) => {
            unsafe {
                *out_playhead = playhead;
            }
            ErrorCode::Success as i32
        }
        Ok(None) => ErrorCode::Rejected as i32,
        Err(code) => code as i32,
    }
}

/// 반환: 1=가능, 0=불가
#[no_mangle]
pub extern "C" fn editor_can_undo(editor: *mut c_void) -> i32 {
    with_session(editor, |s| s.can_undo() as i32).unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn editor_can_redo(editor: *mut c_void) -> i32 {
    with_session(editor, |s| s.can_redo() as i32).unwrap_or(0)
}

// ==================== 상태 ====================

/// 현재 에러 문자열 (없으면 null)
/// 반환 후 string_free()로 해제 필요
#[no_mangle]
pub extern "C" fn editor_get_error(editor: *mut c_void, out_error: *mut *mut c_char) -> i32 {
    if out_error.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    match with_session(editor, |s| s.status().error.clone()) {
        Ok(error) => {
            unsafe {
                *out_error = error.map(into_c_string).unwrap_or(std::ptr::null_mut());
            }
            ErrorCode::Success as i32
        }
        Err(code) => code as i32,
    }
}

#[no_mangle]
pub extern "C" fn editor_clear_error(editor: *mut c_void) -> i32 {
    run(editor, |s| s.clear_error())
}

/// 반환: 1=저장 시작 중, 0=유휴
#[no_mangle]
pub extern "C" fn editor_is_busy(editor: *mut c_void) -> i32 {
    with_session(editor, |s| s.status().busy as i32).unwrap_or(0)
}

/// 현재 편집 상태 (EditorSnapshot JSON) - 호스트 UI 다시 그리기용
/// 반환 후 string_free()로 해제 필요
#[no_mangle]
pub extern "C" fn editor_get_state_json(editor: *mut c_void, out_json: *mut *mut c_char) -> i32 {
    if out_json.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    match with_session(editor, |s| serde_json::to_string(&s.snapshot())) {
        Ok(Ok(json)) => {
            unsafe {
                *out_json = into_c_string(json);
            }
            ErrorCode::Success as i32
        }
        Ok(Err(e)) => {
            log::error!("editor_get_state_json: {}", e);
            ErrorCode::Serialize as i32
        }
        Err(code) => code as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::types::string_free;
    use std::ffi::{CStr, CString};

    fn create(duration_ms: i64) -> *mut c_void {
        let path = CString::new("source.mp4").unwrap();
        let mut editor: *mut c_void = std::ptr::null_mut();
        assert_eq!(editor_create(path.as_ptr(), duration_ms, &mut editor), 0);
        editor
    }

    fn first_segment(editor: *mut c_void) -> u64 {
        with_session(editor, |s| s.timeline().segments()[0].id).unwrap()
    }

    #[test]
    fn test_null_handles() {
        assert_eq!(editor_split_segment(std::ptr::null_mut(), 1, 1.0), ErrorCode::NullPointer as i32);
        assert_eq!(editor_destroy(std::ptr::null_mut()), ErrorCode::NullPointer as i32);
        assert_eq!(editor_can_undo(std::ptr::null_mut()), 0);
    }

    #[test]
    fn test_commands_and_history() {
        let editor = create(30_000);
        let id = first_segment(editor);

        assert_eq!(editor_split_segment(editor, id, 10.0), 0);
        assert_eq!(editor_can_undo(editor), 1);

        let mut playhead = -1.0;
        assert_eq!(editor_undo(editor, &mut playhead), 0);
        assert_eq!(playhead, 0.0);
        assert_eq!(editor_undo(editor, &mut playhead), ErrorCode::Rejected as i32);
        assert_eq!(editor_redo(editor, &mut playhead), 0);

        assert_eq!(editor_destroy(editor), 0);
    }

    #[test]
    fn test_delete_last_segment_is_rejected_with_error() {
        let editor = create(5_000);
        let id = first_segment(editor);

        assert_eq!(editor_delete_segment(editor, id), ErrorCode::Rejected as i32);

        let mut error: *mut c_char = std::ptr::null_mut();
        assert_eq!(editor_get_error(editor, &mut error), 0);
        assert!(!error.is_null());
        let msg = unsafe { CStr::from_ptr(error) }.to_str().unwrap().to_string();
        assert_eq!(msg, "Cannot delete the only remaining segment");
        string_free(error);

        editor_clear_error(editor);
        assert_eq!(editor_get_error(editor, &mut error), 0);
        assert!(error.is_null());

        editor_destroy(editor);
    }

    #[test]
    fn test_pointer_gesture_commits_once() {
        let editor = create(30_000);
        let text = CString::new("hi").unwrap();
        let mut overlay = 0u64;
        assert_eq!(editor_add_text_overlay(editor, text.as_ptr(), &mut overlay), 0);

        assert_eq!(
            editor_pointer_down(editor, 0, TARGET_CANVAS_OVERLAY, overlay, 100.0, 50.0, 200.0, 100.0),
            0
        );
        editor_pointer_move(editor, 0, 500.0, -80.0);
        let depth = with_session(editor, |s| s.history().len()).unwrap();
        editor_pointer_up(editor, 0);

        let (len, x, y) = with_session(editor, |s| {
            let o = s.timeline().text_overlay(overlay).unwrap();
            (s.history().len(), o.position.x, o.position.y)
        })
        .unwrap();
        assert_eq!(len, depth + 1);
        assert_eq!((x, y), (100.0, 0.0));

        assert_eq!(editor_pointer_down(editor, 0, 99, overlay, 0.0, 0.0, 1.0, 1.0), ErrorCode::InvalidParam as i32);
        editor_destroy(editor);
    }

    #[test]
    fn test_style_json_update() {
        let editor = create(30_000);
        let text = CString::new("hi").unwrap();
        let mut overlay = 0u64;
        editor_add_text_overlay(editor, text.as_ptr(), &mut overlay);

        let style = CString::new(r##"{"color":"#ff0000","fontSize":32}"##).unwrap();
        assert_eq!(editor_update_text_overlay_style(editor, overlay, style.as_ptr()), 0);
        let bad = CString::new("not json").unwrap();
        assert_eq!(
            editor_update_text_overlay_style(editor, overlay, bad.as_ptr()),
            ErrorCode::InvalidParam as i32
        );

        let color = with_session(editor, |s| s.timeline().text_overlay(overlay).unwrap().style.color.clone()).unwrap();
        assert_eq!(color, "#ff0000");
        editor_destroy(editor);
    }

    #[test]
    fn test_state_json() {
        let editor = create(12_000);
        let mut json: *mut c_char = std::ptr::null_mut();
        assert_eq!(editor_get_state_json(editor, &mut json), 0);
        let text = unsafe { CStr::from_ptr(json) }.to_str().unwrap().to_string();
        string_free(json);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["segments"][0]["endTime"], 12.0);
        assert_eq!(value["currentPlayheadTime"], 0.0);
        editor_destroy(editor);
    }
}
