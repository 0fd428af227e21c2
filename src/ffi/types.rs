// FFI 공용 타입 - 에러 코드, 문자열 변환, 드래그 대상 종류

use std::ffi::{c_char, CStr, CString};
use std::path::PathBuf;

/// FFI 반환 코드 (0 = 성공)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    NullPointer = 1,
    InvalidParam = 2,
    Ffmpeg = 3,
    /// 도메인 규칙으로 거부됨 (마지막 세그먼트 삭제, 되돌릴 항목 없음 등)
    Rejected = 4,
    /// 저장 또는 드래그 제스처 진행 중
    Busy = 5,
    Serialize = 6,
}

/// press 대상 종류 (editor_pointer_down의 target_kind)
pub const TARGET_SEGMENT: i32 = 0;
pub const TARGET_AUDIO_TRACK: i32 = 1;
pub const TARGET_CANVAS_OVERLAY: i32 = 2;
pub const TARGET_TIMELINE_OVERLAY: i32 = 3;
pub const TARGET_RESIZE_HANDLE: i32 = 4;

/// UTF-8 C 문자열 → &str (null/잘못된 인코딩이면 None)
///
/// # Safety
/// ptr은 null이거나 NUL 종료된 유효한 문자열이어야 함
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// # Safety
/// str_arg와 동일
pub(crate) unsafe fn path_arg(ptr: *const c_char) -> Option<PathBuf> {
    str_arg(ptr).filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Rust 문자열 → 호스트 소유 C 문자열 (string_free로 해제, 내부 NUL이면 null)
pub(crate) fn into_c_string(value: String) -> *mut c_char {
    match CString::new(value) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// 문자열 해제 (엔진이 반환한 모든 문자열 공용)
#[no_mangle]
pub extern "C" fn string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
