// Export FFI - 편집 지시서 조회 / 렌더 담당자에게 저장 핸드오프

use std::ffi::{c_char, c_void, CString};

use super::editor::with_session;
use super::types::{into_c_string, ErrorCode};
use crate::export::{JsonCallbackSink, RenderSink, SaveError};

/// 호스트 렌더/업로드 콜백
/// instructions_json: UTF-8 JSON (콜백 안에서만 유효, 필요하면 복사)
/// 반환: 0=수락, 그 외=거부 코드
pub type RenderCallback = extern "C" fn(instructions_json: *const c_char, user_data: *mut c_void) -> i32;

/// 편집 지시서 JSON 조회 (저장 전 미리보기 등)
/// 반환 후 string_free()로 해제 필요
#[no_mangle]
pub extern "C" fn editor_get_instructions_json(editor: *mut c_void, out_json: *mut *mut c_char) -> i32 {
    if out_json.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    match with_session(editor, |s| s.build_instructions().to_json()) {
        Ok(Ok(json)) => {
            unsafe {
                *out_json = into_c_string(json);
            }
            ErrorCode::Success as i32
        }
        Ok(Err(e)) => {
            log::error!("editor_get_instructions_json: {}", e);
            ErrorCode::Serialize as i32
        }
        Err(code) => code as i32,
    }
}

/// 저장 - 지시서를 콜백으로 1회 전달하고 결과는 기다리지 않음
/// 콜백은 세션 잠금 없이 호출됨 (콜백 안에서 editor_is_busy 등 조회 가능, 중복 저장은 Busy)
/// 콜백 안에서 editor_destroy 호출 금지
/// 실패 시 에러 문자열은 editor_get_error로 조회
#[no_mangle]
pub extern "C" fn editor_save(editor: *mut c_void, callback: Option<RenderCallback>, user_data: *mut c_void) -> i32 {
    let Some(callback) = callback else {
        return ErrorCode::NullPointer as i32;
    };

    let instructions = match with_session(editor, |s| s.begin_save()) {
        Ok(Ok(instructions)) => instructions,
        Ok(Err(e)) => return save_error_code(&e),
        Err(code) => return code as i32,
    };

    let sink = JsonCallbackSink::new(|json: &str| match CString::new(json) {
        Ok(c_json) => callback(c_json.as_ptr(), user_data),
        Err(_) => ErrorCode::Serialize as i32,
    });
    let submitted = sink.submit(&instructions);

    match with_session(editor, |s| s.finish_save(submitted)) {
        Ok(Ok(())) => ErrorCode::Success as i32,
        Ok(Err(e)) => save_error_code(&e),
        Err(code) => code as i32,
    }
}

fn save_error_code(error: &SaveError) -> i32 {
    match error {
        SaveError::Busy => ErrorCode::Busy as i32,
        SaveError::Serialize(_) => ErrorCode::Serialize as i32,
        SaveError::Rejected(_) => ErrorCode::Rejected as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::editor::{editor_create, editor_destroy, editor_get_error, editor_is_busy};
    use crate::ffi::types::string_free;
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicI32, Ordering};

    static BUSY_IN_CALLBACK: AtomicI32 = AtomicI32::new(-1);
    static NESTED_SAVE_CODE: AtomicI32 = AtomicI32::new(-1);

    extern "C" fn accept(json: *const c_char, user_data: *mut c_void) -> i32 {
        let out = unsafe { &mut *(user_data as *mut String) };
        *out = unsafe { CStr::from_ptr(json) }.to_string_lossy().into_owned();
        0
    }

    extern "C" fn reject(_json: *const c_char, _user_data: *mut c_void) -> i32 {
        3
    }

    // user_data = editor 핸들, 콜백 안에서 세션을 다시 조회
    extern "C" fn reenter(_json: *const c_char, user_data: *mut c_void) -> i32 {
        BUSY_IN_CALLBACK.store(editor_is_busy(user_data), Ordering::SeqCst);
        NESTED_SAVE_CODE.store(editor_save(user_data, Some(reject), std::ptr::null_mut()), Ordering::SeqCst);
        0
    }

    fn create() -> *mut c_void {
        let path = CString::new("source.mp4").unwrap();
        let mut editor: *mut c_void = std::ptr::null_mut();
        assert_eq!(editor_create(path.as_ptr(), 30_000, &mut editor), 0);
        editor
    }

    #[test]
    fn test_save_passes_json_to_callback() {
        let editor = create();
        let mut received = String::new();

        let code = editor_save(editor, Some(accept), &mut received as *mut String as *mut c_void);
        assert_eq!(code, 0);

        let value: serde_json::Value = serde_json::from_str(&received).unwrap();
        assert_eq!(value["duration"], 30.0);
        assert_eq!(value["originalVideoFile"], "source.mp4");
        editor_destroy(editor);
    }

    #[test]
    fn test_rejected_save_sets_error() {
        let editor = create();
        assert_eq!(editor_save(editor, Some(reject), std::ptr::null_mut()), ErrorCode::Rejected as i32);

        let mut error: *mut c_char = std::ptr::null_mut();
        editor_get_error(editor, &mut error);
        assert!(!error.is_null());
        string_free(error);

        assert_eq!(editor_save(editor, None, std::ptr::null_mut()), ErrorCode::NullPointer as i32);
        editor_destroy(editor);
    }

    #[test]
    fn test_callback_runs_without_session_lock() {
        let editor = create();

        // 잠금을 쥔 채 콜백을 부르면 여기서 교착
        assert_eq!(editor_save(editor, Some(reenter), editor), 0);
        assert_eq!(BUSY_IN_CALLBACK.load(Ordering::SeqCst), 1);
        assert_eq!(NESTED_SAVE_CODE.load(Ordering::SeqCst), ErrorCode::Busy as i32);

        assert_eq!(editor_is_busy(editor), 0);
        let mut error: *mut c_char = std::ptr::null_mut();
        editor_get_error(editor, &mut error);
        assert!(error.is_null());
        editor_destroy(editor);
    }

    #[test]
    fn test_instructions_json() {
        let editor = create();
        let mut json: *mut c_char = std::ptr::null_mut();
        assert_eq!(editor_get_instructions_json(editor, &mut json), 0);
        let text = unsafe { CStr::from_ptr(json) }.to_str().unwrap().to_string();
        string_free(json);
        assert!(text.contains("\"videoVolume\":1.0"));
        editor_destroy(editor);
    }
}
