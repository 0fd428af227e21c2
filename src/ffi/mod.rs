// FFI 모듈 - 호스트 UI(C ABI) 연동
// 핸들은 Box raw pointer, 반환값은 ErrorCode(i32), 문자열은 string_free로 해제

pub mod editor;
pub mod export;
pub mod thumbnail;
pub mod types;

pub use editor::*;
pub use export::*;
pub use thumbnail::*;
pub use types::{string_free, ErrorCode};

use std::ffi::c_char;

use self::types::path_arg;
use crate::ffmpeg;

/// 로거 초기화 (RUST_LOG 환경변수, 여러 번 호출해도 안전)
/// 반환: 0=초기화됨, 1=이미 초기화되어 있음
#[no_mangle]
pub extern "C" fn engine_init_logging() -> i32 {
    match env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init() {
        Ok(()) => {
            log::info!("reel_engine {} logging ready", env!("CARGO_PKG_VERSION"));
            0
        }
        Err(_) => 1,
    }
}

/// 비디오 파일 정보 조회 (duration, width, height, fps)
#[no_mangle]
pub extern "C" fn get_video_info(
    file_path: *const c_char,
    out_duration_ms: *mut i64,
    out_width: *mut u32,
    out_height: *mut u32,
    out_fps: *mut f64,
) -> i32 {
    if file_path.is_null() || out_duration_ms.is_null()
        || out_width.is_null() || out_height.is_null() || out_fps.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    let Some(path) = (unsafe { path_arg(file_path) }) else {
        return ErrorCode::InvalidParam as i32;
    };

    let info = match ffmpeg::probe(&path) {
        Ok(info) => info,
        Err(e) => {
            log::warn!("get_video_info: Failed to open {}: {}", path.display(), e);
            return ErrorCode::Ffmpeg as i32;
        }
    };

    unsafe {
        *out_duration_ms = info.duration_ms;
        *out_width = info.width;
        *out_height = info.height;
        *out_fps = info.fps;
    }

    ErrorCode::Success as i32
}
