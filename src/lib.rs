// Reel 편집 엔진 - 숏폼 비디오 편집기 타임라인
// 세그먼트/텍스트/오디오 편집 + undo/redo + 드래그 상호작용 + 썸네일 스트립 + 편집 지시서

/// 디버그 로그 매크로 — `cargo build --features debug_log` 시에만 출력
/// 평소 릴리스 빌드에서는 컴파일 자체에서 제외됨
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_log")]
        eprintln!($($arg)*);
    };
}

pub mod editor;
pub mod export;
pub mod ffi;
pub mod ffmpeg;
pub mod history;
pub mod interaction;
pub mod thumbnail;
pub mod timeline;

// FFI 함수들을 최상위에서 재export
pub use ffi::*;
