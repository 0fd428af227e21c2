// Thumbnail FFI - 스크러버 썸네일 스트립 작업 생성/진행률/취소/결과 조회/파괴
// 소스 파일마다 작업 1개 (작업 안에서는 seek/캡처가 순차 실행)

use std::ffi::{c_char, c_void};

use super::editor::with_session;
use super::types::{into_c_string, path_arg, ErrorCode};
use crate::ffmpeg::Decoder;
use crate::thumbnail::{SamplerConfig, ThumbnailJob};

/// 썸네일 작업 시작 (백그라운드 스레드에서 실행)
/// duration_ms: 소스 길이 (get_video_info로 조회한 값)
/// count / thumb_width / thumb_height / jpeg_quality: 0이면 기본값
#[no_mangle]
pub extern "C" fn thumbnail_job_start(
    file_path: *const c_char,
    duration_ms: i64,
    count: u32,
    thumb_width: u32,
    thumb_height: u32,
    jpeg_quality: u32,
    out_job: *mut *mut c_void,
) -> i32 {
    if file_path.is_null() || out_job.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    if duration_ms <= 0 {
        return ErrorCode::InvalidParam as i32;
    }
    let Some(path) = (unsafe { path_arg(file_path) }) else {
        return ErrorCode::InvalidParam as i32;
    };

    let defaults = SamplerConfig::default();
    let config = SamplerConfig {
        thumbnail_count: if count > 0 { count as usize } else { defaults.thumbnail_count },
        thumb_width: if thumb_width > 0 { thumb_width } else { defaults.thumb_width },
        thumb_height: if thumb_height > 0 { thumb_height } else { defaults.thumb_height },
        jpeg_quality: if jpeg_quality > 0 { jpeg_quality.min(100) as u8 } else { defaults.jpeg_quality },
    };

    // Decoder는 작업 스레드 안에서 열림 (ffmpeg 컨텍스트를 스레드 간 이동하지 않음)
    let (width, height) = (config.thumb_width, config.thumb_height);
    let job = ThumbnailJob::start(
        move || Decoder::open_with_resolution(&path, width, height),
        duration_ms,
        config,
    );

    unsafe {
        *out_job = Box::into_raw(Box::new(job)) as *mut c_void;
    }

    ErrorCode::Success as i32
}

/// 진행률 (0~100)
#[no_mangle]
pub extern "C" fn thumbnail_job_get_progress(job: *mut c_void) -> u32 {
    if job.is_null() {
        return 0;
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        job_ref.get_progress()
    }
}

/// 반환: 1=완료, 0=진행중
#[no_mangle]
pub extern "C" fn thumbnail_job_is_finished(job: *mut c_void) -> i32 {
    if job.is_null() {
        return 1; // null이면 완료로 처리
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        if job_ref.is_finished() { 1 } else { 0 }
    }
}

/// 에러 메시지 (없으면 null) - 에러가 있어도 그때까지의 썸네일은 조회 가능
/// 반환 후 string_free()로 해제 필요
#[no_mangle]
pub extern "C" fn thumbnail_job_get_error(job: *mut c_void, out_error: *mut *mut c_char) -> i32 {
    if job.is_null() || out_error.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        *out_error = job_ref.get_error().map(into_c_string).unwrap_or(std::ptr::null_mut());
    }

    ErrorCode::Success as i32
}

/// 작업 에러를 편집 세션의 에러 문자열로 전달 (에러 없거나 취소된 작업이면 아무것도 안 함)
#[no_mangle]
pub extern "C" fn thumbnail_job_report_to_editor(job: *mut c_void, editor: *mut c_void) -> i32 {
    if job.is_null() {
        return ErrorCode::NullPointer as i32;
    }
    let error = unsafe { (*(job as *const ThumbnailJob)).get_error() };
    let Some(msg) = error else {
        return ErrorCode::Success as i32;
    };

    match with_session(editor, |s| s.report_error(format!("Failed to generate frames: {}", msg))) {
        Ok(()) => ErrorCode::Success as i32,
        Err(code) => code as i32,
    }
}

/// 취소 요청 (현재 캡처가 끝난 뒤 중단)
#[no_mangle]
pub extern "C" fn thumbnail_job_cancel(job: *mut c_void) -> i32 {
    if job.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        job_ref.cancel();
    }

    ErrorCode::Success as i32
}

/// 반환: 1=취소 요청됨, 0=아님
#[no_mangle]
pub extern "C" fn thumbnail_job_is_cancelled(job: *mut c_void) -> i32 {
    if job.is_null() {
        return 0;
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        if job_ref.is_cancelled() { 1 } else { 0 }
    }
}

/// 지금까지 생성된 썸네일 수
#[no_mangle]
pub extern "C" fn thumbnail_job_get_count(job: *mut c_void) -> u32 {
    if job.is_null() {
        return 0;
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        job_ref.thumbnail_count() as u32
    }
}

/// index번째 썸네일 (JPEG 바이트)
/// out_data는 thumbnail_free_data()로 해제 필요
#[no_mangle]
pub extern "C" fn thumbnail_job_get_thumbnail(
    job: *mut c_void,
    index: u32,
    out_timestamp_ms: *mut i64,
    out_data: *mut *mut u8,
    out_data_size: *mut usize,
) -> i32 {
    if job.is_null() || out_timestamp_ms.is_null() || out_data.is_null() || out_data_size.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    unsafe {
        let job_ref = &*(job as *const ThumbnailJob);
        let Some(thumb) = job_ref.get_thumbnail(index as usize) else {
            return ErrorCode::InvalidParam as i32;
        };

        *out_timestamp_ms = thumb.timestamp_ms;
        *out_data_size = thumb.jpeg.len();
        let data_box = thumb.jpeg.into_boxed_slice();
        *out_data = Box::into_raw(data_box) as *mut u8;
    }

    ErrorCode::Success as i32
}

/// 썸네일 데이터 해제
#[no_mangle]
pub extern "C" fn thumbnail_free_data(data: *mut u8, size: usize) -> i32 {
    if data.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    unsafe {
        let slice = std::slice::from_raw_parts_mut(data, size);
        let _ = Box::from_raw(slice as *mut [u8]);
    }

    ErrorCode::Success as i32
}

/// 작업 파괴 - 진행 중이면 취소 요청 후 핸들만 해제 (스레드는 다음 캡처 후 종료)
#[no_mangle]
pub extern "C" fn thumbnail_job_destroy(job: *mut c_void) -> i32 {
    if job.is_null() {
        return ErrorCode::NullPointer as i32;
    }

    unsafe {
        let job_box = Box::from_raw(job as *mut ThumbnailJob);
        job_box.cancel();
    }

    ErrorCode::Success as i32
}
