// 입력 포트 - 호스트 UI의 포인터/터치 이벤트를 엔진 이벤트로 전달
// 창 전역 리스너 대신 호스트가 이 이벤트를 직접 주입 (합성 이벤트로 테스트 가능)

use crate::timeline::ClipId;

/// 마우스와 터치는 같은 전이 테이블을 쓰지만 한 제스처 안에서 섞이지 않음
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    /// FFI 값: 0=마우스, 그 외=터치
    pub fn from_i32(value: i32) -> Self {
        if value == 0 {
            PointerKind::Mouse
        } else {
            PointerKind::Touch
        }
    }
}

/// 호스트 화면 기준 절대 좌표 (px)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// press 대상과 그 대상이 그려진 영역의 크기
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    /// 타임라인 스트립 위 비디오 세그먼트
    Segment { id: ClipId, container_width: f64 },
    /// 타임라인 스트립 위 오디오 트랙
    AudioTrack { id: ClipId, container_width: f64 },
    /// 프리뷰 캔버스 위 텍스트 오버레이
    CanvasOverlay {
        id: ClipId,
        canvas_width: f64,
        canvas_height: f64,
    },
    /// 타임라인 스트립 위 텍스트 오버레이 막대
    TimelineOverlay {
        id: ClipId,
        timeline_left: f64,
        timeline_width: f64,
    },
    /// 오버레이 리사이즈 핸들
    ResizeHandle {
        id: ClipId,
        canvas_width: f64,
        canvas_height: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press {
        kind: PointerKind,
        target: DragTarget,
        pointer: PointerPosition,
    },
    Move {
        kind: PointerKind,
        pointer: PointerPosition,
    },
    Release {
        kind: PointerKind,
    },
    /// 포인터 캡처 상실 (release 없이 영역 이탈 등) - release와 동일하게 처리
    CaptureLost,
}

/// 0보다 큰 유한값인지 (나눗셈 분모 검사)
pub(crate) fn is_positive_extent(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
