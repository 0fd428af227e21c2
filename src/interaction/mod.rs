// 포인터/터치 상호작용 모듈

pub mod drag;
pub mod input;

pub use drag::{DragController, DragOutcome, DragState};
pub use input::{DragTarget, InputEvent, PointerKind, PointerPosition};
