// 내보내기 모듈 - 편집 지시서 생성 + 렌더 담당자 핸드오프

pub mod instructions;
pub mod save;

pub use instructions::{build_instructions, EditInstructions};
pub use save::{JsonCallbackSink, RenderSink, SaveError};
