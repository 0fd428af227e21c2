// 편집 세션 모듈

pub mod session;

pub use session::{EditorConfig, EditorSession, EditorStatus, MediaProbe};
