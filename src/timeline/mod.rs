// 타임라인 모듈 - 세그먼트/오버레이/오디오 트랙 데이터 모델

pub mod clip;
pub mod overlay;
#[allow(clippy::module_inception)]
pub mod timeline;

pub use clip::{AudioTrack, ClipId, VideoSegment};
pub use overlay::{CanvasPosition, FontStyle, FontWeight, TextDecoration, TextOverlay, TextStyle};
pub use timeline::{Timeline, TimelineConfig, TimelineError};
