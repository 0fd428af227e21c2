// 저장 핸드오프 - 지시서를 렌더/업로드 담당자에게 한 번 넘기고 결과는 기다리지 않음

use thiserror::Error;

use super::instructions::EditInstructions;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Save is already in progress")]
    Busy,
    #[error("Failed to serialize edit instructions: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Render service rejected the edit (code {0})")]
    Rejected(i32),
}

/// 렌더/업로드 담당자 (외부 협력자)
pub trait RenderSink {
    /// 지시서 전달 - 수락 여부만 반환, 원격 완료는 관찰하지 않음
    fn submit(&self, instructions: &EditInstructions) -> Result<(), SaveError>;
}

/// JSON 문자열을 받는 콜백 싱크 (0 = 수락)
pub struct JsonCallbackSink<F>
where
    F: Fn(&str) -> i32,
{
    callback: F,
}

impl<F> JsonCallbackSink<F>
where
    F: Fn(&str) -> i32,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> RenderSink for JsonCallbackSink<F>
where
    F: Fn(&str) -> i32,
{
    fn submit(&self, instructions: &EditInstructions) -> Result<(), SaveError> {
        let json = instructions.to_json()?;
        log::info!(
            "[SAVE] 지시서 전달: segments={} overlays={} audio={} ({} bytes)",
            instructions.segments.len(),
            instructions.text_overlays.len(),
            instructions.audio_tracks.len(),
            json.len()
        );

        match (self.callback)(&json) {
            0 => Ok(()),
            code => Err(SaveError::Rejected(code)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::export::build_instructions;
    use crate::timeline::Timeline;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    /// 받은 지시서를 기록하는 싱크
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub received: RefCell<Vec<EditInstructions>>,
        pub reject: bool,
    }

    impl RenderSink for RecordingSink {
        fn submit(&self, instructions: &EditInstructions) -> Result<(), SaveError> {
            if self.reject {
                return Err(SaveError::Rejected(-1));
            }
            self.received.borrow_mut().push(instructions.clone());
            Ok(())
        }
    }

    fn sample() -> EditInstructions {
        let timeline = Timeline::new(PathBuf::from("clip.mp4"), 5.0).unwrap();
        build_instructions(&timeline, 1.0, Path::new("clip.mp4"))
    }

    #[test]
    fn test_callback_sink_receives_json() {
        let seen = RefCell::new(String::new());
        let sink = JsonCallbackSink::new(|json: &str| {
            *seen.borrow_mut() = json.to_string();
            0
        });

        sink.submit(&sample()).unwrap();
        assert!(seen.borrow().contains("\"originalVideoFile\":\"clip.mp4\""));
    }

    #[test]
    fn test_callback_sink_reports_rejection() {
        let sink = JsonCallbackSink::new(|_: &str| 7);
        let err = sink.submit(&sample()).unwrap_err();
        assert!(matches!(err, SaveError::Rejected(7)));
        assert_eq!(err.to_string(), "Render service rejected the edit (code 7)");
    }
}
