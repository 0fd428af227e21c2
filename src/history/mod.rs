// 선형 undo/redo 히스토리
// - 스냅샷 배열 + 커서. 커서가 가리키는 항목이 "현재" 상태
// - 커서 뒤 항목은 redo 대상, 새 commit 시 잘려나감
// - commit은 제스처/명령 단위로 1회 (드래그 중간 이동은 기록하지 않음)

use serde::{Deserialize, Serialize};

use crate::timeline::{AudioTrack, ClipId, TextOverlay, VideoSegment};

/// 한 시점의 편집 가능 상태 전체 (불변 값)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub segments: Vec<VideoSegment>,
    pub active_segment_id: Option<ClipId>,
    pub text_overlays: Vec<TextOverlay>,
    pub audio_tracks: Vec<AudioTrack>,
    pub current_playhead_time: f64,
}

impl EditorSnapshot {
    /// 재생 위치를 제외한 편집 내용이 같은지
    pub fn same_content(&self, other: &EditorSnapshot) -> bool {
        self.segments == other.segments
            && self.active_segment_id == other.active_segment_id
            && self.text_overlays == other.text_overlays
            && self.audio_tracks == other.audio_tracks
    }
}

pub struct HistoryManager {
    entries: Vec<EditorSnapshot>,
    cursor: usize,
    /// None이면 무제한, Some(n)이면 가장 오래된 항목부터 버림
    max_entries: Option<usize>,
}

impl HistoryManager {
    /// 초기 상태를 0번 항목으로 시작
    pub fn new(initial: EditorSnapshot) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_entries: None,
        }
    }

    pub fn with_limit(initial: EditorSnapshot, max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::new(initial)
        }
    }

    /// 새 상태 기록 - 커서 뒤(redo 분기)는 폐기
    pub fn commit(&mut self, snapshot: EditorSnapshot) {
        let pruned = self.entries.len() - (self.cursor + 1);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);

        if let Some(max) = self.max_entries {
            let overflow = self.entries.len().saturating_sub(max);
            if overflow > 0 {
                self.entries.drain(..overflow);
            }
        }
        self.cursor = self.entries.len() - 1;

        log::debug!(
            "history commit: depth={} pruned_redo={}",
            self.entries.len(),
            pruned
        );
    }

    /// 한 단계 뒤로 - 적용할 스냅샷 반환 (처음이면 None)
    pub fn undo(&mut self) -> Option<&EditorSnapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// 한 단계 앞으로 (끝이면 None)
    pub fn redo(&mut self) -> Option<&EditorSnapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> &EditorSnapshot {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(playhead: f64) -> EditorSnapshot {
        EditorSnapshot {
            segments: Vec::new(),
            active_segment_id: None,
            text_overlays: Vec::new(),
            audio_tracks: Vec::new(),
            current_playhead_time: playhead,
        }
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = HistoryManager::new(snapshot(0.0));
        history.commit(snapshot(1.0));
        history.commit(snapshot(2.0));

        assert_eq!(history.undo().map(|s| s.current_playhead_time), Some(1.0));
        assert_eq!(history.undo().map(|s| s.current_playhead_time), Some(0.0));
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), 0);

        assert_eq!(history.redo().map(|s| s.current_playhead_time), Some(1.0));
        assert_eq!(history.redo().map(|s| s.current_playhead_time), Some(2.0));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_commit_prunes_redo_branch() {
        let mut history = HistoryManager::new(snapshot(0.0));
        history.commit(snapshot(1.0));
        history.commit(snapshot(2.0));
        history.undo();
        history.undo();

        history.commit(snapshot(5.0));
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.current().current_playhead_time, 5.0);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = HistoryManager::with_limit(snapshot(0.0), 3);
        for i in 1..=5 {
            history.commit(snapshot(i as f64));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);

        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(history.current().current_playhead_time, 3.0);
    }
}
