// 썸네일 작업 - 백그라운드 스레드에서 샘플링, 호스트는 폴링으로 상태 확인
// Export 작업과 같은 패턴 (AtomicU32 progress, AtomicBool finished/cancelled, Mutex 에러)
// 소스 파일마다 독립 작업이므로 서로 다른 파일은 동시에 샘플링 가능

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::sampler::{FrameSampler, FrameSource, SampleError, SamplerConfig, Thumbnail};

/// 썸네일 작업 핸들
pub struct ThumbnailJob {
    /// 진행률 0~100
    progress: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    /// 에러 메시지 (있으면 부분 결과)
    error: Arc<Mutex<Option<String>>>,
    /// 완료된 썸네일 (생성되는 대로 추가)
    thumbnails: Arc<Mutex<Vec<Thumbnail>>>,
}

impl ThumbnailJob {
    /// 작업 시작 - 소스는 작업 스레드 안에서 open_source로 생성
    pub fn start<S, F>(open_source: F, duration_ms: i64, config: SamplerConfig) -> Self
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, String> + Send + 'static,
    {
        let progress = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let cancelled = Arc::new(AtomicBool::new(false));
        let error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let thumbnails: Arc<Mutex<Vec<Thumbnail>>> = Arc::new(Mutex::new(Vec::new()));

        let p = progress.clone();
        let f = finished.clone();
        let c = cancelled.clone();
        let e = error.clone();
        let t = thumbnails.clone();

        std::thread::spawn(move || {
            let result = Self::sample_thread(open_source, duration_ms, config, &p, &c, &t);
            if let Err(msg) = result {
                log::warn!("[THUMBNAIL] 에러: {}", msg);
                if let Ok(mut err) = e.lock() {
                    *err = Some(msg);
                }
            }
            p.store(100, Ordering::SeqCst);
            f.store(true, Ordering::SeqCst);
        });

        Self {
            progress,
            finished,
            cancelled,
            error,
            thumbnails,
        }
    }

    fn sample_thread<S, F>(
        open_source: F,
        duration_ms: i64,
        config: SamplerConfig,
        progress: &AtomicU32,
        cancelled: &AtomicBool,
        thumbnails: &Mutex<Vec<Thumbnail>>,
    ) -> Result<(), String>
    where
        S: FrameSource,
        F: FnOnce() -> Result<S, String>,
    {
        let mut source = open_source()?;
        let sampler = FrameSampler::new(config);

        let strip = sampler.sample_with(&mut source, duration_ms, &mut |thumb, done, total| {
            if let Ok(mut list) = thumbnails.lock() {
                list.push(thumb.clone());
            }
            let pct = (done * 100 / total.max(1)).min(99) as u32;
            progress.store(pct, Ordering::SeqCst);
            !cancelled.load(Ordering::SeqCst)
        });

        match strip.error {
            // 취소는 실패가 아님 (부분 결과만 남김)
            Some(SampleError::Cancelled) => {
                log::info!("[THUMBNAIL] 취소됨: {}개 생성", strip.thumbnails.len());
                Ok(())
            }
            Some(e) => Err(e.to_string()),
            None => Ok(()),
        }
    }

    pub fn get_progress(&self) -> u32 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// 취소 요청 (현재 캡처가 끝난 뒤 중단)
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// 실패 메시지 (취소는 에러로 남지 않음)
    pub fn get_error(&self) -> Option<String> {
        self.error.lock().ok()?.clone()
    }

    pub fn thumbnail_count(&self) -> usize {
        self.thumbnails.lock().map(|list| list.len()).unwrap_or(0)
    }

    pub fn get_thumbnail(&self, index: usize) -> Option<Thumbnail> {
        self.thumbnails.lock().ok()?.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::sampler::tests::FakeSource;
    use std::time::{Duration, Instant};

    fn wait(job: &ThumbnailJob) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !job.is_finished() {
            assert!(Instant::now() < deadline, "thumbnail job did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_job_collects_thumbnails() {
        let job = ThumbnailJob::start(|| Ok(FakeSource::new()), 20_000, SamplerConfig::default());
        wait(&job);

        assert_eq!(job.get_progress(), 100);
        assert!(job.get_error().is_none());
        assert_eq!(job.thumbnail_count(), 20);
        assert_eq!(job.get_thumbnail(1).map(|t| t.timestamp_ms), Some(1000));
        assert!(job.get_thumbnail(20).is_none());
    }

    #[test]
    fn test_open_failure_is_reported() {
        let job = ThumbnailJob::start(
            || Err::<FakeSource, _>("No video stream found".to_string()),
            20_000,
            SamplerConfig::default(),
        );
        wait(&job);

        assert_eq!(job.get_error().as_deref(), Some("No video stream found"));
        assert_eq!(job.thumbnail_count(), 0);
    }

    #[test]
    fn test_partial_failure_keeps_thumbnails() {
        let job = ThumbnailJob::start(
            || {
                let mut source = FakeSource::new();
                source.fail_at_ms = Some(3000);
                Ok(source)
            },
            20_000,
            SamplerConfig::default(),
        );
        wait(&job);

        assert_eq!(job.thumbnail_count(), 3);
        assert!(job.get_error().unwrap_or_default().contains("3000ms"));
    }

    #[test]
    fn test_cancel_is_not_an_error() {
        let progress = AtomicU32::new(0);
        // 첫 캡처 직후 중단
        let cancelled = AtomicBool::new(true);
        let thumbnails = Mutex::new(Vec::new());

        let result = ThumbnailJob::sample_thread(
            || Ok(FakeSource::new()),
            20_000,
            SamplerConfig::default(),
            &progress,
            &cancelled,
            &thumbnails,
        );

        assert_eq!(result, Ok(()));
        assert_eq!(thumbnails.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_cancelled_job_has_no_error() {
        let job = ThumbnailJob::start(|| Ok(FakeSource::new()), 20_000, SamplerConfig::default());
        job.cancel();
        wait(&job);

        assert!(job.is_cancelled());
        assert!(job.get_error().is_none());
        assert!(job.thumbnail_count() <= 20);
    }
}
