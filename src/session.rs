//! Decoding sessions: model selection, batch decoding, and hypotheses.
//!
//! One `Transcriber` owns the model cache and at most one live decoder
//! session. Selecting a model always starts a fresh session, so switching
//! languages mid-utterance deliberately discards unfinalized text. Decode
//! faults are absorbed here: the offending batch is dropped, the session
//! stays live, and the caller sees the last known partial again.

use crate::audio::SAMPLE_RATE;
use crate::engine::{DecoderSession, FeedOutcome, FinalTranscript, ModelLoader, SpeechModel};
use crate::error::{Result, TranscribeError};
use crate::{log_debug, log_timing};
use crate::models::ModelStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A decoding result handed to the caption loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Hypothesis {
    /// Unstable text. Later partials revise earlier ones; nothing is
    /// committed until the utterance closes.
    Partial { text: String },
    /// Committed text with an aggregate confidence in [0, 1].
    Final { text: String, confidence: f32 },
}

/// Loaded models keyed by language code. Loading a heavyweight model takes
/// seconds, so each code is loaded at most once per process and shared.
pub struct ModelCache {
    store: ModelStore,
    loader: Box<dyn ModelLoader>,
    loaded: HashMap<String, Arc<dyn SpeechModel>>,
}

impl ModelCache {
    pub fn new(store: ModelStore, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            store,
            loader,
            loaded: HashMap::new(),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Cached handle for `code`, loading it on first use.
    pub fn get(&mut self, code: &str) -> Result<Arc<dyn SpeechModel>> {
        if let Some(model) = self.loaded.get(code) {
            return Ok(model.clone());
        }
        let dir = self
            .store
            .resolve(code)
            .ok_or_else(|| TranscribeError::ModelNotFound {
                code: code.to_string(),
                searched: self.store.root().to_path_buf(),
            })?;
        log_debug(&format!("loading model '{code}' from {}", dir.display()));
        let started = Instant::now();
        let model = self.loader.load(&dir)?;
        tracing::info!(
            code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model loaded"
        );
        self.loaded.insert(code.to_string(), model.clone());
        Ok(model)
    }
}

/// Streaming transcriber: one active decoder session fed by the conditioner.
pub struct Transcriber {
    cache: ModelCache,
    session: Option<Box<dyn DecoderSession>>,
    last_partial: String,
}

impl Transcriber {
    pub fn new(cache: ModelCache) -> Self {
        Self {
            cache,
            session: None,
            last_partial: String::new(),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Bind the transcriber to a language. Replaces any active session with
    /// a fresh decoder; pending text from the previous session is gone.
    pub fn select_model(&mut self, code: &str) -> Result<()> {
        let model = self.cache.get(code)?;
        let session = model.start_session(SAMPLE_RATE)?;
        self.session = Some(session);
        self.last_partial.clear();
        Ok(())
    }

    /// Decode one batch. Without a selected model this is a deliberate
    /// no-op that reports an empty partial.
    pub fn process(&mut self, batch: &[i16]) -> Hypothesis {
        let Some(session) = self.session.as_mut() else {
            return Hypothesis::Partial {
                text: String::new(),
            };
        };

        let started = Instant::now();
        let hypothesis = match session.feed(batch) {
            Ok(FeedOutcome::Boundary) => {
                let transcript = session.final_transcript();
                self.last_partial.clear();
                let confidence = aggregate_confidence(&transcript);
                Hypothesis::Final {
                    text: transcript.text,
                    confidence,
                }
            }
            Ok(FeedOutcome::Pending) => {
                let partial = session.partial_transcript();
                self.last_partial.clone_from(&partial.text);
                Hypothesis::Partial { text: partial.text }
            }
            Err(err) => {
                let fault = TranscribeError::DecodeFault(err.to_string());
                log_debug(&format!("{fault}; dropping batch"));
                tracing::warn!(error = %fault, samples = batch.len(), "batch dropped");
                Hypothesis::Partial {
                    text: self.last_partial.clone(),
                }
            }
        };
        log_decode_metrics(batch.len(), started.elapsed(), &hypothesis);
        hypothesis
    }

    /// Flush whatever the decoder is still holding and return its text.
    /// Empty when no model is selected or nothing was pending.
    pub fn finalize(&mut self) -> String {
        let Some(session) = self.session.as_mut() else {
            return String::new();
        };
        self.last_partial.clear();
        session.flush().text
    }
}

/// Mean per-word confidence; full confidence for word-less text so short
/// confirmations are not displayed as doubtful, zero for an empty result.
fn aggregate_confidence(transcript: &FinalTranscript) -> f32 {
    if transcript.words.is_empty() {
        if transcript.text.is_empty() {
            0.0
        } else {
            1.0
        }
    } else {
        let sum: f32 = transcript.words.iter().map(|w| w.confidence).sum();
        (sum / transcript.words.len() as f32).clamp(0.0, 1.0)
    }
}

/// Format: `decode_metrics|samples=...|decode_ms=...|outcome=...`
fn log_decode_metrics(samples: usize, elapsed: Duration, hypothesis: &Hypothesis) {
    let outcome = match hypothesis {
        Hypothesis::Partial { .. } => "partial",
        Hypothesis::Final { .. } => "final",
    };
    log_timing(&format!(
        "decode_metrics|samples={samples}|decode_ms={}|outcome={outcome}",
        elapsed.as_millis()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PartialTranscript, ScoredWord};
    use crate::error::EngineError;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum FeedStep {
        Pending(&'static str),
        Boundary(&'static str, Vec<f32>),
        Fault(&'static str),
    }

    #[derive(Default)]
    struct StubEngine {
        loads: AtomicUsize,
        sessions: AtomicUsize,
        feeds: Mutex<VecDeque<FeedStep>>,
    }

    impl StubEngine {
        fn with_script(steps: Vec<FeedStep>) -> Arc<Self> {
            Arc::new(Self {
                feeds: Mutex::new(steps.into()),
                ..Self::default()
            })
        }
    }

    impl ModelLoader for Arc<StubEngine> {
        fn load(&self, _dir: &Path) -> std::result::Result<Arc<dyn SpeechModel>, EngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubModel {
                engine: self.clone(),
            }))
        }
    }

    struct StubModel {
        engine: Arc<StubEngine>,
    }

    impl SpeechModel for StubModel {
        fn start_session(
            &self,
            _sample_rate: u32,
        ) -> std::result::Result<Box<dyn DecoderSession>, EngineError> {
            self.engine.sessions.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubSession {
                engine: self.engine.clone(),
                partial: String::new(),
                pending_final: None,
            }))
        }
    }

    struct StubSession {
        engine: Arc<StubEngine>,
        partial: String,
        pending_final: Option<FinalTranscript>,
    }

    impl DecoderSession for StubSession {
        fn feed(&mut self, _pcm: &[i16]) -> std::result::Result<FeedOutcome, EngineError> {
            let step = self.engine.feeds.lock().unwrap().pop_front();
            match step {
                Some(FeedStep::Pending(text)) => {
                    self.partial = text.to_string();
                    Ok(FeedOutcome::Pending)
                }
                Some(FeedStep::Boundary(text, confs)) => {
                    self.pending_final = Some(FinalTranscript {
                        text: text.to_string(),
                        words: confs
                            .into_iter()
                            .map(|confidence| ScoredWord {
                                word: "w".to_string(),
                                confidence,
                            })
                            .collect(),
                    });
                    self.partial.clear();
                    Ok(FeedOutcome::Boundary)
                }
                Some(FeedStep::Fault(msg)) => Err(EngineError::Waveform(msg.to_string())),
                None => Ok(FeedOutcome::Pending),
            }
        }

        fn final_transcript(&mut self) -> FinalTranscript {
            self.pending_final.take().unwrap_or_default()
        }

        fn partial_transcript(&mut self) -> PartialTranscript {
            PartialTranscript {
                text: self.partial.clone(),
            }
        }

        fn flush(&mut self) -> FinalTranscript {
            FinalTranscript {
                text: std::mem::take(&mut self.partial),
                words: Vec::new(),
            }
        }
    }

    fn transcriber_with(engine: Arc<StubEngine>, codes: &[&str]) -> (Transcriber, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        for code in codes {
            fs::create_dir(dir.path().join(code)).unwrap();
        }
        let store = ModelStore::new(dir.path());
        let cache = ModelCache::new(store, Box::new(engine));
        (Transcriber::new(cache), dir)
    }

    #[test]
    fn process_without_model_yields_empty_partial() {
        let engine = StubEngine::with_script(Vec::new());
        let (mut transcriber, _dir) = transcriber_with(engine, &[]);

        let hypothesis = transcriber.process(&[1, 2, 3]);
        assert_eq!(
            hypothesis,
            Hypothesis::Partial {
                text: String::new()
            }
        );
        assert_eq!(transcriber.finalize(), "");
    }

    #[test]
    fn select_model_reports_missing_code() {
        let engine = StubEngine::with_script(Vec::new());
        let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);

        let err = transcriber.select_model("no-such-lang").unwrap_err();
        assert!(matches!(err, TranscribeError::ModelNotFound { .. }));
        // The failed selection must not disturb the no-session state.
        assert!(!transcriber.has_session());
    }

    #[test]
    fn model_loads_once_per_code() {
        let engine = StubEngine::with_script(Vec::new());
        let (mut transcriber, _dir) =
            transcriber_with(engine.clone(), &["en-us-small", "hi-small"]);

        transcriber.select_model("en-us-small").unwrap();
        transcriber.select_model("en-us-small").unwrap();
        transcriber.select_model("en-us-small").unwrap();
        assert_eq!(engine.loads.load(Ordering::SeqCst), 1);

        transcriber.select_model("hi-small").unwrap();
        assert_eq!(engine.loads.load(Ordering::SeqCst), 2);
        // Every selection still starts a fresh session.
        assert_eq!(engine.sessions.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn final_confidence_is_mean_of_word_scores() {
        let engine = StubEngine::with_script(vec![FeedStep::Boundary(
            "hello there world",
            vec![0.9, 0.7, 0.5],
        )]);
        let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);
        transcriber.select_model("en-us-small").unwrap();

        match transcriber.process(&[0; 16]) {
            Hypothesis::Final { text, confidence } => {
                assert_eq!(text, "hello there world");
                assert!((confidence - 0.7).abs() < 1e-6);
            }
            other => panic!("expected final hypothesis, got {other:?}"),
        }
    }

    #[test]
    fn wordless_final_with_text_scores_full_confidence() {
        let engine = StubEngine::with_script(vec![FeedStep::Boundary("yes", Vec::new())]);
        let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);
        transcriber.select_model("en-us-small").unwrap();

        assert_eq!(
            transcriber.process(&[0; 16]),
            Hypothesis::Final {
                text: "yes".to_string(),
                confidence: 1.0
            }
        );
    }

    #[test]
    fn empty_final_scores_zero_confidence() {
        let engine = StubEngine::with_script(vec![FeedStep::Boundary("", Vec::new())]);
        let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);
        transcriber.select_model("en-us-small").unwrap();

        assert_eq!(
            transcriber.process(&[0; 16]),
            Hypothesis::Final {
                text: String::new(),
                confidence: 0.0
            }
        );
    }

    #[test]
    fn decode_fault_drops_batch_and_keeps_session() {
        let engine = StubEngine::with_script(vec![
            FeedStep::Pending("hello"),
            FeedStep::Fault("bad batch"),
            FeedStep::Pending("hello world"),
        ]);
        let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);
        transcriber.select_model("en-us-small").unwrap();

        assert_eq!(
            transcriber.process(&[0; 16]),
            Hypothesis::Partial {
                text: "hello".to_string()
            }
        );
        // The fault is absorbed; the last good partial is repeated.
        assert_eq!(
            transcriber.process(&[0; 16]),
            Hypothesis::Partial {
                text: "hello".to_string()
            }
        );
        assert!(transcriber.has_session());
        assert_eq!(
            transcriber.process(&[0; 16]),
            Hypothesis::Partial {
                text: "hello world".to_string()
            }
        );
    }

    #[test]
    fn finalize_returns_pending_text() {
        let engine = StubEngine::with_script(vec![FeedStep::Pending("tail words")]);
        let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);
        transcriber.select_model("en-us-small").unwrap();

        transcriber.process(&[0; 16]);
        assert_eq!(transcriber.finalize(), "tail words");
        assert_eq!(transcriber.finalize(), "");
    }

    #[test]
    fn model_switch_discards_pending_state() {
        let engine = StubEngine::with_script(vec![FeedStep::Pending("half a sentence")]);
        let (mut transcriber, _dir) =
            transcriber_with(engine, &["en-us-small", "hi-small"]);
        transcriber.select_model("en-us-small").unwrap();

        transcriber.process(&[0; 16]);
        transcriber.select_model("hi-small").unwrap();
        assert_eq!(transcriber.finalize(), "");
    }

    fn with_timing_logs_enabled(action: impl FnOnce()) {
        static LOG_TEST_LOCK: std::sync::OnceLock<Mutex<()>> = std::sync::OnceLock::new();
        let _guard = LOG_TEST_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("log test lock");
        let log_path = crate::log_file_path();
        let _ = fs::remove_file(&log_path);
        crate::logging::set_logging_for_tests(true, true);
        action();
        crate::logging::set_logging_for_tests(false, false);
    }

    #[test]
    fn perf_smoke_emits_decode_metrics() {
        with_timing_logs_enabled(|| {
            let engine = StubEngine::with_script(vec![FeedStep::Pending("hi")]);
            let (mut transcriber, _dir) = transcriber_with(engine, &["en-us-small"]);
            transcriber.select_model("en-us-small").unwrap();
            transcriber.process(&[0; 16]);

            let contents = fs::read_to_string(crate::log_file_path())
                .expect("perf smoke log file should exist");
            assert!(
                contents.contains("decode_metrics|samples=16|"),
                "decode metrics log not found"
            );
        });
    }
}
