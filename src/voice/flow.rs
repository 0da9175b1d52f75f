//! Enrollment and authentication flows.
//!
//! Each flow absorbs every collaborator failure into a typed outcome. The
//! CLI renders outcomes as text; nothing propagates past a flow as an
//! error and nothing here touches the console.

use super::fingerprint::FingerprintStore;
use crate::audio::VoiceRecorder;
use crate::mfcc::FeatureExtractor;
use crate::paths::RecordingPaths;

/// What an enrollment attempt came to
#[derive(Debug, Clone, PartialEq)]
pub enum EnrollOutcome {
    Enrolled { username: String, dimensions: usize },
    RecordingFailed(String),
    ExtractionFailed(String),
    StoreFailed(String),
}

/// What an authentication attempt came to
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    NotEnrolled,
    RecordingFailed(String),
    ExtractionFailed(String),
    StoreFailed(String),
    Decision {
        score: f32,
        threshold: f32,
        granted: bool,
    },
}

/// Record, extract, persist.
///
/// A failed step short-circuits and leaves any prior record for the user
/// untouched.
pub fn enroll<R, E>(
    username: &str,
    recorder: &mut R,
    extractor: &E,
    store: &FingerprintStore,
    recordings: &RecordingPaths,
) -> EnrollOutcome
where
    R: VoiceRecorder,
    E: FeatureExtractor,
{
    let wav_path = recordings.enrollment_wav(username);

    if let Err(e) = recorder.record(&wav_path) {
        return EnrollOutcome::RecordingFailed(format!("{:#}", e));
    }

    let features = match extractor.extract(&wav_path) {
        Ok(features) => features,
        Err(e) => return EnrollOutcome::ExtractionFailed(format!("{:#}", e)),
    };

    match store.write(username, &features) {
        Ok(()) => EnrollOutcome::Enrolled {
            username: username.to_string(),
            dimensions: features.len(),
        },
        Err(e) => EnrollOutcome::StoreFailed(e.to_string()),
    }
}

/// Check enrollment, record a fresh attempt, compare against the stored
/// vector.
///
/// The store is consulted before anything else; an unknown user never
/// triggers a recording.
pub fn authenticate<R, E>(
    username: &str,
    recorder: &mut R,
    extractor: &E,
    store: &FingerprintStore,
    recordings: &RecordingPaths,
    threshold: f32,
) -> AuthOutcome
where
    R: VoiceRecorder,
    E: FeatureExtractor,
{
    if !store.exists(username) {
        return AuthOutcome::NotEnrolled;
    }

    let wav_path = recordings.attempt_wav(username);
    if let Err(e) = recorder.record(&wav_path) {
        return AuthOutcome::RecordingFailed(format!("{:#}", e));
    }

    let fresh = match extractor.extract(&wav_path) {
        Ok(features) => features,
        Err(e) => return AuthOutcome::ExtractionFailed(format!("{:#}", e)),
    };

    let stored = match store.read(username) {
        Ok(features) => features,
        Err(e) => return AuthOutcome::StoreFailed(e.to_string()),
    };

    let score = cosine_similarity(&stored, &fresh);
    AuthOutcome::Decision {
        score,
        threshold,
        granted: access_granted(score, threshold),
    }
}

/// Strict comparison: a score exactly at the threshold is denied
pub fn access_granted(score: f32, threshold: f32) -> bool {
    score > threshold
}

/// Cosine similarity between two vectors.
///
/// Mismatched lengths or zero-norm inputs score 0.0, which always denies.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    /// Recorder double: counts calls, optionally fails, writes a marker file
    /// so the path exists for the extractor
    struct RecorderDouble {
        calls: usize,
        fail: bool,
    }

    impl RecorderDouble {
        fn new() -> Self {
            Self { calls: 0, fail: false }
        }

        fn failing() -> Self {
            Self { calls: 0, fail: true }
        }
    }

    impl VoiceRecorder for RecorderDouble {
        fn record(&mut self, destination: &Path) -> anyhow::Result<()> {
            self.calls += 1;
            if self.fail {
                anyhow::bail!("device unavailable");
            }
            fs::write(destination, b"")?;
            Ok(())
        }
    }

    /// Extractor double: returns a fixed vector, or fails when none is set
    struct ExtractorDouble {
        features: Option<Vec<f32>>,
    }

    impl FeatureExtractor for ExtractorDouble {
        fn extract(&self, _source: &Path) -> anyhow::Result<Vec<f32>> {
            match &self.features {
                Some(v) => Ok(v.clone()),
                None => anyhow::bail!("could not decode audio"),
            }
        }
    }

    fn setup() -> (tempfile::TempDir, FingerprintStore, RecordingPaths) {
        let dir = tempfile::tempdir().unwrap();
        let store = FingerprintStore::new(dir.path());
        let recordings = RecordingPaths::new(dir.path());
        (dir, store, recordings)
    }

    #[test]
    fn test_unknown_user_never_triggers_a_recording() {
        let (_dir, store, recordings) = setup();
        let mut recorder = RecorderDouble::new();
        let extractor = ExtractorDouble { features: Some(vec![1.0, 0.0]) };

        let outcome = authenticate("ghost", &mut recorder, &extractor, &store, &recordings, 0.85);

        assert_eq!(outcome, AuthOutcome::NotEnrolled);
        assert_eq!(recorder.calls, 0);
    }

    #[test]
    fn test_enroll_then_authenticate_same_voice_grants() {
        let (_dir, store, recordings) = setup();
        let mut recorder = RecorderDouble::new();
        let extractor = ExtractorDouble {
            features: Some(vec![0.3, -1.2, 4.5, 0.07]),
        };

        let enrolled = enroll("alice", &mut recorder, &extractor, &store, &recordings);
        assert_eq!(
            enrolled,
            EnrollOutcome::Enrolled { username: "alice".to_string(), dimensions: 4 }
        );

        let outcome =
            authenticate("alice", &mut recorder, &extractor, &store, &recordings, 0.85);
        match outcome {
            AuthOutcome::Decision { score, granted, .. } => {
                assert!((score - 1.0).abs() < 1e-6, "identical vectors score {}", score);
                assert!(granted);
            }
            other => panic!("expected a decision, got {:?}", other),
        }
        assert_eq!(recorder.calls, 2);
    }

    #[test]
    fn test_extraction_failure_stops_before_comparison() {
        let (_dir, store, recordings) = setup();
        store.write("bob", &[1.0, 2.0]).unwrap();

        let mut recorder = RecorderDouble::new();
        let extractor = ExtractorDouble { features: None };

        let outcome = authenticate("bob", &mut recorder, &extractor, &store, &recordings, 0.85);

        assert!(matches!(outcome, AuthOutcome::ExtractionFailed(_)));
        assert_eq!(recorder.calls, 1);
    }

    #[test]
    fn test_recording_failure_is_reported_not_thrown() {
        let (_dir, store, recordings) = setup();
        store.write("carol", &[1.0]).unwrap();

        let extractor = ExtractorDouble { features: Some(vec![1.0]) };

        let mut recorder = RecorderDouble::failing();
        assert!(matches!(
            enroll("dave", &mut recorder, &extractor, &store, &recordings),
            EnrollOutcome::RecordingFailed(_)
        ));

        let mut recorder = RecorderDouble::failing();
        assert!(matches!(
            authenticate("carol", &mut recorder, &extractor, &store, &recordings, 0.85),
            AuthOutcome::RecordingFailed(_)
        ));
    }

    #[test]
    fn test_failed_enrollment_leaves_prior_record_untouched() {
        let (_dir, store, recordings) = setup();
        store.write("erin", &[9.0, 9.0]).unwrap();

        let mut recorder = RecorderDouble::new();
        let extractor = ExtractorDouble { features: None };

        let outcome = enroll("erin", &mut recorder, &extractor, &store, &recordings);

        assert!(matches!(outcome, EnrollOutcome::ExtractionFailed(_)));
        assert_eq!(store.read("erin").unwrap(), vec![9.0, 9.0]);
    }

    #[test]
    fn test_reenrollment_compares_against_new_vector_only() {
        let (_dir, store, recordings) = setup();
        let mut recorder = RecorderDouble::new();

        let old_voice = ExtractorDouble { features: Some(vec![1.0, 0.0]) };
        let new_voice = ExtractorDouble { features: Some(vec![0.0, 1.0]) };

        enroll("frank", &mut recorder, &old_voice, &store, &recordings);
        enroll("frank", &mut recorder, &new_voice, &store, &recordings);

        // A fresh capture of the new voice matches...
        match authenticate("frank", &mut recorder, &new_voice, &store, &recordings, 0.85) {
            AuthOutcome::Decision { score, granted, .. } => {
                assert!((score - 1.0).abs() < 1e-6);
                assert!(granted);
            }
            other => panic!("expected a decision, got {:?}", other),
        }

        // ...and the old voice is orthogonal to the stored record, so denied
        match authenticate("frank", &mut recorder, &old_voice, &store, &recordings, 0.85) {
            AuthOutcome::Decision { score, granted, .. } => {
                assert!(score.abs() < 1e-6);
                assert!(!granted);
            }
            other => panic!("expected a decision, got {:?}", other),
        }
    }

    #[test]
    fn test_same_clip_through_real_extractor_scores_one() {
        use crate::config::FeatureConfig;
        use crate::mfcc::MfccExtractor;

        /// Writes the same canned clip on every call, standing in for a
        /// speaker who sounds identical at enrollment and authentication
        struct CannedClipRecorder {
            samples: Vec<f32>,
        }

        impl VoiceRecorder for CannedClipRecorder {
            fn record(&mut self, destination: &Path) -> anyhow::Result<()> {
                crate::audio::wav::write_mono(destination, &self.samples, 16_000)
            }
        }

        let (_dir, store, recordings) = setup();
        let samples: Vec<f32> = (0..16_000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin() * 0.6)
            .collect();
        let mut recorder = CannedClipRecorder { samples };
        let extractor = MfccExtractor::new(FeatureConfig::default());

        let enrolled = enroll("grace", &mut recorder, &extractor, &store, &recordings);
        assert!(matches!(
            enrolled,
            EnrollOutcome::Enrolled { dimensions: 13, .. }
        ));

        match authenticate("grace", &mut recorder, &extractor, &store, &recordings, 0.85) {
            AuthOutcome::Decision { score, granted, .. } => {
                assert!((score - 1.0).abs() < 1e-5, "identical clips score {}", score);
                assert!(granted);
            }
            other => panic!("expected a decision, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!access_granted(0.85, 0.85));
        assert!(access_granted(0.850001, 0.85));
        assert!(!access_granted(0.849999, 0.85));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs_deny() {
        // Mismatched lengths and zero vectors score 0.0, below any threshold
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
