//! Capture decoding: header checks, batch skip-and-continue, cap, calibration corpus.

use ndarray::array;
use threatpack::capture::{decode_capture, CalibrationCorpus, CaptureBatch, CaptureError};
use threatpack::config::CaptureConfig;
use threatpack::PipelineError;

fn capture_bytes(timestamp: u32, timesteps: u16, features: u16, payload: &[f32]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&timestamp.to_le_bytes());
    out.extend_from_slice(&timesteps.to_le_bytes());
    out.extend_from_slice(&features.to_le_bytes());
    for v in payload {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

#[test]
fn seven_bytes_is_too_short() {
    let err = decode_capture(&[0u8; 7]).unwrap_err();
    assert_eq!(err, CaptureError::TooShort { len: 7 });
}

#[test]
fn short_payload_is_truncated() {
    // 2 x 3 floats declared = 24 bytes, only 5 floats present
    let buf = capture_bytes(1, 2, 3, &[0.0; 5]);
    assert_eq!(buf.len(), 8 + 20);
    let err = decode_capture(&buf).unwrap_err();
    assert_eq!(
        err,
        CaptureError::TruncatedPayload {
            expected: 24,
            actual: 20
        }
    );
}

#[test]
fn well_formed_capture_decodes_row_major() {
    let buf = capture_bytes(100, 1, 2, &[1.5, -2.5]);
    let record = decode_capture(&buf).unwrap();
    assert_eq!(record.timestamp, 100);
    assert_eq!(record.timestep_count, 1);
    assert_eq!(record.feature_count, 2);
    assert_eq!(record.samples, array![[1.5f32, -2.5]]);
}

#[test]
fn multi_row_capture_keeps_order_and_ignores_trailing_bytes() {
    let mut buf = capture_bytes(7, 2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    buf.extend_from_slice(&[0xff, 0xff]);
    let record = decode_capture(&buf).unwrap();
    assert_eq!(record.samples, array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    assert_eq!(record.to_bytes(), buf[..buf.len() - 2].to_vec());
}

#[test]
fn empty_payload_header_only_is_valid() {
    let record = decode_capture(&capture_bytes(9, 0, 4, &[])).unwrap();
    assert_eq!(record.samples.shape(), &[0, 4]);
}

#[test]
fn capture_error_converts_to_malformed_capture() {
    let err: PipelineError = CaptureError::TooShort { len: 3 }.into();
    assert!(matches!(err, PipelineError::MalformedCapture(_)));
}

#[test]
fn batch_skips_bad_files_and_keeps_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    std::fs::write(d.join("feature_0002.raw"), capture_bytes(2, 1, 2, &[3.0, 4.0])).unwrap();
    std::fs::write(d.join("feature_0001.raw"), capture_bytes(1, 1, 2, &[1.0, 2.0])).unwrap();
    std::fs::write(d.join("feature_0003.raw"), [1u8, 2, 3]).unwrap();
    std::fs::write(d.join("feature_0004.raw"), capture_bytes(4, 3, 3, &[0.0; 2])).unwrap();
    std::fs::write(d.join("notes.txt"), b"ignored").unwrap();
    std::fs::write(d.join("other_0001.raw"), capture_bytes(5, 1, 1, &[9.0])).unwrap();

    let batch = CaptureBatch::decode_dir(d, &CaptureConfig::default()).unwrap();
    assert_eq!(batch.succeeded(), 2);
    assert_eq!(batch.failed(), 2);
    let stamps: Vec<u32> = batch.records.iter().map(|r| r.record.timestamp).collect();
    assert_eq!(stamps, vec![1, 2]);
    assert!(batch.failures[0].path.ends_with("feature_0003.raw"));
    assert!(batch.failures[1].reason.contains("truncated"));
}

#[test]
fn batch_cap_counts_files_in_listing_order() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5u32 {
        let name = format!("feature_{:04}.raw", i);
        // timestamps descending so timestamp order differs from name order
        std::fs::write(dir.path().join(name), capture_bytes(100 - i, 1, 1, &[i as f32])).unwrap();
    }
    let config = CaptureConfig {
        max_files: 3,
        ..CaptureConfig::default()
    };
    let batch = CaptureBatch::decode_dir(dir.path(), &config).unwrap();
    let stamps: Vec<u32> = batch.records.iter().map(|r| r.record.timestamp).collect();
    assert_eq!(stamps, vec![100, 99, 98]);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(CaptureBatch::decode_dir(&missing, &CaptureConfig::default()).is_err());
}

#[test]
fn calibration_corpus_round_trips_as_batched_tensors() {
    let src = tempfile::tempdir().unwrap();
    std::fs::write(
        src.path().join("feature_a.raw"),
        capture_bytes(1, 2, 2, &[0.5, 1.5, 2.5, 3.5]),
    )
    .unwrap();
    std::fs::write(src.path().join("feature_b.raw"), capture_bytes(2, 1, 2, &[7.0, 8.0])).unwrap();
    let batch = CaptureBatch::decode_dir(src.path(), &CaptureConfig::default()).unwrap();

    let out = tempfile::tempdir().unwrap();
    let written = CalibrationCorpus::write(out.path(), &batch.records).unwrap();
    assert!(written[0].ends_with("sample_0000.npy"));
    assert!(written[1].ends_with("sample_0001.npy"));

    let tensors = CalibrationCorpus::load(out.path(), 300).unwrap();
    assert_eq!(tensors.len(), 2);
    assert_eq!(tensors[0].shape(), &[1, 2, 2]);
    assert_eq!(tensors[0][[0, 1, 0]], 2.5);
    assert_eq!(tensors[1].shape(), &[1, 1, 2]);

    let capped = CalibrationCorpus::load(out.path(), 1).unwrap();
    assert_eq!(capped.len(), 1);
}

#[test]
fn empty_calibration_dir_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(CalibrationCorpus::load(dir.path(), 10).is_err());
}

fn decoded_batch(dir: &std::path::Path, count: u32) -> CaptureBatch {
    for i in 0..count {
        let payload = [i as f32, 0.5, 1.0, 1.5];
        std::fs::write(
            dir.join(format!("feature_{:04}.raw", i)),
            capture_bytes(i, 2, 2, &payload),
        )
        .unwrap();
    }
    CaptureBatch::decode_dir(dir, &CaptureConfig::default()).unwrap()
}

#[test]
fn rewriting_corpus_drops_stale_samples() {
    let three = tempfile::tempdir().unwrap();
    let one = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(out.path().join("notes.txt"), "keep").unwrap();

    CalibrationCorpus::write(out.path(), &decoded_batch(three.path(), 3).records).unwrap();
    assert_eq!(CalibrationCorpus::load(out.path(), 300).unwrap().len(), 3);

    CalibrationCorpus::write(out.path(), &decoded_batch(one.path(), 1).records).unwrap();
    assert_eq!(CalibrationCorpus::load(out.path(), 300).unwrap().len(), 1);
    assert!(!out.path().join("sample_0002.npy").exists());
    assert!(out.path().join("notes.txt").exists());
}

#[test]
fn staging_caps_the_corpus() {
    let raw = tempfile::tempdir().unwrap();
    let corpus = tempfile::tempdir().unwrap();
    let staged = tempfile::tempdir().unwrap();
    CalibrationCorpus::write(corpus.path(), &decoded_batch(raw.path(), 5).records).unwrap();

    let missing = corpus.path().join("unused_X.npy");
    let n = CalibrationCorpus::stage(corpus.path(), &missing, staged.path(), 2).unwrap();
    assert_eq!(n, 2);
    let tensors = CalibrationCorpus::load(staged.path(), 300).unwrap();
    assert_eq!(tensors.len(), 2);
    assert_eq!(tensors[1].shape(), &[1, 2, 2]);
    assert_eq!(tensors[1][[0, 0, 0]], 1.0);
}

#[test]
fn staging_falls_back_to_feature_rows() {
    let dir = tempfile::tempdir().unwrap();
    let x = dir.path().join("d_X.npy");
    threatpack::npy::write_matrix(&x, &array![[0.1f32, 0.2, 0.3], [0.4, 0.5, 0.6], [0.7, 0.8, 0.9]])
        .unwrap();
    let staged = dir.path().join("staged");

    let n = CalibrationCorpus::stage(&dir.path().join("absent"), &x, &staged, 2).unwrap();
    assert_eq!(n, 2);
    let tensors = CalibrationCorpus::load(&staged, 300).unwrap();
    assert_eq!(tensors[0].shape(), &[1, 1, 3]);
    assert_eq!(tensors[1][[0, 0, 2]], 0.6);
}

#[test]
fn staging_without_any_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = CalibrationCorpus::stage(
        &dir.path().join("absent"),
        &dir.path().join("absent_X.npy"),
        &dir.path().join("staged"),
        10,
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)));
}
