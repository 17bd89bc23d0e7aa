//! Byte-array rendering: round trip, line layout, determinism, table output.

use threatpack::artifact::{hex_lines, parse_artifact, parse_artifacts, ArtifactEncoder, EmbeddableArtifact};
use threatpack::PipelineError;

fn bytes(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i * 37 % 256) as u8).collect()
}

fn array_body_lines(text: &str) -> Vec<&str> {
    text.lines()
        .skip_while(|l| !l.contains("const uint8_t"))
        .skip(1)
        .take_while(|l| *l != "};")
        .collect()
}

#[test]
fn round_trip_across_line_boundaries() {
    let encoder = ArtifactEncoder::default();
    for n in [1usize, 15, 16, 17, 100] {
        let data = bytes(n);
        let text = encoder
            .encode(&EmbeddableArtifact::new("model_data", data.clone()))
            .unwrap();
        assert_eq!(parse_artifact(&text).unwrap(), data, "length {}", n);
        assert!(text.contains(&format!("const unsigned int model_data_len = {};", n)));
    }
}

#[test]
fn seventeen_bytes_wrap_onto_two_lines() {
    let text = ArtifactEncoder::new(16, 16)
        .encode(&EmbeddableArtifact::new("blob", bytes(17)))
        .unwrap();
    let lines = array_body_lines(&text);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(','));
    assert!(!lines[1].ends_with(','));
    assert_eq!(lines[1].trim(), format!("0x{:02x}", bytes(17)[16]));
}

#[test]
fn hex_lines_formatting() {
    assert_eq!(hex_lines(&[0x00, 0xab, 0x0f], 2), "    0x00, 0xab,\n    0x0f\n");
    assert_eq!(hex_lines(&[], 16), "");
}

#[test]
fn output_is_deterministic_and_pinned_to_content() {
    let encoder = ArtifactEncoder::default();
    let a = encoder.encode(&EmbeddableArtifact::new("m", bytes(64))).unwrap();
    let b = encoder.encode(&EmbeddableArtifact::new("m", bytes(64))).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with("// Generated by threatpack. Do not edit.\n"));
    assert!(a.contains("#pragma once"));
    assert!(a.contains("alignas(16) const uint8_t m[] = {"));

    let artifact = EmbeddableArtifact::new("m", b"abc".to_vec());
    assert_eq!(
        artifact.sha256_hex(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn empty_input_requires_placeholder() {
    let encoder = ArtifactEncoder::default();
    let err = encoder
        .encode(&EmbeddableArtifact::new("model", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput(_)));

    let text = encoder
        .encode(&EmbeddableArtifact::placeholder("model", Vec::new()))
        .unwrap();
    assert!(text.contains("const unsigned int model_len = 0;"));
    assert_eq!(array_body_lines(&text), vec!["    0x00"]);
    assert!(parse_artifact(&text).unwrap().is_empty());
}

#[test]
fn invalid_symbols_are_rejected() {
    let encoder = ArtifactEncoder::default();
    for name in ["", "9lives", "has-dash", "two words"] {
        let err = encoder
            .encode(&EmbeddableArtifact::new(name, vec![1]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSymbol(_)), "{:?}", name);
    }
    assert!(encoder
        .encode(&EmbeddableArtifact::new("_ok_9", vec![1]))
        .is_ok());
}

#[test]
fn table_lists_entries_in_order_with_sizeof_count() {
    let artifacts = vec![
        EmbeddableArtifact::new("chirp_alert", bytes(20)),
        EmbeddableArtifact::new("chirp_safe", bytes(3)),
    ];
    let text = ArtifactEncoder::default()
        .encode_table("audio_clips", &artifacts)
        .unwrap();

    assert!(text.contains("struct audio_clips_entry {"));
    assert!(text.contains("const struct audio_clips_entry audio_clips[] = {"));
    let alert = text.find("    {chirp_alert, chirp_alert_len},").unwrap();
    let safe = text.find("    {chirp_safe, chirp_safe_len},").unwrap();
    assert!(alert < safe);
    assert!(text.contains(
        "#define AUDIO_CLIPS_COUNT (sizeof(audio_clips) / sizeof(struct audio_clips_entry))"
    ));

    let parsed = parse_artifacts(&text).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0], ("chirp_alert".to_string(), bytes(20)));
    assert_eq!(parsed[1], ("chirp_safe".to_string(), bytes(3)));
}

#[test]
fn empty_table_is_rejected() {
    let err = ArtifactEncoder::default()
        .encode_table("clips", &[])
        .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput(_)));
}

#[test]
fn malformed_header_fails_to_parse() {
    let text = "const unsigned int x_len = 2;\nalignas(16) const uint8_t x[] = {\n    0x01, zz\n};\n";
    assert!(matches!(
        parse_artifact(text),
        Err(PipelineError::ArtifactParse(_))
    ));
    assert!(parse_artifact("// nothing here\n").is_err());
}
