use super::*;

#[test]
fn empty_document_takes_defaults() {
    let cfg = ProjectConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, ProjectConfig::default());
    assert_eq!(cfg.analysis.window_size, 256);
    assert_eq!(cfg.pipeline.jpeg_quality, 92);
    assert_eq!(cfg.export.fps, 30);
}

#[test]
fn partial_sections_merge_with_defaults() {
    let cfg = ProjectConfig::from_json_str(
        r#"{"export":{"resolution":"720p"},"analysis":{"scale":{"decibels":{"minDb":-90,"maxDb":-20}}}}"#,
    )
    .unwrap();
    assert_eq!(cfg.export.resolution.dimensions(), (1280, 720));
    assert_eq!(cfg.export.fps, 30);
    assert_eq!(
        cfg.analysis.scale,
        SpectrumScale::Decibels {
            min_db: -90.0,
            max_db: -20.0
        }
    );
}

#[test]
fn unknown_keys_and_bad_values_are_validation_errors() {
    let err = ProjectConfig::from_json_str(r#"{"visualiser":{}}"#).unwrap_err();
    assert!(matches!(err, VizError::Validation(_)));

    let err = ProjectConfig::from_json_str(r#"{"analysis":{"windowSize":100}}"#).unwrap_err();
    assert!(err.to_string().contains("windowSize"));

    let err = ProjectConfig::from_json_str(r#"{"pipeline":{"threads":0}}"#).unwrap_err();
    assert!(err.to_string().contains("threads"));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    std::fs::write(&path, r#"{"visualizer":{"glow":true}}"#).unwrap();
    let cfg = ProjectConfig::from_json_path(&path).unwrap();
    assert!(cfg.visualizer.glow);

    let missing = ProjectConfig::from_json_path(dir.path().join("nope.json")).unwrap_err();
    assert!(missing.to_string().contains("nope.json"));
}

#[test]
fn chunk_size_zero_is_normalized() {
    let opts = PipelineOptions {
        chunk_size: 0,
        ..PipelineOptions::default()
    };
    assert_eq!(opts.normalized_chunk_size(), 1);
}
