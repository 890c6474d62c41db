use taptime::config::{EngineConfig, Preset};
use taptime::export::{self, ExportError, CSV_FILE_NAME, JSON_FILE_NAME};
use taptime::recorder::TapInterval;
use taptime::session::Session;
use tempfile::tempdir;

fn recorded_session() -> Session {
    let mut session = Session::new(EngineConfig::preset(Preset::Full));
    for (start, end) in [(0, 1000), (2000, 2100), (3000, 3050)] {
        session.press_start(start, None);
        session.press_end(end);
    }
    session
}

#[test]
fn csv_export_writes_taps_file() {
    let dir = tempdir().unwrap();
    let history = [TapInterval::new(10, 20), TapInterval::new(30, 45)];
    let path = export::export_csv(dir.path(), &history).unwrap();
    assert_eq!(path, dir.path().join(CSV_FILE_NAME));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "10,20\n30,45\n");
}

#[test]
fn json_export_matches_session_statistics() {
    let dir = tempdir().unwrap();
    let session = recorded_session();
    let path = export::export_json(
        &dir.path().join("nested"),
        session.history(),
        session.extrema(),
    )
    .unwrap();
    assert!(path.ends_with(JSON_FILE_NAME));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["taps"].as_array().unwrap().len(), 2);
    assert_eq!(value["taps"][1]["start"], 3000);
    assert_eq!(value["hud"]["count"], 2);
    assert_eq!(value["hud"]["averageGap"], 0.9);
    assert_eq!(value["hud"]["maxDuration"], 100);
}

#[test]
fn export_reexport_overwrites() {
    let dir = tempdir().unwrap();
    export::export_csv(dir.path(), &[TapInterval::new(1, 20)]).unwrap();
    export::export_csv(dir.path(), &[TapInterval::new(5, 50)]).unwrap();
    let csv = std::fs::read_to_string(dir.path().join(CSV_FILE_NAME)).unwrap();
    assert_eq!(csv, "5,50\n");
}

#[test]
fn export_into_file_path_fails_with_io_error() {
    let dir = tempdir().unwrap();
    let not_a_dir = dir.path().join("plain");
    std::fs::write(&not_a_dir, b"").unwrap();
    let err = export::export_json(&not_a_dir, &[], None).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(err.to_string().contains("taps.json"));
}
