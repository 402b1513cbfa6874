use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pedalboard_core::config::RecorderSettings;
use pedalboard_core::labels::LabelBoard;
use pedalboard_core::process::{DeleteError, Recorder, SupervisorError};

/// `tail -f <take> <source>` keeps following the existing source file until
/// killed, which stands in for a recorder writing the take.
fn recorder(dir: &Path) -> (Recorder, Arc<LabelBoard>) {
    let labels = Arc::new(LabelBoard::new());
    let source = dir.join("source");
    fs::write(&source, b"").unwrap();
    let settings = RecorderSettings {
        program: "tail".to_string(),
        directory: dir.join("recordings"),
        source: source.display().to_string(),
    };
    (Recorder::new(settings, labels.clone()).unwrap(), labels)
}

#[test]
fn filenames_increase_across_starts() {
    let dir = tempfile::tempdir().unwrap();
    let (recorder, _) = recorder(dir.path());

    let mut files = Vec::new();
    for _ in 0..3 {
        files.push(recorder.start().unwrap());
        assert!(recorder.stop().unwrap());
    }

    let names: Vec<String> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["recording0001.wav", "recording0002.wav", "recording0003.wav"]
    );
    assert!(files.windows(2).all(|w| w[0] < w[1]));
    assert!(dir.path().join("recordings").is_dir());
}

#[test]
fn second_start_is_rejected_and_keeps_the_counter() {
    let dir = tempfile::tempdir().unwrap();
    let (recorder, _) = recorder(dir.path());

    let first = recorder.start().unwrap();
    assert!(matches!(recorder.start(), Err(SupervisorError::AlreadyRunning(_))));
    assert!(recorder.stop().unwrap());

    let second = recorder.start().unwrap();
    assert!(first < second);
    assert!(second.ends_with("recording0002.wav"));
    recorder.stop().unwrap();
}

#[test]
fn delete_last_is_refused_while_recording() {
    let dir = tempfile::tempdir().unwrap();
    let (recorder, labels) = recorder(dir.path());

    assert!(recorder.delete_last().unwrap().is_none());

    let file = recorder.start().unwrap();
    fs::write(&file, b"RIFF").unwrap();
    assert!(matches!(recorder.delete_last(), Err(DeleteError::StillRecording(_))));
    assert!(file.exists());

    recorder.stop().unwrap();
    assert_eq!(recorder.delete_last().unwrap(), Some(file.clone()));
    assert!(!file.exists());
    assert!(labels.get("record", "lbl_recording").unwrap().starts_with("Deleted"));
    // The slot is not reused
    assert!(recorder.next_file().ends_with("recording0002.wav"));
}

#[test]
fn label_settles_after_recorder_exits_on_its_own() {
    let dir = tempfile::tempdir().unwrap();
    let labels = Arc::new(LabelBoard::new());
    let settings = RecorderSettings {
        program: "true".to_string(),
        directory: dir.path().join("recordings"),
        source: "unused".to_string(),
    };
    let recorder = Recorder::new(settings, labels.clone()).unwrap();

    let file = recorder.start().unwrap();
    assert!(labels.get("record", "lbl_recording").unwrap().starts_with("Recording"));

    let deadline = Instant::now() + Duration::from_secs(2);
    while recorder.is_recording() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(!recorder.is_recording());

    assert!(!recorder.stop().unwrap());
    assert_eq!(
        labels.get("record", "lbl_recording"),
        Some(format!("Saved {}", file.display()))
    );
}
