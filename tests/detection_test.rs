//! Detection against real directory trees

use buildscout::{BuildSystemDetector, BuildSystemKind, Detection};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tree(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        let path = dir.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }
    dir
}

fn detect(dir: &TempDir) -> Detection {
    BuildSystemDetector::default().detect(dir.path())
}

#[test]
fn meson_beats_cmake() {
    let dir = tree(&["meson.build", "CMakeLists.txt"]);
    let detection = detect(&dir);

    assert_eq!(detection.kind, BuildSystemKind::Meson);
    assert_eq!(detection.evidence, vec!["meson.build"]);
}

#[test]
fn meson_options_is_companion_evidence() {
    let dir = tree(&["meson.build", "meson_options.txt"]);
    assert_eq!(detect(&dir).evidence, vec!["meson.build", "meson_options.txt"]);
}

#[test]
fn makefile_only() {
    let dir = tree(&["Makefile", "README"]);
    let detection = detect(&dir);

    assert_eq!(detection.kind, BuildSystemKind::Makefile);
    assert_eq!(detection.evidence, vec!["Makefile"]);
}

#[test]
fn autotools_configure_scripts() {
    let dir = tree(&["configure.ac", "configure", "Makefile"]);
    let detection = detect(&dir);

    assert_eq!(detection.kind, BuildSystemKind::Autotools);
    assert_eq!(detection.evidence, vec!["configure", "configure.ac"]);
}

#[test]
fn autogen_precedes_configure() {
    let dir = tree(&["autogen.sh", "configure.ac"]);
    assert_eq!(detect(&dir).evidence, vec!["autogen.sh"]);
}

#[test]
fn python_setup_files() {
    let dir = tree(&["setup.cfg", "setup.py"]);
    let detection = detect(&dir);

    assert_eq!(detection.kind, BuildSystemKind::Python);
    assert_eq!(detection.evidence, vec!["setup.py", "setup.cfg"]);
}

#[test]
fn qmake_project_choice_is_stable() {
    let dir = tree(&["zeta.pro", "alpha.pro", "README.md"]);
    let detection = detect(&dir);

    assert_eq!(detection.kind, BuildSystemKind::QMake);
    assert_eq!(detection.evidence, vec!["alpha.pro"]);
}

#[test]
fn nested_markers_are_ignored() {
    let dir = tree(&["src/CMakeLists.txt", "docs/meson.build"]);
    assert_eq!(detect(&dir), Detection::other());
}

#[test]
fn marker_directory_counts() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("bootstrap")).unwrap();

    let detection = detect(&dir);
    assert_eq!(detection.kind, BuildSystemKind::Autotools);
    assert_eq!(detection.evidence, vec!["bootstrap"]);
}

#[test]
fn empty_and_missing_roots_are_other() {
    let dir = tree(&[]);
    assert_eq!(detect(&dir), Detection::other());

    let missing = BuildSystemDetector::default().detect(Path::new("/nonexistent/buildscout/root"));
    assert_eq!(missing.kind, BuildSystemKind::Other);
    assert!(missing.evidence.is_empty());
}

#[test]
fn detection_does_not_touch_the_tree() {
    let dir = tree(&["CMakeLists.txt", "src/main.c"]);
    detect(&dir);
    detect(&dir);

    assert!(dir.path().join("CMakeLists.txt").exists());
    assert!(dir.path().join("src/main.c").exists());
}
