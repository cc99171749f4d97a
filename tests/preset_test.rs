//! Integration tests for preset resolution against a project on disk

#[allow(dead_code)]
mod common;

use common::{TestProject, SAMPLE_PRESETS};
use picobuild::core::preset::PresetCatalog;
use picobuild::error::PresetError;
use proptest::prelude::*;
use std::path::Path;

fn load(project: &TestProject) -> PresetCatalog {
    PresetCatalog::load(&project.path().join("CMakePresets.json")).unwrap()
}

#[test]
fn test_debug_binary_dir_under_project_root() {
    let project = TestProject::with_presets();
    let catalog = load(&project);

    let binary_dir = catalog.resolve_binary_dir("debug", &project.path()).unwrap();

    assert_eq!(binary_dir, project.path().join("build").join("debug"));
}

#[test]
fn test_build_type_follows_inherits() {
    let project = TestProject::with_presets();
    let catalog = load(&project);

    assert_eq!(catalog.build_type("debug").unwrap().as_deref(), Some("Debug"));
    assert_eq!(catalog.build_type("release").unwrap().as_deref(), Some("Release"));
    assert_eq!(catalog.build_type("msys2-gcc").unwrap().as_deref(), Some("Release"));
}

#[test]
fn test_every_build_preset_resolves_to_its_configure_preset() {
    let project = TestProject::with_presets();
    let catalog = load(&project);

    for build in catalog.build_presets() {
        let configure = catalog.resolve_build_preset(&build.name).unwrap();
        assert_eq!(configure.name, build.configure_preset);
    }
}

#[test]
fn test_summaries_for_listing() {
    let project = TestProject::with_presets();
    let summaries = load(&project).summaries();

    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["debug", "release", "msys2-gcc", "msys2-clang"]);
    assert_eq!(summaries[0].description, "Host debug build with tests");
    assert_eq!(summaries[1].build_type.as_deref(), Some("Release"));
}

#[test]
fn test_hidden_base_preset_is_not_buildable() {
    let project = TestProject::with_presets();
    let catalog = load(&project);

    assert!(catalog.configure_preset("base").is_some());
    assert!(matches!(
        catalog.resolve_build_preset("base"),
        Err(PresetError::UnknownPreset { .. })
    ));
}

proptest! {
    #[test]
    fn prop_unknown_names_are_rejected(name in "[a-z0-9-]{1,20}") {
        let catalog = PresetCatalog::from_json(Path::new("CMakePresets.json"), SAMPLE_PRESETS).unwrap();
        prop_assume!(!catalog.available_presets().contains(&name));

        let is_unknown = matches!(
            catalog.resolve_build_preset(&name),
            Err(PresetError::UnknownPreset { .. })
        );
        prop_assert!(is_unknown);
    }
}
