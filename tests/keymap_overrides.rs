use newsnav::cli::write_keys;
use newsnav::keymap::{KeyBinding, KeyResolver, Keymap, KeymapPreset, Operation};

#[test]
fn test_override_shadows_preset_binding() {
    // Test that when Up is overridden, the original preset keys no longer work
    let keymap = Keymap {
        preset: KeymapPreset::Vim,
        overrides: vec![KeyBinding::new("w", Operation::Up)],
        ..Keymap::default()
    };

    assert_eq!(keymap.operation("w", "feedlist"), Some(Operation::Up));
    assert_eq!(keymap.operation("k", "feedlist"), None);
    assert_eq!(keymap.operation("UP", "feedlist"), None);

    // Down is not overridden
    assert_eq!(keymap.operation("j", "feedlist"), Some(Operation::Down));
}

#[test]
fn test_hints_reflect_overrides() {
    let keymap = Keymap {
        overrides: vec![
            KeyBinding::new("w", Operation::Up),
            KeyBinding::in_context("X", Operation::Quit, "article"),
        ],
        ..Keymap::default()
    };

    assert_eq!(keymap.key_for(Operation::Up, "articlelist"), "w");
    assert_eq!(keymap.key_for(Operation::Quit, "article"), "X");
    assert_eq!(keymap.key_for(Operation::Quit, "feedlist"), "q");
}

#[test]
fn test_keys_listing_shows_overrides_first() {
    let keymap = Keymap {
        overrides: vec![KeyBinding::new("Q", Operation::Quit)],
        ..Keymap::default()
    };
    let mut out = Vec::new();
    write_keys(&mut out, &keymap, Some("feedlist")).unwrap();
    let text = String::from_utf8(out).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("feedlist:"));
    let first = lines.next().unwrap_or_default();
    assert!(first.contains("quit"), "first binding: {}", first);
    assert!(!text.lines().any(|l| l.trim_start().starts_with("q ")));
}
