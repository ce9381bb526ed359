//! CLI integration tests
//!
//! These tests run the `sba` binary against a temporary asset directory and
//! check exit codes and written files. Nothing here touches the network.

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn sba(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sba"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("PORT")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute sba")
}

/// Lay out a minimal asset directory and return the config path.
fn setup(dir: &TempDir, extra: &str) -> PathBuf {
    let root = dir.path();

    let sheet = RgbaImage::from_fn(256, 128, |x, _| {
        if x < 128 {
            Rgba([200, 30, 30, 255])
        } else {
            Rgba([30, 200, 30, 255])
        }
    });
    sheet.save(root.join("items.png")).expect("should write sheet");
    fs::write(root.join("items.css"), ".icon-1_0 { background-position: -128px 0px; }")
        .expect("should write css");

    fs::create_dir_all(root.join("glint")).expect("should create glint dir");
    for i in 0..2u8 {
        RgbaImage::from_pixel(8, 8, Rgba([80 * i, 20, 180, 255]))
            .save(root.join("glint").join(format!("{}.png", i)))
            .expect("should write glint frame");
    }

    fs::write(
        root.join("items.json"),
        r#"{"STONE": {"type": "item", "item_id": 1, "damage": 0, "glowing": false}}"#,
    )
    .expect("should write snapshot");

    let config = format!(
        r#"{extra}
[paths]
items_sheet = "{root}/items.png"
items_css = "{root}/items.css"
glint_dir = "{root}/glint"
store_dir = "{root}/store"
items_snapshot = "{root}/items.json"
essences = "{root}/essence.json"
"#,
        extra = extra,
        root = root.display()
    );
    let path = root.join("assets.toml");
    fs::write(&path, config).expect("should write config");
    path
}

#[test]
fn test_render_item_png() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "");
    let output_path = dir.path().join("out").join("stone.png");

    let output = sba(&config, &["render", "item", "stone", "-o", output_path.to_str().unwrap()]);
    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));

    let icon = image::open(&output_path).expect("should open output").to_rgba8();
    assert_eq!(icon.dimensions(), (128, 128));
    assert_eq!(icon.get_pixel(10, 10).0, [30, 200, 30, 255]);
    // Rendering from the CLI bypasses the store
    assert!(!dir.path().join("store").join("STONE.png").exists());
}

#[test]
fn test_render_item_glow_gif() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "");
    let output_path = dir.path().join("stone.gif");

    let output = sba(&config, &["render", "item", "STONE", "--glow", "-o", output_path.to_str().unwrap()]);
    assert!(output.status.success(), "Render failed: {}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(&output_path).expect("should read output");
    assert!(bytes.starts_with(b"GIF8"));
}

#[test]
fn test_render_unknown_item_fails() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "");

    let output = sba(&config, &["render", "item", "nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("NOPE"));
}

#[test]
fn test_serve_without_port_is_invalid() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "");

    let output = sba(&config, &["serve"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("PORT"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "[schedule]\nrefresh_secs = 0\n");

    let output = sba(&config, &["clear-store"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("schedule.refresh_secs"));
}

#[test]
fn test_clear_store_removes_renders() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "");
    let store = dir.path().join("store");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join("STONE.png"), b"png").unwrap();
    fs::write(store.join("notes.txt"), b"keep").unwrap();

    let output = sba(&config, &["clear-store"]);
    assert!(output.status.success(), "clear-store failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!store.join("STONE.png").exists());
    assert!(store.join("notes.txt").exists());
}

#[test]
fn test_render_head_rejects_oversized_scale() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "");

    for scale in ["0", "-2", "1e7"] {
        let output = sba(&config, &["render", "head", "cafebabe", &format!("--scale={}", scale)]);
        assert_eq!(output.status.code(), Some(2), "--scale {} should be rejected", scale);
        assert!(String::from_utf8_lossy(&output.stderr).contains("--scale"));
    }
}
