//! End-to-end tests over a real content tree on disk.
//!
//! Each test builds a small `images/` tree in a temp directory, runs the
//! assembler (or the binary) against it, and inspects the written output.

use gallery_manifest::config::ManifestConfig;
use gallery_manifest::manifest::{Assembler, OutputFormat, render, write_manifest};
use gallery_manifest::source::FsSource;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    write(root, rel, "");
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A trip with two locations, food, and both loose folders.
fn content_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("images");
    for rel in [
        "Toya/lake_view/a.jpg",
        "Toya/lake_view/a-800.webp",
        "Toya/lake_view/a-1600.webp",
        "Toya/lake_view/b.jpg",
        "Toya/lake_view/c.jpg",
        "Toya/onsen/bath.jpg",
        "Toya/blue-pond.jpg",
        "Otaru/canal/night-480.avif",
        "food/miso_ramen/bowl.jpg",
        "food/soup_curry/plate.png",
        "gallery/g1.jpg",
        "gallery/g1-800.webp",
        "gallery/g2.jpg",
        "friends/f1.jpg",
        "_drafts/wip/x.jpg",
    ] {
        touch(&root, rel);
    }
    fs::create_dir_all(root.join("Toya/empty")).unwrap();
    write(
        &root,
        "Toya/lake_view/info.json",
        r#"{"nameZh": "洞爺湖展望台", "cover": "b.jpg", "tags": ["lake"], "season": "winter"}"#,
    );
    write(&root, "Toya/onsen/info.json", r#"{"order": 1}"#);
    write(&root, "food/miso_ramen/info.json", "{ broken");
    write(
        &root,
        "food/soup_curry/info.json",
        r#"{"title": "Soup Curry", "rating": 3, "price": "¥1500"}"#,
    );
    tmp
}

fn config() -> ManifestConfig {
    ManifestConfig {
        timestamp: false,
        ..ManifestConfig::default()
    }
}

fn assemble_json(root: &Path) -> Value {
    let manifest = Assembler::new(config(), &FsSource).assemble(root).unwrap();
    serde_json::from_str(&render(&manifest, OutputFormat::Json).unwrap()).unwrap()
}

// =========================================================================
// Manifest contents
// =========================================================================

#[test]
fn locations_spots_and_ordering() {
    let tmp = content_tree();
    let value = assemble_json(&tmp.path().join("images"));

    let toya = value["locations"]["Toya"].as_array().unwrap();
    let ids: Vec<&str> = toya.iter().map(|s| s["id"].as_str().unwrap()).collect();
    // onsen declares order 1; the rest sort by name, empty dir dropped
    assert_eq!(ids, ["onsen", "blue-pond", "lake-view"]);

    assert!(value["locations"]["Sapporo"].as_array().unwrap().is_empty());
    assert!(value["locations"].get("_drafts").is_none());
}

#[test]
fn cover_promotion_keeps_arrays_aligned() {
    let tmp = content_tree();
    let value = assemble_json(&tmp.path().join("images"));

    let lake = &value["locations"]["Toya"][2];
    assert_eq!(lake["nameZh"], "洞爺湖展望台");
    assert_eq!(lake["season"], "winter");
    let images = lake["images"].as_array().unwrap();
    let metas = lake["imagesMeta"].as_array().unwrap();
    assert_eq!(
        images,
        &[
            "images/Toya/lake_view/b.jpg",
            "images/Toya/lake_view/a.jpg",
            "images/Toya/lake_view/c.jpg"
        ]
    );
    assert_eq!(images.len(), metas.len());
    for (image, meta) in images.iter().zip(metas) {
        assert_eq!(image, &meta["fallback"]);
    }
    assert_eq!(metas[1]["sources"]["webp"].as_array().unwrap().len(), 2);
    assert_eq!(metas[1]["sources"]["webp"][1]["w"], 1600);
}

#[test]
fn widthed_only_photo_uses_widest_variant() {
    let tmp = content_tree();
    let value = assemble_json(&tmp.path().join("images"));

    let canal = &value["locations"]["Otaru"][0];
    assert_eq!(
        canal["imagesMeta"][0]["fallback"],
        "images/Otaru/canal/night-480.avif"
    );
    assert_eq!(canal["images"][0], "images/Otaru/canal/night-480.avif");
}

#[test]
fn food_defaults_and_bad_sidecar() {
    let tmp = content_tree();
    let value = assemble_json(&tmp.path().join("images"));

    let food = value["foodItems"].as_array().unwrap();
    let titles: Vec<&str> = food.iter().map(|f| f["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Miso Ramen", "Soup Curry"]);
    // malformed sidecar falls back to defaults
    assert_eq!(food[0]["rating"], 2);
    assert_eq!(food[0]["note"], "");
    assert_eq!(food[1]["rating"], 3);
    assert_eq!(food[1]["price"], "¥1500");
    assert_eq!(food[1]["images"][0], "images/food/soup_curry/plate.png");
}

#[test]
fn loose_folders() {
    let tmp = content_tree();
    let value = assemble_json(&tmp.path().join("images"));

    assert_eq!(
        value["gallery"]["images"],
        serde_json::json!(["images/gallery/g1.jpg", "images/gallery/g2.jpg"])
    );
    assert_eq!(value["gallery"]["imagesMeta"][0]["sources"]["webp"][0]["w"], 800);
    assert_eq!(value["friends"]["images"][0], "images/friends/f1.jpg");
}

#[test]
fn sidecar_image_list_selects_photos() {
    let tmp = content_tree();
    let root = tmp.path().join("images");
    write(
        &root,
        "Toya/lake_view/info.json",
        r#"{"images": ["c.jpg", "a.jpg"], "visitedAt": 1720000000, "order": 1.5}"#,
    );
    let value = assemble_json(&root);

    let lake = value["locations"]["Toya"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == "lake-view")
        .unwrap();
    assert_eq!(
        lake["images"],
        serde_json::json!(["images/Toya/lake_view/c.jpg", "images/Toya/lake_view/a.jpg"])
    );
    assert_eq!(lake["imagesMeta"].as_array().unwrap().len(), 2);
    assert_eq!(lake["visitedAt"], 1720000000);
    assert_eq!(lake["order"], 1.5);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_skipped() {
    let tmp = content_tree();
    let root = tmp.path().join("images");
    std::os::unix::fs::symlink("/nonexistent/old.jpg", root.join("Toya/lake_view/old.jpg"))
        .unwrap();
    std::os::unix::fs::symlink("/nonexistent/dir", root.join("Toya/gone")).unwrap();
    std::os::unix::fs::symlink("/nonexistent/g3.jpg", root.join("gallery/g3.jpg")).unwrap();

    let value = assemble_json(&root);

    let toya = value["locations"]["Toya"].as_array().unwrap();
    let ids: Vec<&str> = toya.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["onsen", "blue-pond", "lake-view"]);
    assert_eq!(toya[2]["images"].as_array().unwrap().len(), 3);
    assert_eq!(value["gallery"]["images"].as_array().unwrap().len(), 2);
}

// =========================================================================
// Writing
// =========================================================================

#[test]
fn two_runs_are_byte_identical() {
    let tmp = content_tree();
    let root = tmp.path().join("images");
    let out_a = tmp.path().join("a/data.js");
    let out_b = tmp.path().join("b/data.js");

    for out in [&out_a, &out_b] {
        let manifest = Assembler::new(config(), &FsSource).assemble(&root).unwrap();
        write_manifest(&manifest, out, OutputFormat::Js).unwrap();
    }

    let a = fs::read(&out_a).unwrap();
    let b = fs::read(&out_b).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn missing_root_writes_empty_collections() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("src/data.js");
    let manifest = Assembler::new(config(), &FsSource)
        .assemble(&tmp.path().join("nope"))
        .unwrap();
    write_manifest(&manifest, &out, OutputFormat::Js).unwrap();

    let js = fs::read_to_string(&out).unwrap();
    assert!(js.contains("export const toyaSpots = [];"));
    assert!(js.contains("export const foodItems = [];"));
    assert!(js.contains("export const galleryImages = [];"));
}

// =========================================================================
// CLI
// =========================================================================

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gallery-manifest"))
}

#[test]
fn cli_generate_writes_js_module() {
    let tmp = content_tree();
    let out = tmp.path().join("site/src/data.js");
    let status = cli()
        .arg("--source")
        .arg(tmp.path().join("images"))
        .args(["generate", "--no-timestamp", "--output"])
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let js = fs::read_to_string(&out).unwrap();
    assert!(js.contains("export const CITY_META = "));
    assert!(js.contains("export const toyaSpots = "));
    assert!(js.contains("export const friendsPhotosMeta = "));
    assert!(!js.contains("Generated at"));
}

#[test]
fn cli_generate_json_by_extension() {
    let tmp = content_tree();
    let out = tmp.path().join("data.json");
    let status = cli()
        .arg("--source")
        .arg(tmp.path().join("images"))
        .args(["generate", "--output"])
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let value: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert!(value["generatedAt"].is_string());
    assert!(value["locations"]["Toya"].is_array());
}

#[test]
fn cli_reads_config_from_content_root() {
    let tmp = content_tree();
    let root = tmp.path().join("images");
    write(&root, "manifest.toml", "web_base = \"/trip\"\ntimestamp = false\n");
    let out = tmp.path().join("data.json");
    let status = cli()
        .arg("--source")
        .arg(&root)
        .args(["generate", "--output"])
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let value: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["friends"]["images"][0], "/trip/friends/f1.jpg");
    assert!(value.get("generatedAt").is_none());
}

#[test]
fn cli_invalid_config_fails() {
    let tmp = content_tree();
    let root = tmp.path().join("images");
    write(&root, "manifest.toml", "[variants]\nwidths = []\n");
    let status = cli()
        .arg("--source")
        .arg(&root)
        .arg("check")
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_gen_config_prints_stock_toml() {
    let output = cli().arg("gen-config").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: ManifestConfig = toml::from_str(&stdout).unwrap();
    assert_eq!(parsed, ManifestConfig::default());
}
