#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch catalog: its own data directory, an empty config file and one image.
struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("catalog.toml"), "").unwrap();
        fs::write(temp.path().join("bag.png"), [0x89, b'P', b'N', b'G', 1, 2, 3]).unwrap();
        fs::write(temp.path().join("notes.txt"), "not an image").unwrap();
        Self { temp }
    }

    fn data_dir(&self) -> PathBuf {
        self.temp.path().join("data")
    }

    fn file(&self, name: &str) -> String {
        self.temp.path().join(name).to_str().unwrap().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("catalog"));
        cmd.env("CATALOG_DATA_DIR", self.data_dir().as_os_str())
            .env_remove("CATALOG_DATABASE")
            .env_remove("CATALOG_LOG_LEVEL")
            .env_remove("CATALOG_MAX_IMAGE_BYTES")
            .env_remove("RUST_LOG")
            .args(["--config", &self.file("catalog.toml")]);
        cmd
    }

    fn add(&self, name: &str, price: &str) {
        self.cmd()
            .args([
                "add",
                "--name",
                name,
                "--price",
                price,
                "--description",
                "A sturdy everyday bag",
                "--category",
                "bags",
                "--image",
                &self.file("bag.png"),
            ])
            .assert()
            .success();
    }
}

#[test]
fn test_init_creates_database() {
    let sb = Sandbox::new();

    sb.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database ready at"))
        .stdout(predicate::str::contains("0 products"));

    assert!(sb.data_dir().join("productApp.json").exists());
}

#[test]
fn test_naked_invocation_lists_empty_catalog() {
    let sb = Sandbox::new();

    sb.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("No products found."));
}

#[test]
fn test_add_then_list() {
    let sb = Sandbox::new();

    sb.cmd()
        .args([
            "add",
            "--name",
            "Bag",
            "--price",
            "$12a.3b4",
            "--description",
            "A sturdy everyday bag",
            "--category",
            "bags",
            "--image",
            &sb.file("bag.png"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Product added (#1): Bag"));

    sb.cmd()
        .args(["list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 1"))
        .stdout(predicate::str::contains("\"price\": \"12.34\""))
        .stdout(predicate::str::contains("data:image/png;base64,"));

    sb.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Bag"))
        .stdout(predicate::str::contains("image/png"));
}

#[test]
fn test_list_filters() {
    let sb = Sandbox::new();
    sb.add("Bag", "10");
    sb.add("Tote", "20");

    sb.cmd()
        .args(["list", "--search", "tote", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tote"))
        .stdout(predicate::str::contains("\"Bag\"").not());

    sb.cmd()
        .args(["list", "--category", "hats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No products found."));
}

#[test]
fn test_add_rejects_non_image() {
    let sb = Sandbox::new();

    sb.cmd()
        .args([
            "add",
            "--name",
            "Bag",
            "--price",
            "10",
            "--description",
            "d",
            "--category",
            "c",
            "--image",
            &sb.file("notes.txt"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read image"));

    sb.cmd()
        .args(["list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_add_with_unusable_price_fails() {
    let sb = Sandbox::new();

    sb.cmd()
        .args([
            "add",
            "--name",
            "Bag",
            "--price",
            "free",
            "--description",
            "d",
            "--category",
            "c",
            "--image",
            &sb.file("bag.png"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required fields: price"));
}

#[test]
fn test_edit_changes_only_given_fields() {
    let sb = Sandbox::new();
    sb.add("Bag", "10");

    sb.cmd()
        .args(["edit", "#1", "--price", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Product updated (#1): Bag"));

    sb.cmd()
        .args(["show", "1", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"price\": \"15\""))
        .stdout(predicate::str::contains("\"name\": \"Bag\""))
        .stdout(predicate::str::contains("A sturdy everyday bag"));
}

#[test]
fn test_edit_clear_image() {
    let sb = Sandbox::new();
    sb.add("Bag", "10");

    sb.cmd()
        .args(["edit", "1", "--clear-image"])
        .assert()
        .success();

    sb.cmd()
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No image"));
}

#[test]
fn test_edit_unknown_product_fails() {
    let sb = Sandbox::new();

    sb.cmd()
        .args(["edit", "3", "--name", "Hat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product not found: #3"));
}

#[test]
fn test_delete_is_idempotent() {
    let sb = Sandbox::new();
    sb.add("Bag", "10");
    sb.add("Tote", "20");

    sb.cmd()
        .args(["delete", "1", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Product deleted (#1): Bag"))
        .stdout(predicate::str::contains("No product #9, nothing to delete"));

    sb.cmd()
        .args(["delete", "1"])
        .assert()
        .success();

    sb.cmd()
        .args(["list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tote"))
        .stdout(predicate::str::contains("\"Bag\"").not());
}

#[test]
fn test_ids_are_not_reused_after_delete() {
    let sb = Sandbox::new();
    sb.add("Bag", "10");
    sb.cmd().args(["delete", "1"]).assert().success();

    sb.cmd()
        .args([
            "add",
            "--name",
            "Tote",
            "--price",
            "20",
            "--description",
            "d",
            "--category",
            "c",
            "--image",
            &sb.file("bag.png"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Product added (#2): Tote"));
}

#[test]
fn test_show_unknown_product_fails() {
    let sb = Sandbox::new();

    sb.cmd()
        .args(["show", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product not found: #5"));
}

#[test]
fn test_config_prints_effective_values() {
    let sb = Sandbox::new();
    fs::write(sb.temp.path().join("catalog.toml"), "database_name = \"shop\"\n").unwrap();

    sb.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("database_name = shop"))
        .stdout(predicate::str::contains("shop.json"));

    // Reading configuration does not create a database.
    assert!(!sb.data_dir().join("shop.json").exists());
}

#[test]
fn test_data_dir_flag_overrides_env() {
    let sb = Sandbox::new();
    let other = sb.temp.path().join("elsewhere");

    sb.cmd()
        .args(["init", "--data-dir", other.to_str().unwrap()])
        .assert()
        .success();

    assert!(other.join("productApp.json").exists());
    assert!(!sb.data_dir().join("productApp.json").exists());
}
