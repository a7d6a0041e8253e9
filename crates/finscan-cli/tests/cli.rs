use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use predicates::prelude::*;
use tempfile::TempDir;

const PAYSLIP: &str = "\
EMPLOYEE NAME Jane Doe
EMPLOYEE ID 7781
GROSS WAGES 2,000.00
NET PAY 1,500.00
YTD NET PAY 6,000.00
";

const INVOICE: &str = "\
Invoice #: 5531
Date: 04/02/2024
Desk lamp 25.00 2 50.00
Cable 3.00 5 15.00
Total: 65.00
";

fn finscan() -> Command {
    Command::cargo_bin("finscan").unwrap()
}

fn write_png(path: &Path) {
    let img = GrayImage::from_fn(48, 32, |x, _| if x % 12 < 6 { Luma([30u8]) } else { Luma([220u8]) });
    DynamicImage::ImageLuma8(img)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Temp dir with an image, replay text and an empty config file.
fn fixture(text: &str) -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("doc.png");
    let replay = dir.path().join("doc.txt");
    let config = dir.path().join("config.json");
    write_png(&image);
    fs::write(&replay, text).unwrap();
    fs::write(&config, "{}").unwrap();
    (dir, image, replay, config)
}

#[test]
fn schema_lists_required_invoice_number() {
    finscan()
        .args(["schema", "invoice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice Number"))
        .stdout(predicate::str::contains("required"))
        .stdout(predicate::str::contains("otsu"));
}

#[test]
fn process_payslip_to_csv() {
    let (_dir, image, replay, config) = fixture(PAYSLIP);

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["process", "--category", "payslip", "--format", "csv", "--replay-text"])
        .arg(&replay)
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Field,Value"))
        .stdout(predicate::str::contains("Employee Name,Jane Doe"))
        .stdout(predicate::str::contains("Net Pay,1500.00"))
        .stdout(predicate::str::contains("YTD Net Pay,6000.00"))
        .stdout(predicate::str::contains("Check No,\n"));
}

#[test]
fn process_invoice_to_json() {
    let (_dir, image, replay, config) = fixture(INVOICE);

    let output = finscan()
        .arg("-c")
        .arg(&config)
        .args(["process", "-t", "invoice", "--replay-text"])
        .arg(&replay)
        .arg(&image)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["category"], "invoice");
    assert_eq!(report["fields"][0]["Field"], "Invoice Number");
    assert_eq!(report["fields"][0]["Value"], "5531");
    assert_eq!(report["line_items"].as_array().unwrap().len(), 2);
    assert_eq!(report["line_items"][1]["Description"], "Cable");
}

#[test]
fn process_rejects_invalid_image() {
    let (dir, _image, replay, config) = fixture(PAYSLIP);
    let bogus = dir.path().join("bogus.png");
    fs::write(&bogus, b"definitely not a png").unwrap();

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["process", "-t", "payslip", "--replay-text"])
        .arg(&replay)
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed at preprocessing"));
}

#[test]
fn process_invoice_without_items_fails() {
    let (_dir, image, replay, config) = fixture("Invoice #: 12\nTotal: 10.00\n");

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["process", "-t", "invoice", "--replay-text"])
        .arg(&replay)
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed at extracting"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let (dir, image, replay, config) = fixture(PAYSLIP);
    fs::copy(&image, dir.path().join("second.png")).unwrap();
    let out = dir.path().join("out");
    let pattern = format!("{}/*.png", dir.path().display());

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["batch", &pattern, "-t", "payslip", "--summary", "-j", "2", "--replay-text"])
        .arg(&replay)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("doc.json").exists());
    assert!(out.join("second.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status"));
    assert_eq!(summary.matches(",success,").count(), 2);
}

#[test]
fn batch_failure_keeps_earlier_outputs() {
    let (dir, _image, replay, config) = fixture(PAYSLIP);
    fs::write(dir.path().join("zz_bad.png"), b"not an image").unwrap();
    let out = dir.path().join("out");
    let pattern = format!("{}/*.png", dir.path().display());

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["batch", &pattern, "-t", "payslip", "-j", "1", "--replay-text"])
        .arg(&replay)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("zz_bad.png"));

    assert!(out.join("doc.json").exists());
    assert!(!out.join("zz_bad.json").exists());
}

#[test]
fn config_init_get_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    finscan().arg("-c").arg(&config).args(["config", "init"]).assert().success();
    assert!(config.exists());

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "ocr.oem"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "ocr.engine", "onnx"])
        .assert()
        .success();
    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"onnx\""));

    // Even kernel sizes are rejected and the file is left unchanged
    finscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "preprocessing.denoise_kernel", "4"])
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&config).unwrap(), saved);

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "ocr.no_such_key", "1"])
        .assert()
        .failure();

    finscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "preprocessing.denoise_kernel", "4294967295"])
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&config).unwrap(), saved);
}
