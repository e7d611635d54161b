use predicates::prelude::*;
use test_support::{cmd_bin, incidents_server, read_fixture_text, BIN};

fn render_with(extra: &[&str]) -> Vec<u8> {
  let server = incidents_server(&read_fixture_text("incidents.json"));
  let out = cmd_bin(BIN)
    .args(["--endpoint", &server.base_url(), "--from", "2024-03-04", "--to", "2024-03-10"])
    .args(extra)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  out.stdout
}

fn render(format: &str) -> Vec<u8> {
  render_with(&["--output", format])
}

#[test]
fn png_is_default_image_encoding() {
  let bytes = render_with(&[]);
  assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
  assert_eq!(bytes, render("png"));
}

#[test]
fn png_decodes_to_standard_geometry() {
  // One Monday-start week: margins 90+90, left text 300, top text 200, 350px boxes.
  let bytes = render("png");
  assert_eq!(png_dimensions(&bytes), (90 + 300 + 350 + 90, 90 + 200 + 7 * 350 + 90));
}

#[test]
fn jpeg_and_gif_encode_to_stdout() {
  assert!(render("jpeg").starts_with(&[0xFF, 0xD8, 0xFF]));
  assert!(render("gif").starts_with(b"GIF89a"));
}

#[test]
fn svg_marks_each_day_in_window() {
  let doc = String::from_utf8(render("svg")).unwrap();
  assert!(doc.starts_with("<svg"));
  assert_eq!(doc.matches("<title>").count(), 7);
  assert!(doc.contains("<title>2024-03-05: 25 min</title>"));
  assert!(doc.contains("<title>2024-03-06: 0 min</title>"));
  assert!(doc.contains("font-family=\"DejaVu Sans, sans-serif\""));
  assert!(doc.contains(">Mar</text>"));
}

#[test]
fn multi_year_raster_is_refused() {
  let server = incidents_server(&read_fixture_text("incidents.json"));

  cmd_bin(BIN)
    .args(["--endpoint", &server.base_url(), "--from", "2000-01-01", "--to", "2024-12-31", "--output", "png"])
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::starts_with("error: ").and(predicate::str::contains("image too large")));
}

#[test]
fn multi_year_svg_still_renders() {
  let server = incidents_server(&read_fixture_text("incidents.json"));

  cmd_bin(BIN)
    .args(["--endpoint", &server.base_url(), "--from", "2022-01-01", "--to", "2024-12-31", "--output", "svg"])
    .assert()
    .success()
    .stdout(predicate::str::contains("<title>2024-03-05: 25 min</title>"));
}

/// Width and height from the IHDR chunk.
fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
  let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
  let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
  (w, h)
}
