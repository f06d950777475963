//! End-to-end runs of the normalization pipeline on real image files.

use image::{ImageEncoder, Rgb, RgbImage};
use imgseq::collect::OrderingPolicy;
use imgseq::config::NormalizeConfig;
use imgseq::process::{FailureKind, ProcessEvent, RunError, process};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let file = fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 64]));
    let file = fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn config_with(order: OrderingPolicy) -> NormalizeConfig {
    let mut config = NormalizeConfig::default();
    config.collect.order = order;
    config
}

fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn dimensions(path: &Path) -> (u32, u32) {
    let img = image::open(path).unwrap();
    (img.width(), img.height())
}

fn id_to_source(summary: &imgseq::process::RunSummary) -> Vec<(u32, PathBuf)> {
    summary
        .processed
        .iter()
        .map(|p| (p.id, p.source.clone()))
        .collect()
}

#[test]
fn caption_follows_its_image() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("a.png"), 4, 4, [0, 0, 0]);
    write_jpeg(&src.path().join("cat.jpg"), 16, 8);
    fs::write(src.path().join("cat.txt"), "a cat").unwrap();

    let summary = process(
        src.path(),
        out.path(),
        &config_with(OrderingPolicy::File),
        None,
    )
    .unwrap();

    assert_eq!(summary.processed.len(), 2);
    assert_eq!(output_names(out.path()), vec!["1.png", "2.png", "2.txt"]);
    assert_eq!(fs::read_to_string(out.path().join("2.txt")).unwrap(), "a cat");
    assert_eq!(dimensions(&out.path().join("2.png")), (16, 8));
}

#[test]
fn corrupt_file_consumes_no_number() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("file1.png"), 3, 3, [10, 10, 10]);
    fs::write(src.path().join("file2.png"), b"definitely not a png").unwrap();
    write_png(&src.path().join("file3.png"), 5, 5, [20, 20, 20]);

    let (tx, rx) = std::sync::mpsc::channel();
    let summary = process(
        src.path(),
        out.path(),
        &config_with(OrderingPolicy::File),
        Some(tx),
    )
    .unwrap();

    assert_eq!(output_names(out.path()), vec!["1.png", "2.png"]);
    assert!(summary.processed[0].source.ends_with("file1.png"));
    assert!(summary.processed[1].source.ends_with("file3.png"));
    assert_eq!(dimensions(&out.path().join("2.png")), (5, 5));

    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].source.ends_with("file2.png"));
    assert_eq!(summary.failures[0].error.kind(), FailureKind::Decode);

    let failed: Vec<PathBuf> = rx
        .iter()
        .filter_map(|event| match event {
            ProcessEvent::ItemFailed { source, .. } => Some(source),
            _ => None,
        })
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].ends_with("file2.png"));
}

#[test]
fn file_order_runs_are_repeatable() {
    let src = TempDir::new().unwrap();
    write_png(&src.path().join("b/zeta.png"), 2, 2, [1, 2, 3]);
    write_png(&src.path().join("a/Beta.png"), 2, 2, [1, 2, 3]);
    write_png(&src.path().join("alpha.png"), 2, 2, [1, 2, 3]);

    let config = config_with(OrderingPolicy::File);
    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();
    let first = process(src.path(), first_out.path(), &config, None).unwrap();
    let second = process(src.path(), second_out.path(), &config, None).unwrap();

    assert_eq!(id_to_source(&first), id_to_source(&second));
    let names: Vec<String> = first
        .processed
        .iter()
        .map(|p| p.source.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["alpha.png", "Beta.png", "zeta.png"]);
}

#[test]
fn rerun_into_same_directory_overwrites() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("one.png"), 2, 2, [0, 0, 0]);
    let config = config_with(OrderingPolicy::File);

    process(src.path(), out.path(), &config, None).unwrap();
    let summary = process(src.path(), out.path(), &config, None).unwrap();

    assert_eq!(summary.processed[0].id, 1);
    assert_eq!(output_names(out.path()), vec!["1.png"]);
}

#[test]
fn rerun_after_tree_change_drops_old_outputs() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("a.png"), 2, 2, [0, 0, 0]);
    fs::write(src.path().join("a.txt"), "caption of a").unwrap();
    write_png(&src.path().join("b.png"), 2, 2, [9, 9, 9]);
    let config = config_with(OrderingPolicy::File);

    process(src.path(), out.path(), &config, None).unwrap();
    assert_eq!(output_names(out.path()), vec!["1.png", "1.txt", "2.png"]);

    fs::remove_file(src.path().join("a.txt")).unwrap();
    fs::remove_file(src.path().join("b.png")).unwrap();
    let summary = process(src.path(), out.path(), &config, None).unwrap();

    assert_eq!(summary.processed.len(), 1);
    assert_eq!(summary.captions_copied(), 0);
    assert_eq!(output_names(out.path()), vec!["1.png"]);
}

#[test]
fn square_padding_centers_image_on_white() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("wide.png"), 80, 40, [200, 0, 0]);

    let mut config = config_with(OrderingPolicy::File);
    config.resize.width = Some(40);
    config.resize.square = true;
    process(src.path(), out.path(), &config, None).unwrap();

    let img = image::open(out.path().join("1.png")).unwrap().into_rgb8();
    assert_eq!(img.dimensions(), (40, 40));
    // 40x20 pasted at y = 10: white bands above and below
    assert_eq!(img.get_pixel(20, 2), &Rgb([255, 255, 255]));
    assert_eq!(img.get_pixel(20, 37), &Rgb([255, 255, 255]));
    let center = img.get_pixel(20, 20);
    assert!(center[0] > 150 && center[1] < 50, "center was {center:?}");
}

#[test]
fn both_dimensions_stretch() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_jpeg(&src.path().join("p.jpg"), 60, 30);

    let mut config = config_with(OrderingPolicy::File);
    config.resize.width = Some(20);
    config.resize.height = Some(50);
    process(src.path(), out.path(), &config, None).unwrap();

    assert_eq!(dimensions(&out.path().join("1.png")), (20, 50));
}

#[test]
fn height_only_keeps_aspect_ratio() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("p.png"), 30, 60, [5, 5, 5]);

    let mut config = config_with(OrderingPolicy::File);
    config.resize.height = Some(20);
    process(src.path(), out.path(), &config, None).unwrap();

    assert_eq!(dimensions(&out.path().join("1.png")), (10, 20));
}

#[test]
fn longest_side_cap_never_enlarges() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("a_big.png"), 100, 50, [5, 5, 5]);
    write_png(&src.path().join("b_small.png"), 10, 6, [5, 5, 5]);

    let mut config = config_with(OrderingPolicy::File);
    config.resize.max_side = Some(40);
    process(src.path(), out.path(), &config, None).unwrap();

    assert_eq!(dimensions(&out.path().join("1.png")), (40, 20));
    assert_eq!(dimensions(&out.path().join("2.png")), (10, 6));
}

#[test]
fn every_order_writes_the_same_sources() {
    let src = TempDir::new().unwrap();
    write_png(&src.path().join("x.png"), 2, 2, [0, 0, 0]);
    write_png(&src.path().join("sub/y.png"), 2, 2, [0, 0, 0]);
    write_jpeg(&src.path().join("sub/deeper/z.jpg"), 8, 8);
    fs::write(src.path().join("sub/notes.txt"), "not an image").unwrap();

    let mut sets = Vec::new();
    for order in [
        OrderingPolicy::Folder,
        OrderingPolicy::File,
        OrderingPolicy::Random,
    ] {
        let out = TempDir::new().unwrap();
        let summary = process(src.path(), out.path(), &config_with(order), None).unwrap();
        let ids: Vec<u32> = summary.processed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        sets.push(
            summary
                .processed
                .into_iter()
                .map(|p| p.source)
                .collect::<HashSet<_>>(),
        );
    }
    assert_eq!(sets[0], sets[1]);
    assert_eq!(sets[1], sets[2]);
}

#[test]
fn folder_order_takes_parent_files_first() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_png(&src.path().join("top.png"), 2, 2, [0, 0, 0]);
    write_png(&src.path().join("nested/inner.png"), 2, 2, [0, 0, 0]);

    let summary = process(
        src.path(),
        out.path(),
        &config_with(OrderingPolicy::Folder),
        None,
    )
    .unwrap();
    assert!(summary.processed[0].source.ends_with("top.png"));
    assert!(summary.processed[1].source.ends_with("nested/inner.png"));
}

#[test]
fn transparent_png_is_flattened_to_rgb() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = src.path().join("alpha.png");
    let img = image::RgbaImage::from_pixel(6, 6, image::Rgba([0, 0, 255, 128]));
    img.save(&path).unwrap();

    process(
        src.path(),
        out.path(),
        &config_with(OrderingPolicy::File),
        None,
    )
    .unwrap();

    let written = image::open(out.path().join("1.png")).unwrap();
    assert_eq!(written.color(), image::ColorType::Rgb8);
}

#[test]
fn unwritable_output_directory_is_fatal() {
    let src = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    write_png(&src.path().join("a.png"), 2, 2, [0, 0, 0]);
    let blocker = scratch.path().join("plain-file");
    fs::write(&blocker, b"x").unwrap();

    let result = process(
        src.path(),
        &blocker.join("out"),
        &config_with(OrderingPolicy::File),
        None,
    );
    assert!(matches!(result, Err(RunError::OutputDir { .. })));
}
