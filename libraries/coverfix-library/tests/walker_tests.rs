//! Integration tests for the library walker
//!
//! Builds small library trees out of synthetic audio files and checks the
//! covers left behind.

use coverfix_artwork::test_utils::{
    flac_file, m4a_file, ogg_with_picture_values, picture_comment_value, write_mp3, OggCodec,
};
use coverfix_library::{
    CoverFixer, ExistingCoverPolicy, FixerConfig, FolderOutcome, LibraryError, StagingArea,
    STAGING_DIR_NAME,
};
use image::{ColorType, DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt().with_test_writer().init();
    });
}

struct Fixture {
    library: TempDir,
    scratch: TempDir,
}

impl Fixture {
    fn new() -> Self {
        init_tracing();
        Self {
            library: TempDir::new().unwrap(),
            scratch: TempDir::new().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.library.path()
    }

    fn folder(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn staging(&self) -> StagingArea {
        StagingArea::in_dir(self.scratch.path())
    }

    fn staging_dir(&self) -> PathBuf {
        self.scratch.path().join(STAGING_DIR_NAME)
    }
}

fn image_bytes(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, [200, 30, 30], ImageFormat::Png)
}

fn assert_canonical_cover(folder: &Path) {
    let bytes = fs::read(folder.join("cover.jpg")).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);

    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 300));
    assert_eq!(decoded.color(), ColorType::Rgb8);
}

fn fixer() -> CoverFixer {
    CoverFixer::new(FixerConfig::default()).unwrap()
}

#[test]
fn mp3_cover_is_extracted_and_tags_left_alone() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    let track = album.join("track.mp3");
    write_mp3(&track, Some(("image/png", &png(800, 600)))).unwrap();
    let before = fs::read(&track).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_canonical_cover(&album);
    assert_eq!(fs::read(&track).unwrap(), before);
    assert_eq!(summary.visited, 2);
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.no_art, 1);
    assert!(summary.failures.is_empty());
    assert!(!fx.staging_dir().exists());
}

#[test]
fn flac_and_m4a_covers_are_extracted() {
    let fx = Fixture::new();
    let flac_album = fx.folder("Artist/FLAC Album");
    let m4a_album = fx.folder("Artist/M4A Album");
    fs::write(flac_album.join("01.flac"), flac_file(&[("image/png", &png(640, 640))])).unwrap();
    fs::write(
        m4a_album.join("01.m4a"),
        m4a_file(13, &image_bytes(250, 250, [0, 0, 200], ImageFormat::Jpeg)),
    )
    .unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_canonical_cover(&flac_album);
    assert_canonical_cover(&m4a_album);
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.visited, 4);
}

#[test]
fn ogg_skips_invalid_picture_entries() {
    let fx = Fixture::new();
    let album = fx.folder("Opus Album");
    let values = vec![
        "not base64 at all!".to_string(),
        picture_comment_value("image/png", &png(120, 90)),
    ];
    fs::write(album.join("01.opus"), ogg_with_picture_values(OggCodec::Opus, &values)).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_canonical_cover(&album);
    assert_eq!(summary.extracted, 1);
}

#[test]
fn first_file_by_name_wins() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    write_mp3(
        &album.join("b.mp3"),
        Some(("image/png", &image_bytes(64, 64, [0, 0, 255], ImageFormat::Png))),
    )
    .unwrap();
    fs::write(
        album.join("a.flac"),
        flac_file(&[("image/png", &image_bytes(64, 64, [255, 0, 0], ImageFormat::Png))]),
    )
    .unwrap();

    let mut sources = Vec::new();
    fixer()
        .run_with_progress(fx.root(), fx.staging(), |report| {
            if let FolderOutcome::Extracted { source } = &report.outcome {
                sources.push(source.clone());
            }
        })
        .unwrap();

    assert_eq!(sources, vec![album.join("a.flac")]);
    let cover = image::open(album.join("cover.jpg")).unwrap().to_rgb8();
    let pixel = cover.get_pixel(150, 150);
    assert!(pixel[0] > 200 && pixel[2] < 60, "expected red, got {:?}", pixel);
}

#[test]
fn empty_folder_is_counted() {
    let fx = Fixture::new();
    let empty = fx.folder("Empty");

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_eq!(summary.visited, 2);
    assert_eq!(summary.no_art, 2);
    assert!(!empty.join("cover.jpg").exists());
}

#[test]
fn audio_without_art_produces_nothing() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    write_mp3(&album.join("01.mp3"), None).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert!(!album.join("cover.jpg").exists());
    assert_eq!(summary.no_art, 2);
}

#[test]
fn reserved_directory_pruned_at_any_depth() {
    let fx = Fixture::new();
    let nested = fx.folder("Artist/.rockbox/Inner");
    write_mp3(&nested.join("01.mp3"), Some(("image/png", &png(100, 100)))).unwrap();
    let top = fx.folder(".rockbox");
    write_mp3(&top.join("01.mp3"), Some(("image/png", &png(100, 100)))).unwrap();

    let mut visited = Vec::new();
    let summary = fixer()
        .run_with_progress(fx.root(), fx.staging(), |report| visited.push(report.folder.clone()))
        .unwrap();

    assert_eq!(visited, vec![fx.root().to_path_buf(), fx.root().join("Artist")]);
    assert_eq!(summary.visited, 2);
    assert!(!nested.join("cover.jpg").exists());
    assert!(!top.join("cover.jpg").exists());
}

#[test]
fn existing_cover_is_renormalized() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    fs::write(album.join("cover.jpg"), png(500, 400)).unwrap();
    write_mp3(&album.join("01.mp3"), Some(("image/png", &png(50, 50)))).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_canonical_cover(&album);
    assert_eq!(summary.renormalized, 1);
    assert_eq!(summary.extracted, 0);

    // a second pass keeps the cover canonical
    let summary = fixer().run(fx.root(), fx.staging()).unwrap();
    assert_canonical_cover(&album);
    assert_eq!(summary.renormalized, 1);
}

#[test]
fn empty_cover_is_replaced_from_audio() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    fs::write(album.join("cover.jpg"), b"").unwrap();
    write_mp3(&album.join("01.mp3"), Some(("image/png", &png(80, 80)))).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_canonical_cover(&album);
    assert_eq!(summary.extracted, 1);
}

#[test]
fn skip_canonical_policy_leaves_cover_alone() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    fs::write(album.join("cover.jpg"), png(640, 480)).unwrap();
    fixer().run(fx.root(), fx.staging()).unwrap();
    let canonical = fs::read(album.join("cover.jpg")).unwrap();

    let config = FixerConfig {
        existing_cover_policy: ExistingCoverPolicy::SkipCanonical,
        ..FixerConfig::default()
    };
    let summary = CoverFixer::new(config).unwrap().run(fx.root(), fx.staging()).unwrap();

    assert_eq!(summary.skipped_canonical, 1);
    assert_eq!(summary.renormalized, 0);
    assert_eq!(fs::read(album.join("cover.jpg")).unwrap(), canonical);
}

#[test]
fn corrupt_existing_cover_is_reported_and_untouched() {
    let fx = Fixture::new();
    let broken = fx.folder("Broken");
    let good = fx.folder("Good");
    fs::write(broken.join("cover.jpg"), b"garbage").unwrap();
    write_mp3(&good.join("01.mp3"), Some(("image/png", &png(64, 64)))).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert_eq!(fs::read(broken.join("cover.jpg")).unwrap(), b"garbage");
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].folder, broken);
    assert!(matches!(summary.failures[0].error, LibraryError::Normalize(_)));
    assert_eq!(summary.visited, 3);
    assert_canonical_cover(&good);
}

#[test]
fn corrupt_embedded_picture_leaves_no_cover_and_no_staging() {
    let fx = Fixture::new();
    let album = fx.folder("Album");
    write_mp3(&album.join("01.mp3"), Some(("image/jpeg", b"not really a jpeg"))).unwrap();

    let summary = fixer().run(fx.root(), fx.staging()).unwrap();

    assert!(!album.join("cover.jpg").exists());
    assert_eq!(summary.failures.len(), 1);
    assert!(!fx.staging_dir().exists());
}

#[test]
fn interruption_stops_walk_and_clears_staging() {
    let fx = Fixture::new();
    for name in ["A", "B", "C"] {
        let folder = fx.folder(name);
        write_mp3(&folder.join("01.mp3"), Some(("image/png", &png(64, 64)))).unwrap();
    }

    let fixer = fixer();
    let cancel = fixer.cancel_flag();
    let summary = fixer
        .run_with_progress(fx.root(), fx.staging(), |report| {
            if report.folder.ends_with("A") {
                cancel.store(true, Ordering::SeqCst);
            }
        })
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.visited, 2);
    assert_eq!(summary.extracted, 1);
    assert!(!fx.root().join("B/cover.jpg").exists());
    assert!(!fx.staging_dir().exists());
    assert!(summary.cleanup_error.is_none());
}

#[test]
fn cancelled_before_start_visits_nothing() {
    let fx = Fixture::new();
    fx.folder("Album");

    let fixer = fixer();
    fixer.cancel_flag().store(true, Ordering::SeqCst);
    let summary = fixer.run(fx.root(), fx.staging()).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.visited, 0);
}

#[test]
fn missing_root_is_fatal() {
    let fx = Fixture::new();
    let result = fixer().run(&fx.root().join("missing"), fx.staging());

    assert!(matches!(result, Err(LibraryError::RootNotFound(_))));
    assert!(!fx.staging_dir().exists());
}
