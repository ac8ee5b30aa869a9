//! End-to-end pipeline tests: real imaging adapter, scripted editors.
//!
//! The editor is the only collaborator replaced with a test double here -
//! everything else is the production wiring.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GenericImageView, ImageEncoder, Rgb, RgbImage};

use idphoto_core::application::PhotoPipeline;
use idphoto_core::domain::{BackgroundSource, EncodedImage, FocalStrategy, SourceImage};
use idphoto_core::error::AppError;
use idphoto_core::port::background_editor::{BackgroundEditor, EditError};
use idphoto_core::port::image_transformer::{CropParams, ImageTransformer};
use idphoto_core::port::time_provider::mocks::MockTimeProvider;
use idphoto_infra_imaging::ImagingBackend;

/// Gradient portrait stand-in encoded as JPEG.
fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut Cursor::new(&mut out), 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

enum Step {
    Fail,
    Succeed { width: u32, height: u32 },
}

/// Editor double that replays a script; after the script runs out every
/// further attempt fails. Successes return genuinely decodable JPEG bytes
/// so the real crop step downstream has something to chew on.
struct ScriptedEditor {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<usize>,
}

impl ScriptedEditor {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(0),
        }
    }

    fn always_failing() -> Self {
        Self::new(Vec::new())
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BackgroundEditor for ScriptedEditor {
    async fn replace_background(
        &self,
        _image: &EncodedImage,
        _instruction: &str,
    ) -> Result<EncodedImage, EditError> {
        *self.calls.lock().unwrap() += 1;

        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Succeed { width, height }) => Ok(EncodedImage {
                bytes: test_jpeg(width, height),
                mime: "image/jpeg".to_string(),
                width,
                height,
            }),
            Some(Step::Fail) | None => Err(EditError::Transport("editor down".to_string())),
        }
    }
}

fn pipeline(editor: Arc<ScriptedEditor>, time: Arc<MockTimeProvider>) -> PhotoPipeline {
    PhotoPipeline::with_defaults(Arc::new(ImagingBackend::new()), editor, time)
}

#[tokio::test]
async fn dead_editor_still_yields_a_spec_sized_photo() {
    let editor = Arc::new(ScriptedEditor::always_failing());
    let time = Arc::new(MockTimeProvider::default());

    let artifact = pipeline(editor.clone(), time.clone())
        .generate(SourceImage::new(
            test_jpeg(1600, 1200),
            Some("image/jpeg".to_string()),
        ))
        .await
        .unwrap();

    // Exactly 3 attempts with strictly increasing delays, none after the last
    assert_eq!(editor.calls(), 3);
    assert_eq!(time.recorded_sleeps(), vec![2_000, 4_000]);

    assert_eq!(artifact.background, BackgroundSource::Composite);
    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (413, 531));
}

#[tokio::test]
async fn editor_success_on_second_attempt_stops_retrying() {
    let editor = Arc::new(ScriptedEditor::new(vec![
        Step::Fail,
        Step::Succeed {
            width: 900,
            height: 900,
        },
    ]));
    let time = Arc::new(MockTimeProvider::default());

    let artifact = pipeline(editor.clone(), time.clone())
        .generate(SourceImage::new(test_jpeg(1200, 900), None))
        .await
        .unwrap();

    assert_eq!(editor.calls(), 2);
    assert_eq!(time.recorded_sleeps(), vec![2_000]);
    assert_eq!(artifact.background, BackgroundSource::Edited);

    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (413, 531));
}

#[tokio::test]
async fn final_crop_is_idempotent_on_pipeline_output() {
    let editor = Arc::new(ScriptedEditor::always_failing());
    let time = Arc::new(MockTimeProvider::default());

    let artifact = pipeline(editor, time)
        .generate(SourceImage::new(test_jpeg(1000, 800), None))
        .await
        .unwrap();

    // Feeding the output back through Step 3 alone must not change geometry
    let backend = ImagingBackend::new();
    let recropped = backend
        .cover_crop(
            &EncodedImage {
                bytes: artifact.bytes.clone(),
                mime: artifact.mime.clone(),
                width: artifact.width,
                height: artifact.height,
            },
            &CropParams {
                width: 413,
                height: 531,
                focal: FocalStrategy::Attention,
                jpeg_quality: 95,
            },
        )
        .await
        .unwrap();

    assert_eq!((recropped.width, recropped.height), (413, 531));
}

#[tokio::test]
async fn garbage_upload_fails_before_any_editor_call() {
    let editor = Arc::new(ScriptedEditor::always_failing());
    let time = Arc::new(MockTimeProvider::default());

    let err = pipeline(editor.clone(), time)
        .generate(SourceImage::new(
            b"this is not an image".to_vec(),
            Some("image/jpeg".to_string()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(editor.calls(), 0);
}
