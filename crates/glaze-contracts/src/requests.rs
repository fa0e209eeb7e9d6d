use std::collections::BTreeMap;

use crate::attachments::{AudioAttachment, ImageAttachment};
use crate::error::ValidationError;
use crate::fields::{
    AspectRatio, AudioFormat, GenerationMode, ModelKind, OutputFormat, RemeshMode, Sd35Model,
    StylePreset, TextureResolution,
};

const MAX_PROMPT_CHARS: usize = 10_000;
const MAX_SEED: u32 = 2_147_483_647;

/// Stable Image Core: text-to-image with no model knobs.
#[derive(Debug, Clone, Default)]
pub struct CoreRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    pub output_format: Option<OutputFormat>,
    pub style_preset: Option<StylePreset>,
    pub seed: Option<u32>,
}

/// Stable Diffusion 3.5: text-to-image or image-to-image depending on mode.
#[derive(Debug, Clone)]
pub struct Sd35Request {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub mode: GenerationMode,
    pub model: Sd35Model,
    /// Only meaningful in text-to-image mode; silently dropped otherwise.
    pub aspect_ratio: Option<AspectRatio>,
    /// Required in image-to-image mode, ignored in text-to-image mode.
    pub strength: Option<f64>,
    /// Required in image-to-image mode, ignored in text-to-image mode.
    pub image: Option<ImageAttachment>,
    pub output_format: Option<OutputFormat>,
    pub style_preset: Option<StylePreset>,
    pub seed: Option<u32>,
}

impl Default for Sd35Request {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: None,
            mode: GenerationMode::TextToImage,
            model: Sd35Model::Large,
            aspect_ratio: None,
            strength: None,
            image: None,
            output_format: None,
            style_preset: None,
            seed: None,
        }
    }
}

/// Stable Image Ultra: text-to-image with an optional reference image.
#[derive(Debug, Clone, Default)]
pub struct UltraRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    /// Reference image and its influence travel together or not at all.
    pub image: Option<ImageAttachment>,
    pub strength: Option<f64>,
    pub output_format: Option<OutputFormat>,
    pub style_preset: Option<StylePreset>,
    pub seed: Option<u32>,
}

/// Shared shape of the sketch and structure control endpoints.
#[derive(Debug, Clone)]
pub struct ControlRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub image: ImageAttachment,
    pub control_strength: Option<f64>,
    pub output_format: Option<OutputFormat>,
    pub style_preset: Option<StylePreset>,
    pub seed: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct StyleGuideRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub image: ImageAttachment,
    pub fidelity: Option<f64>,
    pub aspect_ratio: Option<AspectRatio>,
    pub output_format: Option<OutputFormat>,
    pub style_preset: Option<StylePreset>,
    pub seed: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct StyleTransferRequest {
    pub init_image: ImageAttachment,
    pub style_image: ImageAttachment,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub style_strength: Option<f64>,
    pub composition_fidelity: Option<f64>,
    /// Floors at 0.1, unlike the other strength knobs.
    pub change_strength: Option<f64>,
    pub output_format: Option<OutputFormat>,
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct TextToAudioRequest {
    pub prompt: String,
    pub duration_seconds: Option<u32>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f64>,
    pub output_format: Option<AudioFormat>,
}

#[derive(Debug, Clone)]
pub struct AudioToAudioRequest {
    pub prompt: String,
    pub audio: AudioAttachment,
    pub duration_seconds: Option<u32>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f64>,
    pub output_format: Option<AudioFormat>,
}

#[derive(Debug, Clone)]
pub struct Fast3dRequest {
    pub image: ImageAttachment,
    pub texture_resolution: Option<TextureResolution>,
    pub foreground_ratio: Option<f64>,
    pub remesh: Option<RemeshMode>,
    /// -1 means "no limit", the remote's own sentinel.
    pub vertex_count: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct PointAware3dRequest {
    pub image: ImageAttachment,
    pub texture_resolution: Option<TextureResolution>,
    pub foreground_ratio: Option<f64>,
    pub remesh: Option<RemeshMode>,
    pub vertex_count: Option<i32>,
    pub guidance_scale: Option<f64>,
}

/// The closed union over every generation/control mode this client knows.
///
/// One struct per mode keeps the per-mode field contract in the type system
/// instead of in a bag of optional keyword arguments: a field a mode does
/// not support cannot be supplied at all.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Core(CoreRequest),
    Sd35(Sd35Request),
    Ultra(UltraRequest),
    Sketch(ControlRequest),
    Structure(ControlRequest),
    StyleGuide(StyleGuideRequest),
    StyleTransfer(StyleTransferRequest),
    TextToAudio(TextToAudioRequest),
    AudioToAudio(AudioToAudioRequest),
    Fast3d(Fast3dRequest),
    PointAware3d(PointAware3dRequest),
}

/// One binary file part of an outgoing multipart body.
#[derive(Debug, Clone)]
pub struct BinaryPart {
    pub name: &'static str,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl BinaryPart {
    fn from_image(name: &'static str, image: ImageAttachment) -> Self {
        let mime = image.mime().trim().to_ascii_lowercase();
        Self {
            name,
            bytes: image.into_bytes(),
            mime,
        }
    }

    fn from_audio(audio: AudioAttachment) -> Self {
        let mime = audio.mime().trim().to_ascii_lowercase();
        Self {
            name: "audio",
            bytes: audio.into_bytes(),
            mime,
        }
    }
}

/// A validated request, reduced to exactly what goes on the wire: scalar
/// form fields plus named binary parts. Fields that resolved to nothing are
/// absent entirely — the remote distinguishes "absent" from "empty".
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub kind: ModelKind,
    pub fields: BTreeMap<String, String>,
    pub binaries: Vec<BinaryPart>,
}

impl GenerationRequest {
    pub fn kind(&self) -> ModelKind {
        match self {
            GenerationRequest::Core(_) => ModelKind::Core,
            GenerationRequest::Sd35(_) => ModelKind::Sd35,
            GenerationRequest::Ultra(_) => ModelKind::Ultra,
            GenerationRequest::Sketch(_) => ModelKind::Sketch,
            GenerationRequest::Structure(_) => ModelKind::Structure,
            GenerationRequest::StyleGuide(_) => ModelKind::StyleGuide,
            GenerationRequest::StyleTransfer(_) => ModelKind::StyleTransfer,
            GenerationRequest::TextToAudio(_) => ModelKind::TextToAudio,
            GenerationRequest::AudioToAudio(_) => ModelKind::AudioToAudio,
            GenerationRequest::Fast3d(_) => ModelKind::Fast3d,
            GenerationRequest::PointAware3d(_) => ModelKind::PointAware3d,
        }
    }

    /// Validates the request and reduces it to its wire form.
    ///
    /// Coercion order is fixed: trim strings, check enum membership (done
    /// structurally by the closed field enums), check numeric ranges, apply
    /// cross-field rules, then fill defaults for anything left unset.
    /// Attachments are validated here, before any network activity.
    pub fn normalize(self) -> Result<NormalizedRequest, ValidationError> {
        let kind = self.kind();
        let mut fields = BTreeMap::new();
        let mut binaries = Vec::new();

        match self {
            GenerationRequest::Core(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                insert_optional(&mut fields, "negative_prompt", optional_text("negative_prompt", req.negative_prompt)?);
                insert(
                    &mut fields,
                    "aspect_ratio",
                    req.aspect_ratio.unwrap_or(AspectRatio::Square).as_str(),
                );
                insert(
                    &mut fields,
                    "output_format",
                    req.output_format.unwrap_or(OutputFormat::Png).as_str(),
                );
                insert_optional(&mut fields, "style_preset", req.style_preset.map(|p| p.as_str().to_string()));
                insert_seed(&mut fields, req.seed)?;
            }
            GenerationRequest::Sd35(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                insert_optional(&mut fields, "negative_prompt", optional_text("negative_prompt", req.negative_prompt)?);
                insert(&mut fields, "mode", req.mode.as_str());
                insert(&mut fields, "model", req.model.as_str());
                match req.mode {
                    GenerationMode::TextToImage => {
                        // strength/image have no meaning here and are
                        // dropped the way the remote's own contract does.
                        insert(
                            &mut fields,
                            "aspect_ratio",
                            req.aspect_ratio.unwrap_or(AspectRatio::Square).as_str(),
                        );
                    }
                    GenerationMode::ImageToImage => {
                        let image = req.image.ok_or_else(|| {
                            ValidationError::new("image", "image-to-image mode requires an input image")
                        })?;
                        image.validate("image")?;
                        let strength = req.strength.ok_or_else(|| {
                            ValidationError::new("strength", "image-to-image mode requires strength")
                        })?;
                        check_range("strength", strength, 0.0, 1.0)?;
                        insert(&mut fields, "strength", format_number(strength));
                        binaries.push(BinaryPart::from_image("image", image));
                        // A supplied aspect_ratio is ignored in this mode.
                    }
                }
                insert(
                    &mut fields,
                    "output_format",
                    req.output_format.unwrap_or(OutputFormat::Png).as_str(),
                );
                insert_optional(&mut fields, "style_preset", req.style_preset.map(|p| p.as_str().to_string()));
                insert_seed(&mut fields, req.seed)?;
            }
            GenerationRequest::Ultra(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                insert_optional(&mut fields, "negative_prompt", optional_text("negative_prompt", req.negative_prompt)?);
                insert(
                    &mut fields,
                    "aspect_ratio",
                    req.aspect_ratio.unwrap_or(AspectRatio::Square).as_str(),
                );
                match (req.image, req.strength) {
                    (Some(image), Some(strength)) => {
                        image.validate("image")?;
                        check_range("strength", strength, 0.0, 1.0)?;
                        insert(&mut fields, "strength", format_number(strength));
                        binaries.push(BinaryPart::from_image("image", image));
                    }
                    (None, None) => {}
                    (Some(_), None) => {
                        return Err(ValidationError::new(
                            "strength",
                            "a reference image requires strength",
                        ));
                    }
                    (None, Some(_)) => {
                        return Err(ValidationError::new(
                            "image",
                            "strength requires a reference image",
                        ));
                    }
                }
                insert(
                    &mut fields,
                    "output_format",
                    req.output_format.unwrap_or(OutputFormat::Png).as_str(),
                );
                insert_optional(&mut fields, "style_preset", req.style_preset.map(|p| p.as_str().to_string()));
                insert_seed(&mut fields, req.seed)?;
            }
            GenerationRequest::Sketch(req) | GenerationRequest::Structure(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                insert_optional(&mut fields, "negative_prompt", optional_text("negative_prompt", req.negative_prompt)?);
                req.image.validate("image")?;
                let control_strength = req.control_strength.unwrap_or(0.7);
                check_range("control_strength", control_strength, 0.0, 1.0)?;
                insert(&mut fields, "control_strength", format_number(control_strength));
                insert(
                    &mut fields,
                    "output_format",
                    req.output_format.unwrap_or(OutputFormat::Png).as_str(),
                );
                insert_optional(&mut fields, "style_preset", req.style_preset.map(|p| p.as_str().to_string()));
                insert_seed(&mut fields, req.seed)?;
                binaries.push(BinaryPart::from_image("image", req.image));
            }
            GenerationRequest::StyleGuide(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                insert_optional(&mut fields, "negative_prompt", optional_text("negative_prompt", req.negative_prompt)?);
                req.image.validate("image")?;
                let fidelity = req.fidelity.unwrap_or(0.5);
                check_range("fidelity", fidelity, 0.0, 1.0)?;
                insert(&mut fields, "fidelity", format_number(fidelity));
                insert(
                    &mut fields,
                    "aspect_ratio",
                    req.aspect_ratio.unwrap_or(AspectRatio::Square).as_str(),
                );
                insert(
                    &mut fields,
                    "output_format",
                    req.output_format.unwrap_or(OutputFormat::Png).as_str(),
                );
                insert_optional(&mut fields, "style_preset", req.style_preset.map(|p| p.as_str().to_string()));
                insert_seed(&mut fields, req.seed)?;
                binaries.push(BinaryPart::from_image("image", req.image));
            }
            GenerationRequest::StyleTransfer(req) => {
                req.init_image.validate("init_image")?;
                req.style_image.validate("style_image")?;
                insert_optional(&mut fields, "prompt", optional_text("prompt", req.prompt)?);
                insert_optional(&mut fields, "negative_prompt", optional_text("negative_prompt", req.negative_prompt)?);
                let style_strength = req.style_strength.unwrap_or(1.0);
                check_range("style_strength", style_strength, 0.0, 1.0)?;
                insert(&mut fields, "style_strength", format_number(style_strength));
                let composition_fidelity = req.composition_fidelity.unwrap_or(0.9);
                check_range("composition_fidelity", composition_fidelity, 0.0, 1.0)?;
                insert(&mut fields, "composition_fidelity", format_number(composition_fidelity));
                let change_strength = req.change_strength.unwrap_or(0.9);
                check_range("change_strength", change_strength, 0.1, 1.0)?;
                insert(&mut fields, "change_strength", format_number(change_strength));
                insert(
                    &mut fields,
                    "output_format",
                    req.output_format.unwrap_or(OutputFormat::Png).as_str(),
                );
                insert_seed(&mut fields, req.seed)?;
                binaries.push(BinaryPart::from_image("init_image", req.init_image));
                binaries.push(BinaryPart::from_image("style_image", req.style_image));
            }
            GenerationRequest::TextToAudio(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                normalize_audio_controls(
                    &mut fields,
                    req.duration_seconds,
                    req.steps,
                    req.cfg_scale,
                    req.output_format,
                )?;
            }
            GenerationRequest::AudioToAudio(req) => {
                insert(&mut fields, "prompt", required_prompt(&req.prompt)?);
                req.audio.validate("audio")?;
                normalize_audio_controls(
                    &mut fields,
                    req.duration_seconds,
                    req.steps,
                    req.cfg_scale,
                    req.output_format,
                )?;
                binaries.push(BinaryPart::from_audio(req.audio));
            }
            GenerationRequest::Fast3d(req) => {
                req.image.validate("image")?;
                normalize_3d_controls(
                    &mut fields,
                    req.texture_resolution,
                    req.foreground_ratio,
                    req.remesh,
                    req.vertex_count,
                )?;
                binaries.push(BinaryPart::from_image("image", req.image));
            }
            GenerationRequest::PointAware3d(req) => {
                req.image.validate("image")?;
                normalize_3d_controls(
                    &mut fields,
                    req.texture_resolution,
                    req.foreground_ratio,
                    req.remesh,
                    req.vertex_count,
                )?;
                let guidance_scale = req.guidance_scale.unwrap_or(3.0);
                check_range("guidance_scale", guidance_scale, 1.0, 10.0)?;
                insert(&mut fields, "guidance_scale", format_number(guidance_scale));
                binaries.push(BinaryPart::from_image("image", req.image));
            }
        }

        Ok(NormalizedRequest {
            kind,
            fields,
            binaries,
        })
    }
}

fn normalize_audio_controls(
    fields: &mut BTreeMap<String, String>,
    duration_seconds: Option<u32>,
    steps: Option<u32>,
    cfg_scale: Option<f64>,
    output_format: Option<AudioFormat>,
) -> Result<(), ValidationError> {
    let duration = duration_seconds.unwrap_or(20);
    if !(1..=190).contains(&duration) {
        return Err(ValidationError::new(
            "duration",
            "duration must be between 1 and 190 seconds",
        ));
    }
    insert(fields, "duration", duration.to_string());
    let steps = steps.unwrap_or(50);
    if !(30..=100).contains(&steps) {
        return Err(ValidationError::new(
            "steps",
            "steps must be between 30 and 100",
        ));
    }
    insert(fields, "steps", steps.to_string());
    let cfg_scale = cfg_scale.unwrap_or(7.0);
    check_range("cfg_scale", cfg_scale, 1.0, 25.0)?;
    insert(fields, "cfg_scale", format_number(cfg_scale));
    insert(
        fields,
        "output_format",
        output_format.unwrap_or(AudioFormat::Mp3).as_str(),
    );
    Ok(())
}

fn normalize_3d_controls(
    fields: &mut BTreeMap<String, String>,
    texture_resolution: Option<TextureResolution>,
    foreground_ratio: Option<f64>,
    remesh: Option<RemeshMode>,
    vertex_count: Option<i32>,
) -> Result<(), ValidationError> {
    insert(
        fields,
        "texture_resolution",
        texture_resolution.unwrap_or(TextureResolution::R1024).as_str(),
    );
    let foreground_ratio = foreground_ratio.unwrap_or(0.85);
    check_range("foreground_ratio", foreground_ratio, 0.1, 2.0)?;
    insert(fields, "foreground_ratio", format_number(foreground_ratio));
    insert(fields, "remesh", remesh.unwrap_or(RemeshMode::None).as_str());
    let vertex_count = vertex_count.unwrap_or(-1);
    if !(-1..=20_000).contains(&vertex_count) {
        return Err(ValidationError::new(
            "vertex_count",
            "vertex_count must be between -1 and 20000",
        ));
    }
    insert(fields, "vertex_count", vertex_count.to_string());
    Ok(())
}

fn required_prompt(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("prompt", "prompt must not be empty"));
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return Err(ValidationError::new(
            "prompt",
            "prompt exceeds 10000 characters",
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; whitespace-only input resolves to absent.
fn optional_text(field: &str, raw: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return Err(ValidationError::new(
            field,
            format!("{field} exceeds 10000 characters"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

fn check_range(field: &str, value: f64, low: f64, high: f64) -> Result<(), ValidationError> {
    if !(low..=high).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("{field} must be between {low} and {high}"),
        ));
    }
    Ok(())
}

fn insert_seed(
    fields: &mut BTreeMap<String, String>,
    seed: Option<u32>,
) -> Result<(), ValidationError> {
    let Some(seed) = seed else {
        return Ok(());
    };
    if seed > MAX_SEED {
        return Err(ValidationError::new(
            "seed",
            "seed must be between 0 and 2147483647",
        ));
    }
    insert(fields, "seed", seed.to_string());
    Ok(())
}

fn insert(fields: &mut BTreeMap<String, String>, key: &str, value: impl Into<String>) {
    fields.insert(key.to_string(), value.into());
}

fn insert_optional(fields: &mut BTreeMap<String, String>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        insert(fields, key, value);
    }
}

fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};

    use super::*;

    fn png_attachment() -> ImageAttachment {
        let img = DynamicImage::ImageRgb8(RgbImage::new(64, 64));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
        ImageAttachment::new(buf.into_inner(), "image/png")
    }

    fn audio_attachment() -> AudioAttachment {
        AudioAttachment::new(vec![0u8; 256], "audio/mpeg")
    }

    #[test]
    fn core_fills_defaults_and_drops_absent_fields() {
        let normalized = GenerationRequest::Core(CoreRequest {
            prompt: "  A sunset  ".to_string(),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");

        assert_eq!(normalized.kind, ModelKind::Core);
        assert_eq!(normalized.fields["prompt"], "A sunset");
        assert_eq!(normalized.fields["aspect_ratio"], "1:1");
        assert_eq!(normalized.fields["output_format"], "png");
        assert!(!normalized.fields.contains_key("negative_prompt"));
        assert!(!normalized.fields.contains_key("style_preset"));
        assert!(!normalized.fields.contains_key("seed"));
        assert!(normalized.binaries.is_empty());
    }

    #[test]
    fn whitespace_prompt_fails_for_every_prompted_variant() {
        let requests = vec![
            GenerationRequest::Core(CoreRequest {
                prompt: "   \n\t ".to_string(),
                ..Default::default()
            }),
            GenerationRequest::Sd35(Sd35Request {
                prompt: " ".to_string(),
                ..Default::default()
            }),
            GenerationRequest::Ultra(UltraRequest {
                prompt: "\t".to_string(),
                ..Default::default()
            }),
            GenerationRequest::Sketch(ControlRequest {
                prompt: " ".to_string(),
                negative_prompt: None,
                image: png_attachment(),
                control_strength: None,
                output_format: None,
                style_preset: None,
                seed: None,
            }),
            GenerationRequest::TextToAudio(TextToAudioRequest {
                prompt: "  ".to_string(),
                ..Default::default()
            }),
        ];
        for request in requests {
            let err = request.normalize().unwrap_err();
            assert_eq!(err.field, "prompt");
            assert_eq!(err.message, "prompt must not be empty");
        }
    }

    #[test]
    fn prompt_length_ceiling() {
        let at_limit = GenerationRequest::Core(CoreRequest {
            prompt: "a".repeat(10_000),
            ..Default::default()
        });
        assert!(at_limit.normalize().is_ok());

        let over = GenerationRequest::Core(CoreRequest {
            prompt: "a".repeat(10_001),
            ..Default::default()
        });
        let err = over.normalize().unwrap_err();
        assert_eq!(err.message, "prompt exceeds 10000 characters");
    }

    #[test]
    fn whitespace_negative_prompt_resolves_to_absent() {
        let normalized = GenerationRequest::Core(CoreRequest {
            prompt: "boat".to_string(),
            negative_prompt: Some("   ".to_string()),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");
        assert!(!normalized.fields.contains_key("negative_prompt"));
    }

    #[test]
    fn seed_range() {
        let at_limit = GenerationRequest::Core(CoreRequest {
            prompt: "boat".to_string(),
            seed: Some(2_147_483_647),
            ..Default::default()
        });
        assert_eq!(
            at_limit.normalize().expect("valid").fields["seed"],
            "2147483647"
        );

        let over = GenerationRequest::Core(CoreRequest {
            prompt: "boat".to_string(),
            seed: Some(2_147_483_648),
            ..Default::default()
        });
        let err = over.normalize().unwrap_err();
        assert_eq!(err.field, "seed");
    }

    #[test]
    fn sd35_text_to_image_defaults_aspect_ratio_and_never_needs_strength() {
        let normalized = GenerationRequest::Sd35(Sd35Request {
            prompt: "a city".to_string(),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["mode"], "text-to-image");
        assert_eq!(normalized.fields["model"], "sd3.5-large");
        assert_eq!(normalized.fields["aspect_ratio"], "1:1");
        assert!(!normalized.fields.contains_key("strength"));
    }

    #[test]
    fn sd35_image_to_image_requires_image() {
        let err = GenerationRequest::Sd35(Sd35Request {
            prompt: "a painting".to_string(),
            mode: GenerationMode::ImageToImage,
            strength: Some(0.8),
            ..Default::default()
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "image");
    }

    #[test]
    fn sd35_image_to_image_requires_strength() {
        let err = GenerationRequest::Sd35(Sd35Request {
            prompt: "a painting".to_string(),
            mode: GenerationMode::ImageToImage,
            image: Some(png_attachment()),
            ..Default::default()
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "strength");
    }

    #[test]
    fn sd35_image_to_image_drops_supplied_aspect_ratio() {
        let normalized = GenerationRequest::Sd35(Sd35Request {
            prompt: "a painting".to_string(),
            mode: GenerationMode::ImageToImage,
            image: Some(png_attachment()),
            strength: Some(0.8),
            aspect_ratio: Some(AspectRatio::Landscape16x9),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");
        assert!(!normalized.fields.contains_key("aspect_ratio"));
        assert_eq!(normalized.fields["strength"], "0.8");
        assert_eq!(normalized.binaries.len(), 1);
        assert_eq!(normalized.binaries[0].name, "image");
    }

    #[test]
    fn strength_boundaries_accepted_and_exceeded_rejected() {
        for strength in [0.0, 1.0] {
            let ok = GenerationRequest::Sd35(Sd35Request {
                prompt: "p".to_string(),
                mode: GenerationMode::ImageToImage,
                image: Some(png_attachment()),
                strength: Some(strength),
                ..Default::default()
            });
            assert!(ok.normalize().is_ok(), "strength {strength} should pass");
        }
        for strength in [-0.01, 1.01] {
            let err = GenerationRequest::Sd35(Sd35Request {
                prompt: "p".to_string(),
                mode: GenerationMode::ImageToImage,
                image: Some(png_attachment()),
                strength: Some(strength),
                ..Default::default()
            })
            .normalize()
            .unwrap_err();
            assert_eq!(err.field, "strength");
        }
    }

    #[test]
    fn ultra_reference_image_and_strength_travel_together() {
        let missing_strength = GenerationRequest::Ultra(UltraRequest {
            prompt: "portrait".to_string(),
            image: Some(png_attachment()),
            ..Default::default()
        });
        assert_eq!(missing_strength.normalize().unwrap_err().field, "strength");

        let missing_image = GenerationRequest::Ultra(UltraRequest {
            prompt: "portrait".to_string(),
            strength: Some(0.5),
            ..Default::default()
        });
        assert_eq!(missing_image.normalize().unwrap_err().field, "image");

        let both = GenerationRequest::Ultra(UltraRequest {
            prompt: "portrait".to_string(),
            image: Some(png_attachment()),
            strength: Some(0.5),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");
        assert_eq!(both.fields["strength"], "0.5");
        assert_eq!(both.binaries.len(), 1);
    }

    #[test]
    fn control_requests_default_control_strength() {
        let normalized = GenerationRequest::Structure(ControlRequest {
            prompt: "castle".to_string(),
            negative_prompt: None,
            image: png_attachment(),
            control_strength: None,
            output_format: None,
            style_preset: None,
            seed: None,
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["control_strength"], "0.7");
        assert_eq!(normalized.binaries[0].name, "image");
    }

    #[test]
    fn style_guide_defaults_fidelity_and_aspect_ratio() {
        let normalized = GenerationRequest::StyleGuide(StyleGuideRequest {
            prompt: "poster".to_string(),
            negative_prompt: None,
            image: png_attachment(),
            fidelity: None,
            aspect_ratio: None,
            output_format: None,
            style_preset: None,
            seed: None,
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["fidelity"], "0.5");
        assert_eq!(normalized.fields["aspect_ratio"], "1:1");
    }

    #[test]
    fn style_transfer_defaults_and_optional_prompt() {
        let normalized = GenerationRequest::StyleTransfer(StyleTransferRequest {
            init_image: png_attachment(),
            style_image: png_attachment(),
            prompt: None,
            negative_prompt: None,
            style_strength: None,
            composition_fidelity: None,
            change_strength: None,
            output_format: None,
            seed: None,
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["style_strength"], "1");
        assert_eq!(normalized.fields["composition_fidelity"], "0.9");
        assert_eq!(normalized.fields["change_strength"], "0.9");
        assert!(!normalized.fields.contains_key("prompt"));
        let names: Vec<&str> = normalized.binaries.iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["init_image", "style_image"]);
    }

    #[test]
    fn style_transfer_empty_style_image_fails_before_dispatch() {
        let err = GenerationRequest::StyleTransfer(StyleTransferRequest {
            init_image: png_attachment(),
            style_image: ImageAttachment::new(Vec::new(), "image/png"),
            prompt: None,
            negative_prompt: None,
            style_strength: None,
            composition_fidelity: None,
            change_strength: None,
            output_format: None,
            seed: None,
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "style_image");
    }

    #[test]
    fn change_strength_floors_at_one_tenth() {
        let base = |change_strength| StyleTransferRequest {
            init_image: png_attachment(),
            style_image: png_attachment(),
            prompt: None,
            negative_prompt: None,
            style_strength: None,
            composition_fidelity: None,
            change_strength: Some(change_strength),
            output_format: None,
            seed: None,
        };
        assert!(GenerationRequest::StyleTransfer(base(0.1)).normalize().is_ok());
        assert!(GenerationRequest::StyleTransfer(base(1.0)).normalize().is_ok());
        let err = GenerationRequest::StyleTransfer(base(0.05))
            .normalize()
            .unwrap_err();
        assert_eq!(err.field, "change_strength");
        assert_eq!(err.message, "change_strength must be between 0.1 and 1");
    }

    #[test]
    fn audio_controls_ranges_and_defaults() {
        let normalized = GenerationRequest::TextToAudio(TextToAudioRequest {
            prompt: "rain on a tin roof".to_string(),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["duration"], "20");
        assert_eq!(normalized.fields["steps"], "50");
        assert_eq!(normalized.fields["cfg_scale"], "7");
        assert_eq!(normalized.fields["output_format"], "mp3");

        for (duration, steps, cfg_scale, field) in [
            (Some(0), None, None, "duration"),
            (Some(191), None, None, "duration"),
            (None, Some(29), None, "steps"),
            (None, Some(101), None, "steps"),
            (None, None, Some(25.5), "cfg_scale"),
        ] {
            let err = GenerationRequest::TextToAudio(TextToAudioRequest {
                prompt: "x".to_string(),
                duration_seconds: duration,
                steps,
                cfg_scale,
                output_format: None,
            })
            .normalize()
            .unwrap_err();
            assert_eq!(err.field, field);
        }
    }

    #[test]
    fn audio_to_audio_requires_valid_audio() {
        let normalized = GenerationRequest::AudioToAudio(AudioToAudioRequest {
            prompt: "slower tempo".to_string(),
            audio: audio_attachment(),
            duration_seconds: None,
            steps: None,
            cfg_scale: None,
            output_format: Some(AudioFormat::Wav),
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["output_format"], "wav");
        assert_eq!(normalized.binaries[0].name, "audio");

        let err = GenerationRequest::AudioToAudio(AudioToAudioRequest {
            prompt: "slower tempo".to_string(),
            audio: AudioAttachment::new(vec![0u8; 16], "audio/ogg"),
            duration_seconds: None,
            steps: None,
            cfg_scale: None,
            output_format: None,
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "audio");
    }

    #[test]
    fn fast_3d_defaults_and_ranges() {
        let normalized = GenerationRequest::Fast3d(Fast3dRequest {
            image: png_attachment(),
            texture_resolution: None,
            foreground_ratio: None,
            remesh: None,
            vertex_count: None,
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["texture_resolution"], "1024");
        assert_eq!(normalized.fields["foreground_ratio"], "0.85");
        assert_eq!(normalized.fields["remesh"], "none");
        assert_eq!(normalized.fields["vertex_count"], "-1");

        let err = GenerationRequest::Fast3d(Fast3dRequest {
            image: png_attachment(),
            texture_resolution: None,
            foreground_ratio: Some(2.01),
            remesh: None,
            vertex_count: None,
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "foreground_ratio");

        let err = GenerationRequest::Fast3d(Fast3dRequest {
            image: png_attachment(),
            texture_resolution: None,
            foreground_ratio: None,
            remesh: None,
            vertex_count: Some(20_001),
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "vertex_count");
    }

    #[test]
    fn point_aware_3d_adds_guidance_scale() {
        let normalized = GenerationRequest::PointAware3d(PointAware3dRequest {
            image: png_attachment(),
            texture_resolution: Some(TextureResolution::R2048),
            foreground_ratio: None,
            remesh: Some(RemeshMode::Quad),
            vertex_count: Some(5_000),
            guidance_scale: None,
        })
        .normalize()
        .expect("valid request");
        assert_eq!(normalized.fields["guidance_scale"], "3");
        assert_eq!(normalized.fields["texture_resolution"], "2048");
        assert_eq!(normalized.fields["remesh"], "quad");

        let err = GenerationRequest::PointAware3d(PointAware3dRequest {
            image: png_attachment(),
            texture_resolution: None,
            foreground_ratio: None,
            remesh: None,
            vertex_count: None,
            guidance_scale: Some(0.5),
        })
        .normalize()
        .unwrap_err();
        assert_eq!(err.field, "guidance_scale");
    }

    #[test]
    fn normalization_is_idempotent_over_filled_defaults() {
        let bare = GenerationRequest::Core(CoreRequest {
            prompt: "A sunset".to_string(),
            ..Default::default()
        })
        .normalize()
        .expect("valid request");

        // A request rebuilt with every default spelled out normalizes to
        // the exact same field map: nothing drifts on reapplication.
        let explicit = GenerationRequest::Core(CoreRequest {
            prompt: "A sunset".to_string(),
            negative_prompt: None,
            aspect_ratio: Some(AspectRatio::Square),
            output_format: Some(OutputFormat::Png),
            style_preset: None,
            seed: None,
        })
        .normalize()
        .expect("valid request");

        assert_eq!(bare.fields, explicit.fields);
    }

    #[test]
    fn end_to_end_core_field_shape() {
        let normalized = GenerationRequest::Core(CoreRequest {
            prompt: "A sunset".to_string(),
            negative_prompt: None,
            aspect_ratio: Some(AspectRatio::Landscape16x9),
            output_format: None,
            style_preset: Some(StylePreset::Photographic),
            seed: Some(12345),
        })
        .normalize()
        .expect("valid request");

        let keys: Vec<&str> = normalized.fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["aspect_ratio", "output_format", "prompt", "seed", "style_preset"]
        );
        assert_eq!(normalized.fields["aspect_ratio"], "16:9");
        assert_eq!(normalized.fields["style_preset"], "photographic");
        assert_eq!(normalized.fields["seed"], "12345");
    }
}
