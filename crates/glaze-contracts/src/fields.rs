use serde::{Deserialize, Serialize};

use crate::error::UnsupportedModel;

/// Output file format for image generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }
}

/// The aspect ratios the remote accepts for text-to-image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "3:4")]
    Portrait3x4,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait3x4 => "3:4",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1:1" => Some(AspectRatio::Square),
            "16:9" => Some(AspectRatio::Landscape16x9),
            "9:16" => Some(AspectRatio::Portrait9x16),
            "3:2" => Some(AspectRatio::Landscape3x2),
            "2:3" => Some(AspectRatio::Portrait2x3),
            "4:3" => Some(AspectRatio::Landscape4x3),
            "3:4" => Some(AspectRatio::Portrait3x4),
            _ => None,
        }
    }
}

/// Named style presets accepted by the image endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    Photographic,
    Anime,
    DigitalArt,
    #[serde(rename = "3d-model")]
    Model3d,
    PixelArt,
    Cinematic,
    FantasyArt,
    Illustration,
}

impl StylePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::Photographic => "photographic",
            StylePreset::Anime => "anime",
            StylePreset::DigitalArt => "digital-art",
            StylePreset::Model3d => "3d-model",
            StylePreset::PixelArt => "pixel-art",
            StylePreset::Cinematic => "cinematic",
            StylePreset::FantasyArt => "fantasy-art",
            StylePreset::Illustration => "illustration",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "photographic" => Some(StylePreset::Photographic),
            "anime" => Some(StylePreset::Anime),
            "digital-art" => Some(StylePreset::DigitalArt),
            "3d-model" => Some(StylePreset::Model3d),
            "pixel-art" => Some(StylePreset::PixelArt),
            "cinematic" => Some(StylePreset::Cinematic),
            "fantasy-art" => Some(StylePreset::FantasyArt),
            "illustration" => Some(StylePreset::Illustration),
            _ => None,
        }
    }
}

/// SD3.5 generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    TextToImage,
    ImageToImage,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "text-to-image",
            GenerationMode::ImageToImage => "image-to-image",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text-to-image" => Some(GenerationMode::TextToImage),
            "image-to-image" => Some(GenerationMode::ImageToImage),
            _ => None,
        }
    }
}

/// SD3.5 model family members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sd35Model {
    #[serde(rename = "sd3.5-large")]
    Large,
    #[serde(rename = "sd3.5-large-turbo")]
    LargeTurbo,
    #[serde(rename = "sd3.5-medium")]
    Medium,
}

impl Sd35Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sd35Model::Large => "sd3.5-large",
            Sd35Model::LargeTurbo => "sd3.5-large-turbo",
            Sd35Model::Medium => "sd3.5-medium",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sd3.5-large" => Some(Sd35Model::Large),
            "sd3.5-large-turbo" => Some(Sd35Model::LargeTurbo),
            "sd3.5-medium" => Some(Sd35Model::Medium),
            _ => None,
        }
    }
}

/// Output container for the audio endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

/// Texture resolution choices for the 3D endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureResolution {
    #[serde(rename = "512")]
    R512,
    #[serde(rename = "1024")]
    R1024,
    #[serde(rename = "2048")]
    R2048,
}

impl TextureResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextureResolution::R512 => "512",
            TextureResolution::R1024 => "1024",
            TextureResolution::R2048 => "2048",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "512" => Some(TextureResolution::R512),
            "1024" => Some(TextureResolution::R1024),
            "2048" => Some(TextureResolution::R2048),
            _ => None,
        }
    }
}

/// Mesh retopology mode for the 3D endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemeshMode {
    None,
    Quad,
    Triangle,
}

impl RemeshMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemeshMode::None => "none",
            RemeshMode::Quad => "quad",
            RemeshMode::Triangle => "triangle",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(RemeshMode::None),
            "quad" => Some(RemeshMode::Quad),
            "triangle" => Some(RemeshMode::Triangle),
            _ => None,
        }
    }
}

/// Tag identifying one of the supported generation/control modes.
///
/// Presentation layers hand these around as strings; [`ModelKind::parse`]
/// is the single place an unknown tag turns into [`UnsupportedModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Core,
    Sd35,
    Ultra,
    Sketch,
    Structure,
    StyleGuide,
    StyleTransfer,
    TextToAudio,
    AudioToAudio,
    Fast3d,
    PointAware3d,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Core => "core",
            ModelKind::Sd35 => "sd35",
            ModelKind::Ultra => "ultra",
            ModelKind::Sketch => "sketch",
            ModelKind::Structure => "structure",
            ModelKind::StyleGuide => "style_guide",
            ModelKind::StyleTransfer => "style_transfer",
            ModelKind::TextToAudio => "text_to_audio",
            ModelKind::AudioToAudio => "audio_to_audio",
            ModelKind::Fast3d => "fast_3d",
            ModelKind::PointAware3d => "point_aware_3d",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, UnsupportedModel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(ModelKind::Core),
            "sd35" => Ok(ModelKind::Sd35),
            "ultra" => Ok(ModelKind::Ultra),
            "sketch" => Ok(ModelKind::Sketch),
            "structure" => Ok(ModelKind::Structure),
            "style_guide" => Ok(ModelKind::StyleGuide),
            "style_transfer" => Ok(ModelKind::StyleTransfer),
            "text_to_audio" => Ok(ModelKind::TextToAudio),
            "audio_to_audio" => Ok(ModelKind::AudioToAudio),
            "fast_3d" => Ok(ModelKind::Fast3d),
            "point_aware_3d" => Ok(ModelKind::PointAware3d),
            other => Err(UnsupportedModel(other.to_string())),
        }
    }
}
