pub mod attachments;
pub mod error;
pub mod fields;
pub mod requests;

pub use attachments::{AudioAttachment, ImageAttachment, ImageInfo};
pub use error::{UnsupportedModel, ValidationError};
pub use fields::{
    AspectRatio, AudioFormat, GenerationMode, ModelKind, OutputFormat, RemeshMode, Sd35Model,
    StylePreset, TextureResolution,
};
pub use requests::{
    AudioToAudioRequest, BinaryPart, ControlRequest, CoreRequest, Fast3dRequest,
    GenerationRequest, NormalizedRequest, PointAware3dRequest, Sd35Request, StyleGuideRequest,
    StyleTransferRequest, TextToAudioRequest, UltraRequest,
};
