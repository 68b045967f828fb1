//! Domain model (IDs, articles, images, stage errors).

pub mod article;
pub mod errors;
pub mod ids;
pub mod image;

pub use article::{Article, Publication};
pub use errors::{FetchError, GenerationError, LinkError, PersistError, Stage, StageError};
pub use ids::{ArticleId, ImageId};
pub use image::{BackendName, EmptyBackendName, GeneratedImage, ImagePayload, StoredImage};
