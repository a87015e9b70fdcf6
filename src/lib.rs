pub mod atlas;
pub mod catalog;
pub mod context;
pub mod error;
pub mod geom;
pub mod load;
pub mod packer;
pub mod path;
pub mod scene;
pub mod synth;

pub use catalog::Catalog;
pub use context::{DecodeContext, SpriteKind, SpriteSet};
pub use error::{LoadError, LookupMiss, Result};
pub use load::{decode_level, load_level};
pub use scene::{Instance, InstanceKind, Model, Path, PathPoint, PathRotation, Polygon, Scene, Vertex};
