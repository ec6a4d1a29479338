//! Asset domain entities.

pub mod kind;
pub mod model;

pub use kind::AssetKind;
pub use model::{Asset, CreateAsset};
