//! vrma_loader - Loads `.vrma` animation files into keyframe clips
//!
//! # Features
//! - JSON track format with stride-based track classification
//! - Binary glTF (GLB) detection by magic bytes, first animation extracted
//! - VRM animation (`VRMC_vrm_animation`) with humanoid bone naming
//! - Async runtime abstraction (Tokio, custom)
//! - Shared loading manager for progress and failure tracking
//!
//! # Quick Start
//!
//! ```ignore
//! use vrma_loader::{FileFetcher, MockSpawner, VrmaLoader};
//!
//! let loader = VrmaLoader::new(FileFetcher::with_root("assets"));
//! let result = MockSpawner::blocking()
//!     .block_on(loader.load_async("wave.vrma", None))
//!     .unwrap()?;
//! let clip = result.clip.expect("wave.vrma has an animation");
//! ```
//!
//! # Feature Flags
//!
//! - `vrm-animation` (default): VRM animation parser
//! - `runtime-tokio`: Tokio spawner

// Core modules
pub mod clip;
pub mod loader;
pub mod runtime;
pub mod skeleton;

// Support modules
pub mod async_loading;
pub mod config;
pub mod fetch;
pub mod manager;

// Error types
mod error;
pub use error::{LoaderError, Result};

// Re-export clip types
pub use clip::{
    AnimationClip, Interpolation, KeyframeTrack, TrackKind, TrackValues, UNDETERMINED_DURATION,
};

// Re-export loader types
pub use config::{ContentStrategy, LoaderConfig};
pub use loader::{
    decode_text, is_binary_gltf, parse_json_clip, AnimationParser, ErrorCallback,
    GltfAnimationParser, LoadResult, VrmaLoader, GLB_MAGIC,
};
#[cfg(feature = "vrm-animation")]
pub use loader::VrmAnimationParser;

// Re-export collaborator types
pub use fetch::{FetchError, FetchRequest, Fetcher, FileFetcher, MemoryFetcher, ResponseType};
pub use manager::{LoadingManager, LoadingManagerHandle};
pub use skeleton::{Bone, Skeleton, SkeletonSource};

// Re-export runtime types
pub use runtime::mock::MockSpawner;
#[cfg(feature = "runtime-tokio")]
pub use runtime::tokio_impl::TokioSpawner;
pub use runtime::{AsyncSpawner, JoinHandle};

// Re-export async loading types
pub use async_loading::{AsyncClipHandle, LoadState};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
