//! # Character Animation
//!
//! A skeletal animation evaluation pipeline for skinned character rendering built with Rust.
//!
//! ## Features
//!
//! - **Skeleton Table**: Stable dense bone indices with bind-pose offset matrices
//! - **Vertex Binding**: Fixed-capacity per-vertex bone influences with a GPU-friendly packed layout
//! - **Keyframe Sampling**: Position/rotation/scale tracks with lerp/slerp interpolation
//! - **Pose Evaluation**: Per-frame hierarchy traversal producing flattened bone matrices
//! - **Importer Front-End**: Optional glTF loader producing the generic imported-scene model
//!
//! ## Architecture Design
//!
//! The crate follows the **Anemic Domain Model (贫血模型)** pattern:
//! - **Data**: Pure data structures ([`scene`], [`skeleton`], [`binding`])
//! - **Service**: Business logic encapsulation with static methods ([`sampler`])
//! - **Pipeline**: Load-time assembly and per-frame orchestration ([`character`], [`pose`])
//!
//! ### Example
//!
//! ```ignore
//! use character_animation::{AnimatedCharacter, AnimationConfig};
//!
//! let scene = character_animation::import::load_gltf("character.gltf")?;
//! let character = AnimatedCharacter::from_scene(scene, &AnimationConfig::default())?;
//!
//! // Once per rendered frame:
//! let pose = character.bone_transforms(elapsed_seconds)?;
//! renderer.upload_bone_matrices(&pose);
//! ```
//!
//! ## Modules
//!
//! - [`scene`]: Imported-scene data model (the asset-importer interface)
//! - [`skeleton`]: Bone name/index table and offset matrices
//! - [`binding`]: Per-vertex bone influence encoding
//! - [`sampler`]: Keyframe track sampling
//! - [`pose`]: Hierarchy traversal and final bone matrices
//! - [`character`]: Load-time pipeline
//! - [`config`]: Configuration system

/// Error types shared by the whole pipeline
pub mod error;
/// Configuration system
pub mod config;
/// Imported-scene data model supplied by an asset importer
pub mod scene;
/// Keyframe track sampling with interpolation
pub mod sampler;
/// Bone name/index table and offset matrices
pub mod skeleton;
/// Per-vertex bone influence encoding and packed wire layout
pub mod binding;
/// Per-frame pose evaluation over the node hierarchy
pub mod pose;
/// Load-time character assembly
pub mod character;
/// glTF importer front-end (requires the `gltf` feature)
#[cfg(feature = "gltf")]
pub mod import;

pub use binding::{
    OverflowPolicy, PackedVertexBones, VertexBoneBinder, VertexBoneData, MAX_BONE_INFLUENCES,
};
pub use character::AnimatedCharacter;
pub use config::{AnimationConfig, ConfigError, ConfigResult};
pub use error::{AnimationError, AnimationResult};
pub use pose::{PoseEvaluator, DEFAULT_TICKS_PER_SECOND, MAX_BONES};
pub use sampler::AnimationSampler;
pub use scene::{
    AnimationData, BoneData, BoneWeight, ImportedScene, Keyframe, MeshBones, NodeChannel,
    SceneNode,
};
pub use skeleton::Skeleton;
