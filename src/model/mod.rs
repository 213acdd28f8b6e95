// src/model/mod.rs

//! Data model
//!
//! Value types shared by every layer: identifiers, versions and ranges,
//! architectures, feeds with their implementations, resolution requests
//! and the resulting selections.

pub mod architecture;
pub mod binding;
pub mod command;
pub mod dependency;
pub mod digest;
pub mod feed;
pub mod feed_uri;
pub mod requirements;
pub mod selection;
pub mod stability;
pub mod version;
pub mod version_range;

pub use architecture::{Architecture, Cpu, Os};
pub use binding::{Binding, EnvironmentBinding, EnvironmentMode};
pub use command::{COMMAND_COMPILE, COMMAND_RUN, COMMAND_TEST, Command, Runner};
pub use dependency::{Dependency, Importance, Restriction};
pub use digest::ManifestDigest;
pub use feed::{
    Archive, Element, ElementAttributes, Feed, FeedReference, Group, Icon, Implementation,
    PackageImplementation, RecipeStep, RetrievalMethod,
};
pub use feed_uri::FeedUri;
pub use requirements::Requirements;
pub use selection::{ImplementationSelection, Selections};
pub use stability::Stability;
pub use version::ImplementationVersion;
pub use version_range::{Constraint, VersionRange, VersionRangePart};
