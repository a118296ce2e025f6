mod build;
mod hierarchy;
mod ranks;
mod records;

pub use build::build_hierarchy;
pub use hierarchy::{FamilyNode, KingdomNode, PreyHierarchy, SpeciesLeaf};
pub use ranks::ANIMAL_CLASSES;
pub use records::{FetchPayload, InteractionType, UNKNOWN};
