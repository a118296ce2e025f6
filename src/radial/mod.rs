mod layout;
mod tree;

pub use layout::RadialLayout;
pub use tree::NodeKind;
