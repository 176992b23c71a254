//! Menu system: per-endpoint navigation trees.
//!
//! Applications describe their navigation once as a list of
//! [`MenuItemDefinition`]s, each declaring which endpoint types may see it.
//! [`MenuTreeBuilder`] derives the concrete [`MenuConfig`] tree for one
//! endpoint; the permission filter later prunes it per user.

mod builder;
mod definition;

pub use builder::{MenuCustomizer, MenuTreeBuilder, build_menu};
pub use definition::{MenuChildDefinition, MenuConfig, MenuItemDefinition};
