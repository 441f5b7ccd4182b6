pub use self::component::{Component, ComponentRender};

mod component;
pub mod input_box;
