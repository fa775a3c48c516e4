pub mod animator;
pub mod error;
pub mod layout;
pub mod map;
pub mod stats;
pub mod util;
pub mod view;
