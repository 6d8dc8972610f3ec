pub mod input;
pub mod pointer;

pub use input::{Action, KeyState, map_key};
pub use pointer::PointerDrag;
