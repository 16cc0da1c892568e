pub mod condition;
pub mod mesh;
pub mod record;
pub mod state;
