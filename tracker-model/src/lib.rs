mod entity;
mod ids;
mod mapping;
mod project;
mod reference;
mod task;
mod time_record;
mod user;

pub use entity::*;
pub use ids::*;
pub use mapping::*;
pub use project::*;
pub use reference::*;
pub use task::*;
pub use time_record::*;
pub use user::*;
