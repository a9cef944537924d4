pub mod avatar;
pub mod task;
pub mod user;

pub use avatar::{AvatarFormat, AVATAR_MAX_BYTES};
pub use task::{Task, TaskFilter, TaskInput, TaskQuery, TaskSort, TaskUpdate};
pub use user::{normalize_email, User, UserInput, UserUpdate};
