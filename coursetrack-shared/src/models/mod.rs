/// Database models for Coursetrack
///
/// Each model owns its SQL. The ownership chain is
/// `User` ─< `Course` ─< `Task`, with `ON DELETE CASCADE` along every edge
/// and a denormalized `Task::user_id` pointing at the course owner.
///
/// # Models
///
/// - `user`: accounts (unique email, Argon2id password hash)
/// - `course`: courses owned by a user
/// - `task`: deadline-bearing tasks under a course

pub mod course;
pub mod task;
pub mod user;
