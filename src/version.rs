/// Version string stamped by `build.rs` (git describe, `GIT_VERSION` env, or "dev").
pub const GIT_VERSION: &str = env!("GIT_VERSION");
