pub mod toml_loader;

pub use toml_loader::{load_grading_job, load_submissions_from_dir, GradingJob};
