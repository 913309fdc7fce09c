pub mod import;
pub mod preset;
pub mod run;
pub mod templates;

pub use run::Report;
