pub mod files;
pub mod modify;
pub mod serve;
pub mod show;
