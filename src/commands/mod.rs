pub mod collect;
pub mod exec;
