pub mod apply;
pub mod create;
pub mod delete;
pub mod import;
pub mod read;
pub mod update;
pub mod validate;
