// Resolution commands
pub mod apply;
pub mod plan;
pub mod show;

// Policy file management
pub mod init;
pub mod validate;

// Core commands
pub mod doctor;
