pub mod compare;
pub mod project;
pub mod sensitivity;
