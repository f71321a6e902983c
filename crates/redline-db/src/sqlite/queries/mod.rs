pub mod annotations;
pub mod calls;
