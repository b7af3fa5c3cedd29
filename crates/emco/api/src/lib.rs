pub mod cluster;
pub mod composite_app;
pub mod controller;
pub mod deployment;
pub mod form;
pub mod intent;
pub mod kind;
pub mod model;
pub mod path;
pub mod project;
pub mod validate;
