pub mod command {
    pub mod add_patron_cmd;
    pub mod get_patron_cmd;
}
pub mod controller;
pub mod domain;
pub mod dto;
pub mod factory;
pub mod repository;
