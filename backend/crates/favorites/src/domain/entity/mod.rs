pub mod event;
pub mod favorite;
