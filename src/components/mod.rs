pub mod force_layout;
