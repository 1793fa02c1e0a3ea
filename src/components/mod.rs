pub mod footer;
pub mod modal;
pub mod tab_bar;
pub mod table;
pub mod text_input;
