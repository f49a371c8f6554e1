pub mod header;
pub mod source_panel;
pub mod camera_panel;
pub mod ocr_text;
pub mod field_form;
pub mod save_buttons;
pub mod status_line;
