mod date_picker;
mod handler;
mod ui;

pub use date_picker::{DatePicker, PickerPurpose};
pub use handler::{handle_key_event, AppAction, InputMode};
pub use ui::draw;
