pub mod edit_modal;
pub mod spinner;
pub mod text_input;
pub mod toast;

pub use edit_modal::{EditModal, ModalAction};
pub use spinner::Spinner;
pub use text_input::TextInput;
pub use toast::{Toast, ToastManager, ToastType};
