//! TUI dialog components

mod completion;

pub use completion::CompletionDialog;

pub enum DialogResult<T> {
    Continue,
    Submit(T),
}
