use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {ModalOverlay, div, "fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4 print:hidden"}
    clx! {ModalPanel, div, "w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg"}
    clx! {ModalTitle, div, "mb-3 text-sm font-medium"}
    clx! {ModalActions, div, "flex items-center justify-end gap-2 pt-2"}
}

pub use components::*;
