use crate::util::browser::exec_format_command;
use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;

const TOOLBAR: &[(&str, &str)] = &[
    ("bold", "B"),
    ("italic", "I"),
    ("underline", "U"),
    ("insertUnorderedList", "• 列表"),
    ("insertOrderedList", "1. 列表"),
];

/// Editable HTML field with a small formatting toolbar.
///
/// `value` is only read on mount so re-renders never move the caret; every
/// edit is reported through `on_change` as the element's HTML.
#[component]
pub fn RichTextEditor(
    #[prop(into)] value: String,
    #[prop(into)] on_change: Callback<String>,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let editor_ref: NodeRef<html::Div> = NodeRef::new();
    let merged_class = tw_merge!("rounded-md border border-input shadow-xs", class);

    let emit = move || {
        if let Some(el) = editor_ref.get_untracked() {
            on_change.run(el.inner_html());
        }
    };

    view! {
        <div data-name="RichTextEditor" class=merged_class>
            <div class="flex flex-wrap gap-1 border-b border-input px-1 py-1">
                {TOOLBAR
                    .iter()
                    .map(|&(command, label)| {
                        view! {
                            <button
                                type="button"
                                class="h-6 rounded px-2 text-xs hover:bg-accent"
                                // Keeps the selection inside the editable area.
                                on:mousedown=move |ev| {
                                    ev.prevent_default();
                                    exec_format_command(command);
                                    emit();
                                }
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <div
                node_ref=editor_ref
                contenteditable="true"
                class="rich-text min-h-16 px-3 py-2 text-sm outline-none"
                inner_html=value
                on:input=move |_| emit()
            ></div>
        </div>
    }
}
