//! Thin wrappers over the browser APIs the app needs: file download,
//! file picking, clipboard, rich-text formatting and printing.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn document() -> Result<web_sys::Document, String> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "document is not available".to_string())
}

/// Offer `contents` to the user as a `.json` download named `filename`.
pub(crate) fn download_json(filename: &str, contents: &str) -> Result<(), String> {
    let document = document()?;
    let body = document.body().ok_or("document has no body")?;

    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(contents));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob =
        web_sys::Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let link: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "failed to create link element".to_string())?;
    link.set_href(&url);
    link.set_download(filename);

    body.append_child(&link).map_err(js_err)?;
    link.click();
    let _ = body.remove_child(&link);
    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

/// Open a file picker and read the chosen file as text.
///
/// `on_done` runs exactly once: with the file contents, or `None` when the
/// user dismissed the picker or the file could not be read.
pub(crate) fn pick_text_file(
    accept: &str,
    on_done: impl FnOnce(Option<String>) + 'static,
) -> Result<(), String> {
    let document = document()?;
    let input: web_sys::HtmlInputElement = document
        .create_element("input")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "failed to create file input".to_string())?;
    input.set_type("file");
    input.set_accept(accept);

    let pending: Rc<RefCell<Option<Box<dyn FnOnce(Option<String>)>>>> =
        Rc::new(RefCell::new(Some(Box::new(on_done))));
    let finish = Rc::new(move |result: Option<String>| {
        let cb = pending.borrow_mut().take();
        if let Some(cb) = cb {
            cb(result);
        }
    });

    let input2 = input.clone();
    let finish2 = finish.clone();
    let on_change = Closure::once_into_js(move || {
        let Some(file) = input2.files().and_then(|files| files.get(0)) else {
            finish2(None);
            return;
        };
        let Ok(reader) = web_sys::FileReader::new() else {
            finish2(None);
            return;
        };

        let reader2 = reader.clone();
        let finish_load = finish2.clone();
        let on_load = Closure::once_into_js(move || {
            finish_load(reader2.result().ok().and_then(|v| v.as_string()));
        });
        let finish_error = finish2.clone();
        let on_error = Closure::once_into_js(move || finish_error(None));

        reader.set_onload(Some(on_load.unchecked_ref()));
        reader.set_onerror(Some(on_error.unchecked_ref()));
        if reader.read_as_text(&file).is_err() {
            finish2(None);
        }
    });
    input.set_onchange(Some(on_change.unchecked_ref()));

    let finish_cancel = finish.clone();
    let on_cancel = Closure::once_into_js(move || finish_cancel(None));
    input
        .add_event_listener_with_callback("cancel", on_cancel.unchecked_ref())
        .map_err(js_err)?;

    input.click();
    Ok(())
}

/// Copy `text` to the clipboard. `on_done` gets whether the browser accepted it.
pub(crate) fn copy_to_clipboard(
    text: &str,
    on_done: impl FnOnce(bool) + 'static,
) -> Result<(), String> {
    let window = web_sys::window().ok_or("window is not available")?;
    let clipboard = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))
        .map_err(js_err)?;
    let write_text: js_sys::Function = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "clipboard is not available".to_string())?;
    let promise: js_sys::Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| "clipboard did not return a promise".to_string())?;

    let pending: Rc<RefCell<Option<Box<dyn FnOnce(bool)>>>> =
        Rc::new(RefCell::new(Some(Box::new(on_done))));
    let finish = move |ok: bool| {
        let cb = pending.borrow_mut().take();
        if let Some(cb) = cb {
            cb(ok);
        }
    };
    let finish_err = finish.clone();
    let on_ok: Closure<dyn FnMut(JsValue)> = Closure::once(move |_: JsValue| finish(true));
    let on_err: Closure<dyn FnMut(JsValue)> = Closure::once(move |_: JsValue| finish_err(false));
    let _ = promise.then2(&on_ok, &on_err);
    on_ok.forget();
    on_err.forget();
    Ok(())
}

/// Applies a formatting command (`bold`, `insertUnorderedList`, ...) to the
/// current selection of the focused editable element.
pub(crate) fn exec_format_command(command: &str) {
    let Ok(document) = document() else {
        return;
    };
    if let Ok(html) = document.dyn_into::<web_sys::HtmlDocument>() {
        let _ = html.exec_command(command);
    }
}

/// Hand the page to the browser's print dialog (and its "save as PDF").
pub(crate) fn print_page() {
    if let Some(window) = web_sys::window() {
        let _ = window.print();
    }
}
