#![allow(clippy::needless_lifetimes)]

use wasm_bindgen::{prelude::*, JsCast};

use crate::architecture::Architecture;

/// Offers `save(model)` to the user as a file download.
pub(crate) fn save_listener<'a, Model: Architecture>(
    bump: &'a dodrio::bumpalo::Bump,
    save: impl 'static + Fn(&Model) -> String,
    filename: &'static str,
) -> dodrio::Listener<'a> {
    Model::listener_raw(bump, "click", move |_, model, _, _| {
        if let Err(error) = download(&save(model), filename) {
            tracing::warn!(?error, filename, "export failed");
        }
    })
}

fn download(data: &str, filename: &str) -> Result<(), JsValue> {
    let a: web_sys::HtmlAnchorElement = web_sys::window()
        .ok_or("`window` not found.")?
        .document()
        .ok_or("`window.document` not found.")?
        .create_element("a")?
        .dyn_into()?;

    let blob = web_sys::Blob::new_with_str_sequence(&js_sys::Array::from_iter(
        std::iter::once(JsValue::from_str(data)),
    ))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    a.set_href(&url);
    a.set_download(filename);
    a.click();
    web_sys::Url::revoke_object_url(&url)
}

/// Reads the file picked in an `<input type="file">` and sends its text as `msg`,
/// or sends `fail()` if there is no single readable file.
pub(crate) fn load_listener<'a, Model: Architecture>(
    bump: &'a dodrio::bumpalo::Bump,
    msg: impl 'static + Clone + FnOnce(String) -> Model::Msg,
    fail: impl 'static + Clone + FnOnce() -> Model::Msg,
) -> dodrio::Listener<'a> {
    Model::listener_raw(bump, "change", move |event, _, _, send_msg| {
        let msg = msg.clone();
        let fail = fail.clone();
        let send_msg = send_msg.clone();

        // Immediately Invoked Function Expression
        let Some(promise) = move || -> Option<js_sys::Promise> {
            let input = event
                .current_target()?
                .dyn_into::<web_sys::HtmlInputElement>()
                .ok()?;
            let files = input.files()?;
            if files.length() != 1 {
                return None;
            }
            let promise = files.get(0)?.text();
            // Picking the same file again should fire another change.
            input.set_value("");
            Some(promise)
        }() else {
            if send_msg.send_blocking(fail()).is_err() {
                tracing::warn!("app stopped receiving messages");
            }
            return;
        };

        wasm_bindgen_futures::spawn_local(async move {
            let msg = wasm_bindgen_futures::JsFuture::from(promise)
                .await
                .ok()
                .and_then(|value| value.as_string())
                .map(msg)
                .unwrap_or_else(fail);
            if send_msg.send(msg).await.is_err() {
                tracing::warn!("app stopped receiving messages");
            }
        });
    })
}
