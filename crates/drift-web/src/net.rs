// net.rs
//
// Same-origin fetches for stage requests. The outcome is fed back into the
// stage as `InputEvent::Response` carrying the original request id.

use drift_stage::{FetchError, InputEvent, Method, Request, RequestKind};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{RequestCredentials, RequestInit, Response, UrlSearchParams};

/// Send `request` to `url` in the background.
pub fn send(request: Request, url: String) {
    spawn_local(async move {
        let result = fetch(&url, &request.kind).await;
        if let Err(err) = &result {
            log::debug!("net: {} {url}: {err}", request.kind.method().as_str());
        }
        crate::dispatch(InputEvent::Response { id: request.id, result });
    });
}

async fn fetch(url: &str, kind: &RequestKind) -> Result<String, FetchError> {
    let window = web_sys::window().ok_or_else(|| FetchError::Transport("no window".into()))?;

    let init = RequestInit::new();
    init.set_method(kind.method().as_str());
    init.set_credentials(RequestCredentials::SameOrigin);
    let fields = kind.form_fields();
    if !fields.is_empty() {
        let params = UrlSearchParams::new().map_err(transport)?;
        for (name, value) in &fields {
            params.append(name, value);
        }
        init.set_body(&params);
    }

    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(transport)?;
    request.headers().set("Accept", "application/json").map_err(transport)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }

    // Only reads carry a body the stage looks at.
    if kind.method() == Method::Post {
        return Ok(String::new());
    }
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?;
    Ok(text.as_string().unwrap_or_default())
}

fn transport(err: JsValue) -> FetchError {
    FetchError::Transport(format!("{err:?}"))
}
