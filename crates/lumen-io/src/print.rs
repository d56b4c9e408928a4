//! Printing the working image.
//!
//! [`print_image`] opens a blank tab holding only the image and prints it
//! once the image has loaded. [`PrintIntentListener`] routes the
//! platform print shortcut (Ctrl+P / Cmd+P) and prints started from the
//! browser menu to the same path.

use std::cell::RefCell;
use std::rc::Rc;

use lumen_edits::EncodedImage;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use web_sys::{Event, KeyboardEvent};

/// Errors that can occur when printing.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    /// Nothing has been uploaded yet.
    #[error("no image loaded")]
    NoImage,

    /// The browser refused to open the print view (e.g. a popup blocker).
    #[error("print view was blocked")]
    Blocked,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for PrintError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Whether a key press is the platform print shortcut.
#[must_use]
pub fn is_print_shortcut(key: &str, ctrl: bool, meta: bool) -> bool {
    (ctrl || meta) && key.eq_ignore_ascii_case("p")
}

/// How a print request reached the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintIntent {
    /// Ctrl+P / Cmd+P; the browser dialog can still be suppressed.
    Shortcut,
    /// The browser's own print command; already under way.
    Menu,
}

impl PrintIntent {
    /// Whether the browser's default print should be prevented once the
    /// request has been handled.
    #[must_use]
    pub const fn suppresses_default(self) -> bool {
        matches!(self, Self::Shortcut)
    }
}

/// Open `image` alone in a new tab and print it.
///
/// # Errors
///
/// Returns [`PrintError::NoImage`] when `image` is `None`,
/// [`PrintError::Blocked`] if no tab could be opened, and
/// [`PrintError::JsError`] if a browser call fails.
pub fn print_image(image: Option<&EncodedImage>) -> Result<(), PrintError> {
    let image = image.ok_or(PrintError::NoImage)?;
    let window = web_sys::window().ok_or_else(|| PrintError::JsError("no global window".into()))?;
    let target = window
        .open_with_url_and_target("", "_blank")?
        .ok_or(PrintError::Blocked)?;
    let document = target
        .document()
        .ok_or_else(|| PrintError::JsError("print view has no document".into()))?;
    let body = document
        .body()
        .ok_or_else(|| PrintError::JsError("print view has no body".into()))?;

    document.set_title("lumen");
    let img = document
        .create_element("img")?
        .dyn_into::<web_sys::HtmlImageElement>()
        .map_err(|e| PrintError::JsError(format!("failed to cast element: {e:?}")))?;
    img.set_attribute("style", "max-width: 100%")?;

    // Printing before the image decodes yields a blank page.
    let print_target = target.clone();
    let onload = Closure::once_into_js(move || {
        if let Err(e) = print_target.print() {
            tracing::warn!(error = ?e, "print dialog failed");
        }
    });
    img.set_onload(Some(onload.unchecked_ref()));
    img.set_src(image.as_str());
    body.append_child(&img)?;

    tracing::info!(%image, "print view opened");
    Ok(())
}

/// Intercepts print requests while alive.
///
/// Holds the `keydown` and `beforeprint` closures registered on the
/// window and removes both on drop, so the listeners live exactly as
/// long as their owner.
pub struct PrintIntentListener {
    window: web_sys::Window,
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    beforeprint: Closure<dyn FnMut(Event)>,
}

type PrintHandler = Rc<RefCell<dyn FnMut(PrintIntent) -> bool>>;

impl PrintIntentListener {
    /// Route Ctrl+P / Cmd+P and menu prints to `on_print`.
    ///
    /// `on_print` returns whether it handled the request; only then is
    /// the browser's own print dialog suppressed, and only for the
    /// shortcut. A menu print has already started and cannot be stopped.
    ///
    /// Returns `None` outside a browser or if registration fails.
    pub fn install(on_print: impl FnMut(PrintIntent) -> bool + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let handler: PrintHandler = Rc::new(RefCell::new(on_print));

        let shortcut = Rc::clone(&handler);
        let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if !is_print_shortcut(&event.key(), event.ctrl_key(), event.meta_key()) {
                return;
            }
            let intent = PrintIntent::Shortcut;
            let handled = shortcut
                .try_borrow_mut()
                .is_ok_and(|mut on_print| (&mut *on_print)(intent));
            if handled && intent.suppresses_default() {
                event.prevent_default();
            }
        });
        let beforeprint = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Ok(mut on_print) = handler.try_borrow_mut() {
                (&mut *on_print)(PrintIntent::Menu);
            }
        });

        // Built first so a failed registration still unregisters on drop.
        let listener = Self {
            window,
            keydown,
            beforeprint,
        };
        let listeners = [
            ("keydown", listener.keydown.as_ref()),
            ("beforeprint", listener.beforeprint.as_ref()),
        ];
        for (event, callback) in listeners {
            if let Err(e) = listener
                .window
                .add_event_listener_with_callback(event, callback.unchecked_ref())
            {
                tracing::warn!(event, error = ?e, "could not install print listener");
                return None;
            }
        }
        Some(listener)
    }
}

impl Drop for PrintIntentListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.keydown.as_ref().unchecked_ref());
        let _ = self.window.remove_event_listener_with_callback(
            "beforeprint",
            self.beforeprint.as_ref().unchecked_ref(),
        );
    }
}
