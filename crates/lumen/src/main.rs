mod config;

use std::rc::Rc;

use dioxus::prelude::*;
use lumen_client::BackendClient;
use lumen_edits::{
    Commit, ControlBank, EditStore, HistogramOutcome, HistogramPipeline, SyncDriver, SyncOutcome,
};
use lumen_io::{
    CHART_JS_URL, ChartJs, ControlPanel, DownloadError, FileUpload, HISTOGRAM_CANVAS_ID,
    HistogramPanel, PrintError, PrintIntent, PrintIntentListener, Preview, Toolbar, Upload,
};

use crate::config::AppConfig;

const NO_IMAGE_NOTICE: &str = "Please upload an image first.";

fn main() {
    dioxus::launch(app);
}

/// Strip the extension from an uploaded filename.
fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(base, _)| base)
}

/// Root application component.
///
/// Owns every piece of editor state as signals: the control drafts, the
/// edit store, the sync driver (source and working image), and the
/// histogram pipeline. Two effects drive the backend: one renders on
/// every document or source change, one refreshes the histogram on every
/// working image change while it is shown.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    let config = use_hook(|| Rc::new(AppConfig::from_build_env()));
    let client = use_hook(|| BackendClient::new(config.backend.clone()));
    let debounce_ms = config.debounce_ms;

    // --- Application state ---
    let mut store = use_signal(EditStore::new);
    let mut bank = use_signal(ControlBank::from_catalog);
    let mut sync = use_signal(SyncDriver::new);
    let mut histogram = use_signal(|| HistogramPipeline::new(ChartJs::new(HISTOGRAM_CANVAS_ID)));
    let mut show_histogram = use_signal(|| false);
    let mut histogram_error = use_signal(|| Option::<String>::None);
    let mut filename = use_signal(|| String::from("image"));
    let mut error = use_signal(|| Option::<String>::None);

    // Memos only notify when the value actually changes, so an identical
    // re-commit or a stale response never triggers a request.
    let document = use_memo(move || store.read().document().clone());
    let source = use_memo(move || sync.read().source().cloned());
    let working = use_memo(move || sync.read().working().cloned());

    // --- Upload handler ---
    let on_upload = move |upload: Upload| {
        filename.set(file_stem(&upload.filename).to_owned());
        error.set(None);
        store.write().reset();
        bank.write().reset();
        sync.write().load(upload.image);
    };

    // --- Commit handler ---
    // Every commit merges onto the store's latest document.
    let on_commit = move |commit: Commit| {
        tracing::debug!(control = %commit.name, state = ?commit.state, "control committed");
        store.write().apply(commit);
    };

    // --- Render effect ---
    // Re-runs whenever the edit document or the source image changes.
    let render_client = client.clone();
    use_effect(move || {
        let edits = document();
        if source().is_none() {
            return;
        }
        let Some(request) = sync.write().begin(&edits) else {
            return;
        };
        let client = render_client.clone();

        spawn(async move {
            if debounce_ms > 0 {
                gloo_timers::future::TimeoutFuture::new(debounce_ms).await;
            }
            // Superseded while waiting: a newer request will be sent instead.
            if !sync.peek().is_current(request.ticket) {
                return;
            }

            let result = client.render(&request).await;
            let outcome = sync.write().finish(request.ticket, result);
            match outcome {
                SyncOutcome::Applied => error.set(None),
                SyncOutcome::Stale => {}
                SyncOutcome::Failed(e) => {
                    tracing::warn!(ticket = %request.ticket, error = %e, "render failed");
                    error.set(Some(format!("Render failed: {e}")));
                }
            }
        });
    });

    // --- Histogram effect ---
    // Re-runs whenever the working image changes or the view is toggled.
    let histogram_client = client;
    use_effect(move || {
        let visible = show_histogram();
        let image = working();
        if !visible {
            histogram.write().hide();
            histogram_error.set(None);
            return;
        }
        let Some(image) = image else {
            return;
        };
        let ticket = {
            let mut pipeline = histogram.write();
            pipeline.show();
            pipeline.request()
        };
        let Some(ticket) = ticket else {
            return;
        };
        let client = histogram_client.clone();

        spawn(async move {
            let result = client.histogram(&image).await;
            let outcome = histogram.write().complete(ticket, result);
            match outcome {
                HistogramOutcome::Rendered => histogram_error.set(None),
                HistogramOutcome::Stale => {}
                HistogramOutcome::Failed(e) => {
                    tracing::warn!(%ticket, error = %e, "histogram fetch failed");
                    histogram_error.set(Some(format!("Histogram unavailable: {e}")));
                }
                HistogramOutcome::RenderFailed(e) => {
                    tracing::warn!(%ticket, error = %e, "histogram chart failed");
                    histogram_error.set(Some(e.to_string()));
                }
            }
        });
    });

    // --- Save / print ---
    let on_save = move |()| {
        let image = (*working.peek()).clone();
        match lumen_io::save_image(image.as_ref(), &filename.peek()) {
            Ok(()) => {}
            Err(DownloadError::NoImage) => lumen_io::notify(NO_IMAGE_NOTICE),
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                error.set(Some(format!("Save failed: {e}")));
            }
        }
    };

    let mut print = move || -> bool {
        let image = (*working.peek()).clone();
        match lumen_io::print_image(image.as_ref()) {
            Ok(()) => true,
            Err(PrintError::NoImage) => {
                lumen_io::notify(NO_IMAGE_NOTICE);
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "print failed");
                error.set(Some(format!("Print failed: {e}")));
                true
            }
        }
    };

    // Ctrl+P / Cmd+P and menu prints go to the image-only view while an
    // image is loaded; the listeners are removed when the app unmounts
    // and its hook storage is dropped.
    use_hook(move || {
        Rc::new(PrintIntentListener::install(move |intent: PrintIntent| {
            tracing::debug!(?intent, "print requested");
            working.peek().is_some() && print()
        }))
    });

    let has_image = working.read().is_some();
    let (pending, histogram_loading, histogram_mode) = {
        let pipeline = histogram.read();
        (
            sync.read().is_pending(),
            pipeline.is_loading(),
            pipeline.data().map(lumen_edits::HistogramData::mode),
        )
    };

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }
        script { src: CHART_JS_URL }

        div { class: "app",
            header { class: "app-header",
                h1 { "lumen" }
                p { "Adjust, filter and inspect photos" }
            }

            main { class: "app-main",
                aside { class: "sidebar",
                    FileUpload { on_upload }
                    ControlPanel {
                        bank,
                        disabled: !has_image,
                        on_commit,
                    }
                }

                div { class: "workspace",
                    Toolbar {
                        histogram_visible: show_histogram(),
                        on_save,
                        on_print: move |()| {
                            print();
                        },
                        on_histogram: move |visible: bool| show_histogram.set(visible),
                    }

                    if let Some(ref err) = error() {
                        p { class: "error-banner", "{err}" }
                    }

                    Preview { image: working(), pending }

                    HistogramPanel {
                        visible: show_histogram(),
                        loading: histogram_loading,
                        mode: histogram_mode,
                        error: histogram_error(),
                    }
                }
            }
        }
    }
}
