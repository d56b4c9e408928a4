//! Source/working image bookkeeping for backend renders.
//!
//! The backend always renders from the untouched source image with the
//! full edit document. [`SyncDriver`] hands out one [`RenderRequest`] per
//! document change and accepts a response only if it belongs to the most
//! recent request, so the working image never regresses to an older
//! edit state when responses arrive out of order.

use crate::document::EditDocument;
use crate::encoded::EncodedImage;
use crate::ticket::{RequestTracker, Ticket};

/// Everything needed to send one render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Ticket to hand back to [`SyncDriver::finish`].
    pub ticket: Ticket,
    /// The source image (never the working image).
    pub image: EncodedImage,
    /// Snapshot of the complete edit document.
    pub edits: EditDocument,
}

/// What happened to a completed render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome<E> {
    /// The response replaced the working image.
    Applied,
    /// A newer request was issued since; the response was dropped.
    Stale,
    /// The current request failed; the working image is unchanged.
    Failed(E),
}

/// Tracks the source image, the working image and which render is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncDriver {
    tracker: RequestTracker,
    source: Option<EncodedImage>,
    working: Option<EncodedImage>,
    pending: bool,
}

impl SyncDriver {
    /// A driver with no image loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the source image. The working image starts as a copy of it
    /// and any in-flight render is superseded.
    pub fn load(&mut self, image: EncodedImage) {
        tracing::info!(%image, "source image loaded");
        self.tracker.invalidate();
        self.working = Some(image.clone());
        self.source = Some(image);
        self.pending = false;
    }

    /// Start a render of the source image with `edits`.
    ///
    /// Returns `None` when no image is loaded.
    pub fn begin(&mut self, edits: &EditDocument) -> Option<RenderRequest> {
        let image = self.source.clone()?;
        let ticket = self.tracker.issue();
        self.pending = true;
        tracing::debug!(%ticket, controls = edits.len(), "render issued");
        Some(RenderRequest {
            ticket,
            image,
            edits: edits.clone(),
        })
    }

    /// Whether a response for `ticket` would still be applied.
    ///
    /// Used to skip sending a request that was superseded while waiting
    /// out the debounce interval.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.tracker.is_current(ticket)
    }

    /// Feed the result of the render issued with `ticket`.
    pub fn finish<E>(
        &mut self,
        ticket: Ticket,
        result: Result<EncodedImage, E>,
    ) -> SyncOutcome<E> {
        if !self.tracker.is_current(ticket) {
            tracing::debug!(%ticket, "discarding stale render");
            return SyncOutcome::Stale;
        }
        self.pending = false;
        match result {
            Ok(image) => {
                tracing::debug!(%ticket, %image, "working image updated");
                self.working = Some(image);
                SyncOutcome::Applied
            }
            Err(e) => SyncOutcome::Failed(e),
        }
    }

    /// The untouched image as loaded.
    #[must_use]
    pub const fn source(&self) -> Option<&EncodedImage> {
        self.source.as_ref()
    }

    /// The most recent accepted render (or the source before any render).
    #[must_use]
    pub const fn working(&self) -> Option<&EncodedImage> {
        self.working.as_ref()
    }

    /// Whether the current request is still awaiting its response.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::{Commit, ControlState, EditStore};

    fn image(tag: &str) -> EncodedImage {
        EncodedImage::parse(&format!("data:image/png;base64,{tag}")).unwrap()
    }

    fn slider(name: &str, value: u8) -> Commit {
        Commit::new(
            name,
            ControlState::Continuous {
                enabled: true,
                value,
            },
        )
    }

    #[test]
    fn nothing_to_render_without_source() {
        let mut driver = SyncDriver::new();
        assert!(driver.begin(&EditDocument::new()).is_none());
        assert!(driver.working().is_none());
    }

    #[test]
    fn load_seeds_working_image() {
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));
        assert_eq!(driver.working(), Some(&image("SRC")));
        assert_eq!(driver.source(), Some(&image("SRC")));
        assert!(!driver.is_pending());
    }

    #[test]
    fn requests_always_carry_source_image() {
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));
        let first = driver.begin(&EditDocument::new()).unwrap();
        assert_eq!(driver.finish::<()>(first.ticket, Ok(image("R1"))), SyncOutcome::Applied);

        let second = driver.begin(&EditDocument::new()).unwrap();
        assert_eq!(second.image, image("SRC"));
        assert_eq!(driver.working(), Some(&image("R1")));
    }

    #[test]
    fn late_older_response_never_overwrites_newer() {
        let mut store = EditStore::new();
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));

        store.apply(slider("contrast", 70));
        let r1 = driver.begin(store.document()).unwrap();
        store.apply(slider("brightness", 40));
        let r2 = driver.begin(store.document()).unwrap();
        assert_eq!(r2.edits.len(), 2);

        assert_eq!(driver.finish::<()>(r2.ticket, Ok(image("R2"))), SyncOutcome::Applied);
        assert_eq!(driver.finish::<()>(r1.ticket, Ok(image("R1"))), SyncOutcome::Stale);
        assert_eq!(driver.working(), Some(&image("R2")));
        assert!(!driver.is_pending());
    }

    #[test]
    fn in_order_responses_end_on_latest() {
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));
        let r1 = driver.begin(&EditDocument::new()).unwrap();
        let r2 = driver.begin(&EditDocument::new()).unwrap();

        assert_eq!(driver.finish::<()>(r1.ticket, Ok(image("R1"))), SyncOutcome::Stale);
        assert!(driver.is_pending());
        assert_eq!(driver.finish::<()>(r2.ticket, Ok(image("R2"))), SyncOutcome::Applied);
        assert_eq!(driver.working(), Some(&image("R2")));
    }

    #[test]
    fn failure_keeps_previous_working_image() {
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));
        let ok = driver.begin(&EditDocument::new()).unwrap();
        let _ = driver.finish::<&str>(ok.ticket, Ok(image("R1")));

        let bad = driver.begin(&EditDocument::new()).unwrap();
        assert_eq!(
            driver.finish(bad.ticket, Err("backend down")),
            SyncOutcome::Failed("backend down")
        );
        assert_eq!(driver.working(), Some(&image("R1")));
        assert!(!driver.is_pending());
    }

    #[test]
    fn stale_failure_is_silent() {
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));
        let old = driver.begin(&EditDocument::new()).unwrap();
        let _new = driver.begin(&EditDocument::new()).unwrap();
        assert_eq!(driver.finish(old.ticket, Err("timeout")), SyncOutcome::Stale);
    }

    #[test]
    fn request_superseded_during_debounce_is_not_current() {
        let mut store = EditStore::new();
        let mut driver = SyncDriver::new();
        driver.load(image("SRC"));

        let waiting = driver.begin(store.document()).unwrap();
        store.apply(Commit::new("grayscale", ControlState::Toggle { enabled: true }));
        let latest = driver.begin(store.document()).unwrap();

        assert!(!driver.is_current(waiting.ticket));
        assert!(driver.is_current(latest.ticket));
        assert!(driver.is_pending());
        assert_eq!(driver.finish::<()>(latest.ticket, Ok(image("R"))), SyncOutcome::Applied);
        assert_eq!(driver.working(), Some(&image("R")));
    }

    #[test]
    fn reload_supersedes_in_flight_render() {
        let mut driver = SyncDriver::new();
        driver.load(image("A"));
        let request = driver.begin(&EditDocument::new()).unwrap();
        driver.load(image("B"));

        assert!(!driver.is_current(request.ticket));
        assert_eq!(driver.finish::<()>(request.ticket, Ok(image("RA"))), SyncOutcome::Stale);
        assert_eq!(driver.working(), Some(&image("B")));
    }
}
