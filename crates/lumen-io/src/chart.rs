//! Chart.js renderer for the histogram pipeline.
//!
//! Chart.js is loaded by the page as a global script; this module binds
//! its constructor and `destroy()` and feeds it the serialized
//! [`ChartConfig`].

use lumen_edits::{ChartConfig, ChartError, ChartRenderer};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Script URL for the Chart.js UMD bundle.
pub const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

#[wasm_bindgen]
extern "C" {
    /// A live Chart.js instance.
    #[wasm_bindgen(js_name = Chart)]
    pub type JsChart;

    #[wasm_bindgen(catch, constructor, js_class = "Chart")]
    fn new(canvas: &web_sys::HtmlCanvasElement, config: &JsValue) -> Result<JsChart, JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &JsChart);
}

/// Draws charts into the `<canvas>` with a fixed element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartJs {
    canvas_id: String,
}

impl ChartJs {
    /// A renderer targeting `<canvas id="{canvas_id}">`.
    #[must_use]
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
        }
    }

    fn canvas(&self) -> Result<web_sys::HtmlCanvasElement, ChartError> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&self.canvas_id))
            .ok_or_else(|| ChartError(format!("no element #{}", self.canvas_id)))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| ChartError(format!("#{} is not a canvas", self.canvas_id)))
    }
}

impl ChartRenderer for ChartJs {
    type Handle = JsChart;

    fn create(&mut self, config: &ChartConfig) -> Result<JsChart, ChartError> {
        let canvas = self.canvas()?;
        let json = serde_json::to_string(config).map_err(|e| ChartError(e.to_string()))?;
        let config = js_sys::JSON::parse(&json).map_err(|e| ChartError(format!("{e:?}")))?;
        JsChart::new(&canvas, &config).map_err(|e| ChartError(format!("{e:?}")))
    }

    fn destroy(&mut self, handle: JsChart) {
        handle.destroy();
    }
}
