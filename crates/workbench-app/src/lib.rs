//! Knowledge Workbench: WASM entry point.
//!
//! This crate is the composition root: it opens storage, picks the
//! transport, builds the chat session and hands everything to the egui UI.

pub mod app;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    const CANVAS_ID: &str = "workbench_canvas";

    /// Called from index.html once the module is instantiated
    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Knowledge Workbench starting...");

        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CANVAS_ID))
            .ok_or_else(|| JsValue::from_str("canvas element 'workbench_canvas' not found"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        let web_options = eframe::WebOptions::default();
        wasm_bindgen_futures::spawn_local(async move {
            let started = eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(|cc| Ok(Box::new(super::app::WorkbenchApp::new(cc)))),
                )
                .await;
            if let Err(e) = started {
                log::error!("Failed to start eframe: {:?}", e);
            }
        });
        Ok(())
    }
}
