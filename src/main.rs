//! PDF Annotator entry point
//!
//! Handles platform-specific initialization and wires the autosave coordinator to the page.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement};

    use pdf_annotator::autosave::{AutosaveStatus, Coordinator, Notice, Notifier};
    use pdf_annotator::persistence::IndexedDbStore;
    use pdf_annotator::platform::BrowserExecutor;
    use pdf_annotator::consts::DEFAULT_LANGUAGE;
    use pdf_annotator::settings::{LocalSettings, next_language};
    use pdf_annotator::viewer::WebViewerBridge;

    type App = Coordinator<WebViewerBridge, IndexedDbStore>;

    const VIEWER_PATH: &str = "/lib/webviewer";

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if disabled {
                el.set_attribute("disabled", "")
            } else {
                el.remove_attribute("disabled")
            };
        }
    }

    /// Mirrors coordinator status onto the page controls
    struct DomNotifier;

    impl Notifier for DomNotifier {
        fn status_changed(&self, status: &AutosaveStatus) {
            let Some(document) = document() else {
                return;
            };

            if let Some(toggle) = document
                .get_element_by_id("autosave-toggle")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                toggle.set_checked(status.autosave_enabled);
            }

            set_hidden(&document, "autosave-indicator", !status.is_autosaving());

            // Manual controls only make sense while autosave is off
            set_hidden(&document, "save-btn", status.autosave_enabled);
            set_hidden(&document, "clear-btn", status.autosave_enabled);
            set_disabled(&document, "save-btn", !status.can_save_manually());
            set_disabled(&document, "clear-btn", !status.can_clear_saved());
        }

        fn notice(&self, notice: &Notice) {
            if notice.is_error() {
                log::warn!("{}", notice);
            } else {
                log::info!("{}", notice);
            }
            if let Some(el) = document().and_then(|d| d.get_element_by_id("notice")) {
                el.set_text_content(Some(&notice.to_string()));
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("PDF Annotator starting...");

        let Some(document) = document() else {
            log::error!("No document available");
            return;
        };
        let Some(element) = document.get_element_by_id("viewer") else {
            log::error!("Missing #viewer element");
            return;
        };

        let viewer = match WebViewerBridge::create(
            &element,
            VIEWER_PATH,
            option_env!("WEBVIEWER_LICENSE_KEY"),
            DEFAULT_LANGUAGE,
        )
        .await
        {
            Ok(viewer) => Rc::new(viewer),
            Err(e) => {
                log::error!("Failed to create viewer: {}", e);
                return;
            }
        };

        let app: App = Coordinator::builder(
            viewer,
            Rc::new(IndexedDbStore::new()),
            Rc::new(BrowserExecutor),
        )
        .settings(Rc::new(LocalSettings))
        .notifier(Rc::new(DomNotifier))
        .build();

        setup_autosave_toggle(&document, app.clone());
        setup_save_button(&document, app.clone());
        setup_clear_button(&document, app.clone());
        setup_close_button(&document, app.clone());
        setup_language_button(&document, app.clone());

        let outcome = app.start().await;
        log::info!("PDF Annotator running ({:?})", outcome);
    }

    fn setup_autosave_toggle(document: &Document, app: App) {
        if let Some(toggle) = document
            .get_element_by_id("autosave-toggle")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let input = toggle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let enabled = input.checked();
                let app = app.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = app.set_autosave(enabled).await {
                        log::warn!("Toggling autosave: {}", e);
                    }
                });
            });
            let _ = toggle
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_save_button(document: &Document, app: App) {
        if let Some(btn) = document.get_element_by_id("save-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let app = app.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    // Outcome is reported through the notifier
                    let _ = app.save_now().await;
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_clear_button(document: &Document, app: App) {
        if let Some(btn) = document.get_element_by_id("clear-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let app = app.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let _ = app.clear_saved().await;
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_close_button(document: &Document, app: App) {
        if let Some(btn) = document.get_element_by_id("close-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.viewer().close_document();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_language_button(document: &Document, app: App) {
        if let Some(btn) = document.get_element_by_id("language-btn") {
            btn.set_text_content(Some(&DEFAULT_LANGUAGE.to_uppercase()));
            let label = btn.clone();
            let mut language = DEFAULT_LANGUAGE;
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                language = next_language(language);
                app.viewer().set_language(language);
                label.set_text_content(Some(&language.to_uppercase()));
                log::info!("Viewer language set to {}", language);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("PDF Annotator (native) starting...");
    log::info!("Native mode drives a headless viewer - run with `trunk serve` for the web version");

    println!("\nRunning autosave walkthrough...");
    autosave_walkthrough();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Open, edit, wait out the debounce, then restore into a fresh session
#[cfg(not(target_arch = "wasm32"))]
fn autosave_walkthrough() {
    use std::rc::Rc;
    use std::time::Duration;

    use pdf_annotator::autosave::{Coordinator, RecordingNotifier, RestoreOutcome};
    use pdf_annotator::consts::DEBOUNCE_MS;
    use pdf_annotator::persistence::MemoryStore;
    use pdf_annotator::platform::ManualExecutor;
    use pdf_annotator::settings::{MemorySettings, Settings};
    use pdf_annotator::viewer::HeadlessViewer;

    let store = Rc::new(MemoryStore::new());
    let settings = Rc::new(MemorySettings::new(Settings::default()));

    // First session: autosave switched on by the user
    {
        let exec = Rc::new(ManualExecutor::new());
        let viewer = Rc::new(HeadlessViewer::new());
        let notices = Rc::new(RecordingNotifier::new());
        let app = Coordinator::builder(viewer.clone(), store.clone(), exec.clone())
            .settings(settings.clone())
            .notifier(notices.clone())
            .build();

        if exec.block_on(app.start()) != Some(RestoreOutcome::Empty) {
            println!("✗ Expected an empty store on first start");
            return;
        }
        if let Some(Err(e)) = exec.block_on(app.set_autosave(true)) {
            println!("✗ Could not enable autosave: {}", e);
            return;
        }

        viewer.open(b"%PDF-1.7 walkthrough".to_vec(), "walkthrough.pdf");
        viewer.annotate("<xfdf><annots>highlight</annots></xfdf>");
        println!("  status while editing: {:?}", app.status());

        exec.advance(Duration::from_millis(DEBOUNCE_MS));
        println!("  writes after quiet period: {}", store.save_count());
        app.dispose();
    }

    // Second session restores what the first one saved
    let exec = Rc::new(ManualExecutor::new());
    let viewer = Rc::new(HeadlessViewer::new());
    let app = Coordinator::builder(viewer.clone(), store.clone(), exec.clone())
        .settings(settings)
        .build();

    match exec.block_on(app.start()) {
        Some(RestoreOutcome::Restored { overlay_imported }) => {
            println!(
                "  restored {:?} (annotations imported: {})",
                viewer.filename().unwrap_or_default(),
                overlay_imported
            );
            println!("✓ Autosave walkthrough passed!");
        }
        other => println!("✗ Unexpected restore outcome: {:?}", other),
    }
}
