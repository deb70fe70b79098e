//! Typed wrappers around JS interop via `js_sys::eval()`.
//!
//! D3.js chart functions are split across `assets/js/*.js` and loaded at runtime.
//! They are evaluated as globals (no ES modules) and exposed via `window.*`.
//! This module serializes chart datasets, calls those globals, and routes
//! chart clicks back into Rust.

use mill_data::chart::{ChartClick, ChartDataset, ChartKind};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;

// Embed all D3 chart JS files at compile time
static TOOLTIP_JS: &str = include_str!("../assets/js/tooltip.js");
static BAR_CHART_JS: &str = include_str!("../assets/js/bar-chart.js");
static LINE_CHART_JS: &str = include_str!("../assets/js/line-chart.js");
static PIE_CHART_JS: &str = include_str!("../assets/js/pie-chart.js");

/// Globals promoted to `window` once D3 is available.
const CHART_GLOBALS: [&str; 7] = [
    "renderBarChart",
    "renderLineChart",
    "renderPieChart",
    "initTooltip",
    "showTooltip",
    "hideTooltip",
    "millReportClick",
];

/// Name of the window property chart clicks are reported through.
const CLICK_HOOK: &str = "__millChartClick";

/// Execute arbitrary JS, wrapping in try/catch to avoid panics.
pub fn call_js(code: &str) {
    let wrapped = format!(
        "try {{ {} }} catch(e) {{ console.warn('Mill JS call failed:', e); }}",
        code
    );
    let _ = js_sys::eval(&wrapped);
}

/// Initialize chart scripts with a wait-for-D3 polling loop.
///
/// The scripts are stored on `window` and evaluated at global scope (indirect
/// eval) once D3 is ready, so their `function` declarations are not
/// block-scoped inside the polling callback.
pub fn init_charts() {
    let all_js = [TOOLTIP_JS, BAR_CHART_JS, LINE_CHART_JS, PIE_CHART_JS].join("\n");
    let store_js = format!(
        "window.__millChartScripts = {};",
        serde_json::to_string(&all_js).unwrap_or_default()
    );
    let _ = js_sys::eval(&store_js);

    let promote: String = CHART_GLOBALS
        .iter()
        .map(|name| format!("if (typeof {name} !== 'undefined') window.{name} = {name};"))
        .collect::<Vec<_>>()
        .join("\n");
    let init_js = format!(
        r#"
        (function() {{
            if (window.__millChartsReady) return;
            var waitForD3 = setInterval(function() {{
                if (typeof d3 !== 'undefined' && window.__millChartScripts) {{
                    clearInterval(waitForD3);
                    (0, eval)(window.__millChartScripts);
                    delete window.__millChartScripts;
                    {promote}
                    window.__millChartsReady = true;
                    console.log('[Mill] charts initialized');
                }}
            }}, 100);
        }})();
        "#
    );
    let _ = js_sys::eval(&init_js);
}

/// The JS renderer for a dataset kind.
pub fn renderer(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Bar | ChartKind::MiniBar => "renderBarChart",
        ChartKind::Line => "renderLineChart",
        ChartKind::Pie => "renderPieChart",
    }
}

/// Quote a JSON document as a single-quoted JS string literal.
fn js_string_arg(json: &str) -> String {
    json.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// The polling render call for `dataset` into `container_id`.
pub fn render_script(container_id: &str, dataset: &ChartDataset, config_json: &str) -> String {
    let function = renderer(dataset.kind);
    let data = js_string_arg(&serde_json::to_string(dataset).unwrap_or_default());
    let config = js_string_arg(config_json);
    format!(
        r#"
        (function() {{
            var poll = setInterval(function() {{
                if (window.__millChartsReady &&
                    typeof window.{function} !== 'undefined' &&
                    document.getElementById('{container_id}')) {{
                    clearInterval(poll);
                    try {{
                        window.{function}('{container_id}', '{data}', '{config}');
                    }} catch(e) {{ console.error('[Mill] {function} error:', e); }}
                }}
            }}, 100);
        }})();
        "#
    )
}

/// Render `dataset` into the container with the matching D3 function.
///
/// Uses a polling loop to wait for D3.js to load, chart scripts to initialize,
/// and the container DOM element to exist before rendering.
pub fn render_chart(container_id: &str, dataset: &ChartDataset, config_json: &str) {
    log::debug!(
        "[Mill] Rendering {} ({} points) into {}",
        dataset.title,
        dataset.points.len(),
        container_id
    );
    call_js(&render_script(container_id, dataset, config_json));
}

/// Destroy/clean up a chart in the given container.
pub fn destroy_chart(container_id: &str) {
    call_js(&format!(
        "var el = document.getElementById('{}'); if (el) el.innerHTML = '';",
        container_id
    ));
}

/// Decode the `(containerId, clickJson)` pair the chart scripts report.
pub fn parse_click(click_json: &str) -> Option<ChartClick> {
    match serde_json::from_str(click_json) {
        Ok(click) => Some(click),
        Err(e) => {
            log::warn!("[Mill] Unreadable chart click: {}", e);
            None
        }
    }
}

/// Route chart clicks to `handler` as `(container_id, click)`.
///
/// Installs a single window-level hook; a later call replaces the handler.
pub fn on_chart_click(mut handler: impl FnMut(String, ChartClick) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let hook = Closure::<dyn FnMut(String, String)>::new(move |container_id: String, json: String| {
        if let Some(click) = parse_click(&json) {
            handler(container_id, click);
        }
    });
    if js_sys::Reflect::set(&window, &JsValue::from_str(CLICK_HOOK), hook.as_ref()).is_err() {
        log::warn!("[Mill] Could not install chart click hook");
    }
    // The hook lives as long as the page.
    hook.forget();
}
