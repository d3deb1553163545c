use codepad_app_editor::CodeEditorApp;
use leptos::*;
use leptos_meta::*;

const EDITOR_STYLES: &str = r#"
html, body { margin: 0; height: 100%; font-family: system-ui, sans-serif; }
.codepad-app { display: flex; flex-direction: column; height: 100vh; }
.codepad-app.theme-light { background: #f6f6f6; color: #1e1e1e; }
.codepad-app.theme-dark { background: #1e1e1e; color: #d4d4d4; }
.codepad-toolbar { display: flex; gap: 4px; padding: 6px; border-bottom: 1px solid #8884; }
.codepad-upload input { display: none; }
.codepad-main { display: flex; flex: 1; min-height: 0; }
.codepad-explorer { width: 240px; overflow: auto; border-right: 1px solid #8884; }
.codepad-explorer ul { list-style: none; margin: 0; padding: 0; }
.codepad-explorer-row { display: flex; align-items: center; justify-content: space-between; }
.codepad-explorer-row.selected { background: #3b82f633; }
.codepad-editor-pane { flex: 1; display: flex; flex-direction: column; min-width: 0; }
.codepad-editor { flex: 1; display: flex; min-height: 0; }
.codepad-gutter { padding: 8px 6px; text-align: right; opacity: 0.5; font-family: monospace; overflow: hidden; }
.codepad-textarea { flex: 1; resize: none; border: 0; padding: 8px; font-family: monospace; background: transparent; color: inherit; }
.codepad-statusbar { display: flex; gap: 12px; padding: 4px 8px; font-size: 12px; border-top: 1px solid #8884; }
.codepad-preview-pane { flex: 1; display: flex; border-left: 1px solid #8884; }
.codepad-preview { flex: 1; border: 0; background: white; }
.codepad-panel { width: 280px; overflow: auto; padding: 8px; border-left: 1px solid #8884; display: flex; flex-direction: column; gap: 6px; }
.codepad-panel header { display: flex; justify-content: space-between; align-items: center; }
.codepad-toasts { position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 6px; }
.codepad-toast { padding: 8px 12px; border-radius: 4px; color: white; }
.codepad-toast.success { background: #16a34a; }
.codepad-toast.warning { background: #d97706; }
.codepad-toast.error { background: #dc2626; }
"#;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Codepad" />
        <Meta name="description" content="An in-browser HTML, CSS and JavaScript editor with live preview." />
        <Style>{EDITOR_STYLES}</Style>

        <main class="site-root">
            <CodeEditorApp />
        </main>
    }
}
