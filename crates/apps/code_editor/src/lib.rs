//! Codepad editor UI: file explorer, editor pane, live preview, and side panels.
//!
//! The component owns one [`Workspace`] and mirrors its change events into Leptos signals. All
//! state transitions go through the workspace; signals only carry revision counters, saved-at
//! timestamps and transient toasts.

mod explorer;
mod panels;
mod upload;

use std::{rc::Rc, time::Duration};

use codepad_core::{
    editing::{self, EditKey, Shortcut},
    EditorSettings, FileId, NodeKind, Notice, NoticeLevel, Workspace, WorkspaceEvent,
    WorkspaceServices,
};
use leptos::*;

pub use explorer::{tree_rows, TreeRow};

use explorer::FileExplorer;
use panels::{SearchPanel, SettingsPanel};

const TOAST_LIFETIME: Duration = Duration::from_millis(3_000);
const UNTITLED_FILE: &str = "untitled.html";

#[derive(Clone, Copy)]
/// Reactive handle passed to the editor's child components.
pub(crate) struct EditorContext {
    workspace: StoredValue<Workspace>,
    revision: RwSignal<u64>,
    preview_revision: RwSignal<u64>,
}

impl EditorContext {
    fn with<T>(&self, f: impl FnOnce(&Workspace) -> T) -> T {
        self.workspace.with_value(f)
    }

    /// Like [`EditorContext::with`], but tolerates a disposed component (for async callbacks).
    fn try_with<T>(&self, f: impl FnOnce(&Workspace) -> T) -> Option<T> {
        self.workspace.try_with_value(f)
    }

    /// Subscribes the calling reactive scope to workspace state changes.
    fn track(&self) {
        let _ = self.revision.get();
    }

    fn active_file(&self) -> Option<FileId> {
        self.track();
        self.with(Workspace::active_file)
    }

    fn settings(&self) -> EditorSettings {
        self.track();
        self.with(Workspace::settings)
    }

    fn update_settings(&self, change: impl FnOnce(&mut EditorSettings)) {
        let mut settings = self.with(Workspace::settings);
        change(&mut settings);
        self.with(|workspace| workspace.update_settings(settings));
    }

    fn with_active(&self, f: impl FnOnce(&Workspace, FileId)) {
        self.with(|workspace| {
            if let Some(id) = workspace.active_file() {
                f(workspace, id);
            }
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    id: u64,
    notice: Notice,
}

#[component]
/// The whole editor page.
pub fn CodeEditorApp() -> impl IntoView {
    let workspace = Workspace::new(WorkspaceServices {
        prefs: Rc::new(platform_host_web::prefs_store()),
        timers: Rc::new(platform_host_web::timer_service()),
    });

    let revision = create_rw_signal(0u64);
    let preview_revision = create_rw_signal(0u64);
    let last_saved = create_rw_signal::<Option<u64>>(None);
    let toasts = create_rw_signal(Vec::<Toast>::new());
    let next_toast = store_value(0u64);
    let search_open = create_rw_signal(false);
    let settings_open = create_rw_signal(false);

    workspace.subscribe(move |event| match event {
        WorkspaceEvent::StateChanged => revision.update(|r| *r += 1),
        WorkspaceEvent::PreviewChanged => preview_revision.update(|r| *r += 1),
        WorkspaceEvent::Saved { at_unix_ms } => last_saved.set(Some(*at_unix_ms)),
        WorkspaceEvent::Notice(notice) => {
            let id = next_toast.get_value();
            next_toast.set_value(id + 1);
            toasts.update(|list| {
                list.push(Toast {
                    id,
                    notice: notice.clone(),
                })
            });
            set_timeout(
                move || {
                    let _ = toasts.try_update(|list| list.retain(|toast| toast.id != id));
                },
                TOAST_LIFETIME,
            );
        }
    });

    let ctx = EditorContext {
        workspace: store_value(workspace.clone()),
        revision,
        preview_revision,
    };

    spawn_local({
        let workspace = workspace.clone();
        async move {
            workspace.hydrate().await;
            logging::log!(
                "codepad hydrated with host strategy `{}`",
                platform_host_web::host_strategy_name()
            );
        }
    });
    on_cleanup(move || workspace.shutdown());

    let shortcut_listener = window_event_listener(ev::keydown, move |ev| {
        let Some(shortcut) =
            editing::shortcut_for(&ev.key(), ev.ctrl_key() || ev.meta_key(), ev.shift_key())
        else {
            return;
        };
        ev.prevent_default();
        run_shortcut(ctx, shortcut, search_open);
    });
    on_cleanup(move || shortcut_listener.remove());

    let theme_class = move || format!("codepad-app theme-{}", ctx.settings().theme.as_str());
    let preview_html = move || {
        let _ = preview_revision.get();
        ctx.with(Workspace::current_preview_html)
    };

    view! {
        <div class=theme_class>
            <Toolbar ctx=ctx search_open=search_open settings_open=settings_open />
            <div class="codepad-main">
                <FileExplorer ctx=ctx />
                <EditorPane ctx=ctx last_saved=last_saved />
                <section class="codepad-preview-pane" aria-label="Preview">
                    <iframe
                        class="codepad-preview"
                        title="Preview"
                        sandbox="allow-scripts"
                        srcdoc=preview_html
                    ></iframe>
                </section>
                <Show when=move || search_open.get()>
                    <SearchPanel ctx=ctx open=search_open />
                </Show>
                <Show when=move || settings_open.get()>
                    <SettingsPanel ctx=ctx open=settings_open />
                </Show>
            </div>
            <div class="codepad-toasts" role="status" aria-live="polite">
                <For each=move || toasts.get() key=|toast| toast.id let:toast>
                    <div class=format!("codepad-toast {}", level_class(toast.notice.level))>
                        {toast.notice.message.clone()}
                    </div>
                </For>
            </div>
        </div>
    }
}

#[component]
fn Toolbar(
    ctx: EditorContext,
    search_open: RwSignal<bool>,
    settings_open: RwSignal<bool>,
) -> impl IntoView {
    let on_upload = move |ev: ev::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        let files = upload::selected_files(&input);
        input.set_value("");
        spawn_local(async move {
            for file in files {
                let name = file.name();
                match upload::read_text(&file).await {
                    Ok(text) => {
                        let _ = ctx.try_with(|w| w.upload_file(&name, &text));
                    }
                    Err(err) => {
                        logging::warn!("upload read failed for {name}: {err}");
                        ctx.try_with(|w| w.notify(Notice::error(format!("Failed to read {name}"))));
                    }
                }
            }
        });
    };

    let on_export = move |_| {
        let Some(Ok(artifact)) = ctx.try_with(Workspace::export_project) else {
            return;
        };
        let notice = match platform_host_web::download_text_file(
            &artifact.file_name,
            artifact.mime,
            &artifact.contents,
        ) {
            Ok(()) if artifact.file_count == 1 => {
                Notice::success(format!("{} exported successfully!", artifact.file_name))
            }
            Ok(()) => Notice::success(format!(
                "{} files exported successfully!",
                artifact.file_count
            )),
            Err(err) => {
                logging::warn!("export download failed: {err}");
                Notice::error("Failed to export files")
            }
        };
        ctx.with(|w| w.notify(notice));
    };

    view! {
        <header class="codepad-toolbar" role="toolbar" aria-label="Editor actions">
            <button
                type="button"
                on:click=move |_| {
                    let _ = ctx.with(|w| w.create_file(UNTITLED_FILE, NodeKind::File, None));
                }
            >
                "New"
            </button>
            <label class="codepad-upload">
                "Upload"
                <input type="file" accept=".html,.css,.js" multiple on:change=on_upload />
            </label>
            <button type="button" on:click=move |_| ctx.with(Workspace::save)>"Save"</button>
            <button type="button" on:click=move |_| run_shortcut(ctx, Shortcut::Undo, search_open)>
                "Undo"
            </button>
            <button type="button" on:click=move |_| run_shortcut(ctx, Shortcut::Redo, search_open)>
                "Redo"
            </button>
            <button
                type="button"
                on:click=move |_| run_shortcut(ctx, Shortcut::ClearContent, search_open)
            >
                "Clear"
            </button>
            <button type="button" on:click=move |_| ctx.with(Workspace::run_preview)>"Run"</button>
            <button type="button" on:click=on_export>"Export"</button>
            <button type="button" on:click=move |_| search_open.update(|open| *open = !*open)>
                "Search"
            </button>
            <button type="button" on:click=move |_| settings_open.update(|open| *open = !*open)>
                "Settings"
            </button>
            <button
                type="button"
                on:click=move |_| ctx.update_settings(|s| s.theme = s.theme.toggled())
            >
                {move || format!("Theme: {}", ctx.settings().theme.as_str())}
            </button>
        </header>
    }
}

#[component]
fn EditorPane(ctx: EditorContext, last_saved: RwSignal<Option<u64>>) -> impl IntoView {
    let active_node = move || {
        ctx.track();
        ctx.with(|w| w.active_file().and_then(|id| w.get_file(id)))
    };
    let active_text = move || {
        active_node()
            .and_then(|node| node.content().map(str::to_string))
            .unwrap_or_default()
    };
    let line_count = move || active_text().split('\n').count();

    let on_input = move |ev: ev::Event| {
        let text = event_target_value(&ev);
        ctx.with_active(|w, id| {
            let _ = w.edit_content(id, &text);
        });
    };

    let editor_style = move || {
        let settings = ctx.settings();
        format!(
            "font-size: {}px; tab-size: {};",
            settings.font_size, settings.tab_size
        )
    };

    view! {
        <section class="codepad-editor-pane" aria-label="Editor">
            <div class="codepad-editor">
                <Show when=move || ctx.settings().line_numbers>
                    <div class="codepad-gutter" aria-hidden="true" style=editor_style>
                        {move || (1..=line_count()).map(|n| view! { <div>{n}</div> }).collect_view()}
                    </div>
                </Show>
                <textarea
                    class="codepad-textarea"
                    style=editor_style
                    wrap=move || if ctx.settings().word_wrap { "soft" } else { "off" }
                    prop:value=active_text
                    prop:disabled=move || active_node().is_none()
                    on:input=on_input
                    on:keydown=move |ev| assist_keydown(ctx, ev)
                    spellcheck="false"
                    autocomplete="off"
                    aria-label="Code editor"
                ></textarea>
            </div>
            <footer class="codepad-statusbar">
                <span>{move || active_node().map(|n| n.name).unwrap_or_else(|| "No file".into())}</span>
                <span>
                    {move || {
                        active_node()
                            .and_then(|n| n.content_type())
                            .map(|t| t.as_str().to_uppercase())
                            .unwrap_or_default()
                    }}
                </span>
                <span>{move || format!("Lines: {}", line_count())}</span>
                <span>{move || format!("Chars: {}", active_text().chars().count())}</span>
                <span>
                    {move || {
                        last_saved
                            .get()
                            .map(|ms| format!("Saved {}", local_time(ms)))
                            .unwrap_or_else(|| "Not saved yet".to_string())
                    }}
                </span>
            </footer>
        </section>
    }
}

fn assist_keydown(ctx: EditorContext, ev: ev::KeyboardEvent) {
    if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let key = match ev.key().as_str() {
        "Tab" => EditKey::Tab,
        "Enter" => EditKey::Enter,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => EditKey::Char(ch),
                _ => return,
            }
        }
    };
    let Some(id) = ctx.with(Workspace::active_file) else {
        return;
    };

    let textarea: web_sys::HtmlTextAreaElement = event_target(&ev);
    let text = textarea.value();
    let start = textarea.selection_start().ok().flatten().unwrap_or(0) as usize;
    let end = textarea
        .selection_end()
        .ok()
        .flatten()
        .map_or(start, |end| end as usize);
    let settings = ctx.with(Workspace::settings);
    let Some(edit) = editing::apply_key(
        &text,
        editing::char_offset_from_utf16(&text, start),
        editing::char_offset_from_utf16(&text, end),
        key,
        &settings,
    ) else {
        return;
    };

    ev.prevent_default();
    let _ = ctx.with(|w| w.edit_content(id, &edit.text));
    textarea.set_value(&edit.text);
    let caret = editing::utf16_offset_from_char(&edit.text, edit.caret) as u32;
    let _ = textarea.set_selection_range(caret, caret);
}

fn run_shortcut(ctx: EditorContext, shortcut: Shortcut, search_open: RwSignal<bool>) {
    match shortcut {
        Shortcut::Save => ctx.with(Workspace::save),
        Shortcut::Undo => ctx.with_active(|w, id| {
            let _ = w.undo(id);
        }),
        Shortcut::Redo => ctx.with_active(|w, id| {
            let _ = w.redo(id);
        }),
        Shortcut::ClearContent => ctx.with_active(|w, id| {
            let _ = w.clear_content(id);
        }),
        Shortcut::Search => search_open.set(true),
        Shortcut::NewFile => {
            let _ = ctx.with(|w| w.create_file(UNTITLED_FILE, NodeKind::File, None));
        }
        Shortcut::ZoomIn => ctx.update_settings(|s| s.font_size = s.font_size.saturating_add(1)),
        Shortcut::ZoomOut => ctx.update_settings(|s| s.font_size = s.font_size.saturating_sub(1)),
        Shortcut::ResetZoom => {
            ctx.update_settings(|s| s.font_size = EditorSettings::default().font_size)
        }
    }
}

fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "success",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    }
}

fn local_time(unix_ms: u64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(unix_ms as f64));
    String::from(date.to_locale_time_string("en-US"))
}
