use codepad_core::{
    settings::{MAX_FONT_SIZE, MIN_FONT_SIZE, TAB_SIZES},
    EditorSettings, SearchQuery,
};
use leptos::*;

use crate::EditorContext;

#[component]
pub(crate) fn SearchPanel(ctx: EditorContext, open: RwSignal<bool>) -> impl IntoView {
    let pattern = create_rw_signal(String::new());
    let replacement = create_rw_signal(String::new());
    let case_sensitive = create_rw_signal(false);
    let whole_word = create_rw_signal(false);

    let query = move || SearchQuery {
        pattern: pattern.get(),
        case_sensitive: case_sensitive.get(),
        whole_word: whole_word.get(),
    };
    let hits = move || {
        ctx.track();
        let query = query();
        ctx.with(|w| w.search(&query))
    };
    let replace = move |_| {
        let query = query();
        ctx.with_active(|w, id| {
            let _ = w.replace_in_file(id, &query, &replacement.get_untracked());
        });
    };

    view! {
        <aside class="codepad-panel codepad-search" aria-label="Search">
            <header>
                <h2>"Search"</h2>
                <button type="button" title="Close" on:click=move |_| open.set(false)>"✕"</button>
            </header>
            <input
                type="search"
                placeholder="Find (regex)"
                prop:value=move || pattern.get()
                on:input=move |ev| pattern.set(event_target_value(&ev))
            />
            <input
                type="text"
                placeholder="Replace with"
                prop:value=move || replacement.get()
                on:input=move |ev| replacement.set(event_target_value(&ev))
            />
            <label>
                <input
                    type="checkbox"
                    prop:checked=move || case_sensitive.get()
                    on:change=move |ev| case_sensitive.set(event_target_checked(&ev))
                />
                "Match case"
            </label>
            <label>
                <input
                    type="checkbox"
                    prop:checked=move || whole_word.get()
                    on:change=move |ev| whole_word.set(event_target_checked(&ev))
                />
                "Whole word"
            </label>
            <button type="button" on:click=replace>"Replace all in file"</button>
            <ul class="codepad-search-results">
                {move || {
                    hits()
                        .into_iter()
                        .map(|hit| {
                            let id = hit.file_id;
                            view! {
                                <li>
                                    <button
                                        type="button"
                                        on:click=move |_| {
                                            let _ = ctx.with(|w| w.set_active_file(Some(id)));
                                        }
                                    >
                                        <span class="codepad-search-location">
                                            {format!("{}:{}", hit.path, hit.line)}
                                        </span>
                                        <code>{hit.snippet}</code>
                                    </button>
                                </li>
                            }
                        })
                        .collect_view()
                }}
            </ul>
        </aside>
    }
}

#[component]
pub(crate) fn SettingsPanel(ctx: EditorContext, open: RwSignal<bool>) -> impl IntoView {
    let toggle = move |label: &'static str,
                       read: fn(&EditorSettings) -> bool,
                       write: fn(&mut EditorSettings, bool)| {
        view! {
            <label>
                <input
                    type="checkbox"
                    prop:checked=move || read(&ctx.settings())
                    on:change=move |ev| {
                        let value = event_target_checked(&ev);
                        ctx.update_settings(|s| write(s, value));
                    }
                />
                {label}
            </label>
        }
    };

    view! {
        <aside class="codepad-panel codepad-settings" aria-label="Settings">
            <header>
                <h2>"Settings"</h2>
                <button type="button" title="Close" on:click=move |_| open.set(false)>"✕"</button>
            </header>
            <label>
                "Font size"
                <input
                    type="number"
                    min=MIN_FONT_SIZE
                    max=MAX_FONT_SIZE
                    prop:value=move || ctx.settings().font_size.to_string()
                    on:change=move |ev| {
                        if let Ok(size) = event_target_value(&ev).parse::<u8>() {
                            ctx.update_settings(|s| s.font_size = size);
                        }
                    }
                />
            </label>
            <label>
                "Tab size"
                <select
                    prop:value=move || ctx.settings().tab_size.to_string()
                    on:change=move |ev| {
                        if let Ok(size) = event_target_value(&ev).parse::<u8>() {
                            ctx.update_settings(|s| s.tab_size = size);
                        }
                    }
                >
                    {TAB_SIZES
                        .iter()
                        .map(|size| view! { <option value=size.to_string()>{*size}</option> })
                        .collect_view()}
                </select>
            </label>
            {toggle("Word wrap", |s| s.word_wrap, |s, v| s.word_wrap = v)}
            {toggle("Line numbers", |s| s.line_numbers, |s, v| s.line_numbers = v)}
            {toggle("Auto-complete brackets", |s| s.auto_complete, |s, v| s.auto_complete = v)}
            {toggle("Auto save", |s| s.auto_save, |s, v| s.auto_save = v)}
            <label>
                "Auto-save delay (ms)"
                <input
                    type="number"
                    min="250"
                    step="250"
                    prop:value=move || ctx.settings().auto_save_delay_ms.to_string()
                    prop:disabled=move || !ctx.settings().auto_save
                    on:change=move |ev| {
                        if let Ok(delay) = event_target_value(&ev).parse::<u32>() {
                            ctx.update_settings(|s| s.auto_save_delay_ms = delay);
                        }
                    }
                />
            </label>
            <p class="codepad-settings-host">
                {format!("Storage: {}", platform_host_web::host_strategy_name())}
            </p>
        </aside>
    }
}
