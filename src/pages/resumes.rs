use super::confirm;
use crate::collection::{export_file_name, parse_import_payload, EXPORT_ALL_FILE_NAME};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, Label, ModalActions, ModalOverlay, ModalPanel, ModalTitle,
};
use crate::models::ResumeMetadata;
use crate::state::{AppContext, MessageKind};
use crate::util::browser::{download_json, pick_text_file};
use crate::util::parse_timestamp;
use leptos::logging::error;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use std::collections::BTreeSet;

fn display_time(ts: &str) -> String {
    parse_timestamp(ts)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn row_class(is_current: bool) -> &'static str {
    if is_current {
        "flex items-center gap-3 rounded-md border border-primary/40 bg-accent/40 px-3 py-2"
    } else {
        "flex items-center gap-3 rounded-md border border-border px-3 py-2"
    }
}

/// Title/description form shared by the create and rename dialogs.
#[component]
fn ResumeFormDialog(
    #[prop(into)] heading: String,
    open: RwSignal<bool>,
    title: RwSignal<String>,
    description: RwSignal<String>,
    #[prop(into)] on_submit: Callback<()>,
) -> impl IntoView {
    let heading = StoredValue::new(heading);

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <ModalOverlay>
                <ModalPanel>
                    <ModalTitle>{move || heading.get_value()}</ModalTitle>
                    <div class="space-y-3">
                        <div class="space-y-1">
                            <Label html_for="resume-title">"简历标题"</Label>
                            <Input id="resume-title" bind_value=title class="h-8 text-sm" autofocus=true />
                        </div>
                        <div class="space-y-1">
                            <Label html_for="resume-description">"描述（可选）"</Label>
                            <Input id="resume-description" bind_value=description class="h-8 text-sm" />
                        </div>
                        <ModalActions>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| open.set(false)
                            >
                                "取消"
                            </Button>
                            <Button size=ButtonSize::Sm on:click=move |_| on_submit.run(())>
                                "保存"
                            </Button>
                        </ModalActions>
                    </div>
                </ModalPanel>
            </ModalOverlay>
        </Show>
    }
}

#[component]
pub fn ResumeManagerPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;
    let navigate = StoredValue::new(use_navigate());

    let query: RwSignal<String> = RwSignal::new(String::new());
    let selected: RwSignal<BTreeSet<String>> = RwSignal::new(BTreeSet::new());

    let create_open: RwSignal<bool> = RwSignal::new(false);
    let create_title: RwSignal<String> = RwSignal::new(String::new());
    let create_desc: RwSignal<String> = RwSignal::new(String::new());

    let rename_open: RwSignal<bool> = RwSignal::new(false);
    let rename_id: RwSignal<Option<String>> = RwSignal::new(None);
    let rename_title: RwSignal<String> = RwSignal::new(String::new());
    let rename_desc: RwSignal<String> = RwSignal::new(String::new());

    let rows = move || resumes.with(|m| m.search(&query.get()));
    let current_id = move || resumes.with(|m| m.current_id().to_string());

    // Drop selections whose resume is gone.
    Effect::new(move |_| {
        let live: BTreeSet<String> = resumes.with(|m| m.collection().resumes.keys().cloned().collect());
        if selected.with_untracked(|s| s.iter().any(|id| !live.contains(id))) {
            selected.update(|s| s.retain(|id| live.contains(id)));
        }
    });

    let open_resume = move |id: String| {
        resumes.update(|m| {
            m.switch_current(&id);
        });
        navigate.with_value(|nav| nav("/", Default::default()));
    };

    let on_create = move |_: ()| {
        let title = create_title.get_untracked();
        if title.trim().is_empty() {
            app_state.0.notify(MessageKind::Warning, "请输入简历标题");
            return;
        }
        let desc = create_desc.get_untracked();
        resumes.update(|m| {
            m.create(&title, Some(desc.as_str()));
        });
        create_open.set(false);
        app_state.0.success("简历创建成功");
    };

    let open_rename = move |meta: ResumeMetadata| {
        rename_id.set(Some(meta.id));
        rename_title.set(meta.title);
        rename_desc.set(meta.description.unwrap_or_default());
        rename_open.set(true);
    };

    let on_rename = move |_: ()| {
        let Some(id) = rename_id.get_untracked() else {
            return;
        };
        let title = rename_title.get_untracked();
        let desc = rename_desc.get_untracked();
        if app_state
            .0
            .apply(resumes, |m| m.rename(&id, &title, Some(desc.as_str())))
            .is_some()
        {
            rename_open.set(false);
            app_state.0.success("简历信息已更新");
        }
    };

    let on_duplicate = move |id: String| {
        if app_state.0.apply(resumes, |m| m.duplicate(&id, None)).is_some() {
            app_state.0.success("简历复制成功");
        }
    };

    let on_delete = move |meta: ResumeMetadata| {
        if !confirm(&format!("确定要删除简历「{}」吗？此操作不可撤销。", meta.title)) {
            return;
        }
        if app_state.0.apply(resumes, |m| m.delete(&meta.id)).is_some() {
            app_state.0.success("简历已删除");
        }
    };

    let on_batch_delete = move |_| {
        let ids: Vec<String> = selected.get_untracked().into_iter().collect();
        if !confirm(&format!("确定要删除选中的 {} 份简历吗？此操作不可撤销。", ids.len())) {
            return;
        }
        if let Some(n) = app_state.0.apply(resumes, |m| m.batch_delete(&ids)) {
            selected.set(BTreeSet::new());
            app_state.0.success(format!("已删除 {} 份简历", n));
        }
    };

    let on_export = move |id: String| {
        let exported = resumes.with_untracked(|m| {
            let title = m.get(&id).map(|d| d.title.clone()).unwrap_or_default();
            m.export_one(&id).map(|json| (title, json))
        });
        match exported {
            Ok((title, json)) => {
                if let Err(e) = download_json(&export_file_name(&title), &json) {
                    error!("export failed: {}", e);
                    app_state.0.notify(MessageKind::Error, "导出失败");
                }
            }
            Err(e) => app_state.0.report(&e),
        }
    };

    let on_export_all = move |_| match resumes.with_untracked(|m| m.export_all()) {
        Ok(json) => {
            if let Err(e) = download_json(EXPORT_ALL_FILE_NAME, &json) {
                error!("export failed: {}", e);
                app_state.0.notify(MessageKind::Error, "导出失败");
            }
        }
        Err(e) => app_state.0.report(&e),
    };

    let on_import = move |_| {
        let picked = pick_text_file(".json,application/json", move |text| {
            let Some(text) = text else {
                return;
            };
            let docs = match parse_import_payload(&text) {
                Ok(docs) => docs,
                Err(e) => {
                    app_state.0.report(&e);
                    return;
                }
            };

            let total = docs.len();
            if total == 1 {
                let Some(doc) = docs.into_iter().next() else {
                    return;
                };
                if app_state.0.apply(resumes, |m| m.import_one(doc, None)).is_some() {
                    app_state.0.success("简历导入成功");
                }
            } else {
                let imported = resumes.try_update(|m| m.import_batch(docs)).unwrap_or_default();
                if imported.is_empty() {
                    app_state.0.notify(MessageKind::Warning, "没有找到有效的简历数据");
                } else {
                    app_state
                        .0
                        .success(format!("成功导入 {}/{} 份简历", imported.len(), total));
                }
            }
        });
        if let Err(e) = picked {
            error!("file picker failed: {}", e);
            app_state.0.notify(MessageKind::Error, "无法打开文件选择器");
        }
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-lg">"简历管理"</CardTitle>
                <CardDescription class="text-xs">
                    {move || format!("共 {} 份简历，数据仅保存在本地浏览器中", resumes.with(|m| m.len()))}
                </CardDescription>
            </CardHeader>

            <CardContent class="space-y-4">
                <div class="flex flex-wrap items-center gap-2">
                    <Input placeholder="搜索简历…" bind_value=query class="h-8 max-w-xs text-sm" />
                    <div class="ml-auto flex flex-wrap items-center gap-2">
                        <Button
                            size=ButtonSize::Sm
                            on:click=move |_| {
                                create_title.set(String::new());
                                create_desc.set(String::new());
                                create_open.set(true);
                            }
                        >
                            "新建"
                        </Button>
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_import>
                            "导入"
                        </Button>
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_export_all>
                            "导出全部"
                        </Button>
                        <Button
                            variant=ButtonVariant::Destructive
                            size=ButtonSize::Sm
                            attr:disabled=move || selected.with(|s| s.is_empty())
                            on:click=on_batch_delete
                        >
                            {move || format!("批量删除 ({})", selected.with(|s| s.len()))}
                        </Button>
                    </div>
                </div>

                <Show
                    when=move || !rows().is_empty()
                    fallback=|| view! { <div class="text-sm text-muted-foreground">"没有匹配的简历"</div> }
                >
                    <div class="space-y-2">
                        {move || {
                            let current = current_id();
                            rows()
                                .into_iter()
                                .map(|meta| {
                                    let id = StoredValue::new(meta.id.clone());
                                    let record = StoredValue::new(meta.clone());
                                    let is_current = meta.id == current;
                                    view! {
                                        <div class=row_class(is_current)>
                                            <input
                                                type="checkbox"
                                                prop:checked=move || selected.with(|s| s.contains(&id.get_value()))
                                                on:change=move |ev| {
                                                    let checked = event_target_checked(&ev);
                                                    selected.update(|s| {
                                                        if checked {
                                                            s.insert(id.get_value());
                                                        } else {
                                                            s.remove(&id.get_value());
                                                        }
                                                    });
                                                }
                                            />
                                            <button
                                                class="min-w-0 flex-1 text-left"
                                                on:click=move |_| open_resume(id.get_value())
                                            >
                                                <div class="truncate text-sm font-medium">
                                                    {meta.title.clone()}
                                                    {is_current.then(|| view! { <span class="ml-2 text-xs text-primary">"当前"</span> })}
                                                </div>
                                                <div class="truncate text-xs text-muted-foreground">
                                                    {meta.description.clone().unwrap_or_default()}
                                                    " · "
                                                    {display_time(&meta.updated_at)}
                                                </div>
                                            </button>
                                            <div class="flex shrink-0 items-center gap-1">
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Xs
                                                    on:click=move |_| open_rename(record.get_value())
                                                >
                                                    "重命名"
                                                </Button>
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Xs
                                                    on:click=move |_| on_duplicate(id.get_value())
                                                >
                                                    "复制"
                                                </Button>
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Xs
                                                    on:click=move |_| on_export(id.get_value())
                                                >
                                                    "导出"
                                                </Button>
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Xs
                                                    on:click=move |_| on_delete(record.get_value())
                                                >
                                                    "删除"
                                                </Button>
                                            </div>
                                        </div>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>
                </Show>
            </CardContent>
        </Card>

        <ResumeFormDialog
            heading="新建简历"
            open=create_open
            title=create_title
            description=create_desc
            on_submit=on_create
        />
        <ResumeFormDialog
            heading="编辑简历信息"
            open=rename_open
            title=rename_title
            description=rename_desc
            on_submit=on_rename
        />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_time() {
        assert_eq!(display_time("2024-03-05T08:09:10.000Z"), "2024-03-05 08:09");
        assert_eq!(display_time("yesterday"), "yesterday");
    }
}
