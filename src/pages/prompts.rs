use super::confirm;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, Label, ModalActions, ModalOverlay, ModalPanel, ModalTitle, Textarea,
};
use crate::models::ResumePrompt;
use crate::prompts::{parse_tag_input, PromptDraft};
use crate::state::{AppContext, MessageKind};
use crate::util::browser::copy_to_clipboard;
use leptos::prelude::*;

fn tag_class(active: bool) -> &'static str {
    if active {
        "rounded-full border border-primary bg-primary px-2.5 py-0.5 text-xs text-primary-foreground"
    } else {
        "rounded-full border border-border px-2.5 py-0.5 text-xs text-muted-foreground hover:text-foreground"
    }
}

#[component]
pub fn PromptsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let prompts = app_state.0.prompts;
    let platforms = app_state.0.platforms;

    let query: RwSignal<String> = RwSignal::new(String::new());
    let active_tag: RwSignal<Option<String>> = RwSignal::new(None);

    let editor_open: RwSignal<bool> = RwSignal::new(false);
    let editing_id: RwSignal<Option<String>> = RwSignal::new(None);
    let edit_title: RwSignal<String> = RwSignal::new(String::new());
    let edit_content: RwSignal<String> = RwSignal::new(String::new());
    let edit_tags: RwSignal<String> = RwSignal::new(String::new());

    let visible = move || {
        let tag = active_tag.get();
        prompts.with(|lib| {
            lib.search(&query.get())
                .into_iter()
                .filter(|p| tag.as_ref().map_or(true, |t| p.tags.contains(t)))
                .cloned()
                .collect::<Vec<ResumePrompt>>()
        })
    };

    let open_editor = move |prompt: Option<ResumePrompt>| {
        match prompt {
            Some(p) => {
                editing_id.set(Some(p.id));
                edit_title.set(p.title);
                edit_content.set(p.content);
                edit_tags.set(p.tags.join(", "));
            }
            None => {
                editing_id.set(None);
                edit_title.set(String::new());
                edit_content.set(String::new());
                edit_tags.set(String::new());
            }
        }
        editor_open.set(true);
    };

    let on_save = move |_| {
        let draft = PromptDraft::new(
            edit_title.get_untracked(),
            edit_content.get_untracked(),
            parse_tag_input(&edit_tags.get_untracked()),
        );
        let saved = match editing_id.get_untracked() {
            Some(id) => app_state.0.apply(prompts, |lib| lib.update(&id, draft)),
            None => app_state.0.apply(prompts, |lib| lib.add(draft).map(|_| ())),
        };
        if saved.is_some() {
            editor_open.set(false);
            app_state.0.success("提示词已保存");
        }
    };

    let on_delete = move |prompt: ResumePrompt| {
        if !confirm(&format!("确定要删除提示词「{}」吗？", prompt.title)) {
            return;
        }
        if app_state.0.apply(prompts, |lib| lib.delete(&prompt.id)).is_some() {
            app_state.0.success("提示词已删除");
        }
    };

    let on_copy = move |prompt: ResumePrompt| {
        let copied = copy_to_clipboard(&prompt.content, move |ok| {
            if ok {
                app_state.0.success("已复制到剪贴板");
            } else {
                app_state.0.notify(MessageKind::Error, "复制失败，请手动选择内容复制");
            }
        });
        if let Err(e) = copied {
            app_state.0.notify(MessageKind::Error, format!("复制失败：{}", e));
        }
    };

    let on_reset = move |_| {
        if !confirm("确定要恢复默认提示词吗？自定义的提示词将被清除。") {
            return;
        }
        prompts.update(|lib| lib.reset());
        active_tag.set(None);
        app_state.0.success("已恢复默认提示词");
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-lg">"AI 提示词"</CardTitle>
                <CardDescription class="text-xs">"常用的简历优化提示词，可直接带到 AI 平台中使用"</CardDescription>
            </CardHeader>

            <CardContent class="space-y-4">
                <div class="flex flex-wrap items-center gap-2">
                    <Input placeholder="搜索标题、标签或内容…" bind_value=query class="h-8 max-w-xs text-sm" />
                    <div class="ml-auto flex items-center gap-2">
                        <Button size=ButtonSize::Sm on:click=move |_| open_editor(None)>"新建提示词"</Button>
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_reset>
                            "恢复默认"
                        </Button>
                    </div>
                </div>

                <div class="flex flex-wrap gap-1.5">
                    <button
                        class=move || tag_class(active_tag.with(Option::is_none))
                        on:click=move |_| active_tag.set(None)
                    >
                        "全部"
                    </button>
                    {move || {
                        prompts
                            .with(|lib| lib.all_tags())
                            .into_iter()
                            .map(|tag| {
                                let tag = StoredValue::new(tag);
                                view! {
                                    <button
                                        class=move || tag_class(active_tag.with(|a| a.as_ref() == Some(&tag.get_value())))
                                        on:click=move |_| active_tag.set(Some(tag.get_value()))
                                    >
                                        {tag.get_value()}
                                    </button>
                                }
                            })
                            .collect_view()
                    }}
                </div>

                <Show
                    when=move || !visible().is_empty()
                    fallback=|| view! { <div class="text-sm text-muted-foreground">"没有匹配的提示词"</div> }
                >
                    <div class="grid gap-3 sm:grid-cols-2">
                        {move || {
                            let sites = platforms.with(|r| r.list().to_vec());
                            visible()
                                .into_iter()
                                .map(|p| {
                                    let record = StoredValue::new(p.clone());
                                    view! {
                                        <div class="flex flex-col gap-2 rounded-md border border-border p-3">
                                            <div class="flex items-start justify-between gap-2">
                                                <div class="text-sm font-medium">{p.title.clone()}</div>
                                                <div class="flex shrink-0 items-center gap-1">
                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Xs
                                                        on:click=move |_| on_copy(record.get_value())
                                                    >
                                                        "复制内容"
                                                    </Button>
                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Xs
                                                        on:click=move |_| open_editor(Some(record.get_value()))
                                                    >
                                                        "编辑"
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
                                            <div class="flex flex-wrap gap-1">
                                                {p.tags
                                                    .iter()
                                                    .map(|t| view! { <span class="rounded bg-muted px-1.5 text-xs">{t.clone()}</span> })
                                                    .collect_view()}
                                            </div>
                                            <p class="select-all whitespace-pre-wrap text-xs text-muted-foreground">{p.content.clone()}</p>
                                            <div class="flex flex-wrap gap-2 pt-1">
                                                {sites
                                                    .iter()
                                                    .map(|site| {
                                                        view! {
                                                            <a
                                                                href=site.url.clone()
                                                                target="_blank"
                                                                rel="noopener noreferrer"
                                                                class="text-xs text-primary underline underline-offset-4"
                                                            >
                                                                {format!("在 {} 中使用", site.name)}
                                                            </a>
                                                        }
                                                    })
                                                    .collect_view()}
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

        <Show when=move || editor_open.get() fallback=|| ().into_view()>
            <ModalOverlay>
                <ModalPanel class="max-w-lg">
                    <ModalTitle>
                        {move || if editing_id.with(Option::is_some) { "编辑提示词" } else { "新建提示词" }}
                    </ModalTitle>
                    <div class="space-y-3">
                        <div class="space-y-1">
                            <Label html_for="prompt-title">"标题"</Label>
                            <Input id="prompt-title" bind_value=edit_title class="h-8 text-sm" />
                        </div>
                        <div class="space-y-1">
                            <Label html_for="prompt-content">"内容"</Label>
                            <Textarea id="prompt-content" bind_value=edit_content rows=6 class="text-sm" />
                        </div>
                        <div class="space-y-1">
                            <Label html_for="prompt-tags">"标签（用逗号分隔）"</Label>
                            <Input id="prompt-tags" bind_value=edit_tags class="h-8 text-sm" />
                        </div>
                        <ModalActions>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| editor_open.set(false)
                            >
                                "取消"
                            </Button>
                            <Button size=ButtonSize::Sm on:click=on_save>"保存"</Button>
                        </ModalActions>
                    </div>
                </ModalPanel>
            </ModalOverlay>
        </Show>
    }
}
