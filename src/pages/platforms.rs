use super::confirm;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, Label, ModalActions, ModalOverlay, ModalPanel, ModalTitle,
};
use crate::models::AiPlatform;
use crate::state::AppContext;
use leptos::prelude::*;

#[component]
pub fn PlatformsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let platforms = app_state.0.platforms;

    let editor_open: RwSignal<bool> = RwSignal::new(false);
    let editing_id: RwSignal<Option<String>> = RwSignal::new(None);
    let edit_name: RwSignal<String> = RwSignal::new(String::new());
    let edit_url: RwSignal<String> = RwSignal::new(String::new());
    let edit_icon: RwSignal<String> = RwSignal::new(String::new());

    let open_editor = move |platform: Option<AiPlatform>| {
        let platform = platform.unwrap_or(AiPlatform {
            id: String::new(),
            name: String::new(),
            url: "https://".to_string(),
            icon: None,
        });
        editing_id.set((!platform.id.is_empty()).then_some(platform.id));
        edit_name.set(platform.name);
        edit_url.set(platform.url);
        edit_icon.set(platform.icon.unwrap_or_default());
        editor_open.set(true);
    };

    let on_save = move |_| {
        let name = edit_name.get_untracked();
        let url = edit_url.get_untracked();
        let icon = edit_icon.get_untracked();
        let saved = match editing_id.get_untracked() {
            Some(id) => app_state.0.apply(platforms, |r| {
                r.update(AiPlatform {
                    id,
                    name,
                    url,
                    icon: Some(icon),
                })
            }),
            None => app_state
                .0
                .apply(platforms, |r| r.add(&name, &url, Some(icon.as_str())).map(|_| ())),
        };
        if saved.is_some() {
            editor_open.set(false);
            app_state.0.success("平台已保存");
        }
    };

    let on_delete = move |platform: AiPlatform| {
        if !confirm(&format!("确定要删除平台「{}」吗？", platform.name)) {
            return;
        }
        if app_state.0.apply(platforms, |r| r.delete(&platform.id)).is_some() {
            app_state.0.success("平台已删除");
        }
    };

    let on_reset = move |_| {
        if !confirm("确定要恢复默认平台列表吗？") {
            return;
        }
        platforms.update(|r| r.reset());
        app_state.0.success("已恢复默认平台");
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-lg">"AI 平台"</CardTitle>
                <CardDescription class="text-xs">"提示词页面中“在…中使用”链接指向的网站"</CardDescription>
            </CardHeader>

            <CardContent class="space-y-4">
                <div class="flex items-center justify-end gap-2">
                    <Button size=ButtonSize::Sm on:click=move |_| open_editor(None)>"添加平台"</Button>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_reset>
                        "恢复默认"
                    </Button>
                </div>

                <Show
                    when=move || platforms.with(|r| !r.list().is_empty())
                    fallback=|| view! { <div class="text-sm text-muted-foreground">"还没有配置平台"</div> }
                >
                    <div class="space-y-2">
                        {move || {
                            platforms
                                .with(|r| r.list().to_vec())
                                .into_iter()
                                .map(|p| {
                                    let record = StoredValue::new(p.clone());
                                    view! {
                                        <div class="flex items-center gap-3 rounded-md border border-border px-3 py-2">
                                            <div class="min-w-0 flex-1">
                                                <div class="truncate text-sm font-medium">{p.name.clone()}</div>
                                                <a
                                                    href=p.url.clone()
                                                    target="_blank"
                                                    rel="noopener noreferrer"
                                                    class="truncate text-xs text-muted-foreground hover:underline"
                                                >
                                                    {p.url.clone()}
                                                </a>
                                            </div>
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
                <ModalPanel>
                    <ModalTitle>
                        {move || if editing_id.with(Option::is_some) { "编辑平台" } else { "添加平台" }}
                    </ModalTitle>
                    <div class="space-y-3">
                        <div class="space-y-1">
                            <Label html_for="platform-name">"名称"</Label>
                            <Input id="platform-name" bind_value=edit_name class="h-8 text-sm" />
                        </div>
                        <div class="space-y-1">
                            <Label html_for="platform-url">"网址"</Label>
                            <Input id="platform-url" r#type="url" bind_value=edit_url class="h-8 text-sm" />
                        </div>
                        <div class="space-y-1">
                            <Label html_for="platform-icon">"图标（可选）"</Label>
                            <Input id="platform-icon" bind_value=edit_icon class="h-8 text-sm" />
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
