mod editor;
mod platforms;
mod prompts;
mod resumes;

pub use platforms::PlatformsPage;
pub use prompts::PromptsPage;
pub use resumes::ResumeManagerPage;

use crate::components::ui::{
    Alert, AlertDescription, AlertTitle, Button, ButtonSize, ButtonVariant, Card, CardContent,
    ModalOverlay, ModalPanel,
};
use crate::collection::SectionProps;
use editor::{AddSectionForm, SectionEditor};
use crate::models::{BasicInfo, Section, SectionContent, TimelineItem};
use crate::state::{AppContext, MessageKind};
use crate::util::browser::print_page;
use leptos::prelude::*;
use leptos_router::hooks::use_location;
use leptos_dom::helpers::set_timeout;
use std::time::Duration;

const NAV_ITEMS: &[(&str, &str)] = &[
    ("/", "简历预览"),
    ("/resumes", "简历管理"),
    ("/prompts", "AI 提示词"),
    ("/platforms", "AI 平台"),
];

/// Asks the browser for a yes/no answer. A blocked dialog counts as "no".
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[component]
pub fn AppLayout(children: Children) -> impl IntoView {
    let location = use_location();

    let link_class = move |href: &str| {
        let base = "rounded-md px-3 py-1.5 text-sm transition-colors";
        if location.pathname.get() == href {
            format!("{} bg-accent font-medium text-accent-foreground", base)
        } else {
            format!("{} text-muted-foreground hover:text-foreground", base)
        }
    };

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <header class="border-b border-border print:hidden">
                <nav class="mx-auto flex max-w-4xl items-center gap-1 px-4 py-2">
                    <a href="/" class="mr-4 text-sm font-semibold">"Resumaker"</a>
                    {NAV_ITEMS
                        .iter()
                        .map(|&(href, label)| {
                            view! { <a href=href class=move || link_class(href)>{label}</a> }
                        })
                        .collect_view()}
                </nav>
            </header>

            <FloatingMessageHost />

            <main class="mx-auto max-w-4xl px-4 py-6 print:max-w-none print:p-0">{children()}</main>
        </div>
    }
}

fn tone_class(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Success => "border-emerald-300 bg-emerald-50 text-emerald-800",
        MessageKind::Warning => "border-amber-300 bg-amber-50 text-amber-800",
        MessageKind::Error => "border-destructive/30 bg-background text-destructive",
    }
}

/// Shows the latest message and clears it after the configured timeout.
#[component]
fn FloatingMessageHost() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let message = app_state.0.message;
    let timeout_ms = app_state.0.config.with_value(|c| c.message_timeout_ms);

    Effect::new(move |_| {
        let Some(seq) = message.with(|m| m.as_ref().map(|m| m.seq)) else {
            return;
        };

        // A newer message owns the slot by the time this fires.
        set_timeout(
            move || {
                if message.get_untracked().map(|m| m.seq) == Some(seq) {
                    message.set(None);
                }
            },
            Duration::from_millis(u64::from(timeout_ms)),
        );
    });

    view! {
        <Show when=move || message.with(Option::is_some) fallback=|| ().into_view()>
            {move || {
                message.get().map(|m| {
                    view! {
                        <div class="fixed inset-x-0 top-4 z-50 flex justify-center px-4 print:hidden">
                            <Alert class=format!("max-w-md {}", tone_class(m.kind))>
                                <div class="flex items-start gap-3">
                                    <AlertDescription class="flex-1 text-xs">{m.text}</AlertDescription>
                                    <button
                                        class="text-xs opacity-60 hover:opacity-100"
                                        on:click=move |_| message.set(None)
                                    >
                                        "×"
                                    </button>
                                </div>
                            </Alert>
                        </div>
                    }
                })
            }}
        </Show>
    }
}

#[component]
fn BasicInfoView(info: BasicInfo) -> impl IntoView {
    let contacts: Vec<String> = [
        &info.phone,
        &info.email,
        &info.gender,
        &info.age,
        &info.location,
        &info.website,
    ]
    .into_iter()
    .filter(|v| !v.trim().is_empty())
    .cloned()
    .collect();

    let fields = info
        .custom_fields
        .into_iter()
        .filter(|f| !f.label.trim().is_empty() || !f.value.trim().is_empty())
        .map(|f| {
            let text = if f.value.trim().is_empty() {
                f.label
            } else if f.label.trim().is_empty() {
                f.value
            } else {
                format!("{}：{}", f.label, f.value)
            };
            view! { <span class="rounded bg-muted px-2 py-0.5">{text}</span> }
        })
        .collect_view();

    let avatar = (!info.avatar.trim().is_empty()).then(|| {
        view! { <img src=info.avatar alt="avatar" class="h-24 w-20 rounded object-cover" /> }
    });

    view! {
        <div class="flex items-start justify-between gap-6">
            <div class="min-w-0 space-y-2">
                <h1 class="text-2xl font-semibold">{info.name}</h1>
                <div class="flex flex-wrap gap-x-3 gap-y-1 text-sm text-muted-foreground">
                    {contacts.into_iter().map(|c| view! { <span>{c}</span> }).collect_view()}
                </div>
                <div class="flex flex-wrap gap-2 text-xs">{fields}</div>
            </div>
            {avatar}
        </div>
    }
}

fn timeline_entry(item: TimelineItem) -> impl IntoView {
    let dates = match (item.start_date.trim(), item.end_date.trim()) {
        ("", "") => String::new(),
        (start, "") => start.to_string(),
        (start, end) => format!("{} - {}", start, end),
    };
    let right = if item.secondary_subtitle.trim().is_empty() {
        dates
    } else {
        item.secondary_subtitle
    };

    view! {
        <div class="space-y-1">
            <div class="flex items-baseline justify-between gap-4">
                <div class="text-sm font-medium">
                    {item.title}
                    <span class="ml-2 font-normal text-muted-foreground">{item.subtitle}</span>
                </div>
                <div class="shrink-0 text-xs text-muted-foreground">{right}</div>
            </div>
            <div class="rich-text text-sm" inner_html=item.description></div>
        </div>
    }
}

fn section_body(content: SectionContent) -> AnyView {
    match content {
        SectionContent::Basic(info) => view! { <BasicInfoView info=info /> }.into_any(),
        SectionContent::Timeline(items) => view! {
            <div class="space-y-4">{items.into_iter().map(timeline_entry).collect_view()}</div>
        }
        .into_any(),
        SectionContent::List(items) => view! {
            <ul class="list-disc space-y-1 pl-5 text-sm">
                {items.into_iter().map(|i| view! { <li inner_html=i.content></li> }).collect_view()}
            </ul>
        }
        .into_any(),
        SectionContent::Text(text) => {
            view! { <div class="rich-text text-sm" inner_html=text.content></div> }.into_any()
        }
        SectionContent::Raw(_) => ().into_any(),
    }
}

#[component]
fn SectionView(section: Section) -> impl IntoView {
    let heading = (!section.is_basic()).then(|| {
        view! { <h2 class="mb-3 border-b border-border pb-1 text-base font-semibold">{section.title.clone()}</h2> }
    });

    view! {
        <section data-section=section.id.clone() class="break-inside-avoid">
            {heading}
            {section_body(section.content)}
        </section>
    }
}

/// Edit, hide, move and remove the sections of the open resume.
#[component]
fn SectionToolbar(selected: RwSignal<Option<String>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;

    let body = move || {
        resumes.with(|m| {
            m.current()
                .map(|doc| doc.body_sections().into_iter().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    // Swaps the section at `index` with its neighbour `delta` places away.
    let move_section = move |index: usize, delta: isize| {
        let mut ids: Vec<String> = body().into_iter().map(|s| s.id).collect();
        let Some(target) = index.checked_add_signed(delta).filter(|t| *t < ids.len()) else {
            return;
        };
        ids.swap(index, target);
        app_state.0.apply(resumes, |m| m.reorder_sections(&ids));
    };

    let on_reset = move |_| {
        if !confirm("确定要将当前简历重置为模板吗？此操作不可撤销。") {
            return;
        }
        if app_state.0.apply(resumes, |m| m.reset_current()).is_some() {
            app_state.0.success("已重置为模板");
        }
    };

    let on_edit_basic = move |_| {
        let id = resumes.with_untracked(|m| m.current().and_then(|d| d.basic_section().map(|s| s.id.clone())));
        if id.is_some() {
            selected.set(id);
        }
    };

    view! {
        <Card class="print:hidden">
            <CardContent class="space-y-2">
                <div class="flex items-center justify-between">
                    <div class="text-sm font-medium">"模块"</div>
                    <div class="flex items-center gap-1">
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=on_edit_basic>
                            "编辑基本信息"
                        </Button>
                        <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=on_reset>
                            "重置为模板"
                        </Button>
                    </div>
                </div>
                <div class="space-y-1">
                    {move || {
                        let sections = body();
                        let last = sections.len().saturating_sub(1);
                        sections
                            .into_iter()
                            .enumerate()
                            .map(|(i, s)| {
                                let id = StoredValue::new(s.id.clone());
                                let visible = s.visible;
                                view! {
                                    <div class="flex items-center justify-between rounded-md border border-border px-3 py-1.5">
                                        <span class={if visible { "text-sm" } else { "text-sm text-muted-foreground line-through" }}>
                                            {s.title}
                                        </span>
                                        <div class="flex items-center gap-1">
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Xs
                                                on:click=move |_| selected.set(Some(id.get_value()))
                                            >
                                                "编辑"
                                            </Button>
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Xs
                                                attr:disabled={i == 0}
                                                on:click=move |_| move_section(i, -1)
                                            >
                                                "↑"
                                            </Button>
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Xs
                                                attr:disabled={i == last}
                                                on:click=move |_| move_section(i, 1)
                                            >
                                                "↓"
                                            </Button>
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Xs
                                                on:click=move |_| {
                                                    let props = SectionProps {
                                                        visible: Some(!visible),
                                                        ..Default::default()
                                                    };
                                                    app_state.0.apply(resumes, |m| m.update_section_props(&id.get_value(), props));
                                                }
                                            >
                                                {if visible { "隐藏" } else { "显示" }}
                                            </Button>
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Xs
                                                on:click=move |_| {
                                                    if !confirm("确定要删除这个模块吗？") {
                                                        return;
                                                    }
                                                    let id = id.get_value();
                                                    if app_state.0.apply(resumes, |m| m.delete_section(&id)).is_some()
                                                        && selected.get_untracked().as_deref() == Some(id.as_str())
                                                    {
                                                        selected.set(None);
                                                    }
                                                }
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
                <AddSectionForm selected=selected />
            </CardContent>
        </Card>
    }
}

#[component]
fn MigrationDialog() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;
    let migration = app_state.0.migration;

    let on_migrate = move |_| {
        let outcome = resumes.try_update(|mgr| migration.try_update(|mig| mig.migrate(mgr)));
        match outcome.flatten() {
            Some(Ok(changed)) => app_state.0.success(format!("升级完成，共转换 {} 个模块", changed)),
            Some(Err(e)) => app_state.0.report(&e),
            None => {}
        }
    };

    let on_decline = move |_| migration.update(|m| m.cancel());

    view! {
        <Show when=move || migration.with(|m| m.needs_migration()) fallback=|| ().into_view()>
            <ModalOverlay>
                <ModalPanel>
                    <Alert class="mb-3 border-amber-300">
                        <AlertTitle>"检测到旧版简历内容"</AlertTitle>
                        <AlertDescription class="text-xs text-muted-foreground">
                            "部分模块仍是纯文本。升级后会转换为富文本格式，列表和段落会被保留。"
                        </AlertDescription>
                    </Alert>
                    <div class="flex items-center justify-end gap-2">
                        <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_decline>
                            "暂不升级"
                        </Button>
                        <Button size=ButtonSize::Sm on:click=on_migrate>
                            "立即升级"
                        </Button>
                    </div>
                </ModalPanel>
            </ModalOverlay>
        </Show>
    }
}

/// The open resume as it prints.
#[component]
pub fn ResumePreviewPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;
    let selected: RwSignal<Option<String>> = RwSignal::new(None);

    // A different open resume invalidates the section being edited.
    Effect::new(move |prev: Option<String>| {
        let current = resumes.with(|m| m.current_id().to_string());
        if prev.is_some_and(|p| p != current) {
            selected.set(None);
        }
        current
    });

    let title = move || resumes.with(|m| m.current().map(|d| d.title.clone()).unwrap_or_default());
    let sections = move || {
        resumes.with(|m| {
            m.current()
                .map(|doc| doc.visible_sections().into_iter().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between print:hidden">
                <div class="text-sm text-muted-foreground">{title}</div>
                <Button size=ButtonSize::Sm on:click=move |_| print_page()>
                    "打印 / 导出 PDF"
                </Button>
            </div>

            <SectionToolbar selected=selected />
            <SectionEditor selected=selected />

            <article class="space-y-6 rounded-md border border-border bg-white p-8 shadow-sm print:border-0 print:p-0 print:shadow-none">
                {move || {
                    sections()
                        .into_iter()
                        .map(|section| view! { <SectionView section=section /> })
                        .collect_view()
                }}
            </article>

            <MigrationDialog />
        </div>
    }
}
