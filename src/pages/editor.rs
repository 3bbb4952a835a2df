use crate::collection::{SectionPreset, SectionProps};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, Input, Label,
    RichTextEditor,
};
use crate::models::{BasicInfo, CustomField, Section, SectionContent, TimelineItem};
use crate::state::AppContext;
use chrono::Utc;
use leptos::prelude::*;
use strum::{EnumIter, IntoEnumIterator};

const FIELD: &str = "h-8 w-full rounded-md border border-input bg-transparent px-2 text-sm shadow-xs outline-none focus-visible:border-ring";

#[derive(Clone, Copy, EnumIter)]
enum BasicField {
    Name,
    Phone,
    Email,
    Gender,
    Age,
    Location,
    Website,
    Avatar,
}

impl BasicField {
    fn label(self) -> &'static str {
        match self {
            Self::Name => "姓名",
            Self::Phone => "电话",
            Self::Email => "邮箱",
            Self::Gender => "性别",
            Self::Age => "年龄",
            Self::Location => "所在地",
            Self::Website => "个人网站",
            Self::Avatar => "头像链接",
        }
    }

    fn get(self, info: &BasicInfo) -> &str {
        match self {
            Self::Name => &info.name,
            Self::Phone => &info.phone,
            Self::Email => &info.email,
            Self::Gender => &info.gender,
            Self::Age => &info.age,
            Self::Location => &info.location,
            Self::Website => &info.website,
            Self::Avatar => &info.avatar,
        }
    }

    fn slot(self, info: &mut BasicInfo) -> &mut String {
        match self {
            Self::Name => &mut info.name,
            Self::Phone => &mut info.phone,
            Self::Email => &mut info.email,
            Self::Gender => &mut info.gender,
            Self::Age => &mut info.age,
            Self::Location => &mut info.location,
            Self::Website => &mut info.website,
            Self::Avatar => &mut info.avatar,
        }
    }
}

#[derive(Clone, Copy, EnumIter)]
enum TimelineField {
    Title,
    Subtitle,
    SecondarySubtitle,
    StartDate,
    EndDate,
}

impl TimelineField {
    fn label(self) -> &'static str {
        match self {
            Self::Title => "名称",
            Self::Subtitle => "职位 / 专业",
            Self::SecondarySubtitle => "右侧信息",
            Self::StartDate => "开始时间",
            Self::EndDate => "结束时间",
        }
    }

    fn get(self, item: &TimelineItem) -> &str {
        match self {
            Self::Title => &item.title,
            Self::Subtitle => &item.subtitle,
            Self::SecondarySubtitle => &item.secondary_subtitle,
            Self::StartDate => &item.start_date,
            Self::EndDate => &item.end_date,
        }
    }

    fn slot(self, item: &mut TimelineItem) -> &mut String {
        match self {
            Self::Title => &mut item.title,
            Self::Subtitle => &mut item.subtitle,
            Self::SecondarySubtitle => &mut item.secondary_subtitle,
            Self::StartDate => &mut item.start_date,
            Self::EndDate => &mut item.end_date,
        }
    }
}

/// Labelled single-line input driven by a read signal and an input callback.
#[component]
fn TextField(
    #[prop(into)] label: String,
    value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
) -> impl IntoView {
    view! {
        <label class="block space-y-1">
            <span class="text-xs text-muted-foreground">{label}</span>
            <input
                class=FIELD
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
        </label>
    }
}

/// Up, down and remove controls for one item of the draft.
#[component]
fn ItemControls(draft: RwSignal<SectionContent>, id: StoredValue<String>) -> impl IntoView {
    let shift = move |delta: isize| {
        draft.update(|c| {
            c.move_item(&id.get_value(), delta);
        })
    };

    view! {
        <div class="flex items-center gap-1">
            <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=move |_| shift(-1)>
                "↑"
            </Button>
            <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=move |_| shift(1)>
                "↓"
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Xs
                on:click=move |_| {
                    draft.update(|c| {
                        c.remove_item(&id.get_value());
                    })
                }
            >
                "删除"
            </Button>
        </div>
    }
}

fn custom_field_value(
    draft: RwSignal<SectionContent>,
    id: StoredValue<String>,
    read: fn(&CustomField) -> &str,
) -> Signal<String> {
    Signal::derive(move || {
        draft.with(|c| match c {
            SectionContent::Basic(b) => id.with_value(|id| {
                b.custom_fields
                    .iter()
                    .find(|f| &f.id == id)
                    .map(|f| read(f).to_string())
                    .unwrap_or_default()
            }),
            _ => String::new(),
        })
    })
}

#[component]
fn BasicInfoForm(draft: RwSignal<SectionContent>) -> impl IntoView {
    let fields = BasicField::iter()
        .map(|field| {
            let value = Signal::derive(move || {
                draft.with(|c| match c {
                    SectionContent::Basic(b) => field.get(b).to_string(),
                    _ => String::new(),
                })
            });
            let on_input = move |v: String| {
                draft.update(|c| {
                    if let SectionContent::Basic(b) = c {
                        *field.slot(b) = v;
                    }
                })
            };
            view! { <TextField label=field.label() value=value on_input=on_input /> }
        })
        .collect_view();

    view! {
        <div class="space-y-3">
            <div class="grid grid-cols-2 gap-3">{fields}</div>
            <div class="text-xs font-medium">"自定义字段"</div>
            <For
                each=move || draft.with(|c| c.item_ids())
                key=|id| id.clone()
                children=move |id: String| {
                    let id = StoredValue::new(id);
                    let edit = move |apply: fn(&mut CustomField, String)| {
                        move |v: String| {
                            draft.update(|c| {
                                if let Some(f) = c.custom_field_mut(&id.get_value()) {
                                    apply(f, v);
                                }
                            })
                        }
                    };
                    view! {
                        <div class="flex items-end gap-2">
                            <TextField
                                label="名称"
                                value=custom_field_value(draft, id, |f| &f.label)
                                on_input=edit(|f, v| f.label = v)
                            />
                            <TextField
                                label="内容"
                                value=custom_field_value(draft, id, |f| &f.value)
                                on_input=edit(|f, v| f.value = v)
                            />
                            <ItemControls draft=draft id=id />
                        </div>
                    }
                }
            />
            <Button
                variant=ButtonVariant::Outline
                size=ButtonSize::Xs
                on:click=move |_| {
                    draft.update(|c| {
                        c.push_item(Utc::now());
                    })
                }
            >
                "添加字段"
            </Button>
        </div>
    }
}

/// Description HTML of a timeline item or content of a list item, read once on mount.
fn rich_item_html(draft: RwSignal<SectionContent>, id: &str) -> String {
    draft.with_untracked(|c| match c {
        SectionContent::Timeline(items) => items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.description.clone()),
        SectionContent::List(items) => items.iter().find(|i| i.id == id).map(|i| i.content.clone()),
        _ => None,
    })
    .unwrap_or_default()
}

#[component]
fn TimelineItemForm(draft: RwSignal<SectionContent>, id: String) -> impl IntoView {
    let html = rich_item_html(draft, &id);
    let id = StoredValue::new(id);

    let fields = TimelineField::iter()
        .map(|field| {
            let value = Signal::derive(move || {
                draft.with(|c| match c {
                    SectionContent::Timeline(items) => id.with_value(|id| {
                        items
                            .iter()
                            .find(|i| &i.id == id)
                            .map(|i| field.get(i).to_string())
                            .unwrap_or_default()
                    }),
                    _ => String::new(),
                })
            });
            let on_input = move |v: String| {
                draft.update(|c| {
                    if let Some(item) = c.timeline_item_mut(&id.get_value()) {
                        *field.slot(item) = v;
                    }
                })
            };
            view! { <TextField label=field.label() value=value on_input=on_input /> }
        })
        .collect_view();

    let on_description = move |v: String| {
        draft.update(|c| {
            if let Some(item) = c.timeline_item_mut(&id.get_value()) {
                item.description = v;
            }
        })
    };

    view! {
        <div class="space-y-2 rounded-md border border-border p-3">
            <div class="flex justify-end">
                <ItemControls draft=draft id=id />
            </div>
            <div class="grid grid-cols-2 gap-2">{fields}</div>
            <RichTextEditor value=html on_change=on_description />
        </div>
    }
}

#[component]
fn ListItemForm(draft: RwSignal<SectionContent>, id: String) -> impl IntoView {
    let html = rich_item_html(draft, &id);
    let id = StoredValue::new(id);

    let on_change = move |v: String| {
        draft.update(|c| {
            if let Some(item) = c.list_item_mut(&id.get_value()) {
                item.content = v;
            }
        })
    };

    view! {
        <div class="flex items-start gap-2">
            <RichTextEditor value=html on_change=on_change class="flex-1" />
            <ItemControls draft=draft id=id />
        </div>
    }
}

/// Timeline entries or list items, keyed by item id.
#[component]
fn ItemsForm(draft: RwSignal<SectionContent>, timeline: bool) -> impl IntoView {
    view! {
        <div class="space-y-3">
            <For
                each=move || draft.with(|c| c.item_ids())
                key=|id| id.clone()
                children=move |id: String| {
                    if timeline {
                        view! { <TimelineItemForm draft=draft id=id /> }.into_any()
                    } else {
                        view! { <ListItemForm draft=draft id=id /> }.into_any()
                    }
                }
            />
            <Button
                variant=ButtonVariant::Outline
                size=ButtonSize::Xs
                on:click=move |_| {
                    draft.update(|c| {
                        c.push_item(Utc::now());
                    })
                }
            >
                {if timeline { "添加经历" } else { "添加条目" }}
            </Button>
        </div>
    }
}

#[component]
fn SectionForm(section: Section, selected: RwSignal<Option<String>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;

    let is_basic = section.is_basic();
    let section_id = StoredValue::new(section.id.clone());
    let title = RwSignal::new(section.title.clone());
    let mut content = section.content;
    content.ensure_item_ids();
    let draft = RwSignal::new(content.clone());

    let body = match content {
        SectionContent::Basic(_) => view! { <BasicInfoForm draft=draft /> }.into_any(),
        SectionContent::Timeline(_) => view! { <ItemsForm draft=draft timeline=true /> }.into_any(),
        SectionContent::List(_) => view! { <ItemsForm draft=draft timeline=false /> }.into_any(),
        SectionContent::Text(text) => {
            let on_change = move |v: String| {
                draft.update(|c| {
                    if let SectionContent::Text(t) = c {
                        t.content = v;
                    }
                })
            };
            view! { <RichTextEditor value=text.content on_change=on_change /> }.into_any()
        }
        SectionContent::Raw(value) => {
            let json = serde_json::to_string_pretty(&value).unwrap_or_default();
            view! {
                <div class="space-y-2">
                    <div class="text-xs text-muted-foreground">
                        "这个模块的数据格式无法识别，已原样保留。可以修改标题，内容无法在此编辑。"
                    </div>
                    <pre class="max-h-48 overflow-auto rounded-md bg-muted p-2 text-xs">{json}</pre>
                </div>
            }
            .into_any()
        }
    };

    let on_save = move |_| {
        let props = SectionProps {
            title: Some(title.get_untracked()),
            ..Default::default()
        };
        let content = draft.get_untracked();
        let saved = app_state
            .0
            .apply(resumes, |m| m.update_section(&section_id.get_value(), props, content));
        if saved.is_some() {
            selected.set(None);
            app_state.0.success("模块已保存");
        }
    };

    view! {
        <Card class="print:hidden">
            <CardHeader>
                <CardTitle class="text-sm">{if is_basic { "编辑基本信息" } else { "编辑模块" }}</CardTitle>
            </CardHeader>
            <CardContent class="space-y-3">
                {(!is_basic)
                    .then(|| {
                        view! {
                            <div class="space-y-1">
                                <Label html_for="section-title">"模块标题"</Label>
                                <Input id="section-title" bind_value=title class="h-8 text-sm" />
                            </div>
                        }
                    })}
                {body}
                <div class="flex items-center justify-end gap-2">
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| selected.set(None)>
                        "取消"
                    </Button>
                    <Button size=ButtonSize::Sm on:click=on_save>
                        "保存"
                    </Button>
                </div>
            </CardContent>
        </Card>
    }
}

/// Edit panel for the section whose id is in `selected`. Changes stay in a
/// draft until saved.
#[component]
pub fn SectionEditor(selected: RwSignal<Option<String>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;

    move || {
        let id = selected.get()?;
        let section = resumes.with_untracked(|m| m.current().and_then(|d| d.section(&id).cloned()))?;
        Some(view! { <SectionForm section=section selected=selected /> })
    }
}

/// Adds an empty section of the chosen kind to the open resume.
#[component]
pub fn AddSectionForm(selected: RwSignal<Option<String>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let resumes = app_state.0.resumes;
    let preset = RwSignal::new(SectionPreset::default());
    let title = RwSignal::new(String::new());

    let on_add = move |_| {
        let added = app_state
            .0
            .apply(resumes, |m| m.add_blank_section(preset.get_untracked(), &title.get_untracked()));
        if let Some(id) = added {
            title.set(String::new());
            selected.set(Some(id));
        }
    };

    view! {
        <div class="flex items-center gap-2">
            <select
                class=FIELD
                style="width: auto"
                on:change=move |ev| {
                    let v = event_target_value(&ev);
                    if let Some(p) = SectionPreset::iter().find(|p| p.as_ref() == v) {
                        preset.set(p);
                    }
                }
            >
                {SectionPreset::iter()
                    .map(|p| {
                        view! {
                            <option value=p.as_ref().to_string() selected=move || preset.get() == p>
                                {p.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
            <Input bind_value=title placeholder="新模块标题" class="h-8 text-sm" />
            <Button size=ButtonSize::Sm on:click=on_add>
                "添加模块"
            </Button>
        </div>
    }
}
