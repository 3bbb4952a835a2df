//! Built-in values every aggregate starts from on first load.

use super::{
    AiPlatform, BasicInfo, CustomField, EditorKind, ResumeCollection, ResumeDocument,
    ResumeMetadata, ResumePrompt, Section, SectionContent, SectionKind, TextContent, TimelineItem,
};
use indexmap::IndexMap;
use serde_json::Map;

pub(crate) const DEFAULT_RESUME_ID: &str = "1";
pub(crate) const DEFAULT_RESUME_TITLE: &str = "我的简历";

fn custom_field(id: &str, label: &str, value: &str, icon: &str) -> CustomField {
    CustomField {
        id: id.to_string(),
        label: label.to_string(),
        value: value.to_string(),
        icon_name: Some(icon.to_string()),
    }
}

fn timeline_item(id: &str, title: &str, subtitle: &str, secondary: &str, description: &str) -> TimelineItem {
    TimelineItem {
        id: id.to_string(),
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        secondary_subtitle: secondary.to_string(),
        description: description.to_string(),
        ..Default::default()
    }
}

fn section(id: &str, title: &str, icon: &str, order: i64, content: SectionContent) -> Section {
    Section {
        icon_name: Some(icon.to_string()),
        order,
        ..Section::new(id, title, content)
    }
}

/// The document every new resume is cloned from.
pub fn template_resume(id: &str, title: &str) -> ResumeDocument {
    let basic = BasicInfo {
        avatar: String::new(),
        name: "白玩".to_string(),
        email: "example@gmail.com".to_string(),
        phone: "12345678901".to_string(),
        gender: "男".to_string(),
        age: "24".to_string(),
        location: "北京".to_string(),
        website: String::new(),
        custom_fields: vec![
            custom_field("1", "7年工作经验", "", "briefcase"),
            custom_field("2", "期望城市", "北京", "map-pin"),
            custom_field("3", "个人网站", "https://whitemeta.cn", "globe"),
            custom_field("4", "清华大学", "", "graduation-cap"),
        ],
        extra: Map::new(),
    };

    let advantages = Section {
        kind: SectionKind::List,
        editor: Some(EditorKind::Text),
        ..section(
            "advantages",
            "个人优势",
            "star",
            2,
            SectionContent::Text(TextContent {
                content: "<ul><li>熟练使用 html5 + css3 技术</li>\
                          <li>熟练掌握 Typescript，SCSS。</li>\
                          <li>丰富的大型网站开发经验，对前端工程化、性能优化有丰富的实战经验。</li></ul>"
                    .to_string(),
                extra: Map::new(),
            }),
        )
    };

    let projects = Section {
        editor: Some(EditorKind::Timeline),
        ..section(
            "projects",
            "项目经历",
            "settings",
            3,
            SectionContent::Timeline(vec![
                timeline_item(
                    "1756977218779",
                    "简历编辑器",
                    "全栈",
                    "resume.whitemeta.cn",
                    "<p>一个现代化在线简历编辑器，提供所见即所得的编辑体验。</p>\
                     <ul><li>数据全部保存在浏览器本地</li><li>支持多份简历管理与导入导出</li></ul>",
                ),
                timeline_item(
                    "1757064171447",
                    "个人网站",
                    "全栈",
                    "whitemeta.cn",
                    "<p>一个博客网站</p><ul><li>PC & H5 双端适配</li></ul>",
                ),
            ]),
        )
    };

    let experience = Section {
        editor: Some(EditorKind::Timeline),
        ..section(
            "experience",
            "工作经历",
            "briefcase",
            4,
            SectionContent::Timeline(vec![
                timeline_item("1", "阿里巴巴", "2000.01 - 2000.06", "", ""),
                timeline_item("2", "字节跳动", "2000.01 - 2000.06", "", ""),
            ]),
        )
    };

    ResumeDocument {
        id: id.to_string(),
        title: title.to_string(),
        template: Some("default".to_string()),
        layout: Some("top-bottom".to_string()),
        sections: vec![
            section("basic-info", "基本信息", "user", 1, SectionContent::Basic(basic)),
            advantages,
            projects,
            experience,
        ],
        extra: Map::new(),
    }
}

/// Collection holding only the template document.
pub fn default_collection(now: &str) -> ResumeCollection {
    let mut resumes = IndexMap::new();
    resumes.insert(
        DEFAULT_RESUME_ID.to_string(),
        template_resume(DEFAULT_RESUME_ID, DEFAULT_RESUME_TITLE),
    );

    let mut metadata = IndexMap::new();
    metadata.insert(
        DEFAULT_RESUME_ID.to_string(),
        ResumeMetadata {
            id: DEFAULT_RESUME_ID.to_string(),
            title: DEFAULT_RESUME_TITLE.to_string(),
            description: Some("默认简历".to_string()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        },
    );

    ResumeCollection {
        current_resume_id: DEFAULT_RESUME_ID.to_string(),
        resumes,
        metadata,
    }
}

pub fn default_prompts(now: &str) -> Vec<ResumePrompt> {
    let seed: [(&str, &str, &str, &[&str]); 6] = [
        (
            "general-optimization",
            "简历整体优化",
            "请帮我优化这份简历，使其更加专业和吸引人。重点关注：1. 工作经历的描述是否突出成果和量化数据；2. 技能部分是否与目标职位匹配；3. 整体结构和格式是否清晰易读。",
            &["通用", "优化", "专业"],
        ),
        (
            "work-experience-enhancement",
            "工作经历强化",
            "请帮我优化工作经历部分，重点：1. 使用STAR方法（情况、任务、行动、结果）重新组织描述；2. 添加具体的量化指标和成果；3. 突出与目标职位相关的技能和经验；4. 使用更有力的动词开头。",
            &["工作经历", "STAR方法", "量化"],
        ),
        (
            "skills-matching",
            "技能匹配优化",
            "基于目标职位要求，请帮我优化技能部分：1. 调整技能的排序，将最相关的放在前面；2. 补充可能遗漏的重要技能；3. 为每个技能添加熟练程度说明；4. 删除不相关或过时的技能。",
            &["技能", "匹配", "排序"],
        ),
        (
            "project-showcase",
            "项目经历展示",
            "请帮我优化项目经历部分：1. 突出项目的技术难点和创新点；2. 量化项目成果和影响；3. 说明个人在项目中的具体贡献和角色；4. 选择最能体现能力的核心项目进行详细描述。",
            &["项目", "技术", "成果"],
        ),
        (
            "ats-optimization",
            "ATS系统优化",
            "请帮我优化简历以通过ATS（应聘者跟踪系统）筛选：1. 确保关键词与职位描述匹配；2. 使用标准的简历格式和节标题；3. 避免使用图片、表格等复杂格式；4. 检查拼写和语法错误。",
            &["ATS", "关键词", "格式"],
        ),
        (
            "career-change",
            "转行简历优化",
            "针对转行求职，请帮我优化简历：1. 突出可转移的技能和经验；2. 重新包装工作经历，强调与目标行业相关的部分；3. 补充相关的学习经历和项目；4. 在个人总结中明确转行动机和优势。",
            &["转行", "可转移技能", "重新包装"],
        ),
    ];

    seed.iter()
        .map(|(id, title, content, tags)| ResumePrompt {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
        .collect()
}

pub fn default_platforms() -> Vec<AiPlatform> {
    [
        ("deepseek", "DeepSeek Chat", "https://chat.deepseek.com/"),
        ("qwen", "Qwen Chat", "https://chat.qwen.ai/"),
        ("doubao", "豆包", "https://www.doubao.com/chat/"),
    ]
    .iter()
    .map(|(id, name, url)| AiPlatform {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        icon: None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_exactly_one_basic_section() {
        let doc = template_resume("x", "t");
        assert_eq!(doc.sections.iter().filter(|s| s.is_basic()).count(), 1);
        assert_eq!(doc.basic_section().map(|s| s.id.as_str()), Some("basic-info"));
    }

    #[test]
    fn test_template_section_ids_unique() {
        let doc = template_resume("x", "t");
        let mut ids: Vec<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), doc.sections.len());
    }

    #[test]
    fn test_template_survives_serde_roundtrip() {
        let doc = template_resume("x", "t");
        let json = serde_json::to_string(&doc).unwrap();
        let back: ResumeDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_seed_lists() {
        assert_eq!(default_prompts("now").len(), 6);
        let platforms = default_platforms();
        assert_eq!(platforms.len(), 3);
        assert_eq!(platforms[0].id, "deepseek");
    }
}
