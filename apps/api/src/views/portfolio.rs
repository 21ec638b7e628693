//! Portfolio page view model and the two layouts that render it.

use askama::Template;
use axum::response::Response;
use serde_json::Value;

use crate::portfolio::templates::TemplateId;
use crate::views::render::render_template;

const TAGLINE_WORDS: usize = 20;
const GITHUB_CHART_BASE: &str = "https://ghchart.rshah.org/9333ea";
const SKILL_ICON_BASE: &str = "https://cdn.simpleicons.org";

/// Skills the modern layout decorates with a logo, keyed by the exact skill name.
const SKILL_ICONS: &[(&str, &str)] = &[
    ("React", "react"),
    ("Node.js", "nodedotjs"),
    ("Python", "python"),
    ("JavaScript", "javascript"),
    ("TypeScript", "typescript"),
    ("HTML", "html5"),
    ("CSS", "css3"),
    ("MongoDB", "mongodb"),
    ("MySQL", "mysql"),
    ("PostgreSQL", "postgresql"),
    ("Next.js", "nextdotjs"),
    ("Tailwind CSS", "tailwindcss"),
    ("Django", "django"),
    ("C++", "cplusplus"),
    ("Go", "go"),
    ("PHP", "php"),
    ("Ruby", "ruby"),
    ("Flutter", "flutter"),
    ("Swift", "swift"),
    ("Kotlin", "kotlin"),
    ("Angular", "angular"),
];

#[derive(Debug, Clone, Default)]
pub struct ContactView {
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct WorkView {
    pub title: String,
    pub company: String,
    pub kind: String,
    pub location: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct EducationView {
    pub institution: String,
    pub degree: String,
    pub duration: String,
}

#[derive(Debug, Clone)]
pub struct SkillBadge {
    pub name: String,
    pub icon_url: Option<String>,
}

/// Parsed resume data flattened into what both layouts display.
#[derive(Debug, Clone)]
pub struct PortfolioView {
    pub name: String,
    pub summary: String,
    /// First words of the summary, shown under the name.
    pub tagline: String,
    pub contact: ContactView,
    pub work_experience: Vec<WorkView>,
    pub education: Vec<EducationView>,
    pub skills: Vec<SkillBadge>,
    pub image: String,
    pub github_username: Option<String>,
}

impl PortfolioView {
    pub fn from_parsed(parsed: &Value, image: &str) -> Self {
        let contact = parsed.get("contact").unwrap_or(&Value::Null);
        let contact_field = |key: &str| {
            let nested = text(contact, key);
            if nested.is_empty() {
                text(parsed, key)
            } else {
                nested
            }
        };
        let github = contact_field("github");
        let github_username = github_username(&github);
        let contact = ContactView {
            email: contact_field("email"),
            phone: contact_field("phone"),
            linkedin: web_link(contact_field("linkedin")),
            github: web_link(github),
            location: contact_field("location"),
        };

        let summary = text(parsed, "summary");
        let tagline = summary
            .split_whitespace()
            .take(TAGLINE_WORDS)
            .collect::<Vec<_>>()
            .join(" ");

        let work_experience = items(parsed, &["work_experience", "experience"])
            .map(|exp| WorkView {
                title: text(exp, "role"),
                company: text(exp, "company"),
                kind: text(exp, "type"),
                location: text(exp, "location"),
                duration: text(exp, "duration"),
                description: text(exp, "description"),
            })
            .collect();

        let education = items(parsed, &["education"])
            .map(|edu| EducationView {
                institution: text(edu, "university"),
                degree: text(edu, "degree"),
                duration: text(edu, "graduation_year"),
            })
            .collect();

        let skills = items(parsed, &["skills"])
            .filter_map(|skill| match skill {
                Value::String(name) => Some(name.trim().to_string()),
                Value::Object(_) => Some(text(skill, "name")),
                _ => None,
            })
            .filter(|name| !name.is_empty())
            .map(|name| SkillBadge {
                icon_url: skill_icon_url(&name),
                name,
            })
            .collect();

        PortfolioView {
            name: text(parsed, "name"),
            summary,
            tagline,
            contact,
            work_experience,
            education,
            skills,
            image: image.to_string(),
            github_username,
        }
    }

    pub fn github_chart_url(&self) -> Option<String> {
        self.github_username
            .as_ref()
            .map(|user| format!("{GITHUB_CHART_BASE}/{user}"))
    }
}

fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Elements of the first of `keys` that holds an array.
fn items<'a>(value: &'a Value, keys: &[&str]) -> impl Iterator<Item = &'a Value> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
        .into_iter()
        .flatten()
}

/// Profile links end up in `href`; anything but a web URL is dropped.
fn web_link(url: String) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        url
    } else {
        String::new()
    }
}

fn skill_icon_url(skill: &str) -> Option<String> {
    SKILL_ICONS
        .iter()
        .find(|(name, _)| *name == skill)
        .map(|(_, slug)| format!("{SKILL_ICON_BASE}/{slug}"))
}

/// `https://www.github.com/octocat/` → `octocat`. Bare usernames pass through.
fn github_username(url: &str) -> Option<String> {
    let rest = url.trim();
    let rest = rest
        .strip_prefix("https://")
        .or_else(|| rest.strip_prefix("http://"))
        .unwrap_or(rest);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix("github.com/").unwrap_or(rest);
    let username = rest.trim_end_matches('/').split('/').next().unwrap_or_default();

    if username.is_empty() || username.contains('.') {
        None
    } else {
        Some(username.to_string())
    }
}

#[derive(Template)]
#[template(path = "portfolio/classic_v1.html")]
pub struct ClassicV1Page<'a> {
    pub p: &'a PortfolioView,
}

#[derive(Template)]
#[template(path = "portfolio/modern_v2.html")]
pub struct ModernV2Page<'a> {
    pub p: &'a PortfolioView,
}

#[derive(Template)]
#[template(path = "portfolio/no_template.html")]
pub struct NoTemplatePage;

/// Renders `view` with the chosen layout, or a notice when none is selected.
pub fn render_portfolio(template: Option<TemplateId>, view: &PortfolioView) -> Response {
    match template {
        Some(TemplateId::ClassicV1) => render_template(ClassicV1Page { p: view }),
        Some(TemplateId::ModernV2) => render_template(ModernV2Page { p: view }),
        None => render_template(NoTemplatePage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "Grace Hopper",
            "contact": {
                "email": "grace@example.com",
                "phone": "+1 555 0100",
                "linkedin": "https://linkedin.com/in/grace",
                "github": "https://github.com/ghopper/"
            },
            "summary": "Computer scientist and United States Navy rear admiral who pioneered compilers and machine independent programming languages and popularised the term debugging",
            "work_experience": [
                {"company": "US Navy", "role": "Rear Admiral", "duration": "1943 - 1986"}
            ],
            "education": [
                {"degree": "PhD Mathematics", "university": "Yale", "graduation_year": "1934"}
            ],
            "skills": ["COBOL", "Python", {"name": "Go"}, 42, ""]
        })
    }

    #[test]
    fn test_maps_resume_fields() {
        let view = PortfolioView::from_parsed(&sample(), "http://img.test/g.png");

        assert_eq!(view.name, "Grace Hopper");
        assert_eq!(view.contact.email, "grace@example.com");
        assert_eq!(view.work_experience[0].title, "Rear Admiral");
        assert_eq!(view.work_experience[0].company, "US Navy");
        assert_eq!(view.work_experience[0].kind, "");
        assert_eq!(view.education[0].institution, "Yale");
        assert_eq!(view.education[0].duration, "1934");
        assert_eq!(view.image, "http://img.test/g.png");
    }

    #[test]
    fn test_tagline_is_first_twenty_words() {
        let view = PortfolioView::from_parsed(&sample(), "");
        assert_eq!(view.tagline.split(' ').count(), 20);
        assert!(view.tagline.starts_with("Computer scientist and"));
        assert!(view.summary.ends_with("debugging"));
    }

    #[test]
    fn test_skills_keep_strings_and_named_objects() {
        let view = PortfolioView::from_parsed(&sample(), "");
        let names: Vec<_> = view.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["COBOL", "Python", "Go"]);
        assert_eq!(view.skills[0].icon_url, None);
        assert_eq!(
            view.skills[1].icon_url.as_deref(),
            Some("https://cdn.simpleicons.org/python")
        );
    }

    #[test]
    fn test_fallback_record_shape_is_readable() {
        let parsed = json!({
            "name": "Unknown",
            "email": "a@example.com",
            "phone": "",
            "experience": [],
            "parseError": "Could not automatically parse resume content."
        });
        let view = PortfolioView::from_parsed(&parsed, "");
        assert_eq!(view.contact.email, "a@example.com");
        assert!(view.work_experience.is_empty());
        assert!(view.github_username.is_none());
    }

    #[test]
    fn test_github_username_extraction() {
        assert_eq!(github_username("https://github.com/ghopper/").as_deref(), Some("ghopper"));
        assert_eq!(github_username("http://www.github.com/octocat").as_deref(), Some("octocat"));
        assert_eq!(github_username("octocat").as_deref(), Some("octocat"));
        assert_eq!(github_username("github.com/octocat/hello-world").as_deref(), Some("octocat"));
        assert_eq!(github_username(""), None);
        assert_eq!(github_username("https://gitlab.com/someone"), None);
    }

    #[test]
    fn test_script_links_are_not_rendered() {
        let parsed = json!({
            "name": "Mallory",
            "contact": {
                "github": "javascript:alert(document.cookie)",
                "linkedin": " JavaScript:fetch(1)"
            }
        });
        let view = PortfolioView::from_parsed(&parsed, "");
        assert_eq!(view.contact.github, "");
        assert_eq!(view.contact.linkedin, "");
        assert!(view.github_username.is_none());

        let classic = ClassicV1Page { p: &view }.render().unwrap();
        let modern = ModernV2Page { p: &view }.render().unwrap();
        for html in [classic, modern] {
            assert!(!html.to_ascii_lowercase().contains("javascript:"));
            assert!(!html.contains("title=\"GitHub\""));
        }
    }

    #[test]
    fn test_bare_github_username_keeps_chart_but_no_link() {
        let view = PortfolioView::from_parsed(&json!({"github": "octocat"}), "");
        assert_eq!(view.contact.github, "");
        assert_eq!(view.github_username.as_deref(), Some("octocat"));
    }

    #[test]
    fn test_github_chart_url() {
        let view = PortfolioView::from_parsed(&sample(), "");
        assert_eq!(
            view.github_chart_url().as_deref(),
            Some("https://ghchart.rshah.org/9333ea/ghopper")
        );
    }

    #[test]
    fn test_each_layout_renders() {
        let view = PortfolioView::from_parsed(&sample(), "http://img.test/g.png");

        let classic = ClassicV1Page { p: &view }.render().unwrap();
        assert!(classic.contains("Grace Hopper"));
        assert!(classic.contains("Work Experience"));

        let modern = ModernV2Page { p: &view }.render().unwrap();
        assert!(modern.contains("Grace Hopper"));
        assert!(modern.contains("simpleicons.org"));
        assert!(!classic.contains("simpleicons.org"));

        let none = NoTemplatePage.render().unwrap();
        assert!(none.contains("No valid template selected."));
    }
}
