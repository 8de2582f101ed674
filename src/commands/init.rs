use std::path::{Path, PathBuf};

use crate::{
    InitArgs,
    config::{
        AssetsConfig, Config, ContentConfig, DEFAULT_CONFIG_FILE, DevConfig, HighlightConfig,
        LessonsConfig, MarkdownConfig, SiteConfig,
    },
};

const BASE_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ page.title }} · {{ site.name }}</title>
  {% for css in site.css_paths %}<link rel="stylesheet" href="{{ root_path | safe }}{{ css | safe }}">
  {% endfor %}{% if site.highlight_css %}<link rel="stylesheet" href="{{ root_path | safe }}{{ site.highlight_css | safe }}">{% endif %}
</head>
<body>
  {% block body %}{% endblock body %}
  {% if build.live_reload %}<script>
    new EventSource("/_coursebook/live-reload").addEventListener("reload", () => location.reload());
  </script>{% endif %}
</body>
</html>
"#;

const INDEX_LAYOUT: &str = r#"{% extends "base" %}
{% block body %}
<main>{% block main %}{% endblock main %}</main>
{% include "lesson-list" %}
{% endblock body %}
"#;

const LESSON_LAYOUT: &str = r#"{% extends "base" %}
{% block body %}
<article>
  <h1>{{ page.title }}</h1>
  {% block main %}{% endblock main %}
</article>
<nav>
  {% if lesson.prev %}<a href="{{ root_path | safe }}{{ lesson.prev.url | safe }}.html">&larr; {{ lesson.prev.title }}</a>{% endif %}
  {% if lesson.next %}<a href="{{ root_path | safe }}{{ lesson.next.url | safe }}.html">{{ lesson.next.title }} &rarr;</a>{% endif %}
</nav>
{% endblock body %}
"#;

const LESSON_LIST_PARTIAL: &str = r#"<ol class="lessons">
{% for l in lessons %}  <li><a href="{{ root_path | safe }}{{ l.url | safe }}.html">{{ l.title }}</a></li>
{% endfor %}</ol>
"#;

const STYLESHEET: &str = "body { font-family: sans-serif; max-width: 48rem; margin: 0 auto; }\n";

const INDEX_PAGE: &str = "---
layout: index
title: Welcome
---
Start with the first lesson below.
";

const FIRST_LESSON: &str = "---
layout: lesson
title: Getting Started
---
Every lesson is a markdown file.

```html
<p>Hello!</p>
```
";

const SECOND_LESSON: &str = "---
layout: lesson
title: Next Steps
---
Add the slug of each new lesson to `lessons.order` in the config.
";

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    println!("Initializing project in {}", path.display());

    for file in scaffold(&path)? {
        println!("Created {}", file.display());
    }

    Ok(())
}

fn default_config() -> Config {
    Config {
        site: SiteConfig {
            name: "My Course".into(),
            url: None,
            output: "build".into(),
        },
        content: ContentConfig::default(),
        templates: vec!["layouts/*.html".into(), "partials/*.html".into()],
        lessons: LessonsConfig {
            order: vec!["getting-started".into(), "next-steps".into()],
            ..LessonsConfig::default()
        },
        assets: AssetsConfig {
            css: vec!["css/*.css".into()],
            ..AssetsConfig::default()
        },
        markdown: MarkdownConfig::default(),
        highlight: HighlightConfig::default(),
        dev: DevConfig::default(),
    }
}

/// Write a starter project into `root`, leaving existing files untouched.
///
/// Returns the files that were created.
fn scaffold(root: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    let config_text = serde_yaml::to_string(&default_config())?;

    let files: [(&str, &str); 9] = [
        (DEFAULT_CONFIG_FILE, &config_text),
        ("layouts/base.html", BASE_LAYOUT),
        ("layouts/index.html", INDEX_LAYOUT),
        ("layouts/lesson.html", LESSON_LAYOUT),
        ("partials/lesson-list.html", LESSON_LIST_PARTIAL),
        ("css/main.css", STYLESHEET),
        ("content/index.md", INDEX_PAGE),
        ("content/lessons/getting-started.md", FIRST_LESSON),
        ("content/lessons/next-steps.md", SECOND_LESSON),
    ];

    let mut created = Vec::new();
    for (relative, content) in files {
        let target = root.join(relative);
        if target.exists() {
            println!("Skipping existing {}", target.display());
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, content)?;
        created.push(target);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Builder;

    #[test]
    fn test_scaffold_builds() {
        let dir = tempfile::tempdir().unwrap();
        let created = scaffold(dir.path()).unwrap();
        assert_eq!(created.len(), 9);

        let config_text = std::fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        let config: Config = serde_yaml::from_str(&config_text).unwrap();
        assert!(config.validate().is_ok());

        let result = Builder::new(config, dir.path().to_path_buf())
            .build()
            .unwrap();
        assert_eq!(result.documents, 3);
        assert_eq!(result.lessons, 2);

        let index = std::fs::read_to_string(dir.path().join("build/index.html")).unwrap();
        assert!(index.contains("Getting Started</a></li>"));
        assert!(index.contains("Next Steps</a></li>"));
        assert!(index.contains("<p>Start with the first lesson below.</p>"));

        let lesson =
            std::fs::read_to_string(dir.path().join("build/lessons/getting-started.html"))
                .unwrap();
        assert!(lesson.contains("<pre><code class=\"html\">"));
        assert!(lesson.contains("href=\"../lessons/next-steps.html\">Next Steps &rarr;</a>"));
    }

    #[test]
    fn test_scaffold_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "site:\n  name: Mine\n").unwrap();

        let created = scaffold(dir.path()).unwrap();
        assert_eq!(created.len(), 8);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap(),
            "site:\n  name: Mine\n"
        );
    }
}
