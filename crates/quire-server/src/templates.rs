//! HTML templates.
//!
//! Templates are loaded once at startup and never change afterwards. Each one
//! has a built-in default; a file named `<template>.html` in the configured
//! template directory replaces it. Placeholders are plain markers:
//!
//! - `{{ID}}`: the identifier from the request path
//! - `{{TITLE}}`: the page title
//! - `{{BODY}}`: the page body
//! - `{{PAGES}}`: a `<li>` link per stored page
//! - `{{HEAD}}`: shared `<meta>` and `<style>` elements
//!
//! `{{ID}}` and `{{TITLE}}` also land inside double-quoted attributes, so they
//! are escaped for that context. `{{BODY}}` is escaped as text, except in the
//! view template when raw HTML bodies are enabled.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use axum::response::Html;
use html_escape::encode_double_quoted_attribute;

use quire_core::route::PageId;

/// Every template the server renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    Landing,
    View,
    Edit,
    Create,
    Login,
    Signup,
    Admin,
    CreateError,
    EditError,
}

impl TemplateName {
    pub const ALL: [Self; 9] = [
        Self::Landing,
        Self::View,
        Self::Edit,
        Self::Create,
        Self::Login,
        Self::Signup,
        Self::Admin,
        Self::CreateError,
        Self::EditError,
    ];

    /// Base file name, also used for the static error resources.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Landing => "index.html",
            Self::View => "view.html",
            Self::Edit => "edit.html",
            Self::Create => "create.html",
            Self::Login => "login.html",
            Self::Signup => "signup.html",
            Self::Admin => "admin.html",
            Self::CreateError => "create_error.html",
            Self::EditError => "edit_error.html",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            Self::Landing => LANDING,
            Self::View => VIEW,
            Self::Edit => EDIT,
            Self::Create => CREATE,
            Self::Login => LOGIN,
            Self::Signup => SIGNUP,
            Self::Admin => ADMIN,
            Self::CreateError => CREATE_ERROR,
            Self::EditError => EDIT_ERROR,
        }
    }
}

/// Errors raised while loading template overrides.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// An override file exists but could not be read.
    #[error("failed to read template '{path}': {reason}")]
    Read { path: PathBuf, reason: String },
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageView<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub pages: &'a [PageId],
}

// ── Loading and rendering ────────────────────────────────────────────

/// The loaded template set.
#[derive(Debug, Clone)]
pub struct Templates {
    sources: Vec<(TemplateName, String)>,
    raw_html: bool,
}

impl Templates {
    /// The built-in templates only.
    #[must_use]
    pub fn builtin(raw_html: bool) -> Self {
        Self {
            sources: TemplateName::ALL
                .iter()
                .map(|name| (*name, name.builtin().to_owned()))
                .collect(),
            raw_html,
        }
    }

    /// Built-in templates, overridden by any `<template>.html` found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Read`] if an override file exists but cannot
    /// be read as UTF-8.
    pub fn load(dir: Option<&Path>, raw_html: bool) -> Result<Self, TemplateError> {
        let mut templates = Self::builtin(raw_html);
        let Some(dir) = dir else {
            return Ok(templates);
        };

        for (name, source) in &mut templates.sources {
            let path = dir.join(name.file_name());
            if !path.is_file() {
                continue;
            }
            *source = std::fs::read_to_string(&path).map_err(|e| TemplateError::Read {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            tracing::info!(template = name.file_name(), path = %path.display(), "template override loaded");
        }
        Ok(templates)
    }

    fn source(&self, name: TemplateName) -> &str {
        self.sources
            .iter()
            .find(|(n, _)| *n == name)
            .map_or_else(|| name.builtin(), |(_, s)| s.as_str())
    }

    /// Fill `name` with the values from `view`.
    #[must_use]
    pub fn render(&self, name: TemplateName, view: &PageView<'_>) -> Html<String> {
        let body = if name == TemplateName::View && self.raw_html {
            Cow::Borrowed(view.body)
        } else {
            html_escape::encode_text(view.body)
        };

        let mut pages = String::new();
        for id in view.pages {
            // Identifiers are alphanumeric, nothing to escape.
            let _ = write!(pages, "<li><a href=\"/view/{id}\">{id}</a></li>");
        }

        Html(
            self.source(name)
                .replace("{{HEAD}}", HEAD)
                .replace("{{ID}}", &encode_double_quoted_attribute(view.id))
                .replace("{{TITLE}}", &encode_double_quoted_attribute(view.title))
                .replace("{{PAGES}}", &pages)
                .replace("{{BODY}}", &body),
        )
    }
}

// ── Built-in templates ───────────────────────────────────────────────

const HEAD: &str = r#"<meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<style>body{font-family:system-ui,sans-serif;max-width:760px;margin:40px auto;padding:0 16px;line-height:1.6}
textarea{width:100%;min-height:320px;font-family:ui-monospace,monospace}input{padding:4px}nav a{margin-right:12px}</style>"#;

const LANDING: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Quire</title></head>
<body>
<nav><a href="/create/new">New page</a><a href="/files">Page index (JSON)</a><a href="/login/home">Log in</a><a href="/signup/home">Sign up</a></nav>
<h1>Quire</h1>
<ul>{{PAGES}}</ul>
</body></html>
"#;

const VIEW: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>{{TITLE}}</title></head>
<body>
<nav><a href="/">Home</a><a href="/edit/{{ID}}">Edit</a></nav>
<h1>{{TITLE}}</h1>
<article>{{BODY}}</article>
</body></html>
"#;

const EDIT: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Editing {{TITLE}}</title></head>
<body>
<nav><a href="/">Home</a><a href="/view/{{ID}}">View</a></nav>
<h1>Editing {{TITLE}}</h1>
<form action="/save/edit" method="POST">
<input type="hidden" name="intent" value="edit"/>
<p><label>Title <input type="text" name="newpage_name" value="{{TITLE}}" required/></label></p>
<p><textarea name="newpage_body">{{BODY}}</textarea></p>
<p><input type="submit" value="Save"/></p>
</form>
</body></html>
"#;

const CREATE: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>New page</title></head>
<body>
<nav><a href="/">Home</a></nav>
<h1>New page</h1>
<form action="/save/create" method="POST">
<input type="hidden" name="intent" value="create"/>
<p><label>Title <input type="text" name="newpage_name" value="{{TITLE}}" required/></label></p>
<p><textarea name="newpage_body">{{BODY}}</textarea></p>
<p><input type="submit" value="Create"/></p>
</form>
</body></html>
"#;

const LOGIN: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Log in</title></head>
<body>
<nav><a href="/">Home</a><a href="/signup/{{ID}}">Sign up</a></nav>
<h1>Log in</h1>
<form action="/login/{{ID}}" method="POST">
<p><label>Username <input type="text" name="username" required/></label></p>
<p><label>Password <input type="password" name="password" required/></label></p>
<p><input type="submit" value="Log in"/></p>
</form>
</body></html>
"#;

const SIGNUP: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Sign up</title></head>
<body>
<nav><a href="/">Home</a><a href="/login/{{ID}}">Log in</a></nav>
<h1>Sign up</h1>
<form action="/signup/{{ID}}" method="POST">
<p><label>Username <input type="text" name="username" required/></label></p>
<p><label>Password <input type="password" name="password" required/></label></p>
<p><label>Confirm password <input type="password" name="passwordConfirm" required/></label></p>
<p><input type="submit" value="Create account"/></p>
</form>
</body></html>
"#;

const ADMIN: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Admin</title></head>
<body>
<nav><a href="/">Home</a><a href="/create/new">New page</a></nav>
<h1>Admin dashboard</h1>
<p>{{BODY}}</p>
<ul>{{PAGES}}</ul>
</body></html>
"#;

const CREATE_ERROR: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Page already exists</title></head>
<body>
<h1>Page already exists</h1>
<p>A page with that title already exists. Edit it instead, or pick another title.</p>
<p><a href="/">Back to the index</a></p>
</body></html>
"#;

const EDIT_ERROR: &str = r#"<!DOCTYPE html>
<html lang="en"><head>{{HEAD}}<title>Page does not exist</title></head>
<body>
<h1>Page does not exist</h1>
<p>There is no page with that title to edit. Create it first.</p>
<p><a href="/create/new">Create a page</a></p>
</body></html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        let view = PageView {
            id: "Home",
            title: r#"Tom & "Jerry""#,
            body: r#"<a href="x">Tom & Jerry</a>"#,
            pages: &[],
        };
        let html = Templates::builtin(false).render(TemplateName::Edit, &view).0;

        assert!(html.contains(r#"value="Tom &amp; &quot;Jerry&quot;""#));
        assert!(html.contains("&lt;a href=\"x\"&gt;Tom &amp; Jerry&lt;/a&gt;</textarea>"));
        assert!(!html.contains(r#"<a href="x">"#));
    }

    #[test]
    fn view_body_escaped_unless_raw() {
        let view = PageView {
            id: "Home",
            title: "Home",
            body: "<b>hi</b>",
            pages: &[],
        };

        let escaped = Templates::builtin(false).render(TemplateName::View, &view).0;
        assert!(escaped.contains("&lt;b&gt;hi&lt;/b&gt;"));

        let raw = Templates::builtin(true).render(TemplateName::View, &view).0;
        assert!(raw.contains("<article><b>hi</b></article>"));
    }

    #[test]
    fn edit_body_always_escaped() {
        let view = PageView {
            id: "Home",
            title: "Home",
            body: "</textarea><script>",
            pages: &[],
        };
        let html = Templates::builtin(true).render(TemplateName::Edit, &view).0;
        assert!(!html.contains("</textarea><script>"));
    }

    #[test]
    fn pages_render_as_links() {
        let pages = [PageId::parse("Alpha").unwrap(), PageId::parse("Beta").unwrap()];
        let view = PageView {
            pages: &pages,
            ..PageView::default()
        };
        let html = Templates::builtin(false)
            .render(TemplateName::Landing, &view)
            .0;
        assert!(html.contains(r#"<li><a href="/view/Alpha">Alpha</a></li>"#));
        assert!(html.contains(r#"<li><a href="/view/Beta">Beta</a></li>"#));
    }

    #[test]
    fn directory_overrides_replace_builtins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("view.html"), "custom {{TITLE}}: {{BODY}}").unwrap();

        let templates = Templates::load(Some(dir.path()), false).unwrap();
        let view = PageView {
            id: "Home",
            title: "Home",
            body: "text",
            pages: &[],
        };
        assert_eq!(
            templates.render(TemplateName::View, &view).0,
            "custom Home: text"
        );
        // Templates without an override keep the built-in.
        assert!(
            templates
                .render(TemplateName::Edit, &view)
                .0
                .contains("/save/edit")
        );
    }
}
