//! HTML rendering.
//!
//! Plain string templates; every interpolated value goes through [`escape`].

use std::fmt::Write;

use url::Url;

use crate::catalog::Course;

/// A one-shot message shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value == "success" {
            FlashLevel::Success
        } else {
            FlashLevel::Error
        }
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path of a course's detail page, with the code percent-encoded as one
/// path segment.
pub fn course_href(code: &str) -> String {
    let Ok(mut url) = Url::parse("http://catalog.local/course") else {
        return String::from("/catalog");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(code);
    }
    url.path().to_string()
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let flash = flash
        .map(|f| {
            format!(
                "<p class=\"flash {}\">{}</p>\n",
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
         <nav><a href=\"/\">Home</a> | <a href=\"/catalog\">Catalog</a> | <a href=\"/add_course\">Add course</a></nav>\n\
         {flash}{body}\n</body>\n</html>\n",
        title = escape(title),
        flash = flash,
        body = body,
    )
}

pub fn index() -> String {
    layout(
        "Course Catalog",
        None,
        "<h1>Course Catalog</h1>\n<p>Browse the <a href=\"/catalog\">catalog</a> or \
         <a href=\"/add_course\">add a course</a>.</p>",
    )
}

pub fn catalog(courses: &[Course], flash: Option<&Flash>) -> String {
    let mut body = String::from("<h1>Courses</h1>\n");
    if courses.is_empty() {
        body.push_str("<p>No courses yet.</p>");
        return layout("Courses", flash, &body);
    }

    body.push_str(
        "<table>\n<tr><th>Code</th><th>Name</th><th>Instructor</th><th>Semester</th></tr>\n",
    );
    for course in courses {
        let _ = writeln!(
            body,
            "<tr><td><a href=\"{href}\">{code}</a></td><td>{name}</td><td>{instructor}</td><td>{semester}</td></tr>",
            href = escape(&course_href(&course.code)),
            code = escape(&course.code),
            name = escape(&course.name),
            instructor = escape(&course.instructor),
            semester = escape(&course.semester),
        );
    }
    body.push_str("</table>");
    layout("Courses", flash, &body)
}

/// The submission form, pre-filled with `values`.
pub fn add_course_form(values: &Course, flash: Option<&Flash>) -> String {
    let mut body = String::from("<h1>Add a course</h1>\n<form method=\"post\" action=\"/add_course\">\n");
    for field in Course::FIELDS {
        let value = values.field(field).unwrap_or_default();
        let _ = writeln!(
            body,
            "<label>{field} <input name=\"{field}\" value=\"{value}\"></label><br>",
            field = field,
            value = escape(value),
        );
    }
    body.push_str("<button type=\"submit\">Add</button>\n</form>");
    layout("Add a course", flash, &body)
}

pub fn course_details(course: &Course) -> String {
    let mut body = format!(
        "<h1>{} &mdash; {}</h1>\n<dl>\n",
        escape(&course.code),
        escape(&course.name)
    );
    for field in &Course::FIELDS[2..] {
        let _ = writeln!(
            body,
            "<dt>{}</dt><dd>{}</dd>",
            field,
            escape(course.field(field).unwrap_or_default())
        );
    }
    body.push_str("</dl>");
    layout(&course.name, None, &body)
}

pub fn message(title: &str, flash: &Flash) -> String {
    layout(
        title,
        Some(flash),
        "<p><a href=\"/catalog\">Back to the catalog</a></p>",
    )
}
